//! Error taxonomy for the decision-support core.
//!
//! Data-layer failures are recoverable and surface to the planner as
//! tool-level failure payloads; an impossible calendar date is a caller
//! defect and fails loudly as a `Result::Err` at the call site.

use std::time::Duration;

use thiserror::Error;

/// A backing-store read or write failed.
#[derive(Debug, Error)]
pub enum DataSourceError {
    /// Transport-level failure talking to the warehouse query API.
    #[error("warehouse transport failure: {0}")]
    Http(#[from] reqwest::Error),

    /// The query API accepted the request but reported an error.
    #[error("warehouse query failed: {0}")]
    Query(String),

    /// A row came back without the shape the query promises.
    #[error("malformed warehouse row: {0}")]
    Schema(String),

    /// The caller-supplied deadline elapsed before the store answered.
    #[error("data source call exceeded the {0:?} deadline")]
    Timeout(Duration),
}

/// An impossible proleptic Gregorian calendar date.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Error)]
#[error("no such calendar date: {year:04}-{month:02}-{day:02}")]
pub struct InvalidDateError {
    pub day: u32,
    pub month: u32,
    pub year: i32,
}
