//! Repository seams over the backing warehouse.
//!
//! The orchestrator only sees these traits; whether a query hits the
//! real warehouse or the deterministic mock is decided once at wiring
//! time from [`crate::config::Mode`].

pub mod mock;
pub mod warehouse;

pub use mock::MockStore;
pub use warehouse::WarehouseStore;

use std::collections::HashMap;

use async_trait::async_trait;

use crate::error::DataSourceError;
use crate::model::{ForecastPoint, Incident, ScheduleDecision};

/// Read access to open incidents joined with site address and evidence
/// metadata.
#[async_trait]
pub trait IncidentRepository: Send + Sync {
    /// All incidents with status OPEN. Order is unspecified.
    async fn list_open(&self) -> Result<Vec<Incident>, DataSourceError>;
}

/// Read access to per-stop ridership projections over the configured
/// future horizon.
#[async_trait]
pub trait ForecastRepository: Send + Sync {
    /// Forecast points strictly after now, keyed by bus stop id. A stop
    /// with no forecast data maps to an empty vec, not an error.
    async fn forecast(
        &self,
        bus_stop_ids: &[String],
    ) -> Result<HashMap<String, Vec<ForecastPoint>>, DataSourceError>;
}

/// Transactional committer for scheduling decisions.
#[async_trait]
pub trait ScheduleStore: Send + Sync {
    /// Atomically move every OPEN incident at the decision's stop to
    /// SCHEDULED, attaching the decision record. Returns the number of
    /// incidents affected; zero means nothing was open at that stop.
    async fn schedule(&self, decision: &ScheduleDecision) -> Result<u64, DataSourceError>;
}
