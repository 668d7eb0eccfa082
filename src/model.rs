//! Domain value objects shared by the repositories and tools.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

/// A street address in the USA.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct UsAddress {
    /// Street or road, including the number.
    pub street: String,
    pub city: String,
    /// State abbreviation.
    pub state: String,
    pub zip: String,
}

/// A physical bus stop. Created by the upstream ingestion pipeline;
/// read-only to this core.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct BusStop {
    pub id: String,
    /// Closest address.
    pub address: UsAddress,
}

/// Lifecycle status of an incident. `Open` transitions to `Scheduled`
/// exactly once and never reverts.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum IncidentStatus {
    Open,
    Scheduled,
}

impl IncidentStatus {
    /// Parse the upper-cased form the warehouse stores.
    pub fn parse(s: &str) -> Option<Self> {
        match s.to_ascii_lowercase().as_str() {
            "open" => Some(Self::Open),
            "scheduled" => Some(Self::Scheduled),
            _ => None,
        }
    }
}

/// A reported problem at a bus stop, joined with its evidence image.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Incident {
    pub bus_stop: BusStop,
    /// Locator of the evidence photo in object storage.
    pub image_uri: String,
    pub image_mime_type: String,
    #[serde(default)]
    pub description: String,
    pub status: IncidentStatus,
}

/// One point of the ridership forecast for a bus stop.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ForecastPoint {
    pub time: DateTime<Utc>,
    pub passengers: u32,
}

/// The decision record attached to an incident when it is scheduled.
/// Write-once per incident.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ScheduleDecision {
    pub bus_stop_id: String,
    pub start: DateTime<Utc>,
    /// Why this stop and this slot were chosen.
    pub reason: String,
    pub notification_subject: String,
    pub notification_body: String,
}

/// Outcome of a scheduling attempt, rendered to the planner as a string.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ScheduleOutcome {
    Success,
    Failure,
    Review,
}

impl ScheduleOutcome {
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Success => "success",
            Self::Failure => "failure",
            Self::Review => "review",
        }
    }
}

impl std::fmt::Display for ScheduleOutcome {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}
