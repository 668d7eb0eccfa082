//! Deterministic in-process store for local development and tests.
//!
//! Fixtures stand in for the ingestion pipeline's output and the
//! forecast is a synthetic random walk. Nothing here persists: a
//! scheduling commit only logs the decision, so repeated listings keep
//! returning both fixture incidents.

use std::collections::HashMap;

use async_trait::async_trait;
use chrono::{Duration as ChronoDuration, Utc};
use rand::Rng;
use tracing::info;

use crate::error::DataSourceError;
use crate::model::{
    BusStop, ForecastPoint, Incident, IncidentStatus, ScheduleDecision, UsAddress,
};

use super::{ForecastRepository, IncidentRepository, ScheduleStore};

/// Synthetic forecast shape: one point every 15 minutes over 3 days.
const WALK_STEP_MINUTES: i64 = 15;
const WALK_HORIZON_MINUTES: i64 = 3 * 24 * 60;

pub struct MockStore;

impl MockStore {
    pub fn new() -> Self {
        Self
    }

    fn fixtures() -> Vec<Incident> {
        vec![
            Incident {
                bus_stop: BusStop {
                    id: "stop-1".to_string(),
                    address: UsAddress {
                        street: "123 Main".to_string(),
                        city: "New York".to_string(),
                        state: "NY".to_string(),
                        zip: "10001".to_string(),
                    },
                },
                image_uri: "store://transit-demo-multimodal/sources/MA-02-broken-glass.jpg"
                    .to_string(),
                image_mime_type: "image/jpeg".to_string(),
                description: "Broken glass panel on the shelter".to_string(),
                status: IncidentStatus::Open,
            },
            Incident {
                bus_stop: BusStop {
                    id: "stop-2".to_string(),
                    address: UsAddress {
                        street: "457 1st Street".to_string(),
                        city: "New York".to_string(),
                        state: "NY".to_string(),
                        zip: "10002".to_string(),
                    },
                },
                image_uri: "store://transit-demo-multimodal/sources/MC-02-dirty-damaged.jpg"
                    .to_string(),
                image_mime_type: "image/jpeg".to_string(),
                description: "Dirty and damaged bench".to_string(),
                status: IncidentStatus::Open,
            },
        ]
    }

    fn known_stop(id: &str) -> bool {
        Self::fixtures().iter().any(|i| i.bus_stop.id == id)
    }
}

impl Default for MockStore {
    fn default() -> Self {
        Self::new()
    }
}

#[async_trait]
impl IncidentRepository for MockStore {
    async fn list_open(&self) -> Result<Vec<Incident>, DataSourceError> {
        info!("Returning fixture incidents (mock mode)");
        Ok(Self::fixtures())
    }
}

#[async_trait]
impl ForecastRepository for MockStore {
    async fn forecast(
        &self,
        bus_stop_ids: &[String],
    ) -> Result<HashMap<String, Vec<ForecastPoint>>, DataSourceError> {
        info!(stops = ?bus_stop_ids, "Synthesizing forecast walk (mock mode)");
        let now = Utc::now();
        let mut rng = rand::thread_rng();
        let mut result = HashMap::new();
        for id in bus_stop_ids {
            let mut walk = Vec::new();
            if Self::known_stop(id) {
                let base: u32 = rng.gen_range(5..=20);
                let mut offset = 10;
                while offset < WALK_HORIZON_MINUTES {
                    walk.push(ForecastPoint {
                        time: now + ChronoDuration::minutes(offset),
                        passengers: base + rng.gen_range(3..=10),
                    });
                    offset += WALK_STEP_MINUTES;
                }
            }
            result.insert(id.clone(), walk);
        }
        Ok(result)
    }
}

#[async_trait]
impl ScheduleStore for MockStore {
    async fn schedule(&self, decision: &ScheduleDecision) -> Result<u64, DataSourceError> {
        info!(
            bus_stop = %decision.bus_stop_id,
            start = %decision.start,
            reason = %decision.reason,
            subject = %decision.notification_subject,
            "Would schedule maintenance (mock mode, store untouched)"
        );
        Ok(1)
    }
}
