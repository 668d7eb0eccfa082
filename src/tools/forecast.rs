//! Passenger Forecast Tool
//!
//! Maps bus stop ids to expected passenger counts over the configured
//! future horizon. Timestamps are rendered in the operating zone so the
//! planner can reason about them directly.

use std::sync::Arc;

use anyhow::Result;
use async_trait::async_trait;
use serde_json::{json, Map, Value};
use tracing::{error, info};

use crate::store::ForecastRepository;
use crate::timeutil;

use super::{Tool, ToolOutput};

/// Payload timestamp format, e.g. `07/09/2025 15:00`.
const POINT_FORMAT: &str = "%m/%d/%Y %H:%M";

pub struct PassengerForecastTool {
    repo: Arc<dyn ForecastRepository>,
}

impl PassengerForecastTool {
    pub fn new(repo: Arc<dyn ForecastRepository>) -> Self {
        Self { repo }
    }
}

#[async_trait]
impl Tool for PassengerForecastTool {
    fn name(&self) -> String {
        "get_expected_number_of_passengers".to_string()
    }

    fn description(&self) -> String {
        "Get the expected number of passengers per bus stop at points in the future. \
         Returns a map from bus stop id to a list of {time, number_of_passengers} entries."
            .to_string()
    }

    fn parameters(&self) -> Value {
        json!({
            "type": "object",
            "properties": {
                "bus_stop_ids": {
                    "type": "array",
                    "items": { "type": "string" },
                    "description": "The bus stop ids to forecast"
                }
            },
            "required": ["bus_stop_ids"]
        })
    }

    async fn execute(&self, params: Value) -> Result<ToolOutput> {
        let ids: Vec<String> = match params.get("bus_stop_ids").and_then(Value::as_array) {
            Some(raw) => raw
                .iter()
                .filter_map(Value::as_str)
                .map(str::to_string)
                .collect(),
            None => {
                return Ok(ToolOutput::failure(
                    "Parameter 'bus_stop_ids' must be an array of strings",
                ))
            }
        };
        info!(stops = ?ids, "Retrieving expected number of passengers");

        match self.repo.forecast(&ids).await {
            Ok(forecast) => {
                let zone = timeutil::operating_zone();
                let mut payload = Map::new();
                for (id, points) in forecast {
                    let entries: Vec<Value> = points
                        .iter()
                        .map(|p| {
                            json!({
                                "time": p.time
                                    .with_timezone(&zone)
                                    .format(POINT_FORMAT)
                                    .to_string(),
                                "number_of_passengers": p.passengers,
                            })
                        })
                        .collect();
                    payload.insert(id, Value::Array(entries));
                }
                let summary = format!("Forecast retrieved for {} stop(s)", payload.len());
                Ok(ToolOutput::success(Value::Object(payload), summary))
            }
            Err(e) => {
                error!("Forecast query failed: {}", e);
                Ok(ToolOutput::failure(format!(
                    "Could not retrieve the forecast: {e}"
                )))
            }
        }
    }
}
