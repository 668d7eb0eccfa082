//! Unresolved Incidents Tool
//!
//! Supplies the planner with every OPEN incident, joined with the stop
//! address and evidence-image metadata. Ranking (safety first, then
//! passenger volume) is the planner's job; this tool only guarantees
//! complete, correctly-filtered data.

use std::sync::Arc;

use anyhow::Result;
use async_trait::async_trait;
use serde_json::{json, Value};
use tracing::{error, info};

use crate::store::IncidentRepository;

use super::{Tool, ToolOutput};

pub struct UnresolvedIncidentsTool {
    repo: Arc<dyn IncidentRepository>,
}

impl UnresolvedIncidentsTool {
    pub fn new(repo: Arc<dyn IncidentRepository>) -> Self {
        Self { repo }
    }
}

#[async_trait]
impl Tool for UnresolvedIncidentsTool {
    fn name(&self) -> String {
        "get_unresolved_incidents".to_string()
    }

    fn description(&self) -> String {
        "Get the list of unresolved bus stop incidents, including the stop address, \
         a description of the problem, and the evidence image locator."
            .to_string()
    }

    fn parameters(&self) -> Value {
        json!({
            "type": "object",
            "properties": {},
            "required": []
        })
    }

    async fn execute(&self, _params: Value) -> Result<ToolOutput> {
        info!("Getting the list of incidents");
        match self.repo.list_open().await {
            Ok(incidents) => {
                let summary = format!("{} unresolved incident(s)", incidents.len());
                Ok(ToolOutput::success(serde_json::to_value(&incidents)?, summary))
            }
            Err(e) => {
                error!("Incident query failed: {}", e);
                Ok(ToolOutput::failure(format!(
                    "Could not retrieve incidents: {e}"
                )))
            }
        }
    }
}
