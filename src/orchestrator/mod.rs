//! Decision Orchestrator
//!
//! The façade the external planner talks to. Wires the repositories
//! (live or mock, decided once from configuration) into the tool
//! registry, dispatches calls under a deadline, and runs the
//! feature-flagged post-tool artifact hook.
//!
//! Priority ordering of incidents is deliberately NOT here: the planner
//! ranks; this core only supplies complete, correctly-filtered data.

mod session;

pub use session::{ArtifactRef, SessionContext};

use std::sync::Arc;

use tokio::time::timeout;
use tracing::{debug, error, warn};

use crate::config::{Config, Mode};
use crate::error::DataSourceError;
use crate::store::{MockStore, WarehouseStore};
use crate::tools::{
    CurrentTimeTool, ImageUrlTool, PassengerForecastTool, ScheduleMaintenanceTool,
    SchedulePolicy, ToolCall, ToolOutput, ToolRegistry, UnresolvedIncidentsTool, WeekendCheckTool,
};

pub struct Orchestrator {
    registry: ToolRegistry,
    config: Config,
}

impl Orchestrator {
    /// Build the full capability surface for the configured mode.
    pub async fn new(config: Config) -> Self {
        let registry = ToolRegistry::new();
        let policy = SchedulePolicy::from_config(&config);

        match config.mode {
            Mode::Mock => {
                let store = Arc::new(MockStore::new());
                registry
                    .register_instance(UnresolvedIncidentsTool::new(store.clone()))
                    .await;
                registry
                    .register_instance(PassengerForecastTool::new(store.clone()))
                    .await;
                registry
                    .register_instance(ScheduleMaintenanceTool::new(store, policy))
                    .await;
            }
            Mode::Live => {
                let store = Arc::new(WarehouseStore::new(&config));
                registry
                    .register_instance(UnresolvedIncidentsTool::new(store.clone()))
                    .await;
                registry
                    .register_instance(PassengerForecastTool::new(store.clone()))
                    .await;
                registry
                    .register_instance(ScheduleMaintenanceTool::new(store, policy))
                    .await;
            }
        }
        registry.register_instance(CurrentTimeTool).await;
        registry.register_instance(WeekendCheckTool).await;
        registry
            .register_instance(ImageUrlTool::new(config.storage_host.clone()))
            .await;

        Self { registry, config }
    }

    pub fn config(&self) -> &Config {
        &self.config
    }

    pub fn registry(&self) -> &ToolRegistry {
        &self.registry
    }

    /// Start a fresh conversation-scoped context.
    pub fn open_session(&self) -> SessionContext {
        SessionContext::new(&self.config)
    }

    /// Execute one tool call for a session. Every failure mode comes
    /// back as a failure payload; the planning loop never crashes here.
    pub async fn dispatch(&self, session: &mut SessionContext, call: &ToolCall) -> ToolOutput {
        debug!(conversation = %session.conversation_id, tool = %call.name, "Dispatching tool call");

        let output = match timeout(self.config.repo_deadline, self.registry.execute(call)).await {
            Ok(Ok(output)) => output,
            Ok(Err(e)) => {
                error!(tool = %call.name, "Tool execution error: {:#}", e);
                ToolOutput::failure(format!("Tool '{}' failed: {e}", call.name))
            }
            Err(_) => {
                warn!(tool = %call.name, "Tool call hit the repository deadline");
                ToolOutput::failure(
                    DataSourceError::Timeout(self.config.repo_deadline).to_string(),
                )
            }
        };

        self.after_tool(session, call, &output);
        output
    }

    /// Post-tool hook: collect evidence images into the session after a
    /// successful incident listing. Off by default.
    fn after_tool(&self, session: &mut SessionContext, call: &ToolCall, output: &ToolOutput) {
        debug!(tool = %call.name, "After tool");
        if !self.config.attach_artifacts {
            return;
        }
        if call.name != "get_unresolved_incidents" || !output.success {
            return;
        }
        let Some(incidents) = output.data.as_array() else {
            return;
        };
        for incident in incidents {
            let id = incident["bus_stop"]["id"].as_str();
            let uri = incident["image_uri"].as_str();
            let mime = incident["image_mime_type"].as_str();
            if let (Some(id), Some(uri), Some(mime)) = (id, uri, mime) {
                debug!(bus_stop = id, "Adding evidence artifact");
                session.attach(ArtifactRef {
                    name: format!("image-{id}"),
                    uri: uri.to_string(),
                    mime_type: mime.to_string(),
                });
            }
        }
    }
}
