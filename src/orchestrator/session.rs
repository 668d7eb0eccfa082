//! Per-session state.
//!
//! Everything mutable that a planner conversation owns lives here and
//! is passed explicitly into each operation; the orchestrator itself
//! holds no cross-call state.

use serde::{Deserialize, Serialize};
use uuid::Uuid;

use crate::config::Config;
use crate::safety::RateLimiter;

/// A supplementary artifact collected for the session, typically an
/// evidence photo attached after an incident listing.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ArtifactRef {
    pub name: String,
    pub uri: String,
    pub mime_type: String,
}

/// State owned by one planner conversation.
pub struct SessionContext {
    pub conversation_id: Uuid,
    /// Rolling-window limiter for this session's outbound planning calls.
    pub limiter: RateLimiter,
    artifacts: Vec<ArtifactRef>,
}

impl SessionContext {
    pub fn new(config: &Config) -> Self {
        Self {
            conversation_id: Uuid::new_v4(),
            limiter: RateLimiter::new(config.rate_window, config.rate_quota),
            artifacts: Vec::new(),
        }
    }

    pub fn attach(&mut self, artifact: ArtifactRef) {
        self.artifacts.push(artifact);
    }

    pub fn artifacts(&self) -> &[ArtifactRef] {
        &self.artifacts
    }
}
