//! Planner Gateway
//!
//! Every outbound planning call passes through here: message fragments
//! are normalized for provider compatibility, then the session's rate
//! limiter is consulted before the request leaves the process.

mod provider;

pub use provider::{LlmProvider, OpenAICompatibleProvider};

use std::sync::Arc;

use anyhow::Result;

use crate::safety::RateLimiter;

/// Wraps an [`LlmProvider`] with call-rate discipline.
pub struct PlannerGateway {
    provider: Arc<dyn LlmProvider>,
}

impl PlannerGateway {
    pub fn new(provider: Arc<dyn LlmProvider>) -> Self {
        Self { provider }
    }

    /// Send one planning request, borrowing the calling session's
    /// limiter. May suspend for the remainder of the rate window; a
    /// provider failure propagates to the caller untouched.
    pub async fn generate(
        &self,
        limiter: &mut RateLimiter,
        model: &str,
        mut prompt: String,
        mut system: Option<String>,
    ) -> Result<String> {
        // The upstream provider rejects empty text segments. Not a
        // business rule; kept for wire compatibility.
        if prompt.is_empty() {
            prompt = " ".to_string();
        }
        if let Some(sys) = system.as_mut() {
            if sys.is_empty() {
                *sys = " ".to_string();
            }
        }

        limiter.acquire().await;
        self.provider.generate(model, prompt, system).await
    }
}
