//! Runtime configuration for the agency.
//!
//! Every field has a default so mock mode runs with zero configuration;
//! live deployments override through environment variables (loaded from
//! `.env` by the binary).

use std::env;
use std::time::Duration;

use serde::{Deserialize, Serialize};
use tracing::warn;

/// Operating mode of the repositories and the committer.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Mode {
    /// Query and update the real warehouse.
    Live,
    /// Deterministic fixtures and synthetic forecasts; writes touch nothing.
    Mock,
}

/// Business-hour calendar for regular (non-safety) maintenance windows.
/// Holidays are an external input and not modeled here.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct BusinessHours {
    /// First hour of the working day, inclusive.
    pub open_hour: u32,
    /// End of the working day, exclusive.
    pub close_hour: u32,
}

impl Default for BusinessHours {
    fn default() -> Self {
        Self {
            open_hour: 8,
            close_hour: 16,
        }
    }
}

/// Configuration for the decision-support core.
#[derive(Debug, Clone)]
pub struct Config {
    pub mode: Mode,
    /// Project that owns the warehouse datasets.
    pub data_project: String,
    /// Project queries are billed against. Falls back to `data_project`.
    pub compute_project: String,
    /// Base URL of the warehouse query API (live mode only).
    pub warehouse_endpoint: String,
    /// Public host serving evidence images.
    pub storage_host: String,
    /// Rolling window of the outbound planning-call limiter.
    pub rate_window: Duration,
    /// Calls permitted per rolling window.
    pub rate_quota: u32,
    /// A maintenance window never starts earlier than now plus this.
    pub min_lead_time: Duration,
    /// Maintenance windows start on this boundary.
    pub rounding: Duration,
    pub business_hours: BusinessHours,
    /// Forecast steps requested from the warehouse model. Fixed, never
    /// caller-supplied.
    pub forecast_horizon: u32,
    pub confidence_level: f64,
    /// Caller-side deadline around every repository call.
    pub repo_deadline: Duration,
    /// Attach evidence images to the session after listing incidents.
    pub attach_artifacts: bool,
}

impl Default for Config {
    fn default() -> Self {
        Self {
            mode: Mode::Mock,
            data_project: "transit-demo".to_string(),
            compute_project: "transit-demo".to_string(),
            warehouse_endpoint: "http://localhost:9050".to_string(),
            storage_host: "https://storage.cloud.google.com".to_string(),
            rate_window: Duration::from_secs(60),
            rate_quota: 10,
            min_lead_time: Duration::from_secs(30 * 60),
            rounding: Duration::from_secs(60 * 60),
            business_hours: BusinessHours::default(),
            forecast_horizon: 500,
            confidence_level: 0.8,
            repo_deadline: Duration::from_secs(30),
            attach_artifacts: false,
        }
    }
}

impl Config {
    /// Build the configuration from the environment, falling back to
    /// defaults for anything unset or unparseable.
    pub fn from_env() -> Self {
        let mut cfg = Self::default();

        if let Ok(mode) = env::var("AGENCY_MODE") {
            match mode.to_ascii_lowercase().as_str() {
                "live" => cfg.mode = Mode::Live,
                "mock" => cfg.mode = Mode::Mock,
                other => warn!("Unknown AGENCY_MODE '{}', staying in mock mode", other),
            }
        }
        if let Ok(v) = env::var("DATA_PROJECT") {
            cfg.data_project = v.clone();
            cfg.compute_project = v;
        }
        if let Ok(v) = env::var("COMPUTE_PROJECT") {
            cfg.compute_project = v;
        }
        if let Ok(v) = env::var("WAREHOUSE_ENDPOINT") {
            cfg.warehouse_endpoint = v;
        }
        if let Ok(v) = env::var("STORAGE_HOST") {
            cfg.storage_host = v;
        }
        if let Some(v) = env_u64("RATE_WINDOW_SECS") {
            cfg.rate_window = Duration::from_secs(v);
        }
        if let Some(v) = env_u64("RATE_QUOTA") {
            cfg.rate_quota = v as u32;
        }
        if let Some(v) = env_u64("REPO_DEADLINE_SECS") {
            cfg.repo_deadline = Duration::from_secs(v);
        }
        if let Ok(v) = env::var("ATTACH_ARTIFACTS") {
            cfg.attach_artifacts = matches!(v.to_ascii_lowercase().as_str(), "1" | "true" | "yes");
        }

        cfg
    }

    pub fn is_mock(&self) -> bool {
        self.mode == Mode::Mock
    }
}

fn env_u64(key: &str) -> Option<u64> {
    match env::var(key) {
        Ok(raw) => match raw.parse() {
            Ok(v) => Some(v),
            Err(_) => {
                warn!("Ignoring unparseable {}='{}'", key, raw);
                None
            }
        },
        Err(_) => None,
    }
}
