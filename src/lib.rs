//! Maintenance Decision-Support Engine
//!
//! Deterministic core behind a bus-stop maintenance scheduling agency:
//! - Incident and ridership-forecast retrieval over the warehouse
//! - Call-rate discipline for the upstream planning model
//! - Weekend / business-hour eligibility for repair windows
//! - Transactional OPEN -> SCHEDULED commits with a decision record
//!
//! The natural-language planner that decides *which* incident to fix
//! and *when* is an external collaborator; it invokes these operations
//! as tools and renders the structured results into prose.

pub mod config;
pub mod error;
pub mod model;
pub mod orchestrator;
pub mod planner;
pub mod safety;
pub mod store;
pub mod timeutil;
pub mod tools;

// Re-exports for convenience
pub use config::{Config, Mode};
pub use orchestrator::{Orchestrator, SessionContext};
pub use planner::PlannerGateway;
pub use tools::{ToolCall, ToolOutput, ToolRegistry};
