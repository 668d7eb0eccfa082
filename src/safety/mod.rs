//! Safety Module
//!
//! Call-rate discipline for outbound planning requests. Each planner
//! session owns its own limiter; there is no process-wide state.

mod rate_limiter;

pub use rate_limiter::RateLimiter;
