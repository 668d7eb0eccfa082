//! Schedule Maintenance Tool
//!
//! The commit point of the whole engine: validates the planner's chosen
//! window against the scheduling rules, then transitions the incident
//! OPEN -> SCHEDULED with the decision record attached.
//!
//! A rejected window comes back as a "review" outcome with an
//! explanation the planner can repair, never as a crash or a write.

use std::sync::Arc;
use std::time::Duration;

use anyhow::Result;
use async_trait::async_trait;
use chrono::{DateTime, Utc};
use serde_json::{json, Value};
use tracing::{error, info, warn};

use crate::config::{BusinessHours, Config};
use crate::model::{ScheduleDecision, ScheduleOutcome};
use crate::store::ScheduleStore;
use crate::timeutil;

use super::{Tool, ToolOutput};

/// Scheduling rules lifted out of [`Config`].
#[derive(Debug, Clone)]
pub struct SchedulePolicy {
    pub min_lead_time: Duration,
    /// Maintenance windows start on this boundary.
    pub rounding: Duration,
    pub business_hours: BusinessHours,
}

impl SchedulePolicy {
    pub fn from_config(config: &Config) -> Self {
        Self {
            min_lead_time: config.min_lead_time,
            rounding: config.rounding,
            business_hours: config.business_hours,
        }
    }
}

/// Check a proposed start against the policy. Safety-critical work is
/// exempt from the business-hour calendar, nothing else.
fn validate_start(
    start: DateTime<Utc>,
    now: DateTime<Utc>,
    policy: &SchedulePolicy,
    safety_critical: bool,
) -> std::result::Result<(), String> {
    if !timeutil::on_boundary(start, policy.rounding) {
        return Err(format!(
            "Maintenance must start on a {}-minute boundary; the nearest is {}",
            policy.rounding.as_secs() / 60,
            timeutil::display(timeutil::round_to(start, policy.rounding))
        ));
    }
    let earliest = now + chrono::Duration::from_std(policy.min_lead_time).unwrap_or_default();
    if start < earliest {
        // Suggest the first boundary that actually clears the lead
        // time; rounding to the nearest could land below it.
        return Err(format!(
            "Maintenance must start at least {} minutes from now (no earlier than {})",
            policy.min_lead_time.as_secs() / 60,
            timeutil::display(timeutil::ceil_to(earliest, policy.rounding))
        ));
    }
    if !safety_critical && !timeutil::is_business_hours(start, &policy.business_hours) {
        return Err(format!(
            "Regular maintenance must fall on a weekday between {:02}:00 and {:02}:00; \
             only safety-critical work may go outside business hours",
            policy.business_hours.open_hour, policy.business_hours.close_hour
        ));
    }
    Ok(())
}

pub struct ScheduleMaintenanceTool {
    store: Arc<dyn ScheduleStore>,
    policy: SchedulePolicy,
}

impl ScheduleMaintenanceTool {
    pub fn new(store: Arc<dyn ScheduleStore>, policy: SchedulePolicy) -> Self {
        Self { store, policy }
    }

    fn outcome(outcome: ScheduleOutcome, detail: impl Into<String>) -> ToolOutput {
        let detail = detail.into();
        ToolOutput::success(
            json!({ "outcome": outcome.as_str(), "detail": detail }),
            detail,
        )
    }
}

#[async_trait]
impl Tool for ScheduleMaintenanceTool {
    fn name(&self) -> String {
        "schedule_maintenance".to_string()
    }

    fn description(&self) -> String {
        "Schedule a bus stop maintenance window and notify the crew supervisor. \
         Returns an outcome of 'success', 'failure', or 'review'."
            .to_string()
    }

    fn parameters(&self) -> Value {
        json!({
            "type": "object",
            "properties": {
                "bus_stop_id": {
                    "type": "string",
                    "description": "The id of the bus stop"
                },
                "maintenance_start": {
                    "type": "string",
                    "description": "Start of the maintenance window, e.g. '2025-07-09 15:00' (New York time) or RFC 3339"
                },
                "reason": {
                    "type": "string",
                    "description": "Why this bus stop and this time were selected"
                },
                "notification_subject": {
                    "type": "string",
                    "description": "Subject of the email to the crew supervisor"
                },
                "notification_content": {
                    "type": "string",
                    "description": "Body of the email to the crew supervisor"
                },
                "safety_critical": {
                    "type": "boolean",
                    "description": "Whether this incident is a safety concern; safety work is exempt from business hours"
                }
            },
            "required": ["bus_stop_id", "maintenance_start", "reason",
                         "notification_subject", "notification_content"]
        })
    }

    async fn execute(&self, params: Value) -> Result<ToolOutput> {
        let get = |key: &str| -> Option<String> {
            params.get(key).and_then(Value::as_str).map(str::to_string)
        };
        let (Some(bus_stop_id), Some(raw_start), Some(reason), Some(subject), Some(content)) = (
            get("bus_stop_id"),
            get("maintenance_start"),
            get("reason"),
            get("notification_subject"),
            get("notification_content"),
        ) else {
            return Ok(ToolOutput::failure(
                "schedule_maintenance requires bus_stop_id, maintenance_start, reason, \
                 notification_subject and notification_content",
            ));
        };
        let safety_critical = params
            .get("safety_critical")
            .and_then(Value::as_bool)
            .unwrap_or(false);

        info!(
            bus_stop = %bus_stop_id, start = %raw_start, reason = %reason,
            safety_critical, "Scheduling maintenance"
        );

        let Some(start) = timeutil::parse_start(&raw_start) else {
            return Ok(Self::outcome(
                ScheduleOutcome::Review,
                format!("Could not parse maintenance start '{raw_start}'"),
            ));
        };

        if let Err(detail) = validate_start(start, Utc::now(), &self.policy, safety_critical) {
            warn!(bus_stop = %bus_stop_id, "Rejected window: {}", detail);
            return Ok(Self::outcome(ScheduleOutcome::Review, detail));
        }

        let decision = ScheduleDecision {
            bus_stop_id: bus_stop_id.clone(),
            start,
            reason,
            notification_subject: subject,
            notification_body: content,
        };

        match self.store.schedule(&decision).await {
            Ok(0) => Ok(Self::outcome(
                ScheduleOutcome::Review,
                format!("No open incident found for bus stop '{bus_stop_id}'"),
            )),
            Ok(n) => {
                info!(bus_stop = %bus_stop_id, affected = n, "Maintenance scheduled");
                Ok(Self::outcome(
                    ScheduleOutcome::Success,
                    format!(
                        "Maintenance for '{}' scheduled at {}",
                        bus_stop_id,
                        timeutil::display(start)
                    ),
                ))
            }
            Err(e) => {
                error!(bus_stop = %bus_stop_id, "Scheduling commit failed: {}", e);
                Ok(ToolOutput {
                    success: false,
                    data: json!({ "outcome": ScheduleOutcome::Failure.as_str() }),
                    summary: format!("Error: {e}"),
                    error: Some(format!("Could not commit the schedule: {e}")),
                })
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::error::DataSourceError;
    use crate::store::MockStore;
    use chrono::{Datelike, TimeZone, Weekday};
    use chrono_tz::America::New_York;

    fn policy() -> SchedulePolicy {
        SchedulePolicy::from_config(&Config::default())
    }

    fn ny(y: i32, mo: u32, d: u32, h: u32, mi: u32) -> DateTime<Utc> {
        New_York
            .with_ymd_and_hms(y, mo, d, h, mi, 0)
            .unwrap()
            .with_timezone(&Utc)
    }

    // Wednesday morning, well inside business hours.
    fn wednesday_now() -> DateTime<Utc> {
        ny(2025, 7, 9, 10, 0)
    }

    #[test]
    fn accepts_a_rounded_business_hour_slot() {
        assert!(validate_start(ny(2025, 7, 9, 15, 0), wednesday_now(), &policy(), false).is_ok());
    }

    #[test]
    fn rejects_off_boundary_start() {
        let err =
            validate_start(ny(2025, 7, 9, 15, 45), wednesday_now(), &policy(), false).unwrap_err();
        assert!(err.contains("60-minute boundary"));
    }

    #[test]
    fn lead_time_suggestion_itself_clears_the_lead_time() {
        // Now 10:45, earliest start 11:15: the suggestion must be
        // 12:00, not 11:00 (which would be rejected on retry).
        let now = ny(2025, 7, 9, 10, 45);
        let err = validate_start(ny(2025, 7, 9, 11, 0), now, &policy(), false).unwrap_err();
        assert!(err.contains("12:00PM"), "unhelpful suggestion: {err}");
        assert!(!err.contains("11:00AM"));
    }

    #[test]
    fn rounding_granularity_comes_from_the_policy() {
        let half_hour = SchedulePolicy {
            rounding: Duration::from_secs(30 * 60),
            ..policy()
        };
        // 15:30 is a valid slot under a 30-minute granularity but not
        // under the default hour.
        let start = ny(2025, 7, 9, 15, 30);
        assert!(validate_start(start, wednesday_now(), &half_hour, false).is_ok());
        let err = validate_start(start, wednesday_now(), &policy(), false).unwrap_err();
        assert!(err.contains("60-minute boundary"));
    }

    #[test]
    fn rejects_start_under_the_lead_time() {
        // 10:00 -> 10:00 is on the boundary but violates the 30 min lead.
        let err =
            validate_start(ny(2025, 7, 9, 10, 0), wednesday_now(), &policy(), false).unwrap_err();
        assert!(err.contains("30 minutes"));
    }

    #[test]
    fn lead_time_boundary_is_inclusive() {
        // 11:00 is 60 min out; fine.
        assert!(validate_start(ny(2025, 7, 9, 11, 0), wednesday_now(), &policy(), false).is_ok());
    }

    #[test]
    fn regular_work_is_confined_to_business_hours() {
        // Saturday.
        let err =
            validate_start(ny(2025, 7, 12, 10, 0), wednesday_now(), &policy(), false).unwrap_err();
        assert!(err.contains("safety-critical"));
        // Weekday evening.
        assert!(validate_start(ny(2025, 7, 9, 18, 0), wednesday_now(), &policy(), false).is_err());
    }

    #[test]
    fn safety_work_is_exempt_from_business_hours() {
        assert!(validate_start(ny(2025, 7, 12, 10, 0), wednesday_now(), &policy(), true).is_ok());
        assert!(validate_start(ny(2025, 7, 9, 18, 0), wednesday_now(), &policy(), true).is_ok());
    }

    /// A start that is valid no matter when the test runs: the second
    /// Monday from now at 10:00 New York time.
    fn future_valid_start() -> String {
        let mut day = Utc::now().with_timezone(&New_York).date_naive() + chrono::Duration::days(8);
        while day.weekday() != Weekday::Mon {
            day += chrono::Duration::days(1);
        }
        format!("{} 10:00", day.format("%Y-%m-%d"))
    }

    fn schedule_params(bus_stop_id: &str) -> Value {
        json!({
            "bus_stop_id": bus_stop_id,
            "maintenance_start": future_valid_start(),
            "reason": "Broken glass is a safety concern",
            "notification_subject": "Bus stop maintenance required",
            "notification_content": "Crew dispatch requested.",
        })
    }

    #[tokio::test]
    async fn commits_through_the_store_and_reports_success() {
        let tool = ScheduleMaintenanceTool::new(Arc::new(MockStore::new()), policy());
        let output = tool.execute(schedule_params("stop-1")).await.unwrap();
        assert!(output.success);
        assert_eq!(output.data["outcome"], "success");
    }

    struct ZeroRowStore;

    #[async_trait]
    impl ScheduleStore for ZeroRowStore {
        async fn schedule(&self, _decision: &ScheduleDecision) -> Result<u64, DataSourceError> {
            Ok(0)
        }
    }

    #[tokio::test]
    async fn zero_affected_rows_is_a_review_not_a_success() {
        let tool = ScheduleMaintenanceTool::new(Arc::new(ZeroRowStore), policy());
        let output = tool.execute(schedule_params("stop-404")).await.unwrap();
        assert!(output.success);
        assert_eq!(output.data["outcome"], "review");
        assert!(output.summary.contains("No open incident"));

        // Idempotent: a second attempt still schedules nothing and
        // still does not claim success.
        let again = tool.execute(schedule_params("stop-404")).await.unwrap();
        assert_eq!(again.data["outcome"], "review");
    }

    struct FailingStore;

    #[async_trait]
    impl ScheduleStore for FailingStore {
        async fn schedule(&self, _decision: &ScheduleDecision) -> Result<u64, DataSourceError> {
            Err(DataSourceError::Query("quota exceeded".to_string()))
        }
    }

    #[tokio::test]
    async fn write_failure_surfaces_as_failure_outcome() {
        let tool = ScheduleMaintenanceTool::new(Arc::new(FailingStore), policy());
        let output = tool.execute(schedule_params("stop-1")).await.unwrap();
        assert!(!output.success);
        assert_eq!(output.data["outcome"], "failure");
        assert!(output.error.unwrap().contains("quota exceeded"));
    }

    #[tokio::test]
    async fn unparseable_start_asks_for_review() {
        let tool = ScheduleMaintenanceTool::new(Arc::new(MockStore::new()), policy());
        let mut params = schedule_params("stop-1");
        params["maintenance_start"] = json!("sometime soon");
        let output = tool.execute(params).await.unwrap();
        assert_eq!(output.data["outcome"], "review");
    }

    #[tokio::test]
    async fn missing_parameters_are_a_failure_payload() {
        let tool = ScheduleMaintenanceTool::new(Arc::new(MockStore::new()), policy());
        let output = tool.execute(json!({"bus_stop_id": "stop-1"})).await.unwrap();
        assert!(!output.success);
    }
}
