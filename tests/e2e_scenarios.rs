//! End-to-end mock-mode scenario: the tool sequence a planner session
//! walks through when triaging the two fixture incidents.

use chrono::{Datelike, Weekday};
use chrono_tz::America::New_York;
use serde_json::json;

use transit_agency::{Config, Orchestrator, ToolCall};

fn call(name: &str, parameters: serde_json::Value) -> ToolCall {
    ToolCall {
        name: name.to_string(),
        parameters,
    }
}

/// A start slot that is valid whenever the test runs: the second
/// Monday from now, 10:00 New York time.
fn valid_slot() -> String {
    let mut day = chrono::Utc::now().with_timezone(&New_York).date_naive() + chrono::Duration::days(8);
    while day.weekday() != Weekday::Mon {
        day += chrono::Duration::days(1);
    }
    format!("{} 10:00", day.format("%Y-%m-%d"))
}

#[tokio::test]
async fn planner_session_over_the_fixture_incidents() {
    let orchestrator = Orchestrator::new(Config::default()).await;
    let mut session = orchestrator.open_session();

    // 1. What time is it?
    let now = orchestrator
        .dispatch(&mut session, &call("get_current_time", json!({})))
        .await;
    assert!(now.success);

    // 2. What is broken?
    let incidents = orchestrator
        .dispatch(&mut session, &call("get_unresolved_incidents", json!({})))
        .await;
    assert!(incidents.success);
    let listing = incidents.data.as_array().unwrap();
    assert_eq!(listing.len(), 2);
    let ids: Vec<&str> = listing
        .iter()
        .map(|i| i["bus_stop"]["id"].as_str().unwrap())
        .collect();
    assert_eq!(ids, ["stop-1", "stop-2"]);
    assert!(listing.iter().all(|i| i["status"] == "open"));

    // 3. How busy are those stops going to be?
    let forecast = orchestrator
        .dispatch(
            &mut session,
            &call(
                "get_expected_number_of_passengers",
                json!({ "bus_stop_ids": ids }),
            ),
        )
        .await;
    assert!(forecast.success);
    assert!(!forecast.data["stop-1"].as_array().unwrap().is_empty());
    assert!(!forecast.data["stop-2"].as_array().unwrap().is_empty());

    // 4. Evidence photo for the report.
    let image = orchestrator
        .dispatch(
            &mut session,
            &call(
                "get_image_url",
                json!({ "locator": listing[0]["image_uri"] }),
            ),
        )
        .await;
    assert!(image.success);
    assert!(image
        .data
        .as_str()
        .unwrap()
        .starts_with("https://storage.cloud.google.com/"));

    // 5. Commit the decision for the safety-flagged stop.
    let schedule = orchestrator
        .dispatch(
            &mut session,
            &call(
                "schedule_maintenance",
                json!({
                    "bus_stop_id": "stop-1",
                    "maintenance_start": valid_slot(),
                    "reason": "Broken glass is a safety concern and needs to be cleaned right away.",
                    "notification_subject": "Bus stop stop-1 maintenance required",
                    "notification_content": "Please dispatch a crew.",
                    "safety_critical": true,
                }),
            ),
        )
        .await;
    assert!(schedule.success);
    assert_eq!(schedule.data["outcome"], "success");

    // 6. Mock mode never mutates the store: both incidents stay OPEN.
    let relisted = orchestrator
        .dispatch(&mut session, &call("get_unresolved_incidents", json!({})))
        .await;
    let relisting = relisted.data.as_array().unwrap();
    assert_eq!(relisting.len(), 2);
    assert!(relisting
        .iter()
        .any(|i| i["bus_stop"]["id"] == "stop-2" && i["status"] == "open"));
}

#[tokio::test]
async fn weekend_slot_for_regular_work_needs_review() {
    let orchestrator = Orchestrator::new(Config::default()).await;
    let mut session = orchestrator.open_session();

    // Find the second Saturday from now; a valid boundary and lead
    // time, but outside the weekday calendar.
    let mut day = chrono::Utc::now().with_timezone(&New_York).date_naive() + chrono::Duration::days(8);
    while day.weekday() != Weekday::Sat {
        day += chrono::Duration::days(1);
    }
    let saturday_slot = format!("{} 10:00", day.format("%Y-%m-%d"));

    let output = orchestrator
        .dispatch(
            &mut session,
            &call(
                "schedule_maintenance",
                json!({
                    "bus_stop_id": "stop-2",
                    "maintenance_start": saturday_slot,
                    "reason": "Routine cleaning",
                    "notification_subject": "Bus stop stop-2 maintenance",
                    "notification_content": "Please dispatch a crew.",
                }),
            ),
        )
        .await;
    assert!(output.success);
    assert_eq!(output.data["outcome"], "review");
}
