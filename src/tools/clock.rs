//! Clock tools: current time in the operating zone and weekend
//! classification for a calendar date.

use anyhow::Result;
use async_trait::async_trait;
use serde_json::{json, Value};
use tracing::info;

use crate::timeutil;

use super::{Tool, ToolOutput};

/// Reports the current time in New York, NY, USA.
#[derive(Default)]
pub struct CurrentTimeTool;

#[async_trait]
impl Tool for CurrentTimeTool {
    fn name(&self) -> String {
        "get_current_time".to_string()
    }

    fn description(&self) -> String {
        "Get the current time in New York, NY, USA, e.g. 'Mon 28 Apr 2025, 12:41PM'".to_string()
    }

    fn parameters(&self) -> Value {
        json!({
            "type": "object",
            "properties": {},
            "required": []
        })
    }

    async fn execute(&self, _params: Value) -> Result<ToolOutput> {
        info!("Getting current time");
        Ok(ToolOutput::success_str(timeutil::current_time()))
    }
}

/// Classifies a calendar date as weekend or weekday.
#[derive(Default)]
pub struct WeekendCheckTool;

#[async_trait]
impl Tool for WeekendCheckTool {
    fn name(&self) -> String {
        "is_time_on_weekend".to_string()
    }

    fn description(&self) -> String {
        "Check whether a calendar date falls on a Saturday or Sunday".to_string()
    }

    fn parameters(&self) -> Value {
        json!({
            "type": "object",
            "properties": {
                "day": { "type": "integer", "description": "Day of the month (1-31)" },
                "month": { "type": "integer", "description": "Month (1-12)" },
                "year": { "type": "integer", "description": "Four-digit year" }
            },
            "required": ["day", "month", "year"]
        })
    }

    async fn execute(&self, params: Value) -> Result<ToolOutput> {
        let (Some(day), Some(month), Some(year)) = (
            params.get("day").and_then(Value::as_u64),
            params.get("month").and_then(Value::as_u64),
            params.get("year").and_then(Value::as_i64),
        ) else {
            return Ok(ToolOutput::failure(
                "is_time_on_weekend requires integer day, month, and year",
            ));
        };
        let (Ok(day), Ok(month), Ok(year)) = (
            u32::try_from(day),
            u32::try_from(month),
            i32::try_from(year),
        ) else {
            return Ok(ToolOutput::failure(format!(
                "is_time_on_weekend arguments out of range: day={day}, month={month}, year={year}"
            )));
        };

        // An impossible date is a planner defect; the error is loud in
        // the library and a failure payload at this boundary so the
        // conversation can continue.
        match timeutil::is_weekend(day, month, year) {
            Ok(weekend) => Ok(ToolOutput::success(
                json!(weekend),
                format!(
                    "{:04}-{:02}-{:02} is {}a weekend day",
                    year,
                    month,
                    day,
                    if weekend { "" } else { "not " }
                ),
            )),
            Err(e) => Ok(ToolOutput::failure(e.to_string())),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[tokio::test]
    async fn current_time_tool_returns_display_format() {
        let tool = CurrentTimeTool;
        let output = tool.execute(json!({})).await.unwrap();
        assert!(output.success);
        let re = regex::Regex::new(
            r"^(Mon|Tue|Wed|Thu|Fri|Sat|Sun) \d{2} \w{3} \d{4}, \d{2}:\d{2}(AM|PM)$",
        )
        .unwrap();
        assert!(re.is_match(output.data.as_str().unwrap()));
    }

    #[tokio::test]
    async fn weekend_tool_classifies_dates() {
        let tool = WeekendCheckTool;
        let saturday = tool
            .execute(json!({"day": 12, "month": 7, "year": 2025}))
            .await
            .unwrap();
        assert_eq!(saturday.data, json!(true));

        let wednesday = tool
            .execute(json!({"day": 9, "month": 7, "year": 2025}))
            .await
            .unwrap();
        assert_eq!(wednesday.data, json!(false));
    }

    #[tokio::test]
    async fn impossible_date_fails_at_the_boundary() {
        let tool = WeekendCheckTool;
        let output = tool
            .execute(json!({"day": 30, "month": 2, "year": 2025}))
            .await
            .unwrap();
        assert!(!output.success);
        assert!(output.error.unwrap().contains("no such calendar date"));
    }

    #[tokio::test]
    async fn oversized_arguments_are_rejected_not_truncated() {
        let tool = WeekendCheckTool;
        // 2^32 + 1 would silently wrap to day 1 under a plain cast.
        let output = tool
            .execute(json!({"day": 4294967297u64, "month": 7, "year": 2025}))
            .await
            .unwrap();
        assert!(!output.success);
        assert!(output.error.unwrap().contains("out of range"));

        let output = tool
            .execute(json!({"day": 12, "month": 7, "year": 9223372036854775807i64}))
            .await
            .unwrap();
        assert!(!output.success);
    }

    #[tokio::test]
    async fn missing_arguments_fail_at_the_boundary() {
        let tool = WeekendCheckTool;
        let output = tool.execute(json!({"day": 5})).await.unwrap();
        assert!(!output.success);
    }
}
