//! Live store over the warehouse's HTTP query API.
//!
//! One client serves all three repository traits. Queries are always
//! parameterized; the dataset-owning project (`data_project`) and the
//! billing project (`compute_project`) are deliberately separate, as
//! the upstream ingestion pipeline provisions them that way.

use std::collections::HashMap;

use async_trait::async_trait;
use chrono::{DateTime, Utc};
use reqwest::Client;
use serde::Deserialize;
use serde_json::{json, Value};
use tracing::{debug, info};

use crate::config::Config;
use crate::error::DataSourceError;
use crate::model::{
    BusStop, ForecastPoint, Incident, IncidentStatus, ScheduleDecision, UsAddress,
};

use super::{ForecastRepository, IncidentRepository, ScheduleStore};

const DATASET: &str = "bus_stop_image_processing";

pub struct WarehouseStore {
    client: Client,
    endpoint: String,
    data_project: String,
    compute_project: String,
    forecast_horizon: u32,
    confidence_level: f64,
}

#[derive(Debug, Deserialize)]
struct QueryResponse {
    #[serde(default)]
    rows: Vec<Value>,
    #[serde(default)]
    affected_rows: Option<u64>,
    #[serde(default)]
    error: Option<ApiError>,
}

#[derive(Debug, Deserialize)]
struct ApiError {
    message: String,
}

impl WarehouseStore {
    pub fn new(config: &Config) -> Self {
        Self {
            client: Client::new(),
            endpoint: config.warehouse_endpoint.trim_end_matches('/').to_string(),
            data_project: config.data_project.clone(),
            compute_project: config.compute_project.clone(),
            forecast_horizon: config.forecast_horizon,
            confidence_level: config.confidence_level,
        }
    }

    fn table(&self, name: &str) -> String {
        format!("`{}.{}.{}`", self.data_project, DATASET, name)
    }

    /// Run one parameterized statement against the query API, billed to
    /// the compute project.
    async fn query(&self, sql: String, params: Value) -> Result<QueryResponse, DataSourceError> {
        debug!(project = %self.compute_project, "Issuing warehouse query");
        let url = format!("{}/projects/{}/queries", self.endpoint, self.compute_project);
        let response = self
            .client
            .post(&url)
            .json(&json!({ "query": sql, "parameters": params }))
            .send()
            .await?
            .error_for_status()?;

        let body: QueryResponse = response.json().await?;
        if let Some(err) = body.error {
            return Err(DataSourceError::Query(err.message));
        }
        Ok(body)
    }
}

fn str_field(row: &Value, name: &str) -> Result<String, DataSourceError> {
    row.get(name)
        .and_then(Value::as_str)
        .map(str::to_string)
        .ok_or_else(|| DataSourceError::Schema(format!("missing string column '{name}'")))
}

fn opt_str_field(row: &Value, name: &str) -> String {
    row.get(name)
        .and_then(Value::as_str)
        .unwrap_or_default()
        .to_string()
}

fn address_field(row: &Value) -> Result<UsAddress, DataSourceError> {
    let address = row
        .get("address")
        .filter(|v| v.is_object())
        .ok_or_else(|| DataSourceError::Schema("missing address record".to_string()))?;
    Ok(UsAddress {
        street: str_field(address, "street")?,
        city: str_field(address, "city")?,
        state: str_field(address, "state")?,
        zip: str_field(address, "zip")?,
    })
}

fn timestamp_field(row: &Value, name: &str) -> Result<DateTime<Utc>, DataSourceError> {
    let raw = str_field(row, name)?;
    DateTime::parse_from_rfc3339(&raw)
        .map(|dt| dt.with_timezone(&Utc))
        .map_err(|e| DataSourceError::Schema(format!("bad timestamp in '{name}': {e}")))
}

fn count_field(row: &Value, name: &str) -> Result<u32, DataSourceError> {
    let raw = row
        .get(name)
        .and_then(Value::as_i64)
        .ok_or_else(|| DataSourceError::Schema(format!("missing numeric column '{name}'")))?;
    u32::try_from(raw)
        .map_err(|_| DataSourceError::Schema(format!("negative passenger count in '{name}'")))
}

#[async_trait]
impl IncidentRepository for WarehouseStore {
    async fn list_open(&self) -> Result<Vec<Incident>, DataSourceError> {
        info!("Querying unresolved incidents");
        let sql = format!(
            "SELECT incidents.bus_stop_id, incidents.status, \
             reports.uri AS image_uri, reports.content_type AS image_mime_type, \
             reports.description, bus_stops.address \
             FROM {incidents} incidents \
             JOIN {reports} reports ON incidents.open_report_id = reports.report_id \
             JOIN {stops} bus_stops ON incidents.bus_stop_id = bus_stops.bus_stop_id \
             WHERE incidents.status = 'OPEN'",
            incidents = self.table("incidents"),
            reports = self.table("image_reports"),
            stops = self.table("bus_stops"),
        );

        let body = self.query(sql, json!({})).await?;
        let mut result = Vec::with_capacity(body.rows.len());
        for row in &body.rows {
            let status_raw = str_field(row, "status")?;
            let status = IncidentStatus::parse(&status_raw).ok_or_else(|| {
                DataSourceError::Schema(format!("unknown incident status '{status_raw}'"))
            })?;
            result.push(Incident {
                bus_stop: BusStop {
                    id: str_field(row, "bus_stop_id")?,
                    address: address_field(row)?,
                },
                image_uri: str_field(row, "image_uri")?,
                image_mime_type: str_field(row, "image_mime_type")?,
                description: opt_str_field(row, "description"),
                status,
            });
        }
        Ok(result)
    }
}

#[async_trait]
impl ForecastRepository for WarehouseStore {
    async fn forecast(
        &self,
        bus_stop_ids: &[String],
    ) -> Result<HashMap<String, Vec<ForecastPoint>>, DataSourceError> {
        info!(stops = ?bus_stop_ids, "Querying ridership forecast");
        let sql = format!(
            "WITH forecast AS ( \
               SELECT bus_stop_id, forecast_timestamp, \
                      CAST(forecast_value AS INT64) AS expected_number_of_passengers \
               FROM AI.FORECAST( \
                 (SELECT bus_stop_id, event_ts, num_riders FROM {ridership} \
                  WHERE bus_stop_id IN UNNEST(@bus_stop_ids)), \
                 data_col => 'num_riders', timestamp_col => 'event_ts', \
                 id_cols => ['bus_stop_id'], \
                 horizon => {horizon}, confidence_level => {confidence}) \
             ) \
             SELECT bus_stop_id, forecast_timestamp, expected_number_of_passengers \
             FROM forecast WHERE forecast_timestamp > CURRENT_TIMESTAMP()",
            ridership = self.table("bus_ridership"),
            horizon = self.forecast_horizon,
            confidence = self.confidence_level,
        );

        let body = self
            .query(sql, json!({ "bus_stop_ids": bus_stop_ids }))
            .await?;

        // Stops without data still come back as (empty) entries.
        let mut result: HashMap<String, Vec<ForecastPoint>> = bus_stop_ids
            .iter()
            .map(|id| (id.clone(), Vec::new()))
            .collect();
        for row in &body.rows {
            let id = str_field(row, "bus_stop_id")?;
            let point = ForecastPoint {
                time: timestamp_field(row, "forecast_timestamp")?,
                passengers: count_field(row, "expected_number_of_passengers")?,
            };
            result.entry(id).or_default().push(point);
        }
        Ok(result)
    }
}

#[async_trait]
impl ScheduleStore for WarehouseStore {
    async fn schedule(&self, decision: &ScheduleDecision) -> Result<u64, DataSourceError> {
        info!(
            bus_stop = %decision.bus_stop_id,
            start = %decision.start,
            "Committing scheduling decision"
        );
        // The predicate keeps the transition atomic and idempotent: a
        // second writer finds no OPEN row once the first commits.
        let sql = format!(
            "UPDATE {incidents} SET status = 'SCHEDULED', \
             maintenance_details = STRUCT( \
               @maintenance_start AS scheduled_time, \
               @reason AS reason, \
               @notification_subject AS notification_subject, \
               @notification_content AS notification_body) \
             WHERE status = 'OPEN' AND bus_stop_id = @bus_stop_id",
            incidents = self.table("incidents"),
        );
        let params = json!({
            "bus_stop_id": decision.bus_stop_id,
            "maintenance_start": decision.start.to_rfc3339(),
            "reason": decision.reason,
            "notification_subject": decision.notification_subject,
            "notification_content": decision.notification_body,
        });

        let body = self.query(sql, params).await?;
        Ok(body.affected_rows.unwrap_or(0))
    }
}
