//! HTTP request handlers for API endpoints

use axum::{
    extract::{Query, State},
    Json,
};
use serde::{Deserialize, Serialize};
use serde_json::{json, Value};
use std::sync::Arc;

use super::error::ApiError;
use super::state::AppState;
use crate::interval::YearInterval;
use crate::records::Yearly;
use crate::report::Report;

/// Health check endpoint
///
/// Returns a simple status response to verify the server is running
pub async fn health_check() -> Json<Value> {
    Json(json!({
        "status": "ok"
    }))
}

/// Response for dataset listing
#[derive(Debug, Serialize)]
pub struct DatasetsResponse {
    pub datasets: Vec<DatasetInfo>,
    /// First year covered by any dataset; the UI uses this pair to bound
    /// its interval slider.
    pub first_year: Option<i32>,
    /// Last year covered by any dataset.
    pub last_year: Option<i32>,
}

/// Information about a single loaded dataset
#[derive(Debug, Serialize)]
pub struct DatasetInfo {
    pub name: String,
    pub rows: usize,
    pub first_year: Option<i32>,
    pub last_year: Option<i32>,
}

fn year_span<T: Yearly>(rows: &[T]) -> Option<(i32, i32)> {
    rows.iter().map(Yearly::year).fold(None, |span, year| {
        Some(match span {
            None => (year, year),
            Some((first, last)) => (first.min(year), last.max(year)),
        })
    })
}

fn dataset_info<T: Yearly>(name: &str, rows: &[T]) -> DatasetInfo {
    let span = year_span(rows);
    DatasetInfo {
        name: name.to_string(),
        rows: rows.len(),
        first_year: span.map(|s| s.0),
        last_year: span.map(|s| s.1),
    }
}

/// GET /datasets - Describe the loaded source tables
pub async fn list_datasets(State(state): State<Arc<AppState>>) -> Json<DatasetsResponse> {
    let tables = state.engine.tables();

    let datasets = vec![
        dataset_info("disaster_data", tables.disasters()),
        dataset_info("agriculture_data", tables.agriculture()),
        dataset_info("data_science_job_salaries", tables.salaries()),
    ];
    let domain = tables.year_domain();

    Json(DatasetsResponse {
        datasets,
        first_year: domain.map(|d| d.0),
        last_year: domain.map(|d| d.1),
    })
}

/// Query parameters for the report endpoint
#[derive(Debug, Deserialize)]
pub struct ReportQueryParams {
    pub start: String,
    pub end: String,
}

fn parse_year(name: &str, raw: &str) -> Result<i32, ApiError> {
    raw.trim()
        .parse::<i32>()
        .map_err(|_| ApiError::InvalidParameter(format!("Invalid {} year: '{}'", name, raw)))
}

/// GET /report - Recompute all four views for a year interval
///
/// Both bounds are inclusive. A start year after the end year is not
/// rejected; it selects no rows and yields an empty report.
pub async fn get_report(
    State(state): State<Arc<AppState>>,
    Query(params): Query<ReportQueryParams>,
) -> Result<Json<Report>, ApiError> {
    let start = parse_year("start", &params.start)?;
    let end = parse_year("end", &params.end)?;

    let report = state.engine.recompute(YearInterval::new(start, end))?;
    Ok(Json(report))
}
