//! The interval-driven recomputation pipeline.
//!
//! [`ReportEngine`] owns a shared, immutable set of source tables and turns
//! a year interval into the four dashboard views in one pass: restrict,
//! aggregate, join, derive, assemble. There is no incremental state and no
//! cache; every call recomputes from the tables, so equal inputs always
//! produce equal reports.

use std::fmt;
use std::sync::Arc;

use serde::Serialize;

use crate::aggregate::{
    aggregate_agriculture, aggregate_disasters, average_salaries_by_year, production_by_year,
    MalformedRecord,
};
use crate::interval::YearInterval;
use crate::join::{join_geo, join_time_series, JoinError};
use crate::metrics::{count_by_first_appearance, pearson_correlation, top_n_with_overflow};
use crate::tables::SourceTables;
use crate::views::{
    assemble_geo_view, assemble_job_distribution_view, assemble_salary_production_view,
    assemble_tech_impact_view, DualAxisSeriesView, GeoMapView, ProportionView, ScatterView,
};

/// How many job titles keep their own slice before the rest fold into the
/// overflow bucket.
pub const TOP_JOB_TITLES: usize = 6;

/// Label of the fold-the-rest bucket in the job-distribution view.
pub const OVERFLOW_LABEL: &str = "Other";

/// The four views recomputed for one interval.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct ReportViews {
    pub geo_map: GeoMapView,
    pub salary_production: DualAxisSeriesView,
    pub tech_impact: ScatterView,
    pub job_distribution: ProportionView,
}

/// One full recomputation result.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct Report {
    /// The interval the report was computed for, echoed back verbatim.
    pub interval: YearInterval,
    pub views: ReportViews,
    /// Rows dropped during aggregation because a numeric field was
    /// unusable. Empty on clean data.
    pub dropped: Vec<MalformedRecord>,
}

/// Errors that abort a recomputation outright.
#[derive(Debug, Clone, PartialEq)]
pub enum RecomputeError {
    /// A join detected a duplicate key, which means an aggregation upstream
    /// broke its one-row-per-key contract.
    Join(JoinError),
}

impl fmt::Display for RecomputeError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            RecomputeError::Join(err) => write!(f, "Join failed: {}", err),
        }
    }
}

impl std::error::Error for RecomputeError {
    fn source(&self) -> Option<&(dyn std::error::Error + 'static)> {
        match self {
            RecomputeError::Join(err) => Some(err),
        }
    }
}

impl From<JoinError> for RecomputeError {
    fn from(err: JoinError) -> Self {
        RecomputeError::Join(err)
    }
}

/// Recomputes the dashboard views for arbitrary year intervals over one
/// fixed set of source tables.
///
/// The engine is cheap to clone and share; all clones read the same
/// `Arc`-held tables.
#[derive(Debug, Clone)]
pub struct ReportEngine {
    tables: Arc<SourceTables>,
}

impl ReportEngine {
    /// Creates an engine over already-loaded tables.
    pub fn new(tables: Arc<SourceTables>) -> Self {
        ReportEngine { tables }
    }

    /// The tables this engine computes over.
    pub fn tables(&self) -> &SourceTables {
        &self.tables
    }

    /// Runs the full pipeline for `interval`.
    ///
    /// # Arguments
    ///
    /// * `interval` - Inclusive year range; an inverted interval produces a
    ///   report over zero rows rather than an error
    ///
    /// # Returns
    ///
    /// The four assembled views plus the list of rows dropped as malformed
    /// along the way.
    ///
    /// # Errors
    ///
    /// [`RecomputeError::Join`] if a join input carries a duplicate key.
    /// Aggregation outputs are keyed uniquely by construction, so this
    /// fails the whole recomputation instead of degrading quietly.
    pub fn recompute(&self, interval: YearInterval) -> Result<Report, RecomputeError> {
        let subset = self.tables.restrict(&interval);
        let mut dropped = Vec::new();

        // Geographic pass: per-country impact joined with per-location output.
        let (countries, faults) = aggregate_disasters(subset.disasters());
        dropped.extend(faults);
        let (farms, faults) = aggregate_agriculture(subset.agriculture());
        dropped.extend(faults);
        let geo_records = join_geo(&countries, &farms)?;

        // Yearly pass: salary averages against production totals.
        let (salary_averages, faults) = average_salaries_by_year(subset.salaries());
        dropped.extend(faults);
        // Value faults on this pass repeat what aggregate_agriculture
        // already reported, so the list is not collected a second time.
        // Rows only this pass rejects (no farm location, or a year-sum
        // overflow) are logged without a dropped entry.
        let (production, _) = production_by_year(subset.agriculture());
        let series = join_time_series(&salary_averages, &production)?;

        let salaries: Vec<f64> = series.iter().map(|row| row.avg_salary_usd).collect();
        let shipments: Vec<f64> = series.iter().map(|row| row.units_shipped_sum).collect();
        let correlation = pearson_correlation(&salaries, &shipments);

        let titles = count_by_first_appearance(
            subset.salaries().iter().map(|row| row.job_title.as_str()),
        );
        let job_buckets = top_n_with_overflow(&titles, TOP_JOB_TITLES, OVERFLOW_LABEL);

        let views = ReportViews {
            geo_map: assemble_geo_view(&interval, &geo_records),
            salary_production: assemble_salary_production_view(&interval, &series, correlation),
            tech_impact: assemble_tech_impact_view(&interval, subset.salaries()),
            job_distribution: assemble_job_distribution_view(&interval, job_buckets),
        };

        Ok(Report {
            interval,
            views,
            dropped,
        })
    }
}
