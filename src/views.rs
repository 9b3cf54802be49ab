//! Renderer-agnostic view assembly.
//!
//! A view is plain data: a title plus the rows a chart needs, with no
//! plotting-library types anywhere. The UI collaborator decides how each
//! field maps onto visual channels; everything here stays serialisable and
//! comparable so views can be asserted on directly in tests.

use serde::{Deserialize, Serialize};

use crate::interval::YearInterval;
use crate::join::{CombinedGeoRecord, CombinedTimeSeriesRecord};
use crate::metrics::CategoryBucket;
use crate::records::SalaryRecord;

/// One location on the world map.
///
/// `total_affected` is the intended magnitude channel and
/// `dominant_disaster_type` the categorical colour channel; the shipment
/// fields are hover detail. `None` means the location was absent from that
/// source, and the renderer may choose to skip such points for a channel
/// it cannot leave empty.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct GeoPoint {
    pub location: String,
    pub total_affected: Option<u64>,
    pub dominant_disaster_type: Option<String>,
    pub units_shipped_kg: Option<f64>,
    pub dominant_product: Option<String>,
}

/// World map of disaster impact and agricultural output per location.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct GeoMapView {
    pub title: String,
    pub points: Vec<GeoPoint>,
}

/// One named series of a dual-axis chart, index-aligned with the shared
/// year axis.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct AxisSeries {
    pub label: String,
    pub values: Vec<f64>,
}

/// Two year-indexed series sharing an x axis, with their correlation.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct DualAxisSeriesView {
    pub title: String,
    /// Shared x axis, ascending.
    pub years: Vec<i32>,
    pub left: AxisSeries,
    pub right: AxisSeries,
    /// `None` when the coefficient is undefined for the current interval.
    pub correlation: Option<f64>,
    /// Human-readable rendering of `correlation` for annotation text.
    pub correlation_label: String,
}

/// One mark of the bubble scatter. `salary_usd` drives both the horizontal
/// position and the mark size; `experience_level` is the categorical
/// vertical axis and `job_title` the colour/hover label.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct BubblePoint {
    pub salary_usd: f64,
    pub experience_level: String,
    pub job_title: String,
}

/// Bubble scatter of individual salary rows.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ScatterView {
    pub title: String,
    pub points: Vec<BubblePoint>,
}

/// Proportional breakdown, one slice per bucket.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ProportionView {
    pub title: String,
    pub buckets: Vec<CategoryBucket>,
}

fn titled(prefix: &str, interval: &YearInterval) -> String {
    format!("{} ({})", prefix, interval)
}

/// Builds the world-map view from the merged geo records.
pub fn assemble_geo_view(interval: &YearInterval, records: &[CombinedGeoRecord]) -> GeoMapView {
    let points = records
        .iter()
        .map(|record| GeoPoint {
            location: record.location.clone(),
            total_affected: record.total_affected_sum,
            dominant_disaster_type: record.dominant_disaster_type.clone(),
            units_shipped_kg: record.units_shipped_sum,
            dominant_product: record.dominant_product.clone(),
        })
        .collect();
    GeoMapView {
        title: titled(
            "Global Natural-Disaster Impact and Agricultural Production",
            interval,
        ),
        points,
    }
}

/// Builds the salary-versus-production view.
///
/// Records are reordered onto an ascending year axis; the correlation is
/// computed by the caller over the same records and passed through
/// untouched.
pub fn assemble_salary_production_view(
    interval: &YearInterval,
    records: &[CombinedTimeSeriesRecord],
    correlation: Option<f64>,
) -> DualAxisSeriesView {
    let mut ordered: Vec<&CombinedTimeSeriesRecord> = records.iter().collect();
    ordered.sort_by_key(|record| record.year);

    let correlation_label = match correlation {
        Some(r) => format!("Correlation: {:.2}", r),
        None => "Correlation: not computable".to_string(),
    };

    DualAxisSeriesView {
        title: titled("Data-Science Salaries vs Agricultural Production", interval),
        years: ordered.iter().map(|record| record.year).collect(),
        left: AxisSeries {
            label: "Average Salary (USD)".to_string(),
            values: ordered.iter().map(|record| record.avg_salary_usd).collect(),
        },
        right: AxisSeries {
            label: "Units Shipped (kg)".to_string(),
            values: ordered
                .iter()
                .map(|record| record.units_shipped_sum)
                .collect(),
        },
        correlation,
        correlation_label,
    }
}

/// Builds the bubble scatter, one point per salary row in input order.
pub fn assemble_tech_impact_view(interval: &YearInterval, salaries: &[SalaryRecord]) -> ScatterView {
    let points = salaries
        .iter()
        .map(|record| BubblePoint {
            salary_usd: record.salary_in_usd,
            experience_level: record.experience_level.clone(),
            job_title: record.job_title.clone(),
        })
        .collect();
    ScatterView {
        title: titled(
            "Technology Investment Impact on Agricultural Production",
            interval,
        ),
        points,
    }
}

/// Builds the job-distribution view from already-ranked buckets.
pub fn assemble_job_distribution_view(
    interval: &YearInterval,
    buckets: Vec<CategoryBucket>,
) -> ProportionView {
    ProportionView {
        title: titled("Agro-Tech and Data-Science Job Distribution", interval),
        buckets,
    }
}
