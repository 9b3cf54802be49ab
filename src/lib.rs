pub mod interval;
pub mod records;
pub mod tables;
pub mod ingest;
pub mod aggregate;
pub mod join;
pub mod metrics;
pub mod views;
pub mod report;
pub mod server;


pub use interval::YearInterval;
pub use records::{AgricultureRecord, DisasterRecord, SalaryRecord, Yearly};
pub use tables::SourceTables;
pub use ingest::{
    load_agriculture, load_disasters, load_salaries, load_source_tables, read_agriculture,
    read_disasters, read_salaries, CsvSources, IngestError,
};
pub use aggregate::{
    aggregate_agriculture, aggregate_disasters, average_by_key, average_salaries_by_year,
    production_by_year, sum_and_mode, CountryAggregate, FarmAggregate, MalformedRecord, MeanRow,
    SummaryRow, YearlyProduction, YearlySalaryAverage,
};
pub use join::{
    inner_join, join_geo, join_time_series, outer_join, CombinedGeoRecord,
    CombinedTimeSeriesRecord, JoinError, OuterJoinRow,
};
pub use metrics::{
    count_by_first_appearance, pearson_correlation, top_n_with_overflow, CategoryBucket,
};
pub use views::{
    assemble_geo_view, assemble_job_distribution_view, assemble_salary_production_view,
    assemble_tech_impact_view, AxisSeries, BubblePoint, DualAxisSeriesView, GeoMapView, GeoPoint,
    ProportionView, ScatterView,
};
pub use report::{
    Report, ReportEngine, ReportViews, RecomputeError, OVERFLOW_LABEL, TOP_JOB_TITLES,
};
pub use server::{run_server, ApiError, AppState, ServerConfig};
