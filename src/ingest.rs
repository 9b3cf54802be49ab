//! CSV ingestion for the three source datasets.
//!
//! Each reader validates the header row up front, then converts rows one at
//! a time. A row that cannot be parsed, or that fails the shape checks
//! (empty required strings, negative or non-finite numerics), is logged and
//! skipped; a missing required column fails the whole load, since that
//! means the wrong file was supplied.

use std::fmt;
use std::fs::File;
use std::io::Read;
use std::path::{Path, PathBuf};

use chrono::{Datelike, NaiveDate};
use serde::Deserialize;

use crate::records::{AgricultureRecord, DisasterRecord, SalaryRecord};
use crate::tables::SourceTables;

/// Errors raised while loading the source CSV files.
#[derive(Debug)]
pub enum IngestError {
    /// A source file could not be opened.
    Io(PathBuf, std::io::Error),
    /// The CSV header row could not be read.
    Csv(csv::Error),
    /// A source file lacks columns the pipeline depends on.
    MissingColumns {
        table: &'static str,
        columns: Vec<String>,
    },
}

impl fmt::Display for IngestError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            IngestError::Io(path, err) => {
                write!(f, "Failed to read {}: {}", path.display(), err)
            }
            IngestError::Csv(err) => write!(f, "Failed to parse CSV: {}", err),
            IngestError::MissingColumns { table, columns } => {
                write!(
                    f,
                    "The {} file is missing required columns: {}",
                    table,
                    columns.join(", ")
                )
            }
        }
    }
}

impl std::error::Error for IngestError {
    fn source(&self) -> Option<&(dyn std::error::Error + 'static)> {
        match self {
            IngestError::Io(_, err) => Some(err),
            IngestError::Csv(err) => Some(err),
            IngestError::MissingColumns { .. } => None,
        }
    }
}

impl From<csv::Error> for IngestError {
    fn from(err: csv::Error) -> Self {
        IngestError::Csv(err)
    }
}

/// A raw row of the disaster-impact CSV, column names as published.
#[derive(Debug, Deserialize)]
struct RawDisasterRow {
    #[serde(rename = "ISO")]
    iso: String,
    #[serde(rename = "Start Year")]
    start_year: i32,
    #[serde(rename = "Disaster Type")]
    disaster_type: String,
    /// Absent values mean "not reported" and load as zero.
    #[serde(rename = "Total Affected", default)]
    total_affected: Option<f64>,
}

impl RawDisasterRow {
    fn into_record(self) -> Option<DisasterRecord> {
        let iso = self.iso.trim();
        let disaster_type = self.disaster_type.trim();
        if iso.is_empty() || disaster_type.is_empty() {
            return None;
        }
        let total_affected = match self.total_affected {
            None => 0,
            Some(value) if value.is_finite() && value >= 0.0 => value.round() as u64,
            Some(_) => return None,
        };
        Some(DisasterRecord::new(
            iso,
            self.start_year,
            disaster_type,
            total_affected,
        ))
    }
}

/// A raw row of the agricultural-shipments CSV.
#[derive(Debug, Deserialize)]
struct RawAgricultureRow {
    farm_location: String,
    sale_date: String,
    product_name: String,
    units_shipped_kg: f64,
}

impl RawAgricultureRow {
    fn into_record(self) -> Option<AgricultureRecord> {
        let location = self.farm_location.trim();
        let product = self.product_name.trim();
        if location.is_empty() || product.is_empty() {
            return None;
        }
        if !self.units_shipped_kg.is_finite() || self.units_shipped_kg < 0.0 {
            return None;
        }
        let year = parse_sale_year(&self.sale_date)?;
        Some(AgricultureRecord::new(
            location,
            year,
            product,
            self.units_shipped_kg,
        ))
    }
}

/// A raw row of the data-science salaries CSV.
#[derive(Debug, Deserialize)]
struct RawSalaryRow {
    work_year: i32,
    experience_level: String,
    job_title: String,
    salary_in_usd: f64,
}

impl RawSalaryRow {
    fn into_record(self) -> Option<SalaryRecord> {
        let level = self.experience_level.trim();
        let title = self.job_title.trim();
        if level.is_empty() || title.is_empty() {
            return None;
        }
        if !self.salary_in_usd.is_finite() || self.salary_in_usd < 0.0 {
            return None;
        }
        Some(SalaryRecord::new(
            self.work_year,
            level,
            title,
            self.salary_in_usd,
        ))
    }
}

/// Extracts the calendar year from a sale date.
///
/// Accepts ISO dates, US-style dates and bare years, which covers every
/// shape the shipment exports have used so far.
fn parse_sale_year(raw: &str) -> Option<i32> {
    let raw = raw.trim();
    for format in ["%Y-%m-%d", "%m/%d/%Y"] {
        if let Ok(date) = NaiveDate::parse_from_str(raw, format) {
            return Some(date.year());
        }
    }
    raw.parse::<i32>().ok()
}

fn require_columns(
    table: &'static str,
    headers: &csv::StringRecord,
    required: &[&str],
) -> Result<(), IngestError> {
    let missing: Vec<String> = required
        .iter()
        .filter(|name| !headers.iter().any(|header| header.trim() == **name))
        .map(|name| name.to_string())
        .collect();
    if missing.is_empty() {
        Ok(())
    } else {
        Err(IngestError::MissingColumns {
            table,
            columns: missing,
        })
    }
}

fn read_rows<T, F, O, R>(
    table: &'static str,
    required: &[&str],
    reader: R,
    convert: F,
) -> Result<Vec<O>, IngestError>
where
    T: for<'de> Deserialize<'de>,
    F: Fn(T) -> Option<O>,
    R: Read,
{
    let mut csv_reader = csv::ReaderBuilder::new().flexible(true).from_reader(reader);
    require_columns(table, csv_reader.headers()?, required)?;

    let mut rows = Vec::new();
    let mut skipped = 0usize;
    for result in csv_reader.deserialize::<T>() {
        match result {
            Ok(raw) => match convert(raw) {
                Some(record) => rows.push(record),
                None => skipped += 1,
            },
            Err(err) => {
                log::warn!("Skipping unreadable {} row: {}", table, err);
                skipped += 1;
            }
        }
    }
    if skipped > 0 {
        log::warn!("Dropped {} unusable {} rows", skipped, table);
    }
    Ok(rows)
}

/// Reads disaster-impact rows from any CSV source.
pub fn read_disasters<R: Read>(reader: R) -> Result<Vec<DisasterRecord>, IngestError> {
    read_rows(
        "disaster",
        &["ISO", "Start Year", "Disaster Type", "Total Affected"],
        reader,
        RawDisasterRow::into_record,
    )
}

/// Reads agricultural-shipment rows from any CSV source.
pub fn read_agriculture<R: Read>(reader: R) -> Result<Vec<AgricultureRecord>, IngestError> {
    read_rows(
        "agriculture",
        &[
            "farm_location",
            "sale_date",
            "product_name",
            "units_shipped_kg",
        ],
        reader,
        RawAgricultureRow::into_record,
    )
}

/// Reads salary rows from any CSV source.
pub fn read_salaries<R: Read>(reader: R) -> Result<Vec<SalaryRecord>, IngestError> {
    read_rows(
        "salary",
        &[
            "work_year",
            "experience_level",
            "job_title",
            "salary_in_usd",
        ],
        reader,
        RawSalaryRow::into_record,
    )
}

fn open(path: &Path) -> Result<File, IngestError> {
    File::open(path).map_err(|err| IngestError::Io(path.to_path_buf(), err))
}

/// Reads disaster-impact rows from a file.
pub fn load_disasters<P: AsRef<Path>>(path: P) -> Result<Vec<DisasterRecord>, IngestError> {
    read_disasters(open(path.as_ref())?)
}

/// Reads agricultural-shipment rows from a file.
pub fn load_agriculture<P: AsRef<Path>>(path: P) -> Result<Vec<AgricultureRecord>, IngestError> {
    read_agriculture(open(path.as_ref())?)
}

/// Reads salary rows from a file.
pub fn load_salaries<P: AsRef<Path>>(path: P) -> Result<Vec<SalaryRecord>, IngestError> {
    read_salaries(open(path.as_ref())?)
}

/// File locations of the three source datasets.
#[derive(Debug, Clone)]
pub struct CsvSources {
    pub disasters: PathBuf,
    pub agriculture: PathBuf,
    pub salaries: PathBuf,
}

/// Loads all three datasets into one immutable table set.
///
/// # Errors
///
/// Fails if any file cannot be opened or lacks its required columns.
/// Individual bad rows are skipped with a warning instead.
pub fn load_source_tables(sources: &CsvSources) -> Result<SourceTables, IngestError> {
    let disasters = load_disasters(&sources.disasters)?;
    let agriculture = load_agriculture(&sources.agriculture)?;
    let salaries = load_salaries(&sources.salaries)?;
    log::info!(
        "Loaded {} disaster, {} agriculture and {} salary rows",
        disasters.len(),
        agriculture.len(),
        salaries.len()
    );
    Ok(SourceTables::new(disasters, agriculture, salaries))
}
