use serde::{Deserialize, Serialize};

/// One natural-disaster impact row.
///
/// `total_affected` is normalized at ingestion: a missing value in the
/// source file becomes 0 there, by design, so "missing" and "zero" are
/// indistinguishable for this one field only.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct DisasterRecord {
    /// ISO country code the disaster struck
    pub country_code: String,
    /// Year the disaster started
    pub year: i32,
    /// Disaster category (e.g. "Flood", "Drought")
    pub disaster_type: String,
    /// Number of people affected (missing normalized to 0)
    pub total_affected: u64,
}

impl DisasterRecord {
    /// Creates a new DisasterRecord.
    pub fn new(
        country_code: impl Into<String>,
        year: i32,
        disaster_type: impl Into<String>,
        total_affected: u64,
    ) -> Self {
        DisasterRecord {
            country_code: country_code.into(),
            year,
            disaster_type: disaster_type.into(),
            total_affected,
        }
    }
}

/// One agricultural shipment row.
///
/// `year` is derived from the source `sale_date` column when the CSV is
/// read; the pipeline never re-derives it.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct AgricultureRecord {
    /// Farm location, keyed the same way as disaster country codes
    pub farm_location: String,
    /// Sale year (derived from the sale date)
    pub year: i32,
    /// Product shipped (e.g. "Soy", "Coffee")
    pub product_name: String,
    /// Shipment weight in kilograms
    pub units_shipped_kg: f64,
}

impl AgricultureRecord {
    /// Creates a new AgricultureRecord.
    pub fn new(
        farm_location: impl Into<String>,
        year: i32,
        product_name: impl Into<String>,
        units_shipped_kg: f64,
    ) -> Self {
        AgricultureRecord {
            farm_location: farm_location.into(),
            year,
            product_name: product_name.into(),
            units_shipped_kg,
        }
    }
}

/// One data-science job/salary row.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SalaryRecord {
    /// Year the salary was earned
    pub work_year: i32,
    /// Experience level code (e.g. "EN", "SE", "EX")
    pub experience_level: String,
    /// Job title (e.g. "Data Scientist")
    pub job_title: String,
    /// Annual salary in USD
    pub salary_in_usd: f64,
}

impl SalaryRecord {
    /// Creates a new SalaryRecord.
    pub fn new(
        work_year: i32,
        experience_level: impl Into<String>,
        job_title: impl Into<String>,
        salary_in_usd: f64,
    ) -> Self {
        SalaryRecord {
            work_year,
            experience_level: experience_level.into(),
            job_title: job_title.into(),
            salary_in_usd,
        }
    }
}

/// Year accessor shared by all source records.
///
/// The interval filter is generic over this trait so each table reuses the
/// same restriction logic regardless of which field carries the year.
pub trait Yearly {
    /// The calendar year this row belongs to.
    fn year(&self) -> i32;
}

impl Yearly for DisasterRecord {
    fn year(&self) -> i32 {
        self.year
    }
}

impl Yearly for AgricultureRecord {
    fn year(&self) -> i32 {
        self.year
    }
}

impl Yearly for SalaryRecord {
    fn year(&self) -> i32 {
        self.work_year
    }
}
