//! Grouped aggregation over the source tables.
//!
//! Every operation here follows the same two-output contract: the grouped
//! rows, ordered by each group's first appearance in the input, plus the
//! list of malformed rows dropped along the way. Callers surface the
//! dropped list instead of failing the whole computation.

use std::collections::HashMap;
use std::fmt::Display;
use std::hash::Hash;

use serde::{Deserialize, Serialize};

use crate::records::{AgricultureRecord, DisasterRecord, SalaryRecord};

/// One grouped row produced by [`sum_and_mode`].
#[derive(Debug, Clone, PartialEq)]
pub struct SummaryRow<K> {
    pub key: K,
    pub sum: f64,
    pub mode: String,
}

/// One grouped row produced by [`average_by_key`].
#[derive(Debug, Clone, PartialEq)]
pub struct MeanRow<K> {
    pub key: K,
    pub mean: f64,
}

/// A row that was dropped because a numeric field was unusable.
///
/// Dropped rows are reported alongside the aggregation result rather than
/// aborting it, so a handful of bad rows never blanks out a whole view.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct MalformedRecord {
    /// Name of the offending numeric field.
    pub field: &'static str,
    /// Group key the row would have landed in.
    pub key: String,
    /// The rejected value.
    pub value: f64,
}

/// Per-group running state. Only the fields the calling operation needs
/// are populated.
#[derive(Debug, Default)]
struct GroupAccum {
    sum: f64,
    count: usize,
    labels: Vec<(String, usize)>,
}

/// Picks the label with the highest count. Ties go to the label that
/// appeared first, which the strict comparison over the first-appearance
/// ordered list guarantees.
fn dominant_label(labels: &[(String, usize)]) -> String {
    let mut best_label = "";
    let mut best_count = 0;
    for (label, count) in labels {
        if *count > best_count {
            best_label = label;
            best_count = *count;
        }
    }
    best_label.to_string()
}

fn is_usable(value: f64) -> bool {
    value.is_finite() && value >= 0.0
}

/// Groups rows by key, summing one numeric field and electing the most
/// frequent categorical label per group.
///
/// # Arguments
///
/// * `rows` - Input rows, already restricted to the interval of interest
/// * `sum_field` - Field name used when reporting malformed rows
/// * `key_of` - Extracts the group key; `None` excludes the row from every group
/// * `sum_of` - Extracts the value to sum
/// * `mode_of` - Extracts the categorical label voted into the group's mode
///
/// # Returns
///
/// Grouped rows in first-appearance order of their keys, and the malformed
/// rows that were dropped. Non-finite or negative values are malformed, as
/// is a value that would push its group sum past the finite `f64` range;
/// the affected row contributes neither to the sum nor to the mode vote. A
/// group whose every row was dropped does not appear in the output.
pub fn sum_and_mode<T, K, KF, SF, MF>(
    rows: &[T],
    sum_field: &'static str,
    key_of: KF,
    sum_of: SF,
    mode_of: MF,
) -> (Vec<SummaryRow<K>>, Vec<MalformedRecord>)
where
    K: Eq + Hash + Clone + Display,
    KF: Fn(&T) -> Option<K>,
    SF: Fn(&T) -> f64,
    MF: Fn(&T) -> &str,
{
    let mut order: Vec<K> = Vec::new();
    let mut groups: HashMap<K, GroupAccum> = HashMap::new();
    let mut malformed = Vec::new();

    for row in rows {
        let key = match key_of(row) {
            Some(key) => key,
            None => continue,
        };
        let value = sum_of(row);
        if !is_usable(value) {
            log::warn!(
                "Dropping malformed row in group '{}': {} = {}",
                key,
                sum_field,
                value
            );
            malformed.push(MalformedRecord {
                field: sum_field,
                key: key.to_string(),
                value,
            });
            continue;
        }
        let running = groups.get(&key).map(|accum| accum.sum).unwrap_or(0.0);
        if !(running + value).is_finite() {
            log::warn!(
                "Dropping row in group '{}': {} = {} overflows the group sum",
                key,
                sum_field,
                value
            );
            malformed.push(MalformedRecord {
                field: sum_field,
                key: key.to_string(),
                value,
            });
            continue;
        }
        if !groups.contains_key(&key) {
            order.push(key.clone());
        }
        let accum = groups.entry(key).or_default();
        accum.sum += value;
        let label = mode_of(row);
        match accum.labels.iter_mut().find(|(seen, _)| seen == label) {
            Some((_, count)) => *count += 1,
            None => accum.labels.push((label.to_string(), 1)),
        }
    }

    let summaries = order
        .into_iter()
        .map(|key| {
            let accum = groups.remove(&key).unwrap_or_default();
            SummaryRow {
                key,
                sum: accum.sum,
                mode: dominant_label(&accum.labels),
            }
        })
        .collect();

    (summaries, malformed)
}

/// Groups rows by key and averages one numeric field per group.
///
/// # Arguments
///
/// * `rows` - Input rows, already restricted to the interval of interest
/// * `value_field` - Field name used when reporting malformed rows
/// * `key_of` - Extracts the group key; `None` excludes the row from every group
/// * `value_of` - Extracts the value to average
///
/// # Returns
///
/// Grouped means in first-appearance order of their keys, and the malformed
/// rows that were dropped. Non-finite or negative values are malformed, as
/// is a value that would push its group sum past the finite `f64` range.
/// Dropped rows count toward neither the sum nor the divisor.
pub fn average_by_key<T, K, KF, VF>(
    rows: &[T],
    value_field: &'static str,
    key_of: KF,
    value_of: VF,
) -> (Vec<MeanRow<K>>, Vec<MalformedRecord>)
where
    K: Eq + Hash + Clone + Display,
    KF: Fn(&T) -> Option<K>,
    VF: Fn(&T) -> f64,
{
    let mut order: Vec<K> = Vec::new();
    let mut groups: HashMap<K, GroupAccum> = HashMap::new();
    let mut malformed = Vec::new();

    for row in rows {
        let key = match key_of(row) {
            Some(key) => key,
            None => continue,
        };
        let value = value_of(row);
        if !is_usable(value) {
            log::warn!(
                "Dropping malformed row in group '{}': {} = {}",
                key,
                value_field,
                value
            );
            malformed.push(MalformedRecord {
                field: value_field,
                key: key.to_string(),
                value,
            });
            continue;
        }
        let running = groups.get(&key).map(|accum| accum.sum).unwrap_or(0.0);
        if !(running + value).is_finite() {
            log::warn!(
                "Dropping row in group '{}': {} = {} overflows the group sum",
                key,
                value_field,
                value
            );
            malformed.push(MalformedRecord {
                field: value_field,
                key: key.to_string(),
                value,
            });
            continue;
        }
        if !groups.contains_key(&key) {
            order.push(key.clone());
        }
        let accum = groups.entry(key).or_default();
        accum.sum += value;
        accum.count += 1;
    }

    let means = order
        .into_iter()
        .map(|key| {
            let accum = groups.remove(&key).unwrap_or_default();
            MeanRow {
                key,
                mean: accum.sum / accum.count.max(1) as f64,
            }
        })
        .collect();

    (means, malformed)
}

/// Disaster impact summarised per country.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct CountryAggregate {
    pub country_code: String,
    pub total_affected_sum: u64,
    pub dominant_disaster_type: String,
}

/// Agricultural output summarised per farm location.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct FarmAggregate {
    pub farm_location: String,
    pub units_shipped_sum: f64,
    pub dominant_product: String,
}

/// Mean data-science salary for one year.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct YearlySalaryAverage {
    pub work_year: i32,
    pub avg_salary_usd: f64,
}

/// Total agricultural shipments for one year.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct YearlyProduction {
    pub year: i32,
    pub units_shipped_sum: f64,
}

fn non_empty(value: &str) -> Option<String> {
    if value.trim().is_empty() {
        None
    } else {
        Some(value.to_string())
    }
}

/// Sums affected people and elects the dominant disaster type per country.
pub fn aggregate_disasters(
    rows: &[DisasterRecord],
) -> (Vec<CountryAggregate>, Vec<MalformedRecord>) {
    let (summaries, malformed) = sum_and_mode(
        rows,
        "total_affected",
        |row| non_empty(&row.country_code),
        |row| row.total_affected as f64,
        |row| row.disaster_type.as_str(),
    );
    let aggregates = summaries
        .into_iter()
        .map(|row| CountryAggregate {
            country_code: row.key,
            total_affected_sum: row.sum.round() as u64,
            dominant_disaster_type: row.mode,
        })
        .collect();
    (aggregates, malformed)
}

/// Sums shipped units and elects the dominant product per farm location.
pub fn aggregate_agriculture(
    rows: &[AgricultureRecord],
) -> (Vec<FarmAggregate>, Vec<MalformedRecord>) {
    let (summaries, malformed) = sum_and_mode(
        rows,
        "units_shipped_kg",
        |row| non_empty(&row.farm_location),
        |row| row.units_shipped_kg,
        |row| row.product_name.as_str(),
    );
    let aggregates = summaries
        .into_iter()
        .map(|row| FarmAggregate {
            farm_location: row.key,
            units_shipped_sum: row.sum,
            dominant_product: row.mode,
        })
        .collect();
    (aggregates, malformed)
}

/// Averages salaries per work year.
pub fn average_salaries_by_year(
    rows: &[SalaryRecord],
) -> (Vec<YearlySalaryAverage>, Vec<MalformedRecord>) {
    let (means, malformed) = average_by_key(
        rows,
        "salary_in_usd",
        |row| Some(row.work_year),
        |row| row.salary_in_usd,
    );
    let averages = means
        .into_iter()
        .map(|row| YearlySalaryAverage {
            work_year: row.key,
            avg_salary_usd: row.mean,
        })
        .collect();
    (averages, malformed)
}

/// Sums shipped units per year across all farm locations.
pub fn production_by_year(
    rows: &[AgricultureRecord],
) -> (Vec<YearlyProduction>, Vec<MalformedRecord>) {
    let (summaries, malformed) = sum_and_mode(
        rows,
        "units_shipped_kg",
        |row| Some(row.year),
        |row| row.units_shipped_kg,
        |row| row.product_name.as_str(),
    );
    let totals = summaries
        .into_iter()
        .map(|row| YearlyProduction {
            year: row.key,
            units_shipped_sum: row.sum,
        })
        .collect();
    (totals, malformed)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_groups_appear_in_first_appearance_order() {
        let rows = vec![
            DisasterRecord::new("US", 2021, "Storm", 50),
            DisasterRecord::new("BR", 2020, "Flood", 100),
            DisasterRecord::new("US", 2022, "Storm", 25),
            DisasterRecord::new("AR", 2021, "Drought", 10),
        ];
        let (aggregates, malformed) = aggregate_disasters(&rows);

        let keys: Vec<&str> = aggregates.iter().map(|a| a.country_code.as_str()).collect();
        assert_eq!(keys, vec!["US", "BR", "AR"]);
        assert!(malformed.is_empty());
    }

    #[test]
    fn test_sum_and_mode_per_group() {
        let rows = vec![
            DisasterRecord::new("BR", 2020, "Flood", 100),
            DisasterRecord::new("BR", 2021, "Flood", 200),
            DisasterRecord::new("BR", 2022, "Drought", 50),
        ];
        let (aggregates, _) = aggregate_disasters(&rows);

        assert_eq!(aggregates.len(), 1);
        assert_eq!(aggregates[0].total_affected_sum, 350);
        assert_eq!(aggregates[0].dominant_disaster_type, "Flood");
    }

    #[test]
    fn test_mode_tie_breaks_on_first_appearance() {
        let rows = vec![
            DisasterRecord::new("BR", 2020, "Flood", 1),
            DisasterRecord::new("BR", 2021, "Drought", 1),
            DisasterRecord::new("BR", 2022, "Drought", 1),
            DisasterRecord::new("BR", 2023, "Flood", 1),
        ];
        let (aggregates, _) = aggregate_disasters(&rows);

        // Flood and Drought both count 2; Flood was seen first.
        assert_eq!(aggregates[0].dominant_disaster_type, "Flood");
    }

    #[test]
    fn test_rows_without_group_key_are_excluded() {
        let rows = vec![
            DisasterRecord::new("", 2020, "Flood", 100),
            DisasterRecord::new("  ", 2021, "Storm", 40),
            DisasterRecord::new("BR", 2021, "Flood", 60),
        ];
        let (aggregates, malformed) = aggregate_disasters(&rows);

        assert_eq!(aggregates.len(), 1);
        assert_eq!(aggregates[0].country_code, "BR");
        assert_eq!(aggregates[0].total_affected_sum, 60);
        // Missing keys are an exclusion, not a fault.
        assert!(malformed.is_empty());
    }

    #[test]
    fn test_malformed_values_are_dropped_and_reported() {
        let rows = vec![
            AgricultureRecord::new("BR", 2020, "Soy", 500.0),
            AgricultureRecord::new("BR", 2021, "Soy", f64::NAN),
            AgricultureRecord::new("BR", 2022, "Corn", -10.0),
        ];
        let (aggregates, malformed) = aggregate_agriculture(&rows);

        assert_eq!(aggregates.len(), 1);
        assert_eq!(aggregates[0].units_shipped_sum, 500.0);
        assert_eq!(aggregates[0].dominant_product, "Soy");

        assert_eq!(malformed.len(), 2);
        assert_eq!(malformed[0].field, "units_shipped_kg");
        assert!(malformed[0].value.is_nan());
        assert_eq!(malformed[1].value, -10.0);
    }

    #[test]
    fn test_group_with_only_malformed_rows_is_absent() {
        let rows = vec![
            AgricultureRecord::new("AR", 2020, "Wheat", f64::INFINITY),
            AgricultureRecord::new("BR", 2020, "Soy", 100.0),
        ];
        let (aggregates, malformed) = aggregate_agriculture(&rows);

        assert_eq!(aggregates.len(), 1);
        assert_eq!(aggregates[0].farm_location, "BR");
        assert_eq!(malformed.len(), 1);
        assert_eq!(malformed[0].key, "AR");
    }

    #[test]
    fn test_rows_overflowing_the_group_sum_are_dropped_and_reported() {
        let rows = vec![
            AgricultureRecord::new("BR", 2020, "Soy", 1.5e308),
            AgricultureRecord::new("BR", 2021, "Soy", 1.5e308),
        ];
        let (aggregates, malformed) = aggregate_agriculture(&rows);

        // The second row would carry the sum to infinity; it is dropped
        // and the first row's total stands.
        assert_eq!(aggregates.len(), 1);
        assert_eq!(aggregates[0].units_shipped_sum, 1.5e308);
        assert!(aggregates[0].units_shipped_sum.is_finite());

        assert_eq!(malformed.len(), 1);
        assert_eq!(malformed[0].key, "BR");
        assert_eq!(malformed[0].value, 1.5e308);
    }

    #[test]
    fn test_average_salaries_by_year() {
        let rows = vec![
            SalaryRecord::new(2021, "SE", "Data Scientist", 100_000.0),
            SalaryRecord::new(2021, "MI", "Data Analyst", 60_000.0),
            SalaryRecord::new(2022, "EN", "ML Engineer", 90_000.0),
        ];
        let (averages, malformed) = average_salaries_by_year(&rows);

        assert_eq!(averages.len(), 2);
        assert_eq!(averages[0].work_year, 2021);
        assert_eq!(averages[0].avg_salary_usd, 80_000.0);
        assert_eq!(averages[1].work_year, 2022);
        assert_eq!(averages[1].avg_salary_usd, 90_000.0);
        assert!(malformed.is_empty());
    }

    #[test]
    fn test_average_excludes_malformed_from_divisor() {
        let rows = vec![
            SalaryRecord::new(2021, "SE", "Data Scientist", 100_000.0),
            SalaryRecord::new(2021, "MI", "Data Analyst", f64::NAN),
        ];
        let (averages, malformed) = average_salaries_by_year(&rows);

        assert_eq!(averages[0].avg_salary_usd, 100_000.0);
        assert_eq!(malformed.len(), 1);
    }

    #[test]
    fn test_average_skips_rows_that_overflow_the_sum() {
        let rows = vec![
            SalaryRecord::new(2021, "SE", "Data Scientist", 1.5e308),
            SalaryRecord::new(2021, "MI", "Data Analyst", 1.5e308),
        ];
        let (averages, malformed) = average_salaries_by_year(&rows);

        assert_eq!(averages.len(), 1);
        assert!(averages[0].avg_salary_usd.is_finite());
        assert_eq!(averages[0].avg_salary_usd, 1.5e308);
        assert_eq!(malformed.len(), 1);
    }

    #[test]
    fn test_production_by_year_totals() {
        let rows = vec![
            AgricultureRecord::new("BR", 2020, "Soy", 500.0),
            AgricultureRecord::new("AR", 2020, "Wheat", 300.0),
            AgricultureRecord::new("BR", 2021, "Soy", 200.0),
        ];
        let (totals, malformed) = production_by_year(&rows);

        assert_eq!(totals.len(), 2);
        assert_eq!(totals[0].year, 2020);
        assert_eq!(totals[0].units_shipped_sum, 800.0);
        assert_eq!(totals[1].year, 2021);
        assert_eq!(totals[1].units_shipped_sum, 200.0);
        assert!(malformed.is_empty());
    }

    #[test]
    fn test_empty_input_produces_empty_output() {
        let (aggregates, malformed) = aggregate_disasters(&[]);
        assert!(aggregates.is_empty());
        assert!(malformed.is_empty());
    }
}
