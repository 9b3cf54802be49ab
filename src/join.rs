//! Key-matched joins between aggregated tables.
//!
//! Both join flavours are one-to-one: a duplicate key on either side is a
//! data defect and fails the join rather than silently multiplying rows.

use std::collections::{HashMap, HashSet};
use std::fmt;
use std::hash::Hash;

use serde::{Deserialize, Serialize};

use crate::aggregate::{CountryAggregate, FarmAggregate, YearlyProduction, YearlySalaryAverage};

/// Errors raised while joining aggregated tables.
#[derive(Debug, Clone, PartialEq)]
pub enum JoinError {
    /// The named side contained the same join key twice.
    DuplicateKey { side: &'static str, key: String },
}

impl fmt::Display for JoinError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            JoinError::DuplicateKey { side, key } => {
                write!(f, "Duplicate join key '{}' on the {} side", key, side)
            }
        }
    }
}

impl std::error::Error for JoinError {}

/// One output row of [`outer_join`]. Exactly one of `left` / `right` may be
/// `None`; a row matched on both sides carries both.
#[derive(Debug, Clone, PartialEq)]
pub struct OuterJoinRow<K, L, R> {
    pub key: K,
    pub left: Option<L>,
    pub right: Option<R>,
}

/// Full outer join of two row sets on an extracted key.
///
/// # Arguments
///
/// * `left` - Left-side rows
/// * `right` - Right-side rows
/// * `left_key` - Extracts the join key from a left row
/// * `right_key` - Extracts the join key from a right row
///
/// # Returns
///
/// One row per distinct key. Keys present on both sides carry both rows;
/// one-sided keys carry the present side and `None` for the other. Output
/// order is deterministic: left rows in input order, then unmatched right
/// rows in input order. Keys match exactly; no case folding or trimming.
///
/// # Errors
///
/// [`JoinError::DuplicateKey`] if either side repeats a key.
pub fn outer_join<K, L, R, LK, RK>(
    left: &[L],
    right: &[R],
    left_key: LK,
    right_key: RK,
) -> Result<Vec<OuterJoinRow<K, L, R>>, JoinError>
where
    K: Eq + Hash + Clone + fmt::Display,
    L: Clone,
    R: Clone,
    LK: Fn(&L) -> K,
    RK: Fn(&R) -> K,
{
    let mut right_index: HashMap<K, usize> = HashMap::with_capacity(right.len());
    for (idx, row) in right.iter().enumerate() {
        let key = right_key(row);
        if right_index.insert(key.clone(), idx).is_some() {
            return Err(JoinError::DuplicateKey {
                side: "right",
                key: key.to_string(),
            });
        }
    }

    let mut seen_left: HashSet<K> = HashSet::with_capacity(left.len());
    let mut consumed = vec![false; right.len()];
    let mut rows = Vec::with_capacity(left.len() + right.len());

    for row in left {
        let key = left_key(row);
        if !seen_left.insert(key.clone()) {
            return Err(JoinError::DuplicateKey {
                side: "left",
                key: key.to_string(),
            });
        }
        let matched = right_index.get(&key).copied().map(|idx| {
            consumed[idx] = true;
            right[idx].clone()
        });
        rows.push(OuterJoinRow {
            key,
            left: Some(row.clone()),
            right: matched,
        });
    }

    for (idx, row) in right.iter().enumerate() {
        if !consumed[idx] {
            rows.push(OuterJoinRow {
                key: right_key(row),
                left: None,
                right: Some(row.clone()),
            });
        }
    }

    Ok(rows)
}

/// Inner join of two row sets on an extracted key.
///
/// Only keys present on both sides survive. Output follows left input
/// order.
///
/// # Errors
///
/// [`JoinError::DuplicateKey`] if either side repeats a key.
pub fn inner_join<K, L, R, LK, RK>(
    left: &[L],
    right: &[R],
    left_key: LK,
    right_key: RK,
) -> Result<Vec<(K, L, R)>, JoinError>
where
    K: Eq + Hash + Clone + fmt::Display,
    L: Clone,
    R: Clone,
    LK: Fn(&L) -> K,
    RK: Fn(&R) -> K,
{
    let rows = outer_join(left, right, left_key, right_key)?;
    Ok(rows
        .into_iter()
        .filter_map(|row| match (row.left, row.right) {
            (Some(l), Some(r)) => Some((row.key, l, r)),
            _ => None,
        })
        .collect())
}

/// One location after merging disaster impact with agricultural output.
///
/// `None` fields mean the location was absent from that source, which is
/// distinct from a present zero.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct CombinedGeoRecord {
    pub location: String,
    pub total_affected_sum: Option<u64>,
    pub dominant_disaster_type: Option<String>,
    pub units_shipped_sum: Option<f64>,
    pub dominant_product: Option<String>,
}

/// One year after merging average salaries with total production.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct CombinedTimeSeriesRecord {
    pub year: i32,
    pub avg_salary_usd: f64,
    pub units_shipped_sum: f64,
}

/// Outer-joins country disaster aggregates with farm-location aggregates.
///
/// Country codes and farm locations share one namespace, so a location
/// reported by only one source still appears, with the other side's fields
/// left unset.
pub fn join_geo(
    disasters: &[CountryAggregate],
    agriculture: &[FarmAggregate],
) -> Result<Vec<CombinedGeoRecord>, JoinError> {
    let rows = outer_join(
        disasters,
        agriculture,
        |d| d.country_code.clone(),
        |f| f.farm_location.clone(),
    )?;
    Ok(rows
        .into_iter()
        .map(|row| CombinedGeoRecord {
            location: row.key,
            total_affected_sum: row.left.as_ref().map(|d| d.total_affected_sum),
            dominant_disaster_type: row.left.map(|d| d.dominant_disaster_type),
            units_shipped_sum: row.right.as_ref().map(|f| f.units_shipped_sum),
            dominant_product: row.right.map(|f| f.dominant_product),
        })
        .collect())
}

/// Inner-joins yearly salary averages with yearly production totals.
///
/// Years covered by only one of the two sources are dropped; the pair is
/// what the correlation and the dual-axis chart consume.
pub fn join_time_series(
    salaries: &[YearlySalaryAverage],
    production: &[YearlyProduction],
) -> Result<Vec<CombinedTimeSeriesRecord>, JoinError> {
    let rows = inner_join(salaries, production, |s| s.work_year, |p| p.year)?;
    Ok(rows
        .into_iter()
        .map(|(year, salary, prod)| CombinedTimeSeriesRecord {
            year,
            avg_salary_usd: salary.avg_salary_usd,
            units_shipped_sum: prod.units_shipped_sum,
        })
        .collect())
}

#[cfg(test)]
mod tests {
    use super::*;

    fn country(code: &str, affected: u64, disaster: &str) -> CountryAggregate {
        CountryAggregate {
            country_code: code.to_string(),
            total_affected_sum: affected,
            dominant_disaster_type: disaster.to_string(),
        }
    }

    fn farm(location: &str, units: f64, product: &str) -> FarmAggregate {
        FarmAggregate {
            farm_location: location.to_string(),
            units_shipped_sum: units,
            dominant_product: product.to_string(),
        }
    }

    #[test]
    fn test_outer_join_keeps_one_sided_keys() {
        let disasters = vec![country("BR", 100, "Flood"), country("US", 40, "Storm")];
        let agriculture = vec![farm("BR", 500.0, "Soy"), farm("AR", 250.0, "Wheat")];

        let rows = join_geo(&disasters, &agriculture).unwrap();

        assert_eq!(rows.len(), 3);

        // Matched on both sides.
        assert_eq!(rows[0].location, "BR");
        assert_eq!(rows[0].total_affected_sum, Some(100));
        assert_eq!(rows[0].dominant_disaster_type.as_deref(), Some("Flood"));
        assert_eq!(rows[0].units_shipped_sum, Some(500.0));
        assert_eq!(rows[0].dominant_product.as_deref(), Some("Soy"));

        // Disaster-only location.
        assert_eq!(rows[1].location, "US");
        assert_eq!(rows[1].total_affected_sum, Some(40));
        assert_eq!(rows[1].units_shipped_sum, None);

        // Agriculture-only location comes after all left rows.
        assert_eq!(rows[2].location, "AR");
        assert_eq!(rows[2].total_affected_sum, None);
        assert_eq!(rows[2].units_shipped_sum, Some(250.0));
    }

    #[test]
    fn test_outer_join_keys_match_exactly() {
        let disasters = vec![country("BR", 100, "Flood")];
        let agriculture = vec![farm("br", 500.0, "Soy")];

        let rows = join_geo(&disasters, &agriculture).unwrap();

        // Case differs, so the two locations stay separate.
        assert_eq!(rows.len(), 2);
        assert_eq!(rows[0].location, "BR");
        assert_eq!(rows[1].location, "br");
    }

    #[test]
    fn test_duplicate_key_fails_the_join() {
        let disasters = vec![country("BR", 100, "Flood"), country("BR", 50, "Drought")];
        let agriculture = vec![farm("BR", 500.0, "Soy")];

        let err = join_geo(&disasters, &agriculture).unwrap_err();
        assert_eq!(
            err,
            JoinError::DuplicateKey {
                side: "left",
                key: "BR".to_string()
            }
        );
    }

    #[test]
    fn test_duplicate_right_key_reports_side() {
        let disasters = vec![country("BR", 100, "Flood")];
        let agriculture = vec![farm("AR", 1.0, "Wheat"), farm("AR", 2.0, "Corn")];

        let err = join_geo(&disasters, &agriculture).unwrap_err();
        assert_eq!(
            err,
            JoinError::DuplicateKey {
                side: "right",
                key: "AR".to_string()
            }
        );
    }

    #[test]
    fn test_inner_join_drops_unmatched_years() {
        let salaries = vec![
            YearlySalaryAverage {
                work_year: 2021,
                avg_salary_usd: 80_000.0,
            },
            YearlySalaryAverage {
                work_year: 2022,
                avg_salary_usd: 90_000.0,
            },
        ];
        let production = vec![
            YearlyProduction {
                year: 2022,
                units_shipped_sum: 700.0,
            },
            YearlyProduction {
                year: 2023,
                units_shipped_sum: 900.0,
            },
        ];

        let rows = join_time_series(&salaries, &production).unwrap();

        assert_eq!(rows.len(), 1);
        assert_eq!(rows[0].year, 2022);
        assert_eq!(rows[0].avg_salary_usd, 90_000.0);
        assert_eq!(rows[0].units_shipped_sum, 700.0);
    }

    #[test]
    fn test_joins_of_empty_inputs_are_empty() {
        let rows = join_geo(&[], &[]).unwrap();
        assert!(rows.is_empty());

        let series = join_time_series(&[], &[]).unwrap();
        assert!(series.is_empty());
    }
}
