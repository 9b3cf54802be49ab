//! Immutable in-memory source tables and the interval filter over them.

use crate::interval::YearInterval;
use crate::records::{AgricultureRecord, DisasterRecord, SalaryRecord, Yearly};

/// The three source tables every recomputation reads.
///
/// Constructed once at startup (from CSV ingestion or by hand in tests) and
/// shared read-only for the lifetime of the process, typically behind an
/// `Arc`. Fields are private and no mutation API exists post-construction,
/// so a `SourceTables` handed to the report engine cannot change under it.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct SourceTables {
    disasters: Vec<DisasterRecord>,
    agriculture: Vec<AgricultureRecord>,
    salaries: Vec<SalaryRecord>,
}

/// Restricts rows to the interval, preserving input order.
fn filter_by_year<T: Yearly + Clone>(rows: &[T], interval: &YearInterval) -> Vec<T> {
    rows.iter()
        .filter(|row| interval.contains(row.year()))
        .cloned()
        .collect()
}

impl SourceTables {
    /// Creates the table set from already-typed rows.
    pub fn new(
        disasters: Vec<DisasterRecord>,
        agriculture: Vec<AgricultureRecord>,
        salaries: Vec<SalaryRecord>,
    ) -> Self {
        SourceTables {
            disasters,
            agriculture,
            salaries,
        }
    }

    /// Disaster rows, in load order.
    pub fn disasters(&self) -> &[DisasterRecord] {
        &self.disasters
    }

    /// Agricultural shipment rows, in load order.
    pub fn agriculture(&self) -> &[AgricultureRecord] {
        &self.agriculture
    }

    /// Salary rows, in load order.
    pub fn salaries(&self) -> &[SalaryRecord] {
        &self.salaries
    }

    /// Total row count across all three tables.
    pub fn row_count(&self) -> usize {
        self.disasters.len() + self.agriculture.len() + self.salaries.len()
    }

    /// Returns the sub-tables whose rows fall inside `interval`.
    ///
    /// Original row order is preserved per table. An inverted interval
    /// yields three empty tables, never an error.
    pub fn restrict(&self, interval: &YearInterval) -> SourceTables {
        SourceTables {
            disasters: filter_by_year(&self.disasters, interval),
            agriculture: filter_by_year(&self.agriculture, interval),
            salaries: filter_by_year(&self.salaries, interval),
        }
    }

    /// The smallest and largest year present in any table, or `None` when
    /// all three tables are empty.
    ///
    /// The UI collaborator uses this to bound its year slider instead of
    /// hard-coding a deployment-specific range.
    pub fn year_domain(&self) -> Option<(i32, i32)> {
        let years = self
            .disasters
            .iter()
            .map(Yearly::year)
            .chain(self.agriculture.iter().map(Yearly::year))
            .chain(self.salaries.iter().map(Yearly::year));

        years.fold(None, |domain, year| match domain {
            None => Some((year, year)),
            Some((min, max)) => Some((min.min(year), max.max(year))),
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn sample_tables() -> SourceTables {
        SourceTables::new(
            vec![
                DisasterRecord::new("BR", 2020, "Flood", 100),
                DisasterRecord::new("US", 2021, "Storm", 50),
                DisasterRecord::new("BR", 2022, "Drought", 30),
            ],
            vec![
                AgricultureRecord::new("BR", 2020, "Soy", 500.0),
                AgricultureRecord::new("AR", 2023, "Wheat", 250.0),
            ],
            vec![
                SalaryRecord::new(2021, "SE", "Data Scientist", 120_000.0),
                SalaryRecord::new(2022, "EN", "Data Analyst", 60_000.0),
            ],
        )
    }

    #[test]
    fn test_restrict_keeps_rows_inside_interval() {
        let tables = sample_tables();
        let filtered = tables.restrict(&YearInterval::new(2020, 2021));

        assert_eq!(filtered.disasters().len(), 2);
        assert_eq!(filtered.agriculture().len(), 1);
        assert_eq!(filtered.salaries().len(), 1);
        assert_eq!(filtered.salaries()[0].work_year, 2021);
    }

    #[test]
    fn test_restrict_preserves_input_order() {
        let tables = sample_tables();
        let filtered = tables.restrict(&YearInterval::new(2020, 2022));

        let codes: Vec<&str> = filtered
            .disasters()
            .iter()
            .map(|r| r.country_code.as_str())
            .collect();
        assert_eq!(codes, vec!["BR", "US", "BR"]);
    }

    #[test]
    fn test_restrict_inverted_interval_is_empty_not_an_error() {
        let tables = sample_tables();
        let filtered = tables.restrict(&YearInterval::new(2024, 2020));

        assert!(filtered.disasters().is_empty());
        assert!(filtered.agriculture().is_empty());
        assert!(filtered.salaries().is_empty());
    }

    #[test]
    fn test_restrict_does_not_touch_the_source() {
        let tables = sample_tables();
        let before = tables.clone();
        let _ = tables.restrict(&YearInterval::new(2020, 2020));
        assert_eq!(tables, before);
    }

    #[test]
    fn test_year_domain_spans_all_three_tables() {
        let tables = sample_tables();
        assert_eq!(tables.year_domain(), Some((2020, 2023)));
    }

    #[test]
    fn test_year_domain_of_empty_tables_is_none() {
        let tables = SourceTables::default();
        assert_eq!(tables.year_domain(), None);
        assert_eq!(tables.row_count(), 0);
    }
}
