use serde::{Deserialize, Serialize};
use std::fmt;

/// Inclusive calendar-year interval selected by the report consumer.
///
/// An inverted interval (`start > end`) is not an error: it matches no year
/// and every downstream stage sees an empty filtered set. The slider-style
/// input driving this type cannot natively produce an inverted pair, so the
/// pipeline degrades instead of failing.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct YearInterval {
    /// First year (inclusive)
    pub start: i32,
    /// Last year (inclusive)
    pub end: i32,
}

impl YearInterval {
    /// Creates a new YearInterval.
    pub fn new(start: i32, end: i32) -> Self {
        YearInterval { start, end }
    }

    /// Returns true if `year` falls inside the interval.
    ///
    /// An inverted interval contains no year.
    pub fn contains(&self, year: i32) -> bool {
        self.start <= year && year <= self.end
    }

    /// Returns true if the interval matches no year at all.
    pub fn is_empty(&self) -> bool {
        self.start > self.end
    }
}

impl fmt::Display for YearInterval {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}-{}", self.start, self.end)
    }
}
