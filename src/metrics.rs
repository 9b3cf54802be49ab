//! Derived metrics computed from joined tables: linear correlation and
//! top-N category counts with an overflow bucket.

use std::collections::HashMap;

use serde::{Deserialize, Serialize};

/// Pearson correlation coefficient between two equal-length columns.
///
/// # Arguments
///
/// * `xs` - First column
/// * `ys` - Second column, paired index-wise with `xs`
///
/// # Returns
///
/// `Some(r)` with `r` clamped to `[-1.0, 1.0]`, or `None` when the
/// coefficient is undefined: mismatched lengths, fewer than two finite
/// pairs, zero variance in either column, or accumulators pushed outside
/// the finite `f64` range. `None` is the only representation of "not
/// computable"; this function never yields NaN.
pub fn pearson_correlation(xs: &[f64], ys: &[f64]) -> Option<f64> {
    if xs.len() != ys.len() {
        return None;
    }
    let pairs: Vec<(f64, f64)> = xs
        .iter()
        .zip(ys)
        .filter(|(x, y)| x.is_finite() && y.is_finite())
        .map(|(x, y)| (*x, *y))
        .collect();
    if pairs.len() < 2 {
        return None;
    }

    let n = pairs.len() as f64;
    let mean_x = pairs.iter().map(|(x, _)| x).sum::<f64>() / n;
    let mean_y = pairs.iter().map(|(_, y)| y).sum::<f64>() / n;

    let mut covariance = 0.0;
    let mut variance_x = 0.0;
    let mut variance_y = 0.0;
    for (x, y) in &pairs {
        let dx = x - mean_x;
        let dy = y - mean_y;
        covariance += dx * dy;
        variance_x += dx * dx;
        variance_y += dy * dy;
    }
    // Squared deviations can overflow to infinity for finite inputs; a
    // non-finite term would turn the quotient into NaN.
    let denominator = (variance_x * variance_y).sqrt();
    if !covariance.is_finite() || !denominator.is_finite() || denominator == 0.0 {
        return None;
    }

    Some((covariance / denominator).clamp(-1.0, 1.0))
}

/// A category label and how many rows carried it.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct CategoryBucket {
    pub label: String,
    pub count: usize,
}

/// Counts occurrences per label, listing labels in the order they first
/// appear in the input.
pub fn count_by_first_appearance<'a, I>(labels: I) -> Vec<CategoryBucket>
where
    I: IntoIterator<Item = &'a str>,
{
    let mut order: Vec<String> = Vec::new();
    let mut counts: HashMap<String, usize> = HashMap::new();
    for label in labels {
        match counts.get_mut(label) {
            Some(count) => *count += 1,
            None => {
                order.push(label.to_string());
                counts.insert(label.to_string(), 1);
            }
        }
    }
    order
        .into_iter()
        .map(|label| {
            let count = counts.remove(&label).unwrap_or(0);
            CategoryBucket { label, count }
        })
        .collect()
}

/// Keeps the `n` highest-count buckets and folds the rest into a single
/// overflow bucket.
///
/// Buckets are ranked by descending count; equal counts keep their input
/// order, so ranking is deterministic when the input came from
/// [`count_by_first_appearance`]. The overflow bucket is appended only
/// when at least one bucket actually overflowed, and its count is the sum
/// of every folded bucket.
pub fn top_n_with_overflow(
    counts: &[CategoryBucket],
    n: usize,
    overflow_label: &str,
) -> Vec<CategoryBucket> {
    let mut ranked = counts.to_vec();
    ranked.sort_by(|a, b| b.count.cmp(&a.count));

    if ranked.len() <= n {
        return ranked;
    }

    let folded: usize = ranked[n..].iter().map(|bucket| bucket.count).sum();
    ranked.truncate(n);
    ranked.push(CategoryBucket {
        label: overflow_label.to_string(),
        count: folded,
    });
    ranked
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_correlation_of_perfectly_linear_columns() {
        let xs = [1.0, 2.0, 3.0, 4.0];
        let ys = [10.0, 20.0, 30.0, 40.0];
        let r = pearson_correlation(&xs, &ys).unwrap();
        assert!((r - 1.0).abs() < 1e-12);

        let falling = [40.0, 30.0, 20.0, 10.0];
        let r = pearson_correlation(&xs, &falling).unwrap();
        assert!((r + 1.0).abs() < 1e-12);
    }

    #[test]
    fn test_correlation_is_clamped() {
        let xs = [1.0, 2.0, 3.0];
        let ys = [2.0, 4.0, 6.0];
        let r = pearson_correlation(&xs, &ys).unwrap();
        assert!((-1.0..=1.0).contains(&r));
    }

    #[test]
    fn test_correlation_undefined_for_single_pair() {
        assert_eq!(pearson_correlation(&[1.0], &[2.0]), None);
        assert_eq!(pearson_correlation(&[], &[]), None);
    }

    #[test]
    fn test_correlation_undefined_for_constant_column() {
        let xs = [5.0, 5.0, 5.0];
        let ys = [1.0, 2.0, 3.0];
        assert_eq!(pearson_correlation(&xs, &ys), None);
        assert_eq!(pearson_correlation(&ys, &xs), None);
    }

    #[test]
    fn test_correlation_undefined_for_mismatched_lengths() {
        assert_eq!(pearson_correlation(&[1.0, 2.0], &[1.0]), None);
    }

    #[test]
    fn test_correlation_skips_non_finite_pairs() {
        let xs = [1.0, f64::NAN, 2.0, 3.0];
        let ys = [10.0, 5.0, 20.0, 30.0];
        let r = pearson_correlation(&xs, &ys).unwrap();
        assert!((r - 1.0).abs() < 1e-12);
    }

    #[test]
    fn test_correlation_undefined_when_accumulators_overflow() {
        // Squared deviations at this magnitude exceed f64::MAX.
        assert_eq!(pearson_correlation(&[1e300, 0.0], &[1e300, 0.0]), None);
        assert_eq!(
            pearson_correlation(&[1e200, -1e200, 0.0], &[1.0, 2.0, 3.0]),
            None
        );
    }

    #[test]
    fn test_count_by_first_appearance() {
        let labels = ["Data Scientist", "Data Analyst", "Data Scientist"];
        let buckets = count_by_first_appearance(labels.iter().copied());

        assert_eq!(
            buckets,
            vec![
                CategoryBucket {
                    label: "Data Scientist".to_string(),
                    count: 2
                },
                CategoryBucket {
                    label: "Data Analyst".to_string(),
                    count: 1
                },
            ]
        );
    }

    #[test]
    fn test_top_n_folds_remainder_into_overflow() {
        let counts: Vec<CategoryBucket> = [10, 9, 8, 7, 6, 5, 4, 3]
            .iter()
            .enumerate()
            .map(|(i, &count)| CategoryBucket {
                label: format!("title-{}", i),
                count,
            })
            .collect();

        let ranked = top_n_with_overflow(&counts, 6, "Other");

        assert_eq!(ranked.len(), 7);
        let head: Vec<usize> = ranked[..6].iter().map(|b| b.count).collect();
        assert_eq!(head, vec![10, 9, 8, 7, 6, 5]);
        assert_eq!(ranked[6].label, "Other");
        assert_eq!(ranked[6].count, 7);
    }

    #[test]
    fn test_top_n_without_overflow_has_no_extra_bucket() {
        let counts = vec![
            CategoryBucket {
                label: "a".to_string(),
                count: 2,
            },
            CategoryBucket {
                label: "b".to_string(),
                count: 5,
            },
        ];

        let ranked = top_n_with_overflow(&counts, 6, "Other");

        assert_eq!(ranked.len(), 2);
        assert_eq!(ranked[0].label, "b");
        assert!(ranked.iter().all(|b| b.label != "Other"));
    }

    #[test]
    fn test_top_n_ties_keep_input_order() {
        let counts = vec![
            CategoryBucket {
                label: "first".to_string(),
                count: 3,
            },
            CategoryBucket {
                label: "second".to_string(),
                count: 3,
            },
            CategoryBucket {
                label: "third".to_string(),
                count: 3,
            },
        ];

        let ranked = top_n_with_overflow(&counts, 2, "Other");

        assert_eq!(ranked[0].label, "first");
        assert_eq!(ranked[1].label, "second");
        assert_eq!(ranked[2].label, "Other");
        assert_eq!(ranked[2].count, 3);
    }
}
