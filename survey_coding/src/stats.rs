//! Missing-aware descriptive statistics for the structured dataset.
//!
//! All routines take `Option<f64>` slices: `None` marks a missing value
//! and is excluded from every computation. Percentages over the full
//! sample (missing included in the denominator) are the caller's choice
//! via the `total` argument.

use statrs::distribution::{ContinuousCDF, StudentsT};

/// Basic description of one numeric variable, over the valid values only.
#[derive(Debug, Clone, PartialEq)]
pub struct NumericSummary {
    pub n_valid: usize,
    pub mean: f64,
    /// Sample standard deviation (n-1 denominator). NaN when fewer than
    /// two valid values.
    pub std: f64,
    pub min: f64,
    pub max: f64,
    /// Mean of the two middle values for even counts.
    pub median: f64,
}

/// Returns `None` when there is no valid value at all.
pub fn summarize(values: &[Option<f64>]) -> Option<NumericSummary> {
    let mut valid: Vec<f64> = values.iter().flatten().copied().collect();
    if valid.is_empty() {
        return None;
    }
    let n = valid.len();
    let mean = valid.iter().sum::<f64>() / n as f64;
    let std = if n < 2 {
        f64::NAN
    } else {
        (valid.iter().map(|x| (x - mean).powi(2)).sum::<f64>() / (n as f64 - 1.0)).sqrt()
    };
    valid.sort_by(f64::total_cmp);
    let median = if n % 2 == 1 {
        valid[n / 2]
    } else {
        (valid[n / 2 - 1] + valid[n / 2]) / 2.0
    };
    Some(NumericSummary {
        n_valid: n,
        mean,
        std,
        min: valid[0],
        max: valid[n - 1],
        median,
    })
}

/// [`summarize`] over a slice without missing values, as produced by
/// [`group_by_code`].
pub fn summarize_values(values: &[f64]) -> Option<NumericSummary> {
    let wrapped: Vec<Option<f64>> = values.iter().map(|v| Some(*v)).collect();
    summarize(&wrapped)
}

/// Number of valid values equal to the given integer code.
pub fn code_count(values: &[Option<f64>], code: i64) -> u64 {
    values
        .iter()
        .flatten()
        .filter(|v| **v == code as f64)
        .count() as u64
}

/// Share of the total as a percentage value.
pub fn percent_value(count: u64, total: usize) -> f64 {
    if total == 0 {
        return 0.0;
    }
    count as f64 / total as f64 * 100.0
}

/// Share of the total, formatted the way the report tables print
/// percentages.
pub fn percent(count: u64, total: usize) -> String {
    format!("{:.2}", percent_value(count, total))
}

/// The valid values of `values` for the rows whose `by` value equals
/// `code`. Rows where either side is missing are dropped.
pub fn group_by_code(values: &[Option<f64>], by: &[Option<f64>], code: i64) -> Vec<f64> {
    values
        .iter()
        .zip(by.iter())
        .filter_map(|(v, g)| match (v, g) {
            (Some(v), Some(g)) if *g == code as f64 => Some(*v),
            _ => None,
        })
        .collect()
}

#[derive(Debug, Clone, PartialEq)]
pub struct TTest {
    pub statistic: f64,
    /// Two-sided p-value.
    pub p_value: f64,
}

/// Pooled-variance two-sample t-test, equal variances assumed.
///
/// Returns `None` when either group has fewer than two observations or
/// the pooled variance is zero.
pub fn two_sample_t_test(a: &[f64], b: &[f64]) -> Option<TTest> {
    let (na, nb) = (a.len(), b.len());
    if na < 2 || nb < 2 {
        return None;
    }
    let ma = a.iter().sum::<f64>() / na as f64;
    let mb = b.iter().sum::<f64>() / nb as f64;
    let va = a.iter().map(|x| (x - ma).powi(2)).sum::<f64>() / (na as f64 - 1.0);
    let vb = b.iter().map(|x| (x - mb).powi(2)).sum::<f64>() / (nb as f64 - 1.0);

    let df = (na + nb - 2) as f64;
    let pooled = ((na as f64 - 1.0) * va + (nb as f64 - 1.0) * vb) / df;
    let se = (pooled * (1.0 / na as f64 + 1.0 / nb as f64)).sqrt();
    if se == 0.0 {
        return None;
    }
    let statistic = (ma - mb) / se;
    let dist = StudentsT::new(0.0, 1.0, df).ok()?;
    let p_value = 2.0 * (1.0 - dist.cdf(statistic.abs()));
    Some(TTest { statistic, p_value })
}

/// Significance annotation used across the report tables.
pub fn significance_stars(p: f64) -> &'static str {
    if p < 0.01 {
        "***"
    } else if p < 0.05 {
        "**"
    } else if p < 0.1 {
        "*"
    } else {
        "不显著"
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn some(values: &[f64]) -> Vec<Option<f64>> {
        values.iter().map(|v| Some(*v)).collect()
    }

    #[test]
    fn summarize_skips_missing_values() {
        let values = vec![Some(1.0), None, Some(2.0), Some(3.0), None];
        let s = summarize(&values).unwrap();
        assert_eq!(s.n_valid, 3);
        assert!((s.mean - 2.0).abs() < 1e-12);
        assert!((s.std - 1.0).abs() < 1e-12);
        assert_eq!(s.min, 1.0);
        assert_eq!(s.max, 3.0);
        assert_eq!(s.median, 2.0);
    }

    #[test]
    fn median_interpolates_for_even_counts() {
        let s = summarize(&some(&[4.0, 1.0, 3.0, 2.0])).unwrap();
        assert_eq!(s.median, 2.5);
    }

    #[test]
    fn summarize_of_all_missing_is_none() {
        assert_eq!(summarize(&[None, None]), None);
    }

    #[test]
    fn code_counts_and_percentages_close() {
        let gender = vec![Some(0.0), Some(1.0), Some(0.0), Some(0.0)];
        let male = code_count(&gender, 0);
        let female = code_count(&gender, 1);
        assert_eq!(male, 3);
        assert_eq!(female, 1);
        assert_eq!(percent(male, 4), "75.00");
        assert_eq!(percent(female, 4), "25.00");
        // Mutually exclusive categories sum to 100.00 within rounding.
        let total = percent_value(male, 4) + percent_value(female, 4);
        assert!((total - 100.0).abs() < 0.01);
    }

    #[test]
    fn group_by_code_drops_incomplete_rows() {
        let values = vec![Some(1.0), Some(2.0), None, Some(4.0)];
        let by = vec![Some(0.0), Some(1.0), Some(0.0), None];
        assert_eq!(group_by_code(&values, &by, 0), vec![1.0]);
        assert_eq!(group_by_code(&values, &by, 1), vec![2.0]);
    }

    #[test]
    fn t_test_matches_reference_computation() {
        // Hand-checked pooled two-sample t-test: means 3 and 4, both
        // variances 2.5, n=5 each, so se=1, t=-1, df=8, p=0.3466.
        let a = [1.0, 2.0, 3.0, 4.0, 5.0];
        let b = [2.0, 3.0, 4.0, 5.0, 6.0];
        let t = two_sample_t_test(&a, &b).unwrap();
        assert!((t.statistic - (-1.0)).abs() < 1e-9);
        assert!((t.p_value - 0.3466).abs() < 1e-4);
    }

    #[test]
    fn t_test_of_identical_groups_is_flat() {
        let a = [1.0, 2.0, 3.0];
        let t = two_sample_t_test(&a, &a).unwrap();
        assert!(t.statistic.abs() < 1e-12);
        assert!((t.p_value - 1.0).abs() < 1e-9);
    }

    #[test]
    fn t_test_needs_two_observations_per_group() {
        assert_eq!(two_sample_t_test(&[1.0], &[1.0, 2.0]), None);
    }

    #[test]
    fn stars_follow_the_thresholds() {
        assert_eq!(significance_stars(0.001), "***");
        assert_eq!(significance_stars(0.02), "**");
        assert_eq!(significance_stars(0.07), "*");
        assert_eq!(significance_stars(0.5), "不显著");
    }
}
