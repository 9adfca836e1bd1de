use crate::models::NumericSample;
use serde::{Deserialize, Serialize};

/// Summary statistics for one numeric sample.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct Summary {
    pub count: usize,
    pub missing: usize,
    pub min: Option<f64>,
    pub max: Option<f64>,
    pub mean: Option<f64>,
    pub median: Option<f64>,
}

/// Compute count, missing, min, max, mean and median of a sample.
pub fn summarize(sample: &NumericSample) -> Summary {
    let mut vals = sample.values();
    vals.sort_by(f64::total_cmp);
    let count = vals.len();
    let min = vals.first().cloned();
    let max = vals.last().cloned();
    let mean = if count > 0 {
        Some(vals.iter().copied().sum::<f64>() / count as f64)
    } else {
        None
    };
    let median = if count == 0 {
        None
    } else if count % 2 == 1 {
        Some(vals[count / 2])
    } else {
        Some((vals[count / 2 - 1] + vals[count / 2]) / 2.0)
    };
    Summary {
        count,
        missing: sample.missing,
        min,
        max,
        mean,
        median,
    }
}

/// Sum of squared deviations from the mean.
pub fn sum_squared_deviations(values: &[f64]) -> f64 {
    if values.is_empty() {
        return 0.0;
    }
    let mean = values.iter().sum::<f64>() / values.len() as f64;
    values.iter().map(|v| (v - mean) * (v - mean)).sum()
}

/// Total within-class SSD of `values` classified by `breaks` (step semantics).
pub fn within_class_ssd(values: &[f64], breaks: &[f64]) -> f64 {
    let classes = breaks.len().saturating_sub(1).max(1);
    let mut buckets: Vec<Vec<f64>> = vec![Vec::new(); classes];
    for &v in values {
        buckets[crate::classify::class_of(v, breaks)].push(v);
    }
    buckets.iter().map(|b| sum_squared_deviations(b)).sum()
}

/// Goodness of variance fit: `1 - SDCM / SDAM`, in [0, 1]. 1.0 for samples without variance.
pub fn goodness_of_variance_fit(values: &[f64], breaks: &[f64]) -> f64 {
    let total = sum_squared_deviations(values);
    if total <= 0.0 {
        return 1.0;
    }
    (1.0 - within_class_ssd(values, breaks) / total).clamp(0.0, 1.0)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn summary_handles_missing_and_even_median() {
        let sample = NumericSample {
            entries: vec![(0, 4.0), (1, 1.0), (3, 3.0), (4, 2.0)],
            missing: 1,
        };
        let s = summarize(&sample);
        assert_eq!(s.count, 4);
        assert_eq!(s.missing, 1);
        assert_eq!(s.min, Some(1.0));
        assert_eq!(s.max, Some(4.0));
        assert!((s.mean.unwrap() - 2.5).abs() < 1e-9);
        assert!((s.median.unwrap() - 2.5).abs() < 1e-9);
    }

    #[test]
    fn empty_summary_has_no_values() {
        let s = summarize(&NumericSample::default());
        assert_eq!(s.count, 0);
        assert_eq!(s.min, None);
        assert_eq!(s.median, None);
    }

    #[test]
    fn ssd_of_constant_is_zero() {
        assert_eq!(sum_squared_deviations(&[3.0, 3.0, 3.0]), 0.0);
        assert!((sum_squared_deviations(&[1.0, 3.0]) - 2.0).abs() < 1e-12);
    }

    #[test]
    fn perfect_split_has_full_fit() {
        let values = [1.0, 1.0, 10.0, 10.0, 20.0, 20.0];
        let breaks = [1.0, 10.0, 20.0, 20.0];
        assert!((goodness_of_variance_fit(&values, &breaks) - 1.0).abs() < 1e-12);
    }
}
