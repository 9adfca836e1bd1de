//! Class breaks over a numeric sample.
//!
//! Three methods are supported: quantile, equal interval, and Fisher–Jenks
//! natural breaks. Every method returns `k + 1` non-decreasing boundaries whose
//! first element is the sample minimum and whose last is the sample maximum.
//! Degenerate samples (empty or constant) collapse to `k + 1` copies of one
//! value instead of failing; callers render those as a single class.
//!
//! Natural breaks is an exact dynamic program costing O(N²·k) time and
//! O(N·k) memory. Samples above [`DEFAULT_NATURAL_BREAKS_CAP`] (or the cap
//! passed to [`compute_breaks_capped`]) are thinned to an evenly strided
//! subsample of the sorted values before optimizing.

use serde::{Deserialize, Serialize};

/// Smallest class count offered to users.
pub const MIN_CLASSES: usize = 3;
/// Largest class count offered to users.
pub const MAX_CLASSES: usize = 9;
/// Largest sample the natural-breaks optimizer runs on unthinned.
pub const DEFAULT_NATURAL_BREAKS_CAP: usize = 4_000;

/// Classification method.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub enum ClassMethod {
    #[default]
    Quantile,
    EqualInterval,
    NaturalBreaks,
}

impl ClassMethod {
    pub const ALL: [ClassMethod; 3] = [
        ClassMethod::Quantile,
        ClassMethod::EqualInterval,
        ClassMethod::NaturalBreaks,
    ];

    pub fn label(&self) -> &'static str {
        match self {
            ClassMethod::Quantile => "Quantile",
            ClassMethod::EqualInterval => "Equal interval",
            ClassMethod::NaturalBreaks => "Natural breaks (Jenks)",
        }
    }

    /// Parse a method tag such as `quantile`, `equal-interval`, or `jenks`.
    pub fn parse(tag: &str) -> Option<Self> {
        match tag.trim().to_ascii_lowercase().replace('_', "-").as_str() {
            "quantile" => Some(ClassMethod::Quantile),
            "equal-interval" | "equal" => Some(ClassMethod::EqualInterval),
            "natural-breaks" | "jenks" => Some(ClassMethod::NaturalBreaks),
            _ => None,
        }
    }
}

/// Clamp a requested class count into the supported range.
pub fn clamp_class_count(k: usize) -> usize {
    k.clamp(MIN_CLASSES, MAX_CLASSES)
}

/// Compute `k + 1` class breaks with the default natural-breaks cap.
pub fn compute_breaks(values: &[f64], method: ClassMethod, k: usize) -> Vec<f64> {
    compute_breaks_capped(values, method, k, DEFAULT_NATURAL_BREAKS_CAP)
}

/// Compute `k + 1` class breaks. `natural_breaks_cap` bounds the sample size
/// handed to the O(N²·k) natural-breaks optimizer.
pub fn compute_breaks_capped(
    values: &[f64],
    method: ClassMethod,
    k: usize,
    natural_breaks_cap: usize,
) -> Vec<f64> {
    let k = k.max(1);
    let mut sorted: Vec<f64> = values.iter().copied().filter(|v| v.is_finite()).collect();
    sorted.sort_by(f64::total_cmp);

    let (min, max) = match (sorted.first(), sorted.last()) {
        (Some(&lo), Some(&hi)) => (lo, hi),
        _ => return vec![0.0; k + 1],
    };
    if min == max {
        return vec![min; k + 1];
    }

    match method {
        ClassMethod::EqualInterval => equal_interval(min, max, k),
        ClassMethod::Quantile => quantile(&sorted, k),
        ClassMethod::NaturalBreaks => {
            if sorted.len() > natural_breaks_cap.max(2) {
                log::warn!(
                    "natural breaks: thinning {} values to {}",
                    sorted.len(),
                    natural_breaks_cap.max(2)
                );
                let thinned = stride_sample(&sorted, natural_breaks_cap.max(2));
                natural_breaks(&thinned, k)
            } else {
                natural_breaks(&sorted, k)
            }
        }
    }
}

/// `min + i·(max−min)/k`, last break pinned to `max`.
fn equal_interval(min: f64, max: f64, k: usize) -> Vec<f64> {
    let step = (max - min) / k as f64;
    let mut breaks: Vec<f64> = (0..=k).map(|i| min + step * i as f64).collect();
    breaks[k] = max;
    breaks
}

/// Index-based quantiles over ascending `sorted`. Duplicate breaks are kept.
fn quantile(sorted: &[f64], k: usize) -> Vec<f64> {
    let n = sorted.len();
    let mut breaks = Vec::with_capacity(k + 1);
    breaks.push(sorted[0]);
    for i in 1..k {
        breaks.push(sorted[(i * n) / k]);
    }
    breaks.push(sorted[n - 1]);
    breaks
}

/// Fisher–Jenks optimal partition of ascending `sorted` into `k` classes.
///
/// `cost[j][i]` is the minimum within-class SSD for the first `j` values in
/// `i` classes; `start[j][i]` is where the last of those classes begins.
/// Each break is the first value of its class, so that step lookups
/// (`value >= breaks[i]`) reproduce the optimal partition.
fn natural_breaks(sorted: &[f64], k: usize) -> Vec<f64> {
    let n = sorted.len();
    if n <= k {
        let mut breaks = sorted.to_vec();
        breaks.resize(k + 1, sorted[n - 1]);
        return breaks;
    }

    // SSD is shift invariant; centering on the minimum keeps the running sums small.
    let origin = sorted[0];
    let mut cost = vec![vec![f64::INFINITY; k + 1]; n + 1];
    let mut start = vec![vec![0usize; k + 1]; n + 1];
    cost[0][0] = 0.0;

    for j in 1..=n {
        let (mut sum, mut sum_sq) = (0.0f64, 0.0f64);
        for m in (0..j).rev() {
            let v = sorted[m] - origin;
            sum += v;
            sum_sq += v * v;
            let w = (j - m) as f64;
            let ssd = (sum_sq - sum * sum / w).max(0.0);
            for i in 1..=k.min(j) {
                let prev = cost[m][i - 1];
                if prev.is_finite() && prev + ssd < cost[j][i] {
                    cost[j][i] = prev + ssd;
                    start[j][i] = m;
                }
            }
        }
    }

    let mut breaks = vec![0.0; k + 1];
    breaks[k] = sorted[n - 1];
    let mut end = n;
    for i in (1..=k).rev() {
        let m = start[end][i];
        breaks[i - 1] = sorted[m];
        end = m;
    }
    breaks
}

/// Evenly strided subsample of ascending `sorted`, always keeping both ends.
fn stride_sample(sorted: &[f64], cap: usize) -> Vec<f64> {
    let n = sorted.len();
    (0..cap)
        .map(|t| {
            let idx = ((t as f64) * (n - 1) as f64 / (cap - 1) as f64).round() as usize;
            sorted[idx.min(n - 1)]
        })
        .collect()
}

/// Class index of `value` under step semantics: the number of inner
/// thresholds `breaks[1..k]` that `value` reaches. Values at a threshold go
/// to the upper class.
pub fn class_of(value: f64, breaks: &[f64]) -> usize {
    let k = breaks.len().saturating_sub(1);
    if k <= 1 {
        return 0;
    }
    breaks[1..k].iter().take_while(|&&b| value >= b).count()
}

/// Number of values falling into each of the `breaks.len() - 1` classes.
pub fn class_counts(values: &[f64], breaks: &[f64]) -> Vec<usize> {
    let k = breaks.len().saturating_sub(1).max(1);
    let mut counts = vec![0; k];
    for &v in values {
        counts[class_of(v, breaks)] += 1;
    }
    counts
}

/// True when all breaks are equal, i.e. the classification has a single class.
pub fn is_degenerate(breaks: &[f64]) -> bool {
    match (breaks.first(), breaks.last()) {
        (Some(a), Some(b)) => a == b,
        _ => true,
    }
}
