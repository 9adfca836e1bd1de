use mapclass_rs::ClassMethod;
use mapclass_rs::classify::{class_counts, compute_breaks, compute_breaks_capped};
use mapclass_rs::stats::{sum_squared_deviations, within_class_ssd};

fn samples() -> Vec<Vec<f64>> {
    vec![
        vec![1.0, 1.0, 2.0, 3.0, 5.0, 8.0, 13.0, 21.0, 34.0],
        (1..=100).map(f64::from).collect(),
        vec![-4.5, 0.0, 0.0, 0.0, 2.25, 7.0, 7.0, 1e6],
        vec![3.0, 1.0, 2.0],
        (0..257).map(|i| ((i * 37) % 101) as f64 * 0.5 - 10.0).collect(),
    ]
}

#[test]
fn breaks_span_sample_for_every_method_and_k() {
    for values in samples() {
        let min = values.iter().copied().fold(f64::INFINITY, f64::min);
        let max = values.iter().copied().fold(f64::NEG_INFINITY, f64::max);
        for method in ClassMethod::ALL {
            for k in 3..=9 {
                let b = compute_breaks(&values, method, k);
                assert_eq!(b.len(), k + 1, "{method:?} k={k}");
                assert_eq!(b[0], min, "{method:?} k={k}");
                assert_eq!(b[k], max, "{method:?} k={k}");
                assert!(
                    b.windows(2).all(|w| w[0] <= w[1]),
                    "{method:?} k={k} not sorted: {b:?}"
                );
            }
        }
    }
}

#[test]
fn quantiles_on_uniform_sample_are_index_based() {
    let values: Vec<f64> = (1..=100).map(f64::from).collect();
    let b = compute_breaks(&values, ClassMethod::Quantile, 4);
    // sorted[(i * 100) / 4] for i in 1..4
    assert_eq!(b, vec![1.0, 26.0, 51.0, 76.0, 100.0]);
}

#[test]
fn equal_interval_matches_hand_computation() {
    let b = compute_breaks(&[0.1, 0.2, 0.2, 0.5, 0.9], ClassMethod::EqualInterval, 3);
    let expected = [0.1, 0.36667, 0.63333, 0.9];
    for (got, want) in b.iter().zip(expected) {
        assert!((got - want).abs() < 1e-4, "{b:?}");
    }
}

fn brute_force_best_3_partition(sorted: &[f64]) -> f64 {
    let n = sorted.len();
    let mut best = f64::INFINITY;
    for a in 1..n - 1 {
        for b in a + 1..n {
            let ssd = sum_squared_deviations(&sorted[..a])
                + sum_squared_deviations(&sorted[a..b])
                + sum_squared_deviations(&sorted[b..]);
            best = best.min(ssd);
        }
    }
    best
}

#[test]
fn natural_breaks_is_optimal_against_brute_force() {
    let data = [1.0, 1.0, 2.0, 3.0, 5.0, 8.0, 13.0, 21.0, 34.0];
    let breaks = compute_breaks(&data, ClassMethod::NaturalBreaks, 3);
    let got = within_class_ssd(&data, &breaks);
    let best = brute_force_best_3_partition(&data);
    assert!(got <= best + 1e-9, "jenks {got} > brute force {best} ({breaks:?})");

    for method in [ClassMethod::Quantile, ClassMethod::EqualInterval] {
        let other = within_class_ssd(&data, &compute_breaks(&data, method, 3));
        assert!(got <= other + 1e-9);
    }
}

#[test]
fn natural_breaks_optimal_on_second_dataset() {
    let data = [2.0, 4.0, 4.5, 9.0, 9.5, 10.0, 30.0, 31.0, 33.0, 60.0];
    let breaks = compute_breaks(&data, ClassMethod::NaturalBreaks, 3);
    let got = within_class_ssd(&data, &breaks);
    assert!(got <= brute_force_best_3_partition(&data) + 1e-9);
}

#[test]
fn degenerate_samples_collapse_without_error() {
    for method in ClassMethod::ALL {
        assert_eq!(compute_breaks(&[], method, 5), vec![0.0; 6]);
        assert_eq!(compute_breaks(&[7.0; 12], method, 4), vec![7.0; 5]);
        let b = compute_breaks(&[f64::NAN, 1.0, f64::INFINITY, 3.0], method, 3);
        assert_eq!((b[0], b[3]), (1.0, 3.0));
    }
}

#[test]
fn capped_natural_breaks_keeps_endpoints() {
    let values: Vec<f64> = (0..5_000).map(|i| (i as f64).sqrt()).collect();
    let b = compute_breaks_capped(&values, ClassMethod::NaturalBreaks, 5, 300);
    assert_eq!(b.len(), 6);
    assert_eq!(b[0], 0.0);
    assert_eq!(b[5], 4_999f64.sqrt());
    let counts = class_counts(&values, &b);
    assert_eq!(counts.iter().sum::<usize>(), values.len());
}
