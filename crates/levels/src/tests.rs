use domain::{Price, Ratio};
use rand::rngs::StdRng;
use rand::{Rng, SeedableRng};

use crate::analysis::{AnalysisParams, AnalysisSession, analyze};
use crate::cluster::cluster_levels;
use crate::error::LevelsError;
use crate::pivot::{PivotKind, find_pivots, pivot_prices};
use crate::rank::rank_levels;

fn prices(raw: &[f64]) -> Vec<Price> {
    raw.iter().copied().map(Price).collect()
}

/// Random walk around 100, rounded to cents so plateaus show up
fn walk(rng: &mut StdRng, n: usize) -> Vec<Price> {
    let mut p = 100.0_f64;
    (0..n)
        .map(|_| {
            p = (p + rng.gen_range(-2.0..2.0)).max(1.0);
            Price((p * 100.0).round() / 100.0)
        })
        .collect()
}

fn params(window_order: usize, tolerance: f64, max_levels: usize) -> AnalysisParams {
    AnalysisParams {
        window_order,
        tolerance: Ratio(tolerance),
        max_levels,
    }
}

#[test]
fn pivots_dominate_their_clipped_window() {
    let mut rng = StdRng::seed_from_u64(7);

    for _ in 0..50 {
        let n = rng.gen_range(1..120);
        let w = rng.gen_range(1..8);
        let s = walk(&mut rng, n);

        for p in find_pivots(&s, w, PivotKind::Support).unwrap() {
            let lo = p.index.saturating_sub(w);
            let hi = p.index.saturating_add(w).min(n - 1);
            assert!(s[lo..=hi].iter().all(|x| p.price.0 <= x.0));
        }

        for p in find_pivots(&s, w, PivotKind::Resistance).unwrap() {
            let lo = p.index.saturating_sub(w);
            let hi = p.index.saturating_add(w).min(n - 1);
            assert!(s[lo..=hi].iter().all(|x| p.price.0 >= x.0));
        }
    }
}

#[test]
fn touch_counts_sum_to_candidates() {
    let mut rng = StdRng::seed_from_u64(11);

    for _ in 0..50 {
        let s = walk(&mut rng, 250);
        let t = rng.gen_range(0.001..0.1);

        for kind in [PivotKind::Support, PivotKind::Resistance] {
            let pivots = find_pivots(&s, 3, kind).unwrap();
            let clusters = cluster_levels(&pivot_prices(&pivots), Ratio(t), kind).unwrap();
            let total: usize = clusters.iter().map(|c| c.touches).sum();
            assert_eq!(total, pivots.len());
        }
    }
}

#[test]
fn reclustering_representatives_is_a_fixed_point() {
    let mut rng = StdRng::seed_from_u64(13);

    for _ in 0..50 {
        let raw: Vec<Price> = (0..60).map(|_| Price(rng.gen_range(50.0..150.0))).collect();
        let t = Ratio(rng.gen_range(0.005..0.05));

        let first = cluster_levels(&raw, t, PivotKind::Support).unwrap();
        let reps: Vec<Price> = first.iter().map(|c| c.price).collect();
        let second = cluster_levels(&reps, t, PivotKind::Support).unwrap();

        // each band opened on a close more than t above the previous mean,
        // so no two representatives are within tolerance of each other
        assert_eq!(second.len(), reps.len());
        assert!(second.iter().all(|c| c.touches == 1));
        assert_eq!(second.iter().map(|c| c.price).collect::<Vec<_>>(), reps);

        let mut at = 0;
        for c in &second {
            let members = &reps[at..at + c.touches];
            for (i, a) in members.iter().enumerate() {
                for b in &members[i + 1..] {
                    let mean = (a.0 + b.0) / 2.0;
                    assert!((a.0 - b.0).abs() / mean <= t.0);
                }
            }
            at += c.touches;
        }
    }
}

#[test]
fn reclustering_splits_representatives_further_apart_than_tolerance() {
    let reps = prices(&[100.0, 103.0, 106.1]);
    let second = cluster_levels(&reps, Ratio(0.02), PivotKind::Resistance).unwrap();
    assert_eq!(second.len(), 3);
}

#[test]
fn ranked_lists_are_bounded_and_non_increasing() {
    let mut rng = StdRng::seed_from_u64(17);

    for _ in 0..50 {
        let s = walk(&mut rng, 300);
        let max_levels = rng.gen_range(1..8);
        let r = analyze(&s, params(rng.gen_range(1..6), 0.01, max_levels)).unwrap();

        for kind in [PivotKind::Support, PivotKind::Resistance] {
            let levels = r.levels(kind);
            assert!(levels.len() <= max_levels);
            assert!(levels.windows(2).all(|w| w[0].touches >= w[1].touches));
            assert!(levels.iter().all(|l| l.kind == kind));
        }
    }
}

#[test]
fn scenario_valley_peak_valley() {
    let s = prices(&[10.0, 9.0, 8.0, 9.0, 10.0, 11.0, 10.0, 9.0, 8.0, 9.0, 10.0]);
    let r = analyze(&s, params(1, 0.02, 5)).unwrap();

    assert_eq!(r.current_price(), Price(10.0));
    assert_eq!(r.candidates(PivotKind::Support), 2);
    assert_eq!(r.candidates(PivotKind::Resistance), 3);

    // both valleys at 8 form one band
    assert_eq!(r.support().len(), 1);
    assert_eq!(r.support()[0].touches, 2);
    assert_eq!(r.support()[0].price, Price(8.0));
    assert!((r.support()[0].distance_pct.0 + 20.0).abs() < 1e-9);

    // edge highs at 10 touch twice, the peak at 11 once
    let touches: Vec<usize> = r.resistance().iter().map(|l| l.touches).collect();
    assert_eq!(touches, vec![2, 1]);
    assert_eq!(r.resistance()[0].price, Price(10.0));
    assert_eq!(r.resistance()[1].price, Price(11.0));
}

#[test]
fn scenario_ranking_truncates() {
    let raw = prices(&[
        10.0, 10.0, 10.0, 10.0, 10.0, 20.0, 20.0, 20.0, 20.0, 30.0, 30.0, 30.0, 40.0, 40.0, 50.0,
    ]);
    let clusters = cluster_levels(&raw, Ratio(0.01), PivotKind::Support).unwrap();
    let ranked = rank_levels(&clusters, Price(25.0), 2).unwrap();
    let touches: Vec<usize> = ranked.iter().map(|l| l.touches).collect();
    assert_eq!(touches, vec![5, 4]);
}

#[test]
fn empty_series_is_an_error() {
    assert_eq!(
        analyze(&[], AnalysisParams::default()).unwrap_err(),
        LevelsError::EmptySeries
    );
}

#[test]
fn bad_parameters_surface_before_work() {
    let s = prices(&[1.0, 2.0, 3.0]);

    let e = analyze(&s, params(0, 0.02, 5)).unwrap_err();
    assert!(matches!(e, LevelsError::InvalidParameter { name: "window_order", .. }));

    let e = analyze(&s, params(1, 1.2, 5)).unwrap_err();
    assert!(matches!(e, LevelsError::InvalidParameter { name: "tolerance", .. }));

    let e = analyze(&s, params(1, 0.02, 0)).unwrap_err();
    assert!(matches!(e, LevelsError::InvalidParameter { name: "max_levels", .. }));
}

#[test]
fn non_finite_close_is_reported_with_index() {
    let s = prices(&[1.0, f64::NAN, 3.0]);
    assert_eq!(
        analyze(&s, AnalysisParams::default()).unwrap_err(),
        LevelsError::NonFinitePrice { index: 1 }
    );
}

#[test]
fn single_close_is_its_own_level() {
    let r = analyze(&prices(&[50.0]), AnalysisParams::default()).unwrap();
    assert_eq!(r.support().len(), 1);
    assert_eq!(r.resistance().len(), 1);
    assert_eq!(r.support()[0].distance_pct.0, 0.0);
}

#[test]
fn huge_window_order_covers_the_whole_series() {
    let s = prices(&[3.0, 1.0, 2.0]);
    let wide = analyze(&s, params(usize::MAX, 0.02, 5)).unwrap();
    let narrow = analyze(&s, params(2, 0.02, 5)).unwrap();

    assert_eq!(wide.support(), narrow.support());
    assert_eq!(wide.resistance(), narrow.resistance());
    assert_eq!(wide.support()[0].price, Price(1.0));
    assert_eq!(wide.resistance()[0].price, Price(3.0));
    assert_eq!(wide.candidates(PivotKind::Support), 1);
    assert_eq!(wide.candidates(PivotKind::Resistance), 1);
}

#[test]
fn session_matches_free_function() {
    let mut rng = StdRng::seed_from_u64(23);
    let s = walk(&mut rng, 200);
    let p = params(4, 0.015, 3);

    let session = AnalysisSession::new(p);
    assert_eq!(session.run(&s).unwrap(), analyze(&s, p).unwrap());
    assert_eq!(session.params(), p);
}
