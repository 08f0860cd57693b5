//! Ratings against the national distribution, independent of which
//! cities are being compared.

use std::collections::BTreeMap;

use city_compare_scoring_models::{Direction, IndicatorStarRating};

use crate::{catalogue::national_baseline, round_to};

/// Percentile returned for indicators without national breakpoints.
pub const NEUTRAL_PERCENTILE: f64 = 50.0;

/// Composite star rating when no indicator has stars.
pub const NEUTRAL_STARS: f64 = 3.0;

const BREAKPOINT_PERCENTILES: [f64; 4] = [20.0, 40.0, 60.0, 80.0];

/// Assumed lowest plausible value, as a fraction of the 20th percentile.
const FLOOR_FACTOR: f64 = 0.5;

/// Assumed highest plausible value, as a multiple of the 80th percentile.
const CEILING_FACTOR: f64 = 1.5;

/// National percentile of `raw_value` for a catalogue indicator.
///
/// Unknown indicators get [`NEUTRAL_PERCENTILE`].
#[must_use]
pub fn compute_national_percentile(
    raw_value: f64,
    indicator_id: &str,
    direction: Direction,
) -> f64 {
    national_baseline(indicator_id).map_or_else(
        || {
            log::debug!("no national baseline for {indicator_id}; using neutral percentile");
            NEUTRAL_PERCENTILE
        },
        |entry| percentile_from_breakpoints(raw_value, &entry.breakpoints, direction),
    )
}

/// Piecewise-linear percentile against `[p20, p40, p60, p80]`.
///
/// Below p20 the scale runs from 0 at `p20 × 0.5` up to 20; above p80 it
/// runs from 80 up to 100 at `p80 × 1.5`. Lower-is-better indicators are
/// inverted. The result is clamped to `[0, 100]` and rounded to one
/// decimal. Zero-width segments between equal breakpoints are skipped.
#[must_use]
pub fn percentile_from_breakpoints(
    raw_value: f64,
    breakpoints: &[f64; 4],
    direction: Direction,
) -> f64 {
    if !raw_value.is_finite() {
        return NEUTRAL_PERCENTILE;
    }

    let percentile = if raw_value < breakpoints[0] {
        below_first(raw_value, breakpoints[0])
    } else if raw_value >= breakpoints[3] {
        above_last(raw_value, breakpoints[3])
    } else {
        between(raw_value, breakpoints)
    };

    let oriented = match direction {
        Direction::HigherBetter => percentile,
        Direction::LowerBetter => 100.0 - percentile,
    };
    round_to(oriented.clamp(0.0, 100.0), 1)
}

fn below_first(value: f64, p20: f64) -> f64 {
    let floor = p20 * FLOOR_FACTOR;
    if p20 <= floor || value <= floor {
        return 0.0;
    }
    BREAKPOINT_PERCENTILES[0] * (value - floor) / (p20 - floor)
}

fn above_last(value: f64, p80: f64) -> f64 {
    let ceiling = p80 * CEILING_FACTOR;
    if ceiling <= p80 {
        return if value > p80 { 100.0 } else { BREAKPOINT_PERCENTILES[3] };
    }
    if value >= ceiling {
        return 100.0;
    }
    BREAKPOINT_PERCENTILES[3] + (100.0 - BREAKPOINT_PERCENTILES[3]) * (value - p80) / (ceiling - p80)
}

fn between(value: f64, breakpoints: &[f64; 4]) -> f64 {
    // Callers guarantee breakpoints[0] <= value < breakpoints[3].
    for i in 0..3 {
        let (lo, hi) = (breakpoints[i], breakpoints[i + 1]);
        if value < hi {
            let (p_lo, p_hi) = (BREAKPOINT_PERCENTILES[i], BREAKPOINT_PERCENTILES[i + 1]);
            return p_lo + (p_hi - p_lo) * (value - lo) / (hi - lo);
        }
    }
    BREAKPOINT_PERCENTILES[3]
}

/// Converts a percentile to 1–5 stars (80+ → 5, 60+ → 4, 40+ → 3,
/// 20+ → 2, else 1). Input is clamped to `[0, 100]` first.
#[must_use]
pub fn percentile_to_stars(percentile: f64) -> u8 {
    let p = percentile.clamp(0.0, 100.0);
    if p >= 80.0 {
        5
    } else if p >= 60.0 {
        4
    } else if p >= 40.0 {
        3
    } else if p >= 20.0 {
        2
    } else {
        1
    }
}

/// Weighted average of per-indicator stars.
///
/// `weights` is keyed by indicator ID; an indicator without an entry
/// weighs 1. Returns [`NEUTRAL_STARS`] when there is nothing to average.
/// The result is clamped to `[1, 5]` and rounded to one decimal.
#[must_use]
pub fn compute_composite_stars(
    indicator_stars: &[IndicatorStarRating],
    weights: &BTreeMap<String, f64>,
) -> f64 {
    let (weighted, total) = indicator_stars
        .iter()
        .fold((0.0, 0.0), |(weighted, total), rating| {
            let weight = weights.get(&rating.indicator_id).copied().unwrap_or(1.0);
            (weight.mul_add(f64::from(rating.stars), weighted), total + weight)
        });

    if total <= 0.0 {
        return NEUTRAL_STARS;
    }
    round_to((weighted / total).clamp(1.0, 5.0), 1)
}

#[cfg(test)]
mod tests {
    use super::*;

    const BREAKS: [f64; 4] = [2.0, 3.0, 4.0, 5.5];

    fn pct(value: f64) -> f64 {
        percentile_from_breakpoints(value, &BREAKS, Direction::HigherBetter)
    }

    #[test]
    fn interpolates_between_breakpoints() {
        assert!((pct(2.0) - 20.0).abs() < f64::EPSILON);
        assert!((pct(2.5) - 30.0).abs() < f64::EPSILON);
        assert!((pct(4.0) - 60.0).abs() < f64::EPSILON);
        assert!((pct(5.5) - 80.0).abs() < f64::EPSILON);
    }

    #[test]
    fn extrapolates_to_floor_and_ceiling() {
        assert!(pct(1.0).abs() < f64::EPSILON, "floor is p20 x 0.5");
        assert!((pct(1.5) - 10.0).abs() < f64::EPSILON);
        assert!((pct(8.25) - 100.0).abs() < f64::EPSILON, "ceiling is p80 x 1.5");
        assert!((pct(6.875) - 90.0).abs() < f64::EPSILON);
        assert!(pct(-10.0).abs() < f64::EPSILON);
        assert!((pct(1e9) - 100.0).abs() < f64::EPSILON);
    }

    #[test]
    fn lower_better_inverts() {
        let p = percentile_from_breakpoints(2.5, &BREAKS, Direction::LowerBetter);
        assert!((p - 70.0).abs() < f64::EPSILON);
    }

    #[test]
    fn monotonic_in_raw_value() {
        let samples: Vec<f64> = (0..200).map(|i| f64::from(i) * 0.05).collect();
        for pair in samples.windows(2) {
            let (a, b) = (pct(pair[0]), pct(pair[1]));
            assert!(a <= b, "higher_better not monotonic at {}: {a} > {b}", pair[1]);
            let (a, b) = (
                percentile_from_breakpoints(pair[0], &BREAKS, Direction::LowerBetter),
                percentile_from_breakpoints(pair[1], &BREAKS, Direction::LowerBetter),
            );
            assert!(a >= b, "lower_better not anti-monotonic at {}: {a} < {b}", pair[1]);
            assert!((0.0..=100.0).contains(&a));
        }
    }

    #[test]
    fn equal_breakpoints_do_not_divide_by_zero() {
        let up = |value: f64, breaks: &[f64; 4]| {
            percentile_from_breakpoints(value, breaks, Direction::HigherBetter)
        };
        let flat = [3.0, 3.0, 3.0, 3.0];
        assert!((up(3.0, &flat) - 80.0).abs() < f64::EPSILON);
        assert!((up(2.9, &flat) - 18.7).abs() < 1e-9);
        let zeros = [0.0, 0.0, 1.0, 2.0];
        assert!(up(-1.0, &zeros).abs() < f64::EPSILON);
        assert!((up(0.5, &zeros) - 50.0).abs() < f64::EPSILON);
    }

    #[test]
    fn unknown_indicator_is_neutral() {
        let unknown = compute_national_percentile(123.0, "no_such_indicator", Direction::LowerBetter);
        assert!((unknown - NEUTRAL_PERCENTILE).abs() < f64::EPSILON);
        assert!((pct(f64::NAN) - NEUTRAL_PERCENTILE).abs() < f64::EPSILON);
    }

    #[test]
    fn known_indicator_uses_embedded_breakpoints() {
        let p = compute_national_percentile(3.0, "crime_rate", Direction::LowerBetter);
        assert!((p - 60.0).abs() < f64::EPSILON);
    }

    #[test]
    fn star_thresholds() {
        assert_eq!(percentile_to_stars(100.0), 5);
        assert_eq!(percentile_to_stars(80.0), 5);
        assert_eq!(percentile_to_stars(79.9), 4);
        assert_eq!(percentile_to_stars(60.0), 4);
        assert_eq!(percentile_to_stars(40.0), 3);
        assert_eq!(percentile_to_stars(20.0), 2);
        assert_eq!(percentile_to_stars(19.9), 1);
        assert_eq!(percentile_to_stars(-5.0), 1);
        assert_eq!(percentile_to_stars(250.0), 5);
    }

    fn rating(id: &str, stars: u8) -> IndicatorStarRating {
        IndicatorStarRating {
            indicator_id: id.to_string(),
            stars,
            national_percentile: 0.0,
        }
    }

    #[test]
    fn composite_stars_weighted_average() {
        let weights: BTreeMap<String, f64> =
            [("a".to_string(), 3.0), ("b".to_string(), 1.0)].into_iter().collect();
        let stars = compute_composite_stars(&[rating("a", 5), rating("b", 1)], &weights);
        assert!((stars - 4.0).abs() < f64::EPSILON);
    }

    #[test]
    fn unweighted_indicator_counts_once() {
        let weights: BTreeMap<String, f64> = [("a".to_string(), 1.0)].into_iter().collect();
        let stars = compute_composite_stars(&[rating("a", 4), rating("unlisted", 2)], &weights);
        assert!((stars - 3.0).abs() < f64::EPSILON);
    }

    #[test]
    fn empty_composite_stars_are_neutral() {
        let empty = compute_composite_stars(&[], &BTreeMap::new());
        assert!((empty - NEUTRAL_STARS).abs() < f64::EPSILON);
        let zero: BTreeMap<String, f64> = [("a".to_string(), 0.0)].into_iter().collect();
        let weightless = compute_composite_stars(&[rating("a", 5)], &zero);
        assert!((weightless - NEUTRAL_STARS).abs() < f64::EPSILON);
    }
}
