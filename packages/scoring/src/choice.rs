//! Scores relative to the cities being compared.

use std::cmp::Ordering;

use city_compare_scoring_models::{BaselineScore, ChoiceScore, Direction, IndicatorDefinition};

use crate::round_to;

/// Score given to a lone valid value.
pub const SINGLETON_SCORE: f64 = 100.0;

/// Score given to every city when all valid values are equal.
pub const ALL_EQUAL_SCORE: f64 = 50.0;

fn orient(score: f64, direction: Direction) -> f64 {
    match direction {
        Direction::HigherBetter => score,
        Direction::LowerBetter => 100.0 - score,
    }
}

/// Min-max normalizes one indicator across the compared cities.
///
/// `values` pairs a caller-chosen key with each city's raw value. Cities
/// whose value is `None` (or not finite) get no score at all rather than
/// a zero. A lone valid value scores [`SINGLETON_SCORE`]; identical valid
/// values all score [`ALL_EQUAL_SCORE`]. Scores are rounded to one
/// decimal.
#[must_use]
pub fn normalize_within_candidates<K: Copy>(
    values: &[(K, Option<f64>)],
    definition: &IndicatorDefinition,
) -> Vec<(K, ChoiceScore)> {
    let present: Vec<(K, f64)> = values
        .iter()
        .filter_map(|(key, value)| value.filter(|v| v.is_finite()).map(|v| (*key, v)))
        .collect();

    let choice = |score: f64| ChoiceScore {
        indicator_id: definition.id.clone(),
        score: round_to(score, 1),
    };

    if let [(key, _)] = present.as_slice() {
        return vec![(*key, choice(SINGLETON_SCORE))];
    }

    let min = present.iter().map(|(_, v)| *v).fold(f64::INFINITY, f64::min);
    let max = present.iter().map(|(_, v)| *v).fold(f64::NEG_INFINITY, f64::max);
    let range = max - min;

    present
        .into_iter()
        .map(|(key, value)| {
            let score = if range.abs() < f64::EPSILON {
                ALL_EQUAL_SCORE
            } else {
                orient((value - min) / range * 100.0, definition.direction)
            };
            (key, choice(score.clamp(0.0, 100.0)))
        })
        .collect()
}

/// Rank-based percentile of `target` within `population`.
///
/// `(below + 0.5 × equal) / size × 100`, inverted for lower-is-better
/// indicators. A missing target (or an empty population) scores 0, which
/// marks "no data" and is never inverted.
#[must_use]
#[allow(clippy::cast_precision_loss)]
pub fn calculate_percentile(
    target: Option<f64>,
    population: &[f64],
    definition: &IndicatorDefinition,
    baseline_name: &str,
) -> BaselineScore {
    let population: Vec<f64> = population.iter().copied().filter(|v| v.is_finite()).collect();
    let size = population.len();

    let percentile = match target.filter(|t| t.is_finite()) {
        Some(target) if size > 0 => {
            let (below, equal) =
                population
                    .iter()
                    .fold((0usize, 0usize), |(below, equal), v| {
                        match v.partial_cmp(&target) {
                            Some(Ordering::Less) => (below + 1, equal),
                            Some(Ordering::Equal) => (below, equal + 1),
                            _ => (below, equal),
                        }
                    });
            let raw = (below as f64 + 0.5 * equal as f64) / size as f64 * 100.0;
            round_to(orient(raw, definition.direction).clamp(0.0, 100.0), 1)
        }
        _ => 0.0,
    };

    BaselineScore {
        indicator_id: definition.id.clone(),
        percentile,
        population_size: size,
        baseline_name: baseline_name.to_string(),
    }
}
