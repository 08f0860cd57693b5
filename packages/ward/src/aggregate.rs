//! Folding pre-merger ward values onto post-merger codes.
//!
//! Every fold copies the input map and only fills in a new code that is
//! absent from it. When the upstream source already reports the new code
//! the fold leaves it untouched.

use std::collections::BTreeMap;

use crate::{PopulationMap, ValueMap, WardMapping, registry::old_ward_population};

fn fold<T: Clone>(
    values: &BTreeMap<String, T>,
    mapping: &WardMapping,
    combine: impl Fn(&[(&str, &T)]) -> Option<T>,
) -> BTreeMap<String, T> {
    let mut folded = values.clone();

    for (new_code, old_codes) in mapping {
        if values.contains_key(new_code) {
            log::debug!("{new_code} already reported under its new code; not folding");
            continue;
        }
        let present: Vec<(&str, &T)> = old_codes
            .iter()
            .filter_map(|code| values.get(code).map(|v| (code.as_str(), v)))
            .collect();
        if present.is_empty() {
            continue;
        }
        if let Some(value) = combine(&present) {
            log::debug!(
                "folded {} of {} old wards into {new_code}",
                present.len(),
                old_codes.len()
            );
            folded.insert(new_code.clone(), value);
        }
    }

    folded
}

/// Sums the old-ward counts present for each new code.
///
/// Partial data is summed as-is. A new code with no contributing old
/// values stays absent rather than becoming zero.
#[must_use]
pub fn aggregate_raw_values(values: &ValueMap, mapping: &WardMapping) -> ValueMap {
    fold(values, mapping, |present| {
        Some(present.iter().map(|(_, v)| **v).sum())
    })
}

/// Averages old-ward rates weighted by census population.
///
/// Old wards without a census weight do not contribute. If none of the
/// present wards has a weight the new code stays absent.
#[must_use]
pub fn aggregate_per_capita_values(values: &ValueMap, mapping: &WardMapping) -> ValueMap {
    weighted_fold(values, mapping, census_weight)
}

/// Averages old-ward rates weighted by `population`, typically the map
/// returned by [`expand_population_map`].
///
/// An old ward missing from `population` falls back to its census
/// population.
#[must_use]
pub fn aggregate_weighted_values(
    values: &ValueMap,
    mapping: &WardMapping,
    population: &PopulationMap,
) -> ValueMap {
    weighted_fold(values, mapping, |code| {
        population
            .get(code)
            .copied()
            .or_else(|| census_weight(code))
    })
}

#[allow(clippy::cast_precision_loss)]
fn census_weight(code: &str) -> Option<f64> {
    old_ward_population(code).map(|p| p as f64)
}

fn weighted_fold(
    values: &ValueMap,
    mapping: &WardMapping,
    weight_of: impl Fn(&str) -> Option<f64>,
) -> ValueMap {
    fold(values, mapping, |present| {
        let mut weighted = 0.0;
        let mut total_weight = 0.0;
        for (code, value) in present {
            let Some(weight) = weight_of(*code).filter(|w| *w > 0.0) else {
                log::warn!("no population weight for old ward {code}; skipping it");
                continue;
            };
            weighted += **value * weight;
            total_weight += weight;
        }
        (total_weight > 0.0).then(|| weighted / total_weight)
    })
}

/// Logical OR of the old-ward flags present for each new code.
#[must_use]
pub fn aggregate_boolean_values(
    values: &BTreeMap<String, bool>,
    mapping: &WardMapping,
) -> BTreeMap<String, bool> {
    fold(values, mapping, |present| {
        Some(present.iter().any(|(_, v)| **v))
    })
}

/// Adds each old ward's census population as a synthetic entry so the
/// old codes can be weighted by [`aggregate_weighted_values`]. Present
/// entries are never replaced.
#[must_use]
pub fn expand_population_map(population: &PopulationMap, mapping: &WardMapping) -> PopulationMap {
    let mut expanded = population.clone();
    for code in mapping.values().flatten() {
        if let Some(census) = old_ward_population(code) {
            #[allow(clippy::cast_precision_loss)]
            let census = census as f64;
            expanded.entry(code.clone()).or_insert(census);
        }
    }
    expanded
}
