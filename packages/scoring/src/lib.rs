#![cfg_attr(feature = "fail-on-warnings", deny(warnings))]
#![warn(clippy::all, clippy::pedantic, clippy::nursery, clippy::cargo)]
#![allow(clippy::multiple_crate_versions, clippy::cargo_common_metadata)]

//! Multi-indicator scoring engine.
//!
//! A scoring run is a pure function of the compared cities' raw values:
//! min-max choice scores and percentiles within the candidate set,
//! national star ratings from fixed breakpoints, a weighted composite
//! renormalized over the indicators each city actually has, a confidence
//! level, and finally a rank. Missing values never fail a run; they
//! lower coverage and confidence instead.

pub mod catalogue;
pub mod choice;
pub mod composite;
pub mod confidence;
pub mod national;

use std::collections::BTreeMap;

use chrono::Datelike;
use city_compare_scoring_models::{
    BaselineScore, ChoiceScore, CityIndicators, CityScoreResult, IndicatorDefinition,
    IndicatorStarRating, WeightPreset,
};
use thiserror::Error;

pub use catalogue::{
    all_indicators, all_presets, indicator_definition, national_baseline, validate_preset,
    weight_preset,
};
pub use choice::{calculate_percentile, normalize_within_candidates};
pub use composite::calculate_composite_score;
pub use confidence::evaluate_confidence;
pub use national::{compute_composite_stars, compute_national_percentile, percentile_to_stars};

/// Preset used when none is named.
pub const DEFAULT_PRESET: &str = "balanced";

/// Name recorded on candidate-set baseline scores.
pub const DEFAULT_BASELINE_NAME: &str = "candidates";

/// Errors from the scoring engine.
#[derive(Debug, Error)]
pub enum ScoringError {
    /// An embedded or supplied TOML table did not match its schema.
    #[error("failed to parse {file} table: {source}")]
    Parse {
        /// Which table failed.
        file: &'static str,
        /// Underlying TOML error.
        source: toml::de::Error,
    },
    /// An identifier appears twice in one table.
    #[error("duplicate identifier '{id}'")]
    DuplicateId {
        /// The repeated identifier.
        id: String,
    },
    /// National breakpoints are not finite and ascending.
    #[error("national breakpoints for {indicator_id} must be finite and ascending")]
    InvalidBaseline {
        /// Indicator whose breakpoints are invalid.
        indicator_id: String,
    },
    /// A weight preset fails validation.
    #[error("invalid weights in preset '{preset}': {reason}")]
    InvalidWeights {
        /// Preset name.
        preset: String,
        /// What is wrong.
        reason: String,
    },
    /// No built-in preset has this name.
    #[error("unknown weight preset '{name}' (available: {})", available.join(", "))]
    UnknownPreset {
        /// Requested name.
        name: String,
        /// Names of the built-in presets.
        available: Vec<String>,
    },
}

/// Options for [`score_cities`].
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ScoringOptions {
    /// Built-in preset name.
    pub preset: String,
    /// Catalogue indicators to score; empty means every catalogue
    /// indicator carried by at least one input city.
    pub indicator_ids: Vec<String>,
    /// Year data age is measured against.
    pub current_year: i32,
    /// Name recorded on the candidate-set baseline scores.
    pub baseline_name: String,
}

impl Default for ScoringOptions {
    fn default() -> Self {
        Self {
            preset: DEFAULT_PRESET.to_string(),
            indicator_ids: Vec::new(),
            current_year: chrono::Local::now().year(),
            baseline_name: DEFAULT_BASELINE_NAME.to_string(),
        }
    }
}

/// Rounds to `precision` decimal places.
#[must_use]
pub fn round_to(value: f64, precision: i32) -> f64 {
    let factor = 10f64.powi(precision);
    (value * factor).round() / factor
}

/// Sorts results by composite score, highest first, and assigns 1-based
/// ranks. Equal scores keep their input order.
pub fn rank(results: &mut [CityScoreResult]) {
    results.sort_by(|a, b| b.composite_score.total_cmp(&a.composite_score));
    for (i, result) in results.iter_mut().enumerate() {
        result.rank = i + 1;
    }
}

fn selected_definitions(
    cities: &[CityIndicators],
    options: &ScoringOptions,
) -> Vec<IndicatorDefinition> {
    if options.indicator_ids.is_empty() {
        let carried: Vec<IndicatorDefinition> = all_indicators()
            .iter()
            .filter(|d| cities.iter().any(|c| c.get(&d.id).is_some()))
            .cloned()
            .collect();
        if carried.is_empty() {
            return all_indicators().to_vec();
        }
        return carried;
    }
    options
        .indicator_ids
        .iter()
        .filter_map(|id| {
            let definition = indicator_definition(id);
            if definition.is_none() {
                log::warn!("indicator '{id}' is not in the catalogue; skipping it");
            }
            definition.cloned()
        })
        .collect()
}

/// Scores and ranks cities with a built-in preset.
///
/// # Errors
///
/// Returns [`ScoringError::UnknownPreset`] if `options.preset` is not a
/// built-in preset.
pub fn score_cities(
    cities: &[CityIndicators],
    options: &ScoringOptions,
) -> Result<Vec<CityScoreResult>, ScoringError> {
    let preset = weight_preset(&options.preset).ok_or_else(|| ScoringError::UnknownPreset {
        name: options.preset.clone(),
        available: all_presets().iter().map(|p| p.name.clone()).collect(),
    })?;
    Ok(score_cities_with_preset(cities, preset, options))
}

#[derive(Default)]
struct CityAccumulator {
    choice: Vec<ChoiceScore>,
    baseline: Vec<BaselineScore>,
    stars: Vec<IndicatorStarRating>,
    missing: Vec<String>,
    oldest_year: Option<i32>,
}

/// Scores and ranks cities with an explicit preset.
///
/// `options.preset` is ignored. The preset is not validated; weights that
/// do not sum to 1.0 are renormalized.
#[must_use]
#[allow(clippy::cast_precision_loss)]
pub fn score_cities_with_preset(
    cities: &[CityIndicators],
    preset: &WeightPreset,
    options: &ScoringOptions,
) -> Vec<CityScoreResult> {
    let definitions = selected_definitions(cities, options);
    let mut acc: Vec<CityAccumulator> = cities.iter().map(|_| CityAccumulator::default()).collect();

    for definition in &definitions {
        let values: Vec<(usize, Option<f64>)> = cities
            .iter()
            .map(|c| c.value(&definition.id))
            .enumerate()
            .collect();
        let population: Vec<f64> = values.iter().filter_map(|(_, v)| *v).collect();

        for (i, choice) in normalize_within_candidates(&values, definition) {
            acc[i].choice.push(choice);
        }

        for ((i, value), city) in values.iter().zip(cities) {
            let city_acc = &mut acc[*i];
            city_acc.baseline.push(calculate_percentile(
                *value,
                &population,
                definition,
                &options.baseline_name,
            ));

            let Some(raw) = value else {
                city_acc.missing.push(definition.label.clone());
                continue;
            };
            let national = compute_national_percentile(*raw, &definition.id, definition.direction);
            city_acc.stars.push(IndicatorStarRating {
                indicator_id: definition.id.clone(),
                stars: percentile_to_stars(national),
                national_percentile: national,
            });
            if let Some(year) = city.get(&definition.id).and_then(|v| v.data_year) {
                city_acc.oldest_year = Some(city_acc.oldest_year.map_or(year, |y| y.min(year)));
            }
        }
    }

    // Indicators whose category the preset leaves out fall back to the
    // default star weight.
    let star_weights: BTreeMap<String, f64> = definitions
        .iter()
        .filter_map(|d| preset.weights.get(&d.category).map(|w| (d.id.clone(), *w)))
        .collect();

    let mut results: Vec<CityScoreResult> = cities
        .iter()
        .zip(acc)
        .map(|(city, acc)| {
            let composite = calculate_composite_score(&acc.choice, &definitions, preset);
            let missing_rate = if definitions.is_empty() {
                0.0
            } else {
                acc.missing.len() as f64 / definitions.len() as f64
            };
            let confidence =
                evaluate_confidence(acc.oldest_year, None, missing_rate, options.current_year);

            let mut notes = vec![format!(
                "{} of {} indicators available",
                definitions.len() - acc.missing.len(),
                definitions.len()
            )];
            if !acc.missing.is_empty() {
                notes.push(format!("missing: {}", acc.missing.join(", ")));
            }
            notes.push(format!("confidence {}: {}", confidence.level, confidence.reason));

            log::debug!(
                "{} ({}): composite={} used={}/{} confidence={}",
                city.city_name,
                city.area_code,
                composite.score,
                composite.used_count,
                composite.total_count,
                confidence.level
            );

            CityScoreResult {
                city_name: city.city_name.clone(),
                area_code: city.area_code.clone(),
                baseline: acc.baseline,
                choice: acc.choice,
                composite_score: composite.score,
                confidence,
                rank: 0,
                star_rating: compute_composite_stars(&acc.stars, &star_weights),
                indicator_stars: acc.stars,
                notes,
            }
        })
        .collect();

    rank(&mut results);
    log::info!(
        "scored {} cities on {} indicators with preset '{}'",
        results.len(),
        definitions.len(),
        preset.name
    );
    results
}
