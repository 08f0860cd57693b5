//! Embedded indicator catalogue, weight presets and national baselines.
//!
//! All three tables are TOML files under `data/`, compiled in and parsed
//! once on first use.

use std::collections::BTreeSet;
use std::sync::LazyLock;

use city_compare_scoring_models::{IndicatorDefinition, NationalBaselineEntry, WeightPreset};
use serde::Deserialize;

use crate::ScoringError;

/// Number of catalogue indicators. Enforced by a test.
#[cfg(test)]
const EXPECTED_INDICATOR_COUNT: usize = 9;

/// Allowed deviation of a preset's weight sum from 1.0.
pub const WEIGHT_SUM_TOLERANCE: f64 = 0.01;

const CATALOGUE_TOML: &str = include_str!("../data/catalogue.toml");
const PRESETS_TOML: &str = include_str!("../data/presets.toml");
const NATIONAL_BASELINES_TOML: &str = include_str!("../data/national_baselines.toml");

#[derive(Deserialize)]
struct CatalogueFile {
    #[serde(default)]
    indicator: Vec<IndicatorDefinition>,
}

#[derive(Deserialize)]
struct PresetFile {
    #[serde(default)]
    preset: Vec<WeightPreset>,
}

#[derive(Deserialize)]
struct BaselineFile {
    #[serde(default)]
    baseline: Vec<NationalBaselineEntry>,
}

static CATALOGUE: LazyLock<Vec<IndicatorDefinition>> = LazyLock::new(|| {
    parse_catalogue(CATALOGUE_TOML)
        .unwrap_or_else(|e| panic!("Failed to parse embedded indicator catalogue: {e}"))
});

static PRESETS: LazyLock<Vec<WeightPreset>> = LazyLock::new(|| {
    parse_presets(PRESETS_TOML)
        .unwrap_or_else(|e| panic!("Failed to parse embedded weight presets: {e}"))
});

static NATIONAL_BASELINES: LazyLock<Vec<NationalBaselineEntry>> = LazyLock::new(|| {
    parse_national_baselines(NATIONAL_BASELINES_TOML)
        .unwrap_or_else(|e| panic!("Failed to parse embedded national baselines: {e}"))
});

fn ensure_unique<'a>(ids: impl IntoIterator<Item = &'a str>) -> Result<(), ScoringError> {
    let mut seen = BTreeSet::new();
    for id in ids {
        if !seen.insert(id) {
            return Err(ScoringError::DuplicateId { id: id.to_string() });
        }
    }
    Ok(())
}

/// Parses an indicator catalogue.
///
/// # Errors
///
/// * [`ScoringError::Parse`] if the TOML does not match the schema.
/// * [`ScoringError::DuplicateId`] if an indicator ID repeats.
pub fn parse_catalogue(toml_str: &str) -> Result<Vec<IndicatorDefinition>, ScoringError> {
    let file: CatalogueFile =
        toml::de::from_str(toml_str).map_err(|source| ScoringError::Parse {
            file: "catalogue",
            source,
        })?;
    ensure_unique(file.indicator.iter().map(|d| d.id.as_str()))?;
    Ok(file.indicator)
}

/// Parses and validates weight presets.
///
/// # Errors
///
/// * [`ScoringError::Parse`] if the TOML does not match the schema.
/// * [`ScoringError::DuplicateId`] if a preset name repeats.
/// * [`ScoringError::InvalidWeights`] if a preset fails
///   [`validate_preset`].
pub fn parse_presets(toml_str: &str) -> Result<Vec<WeightPreset>, ScoringError> {
    let file: PresetFile = toml::de::from_str(toml_str).map_err(|source| ScoringError::Parse {
        file: "presets",
        source,
    })?;
    ensure_unique(file.preset.iter().map(|p| p.name.as_str()))?;
    for preset in &file.preset {
        validate_preset(preset)?;
    }
    Ok(file.preset)
}

/// Parses national baseline breakpoints.
///
/// # Errors
///
/// * [`ScoringError::Parse`] if the TOML does not match the schema.
/// * [`ScoringError::DuplicateId`] if an indicator appears twice.
/// * [`ScoringError::InvalidBaseline`] if breakpoints are not finite and
///   ascending.
pub fn parse_national_baselines(
    toml_str: &str,
) -> Result<Vec<NationalBaselineEntry>, ScoringError> {
    let file: BaselineFile =
        toml::de::from_str(toml_str).map_err(|source| ScoringError::Parse {
            file: "national_baselines",
            source,
        })?;
    ensure_unique(file.baseline.iter().map(|b| b.indicator_id.as_str()))?;
    for entry in &file.baseline {
        let ascending = entry.breakpoints.windows(2).all(|w| w[0] <= w[1]);
        if !ascending || entry.breakpoints.iter().any(|b| !b.is_finite()) {
            return Err(ScoringError::InvalidBaseline {
                indicator_id: entry.indicator_id.clone(),
            });
        }
    }
    Ok(file.baseline)
}

/// Checks that weights are finite, non-negative and sum to 1.0 within
/// [`WEIGHT_SUM_TOLERANCE`].
///
/// The engine itself renormalizes and accepts any non-negative weights;
/// this is the stricter check for presets supplied by callers.
///
/// # Errors
///
/// Returns [`ScoringError::InvalidWeights`] naming the first problem.
pub fn validate_preset(preset: &WeightPreset) -> Result<(), ScoringError> {
    let invalid = |reason: String| ScoringError::InvalidWeights {
        preset: preset.name.clone(),
        reason,
    };

    for (category, weight) in &preset.weights {
        if !weight.is_finite() || *weight < 0.0 {
            return Err(invalid(format!("weight for {category} is {weight}")));
        }
    }
    let sum: f64 = preset.weights.values().sum();
    if (sum - 1.0).abs() > WEIGHT_SUM_TOLERANCE {
        return Err(invalid(format!("weights sum to {sum}, expected 1.0")));
    }
    Ok(())
}

/// Every catalogue indicator, in file order.
///
/// # Panics
///
/// Panics if the embedded catalogue fails to parse. It is compiled in, so
/// a failure is a development error caught by tests.
#[must_use]
pub fn all_indicators() -> &'static [IndicatorDefinition] {
    &CATALOGUE
}

/// Looks up a catalogue indicator.
#[must_use]
pub fn indicator_definition(id: &str) -> Option<&'static IndicatorDefinition> {
    all_indicators().iter().find(|d| d.id == id)
}

/// Every built-in weight preset.
///
/// # Panics
///
/// Panics if the embedded presets fail to parse or validate.
#[must_use]
pub fn all_presets() -> &'static [WeightPreset] {
    &PRESETS
}

/// Looks up a built-in weight preset by name.
#[must_use]
pub fn weight_preset(name: &str) -> Option<&'static WeightPreset> {
    all_presets().iter().find(|p| p.name == name)
}

/// National breakpoints for an indicator.
///
/// # Panics
///
/// Panics if the embedded baselines fail to parse or validate.
#[must_use]
pub fn national_baseline(indicator_id: &str) -> Option<&'static NationalBaselineEntry> {
    NATIONAL_BASELINES
        .iter()
        .find(|b| b.indicator_id == indicator_id)
}
