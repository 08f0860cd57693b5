#![cfg_attr(feature = "fail-on-warnings", deny(warnings))]
#![warn(clippy::all, clippy::pedantic, clippy::nursery, clippy::cargo)]
#![allow(clippy::multiple_crate_versions, clippy::cargo_common_metadata)]

//! Generic indicator builder.
//!
//! Every domain indicator is read the same way: detect the indicator item
//! in the table's classifications, walk the periods newest-first until
//! one has data, fold retired ward codes onto their successors, and
//! convert counts to per-capita rates. Domains differ only in their label
//! scorer and per-capita scale (see [`Domain`]).

pub mod builder;
pub mod domain;
pub mod population;
pub mod source;

use std::collections::BTreeMap;

use city_compare_resolver::ResolveError;
use city_compare_scoring_models::{CityIndicators, IndicatorValue};
use city_compare_stats_models::{IndicatorSelection, TimeSelection};
use city_compare_ward::ValueKind;
use serde::{Deserialize, Serialize};
use thiserror::Error;

pub use builder::{fetch_domain, resolve_and_fetch_indicator, resolve_city_names};
pub use city_compare_ward::PopulationMap;
pub use domain::{DEFAULT_MAX_FALLBACK_YEARS, Domain};
pub use population::{
    KIDS_RATIO_ID, POPULATION_TOTAL_ID, PopulationBatch, PopulationConfig, build_population,
};
pub use source::{SourceError, StaticStatsSource, StaticTable, StatsSource};

/// Errors from the indicator builders.
#[derive(Debug, Error)]
pub enum IndicatorError {
    /// The statistics source failed.
    #[error(transparent)]
    Source(#[from] SourceError),

    /// A required classification could not be resolved.
    #[error(transparent)]
    Resolve(#[from] ResolveError),
}

/// What to read and how to label the result.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct IndicatorConfig {
    /// Catalogue identifier for the emitted values.
    pub indicator_id: String,
    /// Statistical table to read.
    pub table_id: String,
    /// Recorded on every emitted value.
    pub source_id: String,
    /// Pins the indicator item instead of detecting it.
    pub explicit_code: Option<String>,
    /// Most periods to try, newest first.
    pub max_fallback_years: usize,
    /// How non-ratio values combine across merged wards.
    pub value_kind: ValueKind,
}

impl Default for IndicatorConfig {
    fn default() -> Self {
        Self {
            indicator_id: String::new(),
            table_id: String::new(),
            source_id: String::new(),
            explicit_code: None,
            max_fallback_years: DEFAULT_MAX_FALLBACK_YEARS,
            value_kind: ValueKind::Count,
        }
    }
}

/// Scale for converting a count to a rate: `count / population × per`.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct PerCapita {
    /// Population unit (e.g. `1000.0` for "per thousand residents").
    pub per: f64,
}

impl PerCapita {
    /// Converts a count; `None` without a positive population.
    #[must_use]
    pub fn apply(self, count: f64, population: Option<f64>) -> Option<f64> {
        population
            .filter(|p| *p > 0.0)
            .map(|p| count / p * self.per)
    }
}

/// One indicator's values for the requested cities.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct IndicatorBatch {
    /// Catalogue identifier.
    pub indicator_id: String,
    /// Item the values were read from.
    pub selection: Option<IndicatorSelection>,
    /// Period the values describe.
    pub period: Option<TimeSelection>,
    /// Value per requested area code.
    pub values: BTreeMap<String, IndicatorValue>,
}

impl IndicatorBatch {
    /// A batch with no values, meaning "unavailable for this run".
    #[must_use]
    pub fn empty(indicator_id: impl Into<String>) -> Self {
        Self {
            indicator_id: indicator_id.into(),
            selection: None,
            period: None,
            values: BTreeMap::new(),
        }
    }

    /// Returns `true` if the batch holds no values at all.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.values.is_empty()
    }

    /// Appends each city's value to it, matched by area code.
    pub fn merge_into(&self, cities: &mut [CityIndicators]) {
        for city in cities {
            if let Some(value) = self.values.get(&city.area_code) {
                city.merge([value.clone()]);
            }
        }
    }
}
