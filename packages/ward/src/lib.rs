#![cfg_attr(feature = "fail-on-warnings", deny(warnings))]
#![warn(clippy::all, clippy::pedantic, clippy::nursery, clippy::cargo)]
#![allow(clippy::multiple_crate_versions, clippy::cargo_common_metadata)]

//! Ward reorganization mapper.
//!
//! Designated cities occasionally merge wards and issue new area codes.
//! Statistics APIs keep publishing historical tables under the old codes,
//! so a request for a new ward returns nothing. This crate widens the
//! request to the old codes ([`expand_area_codes`]) and folds the returned
//! values back onto the new code ([`aggregate`]).

pub mod aggregate;
pub mod registry;

use std::collections::{BTreeMap, BTreeSet};

use serde::{Deserialize, Serialize};
use strum_macros::{AsRefStr, Display, EnumString};
use thiserror::Error;

pub use aggregate::{
    aggregate_boolean_values, aggregate_per_capita_values, aggregate_raw_values,
    aggregate_weighted_values, expand_population_map,
};
pub use city_compare_ward_models::{OldWard, WardReorganizationEntry};
pub use registry::{all_reorganizations, entry_for_new_code, old_ward_population};

/// New ward code to the old codes it was expanded into.
pub type WardMapping = BTreeMap<String, Vec<String>>;

/// Area code to numeric value.
pub type ValueMap = BTreeMap<String, f64>;

/// Area code to population.
pub type PopulationMap = BTreeMap<String, f64>;

/// Errors loading a ward reorganization table.
#[derive(Debug, Error)]
pub enum WardError {
    /// The TOML did not match the table schema.
    #[error("invalid ward reorganization table: {source}")]
    Parse {
        /// Underlying TOML error.
        #[from]
        source: toml::de::Error,
    },
    /// An entry lists no old wards.
    #[error("reorganization {new_code} lists no old wards")]
    NoOldWards {
        /// The offending new code.
        new_code: String,
    },
    /// An old ward has no census population to weight by.
    #[error("old ward {code} has a census population of zero")]
    ZeroPopulation {
        /// The offending old code.
        code: String,
    },
    /// A code appears more than once in the table.
    #[error("area code {code} appears more than once in the reorganization table")]
    DuplicateCode {
        /// The repeated code.
        code: String,
    },
}

/// How values of an indicator combine when wards merge.
#[derive(
    Debug,
    Clone,
    Copy,
    Default,
    PartialEq,
    Eq,
    Hash,
    Serialize,
    Deserialize,
    Display,
    EnumString,
    AsRefStr,
)]
#[serde(rename_all = "snake_case")]
#[strum(serialize_all = "snake_case")]
pub enum ValueKind {
    /// Additive counts (crimes, hospitals, residents).
    #[default]
    Count,
    /// Rates that must be population-weighted.
    PerCapita,
    /// Presence flags, encoded as `0.0` / `1.0`.
    Boolean,
}

/// Folds old-ward values onto new codes according to `kind`.
///
/// Boolean values are read as "non-zero means true" and written back as
/// `1.0` / `0.0`.
#[must_use]
pub fn aggregate(kind: ValueKind, values: &ValueMap, mapping: &WardMapping) -> ValueMap {
    match kind {
        ValueKind::Count => aggregate_raw_values(values, mapping),
        ValueKind::PerCapita => aggregate_per_capita_values(values, mapping),
        ValueKind::Boolean => {
            let flags: BTreeMap<String, bool> = values
                .iter()
                .map(|(code, v)| (code.clone(), v.abs() > f64::EPSILON))
                .collect();
            aggregate_boolean_values(&flags, mapping)
                .into_iter()
                .map(|(code, flag)| (code, if flag { 1.0 } else { 0.0 }))
                .collect()
        }
    }
}

/// Adds the old codes of every known post-merger ward to a request.
///
/// Returns the widened code list (requested codes first, then old codes
/// in table order, without duplicates) and the new-to-old mapping for the
/// codes that were expanded.
#[must_use]
pub fn expand_area_codes(requested: &[String]) -> (Vec<String>, WardMapping) {
    let mut expanded: Vec<String> = Vec::with_capacity(requested.len());
    let mut seen = BTreeSet::new();
    let mut mapping = WardMapping::new();

    for code in requested {
        if seen.insert(code.clone()) {
            expanded.push(code.clone());
        }
    }

    for code in requested {
        let Some(entry) = entry_for_new_code(code) else {
            continue;
        };
        let old_codes = entry.old_codes();
        log::debug!(
            "expanding {code} ({}) to old wards {old_codes:?}",
            entry.new_label
        );
        for old in &old_codes {
            if seen.insert(old.clone()) {
                expanded.push(old.clone());
            }
        }
        mapping.insert(code.clone(), old_codes);
    }

    (expanded, mapping)
}

#[cfg(test)]
mod tests {
    use super::*;

    fn codes(list: &[&str]) -> Vec<String> {
        list.iter().map(|c| (*c).to_string()).collect()
    }

    #[test]
    fn expands_known_new_codes() {
        let (expanded, mapping) = expand_area_codes(&codes(&["13104", "22139"]));
        assert_eq!(expanded, codes(&["13104", "22139", "22135", "22136"]));
        assert_eq!(mapping.len(), 1);
        assert_eq!(mapping["22139"], codes(&["22135", "22136"]));
    }

    #[test]
    fn expansion_deduplicates() {
        let (expanded, _) = expand_area_codes(&codes(&["22140", "22137", "22140"]));
        assert_eq!(expanded, codes(&["22140", "22137"]));
    }

    #[test]
    fn unrelated_codes_pass_through() {
        let (expanded, mapping) = expand_area_codes(&codes(&["13104"]));
        assert_eq!(expanded, codes(&["13104"]));
        assert!(mapping.is_empty());
    }

    #[test]
    fn aggregate_dispatches_on_kind() {
        let (_, mapping) = expand_area_codes(&codes(&["22138"]));
        let values: ValueMap = [("22131".to_string(), 2.0), ("22134".to_string(), 0.0)]
            .into_iter()
            .collect();

        let counts = aggregate(ValueKind::Count, &values, &mapping);
        assert!((counts["22138"] - 2.0).abs() < f64::EPSILON);

        let flags = aggregate(ValueKind::Boolean, &values, &mapping);
        assert!((flags["22138"] - 1.0).abs() < f64::EPSILON);
        assert!(flags["22134"].abs() < f64::EPSILON);

        let rates = aggregate(ValueKind::PerCapita, &values, &mapping);
        let expected = 2.0 * 235_418.0 / (235_418.0 + 101_130.0);
        assert!((rates["22138"] - expected).abs() < 1e-9);
    }

    #[test]
    fn value_kind_round_trips_through_strings() {
        assert_eq!(ValueKind::PerCapita.to_string(), "per_capita");
        assert_eq!("boolean".parse::<ValueKind>().unwrap(), ValueKind::Boolean);
    }
}
