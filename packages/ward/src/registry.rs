//! Embedded ward reorganization table.
//!
//! The table lives in `data/reorganizations.toml` and is parsed once on
//! first use. Adding a boundary change is a data update: append entries
//! to the file and bump [`EXPECTED_ENTRY_COUNT`].

use std::collections::BTreeSet;
use std::sync::LazyLock;

use city_compare_ward_models::{WardReorganizationEntry, WardReorganizationTable};

use crate::WardError;

/// Number of post-merger wards in the embedded table. Enforced by a test.
#[cfg(test)]
const EXPECTED_ENTRY_COUNT: usize = 3;

const REORGANIZATIONS_TOML: &str = include_str!("../data/reorganizations.toml");

static REORGANIZATIONS: LazyLock<Vec<WardReorganizationEntry>> = LazyLock::new(|| {
    parse_reorganizations(REORGANIZATIONS_TOML)
        .unwrap_or_else(|e| panic!("Failed to parse embedded ward reorganizations: {e}"))
});

/// Parses and validates a reorganization table.
///
/// # Errors
///
/// * [`WardError::Parse`] if the TOML does not match the schema.
/// * [`WardError::NoOldWards`] if an entry lists no old wards.
/// * [`WardError::ZeroPopulation`] if an old ward has no census weight.
/// * [`WardError::DuplicateCode`] if a code appears twice anywhere in the
///   table, as a new or an old code.
pub fn parse_reorganizations(toml_str: &str) -> Result<Vec<WardReorganizationEntry>, WardError> {
    let table: WardReorganizationTable = toml::de::from_str(toml_str)?;

    let mut seen = BTreeSet::new();
    for entry in &table.reorganizations {
        if entry.old_wards.is_empty() {
            return Err(WardError::NoOldWards {
                new_code: entry.new_code.clone(),
            });
        }
        if !seen.insert(entry.new_code.as_str()) {
            return Err(WardError::DuplicateCode {
                code: entry.new_code.clone(),
            });
        }
        for ward in &entry.old_wards {
            if ward.census_population == 0 {
                return Err(WardError::ZeroPopulation {
                    code: ward.code.clone(),
                });
            }
            if !seen.insert(ward.code.as_str()) {
                return Err(WardError::DuplicateCode {
                    code: ward.code.clone(),
                });
            }
        }
    }

    Ok(table.reorganizations)
}

/// Returns every embedded reorganization entry.
///
/// # Panics
///
/// Panics if the embedded TOML fails to parse or validate. The file is
/// compiled in, so a failure is a development error caught by tests.
#[must_use]
pub fn all_reorganizations() -> &'static [WardReorganizationEntry] {
    &REORGANIZATIONS
}

/// Looks up the entry for a post-merger ward code.
#[must_use]
pub fn entry_for_new_code(code: &str) -> Option<&'static WardReorganizationEntry> {
    all_reorganizations().iter().find(|e| e.new_code == code)
}

/// Census population of a pre-merger ward.
#[must_use]
pub fn old_ward_population(code: &str) -> Option<u64> {
    all_reorganizations()
        .iter()
        .flat_map(|e| &e.old_wards)
        .find(|w| w.code == code)
        .map(|w| w.census_population)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn loads_embedded_table() {
        let entries = all_reorganizations();
        assert_eq!(
            entries.len(),
            EXPECTED_ENTRY_COUNT,
            "Expected {EXPECTED_ENTRY_COUNT} reorganization entries, found {}. \
             Update EXPECTED_ENTRY_COUNT after editing the table.",
            entries.len()
        );
    }

    #[test]
    fn entries_have_required_fields() {
        for entry in all_reorganizations() {
            assert!(!entry.new_code.is_empty(), "Entry has empty new_code");
            assert!(
                !entry.new_label.is_empty(),
                "Entry {} has empty new_label",
                entry.new_code
            );
            for ward in &entry.old_wards {
                assert!(
                    ward.code.len() == 5,
                    "Old ward {} under {} is not a 5-digit area code",
                    ward.code,
                    entry.new_code
                );
            }
        }
    }

    #[test]
    fn hamamatsu_chuo_absorbs_four_wards() {
        let entry = entry_for_new_code("22138").unwrap();
        assert_eq!(entry.old_codes(), vec!["22131", "22132", "22133", "22134"]);
        assert!(entry_for_new_code("22131").is_none());
    }

    #[test]
    fn old_ward_populations() {
        assert_eq!(old_ward_population("22135"), Some(92_548));
        assert_eq!(old_ward_population("22136"), Some(99_960));
        assert_eq!(old_ward_population("22138"), None);
    }

    #[test]
    fn rejects_duplicate_codes() {
        let toml_str = r#"
[[reorganization]]
new_code = "1"
new_label = "a"
effective = "2024-01-01"
census_year = 2020
old_wards = [{ code = "2", label = "b", census_population = 1 }]

[[reorganization]]
new_code = "3"
new_label = "c"
effective = "2024-01-01"
census_year = 2020
old_wards = [{ code = "2", label = "b", census_population = 1 }]
"#;
        assert!(matches!(
            parse_reorganizations(toml_str),
            Err(WardError::DuplicateCode { code }) if code == "2"
        ));
    }

    #[test]
    fn rejects_zero_population_and_empty_entries() {
        let zero = r#"
[[reorganization]]
new_code = "1"
new_label = "a"
effective = "2024-01-01"
census_year = 2020
old_wards = [{ code = "2", label = "b", census_population = 0 }]
"#;
        assert!(matches!(
            parse_reorganizations(zero),
            Err(WardError::ZeroPopulation { .. })
        ));

        let empty = r#"
[[reorganization]]
new_code = "1"
new_label = "a"
effective = "2024-01-01"
census_year = 2020
old_wards = []
"#;
        assert!(matches!(
            parse_reorganizations(empty),
            Err(WardError::NoOldWards { .. })
        ));
    }

    #[test]
    fn malformed_toml_is_a_parse_error() {
        assert!(matches!(
            parse_reorganizations("[[reorganization]]\nnew_code = 1"),
            Err(WardError::Parse { .. })
        ));
    }
}
