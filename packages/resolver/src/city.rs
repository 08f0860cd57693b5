//! Municipality name resolution against area entries.
//!
//! Matching runs in stages, loosest last, and stops at the first stage
//! that yields exactly one area:
//!
//! 1. exact match on the normalized label, then with a leading prefecture
//!    stripped from either side
//! 2. kana-normalized match (katakana input against hiragana, or against
//!    the dictionary reading of a kanji label)
//! 3. reverse lookup of pure-kana input through the reading dictionary
//! 4. substring containment
//!
//! Several matches in any stage is an ambiguity failure, and the looser
//! stages after it are not consulted: a looser stage can only add
//! candidates, never pick among the ones already tied. Nothing is ever
//! guessed: an unmatched name fails with ranked suggestions.

use city_compare_label::{
    is_kana_only, katakana_to_hiragana, lookup_reading, normalize_label, reading_of,
    shared_char_count, strip_prefecture,
};
use city_compare_stats_models::AreaEntry;
use serde::{Deserialize, Serialize};
use strum_macros::{AsRefStr, Display, EnumString};

use crate::ResolveError;

/// Maximum number of suggestions attached to [`ResolveError::CityNotFound`].
pub const MAX_SUGGESTIONS: usize = 8;

/// Which matching stage resolved a name.
#[derive(
    Debug,
    Clone,
    Copy,
    PartialEq,
    Eq,
    PartialOrd,
    Ord,
    Hash,
    Serialize,
    Deserialize,
    Display,
    EnumString,
    AsRefStr,
)]
#[serde(rename_all = "snake_case")]
#[strum(serialize_all = "snake_case")]
pub enum MatchStage {
    /// Exact normalized label.
    Exact,
    /// Kana-normalized label or reading.
    Kana,
    /// Reading dictionary reverse lookup.
    Reading,
    /// Substring containment.
    Substring,
}

/// A user-supplied municipality name resolved to one area.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct CityResolution {
    /// Name as supplied.
    pub input_text: String,
    /// Label of the matched area.
    pub resolved_label: String,
    /// Code of the matched area.
    pub code: String,
    /// Stage that produced the match.
    pub stage: MatchStage,
}

/// Precomputed comparison forms of one area entry.
struct Prepared<'a> {
    entry: &'a AreaEntry,
    normalized: String,
    stripped: String,
}

impl<'a> Prepared<'a> {
    fn new(entry: &'a AreaEntry) -> Self {
        let normalized = normalize_label(&entry.label);
        let stripped = strip_prefecture(&normalized).to_string();
        Self {
            entry,
            normalized,
            stripped,
        }
    }
}

/// Resolves every input name to exactly one area.
///
/// # Errors
///
/// Fails on the first input that is ambiguous
/// ([`ResolveError::AmbiguousCity`]) or unmatched
/// ([`ResolveError::CityNotFound`]); no partial result is returned.
pub fn resolve_cities(
    inputs: &[&str],
    entries: &[AreaEntry],
) -> Result<Vec<CityResolution>, ResolveError> {
    let prepared: Vec<Prepared<'_>> = entries.iter().map(Prepared::new).collect();
    inputs
        .iter()
        .map(|input| resolve_city(input, &prepared))
        .collect()
}

fn resolve_city(input: &str, entries: &[Prepared<'_>]) -> Result<CityResolution, ResolveError> {
    let normalized = normalize_label(input);
    let stripped = strip_prefecture(&normalized).to_string();
    let kana = katakana_to_hiragana(&stripped);

    // The full-label pass runs before the prefecture-stripped pass so a
    // prefecture-qualified input can pick one of several same-named wards.
    let stages: [(MatchStage, Box<dyn Fn(&Prepared<'_>) -> bool + '_>); 5] = [
        (MatchStage::Exact, Box::new(|e| e.normalized == normalized)),
        (
            MatchStage::Exact,
            Box::new(|e| {
                e.stripped == normalized || e.normalized == stripped || e.stripped == stripped
            }),
        ),
        (
            MatchStage::Kana,
            Box::new(|e| {
                katakana_to_hiragana(&e.stripped) == kana
                    || katakana_to_hiragana(&e.normalized) == kana
                    || reading_of(&e.stripped) == Some(kana.as_str())
            }),
        ),
        (
            MatchStage::Reading,
            Box::new(|e| {
                is_kana_only(input) && lookup_reading(&kana).is_some_and(|kanji| e.stripped == kanji)
            }),
        ),
        (
            MatchStage::Substring,
            Box::new(|e| !stripped.is_empty() && e.stripped.contains(stripped.as_str())),
        ),
    ];

    for (stage, predicate) in &stages {
        let hits: Vec<&Prepared<'_>> = entries.iter().filter(|e| predicate(*e)).collect();
        match hits.as_slice() {
            [] => {}
            [hit] => {
                log::debug!(
                    "resolved '{input}' to {} ({}) at {stage} stage",
                    hit.entry.label,
                    hit.entry.code
                );
                return Ok(CityResolution {
                    input_text: input.to_string(),
                    resolved_label: hit.entry.label.clone(),
                    code: hit.entry.code.clone(),
                    stage: *stage,
                });
            }
            many => {
                return Err(ResolveError::AmbiguousCity {
                    input: input.to_string(),
                    candidates: many.iter().map(|e| e.entry.clone()).collect(),
                });
            }
        }
    }

    Err(ResolveError::CityNotFound {
        input: input.to_string(),
        suggestions: suggestions(&stripped, entries),
    })
}

/// Similarity used to rank suggestions: 100 for equality, 70 for
/// containment either way, else the count of shared distinct characters.
#[must_use]
pub fn similarity(input: &str, label: &str) -> usize {
    if input == label {
        100
    } else if !input.is_empty() && (label.contains(input) || input.contains(label)) {
        70
    } else {
        shared_char_count(input, label)
    }
}

fn suggestions(input: &str, entries: &[Prepared<'_>]) -> Vec<AreaEntry> {
    let mut scored: Vec<(usize, &Prepared<'_>)> = entries
        .iter()
        .map(|e| (similarity(input, &e.stripped), e))
        .filter(|(score, _)| *score > 0)
        .collect();
    scored.sort_by(|a, b| b.0.cmp(&a.0));
    scored
        .into_iter()
        .take(MAX_SUGGESTIONS)
        .map(|(_, e)| e.entry.clone())
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;

    fn entries(pairs: &[(&str, &str)]) -> Vec<AreaEntry> {
        pairs
            .iter()
            .map(|(code, label)| AreaEntry {
                code: (*code).to_string(),
                label: (*label).to_string(),
            })
            .collect()
    }

    fn tokyo() -> Vec<AreaEntry> {
        entries(&[
            ("13000", "東京都"),
            ("13101", "東京都 千代田区"),
            ("13104", "東京都 新宿区"),
            ("13112", "東京都 世田谷区"),
            ("13113", "東京都 渋谷区"),
            ("13201", "東京都 八王子市"),
        ])
    }

    fn resolve_one(input: &str, list: &[AreaEntry]) -> Result<CityResolution, ResolveError> {
        resolve_cities(&[input], list).map(|mut v| v.remove(0))
    }

    #[test]
    fn exact_match_with_and_without_prefecture() {
        let list = tokyo();
        let r = resolve_one("新宿区", &list).unwrap();
        assert_eq!(r.code, "13104");
        assert_eq!(r.stage, MatchStage::Exact);

        let r = resolve_one("東京都新宿区", &list).unwrap();
        assert_eq!(r.code, "13104");
        assert_eq!(r.resolved_label, "東京都 新宿区");
    }

    #[test]
    fn exact_match_folds_width_and_spaces() {
        let list = entries(&[("1", "ＡＢＣ市")]);
        assert_eq!(resolve_one(" abc市 ", &list).unwrap().code, "1");
    }

    #[test]
    fn katakana_input_resolves_through_kana_stage() {
        let list = tokyo();
        let r = resolve_one("シンジュクク", &list).unwrap();
        assert_eq!(r.code, "13104");
        assert_eq!(r.resolved_label, "東京都 新宿区");
        assert_eq!(r.stage, MatchStage::Kana);
    }

    #[test]
    fn katakana_input_matches_hiragana_label() {
        let list = entries(&[("08220", "茨城県 つくば市"), ("08201", "茨城県 水戸市")]);
        let r = resolve_one("ツクバ市", &list).unwrap();
        assert_eq!(r.code, "08220");
        assert_eq!(r.stage, MatchStage::Kana);
    }

    #[test]
    fn kana_without_suffix_uses_reading_dictionary() {
        let list = tokyo();
        let r = resolve_one("せたがや", &list).unwrap();
        assert_eq!(r.code, "13112");
        assert_eq!(r.stage, MatchStage::Reading);
    }

    #[test]
    fn substring_stage_is_last_resort() {
        let list = tokyo();
        let r = resolve_one("八王子", &list).unwrap();
        assert_eq!(r.code, "13201");
        assert_eq!(r.stage, MatchStage::Substring);
    }

    #[test]
    fn duplicate_exact_match_is_ambiguous_immediately() {
        let list = entries(&[
            ("13102", "東京都 中央区"),
            ("22138", "静岡県 中央区"),
            ("99999", "中央区役所前"),
        ]);
        match resolve_one("中央区", &list) {
            Err(ResolveError::AmbiguousCity { candidates, .. }) => {
                let codes: Vec<&str> = candidates.iter().map(|c| c.code.as_str()).collect();
                // The substring-only entry is never considered.
                assert_eq!(codes, vec!["13102", "22138"]);
            }
            other => panic!("unexpected result: {other:?}"),
        }
    }

    #[test]
    fn ambiguous_kana_stage_does_not_fall_through() {
        let list = entries(&[
            ("08220", "茨城県 つくば市"),
            ("01999", "北海道 つくば市"),
            ("99002", "つくば市場町"),
        ]);
        match resolve_one("ツクバ市", &list) {
            Err(ResolveError::AmbiguousCity { candidates, .. }) => {
                let codes: Vec<&str> = candidates.iter().map(|c| c.code.as_str()).collect();
                assert_eq!(codes, vec!["08220", "01999"]);
            }
            other => panic!("unexpected result: {other:?}"),
        }
    }

    #[test]
    fn prefecture_qualified_input_disambiguates() {
        let list = entries(&[("13102", "東京都 中央区"), ("22138", "静岡県 中央区")]);
        assert_eq!(resolve_one("静岡県中央区", &list).unwrap().code, "22138");
        let list = entries(&[("13102", "東京都中央区"), ("22138", "浜松市中央区")]);
        assert_eq!(resolve_one("浜松市中央区", &list).unwrap().code, "22138");
    }

    #[test]
    fn ambiguous_substring_fails() {
        let list = entries(&[("1", "北区"), ("2", "北上市")]);
        assert!(matches!(
            resolve_one("北", &list),
            Err(ResolveError::AmbiguousCity { .. })
        ));
    }

    #[test]
    fn not_found_carries_ranked_suggestions() {
        let list = tokyo();
        match resolve_one("新宿市", &list) {
            Err(ResolveError::CityNotFound { input, suggestions }) => {
                assert_eq!(input, "新宿市");
                assert!(!suggestions.is_empty());
                assert!(suggestions.len() <= MAX_SUGGESTIONS);
                assert_eq!(suggestions[0].code, "13104");
            }
            other => panic!("unexpected result: {other:?}"),
        }
    }

    #[test]
    fn suggestions_are_capped() {
        let labels: Vec<(String, String)> = (0..20)
            .map(|i| (i.to_string(), format!("テスト{i}区")))
            .collect();
        let list: Vec<AreaEntry> = labels
            .iter()
            .map(|(c, l)| AreaEntry {
                code: c.clone(),
                label: l.clone(),
            })
            .collect();
        match resolve_one("存在しない区", &list) {
            Err(ResolveError::CityNotFound { suggestions, .. }) => {
                assert_eq!(suggestions.len(), MAX_SUGGESTIONS);
            }
            other => panic!("unexpected result: {other:?}"),
        }
    }

    #[test]
    fn similarity_scores() {
        assert_eq!(similarity("新宿区", "新宿区"), 100);
        assert_eq!(similarity("新宿", "新宿区"), 70);
        assert_eq!(similarity("新宿区役所", "新宿区"), 70);
        assert_eq!(similarity("新宿市", "新宿区"), 2);
    }

    #[test]
    fn one_failure_fails_the_batch() {
        let list = tokyo();
        assert!(resolve_cities(&["新宿区", "どこにもない市"], &list).is_err());
        assert_eq!(resolve_cities(&["新宿区", "渋谷区"], &list).unwrap().len(), 2);
    }
}
