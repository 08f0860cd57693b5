#![cfg_attr(feature = "fail-on-warnings", deny(warnings))]
#![warn(clippy::all, clippy::pedantic, clippy::nursery, clippy::cargo)]
#![allow(clippy::multiple_crate_versions, clippy::cargo_common_metadata)]

//! Label normalization for Japanese statistical tables.
//!
//! Statistical APIs label their classification items with free text that
//! mixes full-width and half-width characters, stray whitespace, and both
//! kana scripts. Every heuristic in the workspace compares labels through
//! the canonical form produced here rather than the raw strings.
//!
//! The crate also carries two read-only tables used for municipality name
//! resolution: the prefecture list (for stripping a leading prefecture
//! from a label) and a reading dictionary that maps hiragana readings to
//! kanji municipality names.

pub mod kana;
pub mod prefecture;
pub mod reading;

use std::collections::BTreeSet;

pub use kana::{katakana_to_hiragana, widen_halfwidth_katakana};
pub use prefecture::strip_prefecture;
pub use reading::{lookup_reading, reading_of};

/// Characters that mark a municipality-level label (city, ward, town,
/// village).
pub const MUNICIPAL_SUFFIXES: &[char] = &['市', '区', '町', '村'];

/// Folds a label into its canonical comparison form.
///
/// - full-width ASCII → ASCII, ideographic space → space
/// - half-width katakana → full-width katakana (with voicing marks merged)
/// - every tilde / wave-dash variant → `~`, every dash variant → `-`
/// - ASCII lowercase
/// - all whitespace removed
#[must_use]
pub fn normalize_label(raw: &str) -> String {
    let widened = widen_halfwidth_katakana(raw);

    widened
        .chars()
        .map(fold_width)
        .filter(|c| !c.is_whitespace())
        .map(|c| c.to_ascii_lowercase())
        .collect()
}

/// [`normalize_label`] followed by katakana → hiragana, so that
/// `シンジュクク` and `しんじゅくく` compare equal.
#[must_use]
pub fn normalize_kana(raw: &str) -> String {
    katakana_to_hiragana(&normalize_label(raw))
}

/// Returns `true` if the (normalized) label ends with a municipal suffix.
#[must_use]
pub fn has_municipal_suffix(label: &str) -> bool {
    label
        .trim_end()
        .chars()
        .last()
        .is_some_and(|c| MUNICIPAL_SUFFIXES.contains(&c))
}

/// Returns `true` if every character of the input is kana (either script)
/// or the prolonged sound mark. Whitespace is ignored; an empty input is
/// not kana.
#[must_use]
pub fn is_kana_only(raw: &str) -> bool {
    let normalized = normalize_label(raw);
    !normalized.is_empty()
        && normalized
            .chars()
            .all(|c| kana::is_hiragana(c) || kana::is_katakana(c) || c == 'ー')
}

/// Number of distinct characters shared by `a` and `b`.
#[must_use]
pub fn shared_char_count(a: &str, b: &str) -> usize {
    let left: BTreeSet<char> = a.chars().collect();
    let right: BTreeSet<char> = b.chars().collect();
    left.intersection(&right).count()
}

fn fold_width(c: char) -> char {
    match c {
        '\u{3000}' => ' ',
        // Wave dash and full-width tilde are both used for ranges ("0～14歳").
        '\u{301C}' | '\u{FF5E}' | '\u{223C}' => '~',
        '\u{2010}' | '\u{2012}' | '\u{2013}' | '\u{2212}' | '\u{FF0D}' => '-',
        '\u{FF01}'..='\u{FF5D}' => char::from_u32(c as u32 - 0xFEE0).unwrap_or(c),
        _ => c,
    }
}
