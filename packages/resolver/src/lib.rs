#![cfg_attr(feature = "fail-on-warnings", deny(warnings))]
#![warn(clippy::all, clippy::pedantic, clippy::nursery, clippy::cargo)]
#![allow(clippy::multiple_crate_versions, clippy::cargo_common_metadata)]

//! Metadata classification resolver.
//!
//! Statistical tables expose opaque classification codes instead of
//! stable field names. This crate decides, purely from the Japanese
//! labels, which axis is the geography, which is time, which category
//! axis carries age bands or a domain indicator, and which item within
//! each axis is the "total" or the value we want.
//!
//! Every detector is a small pure scoring function; the resolver picks
//! the argmax. Resolution failures are typed [`ResolveError`]s carrying
//! per-axis diagnostics so an operator can pin the right codes manually.
//! The two optimization resolvers ([`resolve_indicator_axis`] and
//! [`resolve_default_filters`]) return empty results instead of failing.

pub mod age;
pub mod area;
pub mod city;
pub mod filters;
pub mod indicator;
pub mod keywords;
pub mod time;

use std::collections::BTreeMap;
use std::fmt::Write as _;
use std::sync::LazyLock;

use city_compare_stats_models::ClassificationAxis;
use serde::{Deserialize, Serialize};
use strum_macros::{AsRefStr, Display, EnumString};
use thiserror::Error;

pub use age::{AgeOverrides, resolve_age_selection};
pub use area::{area_entries, resolve_area_axis};
pub use city::{CityResolution, MatchStage, resolve_cities};
pub use filters::resolve_default_filters;
pub use indicator::{KeywordScorer, LabelScorer, resolve_indicator_axis};
pub use time::{resolve_latest_time, resolve_time_axis, resolve_time_candidates};

/// Kinds of axis the resolver knows how to detect.
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
pub enum AxisKind {
    /// Geography (prefecture / municipality).
    Area,
    /// Survey period.
    Time,
    /// Cross-tabulation category (`cat01`, `tab`, ...).
    Category,
}

/// Scores how strongly an axis looks like a given [`AxisKind`].
/// Scores `<= 0` mean "not this kind".
pub type AxisScorer = fn(&ClassificationAxis) -> i32;

/// Strategy table mapping each axis kind to its detector. New kinds are
/// added here without touching the resolvers.
static AXIS_SCORERS: LazyLock<BTreeMap<AxisKind, AxisScorer>> = LazyLock::new(|| {
    BTreeMap::from([
        (AxisKind::Area, area::score_area_axis as AxisScorer),
        (AxisKind::Time, time::score_time_axis as AxisScorer),
        (AxisKind::Category, score_category_axis as AxisScorer),
    ])
});

/// Scores `axis` as `kind`.
#[must_use]
pub fn score_axis(kind: AxisKind, axis: &ClassificationAxis) -> i32 {
    AXIS_SCORERS.get(&kind).map_or(0, |scorer| scorer(axis))
}

/// Returns the highest-scoring axis of `kind` (first wins on ties), or
/// `None` when no axis scores above zero.
#[must_use]
pub fn detect_axis(axes: &[ClassificationAxis], kind: AxisKind) -> Option<&ClassificationAxis> {
    let mut best: Option<(&ClassificationAxis, i32)> = None;
    for axis in axes {
        let score = score_axis(kind, axis);
        log::trace!("axis {} ({}) scored {score} as {kind}", axis.id, axis.label);
        if score > 0 && best.is_none_or(|(_, s)| score > s) {
            best = Some((axis, score));
        }
    }
    best.map(|(axis, _)| axis)
}

/// Category-looking axes: `cat01`..`catNN`, the tabulation axis `tab`,
/// or any axis whose label names age bands.
fn score_category_axis(axis: &ClassificationAxis) -> i32 {
    let id = axis.id.to_ascii_lowercase();
    let label = city_compare_label::normalize_label(&axis.label);
    let mut score = 0;
    if id.starts_with("cat") {
        score += 5;
    } else if id == "tab" {
        score += 3;
    }
    if keywords::AGE_AXIS_LABELS.iter().any(|k| label.contains(k)) {
        score += 2;
    }
    score
}

/// Returns `true` for axes the resolver may scan for indicators and
/// default filters.
#[must_use]
pub fn is_category_axis(axis: &ClassificationAxis) -> bool {
    score_axis(AxisKind::Category, axis) > 0
}

/// What the resolver saw on one candidate axis. Attached to resolution
/// errors so an operator can pick codes manually.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct AxisDiagnostic {
    /// Axis identifier.
    pub axis_id: String,
    /// Axis label.
    pub label: String,
    /// Detector score for the kind being resolved.
    pub score: i32,
    /// Whether a "total" item was detected on this axis.
    pub has_total: bool,
    /// Whether the target sub-population item was detected.
    pub has_target: bool,
    /// Best "total" item code, if any.
    pub total_code: Option<String>,
    /// Best target item code, if any.
    pub target_code: Option<String>,
    /// Why the axis was rejected.
    pub reason: String,
}

impl AxisDiagnostic {
    /// Diagnostic row for an axis that only carries a detector score.
    #[must_use]
    pub fn scored(axis: &ClassificationAxis, score: i32, reason: impl Into<String>) -> Self {
        Self {
            axis_id: axis.id.clone(),
            label: axis.label.clone(),
            score,
            has_total: false,
            has_target: false,
            total_code: None,
            target_code: None,
            reason: reason.into(),
        }
    }
}

/// Renders diagnostics as an indented list for error messages.
#[must_use]
pub fn format_diagnostics(diagnostics: &[AxisDiagnostic]) -> String {
    if diagnostics.is_empty() {
        return "\n  (no axes in table)".to_string();
    }
    let mut out = String::new();
    for d in diagnostics {
        let _ = write!(
            out,
            "\n  - {} \"{}\" score={} total={} target={}",
            d.axis_id,
            d.label,
            d.score,
            d.total_code.as_deref().unwrap_or("-"),
            d.target_code.as_deref().unwrap_or("-"),
        );
        if !d.reason.is_empty() {
            let _ = write!(out, " ({})", d.reason);
        }
    }
    out
}

fn format_entries(entries: &[city_compare_stats_models::AreaEntry]) -> String {
    if entries.is_empty() {
        return "none".to_string();
    }
    entries
        .iter()
        .map(|e| format!("{} ({})", e.label, e.code))
        .collect::<Vec<_>>()
        .join(", ")
}

/// Errors raised when a table's labels cannot be mapped onto what the
/// caller needs. These always fail the whole operation.
#[derive(Debug, Error)]
pub enum ResolveError {
    /// No axis looks like a geography.
    #[error(
        "No area axis found; this table has no resolvable geography. Axes considered:{}",
        format_diagnostics(.diagnostics)
    )]
    AreaAxisNotFound {
        /// Every axis with its area score.
        diagnostics: Vec<AxisDiagnostic>,
    },

    /// A municipality name matched several areas.
    #[error("City name '{input}' is ambiguous; matches: {}. Use a more specific name (e.g. with prefecture)", format_entries(.candidates))]
    AmbiguousCity {
        /// Name as supplied by the user.
        input: String,
        /// Every matching area.
        candidates: Vec<city_compare_stats_models::AreaEntry>,
    },

    /// A municipality name matched nothing.
    #[error("City name '{input}' not found; did you mean: {}", format_entries(.suggestions))]
    CityNotFound {
        /// Name as supplied by the user.
        input: String,
        /// Up to 8 closest areas.
        suggestions: Vec<city_compare_stats_models::AreaEntry>,
    },

    /// No axis looks like a time axis.
    #[error("No time axis found. Axes considered:{}", format_diagnostics(.diagnostics))]
    TimeAxisNotFound {
        /// Every axis with its time score.
        diagnostics: Vec<AxisDiagnostic>,
    },

    /// The explicitly requested time code is not on the time axis.
    #[error("Time code '{code}' not found on axis '{axis_id}'. Available codes: {}", .available.join(", "))]
    ExplicitTimeCodeNotFound {
        /// Requested code.
        code: String,
        /// Time axis that was searched.
        axis_id: String,
        /// Codes present on the axis, newest first.
        available: Vec<String>,
    },

    /// No category axis carries age bands.
    #[error(
        "No age axis found. Set `AgeOverrides::axis_id` to one of the category axes:{}",
        format_diagnostics(.diagnostics)
    )]
    AgeAxisNotFound {
        /// Every category axis with its detection results.
        diagnostics: Vec<AxisDiagnostic>,
    },

    /// A candidate age axis exists but no "total" item was detected.
    #[error(
        "No total category found on axis '{axis_id}'. Set `AgeOverrides::total_code`. Candidates:{}",
        format_diagnostics(.diagnostics)
    )]
    TotalCategoryNotFound {
        /// Axis that was searched.
        axis_id: String,
        /// Every category axis with its detection results.
        diagnostics: Vec<AxisDiagnostic>,
    },

    /// A total was found but no 0–14 sub-population item.
    #[error(
        "No children (0-14) category found on axis '{axis_id}'. Set `AgeOverrides::target_code`. Candidates:{}",
        format_diagnostics(.diagnostics)
    )]
    KidsCategoryNotFound {
        /// Axis that was searched.
        axis_id: String,
        /// Every category axis with its detection results.
        diagnostics: Vec<AxisDiagnostic>,
    },
}
