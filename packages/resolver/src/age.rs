//! Age axis detection: the "total" item and the ages 0–14 item.

use std::sync::LazyLock;

use city_compare_label::normalize_label;
use city_compare_stats_models::{AgeSelection, ClassificationAxis, ClassificationItem};
use regex::Regex;
use serde::{Deserialize, Serialize};

use crate::{AxisDiagnostic, AxisKind, ResolveError, is_category_axis, keywords, score_axis};

/// Exact `0~14歳` / `0歳~14歳` / `0-14歳` range label.
static TARGET_RANGE_EXACT_RE: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"^0(?:歳)?[~-]14歳$").expect("valid regex"));

/// A `0~14` range anywhere in the label.
static TARGET_RANGE_RE: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"(?:^|[^0-9])0(?:歳)?[~-]14(?:[^0-9]|$)").expect("valid regex"));

/// Caller-pinned codes that bypass detection.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct AgeOverrides {
    /// Axis carrying age bands.
    pub axis_id: Option<String>,
    /// Code of the total item.
    pub total_code: Option<String>,
    /// Code of the 0–14 item.
    pub target_code: Option<String>,
}

/// Scores a label as "total population".
#[must_use]
pub fn score_total_label(label: &str) -> i32 {
    let label = normalize_label(label);
    if let Some((_, score)) = keywords::TOTAL_EXACT.iter().find(|(k, _)| *k == label) {
        return *score;
    }
    let (needle, score) = keywords::TOTAL_SUBSTRING;
    if label.contains(needle) {
        return score;
    }
    0
}

/// Scores a label as the ages 0–14 sub-population.
#[must_use]
pub fn score_target_label(label: &str) -> i32 {
    let label = normalize_label(label);
    if TARGET_RANGE_EXACT_RE.is_match(&label) {
        return keywords::TARGET_RANGE_EXACT_SCORE;
    }
    if let Some((_, score)) = keywords::TARGET_EXACT.iter().find(|(k, _)| *k == label) {
        return *score;
    }
    if let Some((_, score)) = keywords::TARGET_SUBSTRING
        .iter()
        .find(|(k, _)| label.contains(k))
    {
        return *score;
    }
    if TARGET_RANGE_RE.is_match(&label) {
        return keywords::TARGET_RANGE_SUBSTRING_SCORE;
    }
    0
}

fn best_item(
    axis: &ClassificationAxis,
    scorer: fn(&str) -> i32,
) -> Option<(&ClassificationItem, i32)> {
    let mut best: Option<(&ClassificationItem, i32)> = None;
    for item in &axis.items {
        let score = scorer(&item.label);
        if score > 0 && best.is_none_or(|(_, s)| score > s) {
            best = Some((item, score));
        }
    }
    best
}

struct Candidate<'a> {
    axis: &'a ClassificationAxis,
    total: Option<(&'a ClassificationItem, i32)>,
    target: Option<(&'a ClassificationItem, i32)>,
}

impl Candidate<'_> {
    fn diagnostic(&self) -> AxisDiagnostic {
        let reason = match (self.total.is_some(), self.target.is_some()) {
            (true, true) => "total and 0-14 markers found",
            (true, false) => "no 0-14 marker",
            (false, true) => "no total marker",
            (false, false) => "no total or 0-14 marker",
        };
        AxisDiagnostic {
            axis_id: self.axis.id.clone(),
            label: self.axis.label.clone(),
            score: score_axis(AxisKind::Category, self.axis),
            has_total: self.total.is_some(),
            has_target: self.target.is_some(),
            total_code: self.total.map(|(i, _)| i.code.clone()),
            target_code: self.target.map(|(i, _)| i.code.clone()),
            reason: reason.to_string(),
        }
    }
}

fn candidate(axis: &ClassificationAxis) -> Candidate<'_> {
    Candidate {
        axis,
        total: best_item(axis, score_total_label),
        target: best_item(axis, score_target_label),
    }
}

fn pinned<'a>(
    axis: &'a ClassificationAxis,
    code: Option<&str>,
    detected: Option<(&'a ClassificationItem, i32)>,
) -> Option<&'a ClassificationItem> {
    code.map_or_else(|| detected.map(|(item, _)| item), |code| axis.item(code))
}

fn selection(
    axis: &ClassificationAxis,
    total: &ClassificationItem,
    target: &ClassificationItem,
) -> AgeSelection {
    AgeSelection {
        axis_id: axis.id.clone(),
        param_name: axis.param_name(),
        total_code: total.code.clone(),
        total_label: total.label.clone(),
        target_code: target.code.clone(),
        target_label: target.label.clone(),
    }
}

/// Finds the axis and codes for total population and ages 0–14.
///
/// Candidate axes are the category-looking ones. The winning axis is the
/// one carrying both markers with the highest combined score. Overrides
/// pin the axis and/or codes; a pinned code that is not on the axis is a
/// resolution failure, not a silent fallback to detection.
///
/// # Errors
///
/// * [`ResolveError::AgeAxisNotFound`] when there are no candidate axes
///   or the overridden axis does not exist.
/// * [`ResolveError::TotalCategoryNotFound`] when no candidate has a total.
/// * [`ResolveError::KidsCategoryNotFound`] when a total exists but no 0–14
///   item does.
///
/// Every error carries one diagnostic row per candidate axis.
pub fn resolve_age_selection(
    axes: &[ClassificationAxis],
    overrides: &AgeOverrides,
) -> Result<AgeSelection, ResolveError> {
    let candidates: Vec<Candidate<'_>> = match &overrides.axis_id {
        Some(id) => axes.iter().filter(|a| &a.id == id).map(candidate).collect(),
        None => axes
            .iter()
            .filter(|a| is_category_axis(a))
            .map(candidate)
            .collect(),
    };

    let diagnostics = || -> Vec<AxisDiagnostic> {
        axes.iter()
            .filter(|a| is_category_axis(a))
            .map(|a| candidate(a).diagnostic())
            .collect()
    };

    if candidates.is_empty() {
        return Err(ResolveError::AgeAxisNotFound {
            diagnostics: diagnostics(),
        });
    }

    let mut best: Option<(AgeSelection, i32)> = None;
    for c in &candidates {
        let total = pinned(c.axis, overrides.total_code.as_deref(), c.total);
        let target = pinned(c.axis, overrides.target_code.as_deref(), c.target);
        let (Some(total), Some(target)) = (total, target) else {
            continue;
        };
        let score = c.total.map_or(0, |(_, s)| s) + c.target.map_or(0, |(_, s)| s);
        log::debug!(
            "age axis candidate {}: total={} target={} score={score}",
            c.axis.id,
            total.code,
            target.code
        );
        if best.as_ref().is_none_or(|(_, s)| score > *s) {
            best = Some((selection(c.axis, total, target), score));
        }
    }

    if let Some((selection, _)) = best {
        return Ok(selection);
    }

    let with_total = candidates
        .iter()
        .find(|c| pinned(c.axis, overrides.total_code.as_deref(), c.total).is_some());

    with_total.map_or_else(
        || {
            Err(ResolveError::TotalCategoryNotFound {
                axis_id: candidates[0].axis.id.clone(),
                diagnostics: diagnostics(),
            })
        },
        |c| {
            Err(ResolveError::KidsCategoryNotFound {
                axis_id: c.axis.id.clone(),
                diagnostics: diagnostics(),
            })
        },
    )
}
