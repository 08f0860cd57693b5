//! Time axis detection and period fallback ordering.

use std::cmp::Reverse;

use city_compare_label::normalize_label;
use city_compare_stats_models::{ClassificationAxis, TimeSelection};

use crate::{AxisDiagnostic, AxisKind, ResolveError, detect_axis, keywords, score_axis};

pub(crate) fn score_time_axis(axis: &ClassificationAxis) -> i32 {
    let id = axis.id.to_ascii_lowercase();
    let label = normalize_label(&axis.label);
    let mut score = 0;

    if id == "time" {
        score += 10;
    } else if id.contains("time") {
        score += 6;
    }
    if keywords::TIME_LABELS.iter().any(|k| label.contains(k)) {
        score += 3;
    }

    score
}

/// Returns the time axis, if the table has one.
#[must_use]
pub fn resolve_time_axis(axes: &[ClassificationAxis]) -> Option<&ClassificationAxis> {
    detect_axis(axes, AxisKind::Time)
}

fn digit_count(code: &str) -> usize {
    code.chars().filter(char::is_ascii_digit).count()
}

/// Every period of the time axis, newest first.
///
/// Codes with more digits sort first (a year+quarter code is more
/// specific than a year-only code), then codes sort descending. Returns
/// an empty list when the table has no time axis.
#[must_use]
pub fn resolve_time_candidates(axes: &[ClassificationAxis]) -> Vec<TimeSelection> {
    let Some(axis) = resolve_time_axis(axes) else {
        return Vec::new();
    };

    let mut candidates: Vec<TimeSelection> = axis
        .items
        .iter()
        .map(|item| TimeSelection {
            axis_id: axis.id.clone(),
            code: item.code.clone(),
            label: item.label.clone(),
        })
        .collect();

    candidates.sort_by(|a, b| {
        (Reverse(digit_count(&a.code)), Reverse(&a.code))
            .cmp(&(Reverse(digit_count(&b.code)), Reverse(&b.code)))
    });

    candidates
}

/// Picks one concrete period: the explicit code when given, else the
/// newest candidate.
///
/// # Errors
///
/// * [`ResolveError::TimeAxisNotFound`] if the table has no time axis or
///   the axis is empty.
/// * [`ResolveError::ExplicitTimeCodeNotFound`] if `explicit` is not on the
///   axis.
pub fn resolve_latest_time(
    axes: &[ClassificationAxis],
    explicit: Option<&str>,
) -> Result<TimeSelection, ResolveError> {
    let Some(axis) = resolve_time_axis(axes) else {
        return Err(ResolveError::TimeAxisNotFound {
            diagnostics: axes
                .iter()
                .map(|a| {
                    AxisDiagnostic::scored(
                        a,
                        score_axis(AxisKind::Time, a),
                        "no time ID or period label",
                    )
                })
                .collect(),
        });
    };

    let candidates = resolve_time_candidates(axes);

    if let Some(code) = explicit {
        return candidates
            .iter()
            .find(|c| c.code == code)
            .cloned()
            .ok_or_else(|| ResolveError::ExplicitTimeCodeNotFound {
                code: code.to_string(),
                axis_id: axis.id.clone(),
                available: candidates.iter().map(|c| c.code.clone()).collect(),
            });
    }

    candidates.into_iter().next().map_or_else(
        || {
            Err(ResolveError::TimeAxisNotFound {
                diagnostics: vec![AxisDiagnostic::scored(
                    axis,
                    score_axis(AxisKind::Time, axis),
                    "time axis has no periods",
                )],
            })
        },
        |latest| {
            log::debug!("latest period on {}: {} ({})", axis.id, latest.code, latest.label);
            Ok(latest)
        },
    )
}
