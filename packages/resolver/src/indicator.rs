//! Domain indicator detection on category and tabulation axes.
//!
//! The same table often offers both a raw count ("病院数") and a ratio
//! ("人口10万人当たり病院数"). Ratio-labeled items win, because the caller
//! converts raw counts to per-capita values itself and must not do it
//! twice.

use city_compare_label::normalize_label;
use city_compare_stats_models::{ClassificationAxis, IndicatorSelection};

use crate::{filters::resolve_default_filters, is_category_axis, keywords};

/// Scores item labels for one domain indicator.
///
/// Labels are passed in normalized form. A score `<= 0` means "not this
/// indicator".
pub trait LabelScorer {
    /// Scores a normalized label.
    fn score(&self, label: &str) -> i32;

    /// Whether a normalized label denotes a per-capita ratio.
    fn is_ratio(&self, label: &str) -> bool {
        is_ratio_label(label)
    }
}

impl<F> LabelScorer for F
where
    F: Fn(&str) -> i32,
{
    fn score(&self, label: &str) -> i32 {
        self(label)
    }
}

/// Returns `true` if a normalized label carries a per-capita marker.
#[must_use]
pub fn is_ratio_label(label: &str) -> bool {
    keywords::RATIO_MARKERS.iter().any(|m| label.contains(m))
}

/// Keyword-presence scorer with a ratio bonus.
///
/// The label's score is the weight of the first keyword it contains
/// (keywords are ordered most-specific first), plus `ratio_bonus` when
/// the label is a ratio. Labels containing an excluded term score zero.
#[derive(Debug, Clone, Copy)]
pub struct KeywordScorer {
    /// `(keyword, weight)` pairs, most specific first.
    pub keywords: &'static [(&'static str, i32)],
    /// Terms that disqualify a label (e.g. "検挙" for a crime-occurrence
    /// indicator).
    pub excluded: &'static [&'static str],
    /// Added to ratio labels; usually [`keywords::RATIO_BONUS`].
    pub ratio_bonus: i32,
}

impl KeywordScorer {
    /// Scorer with the standard ratio bonus.
    #[must_use]
    pub const fn new(
        keywords: &'static [(&'static str, i32)],
        excluded: &'static [&'static str],
    ) -> Self {
        Self {
            keywords,
            excluded,
            ratio_bonus: crate::keywords::RATIO_BONUS,
        }
    }
}

impl LabelScorer for KeywordScorer {
    fn score(&self, label: &str) -> i32 {
        if self.excluded.iter().any(|term| label.contains(term)) {
            return 0;
        }
        let Some((_, weight)) = self.keywords.iter().find(|(k, _)| label.contains(k)) else {
            return 0;
        };
        if self.is_ratio(label) {
            weight + self.ratio_bonus
        } else {
            *weight
        }
    }
}

/// Finds the axis item that best represents a domain indicator.
///
/// Scans every category/tabulation axis and returns the highest-scoring
/// item (first wins on ties), with default filters for the other
/// category axes. With `explicit`, the item carrying that code is pinned
/// instead.
///
/// Returns `None` when nothing scores above zero or the explicit code is
/// not on any scanned axis; callers treat that as "indicator unavailable".
pub fn resolve_indicator_axis(
    axes: &[ClassificationAxis],
    scorer: &dyn LabelScorer,
    explicit: Option<&str>,
) -> Option<IndicatorSelection> {
    let mut scanned = axes.iter().filter(|a| is_category_axis(a));

    let chosen = if let Some(code) = explicit {
        let found = scanned.find_map(|axis| axis.item(code).map(|item| (axis, item)));
        if found.is_none() {
            log::warn!("explicit indicator code '{code}' is not on any category axis");
        }
        found
    } else {
        let mut best = None;
        let mut best_score = 0;
        for axis in scanned {
            for item in &axis.items {
                let score = scorer.score(&normalize_label(&item.label));
                if score > best_score {
                    best_score = score;
                    best = Some((axis, item));
                }
            }
        }
        if let Some((axis, item)) = best {
            log::debug!(
                "indicator detected on {}: {} ({}) score={best_score}",
                axis.id,
                item.code,
                item.label
            );
        }
        best
    };

    let (axis, item) = chosen?;
    let normalized = normalize_label(&item.label);

    Some(IndicatorSelection {
        axis_id: axis.id.clone(),
        param_name: axis.param_name(),
        code: item.code.clone(),
        label: item.label.clone(),
        is_ratio: scorer.is_ratio(&normalized),
        default_filters: resolve_default_filters(axes, &[axis.id.as_str()]),
    })
}
