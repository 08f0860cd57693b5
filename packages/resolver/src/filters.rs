//! Default filters: collapse unrelated cross-tabulation axes to totals.

use city_compare_label::normalize_label;
use city_compare_stats_models::{ClassificationAxis, ClassificationItem, FilterSelection};

use crate::{is_category_axis, keywords};

/// Scores a label as "unfiltered aggregate".
#[must_use]
pub fn score_aggregate_label(label: &str) -> i32 {
    let label = normalize_label(label);
    if let Some((_, score)) = keywords::AGGREGATE_EXACT.iter().find(|(k, _)| *k == label) {
        return *score;
    }
    let (needle, score) = keywords::AGGREGATE_SUBSTRING;
    if label.contains(needle) {
        return score;
    }
    0
}

fn best_aggregate(axis: &ClassificationAxis) -> Option<&ClassificationItem> {
    let mut best: Option<(&ClassificationItem, i32)> = None;
    for item in &axis.items {
        let score = score_aggregate_label(&item.label);
        if score > 0 && best.is_none_or(|(_, s)| score > s) {
            best = Some((item, score));
        }
    }
    best.map(|(item, _)| item)
}

/// Picks the aggregate item for every category axis not in `exclude`, so
/// a query does not silently select one slice of an unrelated
/// cross-tabulation.
///
/// Axes without a recognizable aggregate are skipped with a warning; the
/// result may be empty.
#[must_use]
pub fn resolve_default_filters(
    axes: &[ClassificationAxis],
    exclude: &[&str],
) -> Vec<FilterSelection> {
    axes.iter()
        .filter(|axis| is_category_axis(axis) && !exclude.contains(&axis.id.as_str()))
        .filter_map(|axis| {
            let Some(item) = best_aggregate(axis) else {
                log::warn!(
                    "no aggregate item on axis {} ({}); leaving it unfiltered",
                    axis.id,
                    axis.label
                );
                return None;
            };
            Some(FilterSelection {
                axis_id: axis.id.clone(),
                param_name: axis.param_name(),
                code: item.code.clone(),
                label: item.label.clone(),
            })
        })
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::test_support::{axis, population_table};

    #[test]
    fn aggregate_label_scores() {
        assert_eq!(score_aggregate_label("総数"), 100);
        assert_eq!(score_aggregate_label("男女計"), 95);
        assert_eq!(score_aggregate_label("実数"), 90);
        assert_eq!(score_aggregate_label("総計"), 85);
        assert_eq!(score_aggregate_label("合計"), 80);
        assert_eq!(score_aggregate_label("計"), 75);
        assert_eq!(score_aggregate_label("総数（外国人含む）"), 60);
        assert_eq!(score_aggregate_label("男"), 0);
    }

    #[test]
    fn picks_totals_for_unpinned_axes() {
        let filters = resolve_default_filters(&population_table(), &["cat02"]);
        let pairs: Vec<(&str, &str)> = filters
            .iter()
            .map(|f| (f.param_name.as_str(), f.code.as_str()))
            .collect();
        // `tab` has no aggregate label and is skipped.
        assert_eq!(pairs, vec![("cdCat01", "000")]);
    }

    #[test]
    fn prefers_higher_ranked_aggregate() {
        let axes = vec![axis(
            "cat01",
            "表章",
            &[("1", "構成比"), ("2", "計"), ("3", "実数"), ("4", "男女計")],
        )];
        let filters = resolve_default_filters(&axes, &[]);
        assert_eq!(filters[0].code, "4");
    }

    #[test]
    fn excluded_axes_are_left_alone() {
        let filters = resolve_default_filters(&population_table(), &["cat01", "cat02"]);
        assert!(filters.is_empty());
    }
}
