//! Area axis detection.

use city_compare_label::{has_municipal_suffix, normalize_label};
use city_compare_stats_models::{AreaEntry, ClassificationAxis};

use crate::{AxisDiagnostic, AxisKind, ResolveError, detect_axis, keywords, score_axis};

/// Area score: +4 for an ID containing `area`, +4 for a label containing
/// "region", +3 for a more specific region-type label, +1 when the
/// sampled items look like municipalities.
pub(crate) fn score_area_axis(axis: &ClassificationAxis) -> i32 {
    let id = axis.id.to_ascii_lowercase();
    let label = normalize_label(&axis.label);
    let mut score = 0;

    if id.contains("area") {
        score += 4;
    }
    if keywords::AREA_LABELS.iter().any(|k| label.contains(k)) {
        score += 4;
    }
    if keywords::AREA_TYPE_LABELS.iter().any(|k| label.contains(k)) {
        score += 3;
    }
    if axis
        .items
        .iter()
        .take(keywords::AREA_ITEM_SAMPLE)
        .any(|item| has_municipal_suffix(&item.label))
    {
        score += 1;
    }

    score
}

/// Picks the axis that represents geography.
///
/// # Errors
///
/// Returns [`ResolveError::AreaAxisNotFound`] when no axis scores above
/// zero; the error lists every axis with its score.
pub fn resolve_area_axis(axes: &[ClassificationAxis]) -> Result<&ClassificationAxis, ResolveError> {
    detect_axis(axes, AxisKind::Area).ok_or_else(|| ResolveError::AreaAxisNotFound {
        diagnostics: axes
            .iter()
            .map(|a| {
                AxisDiagnostic::scored(
                    a,
                    score_axis(AxisKind::Area, a),
                    "no area ID, region label, or municipal items",
                )
            })
            .collect(),
    })
}

/// Lists the axis items as resolvable places.
#[must_use]
pub fn area_entries(axis: &ClassificationAxis) -> Vec<AreaEntry> {
    axis.items.iter().map(AreaEntry::from).collect()
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::test_support::{axis, population_table};

    #[test]
    fn scores_components() {
        assert_eq!(score_area_axis(&axis("area", "", &[])), 4);
        assert_eq!(score_area_axis(&axis("x", "地域", &[])), 4);
        assert_eq!(score_area_axis(&axis("x", "全国・都道府県", &[])), 3);
        assert_eq!(score_area_axis(&axis("x", "", &[("1", "新宿区")])), 1);
        assert_eq!(
            score_area_axis(&axis("area", "地域（市区町村）", &[("1", "新宿区")])),
            12
        );
    }

    #[test]
    fn samples_only_leading_items() {
        let mut items: Vec<(String, String)> = (0..keywords::AREA_ITEM_SAMPLE)
            .map(|i| (i.to_string(), "その他".to_string()))
            .collect();
        items.push(("x".to_string(), "新宿区".to_string()));
        let refs: Vec<(&str, &str)> = items
            .iter()
            .map(|(c, l)| (c.as_str(), l.as_str()))
            .collect();
        assert_eq!(score_area_axis(&axis("cat01", "", &refs)), 0);
    }

    #[test]
    fn resolves_area_axis() {
        let axes = population_table();
        assert_eq!(resolve_area_axis(&axes).unwrap().id, "area");
    }

    #[test]
    fn prefers_higher_score_over_order() {
        let axes = vec![
            axis("cat01", "地域区分", &[]),
            axis("area", "地域", &[("13104", "新宿区")]),
        ];
        assert_eq!(resolve_area_axis(&axes).unwrap().id, "area");
    }

    #[test]
    fn matches_generic_detection_and_keeps_first_on_ties() {
        let axes = vec![
            axis("area", "地域", &[("13104", "新宿区")]),
            axis("area2", "地域", &[("13113", "渋谷区")]),
        ];
        let resolved = resolve_area_axis(&axes).unwrap();
        assert_eq!(resolved.id, "area");
        assert_eq!(
            detect_axis(&axes, AxisKind::Area).map(|a| a.id.as_str()),
            Some(resolved.id.as_str())
        );
    }

    #[test]
    fn fails_without_geography() {
        let axes = vec![
            axis("cat01", "男女別", &[("000", "総数")]),
            axis("time", "時間軸", &[("2020", "2020年")]),
        ];
        let err = resolve_area_axis(&axes).unwrap_err();
        match err {
            ResolveError::AreaAxisNotFound { diagnostics } => {
                assert_eq!(diagnostics.len(), 2);
                assert!(diagnostics.iter().all(|d| d.score <= 0));
            }
            other => panic!("unexpected error: {other}"),
        }
    }

    #[test]
    fn entries_mirror_items() {
        let axes = population_table();
        let entries = area_entries(resolve_area_axis(&axes).unwrap());
        assert_eq!(entries.len(), 3);
        assert_eq!(entries[1].code, "13104");
        assert_eq!(entries[1].label, "東京都 新宿区");
    }
}
