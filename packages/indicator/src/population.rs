//! Total population and the ages 0–14 share.
//!
//! Population is the denominator for every per-capita indicator, so it is
//! built first and its [`PopulationMap`] is handed to the other builders.

use std::collections::BTreeMap;

use city_compare_resolver::{
    AgeOverrides, resolve_age_selection, resolve_area_axis, resolve_default_filters,
    resolve_latest_time, resolve_time_candidates,
};
use city_compare_scoring_models::IndicatorValue;
use city_compare_stats_models::{AgeSelection, StatsQuery, TimeSelection};
use city_compare_ward::{
    PopulationMap, ValueKind, aggregate, expand_area_codes, expand_population_map,
};
use serde::{Deserialize, Serialize};

use crate::{
    DEFAULT_MAX_FALLBACK_YEARS, IndicatorBatch, IndicatorError, StatsSource,
    builder::{Fetched, fetch_with_fallback},
};

/// Indicator ID for total residents.
pub const POPULATION_TOTAL_ID: &str = "population_total";

/// Indicator ID for the ages 0–14 share, in percent.
pub const KIDS_RATIO_ID: &str = "kids_ratio";

/// Where to read population from.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct PopulationConfig {
    /// Population table.
    pub table_id: String,
    /// Recorded on every emitted value.
    pub source_id: String,
    /// Pinned age axis and codes.
    #[serde(default)]
    pub overrides: AgeOverrides,
    /// Pins one period instead of falling back.
    pub explicit_time: Option<String>,
    /// Most periods to try, newest first.
    pub max_fallback_years: usize,
}

impl PopulationConfig {
    /// Config reading `table_id` with detection and default fallback.
    #[must_use]
    pub fn new(table_id: impl Into<String>) -> Self {
        let table_id = table_id.into();
        Self {
            source_id: table_id.clone(),
            table_id,
            overrides: AgeOverrides::default(),
            explicit_time: None,
            max_fallback_years: DEFAULT_MAX_FALLBACK_YEARS,
        }
    }
}

/// Result of [`build_population`].
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct PopulationBatch {
    /// Age axis and codes that were read.
    pub age: AgeSelection,
    /// Period the values describe.
    pub period: Option<TimeSelection>,
    /// Residents per area code, including retired ward codes, for
    /// per-capita conversion.
    pub population: PopulationMap,
    /// [`POPULATION_TOTAL_ID`] per requested city.
    pub population_total: IndicatorBatch,
    /// [`KIDS_RATIO_ID`] per requested city.
    pub kids_ratio: IndicatorBatch,
}

/// Reads total and ages 0–14 population for `city_codes`.
///
/// Both age items come back from a single query: the age axis is left
/// unpinned while every other category axis is collapsed to its total.
/// Without `config.explicit_time`, periods are tried newest-first until
/// one has a total for at least one area.
///
/// # Errors
///
/// * [`IndicatorError::Source`] if the source fails.
/// * [`IndicatorError::Resolve`] if the age, area or time axis cannot be
///   resolved, or the explicit period is not on the table.
pub async fn build_population(
    source: &dyn StatsSource,
    config: &PopulationConfig,
    city_codes: &[String],
) -> Result<PopulationBatch, IndicatorError> {
    let axes = source.fetch_classifications(&config.table_id).await?;

    let age = resolve_age_selection(&axes, &config.overrides)?;
    let area_axis_id = resolve_area_axis(&axes)?.id.clone();
    let latest = resolve_latest_time(&axes, config.explicit_time.as_deref())?;
    log::info!(
        "{}: age axis {} total={} ({}) 0-14={} ({})",
        config.table_id,
        age.axis_id,
        age.total_code,
        age.total_label,
        age.target_code,
        age.target_label
    );

    let filters = resolve_default_filters(
        &axes,
        &[
            age.axis_id.as_str(),
            area_axis_id.as_str(),
            latest.axis_id.as_str(),
        ],
    );
    let candidates = if config.explicit_time.is_some() {
        vec![latest]
    } else {
        resolve_time_candidates(&axes)
    };

    let (area_codes, mapping) = expand_area_codes(city_codes);
    let base = StatsQuery {
        table_id: config.table_id.clone(),
        area_codes,
        time_code: None,
        filters,
    };

    let fetched = fetch_with_fallback(
        source,
        base,
        &candidates,
        config.max_fallback_years,
        |table| !table.values_by_area_for(&age.axis_id, &age.total_code).is_empty(),
    )
    .await?;

    let (period, totals, kids) = match fetched {
        Some(Fetched { period, table }) => {
            let totals = table.values_by_area_for(&age.axis_id, &age.total_code);
            let kids = table.values_by_area_for(&age.axis_id, &age.target_code);
            (period, totals, kids)
        }
        None => {
            log::warn!(
                "{}: no period has population for the requested areas",
                config.table_id
            );
            (None, BTreeMap::new(), BTreeMap::new())
        }
    };

    let totals = aggregate(ValueKind::Count, &totals, &mapping);
    let kids = aggregate(ValueKind::Count, &kids, &mapping);
    let year = period.as_ref().and_then(TimeSelection::year);

    let batch = |indicator_id: &str, value_of: &dyn Fn(&str) -> Option<f64>| IndicatorBatch {
        indicator_id: indicator_id.to_string(),
        selection: None,
        period: period.clone(),
        values: city_codes
            .iter()
            .map(|code| {
                let value =
                    IndicatorValue::new(indicator_id, value_of(code), year, &config.source_id);
                (code.clone(), value)
            })
            .collect(),
    };

    let population_total = batch(POPULATION_TOTAL_ID, &|code| totals.get(code).copied());
    let kids_ratio = batch(KIDS_RATIO_ID, &|code| {
        let total = totals.get(code).copied().filter(|t| *t > 0.0)?;
        kids.get(code).map(|k| k / total * 100.0)
    });

    Ok(PopulationBatch {
        population: expand_population_map(&totals, &mapping),
        age,
        period,
        population_total,
        kids_ratio,
    })
}

#[cfg(test)]
mod tests {
    use city_compare_resolver::ResolveError;
    use city_compare_stats_models::ValueRow;

    use super::*;
    use crate::test_support::{RecordingSource, axis};
    use crate::{StaticStatsSource, StaticTable};

    const TABLE: &str = "0003445078";

    fn row(area: &str, time: &str, sex: &str, age: &str, value: f64) -> ValueRow {
        ValueRow {
            area_code: Some(area.to_string()),
            time_code: Some(time.to_string()),
            categories: BTreeMap::from([
                ("cat01".to_string(), sex.to_string()),
                ("cat02".to_string(), age.to_string()),
            ]),
            value: Some(value),
        }
    }

    fn census(area: &str, total: f64, kids: f64) -> Vec<ValueRow> {
        vec![
            row(area, "2020000000", "000", "00710", total),
            row(area, "2020000000", "000", "00720", kids),
            row(area, "2020000000", "001", "00710", total / 2.0),
            row(area, "2020000000", "001", "00720", 1.0),
        ]
    }

    fn source() -> StaticStatsSource {
        let classifications = vec![
            axis(
                "area",
                "地域",
                &[
                    ("13104", "新宿区"),
                    ("22131", "浜松市中区"),
                    ("22132", "浜松市東区"),
                ],
            ),
            axis(
                "time",
                "時間軸（年次）",
                &[("2020000000", "2020年"), ("2025000000", "2025年")],
            ),
            axis("cat01", "男女別", &[("000", "総数"), ("001", "男")]),
            axis(
                "cat02",
                "年齢5歳階級",
                &[("00710", "総数"), ("00720", "0～14歳"), ("00730", "15～64歳")],
            ),
        ];
        let rows = [
            census("13104", 350_000.0, 35_000.0),
            census("22131", 200_000.0, 30_000.0),
            census("22132", 100_000.0, 12_000.0),
        ]
        .concat();
        StaticStatsSource::new().with_table(
            TABLE,
            StaticTable {
                classifications,
                rows,
            },
        )
    }

    fn codes(list: &[&str]) -> Vec<String> {
        list.iter().map(|c| (*c).to_string()).collect()
    }

    #[tokio::test]
    async fn reads_totals_and_kids_share() {
        let source = RecordingSource::new(source());
        let batch = build_population(&source, &PopulationConfig::new(TABLE), &codes(&["13104"]))
            .await
            .unwrap();

        assert_eq!(
            source.time_codes(),
            vec![Some("2025000000".to_string()), Some("2020000000".to_string())]
        );
        assert_eq!(batch.age.target_code, "00720");
        assert_eq!(batch.population["13104"], 350_000.0);
        let total = &batch.population_total.values["13104"];
        assert_eq!(total.raw_value, Some(350_000.0));
        assert_eq!(total.data_year, Some(2020));
        let kids = batch.kids_ratio.values["13104"].raw_value.unwrap();
        assert!((kids - 10.0).abs() < 1e-9);
    }

    #[tokio::test]
    async fn age_axis_is_left_unpinned() {
        let source = RecordingSource::new(source());
        build_population(&source, &PopulationConfig::new(TABLE), &codes(&["13104"]))
            .await
            .unwrap();
        let queries = source.queries.lock().unwrap();
        let pinned: Vec<&str> = queries[0].filters.iter().map(|f| f.axis_id.as_str()).collect();
        assert_eq!(pinned, vec!["cat01"]);
    }

    #[tokio::test]
    async fn merged_ward_population_is_summed() {
        let batch = build_population(&source(), &PopulationConfig::new(TABLE), &codes(&["22138"]))
            .await
            .unwrap();

        assert_eq!(batch.population["22138"], 300_000.0);
        let kids = batch.kids_ratio.values["22138"].raw_value.unwrap();
        assert!((kids - 14.0).abs() < 1e-9);
        // Fetched old-ward totals are kept; missing ones use the census.
        assert_eq!(batch.population["22131"], 200_000.0);
        assert_eq!(batch.population["22133"], 108_469.0);
    }

    #[tokio::test]
    async fn explicit_time_is_not_a_fallback() {
        let source = RecordingSource::new(source());
        let config = PopulationConfig {
            explicit_time: Some("2025000000".to_string()),
            ..PopulationConfig::new(TABLE)
        };
        let batch = build_population(&source, &config, &codes(&["13104"]))
            .await
            .unwrap();
        assert_eq!(source.time_codes().len(), 1);
        assert!(batch.period.is_none());
        assert!(batch.population.is_empty());
        assert_eq!(batch.population_total.values["13104"].raw_value, None);
        assert_eq!(batch.kids_ratio.values["13104"].raw_value, None);
    }

    #[tokio::test]
    async fn unknown_explicit_time_fails() {
        let config = PopulationConfig {
            explicit_time: Some("1990000000".to_string()),
            ..PopulationConfig::new(TABLE)
        };
        assert!(matches!(
            build_population(&source(), &config, &codes(&["13104"])).await,
            Err(IndicatorError::Resolve(ResolveError::ExplicitTimeCodeNotFound { .. }))
        ));
    }

    #[tokio::test]
    async fn age_overrides_are_honored() {
        let config = PopulationConfig {
            overrides: AgeOverrides {
                target_code: Some("00730".to_string()),
                ..AgeOverrides::default()
            },
            ..PopulationConfig::new(TABLE)
        };
        let batch = build_population(&source(), &config, &codes(&["13104"]))
            .await
            .unwrap();
        assert_eq!(batch.age.target_label, "15～64歳");
        // The pinned item has no rows in this table.
        assert_eq!(batch.kids_ratio.values["13104"].raw_value, None);
    }
}
