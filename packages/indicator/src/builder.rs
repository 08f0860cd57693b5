//! Resolve, fetch with period fallback, fold wards, convert.

use std::collections::BTreeMap;

use city_compare_resolver::{
    CityResolution, LabelScorer, area_entries, resolve_area_axis, resolve_cities,
    resolve_indicator_axis, resolve_time_candidates,
};
use city_compare_scoring_models::IndicatorValue;
use city_compare_stats_models::{FilterSelection, StatsQuery, TimeSelection, ValueTable};
use city_compare_ward::{
    PopulationMap, ValueKind, aggregate, aggregate_weighted_values, expand_area_codes,
};

use crate::{
    Domain, IndicatorBatch, IndicatorConfig, IndicatorError, PerCapita, SourceError, StatsSource,
};

/// A value table together with the period it was fetched for.
pub(crate) struct Fetched {
    pub period: Option<TimeSelection>,
    pub table: ValueTable,
}

/// Queries `base` for each candidate period, newest first, and returns
/// the first table `has_data` accepts.
///
/// At most `max_attempts` periods are tried (at least one). With no
/// candidates the query runs once without a time code.
pub(crate) async fn fetch_with_fallback<F>(
    source: &dyn StatsSource,
    base: StatsQuery,
    candidates: &[TimeSelection],
    max_attempts: usize,
    has_data: F,
) -> Result<Option<Fetched>, SourceError>
where
    F: Fn(&ValueTable) -> bool + Sync,
{
    if candidates.is_empty() {
        let table = source.fetch_values(&base).await?;
        return Ok(has_data(&table).then_some(Fetched {
            period: None,
            table,
        }));
    }

    for (attempt, period) in candidates.iter().take(max_attempts.max(1)).enumerate() {
        let query = StatsQuery {
            time_code: Some(period.code.clone()),
            ..base.clone()
        };
        let table = source.fetch_values(&query).await?;
        if has_data(&table) {
            if attempt > 0 {
                log::info!(
                    "{}: fell back {attempt} period(s) to {} ({})",
                    base.table_id,
                    period.code,
                    period.label
                );
            }
            return Ok(Some(Fetched {
                period: Some(period.clone()),
                table,
            }));
        }
        log::info!(
            "{}: no data for {} ({}); trying an older period",
            base.table_id,
            period.code,
            period.label
        );
    }

    Ok(None)
}

/// Reads one indicator for `city_codes`.
///
/// 1. Detects the indicator item with `scorer` (or pins
///    `config.explicit_code`). No match yields an empty batch, so a
///    missing domain never aborts a comparison.
/// 2. Collapses the other category axes to their totals.
/// 3. Widens the request to pre-merger ward codes.
/// 4. Tries periods newest-first, up to `config.max_fallback_years`.
/// 5. Folds old-ward values onto new codes. Ratio items are weighted by
///    the old-ward entries of `population` (census figures where it has
///    none); other items fold by `config.value_kind`.
/// 6. With `per_capita`, converts counts using `population`. Ratio items
///    are never converted again.
///
/// Every requested city gets a value in the batch, `None` when the table
/// has nothing for it or its population is unknown.
///
/// # Errors
///
/// * [`IndicatorError::Source`] if the source fails.
/// * [`IndicatorError::Resolve`] if the table has no area axis.
pub async fn resolve_and_fetch_indicator(
    source: &dyn StatsSource,
    config: &IndicatorConfig,
    scorer: &(dyn LabelScorer + Sync),
    city_codes: &[String],
    per_capita: Option<PerCapita>,
    population: &PopulationMap,
) -> Result<IndicatorBatch, IndicatorError> {
    let axes = source.fetch_classifications(&config.table_id).await?;

    let Some(selection) = resolve_indicator_axis(&axes, scorer, config.explicit_code.as_deref())
    else {
        log::warn!(
            "{}: no matching item in table {}; indicator skipped",
            config.indicator_id,
            config.table_id
        );
        return Ok(IndicatorBatch::empty(&config.indicator_id));
    };
    log::info!(
        "{}: using {} ({}) on {}{}",
        config.indicator_id,
        selection.code,
        selection.label,
        selection.axis_id,
        if selection.is_ratio { ", already a ratio" } else { "" }
    );

    let area_axis_id = resolve_area_axis(&axes)?.id.clone();
    let candidates = resolve_time_candidates(&axes);
    let time_axis_id = candidates.first().map(|c| c.axis_id.clone());

    let mut filters: Vec<FilterSelection> = selection
        .default_filters
        .iter()
        .filter(|f| f.axis_id != area_axis_id && Some(&f.axis_id) != time_axis_id.as_ref())
        .cloned()
        .collect();
    filters.push(FilterSelection {
        axis_id: selection.axis_id.clone(),
        param_name: selection.param_name.clone(),
        code: selection.code.clone(),
        label: selection.label.clone(),
    });

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
        ValueTable::has_data,
    )
    .await?;

    let Some(Fetched { period, table }) = fetched else {
        log::warn!(
            "{}: no period of table {} has data for the requested areas",
            config.indicator_id,
            config.table_id
        );
        let values = city_codes
            .iter()
            .map(|code| {
                let value =
                    IndicatorValue::new(&config.indicator_id, None, None, &config.source_id);
                (code.clone(), value)
            })
            .collect();
        return Ok(IndicatorBatch {
            indicator_id: config.indicator_id.clone(),
            selection: Some(selection),
            period: None,
            values,
        });
    };

    let kind = if selection.is_ratio {
        ValueKind::PerCapita
    } else {
        config.value_kind
    };
    let reported = table.values_by_area();
    let folded = match kind {
        ValueKind::PerCapita => aggregate_weighted_values(&reported, &mapping, population),
        other => aggregate(other, &reported, &mapping),
    };
    let convert = per_capita.filter(|_| kind == ValueKind::Count);
    let year = period.as_ref().and_then(TimeSelection::year);

    let values: BTreeMap<String, IndicatorValue> = city_codes
        .iter()
        .map(|code| {
            let raw = folded.get(code).copied();
            let value = match convert {
                Some(scale) => raw.and_then(|count| {
                    let rate = scale.apply(count, population.get(code).copied());
                    if rate.is_none() {
                        log::debug!(
                            "{}: no population for {code}; value dropped",
                            config.indicator_id
                        );
                    }
                    rate
                }),
                None => raw,
            };
            let value = IndicatorValue::new(&config.indicator_id, value, year, &config.source_id);
            (code.clone(), value)
        })
        .collect();

    Ok(IndicatorBatch {
        indicator_id: config.indicator_id.clone(),
        selection: Some(selection),
        period,
        values,
    })
}

/// Reads a built-in domain from `table_id` with its default scorer and
/// per-capita scale.
///
/// # Errors
///
/// See [`resolve_and_fetch_indicator`].
pub async fn fetch_domain(
    source: &dyn StatsSource,
    domain: Domain,
    table_id: &str,
    city_codes: &[String],
    population: &PopulationMap,
) -> Result<IndicatorBatch, IndicatorError> {
    let scorer = domain.scorer();
    resolve_and_fetch_indicator(
        source,
        &domain.config(table_id),
        &scorer,
        city_codes,
        domain.per_capita(),
        population,
    )
    .await
}

/// Resolves user-supplied municipality names against a table's area axis.
///
/// # Errors
///
/// * [`IndicatorError::Source`] if the source fails.
/// * [`IndicatorError::Resolve`] if the table has no area axis or any
///   name is ambiguous or unmatched.
pub async fn resolve_city_names(
    source: &dyn StatsSource,
    table_id: &str,
    names: &[&str],
) -> Result<Vec<CityResolution>, IndicatorError> {
    let axes = source.fetch_classifications(table_id).await?;
    let entries = area_entries(resolve_area_axis(&axes)?);
    Ok(resolve_cities(names, &entries)?)
}
