//! Subcommand implementations.

use std::path::Path;

use city_compare_indicator::{
    Domain, IndicatorBatch, PopulationConfig, StaticStatsSource, build_population, fetch_domain,
    resolve_city_names,
};
use city_compare_resolver::{
    AgeOverrides, ResolveError, resolve_age_selection, resolve_area_axis, resolve_default_filters,
    resolve_time_candidates,
};
use city_compare_scoring::{ScoringOptions, all_presets, score_cities};
use city_compare_scoring_models::CityIndicators;
use city_compare_stats_models::ClassificationAxis;
use serde_json::json;

type CmdResult = Result<(), Box<dyn std::error::Error>>;

/// Parses a `domain=table_id` pair.
pub fn parse_domain_table(value: &str) -> Result<(Domain, String), String> {
    let (domain, table_id) = value
        .split_once('=')
        .ok_or_else(|| format!("expected domain=table_id, got '{value}'"))?;
    let domain = domain
        .trim()
        .parse::<Domain>()
        .map_err(|_| format!("unknown domain '{domain}'"))?;
    let table_id = table_id.trim();
    if table_id.is_empty() {
        return Err(format!("missing table id for {domain}"));
    }
    Ok((domain, table_id.to_string()))
}

fn print_json(value: &impl serde::Serialize) -> CmdResult {
    println!("{}", serde_json::to_string_pretty(value)?);
    Ok(())
}

fn outcome<T: serde::Serialize>(result: Result<T, ResolveError>) -> serde_json::Value {
    match result {
        Ok(value) => json!(value),
        Err(e) => json!({ "error": e.to_string() }),
    }
}

/// Runs every detector on a classification tree and prints the picks.
pub fn inspect(tree: &Path) -> CmdResult {
    let axes: Vec<ClassificationAxis> = serde_json::from_str(&std::fs::read_to_string(tree)?)?;
    log::info!("inspecting {} axes from {}", axes.len(), tree.display());

    let area = resolve_area_axis(&axes).map(|a| a.id.clone());
    let periods = resolve_time_candidates(&axes);
    let age = resolve_age_selection(&axes, &AgeOverrides::default());

    let mut exclude: Vec<&str> = Vec::new();
    if let Ok(id) = &area {
        exclude.push(id);
    }
    if let Some(period) = periods.first() {
        exclude.push(&period.axis_id);
    }
    if let Ok(age) = &age {
        exclude.push(&age.axis_id);
    }
    let filters = resolve_default_filters(&axes, &exclude);

    print_json(&json!({
        "areaAxis": outcome(area),
        "timeCandidates": periods,
        "age": outcome(age),
        "defaultFilters": filters,
    }))
}

/// Resolves city names, builds population and every requested domain,
/// and prints the merged city indicators.
pub async fn build(
    fixture: &Path,
    population_table: &str,
    tables: &[(Domain, String)],
    max_fallback_years: usize,
    names: &[String],
) -> CmdResult {
    let source = StaticStatsSource::from_path(fixture)?;

    let names: Vec<&str> = names.iter().map(String::as_str).collect();
    let resolved = resolve_city_names(&source, population_table, &names).await?;
    let codes: Vec<String> = resolved.iter().map(|r| r.code.clone()).collect();
    for r in &resolved {
        log::info!(
            "'{}' -> {} ({}) via {}",
            r.input_text,
            r.resolved_label,
            r.code,
            r.stage
        );
    }

    let config = PopulationConfig {
        max_fallback_years,
        ..PopulationConfig::new(population_table)
    };
    let population = build_population(&source, &config, &codes).await?;

    let mut batches: Vec<IndicatorBatch> =
        vec![population.population_total, population.kids_ratio];
    for (domain, table_id) in tables {
        let batch =
            fetch_domain(&source, *domain, table_id, &codes, &population.population).await?;
        if batch.is_empty() {
            log::warn!("{domain}: table {table_id} has no matching indicator");
        }
        batches.push(batch);
    }

    let mut cities: Vec<CityIndicators> = resolved
        .iter()
        .map(|r| CityIndicators::new(&r.input_text, &r.code))
        .collect();
    for batch in &batches {
        batch.merge_into(&mut cities);
    }

    print_json(&cities)
}

/// Scores cities and prints the ranked results.
pub fn rank(
    indicators: &Path,
    preset: String,
    year: Option<i32>,
    indicator_ids: Vec<String>,
) -> CmdResult {
    let cities: Vec<CityIndicators> =
        serde_json::from_str(&std::fs::read_to_string(indicators)?)?;
    let defaults = ScoringOptions::default();
    let options = ScoringOptions {
        preset,
        indicator_ids,
        current_year: year.unwrap_or(defaults.current_year),
        ..defaults
    };
    let results = score_cities(&cities, &options)?;
    print_json(&results)
}

/// Prints the built-in presets.
pub fn presets() {
    for preset in all_presets() {
        println!("{} ({})", preset.name, preset.label);
        for (category, weight) in &preset.weights {
            println!("  {category:<10} {weight:.2}");
        }
    }
}
