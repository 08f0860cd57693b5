#![cfg_attr(feature = "fail-on-warnings", deny(warnings))]
#![warn(clippy::all, clippy::pedantic, clippy::nursery, clippy::cargo)]
#![allow(clippy::multiple_crate_versions, clippy::cargo_common_metadata)]

//! Scoring types shared by the engine and its consumers.
//!
//! Raw indicator values come in as [`CityIndicators`]; the engine emits
//! one [`CityScoreResult`] per city. Catalogue types
//! ([`IndicatorDefinition`], [`WeightPreset`], [`NationalBaselineEntry`])
//! are deserialized from the engine's embedded TOML.

use std::collections::BTreeMap;

use serde::{Deserialize, Deserializer, Serialize};
use strum_macros::{AsRefStr, Display, EnumString};

/// Which end of an indicator's scale is desirable.
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
pub enum Direction {
    /// Larger raw values score higher.
    HigherBetter,
    /// Smaller raw values score higher (crime, prices, hazard exposure).
    LowerBetter,
}

/// Indicator grouping that weight presets assign weights to.
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
pub enum Category {
    /// Child population and childcare capacity.
    Childcare,
    /// Housing and land prices.
    Price,
    /// Crime.
    Safety,
    /// Natural hazard exposure.
    Disaster,
    /// Schools.
    Education,
    /// Hospitals and clinics.
    Healthcare,
    /// Rail and bus access.
    Transport,
}

/// Qualitative trust in a city's score.
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
pub enum ConfidenceLevel {
    /// Recent, nearly complete data.
    High,
    /// Somewhat dated or partially missing data.
    Medium,
    /// Old, sparse or thinly sampled data.
    Low,
}

/// Catalogue entry controlling how one indicator is scored.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct IndicatorDefinition {
    /// Stable identifier (e.g. `"crime_rate"`).
    pub id: String,
    /// Display label.
    pub label: String,
    /// Unit of the raw value.
    pub unit: String,
    /// Desirable direction.
    pub direction: Direction,
    /// Category the preset weight is taken from.
    pub category: Category,
    /// Decimal places used when displaying raw values.
    pub precision: u8,
}

/// Named set of category weights.
///
/// Weights are expected to be non-negative and to sum to 1.0, but the
/// engine renormalizes and tolerates other sums.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct WeightPreset {
    /// Identifier used on the command line (e.g. `"balanced"`).
    pub name: String,
    /// Display label.
    pub label: String,
    /// Weight per category. Categories not listed weigh nothing.
    #[serde(deserialize_with = "deserialize_category_weights")]
    pub weights: BTreeMap<Category, f64>,
}

impl WeightPreset {
    /// Weight assigned to a category, `0.0` when absent.
    #[must_use]
    pub fn weight(&self, category: Category) -> f64 {
        self.weights.get(&category).copied().unwrap_or(0.0)
    }
}

/// Reads category-keyed weights from any format whose map keys arrive as
/// plain strings.
fn deserialize_category_weights<'de, D>(deserializer: D) -> Result<BTreeMap<Category, f64>, D::Error>
where
    D: Deserializer<'de>,
{
    let raw = BTreeMap::<String, f64>::deserialize(deserializer)?;
    raw.into_iter()
        .map(|(key, weight)| {
            key.parse::<Category>()
                .map(|category| (category, weight))
                .map_err(|_| serde::de::Error::custom(format!("unknown category '{key}'")))
        })
        .collect()
}

/// National distribution of one indicator as four ascending quintile
/// boundaries.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct NationalBaselineEntry {
    /// Indicator the breakpoints belong to.
    pub indicator_id: String,
    /// Raw values at the 20th, 40th, 60th and 80th percentiles.
    pub breakpoints: [f64; 4],
}

/// One fact about one city.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct IndicatorValue {
    /// Catalogue identifier.
    pub indicator_id: String,
    /// Raw value, `None` when the source had no data.
    pub raw_value: Option<f64>,
    /// Year the value describes.
    pub data_year: Option<i32>,
    /// Where the value came from (table ID or dataset name).
    pub source_id: String,
}

impl IndicatorValue {
    /// Creates a value.
    #[must_use]
    pub fn new(
        indicator_id: impl Into<String>,
        raw_value: Option<f64>,
        data_year: Option<i32>,
        source_id: impl Into<String>,
    ) -> Self {
        Self {
            indicator_id: indicator_id.into(),
            raw_value,
            data_year,
            source_id: source_id.into(),
        }
    }
}

/// Every indicator value gathered for one city.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct CityIndicators {
    /// Display name.
    pub city_name: String,
    /// Resolved area code.
    pub area_code: String,
    /// Values in arrival order.
    #[serde(default)]
    pub indicators: Vec<IndicatorValue>,
}

impl CityIndicators {
    /// Creates an empty set for a city.
    #[must_use]
    pub fn new(city_name: impl Into<String>, area_code: impl Into<String>) -> Self {
        Self {
            city_name: city_name.into(),
            area_code: area_code.into(),
            indicators: Vec::new(),
        }
    }

    /// Appends values from another source.
    ///
    /// Existing values are never modified or replaced; a repeated
    /// indicator ID is appended after the earlier one.
    pub fn merge(&mut self, values: impl IntoIterator<Item = IndicatorValue>) {
        self.indicators.extend(values);
    }

    /// First value for `indicator_id` that carries data, falling back to
    /// the first occurrence when every occurrence is empty.
    #[must_use]
    pub fn get(&self, indicator_id: &str) -> Option<&IndicatorValue> {
        let mut matching = self
            .indicators
            .iter()
            .filter(|v| v.indicator_id == indicator_id);
        let first = matching.clone().next();
        matching.find(|v| v.raw_value.is_some()).or(first)
    }

    /// First non-null raw value for `indicator_id`.
    #[must_use]
    pub fn value(&self, indicator_id: &str) -> Option<f64> {
        self.get(indicator_id).and_then(|v| v.raw_value)
    }
}

/// Min-max normalized score within the compared cities.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ChoiceScore {
    /// Catalogue identifier.
    pub indicator_id: String,
    /// Score in `[0, 100]`.
    pub score: f64,
}

/// Percentile of a value within a reference population.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct BaselineScore {
    /// Catalogue identifier.
    pub indicator_id: String,
    /// Percentile in `[0, 100]`; `0` when the city has no value.
    pub percentile: f64,
    /// Number of non-null values in the reference population.
    pub population_size: usize,
    /// Name of the reference population.
    pub baseline_name: String,
}

/// Star rating against the national distribution.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct IndicatorStarRating {
    /// Catalogue identifier.
    pub indicator_id: String,
    /// Stars, `1..=5`.
    pub stars: u8,
    /// National percentile the stars were derived from.
    pub national_percentile: f64,
}

/// Confidence level plus the human-readable reason for it.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Confidence {
    /// Level.
    pub level: ConfidenceLevel,
    /// Why the level was assigned; lists every violated condition.
    pub reason: String,
}

/// Weighted composite of a city's choice scores.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct CompositeScore {
    /// Score in `[0, 100]`, rounded to one decimal.
    pub score: f64,
    /// Indicators that contributed.
    pub used_count: usize,
    /// Indicators selected for the run.
    pub total_count: usize,
}

/// Final per-city output of a scoring run.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct CityScoreResult {
    /// Display name.
    pub city_name: String,
    /// Area code.
    pub area_code: String,
    /// Percentiles within the compared cities.
    pub baseline: Vec<BaselineScore>,
    /// Normalized scores within the compared cities.
    pub choice: Vec<ChoiceScore>,
    /// Weighted composite score.
    pub composite_score: f64,
    /// Data quality assessment.
    pub confidence: Confidence,
    /// 1-based position after sorting by composite score.
    pub rank: usize,
    /// Weighted average of the indicator stars, `1.0..=5.0`.
    pub star_rating: f64,
    /// Per-indicator national star ratings.
    pub indicator_stars: Vec<IndicatorStarRating>,
    /// Data completeness notes for display.
    pub notes: Vec<String>,
}

#[cfg(test)]
mod tests {
    use super::*;

    fn value(id: &str, raw: Option<f64>, source: &str) -> IndicatorValue {
        IndicatorValue::new(id, raw, Some(2022), source)
    }

    #[test]
    fn merge_appends_without_replacing() {
        let mut city = CityIndicators::new("新宿区", "13104");
        city.merge([value("crime_rate", Some(5.0), "a")]);
        city.merge([value("crime_rate", Some(9.0), "b"), value("kids_ratio", None, "b")]);

        assert_eq!(city.indicators.len(), 3);
        assert_eq!(city.indicators[0].source_id, "a");
        assert_eq!(city.value("crime_rate"), Some(5.0));
    }

    #[test]
    fn first_non_null_occurrence_wins() {
        let mut city = CityIndicators::new("新宿区", "13104");
        city.merge([value("crime_rate", None, "a"), value("crime_rate", Some(4.0), "b")]);
        assert_eq!(city.value("crime_rate"), Some(4.0));
        assert_eq!(city.get("crime_rate").unwrap().source_id, "b");
    }

    #[test]
    fn all_null_occurrences_report_first() {
        let mut city = CityIndicators::new("新宿区", "13104");
        city.merge([value("kids_ratio", None, "a"), value("kids_ratio", None, "b")]);
        assert_eq!(city.get("kids_ratio").unwrap().source_id, "a");
        assert_eq!(city.value("kids_ratio"), None);
        assert!(city.get("land_price").is_none());
    }

    #[test]
    fn preset_weights_parse_category_keys() {
        let preset: WeightPreset = serde_json::from_str(
            r#"{"name":"x","label":"X","weights":{"safety":0.6,"transport":0.4}}"#,
        )
        .unwrap();
        assert!((preset.weight(Category::Safety) - 0.6).abs() < f64::EPSILON);
        assert!(preset.weight(Category::Price).abs() < f64::EPSILON);
    }

    #[test]
    fn preset_rejects_unknown_category() {
        let result: Result<WeightPreset, _> =
            serde_json::from_str(r#"{"name":"x","label":"X","weights":{"weather":1.0}}"#);
        assert!(result.is_err());
    }

    #[test]
    fn city_indicators_use_camel_case_json() {
        let json = r#"{
            "cityName": "新宿区",
            "areaCode": "13104",
            "indicators": [
                {"indicatorId": "crime_rate", "rawValue": 8.1, "dataYear": 2022, "sourceId": "0000010111"}
            ]
        }"#;
        let city: CityIndicators = serde_json::from_str(json).unwrap();
        assert_eq!(city.indicators[0].indicator_id, "crime_rate");
        assert_eq!(city.value("crime_rate"), Some(8.1));
    }

    #[test]
    fn enums_use_snake_case() {
        assert_eq!(Direction::LowerBetter.to_string(), "lower_better");
        assert_eq!("healthcare".parse::<Category>().unwrap(), Category::Healthcare);
        assert_eq!(ConfidenceLevel::Medium.as_ref(), "medium");
    }
}
