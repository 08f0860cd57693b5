#![cfg_attr(feature = "fail-on-warnings", deny(warnings))]
#![warn(clippy::all, clippy::pedantic, clippy::nursery, clippy::cargo)]
#![allow(clippy::multiple_crate_versions, clippy::cargo_common_metadata)]

//! Normalized shapes exchanged with the statistics API client.
//!
//! The statistics API describes each table as a set of classification
//! axes (area, time, one or more category axes) whose items carry opaque
//! codes and free-text Japanese labels, and returns values as rows keyed
//! by those codes. The client collaborator converts its JSON envelopes
//! into these types; nothing downstream knows about HTTP or caching.

use std::collections::BTreeMap;

use serde::{Deserialize, Serialize};

/// One item (code + label) of a classification axis.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ClassificationItem {
    /// Opaque code used in queries (e.g. `"13104"`, `"2020000000"`).
    pub code: String,
    /// Free-text label (e.g. `"東京都 新宿区"`, `"2020年"`).
    pub label: String,
}

impl ClassificationItem {
    /// Creates an item.
    #[must_use]
    pub fn new(code: impl Into<String>, label: impl Into<String>) -> Self {
        Self {
            code: code.into(),
            label: label.into(),
        }
    }
}

/// One facet of a statistical table's cross-tabulation.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ClassificationAxis {
    /// Axis identifier (e.g. `"area"`, `"time"`, `"cat01"`, `"tab"`).
    pub id: String,
    /// Free-text axis label (e.g. `"地域"`, `"男女別"`).
    pub label: String,
    /// Items in API order.
    pub items: Vec<ClassificationItem>,
}

impl ClassificationAxis {
    /// Creates an axis.
    #[must_use]
    pub fn new(
        id: impl Into<String>,
        label: impl Into<String>,
        items: Vec<ClassificationItem>,
    ) -> Self {
        Self {
            id: id.into(),
            label: label.into(),
            items,
        }
    }

    /// Finds the item with the given code.
    #[must_use]
    pub fn item(&self, code: &str) -> Option<&ClassificationItem> {
        self.items.iter().find(|item| item.code == code)
    }

    /// Query parameter name used to filter on this axis.
    #[must_use]
    pub fn param_name(&self) -> String {
        param_name(&self.id)
    }
}

/// Builds the query parameter name for an axis ID: `cd` followed by the
/// capitalized ID (`cat01` → `cdCat01`, `area` → `cdArea`).
#[must_use]
pub fn param_name(axis_id: &str) -> String {
    let mut chars = axis_id.chars();
    chars.next().map_or_else(
        || "cd".to_string(),
        |first| format!("cd{}{}", first.to_ascii_uppercase(), chars.as_str()),
    )
}

/// A resolvable place, derived from the area axis.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct AreaEntry {
    /// Area code (e.g. `"13104"`).
    pub code: String,
    /// Area label as published (e.g. `"東京都 新宿区"`).
    pub label: String,
}

impl From<&ClassificationItem> for AreaEntry {
    fn from(item: &ClassificationItem) -> Self {
        Self {
            code: item.code.clone(),
            label: item.label.clone(),
        }
    }
}

/// One concrete time period.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct TimeSelection {
    /// Time axis identifier.
    pub axis_id: String,
    /// Period code (e.g. `"2020000000"`).
    pub code: String,
    /// Period label (e.g. `"2020年"`).
    pub label: String,
}

impl TimeSelection {
    /// Calendar year of the period: the first run of four digits in the
    /// code, else in the label.
    #[must_use]
    pub fn year(&self) -> Option<i32> {
        first_year(&self.code).or_else(|| first_year(&self.label))
    }
}

fn first_year(text: &str) -> Option<i32> {
    let digits: Vec<char> = text.chars().collect();
    digits
        .windows(4)
        .find(|w| w.iter().all(char::is_ascii_digit))
        .and_then(|w| w.iter().collect::<String>().parse().ok())
}

/// A `(parameter, code)` pair pinning one axis of a query.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct FilterSelection {
    /// Axis identifier the filter applies to.
    pub axis_id: String,
    /// Query parameter name (e.g. `"cdCat01"`).
    pub param_name: String,
    /// Selected item code.
    pub code: String,
    /// Selected item label.
    pub label: String,
}

/// The classification code chosen to represent a named domain indicator.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct IndicatorSelection {
    /// Axis that carries the indicator.
    pub axis_id: String,
    /// Query parameter name for that axis.
    pub param_name: String,
    /// Selected item code.
    pub code: String,
    /// Selected item label.
    pub label: String,
    /// Whether the label says the value is already a per-capita ratio.
    pub is_ratio: bool,
    /// Co-selected aggregate codes on unrelated axes.
    pub default_filters: Vec<FilterSelection>,
}

/// The age-axis selection used to derive total and child population.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct AgeSelection {
    /// Axis carrying the age bands.
    pub axis_id: String,
    /// Query parameter name for that axis.
    pub param_name: String,
    /// Code of the "total" item.
    pub total_code: String,
    /// Label of the "total" item.
    pub total_label: String,
    /// Code of the target sub-population item (ages 0–14).
    pub target_code: String,
    /// Label of the target sub-population item.
    pub target_label: String,
}

/// One row of a value table.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ValueRow {
    /// Area code, when the table has an area axis.
    pub area_code: Option<String>,
    /// Time code, when the table has a time axis.
    pub time_code: Option<String>,
    /// Codes for every other axis, keyed by axis ID.
    #[serde(default)]
    pub categories: BTreeMap<String, String>,
    /// Numeric value; `None` for suppressed or missing cells.
    pub value: Option<f64>,
}

/// Values returned for one query.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ValueTable {
    /// Rows in API order.
    pub rows: Vec<ValueRow>,
}

impl ValueTable {
    /// Returns `true` if at least one row carries a non-null value.
    #[must_use]
    pub fn has_data(&self) -> bool {
        self.rows.iter().any(|row| row.value.is_some())
    }

    /// First non-null value per area code.
    ///
    /// Rows are expected to be filtered down to one cell per area; when
    /// they are not, the earliest row wins.
    #[must_use]
    pub fn values_by_area(&self) -> BTreeMap<String, f64> {
        collect_first(self.rows.iter())
    }

    /// First non-null value per area code among rows whose `axis_id`
    /// category equals `code`.
    #[must_use]
    pub fn values_by_area_for(&self, axis_id: &str, code: &str) -> BTreeMap<String, f64> {
        collect_first(
            self.rows
                .iter()
                .filter(|row| row.categories.get(axis_id).is_some_and(|c| c == code)),
        )
    }
}

fn collect_first<'a>(rows: impl Iterator<Item = &'a ValueRow>) -> BTreeMap<String, f64> {
    let mut out = BTreeMap::new();
    for row in rows {
        if let (Some(area), Some(value)) = (&row.area_code, row.value) {
            out.entry(area.clone()).or_insert(value);
        }
    }
    out
}

/// A value-table request handed to the API client collaborator.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct StatsQuery {
    /// Statistical table identifier.
    pub table_id: String,
    /// Area codes to request.
    pub area_codes: Vec<String>,
    /// Time period code; `None` lets the API pick.
    pub time_code: Option<String>,
    /// Pinned codes on the remaining axes.
    pub filters: Vec<FilterSelection>,
}
