//! The statistics API collaborator and an in-memory implementation.

use std::collections::BTreeMap;
use std::path::Path;

use async_trait::async_trait;
use city_compare_stats_models::{ClassificationAxis, StatsQuery, ValueRow, ValueTable};
use serde::{Deserialize, Serialize};

/// Errors that can occur while talking to a statistics source.
#[derive(Debug, thiserror::Error)]
pub enum SourceError {
    /// The source has no table with this ID.
    #[error("statistical table {table_id} not found")]
    TableNotFound {
        /// Requested table.
        table_id: String,
    },

    /// JSON parsing failed.
    #[error("JSON parse error: {0}")]
    Json(#[from] serde_json::Error),

    /// I/O error (file read).
    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),

    /// The upstream API reported an error.
    #[error("upstream error: {message}")]
    Upstream {
        /// Message from the upstream API.
        message: String,
    },
}

/// Where classification trees and value tables come from.
///
/// The HTTP client, its caching and its rate limiting live behind this
/// trait; the builders only see the two normalized shapes.
#[async_trait]
pub trait StatsSource: Send + Sync {
    /// Returns every classification axis of a table.
    ///
    /// # Errors
    ///
    /// Returns [`SourceError`] if the table cannot be read.
    async fn fetch_classifications(
        &self,
        table_id: &str,
    ) -> Result<Vec<ClassificationAxis>, SourceError>;

    /// Returns the rows matching a query.
    ///
    /// # Errors
    ///
    /// Returns [`SourceError`] if the table cannot be read.
    async fn fetch_values(&self, query: &StatsQuery) -> Result<ValueTable, SourceError>;
}

/// One table held by [`StaticStatsSource`].
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct StaticTable {
    /// Classification tree.
    pub classifications: Vec<ClassificationAxis>,
    /// Every cell of the table.
    #[serde(default)]
    pub rows: Vec<ValueRow>,
}

/// In-memory source answering queries by filtering stored rows, for
/// fixtures and tests.
///
/// Rows match a query when their area is requested (or no areas are
/// requested), their time code equals the query's (when it has one), and
/// every pinned filter either matches the row's category or names an axis
/// the row does not carry.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct StaticStatsSource {
    /// Tables keyed by table ID.
    pub tables: BTreeMap<String, StaticTable>,
}

impl StaticStatsSource {
    /// Creates an empty source.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Adds a table.
    #[must_use]
    pub fn with_table(mut self, table_id: impl Into<String>, table: StaticTable) -> Self {
        self.tables.insert(table_id.into(), table);
        self
    }

    /// Parses a fixture of the form `{"tables": {"<id>": {...}}}`.
    ///
    /// # Errors
    ///
    /// Returns [`SourceError::Json`] if the fixture is malformed.
    pub fn from_json(json: &str) -> Result<Self, SourceError> {
        Ok(serde_json::from_str(json)?)
    }

    /// Reads a JSON fixture from disk.
    ///
    /// # Errors
    ///
    /// Returns [`SourceError::Io`] if the file cannot be read, or
    /// [`SourceError::Json`] if it is malformed.
    pub fn from_path(path: &Path) -> Result<Self, SourceError> {
        let json = std::fs::read_to_string(path)?;
        Self::from_json(&json)
    }

    fn table(&self, table_id: &str) -> Result<&StaticTable, SourceError> {
        self.tables
            .get(table_id)
            .ok_or_else(|| SourceError::TableNotFound {
                table_id: table_id.to_string(),
            })
    }
}

fn row_matches(row: &ValueRow, query: &StatsQuery) -> bool {
    let area_ok = query.area_codes.is_empty()
        || row
            .area_code
            .as_ref()
            .is_some_and(|code| query.area_codes.contains(code));
    let time_ok = query
        .time_code
        .as_ref()
        .is_none_or(|code| row.time_code.as_ref() == Some(code));
    let filters_ok = query.filters.iter().all(|filter| {
        row.categories
            .get(&filter.axis_id)
            .is_none_or(|code| *code == filter.code)
    });
    area_ok && time_ok && filters_ok
}

#[async_trait]
impl StatsSource for StaticStatsSource {
    async fn fetch_classifications(
        &self,
        table_id: &str,
    ) -> Result<Vec<ClassificationAxis>, SourceError> {
        Ok(self.table(table_id)?.classifications.clone())
    }

    async fn fetch_values(&self, query: &StatsQuery) -> Result<ValueTable, SourceError> {
        let table = self.table(&query.table_id)?;
        let rows: Vec<ValueRow> = table
            .rows
            .iter()
            .filter(|row| row_matches(row, query))
            .cloned()
            .collect();
        log::debug!(
            "{}: {} of {} rows match time={:?} filters={}",
            query.table_id,
            rows.len(),
            table.rows.len(),
            query.time_code,
            query.filters.len()
        );
        Ok(ValueTable { rows })
    }
}
