#![cfg_attr(feature = "fail-on-warnings", deny(warnings))]
#![warn(clippy::all, clippy::pedantic, clippy::nursery, clippy::cargo)]
#![allow(clippy::multiple_crate_versions, clippy::cargo_common_metadata)]

//! Ward reorganization table types.
//!
//! Defines the TOML schema for boundary changes in designated cities: a
//! new ward code and the pre-merger wards it absorbed, each with the
//! census population used to weight rates.

use chrono::NaiveDate;
use serde::{Deserialize, Serialize};

/// Top-level shape of the reorganization data file.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct WardReorganizationTable {
    /// Every boundary change, one entry per post-merger ward.
    #[serde(default, rename = "reorganization")]
    pub reorganizations: Vec<WardReorganizationEntry>,
}

/// One post-merger ward and the wards it replaced.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct WardReorganizationEntry {
    /// Area code of the new ward (e.g. `"22138"`).
    pub new_code: String,
    /// Label of the new ward (e.g. `"浜松市 中央区"`).
    pub new_label: String,
    /// Date the new codes took effect.
    pub effective: NaiveDate,
    /// Census year the old-ward populations come from.
    pub census_year: u16,
    /// Pre-merger wards, in code order.
    pub old_wards: Vec<OldWard>,
}

impl WardReorganizationEntry {
    /// Codes of the pre-merger wards.
    #[must_use]
    pub fn old_codes(&self) -> Vec<String> {
        self.old_wards.iter().map(|w| w.code.clone()).collect()
    }

    /// Sum of the old wards' census populations.
    #[must_use]
    pub fn total_population(&self) -> u64 {
        self.old_wards.iter().map(|w| w.census_population).sum()
    }
}

/// A ward that no longer exists under its own code.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct OldWard {
    /// Pre-merger area code.
    pub code: String,
    /// Pre-merger label.
    pub label: String,
    /// Census population, used as the weight when averaging rates.
    pub census_population: u64,
}
