//! Built-in indicator domains and their label keyword tables.
//!
//! Keyword order and weights break ties between similar labels found on
//! real tables; edit them as data.

use city_compare_resolver::KeywordScorer;
use serde::{Deserialize, Serialize};
use strum_macros::{AsRefStr, Display, EnumIter, EnumString};

use crate::{IndicatorConfig, PerCapita};

/// Crime occurrence, most specific first.
pub const CRIME_KEYWORDS: &[(&str, i32)] = &[
    ("刑法犯認知件数", 40),
    ("認知件数", 30),
    ("刑法犯", 20),
    ("犯罪", 10),
];

/// Clearances are not occurrences.
pub const CRIME_EXCLUDED: &[&str] = &["検挙"];

/// Medical facilities.
pub const HEALTHCARE_KEYWORDS: &[(&str, i32)] = &[
    ("一般病院数", 40),
    ("病院数", 30),
    ("一般診療所数", 20),
    ("診療所", 15),
    ("医師数", 10),
];

/// Bed counts and dental clinics are different indicators.
pub const HEALTHCARE_EXCLUDED: &[&str] = &["病床", "歯科"];

/// Schools and childcare facilities.
pub const EDUCATION_KEYWORDS: &[(&str, i32)] = &[
    ("小学校数", 40),
    ("中学校数", 30),
    ("学校数", 20),
    ("保育所", 15),
    ("幼稚園", 10),
];

/// Head counts of pupils and staff are not facility counts.
pub const EDUCATION_EXCLUDED: &[&str] = &["児童数", "生徒数", "教員数"];

/// Rail and bus access.
pub const TRANSPORT_KEYWORDS: &[(&str, i32)] = &[
    ("乗車人員", 40),
    ("駅数", 30),
    ("鉄道", 20),
    ("バス", 10),
];

/// Default number of periods tried before giving up on a table.
pub const DEFAULT_MAX_FALLBACK_YEARS: usize = 5;

/// An indicator family with its own label scorer.
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
    EnumIter,
    AsRefStr,
)]
#[serde(rename_all = "snake_case")]
#[strum(serialize_all = "snake_case")]
pub enum Domain {
    /// Reported crimes.
    Crime,
    /// Hospitals and clinics.
    Healthcare,
    /// Schools.
    Education,
    /// Rail ridership and stations.
    Transport,
}

impl Domain {
    /// Label scorer for this domain.
    #[must_use]
    pub const fn scorer(self) -> KeywordScorer {
        match self {
            Self::Crime => KeywordScorer::new(CRIME_KEYWORDS, CRIME_EXCLUDED),
            Self::Healthcare => KeywordScorer::new(HEALTHCARE_KEYWORDS, HEALTHCARE_EXCLUDED),
            Self::Education => KeywordScorer::new(EDUCATION_KEYWORDS, EDUCATION_EXCLUDED),
            Self::Transport => KeywordScorer::new(TRANSPORT_KEYWORDS, &[]),
        }
    }

    /// Catalogue indicator this domain produces.
    #[must_use]
    pub const fn indicator_id(self) -> &'static str {
        match self {
            Self::Crime => "crime_rate",
            Self::Healthcare => "hospitals_per_capita",
            Self::Education => "elementary_schools_per_capita",
            Self::Transport => "station_passengers",
        }
    }

    /// Per-capita scale raw counts are converted to, if any.
    #[must_use]
    pub const fn per_capita(self) -> Option<PerCapita> {
        match self {
            Self::Crime => Some(PerCapita { per: 1_000.0 }),
            Self::Healthcare => Some(PerCapita { per: 100_000.0 }),
            Self::Education => Some(PerCapita { per: 10_000.0 }),
            Self::Transport => None,
        }
    }

    /// Builder configuration for reading this domain from `table_id`.
    #[must_use]
    pub fn config(self, table_id: impl Into<String>) -> IndicatorConfig {
        let table_id = table_id.into();
        IndicatorConfig {
            indicator_id: self.indicator_id().to_string(),
            source_id: table_id.clone(),
            table_id,
            explicit_code: None,
            max_fallback_years: DEFAULT_MAX_FALLBACK_YEARS,
            value_kind: city_compare_ward::ValueKind::Count,
        }
    }
}

#[cfg(test)]
mod tests {
    use city_compare_resolver::LabelScorer;
    use city_compare_scoring_models::Direction;
    use strum::IntoEnumIterator;

    use super::*;

    #[test]
    fn crime_prefers_specific_and_ratio_labels() {
        let scorer = Domain::Crime.scorer();
        assert!(scorer.score("刑法犯認知件数") > scorer.score("犯罪件数"));
        assert!(scorer.score("刑法犯認知件数(人口千人当たり)") > scorer.score("刑法犯認知件数"));
        assert_eq!(scorer.score("刑法犯検挙件数"), 0);
    }

    #[test]
    fn healthcare_ignores_beds_and_dentists() {
        let scorer = Domain::Healthcare.scorer();
        assert!(scorer.score("一般病院数") > 0);
        assert_eq!(scorer.score("一般病院病床数"), 0);
        assert_eq!(scorer.score("歯科診療所数"), 0);
    }

    #[test]
    fn education_counts_facilities_not_people() {
        let scorer = Domain::Education.scorer();
        assert!(scorer.score("小学校数") > scorer.score("学校数"));
        assert_eq!(scorer.score("小学校児童数"), 0);
    }

    #[test]
    fn every_domain_targets_a_catalogue_indicator() {
        for domain in Domain::iter() {
            let id = domain.indicator_id();
            let def = city_compare_scoring::indicator_definition(id);
            assert!(def.is_some(), "{domain} produces unknown indicator {id}");
            if domain == Domain::Crime {
                assert_eq!(def.unwrap().direction, Direction::LowerBetter);
            }
        }
    }

    #[test]
    fn config_defaults() {
        let config = Domain::Healthcare.config("0000010109");
        assert_eq!(config.indicator_id, "hospitals_per_capita");
        assert_eq!(config.source_id, "0000010109");
        assert_eq!(config.max_fallback_years, DEFAULT_MAX_FALLBACK_YEARS);
    }

    #[test]
    fn domains_parse_from_snake_case() {
        assert_eq!("transport".parse::<Domain>().unwrap(), Domain::Transport);
        assert!(Domain::Transport.per_capita().is_none());
    }
}
