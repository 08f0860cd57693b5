//! Data quality assessment for a city's score.

use city_compare_scoring_models::{Confidence, ConfidenceLevel};

/// Oldest data, in years, that still allows high confidence.
pub const HIGH_MAX_AGE: i32 = 2;
/// Oldest data, in years, that still allows medium confidence.
pub const MEDIUM_MAX_AGE: i32 = 4;
/// Missing-indicator rate below which high confidence is possible.
pub const HIGH_MAX_MISSING_RATE: f64 = 0.10;
/// Missing-indicator rate below which medium confidence is possible.
pub const MEDIUM_MAX_MISSING_RATE: f64 = 0.30;
/// Smallest sample that allows high confidence, when samples are tracked.
pub const MIN_SAMPLE_COUNT: u32 = 30;

/// Rates confidence from data age, missing-indicator rate and, when
/// known, sample size.
///
/// High needs age ≤ 2, missing < 10% and a sample of at least 30. Medium
/// needs age ≤ 4 and missing < 30%. Anything else is low. The reason
/// lists every condition that kept the level from being higher. An
/// unknown data year counts as too old.
#[must_use]
pub fn evaluate_confidence(
    data_year: Option<i32>,
    sample_count: Option<u32>,
    missing_rate: f64,
    current_year: i32,
) -> Confidence {
    let age = data_year.map(|year| (current_year - year).max(0));
    let missing_pct = missing_rate * 100.0;

    let age_within = |limit: i32| age.is_some_and(|a| a <= limit);
    let sample_ok = sample_count.is_none_or(|n| n >= MIN_SAMPLE_COUNT);

    let describe_age = |limit: i32| {
        age.map_or_else(
            || "data year unknown".to_string(),
            |a| format!("data is {a} years old (limit {limit})"),
        )
    };

    if age_within(HIGH_MAX_AGE) && missing_rate < HIGH_MAX_MISSING_RATE && sample_ok {
        return Confidence {
            level: ConfidenceLevel::High,
            reason: "data is recent and nearly complete".to_string(),
        };
    }

    let medium = age_within(MEDIUM_MAX_AGE) && missing_rate < MEDIUM_MAX_MISSING_RATE;
    let (level, age_limit, missing_limit) = if medium {
        (ConfidenceLevel::Medium, HIGH_MAX_AGE, HIGH_MAX_MISSING_RATE)
    } else {
        (ConfidenceLevel::Low, MEDIUM_MAX_AGE, MEDIUM_MAX_MISSING_RATE)
    };

    let mut reasons = Vec::new();
    if !age_within(age_limit) {
        reasons.push(describe_age(age_limit));
    }
    if missing_rate >= missing_limit {
        reasons.push(format!(
            "{missing_pct:.0}% of indicators missing (limit under {:.0}%)",
            missing_limit * 100.0
        ));
    }
    if let Some(n) = sample_count.filter(|n| *n < MIN_SAMPLE_COUNT) {
        reasons.push(format!("sample of {n} (needs {MIN_SAMPLE_COUNT} or more)"));
    }

    Confidence {
        level,
        reason: reasons.join("; "),
    }
}
