//! Weighted composite of choice scores.

use city_compare_scoring_models::{ChoiceScore, CompositeScore, IndicatorDefinition, WeightPreset};

use crate::round_to;

/// Weighted average of a city's choice scores.
///
/// Each score is weighted by its indicator's category weight in `preset`
/// and the sum is divided by the weight actually present, so a city
/// missing indicators is judged on the ones it has. Scores for IDs not in
/// `definitions` are ignored. With nothing weighted the composite is 0.
#[must_use]
pub fn calculate_composite_score(
    choice_scores: &[ChoiceScore],
    definitions: &[IndicatorDefinition],
    preset: &WeightPreset,
) -> CompositeScore {
    let mut weighted = 0.0;
    let mut weight_sum = 0.0;
    let mut used_count = 0;

    for choice in choice_scores {
        let Some(definition) = definitions.iter().find(|d| d.id == choice.indicator_id) else {
            log::debug!("ignoring score for unknown indicator {}", choice.indicator_id);
            continue;
        };
        let weight = preset.weight(definition.category);
        weighted = weight.mul_add(choice.score, weighted);
        weight_sum += weight;
        used_count += 1;
    }

    let score = if weight_sum > 0.0 {
        round_to(weighted / weight_sum, 1)
    } else {
        0.0
    };

    CompositeScore {
        score,
        used_count,
        total_count: definitions.len(),
    }
}
