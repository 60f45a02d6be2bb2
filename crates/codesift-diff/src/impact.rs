use codesift_core::{ChangeType, ElementType, ImpactWeights, SemanticElement};

/// Bounded heuristic severity of one signature-matched change.
///
/// Starts at 1.0; element kind, change kind, similarity, and span size each
/// multiply in before the result is clamped to `max_impact`. Whole-file
/// additions and deletions never reach this path; they carry fixed scores.
pub fn impact_score(
    weights: &ImpactWeights,
    element: &SemanticElement,
    change_type: ChangeType,
    similarity: f64,
) -> f64 {
    let mut score = 1.0;

    match element.element_type {
        ElementType::Class => score *= weights.class_weight,
        ElementType::Function => score *= weights.function_weight,
        _ => {}
    }

    match change_type {
        ChangeType::Removed => score *= weights.removed_weight,
        ChangeType::Modified => score *= 1.0 + (1.0 - similarity),
        _ => {}
    }

    let span = element.line_span();
    if span > 100 {
        score *= weights.large_span_weight;
    } else if span > 50 {
        score *= weights.medium_span_weight;
    }

    score.min(weights.max_impact)
}
