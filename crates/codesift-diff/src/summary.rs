use codesift_core::SemanticChange;
use serde::{Deserialize, Serialize};
use std::collections::HashMap;

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct ImpactDistribution {
    /// impact < 3.0
    pub low: usize,
    /// 3.0 <= impact < 7.0
    pub medium: usize,
    /// impact >= 7.0
    pub high: usize,
}

/// Aggregate view over one detection run's changes.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct ChangeSummary {
    pub total_changes: usize,
    pub by_change_type: HashMap<String, usize>,
    pub by_element_type: HashMap<String, usize>,
    pub by_file: HashMap<String, usize>,
    pub impact_distribution: ImpactDistribution,
    pub average_impact: f64,
    pub max_impact: f64,
}

pub fn change_summary(changes: &[SemanticChange]) -> ChangeSummary {
    let mut summary = ChangeSummary {
        total_changes: changes.len(),
        ..Default::default()
    };

    for change in changes {
        *summary
            .by_change_type
            .entry(change.change_type.to_string())
            .or_insert(0) += 1;
        *summary
            .by_element_type
            .entry(change.element_type.to_string())
            .or_insert(0) += 1;
        *summary
            .by_file
            .entry(change.file_path.clone())
            .or_insert(0) += 1;

        if change.impact_score < 3.0 {
            summary.impact_distribution.low += 1;
        } else if change.impact_score < 7.0 {
            summary.impact_distribution.medium += 1;
        } else {
            summary.impact_distribution.high += 1;
        }

        summary.max_impact = summary.max_impact.max(change.impact_score);
    }

    if !changes.is_empty() {
        summary.average_impact =
            changes.iter().map(|c| c.impact_score).sum::<f64>() / changes.len() as f64;
    }

    summary
}
