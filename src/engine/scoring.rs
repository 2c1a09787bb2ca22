//! Aggregate risk score and prioritized action summary.

use crate::rules::{Category, Confidence, RuleTable};

use super::types::{Recommendation, RiskScore};

/// Weight used when a recommendation's rule is not in the table.
const FALLBACK_WEIGHT: f64 = 0.5;

/// Heuristic 0-100 index: confidence-weighted mean of rule weights.
///
/// Not a clinical risk model.
pub fn calculate_risk_score(recommendations: &[Recommendation], rules: &RuleTable) -> RiskScore {
    let mut score = RiskScore::default();
    let mut total_weight = 0.0;
    let mut weighted_sum = 0.0;

    for rec in recommendations {
        let weight = rules
            .get(&rec.rule_id)
            .map_or(FALLBACK_WEIGHT, |rule| rule.weight);
        let item = weight * rec.confidence.factor();

        weighted_sum += item;
        total_weight += weight;
        *score.by_category.entry(rec.category).or_insert(0.0) += item;
    }

    if total_weight > 0.0 {
        score.overall = weighted_sum / total_weight * 100.0;
    }
    score
}

fn truncate_chars(text: &str, max: usize) -> String {
    text.chars().take(max).collect()
}

/// Short summary lines for the most pressing findings.
pub fn prioritized_actions(recommendations: &[Recommendation]) -> Vec<String> {
    let mut lines = Vec::new();

    let high: Vec<_> = recommendations
        .iter()
        .filter(|r| r.confidence == Confidence::High)
        .collect();
    if !high.is_empty() {
        lines.push("⚠️ High Priority Actions:".to_string());
        for rec in high.iter().take(3) {
            lines.push(format!(
                "  • {}: {}...",
                rec.gene,
                truncate_chars(&rec.explanation, 80)
            ));
        }
    }

    let drug = recommendations
        .iter()
        .filter(|r| r.category == Category::Drug)
        .count();
    if drug > 0 {
        lines.push("💊 Medication Considerations:".to_string());
        lines.push(format!(
            "  • Discuss {} pharmacogenomic findings with physician",
            drug
        ));
    }

    let cancer = recommendations
        .iter()
        .filter(|r| r.category == Category::Cancer)
        .count();
    if cancer > 0 {
        lines.push("🧬 Genetic Counseling Recommended:".to_string());
        lines.push(format!(
            "  • {} hereditary cancer risk markers identified",
            cancer
        ));
    }

    lines
}
