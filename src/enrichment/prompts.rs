//! Prompt construction for the text-generation service.

use serde::{Deserialize, Serialize};

use crate::engine::{Recommendation, UserProfile};
use crate::parser::GeneticMarker;

pub const EXPLANATION_TEMPERATURE: f32 = 0.7;
pub const EXPLANATION_MAX_TOKENS: u32 = 200;

const CONTEXT_MARKERS: usize = 5;
const CONTEXT_RECOMMENDATIONS: usize = 3;

/// App state that can be prefixed to a free-form question.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct PromptContext {
    pub page: Option<String>,
    #[serde(default)]
    pub markers: Vec<GeneticMarker>,
    #[serde(default)]
    pub recommendations: Vec<Recommendation>,
    pub user_profile: Option<UserProfile>,
}

/// Prefix `prompt` with whatever context is present.
///
/// Returns `prompt` unchanged when the context is absent or empty.
pub fn build_prompt_with_context(prompt: &str, context: Option<&PromptContext>) -> String {
    let Some(context) = context else {
        return prompt.to_string();
    };

    let mut prefix = String::new();

    if let Some(page) = context.page.as_deref().filter(|p| !p.is_empty()) {
        prefix.push_str(&format!("Current page: {}\n", page));
    }

    if !context.markers.is_empty() {
        prefix.push_str("\nTop genetic markers:\n");
        for m in context.markers.iter().take(CONTEXT_MARKERS) {
            prefix.push_str(&format!("- {} ({}): {}\n", m.gene, m.rsid, m.genotype));
        }
    }

    if !context.recommendations.is_empty() {
        prefix.push_str("\nRecent recommendations:\n");
        for r in context.recommendations.iter().take(CONTEXT_RECOMMENDATIONS) {
            prefix.push_str(&format!("- {}\n", r.title));
        }
    }

    if let Some(profile) = &context.user_profile {
        let json = serde_json::to_string(profile).unwrap_or_default();
        prefix.push_str(&format!("\nUser profile: {}\n", json));
    }

    if prefix.is_empty() {
        prompt.to_string()
    } else {
        format!("{}\n---\nUser question: {}", prefix, prompt)
    }
}

/// Ask for a short patient-friendly rephrasing of one finding.
pub fn explanation_prompt(rec: &Recommendation) -> String {
    format!(
        "You are a genetic counselor explaining test results to a patient.\n\
         \n\
         Genetic finding:\n\
         - Gene: {gene}\n\
         - Variant: {rsid}\n\
         - Technical explanation: {explanation}\n\
         \n\
         Provide a SHORT (2-3 sentences), patient-friendly explanation that:\n\
         1. Explains what this means in simple terms\n\
         2. Mentions practical implications\n\
         3. Emphasizes consulting healthcare providers for medical decisions\n\
         \n\
         Keep it reassuring and educational. Do not make specific medical recommendations.",
        gene = rec.gene,
        rsid = rec.rsid,
        explanation = rec.explanation,
    )
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::engine::RecommendationStatus;
    use crate::rules::{Category, Confidence};

    fn rec(title: &str) -> Recommendation {
        Recommendation {
            id: "rec-1".to_string(),
            rule_id: "VKORC1-WARFARIN-SENSITIVE".to_string(),
            gene: "VKORC1".to_string(),
            rsid: "rs9923231".to_string(),
            category: Category::Drug,
            title: title.to_string(),
            explanation: "Require 30-50% lower warfarin dose.".to_string(),
            confidence: Confidence::High,
            actions: vec![],
            status: RecommendationStatus::Pending,
            created_at: 0,
            patient_friendly_explanation: None,
            enriched: false,
            mock_explanation: false,
        }
    }

    #[test]
    fn test_no_context_returns_prompt() {
        assert_eq!(build_prompt_with_context("hello", None), "hello");
        let empty = PromptContext::default();
        assert_eq!(build_prompt_with_context("hello", Some(&empty)), "hello");
    }

    #[test]
    fn test_context_truncates_markers_and_titles() {
        let context = PromptContext {
            page: Some("dashboard".to_string()),
            markers: (1..=7)
                .map(|i| GeneticMarker::new(&format!("rs{}", i), "GENE", "AG"))
                .collect(),
            recommendations: (1..=4).map(|i| rec(&format!("Title {}", i))).collect(),
            user_profile: Some(UserProfile {
                age: Some(40),
                ..Default::default()
            }),
        };

        let prompt = build_prompt_with_context("What now?", Some(&context));
        assert!(prompt.starts_with("Current page: dashboard\n"));
        assert!(prompt.contains("- GENE (rs5): AG\n"));
        assert!(!prompt.contains("(rs6)"));
        assert!(prompt.contains("- Title 3\n"));
        assert!(!prompt.contains("Title 4"));
        assert!(prompt.contains("User profile: {\"age\":40,\"medications\":[]}"));
        assert!(prompt.ends_with("\n---\nUser question: What now?"));
    }

    #[test]
    fn test_explanation_prompt_names_finding() {
        let prompt = explanation_prompt(&rec("t"));
        assert!(prompt.contains("- Gene: VKORC1"));
        assert!(prompt.contains("- Variant: rs9923231"));
        assert!(prompt.contains("Technical explanation: Require 30-50% lower warfarin dose."));
    }
}
