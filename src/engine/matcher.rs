//! Genotype matching, confidence modifiers, and action items.

use crate::rules::{Category, Confidence, GeneticRule, GenotypePattern};

use super::types::UserProfile;

/// Medication substrings that make drug findings more pressing.
const RELATED_DRUGS: [&str; 5] = ["warfarin", "clopidogrel", "statin", "plavix", "coumadin"];

/// Uppercase and drop everything outside {A,C,G,T}.
fn normalize_genotype(genotype: &str) -> String {
    genotype
        .chars()
        .map(|c| c.to_ascii_uppercase())
        .filter(|c| matches!(c, 'A' | 'C' | 'G' | 'T'))
        .collect()
}

fn matches_one(observed: &str, pattern: &str) -> bool {
    let pattern = normalize_genotype(pattern);
    let reversed: String = pattern.chars().rev().collect();
    observed == pattern || observed == reversed
}

/// Orientation-insensitive match of an observed genotype against a rule pattern.
///
/// ```ignore
/// assert!(genotype_matches("GA", &GenotypePattern::One("AG".into())));
/// ```
pub fn genotype_matches(genotype: &str, pattern: &GenotypePattern) -> bool {
    let observed = normalize_genotype(genotype);
    pattern
        .alternatives()
        .iter()
        .any(|p| matches_one(&observed, p))
}

/// Adjust a rule's static confidence for the user's age and medications.
pub fn apply_user_modifiers(rule: &GeneticRule, profile: Option<&UserProfile>) -> Confidence {
    let Some(profile) = profile else {
        return rule.confidence;
    };

    let mut confidence = rule.confidence;

    if let Some(age) = profile.age {
        if rule.category == Category::Cancer && age > 50 && confidence == Confidence::Medium {
            confidence = Confidence::High;
        }
        if rule.category == Category::Metabolic && age < 30 && confidence == Confidence::High {
            confidence = Confidence::Medium;
        }
    }

    if rule.category == Category::Drug && !profile.medications.is_empty() {
        let on_related_drug = profile.medications.iter().any(|med| {
            let med = med.to_lowercase();
            RELATED_DRUGS.iter().any(|drug| med.contains(drug))
        });
        if on_related_drug && confidence == Confidence::Medium {
            confidence = Confidence::High;
        }
    }

    confidence
}

/// Fixed action items for a rule, by category.
///
/// The medical alert item keys off the rule's static confidence, not the
/// profile-adjusted one.
pub fn generate_actions(rule: &GeneticRule) -> Vec<String> {
    let mut actions: Vec<&str> = match rule.category {
        Category::Drug => {
            let mut drug = vec![
                "Discuss with physician before starting new medications",
                "Add to medical record",
                "Inform pharmacist",
            ];
            if rule.confidence == Confidence::High {
                drug.push("Consider wearing medical alert bracelet");
            }
            drug
        }
        Category::Cancer => vec![
            "Schedule genetic counseling consultation",
            "Discuss enhanced screening with oncologist",
            "Inform family members of hereditary risk",
        ],
        Category::Disease => vec![
            "Discuss with primary care physician",
            "Consider preventive screening",
            "Implement lifestyle modifications",
        ],
        Category::Metabolic => vec![
            "Schedule bloodwork to assess current status",
            "Consult with dietitian for meal planning",
            "Establish exercise routine",
        ],
        Category::Lifestyle => vec![
            "Implement recommended modifications",
            "Track progress in health journal",
        ],
    };

    actions.push("Save to lifestyle plan");
    actions.push("Export for medical records");
    actions.into_iter().map(String::from).collect()
}
