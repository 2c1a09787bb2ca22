//! Type definitions for the genetic rule table.
//!
//! These types support both TOML deserialization (for loading rules)
//! and JSON serialization (for exports and the command layer).

use std::fmt;

use serde::{Deserialize, Serialize};

// =============================================================================
// CONFIGURATION TYPES (loaded from TOML)
// =============================================================================

/// Root configuration loaded from genetic_rules.toml.
#[derive(Debug, Clone, Deserialize)]
pub struct RulesConfig {
    /// Rules in declaration order
    #[serde(default)]
    pub rules: Vec<GeneticRule>,
}

/// A rule mapping a genotype at one or more variants to a recommendation.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct GeneticRule {
    /// Unique rule identifier (e.g., "VKORC1-WARFARIN-SENSITIVE")
    pub id: String,
    /// Gene symbol the rule is about
    pub gene: String,
    /// Variants to check, in priority order
    pub rsids: Vec<String>,
    /// Genotype(s) that trigger the rule, orientation-insensitive
    pub genotype_pattern: GenotypePattern,
    pub category: Category,
    /// What the finding means
    pub implication: String,
    /// What to do about it
    pub recommendation: String,
    /// Static evidence confidence before user modifiers
    pub confidence: Confidence,
    /// Evidence-strength coefficient in [0, 1], used for ranking and scoring
    pub weight: f64,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub evidence_url: Option<String>,
}

/// A single genotype or a list of alternatives.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
#[serde(untagged)]
pub enum GenotypePattern {
    One(String),
    AnyOf(Vec<String>),
}

impl GenotypePattern {
    /// All alternatives as a slice, whichever form the pattern was written in.
    pub fn alternatives(&self) -> &[String] {
        match self {
            GenotypePattern::One(p) => std::slice::from_ref(p),
            GenotypePattern::AnyOf(ps) => ps,
        }
    }
}

/// Kind of finding a rule describes.
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq, PartialOrd, Ord, Hash)]
#[serde(rename_all = "lowercase")]
pub enum Category {
    Drug,
    Disease,
    Cancer,
    Metabolic,
    Lifestyle,
}

impl Category {
    pub const ALL: [Category; 5] = [
        Category::Drug,
        Category::Disease,
        Category::Cancer,
        Category::Metabolic,
        Category::Lifestyle,
    ];

    pub fn as_str(&self) -> &'static str {
        match self {
            Category::Drug => "drug",
            Category::Disease => "disease",
            Category::Cancer => "cancer",
            Category::Metabolic => "metabolic",
            Category::Lifestyle => "lifestyle",
        }
    }
}

impl fmt::Display for Category {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Qualitative evidence strength. Ordered `Low < Medium < High`.
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq, PartialOrd, Ord, Hash)]
#[serde(rename_all = "lowercase")]
pub enum Confidence {
    Low,
    Medium,
    High,
}

impl Confidence {
    /// Numeric factor used by risk scoring.
    pub fn factor(&self) -> f64 {
        match self {
            Confidence::High => 1.0,
            Confidence::Medium => 0.6,
            Confidence::Low => 0.3,
        }
    }
}

impl fmt::Display for Confidence {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(match self {
            Confidence::Low => "low",
            Confidence::Medium => "medium",
            Confidence::High => "high",
        })
    }
}
