//! Type definitions for recommendation evaluation.

use std::collections::BTreeMap;
use std::time::Duration;

use serde::{Deserialize, Serialize};

use crate::rules::{Category, Confidence};

/// Lifecycle state of a recommendation, changed only by user actions.
#[derive(Debug, Clone, Copy, Default, Serialize, Deserialize, PartialEq, Eq)]
#[serde(rename_all = "lowercase")]
pub enum RecommendationStatus {
    #[default]
    Pending,
    Accepted,
    Declined,
    Saved,
}

/// One finding produced by matching a rule against a marker.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct Recommendation {
    /// `rec-<rule_id>-<rsid>-<created_at>`
    pub id: String,
    pub rule_id: String,
    pub gene: String,
    /// The rsid that triggered the rule
    pub rsid: String,
    pub category: Category,
    pub title: String,
    /// Technical recommendation text from the rule
    pub explanation: String,
    /// Rule confidence after user-profile modifiers
    pub confidence: Confidence,
    pub actions: Vec<String>,
    #[serde(default)]
    pub status: RecommendationStatus,
    /// Milliseconds since the Unix epoch
    pub created_at: i64,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub patient_friendly_explanation: Option<String>,
    /// True once enrichment wrote a patient-friendly explanation
    #[serde(default)]
    pub enriched: bool,
    /// The explanation is a canned demo response, not model output
    #[serde(default)]
    pub mock_explanation: bool,
}

/// Read-only facts about the user that adjust confidence.
#[derive(Debug, Clone, Default, Serialize, Deserialize, PartialEq)]
pub struct UserProfile {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub age: Option<u32>,
    #[serde(default)]
    pub medications: Vec<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub sex: Option<String>,
}

#[derive(Debug, Clone, Copy, PartialEq)]
pub struct EvaluationOptions {
    pub use_enrichment: bool,
    pub max_recommendations: usize,
}

impl Default for EvaluationOptions {
    fn default() -> Self {
        Self {
            use_enrichment: false,
            max_recommendations: 50,
        }
    }
}

/// Pacing for enrichment calls.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct EnrichmentBatch {
    /// Concurrent calls per batch
    pub size: usize,
    /// Pause between batches (none after the last)
    pub delay: Duration,
}

impl Default for EnrichmentBatch {
    fn default() -> Self {
        Self {
            size: 5,
            delay: Duration::from_millis(1000),
        }
    }
}

/// Output of one evaluation run.
#[derive(Debug, Clone, Serialize, PartialEq)]
pub struct Evaluation {
    /// Monotonic run id from the engine that produced this result
    pub generation: u64,
    pub recommendations: Vec<Recommendation>,
}

/// Aggregate heuristic score over a recommendation list.
#[derive(Debug, Clone, Default, Serialize, Deserialize, PartialEq)]
pub struct RiskScore {
    /// 0-100
    pub overall: f64,
    pub by_category: BTreeMap<Category, f64>,
}

/// What happened during one enrichment pass.
#[derive(Debug, Clone, Copy, Default, Serialize, PartialEq, Eq)]
pub struct EnrichmentReport {
    pub generation: u64,
    /// True when no generator was configured and nothing was attempted
    pub skipped: bool,
    pub attempted: usize,
    pub enriched: usize,
    pub failed: usize,
    /// Results dropped because a newer evaluation superseded this one
    pub discarded: usize,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_status_serializes_lowercase() {
        assert_eq!(
            serde_json::to_string(&RecommendationStatus::Declined).unwrap(),
            r#""declined""#
        );
        assert_eq!(RecommendationStatus::default(), RecommendationStatus::Pending);
    }

    #[test]
    fn test_profile_deserializes_partial() {
        let profile: UserProfile = serde_json::from_str(r#"{"age": 42}"#).unwrap();
        assert_eq!(profile.age, Some(42));
        assert!(profile.medications.is_empty());
        assert!(profile.sex.is_none());
    }

    #[test]
    fn test_option_defaults() {
        let options = EvaluationOptions::default();
        assert!(!options.use_enrichment);
        assert_eq!(options.max_recommendations, 50);

        let batch = EnrichmentBatch::default();
        assert_eq!(batch.size, 5);
        assert_eq!(batch.delay, Duration::from_secs(1));
    }
}
