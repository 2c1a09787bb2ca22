//! Recommendation engine: matches markers against the rule table.
//!
//! The `RecommendationEngine` takes normalized markers and an optional user
//! profile, then produces ranked recommendations. Enrichment through a
//! [`TextGenerator`] is a separate, optional pass guarded by a generation id
//! so results for a superseded run are never written back.

mod matcher;
mod scoring;
mod types;

use std::collections::HashMap;
use std::sync::atomic::{AtomicU64, Ordering};
use std::sync::Arc;

use chrono::{DateTime, Utc};
use futures::future::join_all;
use tracing::{debug, info, warn};

use crate::enrichment::{explanation_prompt, GenerateOptions, TextGenerator};
use crate::parser::GeneticMarker;
use crate::rules::RuleTable;

pub use matcher::{apply_user_modifiers, generate_actions, genotype_matches};
pub use scoring::{calculate_risk_score, prioritized_actions};
pub use types::*;

const TITLE_IMPLICATION_CHARS: usize = 50;

/// The recommendation engine.
///
/// Cheap to clone; clones share the rule table and the generation counter.
#[derive(Debug, Clone)]
pub struct RecommendationEngine {
    rules: Arc<RuleTable>,
    generation: Arc<AtomicU64>,
}

impl RecommendationEngine {
    /// Create a new engine over a rule table (typically from `default_rules()`).
    pub fn new(rules: RuleTable) -> Self {
        Self {
            rules: Arc::new(rules),
            generation: Arc::new(AtomicU64::new(0)),
        }
    }

    pub fn rules(&self) -> &RuleTable {
        &self.rules
    }

    /// Id of the most recent evaluation run.
    pub fn current_generation(&self) -> u64 {
        self.generation.load(Ordering::SeqCst)
    }

    pub fn is_current(&self, generation: u64) -> bool {
        self.current_generation() == generation
    }

    /// Evaluate markers, stamping recommendations with the current time.
    pub fn evaluate(
        &self,
        markers: &[GeneticMarker],
        profile: Option<&UserProfile>,
        options: &EvaluationOptions,
    ) -> Evaluation {
        self.evaluate_at(markers, profile, options, Utc::now())
    }

    /// Evaluate markers with an explicit creation timestamp.
    ///
    /// Starts a new generation. Given the same inputs and timestamp the
    /// recommendations are identical.
    pub fn evaluate_at(
        &self,
        markers: &[GeneticMarker],
        profile: Option<&UserProfile>,
        options: &EvaluationOptions,
        created_at: DateTime<Utc>,
    ) -> Evaluation {
        let generation = self.generation.fetch_add(1, Ordering::SeqCst) + 1;
        let created_ms = created_at.timestamp_millis();

        // Later duplicates overwrite earlier ones
        let by_rsid: HashMap<&str, &GeneticMarker> =
            markers.iter().map(|m| (m.rsid.as_str(), m)).collect();

        let mut recommendations = Vec::new();
        for rule in self.rules.iter() {
            let matched = rule.rsids.iter().find(|rsid| {
                by_rsid
                    .get(rsid.as_str())
                    .is_some_and(|m| genotype_matches(&m.genotype, &rule.genotype_pattern))
            });
            let Some(rsid) = matched else {
                continue;
            };

            debug!("Rule {} matched {}", rule.id, rsid);
            let implication: String = rule.implication.chars().take(TITLE_IMPLICATION_CHARS).collect();
            recommendations.push(Recommendation {
                id: format!("rec-{}-{}-{}", rule.id, rsid, created_ms),
                rule_id: rule.id.clone(),
                gene: rule.gene.clone(),
                rsid: rsid.clone(),
                category: rule.category,
                title: format!("{}: {}...", rule.gene, implication),
                explanation: rule.recommendation.clone(),
                confidence: apply_user_modifiers(rule, profile),
                actions: generate_actions(rule),
                status: RecommendationStatus::Pending,
                created_at: created_ms,
                patient_friendly_explanation: None,
                enriched: false,
                mock_explanation: false,
            });
        }

        // Stable, so equal weights keep declaration order
        recommendations.sort_by(|a, b| {
            let wa = self.rule_weight(&a.rule_id);
            let wb = self.rule_weight(&b.rule_id);
            wb.total_cmp(&wa)
        });
        recommendations.truncate(options.max_recommendations);

        info!(
            "Evaluation {}: {} markers produced {} recommendations",
            generation,
            markers.len(),
            recommendations.len()
        );

        Evaluation {
            generation,
            recommendations,
        }
    }

    fn rule_weight(&self, rule_id: &str) -> f64 {
        self.rules.get(rule_id).map_or(0.5, |r| r.weight)
    }

    pub fn risk_score(&self, recommendations: &[Recommendation]) -> RiskScore {
        calculate_risk_score(recommendations, &self.rules)
    }

    /// Add patient-friendly explanations in paced concurrent batches.
    ///
    /// Per-item failures are logged and leave that recommendation untouched.
    /// Results that arrive after a newer evaluation started are discarded.
    pub async fn enrich<G: TextGenerator>(
        &self,
        evaluation: &mut Evaluation,
        generator: &G,
        batch: &EnrichmentBatch,
    ) -> EnrichmentReport {
        let mut report = EnrichmentReport {
            generation: evaluation.generation,
            ..Default::default()
        };

        if !generator.is_configured() {
            info!("Text generation not configured, skipping enrichment");
            report.skipped = true;
            return report;
        }

        let size = batch.size.max(1);
        let total = evaluation.recommendations.len();
        let batches = total.div_ceil(size);

        for (index, chunk) in evaluation.recommendations.chunks_mut(size).enumerate() {
            if !self.is_current(report.generation) {
                warn!(
                    "Evaluation {} superseded, stopping enrichment",
                    report.generation
                );
                break;
            }

            let prompts: Vec<String> = chunk.iter().map(explanation_prompt).collect();
            report.attempted += chunk.len();

            let results = join_all(
                prompts
                    .iter()
                    .map(|prompt| generator.generate(prompt, GenerateOptions::explanation())),
            )
            .await;

            let current = self.is_current(report.generation);
            for (rec, result) in chunk.iter_mut().zip(results) {
                match result {
                    Ok(generated) if generated.text.trim().is_empty() => {
                        warn!("Empty explanation for {}", rec.id);
                        report.failed += 1;
                    }
                    Ok(_) if !current => report.discarded += 1,
                    Ok(generated) => {
                        rec.patient_friendly_explanation = Some(generated.text);
                        rec.enriched = true;
                        rec.mock_explanation = generated.mock;
                        report.enriched += 1;
                    }
                    Err(e) => {
                        warn!("Failed to enrich recommendation {}: {}", rec.id, e);
                        report.failed += 1;
                    }
                }
            }

            if index + 1 < batches && !batch.delay.is_zero() {
                tokio::time::sleep(batch.delay).await;
            }
        }

        info!(
            "Enrichment {}: {} attempted, {} enriched, {} failed, {} discarded",
            report.generation, report.attempted, report.enriched, report.failed, report.discarded
        );
        report
    }

    /// Evaluate, then enrich when `options.use_enrichment` is set.
    pub async fn evaluate_with_enrichment<G: TextGenerator>(
        &self,
        markers: &[GeneticMarker],
        profile: Option<&UserProfile>,
        options: &EvaluationOptions,
        generator: &G,
        batch: &EnrichmentBatch,
    ) -> (Evaluation, Option<EnrichmentReport>) {
        let mut evaluation = self.evaluate(markers, profile, options);
        if !options.use_enrichment {
            return (evaluation, None);
        }
        let report = self.enrich(&mut evaluation, generator, batch).await;
        (evaluation, Some(report))
    }
}
