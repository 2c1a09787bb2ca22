use std::sync::atomic::{AtomicBool, AtomicUsize, Ordering};
use std::sync::Mutex;
use std::time::Duration;

use sera::engine::{EnrichmentBatch, EvaluationOptions, RecommendationEngine};
use sera::enrichment::{GeminiClient, GenerateOptions, GeneratedText, MockResponder, TextGenerator};
use sera::parser::{sample_markers, SamplePreset};
use sera::{default_rules, EnrichmentError, GeneticMarker};

/// Scripted generator that records how it was called.
#[derive(Default)]
struct ScriptedGenerator {
    unconfigured: bool,
    /// Prompts naming this gene fail with an API error
    fail_gene: Option<&'static str>,
    /// Prompts naming this gene come back empty
    empty_gene: Option<&'static str>,
    /// Start a newer evaluation on the first call
    supersede: Option<RecommendationEngine>,
    superseded: AtomicBool,
    in_flight: AtomicUsize,
    max_in_flight: AtomicUsize,
    prompts: Mutex<Vec<String>>,
}

impl ScriptedGenerator {
    fn calls(&self) -> usize {
        self.prompts.lock().unwrap().len()
    }
}

impl TextGenerator for ScriptedGenerator {
    fn is_configured(&self) -> bool {
        !self.unconfigured
    }

    async fn generate(
        &self,
        prompt: &str,
        options: GenerateOptions<'_>,
    ) -> Result<GeneratedText, EnrichmentError> {
        assert_eq!(options.max_tokens, Some(200));
        self.prompts.lock().unwrap().push(prompt.to_string());

        let now = self.in_flight.fetch_add(1, Ordering::SeqCst) + 1;
        self.max_in_flight.fetch_max(now, Ordering::SeqCst);
        tokio::task::yield_now().await;
        self.in_flight.fetch_sub(1, Ordering::SeqCst);

        if let Some(engine) = &self.supersede {
            if !self.superseded.swap(true, Ordering::SeqCst) {
                engine.evaluate(&[], None, &EvaluationOptions::default());
            }
        }

        let names = |gene: Option<&str>| gene.is_some_and(|g| prompt.contains(&format!("Gene: {}\n", g)));
        if names(self.fail_gene) {
            return Err(EnrichmentError::Api {
                status: 500,
                body: "internal".to_string(),
            });
        }
        let text = if names(self.empty_gene) {
            "   ".to_string()
        } else {
            format!("Plain-language note #{}", self.calls())
        };
        Ok(GeneratedText {
            text,
            finish_reason: Some("STOP".to_string()),
            mock: false,
        })
    }
}

fn four_findings() -> Vec<GeneticMarker> {
    vec![
        GeneticMarker::new("rs9923231", "VKORC1", "AA"),
        GeneticMarker::new("rs4244285", "CYP2C19", "AA"),
        GeneticMarker::new("rs1800462", "TPMT", "CT"),
    ]
}

fn no_delay(size: usize) -> EnrichmentBatch {
    EnrichmentBatch {
        size,
        delay: Duration::ZERO,
    }
}

#[tokio::test]
async fn test_enriches_every_recommendation() {
    let engine = RecommendationEngine::new(default_rules());
    let mut evaluation = engine.evaluate(&four_findings(), None, &EvaluationOptions::default());
    assert_eq!(evaluation.recommendations.len(), 4);

    let generator = ScriptedGenerator::default();
    let report = engine.enrich(&mut evaluation, &generator, &no_delay(2)).await;

    assert_eq!(report.generation, evaluation.generation);
    assert!(!report.skipped);
    assert_eq!(report.attempted, 4);
    assert_eq!(report.enriched, 4);
    assert_eq!(generator.calls(), 4);
    assert_eq!(generator.max_in_flight.load(Ordering::SeqCst), 2);
    for rec in &evaluation.recommendations {
        assert!(rec.enriched);
        assert!(!rec.mock_explanation);
        assert!(rec
            .patient_friendly_explanation
            .as_deref()
            .is_some_and(|t| t.starts_with("Plain-language note")));
    }
}

#[tokio::test]
async fn test_failures_leave_recommendations_untouched() {
    let engine = RecommendationEngine::new(default_rules());
    let mut evaluation = engine.evaluate(&four_findings(), None, &EvaluationOptions::default());

    let generator = ScriptedGenerator {
        fail_gene: Some("TPMT"),
        empty_gene: Some("VKORC1"),
        ..Default::default()
    };
    let report = engine.enrich(&mut evaluation, &generator, &no_delay(5)).await;

    assert_eq!(report.attempted, 4);
    assert_eq!(report.enriched, 2);
    assert_eq!(report.failed, 2);
    for rec in &evaluation.recommendations {
        let expect_enriched = rec.gene == "CYP2C19";
        assert_eq!(rec.enriched, expect_enriched, "{}", rec.rule_id);
        assert_eq!(rec.patient_friendly_explanation.is_some(), expect_enriched);
    }
}

#[tokio::test]
async fn test_unconfigured_generator_is_skipped() {
    let engine = RecommendationEngine::new(default_rules());
    let options = EvaluationOptions {
        use_enrichment: true,
        ..Default::default()
    };
    let generator = ScriptedGenerator {
        unconfigured: true,
        ..Default::default()
    };

    let (evaluation, report) = engine
        .evaluate_with_enrichment(&four_findings(), None, &options, &generator, &no_delay(5))
        .await;
    let report = report.expect("enrichment was requested");
    assert!(report.skipped);
    assert_eq!(report.attempted, 0);
    assert_eq!(generator.calls(), 0);
    assert!(evaluation.recommendations.iter().all(|r| !r.enriched));
}

#[tokio::test]
async fn test_enrichment_off_by_default() {
    let engine = RecommendationEngine::new(default_rules());
    let generator = ScriptedGenerator::default();
    let (evaluation, report) = engine
        .evaluate_with_enrichment(
            &sample_markers(SamplePreset::DiabetesRisk),
            None,
            &EvaluationOptions::default(),
            &generator,
            &no_delay(5),
        )
        .await;
    assert!(report.is_none());
    assert_eq!(evaluation.recommendations.len(), 3);
    assert_eq!(generator.calls(), 0);
}

#[tokio::test]
async fn test_superseded_evaluation_discards_results() {
    let engine = RecommendationEngine::new(default_rules());
    let mut evaluation = engine.evaluate(&four_findings(), None, &EvaluationOptions::default());
    let stale_generation = evaluation.generation;

    let generator = ScriptedGenerator {
        supersede: Some(engine.clone()),
        ..Default::default()
    };
    let report = engine.enrich(&mut evaluation, &generator, &no_delay(2)).await;

    assert!(!engine.is_current(stale_generation));
    assert_eq!(report.attempted, 2, "later batches are not started");
    assert_eq!(report.discarded, 2);
    assert_eq!(report.enriched, 0);
    assert!(evaluation.recommendations.iter().all(|r| !r.enriched));
}

#[tokio::test(start_paused = true)]
async fn test_batches_are_paced() {
    let engine = RecommendationEngine::new(default_rules());
    let mut evaluation = engine.evaluate(&four_findings(), None, &EvaluationOptions::default());
    let batch = EnrichmentBatch {
        size: 2,
        delay: Duration::from_millis(1000),
    };

    let started = tokio::time::Instant::now();
    let report = engine
        .enrich(&mut evaluation, &ScriptedGenerator::default(), &batch)
        .await;

    assert_eq!(report.enriched, 4);
    // Two batches, one pause between them and none after the last
    let elapsed = started.elapsed();
    assert!(elapsed >= Duration::from_millis(1000), "{:?}", elapsed);
    assert!(elapsed < Duration::from_millis(2000), "{:?}", elapsed);
}

#[tokio::test]
async fn test_forced_mock_marks_explanations() {
    let engine = RecommendationEngine::new(default_rules());
    let mut evaluation = engine.evaluate(&four_findings(), None, &EvaluationOptions::default());
    let client = GeminiClient::new(None, "test-model", 5)
        .unwrap()
        .with_mock_mode(true)
        .with_mock_responder(MockResponder::instant());

    let report = engine.enrich(&mut evaluation, &client, &no_delay(5)).await;

    assert_eq!(report.enriched, 4);
    for rec in &evaluation.recommendations {
        assert!(rec.enriched);
        assert!(rec.mock_explanation, "{} carries canned text", rec.rule_id);
    }
}
