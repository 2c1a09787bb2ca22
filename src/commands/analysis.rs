use std::path::Path;

use anyhow::{bail, Context, Result};
use serde::Serialize;
use tracing::{info, warn};

use crate::config::Settings;
use crate::engine::{
    prioritized_actions, EnrichmentReport, Recommendation, RecommendationEngine, RiskScore,
    UserProfile,
};
use crate::enrichment::TextGenerator;
use crate::parser::{parse_genetic_data, sample_markers, GeneticMarker, ParseResult, SamplePreset};
use crate::rules::{default_rules, load_rules, Category, Confidence, RuleTable};
use crate::store::{SnapshotStore, SqliteStore};

use super::args::EvaluateArgs;

/// Output of `sera evaluate`.
#[derive(Debug, Clone, Serialize)]
pub struct EvaluationReport {
    pub generation: u64,
    pub marker_count: usize,
    pub warnings: Vec<String>,
    pub recommendations: Vec<Recommendation>,
    pub risk_score: RiskScore,
    pub prioritized_actions: Vec<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub enrichment: Option<EnrichmentReport>,
}

/// One row of `sera rules`.
#[derive(Debug, Clone, Serialize)]
pub struct RuleSummary {
    pub id: String,
    pub gene: String,
    pub category: Category,
    pub confidence: Confidence,
    pub weight: f64,
    pub rsids: Vec<String>,
}

/// The configured rule table, or the embedded one.
pub fn rule_table(settings: &Settings) -> Result<RuleTable> {
    match &settings.rules_path {
        Some(path) => {
            let table = load_rules(path)?;
            info!("Loaded {} rules from {:?}", table.len(), path);
            Ok(table)
        }
        None => Ok(default_rules()),
    }
}

fn read_file(path: &Path) -> Result<String> {
    std::fs::read_to_string(path).with_context(|| format!("Failed to read {}", path.display()))
}

pub fn parse(path: &Path) -> Result<ParseResult> {
    let content = read_file(path)?;
    let filename = path.file_name().and_then(|n| n.to_str());
    Ok(parse_genetic_data(&content, filename))
}

pub fn sample(preset: &str) -> Result<Vec<GeneticMarker>> {
    let Some(preset) = SamplePreset::from_name(preset) else {
        bail!(
            "Unknown sample preset '{}'. Available: healthy, diabetes-risk, brca-like",
            preset
        );
    };
    Ok(sample_markers(preset))
}

pub fn rules(settings: &Settings, gene: Option<&str>, category: Option<&str>) -> Result<Vec<RuleSummary>> {
    let table = rule_table(settings)?;
    let category = category
        .map(|c| {
            serde_json::from_value::<Category>(serde_json::Value::String(c.to_lowercase()))
                .with_context(|| format!("Unknown category '{}'", c))
        })
        .transpose()?;

    Ok(table
        .iter()
        .filter(|r| gene.map_or(true, |g| r.gene.eq_ignore_ascii_case(g)))
        .filter(|r| category.map_or(true, |c| r.category == c))
        .map(|r| RuleSummary {
            id: r.id.clone(),
            gene: r.gene.clone(),
            category: r.category,
            confidence: r.confidence,
            weight: r.weight,
            rsids: r.rsids.clone(),
        })
        .collect())
}

/// Parse, evaluate, optionally enrich and persist.
pub async fn evaluate<G: TextGenerator>(
    args: &EvaluateArgs,
    settings: &Settings,
    generator: &G,
) -> Result<EvaluationReport> {
    let parsed = parse(&args.file)?;
    if !parsed.success {
        bail!("{}", parsed.errors.join("; "));
    }

    let profile: Option<UserProfile> = args
        .profile
        .as_deref()
        .map(serde_json::from_str::<UserProfile>)
        .transpose()
        .context("Invalid --profile JSON")?;

    let mut options = settings.evaluation_options();
    options.use_enrichment |= args.enrich;
    if let Some(max) = args.max {
        options.max_recommendations = max;
    }

    let engine = RecommendationEngine::new(rule_table(settings)?);
    if options.use_enrichment && !generator.is_configured() {
        warn!("Enrichment requested but no API key is configured; continuing without it");
    }

    let (evaluation, enrichment) = engine
        .evaluate_with_enrichment(
            &parsed.markers,
            profile.as_ref(),
            &options,
            generator,
            &settings.enrichment_batch(),
        )
        .await;

    if args.save {
        let store = SqliteStore::new(&settings.store_path())?;
        let mut snapshot = store.load_all()?;
        snapshot.merge_markers(&parsed.markers);
        snapshot.replace_recommendations(evaluation.recommendations.clone());
        if let Some(profile) = &profile {
            snapshot.profile = profile.clone();
        }
        store.save_all(&snapshot)?;
    }

    Ok(EvaluationReport {
        generation: evaluation.generation,
        marker_count: parsed.markers.len(),
        warnings: parsed.warnings,
        risk_score: engine.risk_score(&evaluation.recommendations),
        prioritized_actions: prioritized_actions(&evaluation.recommendations),
        recommendations: evaluation.recommendations,
        enrichment,
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::enrichment::{GeminiClient, MockResponder};
    use std::path::PathBuf;
    use tempfile::TempDir;

    fn write(dir: &TempDir, name: &str, content: &str) -> PathBuf {
        let path = dir.path().join(name);
        std::fs::write(&path, content).unwrap();
        path
    }

    fn offline_client() -> GeminiClient {
        GeminiClient::new(None, "test-model", 5)
            .unwrap()
            .with_mock_responder(MockResponder::instant())
    }

    fn args(file: PathBuf) -> EvaluateArgs {
        EvaluateArgs {
            file,
            profile: None,
            enrich: false,
            max: None,
            save: false,
        }
    }

    #[test]
    fn test_sample_presets() {
        assert_eq!(sample("healthy").unwrap().len(), 4);
        assert!(sample("nope").is_err());
    }

    #[test]
    fn test_rules_filters() {
        let settings = Settings::default();
        assert_eq!(rules(&settings, None, None).unwrap().len(), 36);

        let cyp2d6 = rules(&settings, Some("cyp2d6"), None).unwrap();
        assert_eq!(cyp2d6.len(), 2);

        let lifestyle = rules(&settings, None, Some("Lifestyle")).unwrap();
        assert!(lifestyle.iter().all(|r| r.category == Category::Lifestyle));
        assert!(rules(&settings, None, Some("astrology")).is_err());
    }

    #[tokio::test]
    async fn test_evaluate_file() {
        let dir = TempDir::new().unwrap();
        let file = write(&dir, "markers.json", r#"[{"rsid": "rs9923231", "genotype": "AA"}]"#);
        let settings = Settings {
            data_dir: Some(dir.path().to_path_buf()),
            ..Default::default()
        };

        let report = evaluate(&args(file), &settings, &offline_client()).await.unwrap();
        assert_eq!(report.marker_count, 1);
        assert_eq!(report.recommendations.len(), 1);
        assert_eq!(report.recommendations[0].rule_id, "VKORC1-WARFARIN-SENSITIVE");
        assert!(report.enrichment.is_none());
        assert!((report.risk_score.overall - 100.0).abs() < 1e-9);
    }

    #[tokio::test]
    async fn test_evaluate_enrich_without_key_skips() {
        let dir = TempDir::new().unwrap();
        let file = write(&dir, "markers.tsv", "rsid\tgenotype\nrs9923231\tAA\n");
        let settings = Settings {
            data_dir: Some(dir.path().to_path_buf()),
            ..Default::default()
        };
        let mut evaluate_args = args(file);
        evaluate_args.enrich = true;

        let report = evaluate(&evaluate_args, &settings, &offline_client()).await.unwrap();
        let enrichment = report.enrichment.expect("enrichment report present");
        assert!(enrichment.skipped);
        assert!(!report.recommendations[0].enriched);
    }

    #[tokio::test]
    async fn test_evaluate_saves_snapshot() {
        let dir = TempDir::new().unwrap();
        let file = write(&dir, "markers.json", r#"{"rs9923231": "AA", "rs671": "AG"}"#);
        let settings = Settings {
            data_dir: Some(dir.path().to_path_buf()),
            ..Default::default()
        };
        let mut evaluate_args = args(file);
        evaluate_args.save = true;
        evaluate_args.profile = Some(r#"{"age": 40}"#.to_string());

        evaluate(&evaluate_args, &settings, &offline_client()).await.unwrap();

        let snapshot = SqliteStore::new(&settings.store_path()).unwrap().load_all().unwrap();
        assert_eq!(snapshot.markers.len(), 2);
        assert_eq!(snapshot.recommendations.len(), 2);
        assert_eq!(snapshot.profile.age, Some(40));
    }

    #[tokio::test]
    async fn test_evaluate_rejects_unparseable_file_and_profile() {
        let dir = TempDir::new().unwrap();
        let prose = write(&dir, "notes.txt", "nothing to see here\nreally nothing");
        let settings = Settings::default();
        let err = evaluate(&args(prose), &settings, &offline_client()).await.unwrap_err();
        assert!(err.to_string().contains("Unable to detect file format"));

        let file = write(&dir, "markers.json", r#"[{"rsid": "rs9923231", "genotype": "AA"}]"#);
        let mut bad_profile = args(file);
        bad_profile.profile = Some("{age:".to_string());
        assert!(evaluate(&bad_profile, &settings, &offline_client()).await.is_err());
    }
}
