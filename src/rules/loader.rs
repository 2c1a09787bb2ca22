//! TOML rule loading.
//!
//! Provides two loading methods:
//! - `default_rules()` - Loads the embedded rule table compiled into the binary
//! - `load_rules(path)` - Loads a custom rule table from a file path

use anyhow::{Context, Result};
use serde::Deserialize;
use std::path::Path;
use tracing::warn;

use super::table::RuleTable;
use super::types::{GeneticRule, RulesConfig};

/// Default rules embedded in the binary at compile time.
/// These are loaded from `config/genetic_rules.toml`.
const DEFAULT_RULES: &str = include_str!("../../config/genetic_rules.toml");

/// Rule entries before per-rule decoding.
#[derive(Debug, Deserialize)]
struct RawRulesConfig {
    #[serde(default)]
    rules: Vec<toml::Value>,
}

/// Decode one entry, or log why it was skipped.
fn decode_rule(index: usize, value: toml::Value) -> Option<GeneticRule> {
    let id = value
        .get("id")
        .and_then(toml::Value::as_str)
        .unwrap_or("<no id>")
        .to_string();
    match value.try_into::<GeneticRule>() {
        Ok(rule) => Some(rule),
        Err(e) => {
            warn!("Skipping rule '{}' (entry {}): {}", id, index, e);
            None
        }
    }
}

/// Parse a rule table from TOML text.
///
/// Malformed TOML is an error. Individual entries that fail to decode or
/// validate are skipped with a warning.
pub fn parse_rules(content: &str) -> Result<RuleTable> {
    let raw: RawRulesConfig = toml::from_str(content)?;
    let rules = raw
        .rules
        .into_iter()
        .enumerate()
        .filter_map(|(index, value)| decode_rule(index, value))
        .collect();
    Ok(RuleTable::from_config(RulesConfig { rules }))
}

/// Load rules from a TOML file at the given path.
///
/// # Example
/// ```ignore
/// let table = load_rules(Path::new("/path/to/custom_rules.toml"))?;
/// ```
pub fn load_rules(path: &Path) -> Result<RuleTable> {
    let content = std::fs::read_to_string(path)
        .with_context(|| format!("Failed to read rules file {}", path.display()))?;
    parse_rules(&content).with_context(|| format!("Invalid rules file {}", path.display()))
}

/// Get the default rule table embedded in the binary.
///
/// # Panics
/// Panics if the embedded TOML is invalid (this would be a compile-time bug).
pub fn default_rules() -> RuleTable {
    parse_rules(DEFAULT_RULES).expect("embedded genetic_rules.toml must be valid TOML")
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::rules::types::{Category, Confidence};
    use std::io::Write;

    #[test]
    fn test_default_rules_loads_all_entries() {
        let table = default_rules();
        assert_eq!(table.len(), 36, "Embedded table should keep every rule");
    }

    #[test]
    fn test_default_rules_declaration_order() {
        let table = default_rules();
        let ids: Vec<&str> = table.iter().take(3).map(|r| r.id.as_str()).collect();
        assert_eq!(ids, vec!["CYP2D6-PM", "CYP2D6-UM", "CYP2C9-WARFARIN"]);
        assert_eq!(table.iter().last().map(|r| r.id.as_str()), Some("F2-PROTHROMBIN"));
    }

    #[test]
    fn test_vkorc1_sensitive_rule() {
        let table = default_rules();
        let rule = table.get("VKORC1-WARFARIN-SENSITIVE").expect("rule exists");
        assert_eq!(rule.rsids, vec!["rs9923231".to_string()]);
        assert_eq!(rule.category, Category::Drug);
        assert_eq!(rule.confidence, Confidence::High);
        assert_eq!(rule.weight, 0.95);
    }

    #[test]
    fn test_every_category_is_represented() {
        let table = default_rules();
        for category in Category::ALL {
            assert!(
                !table.by_category(category).is_empty(),
                "Expected rules for category {}",
                category
            );
        }
    }

    #[test]
    fn test_load_rules_from_file() {
        let mut file = tempfile::NamedTempFile::new().unwrap();
        writeln!(
            file,
            r#"
[[rules]]
id = "TEST-1"
gene = "TEST"
rsids = ["rs1"]
genotype_pattern = "AG"
category = "lifestyle"
implication = "Test implication"
recommendation = "Test recommendation"
confidence = "low"
weight = 0.4
"#
        )
        .unwrap();

        let table = load_rules(file.path()).unwrap();
        assert_eq!(table.len(), 1);
        assert!(table.get("TEST-1").is_some());
    }

    #[test]
    fn test_load_rules_missing_file() {
        let result = load_rules(Path::new("/nonexistent/genetic_rules.toml"));
        assert!(result.is_err());
    }

    const GOOD_RULE: &str = r#"
[[rules]]
id = "GOOD-1"
gene = "GOOD"
rsids = ["rs1"]
genotype_pattern = ["AG", "GG"]
category = "drug"
implication = "Good implication"
recommendation = "Good recommendation"
confidence = "high"
weight = 0.8
"#;

    #[test]
    fn test_unknown_category_skips_only_that_rule() {
        let content = format!(
            "{}{}",
            GOOD_RULE,
            r#"
[[rules]]
id = "BAD-CATEGORY"
gene = "BAD"
rsids = ["rs2"]
genotype_pattern = "AA"
category = "astrology"
implication = "x"
recommendation = "y"
confidence = "low"
weight = 0.3
"#
        );
        let table = parse_rules(&content).unwrap();
        assert_eq!(table.len(), 1);
        assert!(table.get("GOOD-1").is_some());
        assert!(table.get("BAD-CATEGORY").is_none());
    }

    #[test]
    fn test_missing_field_skips_only_that_rule() {
        let content = format!(
            "{}{}",
            r#"
[[rules]]
id = "NO-WEIGHT"
gene = "BAD"
rsids = ["rs2"]
genotype_pattern = "AA"
category = "disease"
implication = "x"
recommendation = "y"
confidence = "medium"
"#,
            GOOD_RULE
        );
        let table = parse_rules(&content).unwrap();
        assert_eq!(table.len(), 1);
        assert_eq!(table.iter().next().map(|r| r.id.as_str()), Some("GOOD-1"));
    }

    #[test]
    fn test_parse_rules_invalid_toml() {
        assert!(parse_rules("[[rules]\nid = ").is_err());
    }
}
