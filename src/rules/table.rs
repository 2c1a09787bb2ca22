//! Validated, read-only rule table with lookups.

use std::collections::{HashMap, HashSet};

use tracing::{debug, warn};

use super::types::{Category, GeneticRule, RulesConfig};

/// Ordered collection of validated rules.
///
/// Built once at startup and shared read-only. Declaration order is kept
/// because recommendations for equally weighted rules follow it.
#[derive(Debug, Clone, Default)]
pub struct RuleTable {
    rules: Vec<GeneticRule>,
    by_id: HashMap<String, usize>,
}

/// Why a rule entry was rejected.
fn rule_problem(rule: &GeneticRule, seen: &HashSet<String>) -> Option<String> {
    if rule.id.trim().is_empty() {
        return Some("empty id".to_string());
    }
    if seen.contains(&rule.id) {
        return Some("duplicate id".to_string());
    }
    if rule.rsids.is_empty() {
        return Some("no rsids".to_string());
    }
    if rule.genotype_pattern.alternatives().is_empty() {
        return Some("empty genotype pattern".to_string());
    }
    if !(0.0..=1.0).contains(&rule.weight) {
        return Some(format!("weight {} outside [0, 1]", rule.weight));
    }
    None
}

impl RuleTable {
    /// Validate rules, skipping (and logging) any that are malformed.
    pub fn from_config(config: RulesConfig) -> Self {
        let mut table = Self::default();
        let mut seen = HashSet::new();

        for rule in config.rules {
            if let Some(problem) = rule_problem(&rule, &seen) {
                warn!("Skipping rule '{}': {}", rule.id, problem);
                continue;
            }

            let unmatchable = rule
                .genotype_pattern
                .alternatives()
                .iter()
                .all(|p| {
                    let letters = p.chars().filter(|c| "ACGTacgt".contains(*c)).count();
                    letters == 0 || letters > 2
                });
            if unmatchable {
                debug!(
                    "Rule '{}' has no single-locus genotype pattern and will never match",
                    rule.id
                );
            }

            seen.insert(rule.id.clone());
            table.by_id.insert(rule.id.clone(), table.rules.len());
            table.rules.push(rule);
        }

        table
    }

    pub fn new(rules: Vec<GeneticRule>) -> Self {
        Self::from_config(RulesConfig { rules })
    }

    pub fn get(&self, id: &str) -> Option<&GeneticRule> {
        self.by_id.get(id).map(|&i| &self.rules[i])
    }

    /// Rules for a gene symbol (case-insensitive).
    pub fn by_gene(&self, gene: &str) -> Vec<&GeneticRule> {
        self.rules
            .iter()
            .filter(|r| r.gene.eq_ignore_ascii_case(gene))
            .collect()
    }

    pub fn by_category(&self, category: Category) -> Vec<&GeneticRule> {
        self.rules.iter().filter(|r| r.category == category).collect()
    }

    pub fn iter(&self) -> impl Iterator<Item = &GeneticRule> {
        self.rules.iter()
    }

    pub fn rules(&self) -> &[GeneticRule] {
        &self.rules
    }

    pub fn len(&self) -> usize {
        self.rules.len()
    }

    pub fn is_empty(&self) -> bool {
        self.rules.is_empty()
    }
}
