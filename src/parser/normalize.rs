//! Marker normalization shared by every input dialect.
//!
//! A record becomes a `GeneticMarker` only if its rsid fully matches
//! `^rs[0-9]+$` and its genotype fully matches `^[ACGT]{1,2}$` (both
//! ASCII-only, case-insensitive). Anything else is rejected and the caller decides
//! whether to warn.

use std::collections::HashMap;
use std::sync::LazyLock;

use regex::Regex;
use serde_json::{Map, Value};

use super::types::{GeneticMarker, InvalidMarker, MarkerValidation, RawMarker};

static RE_RSID: LazyLock<Option<Regex>> = LazyLock::new(|| Regex::new(r"(?i-u)^rs[0-9]+$").ok());
static RE_GENOTYPE: LazyLock<Option<Regex>> =
    LazyLock::new(|| Regex::new(r"(?i-u)^[ACGT]{1,2}$").ok());

const RSID_ALIASES: [&str; 4] = ["rsid", "snp", "id", "rsID"];
const GENOTYPE_ALIASES: [&str; 4] = ["genotype", "allele", "gt", "call"];
const GENE_ALIASES: [&str; 2] = ["gene", "geneSymbol"];
const CHROMOSOME_ALIASES: [&str; 2] = ["chromosome", "chrom"];
const POSITION_ALIASES: [&str; 2] = ["position", "pos"];
const NOTE_ALIASES: [&str; 2] = ["note", "comment"];

/// True if `rsid` is a well-formed dbSNP identifier (any case).
pub fn is_valid_rsid(rsid: &str) -> bool {
    RE_RSID.as_ref().is_some_and(|re| re.is_match(rsid))
}

/// True if `genotype` is one or two letters from {A,C,G,T} (any case).
pub fn is_valid_genotype(genotype: &str) -> bool {
    RE_GENOTYPE.as_ref().is_some_and(|re| re.is_match(genotype))
}

/// Validate and canonicalize a raw record.
///
/// Returns `None` when the rsid or genotype is missing or malformed.
pub fn normalize_marker(raw: RawMarker) -> Option<GeneticMarker> {
    let rsid = raw.rsid.as_deref().map(str::trim).filter(|s| !s.is_empty())?;
    let genotype = raw.genotype.as_deref().map(str::trim).filter(|s| !s.is_empty())?;

    if !is_valid_rsid(rsid) || !is_valid_genotype(genotype) {
        return None;
    }

    Some(GeneticMarker {
        rsid: rsid.to_lowercase(),
        gene: raw.gene.as_deref().map(str::trim).unwrap_or("").to_uppercase(),
        genotype: genotype.to_uppercase(),
        chromosome: raw.chromosome.filter(|c| !c.is_empty()),
        position: raw.position,
        note: raw.note.filter(|n| !n.is_empty()),
    })
}

/// Pull aliased marker fields out of a JSON object.
///
/// Each field takes the first alias holding a non-empty string. Positions may
/// be JSON numbers or numeric strings.
pub fn raw_from_json_object(obj: &Map<String, Value>) -> RawMarker {
    RawMarker {
        rsid: first_string(obj, &RSID_ALIASES),
        gene: first_string(obj, &GENE_ALIASES),
        genotype: first_string(obj, &GENOTYPE_ALIASES),
        chromosome: first_string(obj, &CHROMOSOME_ALIASES).or_else(|| {
            // Chromosomes are sometimes given as bare numbers
            CHROMOSOME_ALIASES
                .iter()
                .find_map(|key| obj.get(*key).and_then(Value::as_u64))
                .map(|n| n.to_string())
        }),
        position: POSITION_ALIASES
            .iter()
            .find_map(|key| obj.get(*key).and_then(json_integer)),
        note: first_string(obj, &NOTE_ALIASES),
    }
}

fn first_string(obj: &Map<String, Value>, aliases: &[&str]) -> Option<String> {
    aliases.iter().find_map(|key| {
        obj.get(*key)
            .and_then(Value::as_str)
            .filter(|s| !s.is_empty())
            .map(str::to_string)
    })
}

fn json_integer(value: &Value) -> Option<i64> {
    match value {
        Value::Number(n) => n.as_i64().or_else(|| n.as_f64().map(|f| f as i64)),
        Value::String(s) => s.trim().parse().ok(),
        _ => None,
    }
}

/// Re-check a marker collection, e.g. after it was edited or loaded from storage.
pub fn validate_markers(markers: &[GeneticMarker]) -> MarkerValidation {
    let mut result = MarkerValidation::default();

    for marker in markers {
        let reason = if !is_valid_rsid(&marker.rsid) {
            Some("Invalid rsid format")
        } else if !is_valid_genotype(&marker.genotype) {
            Some("Invalid genotype format")
        } else {
            None
        };

        match reason {
            Some(reason) => result.invalid.push(InvalidMarker {
                marker: marker.clone(),
                reason: reason.to_string(),
            }),
            None => result.valid.push(marker.clone()),
        }
    }

    result
}

/// Union two marker collections by rsid.
///
/// A later marker replaces an earlier one with the same rsid but keeps the
/// position where that rsid was first seen.
pub fn merge_markers(existing: &[GeneticMarker], incoming: &[GeneticMarker]) -> Vec<GeneticMarker> {
    let mut merged: Vec<GeneticMarker> = Vec::with_capacity(existing.len() + incoming.len());
    let mut index: HashMap<String, usize> = HashMap::new();

    for marker in existing.iter().chain(incoming) {
        match index.get(&marker.rsid) {
            Some(&pos) => merged[pos] = marker.clone(),
            None => {
                index.insert(marker.rsid.clone(), merged.len());
                merged.push(marker.clone());
            }
        }
    }

    merged
}
