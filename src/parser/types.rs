//! Type definitions for genotype input parsing.

use std::fmt;

use serde::{Deserialize, Serialize};

/// A single normalized SNP observation.
///
/// Produced only through `normalize::normalize_marker`, so a value of this
/// type always carries a lowercase `rs<digits>` rsid and an uppercase
/// genotype of one or two letters from {A,C,G,T}.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct GeneticMarker {
    pub rsid: String,
    /// Uppercase gene symbol; empty when the source did not name one
    #[serde(default)]
    pub gene: String,
    pub genotype: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub chromosome: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub position: Option<i64>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub note: Option<String>,
}

impl GeneticMarker {
    /// Build a marker from already-normalized parts.
    pub fn new(rsid: &str, gene: &str, genotype: &str) -> Self {
        Self {
            rsid: rsid.to_string(),
            gene: gene.to_string(),
            genotype: genotype.to_string(),
            chromosome: None,
            position: None,
            note: None,
        }
    }
}

/// Un-validated marker fields as pulled out of one input record.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct RawMarker {
    pub rsid: Option<String>,
    pub gene: Option<String>,
    pub genotype: Option<String>,
    pub chromosome: Option<String>,
    pub position: Option<i64>,
    pub note: Option<String>,
}

/// Input dialects, in the order they are attempted.
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq)]
#[serde(rename_all = "snake_case")]
pub enum Dialect {
    Json,
    VcfLite,
    TabDelimited,
}

impl Dialect {
    /// Fixed detection order.
    pub const ORDER: [Dialect; 3] = [Dialect::Json, Dialect::VcfLite, Dialect::TabDelimited];
}

impl fmt::Display for Dialect {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let name = match self {
            Dialect::Json => "JSON",
            Dialect::VcfLite => "VCF-lite",
            Dialect::TabDelimited => "tab-delimited",
        };
        f.write_str(name)
    }
}

/// Markers and warnings recovered by one dialect that found at least one marker.
#[derive(Debug, Clone, Default)]
pub struct DialectOutput {
    pub markers: Vec<GeneticMarker>,
    pub warnings: Vec<String>,
}

/// Outcome of `parse_genetic_data`.
///
/// `success` is true exactly when `markers` is non-empty. Per-record problems
/// land in `warnings`; `errors` is only populated on total failure.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct ParseResult {
    pub success: bool,
    pub markers: Vec<GeneticMarker>,
    pub errors: Vec<String>,
    pub warnings: Vec<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub dialect: Option<Dialect>,
}

impl ParseResult {
    pub(crate) fn from_dialect(dialect: Dialect, output: DialectOutput) -> Self {
        Self {
            success: !output.markers.is_empty(),
            markers: output.markers,
            errors: Vec::new(),
            warnings: output.warnings,
            dialect: Some(dialect),
        }
    }

    pub(crate) fn failure(message: impl Into<String>) -> Self {
        Self {
            success: false,
            markers: Vec::new(),
            errors: vec![message.into()],
            warnings: Vec::new(),
            dialect: None,
        }
    }
}

/// A marker that failed re-validation, with the reason.
#[derive(Debug, Clone, Serialize, PartialEq)]
pub struct InvalidMarker {
    pub marker: GeneticMarker,
    pub reason: String,
}

/// Result of `validate_markers`.
#[derive(Debug, Clone, Default, Serialize, PartialEq)]
pub struct MarkerValidation {
    pub valid: Vec<GeneticMarker>,
    pub invalid: Vec<InvalidMarker>,
}
