//! Genotype file parsing.
//!
//! Raw uploaded text is turned into normalized [`GeneticMarker`]s. Three
//! dialects are attempted in a fixed order and the first one that yields at
//! least one valid marker wins:
//!
//! 1. **JSON**: an array of marker objects, or an object keyed by rsid
//! 2. **VCF-lite**: `CHROM POS ID REF ALT` lines, `#` comments ignored
//! 3. **Tab-delimited**: optional header row, positional fallback
//!
//! Bad records never fail a parse. They are dropped (with a warning where the
//! dialect can name them) so good rows still come through.
//!
//! # Example
//!
//! ```ignore
//! use sera::parser::parse_genetic_data;
//!
//! let result = parse_genetic_data("rsid\tgenotype\nrs1065852\tCT", None);
//! assert!(result.success);
//! assert_eq!(result.markers[0].rsid, "rs1065852");
//! ```

mod json;
mod normalize;
mod samples;
mod tabular;
mod types;
mod vcf;

use tracing::{debug, info, warn};

use crate::error::FormatError;

pub use normalize::{is_valid_genotype, is_valid_rsid, merge_markers, normalize_marker, validate_markers};
pub use samples::{sample_markers, SamplePreset};
pub use types::*;

pub const UNSUPPORTED_FORMAT_MESSAGE: &str =
    "Unable to detect file format. Supported formats: JSON, VCF-lite, tab-delimited.";

/// Parse genotype data, detecting its dialect.
///
/// `filename` is only a hint for logging; detection always runs on content.
pub fn parse_genetic_data(content: &str, filename: Option<&str>) -> ParseResult {
    let content = content.trim_start_matches('\u{feff}');
    debug!(
        "Parsing {} bytes of genotype data (filename hint: {:?})",
        content.len(),
        filename
    );

    for dialect in Dialect::ORDER {
        match parse_dialect(dialect, content) {
            Ok(output) => {
                info!(
                    "Parsed {} markers as {} ({} warnings)",
                    output.markers.len(),
                    dialect,
                    output.warnings.len()
                );
                return ParseResult::from_dialect(dialect, output);
            }
            Err(e) => debug!("{} dialect rejected input: {}", dialect, e),
        }
    }

    warn!("No supported genotype format detected");
    ParseResult::failure(UNSUPPORTED_FORMAT_MESSAGE)
}

/// Run a single dialect without fallback.
pub fn parse_dialect(dialect: Dialect, content: &str) -> Result<DialectOutput, FormatError> {
    match dialect {
        Dialect::Json => json::parse(content),
        Dialect::VcfLite => vcf::parse(content),
        Dialect::TabDelimited => tabular::parse(content),
    }
}
