//! VCF-lite dialect: whitespace-separated `CHROM POS ID REF ALT ...` lines.
//!
//! The genotype is synthesized as `REF` followed by `ALT` and then validated by
//! the shared normalizer, so multi-base or symbolic alleles are skipped.

use tracing::debug;

use crate::error::FormatError;

use super::normalize::normalize_marker;
use super::types::{Dialect, DialectOutput, RawMarker};

pub fn parse(content: &str) -> Result<DialectOutput, FormatError> {
    let mut output = DialectOutput::default();
    let mut header_found = false;

    for (line_no, line) in content.lines().enumerate() {
        let line = line.trim();

        if line.is_empty() || line.starts_with('#') {
            if line.starts_with("#CHROM") {
                header_found = true;
            }
            continue;
        }

        let fields: Vec<&str> = line.split_whitespace().collect();
        if fields.len() < 5 {
            continue;
        }

        let (chrom, pos, id, reference, alt) = (fields[0], fields[1], fields[2], fields[3], fields[4]);
        if !id.to_lowercase().starts_with("rs") {
            continue;
        }

        let raw = RawMarker {
            rsid: Some(id.to_string()),
            genotype: Some(format!("{}{}", reference, alt)),
            chromosome: Some(chrom.to_string()),
            position: pos.parse().ok(),
            ..Default::default()
        };

        match normalize_marker(raw) {
            Some(marker) => output.markers.push(marker),
            None => {
                debug!("Rejected VCF record {} at line {}", id, line_no + 1);
                output.warnings.push(format!(
                    "Skipped invalid VCF record '{}' at line {}",
                    id,
                    line_no + 1
                ));
            }
        }
    }

    if output.markers.is_empty() {
        return Err(if header_found {
            FormatError::VcfHeaderWithoutData
        } else {
            FormatError::NoMarkers {
                dialect: Dialect::VcfLite,
            }
        });
    }
    Ok(output)
}
