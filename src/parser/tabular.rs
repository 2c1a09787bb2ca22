//! Tab/whitespace-delimited dialect with an optional header row.
//!
//! With a header, columns are resolved by name (`rsid`/`snp`,
//! `genotype`/`allele`, `gene`). Without one, each row is read positionally:
//! the first `rs…` token is the rsid, the first ACGT token the genotype, and
//! any remaining distinct token the gene.

use crate::error::FormatError;

use super::normalize::{is_valid_genotype, normalize_marker};
use super::types::{Dialect, DialectOutput, RawMarker};

/// Column positions resolved from a header row.
#[derive(Debug, Clone, Copy, PartialEq)]
struct HeaderColumns {
    rsid: Option<usize>,
    genotype: Option<usize>,
    gene: Option<usize>,
}

impl HeaderColumns {
    /// Returns `None` if the row does not look like a header.
    fn detect(cells: &[&str]) -> Option<Self> {
        let lowered: Vec<String> = cells.iter().map(|c| c.to_lowercase()).collect();
        let is_header = lowered
            .iter()
            .any(|c| c.contains("rsid") || c.contains("genotype"));
        if !is_header {
            return None;
        }

        let rsid = lowered
            .iter()
            .position(|c| c.contains("rsid") || c.contains("snp"));
        let genotype = lowered
            .iter()
            .position(|c| c.contains("genotype") || c.contains("allele"));
        // "genotype" contains "gene", so the genotype column is excluded here
        let gene = lowered
            .iter()
            .enumerate()
            .position(|(i, c)| Some(i) != rsid && Some(i) != genotype && c.contains("gene"));

        Some(Self {
            rsid,
            genotype,
            gene,
        })
    }

    fn read(&self, cells: &[&str]) -> Option<RawMarker> {
        let rsid = *cells.get(self.rsid?)?;
        let genotype = *cells.get(self.genotype?)?;
        let gene = self.gene.and_then(|i| cells.get(i)).copied().unwrap_or("");

        Some(RawMarker {
            rsid: Some(rsid.to_string()),
            genotype: Some(genotype.to_string()),
            gene: Some(gene.to_string()),
            ..Default::default()
        })
    }
}

fn split_cells(line: &str) -> Vec<&str> {
    if line.contains('\t') {
        line.split('\t').map(str::trim).collect()
    } else {
        line.split_whitespace().collect()
    }
}

fn read_positional(cells: &[&str]) -> Option<RawMarker> {
    if cells.len() < 2 {
        return None;
    }

    let rsid = *cells.iter().find(|c| c.to_lowercase().starts_with("rs"))?;
    let genotype = *cells.iter().find(|c| is_valid_genotype(c))?;
    let gene = cells
        .iter()
        .find(|c| **c != rsid && **c != genotype && !c.is_empty())
        .copied()
        .unwrap_or("");

    Some(RawMarker {
        rsid: Some(rsid.to_string()),
        genotype: Some(genotype.to_string()),
        gene: Some(gene.to_string()),
        ..Default::default()
    })
}

pub fn parse(content: &str) -> Result<DialectOutput, FormatError> {
    let mut output = DialectOutput::default();
    let mut header: Option<HeaderColumns> = None;

    for (line_no, line) in content.lines().enumerate() {
        let line = line.trim();
        if line.is_empty() {
            continue;
        }

        let cells = split_cells(line);

        if line_no == 0 {
            if let Some(columns) = HeaderColumns::detect(&cells) {
                header = Some(columns);
                continue;
            }
        }

        let raw = match &header {
            Some(columns) => columns.read(&cells),
            None => read_positional(&cells),
        };

        if let Some(marker) = raw.and_then(normalize_marker) {
            output.markers.push(marker);
        }
    }

    if output.markers.is_empty() {
        return Err(FormatError::NoMarkers {
            dialect: Dialect::TabDelimited,
        });
    }
    Ok(output)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_header_without_gene_column() {
        let output = parse("rsid\tgenotype\nrs1065852\tCT").unwrap();
        assert_eq!(output.markers.len(), 1);
        let marker = &output.markers[0];
        assert_eq!(marker.rsid, "rs1065852");
        assert_eq!(marker.gene, "");
        assert_eq!(marker.genotype, "CT");
    }

    #[test]
    fn test_header_with_gene_column_any_order() {
        let content = "Gene\tGenotype\tSNP\ncyp2c19\tga\tRS4244285\n";
        let output = parse(content).unwrap();
        let marker = &output.markers[0];
        assert_eq!(marker.rsid, "rs4244285");
        assert_eq!(marker.gene, "CYP2C19");
        assert_eq!(marker.genotype, "GA");
    }

    #[test]
    fn test_header_rows_missing_cells_are_skipped() {
        let content = "rsid\tgene\tgenotype\nrs1\tABC\nrs2\tDEF\tTT\n";
        let output = parse(content).unwrap();
        assert_eq!(output.markers.len(), 1);
        assert_eq!(output.markers[0].rsid, "rs2");
    }

    #[test]
    fn test_header_detection_resolves_columns() {
        let columns = HeaderColumns::detect(&["rsid", "genotype"]).unwrap();
        assert_eq!(columns.rsid, Some(0));
        assert_eq!(columns.genotype, Some(1));
        assert_eq!(columns.gene, None);
        assert!(HeaderColumns::detect(&["rs1", "AG"]).is_none());
    }

    #[test]
    fn test_positional_rows() {
        let content = "rs1065852\tCT\tCYP2D6\nCYP2C19 rs4244285 GA\n";
        let output = parse(content).unwrap();
        assert_eq!(output.markers.len(), 2);
        assert_eq!(output.markers[0].gene, "CYP2D6");
        assert_eq!(output.markers[1].gene, "CYP2C19");
        assert_eq!(output.markers[1].genotype, "GA");
    }

    #[test]
    fn test_positional_invalid_rows_skipped_silently() {
        let content = "rs1\tAG\nrsX\tAG\nrs3\n";
        let output = parse(content).unwrap();
        assert_eq!(output.markers.len(), 1);
        assert!(output.warnings.is_empty());
    }

    #[test]
    fn test_prose_yields_nothing() {
        let err = parse("the quick brown fox\njumps over the lazy dog").unwrap_err();
        assert_eq!(
            err,
            FormatError::NoMarkers {
                dialect: Dialect::TabDelimited
            }
        );
    }
}
