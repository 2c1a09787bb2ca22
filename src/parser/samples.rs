//! Built-in demo marker sets.

use serde::{Deserialize, Serialize};

use super::types::GeneticMarker;

#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq)]
#[serde(rename_all = "snake_case")]
pub enum SamplePreset {
    Healthy,
    DiabetesRisk,
    BrcaLike,
}

impl SamplePreset {
    /// Parse a preset name, accepting `-` or `_` separators.
    pub fn from_name(name: &str) -> Option<Self> {
        match name.trim().to_lowercase().replace('-', "_").as_str() {
            "healthy" => Some(Self::Healthy),
            "diabetes_risk" => Some(Self::DiabetesRisk),
            "brca_like" => Some(Self::BrcaLike),
            _ => None,
        }
    }
}

pub fn sample_markers(preset: SamplePreset) -> Vec<GeneticMarker> {
    let mut markers = vec![
        GeneticMarker::new("rs1065852", "CYP2D6", "CT"),
        GeneticMarker::new("rs1799853", "CYP2C9", "CC"),
        GeneticMarker::new("rs4244285", "CYP2C19", "GG"),
        GeneticMarker::new("rs776746", "CYP3A5", "AG"),
    ];

    match preset {
        SamplePreset::Healthy => {}
        SamplePreset::DiabetesRisk => markers.extend([
            GeneticMarker::new("rs7903146", "TCF7L2", "CT"),
            GeneticMarker::new("rs9939609", "FTO", "AA"),
            GeneticMarker::new("rs1801282", "PPARG", "GG"),
        ]),
        SamplePreset::BrcaLike => markers.extend([
            GeneticMarker::new("rs1799966", "BRCA1", "AG"),
            GeneticMarker::new("rs144848", "BRCA2", "CT"),
            GeneticMarker::new("rs17879961", "CHEK2", "CT"),
        ]),
    }

    markers
}
