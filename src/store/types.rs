use serde::{Deserialize, Serialize};

use crate::config::Settings;
use crate::engine::{Recommendation, RecommendationStatus, UserProfile};
use crate::parser::{merge_markers, GeneticMarker};

/// Everything the app persists between runs.
#[derive(Debug, Clone, Default, Serialize, Deserialize, PartialEq)]
pub struct AppSnapshot {
    #[serde(default)]
    pub markers: Vec<GeneticMarker>,
    #[serde(default)]
    pub recommendations: Vec<Recommendation>,
    #[serde(default)]
    pub profile: UserProfile,
    #[serde(default)]
    pub settings: Settings,
}

impl AppSnapshot {
    /// Union incoming markers into the collection. Same rsid: incoming wins.
    pub fn merge_markers(&mut self, incoming: &[GeneticMarker]) {
        let existing = std::mem::take(&mut self.markers);
        self.markers = merge_markers(&existing, incoming);
    }

    /// Returns false if no marker had that rsid.
    pub fn remove_marker(&mut self, rsid: &str) -> bool {
        let before = self.markers.len();
        self.markers.retain(|m| m.rsid != rsid);
        self.markers.len() != before
    }

    /// Recommendations are recomputed wholesale, never merged.
    pub fn replace_recommendations(&mut self, recommendations: Vec<Recommendation>) {
        self.recommendations = recommendations;
    }

    pub fn recommendation(&self, id: &str) -> Option<&Recommendation> {
        self.recommendations.iter().find(|r| r.id == id)
    }

    /// Returns false if no recommendation had that id.
    pub fn set_status(&mut self, id: &str, status: RecommendationStatus) -> bool {
        match self.recommendations.iter_mut().find(|r| r.id == id) {
            Some(rec) => {
                rec.status = status;
                true
            }
            None => false,
        }
    }

    pub fn accept(&mut self, id: &str) -> bool {
        self.set_status(id, RecommendationStatus::Accepted)
    }

    pub fn decline(&mut self, id: &str) -> bool {
        self.set_status(id, RecommendationStatus::Declined)
    }

    pub fn save_to_plan(&mut self, id: &str) -> bool {
        self.set_status(id, RecommendationStatus::Saved)
    }

    pub fn with_status(&self, status: RecommendationStatus) -> Vec<&Recommendation> {
        self.recommendations
            .iter()
            .filter(|r| r.status == status)
            .collect()
    }

    /// Drop genetic data, recommendations and profile. Settings are kept.
    pub fn clear_data(&mut self) {
        self.markers.clear();
        self.recommendations.clear();
        self.profile = UserProfile::default();
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::engine::RecommendationEngine;
    use crate::rules::default_rules;

    fn snapshot_with_recommendation() -> (AppSnapshot, String) {
        let engine = RecommendationEngine::new(default_rules());
        let eval = engine.evaluate(
            &[GeneticMarker::new("rs9923231", "VKORC1", "AA")],
            None,
            &Default::default(),
        );
        let id = eval.recommendations[0].id.clone();
        let mut snapshot = AppSnapshot::default();
        snapshot.replace_recommendations(eval.recommendations);
        (snapshot, id)
    }

    #[test]
    fn test_merge_markers_union() {
        let mut snapshot = AppSnapshot::default();
        snapshot.merge_markers(&[
            GeneticMarker::new("rs1", "A", "AG"),
            GeneticMarker::new("rs2", "B", "CC"),
        ]);
        snapshot.merge_markers(&[
            GeneticMarker::new("rs2", "B", "CT"),
            GeneticMarker::new("rs3", "C", "TT"),
        ]);

        let rsids: Vec<&str> = snapshot.markers.iter().map(|m| m.rsid.as_str()).collect();
        assert_eq!(rsids, vec!["rs1", "rs2", "rs3"]);
        assert_eq!(snapshot.markers[1].genotype, "CT");
    }

    #[test]
    fn test_remove_marker() {
        let mut snapshot = AppSnapshot::default();
        snapshot.merge_markers(&[GeneticMarker::new("rs1", "A", "AG")]);
        assert!(snapshot.remove_marker("rs1"));
        assert!(!snapshot.remove_marker("rs1"));
        assert!(snapshot.markers.is_empty());
    }

    #[test]
    fn test_status_transitions() {
        let (mut snapshot, id) = snapshot_with_recommendation();
        assert_eq!(snapshot.with_status(RecommendationStatus::Pending).len(), 1);

        assert!(snapshot.accept(&id));
        assert_eq!(snapshot.recommendation(&id).unwrap().status, RecommendationStatus::Accepted);

        assert!(snapshot.decline(&id));
        assert_eq!(snapshot.recommendation(&id).unwrap().status, RecommendationStatus::Declined);

        assert!(snapshot.save_to_plan(&id));
        assert_eq!(snapshot.with_status(RecommendationStatus::Saved).len(), 1);

        assert!(!snapshot.accept("rec-missing"));
    }

    #[test]
    fn test_clear_data_keeps_settings() {
        let (mut snapshot, _) = snapshot_with_recommendation();
        snapshot.settings.mock_mode = true;
        snapshot.profile.age = Some(33);
        snapshot.merge_markers(&[GeneticMarker::new("rs1", "A", "AG")]);

        snapshot.clear_data();
        assert!(snapshot.markers.is_empty());
        assert!(snapshot.recommendations.is_empty());
        assert_eq!(snapshot.profile, UserProfile::default());
        assert!(snapshot.settings.mock_mode);
    }
}
