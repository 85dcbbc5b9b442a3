//! Pre-2.0 single-baseline schema (`baselines.json`). Read-only.

use std::collections::BTreeMap;

use serde::Deserialize;

use super::run::BehaviorMetrics;

/// One graded answer per case, with no run grouping or agent snapshot.
#[derive(Debug, Clone, Deserialize, PartialEq)]
#[serde(rename_all = "camelCase")]
pub struct LegacyBaseline {
    #[serde(default)]
    pub case_id: Option<String>,
    pub answer: String,
    #[serde(default)]
    pub grade: Option<u8>,
    #[serde(default)]
    pub graded_at: Option<String>,
    #[serde(default)]
    pub graded_by: Option<String>,
    #[serde(default)]
    pub notes: Option<String>,
    #[serde(default)]
    pub behavior_metrics: Option<BehaviorMetrics>,
}

#[derive(Debug, Clone, Default, Deserialize, PartialEq)]
#[serde(rename_all = "camelCase")]
pub struct LegacyBaselineStore {
    #[serde(default)]
    pub version: Option<String>,
    #[serde(default)]
    pub repo_path: Option<String>,
    #[serde(default)]
    pub created_at: Option<String>,
    #[serde(default)]
    pub baselines: BTreeMap<String, LegacyBaseline>,
}

impl LegacyBaselineStore {
    /// Earliest `gradedAt` across all baselines, by string order.
    pub fn oldest_graded_at(&self) -> Option<&str> {
        self.baselines
            .values()
            .filter_map(|b| b.graded_at.as_deref())
            .min()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_parses_minimal_legacy_store() {
        let json = r#"{
            "baselines": {
                "q1": {"answer": "yes"},
                "q2": {"answer": "no", "grade": 4, "gradedAt": "2024-02-01T10:00:00.000Z"}
            }
        }"#;
        let store: LegacyBaselineStore = serde_json::from_str(json).expect("parse");
        assert!(store.repo_path.is_none());
        assert_eq!(store.baselines.len(), 2);
        assert_eq!(store.baselines["q2"].grade, Some(4));
        assert!(store.baselines["q1"].behavior_metrics.is_none());
    }

    #[test]
    fn test_oldest_graded_at_skips_ungraded() {
        let json = r#"{"baselines": {
            "a": {"answer": "", "gradedAt": "2024-01-05T00:00:00.000Z"},
            "b": {"answer": ""},
            "c": {"answer": "", "gradedAt": "2024-01-01T00:00:00.000Z"}
        }}"#;
        let store: LegacyBaselineStore = serde_json::from_str(json).expect("parse");
        assert_eq!(store.oldest_graded_at(), Some("2024-01-01T00:00:00.000Z"));

        let empty = LegacyBaselineStore::default();
        assert_eq!(empty.oldest_graded_at(), None);
    }
}
