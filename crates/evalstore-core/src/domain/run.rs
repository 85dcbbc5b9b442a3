//! Runs, per-case results and the persisted run store aggregate.

use std::collections::BTreeMap;

use chrono::{SecondsFormat, Utc};
use serde::{Deserialize, Serialize};

use super::agent_config::AgentConfig;
use super::error::{Result, StoreError};

/// Schema version written by this crate.
pub const STORE_SCHEMA_VERSION: &str = "2.0";

/// Current UTC time as a fixed-width ISO-8601 string (`2024-01-01T00:00:00.000Z`).
///
/// Fixed width keeps lexicographic and chronological ordering identical.
pub fn now_iso() -> String {
    Utc::now().to_rfc3339_opts(SecondsFormat::Millis, true)
}

/// Behavioural counters recorded for one case execution.
///
/// Every field is a plain JSON number; counters recorded by older tools may
/// be fractional or negative and must still load. The all-zero value is the
/// canonical stand-in for data recorded before metrics existed.
#[derive(Debug, Clone, Default, Serialize, Deserialize, PartialEq)]
#[serde(rename_all = "camelCase")]
pub struct BehaviorMetrics {
    pub input_tokens: f64,
    pub output_tokens: f64,
    pub cache_read_tokens: f64,
    pub cache_creation_tokens: f64,
    pub total_tokens: f64,
    pub tool_call_count: f64,
    pub read_count: f64,
    pub edit_count: f64,
    pub write_count: f64,
    pub bash_count: f64,
    pub search_count: f64,
    pub subagent_count: f64,
    pub turn_count: f64,
    pub duration_ms: f64,
    pub cost_usd: f64,
    pub tool_error_rate: f64,
    pub read_to_edit_ratio: f64,
}

/// Result of one benchmark case inside a run.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
#[serde(rename_all = "camelCase")]
pub struct CaseRun {
    pub answer: String,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub grade: Option<u8>,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub graded_at: Option<String>,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub graded_by: Option<String>,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub notes: Option<String>,

    pub behavior_metrics: BehaviorMetrics,
}

impl CaseRun {
    /// Ungraded case result.
    pub fn new(answer: impl Into<String>, behavior_metrics: BehaviorMetrics) -> Self {
        Self {
            answer: answer.into(),
            grade: None,
            graded_at: None,
            graded_by: None,
            notes: None,
            behavior_metrics,
        }
    }

    /// Attach a 1-10 grade stamped with the current time.
    pub fn with_grade(mut self, grade: u8, graded_by: impl Into<String>) -> Result<Self> {
        if !(1..=10).contains(&grade) {
            return Err(StoreError::InvalidGrade(grade));
        }
        self.grade = Some(grade);
        self.graded_at = Some(now_iso());
        self.graded_by = Some(graded_by.into());
        Ok(self)
    }
}

/// Which kind of evaluation session a run records.
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq)]
#[serde(rename_all = "kebab-case")]
pub enum RunType {
    Interview,
    ClosedIssues,
}

/// One evaluation session against the benchmark suite.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
#[serde(rename_all = "camelCase")]
pub struct Run {
    /// `run-{millis}-{suffix}`, unique within a store.
    pub id: String,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub label: Option<String>,

    #[serde(rename = "type", default, skip_serializing_if = "Option::is_none")]
    pub run_type: Option<RunType>,

    pub created_at: String,

    /// Config snapshot owned by this run alone.
    pub agent: AgentConfig,

    /// Interview case results keyed by case id.
    #[serde(default)]
    pub cases: BTreeMap<String, CaseRun>,

    /// Closed-issue case results, kept opaque.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub closed_issue_cases: Option<BTreeMap<String, serde_json::Value>>,
}

impl Run {
    /// New empty run with a fresh id, stamped now.
    pub fn new(agent: AgentConfig) -> Self {
        Self {
            id: crate::store::generate_id(),
            label: None,
            run_type: None,
            created_at: now_iso(),
            agent,
            cases: BTreeMap::new(),
            closed_issue_cases: None,
        }
    }

    pub fn with_label(mut self, label: impl Into<String>) -> Self {
        self.label = Some(label.into());
        self
    }

    pub fn with_type(mut self, run_type: RunType) -> Self {
        self.run_type = Some(run_type);
        self
    }

    /// Replace the `"unknown"` model placeholder once the real model is known.
    ///
    /// Only the placeholder is ever overwritten; returns whether anything changed.
    pub fn resolve_model(&mut self, model: &str) -> bool {
        if model.is_empty() || !self.agent.model_is_unknown() {
            return false;
        }
        self.agent.model = model.to_string();
        crate::obs::emit_model_resolved(&self.id, model);
        true
    }

    /// Number of cases in whichever map is active for this run's type.
    pub fn case_count(&self) -> usize {
        match self.run_type {
            Some(RunType::ClosedIssues) => self
                .closed_issue_cases
                .as_ref()
                .map(|cases| cases.len())
                .unwrap_or(0),
            _ => self.cases.len(),
        }
    }
}

/// Root aggregate persisted as `runs.json`.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
#[serde(rename_all = "camelCase")]
pub struct RunStore {
    pub version: String,

    /// Project this store belongs to.
    pub repo_path: String,

    /// Set once when the store is created.
    pub created_at: String,

    pub runs: BTreeMap<String, Run>,
}

impl RunStore {
    /// Fresh, empty store for `repo_path`.
    pub fn new(repo_path: impl Into<String>) -> Self {
        Self {
            version: STORE_SCHEMA_VERSION.to_string(),
            repo_path: repo_path.into(),
            created_at: now_iso(),
            runs: BTreeMap::new(),
        }
    }
}
