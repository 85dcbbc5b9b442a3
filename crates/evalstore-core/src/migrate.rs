//! One-shot migration from the legacy single-baseline file to the run store.
//!
//! The pure transform ([`convert_legacy`]) is kept apart from the
//! file-presence gating and backup handled by [`Migrator`]. The gate is a
//! one-way latch: once `runs.json` exists, `baselines.json` is never read
//! for migration again, even if it changes later.

use std::collections::BTreeMap;
use std::fs;
use std::path::Path;

use serde::Serialize;

use crate::domain::agent_config::AgentConfig;
use crate::domain::error::Result;
use crate::domain::legacy::LegacyBaselineStore;
use crate::domain::run::{now_iso, CaseRun, Run, RunStore, STORE_SCHEMA_VERSION};
use crate::obs;
use crate::store::{generate_id, FsRunStore};

/// Label given to the single run produced by migration.
pub const MIGRATED_RUN_LABEL: &str = "baseline-migrated";

/// Read-only migration summary for diagnostics.
#[derive(Debug, Clone, Serialize, PartialEq, Eq)]
#[serde(rename_all = "camelCase")]
pub struct MigrationInfo {
    pub needed: bool,
    pub baseline_count: usize,
    pub oldest_baseline: Option<String>,
}

/// Convert a legacy baseline store into a run store holding exactly one run.
///
/// Returns `None` when there are no baselines. `run_id` and `now` are
/// supplied by the caller so the transform stays deterministic.
pub fn convert_legacy(
    legacy: &LegacyBaselineStore,
    project_root: &Path,
    run_id: String,
    now: &str,
) -> Option<RunStore> {
    if legacy.baselines.is_empty() {
        return None;
    }

    let cases: BTreeMap<String, CaseRun> = legacy
        .baselines
        .iter()
        .map(|(case_id, baseline)| {
            let case = CaseRun {
                answer: baseline.answer.clone(),
                grade: baseline.grade,
                graded_at: baseline.graded_at.clone(),
                graded_by: baseline.graded_by.clone(),
                notes: baseline.notes.clone(),
                behavior_metrics: baseline.behavior_metrics.clone().unwrap_or_default(),
            };
            (case_id.clone(), case)
        })
        .collect();

    let created_at = legacy.oldest_graded_at().unwrap_or(now).to_string();

    let run = Run {
        id: run_id.clone(),
        label: Some(MIGRATED_RUN_LABEL.to_string()),
        run_type: None,
        created_at,
        agent: AgentConfig::unknown(),
        cases,
        closed_issue_cases: None,
    };

    let mut runs = BTreeMap::new();
    runs.insert(run_id, run);

    Some(RunStore {
        version: STORE_SCHEMA_VERSION.to_string(),
        repo_path: legacy
            .repo_path
            .clone()
            .unwrap_or_else(|| project_root.to_string_lossy().into_owned()),
        created_at: legacy.created_at.clone().unwrap_or_else(|| now.to_string()),
        runs,
    })
}

/// Applies the legacy migration at most once per project.
#[derive(Debug, Clone, Default)]
pub struct Migrator {
    store: FsRunStore,
}

impl Migrator {
    pub fn new(store: FsRunStore) -> Self {
        Self { store }
    }

    /// True iff `baselines.json` exists and `runs.json` does not.
    pub fn needs_migration(&self, project_root: &Path) -> bool {
        self.store.layout().legacy_path(project_root).exists() && !self.store.exists(project_root)
    }

    /// Read the legacy file. Missing and unparseable files both yield `None`.
    fn read_legacy(&self, project_root: &Path) -> Option<LegacyBaselineStore> {
        let path = self.store.layout().legacy_path(project_root);
        let content = match fs::read_to_string(&path) {
            Ok(content) => content,
            Err(e) => {
                if e.kind() != std::io::ErrorKind::NotFound {
                    obs::emit_legacy_unreadable(&path, &e);
                }
                return None;
            }
        };
        match serde_json::from_str(&content) {
            Ok(legacy) => Some(legacy),
            Err(e) => {
                obs::emit_legacy_unreadable(&path, &e);
                None
            }
        }
    }

    /// Build the migrated store in memory without touching disk.
    pub fn migrate(&self, project_root: &Path) -> Option<RunStore> {
        let legacy = self.read_legacy(project_root)?;
        convert_legacy(&legacy, project_root, generate_id(), &now_iso())
    }

    /// Migrate if needed: back up the legacy file (first time only), then
    /// write the new store. Safe to call on every startup.
    pub fn perform_migration(&self, project_root: &Path) -> Result<bool> {
        if !self.needs_migration(project_root) {
            obs::emit_migration_skipped("not needed");
            return Ok(false);
        }

        let Some(store) = self.migrate(project_root) else {
            obs::emit_migration_skipped("no legacy baselines");
            return Ok(false);
        };

        let layout = self.store.layout();
        let backup_path = layout.backup_path(project_root);
        if !backup_path.exists() {
            fs::copy(layout.legacy_path(project_root), &backup_path)?;
            obs::emit_backup_created(&backup_path);
        }

        self.store.save(project_root, &store)?;

        let cases = store.runs.values().map(|run| run.cases.len()).sum();
        let run_id = store.runs.keys().next().map(String::as_str).unwrap_or_default();
        obs::emit_migration_performed(&self.store.store_path(project_root), run_id, cases);
        Ok(true)
    }

    /// Summarise what a migration would do. Never writes.
    pub fn migration_info(&self, project_root: &Path) -> MigrationInfo {
        let needed = self.needs_migration(project_root);
        let legacy = self.read_legacy(project_root).unwrap_or_default();
        MigrationInfo {
            needed,
            baseline_count: legacy.baselines.len(),
            oldest_baseline: legacy.oldest_graded_at().map(str::to_string),
        }
    }
}
