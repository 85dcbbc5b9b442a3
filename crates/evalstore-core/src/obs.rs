//! Structured observability hooks for store and migration lifecycle events.
//!
//! This module provides:
//! - Run-scoped tracing spans via `RunSpan` RAII guard
//! - Emission functions for store load/save, migration and run mutations
//!
//! Events carry an `event` field (`store.saved`, `migration.performed`, ...)
//! so they can be filtered regardless of output format.

use std::path::Path;

use tracing::{debug, info, warn};

/// RAII guard that enters a run-scoped tracing span.
///
/// # Example
///
/// ```ignore
/// let _span = RunSpan::enter("run-1717000000000-k3j9x0a2");
/// // tracing calls are now associated with run_id = "run-1717000000000-k3j9x0a2"
/// ```
pub struct RunSpan {
    _span: tracing::span::EnteredSpan,
}

impl RunSpan {
    pub fn enter(run_id: &str) -> Self {
        let span = tracing::info_span!("evalstore.run", run_id = %run_id);
        Self {
            _span: span.entered(),
        }
    }
}

/// No store file yet; a fresh in-memory store was created.
pub fn emit_store_initialized(path: &Path) {
    debug!(event = "store.initialized", path = %path.display());
}

pub fn emit_store_loaded(path: &Path, runs: usize) {
    debug!(event = "store.loaded", path = %path.display(), runs = runs);
}

pub fn emit_store_saved(path: &Path, runs: usize) {
    info!(event = "store.saved", path = %path.display(), runs = runs);
}

/// The current-format store failed to parse (error level: this aborts the caller).
pub fn emit_store_corrupt(path: &Path, error: &dyn std::fmt::Display) {
    tracing::error!(event = "store.corrupt", path = %path.display(), error = %error);
}

pub fn emit_run_added(run_id: &str, cases: usize) {
    info!(event = "run.added", run_id = %run_id, cases = cases);
}

pub fn emit_run_deleted(run_id: &str) {
    info!(event = "run.deleted", run_id = %run_id);
}

pub fn emit_model_resolved(run_id: &str, model: &str) {
    info!(event = "run.model_resolved", run_id = %run_id, model = %model);
}

/// Legacy baselines could not be parsed and are treated as absent.
pub fn emit_legacy_unreadable(path: &Path, error: &dyn std::fmt::Display) {
    warn!(event = "migration.legacy_unreadable", path = %path.display(), error = %error);
}

pub fn emit_migration_skipped(reason: &str) {
    debug!(event = "migration.skipped", reason = %reason);
}

pub fn emit_backup_created(path: &Path) {
    info!(event = "migration.backup_created", path = %path.display());
}

pub fn emit_migration_performed(path: &Path, run_id: &str, cases: usize) {
    info!(
        event = "migration.performed",
        path = %path.display(),
        run_id = %run_id,
        cases = cases,
    );
}

/// An ambient config file was missing or malformed and was skipped.
pub fn emit_ambient_unavailable(path: &Path, reason: &str) {
    debug!(event = "ambient.unavailable", path = %path.display(), reason = %reason);
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_run_span_create() {
        let _span = RunSpan::enter("test-run-id");
    }
}
