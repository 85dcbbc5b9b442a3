//! Observability tests for store and migration tracing.
//!
//! These verify that the lifecycle paths emit their structured events.

use std::path::Path;

use evalstore_core::obs::{
    emit_migration_performed, emit_migration_skipped, emit_run_added, emit_run_deleted,
    emit_store_saved,
};
use evalstore_core::{AgentConfig, FsRunStore, Migrator, Run, RunSpan, RunStore, StoreLayout};
use tracing_test::traced_test;

#[traced_test]
#[test]
fn test_emit_functions_do_not_panic() {
    emit_store_saved(Path::new("/tmp/runs.json"), 3);
    emit_run_added("run-1-abc", 4);
    emit_run_deleted("run-1-abc");
    emit_migration_skipped("not needed");
    emit_migration_performed(Path::new("/tmp/runs.json"), "run-1-abc", 4);
    assert!(logs_contain("store.saved"));
    assert!(logs_contain("migration.performed"));
}

#[traced_test]
#[test]
fn test_run_span_enter_creates_span() {
    let span = RunSpan::enter("test-span-run");
    drop(span);
}

#[traced_test]
#[test]
fn test_save_emits_store_saved() {
    let dir = tempfile::tempdir().unwrap();
    FsRunStore::default()
        .save(dir.path(), &RunStore::new("/repo"))
        .unwrap();
    assert!(logs_contain("store.saved"));
}

#[traced_test]
#[test]
fn test_corrupt_legacy_file_is_logged_not_raised() {
    let dir = tempfile::tempdir().unwrap();
    let legacy = StoreLayout::default().legacy_path(dir.path());
    std::fs::create_dir_all(legacy.parent().unwrap()).unwrap();
    std::fs::write(&legacy, "not json").unwrap();

    assert!(!Migrator::default().perform_migration(dir.path()).unwrap());
    assert!(logs_contain("migration.legacy_unreadable"));
}

#[traced_test]
#[test]
fn test_model_resolution_emits_event_once() {
    let mut run = Run::new(AgentConfig::unknown());
    assert!(run.resolve_model("claude-sonnet-4"));
    assert!(logs_contain("run.model_resolved"));
    assert!(logs_contain("claude-sonnet-4"));

    assert!(!run.resolve_model("claude-opus-4"));
    assert!(!logs_contain("claude-opus-4"));
}
