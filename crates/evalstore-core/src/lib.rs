//! evalstore Core Library
//!
//! Persists evaluation runs per project, captures the agent's ambient
//! configuration for each run, migrates the legacy single-baseline format,
//! and diffs captured configurations.

pub mod ambient;
pub mod diff;
pub mod domain;
pub mod migrate;
pub mod obs;
pub mod store;
pub mod telemetry;

pub use ambient::{
    capture_agent_config, AmbientConfigSource, FsAmbientSource, MemoryAmbientSource,
};

pub use diff::{
    diff_agent_configs, diff_runs, render_config_diff, ConfigChange, ConfigDiffSummary,
};

pub use domain::{
    now_iso, AgentConfig, BehaviorMetrics, CaseRun, LegacyBaseline, LegacyBaselineStore,
    McpServerConfig, McpServerType, Result, Run, RunStore, RunType, StoreError,
    STORE_SCHEMA_VERSION,
};

pub use migrate::{convert_legacy, MigrationInfo, Migrator, MIGRATED_RUN_LABEL};

pub use store::{generate_id, resolve_store_path, FsRunStore, StoreLayout};

pub use obs::RunSpan;
pub use telemetry::init_tracing;

/// evalstore version
pub const VERSION: &str = env!("CARGO_PKG_VERSION");
