//! Domain models for evalstore.
//!
//! Canonical definitions for the persisted entities:
//! - `AgentConfig`: ambient agent configuration captured per run
//! - `Run` / `CaseRun`: one evaluation session and its per-case results
//! - `RunStore`: the versioned root aggregate written to `runs.json`
//! - `LegacyBaselineStore`: the pre-2.0 schema, read only for migration

pub mod agent_config;
pub mod error;
pub mod legacy;
pub mod run;

pub use agent_config::{AgentConfig, McpServerConfig, McpServerType, UNKNOWN};
pub use error::{Result, StoreError};
pub use legacy::{LegacyBaseline, LegacyBaselineStore};
pub use run::{
    now_iso, BehaviorMetrics, CaseRun, Run, RunStore, RunType, STORE_SCHEMA_VERSION,
};
