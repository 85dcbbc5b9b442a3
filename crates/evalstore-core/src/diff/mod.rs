//! Run comparison.
//!
//! - Structural agent-config diffing (`config` submodule)

pub mod config;

pub use config::{
    diff_agent_configs, diff_runs, render_config_diff, ConfigChange, ConfigDiffSummary,
};
