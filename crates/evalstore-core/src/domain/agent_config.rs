//! Ambient agent configuration captured alongside each run.

use std::collections::BTreeMap;
use std::fmt;

use serde::{Deserialize, Serialize};

/// Placeholder used for agent name and model until the real value is known.
pub const UNKNOWN: &str = "unknown";

fn unknown_model() -> String {
    UNKNOWN.to_string()
}

/// Transport an MCP server is reached through.
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq, Hash)]
#[serde(rename_all = "lowercase")]
pub enum McpServerType {
    Stdio,
    Sse,
    Http,
}

impl McpServerType {
    pub fn as_str(&self) -> &'static str {
        match self {
            McpServerType::Stdio => "stdio",
            McpServerType::Sse => "sse",
            McpServerType::Http => "http",
        }
    }

    /// Parse a transport name as it appears in agent config files.
    pub fn parse(s: &str) -> Option<Self> {
        match s {
            "stdio" => Some(McpServerType::Stdio),
            "sse" => Some(McpServerType::Sse),
            "http" => Some(McpServerType::Http),
            _ => None,
        }
    }
}

impl fmt::Display for McpServerType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// One MCP server as seen at capture time.
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq)]
pub struct McpServerConfig {
    #[serde(rename = "type")]
    pub server_type: McpServerType,
    pub enabled: bool,
}

/// Snapshot of the agent's configuration at the moment a run started.
///
/// Every run owns its own copy; snapshots are never shared between runs.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
#[serde(rename_all = "camelCase")]
pub struct AgentConfig {
    pub name: String,

    /// Agent build version. Written as `null` when unknown.
    #[serde(default)]
    pub version: Option<String>,

    /// Resolved generation model, `"unknown"` until the first case completes.
    #[serde(default = "unknown_model")]
    pub model: String,

    /// SHA-256 hex of the project instruction file, if one was found.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub claude_md_hash: Option<String>,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub mcp_servers: Option<BTreeMap<String, McpServerConfig>>,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub allowed_tools: Option<Vec<String>>,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub disallowed_tools: Option<Vec<String>>,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub permission_mode: Option<String>,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub thinking_enabled: Option<bool>,

    /// Weak reference into an external variant registry. Never dereferenced.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub variant_id: Option<String>,
}

impl AgentConfig {
    /// Minimal snapshot with only a name and version; model stays `"unknown"`.
    pub fn new(name: impl Into<String>, version: Option<String>) -> Self {
        Self {
            name: name.into(),
            version,
            model: unknown_model(),
            claude_md_hash: None,
            mcp_servers: None,
            allowed_tools: None,
            disallowed_tools: None,
            permission_mode: None,
            thinking_enabled: None,
            variant_id: None,
        }
    }

    /// Snapshot for data that predates config capture.
    pub fn unknown() -> Self {
        Self::new(UNKNOWN, None)
    }

    /// Whether the model placeholder is still in place.
    pub fn model_is_unknown(&self) -> bool {
        self.model == UNKNOWN
    }
}
