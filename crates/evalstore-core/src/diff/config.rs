use std::collections::{BTreeMap, BTreeSet};

use serde::{Deserialize, Serialize};

use crate::domain::agent_config::{AgentConfig, McpServerConfig};
use crate::domain::run::Run;

const NONE: &str = "none";
const REMOVED: &str = "removed";
const DEFAULT: &str = "default";
const SHORT_HASH_LEN: usize = 8;

/// One changed field, rendered for display. Not a patch.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
pub struct ConfigChange {
    pub field: String,
    pub old: String,
    pub new: String,
}

/// Config comparison between two stored runs.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
#[serde(rename_all = "camelCase")]
pub struct ConfigDiffSummary {
    pub run_a: String,
    pub run_b: String,
    pub changes: Vec<ConfigChange>,
    pub identical: bool,
}

// ---------------------------------------------------------------------------
// Display helpers
// ---------------------------------------------------------------------------

fn or_none(value: Option<&str>) -> String {
    value.unwrap_or(NONE).to_string()
}

fn short_hash(hash: Option<&str>) -> String {
    match hash {
        Some(h) => h.chars().take(SHORT_HASH_LEN).collect(),
        None => NONE.to_string(),
    }
}

fn describe_server(server: &McpServerConfig) -> String {
    if server.enabled {
        server.server_type.to_string()
    } else {
        format!("{} (disabled)", server.server_type)
    }
}

fn sorted_tools(tools: Option<&Vec<String>>) -> Vec<&str> {
    let mut sorted: Vec<&str> = tools
        .map(|t| t.iter().map(String::as_str).collect())
        .unwrap_or_default();
    sorted.sort_unstable();
    sorted
}

fn tool_count(tools: Option<&Vec<String>>) -> String {
    format!("{} tools", tools.map(Vec::len).unwrap_or(0))
}

fn thinking(value: Option<bool>) -> &'static str {
    match value {
        None => DEFAULT,
        Some(true) => "enabled",
        Some(false) => "disabled",
    }
}

fn push_change(changes: &mut Vec<ConfigChange>, field: &str, old: String, new: String) {
    changes.push(ConfigChange {
        field: field.to_string(),
        old,
        new,
    });
}

fn push_if_changed(changes: &mut Vec<ConfigChange>, field: &str, old: String, new: String) {
    if old != new {
        push_change(changes, field, old, new);
    }
}

// ---------------------------------------------------------------------------
// Public API
// ---------------------------------------------------------------------------

/// Diff two agent configs field by field.
///
/// Entries come out in a fixed order: name, version, model, claudeMdHash,
/// one per MCP server (sorted by name), allowedTools, disallowedTools,
/// permissionMode, thinkingEnabled, variantId. Tool lists compare as sets
/// and report counts.
pub fn diff_agent_configs(a: &AgentConfig, b: &AgentConfig) -> Vec<ConfigChange> {
    let mut changes = Vec::new();

    push_if_changed(&mut changes, "name", a.name.clone(), b.name.clone());
    push_if_changed(
        &mut changes,
        "version",
        or_none(a.version.as_deref()),
        or_none(b.version.as_deref()),
    );
    push_if_changed(&mut changes, "model", a.model.clone(), b.model.clone());

    if a.claude_md_hash != b.claude_md_hash {
        push_change(
            &mut changes,
            "claudeMdHash",
            short_hash(a.claude_md_hash.as_deref()),
            short_hash(b.claude_md_hash.as_deref()),
        );
    }

    let empty = BTreeMap::new();
    let servers_a = a.mcp_servers.as_ref().unwrap_or(&empty);
    let servers_b = b.mcp_servers.as_ref().unwrap_or(&empty);
    let names: BTreeSet<&String> = servers_a.keys().chain(servers_b.keys()).collect();
    for name in names {
        let field = format!("mcpServers.{}", name);
        match (servers_a.get(name), servers_b.get(name)) {
            (None, Some(added)) => {
                push_change(&mut changes, &field, NONE.to_string(), describe_server(added))
            }
            (Some(removed), None) => push_change(
                &mut changes,
                &field,
                describe_server(removed),
                REMOVED.to_string(),
            ),
            (Some(before), Some(after)) if before != after => push_change(
                &mut changes,
                &field,
                describe_server(before),
                describe_server(after),
            ),
            _ => {}
        }
    }

    for (field, tools_a, tools_b) in [
        ("allowedTools", a.allowed_tools.as_ref(), b.allowed_tools.as_ref()),
        (
            "disallowedTools",
            a.disallowed_tools.as_ref(),
            b.disallowed_tools.as_ref(),
        ),
    ] {
        if sorted_tools(tools_a) != sorted_tools(tools_b) {
            push_change(&mut changes, field, tool_count(tools_a), tool_count(tools_b));
        }
    }

    push_if_changed(
        &mut changes,
        "permissionMode",
        a.permission_mode.as_deref().unwrap_or(DEFAULT).to_string(),
        b.permission_mode.as_deref().unwrap_or(DEFAULT).to_string(),
    );
    push_if_changed(
        &mut changes,
        "thinkingEnabled",
        thinking(a.thinking_enabled).to_string(),
        thinking(b.thinking_enabled).to_string(),
    );
    push_if_changed(
        &mut changes,
        "variantId",
        or_none(a.variant_id.as_deref()),
        or_none(b.variant_id.as_deref()),
    );

    changes
}

/// Compare the config snapshots held by two runs.
pub fn diff_runs(a: &Run, b: &Run) -> ConfigDiffSummary {
    let changes = diff_agent_configs(&a.agent, &b.agent);
    ConfigDiffSummary {
        run_a: a.id.clone(),
        run_b: b.id.clone(),
        identical: changes.is_empty(),
        changes,
    }
}

/// Plain-text report of config changes.
pub fn render_config_diff(changes: &[ConfigChange]) -> String {
    let mut out = String::new();
    out.push_str("Config Diff\n");
    out.push_str("===========\n");
    if changes.is_empty() {
        out.push_str("no configuration changes");
        return out;
    }
    out.push_str(&format!("changed fields: {}\n\n", changes.len()));
    for change in changes {
        out.push_str(&format!(
            "  ~ {}: {} -> {}\n",
            change.field, change.old, change.new
        ));
    }
    out.trim_end().to_string()
}
