//! Ambient agent configuration discovered from well-known files.
//!
//! Every probe returns `None` for a missing or malformed file; nothing here
//! fails the caller. [`capture_agent_config`] folds the probes into an
//! [`AgentConfig`] and copies values structurally, without interpreting them.

use std::collections::BTreeMap;
use std::fs;
use std::path::{Path, PathBuf};

use serde_json::Value;
use sha2::{Digest, Sha256};

use crate::domain::agent_config::{AgentConfig, McpServerConfig, McpServerType};
use crate::obs;

/// Instruction file names, checked in order.
const INSTRUCTION_FILES: [&str; 2] = ["CLAUDE.md", ".claude/CLAUDE.md"];

/// Read-only view of the agent's ambient configuration files.
pub trait AmbientConfigSource {
    /// Global agent config (`~/.claude.json`).
    fn read_main_config(&self) -> Option<Value>;

    /// User settings (`~/.claude/settings.json`).
    fn read_user_settings(&self) -> Option<Value>;

    /// Project settings (`<root>/.claude/settings.json`).
    fn read_project_settings(&self, project_root: &Path) -> Option<Value>;

    /// Project MCP config (`<root>/.mcp.json`).
    fn read_project_mcp_config(&self, project_root: &Path) -> Option<Value>;

    fn find_instruction_file(&self, project_root: &Path) -> Option<PathBuf>;

    /// SHA-256 hex of the instruction file contents.
    fn hash_instruction_file(&self, project_root: &Path) -> Option<String>;
}

/// Reads ambient config from the real filesystem.
#[derive(Debug, Clone)]
pub struct FsAmbientSource {
    home: Option<PathBuf>,
}

impl Default for FsAmbientSource {
    fn default() -> Self {
        Self::new()
    }
}

impl FsAmbientSource {
    /// Source rooted at the current user's home directory.
    pub fn new() -> Self {
        Self {
            home: dirs::home_dir(),
        }
    }

    /// Source rooted at an explicit home directory.
    pub fn with_home(home: impl Into<PathBuf>) -> Self {
        Self {
            home: Some(home.into()),
        }
    }

    fn home_file(&self, relative: &str) -> Option<Value> {
        let path = self.home.as_ref()?.join(relative);
        read_json_object(&path)
    }
}

impl AmbientConfigSource for FsAmbientSource {
    fn read_main_config(&self) -> Option<Value> {
        self.home_file(".claude.json")
    }

    fn read_user_settings(&self) -> Option<Value> {
        self.home_file(".claude/settings.json")
    }

    fn read_project_settings(&self, project_root: &Path) -> Option<Value> {
        read_json_object(&project_root.join(".claude").join("settings.json"))
    }

    fn read_project_mcp_config(&self, project_root: &Path) -> Option<Value> {
        read_json_object(&project_root.join(".mcp.json"))
    }

    fn find_instruction_file(&self, project_root: &Path) -> Option<PathBuf> {
        INSTRUCTION_FILES
            .iter()
            .map(|name| project_root.join(name))
            .find(|path| path.is_file())
    }

    fn hash_instruction_file(&self, project_root: &Path) -> Option<String> {
        let path = self.find_instruction_file(project_root)?;
        match fs::read(&path) {
            Ok(bytes) => Some(hex::encode(Sha256::digest(&bytes))),
            Err(e) => {
                obs::emit_ambient_unavailable(&path, &e.to_string());
                None
            }
        }
    }
}

/// Read `path` as a JSON object; anything else is `None`.
fn read_json_object(path: &Path) -> Option<Value> {
    let content = match fs::read_to_string(path) {
        Ok(content) => content,
        Err(e) => {
            obs::emit_ambient_unavailable(path, &e.to_string());
            return None;
        }
    };
    match serde_json::from_str::<Value>(&content) {
        Ok(value) if value.is_object() => Some(value),
        Ok(_) => {
            obs::emit_ambient_unavailable(path, "not a JSON object");
            None
        }
        Err(e) => {
            obs::emit_ambient_unavailable(path, &e.to_string());
            None
        }
    }
}

/// In-memory source for tests and embedding callers.
#[derive(Debug, Clone, Default)]
pub struct MemoryAmbientSource {
    pub main_config: Option<Value>,
    pub user_settings: Option<Value>,
    pub project_settings: Option<Value>,
    pub project_mcp_config: Option<Value>,
    pub instruction_file: Option<(PathBuf, String)>,
}

impl AmbientConfigSource for MemoryAmbientSource {
    fn read_main_config(&self) -> Option<Value> {
        self.main_config.clone()
    }

    fn read_user_settings(&self) -> Option<Value> {
        self.user_settings.clone()
    }

    fn read_project_settings(&self, _project_root: &Path) -> Option<Value> {
        self.project_settings.clone()
    }

    fn read_project_mcp_config(&self, _project_root: &Path) -> Option<Value> {
        self.project_mcp_config.clone()
    }

    fn find_instruction_file(&self, _project_root: &Path) -> Option<PathBuf> {
        self.instruction_file.as_ref().map(|(path, _)| path.clone())
    }

    fn hash_instruction_file(&self, _project_root: &Path) -> Option<String> {
        self.instruction_file
            .as_ref()
            .map(|(_, contents)| hex::encode(Sha256::digest(contents.as_bytes())))
    }
}

// ---------------------------------------------------------------------------
// Extraction
// ---------------------------------------------------------------------------

fn merge_servers(section: Option<&Value>, out: &mut BTreeMap<String, McpServerConfig>) {
    let Some(entries) = section.and_then(Value::as_object) else {
        return;
    };
    for (name, entry) in entries {
        let type_name = entry.get("type").and_then(Value::as_str).unwrap_or("stdio");
        if let Some(server_type) = McpServerType::parse(type_name) {
            out.insert(
                name.clone(),
                McpServerConfig {
                    server_type,
                    enabled: true,
                },
            );
        }
    }
}

fn string_list(value: Option<&Value>) -> Option<Vec<String>> {
    let items = value?.as_array()?;
    Some(
        items
            .iter()
            .filter_map(Value::as_str)
            .map(str::to_string)
            .collect(),
    )
}

fn permissions_field<'a>(settings: Option<&'a Value>, key: &str) -> Option<&'a Value> {
    settings?.get("permissions")?.get(key)
}

/// Assemble an [`AgentConfig`] from ambient sources.
///
/// `version` comes from the live agent process and is passed in. The model
/// stays `"unknown"` until the first case resolves it.
pub fn capture_agent_config(
    source: &dyn AmbientConfigSource,
    project_root: &Path,
    name: &str,
    version: Option<String>,
) -> AgentConfig {
    let main = source.read_main_config();
    let user = source.read_user_settings();
    let project = source.read_project_settings(project_root);
    let project_mcp = source.read_project_mcp_config(project_root);

    let mut servers = BTreeMap::new();
    merge_servers(main.as_ref().and_then(|m| m.get("mcpServers")), &mut servers);
    let project_key = project_root.to_string_lossy();
    merge_servers(
        main.as_ref()
            .and_then(|m| m.get("projects"))
            .and_then(|p| p.get(&*project_key))
            .and_then(|p| p.get("mcpServers")),
        &mut servers,
    );
    merge_servers(
        project_mcp.as_ref().and_then(|m| m.get("mcpServers")),
        &mut servers,
    );

    let disabled = string_list(
        project
            .as_ref()
            .and_then(|p| p.get("disabledMcpjsonServers")),
    )
    .unwrap_or_default();
    for server_name in &disabled {
        if let Some(server) = servers.get_mut(server_name) {
            server.enabled = false;
        }
    }

    let mut config = AgentConfig::new(name, version);
    config.claude_md_hash = source.hash_instruction_file(project_root);
    config.mcp_servers = (!servers.is_empty()).then_some(servers);
    config.allowed_tools = string_list(permissions_field(project.as_ref(), "allow"));
    config.disallowed_tools = string_list(permissions_field(project.as_ref(), "deny"));
    config.permission_mode = permissions_field(project.as_ref(), "defaultMode")
        .and_then(Value::as_str)
        .map(str::to_string);
    config.thinking_enabled = user
        .as_ref()
        .and_then(|u| u.get("alwaysThinkingEnabled"))
        .and_then(Value::as_bool);
    config
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn capture_with_no_sources_is_minimal() {
        let source = MemoryAmbientSource::default();
        let config = capture_agent_config(&source, Path::new("/repo"), "claude-code", None);
        assert_eq!(config, AgentConfig::new("claude-code", None));
    }

    #[test]
    fn capture_merges_servers_and_marks_disabled() {
        let source = MemoryAmbientSource {
            main_config: Some(json!({
                "mcpServers": {"memory": {"command": "mem"}},
                "projects": {"/repo": {"mcpServers": {"docs": {"type": "sse", "url": "http://x"}}}}
            })),
            project_mcp_config: Some(json!({
                "mcpServers": {
                    "memory": {"type": "http", "url": "http://y"},
                    "odd": {"type": "websocket"}
                }
            })),
            project_settings: Some(json!({"disabledMcpjsonServers": ["docs"]})),
            ..Default::default()
        };

        let config = capture_agent_config(&source, Path::new("/repo"), "claude-code", None);
        let servers = config.mcp_servers.expect("servers");
        assert_eq!(servers.len(), 2);
        assert_eq!(servers["memory"].server_type, McpServerType::Http);
        assert!(servers["memory"].enabled);
        assert_eq!(servers["docs"].server_type, McpServerType::Sse);
        assert!(!servers["docs"].enabled);
    }

    #[test]
    fn capture_copies_permissions_and_thinking() {
        let source = MemoryAmbientSource {
            project_settings: Some(json!({
                "permissions": {
                    "allow": ["Read", "Bash(git status)"],
                    "deny": ["WebFetch"],
                    "defaultMode": "acceptEdits"
                }
            })),
            user_settings: Some(json!({"alwaysThinkingEnabled": true})),
            instruction_file: Some((PathBuf::from("/repo/CLAUDE.md"), "be brief".to_string())),
            ..Default::default()
        };

        let config = capture_agent_config(
            &source,
            Path::new("/repo"),
            "claude-code",
            Some("1.2.3".to_string()),
        );
        assert_eq!(
            config.allowed_tools,
            Some(vec!["Read".to_string(), "Bash(git status)".to_string()])
        );
        assert_eq!(config.disallowed_tools, Some(vec!["WebFetch".to_string()]));
        assert_eq!(config.permission_mode.as_deref(), Some("acceptEdits"));
        assert_eq!(config.thinking_enabled, Some(true));
        assert_eq!(config.version.as_deref(), Some("1.2.3"));
        assert_eq!(config.model, "unknown");
        assert_eq!(config.claude_md_hash.as_ref().map(String::len), Some(64));
    }

    #[test]
    fn fs_source_tolerates_missing_and_malformed_files() {
        let home = tempfile::tempdir().unwrap();
        let project = tempfile::tempdir().unwrap();
        fs::write(home.path().join(".claude.json"), "{ broken").unwrap();
        fs::write(project.path().join(".mcp.json"), "[1, 2]").unwrap();

        let source = FsAmbientSource::with_home(home.path());
        assert!(source.read_main_config().is_none());
        assert!(source.read_user_settings().is_none());
        assert!(source.read_project_settings(project.path()).is_none());
        assert!(source.read_project_mcp_config(project.path()).is_none());
        assert!(source.hash_instruction_file(project.path()).is_none());
    }

    #[test]
    fn fs_source_hashes_instruction_file() {
        let project = tempfile::tempdir().unwrap();
        fs::create_dir_all(project.path().join(".claude")).unwrap();
        fs::write(project.path().join(".claude/CLAUDE.md"), "abc").unwrap();

        let source = FsAmbientSource::with_home(project.path());
        assert_eq!(
            source.find_instruction_file(project.path()),
            Some(project.path().join(".claude/CLAUDE.md"))
        );
        assert_eq!(
            source.hash_instruction_file(project.path()).as_deref(),
            Some("ba7816bf8f01cfea414140de5dae2223b00361a396177a9cb410ff61f20015ad")
        );
    }
}
