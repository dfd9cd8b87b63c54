// ABOUTME: Configuration loading for claude-chats-sync.
// ABOUTME: Reads ~/.claude-chats-sync/config.toml and resolves the Claude Code home directory.

use std::path::{Path, PathBuf};

use serde::Deserialize;

use crate::paths::DEFAULT_FOLDER_NAME;

/// Top-level configuration.
#[derive(Debug, Clone, Default, Deserialize)]
#[serde(default)]
pub struct Config {
    pub sync: SyncConfig,
    pub claude: ClaudeConfig,
}

/// Where sessions live inside the project.
#[derive(Debug, Clone, Deserialize)]
#[serde(default)]
pub struct SyncConfig {
    pub folder_name: String,
}

impl Default for SyncConfig {
    fn default() -> Self {
        Self {
            folder_name: DEFAULT_FOLDER_NAME.to_string(),
        }
    }
}

/// Location of Claude Code's own data directory.
#[derive(Debug, Clone, Default, Deserialize)]
#[serde(default)]
pub struct ClaudeConfig {
    /// Overrides `~/.claude`. `CLAUDE_CONFIG_DIR` takes precedence over this.
    pub home: Option<PathBuf>,
}

impl Config {
    /// Load config from ~/.claude-chats-sync/config.toml, falling back to defaults.
    pub fn load() -> anyhow::Result<Self> {
        Self::load_from(&Self::config_path())
    }

    /// Load config from an explicit path (for testing).
    pub fn load_from(path: &Path) -> anyhow::Result<Self> {
        if !path.exists() {
            return Ok(Self::default());
        }
        let content = std::fs::read_to_string(path)?;
        let config: Self = toml::from_str(&content)?;
        Ok(config)
    }

    /// Path to the config file.
    pub fn config_path() -> PathBuf {
        home_dir().join(".claude-chats-sync").join("config.toml")
    }

    /// Resolve Claude Code's home directory.
    ///
    /// Order: `env_override` (from `CLAUDE_CONFIG_DIR`) → `[claude].home` → `~/.claude`.
    pub fn claude_home(&self, env_override: Option<&Path>) -> PathBuf {
        if let Some(dir) = env_override {
            return dir.to_path_buf();
        }
        if let Some(home) = &self.claude.home {
            return home.clone();
        }
        home_dir().join(".claude")
    }

    /// Resolve the history folder name: CLI flag wins over config.
    pub fn folder_name<'a>(&'a self, cli_override: Option<&'a str>) -> &'a str {
        cli_override.unwrap_or(&self.sync.folder_name)
    }
}

fn home_dir() -> PathBuf {
    dirs::home_dir().unwrap_or_else(|| PathBuf::from("."))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn default_config_values() {
        let config = Config::default();
        assert_eq!(config.sync.folder_name, ".claudeCodeSessions");
        assert!(config.claude.home.is_none());
    }

    #[test]
    fn parse_config_toml() {
        let toml_str = r#"
[sync]
folder_name = ".sessions"

[claude]
home = "/opt/claude"
"#;
        let config: Config = toml::from_str(toml_str).unwrap();
        assert_eq!(config.sync.folder_name, ".sessions");
        assert_eq!(config.claude.home, Some(PathBuf::from("/opt/claude")));
    }

    #[test]
    fn parse_partial_config_uses_defaults() {
        let toml_str = r#"
[claude]
home = "/opt/claude"
"#;
        let config: Config = toml::from_str(toml_str).unwrap();
        assert_eq!(config.sync.folder_name, ".claudeCodeSessions");
    }

    #[test]
    fn claude_home_precedence() {
        let mut config = Config::default();
        config.claude.home = Some(PathBuf::from("/from/config"));
        assert_eq!(
            config.claude_home(Some(Path::new("/from/env"))),
            PathBuf::from("/from/env")
        );
        assert_eq!(config.claude_home(None), PathBuf::from("/from/config"));

        let config = Config::default();
        assert!(config.claude_home(None).ends_with(".claude"));
    }

    #[test]
    fn folder_name_cli_override_wins() {
        let config = Config::default();
        assert_eq!(config.folder_name(Some(".mine")), ".mine");
        assert_eq!(config.folder_name(None), ".claudeCodeSessions");
    }

    #[test]
    fn load_missing_file_returns_default() {
        let dir = tempfile::tempdir().unwrap();
        let config = Config::load_from(&dir.path().join("nope.toml")).unwrap();
        assert_eq!(config.sync.folder_name, ".claudeCodeSessions");
    }

    #[test]
    fn load_from_file() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("config.toml");
        std::fs::write(&path, "[sync]\nfolder_name = \".chats\"\n").unwrap();
        let config = Config::load_from(&path).unwrap();
        assert_eq!(config.sync.folder_name, ".chats");
    }
}
