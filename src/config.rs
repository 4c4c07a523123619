//! Configuration loading for skill-rules
//!
//! Supports TOML configuration with embedded defaults.

use serde::Deserialize;
use std::path::{Path, PathBuf};

/// General configuration section
#[derive(Debug, Clone, Deserialize)]
#[serde(default)]
pub struct GeneralConfig {
    /// Rule set document; relative paths resolve against the project directory
    pub rules_path: String,

    /// Enable audit logging
    pub audit_log: bool,

    /// Path to audit log file
    pub audit_path: Option<String>,
}

impl Default for GeneralConfig {
    fn default() -> Self {
        Self {
            rules_path: ".claude/skills/skill-rules.json".to_string(),
            audit_log: true,
            audit_path: Some("~/.claude/skill-rules/audit.jsonl".to_string()),
        }
    }
}

/// Session tracking configuration
#[derive(Debug, Clone, Deserialize)]
#[serde(default)]
pub struct SessionConfig {
    /// Persist used skills between hook invocations
    pub persist: bool,

    /// Directory holding one state file per session
    pub state_dir: String,
}

impl Default for SessionConfig {
    fn default() -> Self {
        Self {
            persist: true,
            state_dir: "~/.claude/skill-rules/state".to_string(),
        }
    }
}

/// Main configuration structure
#[derive(Debug, Clone, Deserialize, Default)]
#[serde(default)]
pub struct Config {
    pub general: GeneralConfig,
    pub session: SessionConfig,
}

impl Config {
    /// Load configuration from the standard locations or use defaults
    pub fn load() -> Self {
        let config_paths = [
            // User-specific config
            dirs::home_dir().map(|p| p.join(".claude/skill-rules/config.toml")),
            // System-wide config
            Some(PathBuf::from("/etc/skill-rules/config.toml")),
        ];

        for path in config_paths.into_iter().flatten() {
            if path.exists() {
                match Self::load_from(&path) {
                    Ok(config) => return config,
                    Err(e) => {
                        eprintln!("Warning: Failed to parse {}: {}", path.display(), e);
                    }
                }
            }
        }

        Config::default()
    }

    /// Load from a specific path
    pub fn load_from(path: &Path) -> Result<Self, Box<dyn std::error::Error>> {
        let content = std::fs::read_to_string(path)?;
        let config: Config = toml::from_str(&content)?;
        Ok(config)
    }

    /// Expand ~ in path strings
    pub fn expand_path(path: &str) -> PathBuf {
        if let Some(rest) = path.strip_prefix("~/") {
            if let Some(home) = dirs::home_dir() {
                return home.join(rest);
            }
        }
        PathBuf::from(path)
    }

    /// Rule set path, resolved against `project_dir` when relative
    pub fn rules_path(&self, project_dir: &Path) -> PathBuf {
        let path = Self::expand_path(&self.general.rules_path);
        if path.is_absolute() {
            path
        } else {
            project_dir.join(path)
        }
    }

    /// Get the audit log path (expanded)
    pub fn audit_path(&self) -> Option<PathBuf> {
        if !self.general.audit_log {
            return None;
        }
        self.general.audit_path.as_deref().map(Self::expand_path)
    }

    /// Session state directory, if persistence is on
    pub fn state_dir(&self) -> Option<PathBuf> {
        self.session
            .persist
            .then(|| Self::expand_path(&self.session.state_dir))
    }
}

/// Embedded default configuration
pub const DEFAULT_CONFIG_TOML: &str = r#"
[general]
rules_path = ".claude/skills/skill-rules.json"
audit_log = true
audit_path = "~/.claude/skill-rules/audit.jsonl"

[session]
persist = true
state_dir = "~/.claude/skill-rules/state"
"#;
