use crate::error::{QdError, Result};
use serde::{Deserialize, Serialize};
use std::path::{Path, PathBuf};

/// Environment variable naming an explicit config file.
pub const CONFIG_ENV: &str = "QD_CONFIG";

// ---------------------------------------------------------------------------
// ConfigWarning / WarnLevel
// ---------------------------------------------------------------------------

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ConfigWarning {
    pub level: WarnLevel,
    pub message: String,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum WarnLevel {
    Warning,
    Error,
}

// ---------------------------------------------------------------------------
// ToolConfig
// ---------------------------------------------------------------------------

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ToolConfig {
    #[serde(default = "default_tool_name")]
    pub name: String,
    /// Source file extension without the leading dot.
    #[serde(default = "default_extension")]
    pub extension: String,
    /// Checked in order after the search path. `~/` is expanded.
    #[serde(default = "default_known_paths")]
    pub known_paths: Vec<String>,
    /// Secondary runtime reported by `status` (never required).
    #[serde(default = "default_runtime")]
    pub runtime: String,
}

fn default_tool_name() -> String {
    "quarkdown".to_string()
}

fn default_extension() -> String {
    "qd".to_string()
}

fn default_known_paths() -> Vec<String> {
    vec![
        "/opt/quarkdown/bin/quarkdown".to_string(),
        "/usr/local/bin/quarkdown".to_string(),
        "~/.local/bin/quarkdown".to_string(),
    ]
}

fn default_runtime() -> String {
    "java".to_string()
}

impl Default for ToolConfig {
    fn default() -> Self {
        Self {
            name: default_tool_name(),
            extension: default_extension(),
            known_paths: default_known_paths(),
            runtime: default_runtime(),
        }
    }
}

// ---------------------------------------------------------------------------
// InstallConfig
// ---------------------------------------------------------------------------

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ScoopBucket {
    pub name: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub url: Option<String>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct InstallConfig {
    #[serde(default = "default_brew_formula")]
    pub brew_formula: String,
    /// Where a fresh Homebrew lands before the shell profile puts it on PATH.
    #[serde(default = "default_brew_known_paths")]
    pub brew_known_paths: Vec<String>,
    #[serde(default = "default_brew_bootstrap")]
    pub brew_bootstrap: String,
    #[serde(default = "default_install_script")]
    pub install_script: String,
    #[serde(default = "default_manual_url")]
    pub manual_url: String,
    #[serde(default = "default_scoop_buckets")]
    pub scoop_buckets: Vec<ScoopBucket>,
    #[serde(default = "default_scoop_package")]
    pub scoop_package: String,
}

fn default_brew_formula() -> String {
    "quarkdown-labs/quarkdown/quarkdown".to_string()
}

fn default_brew_known_paths() -> Vec<String> {
    vec![
        "/opt/homebrew/bin/brew".to_string(),
        "/usr/local/bin/brew".to_string(),
        "/home/linuxbrew/.linuxbrew/bin/brew".to_string(),
    ]
}

fn default_brew_bootstrap() -> String {
    r#"/bin/bash -c "$(curl -fsSL https://raw.githubusercontent.com/Homebrew/install/HEAD/install.sh)""#
        .to_string()
}

fn default_install_script() -> String {
    r#"curl -fsSL https://raw.githubusercontent.com/quarkdown-labs/get-quarkdown/refs/heads/main/install.sh | sudo env "PATH=$PATH" bash"#
        .to_string()
}

fn default_manual_url() -> String {
    "https://github.com/iamgio/quarkdown/releases/latest".to_string()
}

fn default_scoop_buckets() -> Vec<ScoopBucket> {
    vec![
        ScoopBucket {
            name: "java".to_string(),
            url: None,
        },
        ScoopBucket {
            name: "quarkdown".to_string(),
            url: Some("https://github.com/quarkdown-labs/scoop-quarkdown".to_string()),
        },
    ]
}

fn default_scoop_package() -> String {
    "quarkdown".to_string()
}

impl Default for InstallConfig {
    fn default() -> Self {
        Self {
            brew_formula: default_brew_formula(),
            brew_known_paths: default_brew_known_paths(),
            brew_bootstrap: default_brew_bootstrap(),
            install_script: default_install_script(),
            manual_url: default_manual_url(),
            scoop_buckets: default_scoop_buckets(),
            scoop_package: default_scoop_package(),
        }
    }
}

// ---------------------------------------------------------------------------
// NotifyConfig
// ---------------------------------------------------------------------------

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct NotifyConfig {
    #[serde(default = "default_notifier")]
    pub notifier: String,
    /// Bundle id focused when the notification is clicked.
    #[serde(default = "default_activate", skip_serializing_if = "Option::is_none")]
    pub activate: Option<String>,
    /// Script run with the turn's working directory before notifying.
    #[serde(default = "default_sound_script", skip_serializing_if = "Option::is_none")]
    pub sound_script: Option<String>,
}

fn default_notifier() -> String {
    "terminal-notifier".to_string()
}

fn default_activate() -> Option<String> {
    Some("com.googlecode.iterm2".to_string())
}

fn default_sound_script() -> Option<String> {
    Some("~/.claude/hooks/play-sound.sh".to_string())
}

impl Default for NotifyConfig {
    fn default() -> Self {
        Self {
            notifier: default_notifier(),
            activate: default_activate(),
            sound_script: default_sound_script(),
        }
    }
}

// ---------------------------------------------------------------------------
// Config (top-level)
// ---------------------------------------------------------------------------

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct Config {
    #[serde(default)]
    pub tool: ToolConfig,
    #[serde(default)]
    pub install: InstallConfig,
    #[serde(default)]
    pub notify: NotifyConfig,
}

impl Config {
    /// Load configuration.
    ///
    /// Priority:
    /// 1. `explicit` (from `--config` / `QD_CONFIG`); must exist
    /// 2. `~/.config/qd-tools/config.yaml` when present
    /// 3. Built-in defaults
    pub fn load(explicit: Option<&Path>) -> Result<Self> {
        if let Some(path) = explicit {
            if !path.is_file() {
                return Err(QdError::ConfigNotFound(path.to_path_buf()));
            }
            return Self::load_file(path);
        }

        match default_path() {
            Some(path) if path.is_file() => Self::load_file(&path),
            _ => Ok(Self::default()),
        }
    }

    pub fn load_file(path: &Path) -> Result<Self> {
        let data = std::fs::read_to_string(path)?;
        // An empty file is a valid "all defaults" config.
        if data.trim().is_empty() {
            return Ok(Self::default());
        }
        let cfg: Config = serde_yaml::from_str(&data)?;
        tracing::debug!(path = %path.display(), "loaded config");
        Ok(cfg)
    }

    // -----------------------------------------------------------------------
    // Validation
    // -----------------------------------------------------------------------

    pub fn validate(&self) -> Vec<ConfigWarning> {
        let mut warnings = Vec::new();

        if self.tool.name.trim().is_empty() {
            warnings.push(ConfigWarning {
                level: WarnLevel::Error,
                message: "tool.name is empty".to_string(),
            });
        }

        if self.tool.extension.starts_with('.') {
            warnings.push(ConfigWarning {
                level: WarnLevel::Warning,
                message: format!(
                    "tool.extension '{}' should not include the leading dot",
                    self.tool.extension
                ),
            });
        }

        for path in &self.tool.known_paths {
            if !path.starts_with("~/") && !Path::new(path).is_absolute() {
                warnings.push(ConfigWarning {
                    level: WarnLevel::Warning,
                    message: format!("tool.known_paths entry '{path}' is not absolute"),
                });
            }
        }

        if self.notify.notifier.trim().is_empty() {
            warnings.push(ConfigWarning {
                level: WarnLevel::Error,
                message: "notify.notifier is empty".to_string(),
            });
        }

        warnings
    }
}

/// `~/.config/qd-tools/config.yaml`, if a home directory is known.
pub fn default_path() -> Option<PathBuf> {
    home::home_dir().map(|h| h.join(".config").join("qd-tools").join("config.yaml"))
}

/// Expand a leading `~/` against the home directory.
///
/// Returns `None` only when the path needs a home directory and none is known.
pub fn expand_home(path: &str) -> Option<PathBuf> {
    match path.strip_prefix("~/") {
        Some(rest) => home::home_dir().map(|h| h.join(rest)),
        None if path == "~" => home::home_dir(),
        None => Some(PathBuf::from(path)),
    }
}
