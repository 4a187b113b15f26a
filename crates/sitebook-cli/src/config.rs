//! Configuration file management for sitebook.
//!
//! Provides a TOML-based config file at `~/.config/sitebook/config.toml` and a
//! resolution chain: CLI flag > env var > config file > default.

use std::path::{Path, PathBuf};
use std::sync::Arc;
use std::time::Duration;

use anyhow::{Context, Result};
use serde::{Deserialize, Serialize};

use sitebook_core::classify::{
    ClassifierSettings, NoteClassifier, RemoteConfig, build_registry,
};
use sitebook_core::reference::ReferenceData;
use sitebook_store::config::StoreConfig;

// -----------------------------------------------------------------------
// Config file types
// -----------------------------------------------------------------------

#[derive(Debug, Default, Serialize, Deserialize)]
pub struct ConfigFile {
    #[serde(default)]
    pub state: StateSection,
    #[serde(default)]
    pub reference: ReferenceSection,
    #[serde(default)]
    pub classifier: ClassifierSection,
}

#[derive(Debug, Default, Serialize, Deserialize)]
pub struct StateSection {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub path: Option<PathBuf>,
}

#[derive(Debug, Default, Serialize, Deserialize)]
pub struct ReferenceSection {
    /// Replacement communities table; the embedded one when unset.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub path: Option<PathBuf>,
}

#[derive(Debug, Default, Serialize, Deserialize)]
pub struct ClassifierSection {
    /// `keywords` or `remote`.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub backend: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub rules_path: Option<PathBuf>,
    #[serde(default)]
    pub remote: RemoteSection,
}

#[derive(Debug, Default, Serialize, Deserialize)]
pub struct RemoteSection {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub base_url: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub model: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub api_key: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub timeout_secs: Option<u64>,
}

// -----------------------------------------------------------------------
// Paths
// -----------------------------------------------------------------------

/// Return the sitebook config directory.
///
/// Always uses XDG layout: `$XDG_CONFIG_HOME/sitebook` or `~/.config/sitebook`.
/// The platform-specific `dirs::config_dir()` is not used.
pub fn config_dir() -> PathBuf {
    if let Ok(xdg) = std::env::var("XDG_CONFIG_HOME") {
        return PathBuf::from(xdg).join("sitebook");
    }
    dirs::home_dir()
        .unwrap_or_else(|| PathBuf::from("."))
        .join(".config")
        .join("sitebook")
}

/// Return the path to the sitebook config file.
pub fn config_path() -> PathBuf {
    config_dir().join("config.toml")
}

// -----------------------------------------------------------------------
// Read / write
// -----------------------------------------------------------------------

/// Load and parse the config file. Returns an error if it does not exist.
pub fn load_config() -> Result<ConfigFile> {
    let path = config_path();
    let contents = std::fs::read_to_string(&path)
        .with_context(|| format!("failed to read config file at {}", path.display()))?;
    let config: ConfigFile = toml::from_str(&contents)
        .with_context(|| format!("failed to parse config file at {}", path.display()))?;
    Ok(config)
}

/// Serialize and write the config file, creating parent dirs as needed.
/// Sets file permissions to 0600 on Unix since it may hold an API key.
pub fn save_config(config: &ConfigFile) -> Result<()> {
    let path = config_path();
    let dir = config_dir();
    std::fs::create_dir_all(&dir)
        .with_context(|| format!("failed to create config directory {}", dir.display()))?;

    let contents = toml::to_string_pretty(config).context("failed to serialize config")?;
    std::fs::write(&path, &contents)
        .with_context(|| format!("failed to write config file at {}", path.display()))?;

    #[cfg(unix)]
    {
        use std::os::unix::fs::PermissionsExt;
        let perms = std::fs::Permissions::from_mode(0o600);
        std::fs::set_permissions(&path, perms)
            .with_context(|| format!("failed to set permissions on {}", path.display()))?;
    }

    Ok(())
}

/// Non-empty value of an environment variable.
fn env_var(key: &str) -> Option<String> {
    std::env::var(key).ok().filter(|v| !v.trim().is_empty())
}

// -----------------------------------------------------------------------
// Resolved config
// -----------------------------------------------------------------------

/// Fully resolved configuration, ready for use.
#[derive(Debug)]
pub struct SitebookConfig {
    pub store_config: StoreConfig,
    pub reference: ReferenceData,
    pub classifier: ClassifierSettings,
}

impl SitebookConfig {
    /// Resolve configuration using the chain: CLI flag > env var > config file > default.
    ///
    /// - State path: `cli_state_path` > `SITEBOOK_STATE_PATH` > `state.path` > data dir
    /// - Reference table: `SITEBOOK_REFERENCE_PATH` > `reference.path` > embedded
    /// - Classifier backend: `SITEBOOK_CLASSIFIER` > `classifier.backend` > `keywords`
    /// - Remote URL, model, key: `SITEBOOK_LLM_*` > `classifier.remote.*` > defaults
    ///
    /// A config file that exists but cannot be parsed is an error; a missing
    /// one is not.
    pub fn resolve(cli_state_path: Option<&Path>) -> Result<Self> {
        let file_config = if config_path().exists() {
            load_config()?
        } else {
            ConfigFile::default()
        };

        let state_path = if let Some(path) = cli_state_path {
            path.to_path_buf()
        } else if let Some(path) = StoreConfig::path_from_env() {
            path
        } else if let Some(path) = file_config.state.path.clone() {
            path
        } else {
            StoreConfig::default_path()
        };
        let store_config = StoreConfig::new(state_path);

        let reference_path = env_var("SITEBOOK_REFERENCE_PATH")
            .map(PathBuf::from)
            .or(file_config.reference.path.clone());
        let reference = match reference_path {
            Some(path) => ReferenceData::load(&path)?,
            None => ReferenceData::builtin(),
        };

        let classifier = resolve_classifier(file_config.classifier);

        Ok(Self {
            store_config,
            reference,
            classifier,
        })
    }

    /// The classifier named by the resolved backend setting.
    pub fn note_classifier(&self) -> Result<Arc<dyn NoteClassifier>> {
        let registry = build_registry(&self.classifier)?;
        registry.select(&self.classifier.backend)
    }
}

fn resolve_classifier(section: ClassifierSection) -> ClassifierSettings {
    let defaults = ClassifierSettings::default();
    let remote_defaults = RemoteConfig::default();
    let remote = section.remote;

    ClassifierSettings {
        backend: env_var("SITEBOOK_CLASSIFIER")
            .or(section.backend)
            .unwrap_or(defaults.backend),
        rules_path: section.rules_path,
        remote: RemoteConfig {
            base_url: env_var("SITEBOOK_LLM_URL")
                .or(remote.base_url)
                .unwrap_or(remote_defaults.base_url),
            model: env_var("SITEBOOK_LLM_MODEL")
                .or(remote.model)
                .unwrap_or(remote_defaults.model),
            api_key: env_var("SITEBOOK_LLM_API_KEY").or(remote.api_key),
            timeout: remote
                .timeout_secs
                .map(Duration::from_secs)
                .unwrap_or(remote_defaults.timeout),
        },
    }
}

// -----------------------------------------------------------------------
// Tests
// -----------------------------------------------------------------------
