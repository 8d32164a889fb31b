//! Configuration management with layered loading
//!
//! Precedence (lowest to highest):
//! 1. Compiled defaults
//! 2. Global config: `$XDG_CONFIG_HOME/marktree/marktree.toml`
//! 3. Explicit config file (`--config`)
//! 4. Environment variables: `MARKTREE_*` prefix

use std::path::{Path, PathBuf};

use config::{Config, ConfigError, Environment};
use directories::ProjectDirs;
use serde::{Deserialize, Serialize};

use crate::application::ApplicationError;
use crate::infrastructure::store::DEFAULT_LIST_NAME;

/// Navigation behaviour.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
#[serde(default)]
pub struct NavigationConfig {
    /// Line-order navigation continues from the other end of the file
    pub wraparound: bool,
}

impl Default for NavigationConfig {
    fn default() -> Self {
        Self { wraparound: true }
    }
}

/// Raw navigation config for intermediate parsing.
#[derive(Debug, Clone, Deserialize, Default)]
#[serde(default)]
pub struct RawNavigationConfig {
    pub wraparound: Option<bool>,
}

/// Raw settings for intermediate parsing (`None` = not specified, inherit).
#[derive(Debug, Clone, Deserialize, Default)]
#[serde(default)]
pub struct RawSettings {
    pub store_path: Option<PathBuf>,
    pub default_list_name: Option<String>,
    pub navigation: RawNavigationConfig,
}

/// Unified configuration for marktree.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
#[serde(default)]
pub struct Settings {
    /// Bookmark store file
    pub store_path: PathBuf,
    /// Name of the list created when no active list exists
    pub default_list_name: String,
    pub navigation: NavigationConfig,
}

impl Default for Settings {
    fn default() -> Self {
        Self {
            store_path: default_store_path(),
            default_list_name: DEFAULT_LIST_NAME.to_string(),
            navigation: NavigationConfig::default(),
        }
    }
}

/// Default store file (`<data dir>/marktree/bookmarks.json`).
fn default_store_path() -> PathBuf {
    ProjectDirs::from("", "", "marktree")
        .map(|dirs| dirs.data_dir().join("bookmarks.json"))
        .unwrap_or_else(|| PathBuf::from("~/.marktree/bookmarks.json"))
}

/// Get the XDG config directory for marktree.
pub fn global_config_dir() -> Option<PathBuf> {
    ProjectDirs::from("", "", "marktree").map(|dirs| dirs.config_dir().to_path_buf())
}

/// Get the path to the global config file.
pub fn global_config_path() -> Option<PathBuf> {
    global_config_dir().map(|dir| dir.join("marktree.toml"))
}

/// Expand shell variables and tilde in a path string.
pub fn expand_path(path: &Path) -> PathBuf {
    let raw = path.to_string_lossy();
    shellexpand::full(raw.as_ref())
        .map(|s| PathBuf::from(s.into_owned()))
        .unwrap_or_else(|_| path.to_path_buf())
}

/// Load a TOML file into RawSettings for manual merging.
fn load_raw_settings(path: &Path) -> Result<RawSettings, ApplicationError> {
    let content = std::fs::read_to_string(path).map_err(|e| ApplicationError::Config {
        message: format!("read {}: {}", path.display(), e),
    })?;
    toml::from_str(&content).map_err(|e| ApplicationError::Config {
        message: format!("parse {}: {}", path.display(), e),
    })
}

impl Settings {
    /// Merge overlay config onto self (base): overlay wins where specified.
    fn merge_with(&self, overlay: &RawSettings) -> Self {
        Self {
            store_path: overlay
                .store_path
                .clone()
                .unwrap_or_else(|| self.store_path.clone()),
            default_list_name: overlay
                .default_list_name
                .clone()
                .unwrap_or_else(|| self.default_list_name.clone()),
            navigation: NavigationConfig {
                wraparound: overlay
                    .navigation
                    .wraparound
                    .unwrap_or(self.navigation.wraparound),
            },
        }
    }

    /// Load settings with layered precedence.
    ///
    /// # Arguments
    /// * `explicit` - Optional config file given on the command line; must exist
    pub fn load(explicit: Option<&Path>) -> Result<Self, ApplicationError> {
        let mut current = Self::default();

        if let Some(global_path) = global_config_path() {
            if global_path.exists() {
                current = current.merge_with(&load_raw_settings(&global_path)?);
            }
        }

        current = current.apply_file(explicit)?;
        current = Self::apply_env_overrides(current)?;
        current.store_path = expand_path(&current.store_path);
        Ok(current)
    }

    /// Load defaults plus an optional explicit file, ignoring global config
    /// and environment.
    pub fn load_file_only(explicit: Option<&Path>) -> Result<Self, ApplicationError> {
        let mut settings = Self::default().apply_file(explicit)?;
        settings.store_path = expand_path(&settings.store_path);
        Ok(settings)
    }

    fn apply_file(self, explicit: Option<&Path>) -> Result<Self, ApplicationError> {
        match explicit {
            Some(path) if !path.exists() => Err(ApplicationError::Config {
                message: format!("config file not found: {}", path.display()),
            }),
            Some(path) => Ok(self.merge_with(&load_raw_settings(path)?)),
            None => Ok(self),
        }
    }

    /// Apply MARKTREE_* environment variables as explicit overrides.
    fn apply_env_overrides(mut settings: Self) -> Result<Self, ApplicationError> {
        let config = Config::builder()
            .add_source(Environment::with_prefix("MARKTREE").separator("__"))
            .build()
            .map_err(config_err)?;

        if let Ok(val) = config.get_string("store_path") {
            settings.store_path = PathBuf::from(val);
        }
        if let Ok(val) = config.get_string("default_list_name") {
            settings.default_list_name = val;
        }
        if let Ok(val) = config.get_bool("navigation.wraparound") {
            settings.navigation.wraparound = val;
        }

        Ok(settings)
    }

    /// Show the effective configuration as TOML.
    pub fn to_toml(&self) -> Result<String, ApplicationError> {
        toml::to_string_pretty(self).map_err(|e| ApplicationError::Config {
            message: format!("serialize config: {e}"),
        })
    }

    /// Generate a template config file.
    pub fn template() -> String {
        r#"# marktree configuration
#
# Locations (by precedence, lowest to highest):
#   Global:   ~/.config/marktree/marktree.toml
#   Explicit: marktree --config <file>
#   Env:      MARKTREE_* environment variables (MARKTREE_NAVIGATION__WRAPAROUND=false)

# Bookmark store
# store_path = "~/.local/share/marktree/bookmarks.json"

# List created and activated when no active list exists
# default_list_name = "Default"

[navigation]
# Line-order next/prev continues from the other end of the file
# wraparound = true
"#
        .to_string()
    }
}

fn config_err(e: ConfigError) -> ApplicationError {
    ApplicationError::Config {
        message: e.to_string(),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn given_defaults_when_created_then_wraparound_enabled() {
        let settings = Settings::default();
        assert!(settings.navigation.wraparound);
        assert_eq!(settings.default_list_name, "Default");
        assert!(settings.store_path.ends_with("bookmarks.json"));
    }

    #[test]
    fn given_partial_overlay_when_merging_then_keeps_unspecified_fields() {
        let base = Settings::default();
        let overlay: RawSettings = toml::from_str(
            r#"
[navigation]
wraparound = false
"#,
        )
        .unwrap();

        let merged = base.merge_with(&overlay);

        assert!(!merged.navigation.wraparound);
        assert_eq!(merged.store_path, base.store_path);
        assert_eq!(merged.default_list_name, base.default_list_name);
    }

    #[test]
    fn given_tilde_in_store_path_when_expanding_then_expands_to_home() {
        let expanded = expand_path(Path::new("~/marks.json"));
        assert!(!expanded.to_string_lossy().starts_with('~'));
        assert!(expanded.ends_with("marks.json"));
    }

    #[test]
    fn given_settings_when_serialized_then_roundtrips_through_toml() {
        let settings = Settings::default();
        let text = settings.to_toml().unwrap();
        let parsed: Settings = toml::from_str(&text).unwrap();
        assert_eq!(parsed, settings);
    }

    #[test]
    fn given_template_when_parsed_then_is_valid_toml() {
        let parsed: RawSettings = toml::from_str(&Settings::template()).unwrap();
        assert!(parsed.store_path.is_none());
        assert!(parsed.navigation.wraparound.is_none());
    }
}
