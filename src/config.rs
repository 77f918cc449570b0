//! Configuration management with layered loading
//!
//! Precedence (lowest to highest):
//! 1. Compiled defaults
//! 2. Global config: `$XDG_CONFIG_HOME/internhub/internhub.toml`
//! 3. Environment variables: `INTERNHUB_*` prefix

use std::path::{Path, PathBuf};

use config::{Config, ConfigError, Environment};
use directories::ProjectDirs;
use serde::{Deserialize, Serialize};

use crate::application::ApplicationError;

/// Unified configuration for internhub.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
#[serde(default)]
pub struct Settings {
    /// Populate the store with the demo dataset on startup
    pub seed_demo_data: bool,
    /// Default directory for statistics exports (default: cwd)
    pub export_dir: PathBuf,
    /// Maximum number of suggested internships per student
    pub suggestion_limit: usize,
    /// Number of companies in the "top companies" statistic
    pub top_companies: usize,
    /// Minimum password length for new accounts
    pub min_password_len: usize,
}

impl Default for Settings {
    fn default() -> Self {
        Self {
            seed_demo_data: true,
            export_dir: PathBuf::from("."),
            suggestion_limit: 5,
            top_companies: 5,
            min_password_len: 8,
        }
    }
}

/// Raw settings for intermediate parsing (`None` = not specified, inherit).
#[derive(Debug, Clone, Deserialize, Default)]
#[serde(default)]
pub struct RawSettings {
    pub seed_demo_data: Option<bool>,
    pub export_dir: Option<PathBuf>,
    pub suggestion_limit: Option<usize>,
    pub top_companies: Option<usize>,
    pub min_password_len: Option<usize>,
}

/// Get the XDG config directory for internhub.
pub fn global_config_dir() -> Option<PathBuf> {
    ProjectDirs::from("", "", "internhub").map(|dirs| dirs.config_dir().to_path_buf())
}

/// Get the path to the global config file.
pub fn global_config_path() -> Option<PathBuf> {
    global_config_dir().map(|dir| dir.join("internhub.toml"))
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
    /// Expand `~`, `$VAR` and `${VAR}` in path-like fields.
    fn expand_paths(&mut self) {
        let raw = self.export_dir.to_string_lossy().to_string();
        let expanded = match shellexpand::full(&raw) {
            Ok(s) => s.into_owned(),
            Err(_) => raw.clone(),
        };
        self.export_dir = PathBuf::from(expanded);
    }

    /// Overlay wins wherever it specifies a value.
    fn merge_with(&self, overlay: &RawSettings) -> Self {
        Self {
            seed_demo_data: overlay.seed_demo_data.unwrap_or(self.seed_demo_data),
            export_dir: overlay
                .export_dir
                .clone()
                .unwrap_or_else(|| self.export_dir.clone()),
            suggestion_limit: overlay.suggestion_limit.unwrap_or(self.suggestion_limit),
            top_companies: overlay.top_companies.unwrap_or(self.top_companies),
            min_password_len: overlay.min_password_len.unwrap_or(self.min_password_len),
        }
    }

    /// Load settings from defaults, the global config file and env vars.
    pub fn load() -> Result<Self, ApplicationError> {
        Self::load_from(global_config_path().as_deref())
    }

    /// Load settings using `config_file` as the file layer.
    ///
    /// A missing file is skipped; a malformed one is an error.
    pub fn load_from(config_file: Option<&Path>) -> Result<Self, ApplicationError> {
        let mut current = Self::default();

        if let Some(path) = config_file {
            if path.exists() {
                let raw = load_raw_settings(path)?;
                current = current.merge_with(&raw);
            }
        }

        current = Self::apply_env_overrides(current)?;
        current.expand_paths();
        current.validate()?;
        Ok(current)
    }

    /// Apply INTERNHUB_* environment variables as explicit overrides.
    fn apply_env_overrides(mut settings: Self) -> Result<Self, ApplicationError> {
        let config = Config::builder()
            .add_source(
                Environment::with_prefix("INTERNHUB")
                    .prefix_separator("_")
                    .separator("__")
                    .try_parsing(true),
            )
            .build()
            .map_err(config_err)?;

        if let Ok(val) = config.get_bool("seed_demo_data") {
            settings.seed_demo_data = val;
        }
        if let Ok(val) = config.get_string("export_dir") {
            settings.export_dir = PathBuf::from(val);
        }
        if let Ok(val) = config.get::<usize>("suggestion_limit") {
            settings.suggestion_limit = val;
        }
        if let Ok(val) = config.get::<usize>("top_companies") {
            settings.top_companies = val;
        }
        if let Ok(val) = config.get::<usize>("min_password_len") {
            settings.min_password_len = val;
        }
        Ok(settings)
    }

    fn validate(&self) -> Result<(), ApplicationError> {
        if self.min_password_len < 6 {
            return Err(ApplicationError::Config {
                message: format!(
                    "min_password_len must be at least 6, got {}",
                    self.min_password_len
                ),
            });
        }
        Ok(())
    }

    /// Show the effective configuration as TOML.
    pub fn to_toml(&self) -> Result<String, ApplicationError> {
        toml::to_string_pretty(self).map_err(|e| ApplicationError::Config {
            message: format!("serialize config: {e}"),
        })
    }

    /// Generate a template config file.
    pub fn template() -> String {
        r#"# internhub configuration
#
# Locations (by precedence, lowest to highest):
#   Global: ~/.config/internhub/internhub.toml
#   Env:    INTERNHUB_* environment variables (explicit overrides)

# Load the demo dataset (companies, students, internships, workshops)
# seed_demo_data = true

# Directory for statistics exports given as relative paths
# export_dir = "~/internhub-exports"

# Number of suggested internships shown per student
# suggestion_limit = 5

# Number of companies in the "top companies" statistic
# top_companies = 5

# Minimum password length for new accounts (at least 6)
# min_password_len = 8
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
    fn given_no_config_when_loading_then_uses_defaults() {
        let settings = Settings::load_from(None).expect("load defaults");
        assert_eq!(settings.suggestion_limit, 5);
        assert!(settings.min_password_len >= 6);
    }

    #[test]
    fn given_partial_overlay_when_merging_then_only_given_fields_change() {
        let base = Settings::default();
        let overlay = RawSettings {
            top_companies: Some(10),
            seed_demo_data: Some(false),
            ..RawSettings::default()
        };

        let merged = base.merge_with(&overlay);

        assert_eq!(merged.top_companies, 10);
        assert!(!merged.seed_demo_data);
        assert_eq!(merged.suggestion_limit, base.suggestion_limit);
        assert_eq!(merged.export_dir, base.export_dir);
    }

    #[test]
    fn given_tilde_in_export_dir_when_expand_paths_then_expands_to_home() {
        let mut settings = Settings {
            export_dir: PathBuf::from("~/exports"),
            ..Settings::default()
        };

        settings.expand_paths();

        let home = std::env::var("HOME").expect("HOME should be set");
        assert!(settings.export_dir.to_string_lossy().starts_with(&home));
        assert!(!settings.export_dir.to_string_lossy().contains('~'));
    }

    #[test]
    fn given_template_when_parsed_then_is_valid_toml() {
        let parsed: RawSettings = toml::from_str(&Settings::template()).expect("valid toml");
        assert!(parsed.top_companies.is_none());
    }

    #[test]
    fn given_settings_when_serialized_then_round_trips() {
        let settings = Settings::default();
        let text = settings.to_toml().unwrap();
        let back: Settings = toml::from_str(&text).unwrap();
        assert_eq!(back, settings);
    }
}
