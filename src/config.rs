use std::env;
use std::fs;
use std::path::Path;
use std::time::Duration;

use anyhow::{Context, Result, bail};
use log::warn;
use serde::{Deserialize, Serialize};

use crate::error::PLACEHOLDER_API_KEY;

/// Main configuration structure for ideavibe
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Config {
    /// Remote model settings
    #[serde(default)]
    pub model: ModelConfig,

    /// Prompt and response handling
    #[serde(default)]
    pub generation: GenerationConfig,

    /// Terminal display configuration
    #[serde(default)]
    pub ui: UIConfig,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ModelConfig {
    /// Model identifier
    #[serde(default = "default_model_name")]
    pub name: String,

    /// API root, without the `/models/...` suffix
    #[serde(default = "default_base_url")]
    pub base_url: String,

    /// Environment variable holding the API key
    #[serde(default = "default_api_key_env")]
    pub api_key_env: String,

    /// Temperature setting
    pub temperature: Option<f32>,

    /// Upper bound on a single generation request
    #[serde(default = "default_timeout_secs")]
    pub timeout_secs: u64,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct GenerationConfig {
    /// Language the model should answer in; `None` mirrors the user's input
    #[serde(default)]
    pub response_language: Option<String>,

    /// Reject game decks that are not exactly three cards with one unicorn
    #[serde(default = "default_strict_deck")]
    pub strict_deck: bool,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct UIConfig {
    /// Enable colorful output
    #[serde(default = "default_colorful")]
    pub colorful: bool,

    /// Show a spinner while waiting for the model
    #[serde(default = "default_spinner")]
    pub spinner: bool,

    /// Confetti on a win
    #[serde(default = "default_celebration")]
    pub celebration: bool,

    /// Delay between confetti frames
    #[serde(default = "default_celebration_frame_ms")]
    pub celebration_frame_ms: u64,
}

// Default value functions
fn default_model_name() -> String { "gemini-3-pro".to_string() }
fn default_base_url() -> String { "https://generativelanguage.googleapis.com/v1beta".to_string() }
fn default_api_key_env() -> String { "GEMINI_API_KEY".to_string() }
fn default_timeout_secs() -> u64 { 60 }
fn default_strict_deck() -> bool { true }
fn default_colorful() -> bool { true }
fn default_spinner() -> bool { true }
fn default_celebration() -> bool { true }
fn default_celebration_frame_ms() -> u64 { 100 }

impl Default for ModelConfig {
    fn default() -> Self {
        ModelConfig {
            name: default_model_name(),
            base_url: default_base_url(),
            api_key_env: default_api_key_env(),
            temperature: None,
            timeout_secs: default_timeout_secs(),
        }
    }
}

impl Default for GenerationConfig {
    fn default() -> Self {
        GenerationConfig {
            response_language: None,
            strict_deck: default_strict_deck(),
        }
    }
}

impl Default for UIConfig {
    fn default() -> Self {
        UIConfig {
            colorful: default_colorful(),
            spinner: default_spinner(),
            celebration: default_celebration(),
            celebration_frame_ms: default_celebration_frame_ms(),
        }
    }
}

impl Default for Config {
    fn default() -> Self {
        Config {
            model: ModelConfig::default(),
            generation: GenerationConfig::default(),
            ui: UIConfig::default(),
        }
    }
}

impl ModelConfig {
    pub fn timeout(&self) -> Duration {
        Duration::from_secs(self.timeout_secs)
    }

    /// Read the API key from the configured environment variable.
    pub fn api_key(&self) -> Option<String> {
        env::var(&self.api_key_env).ok()
    }
}

impl Config {
    /// Load configuration from a TOML file
    pub fn from_file<P: AsRef<Path>>(path: P) -> Result<Self> {
        let contents = fs::read_to_string(path.as_ref())
            .with_context(|| format!("Failed to read config file: {}", path.as_ref().display()))?;

        Self::from_toml(&contents)
            .with_context(|| format!("Failed to parse config file: {}", path.as_ref().display()))
    }

    pub fn from_toml(contents: &str) -> Result<Self> {
        let config: Self = toml::from_str(contents)?;
        config.validate()?;
        Ok(config)
    }

    fn validate(&self) -> Result<()> {
        if self.model.timeout_secs == 0 {
            bail!("model.timeout_secs must be at least 1");
        }
        if self.ui.celebration_frame_ms == 0 {
            bail!("ui.celebration_frame_ms must be at least 1");
        }
        Ok(())
    }

    /// Load configuration from command line argument or default locations
    pub fn load(config_path: &Option<String>) -> Result<Self> {
        if let Some(path) = config_path {
            let expanded_path = shellexpand::tilde(path);
            return Self::from_file(expanded_path.as_ref());
        }

        let default_paths = [
            "ideavibe.toml",
            ".ideavibe.toml",
            "~/.config/ideavibe/config.toml",
        ];

        for path in default_paths {
            let expanded_path = shellexpand::tilde(path);
            if Path::new(expanded_path.as_ref()).exists() {
                match Self::from_file(expanded_path.as_ref()) {
                    Ok(config) => return Ok(config),
                    Err(e) => warn!("Failed to load config from {}: {:#}", path, e),
                }
            }
        }

        Ok(Self::default())
    }

    /// Merge with command-line arguments and environment (both take precedence over the file)
    pub fn merge_with_args(&mut self, model: Option<String>, plain: bool) {
        if let Ok(env_model) = env::var("IDEAVIBE_MODEL") {
            if !env_model.trim().is_empty() {
                self.model.name = env_model;
            }
        }
        if let Some(model) = model {
            self.model.name = model;
        }
        if plain {
            self.ui.colorful = false;
            self.ui.spinner = false;
            self.ui.celebration = false;
        }
    }
}

/// State of the configured API credential.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum CredentialStatus {
    Present,
    Missing,
    Placeholder,
}

impl CredentialStatus {
    pub fn of(key: Option<&str>) -> Self {
        match key.map(str::trim) {
            None | Some("") => CredentialStatus::Missing,
            Some(PLACEHOLDER_API_KEY) => CredentialStatus::Placeholder,
            Some(_) => CredentialStatus::Present,
        }
    }

    pub fn is_usable(self) -> bool {
        self == CredentialStatus::Present
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_defaults() {
        let config = Config::default();
        assert_eq!(config.model.name, "gemini-3-pro");
        assert_eq!(config.model.api_key_env, "GEMINI_API_KEY");
        assert_eq!(config.model.timeout(), Duration::from_secs(60));
        assert!(config.generation.strict_deck);
        assert!(config.generation.response_language.is_none());
        assert!(config.ui.celebration);
    }

    #[test]
    fn test_partial_toml_fills_defaults() {
        let config = Config::from_toml(
            r#"
            [model]
            name = "gemini-2.5-flash"
            timeout_secs = 15

            [generation]
            response_language = "Estonian"
            "#,
        )
        .unwrap();

        assert_eq!(config.model.name, "gemini-2.5-flash");
        assert_eq!(config.model.timeout_secs, 15);
        assert_eq!(config.model.api_key_env, "GEMINI_API_KEY");
        assert_eq!(config.generation.response_language.as_deref(), Some("Estonian"));
        assert!(config.generation.strict_deck);
        assert_eq!(config.ui, UIConfig::default());
    }

    #[test]
    fn test_empty_toml_is_default() {
        assert_eq!(Config::from_toml("").unwrap(), Config::default());
    }

    #[test]
    fn test_zero_timeout_rejected() {
        let err = Config::from_toml("[model]\ntimeout_secs = 0").unwrap_err();
        assert!(err.to_string().contains("timeout_secs"));
        assert!(Config::from_toml("[model]\ntimeout_secs = 1").is_ok());
    }

    #[test]
    fn test_invalid_toml_is_error() {
        assert!(Config::from_toml("[model\nname = 1").is_err());
    }

    #[test]
    fn test_plain_disables_decorations() {
        let mut config = Config::default();
        config.merge_with_args(Some("custom-model".to_string()), true);
        assert_eq!(config.model.name, "custom-model");
        assert!(!config.ui.colorful);
        assert!(!config.ui.spinner);
        assert!(!config.ui.celebration);
    }

    #[test]
    fn test_credential_status() {
        assert_eq!(CredentialStatus::of(None), CredentialStatus::Missing);
        assert_eq!(CredentialStatus::of(Some("  ")), CredentialStatus::Missing);
        assert_eq!(
            CredentialStatus::of(Some("YOUR_API_KEY_HERE")),
            CredentialStatus::Placeholder
        );
        assert_eq!(CredentialStatus::of(Some("AIza-real")), CredentialStatus::Present);
        assert!(!CredentialStatus::Placeholder.is_usable());
        assert!(CredentialStatus::Present.is_usable());
    }
}
