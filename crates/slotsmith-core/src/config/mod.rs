//! Configuration management with file persistence
//!
//! Endpoints, models and generation parameters live in a TOML file. API keys
//! never do: they are read from the environment only.

use anyhow::{Context, anyhow};
use serde::{Deserialize, Serialize};
use std::env;
use std::fs;
use std::path::{Path, PathBuf};

/// Environment variables consulted for the compression API key, in order
pub const COMPRESSION_KEY_VARS: [&str; 2] = ["SLOTSMITH_COMPRESSION_KEY", "SCALEDOWN_API_KEY"];

/// Environment variables consulted for the generation API key, in order
pub const GENERATION_KEY_VARS: [&str; 2] = ["SLOTSMITH_GENERATION_KEY", "GEMINI_API_KEY"];

/// Slotsmith configuration
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Config {
    pub services: ServicesConfig,
    pub compression: CompressionConfig,
    pub generation: GenerationConfig,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ServicesConfig {
    /// Remote orchestration backend (POST `<backend_url>/optimize`)
    pub backend_url: String,
    /// Context compression endpoint
    pub compression_url: String,
    /// Base URL of the generation API (`<base>/models/<model>:generateContent`)
    pub generation_base_url: String,
    /// Transport timeout applied to every request
    pub timeout_secs: u64,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct CompressionConfig {
    /// Model the compressed prompt is tuned for
    pub target_model: String,
    /// Compression rate hint
    pub rate: String,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct GenerationConfig {
    pub default_model: String,
    pub temperature: f32,
    pub max_output_tokens: u32,
    /// Zero disables extended reasoning
    pub thinking_budget: u32,
}

impl Default for Config {
    fn default() -> Self {
        Self {
            services: ServicesConfig {
                backend_url: "http://127.0.0.1:8000".to_string(),
                compression_url: "https://api.scaledown.xyz/compress/raw/".to_string(),
                generation_base_url: "https://generativelanguage.googleapis.com/v1beta"
                    .to_string(),
                timeout_secs: 60,
            },
            compression: CompressionConfig {
                target_model: "gpt-4o".to_string(),
                rate: "auto".to_string(),
            },
            generation: GenerationConfig {
                default_model: "gemini-2.0-flash".to_string(),
                temperature: 0.7,
                max_output_tokens: 8192,
                thinking_budget: 0,
            },
        }
    }
}

/// First non-empty value among the given environment variables
fn first_env(vars: &[&str]) -> Option<String> {
    vars.iter()
        .filter_map(|var| env::var(var).ok())
        .map(|value| value.trim().to_string())
        .find(|value| !value.is_empty())
}

fn redact(key: &str) -> String {
    let count = key.chars().count();
    if count <= 4 {
        "***".to_string()
    } else {
        let suffix: String = key.chars().skip(count - 4).collect();
        format!("***{}", suffix)
    }
}

/// Compression API key from the environment
pub fn compression_api_key() -> Option<String> {
    first_env(&COMPRESSION_KEY_VARS)
}

/// Generation API key from the environment
pub fn generation_api_key() -> Option<String> {
    first_env(&GENERATION_KEY_VARS)
}

impl Config {
    /// Get the config directory path
    pub fn config_dir() -> anyhow::Result<PathBuf> {
        let dir = if let Ok(custom_dir) = env::var("SLOTSMITH_CONFIG_DIR") {
            PathBuf::from(custom_dir)
        } else {
            dirs::config_dir()
                .ok_or_else(|| anyhow!("Could not determine config directory"))?
                .join("slotsmith")
        };
        Ok(dir)
    }

    /// Get the config file path
    pub fn config_path() -> anyhow::Result<PathBuf> {
        Ok(Self::config_dir()?.join("config.toml"))
    }

    /// Load configuration from file, or defaults if it doesn't exist
    pub fn load() -> anyhow::Result<Self> {
        Self::load_from(&Self::config_path()?)
    }

    /// Load configuration from a specific file, or defaults if it doesn't exist
    pub fn load_from(path: &Path) -> anyhow::Result<Self> {
        if path.exists() {
            let contents = fs::read_to_string(path)
                .with_context(|| format!("Failed to read config file: {}", path.display()))?;
            Self::from_toml(&contents)
                .with_context(|| format!("Failed to parse config file: {}", path.display()))
        } else {
            Ok(Config::default())
        }
    }

    /// Parse and validate configuration text
    pub fn from_toml(contents: &str) -> anyhow::Result<Self> {
        let raw: toml::Value = toml::from_str(contents)?;
        reject_stored_keys(&raw)?;
        let config: Config = raw.try_into()?;
        config.validate()?;
        Ok(config)
    }

    /// Save configuration to file
    pub fn save(&self) -> anyhow::Result<()> {
        self.save_to(&Self::config_path()?)
    }

    /// Save configuration to a specific file, creating parent directories
    pub fn save_to(&self, path: &Path) -> anyhow::Result<()> {
        self.validate()?;

        if let Some(dir) = path.parent() {
            fs::create_dir_all(dir)
                .with_context(|| format!("Failed to create config directory: {}", dir.display()))?;
        }

        let contents = toml::to_string_pretty(self).context("Failed to serialize config")?;
        fs::write(path, contents)
            .with_context(|| format!("Failed to write config file: {}", path.display()))?;

        Ok(())
    }

    /// Apply `SLOTSMITH_*_URL` endpoint overrides from the environment.
    ///
    /// Not persisted; call after [`Config::load`] for the effective settings.
    pub fn with_env_overrides(mut self) -> Self {
        if let Some(url) = first_env(&["SLOTSMITH_BACKEND_URL"]) {
            self.services.backend_url = url;
        }
        if let Some(url) = first_env(&["SLOTSMITH_COMPRESSION_URL"]) {
            self.services.compression_url = url;
        }
        if let Some(url) = first_env(&["SLOTSMITH_GENERATION_URL"]) {
            self.services.generation_base_url = url;
        }
        self
    }

    /// Validate configuration
    pub fn validate(&self) -> anyhow::Result<()> {
        for (key, url) in [
            ("services.backend_url", &self.services.backend_url),
            ("services.compression_url", &self.services.compression_url),
            ("services.generation_base_url", &self.services.generation_base_url),
        ] {
            validate_url(key, url)?;
        }
        if !(0.0..=2.0).contains(&self.generation.temperature) {
            return Err(anyhow!("Temperature must be between 0.0 and 2.0"));
        }
        if self.generation.max_output_tokens == 0 {
            return Err(anyhow!("generation.max_output_tokens must be positive"));
        }
        if self.generation.default_model.trim().is_empty() {
            return Err(anyhow!("generation.default_model must not be empty"));
        }
        Ok(())
    }

    /// Get a configuration value by key
    pub fn get(&self, key: &str) -> anyhow::Result<String> {
        match key {
            "services.backend_url" => Ok(self.services.backend_url.clone()),
            "services.compression_url" => Ok(self.services.compression_url.clone()),
            "services.generation_base_url" => Ok(self.services.generation_base_url.clone()),
            "services.timeout_secs" => Ok(self.services.timeout_secs.to_string()),

            "compression.target_model" => Ok(self.compression.target_model.clone()),
            "compression.rate" => Ok(self.compression.rate.clone()),

            "generation.default_model" => Ok(self.generation.default_model.clone()),
            "generation.temperature" => Ok(self.generation.temperature.to_string()),
            "generation.max_output_tokens" => Ok(self.generation.max_output_tokens.to_string()),
            "generation.thinking_budget" => Ok(self.generation.thinking_budget.to_string()),

            // API keys (special handling - show redacted)
            "compression.api_key" => Ok(compression_api_key()
                .map(|key| redact(&key))
                .unwrap_or_else(|| {
                    format!("(not set - use {} env var)", COMPRESSION_KEY_VARS.join(" or "))
                })),
            "generation.api_key" => Ok(generation_api_key()
                .map(|key| redact(&key))
                .unwrap_or_else(|| {
                    format!("(not set - use {} env var)", GENERATION_KEY_VARS.join(" or "))
                })),

            _ => Err(anyhow!(
                "Unknown configuration key: {}. Use `slotsmith config list` to see available keys.",
                key
            )),
        }
    }

    /// Set a configuration value by key
    pub fn set(&mut self, key: &str, value: &str) -> anyhow::Result<()> {
        match key {
            "services.backend_url" => {
                validate_url(key, value)?;
                self.services.backend_url = value.trim_end_matches('/').to_string();
            }
            "services.compression_url" => {
                validate_url(key, value)?;
                self.services.compression_url = value.to_string();
            }
            "services.generation_base_url" => {
                validate_url(key, value)?;
                self.services.generation_base_url = value.trim_end_matches('/').to_string();
            }
            "services.timeout_secs" => {
                let secs: u64 = value
                    .parse()
                    .with_context(|| format!("Invalid timeout_secs value: {}", value))?;
                if secs == 0 {
                    return Err(anyhow!("Timeout must be at least 1 second"));
                }
                self.services.timeout_secs = secs;
            }

            "compression.target_model" => {
                self.compression.target_model = value.to_string();
            }
            "compression.rate" => {
                self.compression.rate = value.to_string();
            }

            "generation.default_model" => {
                if value.trim().is_empty() {
                    return Err(anyhow!("Model ID must not be empty"));
                }
                self.generation.default_model = value.trim().to_string();
            }
            "generation.temperature" => {
                let temp: f32 = value
                    .parse()
                    .with_context(|| format!("Invalid temperature value: {}", value))?;
                if !(0.0..=2.0).contains(&temp) {
                    return Err(anyhow!("Temperature must be between 0.0 and 2.0"));
                }
                self.generation.temperature = temp;
            }
            "generation.max_output_tokens" => {
                let tokens: u32 = value
                    .parse()
                    .with_context(|| format!("Invalid max_output_tokens value: {}", value))?;
                if tokens == 0 {
                    return Err(anyhow!("max_output_tokens must be positive"));
                }
                self.generation.max_output_tokens = tokens;
            }
            "generation.thinking_budget" => {
                self.generation.thinking_budget = value
                    .parse()
                    .with_context(|| format!("Invalid thinking_budget value: {}", value))?;
            }

            // API keys cannot be set via config
            "compression.api_key" | "generation.api_key" | "api_key" => {
                return Err(anyhow!(
                    "API keys cannot be stored in configuration for security. \
                     Set {} or {} instead.",
                    COMPRESSION_KEY_VARS.join("/"),
                    GENERATION_KEY_VARS.join("/")
                ));
            }

            _ => {
                return Err(anyhow!(
                    "Unknown configuration key: {}. Use `slotsmith config list` to see available keys.",
                    key
                ));
            }
        }
        Ok(())
    }

    /// List all configuration keys and their values
    pub fn list(&self) -> anyhow::Result<Vec<(String, String)>> {
        let keys = [
            "services.backend_url",
            "services.compression_url",
            "services.generation_base_url",
            "services.timeout_secs",
            "compression.target_model",
            "compression.rate",
            "compression.api_key",
            "generation.default_model",
            "generation.temperature",
            "generation.max_output_tokens",
            "generation.thinking_budget",
            "generation.api_key",
        ];

        keys.into_iter()
            .map(|key| {
                let value = self.get(key)?;
                Ok((key.to_string(), value))
            })
            .collect()
    }

    /// Reset configuration to defaults
    pub fn reset() -> anyhow::Result<()> {
        let path = Self::config_path()?;
        if path.exists() {
            fs::remove_file(&path)
                .with_context(|| format!("Failed to remove config file: {}", path.display()))?;
        }
        Ok(())
    }
}

fn validate_url(key: &str, url: &str) -> anyhow::Result<()> {
    if url.starts_with("http://") || url.starts_with("https://") {
        Ok(())
    } else {
        Err(anyhow!("{} must be an http(s) URL, got '{}'", key, url))
    }
}

fn reject_stored_keys(value: &toml::Value) -> anyhow::Result<()> {
    if let toml::Value::Table(table) = value {
        for (name, nested) in table {
            if name.ends_with("api_key") {
                return Err(anyhow!(
                    "API keys must be provided via environment variables, not stored in configuration"
                ));
            }
            reject_stored_keys(nested)?;
        }
    }
    Ok(())
}
