//! Configuration module
//!
//! Handles finding, loading and managing configuration.

#![allow(dead_code)]

pub mod env;

use anyhow::{Context, Result};
use serde::{Deserialize, Serialize};
use std::path::{Path, PathBuf};

pub use env::EnvConfig;

/// Configuration file locations in the working directory (in order of precedence)
const LOCAL_CONFIG_LOCATIONS: &[&str] = &["./sitetest.yaml", "./sitetest.yml", "./.sitetest.yaml"];

/// Application configuration
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct AppConfig {
    /// Version of config file format
    pub version: String,

    /// Log level (trace, debug, info, warn, error)
    pub log_level: String,

    /// Default output format
    pub output_format: String,

    /// Execution engine settings
    pub execution: ExecutionConfig,

    /// Simulated executor settings
    pub simulation: SimulationConfig,

    /// Test case generation settings
    pub generation: GenerationConfig,
}

impl Default for AppConfig {
    fn default() -> Self {
        Self {
            version: "1.0".to_string(),
            log_level: "info".to_string(),
            output_format: "table".to_string(),
            execution: ExecutionConfig::default(),
            simulation: SimulationConfig::default(),
            generation: GenerationConfig::default(),
        }
    }
}

impl AppConfig {
    /// Find configuration file in standard locations
    pub fn find() -> Option<PathBuf> {
        LOCAL_CONFIG_LOCATIONS
            .iter()
            .map(PathBuf::from)
            .chain(user_config_path())
            .find(|path| path.exists())
    }

    /// Load configuration from the first location found, or defaults
    pub fn load_default() -> Result<Self> {
        match Self::find() {
            Some(path) => Self::load(&path),
            None => Ok(Self::default()),
        }
    }

    /// Resolve configuration: explicit path, then `SITETEST_CONFIG`, then
    /// standard locations; environment overrides are applied last
    pub fn resolve(explicit: Option<&Path>) -> Result<Self> {
        let env = EnvConfig::load();

        let mut config = match explicit
            .map(Path::to_path_buf)
            .or_else(|| env.config_file.as_ref().map(PathBuf::from))
        {
            Some(path) => Self::load(&path)?,
            None => Self::load_default()?,
        };

        config.apply_env(&env);
        config.validate()?;
        Ok(config)
    }

    /// Load configuration from file
    pub fn load(path: impl AsRef<Path>) -> Result<Self> {
        let path = path.as_ref();
        let content = std::fs::read_to_string(path)
            .with_context(|| format!("Failed to read config file: {}", path.display()))?;

        let config: Self = if is_yaml_file(path) {
            serde_yaml::from_str(&content)
                .with_context(|| format!("Failed to parse YAML config: {}", path.display()))?
        } else {
            serde_json::from_str(&content)
                .with_context(|| format!("Failed to parse JSON config: {}", path.display()))?
        };

        config.validate()?;
        Ok(config)
    }

    /// Save configuration to file
    pub fn save(&self, path: impl AsRef<Path>) -> Result<()> {
        let path = path.as_ref();
        let content = if is_yaml_file(path) {
            serde_yaml::to_string(self).context("Failed to serialize config")?
        } else {
            serde_json::to_string_pretty(self).context("Failed to serialize config")?
        };

        if let Some(parent) = path.parent().filter(|p| !p.as_os_str().is_empty()) {
            std::fs::create_dir_all(parent)
                .with_context(|| format!("Failed to create directory: {}", parent.display()))?;
        }

        std::fs::write(path, content)
            .with_context(|| format!("Failed to write config file: {}", path.display()))?;

        Ok(())
    }

    /// Validate configuration
    pub fn validate(&self) -> Result<()> {
        if !["1.0"].contains(&self.version.as_str()) {
            anyhow::bail!("Unsupported config version: {}", self.version);
        }

        let p = self.simulation.pass_probability;
        if !(0.0..=1.0).contains(&p) {
            anyhow::bail!("simulation.pass_probability must be within 0.0-1.0, got {p}");
        }

        if self.execution.timeout_secs == Some(0) {
            anyhow::bail!("execution.timeout_secs must be greater than zero");
        }

        if self.generation.base_url.trim().is_empty() {
            anyhow::bail!("generation.base_url must not be empty");
        }

        Ok(())
    }

    /// Apply environment variable overrides
    pub fn apply_env(&mut self, env: &EnvConfig) {
        if let Some(level) = &env.log_level {
            self.log_level = level.clone();
        }
        if let Some(format) = &env.format {
            self.output_format = format.clone();
        }
        if let Some(timeout) = env.timeout {
            self.execution.timeout_secs = Some(timeout);
        }
        if let Some(p) = env.pass_probability {
            self.simulation.pass_probability = p;
        }
        if let Some(base_url) = &env.base_url {
            self.generation.base_url = base_url.clone();
        }
        if let Some(model) = &env.model {
            self.generation.model = model.clone();
        }
        if let Some(key) = &env.api_key {
            self.generation.api_key = Some(key.clone());
        }
    }
}

/// Execution engine settings
#[derive(Clone, Debug, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct ExecutionConfig {
    /// Per test case timeout in seconds; unbounded when unset
    pub timeout_secs: Option<u64>,
}

/// Simulated executor settings
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct SimulationConfig {
    /// Minimum simulated latency
    pub base_delay_ms: u64,

    /// Additional random latency, uniformly distributed
    pub jitter_ms: u64,

    /// Chance that a simulated test passes
    pub pass_probability: f64,
}

impl Default for SimulationConfig {
    fn default() -> Self {
        Self {
            base_delay_ms: 700,
            jitter_ms: 500,
            pass_probability: 0.7,
        }
    }
}

/// Test case generation settings
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct GenerationConfig {
    /// OpenAI-compatible API base URL
    pub base_url: String,

    /// Model name
    pub model: String,

    /// API key; may be omitted for local providers
    #[serde(skip_serializing_if = "Option::is_none")]
    pub api_key: Option<String>,

    /// Request timeout in seconds
    pub timeout_secs: u64,

    /// Maximum tokens in the completion
    pub max_tokens: u32,
}

impl Default for GenerationConfig {
    fn default() -> Self {
        Self {
            base_url: "https://api.openai.com/v1".to_string(),
            model: "gpt-4o-mini".to_string(),
            api_key: None,
            timeout_secs: 60,
            max_tokens: 4096,
        }
    }
}

fn user_config_path() -> Option<PathBuf> {
    dirs::config_dir().map(|dir| dir.join("sitetest").join("config.yaml"))
}

fn is_yaml_file(path: &Path) -> bool {
    path.extension()
        .map(|e| e == "yaml" || e == "yml")
        .unwrap_or(false)
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::tempdir;

    #[test]
    fn test_default_config() {
        let config = AppConfig::default();
        assert_eq!(config.log_level, "info");
        assert_eq!(config.simulation.pass_probability, 0.7);
        assert!(config.execution.timeout_secs.is_none());
        assert!(config.validate().is_ok());
    }

    #[test]
    fn test_partial_yaml_uses_defaults() {
        let dir = tempdir().unwrap();
        let path = dir.path().join("sitetest.yaml");
        std::fs::write(
            &path,
            "simulation:\n  pass_probability: 0.5\ngeneration:\n  model: llama3\n",
        )
        .unwrap();

        let config = AppConfig::load(&path).unwrap();
        assert_eq!(config.simulation.pass_probability, 0.5);
        assert_eq!(config.simulation.base_delay_ms, 700);
        assert_eq!(config.generation.model, "llama3");
        assert_eq!(config.generation.base_url, "https://api.openai.com/v1");
    }

    #[test]
    fn test_save_and_load_json() {
        let dir = tempdir().unwrap();
        let path = dir.path().join("nested").join("config.json");

        let mut config = AppConfig::default();
        config.execution.timeout_secs = Some(15);
        config.save(&path).unwrap();

        let loaded = AppConfig::load(&path).unwrap();
        assert_eq!(loaded, config);
    }

    #[test]
    fn test_invalid_probability_rejected() {
        let mut config = AppConfig::default();
        config.simulation.pass_probability = 1.5;
        assert!(config.validate().is_err());
    }

    #[test]
    fn test_apply_env_overrides() {
        let mut config = AppConfig::default();
        let env = EnvConfig {
            model: Some("gpt-4o".to_string()),
            timeout: Some(5),
            api_key: Some("sk-test".to_string()),
            ..Default::default()
        };

        config.apply_env(&env);
        assert_eq!(config.generation.model, "gpt-4o");
        assert_eq!(config.execution.timeout_secs, Some(5));
        assert_eq!(config.generation.api_key.as_deref(), Some("sk-test"));
        assert_eq!(config.log_level, "info");
    }
}
