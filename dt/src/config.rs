//! Deeptok configuration types and loading

use eyre::{Context, Result};
use serde::{Deserialize, Serialize};
use std::fs;
use std::path::{Path, PathBuf};

/// Default model when nothing is configured
pub const DEFAULT_MODEL: &str = "deepseek-r1:1.5b";

/// Default generation temperature
pub const DEFAULT_TEMPERATURE: f32 = 0.7;

/// Main Deeptok configuration
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(default)]
pub struct Config {
    /// Log level (TRACE, DEBUG, INFO, WARN, ERROR)
    #[serde(rename = "log-level")]
    pub log_level: Option<String>,

    /// Inference runtime configuration
    pub llm: LlmConfig,

    /// Chat behavior
    pub chat: ChatConfig,

    /// Contents of the developer panel
    pub about: AboutConfig,
}

impl Config {
    /// Validate configuration before use
    ///
    /// Call this early in startup to fail fast with clear error messages.
    pub fn validate(&self) -> Result<()> {
        if self.llm.provider != "ollama" {
            return Err(eyre::eyre!(
                "Unsupported LLM provider '{}'. Supported: ollama",
                self.llm.provider
            ));
        }
        if self.llm.model.trim().is_empty() {
            return Err(eyre::eyre!("llm.model must not be empty"));
        }
        if !(0.0..=1.0).contains(&self.llm.temperature) {
            return Err(eyre::eyre!(
                "llm.temperature must be between 0.0 and 1.0, got {}",
                self.llm.temperature
            ));
        }
        Ok(())
    }

    /// Load configuration with fallback chain
    pub fn load(config_path: Option<&PathBuf>) -> Result<Self> {
        // If explicit config path provided, try to load it
        if let Some(path) = config_path {
            return Self::load_from_file(path).context(format!("Failed to load config from {}", path.display()));
        }

        // Try project-local config: .deeptok.yml
        let local_config = PathBuf::from(".deeptok.yml");
        if local_config.exists() {
            match Self::load_from_file(&local_config) {
                Ok(config) => return Ok(config),
                Err(e) => {
                    tracing::warn!("Failed to load config from {}: {}", local_config.display(), e);
                }
            }
        }

        // Try user config: ~/.config/deeptok/deeptok.yml
        if let Some(user_config) = Self::user_config_path()
            && user_config.exists()
        {
            match Self::load_from_file(&user_config) {
                Ok(config) => return Ok(config),
                Err(e) => {
                    tracing::warn!("Failed to load config from {}: {}", user_config.display(), e);
                }
            }
        }

        // No config file found, use defaults
        tracing::info!("No config file found, using defaults");
        Ok(Self::default())
    }

    /// Read only the log level, before logging is initialized
    ///
    /// Errors are swallowed here; the full load reports them later.
    pub fn load_log_level(config_path: Option<&PathBuf>) -> Option<String> {
        let candidates = match config_path {
            Some(path) => vec![path.clone()],
            None => {
                let mut paths = vec![PathBuf::from(".deeptok.yml")];
                paths.extend(Self::user_config_path());
                paths
            }
        };

        candidates
            .into_iter()
            .find(|p| p.exists())
            .and_then(|p| fs::read_to_string(p).ok())
            .and_then(|content| serde_yaml::from_str::<Self>(&content).ok())
            .and_then(|config| config.log_level)
    }

    fn user_config_path() -> Option<PathBuf> {
        dirs::config_dir().map(|d| d.join("deeptok").join("deeptok.yml"))
    }

    fn load_from_file<P: AsRef<Path>>(path: P) -> Result<Self> {
        let content = fs::read_to_string(&path).context("Failed to read config file")?;

        let config: Self = serde_yaml::from_str(&content).context("Failed to parse config file")?;

        tracing::info!("Loaded config from: {}", path.as_ref().display());
        Ok(config)
    }
}

/// Inference runtime configuration
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct LlmConfig {
    /// Provider name (currently only "ollama" supported)
    pub provider: String,

    /// Model identifier as known to the runtime
    pub model: String,

    /// Runtime base URL
    #[serde(rename = "base-url")]
    pub base_url: String,

    /// Generation temperature, 0.0 to 1.0
    pub temperature: f32,

    /// Request timeout in milliseconds
    #[serde(rename = "timeout-ms")]
    pub timeout_ms: u64,

    /// Read incremental output and show it while the answer is produced
    pub stream: bool,

    /// Runtime tuning passed through to the model
    pub options: RuntimeOptions,
}

impl Default for LlmConfig {
    fn default() -> Self {
        Self {
            provider: "ollama".to_string(),
            model: DEFAULT_MODEL.to_string(),
            base_url: "http://localhost:11434".to_string(),
            temperature: DEFAULT_TEMPERATURE,
            timeout_ms: 300_000,
            stream: true,
            options: RuntimeOptions::default(),
        }
    }
}

/// Runtime tuning options; unset values are left to the runtime
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct RuntimeOptions {
    /// Offload to GPU when available
    pub gpu: Option<bool>,

    /// CPU thread count
    pub threads: Option<u32>,

    /// Memory-map model weights
    pub mmap: Option<bool>,
}

/// Chat behavior
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(default)]
pub struct ChatConfig {
    /// Replace the embedded system prompt with this file
    #[serde(rename = "system-prompt-file")]
    pub system_prompt_file: Option<PathBuf>,
}

/// Developer panel contents
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct AboutConfig {
    pub developer: String,
    pub contact: String,
}

impl Default for AboutConfig {
    fn default() -> Self {
        Self {
            developer: "홍길동".to_string(),
            contact: "developer@example.com".to_string(),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::TempDir;

    #[test]
    fn test_default_config() {
        let config = Config::default();

        assert_eq!(config.llm.provider, "ollama");
        assert_eq!(config.llm.model, "deepseek-r1:1.5b");
        assert_eq!(config.llm.temperature, 0.7);
        assert!(config.llm.stream);
        assert!(config.log_level.is_none());
        assert!(config.validate().is_ok());
    }

    #[test]
    fn test_deserialize_config() {
        let yaml = r#"
log-level: debug
llm:
  provider: ollama
  model: deepseek-r1:32b
  base-url: http://gpu-box:11434
  temperature: 0.3
  timeout-ms: 60000
  stream: false
  options:
    gpu: true
    threads: 8
    mmap: true
chat:
  system-prompt-file: /etc/deeptok/system.pmt
about:
  developer: Kim
  contact: kim@example.com
"#;

        let config: Config = serde_yaml::from_str(yaml).unwrap();

        assert_eq!(config.log_level.as_deref(), Some("debug"));
        assert_eq!(config.llm.model, "deepseek-r1:32b");
        assert_eq!(config.llm.base_url, "http://gpu-box:11434");
        assert_eq!(config.llm.temperature, 0.3);
        assert_eq!(config.llm.timeout_ms, 60000);
        assert!(!config.llm.stream);
        assert_eq!(config.llm.options.threads, Some(8));
        assert_eq!(config.llm.options.gpu, Some(true));
        assert_eq!(
            config.chat.system_prompt_file,
            Some(PathBuf::from("/etc/deeptok/system.pmt"))
        );
        assert_eq!(config.about.developer, "Kim");
    }

    #[test]
    fn test_partial_config_uses_defaults() {
        let yaml = r#"
llm:
  model: llama3
"#;

        let config: Config = serde_yaml::from_str(yaml).unwrap();

        // Specified value
        assert_eq!(config.llm.model, "llama3");

        // Defaults for unspecified
        assert_eq!(config.llm.provider, "ollama");
        assert_eq!(config.llm.temperature, 0.7);
        assert_eq!(config.llm.options, RuntimeOptions::default());
        assert_eq!(config.about.contact, "developer@example.com");
    }

    #[test]
    fn test_validate_rejects_bad_values() {
        let mut config = Config::default();
        config.llm.temperature = 1.5;
        assert!(config.validate().is_err());

        let mut config = Config::default();
        config.llm.model = "  ".to_string();
        assert!(config.validate().is_err());

        let mut config = Config::default();
        config.llm.provider = "anthropic".to_string();
        assert!(config.validate().is_err());
    }

    #[test]
    fn test_load_explicit_path() {
        let dir = TempDir::new().unwrap();
        let path = dir.path().join("deeptok.yml");
        fs::write(&path, "log-level: warn\nllm:\n  temperature: 0.9\n").unwrap();

        let config = Config::load(Some(&path)).unwrap();
        assert_eq!(config.llm.temperature, 0.9);
        assert_eq!(Config::load_log_level(Some(&path)).as_deref(), Some("warn"));
    }

    #[test]
    fn test_load_explicit_missing_path_fails() {
        let dir = TempDir::new().unwrap();
        let path = dir.path().join("missing.yml");
        assert!(Config::load(Some(&path)).is_err());
        assert!(Config::load_log_level(Some(&path)).is_none());
    }
}
