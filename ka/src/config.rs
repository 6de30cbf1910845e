//! kutagent configuration types and loading

use eyre::{Context, Result};
use serde::{Deserialize, Serialize};
use serde_json::Value;
use std::fs;
use std::path::{Path, PathBuf};
use std::time::Duration;

/// Model used when neither config nor environment names one
pub const DEFAULT_MODEL: &str = "qwen3-16k";

/// Local Ollama chat endpoint
pub const DEFAULT_ENDPOINT: &str = "http://localhost:11434/api/chat";

/// Environment variable overriding the model
pub const MODEL_ENV: &str = "OLLAMA_MODEL";

/// Environment variable overriding the endpoint
pub const ENDPOINT_ENV: &str = "OLLAMA_ENDPOINT";

/// Longest accepted run deadline (one day)
pub const MAX_RUN_TIMEOUT_MS: u64 = 24 * 60 * 60 * 1000;

/// Main kutagent configuration
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct Config {
    /// Chat provider configuration
    pub llm: LlmConfig,

    /// Orchestration loop bounds
    pub agent: AgentConfig,

    /// Tool sandbox and timeouts
    pub tools: ToolsConfig,
}

impl Config {
    /// Load configuration with fallback chain
    pub fn load(config_path: Option<&PathBuf>) -> Result<Self> {
        // If explicit config path provided, try to load it
        if let Some(path) = config_path {
            return Self::load_from_file(path).context(format!("Failed to load config from {}", path.display()));
        }

        // Try project-local config: .kutagent.yml
        let local_config = PathBuf::from(".kutagent.yml");
        if local_config.exists() {
            match Self::load_from_file(&local_config) {
                Ok(config) => return Ok(config),
                Err(e) => {
                    tracing::warn!("Failed to load config from {}: {}", local_config.display(), e);
                }
            }
        }

        // Try user config: ~/.config/kutagent/kutagent.yml
        if let Some(config_dir) = dirs::config_dir() {
            let user_config = config_dir.join("kutagent").join("kutagent.yml");
            if user_config.exists() {
                match Self::load_from_file(&user_config) {
                    Ok(config) => return Ok(config),
                    Err(e) => {
                        tracing::warn!("Failed to load config from {}: {}", user_config.display(), e);
                    }
                }
            }
        }

        tracing::info!("No config file found, using defaults");
        Ok(Self::default())
    }

    fn load_from_file<P: AsRef<Path>>(path: P) -> Result<Self> {
        let content = fs::read_to_string(&path).context("Failed to read config file")?;

        let config: Self = serde_yaml::from_str(&content).context("Failed to parse config file")?;

        tracing::info!("Loaded config from: {}", path.as_ref().display());
        Ok(config)
    }

    /// Apply `OLLAMA_MODEL` / `OLLAMA_ENDPOINT` from the process environment
    pub fn with_env_overrides(self) -> Self {
        let model = std::env::var(MODEL_ENV).ok();
        let endpoint = std::env::var(ENDPOINT_ENV).ok();
        self.with_overrides(model, endpoint)
    }

    /// Replace model and endpoint with non-empty overrides
    pub fn with_overrides(mut self, model: Option<String>, endpoint: Option<String>) -> Self {
        if let Some(model) = model.filter(|m| !m.trim().is_empty()) {
            tracing::debug!(%model, "Config::with_overrides: model override");
            self.llm.model = model;
        }
        if let Some(endpoint) = endpoint.filter(|e| !e.trim().is_empty()) {
            tracing::debug!(%endpoint, "Config::with_overrides: endpoint override");
            self.llm.endpoint = endpoint;
        }
        self
    }

    /// Validate configuration before use
    ///
    /// Call this early in startup to fail fast with clear error messages.
    pub fn validate(&self) -> Result<()> {
        if self.llm.model.trim().is_empty() {
            return Err(eyre::eyre!("llm.model must not be empty"));
        }
        reqwest::Url::parse(&self.llm.endpoint)
            .with_context(|| format!("llm.endpoint is not a valid URL: {}", self.llm.endpoint))?;
        if self.agent.max_steps == 0 {
            return Err(eyre::eyre!("agent.max-steps must be at least 1"));
        }
        if self.agent.run_timeout_ms == 0 {
            return Err(eyre::eyre!("agent.run-timeout-ms must be positive"));
        }
        if self.agent.run_timeout_ms > MAX_RUN_TIMEOUT_MS {
            return Err(eyre::eyre!(
                "agent.run-timeout-ms must be at most {} (got {})",
                MAX_RUN_TIMEOUT_MS,
                self.agent.run_timeout_ms
            ));
        }
        if self.tools.shell_timeout_secs == 0 {
            return Err(eyre::eyre!("tools.shell-timeout-secs must be positive"));
        }
        if self.tools.fetch_timeout_secs == 0 {
            return Err(eyre::eyre!("tools.fetch-timeout-secs must be positive"));
        }
        if let Some(options) = &self.llm.options
            && !options.is_object()
        {
            return Err(eyre::eyre!("llm.options must be a mapping"));
        }
        Ok(())
    }

    /// Sandbox root: command line, then config, then the working directory
    pub fn resolve_root(&self, cli_root: Option<&Path>) -> Result<PathBuf> {
        match cli_root.or(self.tools.root.as_deref()) {
            Some(root) => Ok(root.to_path_buf()),
            None => std::env::current_dir().context("Failed to determine working directory"),
        }
    }
}

/// Chat provider configuration
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct LlmConfig {
    /// Model identifier
    pub model: String,

    /// Full URL of the `/api/chat` endpoint
    pub endpoint: String,

    /// Provider options passed through verbatim (temperature, num_ctx, ...)
    #[serde(skip_serializing_if = "Option::is_none")]
    pub options: Option<Value>,
}

impl Default for LlmConfig {
    fn default() -> Self {
        Self {
            model: DEFAULT_MODEL.to_string(),
            endpoint: DEFAULT_ENDPOINT.to_string(),
            options: None,
        }
    }
}

/// Orchestration loop bounds
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct AgentConfig {
    /// Maximum provider calls per run
    #[serde(rename = "max-steps")]
    pub max_steps: u32,

    /// Overall run deadline in milliseconds
    #[serde(rename = "run-timeout-ms")]
    pub run_timeout_ms: u64,
}

impl AgentConfig {
    pub fn run_timeout(&self) -> Duration {
        Duration::from_millis(self.run_timeout_ms)
    }
}

impl Default for AgentConfig {
    fn default() -> Self {
        Self {
            max_steps: 5,
            run_timeout_ms: 60_000,
        }
    }
}

/// Tool sandbox and timeouts
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct ToolsConfig {
    /// Sandbox root for filesystem and shell tools
    #[serde(skip_serializing_if = "Option::is_none")]
    pub root: Option<PathBuf>,

    /// Default run_shell timeout in seconds
    #[serde(rename = "shell-timeout-secs")]
    pub shell_timeout_secs: u64,

    /// Default fetch_url timeout in seconds
    #[serde(rename = "fetch-timeout-secs")]
    pub fetch_timeout_secs: u64,
}

impl Default for ToolsConfig {
    fn default() -> Self {
        Self {
            root: None,
            shell_timeout_secs: 30,
            fetch_timeout_secs: 20,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serial_test::serial;
    use tempfile::tempdir;

    #[test]
    fn test_defaults() {
        let config = Config::default();

        assert_eq!(config.llm.model, "qwen3-16k");
        assert_eq!(config.llm.endpoint, "http://localhost:11434/api/chat");
        assert_eq!(config.agent.max_steps, 5);
        assert_eq!(config.agent.run_timeout(), Duration::from_secs(60));
        assert_eq!(config.tools.shell_timeout_secs, 30);
        assert_eq!(config.tools.fetch_timeout_secs, 20);
        assert!(config.validate().is_ok());
    }

    #[test]
    fn test_partial_yaml_keeps_defaults() {
        let yaml = r#"
llm:
  model: llama3.1
  options:
    temperature: 0.2
agent:
  max-steps: 8
tools:
  root: /srv/project
"#;
        let config: Config = serde_yaml::from_str(yaml).unwrap();

        assert_eq!(config.llm.model, "llama3.1");
        assert_eq!(config.llm.endpoint, DEFAULT_ENDPOINT);
        assert_eq!(config.llm.options.as_ref().unwrap()["temperature"], 0.2);
        assert_eq!(config.agent.max_steps, 8);
        assert_eq!(config.agent.run_timeout_ms, 60_000);
        assert_eq!(config.tools.root, Some(PathBuf::from("/srv/project")));
        assert_eq!(config.tools.shell_timeout_secs, 30);
    }

    #[test]
    fn test_load_explicit_file() {
        let temp = tempdir().unwrap();
        let path = temp.path().join("custom.yml");
        fs::write(&path, "agent:\n  run-timeout-ms: 1500\n").unwrap();

        let config = Config::load(Some(&path)).unwrap();

        assert_eq!(config.agent.run_timeout(), Duration::from_millis(1500));
    }

    #[test]
    fn test_load_explicit_missing_file_fails() {
        let temp = tempdir().unwrap();
        let path = temp.path().join("missing.yml");

        assert!(Config::load(Some(&path)).is_err());
    }

    #[test]
    fn test_overrides() {
        let config = Config::default().with_overrides(Some("mistral".into()), Some("http://gpu:11434/api/chat".into()));

        assert_eq!(config.llm.model, "mistral");
        assert_eq!(config.llm.endpoint, "http://gpu:11434/api/chat");

        let config = Config::default().with_overrides(Some("  ".into()), None);
        assert_eq!(config.llm.model, DEFAULT_MODEL);
    }

    #[test]
    #[serial]
    fn test_env_overrides() {
        // SAFETY: serialized with every other test touching these variables
        unsafe {
            std::env::set_var(MODEL_ENV, "env-model");
            std::env::remove_var(ENDPOINT_ENV);
        }

        let config = Config::default().with_env_overrides();

        unsafe {
            std::env::remove_var(MODEL_ENV);
        }

        assert_eq!(config.llm.model, "env-model");
        assert_eq!(config.llm.endpoint, DEFAULT_ENDPOINT);
    }

    #[test]
    fn test_validate_rejects_bad_values() {
        let mut config = Config::default();
        config.agent.max_steps = 0;
        assert!(config.validate().is_err());

        let mut config = Config::default();
        config.llm.endpoint = "not a url".into();
        assert!(config.validate().is_err());

        let mut config = Config::default();
        config.llm.options = Some(serde_json::json!([1, 2]));
        assert!(config.validate().is_err());
    }

    #[test]
    fn test_validate_rejects_zero_tool_timeouts() {
        let yaml = "tools:\n  shell-timeout-secs: 0\n";
        let config: Config = serde_yaml::from_str(yaml).unwrap();
        let err = config.validate().unwrap_err();
        assert!(err.to_string().contains("shell-timeout-secs"));

        let mut config = Config::default();
        config.tools.fetch_timeout_secs = 0;
        let err = config.validate().unwrap_err();
        assert!(err.to_string().contains("fetch-timeout-secs"));
    }

    #[test]
    fn test_validate_bounds_run_timeout() {
        let mut config = Config::default();
        config.agent.run_timeout_ms = u64::MAX;
        assert!(config.validate().is_err());

        config.agent.run_timeout_ms = MAX_RUN_TIMEOUT_MS;
        assert!(config.validate().is_ok());
    }

    #[test]
    fn test_resolve_root_precedence() {
        let mut config = Config::default();
        config.tools.root = Some(PathBuf::from("/from/config"));

        assert_eq!(
            config.resolve_root(Some(Path::new("/from/cli"))).unwrap(),
            PathBuf::from("/from/cli")
        );
        assert_eq!(config.resolve_root(None).unwrap(), PathBuf::from("/from/config"));

        config.tools.root = None;
        assert_eq!(config.resolve_root(None).unwrap(), std::env::current_dir().unwrap());
    }
}
