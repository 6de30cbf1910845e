//! Loop configuration

use serde_json::Value;
use std::time::Duration;

use crate::config::{Config, DEFAULT_MODEL};

/// Parameters of one orchestration loop
#[derive(Debug, Clone, PartialEq)]
pub struct LoopConfig {
    /// Model named in every request
    pub model: String,

    /// Maximum provider calls per run
    pub max_steps: u32,

    /// Deadline applied to runs whose caller supplies none
    pub run_timeout: Duration,

    /// Provider options sent with every request
    pub options: Option<Value>,
}

impl Default for LoopConfig {
    fn default() -> Self {
        Self {
            model: DEFAULT_MODEL.to_string(),
            max_steps: 5,
            run_timeout: Duration::from_secs(60),
            options: None,
        }
    }
}

impl From<&Config> for LoopConfig {
    fn from(config: &Config) -> Self {
        Self {
            model: config.llm.model.clone(),
            max_steps: config.agent.max_steps,
            run_timeout: config.agent.run_timeout(),
            options: config.llm.options.clone(),
        }
    }
}
