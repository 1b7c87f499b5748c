//! Load configuration via `config` crate with env-override support.

use std::{ops::Deref, sync::Arc};

use serde::Deserialize;

use crate::base::prompts;

use super::types::Res;

/// Default OpenAI model to use.
fn default_openai_model() -> String {
    "gpt-4".to_string()
}

/// Default sampling temperature for the agent model.
fn default_openai_temperature() -> f32 {
    0.7
}

/// Default max output tokens per completion.
fn default_openai_max_tokens() -> u32 {
    1024
}

/// Default number of turns kept in the agent's sliding-window memory.
fn default_agent_memory_window() -> usize {
    5
}

/// Default prefix directive for the agent instruction frame.
fn default_agent_prefix_directive() -> String {
    prompts::AGENT_PREFIX_DIRECTIVE.to_string()
}

/// Default suffix directive for the agent instruction frame.
fn default_agent_suffix_directive() -> String {
    prompts::AGENT_SUFFIX_DIRECTIVE.to_string()
}

/// Default listen address for the event endpoint.
fn default_listen_address() -> String {
    "0.0.0.0:8080".to_string()
}

/// Configuration for the mention-bot application.
#[derive(Debug, Deserialize, Clone)]
pub struct Config {
    /// Shared inner configuration values.
    pub inner: Arc<ConfigInner>,
}

impl Deref for Config {
    type Target = ConfigInner;

    fn deref(&self) -> &Self::Target {
        &self.inner
    }
}

/// Inner configuration values for the mention-bot application.
#[derive(Debug, Deserialize, Clone, Default)]
pub struct ConfigInner {
    /// OpenAI API key (`OPENAI_API_KEY`).
    pub openai_api_key: String,
    /// OpenAI model to use (`OPENAI_MODEL`).
    #[serde(default = "default_openai_model")]
    pub openai_model: String,
    /// Sampling temperature for the agent model (`OPENAI_TEMPERATURE`).
    /// Value between 0 and 2. Higher values like 0.8 make output more random,
    /// while lower values like 0.2 make it more focused and deterministic.
    #[serde(default = "default_openai_temperature")]
    pub openai_temperature: f32,
    /// Max output tokens per completion (`OPENAI_MAX_TOKENS`).
    #[serde(default = "default_openai_max_tokens")]
    pub openai_max_tokens: u32,
    /// Number of turns kept in the agent's sliding-window memory (`AGENT_MEMORY_WINDOW`).
    #[serde(default = "default_agent_memory_window")]
    pub agent_memory_window: usize,
    /// Optional custom prefix directive to override the default (`AGENT_PREFIX_DIRECTIVE`).
    #[serde(default = "default_agent_prefix_directive")]
    pub agent_prefix_directive: String,
    /// Optional custom suffix directive to override the default (`AGENT_SUFFIX_DIRECTIVE`).
    #[serde(default = "default_agent_suffix_directive")]
    pub agent_suffix_directive: String,
    /// Google Custom Search API key (`GOOGLE_API_KEY`).
    pub google_api_key: String,
    /// Google Custom Search engine ID (`GOOGLE_CSE_ID`).
    pub google_cse_id: String,
    /// Slack bot token (`SLACK_BOT_TOKEN`).
    pub slack_bot_token: String,
    /// Database endpoint URL (`DB_ENDPOINT`), e.g. `ws://localhost:8000` or `mem://`.
    pub db_endpoint: String,
    /// Database username (`DB_USERNAME`); sign-in is skipped when absent.
    #[serde(default)]
    pub db_username: Option<String>,
    /// Database password (`DB_PASSWORD`); sign-in is skipped when absent.
    #[serde(default)]
    pub db_password: Option<String>,
    /// Address the event endpoint binds to (`LISTEN_ADDRESS`).
    #[serde(default = "default_listen_address")]
    pub listen_address: String,
}

impl Config {
    /// Load configuration from the environment and an optional TOML file.
    pub fn load(explicit_path: Option<&std::path::Path>) -> Res<Self> {
        let mut cfg = config::Config::builder().add_source(config::Environment::default());

        if let Some(p) = explicit_path {
            cfg = cfg.add_source(config::File::from(p.to_path_buf()));
        } else if std::path::Path::new(".hidden/config.toml").exists() {
            cfg = cfg.add_source(config::File::with_name(".hidden/config.toml"));
        }

        let result = Config {
            inner: Arc::new(cfg.build()?.try_deserialize()?),
        };

        if result.openai_temperature < 0.0 || result.openai_temperature > 2.0 {
            return Err(anyhow::anyhow!("OpenAI temperature must be between 0 and 2."));
        }

        if result.openai_max_tokens < 1 || result.openai_max_tokens > 128000 {
            return Err(anyhow::anyhow!("OpenAI max tokens must be between 1 and 128000."));
        }

        if result.agent_memory_window < 1 {
            return Err(anyhow::anyhow!("Agent memory window must be at least 1 turn."));
        }

        Ok(result)
    }
}
