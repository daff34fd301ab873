use anyhow::{Context, Result, anyhow};
use directories::ProjectDirs;
use serde::Deserialize;
use std::{env, fs, path::PathBuf};

/// Environment variable holding the weather API credential.
pub const WEATHER_KEY_VAR: &str = "OPENWEATHER_API_KEY";

/// Environment variable holding the language-model credential.
pub const LLM_KEY_VAR: &str = "OPENAI_API_KEY";

fn default_model() -> String {
    "gpt-3.5-turbo".to_string()
}

const fn default_temperature() -> f64 {
    0.2
}

const fn default_max_tool_rounds() -> usize {
    8
}

/// Runtime configuration, constructed once at startup and passed by
/// reference to the components that need it.
#[derive(Debug, Clone, Deserialize)]
pub struct Config {
    /// Weather API key. A missing key is tolerated here: the lookup then
    /// fails with an authentication error from the service itself.
    pub weather_api_key: Option<String>,

    /// Language-model API key, same tolerance as above.
    pub llm_api_key: Option<String>,

    /// Chat-completion model identifier. Fixed configuration, never exposed
    /// on the CLI.
    #[serde(default = "default_model")]
    pub model: String,

    /// Sampling temperature for all model calls.
    #[serde(default = "default_temperature")]
    pub temperature: f64,

    /// Upper bound on tool rounds within a single exchange.
    #[serde(default = "default_max_tool_rounds")]
    pub max_tool_rounds: usize,
}

impl Default for Config {
    fn default() -> Self {
        Self {
            weather_api_key: None,
            llm_api_key: None,
            model: default_model(),
            temperature: default_temperature(),
            max_tool_rounds: default_max_tool_rounds(),
        }
    }
}

impl Config {
    /// Load config from disk if a file exists, then apply credential
    /// overrides from the environment.
    pub fn load() -> Result<Self> {
        let mut cfg = Self::load_file()?;
        cfg.apply_env(env::var(WEATHER_KEY_VAR).ok(), env::var(LLM_KEY_VAR).ok());

        if cfg.weather_api_key.is_none() {
            tracing::warn!("{WEATHER_KEY_VAR} not set; weather lookups will fail");
        }
        if cfg.llm_api_key.is_none() {
            tracing::warn!("{LLM_KEY_VAR} not set; model calls will fail");
        }

        Ok(cfg)
    }

    fn load_file() -> Result<Self> {
        let path = Self::config_file_path()?;
        if !path.exists() {
            // First run: no config file, use defaults.
            return Ok(Self::default());
        }

        let contents = fs::read_to_string(&path)
            .with_context(|| format!("Failed to read config file: {}", path.display()))?;

        let cfg: Config = toml::from_str(&contents)
            .with_context(|| format!("Failed to parse config file: {}", path.display()))?;

        Ok(cfg)
    }

    /// Environment credentials take precedence over file values.
    fn apply_env(&mut self, weather_key: Option<String>, llm_key: Option<String>) {
        if weather_key.is_some() {
            self.weather_api_key = weather_key;
        }
        if llm_key.is_some() {
            self.llm_api_key = llm_key;
        }
    }

    /// Path to the config file.
    pub fn config_file_path() -> Result<PathBuf> {
        let dirs = ProjectDirs::from("dev", "weather-assistant", "assistant-cli")
            .ok_or_else(|| anyhow!("Could not determine platform config directory"))?;

        Ok(dirs.config_dir().join("config.toml"))
    }
}
