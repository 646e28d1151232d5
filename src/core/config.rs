//! # Configuration
//!
//! Centralizes all settings with a clear override hierarchy:
//! defaults → config file → env vars → CLI flags.
//!
//! Config lives at `~/.terminal-chat/config.toml`. If missing on first run, a
//! commented-out default is generated so users can discover all options.

use log::{debug, info, warn};
use serde::{Deserialize, Serialize};
use std::fmt;
use std::fs;
use std::path::{Path, PathBuf};

use crate::inference::providers::groq::{DEFAULT_GROQ_BASE_URL, DEFAULT_GROQ_MODEL};
use crate::inference::types::{DEFAULT_MAX_OUTPUT_TOKENS, DEFAULT_TEMPERATURE};
use crate::inference::GenerationOptions;
use crate::search::SearchOptions;
use crate::search::tavily::{DEFAULT_MAX_RESULTS, DEFAULT_TAVILY_BASE_URL};

// ============================================================================
// Config Structs (all fields Option<T> for sparse TOML)
// ============================================================================

#[derive(Debug, Default, Deserialize, Serialize)]
pub struct ChatConfig {
    #[serde(default)]
    pub general: GeneralConfig,
    #[serde(default)]
    pub groq: GroqConfig,
    #[serde(default)]
    pub tavily: TavilyConfig,
}

#[derive(Debug, Default, Deserialize, Serialize)]
pub struct GeneralConfig {
    pub model: Option<String>,
    pub temperature: Option<f32>,
    pub max_output_tokens: Option<u32>,
    pub web_search: Option<bool>,
    pub system_prompt: Option<String>,
    pub system_prompt_file: Option<String>,
}

#[derive(Debug, Default, Deserialize, Serialize)]
pub struct GroqConfig {
    pub api_key: Option<String>,
    pub base_url: Option<String>,
}

#[derive(Debug, Default, Deserialize, Serialize)]
pub struct TavilyConfig {
    pub api_key: Option<String>,
    pub base_url: Option<String>,
    pub max_results: Option<u32>,
    pub include_images: Option<bool>,
    pub include_raw_content: Option<bool>,
}

// ============================================================================
// Defaults
// ============================================================================

const CONFIG_DIR: &str = ".terminal-chat";
const MAX_TEMPERATURE: f32 = 2.0;

const DEFAULT_SYSTEM_PROMPT: &str = "You are a terminal-based assistant for software developers. \
    You help with coding questions and code examples, explaining programming concepts, \
    debugging, and general technical questions. \
    Keep answers concise, technical and actionable. \
    Prefer plain text laid out for a terminal and put code in fenced blocks tagged with their language. \
    When a question needs current information you don't have, say so plainly.";

// ============================================================================
// Resolved Config (concrete values, no Options)
// ============================================================================

#[derive(Debug, Clone)]
pub struct ResolvedConfig {
    pub model_name: String,
    pub generation: GenerationOptions,
    pub web_search: bool,
    pub system_prompt: String,
    pub groq_api_key: Option<String>,
    pub groq_base_url: String,
    pub tavily_api_key: Option<String>,
    pub tavily_base_url: String,
    pub search: SearchOptions,
}

/// Flags parsed from the command line. `None`/`false` means "not specified".
#[derive(Debug, Default, Clone)]
pub struct CliOverrides {
    pub model: Option<String>,
    pub disable_search: bool,
}

// ============================================================================
// Error Type
// ============================================================================

#[derive(Debug)]
pub enum ConfigError {
    Io(std::io::Error),
    Parse(toml::de::Error),
}

impl fmt::Display for ConfigError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            ConfigError::Io(e) => write!(f, "config I/O error: {e}"),
            ConfigError::Parse(e) => write!(f, "config parse error: {e}"),
        }
    }
}

impl std::error::Error for ConfigError {}

// ============================================================================
// Loading
// ============================================================================

/// Returns the path to `~/.terminal-chat/config.toml`.
pub fn config_path() -> Option<PathBuf> {
    dirs::home_dir().map(|h| h.join(CONFIG_DIR).join("config.toml"))
}

/// Load config from `~/.terminal-chat/config.toml`.
///
/// If the file doesn't exist, generates a commented-out default and
/// returns `ChatConfig::default()`. If it exists but is malformed,
/// returns `ConfigError::Parse`.
pub fn load_config() -> Result<ChatConfig, ConfigError> {
    let path = match config_path() {
        Some(p) => p,
        None => {
            warn!("Could not determine home directory, using default config");
            return Ok(ChatConfig::default());
        }
    };

    if !path.exists() {
        info!("No config file found, generating default at {}", path.display());
        generate_default_config(&path);
        return Ok(ChatConfig::default());
    }

    let contents = fs::read_to_string(&path).map_err(ConfigError::Io)?;
    let config = parse_config(&contents)?;
    info!("Loaded config from {}", path.display());
    Ok(config)
}

pub fn parse_config(contents: &str) -> Result<ChatConfig, ConfigError> {
    let config: ChatConfig = toml::from_str(contents).map_err(ConfigError::Parse)?;
    // Keys stay out of the log
    debug!(
        "Config: general={:?}, groq.base_url={:?}, tavily.base_url={:?}",
        config.general, config.groq.base_url, config.tavily.base_url
    );
    Ok(config)
}

const DEFAULT_CONFIG_TEMPLATE: &str = r#"# terminal-chat configuration
# All settings are optional. Defaults are used for anything not specified.
# Override hierarchy: defaults → this file → env vars → CLI flags.

# [general]
# model = "moonshotai/kimi-k2-instruct"   # Or CHAT_MODEL env var, or --model
# temperature = 0.6                       # 0.0 to 2.0
# max_output_tokens = 4096
# web_search = true                       # --no-search turns it off for one run
# system_prompt = "You are a helpful assistant."
# system_prompt_file = "system.md"        # Path relative to ~/.terminal-chat/

# [groq]
# api_key = "gsk_..."                     # Or set GROQ_API_KEY env var
# base_url = "https://api.groq.com/openai/v1"

# [tavily]
# api_key = "tvly-..."                    # Or set TAVILY_API_KEY env var
# base_url = "https://api.tavily.com"
# max_results = 5
# include_images = false
# include_raw_content = false
"#;

/// Generates a commented-out default config file at the given path.
fn generate_default_config(path: &Path) {
    if let Some(parent) = path.parent() {
        if let Err(e) = fs::create_dir_all(parent) {
            warn!("Failed to create config directory: {}", e);
            return;
        }
    }
    if let Err(e) = fs::write(path, DEFAULT_CONFIG_TEMPLATE) {
        warn!("Failed to write default config: {}", e);
    }
}

// ============================================================================
// Resolution
// ============================================================================

/// Resolve the final config by collapsing: defaults → config file → env vars → CLI.
pub fn resolve(config: &ChatConfig, cli: &CliOverrides) -> ResolvedConfig {
    resolve_with_env(config, cli, |key| std::env::var(key).ok())
}

/// Same as [`resolve`], reading environment variables through `env`.
pub fn resolve_with_env(
    config: &ChatConfig,
    cli: &CliOverrides,
    env: impl Fn(&str) -> Option<String>,
) -> ResolvedConfig {
    // Model: CLI → env → config → default
    let model_name = cli
        .model
        .clone()
        .or_else(|| env("CHAT_MODEL"))
        .or_else(|| config.general.model.clone())
        .unwrap_or_else(|| DEFAULT_GROQ_MODEL.to_string());

    let temperature = config
        .general
        .temperature
        .unwrap_or(DEFAULT_TEMPERATURE);
    let generation = GenerationOptions {
        temperature: clamp_temperature(temperature),
        max_output_tokens: config
            .general
            .max_output_tokens
            .unwrap_or(DEFAULT_MAX_OUTPUT_TOKENS),
    };

    // Web search: CLI can only turn it off
    let web_search = !cli.disable_search && config.general.web_search.unwrap_or(true);

    let groq_api_key = env("GROQ_API_KEY").or_else(|| config.groq.api_key.clone());
    let groq_base_url = env("GROQ_BASE_URL")
        .or_else(|| config.groq.base_url.clone())
        .unwrap_or_else(|| DEFAULT_GROQ_BASE_URL.to_string());

    let tavily_api_key = env("TAVILY_API_KEY").or_else(|| config.tavily.api_key.clone());
    let tavily_base_url = env("TAVILY_BASE_URL")
        .or_else(|| config.tavily.base_url.clone())
        .unwrap_or_else(|| DEFAULT_TAVILY_BASE_URL.to_string());

    let search = SearchOptions {
        max_results: config.tavily.max_results.unwrap_or(DEFAULT_MAX_RESULTS),
        include_images: config.tavily.include_images.unwrap_or(false),
        include_raw_content: config.tavily.include_raw_content.unwrap_or(false),
    };

    ResolvedConfig {
        model_name,
        generation,
        web_search,
        system_prompt: resolve_system_prompt(config),
        groq_api_key,
        groq_base_url,
        tavily_api_key,
        tavily_base_url,
        search,
    }
}

fn clamp_temperature(value: f32) -> f32 {
    if value.is_nan() {
        warn!("Temperature is NaN, using default {}", DEFAULT_TEMPERATURE);
        return DEFAULT_TEMPERATURE;
    }
    let clamped = value.clamp(0.0, MAX_TEMPERATURE);
    if clamped != value {
        warn!("Temperature {} out of range, clamped to {}", value, clamped);
    }
    clamped
}

/// Resolves the system prompt: inline wins over file, both win over default.
fn resolve_system_prompt(config: &ChatConfig) -> String {
    if let Some(ref prompt) = config.general.system_prompt {
        return prompt.clone();
    }

    // system_prompt_file is relative to ~/.terminal-chat/
    if let Some(ref file) = config.general.system_prompt_file {
        if let Some(home) = dirs::home_dir() {
            let prompt_path = home.join(CONFIG_DIR).join(file);
            match fs::read_to_string(&prompt_path) {
                Ok(contents) => {
                    let trimmed = contents.trim().to_string();
                    if !trimmed.is_empty() {
                        info!("Loaded system prompt from {}", prompt_path.display());
                        return trimmed;
                    }
                    warn!("System prompt file is empty: {}", prompt_path.display());
                }
                Err(e) => {
                    warn!(
                        "Failed to read system prompt file {}: {}",
                        prompt_path.display(),
                        e
                    );
                }
            }
        }
    }

    DEFAULT_SYSTEM_PROMPT.to_string()
}
