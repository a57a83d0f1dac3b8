use anyhow::{Context, Result};
use serde::{Deserialize, Serialize};
use std::collections::HashMap;
use std::path::{Path, PathBuf};
use tracing::{debug, warn};

use crate::error::ValidationError;
use crate::prompt::COMMIT_TYPES;

pub const DEFAULT_MODEL: &str = "qwen2.5-coder:1.5b";
pub const DEFAULT_HOST: &str = "http://localhost:11434";
pub const DEFAULT_MAX_DIFF_SIZE: usize = 4096;
pub const DEFAULT_MESSAGE_MAX_LENGTH: usize = 50;

/// Validated pipeline parameters.
#[derive(Debug, Clone, PartialEq)]
pub struct Configuration {
    model_identifier: String,
    max_diff_size: usize,
    message_max_length: usize,
    commit_type_hint: Option<String>,
}

impl Configuration {
    pub fn new(
        model_identifier: impl Into<String>,
        max_diff_size: usize,
        message_max_length: usize,
        commit_type_hint: Option<String>,
    ) -> Result<Self, ValidationError> {
        let model_identifier = model_identifier.into();
        if model_identifier.trim().is_empty() {
            return Err(ValidationError::new("model", "must not be empty"));
        }
        if max_diff_size < 1 {
            return Err(ValidationError::new(
                "max_diff_size",
                format!("must be at least 1, got {max_diff_size}"),
            ));
        }
        if message_max_length < 1 {
            return Err(ValidationError::new(
                "message_max_length",
                format!("must be at least 1, got {message_max_length}"),
            ));
        }

        let commit_type_hint = commit_type_hint.filter(|hint| !hint.trim().is_empty());
        if let Some(hint) = &commit_type_hint {
            if !COMMIT_TYPES.contains(&hint.trim()) {
                warn!(hint = %hint, "commit type is not one of the conventional types");
            }
        }

        Ok(Self {
            model_identifier,
            max_diff_size,
            message_max_length,
            commit_type_hint,
        })
    }

    pub fn model_identifier(&self) -> &str {
        &self.model_identifier
    }

    pub fn max_diff_size(&self) -> usize {
        self.max_diff_size
    }

    pub fn message_max_length(&self) -> usize {
        self.message_max_length
    }

    pub fn commit_type_hint(&self) -> Option<&str> {
        self.commit_type_hint.as_deref()
    }
}

/// Validated sampling options forwarded to the inference service.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct ModelOptions {
    temperature: f64,
    top_p: f64,
    top_k: u32,
    max_output_tokens: i64,
}

impl ModelOptions {
    /// `max_output_tokens` of `-1` leaves generation length unbounded.
    pub fn new(
        temperature: f64,
        top_p: f64,
        top_k: u32,
        max_output_tokens: i64,
    ) -> Result<Self, ValidationError> {
        check_unit_interval("temperature", temperature)?;
        check_unit_interval("top_p", top_p)?;
        if top_k < 1 {
            return Err(ValidationError::new(
                "top_k",
                format!("must be at least 1, got {top_k}"),
            ));
        }
        if max_output_tokens < -1 {
            return Err(ValidationError::new(
                "max_output_tokens",
                format!("must be -1 (unbounded) or greater, got {max_output_tokens}"),
            ));
        }
        Ok(Self {
            temperature,
            top_p,
            top_k,
            max_output_tokens,
        })
    }

    pub fn temperature(&self) -> f64 {
        self.temperature
    }

    pub fn top_p(&self) -> f64 {
        self.top_p
    }

    pub fn top_k(&self) -> u32 {
        self.top_k
    }

    pub fn max_output_tokens(&self) -> i64 {
        self.max_output_tokens
    }
}

impl Default for ModelOptions {
    fn default() -> Self {
        Self {
            temperature: default_temperature(),
            top_p: default_top_p(),
            top_k: default_top_k(),
            max_output_tokens: default_max_output_tokens(),
        }
    }
}

fn check_unit_interval(field: &'static str, value: f64) -> Result<(), ValidationError> {
    if (0.0..=1.0).contains(&value) {
        Ok(())
    } else {
        Err(ValidationError::new(
            field,
            format!("must be between 0.0 and 1.0, got {value}"),
        ))
    }
}

/// Raw, layered settings as read from files, environment and flags.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct AppConfig {
    #[serde(default = "default_model")]
    pub model: String,
    #[serde(default = "default_host")]
    pub host: String,
    #[serde(default = "default_max_diff_size")]
    pub max_diff_size: usize,
    #[serde(default = "default_message_max_length")]
    pub message_max_length: usize,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub commit_type: Option<String>,
    #[serde(default = "default_temperature")]
    pub temperature: f64,
    #[serde(default = "default_top_p")]
    pub top_p: f64,
    #[serde(default = "default_top_k")]
    pub top_k: u32,
    #[serde(default = "default_max_output_tokens")]
    pub max_output_tokens: i64,
    #[serde(default = "default_true")]
    pub system_prompt: bool,
    #[serde(default = "default_true")]
    pub review_commit: bool,
    #[serde(default)]
    pub suppress_tool_output: bool,
}

fn default_model() -> String {
    DEFAULT_MODEL.into()
}
fn default_host() -> String {
    DEFAULT_HOST.into()
}
fn default_max_diff_size() -> usize {
    DEFAULT_MAX_DIFF_SIZE
}
fn default_message_max_length() -> usize {
    DEFAULT_MESSAGE_MAX_LENGTH
}
fn default_temperature() -> f64 {
    0.5
}
fn default_top_p() -> f64 {
    1.0
}
fn default_top_k() -> u32 {
    40
}
fn default_max_output_tokens() -> i64 {
    -1
}
fn default_true() -> bool {
    true
}

impl Default for AppConfig {
    fn default() -> Self {
        Self {
            model: default_model(),
            host: default_host(),
            max_diff_size: default_max_diff_size(),
            message_max_length: default_message_max_length(),
            commit_type: None,
            temperature: default_temperature(),
            top_p: default_top_p(),
            top_k: default_top_k(),
            max_output_tokens: default_max_output_tokens(),
            system_prompt: true,
            review_commit: true,
            suppress_tool_output: false,
        }
    }
}

/// Suffixes of the `LTC_` environment variables, in display order.
pub const ENV_SUFFIXES: &[&str] = &[
    "MODEL",
    "HOST",
    "MAX_DIFF_SIZE",
    "MESSAGE_MAX_LENGTH",
    "COMMIT_TYPE",
    "TEMPERATURE",
    "TOP_P",
    "TOP_K",
    "MAX_OUTPUT_TOKENS",
    "SYSTEM_PROMPT",
    "REVIEW_COMMIT",
    "SUPPRESS_TOOL_OUTPUT",
];

pub const ENV_PREFIX: &str = "LTC_";

impl AppConfig {
    /// Load config with layered resolution: defaults → global TOML → local .env → env vars
    pub fn load() -> Result<Self> {
        let mut cfg = Self::default();

        // Layer 1: Global TOML
        if let Some(path) = global_config_path() {
            if path.exists() {
                let content = std::fs::read_to_string(&path)
                    .with_context(|| format!("Failed to read {}", path.display()))?;
                let file_cfg: AppConfig = toml::from_str(&content)
                    .with_context(|| format!("Failed to parse {}", path.display()))?;
                debug!(path = %path.display(), "loaded global config");
                cfg.merge_from(&file_cfg);
            }
        }

        // Layer 2: Local .env (in git repo root)
        if let Ok(root) = crate::git::find_repo_root() {
            let env_path = PathBuf::from(&root).join(".env");
            if env_path.exists() {
                let env_map = parse_dotenv(&env_path)?;
                debug!(path = %env_path.display(), "loaded local .env");
                cfg.apply_env_map(&env_map)
                    .with_context(|| format!("Invalid setting in {}", env_path.display()))?;
            }
        }

        // Layer 3: Actual environment variables
        let mut env_map = HashMap::new();
        for suffix in ENV_SUFFIXES {
            let key = format!("{ENV_PREFIX}{suffix}");
            if let Ok(val) = std::env::var(&key) {
                env_map.insert(key, val);
            }
        }
        cfg.apply_env_map(&env_map)
            .context("Invalid setting in environment")?;

        Ok(cfg)
    }

    fn merge_from(&mut self, other: &AppConfig) {
        if !other.model.is_empty() {
            self.model = other.model.clone();
        }
        if !other.host.is_empty() {
            self.host = other.host.clone();
        }
        self.max_diff_size = other.max_diff_size;
        self.message_max_length = other.message_max_length;
        if other.commit_type.is_some() {
            self.commit_type = other.commit_type.clone();
        }
        self.temperature = other.temperature;
        self.top_p = other.top_p;
        self.top_k = other.top_k;
        self.max_output_tokens = other.max_output_tokens;
        self.system_prompt = other.system_prompt;
        self.review_commit = other.review_commit;
        self.suppress_tool_output = other.suppress_tool_output;
    }

    fn apply_env_map(&mut self, map: &HashMap<String, String>) -> Result<(), ValidationError> {
        for suffix in ENV_SUFFIXES {
            let key = format!("{ENV_PREFIX}{suffix}");
            if let Some(val) = map.get(&key) {
                self.set_field(suffix, val)?;
            }
        }
        Ok(())
    }

    /// Set a field by its env suffix
    pub fn set_field(&mut self, suffix: &str, value: &str) -> Result<(), ValidationError> {
        match suffix {
            "MODEL" => self.model = value.into(),
            "HOST" => self.host = value.trim_end_matches('/').into(),
            "MAX_DIFF_SIZE" => self.max_diff_size = parse_number("max_diff_size", value)?,
            "MESSAGE_MAX_LENGTH" => {
                self.message_max_length = parse_number("message_max_length", value)?
            }
            "COMMIT_TYPE" => {
                let value = value.trim();
                self.commit_type = if value.is_empty() {
                    None
                } else {
                    Some(value.to_string())
                };
            }
            "TEMPERATURE" => self.temperature = parse_number("temperature", value)?,
            "TOP_P" => self.top_p = parse_number("top_p", value)?,
            "TOP_K" => self.top_k = parse_number("top_k", value)?,
            "MAX_OUTPUT_TOKENS" => {
                self.max_output_tokens = parse_number("max_output_tokens", value)?
            }
            "SYSTEM_PROMPT" => self.system_prompt = parse_flag(value),
            "REVIEW_COMMIT" => self.review_commit = parse_flag(value),
            "SUPPRESS_TOOL_OUTPUT" => self.suppress_tool_output = parse_flag(value),
            _ => {}
        }
        Ok(())
    }

    /// Validated pipeline parameters for this config.
    pub fn configuration(&self) -> Result<Configuration, ValidationError> {
        Configuration::new(
            self.model.clone(),
            self.max_diff_size,
            self.message_max_length,
            self.commit_type.clone(),
        )
    }

    /// Validated sampling options for this config.
    pub fn model_options(&self) -> Result<ModelOptions, ValidationError> {
        ModelOptions::new(
            self.temperature,
            self.top_p,
            self.top_k,
            self.max_output_tokens,
        )
    }

    /// Save to global TOML config file
    pub fn save_global(&self) -> Result<PathBuf> {
        let path = global_config_path().context("Could not determine global config directory")?;
        if let Some(parent) = path.parent() {
            std::fs::create_dir_all(parent)
                .with_context(|| format!("Failed to create {}", parent.display()))?;
        }
        let content = toml::to_string_pretty(self).context("Failed to serialize config")?;
        std::fs::write(&path, content)
            .with_context(|| format!("Failed to write {}", path.display()))?;
        Ok(path)
    }

    /// Save to local .env file in the git repo root
    pub fn save_local(&self) -> Result<PathBuf> {
        let root = crate::git::find_repo_root().context("Not in a git repository")?;
        let env_path = PathBuf::from(&root).join(".env");

        let lines: Vec<String> = self
            .env_pairs()
            .into_iter()
            .map(|(suffix, value)| format!("{ENV_PREFIX}{suffix}={}", quote_env_value(&value)))
            .collect();

        std::fs::write(&env_path, lines.join("\n") + "\n")
            .with_context(|| format!("Failed to write {}", env_path.display()))?;
        Ok(env_path)
    }

    fn env_pairs(&self) -> Vec<(&'static str, String)> {
        let mut pairs = vec![
            ("MODEL", self.model.clone()),
            ("HOST", self.host.clone()),
            ("MAX_DIFF_SIZE", self.max_diff_size.to_string()),
            ("MESSAGE_MAX_LENGTH", self.message_max_length.to_string()),
        ];
        if let Some(commit_type) = &self.commit_type {
            pairs.push(("COMMIT_TYPE", commit_type.clone()));
        }
        pairs.extend([
            ("TEMPERATURE", self.temperature.to_string()),
            ("TOP_P", self.top_p.to_string()),
            ("TOP_K", self.top_k.to_string()),
            ("MAX_OUTPUT_TOKENS", self.max_output_tokens.to_string()),
            ("SYSTEM_PROMPT", flag(self.system_prompt).into()),
            ("REVIEW_COMMIT", flag(self.review_commit).into()),
            ("SUPPRESS_TOOL_OUTPUT", flag(self.suppress_tool_output).into()),
        ]);
        pairs
    }

    /// Get all fields as (display_name, env_suffix, current_value) tuples
    pub fn fields_display(&self) -> Vec<(&'static str, &'static str, String)> {
        vec![
            ("Model", "MODEL", self.model.clone()),
            ("Host", "HOST", self.host.clone()),
            (
                "Max Diff Size",
                "MAX_DIFF_SIZE",
                format!("{} chars", self.max_diff_size),
            ),
            (
                "Message Max Length",
                "MESSAGE_MAX_LENGTH",
                format!("{} words", self.message_max_length),
            ),
            (
                "Commit Type",
                "COMMIT_TYPE",
                self.commit_type
                    .clone()
                    .unwrap_or_else(|| "(inferred)".into()),
            ),
            ("Temperature", "TEMPERATURE", self.temperature.to_string()),
            ("Top P", "TOP_P", self.top_p.to_string()),
            ("Top K", "TOP_K", self.top_k.to_string()),
            (
                "Max Output Tokens",
                "MAX_OUTPUT_TOKENS",
                if self.max_output_tokens == -1 {
                    "(unbounded)".into()
                } else {
                    self.max_output_tokens.to_string()
                },
            ),
            ("System Prompt", "SYSTEM_PROMPT", enabled(self.system_prompt)),
            ("Review Commit", "REVIEW_COMMIT", enabled(self.review_commit)),
            (
                "Suppress Tool Output",
                "SUPPRESS_TOOL_OUTPUT",
                enabled(self.suppress_tool_output),
            ),
        ]
    }
}

/// Global config file path
pub fn global_config_path() -> Option<PathBuf> {
    if let Some(override_dir) = std::env::var_os("LTC_CONFIG_HOME") {
        let override_path = PathBuf::from(override_dir);
        if !override_path.as_os_str().is_empty() {
            return Some(override_path.join("llm-tool-commit").join("config.toml"));
        }
    }
    dirs::config_dir().map(|d| d.join("llm-tool-commit").join("config.toml"))
}

fn parse_flag(value: &str) -> bool {
    let value = value.trim();
    value == "1" || value.eq_ignore_ascii_case("true")
}

fn flag(value: bool) -> &'static str {
    if value {
        "1"
    } else {
        "0"
    }
}

fn enabled(value: bool) -> String {
    if value {
        "enabled".into()
    } else {
        "disabled".into()
    }
}

fn parse_number<T: std::str::FromStr>(field: &'static str, value: &str) -> Result<T, ValidationError> {
    value
        .trim()
        .parse::<T>()
        .map_err(|_| ValidationError::new(field, format!("expected a number, got '{value}'")))
}

/// Single quotes are read literally by dotenvy; values holding one fall back
/// to double quotes with backslashes, `"` and `$` escaped.
fn quote_env_value(value: &str) -> String {
    if !value.contains('\'') {
        return format!("'{value}'");
    }
    let escaped = value
        .replace('\\', "\\\\")
        .replace('"', "\\\"")
        .replace('$', "\\$");
    format!("\"{escaped}\"")
}

fn parse_dotenv(path: &Path) -> Result<HashMap<String, String>> {
    let iter = dotenvy::from_path_iter(path)
        .with_context(|| format!("Failed to read {}", path.display()))?;
    let mut map = HashMap::new();
    for item in iter {
        let (key, val) = item.with_context(|| format!("Failed to parse {}", path.display()))?;
        map.insert(key, val);
    }
    Ok(map)
}
