use anyhow::{Context, Result};
use serde::{Deserialize, Serialize};
use std::default::Default;
use std::fs::File;
use std::io::BufReader;
use std::path::Path;
use std::time::Duration;
use url::Url;

use crate::errors::AppError;
use crate::language_utils;

/// Application configuration module
/// This module handles the application configuration including loading,
/// validating and overriding configuration settings.
/// Represents the application configuration
#[derive(Debug, Serialize, Deserialize, Clone)]
pub struct Config {
    /// Source language code (ISO)
    #[serde(default = "default_source_language")]
    pub source_language: String,

    /// Target language code (ISO)
    #[serde(default = "default_target_language")]
    pub target_language: String,

    /// Translation config
    #[serde(default)]
    pub translation: TranslationConfig,

    /// Heuristic acceptance thresholds for translated batches
    #[serde(default)]
    pub validation: ValidationConfig,

    /// File naming overrides; tags otherwise follow the language codes
    #[serde(default)]
    pub naming: NamingOverrides,

    /// Log level
    #[serde(default)]
    pub log_level: LogLevel,
}

/// Environment variable holding the service credential
pub const API_KEY_ENV: &str = "API_KEY";

/// Prefix of the example key shipped in documentation
pub const PLACEHOLDER_KEY_PREFIX: &str = "sk-or-v1-xx";

/// Generation service connection settings
#[derive(Debug, Serialize, Deserialize, Clone)]
pub struct ProviderConfig {
    // @field: Model identifier
    #[serde(default = "default_model")]
    pub model: String,

    // @field: API key, usually supplied through the environment
    #[serde(default = "String::new")]
    pub api_key: String,

    // @field: Base URL of an OpenAI-compatible API
    #[serde(default = "default_endpoint")]
    pub endpoint: String,

    // @field: Timeout seconds
    #[serde(default = "default_timeout_secs")]
    pub timeout_secs: u64,

    // @field: Sampling temperature
    #[serde(default = "default_temperature")]
    pub temperature: f32,

    // @field: Attribution header (HTTP-Referer)
    #[serde(default = "default_referer")]
    pub referer: Option<String>,

    // @field: Attribution header (X-Title)
    #[serde(default = "default_title")]
    pub title: Option<String>,
}

impl Default for ProviderConfig {
    fn default() -> Self {
        Self {
            model: default_model(),
            api_key: String::new(),
            endpoint: default_endpoint(),
            timeout_secs: default_timeout_secs(),
            temperature: default_temperature(),
            referer: default_referer(),
            title: default_title(),
        }
    }
}

/// Translation service configuration
#[derive(Debug, Serialize, Deserialize, Clone, Default)]
pub struct TranslationConfig {
    /// Connection to the generation service
    #[serde(default)]
    pub provider: ProviderConfig,

    /// Common translation settings
    #[serde(default)]
    pub common: TranslationCommonConfig,
}

/// Batching, retry and pacing settings
#[derive(Debug, Serialize, Deserialize, Clone)]
pub struct TranslationCommonConfig {
    /// System prompt template for translation
    /// Placeholders: {source_language}, {target_language}
    #[serde(default = "default_system_prompt")]
    pub system_prompt: String,

    /// Maximum number of cues sent in one request
    #[serde(default = "default_batch_size")]
    pub batch_size: usize,

    /// Attempts per batch before it is split in half
    #[serde(default = "default_max_retries")]
    pub max_retries: u32,

    /// Batches this size or smaller are given up on instead of split
    #[serde(default = "default_min_split_size")]
    pub min_split_size: usize,

    /// Pause after a rate-limit response at the top level, halved per split level
    #[serde(default = "default_rate_limit_cooldown_ms")]
    pub rate_limit_cooldown_ms: u64,

    /// Lower bound for the rate-limit pause at deep split levels
    #[serde(default = "default_min_rate_limit_cooldown_ms")]
    pub min_rate_limit_cooldown_ms: u64,

    /// Pause between consecutive batches of one file
    #[serde(default = "default_batch_delay_ms")]
    pub batch_delay_ms: u64,

    /// Pause after a file fails and is queued for retry
    #[serde(default = "default_failed_file_cooldown_ms")]
    pub failed_file_cooldown_ms: u64,

    /// Pause before each file of the retry pass
    #[serde(default = "default_retry_pass_cooldown_ms")]
    pub retry_pass_cooldown_ms: u64,
}

impl Default for TranslationCommonConfig {
    fn default() -> Self {
        Self {
            system_prompt: default_system_prompt(),
            batch_size: default_batch_size(),
            max_retries: default_max_retries(),
            min_split_size: default_min_split_size(),
            rate_limit_cooldown_ms: default_rate_limit_cooldown_ms(),
            min_rate_limit_cooldown_ms: default_min_rate_limit_cooldown_ms(),
            batch_delay_ms: default_batch_delay_ms(),
            failed_file_cooldown_ms: default_failed_file_cooldown_ms(),
            retry_pass_cooldown_ms: default_retry_pass_cooldown_ms(),
        }
    }
}

impl TranslationCommonConfig {
    /// Settings with every pause set to zero, for tests and dry runs
    pub fn without_delays(mut self) -> Self {
        self.rate_limit_cooldown_ms = 0;
        self.min_rate_limit_cooldown_ms = 0;
        self.batch_delay_ms = 0;
        self.failed_file_cooldown_ms = 0;
        self.retry_pass_cooldown_ms = 0;
        self
    }

    pub fn batch_delay(&self) -> Duration {
        Duration::from_millis(self.batch_delay_ms)
    }

    pub fn failed_file_cooldown(&self) -> Duration {
        Duration::from_millis(self.failed_file_cooldown_ms)
    }

    pub fn retry_pass_cooldown(&self) -> Duration {
        Duration::from_millis(self.retry_pass_cooldown_ms)
    }
}

/// Thresholds for the translated-batch plausibility check
#[derive(Debug, Serialize, Deserialize, Clone)]
pub struct ValidationConfig {
    /// Reject when more than this fraction of lines are echoed back untranslated
    #[serde(default = "default_echo_ratio_limit")]
    pub echo_ratio_limit: f64,

    /// Reject when more than this fraction of lines lack target-script characters
    #[serde(default = "default_missing_ratio_limit")]
    pub missing_ratio_limit: f64,

    /// Lines with this many words or fewer are never counted as echoes or misses
    #[serde(default = "default_min_words_for_check")]
    pub min_words_for_check: usize,
}

impl Default for ValidationConfig {
    fn default() -> Self {
        Self {
            echo_ratio_limit: default_echo_ratio_limit(),
            missing_ratio_limit: default_missing_ratio_limit(),
            min_words_for_check: default_min_words_for_check(),
        }
    }
}

/// File naming conventions for sources and translations
#[derive(Debug, Clone, PartialEq)]
pub struct NamingConfig {
    /// Suffix appended to the stem of a source-language file
    pub source_tag: String,

    /// Stem suffixes that older runs appended to translated files
    pub legacy_target_tags: Vec<String>,
}

impl NamingConfig {
    /// Tags built from the language codes: `_en` and `_ar`, `.ar`, `-ar` for English to Arabic
    pub fn for_languages(source_language: &str, target_language: &str) -> Self {
        let short = |code: &str| {
            language_utils::normalize_to_part1_or_part2t(code)
                .unwrap_or_else(|_| code.trim().to_lowercase())
        };
        let target = short(target_language);

        Self {
            source_tag: format!("_{}", short(source_language)),
            legacy_target_tags: ["_", ".", "-"]
                .iter()
                .map(|separator| format!("{}{}", separator, target))
                .collect(),
        }
    }
}

impl Default for NamingConfig {
    fn default() -> Self {
        Self::for_languages(&default_source_language(), &default_target_language())
    }
}

/// Explicit naming settings from the configuration file
#[derive(Debug, Serialize, Deserialize, Clone, Default)]
pub struct NamingOverrides {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub source_tag: Option<String>,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub legacy_target_tags: Option<Vec<String>>,
}

/// Log verbosity level
#[derive(Debug, Serialize, Deserialize, Clone, PartialEq, Default)]
#[serde(rename_all = "lowercase")]
pub enum LogLevel {
    Error,
    Warn,
    #[default]
    Info,
    Debug,
    Trace,
}

impl LogLevel {
    pub fn to_level_filter(&self) -> log::LevelFilter {
        match self {
            Self::Error => log::LevelFilter::Error,
            Self::Warn => log::LevelFilter::Warn,
            Self::Info => log::LevelFilter::Info,
            Self::Debug => log::LevelFilter::Debug,
            Self::Trace => log::LevelFilter::Trace,
        }
    }
}

fn default_source_language() -> String {
    "en".to_string()
}

fn default_target_language() -> String {
    "ar".to_string()
}

fn default_model() -> String {
    "xiaomi/mimo-v2-flash:free".to_string()
}

fn default_endpoint() -> String {
    "https://openrouter.ai/api/v1".to_string()
}

fn default_timeout_secs() -> u64 {
    120
}

fn default_temperature() -> f32 {
    0.1
}

fn default_referer() -> Option<String> {
    Some("https://github.com/rtlsub/rtlsub".to_string())
}

fn default_title() -> Option<String> {
    Some("Subtitle Translator".to_string())
}

fn default_batch_size() -> usize {
    20
}

fn default_max_retries() -> u32 {
    2 // Bisection does the heavy lifting
}

fn default_min_split_size() -> usize {
    1
}

fn default_rate_limit_cooldown_ms() -> u64 {
    30_000
}

fn default_min_rate_limit_cooldown_ms() -> u64 {
    5_000
}

fn default_batch_delay_ms() -> u64 {
    1_000
}

fn default_failed_file_cooldown_ms() -> u64 {
    2_000
}

fn default_retry_pass_cooldown_ms() -> u64 {
    5_000
}

fn default_echo_ratio_limit() -> f64 {
    0.3
}

fn default_missing_ratio_limit() -> f64 {
    0.4
}

fn default_min_words_for_check() -> usize {
    3
}

fn default_system_prompt() -> String {
    r#"You are a strictly mechanical technical translator for subtitle files.
Your task is to translate Software Engineering content from {source_language} to {target_language}.

STRICT RULES:
1. **Output Format:** You must return ONLY a raw JSON list of strings. No Markdown code blocks. No intro/outro text.
2. **One-to-One Mapping:** If I send you 20 lines, you MUST return exactly 20 translated lines. DO NOT merge lines. DO NOT split lines. DO NOT summarize.
3. **Code Safety:** Never translate variable names, function names, or file paths (keep them in {source_language}).
4. **Terminology:** Use standard technical {target_language} (API, JSON, Framework stay in {source_language})."#
        .to_string()
}

impl Config {
    /// Load configuration from a JSON file
    pub fn from_file<P: AsRef<Path>>(path: P) -> Result<Self> {
        let path = path.as_ref();
        let file = File::open(path)
            .with_context(|| format!("Failed to open config file: {}", path.display()))?;

        let reader = BufReader::new(file);
        serde_json::from_reader(reader)
            .with_context(|| format!("Failed to parse config file: {}", path.display()))
    }

    /// Load configuration from `path` if it exists, defaults otherwise
    pub fn load_or_default<P: AsRef<Path>>(path: P) -> Result<Self> {
        let path = path.as_ref();
        if path.exists() {
            Self::from_file(path)
        } else {
            log::warn!("Config file not found at '{}', using defaults.", path.display());
            Ok(Self::default())
        }
    }

    /// Override values from the process environment
    pub fn apply_env(&mut self) {
        if let Ok(api_key) = std::env::var(API_KEY_ENV) {
            if !api_key.trim().is_empty() {
                self.translation.provider.api_key = api_key.trim().to_string();
            }
        }
    }

    /// Naming scheme in effect: explicit settings over tags derived from the languages
    pub fn naming(&self) -> NamingConfig {
        let derived = NamingConfig::for_languages(&self.source_language, &self.target_language);
        NamingConfig {
            source_tag: self.naming.source_tag.clone().unwrap_or(derived.source_tag),
            legacy_target_tags: self
                .naming
                .legacy_target_tags
                .clone()
                .unwrap_or(derived.legacy_target_tags),
        }
    }

    /// Validate the configuration for consistency and required values
    pub fn validate(&self) -> Result<(), AppError> {
        let invalid = |message: String| Err(AppError::Config(message));

        if let Err(e) = language_utils::get_language_name(&self.source_language) {
            return invalid(format!("Invalid source language: {:#}", e));
        }
        if let Err(e) = language_utils::get_language_name(&self.target_language) {
            return invalid(format!("Invalid target language: {:#}", e));
        }

        if language_utils::language_codes_match(&self.source_language, &self.target_language) {
            return invalid(format!(
                "Source and target language are both '{}'",
                self.target_language
            ));
        }

        let api_key = self.translation.provider.api_key.trim();
        if api_key.is_empty() {
            return invalid(format!(
                "No API key configured. Set {} in the environment or a .env file",
                API_KEY_ENV
            ));
        }
        if api_key.starts_with(PLACEHOLDER_KEY_PREFIX) {
            return invalid("The API key is still the placeholder value; insert your real key".to_string());
        }

        if let Err(e) = Url::parse(&self.translation.provider.endpoint) {
            return invalid(format!(
                "Invalid endpoint URL {}: {}",
                self.translation.provider.endpoint, e
            ));
        }

        let common = &self.translation.common;
        for (name, value) in [
            ("batch_size", common.batch_size),
            ("max_retries", common.max_retries as usize),
            ("min_split_size", common.min_split_size),
        ] {
            if value == 0 {
                return invalid(format!("{} must be at least 1", name));
            }
        }

        for (name, value) in [
            ("echo_ratio_limit", self.validation.echo_ratio_limit),
            ("missing_ratio_limit", self.validation.missing_ratio_limit),
        ] {
            if !(0.0..=1.0).contains(&value) {
                return invalid(format!("{} must be between 0 and 1, got {}", name, value));
            }
        }

        let naming = self.naming();
        if naming.source_tag.is_empty() {
            return invalid("naming.source_tag must not be empty".to_string());
        }
        if naming.legacy_target_tags.iter().any(|t| t.is_empty()) {
            return invalid("naming.legacy_target_tags must not contain empty tags".to_string());
        }

        Ok(())
    }
}

/// Default implementation for Config
impl Default for Config {
    fn default() -> Self {
        Config {
            source_language: default_source_language(),
            target_language: default_target_language(),
            translation: TranslationConfig::default(),
            validation: ValidationConfig::default(),
            naming: NamingOverrides::default(),
            log_level: LogLevel::default(),
        }
    }
}
