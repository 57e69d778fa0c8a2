use crate::reflection::ExtractionMode;
use serde::{Deserialize, Serialize};

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Config {
    pub llm: LlmConfig,
    #[serde(default)]
    pub reflection: ReflectionConfig,
    #[serde(default)]
    pub retry: RetryConfig,
    #[serde(default)]
    pub prompts: PromptsConfig,
    #[serde(default)]
    pub server: ServerConfig,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct LlmConfig {
    #[serde(default)]
    pub base_url: String,
    #[serde(default)]
    pub api_key: String,
    pub model: String,
    #[serde(default)]
    pub system_prompt: Option<String>,
    #[serde(default)]
    pub max_tokens: Option<u32>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ReflectionConfig {
    #[serde(default = "default_reflection_count")]
    pub reflection_count: usize,
    /// Largest reflection count a single request may ask for.
    #[serde(default = "default_max_reflection_count")]
    pub max_reflection_count: usize,
    #[serde(default = "default_per_call_timeout_secs")]
    pub per_call_timeout_secs: u64,
    #[serde(default = "default_temperature")]
    pub temperature: f32,
    #[serde(default = "default_max_concurrency")]
    pub max_concurrency: usize,
    /// Skip the merge call when exactly one reflection succeeded.
    #[serde(default)]
    pub short_circuit_single: bool,
    #[serde(default)]
    pub extraction: ExtractionMode,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct RetryConfig {
    #[serde(default = "default_max_attempts")]
    pub max_attempts: u32,
    #[serde(default = "default_initial_backoff_ms")]
    pub initial_backoff_ms: u64,
}

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct PromptsConfig {
    #[serde(default)]
    pub reflection: Option<String>,
    #[serde(default)]
    pub aggregation: Option<String>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ServerConfig {
    #[serde(default = "default_host")]
    pub host: String,
    #[serde(default = "default_port")]
    pub port: u16,
    #[serde(default)]
    pub logs: LogsConfig,
    #[serde(default = "default_schema_dir")]
    pub schema_dir: String,
    #[serde(default = "default_schema_file")]
    pub default_schema_file: String,
    #[serde(default)]
    pub cors_origins: Vec<String>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct LogsConfig {
    #[serde(default = "default_log_level")]
    pub level: String,
}

impl Config {
    pub fn validate(&self) -> crate::Result<()> {
        let reflection = &self.reflection;
        if reflection.reflection_count == 0 {
            return Err(crate::Error::config("reflection.reflection_count must be positive"));
        }
        if reflection.reflection_count > reflection.max_reflection_count {
            return Err(crate::Error::config(format!(
                "reflection.reflection_count ({}) exceeds reflection.max_reflection_count ({})",
                reflection.reflection_count, reflection.max_reflection_count
            )));
        }
        if reflection.max_concurrency == 0 {
            return Err(crate::Error::config("reflection.max_concurrency must be positive"));
        }
        if reflection.per_call_timeout_secs == 0 {
            return Err(crate::Error::config(
                "reflection.per_call_timeout_secs must be positive",
            ));
        }
        if !(0.0..=2.0).contains(&reflection.temperature) {
            return Err(crate::Error::config(format!(
                "reflection.temperature must be within 0.0..=2.0, got {}",
                reflection.temperature
            )));
        }
        if self.retry.max_attempts == 0 {
            return Err(crate::Error::config("retry.max_attempts must be at least 1"));
        }
        if self.llm.model.trim().is_empty() {
            return Err(crate::Error::config("llm.model must not be empty"));
        }
        Ok(())
    }
}

impl Default for ReflectionConfig {
    fn default() -> Self {
        Self {
            reflection_count: default_reflection_count(),
            max_reflection_count: default_max_reflection_count(),
            per_call_timeout_secs: default_per_call_timeout_secs(),
            temperature: default_temperature(),
            max_concurrency: default_max_concurrency(),
            short_circuit_single: false,
            extraction: ExtractionMode::default(),
        }
    }
}

impl Default for RetryConfig {
    fn default() -> Self {
        Self {
            max_attempts: default_max_attempts(),
            initial_backoff_ms: default_initial_backoff_ms(),
        }
    }
}

impl Default for ServerConfig {
    fn default() -> Self {
        Self {
            host: default_host(),
            port: default_port(),
            logs: LogsConfig::default(),
            schema_dir: default_schema_dir(),
            default_schema_file: default_schema_file(),
            cors_origins: Vec::new(),
        }
    }
}

impl Default for LogsConfig {
    fn default() -> Self {
        Self {
            level: default_log_level(),
        }
    }
}

fn default_reflection_count() -> usize {
    3
}

fn default_max_reflection_count() -> usize {
    20
}

fn default_per_call_timeout_secs() -> u64 {
    300
}

fn default_temperature() -> f32 {
    0.2
}

fn default_max_concurrency() -> usize {
    10
}

fn default_max_attempts() -> u32 {
    3
}

fn default_initial_backoff_ms() -> u64 {
    1000
}

fn default_host() -> String {
    "0.0.0.0".to_string()
}

fn default_port() -> u16 {
    8080
}

fn default_log_level() -> String {
    "info".to_string()
}

fn default_schema_dir() -> String {
    "config".to_string()
}

fn default_schema_file() -> String {
    "jd_output_format.json".to_string()
}
