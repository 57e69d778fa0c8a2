use reflect_aggregate::{
    JsonObject, Result,
    config::{Config, LlmConfig, LogsConfig, PromptsConfig, ReflectionConfig, RetryConfig, ServerConfig},
};
use serde_json::Value;
use tempfile::TempDir;
use tokio::fs;

/// Create a test configuration with sensible defaults
pub fn create_test_config() -> Config {
    Config {
        llm: LlmConfig {
            base_url: "https://api.openai.com/v1".to_string(),
            api_key: "test-api-key".to_string(),
            model: "gpt-4o-mini".to_string(),
            system_prompt: None,
            max_tokens: None,
        },
        reflection: ReflectionConfig::default(),
        retry: RetryConfig::default(),
        prompts: PromptsConfig::default(),
        server: ServerConfig {
            host: "127.0.0.1".to_string(),
            port: 8080,
            logs: LogsConfig {
                level: "debug".to_string(),
            },
            ..ServerConfig::default()
        },
    }
}

/// Create a temporary directory for test files
pub fn create_temp_dir() -> TempDir {
    tempfile::tempdir().expect("Failed to create temp directory")
}

/// Write a file into the temp directory and return its path
pub async fn write_file(dir: &TempDir, name: &str, content: &str) -> Result<String> {
    let path = dir.path().join(name);
    fs::write(&path, content).await?;
    Ok(path.to_string_lossy().to_string())
}

pub fn object(value: Value) -> JsonObject {
    value
        .as_object()
        .cloned()
        .expect("test value must be a JSON object")
}

pub const SKILLS_SCHEMA: &str = r#"{"skills": ["string"]}"#;

pub const JD_SCHEMA: &str = r#"{
  "job_title": "string",
  "location": "string",
  "skills": ["string"],
  "experience_years": "number"
}"#;

pub const SAMPLE_JD: &str = "We are looking for a Data Engineer in Berlin with 3+ years of \
experience in Python and SQL to build reliable data pipelines.";

/// Sample configuration YAML for testing
pub const SAMPLE_CONFIG_YAML: &str = r#"
llm:
  base_url: "http://localhost:11434/v1"
  api_key: "test-api-key"
  model: "llama3"
  system_prompt: "You are an expert HR analyst."
  max_tokens: 1000

reflection:
  reflection_count: 5
  per_call_timeout_secs: 60
  temperature: 0.3
  max_concurrency: 4
  extraction: greedy

retry:
  max_attempts: 2
  initial_backoff_ms: 250

server:
  host: "127.0.0.1"
  port: 9090
  schema_dir: "schemas"
  cors_origins:
    - "http://localhost:3000"
  logs:
    level: "debug"
"#;

/// Invalid configuration YAML for testing error cases
pub const INVALID_CONFIG_YAML: &str = r#"
llm:
  model: "gpt-4o"
reflection:
  reflection_count: "three"
"#;
