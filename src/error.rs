use async_openai::error::OpenAIError;
use std::time::Duration;
use thiserror::Error;

pub type Result<T> = std::result::Result<T, Error>;

#[derive(Error, Debug)]
pub enum Error {
    #[error("Configuration error: {0}")]
    Config(String),

    #[error("Invalid argument: {0}")]
    InvalidArgument(String),

    #[error("LLM error: {0}")]
    Llm(String),

    #[error("Generation error: {0}")]
    Generation(String),

    #[error("Generation timed out after {}s", .timeout.as_secs_f64())]
    Timeout { timeout: Duration },

    #[error("No JSON object found in model output")]
    NoJsonFound,

    #[error("JSON parse error: {message} (input: {snippet})")]
    JsonParse { message: String, snippet: String },

    #[error("All {failed} reflections failed: {}", .errors.join("; "))]
    AllReflectionsFailed { failed: usize, errors: Vec<String> },

    #[error("Aggregation failed: {0}")]
    AggregationFailed(Box<Error>),

    #[error("Invalid state transition: {current} -> {requested}")]
    InvalidTransition { current: String, requested: String },

    #[error("Serialization error: {0}")]
    Serialization(#[from] serde_json::Error),

    #[error("YAML error: {0}")]
    Yaml(#[from] serde_yaml::Error),

    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    #[error("Address parse error: {0}")]
    AddrParse(#[from] std::net::AddrParseError),

    #[error("OpenAI error: {0}")]
    OpenAi(#[from] OpenAIError),

    #[error("Internal error: {0}")]
    Internal(String),
}

impl Clone for Error {
    fn clone(&self) -> Self {
        match self {
            Self::Config(s) => Self::Config(s.clone()),
            Self::InvalidArgument(s) => Self::InvalidArgument(s.clone()),
            Self::Llm(s) => Self::Llm(s.clone()),
            Self::Generation(s) => Self::Generation(s.clone()),
            Self::Timeout { timeout } => Self::Timeout { timeout: *timeout },
            Self::NoJsonFound => Self::NoJsonFound,
            Self::JsonParse { message, snippet } => Self::JsonParse {
                message: message.clone(),
                snippet: snippet.clone(),
            },
            Self::AllReflectionsFailed { failed, errors } => Self::AllReflectionsFailed {
                failed: *failed,
                errors: errors.clone(),
            },
            Self::AggregationFailed(cause) => Self::AggregationFailed(cause.clone()),
            Self::InvalidTransition { current, requested } => Self::InvalidTransition {
                current: current.clone(),
                requested: requested.clone(),
            },
            Self::Internal(s) => Self::Internal(s.clone()),
            // Sources without Clone keep their message only
            Self::Serialization(e) => Self::Internal(format!("Serialization error: {}", e)),
            Self::Yaml(e) => Self::Internal(format!("YAML error: {}", e)),
            Self::Io(e) => Self::Internal(format!("IO error: {}", e)),
            Self::AddrParse(e) => Self::Internal(format!("Address parse error: {}", e)),
            Self::OpenAi(e) => Self::Internal(format!("OpenAI error: {}", e)),
        }
    }
}

impl Error {
    pub fn config(msg: impl Into<String>) -> Self {
        Self::Config(msg.into())
    }

    pub fn invalid_argument(msg: impl Into<String>) -> Self {
        Self::InvalidArgument(msg.into())
    }

    pub fn llm(msg: impl Into<String>) -> Self {
        Self::Llm(msg.into())
    }

    pub fn generation(msg: impl Into<String>) -> Self {
        Self::Generation(msg.into())
    }

    pub fn internal(msg: impl Into<String>) -> Self {
        Self::Internal(msg.into())
    }

    pub fn aggregation_failed(cause: Error) -> Self {
        Self::AggregationFailed(Box::new(cause))
    }

    /// True for backend failures that may succeed on a later attempt:
    /// transport errors, timeouts, rate limits and server-side errors.
    /// Rejected requests (bad model, bad key, bad arguments) are final.
    pub fn is_transient(&self) -> bool {
        match self {
            Self::Llm(_) | Self::Generation(_) | Self::Timeout { .. } => true,
            Self::OpenAi(e) => is_transient_openai(e),
            _ => false,
        }
    }
}

fn is_transient_openai(error: &OpenAIError) -> bool {
    match error {
        OpenAIError::Reqwest(e) => {
            e.is_timeout()
                || e.is_connect()
                || e
                    .status()
                    .is_some_and(|s| s.as_u16() == 429 || s.is_server_error())
        }
        // 5xx bodies are passed through raw, without an error type or code
        OpenAIError::ApiError(api) if api.r#type.is_none() && api.code.is_none() => true,
        OpenAIError::ApiError(api) => {
            api.code.as_deref() == Some("rate_limit_exceeded")
                || matches!(api.r#type.as_deref(), Some("server_error" | "requests" | "tokens"))
        }
        OpenAIError::StreamError(_) => true,
        _ => false,
    }
}
