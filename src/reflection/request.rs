use crate::{Error, Result};
use serde::Serialize;
use serde_json::{Map, Value};
use std::time::Duration;

/// A parsed JSON object: string keys to arbitrary JSON values.
pub type JsonObject = Map<String, Value>;

pub const DEFAULT_REFLECTION_COUNT: usize = 3;
pub const DEFAULT_PER_CALL_TIMEOUT: Duration = Duration::from_secs(300);
pub const DEFAULT_TEMPERATURE: f32 = 0.2;

#[derive(Debug, Clone, PartialEq)]
pub struct GenerationRequest {
    pub task_text: String,
    pub schema_description: String,
    pub reflection_count: usize,
    pub per_call_timeout: Duration,
    pub temperature: f32,
}

impl GenerationRequest {
    pub fn new(task_text: impl Into<String>, schema_description: impl Into<String>) -> Self {
        Self {
            task_text: task_text.into(),
            schema_description: schema_description.into(),
            reflection_count: DEFAULT_REFLECTION_COUNT,
            per_call_timeout: DEFAULT_PER_CALL_TIMEOUT,
            temperature: DEFAULT_TEMPERATURE,
        }
    }

    pub fn with_reflection_count(mut self, reflection_count: usize) -> Self {
        self.reflection_count = reflection_count;
        self
    }

    pub fn with_timeout(mut self, per_call_timeout: Duration) -> Self {
        self.per_call_timeout = per_call_timeout;
        self
    }

    pub fn with_temperature(mut self, temperature: f32) -> Self {
        self.temperature = temperature;
        self
    }

    pub fn validate(&self) -> Result<()> {
        if self.task_text.trim().is_empty() {
            return Err(Error::invalid_argument("task text cannot be empty"));
        }
        if self.schema_description.trim().is_empty() {
            return Err(Error::invalid_argument("schema description cannot be empty"));
        }
        if self.reflection_count == 0 {
            return Err(Error::invalid_argument("reflection count must be positive"));
        }
        if self.per_call_timeout.is_zero() {
            return Err(Error::invalid_argument("per-call timeout must be non-zero"));
        }
        Ok(())
    }
}

/// Outcome of a single reflection slot.
#[derive(Debug, Clone)]
pub enum ReflectionResult {
    Success(JsonObject),
    Failure(Error),
}

impl ReflectionResult {
    pub fn is_success(&self) -> bool {
        matches!(self, Self::Success(_))
    }

    pub fn into_success(self) -> Option<JsonObject> {
        match self {
            Self::Success(object) => Some(object),
            Self::Failure(_) => None,
        }
    }
}

impl From<Result<JsonObject>> for ReflectionResult {
    fn from(result: Result<JsonObject>) -> Self {
        match result {
            Ok(object) => Self::Success(object),
            Err(e) => Self::Failure(e),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct AggregatedResult {
    pub merged: JsonObject,
    pub reflections_succeeded: usize,
    pub reflections_failed: usize,
}
