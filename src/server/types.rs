use crate::reflection::JsonObject;
use serde::{Deserialize, Serialize};

#[derive(Debug, Deserialize)]
pub struct ScanRequest {
    pub job_description: String,
    #[serde(default)]
    pub llm_reflection_count: Option<i64>,
    #[serde(default)]
    pub config_file_path: Option<String>,
}

#[derive(Debug, Serialize, Deserialize)]
pub struct ScanResponse {
    pub request_id: String,
    pub result: JsonObject,
    pub reflections_succeeded: usize,
    pub reflections_failed: usize,
}

#[derive(Debug, Serialize, Deserialize)]
pub struct ErrorResponse {
    pub error: String,
}

#[derive(Debug, Serialize, Deserialize)]
pub struct HealthResponse {
    pub status: String,
}
