use super::types::{ErrorResponse, HealthResponse, ScanRequest, ScanResponse};
use crate::{Error, scanner::JdScanner};
use axum::{extract::State, http::StatusCode, response::Json};
use std::sync::Arc;
use tracing::{error, info, warn};
use uuid::Uuid;

#[derive(Clone)]
pub struct AppState {
    pub scanner: Arc<JdScanner>,
}

type ApiError = (StatusCode, Json<ErrorResponse>);

pub async fn scan_jd(
    State(state): State<AppState>,
    Json(request): Json<ScanRequest>,
) -> Result<Json<ScanResponse>, ApiError> {
    let request_id = Uuid::new_v4().to_string();
    info!(
        "Received scan request {} ({} chars)",
        request_id,
        request.job_description.len()
    );

    let reflection_count = request
        .llm_reflection_count
        .map(|count| {
            usize::try_from(count)
                .ok()
                .filter(|count| *count > 0)
                .ok_or_else(|| Error::invalid_argument("llm_reflection_count must be positive"))
        })
        .transpose()
        .map_err(|e| error_response(&request_id, e))?;

    match state
        .scanner
        .scan(
            &request.job_description,
            reflection_count,
            request.config_file_path.as_deref(),
        )
        .await
    {
        Ok(result) => {
            info!("Successfully processed scan request {}", request_id);
            Ok(Json(ScanResponse {
                request_id,
                result: result.merged,
                reflections_succeeded: result.reflections_succeeded,
                reflections_failed: result.reflections_failed,
            }))
        }
        Err(e) => Err(error_response(&request_id, e)),
    }
}

pub async fn health() -> Json<HealthResponse> {
    Json(HealthResponse {
        status: "ok".to_string(),
    })
}

pub fn status_for(error: &Error) -> StatusCode {
    match error {
        Error::InvalidArgument(_) => StatusCode::BAD_REQUEST,
        Error::AllReflectionsFailed { .. } | Error::AggregationFailed(_) => {
            StatusCode::BAD_GATEWAY
        }
        Error::Io(e) if e.kind() == std::io::ErrorKind::NotFound => StatusCode::NOT_FOUND,
        _ => StatusCode::INTERNAL_SERVER_ERROR,
    }
}

fn error_response(request_id: &str, e: Error) -> ApiError {
    let status = status_for(&e);
    if status.is_server_error() {
        error!("Failed to process scan request {}: {}", request_id, e);
    } else {
        warn!("Rejected scan request {}: {}", request_id, e);
    }
    (
        status,
        Json(ErrorResponse {
            error: e.to_string(),
        }),
    )
}
