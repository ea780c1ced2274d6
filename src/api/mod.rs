use std::sync::Arc;
use std::time::Duration;

use axum::{
    Router,
    extract::State,
    http::StatusCode,
    response::{IntoResponse, Json, Response},
    routing::{get, post},
};
use serde::{Deserialize, Serialize};
use serde_json::json;

use crate::error::ErrorCode;
use crate::search::{SearchOrchestrator, SearchResult};
use crate::FoodMapError;

#[derive(Clone)]
struct AppState {
    orchestrator: Arc<SearchOrchestrator>,
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct SearchRequest {
    pub query: String,
    /// Overrides the configured per-call timeout
    pub timeout_ms: Option<u64>,
    /// Overrides the configured strict geocoding flag
    pub strict: Option<bool>,
}

#[derive(Debug, Serialize)]
pub struct ApiError {
    pub error: ErrorCode,
    pub message: String,
}

struct ApiFailure(FoodMapError);

impl IntoResponse for ApiFailure {
    fn into_response(self) -> Response {
        let status = match self.0.code() {
            ErrorCode::ValidationError => StatusCode::BAD_REQUEST,
            ErrorCode::InterpretationError | ErrorCode::GeocodingError => StatusCode::BAD_GATEWAY,
            ErrorCode::StoreUnavailable => StatusCode::SERVICE_UNAVAILABLE,
            ErrorCode::ConfigError | ErrorCode::IoError => StatusCode::INTERNAL_SERVER_ERROR,
        };
        // Error text can name server paths or upstream replies; it goes to the log only
        if status.is_server_error() {
            tracing::error!(code = self.0.code().as_str(), "Search request failed: {}", self.0);
        } else {
            tracing::warn!(code = self.0.code().as_str(), "Search request rejected: {}", self.0);
        }
        let body = ApiError {
            error: self.0.code(),
            message: self.0.user_message(),
        };
        (status, Json(body)).into_response()
    }
}

pub fn router(orchestrator: SearchOrchestrator) -> Router {
    let state = AppState {
        orchestrator: Arc::new(orchestrator),
    };

    Router::new()
        .route("/search", post(search))
        .route("/health", get(health))
        .with_state(state)
}

async fn health() -> Json<serde_json::Value> {
    Json(json!({"status": "ok"}))
}

async fn search(
    State(state): State<AppState>,
    Json(request): Json<SearchRequest>,
) -> Result<Json<SearchResult>, ApiFailure> {
    let mut options = state.orchestrator.options();
    if let Some(timeout_ms) = request.timeout_ms {
        if timeout_ms == 0 {
            return Err(ApiFailure(FoodMapError::validation(
                "timeoutMs must be greater than zero",
            )));
        }
        options.timeout = Duration::from_millis(timeout_ms);
    }
    if let Some(strict) = request.strict {
        options.strict_geocoding = strict;
    }

    let result = state
        .orchestrator
        .search_with_options(&request.query, options)
        .await
        .map_err(ApiFailure)?;
    Ok(Json(result))
}
