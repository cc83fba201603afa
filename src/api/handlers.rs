//! HTTP request handlers

use super::types::ModelsResponse;
use super::ws::chat_socket;
use super::AppState;
use axum::{
    extract::State,
    http::StatusCode,
    response::{IntoResponse, Response},
    routing::get,
    Json, Router,
};
use std::path::Path;
use tower_http::services::ServeDir;

/// Create the router
///
/// Unmatched paths fall through to the static viewer in `static_dir`.
pub fn create_router(state: AppState, static_dir: &Path) -> Router {
    Router::new()
        // Conversation stream
        .route("/chat", get(chat_socket))
        // Model catalog
        .route("/models", get(list_models))
        // Version
        .route("/version", get(get_version))
        .fallback_service(ServeDir::new(static_dir))
        .with_state(state)
}

// ============================================================
// Model Catalog
// ============================================================

/// Fetched fresh from the backend on every request
async fn list_models(State(state): State<AppState>) -> Result<Json<ModelsResponse>, AppError> {
    let models = state
        .client
        .list_models()
        .await
        .map_err(|e| AppError::Internal(e.to_string()))?;

    Ok(Json(ModelsResponse { models }))
}

// ============================================================
// Version
// ============================================================

async fn get_version() -> &'static str {
    concat!("llm-versus ", env!("CARGO_PKG_VERSION"))
}

// ============================================================
// Error Handling
// ============================================================

enum AppError {
    Internal(String),
}

impl IntoResponse for AppError {
    fn into_response(self) -> Response {
        let (status, message) = match self {
            AppError::Internal(msg) => (StatusCode::INTERNAL_SERVER_ERROR, msg),
        };

        // Plain text, not JSON: the viewer only checks the status
        (status, message).into_response()
    }
}
