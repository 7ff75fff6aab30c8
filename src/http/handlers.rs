use super::state::AppState;
use crate::speech::VoiceLocale;
use axum::{
    extract::State,
    http::StatusCode,
    response::{IntoResponse, Json},
};
use serde::{Deserialize, Serialize};
use tracing::{error, info};

// ============================================================================
// Request/Response Types
// ============================================================================

#[derive(Debug, Deserialize)]
pub struct SetLocaleRequest {
    /// Voice locale tag: "en-US", "it-IT", "zh-CN" or "grandma"
    pub locale: String,
}

#[derive(Debug, Serialize)]
pub struct SetLocaleResponse {
    pub locale: VoiceLocale,
    pub status: String,
}

#[derive(Debug, Serialize)]
pub struct ErrorResponse {
    pub error: String,
}

// ============================================================================
// Handlers
// ============================================================================

/// GET /session/status
/// Snapshot of the running session
pub async fn get_session_status(State(state): State<AppState>) -> impl IntoResponse {
    let view = state.session.snapshot().await;
    (StatusCode::OK, Json(view))
}

/// POST /session/locale
/// Switch the assistant voice; the session greets in the new voice
pub async fn set_locale(
    State(state): State<AppState>,
    Json(req): Json<SetLocaleRequest>,
) -> impl IntoResponse {
    let locale: VoiceLocale = match req.locale.parse() {
        Ok(locale) => locale,
        Err(e) => {
            return (
                StatusCode::BAD_REQUEST,
                Json(ErrorResponse {
                    error: e.to_string(),
                }),
            )
                .into_response();
        }
    };

    info!("Locale change requested: {}", locale);

    if let Err(e) = state.session.set_locale(locale).await {
        error!("Failed to deliver locale change: {}", e);
        return (
            StatusCode::CONFLICT,
            Json(ErrorResponse {
                error: format!("Failed to deliver locale change: {}", e),
            }),
        )
            .into_response();
    }

    (
        StatusCode::OK,
        Json(SetLocaleResponse {
            locale,
            status: "accepted".to_string(),
        }),
    )
        .into_response()
}

/// GET /completions
/// All stored completed sessions, newest first
pub async fn list_completions(State(state): State<AppState>) -> impl IntoResponse {
    match state.store.list_completions().await {
        Ok(completions) => (StatusCode::OK, Json(completions)).into_response(),
        Err(e) => {
            error!("Failed to list completions: {}", e);
            (
                StatusCode::INTERNAL_SERVER_ERROR,
                Json(ErrorResponse {
                    error: format!("Failed to list completions: {}", e),
                }),
            )
                .into_response()
        }
    }
}

/// GET /health
/// Health check endpoint
pub async fn health_check() -> impl IntoResponse {
    (StatusCode::OK, "OK")
}
