/// Health check and welcome endpoints
///
/// # Endpoints
///
/// ```text
/// GET /        -> {"message": "..."}
/// GET /health  -> {"status": "healthy", "version": "0.1.0", "database": "connected"}
/// ```
///
/// `status` is `degraded` when the user store does not answer.

use crate::app::AppState;
use axum::{extract::State, Json};
use serde::{Deserialize, Serialize};

pub const WELCOME_MESSAGE: &str = "Welcome to Contacts API with Authentication";

/// Health check response
#[derive(Debug, Serialize, Deserialize)]
pub struct HealthResponse {
    pub status: String,
    pub version: String,
    pub database: String,
}

#[derive(Debug, Serialize, Deserialize)]
pub struct MessageResponse {
    pub message: String,
}

impl MessageResponse {
    pub fn new(message: impl Into<String>) -> Self {
        Self {
            message: message.into(),
        }
    }
}

pub async fn root() -> Json<MessageResponse> {
    Json(MessageResponse::new(WELCOME_MESSAGE))
}

pub async fn health_check(State(state): State<AppState>) -> Json<HealthResponse> {
    let connected = state.auth.store_healthy().await;
    if !connected {
        tracing::warn!("Health check: database unreachable");
    }

    Json(HealthResponse {
        status: if connected { "healthy" } else { "degraded" }.to_string(),
        version: env!("CARGO_PKG_VERSION").to_string(),
        database: if connected { "connected" } else { "disconnected" }.to_string(),
    })
}
