use axum::{extract::State, http::StatusCode, response::IntoResponse, Json};
use serde_json::{json, Value};

use crate::state::AppState;

/// GET / - service banner
pub async fn root() -> Json<Value> {
    Json(json!({
        "success": true,
        "data": {
            "name": "Alumni Directory",
            "version": env!("CARGO_PKG_VERSION"),
            "endpoints": {
                "auth": "/login, /logout, /register, /register/complete/:key (public)",
                "profile": "/profile[/password|/employment] (login)",
                "directory": "/users, /users/api/users, /users/:id, /users/employers/* (approved members)",
                "admin": "/admin, /admin/requests, /admin/users, /admin/sections, /admin/export/users, /admin/employers/export (administrators)",
                "health": "/health (public)",
            }
        }
    }))
}

/// GET /health - database round trip
pub async fn health(State(state): State<AppState>) -> impl IntoResponse {
    let now = chrono::Utc::now();

    match state.db.health_check().await {
        Ok(()) => (
            StatusCode::OK,
            Json(json!({
                "success": true,
                "data": {
                    "status": "ok",
                    "timestamp": now,
                    "database": "ok"
                }
            })),
        ),
        Err(e) => {
            tracing::error!("Health check failed: {}", e);
            (
                StatusCode::SERVICE_UNAVAILABLE,
                Json(json!({
                    "success": false,
                    "error": "database unavailable",
                    "data": {
                        "status": "degraded",
                        "timestamp": now
                    }
                })),
            )
        }
    }
}
