use axum::{
    extract::{Path, State},
    response::{IntoResponse, Redirect, Response},
    Extension,
};
use serde_json::{json, Value};
use uuid::Uuid;

use crate::auth::SessionUser;
use crate::database::registrations;
use crate::error::ApiError;
use crate::middleware::{ApiResponse, ApiResult};
use crate::state::AppState;

/// Link an approved applicant follows to choose a password
pub fn completion_url(public_url: &str, key: &str) -> String {
    format!("{}/register/complete/{}", public_url.trim_end_matches('/'), key)
}

/// GET /admin/requests - pending and approved signups, oldest first
pub async fn list(State(state): State<AppState>) -> ApiResult<Value> {
    let requests = registrations::list(state.db.pool()).await?;
    Ok(ApiResponse::success(json!({ "requests": requests })))
}

/// POST /admin/requests/:id/approve
///
/// Generates a fresh registration key and hands the completion link back
/// to the administrator, who forwards it to the applicant.
pub async fn approve(
    State(state): State<AppState>,
    Extension(session): Extension<SessionUser>,
    Path(id): Path<i32>,
) -> ApiResult<Value> {
    let key = Uuid::new_v4().simple().to_string();
    let request = registrations::approve(state.db.pool(), id, &key).await?;
    tracing::info!("Admin {} approved registration request {}", session.id, id);

    Ok(ApiResponse::success(json!({
        "request": request,
        "completion_url": completion_url(&state.config.server.public_url, &key),
    })))
}

/// POST /admin/requests/:id/reject - discard the request
pub async fn reject(
    State(state): State<AppState>,
    Extension(session): Extension<SessionUser>,
    Path(id): Path<i32>,
) -> Result<Response, ApiError> {
    registrations::delete(state.db.pool(), id).await?;
    tracing::info!("Admin {} rejected registration request {}", session.id, id);

    Ok(Redirect::to("/admin/requests?success=rejected").into_response())
}
