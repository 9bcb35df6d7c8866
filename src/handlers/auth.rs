// handlers/auth.rs - login and logout

use axum::{
    extract::{Form, State},
    response::{IntoResponse, Redirect, Response},
    Extension,
};
use serde::Deserialize;
use serde_json::{json, Value};
use tower_sessions::Session;

use crate::auth::{close_session, open_session, verify_password, SessionUser};
use crate::database::{models::User, users};
use crate::error::ApiError;
use crate::middleware::{ApiResponse, ApiResult};
use crate::state::AppState;

#[derive(Debug, Deserialize)]
pub struct LoginForm {
    #[serde(default)]
    pub email: String,
    #[serde(default)]
    pub password: String,
}

/// Open a session for `user` and redirect to `location`
pub(crate) async fn start_session(session: &Session, user: &User, location: &str) -> Result<Response, ApiError> {
    open_session(session, user.id).await?;
    Ok(Redirect::to(location).into_response())
}

/// GET /login - login form context
pub async fn login_form(session: Option<Extension<SessionUser>>) -> ApiResult<Value> {
    Ok(ApiResponse::success(json!({ "logged_in": session.is_some() })))
}

/// POST /login - check credentials and open a session
pub async fn login(
    State(state): State<AppState>,
    session: Session,
    Form(form): Form<LoginForm>,
) -> Result<Response, ApiError> {
    let email = form.email.trim().to_lowercase();
    if email.is_empty() || form.password.is_empty() {
        return Err(ApiError::unauthorized("Invalid email or password"));
    }

    let user = users::find_by_email(state.db.pool(), &email).await?;
    let user = match user {
        Some(user) if verify_password(&form.password, &user.password_hash) => user,
        _ => {
            tracing::warn!("Failed login attempt for {}", email);
            return Err(ApiError::unauthorized("Invalid email or password"));
        }
    };

    if !user.is_active {
        tracing::warn!("Login refused for deactivated account {}", user.id);
        return Err(ApiError::forbidden("This account has been deactivated"));
    }
    if !user.is_approved {
        return Err(ApiError::forbidden("Your account is awaiting approval"));
    }

    users::touch_last_login(state.db.pool(), user.id).await?;
    tracing::info!("User {} logged in", user.id);

    let location = if user.is_admin { "/admin" } else { "/users" };
    start_session(&session, &user, location).await
}

/// GET|POST /logout - delete the stored session
pub async fn logout(session: Session, user: Option<Extension<SessionUser>>) -> Result<Response, ApiError> {
    close_session(&session).await?;
    if let Some(Extension(user)) = user {
        tracing::info!("User {} logged out", user.id);
    }
    Ok(Redirect::to("/login").into_response())
}
