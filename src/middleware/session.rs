use axum::{
    extract::{Request, State},
    middleware::Next,
    response::{IntoResponse, Redirect, Response},
};
use tower_sessions::Session;

use crate::auth::{close_session, session_user_id, SessionUser};
use crate::database::users;
use crate::error::ApiError;
use crate::state::AppState;

/// Resolve the session to a current, active account and attach it to the
/// request.
///
/// Sessions pointing at a deleted or deactivated account are ended here,
/// which leaves the request anonymous; the route gates below decide what an
/// anonymous request may do.
pub async fn session_middleware(
    State(state): State<AppState>,
    session: Session,
    mut request: Request,
    next: Next,
) -> Response {
    match load_user(&state, &session).await {
        Ok(Some(user)) => {
            request.extensions_mut().insert(user);
        }
        Ok(None) => {}
        Err(e) => return e.into_response(),
    }

    next.run(request).await
}

async fn load_user(state: &AppState, session: &Session) -> Result<Option<SessionUser>, ApiError> {
    let Some(user_id) = session_user_id(session).await? else {
        return Ok(None);
    };

    match users::find_by_id(state.db.pool(), user_id).await? {
        Some(user) if user.is_active => Ok(Some(SessionUser::from(&user))),
        _ => {
            tracing::info!("Ending session of unavailable account {}", user_id);
            close_session(session).await?;
            Ok(None)
        }
    }
}

/// Anonymous requests are sent to the login page
pub async fn require_login(request: Request, next: Next) -> Response {
    if request.extensions().get::<SessionUser>().is_none() {
        return Redirect::to("/login").into_response();
    }
    next.run(request).await
}

pub async fn require_approved(request: Request, next: Next) -> Response {
    match request.extensions().get::<SessionUser>() {
        None => Redirect::to("/login").into_response(),
        Some(user) if !user.is_approved => {
            tracing::warn!("Unapproved account {} denied directory access", user.id);
            ApiError::forbidden("Your account is awaiting approval").into_response()
        }
        Some(_) => next.run(request).await,
    }
}

pub async fn require_admin(request: Request, next: Next) -> Response {
    match request.extensions().get::<SessionUser>() {
        None => Redirect::to("/login").into_response(),
        Some(user) if !user.is_admin => {
            tracing::warn!("User {} denied access to {}", user.id, request.uri().path());
            ApiError::forbidden("Administrator access required").into_response()
        }
        Some(_) => next.run(request).await,
    }
}
