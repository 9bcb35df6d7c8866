use axum::{
    http::{header, HeaderValue, Method},
    middleware::{from_fn, from_fn_with_state},
    routing::{get, post},
    Router,
};
use tower_http::{cors::CorsLayer, trace::TraceLayer};

use crate::auth::session_layer;
use crate::config::SecurityConfig;
use crate::handlers::{admin, auth, health, profile, register, users};
use crate::middleware::{require_admin, require_approved, require_login, session_middleware};
use crate::state::AppState;

/// Build the full application router
pub fn app(state: AppState) -> Router {
    let router = Router::new()
        .merge(public_routes())
        .merge(profile_routes())
        .merge(directory_routes())
        .merge(admin_routes())
        .layer(from_fn_with_state(state.clone(), session_middleware))
        .layer(session_layer(state.db.pool().clone(), &state.config.security));

    let router = match cors_layer(&state.config.security) {
        Some(cors) => router.layer(cors),
        None => router,
    };

    router.layer(TraceLayer::new_for_http()).with_state(state)
}

fn public_routes() -> Router<AppState> {
    Router::new()
        .route("/", get(health::root))
        .route("/health", get(health::health))
        .route("/login", get(auth::login_form).post(auth::login))
        .route("/logout", get(auth::logout).post(auth::logout))
        .route("/register", get(register::register_form).post(register::register))
        .route(
            "/register/complete/:key",
            get(register::complete_form).post(register::complete),
        )
}

fn profile_routes() -> Router<AppState> {
    Router::new()
        .route("/profile", get(profile::show).post(profile::update))
        .route("/profile/password", post(profile::change_password))
        .route("/profile/employment", post(profile::add_employment))
        .route("/profile/employment/:id", post(profile::update_employment))
        .route("/profile/employment/:id/delete", post(profile::delete_employment))
        .route_layer(from_fn(require_login))
}

fn directory_routes() -> Router<AppState> {
    Router::new()
        .route("/users", get(users::list))
        .route("/users/api/users", get(users::api_list))
        .route("/users/employers/list", get(users::employers_list))
        .route("/users/employers/:id", get(users::employer_show))
        .route("/users/:id", get(users::show))
        .route_layer(from_fn(require_approved))
}

fn admin_routes() -> Router<AppState> {
    Router::new()
        .route("/admin", get(admin::dashboard::dashboard))
        // Registration requests
        .route("/admin/requests", get(admin::requests::list))
        .route("/admin/requests/:id/approve", post(admin::requests::approve))
        .route("/admin/requests/:id/reject", post(admin::requests::reject))
        // Accounts
        .route("/admin/users", get(admin::users::list))
        .route("/admin/users/:id", get(admin::users::show).post(admin::users::update))
        .route("/admin/users/:id/toggle-status", post(admin::users::toggle_status))
        // Sections
        .route("/admin/sections", get(admin::sections::list).post(admin::sections::create))
        .route("/admin/sections/:id", post(admin::sections::update))
        .route("/admin/sections/:id/delete", post(admin::sections::delete))
        // Exports
        .route("/admin/export/users", get(admin::export::export_users))
        .route("/admin/employers/export", get(admin::export::export_employers))
        .route_layer(from_fn(require_admin))
}

/// Cross-origin access is off unless enabled, and then limited to the
/// configured origins
fn cors_layer(security: &SecurityConfig) -> Option<CorsLayer> {
    if !security.enable_cors {
        return None;
    }

    let origins: Vec<HeaderValue> = security
        .cors_origins
        .iter()
        .filter_map(|origin| match origin.parse::<HeaderValue>() {
            Ok(value) => Some(value),
            Err(_) => {
                tracing::warn!("Ignoring invalid CORS origin: {}", origin);
                None
            }
        })
        .collect();

    Some(
        CorsLayer::new()
            .allow_origin(origins)
            .allow_methods([Method::GET, Method::POST])
            .allow_headers([header::CONTENT_TYPE])
            .allow_credentials(true),
    )
}
