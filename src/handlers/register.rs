// handlers/register.rs - public signup and registration completion

use axum::{
    extract::{Form, Path, State},
    response::{IntoResponse, Redirect, Response},
};
use serde::Deserialize;
use serde_json::{json, Value};
use tower_sessions::Session;

use crate::auth::{hash_password, password::MIN_PASSWORD_LENGTH};
use crate::database::{models::NewRegistration, registrations, sections, users, DatabaseError};
use crate::error::ApiError;
use crate::middleware::{ApiResponse, ApiResult};
use crate::state::AppState;

use super::auth::start_session;
use super::forms::{clean, Validator};

const DUPLICATE_EMAIL: &str = "An account or request already exists for this email";

#[derive(Debug, Deserialize)]
pub struct RegisterForm {
    pub email: Option<String>,
    pub prenom: Option<String>,
    pub nom: Option<String>,
    pub annee_diplome: Option<String>,
    pub section_id: Option<String>,
    pub message: Option<String>,
}

#[derive(Debug, Deserialize)]
pub struct CompleteForm {
    #[serde(default)]
    pub password: String,
    #[serde(default)]
    pub password_confirm: String,
}

/// GET /register - sections for the signup form
pub async fn register_form(State(state): State<AppState>) -> ApiResult<Value> {
    let sections = sections::list(state.db.pool()).await?;
    Ok(ApiResponse::success(json!({ "sections": sections })))
}

/// POST /register - record a signup request for admin review
pub async fn register(State(state): State<AppState>, Form(form): Form<RegisterForm>) -> Result<Response, ApiError> {
    let pool = state.db.pool();
    let mut v = Validator::new();

    let email = v.email("email", form.email);
    let prenom = v.required("prenom", form.prenom);
    let nom = v.required("nom", form.nom);
    let annee_diplome = v.year("annee_diplome", form.annee_diplome, true);
    let section_id = v.integer("section_id", form.section_id, true);

    if let Some(section_id) = section_id {
        if !sections::exists(pool, section_id).await? {
            v.add("section_id", "Unknown section");
        }
    }
    if let Some(email) = email.as_deref().filter(|_| !v.has_error("email")) {
        if users::email_exists(pool, email).await? || registrations::email_exists(pool, email).await? {
            v.add("email", DUPLICATE_EMAIL);
        }
    }

    v.finish()?;
    // Every required field produced a value once validation passed
    let (Some(email), Some(prenom), Some(nom), Some(annee_diplome), Some(section_id)) =
        (email, prenom, nom, annee_diplome, section_id)
    else {
        return Err(ApiError::bad_request("Invalid registration"));
    };

    let request = NewRegistration {
        email,
        prenom,
        nom,
        annee_diplome,
        section_id,
        message: clean(form.message),
    };

    match registrations::create(pool, &request).await {
        Ok(created) => {
            tracing::info!("Registration request {} received", created.id);
            Ok(ApiResponse::created(created).into_response())
        }
        // Lost a race with a concurrent signup for the same address
        Err(e) if e.is_duplicate() => Err(ApiError::field("email", DUPLICATE_EMAIL)),
        Err(e) => Err(e.into()),
    }
}

/// GET /register/complete/:key - summary of an approved request
pub async fn complete_form(State(state): State<AppState>, Path(key): Path<String>) -> ApiResult<Value> {
    let request = registrations::find_by_key(state.db.pool(), &key)
        .await?
        .ok_or_else(|| ApiError::not_found("Invalid or expired registration link"))?;

    Ok(ApiResponse::success(json!({ "request": request })))
}

/// POST /register/complete/:key - set a password and create the account
pub async fn complete(
    State(state): State<AppState>,
    session: Session,
    Path(key): Path<String>,
    Form(form): Form<CompleteForm>,
) -> Result<Response, ApiError> {
    let pool = state.db.pool();
    if registrations::find_by_key(pool, &key).await?.is_none() {
        return Err(ApiError::not_found("Invalid or expired registration link"));
    }

    let mut v = Validator::new();
    if form.password.chars().count() < MIN_PASSWORD_LENGTH {
        v.add(
            "password",
            format!("Password must be at least {} characters", MIN_PASSWORD_LENGTH),
        );
    }
    if form.password != form.password_confirm {
        v.add("password_confirm", "Passwords do not match");
    }
    v.finish()?;

    let password_hash = hash_password(&form.password, state.config.security.bcrypt_cost)?;

    match registrations::complete(pool, &key, &password_hash).await {
        Ok(user) => {
            tracing::info!("Registration completed for user {}", user.id);
            start_session(&session, &user, "/profile").await
        }
        Err(DatabaseError::Duplicate { .. }) => Ok(Redirect::to("/login?error=duplicate").into_response()),
        Err(e) => Err(e.into()),
    }
}
