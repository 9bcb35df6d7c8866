// handlers/profile.rs - self-service profile, password and employment history

use axum::{
    extract::{Form, Path, State},
    response::{IntoResponse, Redirect, Response},
    Extension,
};
use serde::Deserialize;
use serde_json::{json, Value};

use crate::auth::{hash_password, password::MIN_PASSWORD_LENGTH, verify_password, SessionUser};
use crate::database::models::{EmployerRef, EmploymentInput, EmploymentStatus, NewEmployer, ProfileUpdate};
use crate::database::{employers, employment, sections, users};
use crate::error::ApiError;
use crate::middleware::{ApiResponse, ApiResult};
use crate::state::AppState;

use super::forms::{checkbox, clean, Validator};

/// Self-edit fields, also embedded in the admin edit form
#[derive(Debug, Default, Deserialize)]
pub struct ProfileForm {
    pub prenom: Option<String>,
    pub nom: Option<String>,
    pub telephone: Option<String>,
    pub adresse: Option<String>,
    pub ville: Option<String>,
    pub code_postal: Option<String>,
    pub pays: Option<String>,
    pub linkedin: Option<String>,
    pub github: Option<String>,
    pub site_web: Option<String>,
    pub biographie: Option<String>,
    pub statut_emploi: Option<String>,
    #[serde(default, deserialize_with = "checkbox")]
    pub opt_out_contact: bool,
    #[serde(default, deserialize_with = "checkbox")]
    pub opt_out_directory: bool,
}

impl ProfileForm {
    /// Validate into a [`ProfileUpdate`], recording problems in `v`
    pub fn validate(self, v: &mut Validator) -> ProfileUpdate {
        ProfileUpdate {
            prenom: v.required("prenom", self.prenom).unwrap_or_default(),
            nom: v.required("nom", self.nom).unwrap_or_default(),
            telephone: clean(self.telephone),
            adresse: clean(self.adresse),
            ville: clean(self.ville),
            code_postal: clean(self.code_postal),
            pays: clean(self.pays),
            linkedin: v.url("linkedin", self.linkedin),
            github: v.url("github", self.github),
            site_web: v.url("site_web", self.site_web),
            biographie: clean(self.biographie),
            statut_emploi: v.parsed::<EmploymentStatus>(
                "statut_emploi",
                self.statut_emploi,
                "Unknown employment status",
            ),
            opt_out_contact: self.opt_out_contact,
            opt_out_directory: self.opt_out_directory,
        }
    }
}

#[derive(Debug, Deserialize)]
pub struct PasswordForm {
    #[serde(default)]
    pub current_password: String,
    #[serde(default)]
    pub new_password: String,
    #[serde(default)]
    pub new_password_confirm: String,
}

#[derive(Debug, Deserialize)]
pub struct EmploymentForm {
    pub employer_id: Option<String>,
    pub employer_nom: Option<String>,
    pub secteur: Option<String>,
    pub ville: Option<String>,
    pub poste: Option<String>,
    pub date_debut: Option<String>,
    pub date_fin: Option<String>,
    #[serde(default, deserialize_with = "checkbox")]
    pub is_current: bool,
}

impl EmploymentForm {
    /// Either an existing `employer_id` or a new employer name is required
    fn validate(self, v: &mut Validator) -> Option<EmploymentInput> {
        let employer_id = v.integer("employer_id", self.employer_id, false);
        let employer = match (employer_id, clean(self.employer_nom)) {
            (Some(id), _) => Some(EmployerRef::Existing(id)),
            (None, Some(nom)) => Some(EmployerRef::New(NewEmployer {
                nom,
                secteur: clean(self.secteur),
                ville: clean(self.ville),
            })),
            (None, None) => {
                v.add("employer_id", "Choose an employer or enter a new one");
                None
            }
        };

        let date_debut = v.date("date_debut", self.date_debut);
        let date_fin = v.date("date_fin", self.date_fin);
        if let (Some(debut), Some(fin)) = (date_debut, date_fin) {
            if fin < debut {
                v.add("date_fin", "End date cannot be before start date");
            }
        }

        Some(EmploymentInput {
            employer: employer?,
            poste: clean(self.poste),
            date_debut,
            date_fin,
            is_current: self.is_current,
        })
    }
}

/// GET /profile - own account, sections and employment history
pub async fn show(State(state): State<AppState>, Extension(session): Extension<SessionUser>) -> ApiResult<Value> {
    let pool = state.db.pool();
    let user = users::find_by_id(pool, session.id)
        .await?
        .ok_or_else(|| ApiError::not_found("User not found"))?;
    let sections = sections::list(pool).await?;
    let history = employment::list_for_user(pool, session.id).await?;

    Ok(ApiResponse::success(json!({
        "user": user,
        "sections": sections,
        "employment": history,
        "statuts_emploi": EmploymentStatus::ALL,
    })))
}

/// POST /profile - apply the self-edit allow-list
pub async fn update(
    State(state): State<AppState>,
    Extension(session): Extension<SessionUser>,
    Form(form): Form<ProfileForm>,
) -> Result<Response, ApiError> {
    let mut v = Validator::new();
    let update = form.validate(&mut v);
    v.finish()?;

    let user = users::update_profile(state.db.pool(), session.id, &update).await?;
    tracing::info!("User {} updated their profile", user.id);

    Ok(Redirect::to("/profile?success=updated").into_response())
}

/// POST /profile/password
pub async fn change_password(
    State(state): State<AppState>,
    Extension(session): Extension<SessionUser>,
    Form(form): Form<PasswordForm>,
) -> Result<Response, ApiError> {
    let pool = state.db.pool();
    let user = users::find_by_id(pool, session.id)
        .await?
        .ok_or_else(|| ApiError::not_found("User not found"))?;

    let mut v = Validator::new();
    if !verify_password(&form.current_password, &user.password_hash) {
        v.add("current_password", "Current password is incorrect");
    }
    if form.new_password.chars().count() < MIN_PASSWORD_LENGTH {
        v.add(
            "new_password",
            format!("Password must be at least {} characters", MIN_PASSWORD_LENGTH),
        );
    }
    if form.new_password != form.new_password_confirm {
        v.add("new_password_confirm", "Passwords do not match");
    }
    v.finish()?;

    let hash = hash_password(&form.new_password, state.config.security.bcrypt_cost)?;
    users::update_password(pool, user.id, &hash).await?;
    tracing::info!("User {} changed their password", user.id);

    Ok(Redirect::to("/profile?success=password").into_response())
}

async fn validate_employment(state: &AppState, form: EmploymentForm) -> Result<EmploymentInput, ApiError> {
    let mut v = Validator::new();
    let input = form.validate(&mut v);

    if let Some(EmploymentInput { employer: EmployerRef::Existing(id), .. }) = &input {
        if employers::find_by_id(state.db.pool(), *id).await?.is_none() {
            v.add("employer_id", "Unknown employer");
        }
    }
    v.finish()?;

    input.ok_or_else(|| ApiError::bad_request("Invalid employment"))
}

/// POST /profile/employment - add a position
pub async fn add_employment(
    State(state): State<AppState>,
    Extension(session): Extension<SessionUser>,
    Form(form): Form<EmploymentForm>,
) -> Result<Response, ApiError> {
    let input = validate_employment(&state, form).await?;
    let row = employment::create(state.db.pool(), session.id, &input).await?;
    tracing::info!("User {} added employment {}", session.id, row.id);

    Ok(Redirect::to("/profile?success=employment").into_response())
}

/// POST /profile/employment/:id - edit one of the caller's positions
pub async fn update_employment(
    State(state): State<AppState>,
    Extension(session): Extension<SessionUser>,
    Path(id): Path<i32>,
    Form(form): Form<EmploymentForm>,
) -> Result<Response, ApiError> {
    let input = validate_employment(&state, form).await?;
    employment::update(state.db.pool(), id, session.id, &input).await?;

    Ok(Redirect::to("/profile?success=employment").into_response())
}

/// POST /profile/employment/:id/delete
pub async fn delete_employment(
    State(state): State<AppState>,
    Extension(session): Extension<SessionUser>,
    Path(id): Path<i32>,
) -> Result<Response, ApiError> {
    employment::delete(state.db.pool(), id, session.id).await?;
    tracing::info!("User {} removed employment {}", session.id, id);

    Ok(Redirect::to("/profile?success=employment").into_response())
}
