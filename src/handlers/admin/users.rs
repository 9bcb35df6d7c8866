use axum::{
    extract::{Form, Path, Query, State},
    response::{IntoResponse, Redirect, Response},
    Extension,
};
use serde::Deserialize;
use serde_json::{json, Value};

use crate::auth::SessionUser;
use crate::database::models::{AdminUserUpdate, EmploymentStatus};
use crate::database::{employment, sections, users, DatabaseError};
use crate::error::ApiError;
use crate::filter::{DirectoryFilter, SortKey};
use crate::handlers::forms::{checkbox, Validator};
use crate::handlers::profile::ProfileForm;
use crate::handlers::users::{directory_page, DirectoryParams};
use crate::middleware::{ApiResponse, ApiResult};
use crate::state::AppState;

impl DirectoryParams {
    /// Administrator view: admins and opted-out members are listed by default
    pub fn to_admin_filter(&self) -> DirectoryFilter {
        DirectoryFilter {
            annee_diplome: self.annee_diplome,
            section_id: self.section_id,
            employer_id: self.employer_id,
            search: self.search.as_deref().map(str::trim).map(str::to_string),
            show_admins: true,
            show_opted_out: true,
            include_disabled: self.include_inactive,
            exclude_contact_opted_out: false,
            sort: SortKey::parse(self.sort.as_deref()),
            limit: None,
            offset: None,
        }
    }
}

#[derive(Debug, Deserialize)]
pub struct AdminUserForm {
    #[serde(flatten)]
    pub profile: ProfileForm,
    pub email: Option<String>,
    pub annee_diplome: Option<String>,
    pub section_id: Option<String>,
    #[serde(default, deserialize_with = "checkbox")]
    pub is_admin: bool,
    #[serde(default, deserialize_with = "checkbox")]
    pub is_approved: bool,
    #[serde(default, deserialize_with = "checkbox")]
    pub is_active: bool,
}

impl AdminUserForm {
    fn validate(self, v: &mut Validator) -> AdminUserUpdate {
        let profile = self.profile.validate(v);
        AdminUserUpdate {
            profile,
            email: v.email("email", self.email).unwrap_or_default(),
            annee_diplome: v.year("annee_diplome", self.annee_diplome, false),
            section_id: v.integer("section_id", self.section_id, false),
            is_admin: self.is_admin,
            is_approved: self.is_approved,
            is_active: self.is_active,
        }
    }
}

/// GET /admin/users - every account, paginated
pub async fn list(State(state): State<AppState>, Query(params): Query<DirectoryParams>) -> ApiResult<Value> {
    let filter = params.to_admin_filter();
    let page = directory_page(&state, filter.clone(), params.page()).await?;
    let sections = sections::list(state.db.pool()).await?;

    Ok(ApiResponse::success(json!({
        "users": page.users,
        "total": page.total,
        "page": page.page,
        "per_page": page.per_page,
        "total_pages": page.total_pages,
        "sections": sections,
        "filters": filter,
    })))
}

/// GET /admin/users/:id - full account for editing
pub async fn show(State(state): State<AppState>, Path(id): Path<i32>) -> ApiResult<Value> {
    let pool = state.db.pool();
    let user = users::find_by_id(pool, id)
        .await?
        .ok_or_else(|| ApiError::not_found("User not found"))?;
    let history = employment::list_for_user(pool, id).await?;
    let sections = sections::list(pool).await?;

    Ok(ApiResponse::success(json!({
        "user": user,
        "employment": history,
        "sections": sections,
        "statuts_emploi": EmploymentStatus::ALL,
    })))
}

/// POST /admin/users/:id - edit any field of an account
pub async fn update(
    State(state): State<AppState>,
    Extension(session): Extension<SessionUser>,
    Path(id): Path<i32>,
    Form(form): Form<AdminUserForm>,
) -> Result<Response, ApiError> {
    let pool = state.db.pool();
    let mut v = Validator::new();
    let update = form.validate(&mut v);
    v.finish()?;

    if id == session.id && !update.is_active {
        return Err(ApiError::bad_request("You cannot deactivate your own account"));
    }
    if let Some(section_id) = update.section_id {
        if !sections::exists(pool, section_id).await? {
            return Ok(Redirect::to(&format!("/admin/users/{}?error=invalid_section", id)).into_response());
        }
    }

    match users::admin_update(pool, id, &update).await {
        Ok(user) => {
            tracing::info!("Admin {} updated user {}", session.id, user.id);
            Ok(Redirect::to(&format!("/admin/users/{}?success=updated", id)).into_response())
        }
        Err(DatabaseError::Duplicate { .. }) => {
            Ok(Redirect::to(&format!("/admin/users/{}?error=duplicate", id)).into_response())
        }
        Err(DatabaseError::ForeignKey { .. }) => {
            Ok(Redirect::to(&format!("/admin/users/{}?error=invalid_section", id)).into_response())
        }
        Err(e) => Err(e.into()),
    }
}

/// POST /admin/users/:id/toggle-status - activate or deactivate an account
pub async fn toggle_status(
    State(state): State<AppState>,
    Extension(session): Extension<SessionUser>,
    Path(id): Path<i32>,
) -> Result<Response, ApiError> {
    if id == session.id {
        return Err(ApiError::bad_request("You cannot deactivate your own account"));
    }

    let active = users::toggle_active(state.db.pool(), id).await?;
    tracing::info!(
        "Admin {} {} user {}",
        session.id,
        if active { "activated" } else { "deactivated" },
        id
    );

    Ok(Redirect::to("/admin/users?success=updated").into_response())
}
