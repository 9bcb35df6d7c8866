use axum::{
    extract::{Form, Path, State},
    response::{IntoResponse, Redirect, Response},
    Extension,
};
use serde::Deserialize;
use serde_json::{json, Value};

use crate::auth::SessionUser;
use crate::database::models::SectionInput;
use crate::database::{sections, DatabaseError};
use crate::error::ApiError;
use crate::handlers::forms::{clean, Validator};
use crate::middleware::{ApiResponse, ApiResult};
use crate::state::AppState;

#[derive(Debug, Deserialize)]
pub struct SectionForm {
    pub nom: Option<String>,
    pub description: Option<String>,
}

impl SectionForm {
    fn validate(self) -> Result<SectionInput, ApiError> {
        let mut v = Validator::new();
        let nom = v.required("nom", self.nom);
        v.finish()?;

        Ok(SectionInput {
            nom: nom.unwrap_or_default(),
            description: clean(self.description),
        })
    }
}

fn redirect(flag: &str) -> Response {
    Redirect::to(&format!("/admin/sections?{}", flag)).into_response()
}

/// GET /admin/sections - sections with member counts
pub async fn list(State(state): State<AppState>) -> ApiResult<Value> {
    let sections = sections::list_with_counts(state.db.pool()).await?;
    Ok(ApiResponse::success(json!({ "sections": sections })))
}

/// POST /admin/sections
pub async fn create(
    State(state): State<AppState>,
    Extension(session): Extension<SessionUser>,
    Form(form): Form<SectionForm>,
) -> Result<Response, ApiError> {
    let input = form.validate()?;
    match sections::create(state.db.pool(), &input).await {
        Ok(section) => {
            tracing::info!("Admin {} created section {}", session.id, section.id);
            Ok(redirect("success=created"))
        }
        Err(DatabaseError::Duplicate { .. }) => Ok(redirect("error=duplicate")),
        Err(e) => Err(e.into()),
    }
}

/// POST /admin/sections/:id
pub async fn update(
    State(state): State<AppState>,
    Path(id): Path<i32>,
    Form(form): Form<SectionForm>,
) -> Result<Response, ApiError> {
    let input = form.validate()?;
    match sections::update(state.db.pool(), id, &input).await {
        Ok(_) => Ok(redirect("success=updated")),
        Err(DatabaseError::Duplicate { .. }) => Ok(redirect("error=duplicate")),
        Err(e) => Err(e.into()),
    }
}

/// POST /admin/sections/:id/delete - refused while members or requests use it
pub async fn delete(
    State(state): State<AppState>,
    Extension(session): Extension<SessionUser>,
    Path(id): Path<i32>,
) -> Result<Response, ApiError> {
    match sections::delete(state.db.pool(), id).await {
        Ok(()) => {
            tracing::info!("Admin {} deleted section {}", session.id, id);
            Ok(redirect("success=deleted"))
        }
        Err(DatabaseError::ForeignKey { .. }) => Ok(redirect("error=in_use")),
        Err(e) => Err(e.into()),
    }
}
