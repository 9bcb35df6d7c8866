// handlers/users.rs - member directory, public profiles and employers

use axum::{
    extract::{Path, Query, State},
    Extension,
};
use serde::{Deserialize, Serialize};
use serde_json::{json, Value};

use crate::auth::SessionUser;
use crate::database::employers::EmployerFilter;
use crate::database::users::DirectoryRow;
use crate::database::{employers, employment, sections, users};
use crate::error::ApiError;
use crate::filter::{DirectoryFilter, DirectoryQuery, SortKey};
use crate::middleware::{ApiResponse, ApiResult};
use crate::state::AppState;

use super::forms::{checkbox, empty_string_as_none};

/// Directory filters as they arrive on the query string
#[derive(Debug, Default, Deserialize)]
pub struct DirectoryParams {
    #[serde(default, deserialize_with = "empty_string_as_none")]
    pub annee_diplome: Option<i32>,
    #[serde(default, deserialize_with = "empty_string_as_none")]
    pub section_id: Option<i32>,
    #[serde(default, deserialize_with = "empty_string_as_none")]
    pub employer_id: Option<i32>,
    pub search: Option<String>,
    pub sort: Option<String>,
    #[serde(default, deserialize_with = "empty_string_as_none")]
    pub page: Option<i64>,
    #[serde(default, deserialize_with = "empty_string_as_none")]
    pub limit: Option<i64>,
    #[serde(default, deserialize_with = "empty_string_as_none")]
    pub offset: Option<i64>,
    #[serde(default, deserialize_with = "checkbox")]
    pub show_admins: bool,
    #[serde(default, deserialize_with = "checkbox")]
    pub show_opted_out: bool,
    #[serde(default, deserialize_with = "checkbox")]
    pub include_inactive: bool,
}

impl DirectoryParams {
    /// Member view: the `show_*` switches only count for administrators
    pub fn to_filter(&self, session: &SessionUser) -> DirectoryFilter {
        DirectoryFilter {
            annee_diplome: self.annee_diplome,
            section_id: self.section_id,
            employer_id: self.employer_id,
            search: self.search.as_deref().map(str::trim).map(str::to_string),
            show_admins: session.is_admin && self.show_admins,
            show_opted_out: session.is_admin && self.show_opted_out,
            include_disabled: false,
            exclude_contact_opted_out: false,
            sort: SortKey::parse(self.sort.as_deref()),
            limit: None,
            offset: None,
        }
    }

    /// One-based page number, never below 1
    pub fn page(&self) -> i64 {
        self.page.unwrap_or(1).max(1)
    }
}

/// A directory page plus the numbers needed to render pagination
#[derive(Debug, Serialize)]
pub struct PagedDirectory {
    pub users: Vec<DirectoryRow>,
    pub total: i64,
    pub page: i64,
    pub per_page: i64,
    pub total_pages: i64,
}

/// Row offset of a one-based page; pages past `i64` range are refused
fn page_offset(page: i64, per_page: i64) -> Result<i64, ApiError> {
    (page - 1)
        .checked_mul(per_page)
        .ok_or_else(|| ApiError::bad_request(format!("Page {} is out of range", page)))
}

/// Run `filter` for the requested page
pub(crate) async fn directory_page(
    state: &AppState,
    mut filter: DirectoryFilter,
    page: i64,
) -> Result<PagedDirectory, ApiError> {
    let per_page = state.config.directory.per_page.max(1);
    filter.limit = Some(per_page);
    filter.offset = Some(page_offset(page, per_page)?);

    let query = DirectoryQuery::new(filter, state.config.directory.max_limit)?;
    if state.config.directory.debug_logging {
        tracing::debug!(filter = ?query.filter(), "directory page {}", page);
    }
    let result = users::list_directory(state.db.pool(), &query).await?;

    Ok(PagedDirectory {
        users: result.rows,
        total: result.total,
        page,
        per_page,
        total_pages: (result.total + per_page - 1) / per_page,
    })
}

/// Hide e-mail addresses of members who refused contact, except from
/// themselves and administrators
fn mask_contacts(rows: &mut [DirectoryRow], session: &SessionUser) {
    if session.is_admin {
        return;
    }
    for row in rows.iter_mut().filter(|r| r.opt_out_contact && r.id != session.id) {
        row.email.clear();
    }
}

/// GET /users - paginated directory
pub async fn list(
    State(state): State<AppState>,
    Extension(session): Extension<SessionUser>,
    Query(params): Query<DirectoryParams>,
) -> ApiResult<Value> {
    let filter = params.to_filter(&session);
    let mut page = directory_page(&state, filter.clone(), params.page()).await?;
    mask_contacts(&mut page.users, &session);
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

/// GET /users/api/users - directory refresh with explicit limit/offset
pub async fn api_list(
    State(state): State<AppState>,
    Extension(session): Extension<SessionUser>,
    Query(params): Query<DirectoryParams>,
) -> ApiResult<Value> {
    let mut filter = params.to_filter(&session);
    filter.limit = params.limit;
    filter.offset = params.offset;

    let query = DirectoryQuery::new(filter, state.config.directory.max_limit)?;
    let mut result = users::list_directory(state.db.pool(), &query).await?;
    mask_contacts(&mut result.rows, &session);

    Ok(ApiResponse::success(json!({
        "users": result.rows,
        "total": result.total,
    })))
}

/// GET /users/:id - member profile with visibility rules applied
pub async fn show(
    State(state): State<AppState>,
    Extension(session): Extension<SessionUser>,
    Path(id): Path<i32>,
) -> ApiResult<Value> {
    let pool = state.db.pool();
    let privileged = session.is_admin || session.id == id;

    let user = users::find_by_id(pool, id)
        .await?
        .filter(|u| u.is_approved && u.is_active)
        .filter(|u| privileged || !u.opt_out_directory)
        .ok_or_else(|| ApiError::not_found("Member not found"))?;

    let can_see_contact = privileged || !user.opt_out_contact;
    let user = if can_see_contact { user } else { user.without_contact() };
    let history = employment::list_for_user(pool, id).await?;

    Ok(ApiResponse::success(json!({
        "user": user,
        "employment": history,
        "can_see_contact": can_see_contact,
        "is_own_profile": session.id == id,
    })))
}

#[derive(Debug, Default, Deserialize)]
pub struct EmployerParams {
    pub search: Option<String>,
    pub secteur: Option<String>,
    pub ville: Option<String>,
}

impl From<EmployerParams> for EmployerFilter {
    fn from(params: EmployerParams) -> Self {
        EmployerFilter {
            search: params.search,
            secteur: params.secteur,
            ville: params.ville,
        }
    }
}

/// GET /users/employers/list
pub async fn employers_list(State(state): State<AppState>, Query(params): Query<EmployerParams>) -> ApiResult<Value> {
    let filter = EmployerFilter::from(params);
    let employers = employers::list_with_counts(state.db.pool(), &filter).await?;

    Ok(ApiResponse::success(json!({
        "employers": employers,
        "filters": {
            "search": filter.search,
            "secteur": filter.secteur,
            "ville": filter.ville,
        },
    })))
}

/// GET /users/employers/:id - employer and the members who work(ed) there
pub async fn employer_show(State(state): State<AppState>, Path(id): Path<i32>) -> ApiResult<Value> {
    let pool = state.db.pool();
    let employer = employers::find_by_id(pool, id)
        .await?
        .ok_or_else(|| ApiError::not_found("Employer not found"))?;
    let employees = employers::get_employees(pool, id).await?;

    Ok(ApiResponse::success(json!({
        "employer": employer,
        "employees": employees,
    })))
}
