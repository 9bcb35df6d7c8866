use axum::{
    extract::{Query, State},
    http::header,
    response::{IntoResponse, Response},
    Extension,
};
use chrono::Utc;
use serde::Deserialize;

use crate::auth::SessionUser;
use crate::database::employers::{self, EmployerFilter};
use crate::database::users;
use crate::error::ApiError;
use crate::export::{employers_table, users_table, ExportFormat, Table};
use crate::filter::DirectoryQuery;
use crate::handlers::users::{DirectoryParams, EmployerParams};
use crate::state::AppState;

#[derive(Debug, Default, Deserialize)]
pub struct FormatParam {
    pub format: Option<String>,
}

impl FormatParam {
    fn parse(&self) -> Result<ExportFormat, ApiError> {
        self.format
            .as_deref()
            .unwrap_or_default()
            .parse()
            .map_err(|e: String| ApiError::bad_request(e))
    }
}

fn attachment(table: &Table, format: ExportFormat, name: &str) -> Result<Response, ApiError> {
    let body = table.render(format).map_err(|e| {
        tracing::error!("Export rendering failed: {}", e);
        ApiError::internal_server_error("Failed to build export")
    })?;
    let filename = format!("{}-{}.{}", name, Utc::now().format("%Y%m%d"), format.extension());

    Ok((
        [
            (header::CONTENT_TYPE, format.content_type().to_string()),
            (
                header::CONTENT_DISPOSITION,
                format!("attachment; filename=\"{}\"", filename),
            ),
        ],
        body,
    )
        .into_response())
}

/// GET /admin/export/users?format=csv|txt
///
/// Same filters as the admin listing, without pagination. Members who
/// opted out of contact sharing never appear in an export.
pub async fn export_users(
    State(state): State<AppState>,
    Extension(session): Extension<SessionUser>,
    Query(format): Query<FormatParam>,
    Query(params): Query<DirectoryParams>,
) -> Result<Response, ApiError> {
    let format = format.parse()?;
    let mut filter = params.to_admin_filter();
    filter.exclude_contact_opted_out = true;

    // No limit: exports cover the whole filtered set
    let query = DirectoryQuery::new(filter, None)?;
    let page = users::list_directory(state.db.pool(), &query).await?;
    tracing::info!("Admin {} exported {} users", session.id, page.rows.len());

    attachment(&users_table(&page.rows), format, "membres")
}

/// GET /admin/employers/export?format=csv|txt
pub async fn export_employers(
    State(state): State<AppState>,
    Extension(session): Extension<SessionUser>,
    Query(format): Query<FormatParam>,
    Query(params): Query<EmployerParams>,
) -> Result<Response, ApiError> {
    let format = format.parse()?;
    let filter = EmployerFilter::from(params);
    let rows = employers::list_with_counts(state.db.pool(), &filter).await?;
    tracing::info!("Admin {} exported {} employers", session.id, rows.len());

    attachment(&employers_table(&rows), format, "employeurs")
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn format_param_defaults_to_csv() {
        assert_eq!(FormatParam::default().parse().unwrap(), ExportFormat::Csv);
        let txt = FormatParam { format: Some("txt".into()) };
        assert_eq!(txt.parse().unwrap(), ExportFormat::Text);
        let bad = FormatParam { format: Some("pdf".into()) };
        assert!(bad.parse().is_err());
    }

    #[test]
    fn attachment_sets_headers() {
        let table = Table {
            headers: vec!["nom"],
            rows: vec![vec!["Ada".to_string()]],
        };
        let response = attachment(&table, ExportFormat::Csv, "membres").unwrap();
        let headers = response.headers();
        assert_eq!(headers[header::CONTENT_TYPE], "text/csv; charset=utf-8");
        let disposition = headers[header::CONTENT_DISPOSITION].to_str().unwrap();
        assert!(disposition.starts_with("attachment; filename=\"membres-"));
        assert!(disposition.ends_with(".csv\""));
    }
}
