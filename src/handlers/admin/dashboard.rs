use axum::extract::State;

use crate::database::stats::{self, DashboardStats};
use crate::middleware::{ApiResponse, ApiResult};
use crate::state::AppState;

use super::TOP_EMPLOYERS;

/// GET /admin - association statistics
pub async fn dashboard(State(state): State<AppState>) -> ApiResult<DashboardStats> {
    let stats = stats::dashboard(state.db.pool(), TOP_EMPLOYERS).await?;
    Ok(ApiResponse::success(stats))
}
