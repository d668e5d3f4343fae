use axum::{
    extract::State,
    response::{IntoResponse, Json},
};

use crate::{dto::test_dto::DashboardStats, error::Result, AppState};

#[axum::debug_handler]
pub async fn get_dashboard_stats(State(state): State<AppState>) -> Result<impl IntoResponse> {
    let stats = DashboardStats {
        users: state.user_service.count_users().await?,
        tests: state.test_service.count_tests().await?,
        reports: state.report_service.count_reports().await?,
    };
    tracing::debug!(?stats, "dashboard stats computed");
    Ok(Json(stats))
}
