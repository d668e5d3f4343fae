pub mod client;
pub mod config;
pub mod database;
pub mod dto;
pub mod error;
pub mod middleware;
pub mod models;
pub mod routes;
pub mod services;
pub mod utils;

use axum::{
    extract::DefaultBodyLimit,
    routing::{delete, get, post},
    Router,
};
use sqlx::PgPool;
use tower_http::trace::TraceLayer;

use crate::middleware::{auth, cors::api_cors, rate_limit};
use crate::services::{
    question_service::QuestionService, report_service::ReportService,
    result_service::ResultService, summary_service::SummaryService, test_service::TestService,
    user_service::UserService,
};

#[derive(Clone)]
pub struct AppState {
    pub user_service: UserService,
    pub test_service: TestService,
    pub question_service: QuestionService,
    pub result_service: ResultService,
    pub report_service: ReportService,
    pub summary_service: SummaryService,
}

impl AppState {
    pub fn new(pool: PgPool) -> Self {
        Self {
            user_service: UserService::new(pool.clone()),
            test_service: TestService::new(pool.clone()),
            question_service: QuestionService::new(pool.clone()),
            result_service: ResultService::new(pool.clone()),
            report_service: ReportService::new(pool.clone()),
            summary_service: SummaryService::new(pool),
        }
    }
}

/// Full HTTP surface. `api_rps` caps the `/api` routes as one fixed window.
pub fn build_router(state: AppState, api_rps: u32) -> Router {
    let base_routes = Router::new().route("/health", get(routes::health::health));

    let api = Router::new()
        .route(
            "/api/tests",
            get(routes::tests::list_tests).post(routes::tests::create_test),
        )
        .route(
            "/api/tests/:id",
            get(routes::tests::get_test)
                .patch(routes::tests::update_test)
                .delete(routes::tests::delete_test),
        )
        .route(
            "/api/tests/:id/questions",
            get(routes::tests::list_questions).post(routes::tests::create_question),
        )
        .route("/api/questions/:id", delete(routes::tests::delete_question))
        .route(
            "/api/tests/:id/results",
            get(routes::results::list_results).post(routes::results::start_result),
        )
        .route("/api/results/:id", get(routes::results::get_result))
        .route(
            "/api/results/:id/complete",
            post(routes::results::complete_result),
        )
        .route(
            "/api/results/:id/answers",
            get(routes::results::list_answers).put(routes::results::save_answer),
        )
        .route(
            "/api/reports",
            get(routes::reports::list_reports).post(routes::reports::create_report),
        )
        .route("/api/reports/sas/pdf", get(routes::reports::sas_pdf))
        .route("/api/reports/pid5/pdf", get(routes::reports::pid5_pdf))
        .route(
            "/api/reports/:id",
            get(routes::reports::get_report).delete(routes::reports::delete_report),
        )
        .route("/api/reports/:id/view", get(routes::reports::view_report))
        .route_layer(axum::middleware::from_fn(auth::require_bearer_auth));

    let admin_api = Router::new()
        .route(
            "/api/users",
            get(routes::users::list_users).post(routes::users::create_user),
        )
        .route(
            "/api/users/:id",
            get(routes::users::get_user).delete(routes::users::delete_user),
        )
        .route("/api/tests/:id/stats", get(routes::results::test_stats))
        .route(
            "/api/dashboard/stats",
            get(routes::dashboard::get_dashboard_stats),
        )
        .route_layer(axum::middleware::from_fn(auth::require_admin));

    let pages = Router::new()
        .route(
            "/api/tests/:id/summary",
            get(routes::results::result_summary),
        )
        .route_layer(axum::middleware::from_fn(auth::redirect_unauthenticated));

    let limited = api
        .merge(admin_api)
        .merge(pages)
        .layer(axum::middleware::from_fn_with_state(
            rate_limit::RateLimiter::new(api_rps),
            rate_limit::rps_middleware,
        ));

    base_routes
        .merge(limited)
        .with_state(state)
        .layer(api_cors())
        .layer(TraceLayer::new_for_http())
        .layer(DefaultBodyLimit::max(2 * 1024 * 1024))
}
