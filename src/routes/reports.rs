use axum::{
    extract::{Path, Query, State},
    http::{header, StatusCode},
    response::{IntoResponse, Json},
    Extension,
};
use uuid::Uuid;
use validator::Validate;

use crate::{
    dto::report_dto::{CreateReportPayload, PdfQuery, ReportEnvelope, ReportListQuery, ReportPayload},
    error::{Error, Result},
    middleware::auth::Claims,
    models::report_metadata::TestKind,
    services::{
        pdf_service::{pdf_filename, PdfService},
        report_view_service::ReportViewService,
    },
    AppState,
};

#[axum::debug_handler]
pub async fn create_report(
    State(state): State<AppState>,
    Extension(claims): Extension<Claims>,
    Json(payload): Json<CreateReportPayload>,
) -> Result<impl IntoResponse> {
    claims.ensure_admin()?;
    payload.validate()?;
    let report = state.report_service.create_report(payload).await?;
    Ok((
        StatusCode::CREATED,
        Json(ReportEnvelope {
            report: ReportPayload::from(report),
        }),
    ))
}

/// `?testResultId=` filters by result (0 or 1 entries); without it the
/// caller's own reports are listed.
#[axum::debug_handler]
pub async fn list_reports(
    State(state): State<AppState>,
    Extension(claims): Extension<Claims>,
    Query(query): Query<ReportListQuery>,
) -> Result<impl IntoResponse> {
    let reports = match query.test_result_id {
        Some(result_id) => {
            let result = state.result_service.get_result(result_id).await?;
            claims.ensure_can_access(result.user_id)?;
            state.report_service.list_by_result(result_id).await?
        }
        None => state.report_service.list_for_user(claims.user_id()?).await?,
    };
    let payloads: Vec<ReportPayload> = reports.into_iter().map(ReportPayload::from).collect();
    Ok(Json(payloads))
}

async fn load_report(state: &AppState, claims: &Claims, id: Uuid) -> Result<ReportPayload> {
    let report = state.report_service.get_report(id).await?;
    claims.ensure_can_access(report.user_id)?;
    Ok(ReportPayload::from(report))
}

#[axum::debug_handler]
pub async fn get_report(
    State(state): State<AppState>,
    Extension(claims): Extension<Claims>,
    Path(id): Path<Uuid>,
) -> Result<impl IntoResponse> {
    let report = load_report(&state, &claims, id).await?;
    Ok(Json(ReportEnvelope { report }))
}

#[axum::debug_handler]
pub async fn view_report(
    State(state): State<AppState>,
    Extension(claims): Extension<Claims>,
    Path(id): Path<Uuid>,
) -> Result<impl IntoResponse> {
    let report = load_report(&state, &claims, id).await?;
    Ok(Json(ReportViewService::build(&report)))
}

#[axum::debug_handler]
pub async fn delete_report(
    State(state): State<AppState>,
    Extension(claims): Extension<Claims>,
    Path(id): Path<Uuid>,
) -> Result<impl IntoResponse> {
    claims.ensure_admin()?;
    if !state.report_service.delete_report(id).await? {
        return Err(Error::NotFound("Report non trovato".into()));
    }
    tracing::info!(report_id = %id, "report deleted");
    Ok(StatusCode::NO_CONTENT)
}

async fn render_pdf(
    state: &AppState,
    claims: &Claims,
    report_id: Uuid,
    kind: TestKind,
) -> Result<impl IntoResponse> {
    let report = load_report(state, claims, report_id).await?;
    let view = ReportViewService::build(&report);
    if view.body.kind() != Some(kind) {
        return Err(Error::BadRequest(format!(
            "Il report non è di tipo {}",
            kind.file_tag()
        )));
    }

    let buffer = PdfService::render_report(&report, &view)?;
    let filename = pdf_filename(kind, crate::utils::time::today());
    tracing::info!(report_id = %report_id, kind = kind.as_str(), size = buffer.len(), "report PDF rendered");

    let disposition = format!("attachment; filename=\"{}\"", filename);
    Ok((
        StatusCode::OK,
        [
            (header::CONTENT_TYPE, "application/pdf".to_string()),
            (header::CONTENT_DISPOSITION, disposition),
        ],
        buffer,
    ))
}

#[axum::debug_handler]
pub async fn sas_pdf(
    State(state): State<AppState>,
    Extension(claims): Extension<Claims>,
    Query(query): Query<PdfQuery>,
) -> Result<impl IntoResponse> {
    render_pdf(&state, &claims, query.report_id, TestKind::Sas).await
}

#[axum::debug_handler]
pub async fn pid5_pdf(
    State(state): State<AppState>,
    Extension(claims): Extension<Claims>,
    Query(query): Query<PdfQuery>,
) -> Result<impl IntoResponse> {
    render_pdf(&state, &claims, query.report_id, TestKind::Pid5).await
}
