use axum::{
    extract::{Path, State},
    http::StatusCode,
    response::{IntoResponse, Json},
    Extension,
};
use uuid::Uuid;
use validator::Validate;

use crate::{
    dto::test_dto::{CompleteResultPayload, SaveAnswerPayload},
    error::{Error, Result},
    middleware::auth::Claims,
    AppState,
};

#[axum::debug_handler]
pub async fn start_result(
    State(state): State<AppState>,
    Extension(claims): Extension<Claims>,
    Path(test_id): Path<Uuid>,
) -> Result<impl IntoResponse> {
    let test = state.test_service.get_test_by_id(test_id).await?;
    if !test.published {
        return Err(Error::BadRequest("Test non disponibile".into()));
    }
    let result = state
        .result_service
        .start_result(test.id, claims.user_id()?)
        .await?;
    Ok((StatusCode::CREATED, Json(result)))
}

/// The caller's results for a test, most recent first.
#[axum::debug_handler]
pub async fn list_results(
    State(state): State<AppState>,
    Extension(claims): Extension<Claims>,
    Path(test_id): Path<Uuid>,
) -> Result<impl IntoResponse> {
    let results = state
        .result_service
        .list_for_test_and_user(test_id, claims.user_id()?)
        .await?;
    Ok(Json(results))
}

#[axum::debug_handler]
pub async fn get_result(
    State(state): State<AppState>,
    Extension(claims): Extension<Claims>,
    Path(id): Path<Uuid>,
) -> Result<impl IntoResponse> {
    let result = state.result_service.get_result(id).await?;
    claims.ensure_can_access(result.user_id)?;
    Ok(Json(result))
}

#[axum::debug_handler]
pub async fn complete_result(
    State(state): State<AppState>,
    Extension(claims): Extension<Claims>,
    Path(id): Path<Uuid>,
    Json(payload): Json<CompleteResultPayload>,
) -> Result<impl IntoResponse> {
    payload.validate()?;
    let result = state.result_service.get_result(id).await?;
    claims.ensure_can_access(result.user_id)?;
    let result = state
        .result_service
        .complete_result(id, payload.score)
        .await?;
    Ok(Json(result))
}

#[axum::debug_handler]
pub async fn save_answer(
    State(state): State<AppState>,
    Extension(claims): Extension<Claims>,
    Path(id): Path<Uuid>,
    Json(payload): Json<SaveAnswerPayload>,
) -> Result<impl IntoResponse> {
    payload.validate()?;
    let result = state.result_service.get_result(id).await?;
    claims.ensure_can_access(result.user_id)?;
    let answer = state
        .result_service
        .save_answer(id, payload.question_id, payload.value)
        .await?;
    Ok(Json(answer))
}

#[axum::debug_handler]
pub async fn list_answers(
    State(state): State<AppState>,
    Extension(claims): Extension<Claims>,
    Path(id): Path<Uuid>,
) -> Result<impl IntoResponse> {
    let result = state.result_service.get_result(id).await?;
    claims.ensure_can_access(result.user_id)?;
    let answers = state.result_service.list_answers(id).await?;
    Ok(Json(answers))
}

#[axum::debug_handler]
pub async fn test_stats(
    State(state): State<AppState>,
    Path(test_id): Path<Uuid>,
) -> Result<impl IntoResponse> {
    state.test_service.get_test_by_id(test_id).await?;
    let stats = state.result_service.stats_for_test(test_id).await?;
    Ok(Json(stats))
}

/// Confirmation page data for the caller's latest attempt at a test.
#[axum::debug_handler]
pub async fn result_summary(
    State(state): State<AppState>,
    Extension(claims): Extension<Claims>,
    Path(test_id): Path<Uuid>,
) -> Result<impl IntoResponse> {
    let summary = state
        .summary_service
        .result_summary(test_id, claims.user_id()?)
        .await?;
    Ok(Json(summary))
}
