use axum::{
    extract::{Path, State},
    http::StatusCode,
    response::{IntoResponse, Json},
};
use serde_json::json;
use uuid::Uuid;
use validator::Validate;

use crate::{dto::test_dto::CreateUserPayload, error::Result, AppState};

#[axum::debug_handler]
pub async fn create_user(
    State(state): State<AppState>,
    Json(payload): Json<CreateUserPayload>,
) -> Result<impl IntoResponse> {
    payload.validate()?;
    let user = state.user_service.create_user(payload).await?;
    Ok((StatusCode::CREATED, Json(user)))
}

#[axum::debug_handler]
pub async fn list_users(State(state): State<AppState>) -> Result<impl IntoResponse> {
    let users = state.user_service.list_users().await?;
    let total = state.user_service.count_users().await?;
    Ok(Json(json!({ "items": users, "total": total })))
}

#[axum::debug_handler]
pub async fn get_user(
    State(state): State<AppState>,
    Path(id): Path<Uuid>,
) -> Result<impl IntoResponse> {
    let user = state.user_service.get_user(id).await?;
    Ok(Json(user))
}

#[axum::debug_handler]
pub async fn delete_user(
    State(state): State<AppState>,
    Path(id): Path<Uuid>,
) -> Result<impl IntoResponse> {
    if !state.user_service.delete_user(id).await? {
        return Err(crate::error::Error::NotFound("Utente non trovato".into()));
    }
    Ok(StatusCode::NO_CONTENT)
}
