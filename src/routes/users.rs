use axum::{
    extract::{Path, State},
    response::Json,
};
use serde_json::{json, Value as JsonValue};
use uuid::Uuid;
use validator::Validate;

use crate::dto::user_dto::{PromoteUserRequest, StudentSummary, UserProfile};
use crate::AppState;

#[axum::debug_handler]
pub async fn get_profile(
    State(state): State<AppState>,
    Path(uid): Path<Uuid>,
) -> crate::error::Result<Json<UserProfile>> {
    let profile = state.user_service.get_profile(uid).await?;
    Ok(Json(profile))
}

#[axum::debug_handler]
pub async fn list_students(
    State(state): State<AppState>,
) -> crate::error::Result<Json<Vec<StudentSummary>>> {
    Ok(Json(state.user_service.list_students().await?))
}

#[axum::debug_handler]
pub async fn promote_user(
    State(state): State<AppState>,
    Json(req): Json<PromoteUserRequest>,
) -> crate::error::Result<Json<JsonValue>> {
    req.validate()?;
    let role = state.user_service.promote(req.uid, &req.new_role).await?;
    Ok(Json(json!({ "message": format!("User promoted to {}", role.as_str()) })))
}
