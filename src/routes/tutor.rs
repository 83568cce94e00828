use axum::{extract::State, response::Json};
use validator::Validate;

use crate::dto::tutor_dto::{AskRequest, AskResponse};
use crate::AppState;

#[axum::debug_handler]
pub async fn ask(
    State(state): State<AppState>,
    Json(req): Json<AskRequest>,
) -> crate::error::Result<Json<AskResponse>> {
    req.validate()?;
    let answer = state.tutor_service.ask(&req.query).await?;
    Ok(Json(AskResponse { answer }))
}
