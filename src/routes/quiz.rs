use axum::{
    extract::{Path, State},
    http::StatusCode,
    response::{IntoResponse, Json, Response},
    Extension,
};
use uuid::Uuid;
use validator::Validate;

use crate::dto::quiz_dto::{SelectTopicRequest, SubmitAnswerRequest, TopicsResponse};
use crate::models::user::Actor;
use crate::services::quiz_engine::advance_session;
use crate::services::result_recorder::PgResultRecorder;
use crate::AppState;

#[axum::debug_handler]
pub async fn list_topics() -> impl IntoResponse {
    Json(TopicsResponse::default())
}

#[axum::debug_handler]
pub async fn create_session(
    State(state): State<AppState>,
    Extension(actor): Extension<Actor>,
) -> crate::error::Result<Response> {
    let snapshot = state.quiz_sessions.create(actor).await;
    Ok((StatusCode::CREATED, Json(snapshot)).into_response())
}

#[axum::debug_handler]
pub async fn get_session(
    State(state): State<AppState>,
    Extension(actor): Extension<Actor>,
    Path(id): Path<Uuid>,
) -> crate::error::Result<Response> {
    let handle = state.quiz_sessions.get(id, &actor).await?;
    let session = handle.lock().await;
    Ok(Json(session.snapshot()).into_response())
}

#[axum::debug_handler]
pub async fn select_topic(
    State(state): State<AppState>,
    Extension(actor): Extension<Actor>,
    Path(id): Path<Uuid>,
    Json(req): Json<SelectTopicRequest>,
) -> crate::error::Result<Response> {
    req.validate()?;
    let handle = state.quiz_sessions.get(id, &actor).await?;
    let mut session = handle.lock().await;
    session
        .select_topic(state.question_source.as_ref(), &req.topic)
        .await?;
    Ok(Json(session.snapshot()).into_response())
}

#[axum::debug_handler]
pub async fn submit_answer(
    State(state): State<AppState>,
    Extension(actor): Extension<Actor>,
    Path(id): Path<Uuid>,
    Json(req): Json<SubmitAnswerRequest>,
) -> crate::error::Result<Response> {
    let handle = state.quiz_sessions.get(id, &actor).await?;
    let mut session = handle.lock().await;
    session.submit_answer(req.option_index)?;
    Ok(Json(session.snapshot()).into_response())
}

#[axum::debug_handler]
pub async fn advance(
    State(state): State<AppState>,
    Extension(actor): Extension<Actor>,
    Path(id): Path<Uuid>,
) -> crate::error::Result<Response> {
    let handle = state.quiz_sessions.get(id, &actor).await?;
    let (snapshot, _write) = advance_session(&handle, state.result_recorder.clone()).await?;
    Ok(Json(snapshot).into_response())
}

#[axum::debug_handler]
pub async fn restart(
    State(state): State<AppState>,
    Extension(actor): Extension<Actor>,
    Path(id): Path<Uuid>,
) -> crate::error::Result<Response> {
    let handle = state.quiz_sessions.get(id, &actor).await?;
    let mut session = handle.lock().await;
    session.restart()?;
    Ok(Json(session.snapshot()).into_response())
}

#[axum::debug_handler]
pub async fn abandon(
    State(state): State<AppState>,
    Extension(actor): Extension<Actor>,
    Path(id): Path<Uuid>,
) -> crate::error::Result<StatusCode> {
    state.quiz_sessions.remove(id, &actor).await?;
    tracing::debug!(session_id = %id, "quiz session abandoned");
    Ok(StatusCode::NO_CONTENT)
}

#[axum::debug_handler]
pub async fn list_results(
    State(state): State<AppState>,
    Extension(actor): Extension<Actor>,
) -> crate::error::Result<Response> {
    let results = PgResultRecorder::new(state.pool.clone())
        .list_for_user(actor.user_id)
        .await?;
    Ok(Json(results).into_response())
}
