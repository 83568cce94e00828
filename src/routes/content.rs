use axum::{
    extract::{Path, Query, State},
    http::StatusCode,
    response::{IntoResponse, Json, Response},
    Extension,
};
use validator::Validate;

use crate::dto::content_dto::{
    ContentStats, CreateMaterialPayload, CreateVideoPayload, MaterialQuery, PypQuery,
    VideoPreviewRequest, VideoPreviewResponse, VideoQuery, VideoView,
};
use crate::error::Error;
use crate::models::material::Material;
use crate::models::user::Actor;
use crate::utils::video::normalize_video_url;
use crate::AppState;

#[axum::debug_handler]
pub async fn list_materials(
    State(state): State<AppState>,
    Query(query): Query<MaterialQuery>,
) -> crate::error::Result<Json<Vec<Material>>> {
    Ok(Json(state.content_service.list_materials(&query).await?))
}

#[axum::debug_handler]
pub async fn list_pyp(
    State(state): State<AppState>,
    Query(query): Query<PypQuery>,
) -> crate::error::Result<Json<Vec<Material>>> {
    Ok(Json(state.content_service.list_pyp(&query).await?))
}

#[axum::debug_handler]
pub async fn create_material(
    State(state): State<AppState>,
    Extension(actor): Extension<Actor>,
    Json(payload): Json<CreateMaterialPayload>,
) -> crate::error::Result<Response> {
    payload.validate()?;
    let material = state.content_service.create_material(payload, &actor).await?;
    Ok((StatusCode::CREATED, Json(material)).into_response())
}

#[axum::debug_handler]
pub async fn delete_material(
    State(state): State<AppState>,
    Path(id): Path<i32>,
) -> crate::error::Result<StatusCode> {
    state.content_service.delete_material(id).await?;
    Ok(StatusCode::NO_CONTENT)
}

#[axum::debug_handler]
pub async fn list_videos(
    State(state): State<AppState>,
    Extension(actor): Extension<Actor>,
    Query(query): Query<VideoQuery>,
) -> crate::error::Result<Json<Vec<VideoView>>> {
    Ok(Json(state.content_service.list_videos(&query, &actor).await?))
}

/// Live preview while an expert composes a video entry.
#[axum::debug_handler]
pub async fn preview_video(
    Json(req): Json<VideoPreviewRequest>,
) -> crate::error::Result<Json<VideoPreviewResponse>> {
    let embed = normalize_video_url(&req.video_url).ok_or_else(|| {
        Error::Unprocessable("video_url is not a recognised video link".to_string())
    })?;
    Ok(Json(VideoPreviewResponse {
        video_id: embed.video_id,
        embed_url: embed.embed_url,
    }))
}

#[axum::debug_handler]
pub async fn create_video(
    State(state): State<AppState>,
    Extension(actor): Extension<Actor>,
    Json(payload): Json<CreateVideoPayload>,
) -> crate::error::Result<Response> {
    payload.validate()?;
    let video = state.content_service.create_video(payload, &actor).await?;
    Ok((StatusCode::CREATED, Json(video)).into_response())
}

#[axum::debug_handler]
pub async fn delete_video(
    State(state): State<AppState>,
    Path(id): Path<i32>,
) -> crate::error::Result<StatusCode> {
    state.content_service.delete_video(id).await?;
    Ok(StatusCode::NO_CONTENT)
}

#[axum::debug_handler]
pub async fn add_bookmark(
    State(state): State<AppState>,
    Extension(actor): Extension<Actor>,
    Path(id): Path<i32>,
) -> crate::error::Result<StatusCode> {
    state.content_service.add_bookmark(id, actor.user_id).await?;
    Ok(StatusCode::NO_CONTENT)
}

#[axum::debug_handler]
pub async fn remove_bookmark(
    State(state): State<AppState>,
    Extension(actor): Extension<Actor>,
    Path(id): Path<i32>,
) -> crate::error::Result<StatusCode> {
    state.content_service.remove_bookmark(id, actor.user_id).await?;
    Ok(StatusCode::NO_CONTENT)
}

#[axum::debug_handler]
pub async fn stats(State(state): State<AppState>) -> crate::error::Result<Json<ContentStats>> {
    Ok(Json(state.content_service.stats().await?))
}
