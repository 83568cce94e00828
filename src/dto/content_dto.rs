use crate::models::material::ContentType;
use crate::models::video::Video;
use serde::{Deserialize, Serialize};
use validator::Validate;

#[derive(Debug, Clone, Default, Deserialize)]
pub struct MaterialQuery {
    #[serde(rename = "type", default)]
    pub content_type: ContentType,
    pub category: Option<String>,
    pub subject: Option<String>,
}

#[derive(Debug, Clone, Default, Deserialize)]
pub struct PypQuery {
    pub exam_year: Option<i32>,
    pub subject: Option<String>,
}

#[derive(Debug, Clone, Serialize, Deserialize, Validate)]
pub struct CreateMaterialPayload {
    #[validate(length(min = 1, max = 200))]
    pub title: String,
    #[validate(length(min = 1, max = 50))]
    pub category: String,
    #[validate(length(min = 1, max = 100))]
    pub subject: String,
    #[serde(default)]
    pub content_type: ContentType,
    #[validate(url)]
    pub file_url: String,
    #[validate(length(min = 1, max = 100))]
    pub exam_name: Option<String>,
    #[validate(range(min = 1950, max = 2100))]
    pub exam_year: Option<i32>,
}

#[derive(Debug, Clone, Default, Deserialize)]
pub struct VideoQuery {
    pub category: Option<String>,
    pub search: Option<String>,
    #[serde(default)]
    pub saved: bool,
}

#[derive(Debug, Clone, Serialize, Deserialize, Validate)]
pub struct CreateVideoPayload {
    #[validate(length(min = 1, max = 200))]
    pub title: String,
    pub description: Option<String>,
    #[validate(length(min = 1, max = 50))]
    pub category: String,
    #[validate(length(min = 1, max = 100))]
    pub subject: String,
    #[validate(length(min = 1))]
    pub video_url: String,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct VideoPreviewRequest {
    pub video_url: String,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct VideoPreviewResponse {
    pub video_id: String,
    pub embed_url: String,
}

/// A stored video as the player sees it. `embed_url` is `None` for legacy rows
/// whose link no longer normalises.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct VideoView {
    #[serde(flatten)]
    pub video: Video,
    pub embed_url: Option<String>,
    pub bookmarked: bool,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ContentStats {
    pub materials: i64,
    pub videos: i64,
    pub students: i64,
}
