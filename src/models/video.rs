use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use sqlx::FromRow;
use uuid::Uuid;

#[derive(Debug, Clone, Serialize, Deserialize, FromRow)]
pub struct Video {
    pub id: i32,
    pub title: String,
    pub description: Option<String>,
    pub category: Option<String>,
    pub subject: Option<String>,
    pub video_url: String,
    pub uploaded_by: Option<Uuid>,
    pub created_at: Option<DateTime<Utc>>,
}
