use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use sqlx::FromRow;
use uuid::Uuid;

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ContentType {
    #[default]
    Material,
    Syllabus,
    Pyp,
}

impl ContentType {
    pub fn as_str(&self) -> &'static str {
        match self {
            ContentType::Material => "material",
            ContentType::Syllabus => "syllabus",
            ContentType::Pyp => "pyp",
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize, FromRow)]
pub struct Material {
    pub id: i32,
    pub title: String,
    pub category: Option<String>,
    pub subject: Option<String>,
    pub content_type: String,
    pub file_url: Option<String>,
    pub exam_year: Option<i32>,
    pub exam_name: Option<String>,
    pub uploaded_by: Option<Uuid>,
    pub created_at: Option<DateTime<Utc>>,
}
