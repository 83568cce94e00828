use crate::dto::content_dto::{
    ContentStats, CreateMaterialPayload, CreateVideoPayload, MaterialQuery, PypQuery, VideoQuery,
    VideoView,
};
use crate::error::{Error, Result};
use crate::models::material::{ContentType, Material};
use crate::models::user::Actor;
use crate::models::video::Video;
use crate::utils::validation::validate_http_url;
use crate::utils::video::normalize_video_url;
use sqlx::PgPool;
use std::collections::HashSet;
use uuid::Uuid;

const MATERIAL_COLUMNS: &str = "id, title, category, subject, content_type, file_url, exam_year, exam_name, uploaded_by, created_at";
const VIDEO_COLUMNS: &str = "id, title, description, category, subject, video_url, uploaded_by, created_at";

/// Syllabus entries, study materials, previous-year papers and video lectures.
#[derive(Clone)]
pub struct ContentService {
    pool: PgPool,
}

impl ContentService {
    pub fn new(pool: PgPool) -> Self {
        Self { pool }
    }

    pub async fn list_materials(&self, filter: &MaterialQuery) -> Result<Vec<Material>> {
        let sql = format!(
            r#"SELECT {} FROM materials
               WHERE content_type = $1
                 AND ($2::text IS NULL OR category = $2)
                 AND ($3::text IS NULL OR subject ILIKE $3)
               ORDER BY created_at DESC"#,
            MATERIAL_COLUMNS
        );
        let rows = sqlx::query_as::<_, Material>(&sql)
            .bind(filter.content_type.as_str())
            .bind(non_blank(&filter.category))
            .bind(non_blank(&filter.subject))
            .fetch_all(&self.pool)
            .await?;
        Ok(rows)
    }

    pub async fn list_pyp(&self, filter: &PypQuery) -> Result<Vec<Material>> {
        let sql = format!(
            r#"SELECT {} FROM materials
               WHERE content_type = 'pyp'
                 AND ($1::int IS NULL OR exam_year = $1)
                 AND ($2::text IS NULL OR subject ILIKE $2)
               ORDER BY exam_year DESC NULLS LAST, created_at DESC"#,
            MATERIAL_COLUMNS
        );
        let rows = sqlx::query_as::<_, Material>(&sql)
            .bind(filter.exam_year)
            .bind(non_blank(&filter.subject))
            .fetch_all(&self.pool)
            .await?;
        Ok(rows)
    }

    pub async fn create_material(
        &self,
        payload: CreateMaterialPayload,
        actor: &Actor,
    ) -> Result<Material> {
        validate_http_url(&payload.file_url)
            .map_err(|_| Error::BadRequest("file_url must be an http(s) link".to_string()))?;
        if payload.content_type == ContentType::Pyp
            && (payload.exam_name.is_none() || payload.exam_year.is_none())
        {
            return Err(Error::BadRequest(
                "previous-year papers need exam_name and exam_year".to_string(),
            ));
        }

        let sql = format!(
            r#"INSERT INTO materials (title, category, subject, content_type, file_url, exam_name, exam_year, uploaded_by)
               VALUES ($1, $2, $3, $4, $5, $6, $7, $8)
               RETURNING {}"#,
            MATERIAL_COLUMNS
        );
        let material = sqlx::query_as::<_, Material>(&sql)
            .bind(payload.title.trim())
            .bind(&payload.category)
            .bind(&payload.subject)
            .bind(payload.content_type.as_str())
            .bind(&payload.file_url)
            .bind(&payload.exam_name)
            .bind(payload.exam_year)
            .bind(actor.user_id)
            .fetch_one(&self.pool)
            .await?;

        tracing::info!(material_id = material.id, content_type = %material.content_type, uploaded_by = %actor.user_id, "material uploaded");
        Ok(material)
    }

    pub async fn delete_material(&self, id: i32) -> Result<()> {
        let res = sqlx::query("DELETE FROM materials WHERE id = $1")
            .bind(id)
            .execute(&self.pool)
            .await?;
        if res.rows_affected() == 0 {
            return Err(Error::NotFound("Material not found".to_string()));
        }
        Ok(())
    }

    pub async fn list_videos(&self, filter: &VideoQuery, actor: &Actor) -> Result<Vec<VideoView>> {
        let search = non_blank(&filter.search).map(|s| format!("%{}%", s));
        let sql = format!(
            r#"SELECT {} FROM videos
               WHERE ($1::text IS NULL OR category = $1)
                 AND ($2::text IS NULL OR title ILIKE $2 OR subject ILIKE $2)
               ORDER BY created_at DESC"#,
            VIDEO_COLUMNS
        );
        let videos = sqlx::query_as::<_, Video>(&sql)
            .bind(non_blank(&filter.category))
            .bind(search)
            .fetch_all(&self.pool)
            .await?;

        let bookmarked: HashSet<i32> = sqlx::query_scalar::<_, i32>(
            "SELECT video_id FROM video_bookmarks WHERE user_id = $1",
        )
        .bind(actor.user_id)
        .fetch_all(&self.pool)
        .await?
        .into_iter()
        .collect();

        Ok(to_video_views(videos, &bookmarked, filter.saved))
    }

    /// Publishes a video lecture. Links the player cannot embed are refused.
    pub async fn create_video(&self, payload: CreateVideoPayload, actor: &Actor) -> Result<VideoView> {
        let embed = normalize_video_url(&payload.video_url).ok_or_else(|| {
            Error::Unprocessable("video_url is not a recognised video link".to_string())
        })?;

        let sql = format!(
            r#"INSERT INTO videos (title, description, category, subject, video_url, uploaded_by)
               VALUES ($1, $2, $3, $4, $5, $6)
               RETURNING {}"#,
            VIDEO_COLUMNS
        );
        let video = sqlx::query_as::<_, Video>(&sql)
            .bind(payload.title.trim())
            .bind(&payload.description)
            .bind(&payload.category)
            .bind(&payload.subject)
            .bind(payload.video_url.trim())
            .bind(actor.user_id)
            .fetch_one(&self.pool)
            .await?;

        tracing::info!(video_id = video.id, video = %embed.video_id, "video published");
        Ok(VideoView {
            video,
            embed_url: Some(embed.embed_url),
            bookmarked: false,
        })
    }

    pub async fn delete_video(&self, id: i32) -> Result<()> {
        let res = sqlx::query("DELETE FROM videos WHERE id = $1")
            .bind(id)
            .execute(&self.pool)
            .await?;
        if res.rows_affected() == 0 {
            return Err(Error::NotFound("Video not found".to_string()));
        }
        Ok(())
    }

    pub async fn add_bookmark(&self, video_id: i32, user_id: Uuid) -> Result<()> {
        let exists: bool = sqlx::query_scalar("SELECT EXISTS(SELECT 1 FROM videos WHERE id = $1)")
            .bind(video_id)
            .fetch_one(&self.pool)
            .await?;
        if !exists {
            return Err(Error::NotFound("Video not found".to_string()));
        }
        sqlx::query(
            "INSERT INTO video_bookmarks (user_id, video_id) VALUES ($1, $2) ON CONFLICT DO NOTHING",
        )
        .bind(user_id)
        .bind(video_id)
        .execute(&self.pool)
        .await?;
        Ok(())
    }

    pub async fn remove_bookmark(&self, video_id: i32, user_id: Uuid) -> Result<()> {
        sqlx::query("DELETE FROM video_bookmarks WHERE user_id = $1 AND video_id = $2")
            .bind(user_id)
            .bind(video_id)
            .execute(&self.pool)
            .await?;
        Ok(())
    }

    pub async fn stats(&self) -> Result<ContentStats> {
        let materials: i64 =
            sqlx::query_scalar("SELECT COUNT(*) FROM materials WHERE content_type = 'material'")
                .fetch_one(&self.pool)
                .await?;
        let videos: i64 = sqlx::query_scalar("SELECT COUNT(*) FROM videos")
            .fetch_one(&self.pool)
            .await?;
        let students: i64 = sqlx::query_scalar("SELECT COUNT(*) FROM users WHERE role ILIKE 'student'")
            .fetch_one(&self.pool)
            .await?;
        Ok(ContentStats {
            materials,
            videos,
            students,
        })
    }
}

fn non_blank(value: &Option<String>) -> Option<String> {
    value
        .as_deref()
        .map(str::trim)
        .filter(|v| !v.is_empty() && !v.eq_ignore_ascii_case("all"))
        .map(str::to_string)
}

fn to_video_views(videos: Vec<Video>, bookmarked: &HashSet<i32>, saved_only: bool) -> Vec<VideoView> {
    videos
        .into_iter()
        .filter(|v| !saved_only || bookmarked.contains(&v.id))
        .map(|video| VideoView {
            embed_url: normalize_video_url(&video.video_url).map(|e| e.embed_url),
            bookmarked: bookmarked.contains(&video.id),
            video,
        })
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;

    fn video(id: i32, url: &str) -> Video {
        Video {
            id,
            title: format!("Lecture {}", id),
            description: None,
            category: Some("prelims".into()),
            subject: Some("Geography".into()),
            video_url: url.into(),
            uploaded_by: None,
            created_at: None,
        }
    }

    #[test]
    fn blank_and_all_filters_are_ignored() {
        assert_eq!(non_blank(&None), None);
        assert_eq!(non_blank(&Some("  ".into())), None);
        assert_eq!(non_blank(&Some("all".into())), None);
        assert_eq!(non_blank(&Some(" mains ".into())), Some("mains".into()));
    }

    #[test]
    fn video_views_carry_embed_links_and_bookmarks() {
        let videos = vec![
            video(1, "https://youtu.be/dQw4w9WgXcQ"),
            video(2, "https://example.com/old-link"),
        ];
        let marks: HashSet<i32> = [2].into_iter().collect();

        let all = to_video_views(videos.clone(), &marks, false);
        assert_eq!(all.len(), 2);
        assert_eq!(
            all[0].embed_url.as_deref(),
            Some("https://www.youtube.com/embed/dQw4w9WgXcQ")
        );
        assert!(!all[0].bookmarked);
        assert_eq!(all[1].embed_url, None);

        let saved = to_video_views(videos, &marks, true);
        assert_eq!(saved.len(), 1);
        assert_eq!(saved[0].video.id, 2);
    }
}
