use crate::error::QuizError;
use crate::models::question::RawQuestion;
use async_trait::async_trait;
use reqwest::{Client, StatusCode};
use serde_json::{json, Value as JsonValue};
use sqlx::{FromRow, PgPool};

/// Remote question bank consumed by the quiz engine. Implementations return
/// records as delivered; validation is the engine's job.
#[cfg_attr(test, mockall::automock)]
#[async_trait]
pub trait QuestionSource: Send + Sync {
    async fn fetch_questions(&self, topic: &str) -> Result<Vec<RawQuestion>, QuizError>;
}

#[derive(Debug, FromRow)]
struct QuestionRow {
    id: i64,
    question_text: Option<String>,
    options: Option<JsonValue>,
    correct_answer: Option<i64>,
    explanation: Option<String>,
}

impl From<QuestionRow> for RawQuestion {
    fn from(row: QuestionRow) -> Self {
        // A non-array options column surfaces as "missing options".
        let options = row
            .options
            .and_then(|v| serde_json::from_value::<Vec<String>>(v).ok());
        RawQuestion {
            id: Some(row.id),
            question: row.question_text,
            options,
            correct_answer: row.correct_answer,
            explanation: row.explanation,
        }
    }
}

/// Previous-year questions stored in the portal's own database.
#[derive(Clone)]
pub struct PgQuestionBank {
    pool: PgPool,
    limit: i64,
}

impl PgQuestionBank {
    pub fn new(pool: PgPool, limit: usize) -> Self {
        Self {
            pool,
            limit: limit.max(1) as i64,
        }
    }
}

#[async_trait]
impl QuestionSource for PgQuestionBank {
    async fn fetch_questions(&self, topic: &str) -> Result<Vec<RawQuestion>, QuizError> {
        let rows = sqlx::query_as::<_, QuestionRow>(
            r#"
            SELECT id::bigint AS id, question_text, options,
                   correct_answer::bigint AS correct_answer, explanation
            FROM questions
            WHERE subject ILIKE $1
            ORDER BY random()
            LIMIT $2
            "#,
        )
        .bind(topic)
        .bind(self.limit)
        .fetch_all(&self.pool)
        .await
        .map_err(|e| {
            tracing::error!(error = ?e, topic, "question bank query failed");
            QuizError::FetchTransport("question bank is unavailable".to_string())
        })?;

        tracing::debug!(topic, count = rows.len(), "question bank returned rows");
        Ok(rows.into_iter().map(RawQuestion::from).collect())
    }
}

/// The companion AI/REST service that generates quizzes on demand.
#[derive(Clone)]
pub struct RemoteQuestionSource {
    client: Client,
    base_url: String,
    limit: usize,
}

impl RemoteQuestionSource {
    /// Batches longer than `limit` are cut to their first `limit` records.
    pub fn new(base_url: impl Into<String>, client: Client, limit: usize) -> Self {
        Self {
            client,
            base_url: base_url.into().trim_end_matches('/').to_string(),
            limit: limit.max(1),
        }
    }
}

#[async_trait]
impl QuestionSource for RemoteQuestionSource {
    async fn fetch_questions(&self, topic: &str) -> Result<Vec<RawQuestion>, QuizError> {
        let url = format!("{}/api/ai/generate-test", self.base_url);
        let resp = self
            .client
            .post(&url)
            .json(&json!({ "subject": topic }))
            .send()
            .await
            .map_err(|e| {
                tracing::error!(error = ?e, topic, "question service request failed");
                QuizError::FetchTransport(format!("question service unreachable: {}", e))
            })?;

        let status = resp.status();
        if status == StatusCode::NOT_FOUND {
            return Ok(Vec::new());
        }
        if !status.is_success() {
            return Err(QuizError::FetchTransport(format!(
                "question service returned {}",
                status.as_u16()
            )));
        }

        let body: JsonValue = resp
            .json()
            .await
            .map_err(|e| QuizError::FetchTransport(format!("undecodable question payload: {}", e)))?;
        let mut questions = decode_question_list(body)?;
        if questions.len() > self.limit {
            tracing::debug!(topic, delivered = questions.len(), limit = self.limit, "trimming remote batch");
            questions.truncate(self.limit);
        }
        Ok(questions)
    }
}

/// Accepts either a bare array or `{"questions": [...]}`. Each element is
/// decoded on its own so a badly typed record is reported by position.
fn decode_question_list(body: JsonValue) -> Result<Vec<RawQuestion>, QuizError> {
    let items = match body {
        JsonValue::Array(items) => items,
        JsonValue::Object(mut map) => match map.remove("questions") {
            Some(JsonValue::Array(items)) => items,
            _ => {
                return Err(QuizError::FetchTransport(
                    "question payload has no question list".to_string(),
                ))
            }
        },
        _ => {
            return Err(QuizError::FetchTransport(
                "question payload is not a list".to_string(),
            ))
        }
    };

    items
        .into_iter()
        .enumerate()
        .map(|(idx, item)| {
            serde_json::from_value::<RawQuestion>(item)
                .map_err(|e| QuizError::malformed(idx, e.to_string()))
        })
        .collect()
}
