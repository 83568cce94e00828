use crate::error::{QuizError, Result};
use crate::models::quiz_result::QuizResult;
use async_trait::async_trait;
use rust_decimal::{Decimal, RoundingStrategy};
use serde::Serialize;
use sqlx::PgPool;
use uuid::Uuid;

/// A finished attempt as handed over for persistence. Accuracy is not part of
/// it; the recorder derives it from `score` and `question_count`.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct ResultSubmission {
    pub attempt_id: Uuid,
    pub user_id: Uuid,
    pub topic: String,
    pub score: u32,
    pub question_count: u32,
}

impl ResultSubmission {
    pub fn accuracy(&self) -> Decimal {
        accuracy_percent(self.score, self.question_count)
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct RecordedResult {
    pub attempt_id: Uuid,
    pub accuracy: Decimal,
    /// `false` when a row for this attempt already existed.
    pub created: bool,
}

/// `score / count * 100`, fixed to two decimal places.
pub fn accuracy_percent(score: u32, question_count: u32) -> Decimal {
    if question_count == 0 {
        let mut zero = Decimal::ZERO;
        zero.rescale(2);
        return zero;
    }
    let mut pct = (Decimal::from(score) * Decimal::ONE_HUNDRED / Decimal::from(question_count))
        .round_dp_with_strategy(2, RoundingStrategy::MidpointAwayFromZero);
    pct.rescale(2);
    pct
}

#[cfg_attr(test, mockall::automock)]
#[async_trait]
pub trait ResultRecorder: Send + Sync {
    async fn submit(&self, submission: &ResultSubmission) -> std::result::Result<RecordedResult, QuizError>;
}

#[derive(Clone)]
pub struct PgResultRecorder {
    pool: PgPool,
}

impl PgResultRecorder {
    pub fn new(pool: PgPool) -> Self {
        Self { pool }
    }

    pub async fn list_for_user(&self, user_id: Uuid) -> Result<Vec<QuizResult>> {
        let rows = sqlx::query_as::<_, QuizResult>(
            r#"
            SELECT id, attempt_id, user_id, topic, score, question_count, accuracy, created_at
            FROM quiz_results
            WHERE user_id = $1
            ORDER BY created_at DESC
            "#,
        )
        .bind(user_id)
        .fetch_all(&self.pool)
        .await?;
        Ok(rows)
    }
}

#[async_trait]
impl ResultRecorder for PgResultRecorder {
    async fn submit(&self, submission: &ResultSubmission) -> std::result::Result<RecordedResult, QuizError> {
        let accuracy = submission.accuracy();
        let inserted: Option<Uuid> = sqlx::query_scalar(
            r#"
            INSERT INTO quiz_results (attempt_id, user_id, topic, score, question_count, accuracy)
            VALUES ($1, $2, $3, $4, $5, $6)
            ON CONFLICT (attempt_id) DO NOTHING
            RETURNING id
            "#,
        )
        .bind(submission.attempt_id)
        .bind(submission.user_id)
        .bind(&submission.topic)
        .bind(submission.score as i32)
        .bind(submission.question_count as i32)
        .bind(accuracy)
        .fetch_optional(&self.pool)
        .await
        .map_err(|e| QuizError::SubmissionTransport(e.to_string()))?;

        if inserted.is_none() {
            tracing::info!(attempt_id = %submission.attempt_id, "result already recorded, skipping");
        }

        Ok(RecordedResult {
            attempt_id: submission.attempt_id,
            accuracy,
            created: inserted.is_some(),
        })
    }
}
