use chrono::{DateTime, Utc};
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};
use sqlx::FromRow;
use uuid::Uuid;

#[derive(Debug, Clone, Serialize, Deserialize, FromRow)]
pub struct QuizResult {
    pub id: Uuid,
    pub attempt_id: Uuid,
    pub user_id: Uuid,
    pub topic: String,
    pub score: i32,
    pub question_count: i32,
    pub accuracy: Decimal,
    pub created_at: Option<DateTime<Utc>>,
}
