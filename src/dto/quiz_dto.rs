use serde::{Deserialize, Serialize};
use validator::Validate;

pub const QUIZ_TOPICS: [&str; 4] = ["Gujarat History", "Indian Polity", "Geography", "Economics"];

#[derive(Debug, Clone, Serialize, Deserialize, Validate)]
pub struct SelectTopicRequest {
    #[validate(length(min = 1, max = 100))]
    pub topic: String,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct SubmitAnswerRequest {
    pub option_index: usize,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct TopicsResponse {
    pub topics: Vec<String>,
}

impl Default for TopicsResponse {
    fn default() -> Self {
        Self {
            topics: QUIZ_TOPICS.iter().map(|t| t.to_string()).collect(),
        }
    }
}
