use crate::error::QuizError;
use serde::{Deserialize, Serialize};

pub const MIN_OPTIONS: usize = 2;

/// A question exactly as a question source delivered it. Every field is
/// optional because the remote bank is not trusted to honour the schema.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct RawQuestion {
    #[serde(default)]
    pub id: Option<i64>,
    #[serde(default, alias = "question_text")]
    pub question: Option<String>,
    #[serde(default)]
    pub options: Option<Vec<String>>,
    #[serde(default)]
    pub correct_answer: Option<i64>,
    #[serde(default)]
    pub explanation: Option<String>,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Question {
    pub id: i64,
    pub prompt: String,
    pub options: Vec<String>,
    pub correct_option: usize,
    pub explanation: String,
}

impl Question {
    /// Checks the structural invariants of one fetched record. `index` is the
    /// record's position in its batch; it doubles as a fallback identifier.
    pub fn from_raw(index: usize, raw: RawQuestion) -> Result<Self, QuizError> {
        let prompt = raw
            .question
            .map(|q| q.trim().to_string())
            .filter(|q| !q.is_empty())
            .ok_or_else(|| QuizError::malformed(index, "missing question text"))?;

        let options = raw
            .options
            .ok_or_else(|| QuizError::malformed(index, "missing options"))?;
        if options.len() < MIN_OPTIONS {
            return Err(QuizError::malformed(
                index,
                format!("expected at least {} options, got {}", MIN_OPTIONS, options.len()),
            ));
        }

        let correct = raw
            .correct_answer
            .ok_or_else(|| QuizError::malformed(index, "missing correct answer"))?;
        let correct_option = usize::try_from(correct)
            .ok()
            .filter(|c| *c < options.len())
            .ok_or_else(|| {
                QuizError::malformed(
                    index,
                    format!(
                        "correct answer {} is outside {} options",
                        correct,
                        options.len()
                    ),
                )
            })?;

        let fallback_id = (index as i64) + 1;
        Ok(Self {
            id: raw.id.unwrap_or(fallback_id),
            prompt,
            options,
            correct_option,
            explanation: raw.explanation.unwrap_or_default(),
        })
    }

    pub fn is_correct(&self, option_index: usize) -> bool {
        self.correct_option == option_index
    }
}

/// Validates a whole batch. One bad record rejects the batch; an empty batch
/// is reported separately so callers can tell "nothing there" from "broken".
pub fn validate_batch(topic: &str, raw: Vec<RawQuestion>) -> Result<Vec<Question>, QuizError> {
    if raw.is_empty() {
        return Err(QuizError::EmptyResult(topic.to_string()));
    }
    raw.into_iter()
        .enumerate()
        .map(|(idx, q)| Question::from_raw(idx, q))
        .collect()
}
