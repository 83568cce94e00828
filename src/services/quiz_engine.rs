//! Mock-test session state machine.
//!
//! A [`QuizSession`] moves through three phases:
//!
//! * `Setup`: waiting for a topic. Selecting one fetches questions; only a
//!   non-empty, fully valid batch moves the session on.
//! * `Active`: one current question, either unanswered or answered. An answer
//!   is scored exactly once; `advance` is only legal after answering.
//! * `Results`: terminal. The final score is exposed and the result is
//!   handed to the [`ResultRecorder`] once, in the background; the session
//!   reaches this phase before the write completes. Only `restart` leaves it.
//!
//! Transitions that are not legal in the current phase are rejected with
//! [`QuizError::IllegalTransition`] and leave the session untouched.

use crate::error::QuizError;
use crate::models::question::{validate_batch, Question, RawQuestion};
use crate::models::user::Actor;
use crate::services::question_source::QuestionSource;
use crate::services::result_recorder::{
    accuracy_percent, RecordedResult, ResultRecorder, ResultSubmission,
};
use rust_decimal::Decimal;
use serde::Serialize;
use std::sync::Arc;
use tokio::sync::Mutex;
use tokio::task::JoinHandle;
use uuid::Uuid;

pub type SessionHandle = Arc<Mutex<QuizSession>>;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum Phase {
    Setup,
    Active,
    Results,
}

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize)]
pub struct AnswerRecord {
    pub selected: Option<usize>,
    pub revealed: bool,
}

impl AnswerRecord {
    pub fn is_answered(&self) -> bool {
        self.selected.is_some()
    }
}

#[derive(Debug, Clone)]
pub struct Attempt {
    id: Uuid,
    topic: String,
    questions: Vec<Question>,
    position: usize,
    score: usize,
    answers: Vec<AnswerRecord>,
}

impl Attempt {
    fn new(topic: String, questions: Vec<Question>) -> Self {
        let answers = vec![AnswerRecord::default(); questions.len()];
        Self {
            id: Uuid::new_v4(),
            topic,
            questions,
            position: 0,
            score: 0,
            answers,
        }
    }

    pub fn id(&self) -> Uuid {
        self.id
    }

    pub fn topic(&self) -> &str {
        &self.topic
    }

    pub fn questions(&self) -> &[Question] {
        &self.questions
    }

    pub fn position(&self) -> usize {
        self.position
    }

    pub fn score(&self) -> usize {
        self.score
    }

    pub fn question_count(&self) -> usize {
        self.questions.len()
    }

    pub fn answers(&self) -> &[AnswerRecord] {
        &self.answers
    }

    fn current(&self) -> (&Question, &AnswerRecord) {
        (&self.questions[self.position], &self.answers[self.position])
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(tag = "status", rename_all = "snake_case")]
pub enum SubmissionStatus {
    NotSubmitted,
    Pending,
    Recorded,
    Failed { warning: String },
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Advance {
    /// Moved to the question at this position.
    Next(usize),
    /// Last question done; the session is now in `Results`.
    Finished(ResultSubmission),
}

pub struct QuizSession {
    id: Uuid,
    actor: Actor,
    phase: Phase,
    pending_topic: Option<String>,
    attempt: Option<Attempt>,
    last_error: Option<QuizError>,
    submission: SubmissionStatus,
}

impl QuizSession {
    pub fn new(actor: Actor) -> Self {
        Self {
            id: Uuid::new_v4(),
            actor,
            phase: Phase::Setup,
            pending_topic: None,
            attempt: None,
            last_error: None,
            submission: SubmissionStatus::NotSubmitted,
        }
    }

    pub fn id(&self) -> Uuid {
        self.id
    }

    pub fn actor(&self) -> &Actor {
        &self.actor
    }

    pub fn phase(&self) -> Phase {
        self.phase
    }

    pub fn attempt(&self) -> Option<&Attempt> {
        self.attempt.as_ref()
    }

    pub fn is_loading(&self) -> bool {
        self.pending_topic.is_some()
    }

    pub fn last_error(&self) -> Option<&QuizError> {
        self.last_error.as_ref()
    }

    pub fn submission(&self) -> &SubmissionStatus {
        &self.submission
    }

    /// Marks a fetch for `topic` as outstanding.
    pub fn begin_topic(&mut self, topic: &str) -> Result<(), QuizError> {
        if self.phase != Phase::Setup {
            return Err(QuizError::illegal("a topic can only be chosen during setup"));
        }
        if self.pending_topic.is_some() {
            return Err(QuizError::illegal("a question fetch is already in progress"));
        }
        let topic = topic.trim();
        if topic.is_empty() {
            return Err(QuizError::illegal("topic must not be empty"));
        }
        self.pending_topic = Some(topic.to_string());
        self.last_error = None;
        Ok(())
    }

    /// Resolves the outstanding fetch. Any failure, including an empty or
    /// partly malformed batch, leaves the session in `Setup` with no attempt.
    pub fn complete_topic(
        &mut self,
        fetched: Result<Vec<RawQuestion>, QuizError>,
    ) -> Result<(), QuizError> {
        let topic = self
            .pending_topic
            .take()
            .ok_or_else(|| QuizError::illegal("no question fetch is in progress"))?;

        match fetched.and_then(|raw| validate_batch(&topic, raw)) {
            Ok(questions) => {
                let attempt = Attempt::new(topic, questions);
                tracing::info!(
                    session_id = %self.id,
                    attempt_id = %attempt.id,
                    topic = %attempt.topic,
                    questions = attempt.question_count(),
                    "quiz attempt started"
                );
                self.attempt = Some(attempt);
                self.phase = Phase::Active;
                Ok(())
            }
            Err(err) => {
                tracing::warn!(session_id = %self.id, topic = %topic, error = %err, "topic selection failed");
                self.last_error = Some(err.clone());
                Err(err)
            }
        }
    }

    pub async fn select_topic(
        &mut self,
        source: &dyn QuestionSource,
        topic: &str,
    ) -> Result<(), QuizError> {
        self.begin_topic(topic)?;
        let topic = self.pending_topic.clone().unwrap_or_default();
        let fetched = source.fetch_questions(&topic).await;
        self.complete_topic(fetched)
    }

    /// Records an answer for the current question and returns whether it was
    /// correct. The score contribution is fixed by the first accepted call.
    pub fn submit_answer(&mut self, option_index: usize) -> Result<bool, QuizError> {
        let attempt = self.active_attempt_mut()?;
        let (question, record) = attempt.current();
        if record.is_answered() {
            return Err(QuizError::illegal("the current question is already answered"));
        }
        if option_index >= question.options.len() {
            return Err(QuizError::illegal(format!(
                "option {} does not exist; the question has {} options",
                option_index,
                question.options.len()
            )));
        }

        let correct = question.is_correct(option_index);
        let position = attempt.position;
        attempt.answers[position] = AnswerRecord {
            selected: Some(option_index),
            revealed: true,
        };
        if correct {
            attempt.score += 1;
        }
        tracing::debug!(attempt_id = %attempt.id, position, correct, score = attempt.score, "answer recorded");
        Ok(correct)
    }

    /// Moves past an answered question. From the last question this enters
    /// `Results` and yields the one submission for this attempt.
    pub fn advance(&mut self) -> Result<Advance, QuizError> {
        let user_id = self.actor.user_id;
        let attempt = self.active_attempt_mut()?;
        if !attempt.current().1.is_answered() {
            return Err(QuizError::illegal("answer the current question before advancing"));
        }

        if attempt.position + 1 < attempt.question_count() {
            attempt.position += 1;
            return Ok(Advance::Next(attempt.position));
        }

        let submission = ResultSubmission {
            attempt_id: attempt.id,
            user_id,
            topic: attempt.topic.clone(),
            score: attempt.score as u32,
            question_count: attempt.question_count() as u32,
        };
        self.phase = Phase::Results;
        self.submission = SubmissionStatus::Pending;
        tracing::info!(
            session_id = %self.id,
            attempt_id = %submission.attempt_id,
            score = submission.score,
            question_count = submission.question_count,
            "quiz attempt finished"
        );
        Ok(Advance::Finished(submission))
    }

    /// Stores the outcome of a background result write. Outcomes for an
    /// attempt that has since been discarded are dropped.
    pub fn record_submission(
        &mut self,
        attempt_id: Uuid,
        outcome: Result<RecordedResult, QuizError>,
    ) {
        let current = self.attempt.as_ref().map(|a| a.id);
        if current != Some(attempt_id) || self.submission != SubmissionStatus::Pending {
            tracing::debug!(session_id = %self.id, %attempt_id, "stale submission outcome ignored");
            return;
        }
        self.submission = match outcome {
            Ok(recorded) => {
                tracing::info!(attempt_id = %recorded.attempt_id, accuracy = %recorded.accuracy, "quiz result recorded");
                SubmissionStatus::Recorded
            }
            Err(err) => {
                tracing::warn!(%attempt_id, error = %err, "could not save quiz result");
                SubmissionStatus::Failed {
                    warning: "Your score could not be saved to your profile.".to_string(),
                }
            }
        };
    }

    /// Discards the current attempt and returns to `Setup`.
    pub fn restart(&mut self) -> Result<(), QuizError> {
        if self.pending_topic.is_some() {
            return Err(QuizError::illegal("cannot restart while questions are loading"));
        }
        if let Some(old) = self.attempt.take() {
            tracing::debug!(session_id = %self.id, attempt_id = %old.id, "attempt discarded");
        }
        self.phase = Phase::Setup;
        self.last_error = None;
        self.submission = SubmissionStatus::NotSubmitted;
        Ok(())
    }

    pub fn final_result(&self) -> Option<FinalResult> {
        if self.phase != Phase::Results {
            return None;
        }
        self.attempt.as_ref().map(|a| FinalResult {
            attempt_id: a.id,
            score: a.score,
            question_count: a.question_count(),
            accuracy: accuracy_percent(a.score as u32, a.question_count() as u32),
        })
    }

    pub fn snapshot(&self) -> SessionSnapshot {
        let attempt = self.attempt.as_ref();
        let current = match (self.phase, attempt) {
            (Phase::Active, Some(a)) => {
                let (q, record) = a.current();
                Some(QuestionView {
                    id: q.id,
                    number: a.position + 1,
                    prompt: q.prompt.clone(),
                    options: q.options.clone(),
                    selected: record.selected,
                    answered: record.is_answered(),
                    correct_option: record.revealed.then_some(q.correct_option),
                    explanation: record.revealed.then(|| q.explanation.clone()),
                })
            }
            _ => None,
        };
        let warning = match &self.submission {
            SubmissionStatus::Failed { warning } => Some(warning.clone()),
            _ => None,
        };

        SessionSnapshot {
            session_id: self.id,
            phase: self.phase,
            loading: self.is_loading(),
            topic: attempt
                .map(|a| a.topic.clone())
                .or_else(|| self.pending_topic.clone()),
            attempt_id: attempt.map(|a| a.id),
            position: attempt.filter(|_| self.phase == Phase::Active).map(|a| a.position),
            question_count: attempt.map(|a| a.question_count()).unwrap_or(0),
            score: attempt.map(|a| a.score).unwrap_or(0),
            current,
            result: self.final_result(),
            error: self.last_error.as_ref().map(|e| e.to_string()),
            submission: self.submission.clone(),
            warning,
        }
    }

    fn active_attempt_mut(&mut self) -> Result<&mut Attempt, QuizError> {
        if self.phase != Phase::Active {
            return Err(QuizError::illegal(format!(
                "no active question while in {:?} phase",
                self.phase
            )));
        }
        self.attempt
            .as_mut()
            .ok_or_else(|| QuizError::illegal("active session has no attempt"))
    }
}

/// Advances the session behind `handle`. A finished attempt is written by
/// `recorder` on a spawned task; the returned snapshot already shows the
/// results and the session lock is free while the write runs.
pub async fn advance_session(
    handle: &SessionHandle,
    recorder: Arc<dyn ResultRecorder>,
) -> Result<(SessionSnapshot, Option<JoinHandle<()>>), QuizError> {
    let mut session = handle.lock().await;
    let step = session.advance()?;
    let snapshot = session.snapshot();
    drop(session);

    let write = match step {
        Advance::Next(_) => None,
        Advance::Finished(submission) => {
            let handle = Arc::clone(handle);
            Some(tokio::spawn(async move {
                let outcome = recorder.submit(&submission).await;
                handle
                    .lock()
                    .await
                    .record_submission(submission.attempt_id, outcome);
            }))
        }
    };
    Ok((snapshot, write))
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct FinalResult {
    pub attempt_id: Uuid,
    pub score: usize,
    pub question_count: usize,
    pub accuracy: Decimal,
}

/// Correct option and explanation are withheld until the question is answered.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct QuestionView {
    pub id: i64,
    pub number: usize,
    pub prompt: String,
    pub options: Vec<String>,
    pub selected: Option<usize>,
    pub answered: bool,
    pub correct_option: Option<usize>,
    pub explanation: Option<String>,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct SessionSnapshot {
    pub session_id: Uuid,
    pub phase: Phase,
    pub loading: bool,
    pub topic: Option<String>,
    pub attempt_id: Option<Uuid>,
    pub position: Option<usize>,
    pub question_count: usize,
    pub score: usize,
    pub current: Option<QuestionView>,
    pub result: Option<FinalResult>,
    pub error: Option<String>,
    pub submission: SubmissionStatus,
    pub warning: Option<String>,
}
