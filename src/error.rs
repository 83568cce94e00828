use axum::{
    http::StatusCode,
    response::{IntoResponse, Json},
};
use serde_json::json;

pub type Result<T> = std::result::Result<T, Error>;

#[derive(Debug, thiserror::Error)]
pub enum Error {
    #[error("Configuration error: {0}")]
    Config(String),

    #[error("Bad request: {0}")]
    BadRequest(String),

    #[error("Unauthorized: {0}")]
    Unauthorized(String),

    #[error("Forbidden: {0}")]
    Forbidden(String),

    #[error("Not found: {0}")]
    NotFound(String),

    #[error("Unprocessable: {0}")]
    Unprocessable(String),

    #[error("Upstream rate limited: {0}")]
    UpstreamRateLimited(String),

    #[error("Service unavailable: {0}")]
    Unavailable(String),

    #[error("Database error: {0}")]
    Database(sqlx::Error),

    #[error("Validation error: {0}")]
    Validation(#[from] validator::ValidationErrors),

    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),

    #[error(transparent)]
    Quiz(#[from] QuizError),

    #[error(transparent)]
    Anyhow(#[from] anyhow::Error),

    #[error("HTTP error: {0}")]
    Reqwest(#[from] reqwest::Error),

    #[error("Internal error: {0}")]
    Internal(String),

    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),
}

/// Failures of a single quiz attempt, kept apart from transport-level
/// [`Error`] so the session engine can be driven without axum or sqlx.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum QuizError {
    #[error("Malformed question at position {index}: {reason}")]
    MalformedQuestion { index: usize, reason: String },

    #[error("No questions available for topic '{0}'")]
    EmptyResult(String),

    #[error("Question fetch failed: {0}")]
    FetchTransport(String),

    #[error("Result submission failed: {0}")]
    SubmissionTransport(String),

    #[error("Illegal transition: {0}")]
    IllegalTransition(String),
}

impl QuizError {
    pub fn illegal(msg: impl Into<String>) -> Self {
        QuizError::IllegalTransition(msg.into())
    }

    pub fn malformed(index: usize, reason: impl Into<String>) -> Self {
        QuizError::MalformedQuestion {
            index,
            reason: reason.into(),
        }
    }

    fn status_code(&self) -> StatusCode {
        match self {
            QuizError::MalformedQuestion { .. } => StatusCode::BAD_GATEWAY,
            QuizError::EmptyResult(_) => StatusCode::NOT_FOUND,
            QuizError::FetchTransport(_) => StatusCode::SERVICE_UNAVAILABLE,
            QuizError::SubmissionTransport(_) => StatusCode::BAD_GATEWAY,
            QuizError::IllegalTransition(_) => StatusCode::CONFLICT,
        }
    }

    fn code(&self) -> &'static str {
        match self {
            QuizError::MalformedQuestion { .. } => "malformed_question",
            QuizError::EmptyResult(_) => "no_questions",
            QuizError::FetchTransport(_) => "fetch_failed",
            QuizError::SubmissionTransport(_) => "submission_failed",
            QuizError::IllegalTransition(_) => "illegal_transition",
        }
    }
}

impl IntoResponse for Error {
    fn into_response(self) -> axum::response::Response {
        if let Error::Quiz(err) = &self {
            let body = Json(json!({ "error": err.to_string(), "code": err.code() }));
            return (err.status_code(), body).into_response();
        }

        let (status, error_message) = match self {
            Error::BadRequest(msg) => (StatusCode::BAD_REQUEST, msg),
            Error::Unauthorized(msg) => (StatusCode::UNAUTHORIZED, msg),
            Error::Forbidden(msg) => (StatusCode::FORBIDDEN, msg),
            Error::NotFound(msg) => (StatusCode::NOT_FOUND, msg),
            Error::Unprocessable(msg) => (StatusCode::UNPROCESSABLE_ENTITY, msg),
            Error::UpstreamRateLimited(msg) => (StatusCode::TOO_MANY_REQUESTS, msg),
            Error::Unavailable(msg) => (StatusCode::SERVICE_UNAVAILABLE, msg),
            Error::Validation(err) => (StatusCode::BAD_REQUEST, err.to_string()),
            Error::Database(err) => {
                tracing::error!(error = ?err, "database error");
                (StatusCode::INTERNAL_SERVER_ERROR, err.to_string())
            }
            Error::Json(err) => (StatusCode::BAD_REQUEST, err.to_string()),
            Error::Reqwest(err) => (StatusCode::BAD_GATEWAY, format!("External service error: {}", err)),
            Error::Internal(msg) => (StatusCode::INTERNAL_SERVER_ERROR, msg),
            Error::Io(err) => (StatusCode::INTERNAL_SERVER_ERROR, err.to_string()),
            Error::Anyhow(err) => (StatusCode::BAD_GATEWAY, err.to_string()),
            _ => (
                StatusCode::INTERNAL_SERVER_ERROR,
                "An unexpected error occurred".to_string(),
            ),
        };

        let body = Json(json!({ "error": error_message }));
        (status, body).into_response()
    }
}

impl From<sqlx::Error> for Error {
    fn from(err: sqlx::Error) -> Self {
        match err {
            sqlx::Error::RowNotFound => Error::NotFound("Resource not found".to_string()),
            other => Error::Database(other),
        }
    }
}
