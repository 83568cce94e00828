pub mod config;
pub mod database;
pub mod dto;
pub mod error;
pub mod middleware;
pub mod models;
pub mod routes;
pub mod services;
pub mod utils;

use crate::config::QuestionSourceKind;
use crate::services::{
    content_service::ContentService,
    question_source::{PgQuestionBank, QuestionSource, RemoteQuestionSource},
    quiz_session_store::QuizSessionStore,
    result_recorder::{PgResultRecorder, ResultRecorder},
    tutor_service::TutorService,
    user_service::UserService,
};
use reqwest::Client;
use sqlx::PgPool;
use std::sync::Arc;
use std::time::Duration;

#[derive(Clone)]
pub struct AppState {
    pub pool: PgPool,
    pub question_source: Arc<dyn QuestionSource>,
    pub result_recorder: Arc<dyn ResultRecorder>,
    pub quiz_sessions: QuizSessionStore,
    pub content_service: ContentService,
    pub user_service: UserService,
    pub tutor_service: TutorService,
}

impl AppState {
    pub fn new(pool: PgPool) -> Self {
        let config = crate::config::get_config();
        let http_client = Client::builder()
            .timeout(Duration::from_secs(60))
            .build()
            .unwrap_or_else(|_| Client::new());

        let question_source: Arc<dyn QuestionSource> =
            match (config.question_source, config.ai_service_url.as_deref()) {
                (QuestionSourceKind::Remote, Some(url)) => {
                    Arc::new(RemoteQuestionSource::new(
                        url,
                        http_client.clone(),
                        config.max_quiz_questions,
                    ))
                }
                _ => Arc::new(PgQuestionBank::new(pool.clone(), config.max_quiz_questions)),
            };
        let result_recorder = Arc::new(PgResultRecorder::new(pool.clone()));
        let tutor_service = TutorService::new(config.ai_service_url.clone(), http_client);

        Self::with_backends(pool, question_source, result_recorder, tutor_service)
    }

    pub fn with_backends(
        pool: PgPool,
        question_source: Arc<dyn QuestionSource>,
        result_recorder: Arc<dyn ResultRecorder>,
        tutor_service: TutorService,
    ) -> Self {
        Self {
            content_service: ContentService::new(pool.clone()),
            user_service: UserService::new(pool.clone()),
            quiz_sessions: QuizSessionStore::new(),
            pool,
            question_source,
            result_recorder,
            tutor_service,
        }
    }
}
