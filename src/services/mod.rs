pub mod content_service;
pub mod question_source;
pub mod quiz_engine;
pub mod quiz_session_store;
pub mod result_recorder;
pub mod tutor_service;
pub mod user_service;
