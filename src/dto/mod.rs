pub mod content_dto;
pub mod quiz_dto;
pub mod tutor_dto;
pub mod user_dto;
