pub mod material;
pub mod question;
pub mod quiz_result;
pub mod user;
pub mod video;
