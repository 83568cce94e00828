pub mod content;
pub mod health;
pub mod quiz;
pub mod tutor;
pub mod users;
