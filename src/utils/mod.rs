pub mod validation;
pub mod video;
