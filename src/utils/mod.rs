pub mod logger;
pub mod media;
