//! Typed facades over the gateway, one call per endpoint.

pub mod auth;
pub mod comments;
pub mod forms;
pub mod posts;
pub mod upload;

pub use auth::AuthService;
pub use comments::CommentService;
pub use forms::{PostDraft, ProfileUpdate, MAX_POST_LENGTH, MAX_USERNAME_LENGTH};
pub use posts::PostService;
pub use upload::{ImageField, ImageUpload, UploadError};
