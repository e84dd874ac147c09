//! Wire types exchanged with the social API.

mod de;
pub mod comment;
pub mod page;
pub mod post;
pub mod token;
pub mod user;

pub use comment::{Comment, CommentContent};
pub use page::Page;
pub use post::Post;
pub use token::{LoginCredentials, SignupRequest, TokenPair, TokenResponse};
pub use user::{Creator, User};
