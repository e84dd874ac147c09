//! Shared application state.
//!
//! One context object holds everything a front end needs: configuration,
//! the token store, the API gateway, the session manager and the resource
//! services. It is cheap to clone and safe to share across tasks.

use std::sync::Arc;

use crate::config::ConfigV1;
use crate::gateway::ApiClient;
use crate::services::{AuthService, CommentService, PostService};
use crate::session::SessionManager;
use crate::store::TokenStore;
use crate::utils::media::MediaResolver;

#[derive(Clone)]
pub struct AppState {
    /// Configuration loaded at startup.
    pub config: Arc<ConfigV1>,
    pub tokens: TokenStore,
    /// The gateway every service talks through.
    pub api: ApiClient,
    pub session: SessionManager,
    pub auth: AuthService,
    pub posts: PostService,
    pub comments: CommentService,
    pub media: MediaResolver,
}
