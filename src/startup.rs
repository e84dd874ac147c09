//! Application startup.
//!
//! Wires the token store, gateway, session and services together from a
//! configuration, then validates any stored credentials.

use std::sync::Arc;

use tracing::info;

use crate::config::{ConfigError, ConfigV1};
use crate::gateway::ApiClient;
use crate::services::{AuthService, CommentService, PostService};
use crate::session::{shared_session, SessionManager, SessionPhase};
use crate::state::AppState;
use crate::store::{create_storage, TokenStore};
use crate::utils::media::MediaResolver;

#[derive(Debug, thiserror::Error)]
pub enum StartupError {
    #[error(transparent)]
    Config(#[from] ConfigError),
    #[error("failed to create HTTP client: {0}")]
    Http(#[from] reqwest::Error),
}

/// Build the application state. No network traffic happens here; the
/// session stays `Initializing` until [`start`] or
/// `SessionManager::initialize` runs.
pub fn build(config: ConfigV1) -> Result<AppState, StartupError> {
    let config = Arc::new(config);
    let storage = create_storage(&config.storage);
    let tokens = TokenStore::new(storage);
    let session = shared_session();

    let api = ApiClient::new(&config.api, tokens.clone(), session.clone())?;
    let auth = AuthService::new(api.clone());
    let manager = SessionManager::new(auth.clone(), tokens.clone(), session);

    info!(
        persistent_tokens = tokens.is_persistent(),
        "Application state ready for '{}'", config.api.base_url
    );

    Ok(AppState {
        media: MediaResolver::new(config.api.media_base_url.clone()),
        posts: PostService::new(api.clone()),
        comments: CommentService::new(api.clone()),
        config,
        tokens,
        api,
        session: manager,
        auth,
    })
}

/// Build the state and run the startup credential check.
pub async fn start(config: ConfigV1) -> Result<(AppState, SessionPhase), StartupError> {
    let state = build(config)?;
    let phase = state.session.initialize().await;
    info!("Session initialized as {:?}", phase);
    Ok((state, phase))
}
