use tracing::{debug, info};

use crate::gateway::{ApiClient, ApiError, ApiRequest};
use crate::models::token::RefreshRequest;
use crate::models::{LoginCredentials, Page, SignupRequest, TokenPair, TokenResponse, User};

use super::forms::ProfileUpdate;

/// Accounts endpoints: tokens, signup, profiles and the follow graph.
#[derive(Clone)]
pub struct AuthService {
    api: ApiClient,
}

impl AuthService {
    pub fn new(api: ApiClient) -> Self {
        AuthService { api }
    }

    /// Obtain a token pair and persist it.
    pub async fn login(&self, credentials: &LoginCredentials) -> Result<TokenResponse, ApiError> {
        let request = ApiRequest::post("/accounts/token/")
            .without_auth_recovery()
            .json(credentials)?;
        let tokens: TokenResponse = self.api.json(request).await?;
        self.api.tokens().save(&TokenPair::from(tokens.clone()));
        info!("Obtained tokens for '{}'", credentials.username);
        Ok(tokens)
    }

    /// Register an account. No tokens are issued; log in afterwards.
    pub async fn signup(&self, signup: &SignupRequest) -> Result<(), ApiError> {
        let request = ApiRequest::post("/accounts/signup/").json(signup)?;
        self.api.execute(request).await
    }

    /// Blacklist the stored refresh token on the server. Local tokens are
    /// left to the caller.
    pub async fn logout(&self) -> Result<(), ApiError> {
        let Some(refresh) = self.api.tokens().refresh_token() else {
            debug!("No refresh token stored, nothing to blacklist");
            return Ok(());
        };
        let request = ApiRequest::post("/accounts/api/token/blacklist/").json(&RefreshRequest {
            refresh: &refresh,
        })?;
        self.api.execute(request).await
    }

    pub async fn current_user(&self) -> Result<User, ApiError> {
        self.api.json(ApiRequest::get("/accounts/info/")).await
    }

    pub async fn user_info(&self, user_id: u64) -> Result<User, ApiError> {
        self.api
            .json(ApiRequest::get(format!("/accounts/{user_id}/info/")))
            .await
    }

    /// Update the profile, as JSON or as multipart when pictures change.
    pub async fn update_profile(&self, update: &ProfileUpdate) -> Result<User, ApiError> {
        update.validate()?;
        let request = ApiRequest::patch("/accounts/profile/update/");
        let request = if update.needs_multipart() {
            request.multipart(update.to_form())
        } else {
            request.json(&update.to_json())?
        };
        self.api.json(request).await
    }

    /// Toggle following `user_id`.
    pub async fn follow_unfollow(&self, user_id: u64) -> Result<(), ApiError> {
        self.api
            .execute(ApiRequest::post(format!("/accounts/follow_unfollow/{user_id}/")))
            .await
    }

    pub async fn followers(&self, user_id: u64, page: u32) -> Result<Page<User>, ApiError> {
        self.api
            .json(ApiRequest::get(format!("/accounts/{user_id}/followers/")).page(page))
            .await
    }

    pub async fn following(&self, user_id: u64, page: u32) -> Result<Page<User>, ApiError> {
        self.api
            .json(ApiRequest::get(format!("/accounts/{user_id}/following/")).page(page))
            .await
    }
}
