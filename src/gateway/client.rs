use std::time::Duration;

use reqwest::header::{HeaderValue, CONTENT_TYPE};
use reqwest::{Response, StatusCode};
use serde::de::DeserializeOwned;
use tracing::{debug, info, warn};
use uuid::Uuid;

use super::error::ApiError;
use super::request::{ApiRequest, Attempt, RequestBody};
use crate::config::ApiConfig;
use crate::models::token::{RefreshRequest, RefreshResponse};
use crate::session::state::{Session, SharedSession};
use crate::store::TokenStore;

/// Endpoint minting a new access token from the refresh token.
pub const REFRESH_PATH: &str = "/accounts/token/refresh/";

const REQUEST_ID_HEADER: &str = "x-request-id";

/// The single outbound HTTP client.
///
/// Every request gets the stored access token as a bearer credential. A 401
/// triggers at most one refresh for that request; when the refresh succeeds
/// the request is re-issued once, otherwise the stored tokens are dropped and
/// the shared session is signed out.
#[derive(Clone)]
pub struct ApiClient {
    http: reqwest::Client,
    base_url: String,
    tokens: TokenStore,
    session: SharedSession,
}

impl ApiClient {
    pub fn new(
        config: &ApiConfig,
        tokens: TokenStore,
        session: SharedSession,
    ) -> Result<Self, reqwest::Error> {
        let http = reqwest::Client::builder()
            .timeout(Duration::from_millis(config.timeout_in_ms))
            .build()?;
        let base_url = format!("{}/api", config.base_url.trim_end_matches('/'));
        info!("Creating API client for '{}'", base_url);
        Ok(ApiClient {
            http,
            base_url,
            tokens,
            session,
        })
    }

    pub fn tokens(&self) -> &TokenStore {
        &self.tokens
    }

    pub fn url(&self, path: &str) -> String {
        format!("{}{}", self.base_url, path)
    }

    /// Send a request and decode a JSON response body.
    pub async fn json<T: DeserializeOwned>(&self, request: ApiRequest) -> Result<T, ApiError> {
        let path = request.path.clone();
        let response = self.send(request).await?;
        let bytes = response.bytes().await.map_err(|e| {
            warn!("Reading response body for '{}' failed: {}", path, e);
            ApiError::NetworkUnavailable
        })?;
        serde_json::from_slice(&bytes).map_err(|e| {
            warn!("Response body for '{}' did not match: {}", path, e);
            ApiError::Decode(e.to_string())
        })
    }

    /// Send a request whose response body is irrelevant.
    pub async fn execute(&self, request: ApiRequest) -> Result<(), ApiError> {
        self.send(request).await.map(drop)
    }

    /// Send a request and return the successful response.
    pub async fn send(&self, request: ApiRequest) -> Result<Response, ApiError> {
        let request_id = Uuid::new_v4();
        let mut attempt = Attempt::first();
        loop {
            let response = self.dispatch(&request, &attempt, request_id).await?;
            let status = response.status();

            if status != StatusCode::UNAUTHORIZED {
                return Self::check(response).await;
            }
            if !request.recover_auth {
                let body = response.bytes().await.unwrap_or_default();
                return Err(ApiError::rejected_credentials(&body));
            }
            if attempt.retried {
                // The fresh token was rejected too; refreshing again would loop
                warn!(
                    event_name = "gateway.retry.unauthorized",
                    event_domain = "gateway",
                    %request_id,
                    path = request.path.as_str(),
                    "request rejected after token refresh"
                );
                return Err(ApiError::Unauthorized);
            }

            let access_token = self.refresh_access_token(request_id).await?;
            attempt = Attempt::retry_with(access_token);
        }
    }

    async fn dispatch(
        &self,
        request: &ApiRequest,
        attempt: &Attempt,
        request_id: Uuid,
    ) -> Result<Response, ApiError> {
        let mut builder = self
            .http
            .request(request.method.clone(), self.url(&request.path))
            .header(REQUEST_ID_HEADER, request_id.to_string());

        if !request.query.is_empty() {
            builder = builder.query(&request.query);
        }

        let bearer = attempt
            .bearer
            .clone()
            .or_else(|| self.tokens.access_token());
        if let Some(token) = bearer {
            builder = builder.bearer_auth(token);
        }

        builder = match &request.body {
            RequestBody::Empty => {
                builder.header(CONTENT_TYPE, HeaderValue::from_static("application/json"))
            }
            RequestBody::Json(value) => builder.json(value),
            // reqwest sets the boundary-bearing content type itself
            RequestBody::Multipart(form) => builder.multipart(form.to_form()?),
        };

        debug!(
            event_name = "gateway.request.sent",
            event_domain = "gateway",
            %request_id,
            method = %request.method,
            path = request.path.as_str(),
            retried = attempt.retried,
            "sending request"
        );

        let response = builder.send().await.map_err(|e| {
            warn!(
                event_name = "gateway.request.unreachable",
                event_domain = "gateway",
                %request_id,
                path = request.path.as_str(),
                timeout = e.is_timeout(),
                "no response from server: {}",
                e
            );
            ApiError::NetworkUnavailable
        })?;

        debug!(
            event_name = "gateway.response.received",
            event_domain = "gateway",
            %request_id,
            status = response.status().as_u16(),
            "response received"
        );
        Ok(response)
    }

    async fn check(response: Response) -> Result<Response, ApiError> {
        let status = response.status();
        if status.is_success() {
            return Ok(response);
        }
        // The body only feeds error details; an unreadable one is as good as empty
        let body = response.bytes().await.unwrap_or_default();
        Err(ApiError::from_response(status, &body))
    }

    /// Exchange the refresh token for a new access token. Talks to the
    /// transport directly so a 401 here cannot re-enter the retry path.
    async fn refresh_access_token(&self, request_id: Uuid) -> Result<String, ApiError> {
        let Some(refresh) = self.tokens.refresh_token() else {
            self.expire_session("missing_refresh_token");
            return Err(ApiError::AuthExpired);
        };

        info!(
            event_name = "gateway.refresh.started",
            event_domain = "gateway",
            %request_id,
            "access token rejected, refreshing"
        );

        let outcome = self
            .http
            .post(self.url(REFRESH_PATH))
            .header(REQUEST_ID_HEADER, request_id.to_string())
            .json(&RefreshRequest { refresh: &refresh })
            .send()
            .await;

        let response = match outcome {
            Ok(response) if response.status().is_success() => response,
            Ok(response) => {
                debug!("Refresh rejected with status {}", response.status());
                self.expire_session("refresh_rejected");
                return Err(ApiError::AuthExpired);
            }
            Err(e) => {
                debug!("Refresh call failed: {}", e);
                self.expire_session("refresh_unreachable");
                return Err(ApiError::AuthExpired);
            }
        };

        match response.json::<RefreshResponse>().await {
            Ok(RefreshResponse {
                access: Some(access),
            }) if !access.is_empty() => {
                self.tokens.set_access_token(&access);
                info!(
                    event_name = "gateway.refresh.succeeded",
                    event_domain = "gateway",
                    %request_id,
                    "access token refreshed"
                );
                Ok(access)
            }
            _ => {
                self.expire_session("refresh_without_access_token");
                Err(ApiError::AuthExpired)
            }
        }
    }

    fn expire_session(&self, reason: &str) {
        self.tokens.clear();
        self.session.send_modify(Session::sign_out);
        warn!(
            event_name = "gateway.session.expired",
            event_domain = "gateway",
            reason,
            "credentials could not be refreshed, session signed out"
        );
    }
}
