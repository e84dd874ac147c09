use serde::{Deserialize, Serialize};

/// The credentials persisted between runs.
#[derive(Serialize, Deserialize, Clone, Debug, PartialEq, Eq)]
pub struct TokenPair {
    pub access: String,
    pub refresh: Option<String>,
}

impl TokenPair {
    pub fn new(access: impl Into<String>, refresh: Option<String>) -> Self {
        TokenPair {
            access: access.into(),
            refresh,
        }
    }
}

/// Body of a successful `POST /accounts/token/`.
#[derive(Serialize, Deserialize, Clone, Debug, PartialEq, Eq)]
pub struct TokenResponse {
    pub access: String,
    pub refresh: String,
}

impl From<TokenResponse> for TokenPair {
    fn from(value: TokenResponse) -> Self {
        TokenPair::new(value.access, Some(value.refresh))
    }
}

/// Body of `POST /accounts/token/refresh/`; `access` is checked by the caller.
#[derive(Deserialize, Debug)]
pub struct RefreshResponse {
    pub access: Option<String>,
}

/// Body carrying a refresh token, used by refresh and blacklist calls.
#[derive(Serialize, Debug)]
pub struct RefreshRequest<'a> {
    pub refresh: &'a str,
}

#[derive(Serialize, Deserialize, Clone, Debug)]
pub struct LoginCredentials {
    pub username: String,
    pub password: String,
}

#[derive(Serialize, Deserialize, Clone, Debug)]
pub struct SignupRequest {
    pub username: String,
    pub email: String,
    pub password: String,
}
