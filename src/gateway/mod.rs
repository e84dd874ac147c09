//! Outbound HTTP: bearer injection, one-shot token refresh, error mapping.

pub mod client;
pub mod error;
pub mod request;

pub use client::ApiClient;
pub use error::ApiError;
pub use request::{ApiRequest, Attempt, FormPayload, FormValue, RequestBody};
