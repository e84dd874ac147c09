use std::collections::BTreeMap;
use std::fmt::Write as _;

use reqwest::StatusCode;
use serde_json::Value;

/// Message shown whenever the server could not be reached.
pub const NETWORK_ERROR_MESSAGE: &str = "Network error. Please check your connection.";

/// Everything a call through the gateway can fail with.
#[derive(Debug, thiserror::Error)]
pub enum ApiError {
    /// Rejected input, either by the server (4xx with field errors) or by
    /// client-side validation before any request was made (`status` is None).
    #[error("{}", summarize(message.as_deref(), fields))]
    Validation {
        status: Option<u16>,
        message: Option<String>,
        fields: BTreeMap<String, Vec<String>>,
    },
    /// The credentials are gone and could not be refreshed.
    #[error("Your session has expired. Please log in again.")]
    AuthExpired,
    /// A freshly refreshed token was rejected as well. The credentials and
    /// the session are left in place; the next request may succeed.
    #[error("The server rejected your credentials. Please try again.")]
    Unauthorized,
    #[error("{}", message.as_deref().unwrap_or("You do not have permission to perform this action."))]
    Forbidden { message: Option<String> },
    #[error("The requested resource was not found.")]
    NotFound,
    #[error("The server failed to handle the request (status {status}).")]
    Server { status: u16 },
    #[error("{}", NETWORK_ERROR_MESSAGE)]
    NetworkUnavailable,
    #[error("unexpected response body: {0}")]
    Decode(String),
    #[error("failed to encode request: {0}")]
    Encode(String),
}

impl ApiError {
    /// A client-side validation failure on a single field.
    pub fn invalid_field(field: &str, message: impl Into<String>) -> Self {
        let mut fields = BTreeMap::new();
        fields.insert(field.to_string(), vec![message.into()]);
        ApiError::Validation {
            status: None,
            message: None,
            fields,
        }
    }

    /// Map an unsuccessful response into the error taxonomy.
    pub fn from_response(status: StatusCode, body: &[u8]) -> Self {
        match status {
            StatusCode::UNAUTHORIZED => ApiError::AuthExpired,
            StatusCode::FORBIDDEN => ApiError::Forbidden {
                message: parse_error_body(body).0,
            },
            StatusCode::NOT_FOUND => ApiError::NotFound,
            s if s.is_client_error() => {
                let (message, fields) = parse_error_body(body);
                ApiError::Validation {
                    status: Some(s.as_u16()),
                    message,
                    fields,
                }
            }
            s => ApiError::Server { status: s.as_u16() },
        }
    }

    /// A 401 from an endpoint that checks credentials rather than tokens.
    pub fn rejected_credentials(body: &[u8]) -> Self {
        let (message, fields) = parse_error_body(body);
        ApiError::Validation {
            status: Some(StatusCode::UNAUTHORIZED.as_u16()),
            message,
            fields,
        }
    }

    pub fn is_not_found(&self) -> bool {
        matches!(self, ApiError::NotFound)
    }

    pub fn is_auth_expired(&self) -> bool {
        matches!(self, ApiError::AuthExpired)
    }

    /// Field-level messages, empty for every kind except `Validation`.
    pub fn field_messages(&self) -> Option<&BTreeMap<String, Vec<String>>> {
        match self {
            ApiError::Validation { fields, .. } => Some(fields),
            _ => None,
        }
    }

    /// One human-readable line per problem, e.g. `Username: already taken`.
    pub fn display_lines(&self) -> Vec<String> {
        match self {
            ApiError::Validation {
                message, fields, ..
            } => {
                let mut lines: Vec<String> = message.iter().cloned().collect();
                lines.extend(
                    fields
                        .iter()
                        .map(|(field, msgs)| format!("{}: {}", field_label(field), msgs.join(" "))),
                );
                if lines.is_empty() {
                    lines.push("The request was rejected.".to_string());
                }
                lines
            }
            other => vec![other.to_string()],
        }
    }
}

/// Split a DRF-style error body into a general message and per-field messages.
fn parse_error_body(body: &[u8]) -> (Option<String>, BTreeMap<String, Vec<String>>) {
    let mut fields = BTreeMap::new();
    let value: Value = match serde_json::from_slice(body) {
        Ok(value) => value,
        Err(_) => {
            let text = String::from_utf8_lossy(body).trim().to_string();
            return ((!text.is_empty()).then_some(text), fields);
        }
    };

    let mut general = Vec::new();
    match value {
        Value::Object(map) => {
            for (key, value) in map {
                let messages = messages_of(value);
                if key == "detail" || key == "non_field_errors" {
                    general.extend(messages);
                } else {
                    fields.insert(key, messages);
                }
            }
        }
        other => general.extend(messages_of(other)),
    }

    let message = (!general.is_empty()).then(|| general.join(" "));
    (message, fields)
}

fn messages_of(value: Value) -> Vec<String> {
    match value {
        Value::String(s) => vec![s],
        Value::Array(items) => items.into_iter().flat_map(messages_of).collect(),
        Value::Null => Vec::new(),
        other => vec![other.to_string()],
    }
}

/// `profile_pic` -> `Profile pic`
fn field_label(field: &str) -> String {
    let spaced = field.replace('_', " ");
    let mut chars = spaced.chars();
    match chars.next() {
        Some(first) => first.to_uppercase().chain(chars).collect(),
        None => spaced,
    }
}

fn summarize(message: Option<&str>, fields: &BTreeMap<String, Vec<String>>) -> String {
    let mut out = message.unwrap_or("Invalid request").to_string();
    for (field, msgs) in fields {
        let _ = write!(out, "; {}: {}", field_label(field), msgs.join(" "));
    }
    out
}
