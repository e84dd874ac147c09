//! Rebuildable request descriptions.
//!
//! A `reqwest::RequestBuilder` is consumed when sent and multipart forms
//! cannot be cloned, so the gateway keeps a plain description of each call
//! and materializes it once per attempt.

use reqwest::multipart::{Form, Part};
use reqwest::Method;
use serde::Serialize;
use serde_json::Value;

use super::error::ApiError;

#[derive(Debug, Clone)]
pub struct ApiRequest {
    pub method: Method,
    /// Path below the `/api` prefix, starting with `/`.
    pub path: String,
    pub query: Vec<(String, String)>,
    pub body: RequestBody,
    /// Whether a 401 may be answered with a token refresh. Off for the
    /// credential endpoints, where a 401 means wrong credentials.
    pub recover_auth: bool,
}

#[derive(Debug, Clone, Default)]
pub enum RequestBody {
    #[default]
    Empty,
    Json(Value),
    Multipart(FormPayload),
}

impl ApiRequest {
    pub fn new(method: Method, path: impl Into<String>) -> Self {
        ApiRequest {
            method,
            path: path.into(),
            query: Vec::new(),
            body: RequestBody::Empty,
            recover_auth: true,
        }
    }

    pub fn get(path: impl Into<String>) -> Self {
        Self::new(Method::GET, path)
    }

    pub fn post(path: impl Into<String>) -> Self {
        Self::new(Method::POST, path)
    }

    pub fn patch(path: impl Into<String>) -> Self {
        Self::new(Method::PATCH, path)
    }

    pub fn delete(path: impl Into<String>) -> Self {
        Self::new(Method::DELETE, path)
    }

    pub fn query(mut self, key: &str, value: impl ToString) -> Self {
        self.query.push((key.to_string(), value.to_string()));
        self
    }

    /// Shorthand for the `?page=N` parameter every list endpoint takes.
    pub fn page(self, page: u32) -> Self {
        self.query("page", page.max(1))
    }

    pub fn json<T: Serialize + ?Sized>(mut self, body: &T) -> Result<Self, ApiError> {
        let value = serde_json::to_value(body).map_err(|e| ApiError::Encode(e.to_string()))?;
        self.body = RequestBody::Json(value);
        Ok(self)
    }

    pub fn multipart(mut self, form: FormPayload) -> Self {
        self.body = RequestBody::Multipart(form);
        self
    }

    pub fn without_auth_recovery(mut self) -> Self {
        self.recover_auth = false;
        self
    }

    pub fn is_multipart(&self) -> bool {
        matches!(self.body, RequestBody::Multipart(_))
    }
}

/// Retry bookkeeping for one logical request. The first attempt reads the
/// bearer token from the store; the single retry carries the token the
/// refresh just produced.
#[derive(Debug, Clone, Default)]
pub struct Attempt {
    pub retried: bool,
    pub(crate) bearer: Option<String>,
}

impl Attempt {
    pub fn first() -> Self {
        Attempt::default()
    }

    pub fn retry_with(access_token: String) -> Self {
        Attempt {
            retried: true,
            bearer: Some(access_token),
        }
    }
}

/// A multipart body that can be rebuilt for every attempt.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct FormPayload {
    parts: Vec<(String, FormValue)>,
}

#[derive(Debug, Clone, PartialEq)]
pub enum FormValue {
    Text(String),
    File {
        file_name: String,
        mime: String,
        bytes: Vec<u8>,
    },
}

impl FormPayload {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn text(mut self, name: &str, value: impl Into<String>) -> Self {
        self.parts
            .push((name.to_string(), FormValue::Text(value.into())));
        self
    }

    pub fn file(mut self, name: &str, file_name: &str, mime: &str, bytes: Vec<u8>) -> Self {
        self.parts.push((
            name.to_string(),
            FormValue::File {
                file_name: file_name.to_string(),
                mime: mime.to_string(),
                bytes,
            },
        ));
        self
    }

    pub fn get(&self, name: &str) -> Option<&FormValue> {
        self.parts
            .iter()
            .find(|(part_name, _)| part_name == name)
            .map(|(_, value)| value)
    }

    pub fn contains(&self, name: &str) -> bool {
        self.get(name).is_some()
    }

    pub fn len(&self) -> usize {
        self.parts.len()
    }

    pub fn is_empty(&self) -> bool {
        self.parts.is_empty()
    }

    pub(crate) fn to_form(&self) -> Result<Form, ApiError> {
        let mut form = Form::new();
        for (name, value) in &self.parts {
            form = match value {
                FormValue::Text(text) => form.text(name.clone(), text.clone()),
                FormValue::File {
                    file_name,
                    mime,
                    bytes,
                } => {
                    let part = Part::bytes(bytes.clone())
                        .file_name(file_name.clone())
                        .mime_str(mime)
                        .map_err(|e| ApiError::Encode(e.to_string()))?;
                    form.part(name.clone(), part)
                }
            };
        }
        Ok(form)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_builder_collects_query_and_body() {
        let request = ApiRequest::get("/post/all/").page(0);
        assert_eq!(request.query, vec![("page".to_string(), "1".to_string())]);
        assert!(matches!(request.body, RequestBody::Empty));

        let request = ApiRequest::post("/accounts/token/")
            .json(&serde_json::json!({"username": "alice"}))
            .unwrap();
        assert!(matches!(request.body, RequestBody::Json(ref v) if v["username"] == "alice"));
        assert!(!request.is_multipart());
    }

    #[test]
    fn test_form_payload_lookup() {
        let form = FormPayload::new()
            .text("content", "hi")
            .file("image", "a.png", "image/png", vec![1, 2, 3]);
        assert_eq!(form.len(), 2);
        assert_eq!(form.get("content"), Some(&FormValue::Text("hi".to_string())));
        assert!(matches!(form.get("image"), Some(FormValue::File { file_name, .. }) if file_name == "a.png"));
        assert!(!form.contains("isEdited"));
        assert!(form.to_form().is_ok());
    }

    #[test]
    fn test_bad_mime_is_an_encode_error() {
        let form = FormPayload::new().file("image", "a.bin", "not a mime", vec![]);
        assert!(matches!(form.to_form(), Err(ApiError::Encode(_))));
    }
}
