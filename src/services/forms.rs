//! Client-side form models and the checks run before anything is sent.

use std::collections::BTreeMap;
use std::sync::OnceLock;

use regex::Regex;
use serde_json::{Map, Value};

use super::upload::{ImageField, ImageUpload};
use crate::gateway::{ApiError, FormPayload};
use crate::models::{Post, User};

pub const MAX_POST_LENGTH: usize = 500;
pub const MAX_USERNAME_LENGTH: usize = 150;

fn username_pattern() -> &'static Regex {
    static PATTERN: OnceLock<Regex> = OnceLock::new();
    // ASCII only; `\w` would also admit Unicode letters
    PATTERN.get_or_init(|| {
        Regex::new(r"^[A-Za-z0-9_.@+-]+$").expect("username pattern is valid")
    })
}

fn email_pattern() -> &'static Regex {
    static PATTERN: OnceLock<Regex> = OnceLock::new();
    PATTERN.get_or_init(|| {
        Regex::new(r"(?i)^[A-Z0-9._%+-]+@[A-Z0-9.-]+\.[A-Z]{2,}$").expect("email pattern is valid")
    })
}

/// Collects field errors and turns them into a single validation error.
#[derive(Default)]
struct FieldErrors(BTreeMap<String, Vec<String>>);

impl FieldErrors {
    fn add(&mut self, field: &str, message: &str) {
        self.0
            .entry(field.to_string())
            .or_default()
            .push(message.to_string());
    }

    fn into_result(self) -> Result<(), ApiError> {
        if self.0.is_empty() {
            Ok(())
        } else {
            Err(ApiError::Validation {
                status: None,
                message: None,
                fields: self.0,
            })
        }
    }
}

/// The content of a new post or an edit of an existing one.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct PostDraft {
    pub content: String,
    pub image: ImageField,
    has_stored_image: bool,
}

impl PostDraft {
    pub fn new(content: impl Into<String>) -> Self {
        PostDraft {
            content: content.into(),
            ..Default::default()
        }
    }

    /// Start editing an existing post; its image is kept unless changed.
    pub fn edit(post: &Post) -> Self {
        PostDraft {
            content: post.content.clone(),
            image: ImageField::Unchanged,
            has_stored_image: post.has_image(),
        }
    }

    pub fn with_image(mut self, upload: ImageUpload) -> Self {
        self.image = ImageField::Replace(upload);
        self
    }

    /// Drop the chosen or stored image. Only a stored image needs an
    /// explicit clear on the wire.
    pub fn remove_image(mut self) -> Self {
        self.image = if self.has_stored_image {
            ImageField::Clear
        } else {
            ImageField::Unchanged
        };
        self
    }

    /// Whether the post will carry an image once saved.
    pub fn has_image(&self) -> bool {
        match self.image {
            ImageField::Replace(_) => true,
            ImageField::Unchanged => self.has_stored_image,
            ImageField::Clear => false,
        }
    }

    pub fn validate(&self) -> Result<(), ApiError> {
        let mut errors = FieldErrors::default();
        if self.content.trim().is_empty() && !self.has_image() {
            errors.add("content", "Write something or attach an image.");
        }
        if self.content.chars().count() > MAX_POST_LENGTH {
            errors.add("content", "Content cannot exceed 500 characters");
        }
        errors.into_result()
    }

    /// JSON is enough when no image changes hands.
    pub fn needs_multipart(&self) -> bool {
        !self.image.is_unchanged()
    }

    pub fn to_json(&self, edited: bool) -> Value {
        let mut body = Map::new();
        body.insert("content".to_string(), Value::from(self.content.clone()));
        if edited {
            body.insert("isEdited".to_string(), Value::Bool(true));
        }
        Value::Object(body)
    }

    pub fn to_form(&self, edited: bool) -> FormPayload {
        let form = FormPayload::new().text("content", self.content.clone());
        let form = self.image.write_to(form, "image");
        if edited {
            form.text("isEdited", "true")
        } else {
            form
        }
    }
}

/// A partial profile update. Fields left as `None`/`Unchanged` are not sent.
#[derive(Debug, Clone, PartialEq)]
pub struct ProfileUpdate {
    pub username: Option<String>,
    pub email: Option<String>,
    pub profile_pic: ImageField,
    pub cover_pic: ImageField,
    has_profile_pic: bool,
    has_cover_pic: bool,
}

impl Default for ProfileUpdate {
    fn default() -> Self {
        // Unknown stored pictures are assumed present, so removal is explicit
        ProfileUpdate {
            username: None,
            email: None,
            profile_pic: ImageField::Unchanged,
            cover_pic: ImageField::Unchanged,
            has_profile_pic: true,
            has_cover_pic: true,
        }
    }
}

impl ProfileUpdate {
    pub fn new() -> Self {
        Self::default()
    }

    /// The settings form: prefilled with the user's current values.
    pub fn from_user(user: &User) -> Self {
        ProfileUpdate {
            username: Some(user.username.clone()),
            email: Some(user.email.clone()),
            profile_pic: ImageField::Unchanged,
            cover_pic: ImageField::Unchanged,
            has_profile_pic: user.has_profile_pic(),
            has_cover_pic: user.has_cover_pic(),
        }
    }

    pub fn username(mut self, username: impl Into<String>) -> Self {
        self.username = Some(username.into());
        self
    }

    pub fn email(mut self, email: impl Into<String>) -> Self {
        self.email = Some(email.into());
        self
    }

    pub fn profile_pic(mut self, upload: ImageUpload) -> Self {
        self.profile_pic = ImageField::Replace(upload);
        self
    }

    pub fn cover_pic(mut self, upload: ImageUpload) -> Self {
        self.cover_pic = ImageField::Replace(upload);
        self
    }

    pub fn remove_profile_pic(mut self) -> Self {
        self.profile_pic = removal(self.has_profile_pic);
        self
    }

    pub fn remove_cover_pic(mut self) -> Self {
        self.cover_pic = removal(self.has_cover_pic);
        self
    }

    pub fn validate(&self) -> Result<(), ApiError> {
        let mut errors = FieldErrors::default();
        if let Some(username) = &self.username {
            if username.is_empty() {
                errors.add("username", "Username is required");
            } else if username.chars().count() > MAX_USERNAME_LENGTH {
                errors.add("username", "Username cannot exceed 150 characters");
            } else if !username_pattern().is_match(username) {
                errors.add(
                    "username",
                    "Username can only contain letters, numbers, and @/./+/-/_ characters",
                );
            }
        }
        if let Some(email) = &self.email {
            if email.is_empty() {
                errors.add("email", "Email is required");
            } else if !email_pattern().is_match(email) {
                errors.add("email", "Invalid email address");
            }
        }
        errors.into_result()
    }

    pub fn needs_multipart(&self) -> bool {
        !self.profile_pic.is_unchanged() || !self.cover_pic.is_unchanged()
    }

    pub fn to_json(&self) -> Value {
        let mut body = Map::new();
        if let Some(username) = &self.username {
            body.insert("username".to_string(), Value::from(username.clone()));
        }
        if let Some(email) = &self.email {
            body.insert("email".to_string(), Value::from(email.clone()));
        }
        Value::Object(body)
    }

    pub fn to_form(&self) -> FormPayload {
        let mut form = FormPayload::new();
        if let Some(username) = &self.username {
            form = form.text("username", username.clone());
        }
        if let Some(email) = &self.email {
            form = form.text("email", email.clone());
        }
        let form = self.profile_pic.write_to(form, "profile_pic");
        self.cover_pic.write_to(form, "cover_pic")
    }
}

fn removal(stored: bool) -> ImageField {
    if stored {
        ImageField::Clear
    } else {
        ImageField::Unchanged
    }
}
