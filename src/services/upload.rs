use std::path::{Path, PathBuf};

use base64::{engine::general_purpose::STANDARD, Engine as _};
use tracing::debug;

use crate::gateway::FormPayload;

#[derive(Debug, thiserror::Error)]
pub enum UploadError {
    #[error("failed to read '{path}': {source}")]
    Read {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },
    #[error("unsupported image type '{0}'")]
    UnsupportedType(String),
}

/// An image file chosen for upload, held in memory.
#[derive(Debug, Clone, PartialEq)]
pub struct ImageUpload {
    pub file_name: String,
    pub mime: String,
    pub bytes: Vec<u8>,
}

impl ImageUpload {
    pub fn new(file_name: impl Into<String>, mime: impl Into<String>, bytes: Vec<u8>) -> Self {
        ImageUpload {
            file_name: file_name.into(),
            mime: mime.into(),
            bytes,
        }
    }

    /// Read an image from disk, inferring its MIME type from the extension.
    pub async fn from_path(path: impl AsRef<Path>) -> Result<Self, UploadError> {
        let path = path.as_ref();
        let extension = path
            .extension()
            .and_then(|e| e.to_str())
            .map(str::to_lowercase)
            .unwrap_or_default();
        let mime = mime_for_extension(&extension)
            .ok_or_else(|| UploadError::UnsupportedType(extension.clone()))?;

        let bytes = tokio::fs::read(path).await.map_err(|source| UploadError::Read {
            path: path.to_path_buf(),
            source,
        })?;
        let file_name = path
            .file_name()
            .map(|n| n.to_string_lossy().into_owned())
            .unwrap_or_else(|| format!("upload.{extension}"));

        debug!("Loaded '{}' ({} bytes, {})", file_name, bytes.len(), mime);
        Ok(ImageUpload::new(file_name, mime, bytes))
    }

    /// `data:` URL for showing the image before it is uploaded.
    pub fn preview_data_url(&self) -> String {
        format!("data:{};base64,{}", self.mime, STANDARD.encode(&self.bytes))
    }
}

fn mime_for_extension(extension: &str) -> Option<&'static str> {
    match extension {
        "png" => Some("image/png"),
        "jpg" | "jpeg" => Some("image/jpeg"),
        "gif" => Some("image/gif"),
        "webp" => Some("image/webp"),
        "bmp" => Some("image/bmp"),
        "svg" => Some("image/svg+xml"),
        _ => None,
    }
}

/// What to do with an image field on update.
#[derive(Debug, Clone, Default, PartialEq)]
pub enum ImageField {
    /// Leave the stored image alone: the field is omitted.
    #[default]
    Unchanged,
    /// Remove the stored image: the field is sent with an empty value.
    Clear,
    /// Upload a new image.
    Replace(ImageUpload),
}

impl ImageField {
    pub fn is_unchanged(&self) -> bool {
        matches!(self, ImageField::Unchanged)
    }

    pub(crate) fn write_to(&self, form: FormPayload, name: &str) -> FormPayload {
        match self {
            ImageField::Unchanged => form,
            ImageField::Clear => form.text(name, ""),
            ImageField::Replace(upload) => form.file(
                name,
                &upload.file_name,
                &upload.mime,
                upload.bytes.clone(),
            ),
        }
    }
}
