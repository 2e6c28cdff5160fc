//! Product image uploads.
//!
//! Images are committed to the content repository under `img/` before the
//! product that references them is saved. Uploads only create files: a name
//! that is already taken is reported instead of overwriting the old image.

use glint_content::{ContentClient, ContentError, image_path};
use thiserror::Error;
use tracing::{info, instrument};

/// Accepted image extensions, lowercase.
pub const ALLOWED_EXTENSIONS: &[&str] = &["jpg", "jpeg", "png"];

/// Errors from validating or uploading a product image.
#[derive(Debug, Error)]
pub enum ImageError {
    #[error("image file name is empty or invalid")]
    InvalidName,

    #[error("unsupported image type {0:?} (use jpg, jpeg or png)")]
    UnsupportedType(String),

    #[error("image file is empty")]
    Empty,

    #[error("an image named {0} already exists")]
    AlreadyExists(String),

    #[error("image upload failed: {0}")]
    Upload(#[source] ContentError),
}

/// An image received from the product form.
#[derive(Debug, Clone)]
pub struct ImageUpload {
    pub file_name: String,
    pub bytes: Vec<u8>,
}

impl ImageUpload {
    /// Repository file name for this upload, validated.
    ///
    /// # Errors
    ///
    /// Returns an error for an empty file, an unusable name, or an extension
    /// outside [`ALLOWED_EXTENSIONS`].
    pub fn stored_name(&self) -> Result<String, ImageError> {
        if self.bytes.is_empty() {
            return Err(ImageError::Empty);
        }
        let name = sanitize_file_name(&self.file_name).ok_or(ImageError::InvalidName)?;
        let extension = name
            .rsplit_once('.')
            .map(|(_, ext)| ext.to_ascii_lowercase())
            .unwrap_or_default();
        if !ALLOWED_EXTENSIONS.contains(&extension.as_str()) {
            return Err(ImageError::UnsupportedType(extension));
        }
        Ok(name)
    }
}

/// Upload an image and return the repository path to store on the product.
///
/// # Errors
///
/// Returns an error if the upload is invalid or the write fails.
#[instrument(skip(client, upload), fields(file_name = %upload.file_name, size = upload.bytes.len()))]
pub async fn upload_image(
    client: &dyn ContentClient,
    upload: &ImageUpload,
) -> Result<String, ImageError> {
    let name = upload.stored_name()?;
    let path = image_path(&name);

    client
        .write(&path, &upload.bytes, None, &format!("Admin: Upload image {name}"))
        .await
        .map_err(|e| match e {
            ContentError::Conflict(_) => ImageError::AlreadyExists(name.clone()),
            other => ImageError::Upload(other),
        })?;

    info!(path = %path, "Image uploaded");
    Ok(path)
}

/// Reduce a browser-supplied file name to a safe repository file name.
///
/// Directory parts are dropped, whitespace becomes `-`, and anything other
/// than ASCII letters, digits, `.`, `-` and `_` is removed.
fn sanitize_file_name(raw: &str) -> Option<String> {
    let base = raw.rsplit(['/', '\\']).next().unwrap_or_default().trim();
    let cleaned: String = base
        .chars()
        .filter_map(|c| match c {
            c if c.is_ascii_alphanumeric() || matches!(c, '.' | '-' | '_') => Some(c),
            c if c.is_whitespace() => Some('-'),
            _ => None,
        })
        .collect();
    let cleaned = cleaned.trim_start_matches('.').to_string();
    let has_stem = cleaned
        .rsplit_once('.')
        .is_some_and(|(stem, _)| !stem.is_empty());
    has_stem.then_some(cleaned)
}
