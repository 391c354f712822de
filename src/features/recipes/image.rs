//! Recipe image decoding.
//!
//! Images arrive either as `data:image/<ext>;base64,<payload>` URIs inside a
//! JSON body or as a multipart file part.

use base64::prelude::*;
use uuid::Uuid;

use crate::core::error::{AppError, Result};
use crate::shared::constants::{ALLOWED_IMAGE_TYPES, MAX_IMAGE_SIZE};

#[derive(Debug, Clone)]
pub struct RecipeImage {
    pub bytes: Vec<u8>,
    pub extension: &'static str,
    pub content_type: &'static str,
}

impl RecipeImage {
    /// Fresh object path below the public prefix
    pub fn object_path(&self) -> String {
        format!("recipes/{}.{}", Uuid::new_v4(), self.extension)
    }
}

fn lookup_format(extension: &str) -> Result<(&'static str, &'static str)> {
    let extension = extension.to_ascii_lowercase();
    ALLOWED_IMAGE_TYPES
        .iter()
        .find(|(ext, _)| *ext == extension)
        .copied()
        .ok_or_else(|| {
            AppError::BadRequest(format!(
                "Unsupported image format '{}'. Allowed: png, jpeg, jpg, gif, webp",
                extension
            ))
        })
}

fn checked(bytes: Vec<u8>, format: (&'static str, &'static str)) -> Result<RecipeImage> {
    if bytes.is_empty() {
        return Err(AppError::BadRequest("Image is empty".to_string()));
    }
    if bytes.len() > MAX_IMAGE_SIZE {
        return Err(AppError::BadRequest(format!(
            "Image is too large: {} bytes (max {} bytes)",
            bytes.len(),
            MAX_IMAGE_SIZE
        )));
    }

    Ok(RecipeImage {
        bytes,
        extension: format.0,
        content_type: format.1,
    })
}

/// Decode a `data:image/<ext>;base64,<payload>` URI
pub fn decode_data_uri(uri: &str) -> Result<RecipeImage> {
    let invalid = || {
        AppError::BadRequest(
            "Image must be a data URI like data:image/png;base64,<payload>".to_string(),
        )
    };

    let (mime, payload) = uri
        .trim()
        .strip_prefix("data:")
        .and_then(|rest| rest.split_once(";base64,"))
        .ok_or_else(invalid)?;
    let extension = mime.strip_prefix("image/").ok_or_else(invalid)?;
    let format = lookup_format(extension)?;

    let payload: String = payload.chars().filter(|c| !c.is_whitespace()).collect();
    let bytes = BASE64_STANDARD
        .decode(payload.as_bytes())
        .map_err(|e| AppError::BadRequest(format!("Invalid base64 image payload: {}", e)))?;

    checked(bytes, format)
}

/// Validate an uploaded file part, preferring its content type over its file name
pub fn from_upload(
    content_type: Option<&str>,
    file_name: Option<&str>,
    bytes: Vec<u8>,
) -> Result<RecipeImage> {
    let extension = content_type
        .and_then(|ct| ct.strip_prefix("image/"))
        .or_else(|| file_name.and_then(|name| name.rsplit_once('.')).map(|(_, ext)| ext))
        .ok_or_else(|| AppError::BadRequest("Cannot determine image format".to_string()))?;

    checked(bytes, lookup_format(extension)?)
}

#[cfg(test)]
mod tests {
    use super::*;

    const PNG_HEADER: &[u8] = &[0x89, b'P', b'N', b'G', 0x0D, 0x0A, 0x1A, 0x0A];

    fn data_uri(mime: &str, bytes: &[u8]) -> String {
        format!("data:{};base64,{}", mime, BASE64_STANDARD.encode(bytes))
    }

    #[test]
    fn test_decode_png_data_uri() {
        let image = decode_data_uri(&data_uri("image/png", PNG_HEADER)).unwrap();
        assert_eq!(image.bytes, PNG_HEADER);
        assert_eq!(image.extension, "png");
        assert_eq!(image.content_type, "image/png");
        assert!(image.object_path().starts_with("recipes/"));
        assert!(image.object_path().ends_with(".png"));
    }

    #[test]
    fn test_jpg_maps_to_jpeg_content_type() {
        let image = decode_data_uri(&data_uri("image/JPG", b"jpegbytes")).unwrap();
        assert_eq!(image.extension, "jpg");
        assert_eq!(image.content_type, "image/jpeg");
    }

    #[test]
    fn test_rejects_non_image_mime() {
        assert!(decode_data_uri(&data_uri("text/plain", b"hello")).is_err());
        assert!(decode_data_uri(&data_uri("image/svg+xml", b"<svg/>")).is_err());
    }

    #[test]
    fn test_rejects_malformed_uri() {
        assert!(decode_data_uri("iVBORw0KGgo=").is_err());
        assert!(decode_data_uri("data:image/png,raw").is_err());
        assert!(decode_data_uri("data:image/png;base64,@@@").is_err());
        assert!(decode_data_uri("data:image/png;base64,").is_err());
    }

    #[test]
    fn test_rejects_oversized_image() {
        let result = checked(vec![0u8; MAX_IMAGE_SIZE + 1], ("png", "image/png"));
        assert!(matches!(result, Err(AppError::BadRequest(_))));
    }

    #[test]
    fn test_upload_format_from_content_type_or_name() {
        let image = from_upload(Some("image/webp"), None, b"RIFF".to_vec()).unwrap();
        assert_eq!(image.extension, "webp");

        let image = from_upload(None, Some("photo.GIF"), b"GIF89a".to_vec()).unwrap();
        assert_eq!(image.extension, "gif");

        assert!(from_upload(Some("application/pdf"), Some("doc.pdf"), b"%PDF".to_vec()).is_err());
        assert!(from_upload(None, None, b"??".to_vec()).is_err());
    }
}
