//! # Photo Attachments
//!
//! Photos travel as data-URIs (`data:image/png;base64,iVBOR...`).
//!
//! Two levels of checking:
//! - [`is_image_data_uri`]: the loose prefix check the draft store applies
//!   when a photo is attached.
//! - [`PhotoData::parse`]: the strict check applied before upload. Only
//!   png/jpg/jpeg/gif/webp with a decodable base64 payload pass.

use base64::{engine::general_purpose::STANDARD, Engine as _};
use once_cell::sync::Lazy;
use regex::Regex;

use crate::error::{CoreError, CoreResult};

/// Prefix every accepted attachment starts with.
pub const IMAGE_DATA_URI_PREFIX: &str = "data:image/";

static UPLOADABLE_DATA_URI: Lazy<Regex> = Lazy::new(|| {
    Regex::new(r"^data:image/(png|jpg|jpeg|gif|webp);base64,").expect("static regex")
});

/// True when `value` looks like an image data-URI.
pub fn is_image_data_uri(value: &str) -> bool {
    value.starts_with(IMAGE_DATA_URI_PREFIX)
}

/// True when `value` is an image data-URI of an uploadable type.
pub fn is_uploadable(value: &str) -> bool {
    UPLOADABLE_DATA_URI.is_match(value)
}

/// A decoded photo, ready to be stored as a file.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PhotoData {
    /// Image subtype as written in the URI (`png`, `jpeg`, ...).
    pub image_type: String,
    pub bytes: Vec<u8>,
}

impl PhotoData {
    /// Parses and decodes an uploadable data-URI.
    pub fn parse(data_uri: &str) -> CoreResult<PhotoData> {
        let captures = UPLOADABLE_DATA_URI
            .captures(data_uri)
            .ok_or_else(|| CoreError::InvalidPhoto("unsupported data-URI".to_string()))?;

        let image_type = captures[1].to_string();
        let payload = &data_uri[captures[0].len()..];
        let bytes = STANDARD
            .decode(payload.trim())
            .map_err(|e| CoreError::InvalidPhoto(format!("bad base64 payload: {}", e)))?;

        if bytes.is_empty() {
            return Err(CoreError::InvalidPhoto("empty image".to_string()));
        }

        Ok(PhotoData { image_type, bytes })
    }

    /// MIME type of the image.
    pub fn mime_type(&self) -> String {
        match self.image_type.as_str() {
            "jpg" => "image/jpeg".to_string(),
            other => format!("image/{}", other),
        }
    }

    /// File extension for the stored image.
    pub fn extension(&self) -> &str {
        match self.image_type.as_str() {
            "jpeg" => "jpg",
            other => other,
        }
    }

    /// Re-encodes the photo as a data-URI.
    pub fn to_data_uri(&self) -> String {
        format!("data:{};base64,{}", self.mime_type(), STANDARD.encode(&self.bytes))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    const PIXEL: &str = "data:image/png;base64,iVBORw0KGgo=";

    #[test]
    fn test_prefix_check() {
        assert!(is_image_data_uri(PIXEL));
        assert!(is_image_data_uri("data:image/svg+xml;base64,PHN2Zz4="));
        assert!(!is_image_data_uri("not-a-data-uri"));
        assert!(!is_image_data_uri("data:text/plain;base64,aGk="));
    }

    #[test]
    fn test_uploadable_is_stricter() {
        assert!(is_uploadable(PIXEL));
        assert!(is_uploadable("data:image/webp;base64,UklGRg=="));
        assert!(!is_uploadable("data:image/svg+xml;base64,PHN2Zz4="));
    }

    #[test]
    fn test_parse_decodes_payload() {
        let photo = PhotoData::parse(PIXEL).unwrap();
        assert_eq!(photo.image_type, "png");
        assert_eq!(photo.mime_type(), "image/png");
        assert_eq!(&photo.bytes[..4], &[0x89, b'P', b'N', b'G']);
        assert_eq!(photo.to_data_uri(), PIXEL);
    }

    #[test]
    fn test_parse_rejects_bad_payload() {
        assert!(matches!(
            PhotoData::parse("data:image/png;base64,!!!"),
            Err(CoreError::InvalidPhoto(_))
        ));
        assert!(PhotoData::parse("data:image/png;base64,").is_err());
        assert!(PhotoData::parse("hello").is_err());
    }

    #[test]
    fn test_jpg_normalisation() {
        let photo = PhotoData {
            image_type: "jpg".into(),
            bytes: vec![1],
        };
        assert_eq!(photo.mime_type(), "image/jpeg");
        assert_eq!(photo.extension(), "jpg");
    }
}
