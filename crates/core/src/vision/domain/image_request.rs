use crate::shared::constants::DEFAULT_BUCKET;
use crate::vision::domain::vision_error::VisionError;

/// Reference to an image already stored in an object bucket.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct StoredImage {
    pub bucket: String,
    pub key: String,
}

impl StoredImage {
    pub fn new(bucket: impl Into<String>, key: impl Into<String>) -> Self {
        Self {
            bucket: bucket.into(),
            key: key.into(),
        }
    }

    pub fn in_default_bucket(key: impl Into<String>) -> Self {
        Self::new(DEFAULT_BUCKET, key)
    }
}

/// The image argument of every vision service call.
#[derive(Clone, Debug, PartialEq, Eq)]
pub enum ImageRequest {
    Stored(StoredImage),
    /// Encoded image bytes (JPEG/PNG).
    Bytes(Vec<u8>),
}

/// Builds an image request from exactly one of a stored reference or raw bytes.
///
/// Supplying both or neither is an `InvalidArgument` error, so a malformed
/// call never reaches the service.
pub fn build_image_request(
    stored: Option<StoredImage>,
    bytes: Option<Vec<u8>>,
) -> Result<ImageRequest, VisionError> {
    match (stored, bytes) {
        (Some(stored), None) => Ok(ImageRequest::Stored(stored)),
        (None, Some(bytes)) => Ok(ImageRequest::Bytes(bytes)),
        (Some(_), Some(_)) => Err(VisionError::InvalidArgument(
            "stored image and image bytes are mutually exclusive".into(),
        )),
        (None, None) => Err(VisionError::InvalidArgument(
            "either a stored image or image bytes must be provided".into(),
        )),
    }
}
