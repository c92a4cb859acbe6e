pub const DEFAULT_REGION: &str = "eu-west-1";
pub const DEFAULT_BUCKET: &str = "lnewfeld";
pub const DEFAULT_COLLECTION_ID: &str = "faces";

/// Fade lost per displayed frame (~20 frames of visibility).
pub const DEFAULT_FADE_STEP: f64 = 0.05;

/// Concurrent recognition calls per frame; faces beyond this queue up.
pub const DEFAULT_MAX_WORKERS: usize = 8;

/// Matches requested per recognized face; only the best one is shown.
pub const DEFAULT_MAX_FACES: u32 = 1;

pub const JPEG_QUALITY: u8 = 90;

pub const FACE_CAPTION: &str = "face";
pub const UNKNOWN_CAPTION: &str = "UNKNOWN";

/// External image ids accepted by the face collection.
pub const FACE_NAME_PATTERN: &str = r"^[a-zA-Z0-9_.\-:]+$";

pub const IMAGE_EXTENSIONS: &[&str] = &["jpg", "jpeg", "png", "bmp", "tiff", "tif", "webp"];
