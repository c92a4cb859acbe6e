use std::path::Path;

use crate::shared::frame::Frame;

/// Saves an RGB frame; the format follows the file extension.
pub fn save_frame(path: &Path, frame: &Frame) -> Result<(), Box<dyn std::error::Error>> {
    if frame.channels() != 3 {
        return Err(format!("expected an RGB frame, got {} channels", frame.channels()).into());
    }
    if let Some(parent) = path.parent() {
        std::fs::create_dir_all(parent)?;
    }

    let img = image::RgbImage::from_raw(frame.width(), frame.height(), frame.data().to_vec())
        .ok_or("Failed to create image from frame data")?;
    img.save(path)?;
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_save_creates_parent_and_roundtrips() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("out").join("frame.png");
        let frame = Frame::filled(50, 40, [50, 100, 200], 0);

        save_frame(&path, &frame).unwrap();

        let img = image::open(&path).unwrap().to_rgb8();
        assert_eq!(img.dimensions(), (50, 40));
        assert_eq!(img.get_pixel(0, 0).0, [50, 100, 200]);
    }

    #[test]
    fn test_save_rejects_non_rgb_frame() {
        let dir = tempfile::tempdir().unwrap();
        let frame = Frame::new(vec![0u8; 16], 2, 2, 4, 0);
        assert!(save_frame(&dir.path().join("x.png"), &frame).is_err());
    }
}
