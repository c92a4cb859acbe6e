//! Conversion from the vision service's normalized coordinates to frame pixels.
//!
//! The service reports boxes and landmarks as ratios of the image size. Pixel
//! values are truncated toward zero, matching an integer cast.

/// Bounding box as ratios of the image width/height, each nominally in [0, 1].
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct NormalizedBox {
    pub top: f64,
    pub left: f64,
    pub width: f64,
    pub height: f64,
}

/// Point as ratios of the image width (`x`) and height (`y`).
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct NormalizedPoint {
    pub x: f64,
    pub y: f64,
}

/// Axis-aligned rectangle in frame pixels.
///
/// Invariant: `right >= left` and `bottom >= top`.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct PixelRect {
    pub top: i32,
    pub left: i32,
    pub right: i32,
    pub bottom: i32,
}

impl PixelRect {
    pub fn width(&self) -> i32 {
        self.right - self.left
    }

    pub fn height(&self) -> i32 {
        self.bottom - self.top
    }
}

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct PixelPoint {
    pub x: i32,
    pub y: i32,
}

/// Scales a normalized box to pixels.
///
/// Top/left are clamped to be non-negative. Right/bottom are NOT clamped to
/// the frame, so boxes reaching past the frame edge keep their full size.
pub fn to_pixel_rect(b: &NormalizedBox, frame_width: u32, frame_height: u32) -> PixelRect {
    let w = frame_width as f64;
    let h = frame_height as f64;

    let top = ((b.top * h) as i32).max(0);
    let left = ((b.left * w) as i32).max(0);
    let width = ((b.width * w) as i32).max(0);
    let height = ((b.height * h) as i32).max(0);

    PixelRect {
        top,
        left,
        right: left.saturating_add(width),
        bottom: top.saturating_add(height),
    }
}

/// Scales normalized landmarks to pixels, without clamping.
pub fn to_pixel_points(
    points: &[NormalizedPoint],
    frame_width: u32,
    frame_height: u32,
) -> Vec<PixelPoint> {
    let w = frame_width as f64;
    let h = frame_height as f64;
    points
        .iter()
        .map(|p| PixelPoint {
            x: (p.x * w) as i32,
            y: (p.y * h) as i32,
        })
        .collect()
}
