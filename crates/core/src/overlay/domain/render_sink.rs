use crate::shared::geometry::{PixelPoint, PixelRect};

pub type Rgb = [u8; 3];

pub const RED: Rgb = [255, 0, 0];
pub const BLUE: Rgb = [0, 0, 255];
pub const WHITE: Rgb = [255, 255, 255];

/// A caption placed by [`RenderSink::draw_text`] and blended with `alpha`.
///
/// The glyphs are drawn into the frame; displays receive the labels as well
/// so they can log what was captioned.
#[derive(Clone, Debug, PartialEq)]
pub struct TextLabel {
    pub text: String,
    pub origin: PixelPoint,
    pub color: Rgb,
    pub alpha: f64,
}

/// Drawing surface the overlay is painted onto.
///
/// Shape calls draw into a pending overlay layer; `blend` composites that
/// layer onto the target with the given alpha and starts a fresh layer.
pub trait RenderSink {
    fn draw_rect(&mut self, rect: &PixelRect, color: Rgb, thickness: u32);

    fn draw_filled_rect(&mut self, rect: &PixelRect, color: Rgb);

    /// `origin` is the bottom-left corner of the text baseline.
    fn draw_text(&mut self, text: &str, origin: PixelPoint, color: Rgb);

    fn draw_circle(&mut self, center: PixelPoint, radius: u32, color: Rgb);

    fn blend(&mut self, alpha: f64);
}
