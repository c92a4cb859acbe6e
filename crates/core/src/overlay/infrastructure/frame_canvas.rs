use std::convert::Infallible;

use embedded_graphics::{
    draw_target::DrawTarget,
    mono_font::{ascii::FONT_10X20, MonoTextStyle},
    pixelcolor::Rgb888,
    prelude::*,
    primitives::Rectangle,
    text::{Baseline, Text, TextStyleBuilder},
};
use ndarray::s;

use crate::overlay::domain::render_sink::{RenderSink, Rgb, TextLabel};
use crate::shared::frame::Frame;
use crate::shared::geometry::{PixelPoint, PixelRect};

/// CPU render sink over an RGB [`Frame`].
///
/// Shapes and glyphs go into a copy of the frame (the layer); `blend` mixes
/// the layer back as `layer * alpha + frame * (1 - alpha)`. Shapes drawn
/// after the last `blend` are discarded.
pub struct FrameCanvas {
    base: Frame,
    layer: Frame,
    pending_labels: Vec<TextLabel>,
    labels: Vec<TextLabel>,
}

impl FrameCanvas {
    pub fn new(frame: Frame) -> Self {
        Self {
            layer: frame.clone(),
            base: frame,
            pending_labels: Vec::new(),
            labels: Vec::new(),
        }
    }

    pub fn frame(&self) -> &Frame {
        &self.base
    }

    pub fn labels(&self) -> &[TextLabel] {
        &self.labels
    }

    pub fn finish(self) -> (Frame, Vec<TextLabel>) {
        (self.base, self.labels)
    }

    /// Fills `[x1, x2) x [y1, y2)` on the layer, clipped to the frame.
    fn fill(&mut self, x1: i32, y1: i32, x2: i32, y2: i32, color: Rgb) {
        let w = self.layer.width() as i32;
        let h = self.layer.height() as i32;
        let (x1, x2) = (x1.clamp(0, w), x2.clamp(0, w));
        let (y1, y2) = (y1.clamp(0, h), y2.clamp(0, h));
        if x2 <= x1 || y2 <= y1 {
            return;
        }

        let channels = (self.layer.channels() as usize).min(color.len());
        let mut pixels = self.layer.as_ndarray_mut();
        let mut roi = pixels.slice_mut(s![y1 as usize..y2 as usize, x1 as usize..x2 as usize, ..]);
        for (c, &value) in color.iter().enumerate().take(channels) {
            roi.slice_mut(s![.., .., c]).fill(value);
        }
    }
}

impl RenderSink for FrameCanvas {
    fn draw_rect(&mut self, rect: &PixelRect, color: Rgb, thickness: u32) {
        let t = thickness.max(1) as i32;
        let PixelRect {
            top,
            left,
            right,
            bottom,
        } = *rect;
        self.fill(left, top, right, (top + t).min(bottom), color);
        self.fill(left, (bottom - t).max(top), right, bottom, color);
        self.fill(left, top, (left + t).min(right), bottom, color);
        self.fill((right - t).max(left), top, right, bottom, color);
    }

    fn draw_filled_rect(&mut self, rect: &PixelRect, color: Rgb) {
        self.fill(rect.left, rect.top, rect.right, rect.bottom, color);
    }

    fn draw_text(&mut self, text: &str, origin: PixelPoint, color: Rgb) {
        let character_style =
            MonoTextStyle::new(&FONT_10X20, Rgb888::new(color[0], color[1], color[2]));
        let text_style = TextStyleBuilder::new()
            .baseline(Baseline::Alphabetic)
            .build();
        match Text::with_text_style(
            text,
            Point::new(origin.x, origin.y),
            character_style,
            text_style,
        )
        .draw(&mut LayerTarget(&mut self.layer))
        {
            Ok(_) => {}
            Err(infallible) => match infallible {},
        }

        self.pending_labels.push(TextLabel {
            text: text.to_string(),
            origin,
            color,
            alpha: 1.0,
        });
    }

    fn draw_circle(&mut self, center: PixelPoint, radius: u32, color: Rgb) {
        let r = radius as i32;
        for dy in -r..=r {
            // Half-width of the disc on this row.
            let half = (((r * r - dy * dy) as f64).sqrt()) as i32;
            let y = center.y + dy;
            self.fill(center.x - half, y, center.x + half + 1, y + 1, color);
        }
    }

    fn blend(&mut self, alpha: f64) {
        let alpha = if alpha.is_nan() { 0.0 } else { alpha.clamp(0.0, 1.0) };
        for (dst, &src) in self.base.data_mut().iter_mut().zip(self.layer.data()) {
            let mixed = src as f64 * alpha + *dst as f64 * (1.0 - alpha);
            *dst = mixed.round().clamp(0.0, 255.0) as u8;
        }
        self.layer.data_mut().copy_from_slice(self.base.data());

        self.labels
            .extend(self.pending_labels.drain(..).map(|l| TextLabel { alpha, ..l }));
    }
}

/// `DrawTarget` writing clipped pixels into a canvas layer.
struct LayerTarget<'a>(&'a mut Frame);

impl Dimensions for LayerTarget<'_> {
    fn bounding_box(&self) -> Rectangle {
        Rectangle {
            top_left: Point { x: 0, y: 0 },
            size: Size {
                width: self.0.width(),
                height: self.0.height(),
            },
        }
    }
}

impl DrawTarget for LayerTarget<'_> {
    type Color = Rgb888;

    type Error = Infallible;

    fn draw_iter<I>(&mut self, pixels: I) -> Result<(), Self::Error>
    where
        I: IntoIterator<Item = Pixel<Self::Color>>,
    {
        let (width, height) = (self.0.width(), self.0.height());
        let channels = self.0.channels() as usize;
        let mut layer = self.0.as_ndarray_mut();
        for Pixel(point, color) in pixels {
            if point.x < 0 || point.y < 0 || point.x as u32 >= width || point.y as u32 >= height {
                continue;
            }
            let (x, y) = (point.x as usize, point.y as usize);
            for (c, value) in [color.r(), color.g(), color.b()]
                .into_iter()
                .enumerate()
                .take(channels)
            {
                layer[[y, x, c]] = value;
            }
        }
        Ok(())
    }
}
