use crate::overlay::domain::annotation::Annotation;
use crate::overlay::domain::render_sink::{RenderSink, Rgb, BLUE, RED, WHITE};
use crate::shared::geometry::{PixelPoint, PixelRect};

pub const CAPTION_BAR_HEIGHT: i32 = 35;
const BOX_THICKNESS: u32 = 2;
const LANDMARK_RADIUS: u32 = 4;
const TEXT_INSET: i32 = 6;

/// Overlay policy: how an annotation looks on screen.
///
/// Each annotation is drawn on its own layer and blended with its fade as
/// alpha, so older annotations look dimmer. Painting only reads annotations.
pub struct OverlayPainter {
    box_color: Rgb,
    text_color: Rgb,
    landmark_color: Rgb,
}

impl OverlayPainter {
    pub fn new(box_color: Rgb, text_color: Rgb, landmark_color: Rgb) -> Self {
        Self {
            box_color,
            text_color,
            landmark_color,
        }
    }

    pub fn paint<'a>(
        &self,
        annotations: impl IntoIterator<Item = &'a Annotation>,
        sink: &mut dyn RenderSink,
    ) {
        for annotation in annotations {
            self.paint_one(annotation, sink);
        }
    }

    fn paint_one(&self, a: &Annotation, sink: &mut dyn RenderSink) {
        let b = &a.bounds;
        sink.draw_rect(b, self.box_color, BOX_THICKNESS);

        if !a.caption.is_empty() {
            let bar = PixelRect {
                top: (b.bottom - CAPTION_BAR_HEIGHT).max(b.top),
                left: b.left,
                right: b.right,
                bottom: b.bottom,
            };
            sink.draw_filled_rect(&bar, self.box_color);
            sink.draw_text(
                &a.caption,
                PixelPoint {
                    x: b.left + TEXT_INSET,
                    y: b.bottom - TEXT_INSET,
                },
                self.text_color,
            );
        }

        for &point in &a.landmarks {
            sink.draw_circle(point, LANDMARK_RADIUS, self.landmark_color);
        }

        sink.blend(a.fade());
    }
}

impl Default for OverlayPainter {
    fn default() -> Self {
        Self::new(RED, WHITE, BLUE)
    }
}
