use crate::shared::geometry::{to_pixel_points, to_pixel_rect, PixelPoint, PixelRect};
use crate::vision::domain::vision_service::FaceDetail;

/// A transient on-screen face marker.
///
/// Geometry and caption are fixed at creation. Only the owning
/// [`AnnotationRegistry`](super::annotation_registry::AnnotationRegistry)
/// changes `fade`, one step per displayed frame.
#[derive(Clone, Debug, PartialEq)]
pub struct Annotation {
    pub bounds: PixelRect,
    pub landmarks: Vec<PixelPoint>,
    pub caption: String,
    fade: f64,
    ticks: u32,
}

impl Annotation {
    pub fn new(bounds: PixelRect, landmarks: Vec<PixelPoint>, caption: impl Into<String>) -> Self {
        Self {
            bounds,
            landmarks,
            caption: caption.into(),
            fade: 1.0,
            ticks: 0,
        }
    }

    /// Builds an annotation for a detected face in a `frame_width` x `frame_height` frame.
    pub fn from_face(
        face: &FaceDetail,
        caption: impl Into<String>,
        frame_width: u32,
        frame_height: u32,
    ) -> Self {
        Self::new(
            to_pixel_rect(&face.bounding_box, frame_width, frame_height),
            to_pixel_points(&face.landmarks, frame_width, frame_height),
            caption,
        )
    }

    /// Remaining visibility in [0, 1]; used as the overlay alpha.
    pub fn fade(&self) -> f64 {
        self.fade
    }

    /// Derives fade from the tick count rather than repeated subtraction, so
    /// N ticks always cost exactly N steps.
    pub(crate) fn decay(&mut self, step: f64, epsilon: f64) {
        self.ticks = self.ticks.saturating_add(1);
        let fade = 1.0 - self.ticks as f64 * step;
        self.fade = if fade <= epsilon { 0.0 } else { fade.min(1.0) };
    }

    pub(crate) fn is_faded(&self) -> bool {
        self.fade <= 0.0
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::shared::geometry::{NormalizedBox, NormalizedPoint};
    use approx::assert_relative_eq;

    #[test]
    fn test_new_starts_fully_visible() {
        let a = Annotation::new(
            PixelRect {
                top: 0,
                left: 0,
                right: 10,
                bottom: 10,
            },
            vec![],
            "face",
        );
        assert_relative_eq!(a.fade(), 1.0);
        assert_eq!(a.caption, "face");
        assert!(!a.is_faded());
    }

    #[test]
    fn test_from_face_converts_geometry() {
        let face = FaceDetail {
            bounding_box: NormalizedBox {
                top: 0.5,
                left: 0.5,
                width: 0.1,
                height: 0.2,
            },
            landmarks: vec![NormalizedPoint { x: 0.55, y: 0.5 }],
        };
        let a = Annotation::from_face(&face, "UNKNOWN", 640, 480);
        assert_eq!(a.bounds.left, 320);
        assert_eq!(a.bounds.bottom, 336);
        assert_eq!(a.landmarks, vec![PixelPoint { x: 352, y: 240 }]);
        assert_eq!(a.caption, "UNKNOWN");
    }

    #[test]
    fn test_decay_snaps_residue_to_zero() {
        let mut a = Annotation::new(
            PixelRect {
                top: 0,
                left: 0,
                right: 1,
                bottom: 1,
            },
            vec![],
            "",
        );
        a.decay(0.6, 1e-9);
        assert_relative_eq!(a.fade(), 0.4, epsilon = 1e-12);
        a.decay(0.6, 1e-9);
        assert_eq!(a.fade(), 0.0);
        assert!(a.is_faded());
    }
}
