use crate::overlay::domain::annotation::Annotation;
use crate::overlay::domain::annotation_registry::AnnotationRegistry;
use crate::shared::constants::UNKNOWN_CAPTION;
use crate::shared::frame::Frame;
use crate::shared::geometry::{to_pixel_points, to_pixel_rect, PixelPoint, PixelRect};
use crate::vision::domain::frame_encoder::FrameEncoder;
use crate::vision::domain::image_request::ImageRequest;
use crate::vision::domain::vision_service::{FaceDetail, FaceSearch, VisionService};

/// Collaborators and parameters shared by every recognition task of a dispatch.
pub struct RecognitionContext<'a> {
    pub service: &'a dyn VisionService,
    pub encoder: &'a dyn FrameEncoder,
    pub collection_id: &'a str,
    pub max_faces: u32,
}

/// Per-task progress callback, run on the dispatching thread.
pub type OnRecognized<'a> = &'a mut dyn FnMut(&RecognitionOutcome);

/// Fans out one recognition call per detected face and feeds the results into
/// the registry as they complete.
///
/// This is a port; infrastructure decides how the calls are scheduled.
pub trait RecognitionDispatcher: Send {
    fn dispatch(
        &self,
        ctx: &RecognitionContext<'_>,
        frame: &Frame,
        faces: &[FaceDetail],
        registry: &mut AnnotationRegistry,
        on_complete: Option<OnRecognized<'_>>,
    ) -> DispatchSummary;
}

#[derive(Clone, Debug, PartialEq)]
pub enum TaskStatus {
    Matched,
    NoMatch,
    Failed(String),
}

/// What one recognition task produced.
#[derive(Clone, Debug)]
pub struct RecognitionOutcome {
    pub annotation: Annotation,
    pub crop: Option<Frame>,
    pub status: TaskStatus,
}

#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
pub struct DispatchSummary {
    pub dispatched: usize,
    pub matched: usize,
    /// Includes failed tasks.
    pub unknown: usize,
    pub failed: usize,
}

impl DispatchSummary {
    pub fn record(&mut self, status: &TaskStatus) {
        match status {
            TaskStatus::Matched => self.matched += 1,
            TaskStatus::NoMatch => self.unknown += 1,
            TaskStatus::Failed(_) => {
                self.unknown += 1;
                self.failed += 1;
            }
        }
    }
}

/// One face to recognize.
///
/// Holds a private copy of the face region, so the source frame may be
/// reused by capture while the call is in flight.
pub struct RecognitionTask {
    bounds: PixelRect,
    landmarks: Vec<PixelPoint>,
    crop: Option<Frame>,
}

impl RecognitionTask {
    pub fn new(frame: &Frame, face: &FaceDetail) -> Self {
        let bounds = to_pixel_rect(&face.bounding_box, frame.width(), frame.height());
        Self {
            bounds,
            landmarks: to_pixel_points(&face.landmarks, frame.width(), frame.height()),
            crop: frame.crop(&bounds),
        }
    }

    pub fn bounds(&self) -> &PixelRect {
        &self.bounds
    }

    /// Runs the search call; never fails, errors become an UNKNOWN caption.
    pub fn run(self, ctx: &RecognitionContext<'_>) -> RecognitionOutcome {
        let (caption, status) = match self.search(ctx) {
            Ok(search) => match search.best_match() {
                Some(m) => (
                    format!("{} ({:.2}%)", m.external_image_id, m.similarity),
                    TaskStatus::Matched,
                ),
                None => (UNKNOWN_CAPTION.to_string(), TaskStatus::NoMatch),
            },
            Err(e) => {
                log::warn!(
                    "Recognition failed for face at ({}, {}): {e}",
                    self.bounds.left,
                    self.bounds.top
                );
                (UNKNOWN_CAPTION.to_string(), TaskStatus::Failed(e.to_string()))
            }
        };

        RecognitionOutcome {
            annotation: Annotation::new(self.bounds, self.landmarks, caption),
            crop: self.crop,
            status,
        }
    }

    fn search(
        &self,
        ctx: &RecognitionContext<'_>,
    ) -> Result<FaceSearch, Box<dyn std::error::Error + Send + Sync>> {
        let crop = self
            .crop
            .as_ref()
            .ok_or("face region lies outside the frame")?;
        let bytes = ctx.encoder.encode(crop)?;
        let search = ctx.service.search_faces_by_image(
            ctx.collection_id,
            &ImageRequest::Bytes(bytes),
            ctx.max_faces,
        )?;
        Ok(search)
    }
}
