use std::sync::Arc;

use crate::overlay::domain::annotation_registry::AnnotationRegistry;
use crate::pipeline::recognition_dispatcher::{
    DispatchSummary, OnRecognized, RecognitionContext, RecognitionDispatcher,
};
use crate::shared::frame::Frame;
use crate::vision::domain::frame_encoder::FrameEncoder;
use crate::vision::domain::image_request::ImageRequest;
use crate::vision::domain::vision_service::VisionService;

/// Detects every face in the frame, then looks each one up in the collection.
pub struct RecognizeFacesUseCase {
    service: Arc<dyn VisionService>,
    encoder: Arc<dyn FrameEncoder>,
    dispatcher: Box<dyn RecognitionDispatcher>,
    collection_id: String,
    max_faces: u32,
}

impl RecognizeFacesUseCase {
    pub fn new(
        service: Arc<dyn VisionService>,
        encoder: Arc<dyn FrameEncoder>,
        dispatcher: Box<dyn RecognitionDispatcher>,
        collection_id: &str,
        max_faces: u32,
    ) -> Self {
        Self {
            service,
            encoder,
            dispatcher,
            collection_id: collection_id.to_string(),
            max_faces,
        }
    }

    /// Fails only if the initial detection fails; per-face lookups degrade to
    /// "UNKNOWN" instead.
    pub fn execute(
        &self,
        frame: &Frame,
        registry: &mut AnnotationRegistry,
        on_complete: Option<OnRecognized<'_>>,
    ) -> Result<DispatchSummary, Box<dyn std::error::Error>> {
        let bytes = self
            .encoder
            .encode(frame)
            .map_err(|e| e as Box<dyn std::error::Error>)?;
        let faces = self
            .service
            .detect_faces(&ImageRequest::Bytes(bytes), true)?;

        let ctx = RecognitionContext {
            service: self.service.as_ref(),
            encoder: self.encoder.as_ref(),
            collection_id: &self.collection_id,
            max_faces: self.max_faces,
        };
        let summary = self
            .dispatcher
            .dispatch(&ctx, frame, &faces, registry, on_complete);

        log::info!(
            "Recognized {}/{} face(s) in frame {} ({} failed)",
            summary.matched,
            summary.dispatched,
            frame.index(),
            summary.failed
        );
        Ok(summary)
    }
}
