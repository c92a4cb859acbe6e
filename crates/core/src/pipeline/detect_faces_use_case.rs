use std::sync::Arc;

use crate::overlay::domain::annotation::Annotation;
use crate::overlay::domain::annotation_registry::AnnotationRegistry;
use crate::shared::constants::FACE_CAPTION;
use crate::shared::frame::Frame;
use crate::vision::domain::frame_encoder::FrameEncoder;
use crate::vision::domain::image_request::ImageRequest;
use crate::vision::domain::vision_service::VisionService;

/// Face detection with landmarks: encode → detect → annotate.
pub struct DetectFacesUseCase {
    service: Arc<dyn VisionService>,
    encoder: Arc<dyn FrameEncoder>,
}

impl DetectFacesUseCase {
    pub fn new(service: Arc<dyn VisionService>, encoder: Arc<dyn FrameEncoder>) -> Self {
        Self { service, encoder }
    }

    /// Adds one "face" annotation per detected face and returns how many.
    pub fn execute(
        &self,
        frame: &Frame,
        registry: &mut AnnotationRegistry,
    ) -> Result<usize, Box<dyn std::error::Error>> {
        let bytes = self
            .encoder
            .encode(frame)
            .map_err(|e| e as Box<dyn std::error::Error>)?;
        let faces = self
            .service
            .detect_faces(&ImageRequest::Bytes(bytes), true)?;

        for face in &faces {
            registry.add(Annotation::from_face(
                face,
                FACE_CAPTION,
                frame.width(),
                frame.height(),
            ));
        }
        log::info!("Detected {} face(s) in frame {}", faces.len(), frame.index());
        Ok(faces.len())
    }
}
