use std::sync::Arc;

use crate::shared::frame::Frame;
use crate::vision::domain::frame_encoder::FrameEncoder;
use crate::vision::domain::image_request::ImageRequest;
use crate::vision::domain::vision_service::{Label, VisionService};

/// Object/scene labelling of a stored image or the current frame.
pub struct DetectLabelsUseCase {
    service: Arc<dyn VisionService>,
    encoder: Arc<dyn FrameEncoder>,
}

impl DetectLabelsUseCase {
    pub fn new(service: Arc<dyn VisionService>, encoder: Arc<dyn FrameEncoder>) -> Self {
        Self { service, encoder }
    }

    pub fn execute(&self, image: &ImageRequest) -> Result<Vec<Label>, Box<dyn std::error::Error>> {
        let labels = self.service.detect_labels(image)?;
        for label in &labels {
            log::info!("{} = {:.2}%", label.name, label.confidence);
        }
        Ok(labels)
    }

    /// Encodes `frame` and labels it inline.
    pub fn execute_frame(&self, frame: &Frame) -> Result<Vec<Label>, Box<dyn std::error::Error>> {
        let bytes = self
            .encoder
            .encode(frame)
            .map_err(|e| e as Box<dyn std::error::Error>)?;
        self.execute(&ImageRequest::Bytes(bytes))
    }
}
