use crate::shared::frame::Frame;

/// Encodes a frame into the byte format sent to the vision service.
pub trait FrameEncoder: Send + Sync {
    fn encode(&self, frame: &Frame) -> Result<Vec<u8>, Box<dyn std::error::Error + Send + Sync>>;
}
