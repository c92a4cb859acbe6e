pub mod jpeg_frame_encoder;
pub mod rekognition_client;
pub mod wire;
