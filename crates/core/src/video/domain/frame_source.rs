use crate::shared::frame::Frame;

/// Supplies frames and key presses to the display loop.
///
/// A camera, a video file or a directory of stills all fit behind this.
pub trait FrameSource {
    /// Next frame in capture order, or `None` when the source is exhausted.
    fn next_frame(&mut self) -> Option<Result<Frame, Box<dyn std::error::Error>>>;

    /// Key pressed since the last call, if any.
    fn poll_key(&mut self) -> Option<char>;
}
