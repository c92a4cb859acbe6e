use crate::overlay::domain::render_sink::TextLabel;
use crate::shared::frame::Frame;

pub const MAIN_WINDOW: &str = "Video";
pub const FACE_WINDOW: &str = "Face";

/// Shows annotated frames to the user.
pub trait PreviewDisplay {
    /// Shows `frame` in the named window; `labels` are captions to draw on top.
    fn show(
        &mut self,
        window: &str,
        frame: &Frame,
        labels: &[TextLabel],
    ) -> Result<(), Box<dyn std::error::Error>>;
}
