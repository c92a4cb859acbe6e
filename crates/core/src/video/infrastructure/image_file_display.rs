use std::path::{Path, PathBuf};

use crate::overlay::domain::render_sink::TextLabel;
use crate::shared::frame::Frame;
use crate::video::domain::preview_display::PreviewDisplay;
use crate::video::infrastructure::image_file_writer::save_frame;

/// Headless display that writes every shown frame to a directory.
///
/// Files are named `<sequence>-<window>.png` so crops shown mid-frame keep
/// their order relative to the main view. Captions are logged.
pub struct ImageFileDisplay {
    output_dir: PathBuf,
    shown: usize,
}

impl ImageFileDisplay {
    pub fn new(output_dir: &Path) -> Self {
        Self {
            output_dir: output_dir.to_path_buf(),
            shown: 0,
        }
    }

    pub fn shown(&self) -> usize {
        self.shown
    }
}

impl PreviewDisplay for ImageFileDisplay {
    fn show(
        &mut self,
        window: &str,
        frame: &Frame,
        labels: &[TextLabel],
    ) -> Result<(), Box<dyn std::error::Error>> {
        let name = format!("{:05}-{}.png", self.shown, window.to_lowercase());
        save_frame(&self.output_dir.join(&name), frame)?;
        for label in labels {
            log::info!(
                "{name}: '{}' at ({}, {})",
                label.text,
                label.origin.x,
                label.origin.y
            );
        }
        self.shown += 1;
        Ok(())
    }
}
