use std::collections::HashMap;
use std::path::{Path, PathBuf};

use crate::shared::frame::Frame;
use crate::video::domain::frame_source::FrameSource;
use crate::video::infrastructure::image_file_reader::{list_images, read_frame};

/// Replays a directory of still images as a camera feed.
///
/// Key presses come from a schedule keyed by frame index, so an interactive
/// session can be reproduced headlessly.
pub struct ImageSequenceSource {
    paths: Vec<PathBuf>,
    keys: HashMap<usize, char>,
    next_index: usize,
    pending_key: Option<char>,
}

impl ImageSequenceSource {
    pub fn new(paths: Vec<PathBuf>, keys: HashMap<usize, char>) -> Self {
        Self {
            paths,
            keys,
            next_index: 0,
            pending_key: None,
        }
    }

    pub fn open(dir: &Path, keys: HashMap<usize, char>) -> Result<Self, Box<dyn std::error::Error>> {
        let paths = list_images(dir)?;
        if paths.is_empty() {
            return Err(format!("No images found in {}", dir.display()).into());
        }
        Ok(Self::new(paths, keys))
    }

    pub fn len(&self) -> usize {
        self.paths.len()
    }

    pub fn is_empty(&self) -> bool {
        self.paths.is_empty()
    }
}

/// Parses a key schedule such as `0=f,12=r,30=q`.
pub fn parse_key_schedule(schedule: &str) -> Result<HashMap<usize, char>, String> {
    let mut keys = HashMap::new();
    for entry in schedule.split(',').map(str::trim_start).filter(|e| !e.is_empty()) {
        let (index, key) = entry
            .split_once('=')
            .ok_or_else(|| format!("expected <frame>=<key>, got '{entry}'"))?;
        let index: usize = index
            .trim()
            .parse()
            .map_err(|_| format!("invalid frame index in '{entry}'"))?;
        let mut chars = key.chars();
        let key = match (chars.next(), chars.next()) {
            (Some(c), None) => c,
            _ => return Err(format!("expected a single key character in '{entry}'")),
        };
        keys.insert(index, key);
    }
    Ok(keys)
}

impl FrameSource for ImageSequenceSource {
    fn next_frame(&mut self) -> Option<Result<Frame, Box<dyn std::error::Error>>> {
        let index = self.next_index;
        let path = self.paths.get(index)?;
        self.next_index += 1;
        self.pending_key = self.keys.get(&index).copied();
        Some(read_frame(path, index))
    }

    fn poll_key(&mut self) -> Option<char> {
        self.pending_key.take()
    }
}
