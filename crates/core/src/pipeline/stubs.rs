//! Scripted collaborators shared by the use case and session tests.

use std::sync::Mutex;

use crate::shared::frame::Frame;
use crate::shared::geometry::{NormalizedBox, NormalizedPoint};
use crate::vision::domain::frame_encoder::FrameEncoder;
use crate::vision::domain::image_request::ImageRequest;
use crate::vision::domain::vision_error::VisionError;
use crate::vision::domain::vision_service::{
    FaceDetail, FaceMatch, FaceSearch, IndexedFace, Label, VisionService,
};

pub struct ScriptedVisionService {
    pub labels: Vec<Label>,
    pub faces: Vec<FaceDetail>,
    pub fail_detect: bool,
    /// Name returned by every face search; `None` means no match.
    pub match_name: Option<String>,
    /// When set, `index_faces` succeeds but returns no records.
    pub index_nothing: bool,
    pub calls: Mutex<Vec<String>>,
    pub indexed: Mutex<Vec<(String, String)>>,
}

impl ScriptedVisionService {
    pub fn with_faces(faces: Vec<FaceDetail>) -> Self {
        Self {
            labels: Vec::new(),
            faces,
            fail_detect: false,
            match_name: None,
            index_nothing: false,
            calls: Mutex::new(Vec::new()),
            indexed: Mutex::new(Vec::new()),
        }
    }

    pub fn calls(&self) -> Vec<String> {
        self.calls.lock().unwrap().clone()
    }

    pub fn indexed(&self) -> Vec<(String, String)> {
        self.indexed.lock().unwrap().clone()
    }

    fn record(&self, operation: &str) {
        self.calls.lock().unwrap().push(operation.to_string());
    }
}

impl VisionService for ScriptedVisionService {
    fn detect_labels(&self, _image: &ImageRequest) -> Result<Vec<Label>, VisionError> {
        self.record("DetectLabels");
        Ok(self.labels.clone())
    }

    fn detect_faces(
        &self,
        _image: &ImageRequest,
        with_landmarks: bool,
    ) -> Result<Vec<FaceDetail>, VisionError> {
        self.record("DetectFaces");
        if self.fail_detect {
            return Err(VisionError::service("DetectFaces", "unavailable"));
        }
        let mut faces = self.faces.clone();
        if !with_landmarks {
            faces.iter_mut().for_each(|f| f.landmarks.clear());
        }
        Ok(faces)
    }

    fn index_faces(
        &self,
        collection_id: &str,
        _image: &ImageRequest,
        external_id: &str,
    ) -> Result<Vec<IndexedFace>, VisionError> {
        self.record("IndexFaces");
        self.indexed
            .lock()
            .unwrap()
            .push((collection_id.to_string(), external_id.to_string()));
        if self.index_nothing {
            return Ok(Vec::new());
        }
        Ok(vec![IndexedFace {
            face_id: "face-1".into(),
            external_image_id: Some(external_id.to_string()),
        }])
    }

    fn search_faces_by_image(
        &self,
        _collection_id: &str,
        _image: &ImageRequest,
        _max_faces: u32,
    ) -> Result<FaceSearch, VisionError> {
        self.record("SearchFacesByImage");
        Ok(FaceSearch {
            searched_bounding_box: None,
            matches: self
                .match_name
                .iter()
                .map(|name| FaceMatch {
                    external_image_id: name.clone(),
                    similarity: 97.0,
                })
                .collect(),
        })
    }
}

pub struct StubEncoder;

impl FrameEncoder for StubEncoder {
    fn encode(&self, frame: &Frame) -> Result<Vec<u8>, Box<dyn std::error::Error + Send + Sync>> {
        Ok(frame.data().iter().take(3).copied().collect())
    }
}

pub fn face_at(top: f64, left: f64) -> FaceDetail {
    FaceDetail {
        bounding_box: NormalizedBox {
            top,
            left,
            width: 0.25,
            height: 0.25,
        },
        landmarks: vec![NormalizedPoint {
            x: left + 0.125,
            y: top + 0.125,
        }],
    }
}
