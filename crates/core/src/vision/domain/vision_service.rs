use crate::shared::geometry::{NormalizedBox, NormalizedPoint};
use crate::vision::domain::image_request::ImageRequest;
use crate::vision::domain::vision_error::VisionError;

#[derive(Clone, Debug, PartialEq)]
pub struct Label {
    pub name: String,
    /// Percentage, 0-100.
    pub confidence: f64,
}

#[derive(Clone, Debug, PartialEq)]
pub struct FaceDetail {
    pub bounding_box: NormalizedBox,
    /// Empty unless landmarks were requested.
    pub landmarks: Vec<NormalizedPoint>,
}

#[derive(Clone, Debug, PartialEq)]
pub struct FaceMatch {
    pub external_image_id: String,
    /// Percentage, 0-100.
    pub similarity: f64,
}

/// Result of searching a collection with the largest face in an image.
#[derive(Clone, Debug, PartialEq)]
pub struct FaceSearch {
    pub searched_bounding_box: Option<NormalizedBox>,
    /// Ordered best match first.
    pub matches: Vec<FaceMatch>,
}

impl FaceSearch {
    pub fn best_match(&self) -> Option<&FaceMatch> {
        self.matches
            .iter()
            .max_by(|a, b| a.similarity.total_cmp(&b.similarity))
    }
}

#[derive(Clone, Debug, PartialEq)]
pub struct IndexedFace {
    pub face_id: String,
    pub external_image_id: Option<String>,
}

/// Capabilities consumed from the cloud vision service.
///
/// Shared by reference across recognition workers, hence `Sync`.
pub trait VisionService: Send + Sync {
    fn detect_labels(&self, image: &ImageRequest) -> Result<Vec<Label>, VisionError>;

    fn detect_faces(
        &self,
        image: &ImageRequest,
        with_landmarks: bool,
    ) -> Result<Vec<FaceDetail>, VisionError>;

    fn index_faces(
        &self,
        collection_id: &str,
        image: &ImageRequest,
        external_id: &str,
    ) -> Result<Vec<IndexedFace>, VisionError>;

    fn search_faces_by_image(
        &self,
        collection_id: &str,
        image: &ImageRequest,
        max_faces: u32,
    ) -> Result<FaceSearch, VisionError>;
}
