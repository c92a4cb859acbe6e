//! JSON request/response records of the Rekognition API (`x-amz-json-1.1`).
//!
//! Only the fields this crate reads are modelled; unknown fields are ignored.

use base64::{engine::general_purpose::STANDARD as BASE64_STANDARD, Engine as _};
use serde::{Deserialize, Serialize};

use crate::shared::geometry::{NormalizedBox, NormalizedPoint};
use crate::vision::domain::image_request::ImageRequest;
use crate::vision::domain::vision_service::{FaceDetail, FaceMatch, FaceSearch, IndexedFace, Label};

#[derive(Serialize, Debug, PartialEq)]
pub enum WireImage {
    S3Object {
        #[serde(rename = "Bucket")]
        bucket: String,
        #[serde(rename = "Name")]
        name: String,
    },
    /// Base64 of the encoded image.
    Bytes(String),
}

impl From<&ImageRequest> for WireImage {
    fn from(image: &ImageRequest) -> Self {
        match image {
            ImageRequest::Stored(stored) => WireImage::S3Object {
                bucket: stored.bucket.clone(),
                name: stored.key.clone(),
            },
            ImageRequest::Bytes(bytes) => WireImage::Bytes(BASE64_STANDARD.encode(bytes)),
        }
    }
}

#[derive(Serialize, Debug)]
#[serde(rename_all = "PascalCase")]
pub struct DetectLabelsRequest {
    pub image: WireImage,
}

#[derive(Serialize, Debug)]
#[serde(rename_all = "PascalCase")]
pub struct DetectFacesRequest {
    pub image: WireImage,
    pub attributes: Vec<&'static str>,
}

#[derive(Serialize, Debug)]
#[serde(rename_all = "PascalCase")]
pub struct IndexFacesRequest<'a> {
    pub collection_id: &'a str,
    pub image: WireImage,
    pub external_image_id: &'a str,
}

#[derive(Serialize, Debug)]
#[serde(rename_all = "PascalCase")]
pub struct SearchFacesByImageRequest<'a> {
    pub collection_id: &'a str,
    pub image: WireImage,
    pub max_faces: u32,
}

#[derive(Deserialize, Debug, Clone, Copy)]
#[serde(rename_all = "PascalCase")]
pub struct WireBoundingBox {
    #[serde(default)]
    pub top: f64,
    #[serde(default)]
    pub left: f64,
    #[serde(default)]
    pub width: f64,
    #[serde(default)]
    pub height: f64,
}

impl From<WireBoundingBox> for NormalizedBox {
    fn from(b: WireBoundingBox) -> Self {
        NormalizedBox {
            top: b.top,
            left: b.left,
            width: b.width,
            height: b.height,
        }
    }
}

#[derive(Deserialize, Debug)]
#[serde(rename_all = "PascalCase")]
pub struct WireLandmark {
    pub x: f64,
    pub y: f64,
}

#[derive(Deserialize, Debug)]
#[serde(rename_all = "PascalCase")]
pub struct WireLabel {
    pub name: String,
    pub confidence: f64,
}

#[derive(Deserialize, Debug)]
#[serde(rename_all = "PascalCase")]
pub struct DetectLabelsResponse {
    #[serde(default)]
    pub labels: Vec<WireLabel>,
}

impl DetectLabelsResponse {
    pub fn into_labels(self) -> Vec<Label> {
        self.labels
            .into_iter()
            .map(|l| Label {
                name: l.name,
                confidence: l.confidence,
            })
            .collect()
    }
}

#[derive(Deserialize, Debug)]
#[serde(rename_all = "PascalCase")]
pub struct WireFaceDetail {
    pub bounding_box: WireBoundingBox,
    #[serde(default)]
    pub landmarks: Vec<WireLandmark>,
}

#[derive(Deserialize, Debug)]
#[serde(rename_all = "PascalCase")]
pub struct DetectFacesResponse {
    #[serde(default)]
    pub face_details: Vec<WireFaceDetail>,
}

impl DetectFacesResponse {
    pub fn into_faces(self, with_landmarks: bool) -> Vec<FaceDetail> {
        self.face_details
            .into_iter()
            .map(|f| FaceDetail {
                bounding_box: f.bounding_box.into(),
                landmarks: if with_landmarks {
                    f.landmarks
                        .into_iter()
                        .map(|l| NormalizedPoint { x: l.x, y: l.y })
                        .collect()
                } else {
                    Vec::new()
                },
            })
            .collect()
    }
}

#[derive(Deserialize, Debug)]
#[serde(rename_all = "PascalCase")]
pub struct WireFace {
    #[serde(default)]
    pub face_id: String,
    pub external_image_id: Option<String>,
}

#[derive(Deserialize, Debug)]
#[serde(rename_all = "PascalCase")]
pub struct WireFaceRecord {
    pub face: WireFace,
}

#[derive(Deserialize, Debug)]
#[serde(rename_all = "PascalCase")]
pub struct IndexFacesResponse {
    #[serde(default)]
    pub face_records: Vec<WireFaceRecord>,
}

impl IndexFacesResponse {
    pub fn into_indexed(self) -> Vec<IndexedFace> {
        self.face_records
            .into_iter()
            .map(|r| IndexedFace {
                face_id: r.face.face_id,
                external_image_id: r.face.external_image_id,
            })
            .collect()
    }
}

#[derive(Deserialize, Debug)]
#[serde(rename_all = "PascalCase")]
pub struct WireFaceMatch {
    pub similarity: f64,
    pub face: WireFace,
}

#[derive(Deserialize, Debug)]
#[serde(rename_all = "PascalCase")]
pub struct SearchFacesByImageResponse {
    pub searched_face_bounding_box: Option<WireBoundingBox>,
    #[serde(default)]
    pub face_matches: Vec<WireFaceMatch>,
}

impl SearchFacesByImageResponse {
    pub fn into_search(self) -> FaceSearch {
        FaceSearch {
            searched_bounding_box: self.searched_face_bounding_box.map(Into::into),
            matches: self
                .face_matches
                .into_iter()
                .map(|m| FaceMatch {
                    external_image_id: m.face.external_image_id.unwrap_or_default(),
                    similarity: m.similarity,
                })
                .collect(),
        }
    }
}

/// Error body; the service spells the message key either way.
#[derive(Deserialize, Debug, Default)]
pub struct ErrorResponse {
    #[serde(rename = "__type")]
    pub kind: Option<String>,
    #[serde(alias = "Message")]
    pub message: Option<String>,
}
