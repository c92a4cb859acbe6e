use std::time::Duration;

use reqwest::blocking::Client;
use reqwest::header::CONTENT_TYPE;
use serde::de::DeserializeOwned;
use serde::Serialize;

use crate::vision::domain::image_request::ImageRequest;
use crate::vision::domain::vision_error::VisionError;
use crate::vision::domain::vision_service::{
    FaceDetail, FaceSearch, IndexedFace, Label, VisionService,
};
use crate::vision::infrastructure::wire::{
    DetectFacesRequest, DetectFacesResponse, DetectLabelsRequest, DetectLabelsResponse,
    ErrorResponse, IndexFacesRequest, IndexFacesResponse, SearchFacesByImageRequest,
    SearchFacesByImageResponse, WireImage,
};

const AMZ_JSON: &str = "application/x-amz-json-1.1";
const TARGET_PREFIX: &str = "RekognitionService";
const DEFAULT_TIMEOUT: Duration = Duration::from_secs(30);

/// Blocking JSON client for a Rekognition-compatible endpoint.
///
/// Requests are sent unsigned; point `endpoint` at a signing proxy or a
/// local emulator when talking to the real service.
pub struct RekognitionClient {
    http: Client,
    endpoint: String,
}

impl RekognitionClient {
    pub fn new(endpoint: impl Into<String>) -> Result<Self, VisionError> {
        let http = Client::builder()
            .timeout(DEFAULT_TIMEOUT)
            .build()
            .map_err(|e| VisionError::Transport {
                operation: "ClientSetup".into(),
                source: e,
            })?;
        Ok(Self {
            http,
            endpoint: endpoint.into().trim_end_matches('/').to_string(),
        })
    }

    pub fn endpoint(&self) -> &str {
        &self.endpoint
    }

    fn call<Req: Serialize, Resp: DeserializeOwned>(
        &self,
        operation: &str,
        body: &Req,
    ) -> Result<Resp, VisionError> {
        let payload = serde_json::to_vec(body).map_err(|e| VisionError::Encode {
            operation: operation.to_string(),
            source: e,
        })?;

        log::debug!("{operation}: {} byte request to {}", payload.len(), self.endpoint);

        let transport = |e: reqwest::Error| VisionError::Transport {
            operation: operation.to_string(),
            source: e,
        };
        let response = self
            .http
            .post(format!("{}/", self.endpoint))
            .header(CONTENT_TYPE, AMZ_JSON)
            .header("X-Amz-Target", format!("{TARGET_PREFIX}.{operation}"))
            .body(payload)
            .send()
            .map_err(transport)?;

        let status = response.status();
        let text = response.text().map_err(transport)?;

        if !status.is_success() {
            return Err(VisionError::service(operation, error_message(status, &text)));
        }

        serde_json::from_str(&text).map_err(|e| VisionError::Decode {
            operation: operation.to_string(),
            source: e,
        })
    }
}

fn error_message(status: reqwest::StatusCode, body: &str) -> String {
    let parsed: ErrorResponse = serde_json::from_str(body).unwrap_or_default();
    match (parsed.kind, parsed.message) {
        (Some(kind), Some(message)) => format!("{kind}: {message}"),
        (None, Some(message)) => message,
        (Some(kind), None) => kind,
        (None, None) => format!("HTTP {status}"),
    }
}

impl VisionService for RekognitionClient {
    fn detect_labels(&self, image: &ImageRequest) -> Result<Vec<Label>, VisionError> {
        let request = DetectLabelsRequest {
            image: WireImage::from(image),
        };
        let response: DetectLabelsResponse = self.call("DetectLabels", &request)?;
        Ok(response.into_labels())
    }

    fn detect_faces(
        &self,
        image: &ImageRequest,
        with_landmarks: bool,
    ) -> Result<Vec<FaceDetail>, VisionError> {
        let request = DetectFacesRequest {
            image: WireImage::from(image),
            attributes: vec![if with_landmarks { "ALL" } else { "DEFAULT" }],
        };
        let response: DetectFacesResponse = self.call("DetectFaces", &request)?;
        Ok(response.into_faces(with_landmarks))
    }

    fn index_faces(
        &self,
        collection_id: &str,
        image: &ImageRequest,
        external_id: &str,
    ) -> Result<Vec<IndexedFace>, VisionError> {
        let request = IndexFacesRequest {
            collection_id,
            image: WireImage::from(image),
            external_image_id: external_id,
        };
        let response: IndexFacesResponse = self.call("IndexFaces", &request)?;
        Ok(response.into_indexed())
    }

    fn search_faces_by_image(
        &self,
        collection_id: &str,
        image: &ImageRequest,
        max_faces: u32,
    ) -> Result<FaceSearch, VisionError> {
        let request = SearchFacesByImageRequest {
            collection_id,
            image: WireImage::from(image),
            max_faces,
        };
        let response: SearchFacesByImageResponse = self.call("SearchFacesByImage", &request)?;
        Ok(response.into_search())
    }
}
