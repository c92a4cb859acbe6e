use std::sync::Arc;

use crate::overlay::domain::annotation::Annotation;
use crate::overlay::domain::annotation_registry::AnnotationRegistry;
use crate::shared::frame::Frame;
use crate::vision::domain::face_name::validate_face_name;
use crate::vision::domain::frame_encoder::FrameEncoder;
use crate::vision::domain::image_request::ImageRequest;
use crate::vision::domain::vision_error::VisionError;
use crate::vision::domain::vision_service::{IndexedFace, VisionService};

/// Registers the single face in a frame under a name in the collection.
pub struct EnrollFaceUseCase {
    service: Arc<dyn VisionService>,
    encoder: Arc<dyn FrameEncoder>,
    collection_id: String,
}

impl EnrollFaceUseCase {
    pub fn new(
        service: Arc<dyn VisionService>,
        encoder: Arc<dyn FrameEncoder>,
        collection_id: &str,
    ) -> Self {
        Self {
            service,
            encoder,
            collection_id: collection_id.to_string(),
        }
    }

    /// Indexes the frame only when exactly one face is present; otherwise
    /// returns `PreconditionFailed` without touching the collection or the
    /// registry. If the service indexes nothing, returns `NothingIndexed`
    /// and leaves the registry unchanged.
    pub fn execute(
        &self,
        frame: &Frame,
        name: &str,
        registry: &mut AnnotationRegistry,
    ) -> Result<Vec<IndexedFace>, Box<dyn std::error::Error>> {
        let name = validate_face_name(name)?;
        let bytes = self
            .encoder
            .encode(frame)
            .map_err(|e| e as Box<dyn std::error::Error>)?;
        let request = ImageRequest::Bytes(bytes);

        let faces = self.service.detect_faces(&request, false)?;
        let [face] = faces.as_slice() else {
            return Err(VisionError::PreconditionFailed { found: faces.len() }.into());
        };

        let indexed = self
            .service
            .index_faces(&self.collection_id, &request, &name)?;
        if indexed.is_empty() {
            return Err(VisionError::NothingIndexed {
                collection_id: self.collection_id.clone(),
            }
            .into());
        }
        for record in &indexed {
            log::info!(
                "Indexed face {} as '{name}' in collection '{}'",
                record.face_id,
                self.collection_id
            );
        }

        registry.add(Annotation::from_face(
            face,
            name,
            frame.width(),
            frame.height(),
        ));
        Ok(indexed)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::pipeline::stubs::{face_at, ScriptedVisionService, StubEncoder};
    use rstest::rstest;

    fn frame() -> Frame {
        Frame::filled(100, 100, [5, 5, 5], 0)
    }

    #[test]
    fn test_single_face_is_indexed_and_annotated() {
        let service = Arc::new(ScriptedVisionService::with_faces(vec![face_at(0.2, 0.2)]));
        let use_case = EnrollFaceUseCase::new(service.clone(), Arc::new(StubEncoder), "faces");
        let mut registry = AnnotationRegistry::default();

        let indexed = use_case.execute(&frame(), "lee", &mut registry).unwrap();

        assert_eq!(indexed.len(), 1);
        assert_eq!(indexed[0].external_image_id.as_deref(), Some("lee"));
        assert_eq!(service.indexed(), vec![("faces".to_string(), "lee".to_string())]);
        assert_eq!(registry.len(), 1);
        assert_eq!(registry.snapshot().next().unwrap().caption, "lee");
    }

    #[rstest]
    #[case::no_faces(0)]
    #[case::two_faces(2)]
    #[case::three_faces(3)]
    fn test_wrong_face_count_is_precondition_failure(#[case] count: usize) {
        let faces = (0..count).map(|i| face_at(0.1 * i as f64, 0.0)).collect();
        let service = Arc::new(ScriptedVisionService::with_faces(faces));
        let use_case = EnrollFaceUseCase::new(service.clone(), Arc::new(StubEncoder), "faces");
        let mut registry = AnnotationRegistry::default();

        let err = use_case.execute(&frame(), "lee", &mut registry).unwrap_err();

        match err.downcast_ref::<VisionError>() {
            Some(VisionError::PreconditionFailed { found }) => assert_eq!(*found, count),
            other => panic!("expected PreconditionFailed, got {other:?}"),
        }
        assert!(service.indexed().is_empty());
        assert!(registry.is_empty());
    }

    #[test]
    fn test_nothing_indexed_is_an_error_and_not_annotated() {
        let mut service = ScriptedVisionService::with_faces(vec![face_at(0.2, 0.2)]);
        service.index_nothing = true;
        let service = Arc::new(service);
        let use_case = EnrollFaceUseCase::new(service.clone(), Arc::new(StubEncoder), "faces");
        let mut registry = AnnotationRegistry::default();

        let err = use_case.execute(&frame(), "lee", &mut registry).unwrap_err();

        match err.downcast_ref::<VisionError>() {
            Some(VisionError::NothingIndexed { collection_id }) => {
                assert_eq!(collection_id, "faces")
            }
            other => panic!("expected NothingIndexed, got {other:?}"),
        }
        assert_eq!(service.indexed().len(), 1);
        assert!(registry.is_empty());
    }

    #[test]
    fn test_invalid_name_rejected_before_any_call() {
        let service = Arc::new(ScriptedVisionService::with_faces(vec![face_at(0.2, 0.2)]));
        let use_case = EnrollFaceUseCase::new(service.clone(), Arc::new(StubEncoder), "faces");
        let mut registry = AnnotationRegistry::default();

        let err = use_case
            .execute(&frame(), "not a name", &mut registry)
            .unwrap_err();

        assert!(matches!(
            err.downcast_ref::<VisionError>(),
            Some(VisionError::InvalidArgument(_))
        ));
        assert!(service.calls().is_empty());
    }
}
