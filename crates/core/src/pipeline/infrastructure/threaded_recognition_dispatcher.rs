use crate::overlay::domain::annotation_registry::AnnotationRegistry;
use crate::pipeline::recognition_dispatcher::{
    DispatchSummary, OnRecognized, RecognitionContext, RecognitionDispatcher, RecognitionOutcome,
    RecognitionTask,
};
use crate::shared::constants::DEFAULT_MAX_WORKERS;
use crate::shared::frame::Frame;
use crate::vision::domain::vision_service::FaceDetail;

/// Runs recognition tasks on a bounded pool of scoped worker threads.
///
/// Layout: `tasks → workers [encode/search] → caller [registry/preview]`
///
/// Workers only talk to the service. Outcomes travel back over a channel in
/// completion order, so the registry is only ever touched by the caller.
pub struct ThreadedRecognitionDispatcher {
    max_workers: usize,
}

impl ThreadedRecognitionDispatcher {
    pub fn new(max_workers: usize) -> Result<Self, &'static str> {
        if max_workers == 0 {
            return Err("max_workers must be at least 1");
        }
        Ok(Self { max_workers })
    }

    pub fn max_workers(&self) -> usize {
        self.max_workers
    }
}

impl Default for ThreadedRecognitionDispatcher {
    fn default() -> Self {
        Self {
            max_workers: DEFAULT_MAX_WORKERS,
        }
    }
}

impl RecognitionDispatcher for ThreadedRecognitionDispatcher {
    fn dispatch(
        &self,
        ctx: &RecognitionContext<'_>,
        frame: &Frame,
        faces: &[FaceDetail],
        registry: &mut AnnotationRegistry,
        mut on_complete: Option<OnRecognized<'_>>,
    ) -> DispatchSummary {
        let mut summary = DispatchSummary {
            dispatched: faces.len(),
            ..DispatchSummary::default()
        };
        if faces.is_empty() {
            return summary;
        }

        let workers = self.max_workers.min(faces.len());
        let (task_tx, task_rx) = crossbeam_channel::unbounded::<RecognitionTask>();
        let (done_tx, done_rx) = crossbeam_channel::unbounded::<RecognitionOutcome>();

        // Crops are copied before any worker starts.
        for face in faces {
            if task_tx.send(RecognitionTask::new(frame, face)).is_err() {
                break;
            }
        }
        drop(task_tx);

        log::debug!("Dispatching {} recognition tasks on {workers} workers", faces.len());

        std::thread::scope(|scope| {
            for _ in 0..workers {
                let task_rx = task_rx.clone();
                let done_tx = done_tx.clone();
                scope.spawn(move || {
                    for task in task_rx {
                        if done_tx.send(task.run(ctx)).is_err() {
                            break;
                        }
                    }
                });
            }
            drop(done_tx);

            for outcome in done_rx {
                summary.record(&outcome.status);
                registry.add(outcome.annotation.clone());
                if let Some(callback) = on_complete.as_mut() {
                    callback(&outcome);
                }
            }
        });

        summary
    }
}

#[cfg(test)]
mod tests {
    use std::sync::atomic::{AtomicUsize, Ordering};
    use std::sync::Mutex;
    use std::time::Duration;

    use super::*;
    use crate::shared::geometry::NormalizedBox;
    use crate::vision::domain::frame_encoder::FrameEncoder;
    use crate::vision::domain::image_request::ImageRequest;
    use crate::vision::domain::vision_error::VisionError;
    use crate::vision::domain::vision_service::{
        FaceMatch, FaceSearch, IndexedFace, Label, VisionService,
    };

    /// Encodes a crop as its first pixel's red value, which tells the stub
    /// service which face it is looking at.
    struct FirstPixelEncoder;

    impl FrameEncoder for FirstPixelEncoder {
        fn encode(
            &self,
            frame: &Frame,
        ) -> Result<Vec<u8>, Box<dyn std::error::Error + Send + Sync>> {
            Ok(vec![frame.data()[0]])
        }
    }

    /// Red value 10 matches "alice", 20 fails, 30 sleeps then matches "bob",
    /// anything else has no match.
    struct StubService {
        calls: AtomicUsize,
        in_flight: AtomicUsize,
        peak_in_flight: AtomicUsize,
        thread_names: Mutex<Vec<Option<String>>>,
    }

    impl StubService {
        fn new() -> Self {
            Self {
                calls: AtomicUsize::new(0),
                in_flight: AtomicUsize::new(0),
                peak_in_flight: AtomicUsize::new(0),
                thread_names: Mutex::new(Vec::new()),
            }
        }
    }

    impl VisionService for StubService {
        fn detect_labels(&self, _: &ImageRequest) -> Result<Vec<Label>, VisionError> {
            unreachable!()
        }
        fn detect_faces(&self, _: &ImageRequest, _: bool) -> Result<Vec<FaceDetail>, VisionError> {
            unreachable!()
        }
        fn index_faces(
            &self,
            _: &str,
            _: &ImageRequest,
            _: &str,
        ) -> Result<Vec<IndexedFace>, VisionError> {
            unreachable!()
        }
        fn search_faces_by_image(
            &self,
            collection_id: &str,
            image: &ImageRequest,
            max_faces: u32,
        ) -> Result<FaceSearch, VisionError> {
            assert_eq!(collection_id, "faces");
            assert_eq!(max_faces, 1);
            self.calls.fetch_add(1, Ordering::SeqCst);
            let now = self.in_flight.fetch_add(1, Ordering::SeqCst) + 1;
            self.peak_in_flight.fetch_max(now, Ordering::SeqCst);
            self.thread_names
                .lock()
                .unwrap()
                .push(std::thread::current().name().map(String::from));

            let ImageRequest::Bytes(bytes) = image else {
                panic!("expected inline bytes");
            };
            let found = |name: &str| FaceSearch {
                searched_bounding_box: None,
                matches: vec![FaceMatch {
                    external_image_id: name.into(),
                    similarity: 98.5,
                }],
            };
            let result = match bytes[0] {
                10 => Ok(found("alice")),
                20 => Err(VisionError::service("SearchFacesByImage", "throttled")),
                30 => {
                    std::thread::sleep(Duration::from_millis(300));
                    Ok(found("bob"))
                }
                _ => Ok(FaceSearch {
                    searched_bounding_box: None,
                    matches: vec![],
                }),
            };
            self.in_flight.fetch_sub(1, Ordering::SeqCst);
            result
        }
    }

    /// 100x100 frame with one 20x20 patch per red value, laid out left to right.
    fn frame_with_patches(reds: &[u8]) -> (Frame, Vec<FaceDetail>) {
        let mut frame = Frame::filled(100, 100, [0, 0, 0], 0);
        let mut faces = Vec::new();
        for (i, &red) in reds.iter().enumerate() {
            let left = (i as u32) * 25;
            {
                let mut view = frame.as_ndarray_mut();
                for y in 10..30usize {
                    for x in left as usize..left as usize + 20 {
                        view[[y, x, 0]] = red;
                    }
                }
            }
            faces.push(FaceDetail {
                bounding_box: NormalizedBox {
                    top: 0.1,
                    left: left as f64 / 100.0,
                    width: 0.2,
                    height: 0.2,
                },
                landmarks: vec![],
            });
        }
        (frame, faces)
    }

    fn ctx<'a>(service: &'a StubService) -> RecognitionContext<'a> {
        RecognitionContext {
            service,
            encoder: &FirstPixelEncoder,
            collection_id: "faces",
            max_faces: 1,
        }
    }

    fn captions(registry: &AnnotationRegistry) -> Vec<String> {
        let mut captions: Vec<String> = registry.snapshot().map(|a| a.caption.clone()).collect();
        captions.sort();
        captions
    }

    // ── Construction ──

    #[test]
    fn test_zero_workers_rejected() {
        assert!(ThreadedRecognitionDispatcher::new(0).is_err());
        assert_eq!(ThreadedRecognitionDispatcher::new(3).unwrap().max_workers(), 3);
        assert_eq!(ThreadedRecognitionDispatcher::default().max_workers(), 8);
    }

    // ── Dispatch ──

    #[test]
    fn test_one_failure_among_three_yields_one_unknown() {
        let service = StubService::new();
        let (frame, faces) = frame_with_patches(&[10, 20, 40]);
        let mut registry = AnnotationRegistry::default();
        let dispatcher = ThreadedRecognitionDispatcher::new(8).unwrap();

        let summary = dispatcher.dispatch(&ctx(&service), &frame, &faces, &mut registry, None);

        assert_eq!(registry.len(), 3);
        assert_eq!(captions(&registry), vec!["UNKNOWN", "UNKNOWN", "alice (98.50%)"]);
        assert_eq!(
            summary,
            DispatchSummary {
                dispatched: 3,
                matched: 1,
                unknown: 2,
                failed: 1,
            }
        );
        assert_eq!(service.calls.load(Ordering::SeqCst), 3);
    }

    #[test]
    fn test_empty_faces_dispatches_nothing() {
        let service = StubService::new();
        let frame = Frame::filled(10, 10, [0, 0, 0], 0);
        let mut registry = AnnotationRegistry::default();
        let mut previews = 0;
        let mut on_complete = |_: &RecognitionOutcome| previews += 1;

        let summary = ThreadedRecognitionDispatcher::default().dispatch(
            &ctx(&service),
            &frame,
            &[],
            &mut registry,
            Some(&mut on_complete),
        );

        assert_eq!(summary, DispatchSummary::default());
        assert!(registry.is_empty());
        assert_eq!(previews, 0);
        assert_eq!(service.calls.load(Ordering::SeqCst), 0);
    }

    #[test]
    fn test_outcomes_arrive_in_completion_order() {
        let service = StubService::new();
        let (frame, faces) = frame_with_patches(&[30, 10, 40]);
        let mut registry = AnnotationRegistry::default();
        let mut seen = Vec::new();
        let mut on_complete = |o: &RecognitionOutcome| seen.push(o.annotation.caption.clone());

        ThreadedRecognitionDispatcher::new(3).unwrap().dispatch(
            &ctx(&service),
            &frame,
            &faces,
            &mut registry,
            Some(&mut on_complete),
        );

        assert_eq!(seen.len(), 3);
        assert_eq!(seen.last().map(String::as_str), Some("bob (98.50%)"));
    }

    #[test]
    fn test_preview_receives_crop_of_each_face() {
        let service = StubService::new();
        let (frame, faces) = frame_with_patches(&[10, 40]);
        let mut registry = AnnotationRegistry::default();
        let mut crops = Vec::new();
        let mut on_complete = |o: &RecognitionOutcome| {
            let crop = o.crop.as_ref().unwrap();
            crops.push((crop.width(), crop.height(), crop.data()[0]));
        };

        ThreadedRecognitionDispatcher::new(1).unwrap().dispatch(
            &ctx(&service),
            &frame,
            &faces,
            &mut registry,
            Some(&mut on_complete),
        );

        crops.sort();
        assert_eq!(crops, vec![(20, 20, 10), (20, 20, 40)]);
    }

    #[test]
    fn test_single_worker_runs_calls_serially() {
        let service = StubService::new();
        let (frame, faces) = frame_with_patches(&[10, 40, 10, 40]);
        let mut registry = AnnotationRegistry::default();

        ThreadedRecognitionDispatcher::new(1).unwrap().dispatch(
            &ctx(&service),
            &frame,
            &faces,
            &mut registry,
            None,
        );

        assert_eq!(service.peak_in_flight.load(Ordering::SeqCst), 1);
        assert_eq!(registry.len(), 4);
    }

    #[test]
    fn test_calls_run_off_the_caller_thread() {
        let service = StubService::new();
        let (frame, faces) = frame_with_patches(&[10]);
        let mut registry = AnnotationRegistry::default();
        let caller = std::thread::current().id();
        let caller_name = std::thread::current().name().map(String::from);
        let mut on_complete = |_: &RecognitionOutcome| {
            assert_eq!(std::thread::current().id(), caller);
        };

        ThreadedRecognitionDispatcher::default().dispatch(
            &ctx(&service),
            &frame,
            &faces,
            &mut registry,
            Some(&mut on_complete),
        );

        let names = service.thread_names.lock().unwrap();
        assert_eq!(names.len(), 1);
        assert_ne!(names[0], caller_name);
    }
}
