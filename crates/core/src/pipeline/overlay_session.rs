use std::sync::Arc;
use std::time::Instant;

use crate::overlay::domain::annotation::Annotation;
use crate::overlay::domain::annotation_registry::AnnotationRegistry;
use crate::overlay::domain::overlay_painter::OverlayPainter;
use crate::overlay::domain::render_sink::TextLabel;
use crate::overlay::infrastructure::frame_canvas::FrameCanvas;
use crate::pipeline::detect_faces_use_case::DetectFacesUseCase;
use crate::pipeline::detect_labels_use_case::DetectLabelsUseCase;
use crate::pipeline::enroll_face_use_case::EnrollFaceUseCase;
use crate::pipeline::recognition_dispatcher::{RecognitionDispatcher, RecognitionOutcome};
use crate::pipeline::recognize_faces_use_case::RecognizeFacesUseCase;
use crate::pipeline::session_logger::SessionLogger;
use crate::shared::frame::Frame;
use crate::shared::geometry::PixelRect;
use crate::shared::settings::OverlaySettings;
use crate::video::domain::frame_source::FrameSource;
use crate::video::domain::preview_display::{PreviewDisplay, FACE_WINDOW, MAIN_WINDOW};
use crate::vision::domain::frame_encoder::FrameEncoder;
use crate::vision::domain::vision_service::VisionService;

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum KeyOutcome {
    Continue,
    Quit,
}

/// The interactive overlay loop.
///
/// Owns the annotation registry and every collaborator the key bindings need:
///
/// | key     | action                          |
/// |---------|---------------------------------|
/// | `o`, ` `| label the current frame         |
/// | `f`     | annotate detected faces         |
/// | `r`     | recognize faces                 |
/// | `i`     | enroll the face as `face_name`  |
/// | `q`     | quit                            |
///
/// Operation failures are logged and the loop carries on.
pub struct OverlaySession {
    settings: OverlaySettings,
    registry: AnnotationRegistry,
    painter: OverlayPainter,
    labels: DetectLabelsUseCase,
    faces: DetectFacesUseCase,
    recognize: RecognizeFacesUseCase,
    enroll: EnrollFaceUseCase,
    logger: Box<dyn SessionLogger>,
}

impl OverlaySession {
    pub fn new(
        settings: OverlaySettings,
        service: Arc<dyn VisionService>,
        encoder: Arc<dyn FrameEncoder>,
        dispatcher: Box<dyn RecognitionDispatcher>,
        logger: Box<dyn SessionLogger>,
    ) -> Result<Self, Box<dyn std::error::Error>> {
        settings.validate()?;
        let registry = AnnotationRegistry::new(settings.fade_step)?;

        Ok(Self {
            registry,
            painter: OverlayPainter::default(),
            labels: DetectLabelsUseCase::new(service.clone(), encoder.clone()),
            faces: DetectFacesUseCase::new(service.clone(), encoder.clone()),
            recognize: RecognizeFacesUseCase::new(
                service.clone(),
                encoder.clone(),
                dispatcher,
                &settings.collection_id,
                settings.max_faces,
            ),
            enroll: EnrollFaceUseCase::new(service, encoder, &settings.collection_id),
            settings,
            logger,
        })
    }

    pub fn registry(&self) -> &AnnotationRegistry {
        &self.registry
    }

    /// Displays frames until the source runs dry or `q` is pressed.
    /// Returns the number of frames shown.
    pub fn run(
        &mut self,
        source: &mut dyn FrameSource,
        display: &mut dyn PreviewDisplay,
    ) -> Result<usize, Box<dyn std::error::Error>> {
        let mut shown = 0;

        while let Some(frame) = source.next_frame() {
            let frame = frame?;

            if let Some(key) = source.poll_key() {
                if self.handle_key(key, &frame, display) == KeyOutcome::Quit {
                    self.logger.info("Quitting");
                    break;
                }
            }

            let index = frame.index();
            let (frame, labels) = self.render(frame);
            display.show(MAIN_WINDOW, &frame, &labels)?;
            self.logger.frame(index);
            shown += 1;
        }

        self.logger.summary();
        Ok(shown)
    }

    /// Runs the operation bound to `key` against `frame`.
    pub fn handle_key(
        &mut self,
        key: char,
        frame: &Frame,
        display: &mut dyn PreviewDisplay,
    ) -> KeyOutcome {
        let started = Instant::now();
        let (operation, result) = match key {
            'q' => return KeyOutcome::Quit,
            'o' | ' ' => ("labels", self.labels.execute_frame(frame).map(|_| ())),
            'f' => ("faces", self.faces.execute(frame, &mut self.registry).map(|_| ())),
            'r' => ("recognize", self.recognize_with_previews(frame, display)),
            'i' => ("enroll", self.enroll_configured_face(frame)),
            _ => return KeyOutcome::Continue,
        };

        self.logger
            .timing(operation, started.elapsed().as_secs_f64() * 1000.0);
        if let Err(e) = result {
            log::warn!("{operation} failed on frame {}: {e}", frame.index());
        }
        KeyOutcome::Continue
    }

    /// Paints the live annotations onto `frame`, then advances their fade by
    /// one step.
    pub fn render(&mut self, frame: Frame) -> (Frame, Vec<TextLabel>) {
        let mut canvas = FrameCanvas::new(frame);
        self.painter.paint(self.registry.snapshot(), &mut canvas);
        self.registry.tick();
        self.logger
            .metric("annotations", self.registry.len() as f64);
        canvas.finish()
    }

    fn recognize_with_previews(
        &mut self,
        frame: &Frame,
        display: &mut dyn PreviewDisplay,
    ) -> Result<(), Box<dyn std::error::Error>> {
        let painter = &self.painter;
        let mut show_crop = |outcome: &RecognitionOutcome| {
            let Some(crop) = &outcome.crop else {
                return;
            };
            let (crop, labels) = captioned_crop(painter, crop, &outcome.annotation.caption);
            if let Err(e) = display.show(FACE_WINDOW, &crop, &labels) {
                log::warn!("Failed to show face preview: {e}");
            }
        };
        let on_complete = if self.settings.show_crop_previews {
            Some(&mut show_crop as &mut dyn FnMut(&RecognitionOutcome))
        } else {
            None
        };

        self.recognize
            .execute(frame, &mut self.registry, on_complete)
            .map(|_| ())
    }

    fn enroll_configured_face(&mut self, frame: &Frame) -> Result<(), Box<dyn std::error::Error>> {
        let Some(name) = self.settings.face_name.as_deref() else {
            log::warn!("No face name configured; enrollment skipped");
            return Ok(());
        };
        self.enroll.execute(frame, name, &mut self.registry)?;
        Ok(())
    }
}

/// The face crop with its caption drawn the same way as on the main view.
fn captioned_crop(painter: &OverlayPainter, crop: &Frame, caption: &str) -> (Frame, Vec<TextLabel>) {
    let whole = Annotation::new(
        PixelRect {
            top: 0,
            left: 0,
            right: crop.width() as i32,
            bottom: crop.height() as i32,
        },
        Vec::new(),
        caption,
    );
    let mut canvas = FrameCanvas::new(crop.clone());
    painter.paint([&whole], &mut canvas);
    canvas.finish()
}
