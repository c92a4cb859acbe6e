use std::path::{Path, PathBuf};
use std::process;
use std::sync::Arc;

use clap::{Parser, Subcommand};

use rekognition_overlay_core::overlay::domain::annotation_registry::AnnotationRegistry;
use rekognition_overlay_core::overlay::domain::overlay_painter::OverlayPainter;
use rekognition_overlay_core::overlay::infrastructure::frame_canvas::FrameCanvas;
use rekognition_overlay_core::pipeline::detect_faces_use_case::DetectFacesUseCase;
use rekognition_overlay_core::pipeline::detect_labels_use_case::DetectLabelsUseCase;
use rekognition_overlay_core::pipeline::enroll_face_use_case::EnrollFaceUseCase;
use rekognition_overlay_core::pipeline::infrastructure::threaded_recognition_dispatcher::ThreadedRecognitionDispatcher;
use rekognition_overlay_core::pipeline::overlay_session::OverlaySession;
use rekognition_overlay_core::pipeline::recognition_dispatcher::RecognitionOutcome;
use rekognition_overlay_core::pipeline::recognize_faces_use_case::RecognizeFacesUseCase;
use rekognition_overlay_core::pipeline::session_logger::LogSessionLogger;
use rekognition_overlay_core::shared::constants::DEFAULT_BUCKET;
use rekognition_overlay_core::shared::frame::Frame;
use rekognition_overlay_core::shared::settings::OverlaySettings;
use rekognition_overlay_core::video::infrastructure::image_file_display::ImageFileDisplay;
use rekognition_overlay_core::video::infrastructure::image_file_reader::read_frame;
use rekognition_overlay_core::video::infrastructure::image_file_writer::save_frame;
use rekognition_overlay_core::video::infrastructure::image_sequence_source::{
    parse_key_schedule, ImageSequenceSource,
};
use rekognition_overlay_core::vision::domain::face_name::validate_face_name;
use rekognition_overlay_core::vision::domain::frame_encoder::FrameEncoder;
use rekognition_overlay_core::vision::domain::image_request::{build_image_request, StoredImage};
use rekognition_overlay_core::vision::domain::vision_service::VisionService;
use rekognition_overlay_core::vision::infrastructure::jpeg_frame_encoder::JpegFrameEncoder;
use rekognition_overlay_core::vision::infrastructure::rekognition_client::RekognitionClient;

/// Labels, detects, recognizes and enrolls faces with a remote vision service,
/// drawing fading annotations over the images.
#[derive(Parser)]
#[command(name = "rekognition-overlay")]
struct Cli {
    /// Service region.
    #[arg(long, global = true)]
    region: Option<String>,

    /// Face collection used for recognition and enrollment.
    #[arg(long, global = true)]
    collection_id: Option<String>,

    /// Service endpoint URL, overriding the regional default.
    #[arg(long, global = true)]
    endpoint: Option<String>,

    /// Fade lost per displayed frame (0.0-1.0].
    #[arg(long, global = true)]
    fade_step: Option<f64>,

    /// Concurrent recognition calls.
    #[arg(long, global = true)]
    max_workers: Option<usize>,

    /// Settings file (JSON). Defaults to the platform config location.
    #[arg(long, global = true)]
    settings: Option<PathBuf>,

    #[command(subcommand)]
    command: Command,
}

#[derive(Subcommand)]
enum Command {
    /// Print object and scene labels for a local image or a stored one.
    Labels {
        /// Local image file.
        image: Option<PathBuf>,

        /// Bucket of the stored image.
        #[arg(long, default_value = DEFAULT_BUCKET)]
        bucket: String,

        /// Key of the stored image.
        #[arg(long)]
        key: Option<String>,
    },
    /// Draw a box around every detected face.
    Faces {
        image: PathBuf,

        #[arg(short, long)]
        output: PathBuf,
    },
    /// Caption every detected face with its best match in the collection.
    Recognize {
        image: PathBuf,

        #[arg(short, long)]
        output: PathBuf,

        /// Save each face crop with its caption to this directory.
        #[arg(long)]
        crops: Option<PathBuf>,
    },
    /// Enroll the single face in an image under a name.
    Index {
        image: PathBuf,

        #[arg(long, value_parser = parse_face_name)]
        face_name: String,
    },
    /// Replay a directory of frames as a live session with scripted key presses.
    Replay {
        frames_dir: PathBuf,

        /// Directory receiving the displayed frames.
        #[arg(short, long)]
        output: PathBuf,

        /// Key presses by frame index, e.g. "0=f,12=r,30=q".
        #[arg(long, default_value = "", value_parser = parse_key_schedule)]
        keys: std::collections::HashMap<usize, char>,

        /// Name used by the `i` key.
        #[arg(long, value_parser = parse_face_name)]
        face_name: Option<String>,

        /// Also write each recognized face crop as it arrives.
        #[arg(long)]
        crop_previews: bool,
    },
}

fn main() {
    env_logger::init();

    if let Err(e) = run() {
        eprintln!("Error: {e}");
        process::exit(1);
    }
}

fn run() -> Result<(), Box<dyn std::error::Error>> {
    let cli = Cli::parse();
    let settings = load_settings(&cli)?;
    validate(&cli.command)?;

    let service: Arc<dyn VisionService> =
        Arc::new(RekognitionClient::new(settings.service_endpoint())?);
    let encoder: Arc<dyn FrameEncoder> = Arc::new(JpegFrameEncoder::default());

    match cli.command {
        Command::Labels { image, bucket, key } => run_labels(image, bucket, key, service, encoder),
        Command::Faces { image, output } => run_faces(&image, &output, &settings, service, encoder),
        Command::Recognize {
            image,
            output,
            crops,
        } => run_recognize(&image, &output, crops.as_deref(), &settings, service, encoder),
        Command::Index { image, face_name } => {
            run_index(&image, &face_name, &settings, service, encoder)
        }
        Command::Replay {
            frames_dir,
            output,
            keys,
            face_name,
            crop_previews,
        } => {
            let settings = OverlaySettings {
                face_name: face_name.or(settings.face_name),
                show_crop_previews: crop_previews || settings.show_crop_previews,
                ..settings
            };
            run_replay(&frames_dir, &output, keys, settings, service, encoder)
        }
    }
}

fn run_labels(
    image: Option<PathBuf>,
    bucket: String,
    key: Option<String>,
    service: Arc<dyn VisionService>,
    encoder: Arc<dyn FrameEncoder>,
) -> Result<(), Box<dyn std::error::Error>> {
    let bytes = image.map(std::fs::read).transpose()?;
    let stored = key.map(|key| StoredImage::new(bucket, key));
    let request = build_image_request(stored, bytes)?;

    let labels = DetectLabelsUseCase::new(service, encoder).execute(&request)?;
    log::info!("{} label(s) detected", labels.len());
    Ok(())
}

fn run_faces(
    image: &Path,
    output: &Path,
    settings: &OverlaySettings,
    service: Arc<dyn VisionService>,
    encoder: Arc<dyn FrameEncoder>,
) -> Result<(), Box<dyn std::error::Error>> {
    let frame = read_frame(image, 0)?;
    let mut registry = AnnotationRegistry::new(settings.fade_step)?;

    DetectFacesUseCase::new(service, encoder).execute(&frame, &mut registry)?;
    write_annotated(frame, &registry, output)
}

fn run_recognize(
    image: &Path,
    output: &Path,
    crops_dir: Option<&Path>,
    settings: &OverlaySettings,
    service: Arc<dyn VisionService>,
    encoder: Arc<dyn FrameEncoder>,
) -> Result<(), Box<dyn std::error::Error>> {
    let frame = read_frame(image, 0)?;
    let mut registry = AnnotationRegistry::new(settings.fade_step)?;
    let use_case = RecognizeFacesUseCase::new(
        service,
        encoder,
        Box::new(ThreadedRecognitionDispatcher::new(settings.max_workers)?),
        &settings.collection_id,
        settings.max_faces,
    );

    let mut saved = 0usize;
    let mut save_crop = |outcome: &RecognitionOutcome| {
        let (Some(dir), Some(crop)) = (crops_dir, &outcome.crop) else {
            return;
        };
        let path = dir.join(format!("face-{saved:02}.png"));
        match save_frame(&path, crop) {
            Ok(()) => log::info!("{}: {}", path.display(), outcome.annotation.caption),
            Err(e) => log::warn!("Failed to save {}: {e}", path.display()),
        }
        saved += 1;
    };

    let summary = use_case.execute(&frame, &mut registry, Some(&mut save_crop))?;
    log::info!(
        "{} face(s): {} matched, {} unknown",
        summary.dispatched,
        summary.matched,
        summary.unknown
    );
    write_annotated(frame, &registry, output)
}

fn run_index(
    image: &Path,
    face_name: &str,
    settings: &OverlaySettings,
    service: Arc<dyn VisionService>,
    encoder: Arc<dyn FrameEncoder>,
) -> Result<(), Box<dyn std::error::Error>> {
    let frame = read_frame(image, 0)?;
    let mut registry = AnnotationRegistry::new(settings.fade_step)?;

    let indexed = EnrollFaceUseCase::new(service, encoder, &settings.collection_id).execute(
        &frame,
        face_name,
        &mut registry,
    )?;
    log::info!(
        "Enrolled {} face(s) as '{face_name}' in '{}'",
        indexed.len(),
        settings.collection_id
    );
    Ok(())
}

fn run_replay(
    frames_dir: &Path,
    output: &Path,
    keys: std::collections::HashMap<usize, char>,
    settings: OverlaySettings,
    service: Arc<dyn VisionService>,
    encoder: Arc<dyn FrameEncoder>,
) -> Result<(), Box<dyn std::error::Error>> {
    let mut source = ImageSequenceSource::open(frames_dir, keys)?;
    let mut display = ImageFileDisplay::new(output);
    let dispatcher = ThreadedRecognitionDispatcher::new(settings.max_workers)?;

    log::info!(
        "Replaying {} frames from {}",
        source.len(),
        frames_dir.display()
    );
    let mut session = OverlaySession::new(
        settings,
        service,
        encoder,
        Box::new(dispatcher),
        Box::new(LogSessionLogger::default()),
    )?;
    let shown = session.run(&mut source, &mut display)?;
    log::info!("Wrote {shown} frames to {}", output.display());
    Ok(())
}

/// Paints the registry once onto `frame` and saves it.
fn write_annotated(
    frame: Frame,
    registry: &AnnotationRegistry,
    output: &Path,
) -> Result<(), Box<dyn std::error::Error>> {
    let mut canvas = FrameCanvas::new(frame);
    OverlayPainter::default().paint(registry.snapshot(), &mut canvas);
    let (frame, labels) = canvas.finish();
    save_frame(output, &frame)?;
    for label in &labels {
        log::info!("'{}' at ({}, {})", label.text, label.origin.x, label.origin.y);
    }
    log::info!("Output written to {}", output.display());
    Ok(())
}

/// File settings first, then command-line overrides.
fn load_settings(cli: &Cli) -> Result<OverlaySettings, Box<dyn std::error::Error>> {
    let mut settings = match &cli.settings {
        Some(path) => OverlaySettings::load_from(path)?,
        None => OverlaySettings::load()?,
    };
    if let Some(region) = &cli.region {
        settings.region = region.clone();
    }
    if let Some(collection_id) = &cli.collection_id {
        settings.collection_id = collection_id.clone();
    }
    if let Some(endpoint) = &cli.endpoint {
        settings.endpoint = Some(endpoint.clone());
    }
    if let Some(fade_step) = cli.fade_step {
        settings.fade_step = fade_step;
    }
    if let Some(max_workers) = cli.max_workers {
        settings.max_workers = max_workers;
    }
    settings.validate()?;
    Ok(settings)
}

fn validate(command: &Command) -> Result<(), Box<dyn std::error::Error>> {
    let input = match command {
        Command::Labels { image: None, .. } => return Ok(()),
        Command::Labels {
            image: Some(image), ..
        } => image,
        Command::Faces { image, .. }
        | Command::Recognize { image, .. }
        | Command::Index { image, .. } => image,
        Command::Replay { frames_dir, .. } => {
            if !frames_dir.is_dir() {
                return Err(format!("Frames directory not found: {}", frames_dir.display()).into());
            }
            return Ok(());
        }
    };
    if !input.exists() {
        return Err(format!("Input file not found: {}", input.display()).into());
    }
    Ok(())
}

fn parse_face_name(name: &str) -> Result<String, String> {
    validate_face_name(name).map_err(|e| e.to_string())
}
