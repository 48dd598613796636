//! Command-line viewer for depthview containers
//!
//! `depthview view` runs a full viewing session: the container is split,
//! the primary image is decoded and corrected, the depth image is decoded
//! when requested and the primary image is checked for a QR code.
//! `depthview scan` only lists the sub-images in a container.

mod detector;

use std::path::{Path, PathBuf};
use std::process::ExitCode;

use clap::{Parser, Subcommand};
use depthview_core::container::{load_buffer, scan, trailing_bytes, ContainerError};
use depthview_core::decode::{probe_dimensions, DecodedImage};
use depthview_core::orient::{read_orientation, Orientation};
use depthview_core::pager::{PageRenderer, Pager};
use depthview_core::recognize::{RecognitionOutcome, Verdict};
use depthview_core::session::{SessionEvent, SessionParams, ViewingSession};
use depthview_core::{ConfigError, ViewerConfig};
use thiserror::Error;

use crate::detector::RqrrDetector;

/// View multi-image JPEG containers
#[derive(Parser)]
#[command(name = "depthview")]
#[command(version)]
#[command(about = "View multi-image JPEG containers", long_about = None)]
struct Args {
    #[command(subcommand)]
    command: Command,
}

#[derive(Subcommand)]
enum Command {
    /// Decode a container, correct its orientation and run recognition
    View {
        file: PathBuf,

        /// Clockwise sensor rotation in degrees (0, 90, 180, 270).
        /// Read from EXIF when omitted.
        #[arg(long, allow_hyphen_values = true)]
        orientation: Option<i32>,

        /// The capture was mirrored
        #[arg(long)]
        mirrored: bool,

        /// The container carries a depth image after the primary image
        #[arg(long)]
        has_depth: bool,

        /// Maximum width or height of a decoded page
        #[arg(long)]
        cap: Option<u32>,

        /// Code value treated as a match
        #[arg(long)]
        reference: Option<String>,

        /// JSON config file
        #[arg(long)]
        config: Option<PathBuf>,
    },
    /// List the sub-images in a container
    Scan { file: PathBuf },
}

#[derive(Debug, Error)]
enum CliError {
    #[error(transparent)]
    Config(#[from] ConfigError),

    #[error(transparent)]
    Container(#[from] ContainerError),

    #[error("Unsupported orientation: {0} degrees")]
    Orientation(i32),

    #[error("{0}")]
    Session(String),
}

#[tokio::main]
async fn main() -> ExitCode {
    env_logger::Builder::from_env(env_logger::Env::default().default_filter_or("warn")).init();

    let args = Args::parse();
    let result = match args.command {
        Command::View {
            file,
            orientation,
            mirrored,
            has_depth,
            cap,
            reference,
            config,
        } => {
            let overrides = Overrides {
                cap,
                reference,
                config,
            };
            match (load_config(overrides), orientation_from(orientation, mirrored)) {
                (Ok(config), Ok(orientation)) => {
                    let mut params = SessionParams::new(file).with_secondary(has_depth);
                    params.orientation = orientation;
                    view(params, &config).await
                }
                (Err(e), _) | (_, Err(e)) => Err(e),
            }
        }
        Command::Scan { file } => scan_file(&file),
    };

    match result {
        Ok(()) => ExitCode::SUCCESS,
        Err(e) => {
            eprintln!("depthview: {}", e);
            ExitCode::FAILURE
        }
    }
}

struct Overrides {
    cap: Option<u32>,
    reference: Option<String>,
    config: Option<PathBuf>,
}

fn load_config(overrides: Overrides) -> Result<ViewerConfig, CliError> {
    let mut config = match &overrides.config {
        Some(path) => ViewerConfig::load(path)?,
        None => ViewerConfig::default(),
    };
    if let Some(cap) = overrides.cap {
        config.downsample_cap = cap;
    }
    if let Some(reference) = overrides.reference {
        config.reference_code = reference;
    }
    config.validate()?;
    Ok(config)
}

fn orientation_from(degrees: Option<i32>, mirrored: bool) -> Result<Option<Orientation>, CliError> {
    match (degrees, mirrored) {
        (None, false) => Ok(None),
        (degrees, mirrored) => {
            let degrees = degrees.unwrap_or(0);
            Orientation::from_degrees(degrees, mirrored)
                .map(Some)
                .ok_or(CliError::Orientation(degrees))
        }
    }
}

async fn view(params: SessionParams, config: &ViewerConfig) -> Result<(), CliError> {
    println!("{}", params.path.display());
    let (handle, mut events) = ViewingSession::start(params, config, RqrrDetector);

    while let Some(event) = events.recv().await {
        match event {
            SessionEvent::PageAppended { page } => {
                if let Some(image) = handle.cache().page(page) {
                    println!("  page {}: {}x{}", page, image.width, image.height);
                }
            }
            SessionEvent::SecondaryUnavailable { sub_image, reason } => {
                println!("  sub-image {} unavailable: {}", sub_image, reason);
            }
            SessionEvent::Recognized(outcome) => println!("  {}", describe(&outcome)),
            SessionEvent::Failed(err) => return Err(CliError::Session(err.to_string())),
            SessionEvent::Completed => break,
        }
    }

    let mut pager = Pager::new(
        handle.cache().clone(),
        config.pre_render_window(),
        LogRenderer,
    );
    pager.show(1);
    let pages: Vec<String> = pager.materialized().map(|p| p.to_string()).collect();
    println!("  pre-rendered: [{}]", pages.join(", "));
    Ok(())
}

fn describe(outcome: &RecognitionOutcome) -> String {
    let code = outcome
        .code()
        .map(|code| format!(" ({:?}: {})", code.format, code.value))
        .unwrap_or_default();
    match outcome.verdict() {
        Verdict::Recyclable => format!("recyclable{code}"),
        Verdict::NotRecyclable => format!("not recyclable{code}"),
        Verdict::NoCode => "no code found".to_string(),
        Verdict::Unavailable => match outcome {
            RecognitionOutcome::Failed(err) => format!("recognition unavailable: {}", err),
            _ => "recognition unavailable".to_string(),
        },
    }
}

fn scan_file(path: &Path) -> Result<(), CliError> {
    let buffer = load_buffer(path)?;
    let ranges = scan(&buffer)?;

    println!("{}: {} bytes", path.display(), buffer.len());
    for (index, range) in ranges.iter().enumerate() {
        let bytes = buffer.slice(*range).unwrap_or_default();
        let size = match probe_dimensions(bytes) {
            Ok((w, h)) => format!("{}x{}", w, h),
            Err(e) => format!("undecodable: {}", e),
        };
        println!(
            "  #{} {}..{} ({} bytes) {}",
            index + 1,
            range.start,
            range.end,
            range.len(),
            size
        );
        if index == 0 {
            if let Some(orientation) = read_orientation(bytes) {
                println!("     EXIF orientation: {:?}", orientation);
            }
        }
    }

    let trailing = trailing_bytes(&buffer, &ranges);
    if trailing > 0 {
        println!("  {} trailing bytes after last marker", trailing);
    }
    Ok(())
}

/// Renderer for a terminal, which only logs what a widget would draw.
struct LogRenderer;

impl PageRenderer for LogRenderer {
    fn render(&mut self, page: usize, image: &DecodedImage) {
        log::info!("Render page {} ({}x{})", page, image.width, image.height);
    }

    fn release(&mut self, page: usize) {
        log::info!("Release page {}", page);
    }
}
