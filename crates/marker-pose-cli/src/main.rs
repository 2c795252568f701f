use std::path::{Path, PathBuf};

use clap::{Parser, Subcommand};
use log::{info, LevelFilter};
use marker_pose::{
    CameraIntrinsics, CameraPose, FrameContext, ImageSize, MarkerPoseConfig, MarkerPoseError,
    MarkerPoseIoError, MarkerPoseParams, MarkerPoseReport, SceneSurface, SurfaceKind,
    ViewportSize,
};
use nalgebra::{Isometry3, Point3, Translation3, UnitQuaternion, Vector3};

#[derive(thiserror::Error, Debug)]
enum CliError {
    #[error(transparent)]
    Io(#[from] MarkerPoseIoError),
    #[error(transparent)]
    Json(#[from] serde_json::Error),
    #[error("estimation failed: {0}")]
    Estimate(#[from] MarkerPoseError),
    #[error("failed to install logger: {0}")]
    Logger(#[from] log::SetLoggerError),
}

/// Replay recorded AR frames through the marker pose estimator.
#[derive(Debug, Parser)]
#[command(name = "marker-pose", author, version, about)]
struct Cli {
    /// Log level: off, error, warn, info, debug, trace.
    #[arg(long, global = true, default_value = "warn")]
    log_level: LevelFilter,

    /// Emit tracing spans as JSON instead of plain log lines.
    #[cfg(feature = "tracing")]
    #[arg(long, global = true)]
    json_logs: bool,

    #[command(subcommand)]
    command: Command,
}

#[derive(Debug, Subcommand)]
enum Command {
    /// Estimate marker poses for a recorded scene and write a JSON report.
    Estimate {
        /// Scene configuration (JSON).
        config: PathBuf,
        /// Report path; overrides `output_path` from the config.
        #[arg(long, short)]
        output: Option<PathBuf>,
        /// Also print the report to stdout.
        #[arg(long)]
        stdout: bool,
    },
    /// Write an example scene configuration.
    InitConfig {
        /// Destination path.
        output: PathBuf,
    },
}

fn main() {
    if let Err(err) = try_main() {
        eprintln!("error: {err}");
        std::process::exit(1);
    }
}

fn try_main() -> Result<(), CliError> {
    let cli = Cli::parse();
    init_logging(&cli)?;

    match cli.command {
        Command::Estimate {
            config,
            output,
            stdout,
        } => run_estimate(&config, output, stdout),
        Command::InitConfig { output } => {
            example_config().write_json(&output)?;
            info!("wrote example config to {}", output.display());
            Ok(())
        }
    }
}

#[cfg(feature = "tracing")]
fn init_logging(cli: &Cli) -> Result<(), CliError> {
    if cli.json_logs {
        marker_pose_core::init_tracing(true);
        return Ok(());
    }
    Ok(marker_pose_core::init_with_level(cli.log_level)?)
}

#[cfg(not(feature = "tracing"))]
fn init_logging(cli: &Cli) -> Result<(), CliError> {
    Ok(marker_pose_core::init_with_level(cli.log_level)?)
}

fn run_estimate(config_path: &Path, output: Option<PathBuf>, stdout: bool) -> Result<(), CliError> {
    let cfg = MarkerPoseConfig::load_json(config_path)?;
    let report_path = output.unwrap_or_else(|| cfg.output_path());
    let quads = cfg.marker_quads();
    info!("{}: {} markers", config_path.display(), quads.len());

    let mut report = MarkerPoseReport::new(config_path, quads.len());
    let result = cfg.run();
    match &result {
        Ok(poses) => {
            for (idx, pose) in poses.iter().enumerate() {
                info!("marker {idx}: {:?} at {}", pose.tier(), pose.position());
            }
            report.set_poses(poses.clone());
        }
        Err(err) => report.set_error(err.clone()),
    }

    report.write_json(&report_path)?;
    info!("wrote report to {}", report_path.display());
    if stdout {
        println!("{}", serde_json::to_string_pretty(&report)?);
    }

    result.map(|_| ()).map_err(CliError::from)
}

/// Camera one meter above a table, looking straight down at a 15 cm marker.
fn example_config() -> MarkerPoseConfig {
    let image = ImageSize::new(1920.0, 1440.0);
    let camera = CameraPose::new(Isometry3::from_parts(
        Translation3::new(0.0, 1.0, 0.0),
        UnitQuaternion::from_axis_angle(&Vector3::x_axis(), -std::f32::consts::FRAC_PI_2),
    ));
    let half = 0.075;
    MarkerPoseConfig {
        frame: FrameContext::new(image, ViewportSize::new(390.0, 844.0), camera),
        intrinsics: CameraIntrinsics::from_horizontal_fov(image, 65f32.to_radians()),
        surfaces: vec![SceneSurface::new(
            SurfaceKind::EstimatedHorizontalPlane,
            Point3::origin(),
            Vector3::y(),
        )],
        markers: Vec::new(),
        world_markers: vec![[
            Point3::new(-half, 0.0, half),
            Point3::new(half, 0.0, half),
            Point3::new(half, 0.0, -half),
            Point3::new(-half, 0.0, -half),
        ]],
        params: MarkerPoseParams::default(),
        output_path: Some("marker_pose_report.json".to_string()),
    }
}
