//! JSON scene configuration and report helpers for offline pose replay.

use crate::{
    CameraIntrinsics, MarkerPose, MarkerPoseError, MarkerPoseEstimator, MarkerPoseParams,
    PinholeCamera, PlanarScene, SceneSurface,
};
use log::warn;
use marker_pose_core::{FrameContext, Quadrilateral};
use nalgebra::Point3;
use serde::{Deserialize, Serialize};
use std::{
    fs,
    path::{Path, PathBuf},
};

#[derive(thiserror::Error, Debug)]
pub enum MarkerPoseIoError {
    #[error(transparent)]
    Io(#[from] std::io::Error),
    #[error(transparent)]
    Json(#[from] serde_json::Error),
}

/// Recorded frame: camera, reconstructed surfaces and marker observations.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct MarkerPoseConfig {
    pub frame: FrameContext,
    pub intrinsics: CameraIntrinsics,
    #[serde(default)]
    pub surfaces: Vec<SceneSurface>,
    /// Marker quadrilaterals in image pixels, as a detector would report.
    #[serde(default)]
    pub markers: Vec<Quadrilateral>,
    /// Marker corners in world coordinates (BL, BR, TR, TL), projected
    /// through the camera and appended to `markers`.
    #[serde(default)]
    pub world_markers: Vec<[Point3<f32>; 4]>,
    #[serde(default)]
    pub params: MarkerPoseParams,
    #[serde(default)]
    pub output_path: Option<String>,
}

impl MarkerPoseConfig {
    /// Load a JSON config from disk.
    pub fn load_json(path: impl AsRef<Path>) -> Result<Self, MarkerPoseIoError> {
        let raw = fs::read_to_string(path)?;
        Ok(serde_json::from_str(&raw)?)
    }

    /// Write this config to disk as pretty JSON.
    pub fn write_json(&self, path: impl AsRef<Path>) -> Result<(), MarkerPoseIoError> {
        let json = serde_json::to_string_pretty(self)?;
        fs::write(path, json)?;
        Ok(())
    }

    /// Resolve the output report path.
    pub fn output_path(&self) -> PathBuf {
        self.output_path
            .as_ref()
            .map(PathBuf::from)
            .unwrap_or_else(|| PathBuf::from("marker_pose_report.json"))
    }

    pub fn build_camera(&self) -> PinholeCamera {
        PinholeCamera::new(self.intrinsics, self.frame.image_size, self.frame.camera)
    }

    /// Scene answering ray casts in the space the estimator will query.
    pub fn build_scene(&self) -> PlanarScene {
        PlanarScene::new(
            self.build_camera(),
            self.frame.viewport,
            self.params.hit_test_space,
        )
        .with_surfaces(self.surfaces.iter().copied())
    }

    pub fn build_estimator(&self) -> MarkerPoseEstimator {
        MarkerPoseEstimator::new(self.params.clone())
    }

    /// Image quadrilaterals: explicit ones first, then projected world
    /// markers. World markers with a corner behind the camera are dropped.
    pub fn marker_quads(&self) -> Vec<Quadrilateral> {
        let camera = self.build_camera();
        let mut quads = self.markers.clone();
        for (idx, corners) in self.world_markers.iter().enumerate() {
            let [bl, br, tr, tl] = corners;
            match (
                camera.project(bl),
                camera.project(br),
                camera.project(tr),
                camera.project(tl),
            ) {
                (Some(bl), Some(br), Some(tr), Some(tl)) => {
                    quads.push(Quadrilateral::new(bl, br, tr, tl))
                }
                _ => warn!("world marker {idx} is not in front of the camera, skipped"),
            }
        }
        quads
    }

    /// Replay the recorded frame through the estimator.
    pub fn run(&self) -> Result<Vec<MarkerPose>, MarkerPoseError> {
        let scene = self.build_scene();
        let camera = self.build_camera();
        self.build_estimator()
            .estimate(&self.frame, &self.marker_quads(), &scene, &camera)
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct MarkerPoseReport {
    pub config_path: String,
    pub num_markers: usize,
    #[serde(default)]
    pub poses: Vec<MarkerPose>,
    #[serde(default)]
    pub error: Option<String>,
}

impl MarkerPoseReport {
    pub fn new(config_path: &Path, num_markers: usize) -> Self {
        Self {
            config_path: config_path.to_string_lossy().into_owned(),
            num_markers,
            poses: Vec::new(),
            error: None,
        }
    }

    pub fn set_poses(&mut self, poses: Vec<MarkerPose>) {
        self.poses = poses;
        self.error = None;
    }

    /// Record an estimation error.
    pub fn set_error(&mut self, err: MarkerPoseError) {
        self.error = Some(err.to_string());
    }

    /// Load a report from JSON on disk.
    pub fn load_json(path: impl AsRef<Path>) -> Result<Self, MarkerPoseIoError> {
        let raw = fs::read_to_string(path)?;
        Ok(serde_json::from_str(&raw)?)
    }

    /// Write this report to disk as pretty JSON.
    pub fn write_json(&self, path: impl AsRef<Path>) -> Result<(), MarkerPoseIoError> {
        let json = serde_json::to_string_pretty(self)?;
        fs::write(path, json)?;
        Ok(())
    }
}
