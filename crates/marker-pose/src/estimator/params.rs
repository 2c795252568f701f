use marker_pose_core::PlaneFitMethod;
use serde::{Deserialize, Serialize};

use crate::collaborators::SurfaceKind;
use crate::depth::HitTestSpace;

/// Default distance in front of the camera when no ray cast hits anything.
pub const DEFAULT_GUESS_DISTANCE: f32 = 0.5;

/// Minimum number of depth hits needed to fit a plane.
pub const DEFAULT_MIN_PLANE_POINTS: usize = 4;

/// Estimation path run for every marker.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum EstimationMode {
    /// Nine-point depth sampling, plane fit and exact refinement.
    #[default]
    Plane,
    /// One ray cast; position only. Cheapest.
    SinglePoint,
}

/// Configuration for [`MarkerPoseEstimator`](super::MarkerPoseEstimator).
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct MarkerPoseParams {
    pub mode: EstimationMode,
    /// Minimal number of depth hits to attempt a plane fit.
    ///
    /// Values below 3 are raised to 3 by the estimator.
    pub min_plane_points: usize,
    pub plane_fit: PlaneFitMethod,
    /// Coordinates handed to the ray caster.
    pub hit_test_space: HitTestSpace,
    /// Surfaces queried for the nine depth samples.
    pub surface_kinds: Vec<SurfaceKind>,
    /// Surfaces queried by the single-ray estimate.
    pub single_ray_surface_kinds: Vec<SurfaceKind>,
    /// Distance assumed when the single ray misses.
    pub default_distance: f32,
    /// Run the single-ray estimate when a plane cannot be fitted; when
    /// `false` such markers are dropped from the output.
    pub fallback_to_single_point: bool,
}

impl Default for MarkerPoseParams {
    fn default() -> Self {
        Self {
            mode: EstimationMode::Plane,
            min_plane_points: DEFAULT_MIN_PLANE_POINTS,
            plane_fit: PlaneFitMethod::Newell,
            hit_test_space: HitTestSpace::NormalizedImage,
            surface_kinds: SurfaceKind::ALL.to_vec(),
            single_ray_surface_kinds: SurfaceKind::SINGLE_RAY.to_vec(),
            default_distance: DEFAULT_GUESS_DISTANCE,
            fallback_to_single_point: true,
        }
    }
}

impl MarkerPoseParams {
    /// Parameters for the single-ray mode only.
    pub fn single_point() -> Self {
        Self {
            mode: EstimationMode::SinglePoint,
            ..Self::default()
        }
    }
}
