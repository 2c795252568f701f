//! Marker pose estimation from sparse AR depth samples.
//!
//! Given a marker quadrilateral in image pixels, the estimator:
//! - ray casts nine sample points against the host's reconstructed scene,
//! - fits a plane through the hits,
//! - unprojects the corners and center onto that plane,
//! - reports transform, physical size and an [`AccuracyTier`].
//!
//! Markers without enough depth degrade to a single-ray distance estimate or
//! a fixed-distance guess. Host services are abstracted by the traits in
//! [`collaborators`]; [`PinholeCamera`] and [`PlanarScene`] implement them for
//! offline replay.
//!
//! Geometry primitives live in `marker-pose-core` and are re-exported here.

pub mod collaborators;
mod depth;
mod estimator;
mod io;
mod pinhole;
mod refine;
mod scene;
mod single_point;
mod size;

pub use collaborators::{MarkerDetector, PlaneUnprojector, RayCaster, RayHit, SurfaceKind};
pub use depth::{sample_depth, DepthSamples, HitTestSpace};
pub use estimator::{
    AccuracyTier, EstimationMode, MarkerPose, MarkerPoseError, MarkerPoseEstimator,
    MarkerPoseParams, PlanePoseDetails, PoseEstimate, DEFAULT_GUESS_DISTANCE,
    DEFAULT_MIN_PLANE_POINTS,
};
pub use io::{MarkerPoseConfig, MarkerPoseIoError, MarkerPoseReport};
pub use pinhole::{CameraIntrinsics, PinholeCamera};
pub use refine::{refine_pose, RefinedPose};
pub use scene::{PlanarScene, SceneSurface};
pub use single_point::estimate_single_point;
pub use size::{measure_size, MarkerSize};

pub use marker_pose_core::{
    CameraPose, FrameContext, FrameToViewMapper, ImageSize, InterfaceOrientation, PlaneEstimate,
    PlaneFitMethod, Quadrilateral, SamplePoints, SampleSite, ViewportSize,
};
