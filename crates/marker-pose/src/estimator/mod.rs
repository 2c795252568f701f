//! Marker pose estimation pipeline.
//!
//! This module wires together depth sampling, plane fitting, exact
//! unprojection and size measurement, with a single-ray fallback for
//! markers that lack depth.

mod error;
mod params;
mod pipeline;
mod result;

pub use error::MarkerPoseError;
pub use params::{
    EstimationMode, MarkerPoseParams, DEFAULT_GUESS_DISTANCE, DEFAULT_MIN_PLANE_POINTS,
};
pub use pipeline::MarkerPoseEstimator;
pub use result::{AccuracyTier, MarkerPose, PlanePoseDetails, PoseEstimate};
