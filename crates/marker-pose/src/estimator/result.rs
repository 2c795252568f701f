use marker_pose_core::{PlaneEstimate, Quadrilateral};
use nalgebra::{Isometry3, Point3};
use serde::{Deserialize, Serialize};

use crate::depth::DepthSamples;
use crate::refine::RefinedPose;
use crate::size::MarkerSize;

/// How a pose was obtained, worst to best.
#[derive(Clone, Copy, Debug, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum AccuracyTier {
    /// No 3D data: assumed default distance along the camera axis.
    Guess,
    /// One ray-cast distance along the camera axis.
    DistanceApprox,
    /// Plane fitted, nothing refined by exact unprojection.
    PlaneApprox,
    /// Plane fitted, corners and center unprojected, size measured.
    TransformAndSizeApprox,
}

/// Pose estimate with exactly the data its tier supports.
#[derive(Clone, Copy, Debug, PartialEq, Serialize, Deserialize)]
#[serde(tag = "tier", rename_all = "snake_case")]
pub enum PoseEstimate {
    Guess {
        position: Point3<f32>,
    },
    DistanceApprox {
        position: Point3<f32>,
    },
    PlaneApprox {
        transform: Isometry3<f32>,
    },
    TransformAndSizeApprox {
        transform: Isometry3<f32>,
        size: MarkerSize,
    },
}

impl PoseEstimate {
    pub fn tier(&self) -> AccuracyTier {
        match self {
            PoseEstimate::Guess { .. } => AccuracyTier::Guess,
            PoseEstimate::DistanceApprox { .. } => AccuracyTier::DistanceApprox,
            PoseEstimate::PlaneApprox { .. } => AccuracyTier::PlaneApprox,
            PoseEstimate::TransformAndSizeApprox { .. } => AccuracyTier::TransformAndSizeApprox,
        }
    }

    /// Estimated marker center in world coordinates.
    pub fn position(&self) -> Point3<f32> {
        match self {
            PoseEstimate::Guess { position } | PoseEstimate::DistanceApprox { position } => {
                *position
            }
            PoseEstimate::PlaneApprox { transform }
            | PoseEstimate::TransformAndSizeApprox { transform, .. } => {
                Point3::from(transform.translation.vector)
            }
        }
    }

    /// Full transform, only for plane-based tiers.
    pub fn transform(&self) -> Option<Isometry3<f32>> {
        match self {
            PoseEstimate::PlaneApprox { transform }
            | PoseEstimate::TransformAndSizeApprox { transform, .. } => Some(*transform),
            _ => None,
        }
    }

    pub fn size(&self) -> Option<MarkerSize> {
        match self {
            PoseEstimate::TransformAndSizeApprox { size, .. } => Some(*size),
            _ => None,
        }
    }
}

/// Final per-marker output.
#[derive(Clone, Copy, Debug, PartialEq, Serialize, Deserialize)]
pub struct MarkerPose {
    /// Detector quadrilateral this pose was estimated from.
    pub quad: Quadrilateral,
    pub estimate: PoseEstimate,
}

impl MarkerPose {
    #[inline]
    pub fn tier(&self) -> AccuracyTier {
        self.estimate.tier()
    }

    #[inline]
    pub fn position(&self) -> Point3<f32> {
        self.estimate.position()
    }
}

/// Plane-path result with its intermediate stages kept for inspection.
#[derive(Clone, Copy, Debug, PartialEq, Serialize, Deserialize)]
pub struct PlanePoseDetails {
    pub depth: DepthSamples,
    pub plane: PlaneEstimate,
    pub refined: RefinedPose,
    pub estimate: PoseEstimate,
}

#[cfg(test)]
mod tests {
    use super::*;
    use nalgebra::{Translation3, UnitQuaternion};

    #[test]
    fn tiers_are_ordered_worst_to_best() {
        assert!(AccuracyTier::Guess < AccuracyTier::DistanceApprox);
        assert!(AccuracyTier::DistanceApprox < AccuracyTier::PlaneApprox);
        assert!(AccuracyTier::PlaneApprox < AccuracyTier::TransformAndSizeApprox);
    }

    #[test]
    fn point_tiers_carry_no_transform() {
        let guess = PoseEstimate::Guess {
            position: Point3::new(0.0, 0.0, -0.5),
        };
        assert_eq!(guess.tier(), AccuracyTier::Guess);
        assert!(guess.transform().is_none());
        assert!(guess.size().is_none());
    }

    #[test]
    fn plane_tiers_report_translation_as_position() {
        let t = Isometry3::from_parts(Translation3::new(1.0, 2.0, 3.0), UnitQuaternion::identity());
        let est = PoseEstimate::TransformAndSizeApprox {
            transform: t,
            size: MarkerSize::new(0.1, 0.1),
        };
        assert_eq!(est.position(), Point3::new(1.0, 2.0, 3.0));
        assert_eq!(est.transform(), Some(t));
        assert_eq!(est.size(), Some(MarkerSize::new(0.1, 0.1)));
    }

    #[test]
    fn estimate_serializes_with_tier_tag() {
        let est = PoseEstimate::DistanceApprox {
            position: Point3::new(0.0, 0.0, -1.0),
        };
        let json = serde_json::to_value(est).expect("serialize");
        assert_eq!(json["tier"], "distance_approx");
        let back: PoseEstimate = serde_json::from_value(json).expect("deserialize");
        assert_eq!(back, est);
    }
}
