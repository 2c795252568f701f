//! Single-ray position estimate.
//!
//! One ray is cast through the midpoint of the bottom-left / top-right
//! diagonal. Only the hit *distance* is used: the marker is placed that far
//! along the camera's viewing axis. No orientation or size is produced.

use log::trace;
use marker_pose_core::{CameraPose, FrameToViewMapper, Quadrilateral};

use crate::collaborators::{RayCaster, SurfaceKind};
use crate::depth::HitTestSpace;
use crate::estimator::PoseEstimate;

#[cfg(feature = "tracing")]
use tracing::instrument;

/// `DistanceApprox` on a hit, `Guess` at `default_distance` on a miss.
#[cfg_attr(
    feature = "tracing",
    instrument(level = "debug", skip(caster, quad, mapper, camera, kinds))
)]
pub fn estimate_single_point<R: RayCaster + ?Sized>(
    caster: &R,
    quad: &Quadrilateral,
    mapper: &FrameToViewMapper,
    camera: &CameraPose,
    space: HitTestSpace,
    kinds: &[SurfaceKind],
    default_distance: f32,
) -> PoseEstimate {
    let query = space.query_point(mapper, quad.diagonal_midpoint());
    match caster.hit_test(query, kinds) {
        Some(hit) => {
            trace!("single ray hit at distance {:.3}", hit.distance);
            PoseEstimate::DistanceApprox {
                position: camera.point_in_front(hit.distance),
            }
        }
        None => PoseEstimate::Guess {
            position: camera.point_in_front(default_distance),
        },
    }
}
