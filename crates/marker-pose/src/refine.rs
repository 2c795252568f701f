//! Snap corners and center onto the fitted plane with exact unprojection.

use log::trace;
use marker_pose_core::{with_translation, InterfaceOrientation, SamplePoints, SampleSite, ViewportSize};
use nalgebra::{Isometry3, Point3};
use serde::{Deserialize, Serialize};

use crate::collaborators::PlaneUnprojector;

#[cfg(feature = "tracing")]
use tracing::instrument;

/// Plane frame re-centred on the marker, plus the marker corners in 3D.
#[derive(Clone, Copy, Debug, PartialEq, Serialize, Deserialize)]
pub struct RefinedPose {
    /// Plane rotation; translation is the refined center, or the cloud
    /// centroid when the center could not be unprojected.
    pub transform: Isometry3<f32>,
    /// Corners BL, BR, TR, TL: exact when unprojected, else the rough
    /// ray-cast estimate, else `None`.
    pub corners: [Option<Point3<f32>>; 4],
    /// Which corners came from exact unprojection.
    pub exact_corners: [bool; 4],
    pub center_refined: bool,
}

impl RefinedPose {
    /// Corner positions when all four are known.
    pub fn resolved_corners(&self) -> Option<[Point3<f32>; 4]> {
        let [a, b, c, d] = self.corners;
        Some([a?, b?, c?, d?])
    }

    /// Number of points (corners and center) placed by exact unprojection.
    pub fn exact_count(&self) -> usize {
        self.exact_corners.iter().filter(|&&e| e).count() + usize::from(self.center_refined)
    }

    pub fn position(&self) -> Point3<f32> {
        Point3::from(self.transform.translation.vector)
    }
}

/// Unproject the corner and center view points onto `plane`.
///
/// A failed unprojection keeps the matching entry of `rough_corners`; the
/// returned translation falls back to the plane origin.
#[cfg_attr(
    feature = "tracing",
    instrument(level = "debug", skip(unprojector, view_points, rough_corners))
)]
pub fn refine_pose<U: PlaneUnprojector + ?Sized>(
    unprojector: &U,
    plane: &Isometry3<f32>,
    view_points: &SamplePoints,
    rough_corners: [Option<Point3<f32>>; 4],
    orientation: InterfaceOrientation,
    viewport: ViewportSize,
) -> RefinedPose {
    let unproject = |site: SampleSite| {
        let hit = unprojector.unproject(view_points.get(site), plane, orientation, viewport);
        if hit.is_none() {
            trace!("unprojection of {site:?} missed the plane");
        }
        hit
    };

    let mut corners = rough_corners;
    let mut exact_corners = [false; 4];
    for (slot, site) in SampleSite::CORNERS.into_iter().enumerate() {
        if let Some(p) = unproject(site) {
            corners[slot] = Some(p);
            exact_corners[slot] = true;
        }
    }

    let center = unproject(SampleSite::Center);
    let transform = match center {
        Some(c) => with_translation(plane, &c),
        None => *plane,
    };

    RefinedPose {
        transform,
        corners,
        exact_corners,
        center_refined: center.is_some(),
    }
}
