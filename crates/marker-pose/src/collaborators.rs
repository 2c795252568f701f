//! Services the estimator consumes but does not implement.
//!
//! A host AR session provides marker detection, scene ray casting and
//! camera unprojection. Each is a synchronous call with an optional result:
//! a miss is `None`, never an error.

use marker_pose_core::{InterfaceOrientation, Quadrilateral, ViewportSize};
use nalgebra::{Isometry3, Point2, Point3};
use serde::{Deserialize, Serialize};

/// Kind of reconstructed surface a ray cast may hit.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum SurfaceKind {
    EstimatedHorizontalPlane,
    EstimatedVerticalPlane,
    ExistingPlane,
    ExistingPlaneUsingExtent,
    ExistingPlaneUsingGeometry,
    FeaturePoint,
}

impl SurfaceKind {
    /// Every kind; used when sampling the marker for a plane fit.
    pub const ALL: [SurfaceKind; 6] = [
        SurfaceKind::EstimatedVerticalPlane,
        SurfaceKind::EstimatedHorizontalPlane,
        SurfaceKind::ExistingPlane,
        SurfaceKind::FeaturePoint,
        SurfaceKind::ExistingPlaneUsingExtent,
        SurfaceKind::ExistingPlaneUsingGeometry,
    ];

    /// Kinds used by the single-ray distance estimate.
    pub const SINGLE_RAY: [SurfaceKind; 4] = [
        SurfaceKind::EstimatedVerticalPlane,
        SurfaceKind::EstimatedHorizontalPlane,
        SurfaceKind::ExistingPlane,
        SurfaceKind::FeaturePoint,
    ];
}

/// First surface intersected by a ray cast.
#[derive(Clone, Copy, Debug, PartialEq, Serialize, Deserialize)]
pub struct RayHit {
    /// Hit position in world coordinates.
    pub position: Point3<f32>,
    /// Distance from the camera to the hit.
    pub distance: f32,
}

/// Scene ray casting.
pub trait RayCaster {
    /// Cast a ray through `point` and return the nearest hit on a surface of
    /// one of the requested `kinds`.
    ///
    /// The coordinate space of `point` is chosen by the caller's
    /// [`HitTestSpace`](crate::HitTestSpace).
    fn hit_test(&self, point: Point2<f32>, kinds: &[SurfaceKind]) -> Option<RayHit>;
}

/// Exact intersection of a view ray with a plane under the host camera model.
pub trait PlaneUnprojector {
    /// Intersect the ray through `view_point` with the local XZ plane of
    /// `plane` (world-from-plane transform).
    fn unproject(
        &self,
        view_point: Point2<f32>,
        plane: &Isometry3<f32>,
        orientation: InterfaceOrientation,
        viewport: ViewportSize,
    ) -> Option<Point3<f32>>;
}

/// 2D marker detection on a captured image.
pub trait MarkerDetector {
    type Image: ?Sized;

    /// Zero or more marker quadrilaterals in image pixel coordinates.
    fn detect(&self, image: &Self::Image) -> Vec<Quadrilateral>;
}

impl<T: RayCaster + ?Sized> RayCaster for &T {
    fn hit_test(&self, point: Point2<f32>, kinds: &[SurfaceKind]) -> Option<RayHit> {
        (**self).hit_test(point, kinds)
    }
}

impl<T: PlaneUnprojector + ?Sized> PlaneUnprojector for &T {
    fn unproject(
        &self,
        view_point: Point2<f32>,
        plane: &Isometry3<f32>,
        orientation: InterfaceOrientation,
        viewport: ViewportSize,
    ) -> Option<Point3<f32>> {
        (**self).unproject(view_point, plane, orientation, viewport)
    }
}

impl<T: MarkerDetector + ?Sized> MarkerDetector for &T {
    type Image = T::Image;

    fn detect(&self, image: &Self::Image) -> Vec<Quadrilateral> {
        (**self).detect(image)
    }
}
