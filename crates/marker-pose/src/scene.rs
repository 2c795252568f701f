//! Planar scene that answers ray casts, for offline replay and tests.

use marker_pose_core::{denormalize_image_point, Ray3, ViewportSize};
use nalgebra::{Point2, Point3, Vector3};
use serde::{Deserialize, Serialize};

use crate::collaborators::{RayCaster, RayHit, SurfaceKind};
use crate::depth::HitTestSpace;
use crate::pinhole::PinholeCamera;

/// One reconstructed planar surface.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct SceneSurface {
    pub kind: SurfaceKind,
    /// Any point on the plane.
    pub point: Point3<f32>,
    pub normal: Vector3<f32>,
    /// Bounded disc around `point`; unbounded when absent.
    #[serde(default)]
    pub radius: Option<f32>,
}

impl SceneSurface {
    pub fn new(kind: SurfaceKind, point: Point3<f32>, normal: Vector3<f32>) -> Self {
        Self {
            kind,
            point,
            normal,
            radius: None,
        }
    }

    pub fn with_radius(mut self, radius: f32) -> Self {
        self.radius = Some(radius);
        self
    }

    /// Ray parameter of the hit, honoring the radius.
    pub fn intersect(&self, ray: &Ray3) -> Option<f32> {
        let s = ray.intersect_plane(&self.point, &self.normal)?;
        match self.radius {
            Some(r) if (ray.at(s) - self.point).norm() > r => None,
            _ => Some(s),
        }
    }
}

/// A camera looking at a set of typed planes.
///
/// Queries are interpreted in `query_space`, which must match the
/// estimator's [`HitTestSpace`].
#[derive(Debug, Clone, PartialEq)]
pub struct PlanarScene {
    camera: PinholeCamera,
    viewport: ViewportSize,
    query_space: HitTestSpace,
    surfaces: Vec<SceneSurface>,
}

impl PlanarScene {
    pub fn new(camera: PinholeCamera, viewport: ViewportSize, query_space: HitTestSpace) -> Self {
        Self {
            camera,
            viewport,
            query_space,
            surfaces: Vec::new(),
        }
    }

    pub fn with_surface(mut self, surface: SceneSurface) -> Self {
        self.surfaces.push(surface);
        self
    }

    pub fn with_surfaces(mut self, surfaces: impl IntoIterator<Item = SceneSurface>) -> Self {
        self.surfaces.extend(surfaces);
        self
    }

    #[inline]
    pub fn camera(&self) -> &PinholeCamera {
        &self.camera
    }

    #[inline]
    pub fn surfaces(&self) -> &[SceneSurface] {
        &self.surfaces
    }

    fn query_ray(&self, query: Point2<f32>) -> Option<Ray3> {
        match self.query_space {
            HitTestSpace::NormalizedImage => self
                .camera
                .pixel_ray(denormalize_image_point(self.camera.image_size, query)),
            HitTestSpace::View => self.camera.view_ray(query, self.viewport),
        }
    }
}

impl RayCaster for PlanarScene {
    fn hit_test(&self, point: Point2<f32>, kinds: &[SurfaceKind]) -> Option<RayHit> {
        let ray = self.query_ray(point)?;
        self.surfaces
            .iter()
            .filter(|s| kinds.contains(&s.kind))
            .filter_map(|s| s.intersect(&ray))
            .min_by(|a, b| a.total_cmp(b))
            .map(|s| RayHit {
                position: ray.at(s),
                distance: s,
            })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::pinhole::CameraIntrinsics;
    use approx::assert_relative_eq;
    use marker_pose_core::{normalize_image_point, CameraPose, ImageSize};
    use nalgebra::Isometry3;

    fn scene(space: HitTestSpace) -> PlanarScene {
        let image = ImageSize::new(200.0, 200.0);
        let camera = PinholeCamera::new(
            CameraIntrinsics::from_horizontal_fov(image, 1.2),
            image,
            CameraPose::new(Isometry3::translation(0.0, 0.0, 2.0)),
        );
        PlanarScene::new(camera, ViewportSize::new(400.0, 400.0), space)
            .with_surface(SceneSurface::new(
                SurfaceKind::ExistingPlane,
                Point3::origin(),
                Vector3::z(),
            ))
            .with_surface(
                SceneSurface::new(
                    SurfaceKind::FeaturePoint,
                    Point3::new(0.0, 0.0, 1.0),
                    Vector3::z(),
                )
                .with_radius(0.05),
            )
    }

    #[test]
    fn nearest_surface_wins() {
        let scene = scene(HitTestSpace::NormalizedImage);
        let center = normalize_image_point(scene.camera().image_size, Point2::new(100.0, 100.0));
        let hit = scene.hit_test(center, &SurfaceKind::ALL).expect("hit");
        assert_relative_eq!(hit.distance, 1.0, epsilon = 1e-5);
        assert_relative_eq!(hit.position, Point3::new(0.0, 0.0, 1.0), epsilon = 1e-5);
    }

    #[test]
    fn kind_filter_and_radius_apply() {
        let scene = scene(HitTestSpace::NormalizedImage);
        let image = scene.camera().image_size;
        let center = normalize_image_point(image, Point2::new(100.0, 100.0));
        let hit = scene
            .hit_test(center, &[SurfaceKind::ExistingPlane])
            .expect("hit");
        assert_relative_eq!(hit.distance, 2.0, epsilon = 1e-5);

        // Off-center ray misses the small disc and lands on the floor.
        let off = normalize_image_point(image, Point2::new(10.0, 10.0));
        let hit = scene.hit_test(off, &SurfaceKind::ALL).expect("hit");
        assert_relative_eq!(hit.position.z, 0.0, epsilon = 1e-5);
    }

    #[test]
    fn view_queries_use_inverse_mapping() {
        let scene = scene(HitTestSpace::View);
        let hit = scene
            .hit_test(Point2::new(200.0, 200.0), &[SurfaceKind::ExistingPlane])
            .expect("hit");
        assert_relative_eq!(hit.position, Point3::origin(), epsilon = 1e-5);
    }

    #[test]
    fn nothing_requested_nothing_hit() {
        let scene = scene(HitTestSpace::NormalizedImage);
        assert!(scene.hit_test(Point2::new(0.5, 0.5), &[]).is_none());
    }
}
