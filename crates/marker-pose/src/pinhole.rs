//! Pinhole camera model usable as a [`PlaneUnprojector`].
//!
//! Image pixels have `+x` right and `+y` down; the camera looks along its
//! local `-Z` axis with `+Y` up, matching [`CameraPose`].

use marker_pose_core::{
    reference_axis, CameraPose, FrameToViewMapper, ImageSize, InterfaceOrientation, Ray3,
    ViewportSize,
};
use nalgebra::{Isometry3, Point2, Point3, Vector3};
use serde::{Deserialize, Serialize};

use crate::collaborators::PlaneUnprojector;

/// Pinhole camera intrinsics in pixels.
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq)]
pub struct CameraIntrinsics {
    pub fx: f32,
    pub fy: f32,
    pub cx: f32,
    pub cy: f32,
}

impl CameraIntrinsics {
    /// Square pixels, principal point at the image center.
    pub fn from_horizontal_fov(image: ImageSize, hfov_rad: f32) -> Self {
        let f = 0.5 * image.width / (0.5 * hfov_rad).tan();
        Self {
            fx: f,
            fy: f,
            cx: 0.5 * image.width,
            cy: 0.5 * image.height,
        }
    }

    /// Returns `true` when focal lengths are finite and non-zero.
    pub fn is_valid(self) -> bool {
        self.fx.is_finite()
            && self.fy.is_finite()
            && self.cx.is_finite()
            && self.cy.is_finite()
            && self.fx.abs() > 1e-6
            && self.fy.abs() > 1e-6
    }

    pub fn pixel_to_normalized(self, pixel: Point2<f32>) -> Option<Point2<f32>> {
        if !self.is_valid() {
            return None;
        }
        let n = Point2::new((pixel.x - self.cx) / self.fx, (pixel.y - self.cy) / self.fy);
        (n.x.is_finite() && n.y.is_finite()).then_some(n)
    }

    pub fn normalized_to_pixel(self, n: Point2<f32>) -> Point2<f32> {
        Point2::new(self.fx * n.x + self.cx, self.fy * n.y + self.cy)
    }
}

/// Posed pinhole camera.
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq)]
pub struct PinholeCamera {
    pub intrinsics: CameraIntrinsics,
    pub image_size: ImageSize,
    pub pose: CameraPose,
}

impl PinholeCamera {
    pub fn new(intrinsics: CameraIntrinsics, image_size: ImageSize, pose: CameraPose) -> Self {
        Self {
            intrinsics,
            image_size,
            pose,
        }
    }

    /// World ray through an image pixel, with a unit direction.
    pub fn pixel_ray(&self, pixel: Point2<f32>) -> Option<Ray3> {
        let n = self.intrinsics.pixel_to_normalized(pixel)?;
        let dir_cam = Vector3::new(n.x, -n.y, -1.0);
        let dir = (self.pose.world_from_camera.rotation * dir_cam).try_normalize(1e-12)?;
        Some(Ray3::new(self.pose.position(), dir))
    }

    /// World ray through a view point under the aspect-fill mapping.
    pub fn view_ray(&self, view_point: Point2<f32>, viewport: ViewportSize) -> Option<Ray3> {
        if !self.image_size.is_valid() || !viewport.is_valid() {
            return None;
        }
        let mapper = FrameToViewMapper::new(self.image_size, viewport);
        self.pixel_ray(mapper.view_to_image(view_point))
    }

    /// Image pixel of a world point; `None` when it is not in front of the
    /// camera.
    pub fn project(&self, world: &Point3<f32>) -> Option<Point2<f32>> {
        let pc = self.pose.world_from_camera.inverse_transform_point(world);
        if pc.z > -1e-6 {
            return None;
        }
        let depth = -pc.z;
        let n = Point2::new(pc.x / depth, -pc.y / depth);
        Some(self.intrinsics.normalized_to_pixel(n))
    }
}

impl PlaneUnprojector for PinholeCamera {
    /// Interface orientation is ignored: the view mapping already encodes the
    /// sensor-to-display rotation.
    fn unproject(
        &self,
        view_point: Point2<f32>,
        plane: &Isometry3<f32>,
        _orientation: InterfaceOrientation,
        viewport: ViewportSize,
    ) -> Option<Point3<f32>> {
        let ray = self.view_ray(view_point, viewport)?;
        let origin = Point3::from(plane.translation.vector);
        let normal = plane.rotation * reference_axis();
        ray.intersect_plane(&origin, &normal).map(|s| ray.at(s))
    }
}
