//! Per-frame context: captured image size, viewport, device orientation and
//! the camera pose in world coordinates.

use nalgebra::{Isometry3, Point3, Vector3};
use serde::{Deserialize, Serialize};

/// Captured image dimensions in pixels.
#[derive(Clone, Copy, Debug, PartialEq, Serialize, Deserialize)]
pub struct ImageSize {
    pub width: f32,
    pub height: f32,
}

impl ImageSize {
    pub fn new(width: f32, height: f32) -> Self {
        Self { width, height }
    }

    /// Returns `true` when both dimensions are finite and strictly positive.
    pub fn is_valid(self) -> bool {
        dims_valid(self.width, self.height)
    }
}

/// On-screen viewport dimensions in view points.
#[derive(Clone, Copy, Debug, PartialEq, Serialize, Deserialize)]
pub struct ViewportSize {
    pub width: f32,
    pub height: f32,
}

impl ViewportSize {
    pub fn new(width: f32, height: f32) -> Self {
        Self { width, height }
    }

    pub fn is_valid(self) -> bool {
        dims_valid(self.width, self.height)
    }
}

fn dims_valid(w: f32, h: f32) -> bool {
    w.is_finite() && h.is_finite() && w > 0.0 && h > 0.0
}

/// Orientation of the interface hosting the viewport.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum InterfaceOrientation {
    #[default]
    Portrait,
    PortraitUpsideDown,
    LandscapeLeft,
    LandscapeRight,
}

/// Camera placement in the world (tracking) frame.
///
/// The camera looks along its local `-Z` axis, `+Y` is up and `+X` is right.
#[derive(Clone, Copy, Debug, PartialEq, Serialize, Deserialize)]
pub struct CameraPose {
    pub world_from_camera: Isometry3<f32>,
}

impl CameraPose {
    pub fn new(world_from_camera: Isometry3<f32>) -> Self {
        Self { world_from_camera }
    }

    /// Camera center in world coordinates.
    pub fn position(&self) -> Point3<f32> {
        Point3::from(self.world_from_camera.translation.vector)
    }

    /// Camera `+Z` axis in world coordinates (third column of the rotation).
    ///
    /// Points *behind* the camera: a point `d` in front of the camera is at
    /// `position() + forward() * -d`.
    pub fn forward(&self) -> Vector3<f32> {
        self.world_from_camera.rotation * Vector3::z()
    }

    pub fn right(&self) -> Vector3<f32> {
        self.world_from_camera.rotation * Vector3::x()
    }

    pub fn up(&self) -> Vector3<f32> {
        self.world_from_camera.rotation * Vector3::y()
    }

    /// Point `distance` units in front of the camera along its viewing axis.
    pub fn point_in_front(&self, distance: f32) -> Point3<f32> {
        self.position() + self.forward().normalize() * -distance
    }
}

impl Default for CameraPose {
    fn default() -> Self {
        Self::new(Isometry3::identity())
    }
}

/// Everything the estimator needs to know about the current frame.
///
/// Viewport size and orientation are usually owned by a UI thread; callers
/// read them there and pass the values in.
#[derive(Clone, Copy, Debug, PartialEq, Serialize, Deserialize)]
pub struct FrameContext {
    pub image_size: ImageSize,
    pub viewport: ViewportSize,
    #[serde(default)]
    pub orientation: InterfaceOrientation,
    #[serde(default)]
    pub camera: CameraPose,
}

impl FrameContext {
    pub fn new(image_size: ImageSize, viewport: ViewportSize, camera: CameraPose) -> Self {
        Self {
            image_size,
            viewport,
            orientation: InterfaceOrientation::Portrait,
            camera,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use approx::assert_relative_eq;
    use nalgebra::{Translation3, UnitQuaternion};

    #[test]
    fn size_validity() {
        assert!(ImageSize::new(1920.0, 1440.0).is_valid());
        assert!(!ImageSize::new(0.0, 1440.0).is_valid());
        assert!(!ViewportSize::new(390.0, f32::NAN).is_valid());
        assert!(!ViewportSize::new(-1.0, 844.0).is_valid());
    }

    #[test]
    fn identity_camera_looks_down_negative_z() {
        let cam = CameraPose::default();
        assert_relative_eq!(cam.forward(), Vector3::z());
        assert_relative_eq!(cam.point_in_front(0.5), Point3::new(0.0, 0.0, -0.5));
    }

    #[test]
    fn rotated_camera_axes_follow_rotation() {
        let rot = UnitQuaternion::from_axis_angle(&Vector3::y_axis(), std::f32::consts::FRAC_PI_2);
        let cam = CameraPose::new(Isometry3::from_parts(
            Translation3::new(1.0, 2.0, 3.0),
            rot,
        ));
        assert_relative_eq!(cam.position(), Point3::new(1.0, 2.0, 3.0));
        assert_relative_eq!(cam.forward(), Vector3::x(), epsilon = 1e-6);
        assert_relative_eq!(cam.right(), -Vector3::z(), epsilon = 1e-6);
        assert_relative_eq!(cam.up(), Vector3::y(), epsilon = 1e-6);
        assert_relative_eq!(
            cam.point_in_front(2.0),
            Point3::new(-1.0, 2.0, 3.0),
            epsilon = 1e-6
        );
    }

    #[test]
    fn frame_context_orientation_defaults_when_missing() {
        let json = r#"{
            "image_size": {"width": 1920.0, "height": 1440.0},
            "viewport": {"width": 390.0, "height": 844.0}
        }"#;
        let frame: FrameContext = serde_json::from_str(json).expect("parse");
        assert_eq!(frame.orientation, InterfaceOrientation::Portrait);
        assert_eq!(frame.camera, CameraPose::default());
    }
}
