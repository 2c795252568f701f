//! Rigid-transform helpers shared by the plane fitter and the camera models.

use nalgebra::{Isometry3, Point3, Translation3, Unit, UnitQuaternion, Vector3};

const AXIS_EPS: f32 = 1e-6;

/// Shortest-arc rotation taking direction `from` onto direction `to`.
///
/// Opposite directions rotate by π about an axis orthogonal to `from`.
/// A zero-length input yields the identity.
pub fn rotation_between_axes(from: &Vector3<f32>, to: &Vector3<f32>) -> UnitQuaternion<f32> {
    let (Some(a), Some(b)) = (
        Unit::try_new(*from, AXIS_EPS),
        Unit::try_new(*to, AXIS_EPS),
    ) else {
        return UnitQuaternion::identity();
    };

    if let Some(q) = UnitQuaternion::rotation_between_axis(&a, &b) {
        return q;
    }

    let axis = orthogonal_axis(&a);
    UnitQuaternion::from_axis_angle(&axis, std::f32::consts::PI)
}

fn orthogonal_axis(v: &Unit<Vector3<f32>>) -> Unit<Vector3<f32>> {
    // Cross with the world axis least aligned with `v`.
    let helper = if v.x.abs() < 0.9 {
        Vector3::x()
    } else {
        Vector3::y()
    };
    Unit::new_normalize(v.cross(&helper))
}

/// Rigid transform with the given translation and a rotation that maps the
/// local `axis` onto `normal`.
pub fn frame_from_axis(
    origin: &Point3<f32>,
    axis: &Vector3<f32>,
    normal: &Vector3<f32>,
) -> Isometry3<f32> {
    Isometry3::from_parts(
        Translation3::from(origin.coords),
        rotation_between_axes(axis, normal),
    )
}

/// Same rotation, translation replaced by `position`.
pub fn with_translation(t: &Isometry3<f32>, position: &Point3<f32>) -> Isometry3<f32> {
    Isometry3::from_parts(Translation3::from(position.coords), t.rotation)
}

/// Half-line `origin + s * direction`, `s >= 0`.
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct Ray3 {
    pub origin: Point3<f32>,
    pub direction: Vector3<f32>,
}

impl Ray3 {
    pub fn new(origin: Point3<f32>, direction: Vector3<f32>) -> Self {
        Self { origin, direction }
    }

    #[inline]
    pub fn at(&self, s: f32) -> Point3<f32> {
        self.origin + self.direction * s
    }

    /// Ray parameter of the intersection with the plane through
    /// `plane_point` with normal `plane_normal`.
    ///
    /// `None` when the ray is parallel to the plane or the hit lies behind
    /// the origin.
    pub fn intersect_plane(
        &self,
        plane_point: &Point3<f32>,
        plane_normal: &Vector3<f32>,
    ) -> Option<f32> {
        let denom = plane_normal.dot(&self.direction);
        if denom.abs() < AXIS_EPS {
            return None;
        }
        let s = plane_normal.dot(&(plane_point - self.origin)) / denom;
        (s.is_finite() && s >= 0.0).then_some(s)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use approx::assert_relative_eq;

    #[test]
    fn rotation_maps_from_onto_to() {
        let cases = [
            (Vector3::y(), Vector3::z()),
            (Vector3::y(), Vector3::new(0.3, -0.2, 0.9)),
            (Vector3::z(), Vector3::new(-1.0, 1.0, 0.0)),
            (Vector3::y(), Vector3::y()),
        ];
        for (from, to) in cases {
            let q = rotation_between_axes(&from, &to);
            assert_relative_eq!(q * from.normalize(), to.normalize(), epsilon = 1e-5);
        }
    }

    #[test]
    fn opposite_axes_rotate_half_turn() {
        let q = rotation_between_axes(&Vector3::y(), &-Vector3::y());
        assert_relative_eq!(q * Vector3::y(), -Vector3::y(), epsilon = 1e-5);
        let q = rotation_between_axes(&Vector3::x(), &-Vector3::x());
        assert_relative_eq!(q * Vector3::x(), -Vector3::x(), epsilon = 1e-5);
    }

    #[test]
    fn zero_axis_is_identity() {
        let q = rotation_between_axes(&Vector3::y(), &Vector3::zeros());
        assert_eq!(q, UnitQuaternion::identity());
    }

    #[test]
    fn ray_hits_plane_in_front() {
        let ray = Ray3::new(Point3::new(0.5, 0.5, 2.0), -Vector3::z());
        let s = ray
            .intersect_plane(&Point3::origin(), &Vector3::z())
            .expect("hit");
        assert_relative_eq!(s, 2.0);
        assert_relative_eq!(ray.at(s), Point3::new(0.5, 0.5, 0.0));
    }

    #[test]
    fn ray_misses_parallel_or_behind() {
        let ray = Ray3::new(Point3::new(0.0, 0.0, 1.0), Vector3::x());
        assert!(ray.intersect_plane(&Point3::origin(), &Vector3::z()).is_none());

        let ray = Ray3::new(Point3::new(0.0, 0.0, 1.0), Vector3::z());
        assert!(ray.intersect_plane(&Point3::origin(), &Vector3::z()).is_none());
    }

    #[test]
    fn with_translation_keeps_rotation() {
        let t = frame_from_axis(&Point3::new(1.0, 2.0, 3.0), &Vector3::y(), &Vector3::z());
        let moved = with_translation(&t, &Point3::new(-1.0, 0.0, 0.5));
        assert_eq!(moved.rotation, t.rotation);
        assert_relative_eq!(moved.translation.vector, Vector3::new(-1.0, 0.0, 0.5));
    }
}
