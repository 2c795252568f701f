//! Plane fitting for sparse 3D point clouds.
//!
//! The default fitter is Newell's polygon-normal method: the cloud is walked
//! as a closed polygon in input order and the signed projected areas are
//! accumulated into a normal. It is cheap and closed-form but it is an
//! approximation, not a least-squares fit: it depends on point ordering and
//! reacts to outliers. [`PlaneFitMethod::LeastSquares`] uses the smallest
//! eigenvector of the centred covariance instead.
//!
//! Both fitters share one contract: the normal is unit length (or exactly
//! zero when the input does not define a direction), the centroid is the mean
//! of the input, and an empty input yields the identity frame.

use log::debug;
use nalgebra::{Isometry3, Matrix3, Point3, Vector3};
use serde::{Deserialize, Serialize};

use crate::transform::frame_from_axis;

#[cfg(feature = "tracing")]
use tracing::instrument;

const NORMAL_EPS: f32 = 1e-12;
const RANK_EPS: f32 = 1e-6;

/// Local axis that the plane frame aligns with the plane normal.
///
/// The fitted plane is the local XZ plane of [`PlaneEstimate::transform`].
#[inline]
pub fn reference_axis() -> Vector3<f32> {
    Vector3::y()
}

/// Best-fit plane through a point cloud.
#[derive(Clone, Copy, Debug, PartialEq, Serialize, Deserialize)]
pub struct PlaneEstimate {
    pub centroid: Point3<f32>,
    /// Unit normal, or zero when the fit is degenerate.
    pub normal: Vector3<f32>,
}

impl PlaneEstimate {
    /// Plane of an empty cloud: origin centroid, no normal.
    pub fn empty() -> Self {
        Self {
            centroid: Point3::origin(),
            normal: Vector3::zeros(),
        }
    }

    /// Recover a plane from a frame built by [`transform`](Self::transform).
    pub fn from_transform(t: &Isometry3<f32>) -> Self {
        Self {
            centroid: Point3::from(t.translation.vector),
            normal: t.rotation * reference_axis(),
        }
    }

    /// `true` when no normal direction could be determined.
    pub fn is_degenerate(&self) -> bool {
        self.normal.norm_squared() < NORMAL_EPS
    }

    /// Plane frame: translation is the centroid, the reference axis maps onto
    /// the normal. Degenerate planes keep the identity rotation.
    pub fn transform(&self) -> Isometry3<f32> {
        frame_from_axis(&self.centroid, &reference_axis(), &self.normal)
    }

    /// Signed distance of `p` along the normal.
    #[inline]
    pub fn signed_distance(&self, p: &Point3<f32>) -> f32 {
        self.normal.dot(&(p - self.centroid))
    }

    /// Root-mean-square point-to-plane distance.
    pub fn residual_rms(&self, points: &[Point3<f32>]) -> f32 {
        if points.is_empty() {
            return 0.0;
        }
        let sum: f32 = points
            .iter()
            .map(|p| {
                let d = self.signed_distance(p);
                d * d
            })
            .sum();
        (sum / points.len() as f32).sqrt()
    }
}

/// Normal estimation strategy.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum PlaneFitMethod {
    #[default]
    Newell,
    LeastSquares,
}

impl PlaneFitMethod {
    pub fn fit(self, points: &[Point3<f32>]) -> PlaneEstimate {
        match self {
            PlaneFitMethod::Newell => fit_plane_newell(points),
            PlaneFitMethod::LeastSquares => fit_plane_least_squares(points),
        }
    }
}

fn centroid(points: &[Point3<f32>]) -> Point3<f32> {
    let sum = points
        .iter()
        .fold(Vector3::zeros(), |acc: Vector3<f32>, p| acc + p.coords);
    Point3::from(sum / points.len() as f32)
}

fn newell_normal(points: &[Point3<f32>]) -> Vector3<f32> {
    let Some(&last) = points.last() else {
        return Vector3::zeros();
    };

    let mut normal = Vector3::zeros();
    let mut prev = last;
    for &curr in points {
        normal.x += (prev.z + curr.z) * (prev.y - curr.y);
        normal.y += (prev.x + curr.x) * (prev.z - curr.z);
        normal.z += (prev.y + curr.y) * (prev.x - curr.x);
        prev = curr;
    }
    normal
}

/// Newell's method: centroid plus accumulated polygon normal.
#[cfg_attr(feature = "tracing", instrument(level = "debug", skip(points), fields(n = points.len())))]
pub fn fit_plane_newell(points: &[Point3<f32>]) -> PlaneEstimate {
    if points.is_empty() {
        return PlaneEstimate::empty();
    }

    let normal = newell_normal(points)
        .try_normalize(NORMAL_EPS)
        .unwrap_or_else(|| {
            debug!("newell fit: no normal from {} points", points.len());
            Vector3::zeros()
        });

    PlaneEstimate {
        centroid: centroid(points),
        normal,
    }
}

/// Total least squares: the normal is the covariance eigenvector with the
/// smallest eigenvalue.
///
/// Points spanning fewer than two dimensions give a zero normal. The sign is
/// chosen to agree with Newell's normal when that one is defined.
#[cfg_attr(feature = "tracing", instrument(level = "debug", skip(points), fields(n = points.len())))]
pub fn fit_plane_least_squares(points: &[Point3<f32>]) -> PlaneEstimate {
    if points.is_empty() {
        return PlaneEstimate::empty();
    }

    let c = centroid(points);
    let mut cov = Matrix3::<f32>::zeros();
    for p in points {
        let d = p - c;
        cov += d * d.transpose();
    }

    let eigen = cov.symmetric_eigen();
    let mut order = [0usize, 1, 2];
    order.sort_by(|&a, &b| eigen.eigenvalues[a].total_cmp(&eigen.eigenvalues[b]));
    let [min_idx, mid_idx, max_idx] = order;

    let max_ev = eigen.eigenvalues[max_idx];
    let mid_ev = eigen.eigenvalues[mid_idx];
    if max_ev <= NORMAL_EPS || mid_ev <= RANK_EPS * max_ev {
        debug!(
            "least-squares fit: rank-deficient cloud ({} points)",
            points.len()
        );
        return PlaneEstimate {
            centroid: c,
            normal: Vector3::zeros(),
        };
    }

    let mut normal = eigen.eigenvectors.column(min_idx).into_owned().normalize();
    if normal.dot(&newell_normal(points)) < 0.0 {
        normal = -normal;
    }

    PlaneEstimate {
        centroid: c,
        normal,
    }
}
