use nalgebra::{distance, Point3};
use serde::{Deserialize, Serialize};

/// Physical marker size in world units (meters for ARKit/ARCore sessions).
#[derive(Clone, Copy, Debug, Default, PartialEq, Serialize, Deserialize)]
pub struct MarkerSize {
    pub width: f32,
    pub height: f32,
}

impl MarkerSize {
    pub fn new(width: f32, height: f32) -> Self {
        Self { width, height }
    }
}

/// Width and height as the mean of opposing edge lengths.
///
/// `corners` are ordered BL, BR, TR, TL.
pub fn measure_size(corners: &[Point3<f32>; 4]) -> MarkerSize {
    let [bl, br, tr, tl] = corners;
    MarkerSize {
        width: 0.5 * (distance(bl, br) + distance(tl, tr)),
        height: 0.5 * (distance(bl, tl) + distance(tr, br)),
    }
}
