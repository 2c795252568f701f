//! Marker quadrilaterals and their nine canonical sample points.

use nalgebra::Point2;
use serde::{Deserialize, Serialize};

/// Bounding quadrilateral of a detected marker in image pixel coordinates.
///
/// Corner order follows the detector's winding; convexity is not checked.
#[derive(Clone, Copy, Debug, PartialEq, Serialize, Deserialize)]
pub struct Quadrilateral {
    pub bottom_left: Point2<f32>,
    pub bottom_right: Point2<f32>,
    pub top_right: Point2<f32>,
    pub top_left: Point2<f32>,
}

impl Quadrilateral {
    pub fn new(
        bottom_left: Point2<f32>,
        bottom_right: Point2<f32>,
        top_right: Point2<f32>,
        top_left: Point2<f32>,
    ) -> Self {
        Self {
            bottom_left,
            bottom_right,
            top_right,
            top_left,
        }
    }

    /// Build from corners ordered BL, BR, TR, TL.
    pub fn from_corners(corners: [Point2<f32>; 4]) -> Self {
        let [bl, br, tr, tl] = corners;
        Self::new(bl, br, tr, tl)
    }

    /// Corners ordered BL, BR, TR, TL.
    #[inline]
    pub fn corners(&self) -> [Point2<f32>; 4] {
        [
            self.bottom_left,
            self.bottom_right,
            self.top_right,
            self.top_left,
        ]
    }

    /// Mean of the four corners.
    pub fn center(&self) -> Point2<f32> {
        let sum = self.bottom_left.coords
            + self.bottom_right.coords
            + self.top_right.coords
            + self.top_left.coords;
        Point2::from(sum * 0.25)
    }

    /// Midpoint of the bottom-left / top-right diagonal.
    pub fn diagonal_midpoint(&self) -> Point2<f32> {
        nalgebra::center(&self.bottom_left, &self.top_right)
    }

    /// Canonical nine-point expansion of this quadrilateral.
    pub fn sample_points(&self) -> SamplePoints {
        SamplePoints::from_quad(self)
    }
}

/// Number of canonical sample points per quadrilateral.
pub const SAMPLE_COUNT: usize = 9;

/// Identity of a canonical sample point.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum SampleSite {
    BottomLeft,
    BottomRight,
    TopRight,
    TopLeft,
    BottomMid,
    RightMid,
    TopMid,
    LeftMid,
    Center,
}

impl SampleSite {
    /// All sites in sample order.
    pub const ALL: [SampleSite; SAMPLE_COUNT] = [
        SampleSite::BottomLeft,
        SampleSite::BottomRight,
        SampleSite::TopRight,
        SampleSite::TopLeft,
        SampleSite::BottomMid,
        SampleSite::RightMid,
        SampleSite::TopMid,
        SampleSite::LeftMid,
        SampleSite::Center,
    ];

    /// The four corner sites, BL, BR, TR, TL.
    pub const CORNERS: [SampleSite; 4] = [
        SampleSite::BottomLeft,
        SampleSite::BottomRight,
        SampleSite::TopRight,
        SampleSite::TopLeft,
    ];

    /// Position of this site in a [`SamplePoints`] set.
    #[inline]
    pub fn index(self) -> usize {
        self as usize
    }
}

/// Nine ordered sample points derived from a [`Quadrilateral`].
///
/// Order: BL, BR, TR, TL, bottom-mid, right-mid, top-mid, left-mid, center.
#[derive(Clone, Copy, Debug, PartialEq, Serialize, Deserialize)]
pub struct SamplePoints {
    pub points: [Point2<f32>; SAMPLE_COUNT],
}

impl SamplePoints {
    pub fn from_quad(quad: &Quadrilateral) -> Self {
        let Quadrilateral {
            bottom_left: bl,
            bottom_right: br,
            top_right: tr,
            top_left: tl,
        } = *quad;
        let mid = nalgebra::center;

        Self {
            points: [
                bl,
                br,
                tr,
                tl,
                mid(&bl, &br),
                mid(&tr, &br),
                mid(&tr, &tl),
                mid(&bl, &tl),
                quad.center(),
            ],
        }
    }

    #[inline]
    pub fn get(&self, site: SampleSite) -> Point2<f32> {
        self.points[site.index()]
    }

    /// Corner points, BL, BR, TR, TL.
    pub fn corners(&self) -> [Point2<f32>; 4] {
        [self.points[0], self.points[1], self.points[2], self.points[3]]
    }

    pub fn center(&self) -> Point2<f32> {
        self.get(SampleSite::Center)
    }

    /// Iterate `(site, point)` pairs in sample order.
    pub fn iter(&self) -> impl Iterator<Item = (SampleSite, Point2<f32>)> + '_ {
        SampleSite::ALL.iter().copied().zip(self.points.iter().copied())
    }

    /// Apply `f` to every point, preserving order.
    pub fn map(&self, mut f: impl FnMut(Point2<f32>) -> Point2<f32>) -> Self {
        Self {
            points: self.points.map(&mut f),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn assert_close(a: Point2<f32>, b: Point2<f32>, tol: f32) {
        assert!(
            (a.x - b.x).abs() < tol && (a.y - b.y).abs() < tol,
            "expected ({:.6},{:.6}) ~ ({:.6},{:.6}) within {}",
            a.x,
            a.y,
            b.x,
            b.y,
            tol
        );
    }

    fn skewed_quad() -> Quadrilateral {
        Quadrilateral::new(
            Point2::new(12.5, 340.25),
            Point2::new(301.0, 322.75),
            Point2::new(288.5, 41.0),
            Point2::new(20.0, 60.5),
        )
    }

    #[test]
    fn corners_keep_detector_order() {
        let q = skewed_quad();
        let s = q.sample_points();
        assert_eq!(s.corners(), q.corners());
        assert_eq!(s.get(SampleSite::TopRight), q.top_right);
    }

    #[test]
    fn midpoints_are_means_of_adjacent_corners() {
        let q = skewed_quad();
        let s = q.sample_points();
        let mean = |a: Point2<f32>, b: Point2<f32>| Point2::new((a.x + b.x) / 2.0, (a.y + b.y) / 2.0);

        assert_close(s.get(SampleSite::BottomMid), mean(q.bottom_left, q.bottom_right), 1e-5);
        assert_close(s.get(SampleSite::RightMid), mean(q.top_right, q.bottom_right), 1e-5);
        assert_close(s.get(SampleSite::TopMid), mean(q.top_right, q.top_left), 1e-5);
        assert_close(s.get(SampleSite::LeftMid), mean(q.bottom_left, q.top_left), 1e-5);
    }

    #[test]
    fn center_is_mean_of_all_corners() {
        let q = skewed_quad();
        let expected = Point2::new(
            (12.5 + 301.0 + 288.5 + 20.0) / 4.0,
            (340.25 + 322.75 + 41.0 + 60.5) / 4.0,
        );
        assert_close(q.sample_points().center(), expected, 1e-5);
    }

    #[test]
    fn site_indices_match_sample_order() {
        for (i, site) in SampleSite::ALL.iter().enumerate() {
            assert_eq!(site.index(), i);
        }
        for (i, site) in SampleSite::CORNERS.iter().enumerate() {
            assert_eq!(site.index(), i);
        }
    }

    #[test]
    fn diagonal_midpoint_uses_bottom_left_and_top_right() {
        let q = skewed_quad();
        assert_close(q.diagonal_midpoint(), Point2::new(150.5, 190.625), 1e-5);
    }

    #[test]
    fn map_preserves_order() {
        let s = skewed_quad().sample_points();
        let shifted = s.map(|p| Point2::new(p.x + 1.0, p.y));
        for (a, b) in s.points.iter().zip(shifted.points.iter()) {
            assert_close(Point2::new(a.x + 1.0, a.y), *b, 1e-5);
        }
    }
}
