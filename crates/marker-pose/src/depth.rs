//! Depth sampling: one ray cast per canonical sample point.

use marker_pose_core::{FrameToViewMapper, SamplePoints, SampleSite, SAMPLE_COUNT};
use nalgebra::{Point2, Point3};
use serde::{Deserialize, Serialize};

use crate::collaborators::{RayCaster, RayHit, SurfaceKind};

#[cfg(feature = "tracing")]
use tracing::instrument;

/// Coordinate space in which ray-cast queries are issued.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum HitTestSpace {
    /// Unit image coordinates with a vertical flip, `(x / w, (h - y) / h)`.
    #[default]
    NormalizedImage,
    /// View points, as produced by [`FrameToViewMapper::image_to_view`].
    View,
}

impl HitTestSpace {
    /// Convert one image-space point into a query point.
    #[inline]
    pub fn query_point(self, mapper: &FrameToViewMapper, image_point: Point2<f32>) -> Point2<f32> {
        match self {
            HitTestSpace::NormalizedImage => mapper.normalize_image_point(image_point),
            HitTestSpace::View => mapper.image_to_view(image_point),
        }
    }

    /// Convert all image-space sample points into query points.
    pub fn query_points(self, mapper: &FrameToViewMapper, image: &SamplePoints) -> SamplePoints {
        image.map(|p| self.query_point(mapper, p))
    }
}

/// Ray-cast results for the nine sample points, indexed by [`SampleSite`].
#[derive(Clone, Copy, Debug, PartialEq, Serialize, Deserialize)]
pub struct DepthSamples {
    pub hits: [Option<RayHit>; SAMPLE_COUNT],
}

impl DepthSamples {
    #[inline]
    pub fn get(&self, site: SampleSite) -> Option<RayHit> {
        self.hits[site.index()]
    }

    /// Number of sample points that hit a surface.
    pub fn hit_count(&self) -> usize {
        self.hits.iter().flatten().count()
    }

    /// Hit positions in sample order, misses skipped.
    pub fn cloud(&self) -> Vec<Point3<f32>> {
        self.hits.iter().flatten().map(|h| h.position).collect()
    }

    /// Ray-cast positions of the four corners (BL, BR, TR, TL).
    ///
    /// These are the rough fallbacks used when exact unprojection fails.
    pub fn rough_corners(&self) -> [Option<Point3<f32>>; 4] {
        SampleSite::CORNERS.map(|site| self.get(site).map(|h| h.position))
    }
}

/// Ray cast every query point and keep the first hit of each.
#[cfg_attr(feature = "tracing", instrument(level = "debug", skip_all))]
pub fn sample_depth<R: RayCaster + ?Sized>(
    caster: &R,
    queries: &SamplePoints,
    kinds: &[SurfaceKind],
) -> DepthSamples {
    DepthSamples {
        hits: queries.points.map(|q| caster.hit_test(q, kinds)),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use marker_pose_core::{ImageSize, Quadrilateral, ViewportSize};
    use std::cell::RefCell;

    /// Hits every query whose x is below `cutoff`, recording the queries.
    struct Cutoff {
        cutoff: f32,
        seen: RefCell<Vec<Point2<f32>>>,
    }

    impl RayCaster for Cutoff {
        fn hit_test(&self, point: Point2<f32>, _kinds: &[SurfaceKind]) -> Option<RayHit> {
            self.seen.borrow_mut().push(point);
            (point.x < self.cutoff).then(|| RayHit {
                position: Point3::new(point.x, point.y, -1.0),
                distance: 1.0,
            })
        }
    }

    fn setup() -> (FrameToViewMapper, SamplePoints) {
        let mapper =
            FrameToViewMapper::new(ImageSize::new(200.0, 200.0), ViewportSize::new(400.0, 400.0));
        let quad = Quadrilateral::from_corners([
            Point2::new(0.0, 0.0),
            Point2::new(100.0, 0.0),
            Point2::new(100.0, 100.0),
            Point2::new(0.0, 100.0),
        ]);
        (mapper, quad.sample_points())
    }

    #[test]
    fn normalized_queries_flip_vertically() {
        let (mapper, samples) = setup();
        let q = HitTestSpace::NormalizedImage.query_points(&mapper, &samples);
        assert_eq!(q.get(SampleSite::BottomLeft), Point2::new(0.0, 1.0));
        assert_eq!(q.get(SampleSite::TopRight), Point2::new(0.5, 0.5));
        assert_eq!(q.get(SampleSite::Center), Point2::new(0.25, 0.75));
    }

    #[test]
    fn view_queries_match_mapper() {
        let (mapper, samples) = setup();
        let q = HitTestSpace::View.query_points(&mapper, &samples);
        assert_eq!(q, mapper.map_samples(&samples));
    }

    #[test]
    fn collects_hits_and_keeps_corner_identity() {
        let (mapper, samples) = setup();
        let queries = HitTestSpace::NormalizedImage.query_points(&mapper, &samples);
        let caster = Cutoff {
            cutoff: 0.3,
            seen: RefCell::new(Vec::new()),
        };
        let depth = sample_depth(&caster, &queries, &SurfaceKind::ALL);

        assert_eq!(caster.seen.borrow().len(), SAMPLE_COUNT);
        // x in {0, 0.5, 0.5, 0, 0.25, 0.5, 0.25, 0, 0.25}: six hits.
        assert_eq!(depth.hit_count(), 6);
        assert_eq!(depth.cloud().len(), 6);

        let rough = depth.rough_corners();
        assert!(rough[0].is_some());
        assert!(rough[1].is_none());
        assert!(rough[2].is_none());
        assert!(rough[3].is_some());
        assert_eq!(rough[3], Some(Point3::new(0.0, 0.5, -1.0)));
    }
}
