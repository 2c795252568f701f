use log::debug;
use marker_pose_core::{FrameContext, FrameToViewMapper, Quadrilateral};

use super::{
    EstimationMode, MarkerPose, MarkerPoseError, MarkerPoseParams, PlanePoseDetails, PoseEstimate,
};
use crate::collaborators::{MarkerDetector, PlaneUnprojector, RayCaster};
use crate::depth::sample_depth;
use crate::refine::refine_pose;
use crate::single_point::estimate_single_point;
use crate::size::measure_size;

#[cfg(feature = "tracing")]
use tracing::instrument;

/// A plane needs at least three non-collinear points.
const MIN_PLANE_POINTS_FLOOR: usize = 3;

/// Per-frame marker pose estimator.
///
/// Stateless between calls; every marker of a frame is handled
/// independently, so one marker without depth never affects another.
#[derive(Clone, Debug, Default)]
pub struct MarkerPoseEstimator {
    params: MarkerPoseParams,
}

impl MarkerPoseEstimator {
    pub fn new(mut params: MarkerPoseParams) -> Self {
        params.min_plane_points = params.min_plane_points.max(MIN_PLANE_POINTS_FLOOR);
        if !params.default_distance.is_finite() || params.default_distance < 0.0 {
            params.default_distance = super::params::DEFAULT_GUESS_DISTANCE;
        }
        Self { params }
    }

    #[inline]
    pub fn params(&self) -> &MarkerPoseParams {
        &self.params
    }

    /// Build the image-to-view mapper after checking the frame dimensions.
    pub fn mapper(&self, frame: &FrameContext) -> Result<FrameToViewMapper, MarkerPoseError> {
        if !frame.image_size.is_valid() {
            return Err(MarkerPoseError::InvalidImageSize {
                width: frame.image_size.width,
                height: frame.image_size.height,
            });
        }
        if !frame.viewport.is_valid() {
            return Err(MarkerPoseError::InvalidViewport {
                width: frame.viewport.width,
                height: frame.viewport.height,
            });
        }
        Ok(FrameToViewMapper::new(frame.image_size, frame.viewport))
    }

    /// Estimate a pose for every quadrilateral of one frame.
    ///
    /// Markers whose depth hits are too few or do not span a plane fall back
    /// to the single-ray estimate, or are skipped when
    /// `fallback_to_single_point` is off. Only invalid frame dimensions fail
    /// the whole call.
    #[cfg_attr(
        feature = "tracing",
        instrument(
            level = "info",
            skip(self, frame, quads, caster, unprojector),
            fields(num_markers = quads.len())
        )
    )]
    pub fn estimate<R, U>(
        &self,
        frame: &FrameContext,
        quads: &[Quadrilateral],
        caster: &R,
        unprojector: &U,
    ) -> Result<Vec<MarkerPose>, MarkerPoseError>
    where
        R: RayCaster + ?Sized,
        U: PlaneUnprojector + ?Sized,
    {
        let mapper = self.mapper(frame)?;
        let mut poses = Vec::with_capacity(quads.len());

        for (idx, quad) in quads.iter().enumerate() {
            let estimate = match self.params.mode {
                EstimationMode::SinglePoint => self.single_point_with(quad, &mapper, frame, caster),
                EstimationMode::Plane => {
                    match self.plane_pose_with(quad, &mapper, frame, caster, unprojector) {
                        Ok(details) => details.estimate,
                        Err(err) if err.is_depth_failure() => {
                            if !self.params.fallback_to_single_point {
                                debug!("marker {idx}: {err}, skipped");
                                continue;
                            }
                            debug!("marker {idx}: {err}, using single ray");
                            self.single_point_with(quad, &mapper, frame, caster)
                        }
                        Err(err) => return Err(err),
                    }
                }
            };
            debug!("marker {idx}: {:?}", estimate.tier());
            poses.push(MarkerPose {
                quad: *quad,
                estimate,
            });
        }

        Ok(poses)
    }

    /// Run the detector on `image`, then [`estimate`](Self::estimate).
    pub fn detect_and_estimate<D, R, U>(
        &self,
        detector: &D,
        image: &D::Image,
        frame: &FrameContext,
        caster: &R,
        unprojector: &U,
    ) -> Result<Vec<MarkerPose>, MarkerPoseError>
    where
        D: MarkerDetector + ?Sized,
        R: RayCaster + ?Sized,
        U: PlaneUnprojector + ?Sized,
    {
        let quads = detector.detect(image);
        debug!("detector returned {} markers", quads.len());
        self.estimate(frame, &quads, caster, unprojector)
    }

    /// Plane path for one marker, keeping the intermediate stages.
    pub fn estimate_plane_pose<R, U>(
        &self,
        quad: &Quadrilateral,
        frame: &FrameContext,
        caster: &R,
        unprojector: &U,
    ) -> Result<PlanePoseDetails, MarkerPoseError>
    where
        R: RayCaster + ?Sized,
        U: PlaneUnprojector + ?Sized,
    {
        let mapper = self.mapper(frame)?;
        self.plane_pose_with(quad, &mapper, frame, caster, unprojector)
    }

    /// Single-ray estimate for one marker. Never worse than `Guess`.
    pub fn estimate_single_point<R: RayCaster + ?Sized>(
        &self,
        quad: &Quadrilateral,
        frame: &FrameContext,
        caster: &R,
    ) -> Result<PoseEstimate, MarkerPoseError> {
        let mapper = self.mapper(frame)?;
        Ok(self.single_point_with(quad, &mapper, frame, caster))
    }

    fn single_point_with<R: RayCaster + ?Sized>(
        &self,
        quad: &Quadrilateral,
        mapper: &FrameToViewMapper,
        frame: &FrameContext,
        caster: &R,
    ) -> PoseEstimate {
        estimate_single_point(
            caster,
            quad,
            mapper,
            &frame.camera,
            self.params.hit_test_space,
            &self.params.single_ray_surface_kinds,
            self.params.default_distance,
        )
    }

    #[cfg_attr(
        feature = "tracing",
        instrument(level = "debug", skip(self, quad, mapper, frame, caster, unprojector))
    )]
    fn plane_pose_with<R, U>(
        &self,
        quad: &Quadrilateral,
        mapper: &FrameToViewMapper,
        frame: &FrameContext,
        caster: &R,
        unprojector: &U,
    ) -> Result<PlanePoseDetails, MarkerPoseError>
    where
        R: RayCaster + ?Sized,
        U: PlaneUnprojector + ?Sized,
    {
        let image_points = quad.sample_points();
        let queries = self.params.hit_test_space.query_points(mapper, &image_points);
        let depth = sample_depth(caster, &queries, &self.params.surface_kinds);

        let hits = depth.hit_count();
        if hits < self.params.min_plane_points {
            return Err(MarkerPoseError::InsufficientDepth {
                hits,
                required: self.params.min_plane_points,
            });
        }

        let plane = self.params.plane_fit.fit(&depth.cloud());
        if plane.is_degenerate() {
            return Err(MarkerPoseError::DegeneratePlane { hits });
        }
        let view_points = mapper.map_samples(&image_points);
        let refined = refine_pose(
            unprojector,
            &plane.transform(),
            &view_points,
            depth.rough_corners(),
            frame.orientation,
            frame.viewport,
        );

        let estimate = match refined.resolved_corners() {
            Some(corners) if refined.exact_count() > 0 => PoseEstimate::TransformAndSizeApprox {
                transform: refined.transform,
                size: measure_size(&corners),
            },
            _ => PoseEstimate::PlaneApprox {
                transform: refined.transform,
            },
        };

        Ok(PlanePoseDetails {
            depth,
            plane,
            refined,
            estimate,
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::collaborators::{RayHit, SurfaceKind};
    use crate::estimator::AccuracyTier;
    use marker_pose_core::{CameraPose, ImageSize, InterfaceOrientation, ViewportSize};
    use nalgebra::{Isometry3, Point2, Point3};

    struct Nothing;

    impl RayCaster for Nothing {
        fn hit_test(&self, _point: Point2<f32>, _kinds: &[SurfaceKind]) -> Option<RayHit> {
            None
        }
    }

    impl PlaneUnprojector for Nothing {
        fn unproject(
            &self,
            _view_point: Point2<f32>,
            _plane: &Isometry3<f32>,
            _orientation: InterfaceOrientation,
            _viewport: ViewportSize,
        ) -> Option<Point3<f32>> {
            None
        }
    }

    fn frame() -> FrameContext {
        FrameContext::new(
            ImageSize::new(200.0, 200.0),
            ViewportSize::new(400.0, 400.0),
            CameraPose::default(),
        )
    }

    fn quad() -> Quadrilateral {
        Quadrilateral::from_corners([
            Point2::new(0.0, 0.0),
            Point2::new(100.0, 0.0),
            Point2::new(100.0, 100.0),
            Point2::new(0.0, 100.0),
        ])
    }

    #[test]
    fn new_clamps_degenerate_params() {
        let est = MarkerPoseEstimator::new(MarkerPoseParams {
            min_plane_points: 0,
            default_distance: f32::NAN,
            ..MarkerPoseParams::default()
        });
        assert_eq!(est.params().min_plane_points, 3);
        assert_eq!(est.params().default_distance, 0.5);
    }

    #[test]
    fn zero_sized_frame_is_rejected() {
        let est = MarkerPoseEstimator::default();
        let mut bad = frame();
        bad.image_size = ImageSize::new(0.0, 100.0);
        let err = est.estimate(&bad, &[quad()], &Nothing, &Nothing).unwrap_err();
        assert!(matches!(err, MarkerPoseError::InvalidImageSize { .. }));

        let mut bad = frame();
        bad.viewport = ViewportSize::new(400.0, -1.0);
        let err = est.estimate(&bad, &[quad()], &Nothing, &Nothing).unwrap_err();
        assert!(matches!(err, MarkerPoseError::InvalidViewport { .. }));
    }

    #[test]
    fn plane_path_reports_missing_depth() {
        let est = MarkerPoseEstimator::default();
        let err = est
            .estimate_plane_pose(&quad(), &frame(), &Nothing, &Nothing)
            .unwrap_err();
        assert_eq!(
            err,
            MarkerPoseError::InsufficientDepth {
                hits: 0,
                required: 4
            }
        );
    }

    #[test]
    fn no_fallback_skips_marker() {
        let est = MarkerPoseEstimator::new(MarkerPoseParams {
            fallback_to_single_point: false,
            ..MarkerPoseParams::default()
        });
        let poses = est.estimate(&frame(), &[quad()], &Nothing, &Nothing).unwrap();
        assert!(poses.is_empty());
    }

    #[test]
    fn empty_frame_yields_no_poses() {
        let est = MarkerPoseEstimator::default();
        let poses = est.estimate(&frame(), &[], &Nothing, &Nothing).unwrap();
        assert!(poses.is_empty());
    }

    #[test]
    fn single_point_mode_never_fails_per_marker() {
        let est = MarkerPoseEstimator::new(MarkerPoseParams::single_point());
        let poses = est
            .estimate(&frame(), &[quad(), quad()], &Nothing, &Nothing)
            .unwrap();
        assert_eq!(poses.len(), 2);
        assert!(poses.iter().all(|p| p.tier() == AccuracyTier::Guess));
        assert_eq!(poses[0].position(), Point3::new(0.0, 0.0, -0.5));
    }
}
