//! Core geometry for estimating the pose of a planar marker.
//!
//! This crate is purely geometric. It knows nothing about ray casting or the
//! host's camera model; those live behind traits in `marker-pose`.
//!
//! - [`quad`]: marker quadrilaterals and their nine sample points.
//! - [`view`]: image ↔ view mapping under a 90° rotation and aspect fill.
//! - [`plane`]: Newell and least-squares plane fits.
//! - [`transform`]: axis-alignment rotations and ray/plane intersection.

mod frame;
mod logger;
pub mod plane;
pub mod quad;
pub mod transform;
pub mod view;

pub use frame::{CameraPose, FrameContext, ImageSize, InterfaceOrientation, ViewportSize};
pub use plane::{
    fit_plane_least_squares, fit_plane_newell, reference_axis, PlaneEstimate, PlaneFitMethod,
};
pub use quad::{Quadrilateral, SamplePoints, SampleSite, SAMPLE_COUNT};
pub use transform::{frame_from_axis, rotation_between_axes, with_translation, Ray3};
pub use view::{
    aspect_fill_factor, denormalize_image_point, normalize_image_point, FrameToViewMapper,
};

#[cfg(feature = "tracing")]
pub use logger::init_tracing;

pub use logger::init_with_level;
