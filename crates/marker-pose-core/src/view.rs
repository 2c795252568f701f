//! Mapping between captured-image pixels and on-screen view coordinates.
//!
//! The captured image is assumed to be rotated 90° relative to the viewport
//! (landscape sensor, portrait display). Image `y` therefore drives view `x`
//! and image `x` drives view `y`. The image is scaled uniformly by an
//! aspect-fill factor and re-centred on the viewport.

use nalgebra::Point2;

use crate::{ImageSize, SamplePoints, ViewportSize};

/// Image → view mapper for one frame.
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct FrameToViewMapper {
    image: ImageSize,
    viewport: ViewportSize,
    factor: f32,
}

impl FrameToViewMapper {
    /// Both sizes must be valid (see [`ImageSize::is_valid`]) for the mapping
    /// to be finite; the caller checks this.
    pub fn new(image: ImageSize, viewport: ViewportSize) -> Self {
        Self {
            image,
            viewport,
            factor: aspect_fill_factor(image, viewport),
        }
    }

    #[inline]
    pub fn factor(&self) -> f32 {
        self.factor
    }

    pub fn image_size(&self) -> ImageSize {
        self.image
    }

    pub fn viewport(&self) -> ViewportSize {
        self.viewport
    }

    #[inline]
    pub fn image_to_view(&self, p: Point2<f32>) -> Point2<f32> {
        Point2::new(
            (p.y - self.image.height * 0.5) * self.factor + self.viewport.width * 0.5,
            (p.x - self.image.width * 0.5) * self.factor + self.viewport.height * 0.5,
        )
    }

    /// Exact inverse of [`image_to_view`](Self::image_to_view).
    #[inline]
    pub fn view_to_image(&self, v: Point2<f32>) -> Point2<f32> {
        Point2::new(
            (v.y - self.viewport.height * 0.5) / self.factor + self.image.width * 0.5,
            (v.x - self.viewport.width * 0.5) / self.factor + self.image.height * 0.5,
        )
    }

    /// Map every sample point into view space, keeping the order.
    pub fn map_samples(&self, samples: &SamplePoints) -> SamplePoints {
        samples.map(|p| self.image_to_view(p))
    }

    /// Unit image coordinates with a vertical flip: `(x / w, (h - y) / h)`.
    #[inline]
    pub fn normalize_image_point(&self, p: Point2<f32>) -> Point2<f32> {
        normalize_image_point(self.image, p)
    }
}

/// Uniform scale fitting a 90°-rotated image into the viewport.
#[inline]
pub fn aspect_fill_factor(image: ImageSize, viewport: ViewportSize) -> f32 {
    let factor_h = viewport.height / image.width;
    let factor_w = viewport.width / image.height;
    factor_h.min(factor_w)
}

/// See [`FrameToViewMapper::normalize_image_point`].
#[inline]
pub fn normalize_image_point(image: ImageSize, p: Point2<f32>) -> Point2<f32> {
    Point2::new(p.x / image.width, (image.height - p.y) / image.height)
}

/// Inverse of [`normalize_image_point`].
#[inline]
pub fn denormalize_image_point(image: ImageSize, n: Point2<f32>) -> Point2<f32> {
    Point2::new(n.x * image.width, image.height - n.y * image.height)
}
