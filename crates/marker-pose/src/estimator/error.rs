/// Errors returned by the marker pose estimator.
///
/// Missing depth or failed unprojection are not errors for the batch entry
/// points; they lower the accuracy tier instead.
#[derive(thiserror::Error, Debug, Clone, PartialEq)]
pub enum MarkerPoseError {
    #[error("invalid image size (width={width}, height={height})")]
    InvalidImageSize { width: f32, height: f32 },
    #[error("invalid viewport size (width={width}, height={height})")]
    InvalidViewport { width: f32, height: f32 },
    #[error("not enough depth samples to fit a plane (hits={hits}, required={required})")]
    InsufficientDepth { hits: usize, required: usize },
    #[error("depth samples do not span a plane (hits={hits})")]
    DegeneratePlane { hits: usize },
}

impl MarkerPoseError {
    /// Per-marker depth failure that the single-ray estimate can replace.
    pub fn is_depth_failure(&self) -> bool {
        matches!(
            self,
            MarkerPoseError::InsufficientDepth { .. } | MarkerPoseError::DegeneratePlane { .. }
        )
    }
}
