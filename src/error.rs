/// Errors raised while preparing the inputs of the skybox vertex stage.
///
/// The transform itself is total and never produces one of these.
#[derive(thiserror::Error, Debug, Clone, PartialEq)]
pub enum SkyboxError {
    #[error("camera world transform is not invertible (determinant {0})")]
    SingularCameraTransform(f32),
    #[error("aspect ratio must be finite and at least 0.01, got {0}")]
    InvalidAspect(f32),
}
