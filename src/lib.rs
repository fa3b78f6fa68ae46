//! Vertex stage for drawing a skybox.
//!
//! The stage strips translation from the camera's view matrix so the environment cube
//! turns with the camera but never moves relative to it. The same transform is provided
//! as a pure CPU function and as WGSL for a wgpu host. Texture sampling, window setup
//! and draw submission stay with the host renderer.

pub mod camera;
pub mod error;
pub mod mesh;
pub mod shader;
pub mod stage;
pub mod transform;
pub mod uniform;

pub use camera::CameraDesc;
pub use error::SkyboxError;
pub use mesh::{PosOnly, SkyboxMesh, SKYBOX_VERTICES};
pub use transform::{drop_translation, transform, SkyboxVertexTransform, VertexOutput};
pub use uniform::{SharedVertexArgs, VertexArgs, VertexArgsStd140};
