use std::sync::Arc;

use bytemuck::{bytes_of, Pod, Zeroable};
use glam::Mat4;
use log::debug;
use parking_lot::RwLock;
use serde::{Deserialize, Serialize};

use crate::error::SkyboxError;

/// Per-draw uniforms read by the skybox vertex stage.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct VertexArgs {
    /// Camera projection transform.
    pub proj: Mat4,
    /// World-to-camera transform.
    pub view: Mat4,
}

impl Default for VertexArgs {
    fn default() -> Self {
        Self::identity()
    }
}

impl VertexArgs {
    pub fn new(proj: Mat4, view: Mat4) -> Self {
        Self { proj, view }
    }

    /// Uniforms used when no camera is active.
    pub fn identity() -> Self {
        Self::new(Mat4::IDENTITY, Mat4::IDENTITY)
    }

    /// Builds the uniforms from a camera's projection and its world transform.
    ///
    /// The view matrix is the inverse of `camera_world`.
    pub fn from_camera(proj: Mat4, camera_world: Mat4) -> Result<Self, SkyboxError> {
        let det = camera_world.determinant();
        if det == 0.0 || !det.is_finite() {
            return Err(SkyboxError::SingularCameraTransform(det));
        }
        Ok(Self::new(proj, camera_world.inverse()))
    }

    /// Same as [`VertexArgs::from_camera`], falling back to identity uniforms without a camera.
    pub fn from_active_camera(camera: Option<(Mat4, Mat4)>) -> Result<Self, SkyboxError> {
        match camera {
            Some((proj, world)) => Self::from_camera(proj, world),
            None => {
                debug!("no active camera, drawing skybox with identity uniforms");
                Ok(Self::identity())
            }
        }
    }

    /// Returns the block in the layout expected by the shader.
    pub fn std140(&self) -> VertexArgsStd140 {
        VertexArgsStd140 {
            proj: self.proj.to_cols_array_2d(),
            view: self.view.to_cols_array_2d(),
        }
    }
}

/// Byte image of [`VertexArgs`] for a uniform buffer upload.
///
/// Both matrices are stored column-major, `proj` first.
#[repr(C)]
#[derive(Debug, Clone, Copy, PartialEq, Pod, Zeroable)]
pub struct VertexArgsStd140 {
    pub proj: [[f32; 4]; 4],
    pub view: [[f32; 4]; 4],
}

impl VertexArgsStd140 {
    pub const SIZE: u64 = std::mem::size_of::<Self>() as u64;

    pub fn as_bytes(&self) -> &[u8] {
        bytes_of(self)
    }
}

/// Uniform block shared between the host that writes it and the invocations that read it.
///
/// Readers receive a copy, so no invocation ever runs while holding the lock.
#[derive(Debug, Default)]
pub struct SharedVertexArgs {
    args: Arc<RwLock<VertexArgs>>,
}

impl Clone for SharedVertexArgs {
    fn clone(&self) -> Self {
        Self {
            args: Arc::clone(&self.args),
        }
    }
}

impl SharedVertexArgs {
    pub fn new(args: VertexArgs) -> Self {
        Self {
            args: Arc::new(RwLock::new(args)),
        }
    }

    /// Replaces the block. Called once per draw, before any invocation starts.
    pub fn write(&self, args: VertexArgs) {
        *self.args.write() = args;
    }

    /// Returns a snapshot of the current block.
    pub fn read(&self) -> VertexArgs {
        *self.args.read()
    }
}
