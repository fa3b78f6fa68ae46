use anyhow::{anyhow, Context, Result};
use glam::{Mat4, Vec3};
use roxmltree::{Document, Node};
use serde::{Deserialize, Serialize};

use crate::error::SkyboxError;
use crate::uniform::VertexArgs;

/// Smallest aspect ratio accepted by [`CameraDesc::projection`].
pub const MIN_ASPECT: f32 = 0.01;

/// Camera as described by a scene file.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct CameraDesc {
    #[serde(default = "default_position")]
    pub position: Vec3,
    /// Euler angles in degrees, applied Z then Y then X.
    #[serde(default)]
    pub rotation: Vec3,
    /// Vertical field of view in degrees.
    #[serde(default = "default_fov")]
    pub fov: f32,
    #[serde(default = "default_near")]
    pub near: f32,
    #[serde(default = "default_far")]
    pub far: f32,
}

impl Default for CameraDesc {
    fn default() -> Self {
        Self {
            position: default_position(),
            rotation: Vec3::ZERO,
            fov: default_fov(),
            near: default_near(),
            far: default_far(),
        }
    }
}

fn default_position() -> Vec3 {
    Vec3::new(0.0, 2.0, 6.0)
}

fn default_fov() -> f32 {
    60.0
}

fn default_near() -> f32 {
    0.1
}

fn default_far() -> f32 {
    100.0
}

impl CameraDesc {
    /// Reads the first camera object from scene XML, if there is one.
    pub fn from_scene_xml(xml: &str) -> Result<Option<Self>> {
        let document = Document::parse(xml).context("invalid scene XML")?;
        let Some(node) = document.descendants().find(|n| {
            n.has_tag_name("object") && optional_text(n, "type").as_deref() == Some("camera")
        }) else {
            return Ok(None);
        };

        let mut camera = Self::default();
        camera.position = parse_vec3(optional_text(&node, "position"), camera.position)
            .context("invalid camera position")?;
        camera.rotation = parse_vec3(optional_text(&node, "rotation"), camera.rotation)
            .context("invalid camera rotation")?;
        camera.fov =
            parse_f32(optional_text(&node, "fov"), camera.fov).context("invalid camera fov")?;
        camera.near =
            parse_f32(optional_text(&node, "near"), camera.near).context("invalid camera near")?;
        camera.far =
            parse_f32(optional_text(&node, "far"), camera.far).context("invalid camera far")?;
        Ok(Some(camera))
    }

    /// Camera-to-world transform.
    pub fn world_transform(&self) -> Mat4 {
        let rotation = Mat4::from_rotation_z(self.rotation.z.to_radians())
            * Mat4::from_rotation_y(self.rotation.y.to_radians())
            * Mat4::from_rotation_x(self.rotation.x.to_radians());
        Mat4::from_translation(self.position) * rotation
    }

    /// Right-handed perspective projection with GL depth range.
    ///
    /// Aspect ratios below [`MIN_ASPECT`] are rejected.
    pub fn projection(&self, aspect: f32) -> Result<Mat4, SkyboxError> {
        if !aspect.is_finite() || aspect < MIN_ASPECT {
            return Err(SkyboxError::InvalidAspect(aspect));
        }
        Ok(Mat4::perspective_rh_gl(
            self.fov.to_radians(),
            aspect,
            self.near,
            self.far,
        ))
    }

    /// Uniforms for drawing the skybox from this camera.
    pub fn vertex_args(&self, aspect: f32) -> Result<VertexArgs, SkyboxError> {
        VertexArgs::from_camera(self.projection(aspect)?, self.world_transform())
    }
}

fn optional_text(node: &Node<'_, '_>, tag: &str) -> Option<String> {
    node.children()
        .find(|child| child.has_tag_name(tag))
        .and_then(|child| child.text())
        .map(str::trim)
        .filter(|text| !text.is_empty())
        .map(|text| text.to_string())
}

fn parse_vec3(value: Option<String>, default: Vec3) -> Result<Vec3> {
    let Some(value) = value else {
        return Ok(default);
    };
    let numbers = value
        .split_whitespace()
        .map(|component| component.parse::<f32>())
        .collect::<Result<Vec<_>, _>>()?;
    match numbers.as_slice() {
        [x, y, z] => Ok(Vec3::new(*x, *y, *z)),
        _ => Err(anyhow!("expected 3 components, got {}", numbers.len())),
    }
}

fn parse_f32(value: Option<String>, default: f32) -> Result<f32> {
    match value {
        Some(value) => value
            .parse::<f32>()
            .map_err(|err| anyhow!("failed to parse float: {err}")),
        None => Ok(default),
    }
}
