use anyhow::{anyhow, Context, Result};
use bytemuck::{Pod, Zeroable};
use glam::Vec3;
use log::warn;

/// Vertex element of the skybox mesh: a model-space position and nothing else.
#[repr(C)]
#[derive(Debug, Clone, Copy, PartialEq, Pod, Zeroable)]
pub struct PosOnly {
    pub position: [f32; 3],
}

impl PosOnly {
    const ATTRIBUTES: [wgpu::VertexAttribute; 1] = [wgpu::VertexAttribute {
        format: wgpu::VertexFormat::Float32x3,
        offset: 0,
        shader_location: 0,
    }];

    /// Vertex buffer layout matching `@location(0) position` in the vertex shader.
    pub fn layout() -> wgpu::VertexBufferLayout<'static> {
        wgpu::VertexBufferLayout {
            array_stride: std::mem::size_of::<PosOnly>() as wgpu::BufferAddress,
            step_mode: wgpu::VertexStepMode::Vertex,
            attributes: &Self::ATTRIBUTES,
        }
    }
}

/// Enclosing volume drawn around the camera, as a non-indexed triangle list.
#[derive(Debug, Clone, PartialEq)]
pub struct SkyboxMesh {
    positions: Vec<Vec3>,
}

impl Default for SkyboxMesh {
    fn default() -> Self {
        Self::cube()
    }
}

impl SkyboxMesh {
    /// The standard skybox cube with corners at +-1.
    pub fn cube() -> Self {
        Self {
            positions: SKYBOX_VERTICES.iter().copied().map(Vec3::from_array).collect(),
        }
    }

    /// Reads an enclosing volume from OBJ text.
    ///
    /// Only `v` and `f` records are used. Polygons are fanned into triangles and expanded so
    /// the result can be drawn without an index buffer.
    pub fn from_obj_str(data: &str) -> Result<Self> {
        let mut vertices = Vec::new();
        let mut positions = Vec::new();

        for (line_no, line) in data.lines().enumerate() {
            let trimmed = line.trim();
            if trimmed.is_empty() || trimmed.starts_with('#') {
                continue;
            }
            let mut parts = trimmed.split_whitespace();
            match parts.next() {
                Some("v") => vertices.push(
                    parse_vec3(parts)
                        .with_context(|| format!("invalid vertex on line {}", line_no + 1))?,
                ),
                Some("f") => {
                    // Relative indices count back from the vertices read so far.
                    let polygon = parse_face(parts)
                        .and_then(|face| resolve_face(&face, &vertices))
                        .with_context(|| format!("invalid face on line {}", line_no + 1))?;
                    for i in 1..(polygon.len() - 1) {
                        positions.extend_from_slice(&[polygon[0], polygon[i], polygon[i + 1]]);
                    }
                }
                _ => {}
            }
        }

        if vertices.is_empty() {
            return Err(anyhow!("OBJ file does not define any vertices"));
        }
        if positions.is_empty() {
            return Err(anyhow!("OBJ file does not define any faces"));
        }

        let mesh = Self { positions };
        let center = mesh.bounds_center();
        if center.length_squared() > 1e-6 {
            warn!(
                "skybox mesh is centered at ({:.3}, {:.3}, {:.3}); directions are taken from the origin",
                center.x, center.y, center.z
            );
        }
        Ok(mesh)
    }

    pub fn positions(&self) -> &[Vec3] {
        &self.positions
    }

    pub fn len(&self) -> usize {
        self.positions.len()
    }

    pub fn is_empty(&self) -> bool {
        self.positions.is_empty()
    }

    /// Vertex buffer contents in [`PosOnly`] form.
    pub fn vertices(&self) -> Vec<PosOnly> {
        self.positions
            .iter()
            .map(|p| PosOnly {
                position: p.to_array(),
            })
            .collect()
    }

    fn bounds_center(&self) -> Vec3 {
        let (min, max) = self.positions.iter().fold(
            (Vec3::splat(f32::INFINITY), Vec3::splat(f32::NEG_INFINITY)),
            |(min, max), p| (min.min(*p), max.max(*p)),
        );
        (min + max) * 0.5
    }
}

fn parse_vec3<'a>(mut parts: impl Iterator<Item = &'a str>) -> Result<Vec3> {
    let mut next = || -> Result<f32> {
        Ok(parts
            .next()
            .ok_or_else(|| anyhow!("missing vector component"))?
            .parse::<f32>()?)
    };
    Ok(Vec3::new(next()?, next()?, next()?))
}

fn parse_face<'a>(parts: impl Iterator<Item = &'a str>) -> Result<Vec<i32>> {
    let mut indices = Vec::new();
    for part in parts {
        let vertex = part
            .split('/')
            .next()
            .filter(|s| !s.is_empty())
            .ok_or_else(|| anyhow!("missing vertex index"))?;
        indices.push(vertex.parse::<i32>()?);
    }
    if indices.len() < 3 {
        return Err(anyhow!("faces must reference at least 3 vertices"));
    }
    Ok(indices)
}

fn resolve_face(face: &[i32], vertices: &[Vec3]) -> Result<Vec<Vec3>> {
    face.iter()
        .map(|&index| {
            fix_index(index, vertices.len())
                .map(|resolved| vertices[resolved])
                .ok_or_else(|| anyhow!("vertex index {index} is out of range"))
        })
        .collect()
}

fn fix_index(index: i32, len: usize) -> Option<usize> {
    if index > 0 {
        let zero_based = index as usize - 1;
        (zero_based < len).then_some(zero_based)
    } else if index < 0 {
        let abs = index.unsigned_abs() as usize;
        (abs <= len).then_some(len - abs)
    } else {
        None
    }
}

/// Cube corners at +-1, twelve triangles.
pub const SKYBOX_VERTICES: [[f32; 3]; 36] = [
    // -z
    [-1.0, 1.0, -1.0],
    [-1.0, -1.0, -1.0],
    [1.0, -1.0, -1.0],
    [1.0, -1.0, -1.0],
    [1.0, 1.0, -1.0],
    [-1.0, 1.0, -1.0],
    // -x
    [-1.0, -1.0, 1.0],
    [-1.0, -1.0, -1.0],
    [-1.0, 1.0, -1.0],
    [-1.0, 1.0, -1.0],
    [-1.0, 1.0, 1.0],
    [-1.0, -1.0, 1.0],
    // +x
    [1.0, -1.0, -1.0],
    [1.0, -1.0, 1.0],
    [1.0, 1.0, 1.0],
    [1.0, 1.0, 1.0],
    [1.0, 1.0, -1.0],
    [1.0, -1.0, -1.0],
    // +z
    [-1.0, -1.0, 1.0],
    [-1.0, 1.0, 1.0],
    [1.0, 1.0, 1.0],
    [1.0, 1.0, 1.0],
    [1.0, -1.0, 1.0],
    [-1.0, -1.0, 1.0],
    // +y
    [-1.0, 1.0, -1.0],
    [1.0, 1.0, -1.0],
    [1.0, 1.0, 1.0],
    [1.0, 1.0, 1.0],
    [-1.0, 1.0, 1.0],
    [-1.0, 1.0, -1.0],
    // -y
    [-1.0, -1.0, -1.0],
    [-1.0, -1.0, 1.0],
    [1.0, -1.0, -1.0],
    [1.0, -1.0, -1.0],
    [-1.0, -1.0, 1.0],
    [1.0, -1.0, 1.0],
];
