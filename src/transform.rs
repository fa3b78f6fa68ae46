use glam::{Mat3, Mat4, Vec3, Vec4};

use crate::uniform::VertexArgs;

/// Values handed to the next pipeline stage for one vertex.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct VertexOutput {
    /// Direction from the skybox center to the vertex, used to sample the cubemap.
    pub tex_coords: Vec3,
    /// Homogeneous clip-space position. The perspective divide happens downstream.
    pub clip_position: Vec4,
}

/// Returns `view` with its translation removed, keeping only the upper-left 3x3 block.
pub fn drop_translation(view: Mat4) -> Mat4 {
    Mat4::from_mat3(Mat3::from_mat4(view))
}

/// Runs the skybox vertex stage for a single position.
pub fn transform(position: Vec3, args: &VertexArgs) -> VertexOutput {
    let rotation_only_view = drop_translation(args.view);
    VertexOutput {
        tex_coords: position,
        clip_position: args.proj * (rotation_only_view * position.extend(1.0)),
    }
}

/// Skybox vertex stage bound to the uniforms of one draw call.
///
/// The rotation-only view is derived once in [`SkyboxVertexTransform::new`] and reused for
/// every invocation.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct SkyboxVertexTransform {
    proj: Mat4,
    rotation_only_view: Mat4,
}

impl SkyboxVertexTransform {
    pub fn new(args: &VertexArgs) -> Self {
        Self {
            proj: args.proj,
            rotation_only_view: drop_translation(args.view),
        }
    }

    /// View matrix actually used by the stage.
    pub fn rotation_only_view(&self) -> Mat4 {
        self.rotation_only_view
    }

    /// Transforms one vertex.
    pub fn apply(&self, position: Vec3) -> VertexOutput {
        // Same association order as `transform` so both agree bit-for-bit.
        VertexOutput {
            tex_coords: position,
            clip_position: self.proj * (self.rotation_only_view * position.extend(1.0)),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::f32::consts::FRAC_PI_2;

    fn assert_vec4_close(a: Vec4, b: Vec4) {
        assert!(a.abs_diff_eq(b, 1e-5), "{a:?} != {b:?}");
    }

    fn camera_proj() -> Mat4 {
        Mat4::perspective_rh_gl(60f32.to_radians(), 16.0 / 9.0, 0.1, 100.0)
    }

    #[test]
    fn identity_uniforms_pass_point_through() {
        let out = transform(Vec3::X, &VertexArgs::identity());
        assert_eq!(out.tex_coords, Vec3::new(1.0, 0.0, 0.0));
        assert_eq!(out.clip_position, Vec4::new(1.0, 0.0, 0.0, 1.0));
    }

    #[test]
    fn translation_only_view_reduces_to_identity() {
        let view = Mat4::from_translation(Vec3::splat(5.0));
        assert_eq!(drop_translation(view), Mat4::IDENTITY);
    }

    #[test]
    fn drop_translation_keeps_rotation_block() {
        let rotation = Mat4::from_rotation_y(0.7) * Mat4::from_rotation_x(-0.3);
        let view = Mat4::from_translation(Vec3::new(-4.0, 2.0, 9.0)) * rotation;
        let stripped = drop_translation(view);
        assert_eq!(Mat3::from_mat4(stripped), Mat3::from_mat4(view));
        assert_eq!(stripped.w_axis, Vec4::W);
        assert_eq!(stripped.row(3), Vec4::W);
    }

    #[test]
    fn clip_position_ignores_camera_translation() {
        let rotation = Mat4::from_rotation_y(0.4) * Mat4::from_rotation_z(1.1);
        let view_a = Mat4::from_translation(Vec3::new(1.0, 2.0, 3.0)) * rotation;
        let view_b = Mat4::from_translation(Vec3::new(-250.0, 0.5, 42.0)) * rotation;
        let proj = camera_proj();
        let p = Vec3::new(-1.0, 1.0, -1.0);

        assert_eq!(drop_translation(view_a), drop_translation(view_b));
        let a = transform(p, &VertexArgs::new(proj, view_a));
        let b = transform(p, &VertexArgs::new(proj, view_b));
        assert_eq!(a.clip_position, b.clip_position);
    }

    #[test]
    fn direction_is_bit_exact_input() {
        let args = VertexArgs::new(
            camera_proj(),
            Mat4::from_translation(Vec3::new(3.0, -1.0, 7.5)) * Mat4::from_rotation_x(0.25),
        );
        for p in [
            Vec3::new(0.1, 0.2, 0.3),
            Vec3::new(-1.0e-30, 3.5e20, -0.0),
            Vec3::new(f32::MIN_POSITIVE, -7.0, 1.0 / 3.0),
        ] {
            let out = transform(p, &args);
            assert_eq!(out.tex_coords.x.to_bits(), p.x.to_bits());
            assert_eq!(out.tex_coords.y.to_bits(), p.y.to_bits());
            assert_eq!(out.tex_coords.z.to_bits(), p.z.to_bits());
        }
    }

    #[test]
    fn camera_rotation_rotates_clip_position() {
        // A camera yawed to face +X sees that side of the cube straight ahead.
        let view = Mat4::from_rotation_y(-FRAC_PI_2).inverse();
        let out = transform(Vec3::X, &VertexArgs::new(Mat4::IDENTITY, view));
        assert_vec4_close(out.clip_position, Vec4::new(0.0, 0.0, -1.0, 1.0));

        let theta = 0.6f32;
        let rotated = transform(
            Vec3::new(0.3, -0.2, -1.0),
            &VertexArgs::new(Mat4::IDENTITY, Mat4::from_rotation_z(theta)),
        );
        let expected = Mat4::from_rotation_z(theta) * Vec4::new(0.3, -0.2, -1.0, 1.0);
        assert_vec4_close(rotated.clip_position, expected);
    }

    #[test]
    fn w_comes_from_projection_without_divide() {
        let proj = camera_proj();
        let view =
            Mat4::from_translation(Vec3::new(0.0, 0.0, -12.0)) * Mat4::from_rotation_x(0.5);
        let p = Vec3::new(0.5, -1.0, -1.0);
        let out = transform(p, &VertexArgs::new(proj, view));

        let eye = drop_translation(view) * p.extend(1.0);
        assert!((out.clip_position.w - proj.row(3).dot(eye)).abs() < 1e-5);
        // GL-style perspective puts -z_eye into w.
        assert!((out.clip_position.w + eye.z).abs() < 1e-5);
        assert_ne!(out.clip_position.w, 1.0);
    }

    #[test]
    fn cached_stage_matches_uncached_transform() {
        let args = VertexArgs::new(
            camera_proj(),
            Mat4::from_translation(Vec3::new(8.0, 1.0, -3.0)) * Mat4::from_rotation_y(2.2),
        );
        let stage = SkyboxVertexTransform::new(&args);
        assert_eq!(stage.rotation_only_view(), drop_translation(args.view));
        for p in [Vec3::X, Vec3::NEG_Y, Vec3::new(1.0, -1.0, 1.0)] {
            assert_eq!(stage.apply(p), transform(p, &args));
        }
    }
}
