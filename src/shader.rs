use std::num::NonZeroU64;

use crate::uniform::VertexArgsStd140;

/// Name of the vertex entry point in [`SKYBOX_VERTEX_WGSL`].
pub const VERTEX_ENTRY_POINT: &str = "vs_main";

/// Binding slot of the `VertexArgs` uniform block inside group 0.
pub const VERTEX_ARGS_BINDING: u32 = 0;

/// GPU version of [`crate::transform`]. Must stay in sync with it.
pub const SKYBOX_VERTEX_WGSL: &str = r#"
struct VertexArgs {
    proj: mat4x4<f32>,
    view: mat4x4<f32>,
}

@group(0) @binding(0)
var<uniform> args: VertexArgs;

struct VertexInput {
    @location(0) position: vec3<f32>,
}

struct VertexOutput {
    @builtin(position) position: vec4<f32>,
    @location(0) tex_coords: vec3<f32>,
}

@vertex
fn vs_main(input: VertexInput) -> VertexOutput {
    var out: VertexOutput;
    out.tex_coords = input.position;
    let rotation_only_view = mat4x4<f32>(
        vec4<f32>(args.view[0].xyz, 0.0),
        vec4<f32>(args.view[1].xyz, 0.0),
        vec4<f32>(args.view[2].xyz, 0.0),
        vec4<f32>(0.0, 0.0, 0.0, 1.0),
    );
    out.position = args.proj * rotation_only_view * vec4<f32>(input.position, 1.0);
    return out;
}
"#;

/// Descriptor for creating the skybox vertex shader module.
pub fn shader_module_descriptor() -> wgpu::ShaderModuleDescriptor<'static> {
    wgpu::ShaderModuleDescriptor {
        label: Some("skybox-vertex-shader"),
        source: wgpu::ShaderSource::Wgsl(SKYBOX_VERTEX_WGSL.into()),
    }
}

/// Layout entry for the `VertexArgs` uniform buffer, visible to the vertex stage only.
pub fn vertex_args_layout_entry() -> wgpu::BindGroupLayoutEntry {
    wgpu::BindGroupLayoutEntry {
        binding: VERTEX_ARGS_BINDING,
        visibility: wgpu::ShaderStages::VERTEX,
        ty: wgpu::BindingType::Buffer {
            ty: wgpu::BufferBindingType::Uniform,
            has_dynamic_offset: false,
            min_binding_size: NonZeroU64::new(VertexArgsStd140::SIZE),
        },
        count: None,
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn wgsl_declares_uniforms_in_host_order() {
        let proj = SKYBOX_VERTEX_WGSL.find("proj: mat4x4<f32>").unwrap();
        let view = SKYBOX_VERTEX_WGSL.find("view: mat4x4<f32>").unwrap();
        assert!(proj < view);
        assert!(SKYBOX_VERTEX_WGSL.contains(&format!("fn {VERTEX_ENTRY_POINT}(")));
        assert!(SKYBOX_VERTEX_WGSL.contains("@location(0) tex_coords: vec3<f32>"));
    }

    #[test]
    fn wgsl_parses_and_validates() {
        let module = naga::front::wgsl::parse_str(SKYBOX_VERTEX_WGSL)
            .unwrap_or_else(|err| panic!("{}", err.emit_to_string(SKYBOX_VERTEX_WGSL)));
        naga::valid::Validator::new(
            naga::valid::ValidationFlags::all(),
            naga::valid::Capabilities::empty(),
        )
        .validate(&module)
        .expect("skybox vertex shader validates");

        assert_eq!(module.entry_points.len(), 1);
        let entry = &module.entry_points[0];
        assert_eq!(entry.name, VERTEX_ENTRY_POINT);
        assert_eq!(entry.stage, naga::ShaderStage::Vertex);

        let uniforms: Vec<_> = module
            .global_variables
            .iter()
            .filter(|(_, var)| var.space == naga::AddressSpace::Uniform)
            .map(|(_, var)| var.binding.clone())
            .collect();
        assert_eq!(
            uniforms,
            vec![Some(naga::ResourceBinding {
                group: 0,
                binding: VERTEX_ARGS_BINDING,
            })]
        );
    }

    #[test]
    fn layout_entry_covers_whole_block() {
        let entry = vertex_args_layout_entry();
        assert_eq!(entry.binding, VERTEX_ARGS_BINDING);
        assert_eq!(entry.visibility, wgpu::ShaderStages::VERTEX);
        match entry.ty {
            wgpu::BindingType::Buffer {
                ty: wgpu::BufferBindingType::Uniform,
                min_binding_size,
                ..
            } => assert_eq!(min_binding_size.map(NonZeroU64::get), Some(128)),
            other => panic!("unexpected binding type {other:?}"),
        }
    }

    #[test]
    fn module_descriptor_uses_wgsl_source() {
        let descriptor = shader_module_descriptor();
        assert_eq!(descriptor.label, Some("skybox-vertex-shader"));
        assert!(matches!(descriptor.source, wgpu::ShaderSource::Wgsl(_)));
    }
}
