//! CPU executor for the skybox vertex stage.
//!
//! Every invocation only sees its own position and the uniforms of the draw, so the mesh
//! can be split into arbitrary chunks without changing the result.

use std::thread;

use glam::{Vec3, Vec4};
use log::debug;

use crate::transform::{SkyboxVertexTransform, VertexOutput};
use crate::uniform::VertexArgs;

/// Transforms every position in order on the calling thread.
pub fn run(args: &VertexArgs, positions: &[Vec3]) -> Vec<VertexOutput> {
    let stage = SkyboxVertexTransform::new(args);
    positions.iter().map(|p| stage.apply(*p)).collect()
}

/// Transforms every position using up to `workers` scoped threads.
///
/// Output order matches input order.
pub fn run_parallel(args: &VertexArgs, positions: &[Vec3], workers: usize) -> Vec<VertexOutput> {
    let workers = workers.max(1);
    if workers == 1 || positions.len() < 2 {
        return run(args, positions);
    }

    let stage = SkyboxVertexTransform::new(args);
    let chunk_size = positions.len().div_ceil(workers);
    debug!(
        "running skybox stage over {} vertices in chunks of {chunk_size}",
        positions.len()
    );

    let mut outputs = vec![
        VertexOutput {
            tex_coords: Vec3::ZERO,
            clip_position: Vec4::ZERO,
        };
        positions.len()
    ];
    thread::scope(|scope| {
        for (input, output) in positions
            .chunks(chunk_size)
            .zip(outputs.chunks_mut(chunk_size))
        {
            scope.spawn(move || {
                for (p, out) in input.iter().zip(output.iter_mut()) {
                    *out = stage.apply(*p);
                }
            });
        }
    });
    outputs
}
