use std::env;
use std::fs;

use anyhow::{anyhow, Context, Result};
use log::info;

use skybox_transform::{stage, CameraDesc, SkyboxMesh, VertexArgs};

const USAGE: &str = "Usage: skybox-transform [scene.xml] [--aspect <f32>] [--mesh <file.obj>] \
                     [--workers <n>] [--summary-only]";

fn main() {
    env_logger::init();
    if let Err(err) = run() {
        eprintln!("Error: {err:?}");
        std::process::exit(1);
    }
}

fn run() -> Result<()> {
    let options = CliOptions::parse(env::args().skip(1))?;

    let mesh = match &options.mesh {
        Some(path) => {
            let contents =
                fs::read_to_string(path).with_context(|| format!("failed to read {path}"))?;
            SkyboxMesh::from_obj_str(&contents)
                .with_context(|| format!("failed to parse OBJ mesh {path}"))?
        }
        None => SkyboxMesh::cube(),
    };

    let camera = match &options.scene {
        Some(path) => {
            let xml =
                fs::read_to_string(path).with_context(|| format!("failed to read {path}"))?;
            CameraDesc::from_scene_xml(&xml).context("failed to parse scene XML")?
        }
        None => None,
    };
    let (source, args) = match &camera {
        Some(camera) => ("scene camera", camera.vertex_args(options.aspect)?),
        None => ("identity", VertexArgs::identity()),
    };

    info!("uniforms ready: {args:?}");

    println!("Skybox mesh with {} vertices ({source} uniforms)", mesh.len());
    if options.summary_only {
        return Ok(());
    }

    let outputs = stage::run_parallel(&args, mesh.positions(), options.workers);
    for (index, out) in outputs.iter().enumerate() {
        let dir = out.tex_coords;
        let clip = out.clip_position;
        println!(
            "v{index} dir=({:.2}, {:.2}, {:.2}) clip=({:.2}, {:.2}, {:.2}, {:.2})",
            dir.x, dir.y, dir.z, clip.x, clip.y, clip.z, clip.w
        );
    }
    Ok(())
}

#[derive(Debug)]
struct CliOptions {
    scene: Option<String>,
    mesh: Option<String>,
    aspect: f32,
    workers: usize,
    summary_only: bool,
}

impl CliOptions {
    fn parse(mut args: impl Iterator<Item = String>) -> Result<Self> {
        let mut options = Self {
            scene: None,
            mesh: None,
            aspect: 16.0 / 9.0,
            workers: 1,
            summary_only: false,
        };
        while let Some(arg) = args.next() {
            match arg.as_str() {
                "--aspect" => {
                    let value = flag_value(&mut args, "--aspect")?;
                    options.aspect = value
                        .parse()
                        .with_context(|| format!("invalid aspect ratio {value}"))?;
                }
                "--mesh" => options.mesh = Some(flag_value(&mut args, "--mesh")?),
                "--workers" => {
                    let value = flag_value(&mut args, "--workers")?;
                    options.workers = value
                        .parse()
                        .with_context(|| format!("invalid worker count {value}"))?;
                }
                "--summary-only" => options.summary_only = true,
                other if other.starts_with("--") => {
                    return Err(anyhow!("Unknown argument: {other}. {USAGE}"));
                }
                _ if options.scene.is_none() => options.scene = Some(arg),
                other => return Err(anyhow!("Unexpected argument: {other}. {USAGE}")),
            }
        }
        Ok(options)
    }
}

fn flag_value(args: &mut impl Iterator<Item = String>, flag: &str) -> Result<String> {
    args.next()
        .ok_or_else(|| anyhow!("{flag} expects a value. {USAGE}"))
}
