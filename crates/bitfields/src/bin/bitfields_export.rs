//! Headless build + export.
//!
//! ```text
//! bitfields-export --catalog palettes.json --seed 7 --output out/
//! bitfields-export --catalog palettes.json --config world.toml --json --preview shot.png
//! ```
//!
//! Never opens a GPU device. The preview is a CPU ray-marched frame.

use std::path::PathBuf;

use anyhow::{Context, Result};
use bitfields::procedural::WorldSeed;
use bitfields::rendering::CameraState;
use bitfields::shared::{GridDimensions, WorldConfig};
use bitfields::{Engine, MemoryCatalog};
use clap::Parser;
use glam::Vec3;
use tracing_subscriber::EnvFilter;

#[derive(Parser)]
#[command(name = "bitfields-export")]
#[command(about = "Build a procedural voxel bitfield and export it", long_about = None)]
struct Cli {
    /// Palette catalog JSON, keyed by color count
    #[arg(short, long)]
    catalog: PathBuf,

    /// World config TOML. Defaults apply when omitted
    #[arg(long)]
    config: Option<PathBuf>,

    /// Grid override as XxYxZ, e.g. 64x128x64
    #[arg(short, long, value_parser = parse_grid)]
    grid: Option<GridDimensions>,

    /// Root seed
    #[arg(short, long, default_value_t = 0)]
    seed: u64,

    /// Directory the export table is written to
    #[arg(short, long, default_value = ".")]
    output: PathBuf,

    /// Print stats as JSON instead of text
    #[arg(long)]
    json: bool,

    /// Also write a CPU-rendered PNG here
    #[arg(long)]
    preview: Option<PathBuf>,

    /// Preview width in pixels
    #[arg(long, default_value_t = 512)]
    width: u32,

    /// Preview height in pixels
    #[arg(long, default_value_t = 512)]
    height: u32,

    /// Preview eye position as x,y,z. Framed automatically when omitted
    #[arg(long, value_parser = parse_vec3, allow_hyphen_values = true)]
    eye: Option<Vec3>,
}

fn main() -> Result<()> {
    tracing_subscriber::fmt()
        .with_env_filter(EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info")))
        .init();

    let cli = Cli::parse();

    let catalog = MemoryCatalog::load(&cli.catalog)
        .with_context(|| format!("loading catalog {}", cli.catalog.display()))?;
    let mut config = match &cli.config {
        Some(path) => WorldConfig::load(path).with_context(|| format!("loading config {}", path.display()))?,
        None => WorldConfig::default(),
    };
    if let Some(grid) = cli.grid {
        config = config.with_grid(grid);
    }

    let engine = Engine::headless(catalog, WorldSeed::new(cli.seed));
    let scene = engine.build(&config).context("building world")?;

    let stats = engine.get_stats()?;
    if cli.json {
        println!("{}", serde_json::to_string_pretty(&stats)?);
    } else {
        println!("palette      {}", stats.palette_name);
        println!("grid         {}", stats.grid);
        println!("states       {} filled + {} transparent = {}", stats.filled, stats.transparent, stats.total_states);
        println!("voxels       {}", stats.voxel_count);
        println!("pattern      {}", stats.pattern);
    }

    std::fs::create_dir_all(&cli.output)
        .with_context(|| format!("creating {}", cli.output.display()))?;
    let path = engine.write_export(&cli.output)?;
    println!("export       {}", path.display());

    if let Some(preview) = &cli.preview {
        if let Some(eye) = cli.eye {
            #[allow(clippy::cast_precision_loss)]
            let aspect = cli.width.max(1) as f32 / cli.height.max(1) as f32;
            let target = scene.world().bounds().center();
            engine.update_camera(CameraState::look_at(eye, target, 50f32.to_radians(), aspect));
        }
        let frame = engine.render_cpu(cli.width, cli.height)?;
        let bytes: Vec<u8> = frame.iter().flatten().copied().collect();
        image::save_buffer(
            preview,
            &bytes,
            cli.width.max(1),
            cli.height.max(1),
            image::ColorType::Rgba8,
        )
        .with_context(|| format!("writing preview {}", preview.display()))?;
        println!("preview      {}", preview.display());
    }

    Ok(())
}

fn parse_grid(text: &str) -> Result<GridDimensions, String> {
    let parts: Vec<u32> = text
        .split(['x', 'X'])
        .map(|p| p.trim().parse::<u32>().map_err(|e| format!("{p:?}: {e}")))
        .collect::<Result<_, _>>()?;
    match parts.as_slice() {
        &[x, y, z] => GridDimensions::new(x, y, z)
            .validate()
            .map_err(|e| e.to_string()),
        _ => Err(format!("expected XxYxZ, got {text:?}")),
    }
}

fn parse_vec3(text: &str) -> Result<Vec3, String> {
    let parts: Vec<f32> = text
        .split(',')
        .map(|p| p.trim().parse::<f32>().map_err(|e| format!("{p:?}: {e}")))
        .collect::<Result<_, _>>()?;
    match parts.as_slice() {
        &[x, y, z] => Ok(Vec3::new(x, y, z)),
        _ => Err(format!("expected x,y,z, got {text:?}")),
    }
}
