use std::path::PathBuf;

use anyhow::{Context, Result};
use clap::Args;

use super::load_scene;
use crate::summary::print_scene_summary;

#[derive(Args)]
pub struct RenderArgs {
    /// Scene file (TOML)
    #[arg(long)]
    pub scene: PathBuf,

    /// Time to show; defaults to each panel's first frame
    #[arg(long)]
    pub time: Option<f64>,

    /// Output image (png, tiff or bmp)
    #[arg(short, long, default_value = "figure.png")]
    pub output: PathBuf,
}

pub fn run(args: &RenderArgs) -> Result<()> {
    let (scene, mut illustration) = load_scene(&args.scene)?;
    print_scene_summary(&scene, &illustration, &args.output);

    illustration.plot_at(args.time)?;
    illustration
        .savefig(&args.output)
        .with_context(|| format!("Failed to save {}", args.output.display()))?;

    println!("\nFigure saved to {}", args.output.display());
    Ok(())
}
