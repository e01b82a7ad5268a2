use std::path::PathBuf;

use anyhow::{Context, Result};
use clap::Args;
use indicatif::{ProgressBar, ProgressStyle};

use super::load_scene;
use crate::summary::print_scene_summary;

#[derive(Args)]
pub struct AnimateArgs {
    /// Scene file (TOML)
    #[arg(long)]
    pub scene: PathBuf,

    /// Frames per second; overrides the scene file
    #[arg(long)]
    pub fps: Option<u32>,

    /// Time step between movie frames; overrides the scene file
    #[arg(long)]
    pub cadence: Option<f64>,

    /// First time to show; overrides the scene file
    #[arg(long)]
    pub mintime: Option<f64>,

    /// Length of the animated time window; overrides the scene file
    #[arg(long)]
    pub maxtimespan: Option<f64>,

    /// Output movie (mp4 or gif)
    #[arg(short, long, default_value = "movie.mp4")]
    pub output: PathBuf,
}

pub fn run(args: &AnimateArgs) -> Result<()> {
    let (scene, mut illustration) = load_scene(&args.scene)?;
    print_scene_summary(&scene, &illustration, &args.output);

    let mut options = scene.animation.clone();
    if let Some(fps) = args.fps {
        options.fps = fps;
    }
    if args.cadence.is_some() {
        options.cadence = args.cadence;
    }
    if args.mintime.is_some() {
        options.mintime = args.mintime;
    }
    if args.maxtimespan.is_some() {
        options.maxtimespan = args.maxtimespan;
    }

    let pb = ProgressBar::new(0);
    pb.set_style(
        ProgressStyle::default_bar()
            .template("{msg:20} [{bar:40}] {pos}/{len}")?
            .progress_chars("=> "),
    );
    pb.set_message("Rendering");

    let frames = illustration
        .animate_with_progress(&args.output, &options, |done, total| {
            pb.set_length(total as u64);
            pb.set_position(done as u64);
        })
        .with_context(|| format!("Failed to animate into {}", args.output.display()))?;

    pb.finish_with_message("Done");
    println!("\n{frames} frames written to {}", args.output.display());
    Ok(())
}
