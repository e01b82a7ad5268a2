mod commands;
mod summary;

use anyhow::Result;
use clap::{Parser, Subcommand};
use tracing_subscriber::EnvFilter;

#[derive(Parser)]
#[command(name = "tessview", about = "Figures and movies of TESS pixel data")]
#[command(version)]
struct Cli {
    /// Enable verbose output
    #[arg(short, long, global = true)]
    verbose: bool,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Show frame count, shape and time coverage of an image sequence
    Info(commands::info::InfoArgs),
    /// Print or save an example scene file
    Config(commands::config::ConfigArgs),
    /// Render a scene to a still image
    Render(commands::render::RenderArgs),
    /// Animate a scene into an MP4 or GIF
    Animate(commands::animate::AnimateArgs),
}

fn main() -> Result<()> {
    let cli = Cli::parse();

    let filter = if cli.verbose {
        EnvFilter::new("debug")
    } else {
        EnvFilter::new("warn")
    };
    tracing_subscriber::fmt().with_env_filter(filter).init();

    match &cli.command {
        Commands::Info(args) => commands::info::run(args),
        Commands::Config(args) => commands::config::run(args),
        Commands::Render(args) => commands::render::run(args),
        Commands::Animate(args) => commands::animate::run(args),
    }
}
