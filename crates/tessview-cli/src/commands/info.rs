use anyhow::{Context, Result};
use clap::Args;
use tessview_core::illustration::min_positive_gap;
use tessview_core::sequence::{Sequence, Source};

#[derive(Args)]
pub struct InfoArgs {
    /// FITS files, or one quoted wildcard pattern
    #[arg(required = true)]
    pub inputs: Vec<String>,

    /// HDU holding the image data
    #[arg(long, default_value = "0")]
    pub extension: usize,
}

pub fn run(args: &InfoArgs) -> Result<()> {
    let source = Source::from_inputs(&args.inputs, args.extension);
    let kind = source.kind();
    let sequence = Sequence::from_source(source).context("Failed to build image sequence")?;
    let (rows, cols) = sequence.shape();

    println!("Source:      {kind}");
    println!("Frames:      {}", sequence.len());
    println!("Dimensions:  {cols}x{rows}");

    let times = sequence.times();
    if sequence.is_synthetic_time() {
        println!("Time:        frame index (no time keywords found)");
    } else if let (Some(first), Some(last)) = (times.first(), times.last()) {
        println!("Time range:  {first:.6} .. {last:.6}");
        println!("Span:        {:.6}", last - first);
    }
    match min_positive_gap(times) {
        Some(cadence) => println!("Cadence:     {cadence:.6}"),
        None => println!("Cadence:     n/a"),
    }

    Ok(())
}
