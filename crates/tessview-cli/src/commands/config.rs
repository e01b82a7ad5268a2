use std::path::PathBuf;

use anyhow::{Context, Result};
use clap::Args;
use tessview_core::config::{
    AnimationOptions, IllustrationConfig, ImagePanelSpec, ImshowConfig, LayoutKind, SceneConfig,
    ZoomConfig, ZoomPanelSpec,
};

#[derive(Args)]
pub struct ConfigArgs {
    /// Write the scene to a file instead of stdout
    #[arg(short, long)]
    pub output: Option<PathBuf>,
}

/// Print or save an example single-camera scene with one zoom.
pub fn run(args: &ConfigArgs) -> Result<()> {
    let scene = SceneConfig {
        layout: LayoutKind::SingleCamera { camera: 1 },
        images: vec![ImagePanelSpec {
            name: "cam1".into(),
            inputs: vec!["ffi/*.fits".into()],
            extension: 1,
            imshow: ImshowConfig::default(),
        }],
        zooms: vec![ZoomPanelSpec {
            name: "zoom".into(),
            zoom: ZoomConfig {
                source: "cam1".into(),
                position: (1024.0, 1024.0),
                ..ZoomConfig::default()
            },
        }],
        timeseries: vec![],
        illustration: IllustrationConfig::default(),
        animation: AnimationOptions::default(),
    };
    let toml_str = toml::to_string_pretty(&scene)?;

    if let Some(ref path) = args.output {
        std::fs::write(path, &toml_str)
            .with_context(|| format!("Failed to write scene to {}", path.display()))?;
        println!("Example scene saved to {}", path.display());
    } else {
        print!("{}", toml_str);
    }

    Ok(())
}
