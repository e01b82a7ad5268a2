pub mod animate;
pub mod config;
pub mod info;
pub mod render;

use std::path::Path;
use std::sync::Arc;

use anyhow::{Context, Result};
use tessview_core::config::SceneConfig;
use tessview_core::illustration::{build_from_scene, Illustration};
use tessview_core::report::TracingReporter;

/// Read a scene file and build its illustration.
pub fn load_scene(path: &Path) -> Result<(SceneConfig, Illustration)> {
    let contents = std::fs::read_to_string(path)
        .with_context(|| format!("Failed to read scene {}", path.display()))?;
    let scene = SceneConfig::from_toml_str(&contents).context("Invalid scene file")?;
    let reporter = Arc::new(TracingReporter::with_prefix("tessview"));
    let illustration = build_from_scene(&scene, reporter)
        .with_context(|| format!("Failed to build scene {}", path.display()))?;
    Ok((scene, illustration))
}
