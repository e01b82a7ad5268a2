use std::path::Path;
use std::sync::Arc;

use tracing::debug;

use crate::config::{LayoutKind, SceneConfig};
use crate::error::{Result, TessviewError};
use crate::report::Reporter;
use crate::sequence::{LightCurve, Sequence, Source};

use super::layouts::{self, ImageInput, TimeseriesInput, ZoomInput};
use super::Illustration;

/// Load every input named by `scene` and assemble its illustration.
/// Light curves listed for timeseries panels are plotted immediately.
pub fn build_from_scene(scene: &SceneConfig, reporter: Arc<dyn Reporter>) -> Result<Illustration> {
    let mut images = Vec::with_capacity(scene.images.len());
    for spec in &scene.images {
        let source = Source::from_inputs(&spec.inputs, spec.extension);
        let sequence = Sequence::from_source(source)?;
        debug!(panel = %spec.name, frames = sequence.len(), "loaded image panel");
        images.push(ImageInput::new(spec.name.clone(), sequence).with_config(spec.imshow.clone()));
    }
    let mut zooms: Vec<ZoomInput> = scene
        .zooms
        .iter()
        .map(|z| ZoomInput::new(z.name.clone(), z.zoom.clone()))
        .collect();
    let config = scene.illustration.clone();

    let mut illustration = match scene.layout {
        LayoutKind::SingleCamera { camera } => {
            let image = exactly_one(images)?;
            if zooms.len() > 1 {
                reporter.warning("single-camera layout shows one zoom; extra zooms are ignored");
            }
            if zooms.is_empty() {
                layouts::single_camera(camera, image, config, reporter.clone())?
            } else {
                let zoom = zooms.swap_remove(0);
                layouts::single_camera_with_zoom(camera, image, zoom, config, reporter.clone())?
            }
        }
        LayoutKind::FourCameras => layouts::four_cameras(images, config, reporter.clone())?,
        LayoutKind::CameraOfCcds { camera } => {
            layouts::camera_of_ccds(camera, images, config, reporter.clone())?
        }
        LayoutKind::Generic => {
            let timeseries = scene
                .timeseries
                .iter()
                .map(|t| TimeseriesInput::new(t.name.clone(), t.timeseries.clone()))
                .collect();
            layouts::generic(images, zooms, timeseries, config, reporter.clone())?
        }
    };

    if !matches!(scene.layout, LayoutKind::Generic) {
        if !scene.timeseries.is_empty() {
            reporter.warning("timeseries panels are only placed by the generic layout; ignoring them");
        }
        return Ok(illustration);
    }
    for spec in &scene.timeseries {
        for path in &spec.lightcurves {
            let lightcurve = read_lightcurve(path)?;
            illustration.plot_series(&spec.name, lightcurve)?;
        }
    }
    Ok(illustration)
}

fn exactly_one(mut images: Vec<ImageInput>) -> Result<ImageInput> {
    if images.len() != 1 {
        return Err(TessviewError::Config(format!(
            "single-camera layout needs 1 image panel, got {}",
            images.len()
        )));
    }
    images
        .pop()
        .ok_or_else(|| TessviewError::Config("single-camera layout needs an image panel".into()))
}

/// Read a two-column `time flux` text file. Columns are separated by
/// whitespace or commas; blank lines and `#` comments are skipped.
pub fn read_lightcurve(path: &Path) -> Result<LightCurve> {
    let contents = std::fs::read_to_string(path)?;
    let mut time = Vec::new();
    let mut flux = Vec::new();
    for (number, line) in contents.lines().enumerate() {
        let line = line.trim();
        if line.is_empty() || line.starts_with('#') {
            continue;
        }
        let mut fields = line
            .split(|c: char| c == ',' || c.is_whitespace())
            .filter(|f| !f.is_empty());
        let (Some(t), Some(f)) = (fields.next(), fields.next()) else {
            return Err(TessviewError::Config(format!(
                "{}:{}: expected two columns",
                path.display(),
                number + 1
            )));
        };
        let parse = |field: &str| {
            field.parse::<f64>().map_err(|e| {
                TessviewError::Config(format!("{}:{}: {e}", path.display(), number + 1))
            })
        };
        time.push(parse(t)?);
        flux.push(parse(f)?);
    }
    Ok(LightCurve {
        time,
        flux,
        label: path.file_stem().map(|s| s.to_string_lossy().into_owned()),
    })
}
