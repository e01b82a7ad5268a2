#[allow(dead_code)]
mod common;

use ndarray::Array3;
use tessview_core::colorscale::ColorScale;
use tessview_core::config::{
    AnimationOptions, FigureConfig, IllustrationConfig, TimeseriesConfig, ZoomConfig,
};
use tessview_core::consts::OUTLINE_ZORDER;
use tessview_core::error::TessviewError;
use tessview_core::illustration::layouts::{self, ImageInput, TimeseriesInput, ZoomInput};
use tessview_core::illustration::PlotState;
use tessview_core::panel::Panel;
use tessview_core::sequence::{LightCurve, Sequence};

fn small_config() -> IllustrationConfig {
    IllustrationConfig {
        figure: FigureConfig {
            width: 120,
            height: 80,
        },
        ..IllustrationConfig::default()
    }
}

fn images(names: &[&str], frames: usize, cadence: f64) -> Vec<ImageInput> {
    names
        .iter()
        .map(|n| ImageInput::new(*n, common::ramp_sequence(frames, 10, 10, cadence)))
        .collect()
}

fn empty_image(name: &str) -> ImageInput {
    ImageInput::new(name, Sequence::from_cube(Array3::zeros((0, 10, 10)), None).unwrap())
}

fn zoom(name: &str, source: &str) -> ZoomInput {
    ZoomInput::new(
        name,
        ZoomConfig {
            source: source.into(),
            position: (5.0, 5.0),
            size: (4, 4),
            factor: 2.0,
            ..ZoomConfig::default()
        },
    )
}

#[test]
fn shared_colorbar_is_drawn_once() {
    let mut illustration = layouts::generic(
        images(&["a", "b", "c"], 3, 1.0),
        Vec::new(),
        Vec::new(),
        IllustrationConfig::default(),
        common::silent(),
    )
    .unwrap();
    illustration.plot().unwrap();
    assert_eq!(illustration.figure().colorbar_count(), 1);
    assert!(illustration.shared_colorbar().is_some());

    illustration.plot_at(Some(2.0)).unwrap();
    assert_eq!(illustration.figure().colorbar_count(), 1);
}

#[test]
fn per_panel_colorbars_without_sharing() {
    let config = IllustrationConfig {
        share_colorscale: false,
        share_colorbar: false,
        ..IllustrationConfig::default()
    };
    let mut illustration = layouts::generic(
        images(&["a", "b"], 2, 1.0),
        Vec::new(),
        Vec::new(),
        config,
        common::silent(),
    )
    .unwrap();
    illustration.plot().unwrap();
    assert_eq!(illustration.figure().colorbar_count(), 2);
    assert!(illustration.shared_scale().is_none());
}

#[test]
fn time_grid_merges_images_and_lightcurves() {
    let mut illustration = layouts::generic(
        images(&["img"], 4, 2.0),
        Vec::new(),
        vec![TimeseriesInput::new("lc", TimeseriesConfig::default())],
        IllustrationConfig::default(),
        common::silent(),
    )
    .unwrap();
    illustration
        .plot_series("lc", LightCurve::new(vec![0.0, 3.0, 6.0], vec![1.0, 2.0, 3.0]))
        .unwrap();

    let grid = illustration.resolve_time_grid(Some(1.0));
    assert_eq!(grid.times, vec![0.0, 2.0, 3.0, 4.0, 6.0]);
    assert_eq!(grid.cadence, Some(1.0));
}

#[test]
fn plot_series_checks_panel_kind() {
    let mut illustration = layouts::generic(
        images(&["img"], 2, 1.0),
        Vec::new(),
        Vec::new(),
        IllustrationConfig::default(),
        common::silent(),
    )
    .unwrap();
    let lc = LightCurve::new(vec![0.0], vec![1.0]);
    assert!(matches!(
        illustration.plot_series("img", lc.clone()),
        Err(TessviewError::Config(_))
    ));
    assert!(matches!(
        illustration.plot_series("nope", lc),
        Err(TessviewError::UnknownPanel(_))
    ));
}

#[test]
fn update_tracks_source_frames() {
    let sequence = common::ramp_sequence(5, 50, 50, 2.0);
    let expected: Vec<_> = (0..5).map(|i| sequence.image_at(i).unwrap()).collect();
    let mut illustration = layouts::generic(
        vec![ImageInput::new("cam", sequence)],
        Vec::new(),
        Vec::new(),
        IllustrationConfig::default(),
        common::silent(),
    )
    .unwrap();
    illustration.plot().unwrap();
    assert_eq!(illustration.state(), PlotState::Plotted);

    for (i, time) in [0.0, 2.0, 4.0, 6.0, 8.0].into_iter().enumerate() {
        illustration.update(time).unwrap();
        let panel = illustration.panel("cam").unwrap();
        let image = panel.core().element("image").unwrap();
        assert_eq!(illustration.figure().image_data(image), Some(&expected[i]));
        assert_eq!(panel.core().cursor, Some(i));
    }
    // Already at 8.0: nothing changes.
    assert_eq!(illustration.update(8.0).unwrap(), 0);
}

#[test]
fn update_before_plot_is_an_error() {
    let mut illustration = layouts::generic(
        images(&["img"], 2, 1.0),
        Vec::new(),
        Vec::new(),
        IllustrationConfig::default(),
        common::silent(),
    )
    .unwrap();
    assert!(matches!(illustration.update(0.0), Err(TessviewError::Config(_))));
}

#[test]
fn zoom_outlines_follow_registration_order() {
    let mut illustration = layouts::generic(
        images(&["img"], 3, 1.0),
        vec![zoom("z0", "img"), zoom("z1", "img")],
        Vec::new(),
        IllustrationConfig::default(),
        common::silent(),
    )
    .unwrap();
    illustration.plot().unwrap();

    for (i, name) in ["z0", "z1"].into_iter().enumerate() {
        let panel = illustration.panel(name).unwrap();
        let outline = panel.core().element("outline").unwrap();
        let artist = illustration.figure().artist(outline).unwrap();
        assert_eq!(artist.zorder, OUTLINE_ZORDER + i as i32);
        assert_eq!(artist.axes, Some(illustration.panel("img").unwrap().core().axes));
    }
}

#[test]
fn zoom_follows_source_timestep() {
    let mut illustration = layouts::generic(
        images(&["img"], 3, 1.0),
        vec![zoom("z", "img")],
        Vec::new(),
        IllustrationConfig::default(),
        common::silent(),
    )
    .unwrap();
    illustration.plot().unwrap();
    let id = illustration.panel("z").unwrap().core().element("image").unwrap();
    // Cutout spans columns and rows 3..7 of the source.
    assert_eq!(illustration.figure().image_data(id).unwrap()[[0, 0]], 34.0);

    assert_eq!(illustration.update(2.0).unwrap(), 2);
    assert_eq!(illustration.figure().image_data(id).unwrap()[[0, 0]], 2034.0);
    assert_eq!(illustration.panel("z").unwrap().core().cursor, Some(2));
}

#[test]
fn zoom_source_must_exist_and_come_first() {
    let unknown = layouts::generic(
        images(&["img"], 2, 1.0),
        vec![zoom("z", "missing")],
        Vec::new(),
        IllustrationConfig::default(),
        common::silent(),
    );
    assert!(matches!(unknown, Err(TessviewError::UnknownPanel(_))));

    let not_image = layouts::generic(
        images(&["img"], 2, 1.0),
        vec![zoom("z0", "img"), zoom("z1", "z0")],
        Vec::new(),
        IllustrationConfig::default(),
        common::silent(),
    );
    assert!(matches!(not_image, Err(TessviewError::Config(_))));
}

#[test]
fn duplicate_panel_names_are_rejected() {
    let result = layouts::generic(
        images(&["same", "same"], 2, 1.0),
        Vec::new(),
        Vec::new(),
        IllustrationConfig::default(),
        common::silent(),
    );
    assert!(matches!(result, Err(TessviewError::Config(_))));
}

#[test]
fn vertical_orientation_is_unsupported() {
    let config = IllustrationConfig {
        orientation: "vertical".into(),
        ..IllustrationConfig::default()
    };
    let result = layouts::generic(
        images(&["img"], 2, 1.0),
        Vec::new(),
        Vec::new(),
        config,
        common::silent(),
    );
    assert!(matches!(result, Err(TessviewError::UnsupportedOrientation(_))));
}

#[test]
fn time_labels_are_offset_and_condensed() {
    let shifted = |name: &str| {
        let sequence = Sequence::from_cube(
            common::ramp_cube(3, 10, 10),
            Some(vec![1000.5, 1001.5, 1002.5]),
        )
        .unwrap();
        ImageInput::new(name, sequence)
    };
    let mut illustration = layouts::generic(
        vec![shifted("left"), shifted("right")],
        Vec::new(),
        Vec::new(),
        IllustrationConfig::default(),
        common::silent(),
    )
    .unwrap();
    assert_eq!(illustration.time_offset(), 1000.0);

    let left = illustration.panel("left").unwrap();
    let right = illustration.panel("right").unwrap();
    assert!(left.core().show_time_label);
    assert!(!right.core().show_time_label);

    illustration.plot().unwrap();
    let label = illustration.panel("left").unwrap().core().element("time").unwrap();
    assert_eq!(illustration.figure().text(label), Some("1000 + 0.50000"));
    assert!(illustration.panel("right").unwrap().core().element("time").is_none());
}

#[test]
fn savefig_writes_png_of_figure_size() {
    let dir = tempfile::tempdir().unwrap();
    let path = dir.path().join("still.png");
    let mut illustration = layouts::generic(
        images(&["img"], 2, 1.0),
        Vec::new(),
        Vec::new(),
        small_config(),
        common::silent(),
    )
    .unwrap();
    illustration.savefig(&path).unwrap();

    let still = image::open(&path).unwrap();
    assert_eq!((still.width(), still.height()), (120, 80));
    assert_eq!(illustration.state(), PlotState::Plotted);
}

#[test]
fn animate_gif_writes_one_frame_per_time() {
    let dir = tempfile::tempdir().unwrap();
    let path = dir.path().join("movie.gif");
    let mut illustration = layouts::generic(
        images(&["img"], 3, 1.0),
        Vec::new(),
        Vec::new(),
        small_config(),
        common::silent(),
    )
    .unwrap();

    let mut seen = Vec::new();
    let frames = illustration
        .animate_with_progress(&path, &AnimationOptions::default(), |done, total| {
            seen.push((done, total))
        })
        .unwrap();
    assert_eq!(frames, 3);
    assert_eq!(seen, vec![(1, 3), (2, 3), (3, 3)]);
    assert!(path.exists());
}

#[test]
fn animate_rejects_unknown_extension() {
    let dir = tempfile::tempdir().unwrap();
    let mut illustration = layouts::generic(
        images(&["img"], 2, 1.0),
        Vec::new(),
        Vec::new(),
        small_config(),
        common::silent(),
    )
    .unwrap();
    let result = illustration.animate(&dir.path().join("movie.avi"), &AnimationOptions::default());
    assert!(matches!(result, Err(TessviewError::UnsupportedFormat(_))));
    // Nothing was drawn.
    assert_eq!(illustration.state(), PlotState::Constructed);
}

#[test]
fn four_camera_grid_places_cameras_left_to_right() {
    let illustration = layouts::four_cameras(
        images(&["c1", "c2", "c3", "c4"], 2, 1.0),
        IllustrationConfig::default(),
        common::silent(),
    )
    .unwrap();
    let xs: Vec<u32> = illustration
        .panels()
        .iter()
        .map(|p| illustration.figure().axes(p.core().axes).unwrap().rect.x)
        .collect();
    assert!(xs.windows(2).all(|w| w[0] < w[1]));
    assert!(illustration
        .panels()
        .iter()
        .all(|p| matches!(p, Panel::Imshow(_))));
}

#[test]
fn single_camera_displays_reoriented_frames() {
    let sequence = common::ramp_sequence(5, 50, 50, 2.0);
    let raw: Vec<_> = (0..5).map(|i| sequence.image_at(i).unwrap()).collect();
    let mut illustration = layouts::single_camera(
        1,
        ImageInput::new("cam1", sequence),
        IllustrationConfig::default(),
        common::silent(),
    )
    .unwrap();
    illustration.plot().unwrap();

    for (i, time) in [0.0, 2.0, 4.0, 6.0, 8.0].into_iter().enumerate() {
        illustration.update(time).unwrap();
        let panel = illustration.panel("cam1").unwrap();
        let Panel::Imshow(imshow) = panel else {
            panic!("camera panel is not an image panel");
        };
        let expected = imshow.frame().transform_image(&raw[i]).unwrap();
        let image = panel.core().element("image").unwrap();
        assert_eq!(illustration.figure().image_data(image), Some(&expected));
    }
}

#[test]
fn empty_panel_is_left_out_of_shared_scale() {
    let populated = common::ramp_sequence(3, 10, 10, 1.0);
    let sample: Vec<f32> = populated.image_at(0).unwrap().iter().copied().collect();
    let expected = ColorScale::for_sample(&sample, &small_config().scale);
    assert!(expected.is_some());

    let mut illustration = layouts::generic(
        vec![empty_image("void"), ImageInput::new("img", populated)],
        Vec::new(),
        Vec::new(),
        small_config(),
        common::silent(),
    )
    .unwrap();
    illustration.plot().unwrap();
    assert_eq!(illustration.shared_scale(), expected.as_ref());
    assert!(illustration.panel("void").unwrap().core().element("image").is_none());
    assert!(illustration.panel("img").unwrap().core().element("image").is_some());

    assert_eq!(illustration.update(2.0).unwrap(), 1);
    assert_eq!(illustration.panel("img").unwrap().core().cursor, Some(2));

    let dir = tempfile::tempdir().unwrap();
    let frames = illustration
        .animate(&dir.path().join("gap.gif"), &AnimationOptions::default())
        .unwrap();
    assert_eq!(frames, 3);
}

#[test]
fn zoom_into_empty_source_draws_outline_only() {
    let mut illustration = layouts::generic(
        vec![empty_image("void")],
        vec![zoom("z", "void")],
        Vec::new(),
        small_config(),
        common::silent(),
    )
    .unwrap();
    illustration.plot().unwrap();

    let panel = illustration.panel("z").unwrap();
    assert!(panel.core().element("outline").is_some());
    assert!(panel.core().element("image").is_none());
    assert_eq!(illustration.update(1.0).unwrap(), 0);

    let dir = tempfile::tempdir().unwrap();
    illustration.savefig(&dir.path().join("gap.png")).unwrap();
}
