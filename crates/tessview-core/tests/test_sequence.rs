#[allow(dead_code)]
mod common;

use approx::assert_relative_eq;
use ndarray::{Array2, Array3, Axis, IxDyn};
use tempfile::TempDir;

use tessview_core::error::TessviewError;
use tessview_core::sequence::{FitsImage, PixelFile, PixelStamp, Sequence, Source};

#[test]
fn array_sources_keep_frame_shape() {
    let flat = Array2::<f32>::ones((7, 9)).into_dyn();
    let seq = Sequence::from_source(Source::Array(flat)).unwrap();
    assert_eq!(seq.len(), 1);
    assert_eq!(seq.image_at(0).unwrap().dim(), (7, 9));

    let cube = common::ramp_cube(4, 5, 6).into_dyn();
    let seq = Sequence::from_source(Source::Array(cube)).unwrap();
    assert_eq!(seq.len(), 4);
    assert_eq!(seq.image_at(3).unwrap().dim(), (5, 6));
    assert!(seq.is_synthetic_time());
}

#[test]
fn four_dimensional_array_is_rejected() {
    let array = ndarray::ArrayD::<f32>::zeros(IxDyn(&[2, 2, 2, 2]));
    assert!(matches!(
        Sequence::from_source(Source::Array(array)),
        Err(TessviewError::Shape(_))
    ));
}

#[test]
fn unknown_source_is_rejected() {
    assert!(matches!(
        Sequence::from_source(Source::Unknown("a pickle".into())),
        Err(TessviewError::UnsupportedSource(_))
    ));
    assert!(matches!(
        Sequence::from_source(Source::from_inputs(&[], 0)),
        Err(TessviewError::UnsupportedSource(_))
    ));
}

#[test]
fn single_fits_path() {
    let dir = TempDir::new().unwrap();
    let image = common::ramp_cube(1, 6, 8).index_axis(Axis(0), 0).to_owned();
    let path = common::write_fits_image(dir.path(), "one.fits", &image, Some(12.5));

    let seq = Sequence::from_source(Source::FitsPaths {
        paths: vec![path],
        extension: 0,
    })
    .unwrap();
    assert_eq!(seq.len(), 1);
    assert_eq!(seq.shape(), (6, 8));
    assert_eq!(seq.times(), &[12.5]);
    assert_eq!(seq.image_at(0).unwrap(), image);
}

#[test]
fn fits_path_list_is_sorted_by_time() {
    let dir = TempDir::new().unwrap();
    let cube = common::ramp_cube(3, 4, 5);
    let frame = |t: usize| cube.index_axis(Axis(0), t).to_owned();
    let late = common::write_fits_image(dir.path(), "a.fits", &frame(2), Some(30.0));
    let early = common::write_fits_image(dir.path(), "b.fits", &frame(0), Some(10.0));
    let mid = common::write_fits_image(dir.path(), "c.fits", &frame(1), Some(20.0));

    let seq = Sequence::from_source(Source::FitsPaths {
        paths: vec![late, early, mid],
        extension: 0,
    })
    .unwrap();
    assert_eq!(seq.times(), &[10.0, 20.0, 30.0]);
    assert!(!seq.is_synthetic_time());
    for t in 0..3 {
        assert_eq!(seq.image_at(t).unwrap(), frame(t));
    }
}

#[test]
fn fits_glob_matches_files() {
    let dir = TempDir::new().unwrap();
    let cube = common::ramp_cube(3, 4, 4);
    for t in 0..3 {
        let frame = cube.index_axis(Axis(0), t).to_owned();
        common::write_fits_image(dir.path(), &format!("frame{t}.fits"), &frame, None);
    }
    common::write_fits_image(dir.path(), "other.fit", &Array2::zeros((4, 4)), None);

    let pattern = format!("{}/frame*.fits", dir.path().display());
    let seq = Sequence::from_source(Source::from_inputs(&[pattern], 0)).unwrap();
    assert_eq!(seq.len(), 3);
    assert!(seq.is_synthetic_time());
    assert_eq!(seq.image_at(2).unwrap(), cube.index_axis(Axis(0), 2));
}

#[test]
fn fits_glob_wildcards_span_directories() {
    let dir = TempDir::new().unwrap();
    let cube = common::ramp_cube(2, 3, 3);
    for (t, day) in ["day1", "day2"].iter().enumerate() {
        let sub = dir.path().join(day);
        std::fs::create_dir(&sub).unwrap();
        let frame = cube.index_axis(Axis(0), t).to_owned();
        common::write_fits_image(&sub, "a.fits", &frame, Some(t as f64));
    }
    std::fs::create_dir(dir.path().join("night1")).unwrap();
    common::write_fits_image(
        &dir.path().join("night1"),
        "a.fits",
        &Array2::zeros((3, 3)),
        Some(9.0),
    );

    let pattern = format!("{}/day*/*.fits", dir.path().display());
    let seq = Sequence::from_source(Source::from_inputs(&[pattern], 0)).unwrap();
    assert_eq!(seq.times(), &[0.0, 1.0]);
    assert_eq!(seq.image_at(1).unwrap(), cube.index_axis(Axis(0), 1));
}

#[test]
fn header_time_prefers_exposure_midpoint_over_time_keyword() {
    let dir = TempDir::new().unwrap();
    let image = Array2::<f32>::ones((2, 2));
    let both = common::write_fits_with_keys(
        dir.path(),
        "both.fits",
        &image,
        &[("TIME", 50.0), ("TSTART", 10.0), ("TSTOP", 12.0)],
    );
    let only_time = common::write_fits_with_keys(dir.path(), "time.fits", &image, &[("TIME", 50.0)]);
    let all = common::write_fits_with_keys(
        dir.path(),
        "all.fits",
        &image,
        &[("MIDTIME", 30.0), ("TIME", 50.0), ("TSTART", 10.0), ("TSTOP", 12.0)],
    );

    let time_of = |path| {
        let seq = Sequence::from_source(Source::FitsPaths {
            paths: vec![path],
            extension: 0,
        })
        .unwrap();
        seq.times()[0]
    };
    assert_relative_eq!(time_of(both), 11.0);
    assert_relative_eq!(time_of(only_time), 50.0);
    assert_relative_eq!(time_of(all), 30.0);
}

#[test]
fn empty_glob_is_an_error() {
    let dir = TempDir::new().unwrap();
    let pattern = format!("{}/*.fits", dir.path().display());
    assert!(matches!(
        Sequence::from_source(Source::from_inputs(&[pattern], 0)),
        Err(TessviewError::UnsupportedSource(_))
    ));
}

#[test]
fn fits_cube_file_is_loaded_whole() {
    let dir = TempDir::new().unwrap();
    let cube = common::ramp_cube(4, 3, 5);
    let path = common::write_fits_cube(dir.path(), "cube.fits", &cube);

    let seq = Sequence::from_source(Source::FitsPaths {
        paths: vec![path],
        extension: 0,
    })
    .unwrap();
    assert_eq!(seq.len(), 4);
    assert_eq!(seq.shape(), (3, 5));
    assert_eq!(seq.image_at(1).unwrap(), cube.index_axis(Axis(0), 1));
}

#[test]
fn mismatched_fits_shapes_are_rejected() {
    let dir = TempDir::new().unwrap();
    let a = common::write_fits_image(dir.path(), "a.fits", &Array2::zeros((4, 4)), None);
    let b = common::write_fits_image(dir.path(), "b.fits", &Array2::zeros((4, 5)), None);
    assert!(matches!(
        Sequence::from_source(Source::FitsPaths {
            paths: vec![a, b],
            extension: 0,
        }),
        Err(TessviewError::Shape(_))
    ));
}

#[test]
fn decoded_hdus_and_stamps() {
    let images = vec![
        FitsImage {
            data: Array2::from_elem((3, 3), 2.0),
            time: Some(5.0),
        },
        FitsImage {
            data: Array2::from_elem((3, 3), 1.0),
            time: Some(4.0),
        },
    ];
    let seq = Sequence::from_source(Source::FitsHdus(images)).unwrap();
    assert_eq!(seq.times(), &[4.0, 5.0]);
    assert_eq!(seq.image_at(0).unwrap()[[0, 0]], 1.0);

    let stamp = PixelStamp {
        cube: common::ramp_cube(2, 5, 5),
        times: vec![100.0, 100.5],
    };
    let seq = Sequence::from_source(Source::Stamp(stamp)).unwrap();
    assert_eq!(seq.image_at(0).unwrap().dim(), (5, 5));
}

#[test]
fn pixel_file_drops_flagged_cadences() {
    let file = PixelFile {
        flux: common::ramp_cube(4, 2, 2),
        times: vec![0.0, 1.0, f64::NAN, 3.0],
        quality: vec![0, 8, 0, 0],
    };
    let seq = Sequence::from_source(Source::PixelFile(file)).unwrap();
    assert_eq!(seq.times(), &[0.0, 3.0]);
    assert_eq!(seq.image_at(1).unwrap()[[0, 0]], 3001.0);
}

#[test]
fn nearest_timestep_picks_closest() {
    let seq = common::ramp_sequence(5, 2, 2, 2.0);
    assert_eq!(seq.nearest_timestep(-10.0), Some(0));
    assert_eq!(seq.nearest_timestep(4.9), Some(2));
    assert_eq!(seq.nearest_timestep(100.0), Some(4));
    assert_eq!(seq.image_at(5), None);
}

#[test]
fn empty_sequence_has_no_timesteps() {
    let seq = Sequence::from_cube(Array3::zeros((0, 4, 4)), None).unwrap();
    assert!(seq.is_empty());
    assert_eq!(seq.nearest_timestep(0.0), None);
    assert_eq!(seq.image_at(0), None);
}

#[test]
fn reference_images_are_memoized() {
    let seq = common::ramp_sequence(3, 4, 4, 1.0);
    let first = seq.mean().unwrap() as *const Array2<f32>;
    let second = seq.mean().unwrap() as *const Array2<f32>;
    assert!(std::ptr::eq(first, second));
    assert_relative_eq!(seq.mean().unwrap()[[0, 0]], 1001.0);

    let median = seq.median().unwrap();
    assert!(std::ptr::eq(median, seq.median().unwrap()));
    assert_relative_eq!(median[[1, 1]], 1012.0);
}

#[test]
fn unsorted_cube_times_are_sorted() {
    let cube = Array3::from_shape_fn((3, 1, 1), |(t, _, _)| t as f32);
    let seq = Sequence::from_cube(cube, Some(vec![2.0, 0.0, 1.0])).unwrap();
    assert_eq!(seq.times(), &[0.0, 1.0, 2.0]);
    let values: Vec<f32> = (0..3).map(|t| seq.image_at(t).unwrap()[[0, 0]]).collect();
    assert_eq!(values, vec![1.0, 2.0, 0.0]);
}
