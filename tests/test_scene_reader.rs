use std::fs;
use std::path::{Path, PathBuf};

use approx::assert_abs_diff_eq;
use chrono::{TimeZone, Utc};
use tempfile::TempDir;

use satscene::io::scene_dir::{ChannelDescriptor, SceneDescriptor};
use satscene::types::{Calibration, SampleType};
use satscene::{
    AreaDefinition, ChannelQuery, ComputeError, Error, LatLongGrid, Projection, SceneError,
    SceneReader, WavelengthBand,
};

const ROWS: usize = 8;
const COLS: usize = 8;

fn write_u16_counts(path: &Path, values: impl Fn(usize) -> u16) {
    let mut bytes = Vec::with_capacity(ROWS * COLS * 2);
    for i in 0..ROWS * COLS {
        bytes.extend_from_slice(&values(i).to_le_bytes());
    }
    fs::write(path, bytes).expect("write raw channel");
}

fn write_f32_samples(path: &Path, values: impl Fn(usize) -> f32) {
    let mut bytes = Vec::with_capacity(ROWS * COLS * 4);
    for i in 0..ROWS * COLS {
        bytes.extend_from_slice(&values(i).to_le_bytes());
    }
    fs::write(path, bytes).expect("write raw channel");
}

fn demo_descriptor() -> SceneDescriptor {
    SceneDescriptor {
        platform: "GOES-East".to_string(),
        sensor: "ABI".to_string(),
        start_time: Utc.with_ymd_and_hms(2024, 3, 1, 12, 0, 0).unwrap(),
        end_time: Utc.with_ymd_and_hms(2024, 3, 1, 12, 10, 0).unwrap(),
        area: AreaDefinition::new(
            "demo_grid",
            "8x8 global grid",
            Projection::PlateCarree(LatLongGrid::global(COLS, ROWS)),
        ),
        channels: vec![
            ChannelDescriptor {
                name: "C01".to_string(),
                file: "c01.raw".to_string(),
                dtype: SampleType::U16,
                rows: ROWS,
                cols: COLS,
                calibration: Calibration::Reflectance,
                units: "%".to_string(),
                wavelength: Some(WavelengthBand::new(0.45, 0.47, 0.49)),
                resolution: Some(1000.0),
                scale: 0.01,
                offset: 0.0,
                fill_value: Some(65535.0),
            },
            ChannelDescriptor {
                name: "C02".to_string(),
                file: "c02.raw".to_string(),
                dtype: SampleType::U16,
                rows: ROWS,
                cols: COLS,
                calibration: Calibration::Reflectance,
                units: "%".to_string(),
                wavelength: Some(WavelengthBand::new(0.59, 0.64, 0.69)),
                resolution: Some(500.0),
                scale: 0.01,
                offset: 0.0,
                fill_value: Some(65535.0),
            },
            ChannelDescriptor {
                name: "C13".to_string(),
                file: "c13.raw".to_string(),
                dtype: SampleType::F32,
                rows: ROWS,
                cols: COLS,
                calibration: Calibration::BrightnessTemperature,
                units: "K".to_string(),
                wavelength: Some(WavelengthBand::new(10.1, 10.35, 10.6)),
                resolution: Some(2000.0),
                scale: 1.0,
                offset: 0.0,
                fill_value: None,
            },
        ],
    }
}

fn write_scene(dir: &Path) -> PathBuf {
    let scene_dir = dir.join("goes_east_20240301T1200");
    fs::create_dir_all(&scene_dir).expect("create scene dir");

    let descriptor = demo_descriptor();
    fs::write(
        scene_dir.join("scene.json"),
        serde_json::to_string_pretty(&descriptor).expect("serialize descriptor"),
    )
    .expect("write descriptor");

    // C01: counts = 100 * index, one fill pixel at index 10
    write_u16_counts(&scene_dir.join("c01.raw"), |i| {
        if i == 10 { 65535 } else { (i * 100) as u16 }
    });
    // C02: constant counts
    write_u16_counts(&scene_dir.join("c02.raw"), |_| 2500);
    // C13: brightness temperatures around 280 K
    write_f32_samples(&scene_dir.join("c13.raw"), |i| 280.0 + i as f32 * 0.1);

    scene_dir
}

#[test]
fn open_enumerates_channels_without_reading_data() {
    let tmp = TempDir::new().expect("tempdir");
    let scene_dir = write_scene(tmp.path());

    // Remove the sample files: enumeration must still work since no
    // data is read at open time.
    fs::remove_file(scene_dir.join("c01.raw")).unwrap();
    fs::remove_file(scene_dir.join("c02.raw")).unwrap();
    fs::remove_file(scene_dir.join("c13.raw")).unwrap();

    let reader = SceneReader::open(&scene_dir).expect("open scene");
    assert_eq!(reader.available_channels(), vec!["C01", "C02", "C13"]);
    assert_eq!(reader.platform(), "GOES-East");
    assert_eq!(reader.area().area_id, "demo_grid");

    // Loading still succeeds (deferred); only forcing touches the file.
    let channel = reader.load(&ChannelQuery::from("C01")).expect("load");
    let err = channel.force().expect_err("missing file must fail force");
    assert!(matches!(
        err,
        Error::Compute(ComputeError::Unavailable(_))
    ));
}

#[test]
fn load_applies_calibration_and_fill_masking() {
    let tmp = TempDir::new().expect("tempdir");
    let scene_dir = write_scene(tmp.path());

    let reader = SceneReader::open(&scene_dir).expect("open scene");
    let c01 = reader.load(&ChannelQuery::from("C01")).expect("load C01");

    assert_eq!(c01.meta().calibration, Calibration::Reflectance);
    assert_eq!(c01.meta().units, "%");
    assert!(c01.meta().area.is_some());

    let values = c01.force().expect("force C01");
    assert_eq!(values.dim(), (ROWS, COLS));
    // counts * 0.01
    assert_abs_diff_eq!(values[[0, 1]], 1.0, epsilon = 1e-9);
    assert_abs_diff_eq!(values[[0, 7]], 7.0, epsilon = 1e-9);
    // fill pixel at flat index 10 => (1, 2)
    assert!(values[[1, 2]].is_nan());
}

#[test]
fn f32_channels_read_without_scaling() {
    let tmp = TempDir::new().expect("tempdir");
    let scene_dir = write_scene(tmp.path());

    let reader = SceneReader::open(&scene_dir).expect("open scene");
    let c13 = reader.load(&ChannelQuery::from("C13")).expect("load C13");
    let values = c13.force().expect("force C13");
    assert_abs_diff_eq!(values[[0, 0]], 280.0, epsilon = 1e-4);
    assert_abs_diff_eq!(values[[7, 7]], 280.0 + 63.0 * 0.1, epsilon = 1e-4);
}

#[test]
fn missing_channel_is_an_explicit_lookup_error() {
    let tmp = TempDir::new().expect("tempdir");
    let scene_dir = write_scene(tmp.path());

    let reader = SceneReader::open(&scene_dir).expect("open scene");
    let err = reader
        .load(&ChannelQuery::from("C99"))
        .expect_err("C99 does not exist");
    match err {
        SceneError::ChannelNotAvailable {
            requested,
            available,
        } => {
            assert_eq!(requested, "C99");
            assert!(available.contains("C01"));
            assert!(available.contains("C13"));
        }
        other => panic!("unexpected error: {other}"),
    }
}

#[test]
fn wavelength_queries_resolve_by_band() {
    let tmp = TempDir::new().expect("tempdir");
    let scene_dir = write_scene(tmp.path());
    let reader = SceneReader::open(&scene_dir).expect("open scene");

    let blue = reader
        .load(&ChannelQuery::Wavelength(0.485))
        .expect("0.485 um is inside C01's band");
    assert_eq!(blue.meta().name, "C01");

    let err = reader
        .load(&ChannelQuery::Wavelength(1.38))
        .expect_err("1.38 um matches no configured band");
    assert!(matches!(err, SceneError::NoWavelengthMatch { .. }));
    assert!(err.to_string().contains("1.38"));
}

#[test]
fn truncated_sample_file_fails_force_not_load() {
    let tmp = TempDir::new().expect("tempdir");
    let scene_dir = write_scene(tmp.path());

    // Keep only the first half of C02's samples
    let full = fs::read(scene_dir.join("c02.raw")).unwrap();
    fs::write(scene_dir.join("c02.raw"), &full[..full.len() / 2]).unwrap();

    let reader = SceneReader::open(&scene_dir).expect("open scene");
    let c02 = reader
        .load(&ChannelQuery::from("C02"))
        .expect("load stays deferred");

    let err = c02.force().expect_err("truncated file must fail");
    match err {
        Error::Compute(ComputeError::Unavailable(message)) => {
            assert!(message.contains("truncated"), "message: {message}");
        }
        other => panic!("unexpected error: {other}"),
    }

    // The intact upper half is still readable through a slice.
    let top = c02
        .slice(satscene::Window::new(0, 0, ROWS / 2, COLS))
        .expect("slice in bounds");
    let values = top.force().expect("top half is intact");
    assert_abs_diff_eq!(values[[0, 0]], 25.0, epsilon = 1e-9);
}

#[test]
fn malformed_descriptors_are_rejected_at_open() {
    let tmp = TempDir::new().expect("tempdir");

    // No descriptor at all
    let empty = tmp.path().join("not_a_scene");
    fs::create_dir_all(&empty).unwrap();
    assert!(matches!(
        SceneReader::open(&empty).expect_err("no descriptor"),
        SceneError::MissingField(_)
    ));

    // Channel shape disagrees with the area
    let scene_dir = write_scene(tmp.path());
    let mut descriptor = demo_descriptor();
    descriptor.channels[0].rows = 4;
    fs::write(
        scene_dir.join("scene.json"),
        serde_json::to_string(&descriptor).unwrap(),
    )
    .unwrap();
    assert!(matches!(
        SceneReader::open(&scene_dir).expect_err("shape mismatch"),
        SceneError::Malformed(_)
    ));
}

#[test]
fn scene_collects_channels_and_resolves_queries() {
    let tmp = TempDir::new().expect("tempdir");
    let scene_dir = write_scene(tmp.path());
    let reader = SceneReader::open(&scene_dir).expect("open scene");

    let scene = reader.scene_all().expect("load all channels");
    assert_eq!(scene.names(), vec!["C01", "C02", "C13"]);
    assert!(scene.area().is_some());

    let c02 = scene.query(&ChannelQuery::from("C02")).expect("by name");
    let red = scene.by_wavelength(0.64).expect("by wavelength");
    assert_eq!(c02.meta().name, red.meta().name);
}
