//! High-level, ergonomic library API: render scene channels to quicklook
//! files or in-memory buffers, inspect scenes without reading samples,
//! and batch whole time series into animation frames. Prefer these
//! entrypoints over the low-level modules when integrating SATSCENE.
use std::path::{Path, PathBuf};

use chrono::{DateTime, Utc};
use tracing::{info, warn};

use crate::core::chunks::DEFAULT_CHUNK_ROWS;
use crate::error::{Error, Result};
use crate::io::SceneReader;
use crate::io::writers::{jpeg, metadata as sidecar, tiff};
use crate::multi::MultiScene;
use crate::render::{self, OverlaySet, Quicklook, RenderParams};
use crate::scene::ChannelQuery;
use crate::types::{BitDepth, Calibration, OutputFormat, SampleType};

/// Channel inventory entry of a scene, available before any data is
/// read.
#[derive(Debug, Clone)]
pub struct ChannelSummary {
    pub name: String,
    pub units: String,
    pub calibration: Calibration,
    pub wavelength: Option<crate::core::metadata::WavelengthBand>,
    pub resolution: Option<f64>,
    pub rows: usize,
    pub cols: usize,
    pub dtype: SampleType,
}

/// Scene inventory: identification plus the channels on offer.
#[derive(Debug, Clone)]
pub struct SceneSummary {
    pub platform: String,
    pub sensor: String,
    pub start_time: DateTime<Utc>,
    pub end_time: DateTime<Utc>,
    pub area_id: String,
    pub projection: String,
    pub channels: Vec<ChannelSummary>,
}

/// Inspect a scene directory without reading any sample data.
pub fn scene_summary(input: &Path) -> Result<SceneSummary> {
    let reader = SceneReader::open(input)?;
    let descriptor = reader.descriptor();
    Ok(SceneSummary {
        platform: descriptor.platform.clone(),
        sensor: descriptor.sensor.clone(),
        start_time: descriptor.start_time,
        end_time: descriptor.end_time,
        area_id: descriptor.area.area_id.clone(),
        projection: descriptor.area.proj_string(),
        channels: descriptor
            .channels
            .iter()
            .map(|c| ChannelSummary {
                name: c.name.clone(),
                units: c.units.clone(),
                calibration: c.calibration,
                wavelength: c.wavelength,
                resolution: c.resolution,
                rows: c.rows,
                cols: c.cols,
                dtype: c.dtype,
            })
            .collect(),
    })
}

/// Render one channel of a scene to an in-memory quicklook (no disk
/// output).
pub fn quicklook_to_buffer(
    input: &Path,
    query: &ChannelQuery,
    chunk_rows: Option<usize>,
    params: &RenderParams,
    overlays: &[OverlaySet],
) -> Result<Quicklook> {
    let reader = SceneReader::open(input)?;
    let channel =
        reader.load_with_chunk_rows(query, chunk_rows.unwrap_or(DEFAULT_CHUNK_ROWS))?;
    render::render_gray(&channel, params, overlays)
}

/// Render one channel of a scene to a quicklook file plus a JSON
/// metadata sidecar.
pub fn quicklook_to_path(
    input: &Path,
    query: &ChannelQuery,
    output: &Path,
    chunk_rows: Option<usize>,
    params: &RenderParams,
    overlays: &[OverlaySet],
) -> Result<()> {
    let quicklook = quicklook_to_buffer(input, query, chunk_rows, params, overlays)?;
    write_quicklook(&quicklook, output)?;
    info!("Wrote quicklook: {:?}", output);
    Ok(())
}

/// Render three channels of a scene as an RGB composite file.
pub fn composite_to_path(
    input: &Path,
    queries: &[ChannelQuery],
    output: &Path,
    chunk_rows: Option<usize>,
    params: &RenderParams,
    overlays: &[OverlaySet],
) -> Result<()> {
    if queries.len() != 3 {
        return Err(Error::IncompleteComposite {
            needed: 3,
            got: queries.len(),
        });
    }
    let reader = SceneReader::open(input)?;
    let chunk_rows = chunk_rows.unwrap_or(DEFAULT_CHUNK_ROWS);
    let red = reader.load_with_chunk_rows(&queries[0], chunk_rows)?;
    let green = reader.load_with_chunk_rows(&queries[1], chunk_rows)?;
    let blue = reader.load_with_chunk_rows(&queries[2], chunk_rows)?;

    let quicklook = render::render_rgb(&red, &green, &blue, params, overlays)?;
    write_quicklook(&quicklook, output)?;
    info!("Wrote composite: {:?}", output);
    Ok(())
}

/// Result of batch frame rendering
#[derive(Debug, Clone, Copy, Default)]
pub struct BatchReport {
    pub frames: usize,
    pub errors: usize,
}

/// Render one channel across many scenes into numbered, timestamped
/// animation frames with a shared stretch.
pub fn animate_to_dir(
    inputs: &[PathBuf],
    query: &ChannelQuery,
    output_dir: &Path,
    chunk_rows: Option<usize>,
    params: &RenderParams,
    overlays: &[OverlaySet],
) -> Result<BatchReport> {
    let group = MultiScene::from_paths(inputs)?;
    let stack =
        group.timeseries_with_chunk_rows(query, chunk_rows.unwrap_or(DEFAULT_CHUNK_ROWS))?;
    let frames = render::render_frames(&stack, params, overlays)?;

    std::fs::create_dir_all(output_dir)?;
    let mut report = BatchReport::default();
    for (index, (time, quicklook)) in frames.iter().enumerate() {
        let name = format!(
            "frame_{:03}_{}.{}",
            index,
            time.format("%Y%m%dT%H%M%SZ"),
            extension(params.format)
        );
        let path = output_dir.join(name);
        match write_quicklook(quicklook, &path) {
            Ok(()) => report.frames += 1,
            Err(e) => {
                warn!("Error writing frame {:?}: {}", path, e);
                report.errors += 1;
            }
        }
    }
    info!(
        "Animation complete: {} frame(s), {} error(s)",
        report.frames, report.errors
    );
    Ok(report)
}

/// File extension for an output format.
pub fn extension(format: OutputFormat) -> &'static str {
    match format {
        OutputFormat::TIFF => "tiff",
        OutputFormat::JPEG => "jpg",
    }
}

/// Encode a quicklook to disk in its declared format, with a JSON
/// metadata sidecar next to it.
pub fn write_quicklook(quicklook: &Quicklook, output: &Path) -> Result<()> {
    match (quicklook.format, quicklook.bit_depth) {
        (OutputFormat::JPEG, BitDepth::U16) => {
            return Err(Error::InvalidArgument {
                arg: "bit_depth",
                value: "JPEG output is 8-bit only".to_string(),
            });
        }
        (OutputFormat::JPEG, BitDepth::U8) => {
            if let Some(rgb) = &quicklook.rgb {
                jpeg::write_rgb_jpeg(output, quicklook.width, quicklook.height, rgb)
                    .map_err(Error::external)?;
            } else if let Some(gray) = &quicklook.gray {
                jpeg::write_gray_jpeg(output, quicklook.width, quicklook.height, gray)
                    .map_err(Error::external)?;
            } else {
                return Err(Error::Processing(
                    "quicklook holds no 8-bit buffer".to_string(),
                ));
            }
        }
        (OutputFormat::TIFF, _) => {
            if let Some(rgb) = &quicklook.rgb {
                tiff::write_tiff_rgb(output, quicklook.width, quicklook.height, rgb)
                    .map_err(Error::external)?;
            } else if let Some(gray16) = &quicklook.gray16 {
                tiff::write_tiff_gray_u16(output, quicklook.width, quicklook.height, gray16)
                    .map_err(Error::external)?;
            } else if let Some(gray) = &quicklook.gray {
                tiff::write_tiff_gray_u8(output, quicklook.width, quicklook.height, gray)
                    .map_err(Error::external)?;
            } else {
                return Err(Error::Processing("quicklook holds no buffer".to_string()));
            }
        }
    }

    sidecar::write_json_sidecar(output, &quicklook.metadata).map_err(Error::external)?;
    Ok(())
}
