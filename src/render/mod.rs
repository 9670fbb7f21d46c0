//! Rendering subsystem: force labeled lazy arrays and turn them into
//! quicklook buffers (grayscale or RGB composites) with stretch, resize,
//! square padding, and map overlays. Encoding to JPEG/TIFF files lives in
//! [`crate::io::writers`]; the high-level entry points are in
//! [`crate::api`].
pub mod overlay;
pub mod params;
pub mod resize;
pub mod stretch;

pub use overlay::{FrameGeometry, OverlaySet, load_overlays};
pub use params::RenderParams;
pub use stretch::{StretchMap, StretchStats, compute_stats, plan_stretch};

use chrono::{DateTime, Utc};
use ndarray::Array2;
use tracing::{debug, warn};

use crate::core::array::LazyArray;
use crate::core::metadata::ChannelMetadata;
use crate::core::stack::LazyStack;
use crate::error::{Error, Result};
use crate::render::overlay::{draw_graticule, draw_overlay};
use crate::render::resize::{calculate_resize_dimensions, pad_to_square};
use crate::render::stretch::{apply_stretch_u8, apply_stretch_u16};
use crate::types::{BitDepth, BitDepthArg, OutputFormat};

/// Result of rendering: resident display buffers plus the channel
/// metadata they were rendered from.
#[derive(Debug, Clone)]
pub struct Quicklook {
    pub width: usize,
    pub height: usize,
    pub bit_depth: BitDepth,
    pub format: OutputFormat,
    pub gray: Option<Vec<u8>>,     // single-band U8
    pub gray16: Option<Vec<u16>>,  // single-band U16
    pub rgb: Option<Vec<u8>>,      // interleaved RGB composite
    pub metadata: ChannelMetadata,
}

fn to_bit_depth(arg: BitDepthArg) -> BitDepth {
    match arg {
        BitDepthArg::U8 => BitDepth::U8,
        BitDepthArg::U16 => BitDepth::U16,
    }
}

/// Render one channel to a grayscale quicklook.
///
/// Forces the container, plans a stretch from its own statistics, and
/// applies resize/pad/overlays according to `params`.
pub fn render_gray(
    channel: &LazyArray,
    params: &RenderParams,
    overlays: &[OverlaySet],
) -> Result<Quicklook> {
    let data = channel.force()?;
    let map = plan_stretch(&data, params.stretch);
    finish_gray(&data, &map, channel.meta().clone(), params, overlays)
}

/// Render three channels to an RGB composite quicklook.
///
/// Each band is stretched independently; the output is always 8-bit.
pub fn render_rgb(
    red: &LazyArray,
    green: &LazyArray,
    blue: &LazyArray,
    params: &RenderParams,
    overlays: &[OverlaySet],
) -> Result<Quicklook> {
    if params.bit_depth == BitDepthArg::U16 {
        warn!("RGB composites are 8-bit; ignoring requested U16 bit depth");
    }

    let bands = [red, green, blue];
    let mut planes: Vec<Vec<u8>> = Vec::with_capacity(3);
    let mut dims = None;
    for band in bands {
        let data = band.force()?;
        match dims {
            None => dims = Some(data.dim()),
            Some(expected) if expected != data.dim() => {
                return Err(Error::Processing(format!(
                    "composite bands disagree on shape: {:?} vs {:?}",
                    expected,
                    data.dim()
                )));
            }
            _ => {}
        }
        let map = plan_stretch(&data, params.stretch);
        planes.push(apply_stretch_u8(&data, &map));
    }
    let (rows, cols) = dims.unwrap_or((0, 0));

    let mut rgb = Vec::with_capacity(rows * cols * 3);
    for i in 0..rows * cols {
        rgb.push(planes[0][i]);
        rgb.push(planes[1][i]);
        rgb.push(planes[2][i]);
    }

    let (buf, geom) = finalize_u8(rgb, cols, rows, 3, params)?;
    let mut buf = buf;
    apply_overlays(&mut buf, &geom, red.meta(), (rows, cols), params, overlays);

    debug!(
        "rendered RGB composite {}x{} from '{}'/'{}'/'{}'",
        geom.width,
        geom.height,
        red.meta().name,
        green.meta().name,
        blue.meta().name
    );
    Ok(Quicklook {
        width: geom.width,
        height: geom.height,
        bit_depth: BitDepth::U8,
        format: params.format,
        gray: None,
        gray16: None,
        rgb: Some(buf),
        metadata: red.meta().clone(),
    })
}

/// Render every frame of a time stack with one shared stretch.
///
/// The stretch is planned on the first frame and reused, so stepping
/// through the sequence does not flicker as per-frame statistics drift.
pub fn render_frames(
    stack: &LazyStack,
    params: &RenderParams,
    overlays: &[OverlaySet],
) -> Result<Vec<(DateTime<Utc>, Quicklook)>> {
    let mut shared_map: Option<StretchMap> = None;
    let mut rendered = Vec::with_capacity(stack.len());
    for (time, frame) in stack.frames() {
        let data = frame.force()?;
        let map = match &shared_map {
            Some(map) => map.clone(),
            None => {
                let map = plan_stretch(&data, params.stretch);
                shared_map = Some(map.clone());
                map
            }
        };
        let quicklook = finish_gray(&data, &map, frame.meta().clone(), params, overlays)?;
        rendered.push((*time, quicklook));
    }
    Ok(rendered)
}

fn finish_gray(
    data: &Array2<f64>,
    map: &StretchMap,
    metadata: ChannelMetadata,
    params: &RenderParams,
    overlays: &[OverlaySet],
) -> Result<Quicklook> {
    let (rows, cols) = data.dim();
    match to_bit_depth(params.bit_depth) {
        BitDepth::U8 => {
            let bytes = apply_stretch_u8(data, map);
            let (mut buf, geom) = finalize_u8(bytes, cols, rows, 1, params)?;
            apply_overlays(&mut buf, &geom, &metadata, (rows, cols), params, overlays);
            Ok(Quicklook {
                width: geom.width,
                height: geom.height,
                bit_depth: BitDepth::U8,
                format: params.format,
                gray: Some(buf),
                gray16: None,
                rgb: None,
                metadata,
            })
        }
        BitDepth::U16 => {
            if params.graticule.is_some() || !overlays.is_empty() {
                warn!("overlays are drawn on 8-bit quicklooks only; skipping for U16 output");
            }
            let levels = apply_stretch_u16(data, map);
            let (final_cols, final_rows, levels) = match params.size {
                Some(size) if size != cols.max(rows) => {
                    let (new_cols, new_rows) = calculate_resize_dimensions(cols, rows, size);
                    let resized = resize::resize_u16_image(&levels, cols, rows, new_cols, new_rows)
                        .map_err(Error::external)?;
                    (new_cols, new_rows, resized)
                }
                _ => (cols, rows, levels),
            };
            let (final_cols, final_rows, levels) = if params.pad {
                let (padded, dim, _, _) = pad_to_square(&levels, final_cols, final_rows, 1);
                (dim, dim, padded)
            } else {
                (final_cols, final_rows, levels)
            };
            Ok(Quicklook {
                width: final_cols,
                height: final_rows,
                bit_depth: BitDepth::U16,
                format: params.format,
                gray: None,
                gray16: Some(levels),
                rgb: None,
                metadata,
            })
        }
    }
}

/// Resize and pad an interleaved 8-bit buffer, tracking the geometry the
/// overlay pass needs.
fn finalize_u8(
    bytes: Vec<u8>,
    cols: usize,
    rows: usize,
    channels: usize,
    params: &RenderParams,
) -> Result<(Vec<u8>, FrameGeometry)> {
    let (new_cols, new_rows, buf) = match params.size {
        Some(size) if size != cols.max(rows) => {
            let (new_cols, new_rows) = calculate_resize_dimensions(cols, rows, size);
            let resized = match channels {
                3 => resize::resize_rgb_image(&bytes, cols, rows, new_cols, new_rows),
                _ => resize::resize_u8_image(&bytes, cols, rows, new_cols, new_rows),
            }
            .map_err(Error::external)?;
            (new_cols, new_rows, resized)
        }
        _ => (cols, rows, bytes),
    };

    let scale_x = new_cols as f64 / cols as f64;
    let scale_y = new_rows as f64 / rows as f64;

    if params.pad {
        let (padded, dim, pad_left, pad_top) = pad_to_square(&buf, new_cols, new_rows, channels);
        Ok((
            padded,
            FrameGeometry {
                width: dim,
                height: dim,
                channels,
                scale_x,
                scale_y,
                pad_left,
                pad_top,
            },
        ))
    } else {
        Ok((
            buf,
            FrameGeometry {
                width: new_cols,
                height: new_rows,
                channels,
                scale_x,
                scale_y,
                pad_left: 0,
                pad_top: 0,
            },
        ))
    }
}

fn apply_overlays(
    buf: &mut [u8],
    geom: &FrameGeometry,
    metadata: &ChannelMetadata,
    source_shape: (usize, usize),
    params: &RenderParams,
    overlays: &[OverlaySet],
) {
    if params.graticule.is_none() && overlays.is_empty() {
        return;
    }
    let Some(area) = &metadata.area else {
        warn!(
            "channel '{}' has no area definition; skipping overlays",
            metadata.name
        );
        return;
    };
    if area.shape() != source_shape {
        warn!(
            "channel '{}' was windowed ({:?} of area {:?}); skipping overlays",
            metadata.name,
            source_shape,
            area.shape()
        );
        return;
    }

    if let Some(spacing) = params.graticule {
        draw_graticule(buf, geom, area, spacing, 255);
    }
    for overlay in overlays {
        debug!("compositing overlay '{}'", overlay.name);
        draw_overlay(buf, geom, area, overlay, 255);
    }
}

#[cfg(test)]
mod tests {
    use ndarray::Array2;

    use super::*;
    use crate::core::metadata::ChannelMetadata;
    use crate::geo::{AreaDefinition, LatLongGrid, Projection};

    fn gradient_channel(rows: usize, cols: usize) -> LazyArray {
        let data = Array2::from_shape_fn((rows, cols), |(r, c)| (r * cols + c) as f64);
        let mut meta = ChannelMetadata::named("grad");
        meta.area = Some(AreaDefinition::new(
            "grid",
            "test grid",
            Projection::PlateCarree(LatLongGrid::global(cols, rows)),
        ));
        LazyArray::from_array(data, meta)
    }

    #[test]
    fn gray_quicklook_has_expected_dimensions() {
        let channel = gradient_channel(20, 40);
        let quicklook = render_gray(&channel, &RenderParams::default(), &[]).unwrap();
        assert_eq!((quicklook.width, quicklook.height), (40, 20));
        let gray = quicklook.gray.as_ref().unwrap();
        assert_eq!(gray.len(), 800);
        assert_eq!(gray[0], 0);
        assert_eq!(*gray.last().unwrap(), 255);
    }

    #[test]
    fn resize_and_pad_produce_square() {
        let channel = gradient_channel(20, 40);
        let params = RenderParams {
            size: Some(20),
            pad: true,
            ..Default::default()
        };
        let quicklook = render_gray(&channel, &params, &[]).unwrap();
        assert_eq!((quicklook.width, quicklook.height), (20, 20));
    }

    #[test]
    fn u16_quicklook_uses_gray16_buffer() {
        let channel = gradient_channel(8, 8);
        let params = RenderParams {
            bit_depth: BitDepthArg::U16,
            ..Default::default()
        };
        let quicklook = render_gray(&channel, &params, &[]).unwrap();
        assert!(quicklook.gray.is_none());
        let levels = quicklook.gray16.unwrap();
        assert_eq!(levels.len(), 64);
        assert_eq!(*levels.last().unwrap(), 65535);
    }

    #[test]
    fn rgb_composite_interleaves_bands() {
        let r = gradient_channel(4, 4);
        let g = gradient_channel(4, 4);
        let b = gradient_channel(4, 4);
        let quicklook = render_rgb(&r, &g, &b, &RenderParams::default(), &[]).unwrap();
        let rgb = quicklook.rgb.unwrap();
        assert_eq!(rgb.len(), 4 * 4 * 3);
        // Equal bands render gray: R == G == B per pixel
        for pixel in rgb.chunks_exact(3) {
            assert_eq!(pixel[0], pixel[1]);
            assert_eq!(pixel[1], pixel[2]);
        }
    }

    #[test]
    fn mismatched_composite_bands_error() {
        let r = gradient_channel(4, 4);
        let g = gradient_channel(5, 4);
        let b = gradient_channel(4, 4);
        assert!(render_rgb(&r, &g, &b, &RenderParams::default(), &[]).is_err());
    }
}
