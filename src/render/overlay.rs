//! Map overlays for quicklooks: named lon/lat polyline sets (coastlines,
//! borders) and a lat/lon graticule, projected through the scene's area
//! definition and stroked into the rendered buffer.
use std::fs::File;
use std::io::BufReader;
use std::path::Path;

use serde::{Deserialize, Serialize};
use tracing::debug;

use crate::error::Result;
use crate::geo::AreaDefinition;

/// A named set of geographic polylines; vertices are `[lon, lat]` in
/// degrees.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct OverlaySet {
    pub name: String,
    pub paths: Vec<Vec<[f64; 2]>>,
}

/// Load overlay sets from a JSON file containing an array of
/// `{name, paths}` objects.
pub fn load_overlays(path: &Path) -> Result<Vec<OverlaySet>> {
    let file = File::open(path)?;
    let overlays: Vec<OverlaySet> =
        serde_json::from_reader(BufReader::new(file)).map_err(crate::error::Error::external)?;
    debug!("Loaded {} overlay set(s) from {:?}", overlays.len(), path);
    Ok(overlays)
}

/// Mapping from source-grid pixel coordinates to positions in the final
/// (possibly resized and padded) output buffer.
#[derive(Debug, Clone, Copy)]
pub struct FrameGeometry {
    pub width: usize,
    pub height: usize,
    /// Interleaved samples per pixel (1 for gray, 3 for RGB).
    pub channels: usize,
    pub scale_x: f64,
    pub scale_y: f64,
    pub pad_left: usize,
    pub pad_top: usize,
}

impl FrameGeometry {
    fn to_buffer(&self, col: f64, row: f64) -> (i64, i64) {
        (
            (col * self.scale_x).round() as i64 + self.pad_left as i64,
            (row * self.scale_y).round() as i64 + self.pad_top as i64,
        )
    }
}

/// Stroke every polyline of an overlay set into the buffer at the given
/// level. Vertices that do not map onto the area (off-Earth) break the
/// line instead of being interpolated across.
pub fn draw_overlay(
    buf: &mut [u8],
    geom: &FrameGeometry,
    area: &AreaDefinition,
    overlay: &OverlaySet,
    level: u8,
) {
    for path in &overlay.paths {
        let mut previous: Option<(i64, i64)> = None;
        for vertex in path {
            let projected = area
                .projection
                .index_of(vertex[0], vertex[1])
                .map(|(col, row)| geom.to_buffer(col, row));
            if let (Some(a), Some(b)) = (previous, projected) {
                draw_segment(buf, geom, a, b, level);
            }
            previous = projected;
        }
    }
}

/// Stroke a lat/lon graticule with the given line spacing in degrees.
pub fn draw_graticule(
    buf: &mut [u8],
    geom: &FrameGeometry,
    area: &AreaDefinition,
    spacing: f64,
    level: u8,
) {
    if spacing <= 0.0 {
        return;
    }
    let step = (spacing / 20.0).max(0.05);

    // Meridians
    let mut lon = -180.0;
    while lon <= 180.0 {
        let mut lat = -90.0 + step;
        let mut previous: Option<(i64, i64)> = None;
        while lat < 90.0 {
            previous = stroke_sample(buf, geom, area, lon, lat, previous, level);
            lat += step;
        }
        lon += spacing;
    }

    // Parallels
    let mut lat = -90.0 + spacing;
    while lat < 90.0 {
        let mut lon = -180.0;
        let mut previous: Option<(i64, i64)> = None;
        while lon <= 180.0 {
            previous = stroke_sample(buf, geom, area, lon, lat, previous, level);
            lon += step;
        }
        lat += spacing;
    }
}

fn stroke_sample(
    buf: &mut [u8],
    geom: &FrameGeometry,
    area: &AreaDefinition,
    lon: f64,
    lat: f64,
    previous: Option<(i64, i64)>,
    level: u8,
) -> Option<(i64, i64)> {
    let projected = area
        .projection
        .index_of(lon, lat)
        .map(|(col, row)| geom.to_buffer(col, row));
    if let (Some(a), Some(b)) = (previous, projected) {
        // A long jump means the line left and re-entered the visible
        // disk (or wrapped the dateline); break the stroke there.
        let max_jump = (geom.width.max(geom.height) / 4) as i64;
        if (a.0 - b.0).abs() <= max_jump && (a.1 - b.1).abs() <= max_jump {
            draw_segment(buf, geom, a, b, level);
        }
    }
    projected
}

/// Bresenham stroke between two buffer positions, clipped to the frame.
fn draw_segment(buf: &mut [u8], geom: &FrameGeometry, a: (i64, i64), b: (i64, i64), level: u8) {
    let (mut x, mut y) = a;
    let (x1, y1) = b;
    let dx = (x1 - x).abs();
    let dy = -(y1 - y).abs();
    let sx = if x < x1 { 1 } else { -1 };
    let sy = if y < y1 { 1 } else { -1 };
    let mut err = dx + dy;

    loop {
        put_pixel(buf, geom, x, y, level);
        if x == x1 && y == y1 {
            break;
        }
        let e2 = 2 * err;
        if e2 >= dy {
            err += dy;
            x += sx;
        }
        if e2 <= dx {
            err += dx;
            y += sy;
        }
    }
}

#[inline]
fn put_pixel(buf: &mut [u8], geom: &FrameGeometry, x: i64, y: i64, level: u8) {
    if x < 0 || y < 0 || x >= geom.width as i64 || y >= geom.height as i64 {
        return;
    }
    let base = (y as usize * geom.width + x as usize) * geom.channels;
    for c in 0..geom.channels {
        buf[base + c] = level;
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::geo::{LatLongGrid, Projection};

    fn identity_geometry(width: usize, height: usize) -> FrameGeometry {
        FrameGeometry {
            width,
            height,
            channels: 1,
            scale_x: 1.0,
            scale_y: 1.0,
            pad_left: 0,
            pad_top: 0,
        }
    }

    fn unit_area(cols: usize, rows: usize) -> AreaDefinition {
        // One degree per pixel, centered on (0, 0)
        AreaDefinition::new(
            "test",
            "unit grid",
            Projection::PlateCarree(LatLongGrid::new(
                -(cols as f64) / 2.0 + 0.5,
                (rows as f64) / 2.0 - 0.5,
                1.0,
                -1.0,
                cols,
                rows,
            )),
        )
    }

    #[test]
    fn overlay_polyline_is_stroked() {
        let area = unit_area(16, 16);
        let geom = identity_geometry(16, 16);
        let mut buf = vec![0u8; 16 * 16];

        let overlay = OverlaySet {
            name: "diag".to_string(),
            paths: vec![vec![[-7.5, 7.5], [7.5, -7.5]]],
        };
        draw_overlay(&mut buf, &geom, &area, &overlay, 255);

        assert_eq!(buf[0], 255, "top-left corner on the diagonal");
        assert_eq!(buf[16 * 16 - 1], 255, "bottom-right corner on the diagonal");
        assert!(buf.iter().filter(|&&v| v == 255).count() >= 16);
    }

    #[test]
    fn segment_is_clipped_to_frame() {
        let geom = identity_geometry(8, 8);
        let mut buf = vec![0u8; 8 * 8];
        draw_segment(&mut buf, &geom, (-5, 3), (12, 3), 200);
        // Row 3 fully stroked, nothing else touched
        for x in 0..8 {
            assert_eq!(buf[3 * 8 + x], 200);
        }
        assert_eq!(buf.iter().filter(|&&v| v == 200).count(), 8);
    }

    #[test]
    fn graticule_touches_the_buffer() {
        let area = unit_area(32, 32);
        let geom = identity_geometry(32, 32);
        let mut buf = vec![0u8; 32 * 32];
        draw_graticule(&mut buf, &geom, &area, 5.0, 128);
        assert!(buf.iter().any(|&v| v == 128));
    }
}
