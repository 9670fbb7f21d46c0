//! Equirectangular (plate carrée) grid: an affine mapping between pixel
//! indices and geographic degrees. Used for resampled products and as the
//! simple projection in tests.
use serde::{Deserialize, Serialize};

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct LatLongGrid {
    /// Longitude of the center of pixel (0, 0) in degrees.
    pub lon_origin: f64,
    /// Latitude of the center of pixel (0, 0) in degrees.
    pub lat_origin: f64,
    /// Degrees of longitude per column (positive eastward).
    pub dlon: f64,
    /// Degrees of latitude per row (negative for north-up grids).
    pub dlat: f64,
    pub cols: usize,
    pub rows: usize,
}

impl LatLongGrid {
    pub fn new(
        lon_origin: f64,
        lat_origin: f64,
        dlon: f64,
        dlat: f64,
        cols: usize,
        rows: usize,
    ) -> Self {
        Self {
            lon_origin,
            lat_origin,
            dlon,
            dlat,
            cols,
            rows,
        }
    }

    /// A north-up global grid of the given shape.
    pub fn global(cols: usize, rows: usize) -> Self {
        let dlon = 360.0 / cols as f64;
        let dlat = -180.0 / rows as f64;
        Self::new(
            -180.0 + dlon / 2.0,
            90.0 + dlat / 2.0,
            dlon,
            dlat,
            cols,
            rows,
        )
    }

    pub fn shape(&self) -> (usize, usize) {
        (self.rows, self.cols)
    }

    /// Grid indices (col, row) to (lon, lat) in degrees.
    #[inline]
    pub fn lonlat_of(&self, col: f64, row: f64) -> (f64, f64) {
        (
            self.lon_origin + col * self.dlon,
            self.lat_origin + row * self.dlat,
        )
    }

    /// Geographic (lon, lat) in degrees to fractional grid (col, row).
    #[inline]
    pub fn index_of(&self, lon: f64, lat: f64) -> (f64, f64) {
        (
            (lon - self.lon_origin) / self.dlon,
            (lat - self.lat_origin) / self.dlat,
        )
    }

    /// Bounding box (min_lon, min_lat, max_lon, max_lat) over pixel
    /// centers, in degrees.
    pub fn geographic_bounds(&self) -> (f64, f64, f64, f64) {
        let last_col = self.cols.saturating_sub(1) as f64;
        let last_row = self.rows.saturating_sub(1) as f64;
        let (lon_a, lat_a) = self.lonlat_of(0.0, 0.0);
        let (lon_b, lat_b) = self.lonlat_of(last_col, last_row);
        (
            lon_a.min(lon_b),
            lat_a.min(lat_b),
            lon_a.max(lon_b),
            lat_a.max(lat_b),
        )
    }

    pub fn contains(&self, lon: f64, lat: f64) -> bool {
        let (col, row) = self.index_of(lon, lat);
        col >= 0.0 && col < self.cols as f64 && row >= 0.0 && row < self.rows as f64
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn global_grid_centers() {
        let grid = LatLongGrid::global(360, 180);
        let (lon, lat) = grid.lonlat_of(0.0, 0.0);
        assert!((lon - (-179.5)).abs() < 1e-9);
        assert!((lat - 89.5).abs() < 1e-9);
    }

    #[test]
    fn index_roundtrip() {
        let grid = LatLongGrid::global(720, 360);
        let (col, row) = grid.index_of(13.4, 52.5);
        let (lon, lat) = grid.lonlat_of(col, row);
        assert!((lon - 13.4).abs() < 1e-9);
        assert!((lat - 52.5).abs() < 1e-9);
    }

    #[test]
    fn containment() {
        let grid = LatLongGrid::new(-10.0, 10.0, 0.1, -0.1, 200, 200);
        assert!(grid.contains(0.0, 0.0));
        assert!(!grid.contains(50.0, 0.0));
    }
}
