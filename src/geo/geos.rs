//! Geostationary scan-angle grid.
//!
//! Geolocation model for full-disk and sector imagery from geostationary
//! weather satellites: pixel indices map to scan angles in radians from
//! nadir, and scan angles map to geographic position on the ellipsoid.
//!
//! Reference: GOES-R Product Definition and Users' Guide (PUG) Volume 4,
//! Section 4.2.8. The sweep axis distinguishes the GOES-R mirror order
//! ("x") from the Meteosat/Himawari order ("y").
use serde::{Deserialize, Serialize};

/// Order of the two scan-mirror rotations.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum SweepAxis {
    X,
    Y,
}

impl std::fmt::Display for SweepAxis {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            SweepAxis::X => write!(f, "x"),
            SweepAxis::Y => write!(f, "y"),
        }
    }
}

/// Scan angle of the Earth limb as seen from geostationary altitude,
/// used for the default full-disk grid extent.
const FULL_DISK_HALF_ANGLE: f64 = 0.151844;

/// A geostationary projection together with its pixel grid.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct GeosGrid {
    /// Satellite altitude above the ellipsoid surface (meters).
    pub satellite_height: f64,
    /// Semi-major axis of the Earth ellipsoid (meters).
    pub equatorial_radius: f64,
    /// Semi-minor axis of the Earth ellipsoid (meters).
    pub polar_radius: f64,
    /// Longitude of the sub-satellite point (degrees, east positive).
    pub sub_lon: f64,
    pub sweep: SweepAxis,
    /// Scan angle of the center of pixel (0, 0) in X (radians).
    pub x_origin: f64,
    /// Scan angle of the center of pixel (0, 0) in Y (radians).
    pub y_origin: f64,
    /// Scan-angle step per column (radians, positive eastward).
    pub dx: f64,
    /// Scan-angle step per row (radians, negative for north-up grids).
    pub dy: f64,
    pub cols: usize,
    pub rows: usize,
}

impl GeosGrid {
    #[allow(clippy::too_many_arguments)]
    pub fn new(
        satellite_height: f64,
        equatorial_radius: f64,
        polar_radius: f64,
        sub_lon: f64,
        sweep: SweepAxis,
        x_origin: f64,
        y_origin: f64,
        dx: f64,
        dy: f64,
        cols: usize,
        rows: usize,
    ) -> Self {
        Self {
            satellite_height,
            equatorial_radius,
            polar_radius,
            sub_lon,
            sweep,
            x_origin,
            y_origin,
            dx,
            dy,
            cols,
            rows,
        }
    }

    /// A square full-disk grid on the GRS80 ellipsoid for a satellite at
    /// the given longitude.
    pub fn full_disk(sub_lon: f64, sweep: SweepAxis, size: usize) -> Self {
        let step = 2.0 * FULL_DISK_HALF_ANGLE / size as f64;
        Self::new(
            35_786_023.0,
            6_378_137.0,
            6_356_752.31414,
            sub_lon,
            sweep,
            -FULL_DISK_HALF_ANGLE + step / 2.0,
            FULL_DISK_HALF_ANGLE - step / 2.0,
            step,
            -step,
            size,
            size,
        )
    }

    /// Distance from Earth center to the satellite (meters).
    fn h(&self) -> f64 {
        self.satellite_height + self.equatorial_radius
    }

    pub fn shape(&self) -> (usize, usize) {
        (self.rows, self.cols)
    }

    /// Grid indices (col, row) to scan angles (x, y) in radians.
    #[inline]
    pub fn scan_of(&self, col: f64, row: f64) -> (f64, f64) {
        (self.x_origin + col * self.dx, self.y_origin + row * self.dy)
    }

    /// Scan angles (x, y) to fractional grid indices (col, row).
    #[inline]
    pub fn grid_of(&self, x: f64, y: f64) -> (f64, f64) {
        ((x - self.x_origin) / self.dx, (y - self.y_origin) / self.dy)
    }

    /// Pointing vector components of a scan angle pair, in the
    /// satellite-centered fixed frame (ux toward Earth center).
    #[inline]
    fn pointing(&self, x: f64, y: f64) -> (f64, f64, f64) {
        let (sin_x, cos_x) = x.sin_cos();
        let (sin_y, cos_y) = y.sin_cos();
        match self.sweep {
            SweepAxis::X => (cos_x * cos_y, -sin_x, cos_x * sin_y),
            SweepAxis::Y => (cos_x * cos_y, -sin_x * cos_y, sin_y),
        }
    }

    /// Scan angles (radians) to geographic (lon, lat) in degrees.
    ///
    /// Returns None when the scan angle points past the Earth limb.
    pub fn scan_to_lonlat(&self, x: f64, y: f64) -> Option<(f64, f64)> {
        let (ux, uy, uz) = self.pointing(x, y);
        let ratio = (self.equatorial_radius / self.polar_radius).powi(2);
        let h = self.h();

        // Quadratic for the distance from satellite to ellipsoid surface
        let a = ux * ux + uy * uy + ratio * uz * uz;
        let b = -2.0 * h * ux;
        let c = h * h - self.equatorial_radius * self.equatorial_radius;

        let discriminant = b * b - 4.0 * a * c;
        if discriminant < 0.0 {
            return None;
        }

        let rs = (-b - discriminant.sqrt()) / (2.0 * a);
        let sx = rs * ux;
        let sy = rs * uy;
        let sz = rs * uz;

        let lat = (ratio * sz / (h - sx).hypot(sy)).atan();
        let lon = self.sub_lon.to_radians() - sy.atan2(h - sx);

        Some((lon.to_degrees(), lat.to_degrees()))
    }

    /// Geographic (lon, lat) in degrees to scan angles (radians).
    ///
    /// Returns None when the point is not visible from the satellite.
    pub fn lonlat_to_scan(&self, lon: f64, lat: f64) -> Option<(f64, f64)> {
        let lat_r = lat.to_radians();
        let delta = lon.to_radians() - self.sub_lon.to_radians();
        let h = self.h();

        // Geocentric latitude on the oblate ellipsoid
        let phi_c = ((self.polar_radius / self.equatorial_radius).powi(2) * lat_r.tan()).atan();
        let e2 = 1.0 - (self.polar_radius / self.equatorial_radius).powi(2);
        let rc = self.polar_radius / (1.0 - e2 * phi_c.cos().powi(2)).sqrt();

        let sx = h - rc * phi_c.cos() * delta.cos();
        let sy = -rc * phi_c.cos() * delta.sin();
        let sz = rc * phi_c.sin();

        // PUG visibility condition: the surface point faces the satellite
        let ratio = (self.equatorial_radius / self.polar_radius).powi(2);
        if h * (h - sx) < sy * sy + ratio * sz * sz {
            return None;
        }

        let norm = (sx * sx + sy * sy + sz * sz).sqrt();
        Some(match self.sweep {
            SweepAxis::X => ((-sy / norm).asin(), sz.atan2(sx)),
            SweepAxis::Y => ((-sy).atan2(sx), (sz / norm).asin()),
        })
    }

    /// Grid indices (col, row) to geographic (lon, lat) in degrees.
    pub fn lonlat_of(&self, col: f64, row: f64) -> Option<(f64, f64)> {
        let (x, y) = self.scan_of(col, row);
        self.scan_to_lonlat(x, y)
    }

    /// Geographic (lon, lat) in degrees to fractional grid (col, row).
    pub fn index_of(&self, lon: f64, lat: f64) -> Option<(f64, f64)> {
        let (x, y) = self.lonlat_to_scan(lon, lat)?;
        Some(self.grid_of(x, y))
    }

    /// Approximate geographic bounding box (min_lon, min_lat, max_lon,
    /// max_lat) in degrees, sampled along the grid edges.
    pub fn geographic_bounds(&self) -> (f64, f64, f64, f64) {
        let mut min_lon = f64::MAX;
        let mut min_lat = f64::MAX;
        let mut max_lon = f64::MIN;
        let mut max_lat = f64::MIN;

        let samples = 64;
        let last_col = self.cols.saturating_sub(1) as f64;
        let last_row = self.rows.saturating_sub(1) as f64;
        for t in 0..=samples {
            let frac = t as f64 / samples as f64;
            let edges = [
                (frac * last_col, 0.0),
                (frac * last_col, last_row),
                (0.0, frac * last_row),
                (last_col, frac * last_row),
            ];
            for (col, row) in edges {
                if let Some((lon, lat)) = self.lonlat_of(col, row) {
                    min_lon = min_lon.min(lon);
                    min_lat = min_lat.min(lat);
                    max_lon = max_lon.max(lon);
                    max_lat = max_lat.max(lat);
                }
            }
        }

        (min_lon, min_lat, max_lon, max_lat)
    }

    /// Whether the geographic point is visible and inside the grid.
    pub fn contains(&self, lon: f64, lat: f64) -> bool {
        match self.index_of(lon, lat) {
            Some((col, row)) => {
                col >= 0.0 && col < self.cols as f64 && row >= 0.0 && row < self.rows as f64
            }
            None => false,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn goes_east() -> GeosGrid {
        GeosGrid::full_disk(-75.0, SweepAxis::X, 1000)
    }

    #[test]
    fn nadir_maps_to_sub_satellite_point() {
        let grid = goes_east();
        let (lon, lat) = grid.scan_to_lonlat(0.0, 0.0).expect("nadir on Earth");
        assert!((lon - (-75.0)).abs() < 1e-9, "nadir lon {}", lon);
        assert!(lat.abs() < 1e-9, "nadir lat {}", lat);
    }

    #[test]
    fn scan_roundtrip_at_mid_disk() {
        let grid = goes_east();
        let (x, y) = (0.05, -0.08);
        let (lon, lat) = grid.scan_to_lonlat(x, y).unwrap();
        let (x2, y2) = grid.lonlat_to_scan(lon, lat).unwrap();
        assert!((x - x2).abs() < 1e-9, "x roundtrip {} vs {}", x, x2);
        assert!((y - y2).abs() < 1e-9, "y roundtrip {} vs {}", y, y2);
    }

    #[test]
    fn sweep_y_roundtrip() {
        let grid = GeosGrid::full_disk(140.7, SweepAxis::Y, 1000);
        let (lon, lat) = (135.0, -30.0);
        let (x, y) = grid.lonlat_to_scan(lon, lat).unwrap();
        let (lon2, lat2) = grid.scan_to_lonlat(x, y).unwrap();
        assert!((lon - lon2).abs() < 1e-6, "lon {} vs {}", lon, lon2);
        assert!((lat - lat2).abs() < 1e-6, "lat {} vs {}", lat, lat2);
    }

    #[test]
    fn grid_roundtrip_inside_disk() {
        let grid = goes_east();
        let (lon, lat) = (-95.0, 39.0);
        let (col, row) = grid.index_of(lon, lat).expect("visible point");
        assert!(col >= 0.0 && col < 1000.0, "col {}", col);
        assert!(row >= 0.0 && row < 1000.0, "row {}", row);
        let (lon2, lat2) = grid.lonlat_of(col, row).unwrap();
        assert!((lon - lon2).abs() < 1e-6);
        assert!((lat - lat2).abs() < 1e-6);
    }

    #[test]
    fn off_earth_scan_angle_is_none() {
        let grid = goes_east();
        assert!(grid.scan_to_lonlat(0.5, 0.5).is_none());
    }

    #[test]
    fn far_side_point_is_not_visible() {
        let grid = goes_east();
        assert!(grid.lonlat_to_scan(105.0, 0.0).is_none());
        assert!(!grid.contains(105.0, 0.0));
    }

    #[test]
    fn full_disk_bounds_cover_most_of_a_hemisphere() {
        let (min_lon, min_lat, max_lon, max_lat) = goes_east().geographic_bounds();
        assert!(min_lon < -140.0, "min_lon {}", min_lon);
        assert!(max_lon > -10.0, "max_lon {}", max_lon);
        assert!(min_lat < -75.0, "min_lat {}", min_lat);
        assert!(max_lat > 75.0, "max_lat {}", max_lat);
    }

    #[test]
    fn corner_pixels_of_full_disk_are_in_space() {
        let grid = goes_east();
        assert!(grid.lonlat_of(0.0, 0.0).is_none());
        assert!(grid.lonlat_of(999.0, 999.0).is_none());
    }
}
