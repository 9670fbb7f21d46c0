//! Area definitions: the geolocation descriptor carried by channel
//! metadata.
//!
//! An `AreaDefinition` names a projected pixel grid and converts it, on
//! request, into forms other subsystems understand: a PROJ-style string
//! for mapping tools, geographic bounds, and deferred per-pixel
//! longitude/latitude arrays partitioned by a caller-supplied chunk size.
use std::sync::Arc;

use ndarray::Array2;
use serde::{Deserialize, Serialize};

use crate::core::array::LazyArray;
use crate::core::chunks::Window;
use crate::core::eval::ComputeError;
use crate::core::metadata::ChannelMetadata;
use crate::core::source::ChunkSource;
use crate::geo::geos::GeosGrid;
use crate::geo::latlong::LatLongGrid;

/// A projected pixel grid.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "type", rename_all = "snake_case")]
pub enum Projection {
    Geostationary(GeosGrid),
    PlateCarree(LatLongGrid),
}

impl Projection {
    pub fn shape(&self) -> (usize, usize) {
        match self {
            Projection::Geostationary(grid) => grid.shape(),
            Projection::PlateCarree(grid) => grid.shape(),
        }
    }

    /// Geographic (lon, lat) of a fractional pixel index, degrees.
    /// None when the pixel does not map onto the Earth.
    pub fn lonlat_of(&self, col: f64, row: f64) -> Option<(f64, f64)> {
        match self {
            Projection::Geostationary(grid) => grid.lonlat_of(col, row),
            Projection::PlateCarree(grid) => Some(grid.lonlat_of(col, row)),
        }
    }

    /// Fractional pixel index (col, row) of a geographic point, or None
    /// when the point is not representable (e.g. behind the Earth limb).
    pub fn index_of(&self, lon: f64, lat: f64) -> Option<(f64, f64)> {
        match self {
            Projection::Geostationary(grid) => grid.index_of(lon, lat),
            Projection::PlateCarree(grid) => Some(grid.index_of(lon, lat)),
        }
    }

    /// Bounding box (min_lon, min_lat, max_lon, max_lat) in degrees.
    pub fn geographic_bounds(&self) -> (f64, f64, f64, f64) {
        match self {
            Projection::Geostationary(grid) => grid.geographic_bounds(),
            Projection::PlateCarree(grid) => grid.geographic_bounds(),
        }
    }

    /// PROJ-style description of the projection, for handing to mapping
    /// and rendering subsystems.
    pub fn proj_string(&self) -> String {
        match self {
            Projection::Geostationary(grid) => format!(
                "+proj=geos +lon_0={} +h={} +a={} +b={} +sweep={} +units=m +no_defs",
                grid.sub_lon,
                grid.satellite_height,
                grid.equatorial_radius,
                grid.polar_radius,
                grid.sweep
            ),
            Projection::PlateCarree(_) => "+proj=longlat +datum=WGS84 +no_defs".to_string(),
        }
    }
}

/// A named geolocation descriptor: projection plus identification.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct AreaDefinition {
    pub area_id: String,
    pub description: String,
    pub projection: Projection,
}

impl AreaDefinition {
    pub fn new(
        area_id: impl Into<String>,
        description: impl Into<String>,
        projection: Projection,
    ) -> Self {
        Self {
            area_id: area_id.into(),
            description: description.into(),
            projection,
        }
    }

    pub fn shape(&self) -> (usize, usize) {
        self.projection.shape()
    }

    pub fn rows(&self) -> usize {
        self.shape().0
    }

    pub fn cols(&self) -> usize {
        self.shape().1
    }

    pub fn proj_string(&self) -> String {
        self.projection.proj_string()
    }

    pub fn geographic_bounds(&self) -> (f64, f64, f64, f64) {
        self.projection.geographic_bounds()
    }

    pub fn contains(&self, lon: f64, lat: f64) -> bool {
        match self.projection.index_of(lon, lat) {
            Some((col, row)) => {
                let (rows, cols) = self.shape();
                col >= 0.0 && col < cols as f64 && row >= 0.0 && row < rows as f64
            }
            None => false,
        }
    }

    /// Deferred per-pixel (longitude, latitude) arrays in degrees,
    /// partitioned into row blocks of `chunk_rows`.
    ///
    /// Nothing is computed until the returned containers are forced;
    /// pixels that do not map onto the Earth force to NaN.
    pub fn lonlats(&self, chunk_rows: usize) -> (LazyArray, LazyArray) {
        let lon = self.coordinate_array(GeoComponent::Lon, chunk_rows);
        let lat = self.coordinate_array(GeoComponent::Lat, chunk_rows);
        (lon, lat)
    }

    fn coordinate_array(&self, component: GeoComponent, chunk_rows: usize) -> LazyArray {
        let mut meta = ChannelMetadata::named(component.name());
        meta.units = component.units().to_string();
        meta.area = Some(self.clone());
        LazyArray::from_source(
            Arc::new(LonLatSource {
                projection: self.projection.clone(),
                component,
            }),
            chunk_rows,
            meta,
        )
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum GeoComponent {
    Lon,
    Lat,
}

impl GeoComponent {
    fn name(self) -> &'static str {
        match self {
            GeoComponent::Lon => "longitude",
            GeoComponent::Lat => "latitude",
        }
    }

    fn units(self) -> &'static str {
        match self {
            GeoComponent::Lon => "degrees_east",
            GeoComponent::Lat => "degrees_north",
        }
    }
}

/// Computes geographic coordinates per pixel window on demand.
#[derive(Debug, Clone)]
struct LonLatSource {
    projection: Projection,
    component: GeoComponent,
}

impl ChunkSource for LonLatSource {
    fn shape(&self) -> (usize, usize) {
        self.projection.shape()
    }

    fn read_window(&self, window: Window) -> Result<Array2<f64>, ComputeError> {
        if !window.fits_within(self.shape()) {
            return Err(ComputeError::Unavailable(format!(
                "window {} outside grid of shape {:?}",
                window,
                self.shape()
            )));
        }
        Ok(Array2::from_shape_fn(window.shape(), |(r, c)| {
            let col = (window.col + c) as f64;
            let row = (window.row + r) as f64;
            match self.projection.lonlat_of(col, row) {
                Some((lon, lat)) => match self.component {
                    GeoComponent::Lon => lon,
                    GeoComponent::Lat => lat,
                },
                None => f64::NAN,
            }
        }))
    }

    fn describe(&self) -> String {
        format!("lonlat({})", self.component.name())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::geo::geos::SweepAxis;

    fn plate_carree_area() -> AreaDefinition {
        AreaDefinition::new(
            "global_10",
            "10x10 global grid",
            Projection::PlateCarree(LatLongGrid::global(10, 10)),
        )
    }

    #[test]
    fn lonlats_are_deferred_and_labeled() {
        let area = plate_carree_area();
        let (lon, lat) = area.lonlats(4);
        assert_eq!(lon.shape(), (10, 10));
        assert_eq!(lon.meta().name, "longitude");
        assert_eq!(lat.meta().units, "degrees_north");

        let lon_vals = lon.force().unwrap();
        assert!((lon_vals[[0, 0]] - (-162.0)).abs() < 1e-9);
        let lat_vals = lat.force().unwrap();
        assert!((lat_vals[[0, 0]] - 81.0).abs() < 1e-9);
    }

    #[test]
    fn geos_lonlats_mark_space_pixels_nan() {
        let area = AreaDefinition::new(
            "fd",
            "small full disk",
            Projection::Geostationary(GeosGrid::full_disk(0.0, SweepAxis::X, 64)),
        );
        let (lon, _) = area.lonlats(16);
        let vals = lon.force().unwrap();
        // Grid corner is off the disk, center is on it.
        assert!(vals[[0, 0]].is_nan());
        assert!(vals[[32, 32]].is_finite());
    }

    #[test]
    fn proj_string_names_the_projection() {
        let area = plate_carree_area();
        assert!(area.proj_string().starts_with("+proj=longlat"));

        let geos = AreaDefinition::new(
            "fd",
            "full disk",
            Projection::Geostationary(GeosGrid::full_disk(-75.0, SweepAxis::X, 100)),
        );
        let s = geos.proj_string();
        assert!(s.contains("+proj=geos"));
        assert!(s.contains("+lon_0=-75"));
        assert!(s.contains("+sweep=x"));
    }

    #[test]
    fn containment_respects_grid_extent() {
        let area = plate_carree_area();
        assert!(area.contains(0.0, 0.0));

        let geos = AreaDefinition::new(
            "fd",
            "full disk",
            Projection::Geostationary(GeosGrid::full_disk(-75.0, SweepAxis::X, 100)),
        );
        assert!(geos.contains(-75.0, 0.0));
        assert!(!geos.contains(105.0, 0.0));
    }
}
