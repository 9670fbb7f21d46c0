//! Geolocation layer: projected pixel grids and the `AreaDefinition`
//! descriptor that travels with channel metadata. Converts, on request,
//! to PROJ-style strings and deferred per-pixel lon/lat arrays.
pub mod area;
pub mod geos;
pub mod latlong;

pub use area::{AreaDefinition, Projection};
pub use geos::{GeosGrid, SweepAxis};
pub use latlong::LatLongGrid;
