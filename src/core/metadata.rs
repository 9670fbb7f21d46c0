//! Channel metadata carried by every lazy container.
//!
//! Metadata travels with the deferred computation: every
//! container-producing operation yields a new container with inherited
//! (or explicitly replaced) metadata.
use std::collections::BTreeMap;

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use crate::geo::AreaDefinition;
use crate::types::Calibration;

/// Nominal wavelength band of a channel, in micrometers.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct WavelengthBand {
    pub min: f64,
    pub central: f64,
    pub max: f64,
}

impl WavelengthBand {
    pub fn new(min: f64, central: f64, max: f64) -> Self {
        Self { min, central, max }
    }

    /// Whether the given wavelength (um) falls within the band.
    pub fn contains(&self, um: f64) -> bool {
        um >= self.min && um <= self.max
    }

    /// Distance of the given wavelength (um) from the band center.
    pub fn distance(&self, um: f64) -> f64 {
        (um - self.central).abs()
    }
}

impl std::fmt::Display for WavelengthBand {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}-{}-{} um", self.min, self.central, self.max)
    }
}

/// Metadata describing one channel of a scene.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ChannelMetadata {
    // Identification
    pub name: String,
    pub platform: String,
    pub sensor: String,

    // Acquisition
    pub start_time: Option<DateTime<Utc>>,
    pub end_time: Option<DateTime<Utc>>,

    // Physics
    pub calibration: Calibration,
    pub units: String,
    pub wavelength: Option<WavelengthBand>,
    /// Nominal ground resolution in meters.
    pub resolution: Option<f64>,

    // Geolocation
    pub area: Option<AreaDefinition>,

    // Free-form annotations
    pub extra: BTreeMap<String, String>,
}

impl ChannelMetadata {
    /// Minimal metadata with the given channel name; everything else
    /// empty or defaulted.
    pub fn named(name: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            platform: String::new(),
            sensor: String::new(),
            start_time: None,
            end_time: None,
            calibration: Calibration::Counts,
            units: String::new(),
            wavelength: None,
            resolution: None,
            area: None,
            extra: BTreeMap::new(),
        }
    }

    /// Copy of this metadata under a different channel name.
    pub fn renamed(&self, name: impl Into<String>) -> Self {
        let mut meta = self.clone();
        meta.name = name.into();
        meta
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn band_containment_and_distance() {
        let band = WavelengthBand::new(0.45, 0.47, 0.49);
        assert!(band.contains(0.485));
        assert!(!band.contains(0.5));
        assert!((band.distance(0.485) - 0.015).abs() < 1e-12);
    }

    #[test]
    fn renamed_keeps_everything_else() {
        let mut meta = ChannelMetadata::named("C02");
        meta.units = "%".to_string();
        let renamed = meta.renamed("ndvi");
        assert_eq!(renamed.name, "ndvi");
        assert_eq!(renamed.units, "%");
    }
}
