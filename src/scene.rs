//! `Scene`: an ordered collection of lazily loaded channels sharing one
//! geolocation, plus channel resolution by name or wavelength.
use tracing::debug;

use crate::core::array::LazyArray;
use crate::core::metadata::WavelengthBand;
use crate::geo::AreaDefinition;
use crate::io::SceneError;

/// Selects one channel of a scene.
#[derive(Debug, Clone, PartialEq)]
pub enum ChannelQuery {
    /// By configured channel name, e.g. `"C02"`.
    Name(String),
    /// By wavelength in micrometers, e.g. `0.485`.
    Wavelength(f64),
}

impl From<&str> for ChannelQuery {
    fn from(name: &str) -> Self {
        ChannelQuery::Name(name.to_string())
    }
}

impl From<String> for ChannelQuery {
    fn from(name: String) -> Self {
        ChannelQuery::Name(name)
    }
}

impl From<f64> for ChannelQuery {
    fn from(um: f64) -> Self {
        ChannelQuery::Wavelength(um)
    }
}

impl std::fmt::Display for ChannelQuery {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            ChannelQuery::Name(name) => write!(f, "{}", name),
            ChannelQuery::Wavelength(um) => write!(f, "{} um", um),
        }
    }
}

/// Resolve a wavelength key against configured channels.
///
/// Only channels whose band contains the key are candidates; among them
/// the nearest central wavelength wins. No candidate is a lookup error,
/// an exact distance tie is ambiguous. Both errors name what exists so
/// the caller can correct the query.
pub(crate) fn resolve_wavelength<'a, I>(channels: I, requested: f64) -> Result<&'a str, SceneError>
where
    I: Iterator<Item = (&'a str, Option<&'a WavelengthBand>)>,
{
    let mut described = Vec::new();
    let mut candidates: Vec<(&str, &WavelengthBand)> = Vec::new();
    for (name, band) in channels {
        if let Some(band) = band {
            described.push(format!("{} ({})", name, band));
            if band.contains(requested) {
                candidates.push((name, band));
            }
        }
    }

    if candidates.is_empty() {
        return Err(SceneError::NoWavelengthMatch {
            requested,
            available: described.join(", "),
        });
    }

    candidates.sort_by(|a, b| {
        a.1.distance(requested)
            .partial_cmp(&b.1.distance(requested))
            .unwrap_or(std::cmp::Ordering::Equal)
    });
    if candidates.len() > 1 && candidates[0].1.distance(requested) == candidates[1].1.distance(requested)
    {
        return Err(SceneError::AmbiguousWavelength {
            requested,
            candidates: candidates
                .iter()
                .take_while(|(_, band)| band.distance(requested) == candidates[0].1.distance(requested))
                .map(|(name, _)| *name)
                .collect::<Vec<_>>()
                .join(", "),
        });
    }

    debug!(
        "resolved {} um to channel '{}'",
        requested, candidates[0].0
    );
    Ok(candidates[0].0)
}

/// An ordered set of channels keyed by name, sharing a geolocation.
#[derive(Debug, Clone, Default)]
pub struct Scene {
    channels: Vec<LazyArray>,
    area: Option<AreaDefinition>,
}

impl Scene {
    pub fn new() -> Self {
        Self::default()
    }

    /// Insert a channel, replacing any existing channel of the same
    /// name. The scene adopts the channel's area when it has none yet.
    pub fn insert(&mut self, channel: LazyArray) {
        if self.area.is_none() {
            self.area = channel.meta().area.clone();
        }
        let name = channel.meta().name.clone();
        if let Some(existing) = self
            .channels
            .iter_mut()
            .find(|c| c.meta().name == name)
        {
            *existing = channel;
        } else {
            self.channels.push(channel);
        }
    }

    pub fn len(&self) -> usize {
        self.channels.len()
    }

    pub fn is_empty(&self) -> bool {
        self.channels.is_empty()
    }

    /// Channel names in insertion order.
    pub fn names(&self) -> Vec<&str> {
        self.channels.iter().map(|c| c.meta().name.as_str()).collect()
    }

    pub fn iter(&self) -> impl Iterator<Item = &LazyArray> {
        self.channels.iter()
    }

    pub fn area(&self) -> Option<&AreaDefinition> {
        self.area.as_ref()
    }

    /// Channel by exact name.
    pub fn get(&self, name: &str) -> Option<&LazyArray> {
        self.channels.iter().find(|c| c.meta().name == name)
    }

    /// Channel by wavelength key (um), resolved against channel bands.
    pub fn by_wavelength(&self, um: f64) -> Result<&LazyArray, SceneError> {
        let name = resolve_wavelength(
            self.channels
                .iter()
                .map(|c| (c.meta().name.as_str(), c.meta().wavelength.as_ref())),
            um,
        )?;
        self.channels
            .iter()
            .find(|c| c.meta().name == name)
            .ok_or_else(|| SceneError::ChannelNotAvailable {
                requested: name.to_string(),
                available: String::new(),
            })
    }

    /// Channel by query; name misses list what is available.
    pub fn query(&self, query: &ChannelQuery) -> Result<&LazyArray, SceneError> {
        match query {
            ChannelQuery::Name(name) => {
                self.get(name)
                    .ok_or_else(|| SceneError::ChannelNotAvailable {
                        requested: name.clone(),
                        available: self.names().join(", "),
                    })
            }
            ChannelQuery::Wavelength(um) => self.by_wavelength(*um),
        }
    }
}

#[cfg(test)]
mod tests {
    use ndarray::Array2;

    use super::*;
    use crate::core::metadata::ChannelMetadata;

    fn channel(name: &str, band: Option<WavelengthBand>) -> LazyArray {
        let mut meta = ChannelMetadata::named(name);
        meta.wavelength = band;
        LazyArray::from_array(Array2::zeros((2, 2)), meta)
    }

    fn demo_scene() -> Scene {
        let mut scene = Scene::new();
        scene.insert(channel("C01", Some(WavelengthBand::new(0.45, 0.47, 0.49))));
        scene.insert(channel("C02", Some(WavelengthBand::new(0.59, 0.64, 0.69))));
        scene.insert(channel("C07", Some(WavelengthBand::new(3.80, 3.90, 4.00))));
        scene
    }

    #[test]
    fn wavelength_key_resolves_to_containing_band() {
        let scene = demo_scene();
        let ch = scene.by_wavelength(0.485).unwrap();
        assert_eq!(ch.meta().name, "C01");
    }

    #[test]
    fn wavelength_key_outside_all_bands_fails() {
        let scene = demo_scene();
        let err = scene.by_wavelength(1.38).unwrap_err();
        assert!(matches!(err, SceneError::NoWavelengthMatch { .. }));
        // The message should point at the configured bands.
        assert!(err.to_string().contains("C01"));
    }

    #[test]
    fn overlapping_bands_prefer_nearest_central() {
        let mut scene = demo_scene();
        scene.insert(channel("wide", Some(WavelengthBand::new(0.4, 0.6, 0.8))));
        let ch = scene.by_wavelength(0.47).unwrap();
        assert_eq!(ch.meta().name, "C01");
    }

    #[test]
    fn exact_tie_is_ambiguous() {
        let mut scene = Scene::new();
        scene.insert(channel("a", Some(WavelengthBand::new(0.4, 0.5, 0.6))));
        scene.insert(channel("b", Some(WavelengthBand::new(0.45, 0.5, 0.65))));
        let err = scene.by_wavelength(0.5).unwrap_err();
        assert!(matches!(err, SceneError::AmbiguousWavelength { .. }));
    }

    #[test]
    fn missing_name_lists_available_channels() {
        let scene = demo_scene();
        let err = scene.query(&ChannelQuery::from("C13")).unwrap_err();
        match err {
            SceneError::ChannelNotAvailable {
                requested,
                available,
            } => {
                assert_eq!(requested, "C13");
                assert!(available.contains("C01"));
                assert!(available.contains("C07"));
            }
            other => panic!("unexpected error: {other}"),
        }
    }

    #[test]
    fn insert_replaces_same_name() {
        let mut scene = demo_scene();
        assert_eq!(scene.len(), 3);
        scene.insert(channel("C01", None));
        assert_eq!(scene.len(), 3);
        assert!(scene.get("C01").unwrap().meta().wavelength.is_none());
    }
}
