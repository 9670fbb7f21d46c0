use std::collections::BTreeMap;
use std::path::{Path, PathBuf};

use tracing::info;

use crate::core::metadata::ChannelMetadata;

/// Extract all metadata fields from ChannelMetadata into a flat map.
pub fn extract_metadata_fields(meta: &ChannelMetadata) -> BTreeMap<String, String> {
    let mut metadata = BTreeMap::new();

    // Identification
    metadata.insert("CHANNEL".to_string(), meta.name.clone());
    metadata.insert("PLATFORM".to_string(), meta.platform.clone());
    metadata.insert("SENSOR".to_string(), meta.sensor.clone());

    // Acquisition
    if let Some(start) = meta.start_time {
        metadata.insert("ACQUISITION_START".to_string(), start.to_rfc3339());
    }
    if let Some(end) = meta.end_time {
        metadata.insert("ACQUISITION_STOP".to_string(), end.to_rfc3339());
    }

    // Physics
    metadata.insert("CALIBRATION".to_string(), meta.calibration.to_string());
    metadata.insert("UNITS".to_string(), meta.units.clone());
    if let Some(band) = meta.wavelength {
        metadata.insert("WAVELENGTH_MIN_UM".to_string(), band.min.to_string());
        metadata.insert(
            "WAVELENGTH_CENTRAL_UM".to_string(),
            band.central.to_string(),
        );
        metadata.insert("WAVELENGTH_MAX_UM".to_string(), band.max.to_string());
    }
    if let Some(resolution) = meta.resolution {
        metadata.insert("RESOLUTION_M".to_string(), resolution.to_string());
    }

    // Geolocation
    if let Some(area) = &meta.area {
        metadata.insert("AREA_ID".to_string(), area.area_id.clone());
        metadata.insert("AREA_DESCRIPTION".to_string(), area.description.clone());
        metadata.insert("PROJECTION".to_string(), area.proj_string());
        let (min_lon, min_lat, max_lon, max_lat) = area.geographic_bounds();
        metadata.insert(
            "GEOGRAPHIC_BOUNDS".to_string(),
            format!("{:.4} {:.4} {:.4} {:.4}", min_lon, min_lat, max_lon, max_lat),
        );
    }

    // Free-form annotations
    for (key, value) in &meta.extra {
        metadata.insert(key.to_uppercase(), value.clone());
    }

    metadata
}

/// Path of the JSON sidecar belonging to an image file.
pub fn sidecar_path(image_path: &Path) -> PathBuf {
    let mut path = image_path.as_os_str().to_owned();
    path.push(".json");
    PathBuf::from(path)
}

/// Write a JSON metadata sidecar next to an image file.
pub fn write_json_sidecar(
    image_path: &Path,
    meta: &ChannelMetadata,
) -> Result<PathBuf, Box<dyn std::error::Error>> {
    let fields = extract_metadata_fields(meta);
    let json: BTreeMap<String, String> = fields
        .into_iter()
        .map(|(key, value)| (key.to_lowercase(), value))
        .collect();

    let path = sidecar_path(image_path);
    std::fs::write(&path, serde_json::to_string_pretty(&json)?)?;
    info!("Wrote metadata sidecar: {:?}", path);
    Ok(path)
}
