//! Reader for scene directories.
//!
//! A scene directory pairs a `scene.json` descriptor (platform, sensor,
//! acquisition times, area parameters, channel table) with one raw
//! little-endian sample file per channel. Opening a scene parses and
//! validates the descriptor only; sample files are first touched when a
//! loaded channel is forced, and each window read opens its own file
//! handle so chunks can read concurrently.
use std::collections::BTreeMap;
use std::fs::{self, File};
use std::io::{Read, Seek, SeekFrom};
use std::path::{Path, PathBuf};
use std::sync::Arc;

use chrono::{DateTime, Utc};
use ndarray::Array2;
use serde::{Deserialize, Serialize};
use thiserror::Error;
use tracing::{debug, info};

use crate::core::array::LazyArray;
use crate::core::chunks::{DEFAULT_CHUNK_ROWS, Window};
use crate::core::eval::ComputeError;
use crate::core::metadata::{ChannelMetadata, WavelengthBand};
use crate::core::source::ChunkSource;
use crate::geo::AreaDefinition;
use crate::scene::{ChannelQuery, Scene, resolve_wavelength};
use crate::types::{Calibration, SampleType};

/// Name of the descriptor file inside a scene directory.
pub const DESCRIPTOR_FILE: &str = "scene.json";

/// Errors encountered when reading scene directories
#[derive(Debug, Error)]
pub enum SceneError {
    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),
    #[error("Descriptor parse error: {0}")]
    Json(#[from] serde_json::Error),
    #[error("Missing `{0}` in scene directory")]
    MissingField(&'static str),
    #[error("Malformed scene: {0}")]
    Malformed(String),
    #[error("Channel `{requested}` not available. Available: {available}")]
    ChannelNotAvailable { requested: String, available: String },
    #[error("No channel band contains {requested} um. Configured: {available}")]
    NoWavelengthMatch { requested: f64, available: String },
    #[error("Wavelength {requested} um is ambiguous between: {candidates}")]
    AmbiguousWavelength { requested: f64, candidates: String },
}

/// One channel entry of the descriptor.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ChannelDescriptor {
    pub name: String,
    /// Sample file, relative to the scene directory.
    pub file: String,
    pub dtype: SampleType,
    pub rows: usize,
    pub cols: usize,
    pub calibration: Calibration,
    pub units: String,
    #[serde(default)]
    pub wavelength: Option<WavelengthBand>,
    /// Nominal ground resolution in meters.
    #[serde(default)]
    pub resolution: Option<f64>,
    /// Calibration gain applied to raw samples.
    #[serde(default = "default_scale")]
    pub scale: f64,
    /// Calibration offset applied after the gain.
    #[serde(default)]
    pub offset: f64,
    /// Raw value marking invalid samples; masked to NaN before
    /// calibration.
    #[serde(default)]
    pub fill_value: Option<f64>,
}

fn default_scale() -> f64 {
    1.0
}

/// Parsed `scene.json`.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct SceneDescriptor {
    pub platform: String,
    pub sensor: String,
    pub start_time: DateTime<Utc>,
    pub end_time: DateTime<Utc>,
    pub area: AreaDefinition,
    pub channels: Vec<ChannelDescriptor>,
}

/// Reader for one scene directory.
#[derive(Debug)]
pub struct SceneReader {
    base_path: PathBuf,
    descriptor: SceneDescriptor,
}

impl SceneReader {
    /// Open and validate a scene directory. No sample data is read.
    pub fn open<P: AsRef<Path>>(dir: P) -> Result<Self, SceneError> {
        let base = dir.as_ref().to_path_buf();
        if !base.is_dir() {
            return Err(SceneError::MissingField("scene directory"));
        }
        let descriptor_path = base.join(DESCRIPTOR_FILE);
        if !descriptor_path.is_file() {
            return Err(SceneError::MissingField(DESCRIPTOR_FILE));
        }

        let text = fs::read_to_string(&descriptor_path)?;
        let descriptor: SceneDescriptor = serde_json::from_str(&text)?;
        Self::validate(&descriptor)?;

        info!(
            "Opened scene {:?}: {}/{}, {} channel(s)",
            base,
            descriptor.platform,
            descriptor.sensor,
            descriptor.channels.len()
        );
        Ok(Self {
            base_path: base,
            descriptor,
        })
    }

    fn validate(descriptor: &SceneDescriptor) -> Result<(), SceneError> {
        if descriptor.channels.is_empty() {
            return Err(SceneError::Malformed("scene has no channels".to_string()));
        }
        let area_shape = descriptor.area.shape();
        let mut seen = Vec::with_capacity(descriptor.channels.len());
        for channel in &descriptor.channels {
            if channel.rows == 0 || channel.cols == 0 {
                return Err(SceneError::Malformed(format!(
                    "channel `{}` declares an empty grid",
                    channel.name
                )));
            }
            if (channel.rows, channel.cols) != area_shape {
                return Err(SceneError::Malformed(format!(
                    "channel `{}` shape {}x{} does not match area `{}` shape {}x{}",
                    channel.name,
                    channel.rows,
                    channel.cols,
                    descriptor.area.area_id,
                    area_shape.0,
                    area_shape.1
                )));
            }
            if seen.contains(&channel.name.as_str()) {
                return Err(SceneError::Malformed(format!(
                    "duplicate channel name `{}`",
                    channel.name
                )));
            }
            seen.push(channel.name.as_str());
        }
        Ok(())
    }

    pub fn base_path(&self) -> &Path {
        &self.base_path
    }

    pub fn descriptor(&self) -> &SceneDescriptor {
        &self.descriptor
    }

    pub fn platform(&self) -> &str {
        &self.descriptor.platform
    }

    pub fn sensor(&self) -> &str {
        &self.descriptor.sensor
    }

    pub fn start_time(&self) -> DateTime<Utc> {
        self.descriptor.start_time
    }

    pub fn end_time(&self) -> DateTime<Utc> {
        self.descriptor.end_time
    }

    pub fn area(&self) -> &AreaDefinition {
        &self.descriptor.area
    }

    /// Names of the channels this scene offers, in descriptor order.
    /// Available before any sample data is read.
    pub fn available_channels(&self) -> Vec<&str> {
        self.descriptor
            .channels
            .iter()
            .map(|c| c.name.as_str())
            .collect()
    }

    /// Descriptor entry for a channel name.
    pub fn channel(&self, name: &str) -> Option<&ChannelDescriptor> {
        self.descriptor.channels.iter().find(|c| c.name == name)
    }

    /// Resolve a query to a descriptor entry without loading anything.
    pub fn resolve(&self, query: &ChannelQuery) -> Result<&ChannelDescriptor, SceneError> {
        match query {
            ChannelQuery::Name(name) => {
                self.channel(name)
                    .ok_or_else(|| SceneError::ChannelNotAvailable {
                        requested: name.clone(),
                        available: self.available_channels().join(", "),
                    })
            }
            ChannelQuery::Wavelength(um) => {
                let name = resolve_wavelength(
                    self.descriptor
                        .channels
                        .iter()
                        .map(|c| (c.name.as_str(), c.wavelength.as_ref())),
                    *um,
                )?;
                self.descriptor
                    .channels
                    .iter()
                    .find(|c| c.name == name)
                    .ok_or_else(|| SceneError::ChannelNotAvailable {
                        requested: name.to_string(),
                        available: String::new(),
                    })
            }
        }
    }

    /// Build the lazy channel selected by `query` with the default chunk
    /// granularity.
    pub fn load(&self, query: &ChannelQuery) -> Result<LazyArray, SceneError> {
        self.load_with_chunk_rows(query, DEFAULT_CHUNK_ROWS)
    }

    /// Build the lazy channel selected by `query`.
    ///
    /// Returns a deferred container; the sample file is only read when
    /// the container is forced. Fill masking and calibration gain/offset
    /// are recorded as graph operations.
    pub fn load_with_chunk_rows(
        &self,
        query: &ChannelQuery,
        chunk_rows: usize,
    ) -> Result<LazyArray, SceneError> {
        let channel = self.resolve(query)?;
        debug!(
            "loading channel '{}' ({}x{} {}, scale={}, offset={})",
            channel.name, channel.rows, channel.cols, channel.dtype, channel.scale, channel.offset
        );

        let source = RawFileSource {
            path: self.base_path.join(&channel.file),
            dtype: channel.dtype,
            rows: channel.rows,
            cols: channel.cols,
        };
        let mut array = LazyArray::from_source(
            Arc::new(source),
            chunk_rows,
            self.channel_metadata(channel),
        );
        if let Some(fill) = channel.fill_value {
            array = array.mask_value(fill);
        }
        if channel.scale != 1.0 {
            array = array.scale(channel.scale);
        }
        if channel.offset != 0.0 {
            array = array.offset(channel.offset);
        }
        Ok(array)
    }

    fn channel_metadata(&self, channel: &ChannelDescriptor) -> ChannelMetadata {
        ChannelMetadata {
            name: channel.name.clone(),
            platform: self.descriptor.platform.clone(),
            sensor: self.descriptor.sensor.clone(),
            start_time: Some(self.descriptor.start_time),
            end_time: Some(self.descriptor.end_time),
            calibration: channel.calibration,
            units: channel.units.clone(),
            wavelength: channel.wavelength,
            resolution: channel.resolution,
            area: Some(self.descriptor.area.clone()),
            extra: BTreeMap::new(),
        }
    }

    /// Load several queries into a `Scene`.
    pub fn scene(&self, queries: &[ChannelQuery]) -> Result<Scene, SceneError> {
        let mut scene = Scene::new();
        for query in queries {
            scene.insert(self.load(query)?);
        }
        Ok(scene)
    }

    /// Load every channel the descriptor offers.
    pub fn scene_all(&self) -> Result<Scene, SceneError> {
        let mut scene = Scene::new();
        for channel in &self.descriptor.channels {
            scene.insert(self.load(&ChannelQuery::Name(channel.name.clone()))?);
        }
        Ok(scene)
    }
}

/// Windowed reader over one raw little-endian sample file.
#[derive(Debug)]
struct RawFileSource {
    path: PathBuf,
    dtype: SampleType,
    rows: usize,
    cols: usize,
}

impl ChunkSource for RawFileSource {
    fn shape(&self) -> (usize, usize) {
        (self.rows, self.cols)
    }

    fn read_window(&self, window: Window) -> Result<Array2<f64>, ComputeError> {
        if !window.fits_within(self.shape()) {
            return Err(ComputeError::Unavailable(format!(
                "window {} outside declared {}x{} grid of {:?}",
                window, self.rows, self.cols, self.path
            )));
        }

        let mut file = File::open(&self.path).map_err(|e| {
            ComputeError::Unavailable(format!("cannot open {:?}: {}", self.path, e))
        })?;

        let elem = self.dtype.byte_len();
        let mut row_bytes = vec![0u8; window.cols * elem];
        let mut values = Vec::with_capacity(window.len());
        for r in 0..window.rows {
            let sample_index = (window.row + r) * self.cols + window.col;
            file.seek(SeekFrom::Start((sample_index * elem) as u64))
                .map_err(|e| {
                    ComputeError::Unavailable(format!("seek failed in {:?}: {}", self.path, e))
                })?;
            file.read_exact(&mut row_bytes).map_err(|e| {
                ComputeError::Unavailable(format!(
                    "truncated read in {:?} at row {}: {}",
                    self.path,
                    window.row + r,
                    e
                ))
            })?;
            match self.dtype {
                SampleType::U16 => {
                    for chunk in row_bytes.chunks_exact(2) {
                        values.push(u16::from_le_bytes([chunk[0], chunk[1]]) as f64);
                    }
                }
                SampleType::F32 => {
                    for chunk in row_bytes.chunks_exact(4) {
                        values
                            .push(f32::from_le_bytes([chunk[0], chunk[1], chunk[2], chunk[3]])
                                as f64);
                    }
                }
            }
        }

        Array2::from_shape_vec(window.shape(), values).map_err(|e| {
            ComputeError::Unavailable(format!("window assembly failed for {:?}: {}", self.path, e))
        })
    }

    fn describe(&self) -> String {
        format!("raw({:?})", self.path.file_name().unwrap_or_default())
    }
}
