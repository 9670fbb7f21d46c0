//! Multi-scene aggregation: group scene directories spanning a time
//! range and combine one channel per scene along a new temporal axis.
use std::fs;
use std::path::{Path, PathBuf};

use chrono::{DateTime, Utc};
use tracing::{info, warn};

use crate::core::chunks::DEFAULT_CHUNK_ROWS;
use crate::core::stack::LazyStack;
use crate::error::{Error, Result};
use crate::io::{DESCRIPTOR_FILE, SceneReader};
use crate::scene::ChannelQuery;

/// A time-ordered group of scene readers.
pub struct MultiScene {
    readers: Vec<SceneReader>,
}

impl MultiScene {
    /// Open the given scene directories and order them by acquisition
    /// start time.
    pub fn from_paths<P: AsRef<Path>>(paths: &[P]) -> Result<Self> {
        if paths.is_empty() {
            return Err(Error::InvalidArgument {
                arg: "paths",
                value: "no scene directories given".to_string(),
            });
        }
        let mut readers = Vec::with_capacity(paths.len());
        for path in paths {
            readers.push(SceneReader::open(path)?);
        }
        readers.sort_by_key(|reader| reader.start_time());
        info!("Grouped {} scene(s) by start time", readers.len());
        Ok(Self { readers })
    }

    /// Scan a directory for scene subdirectories (those containing a
    /// descriptor file) and open them all. Entries that are not scene
    /// directories are skipped with a warning.
    pub fn from_dir<P: AsRef<Path>>(dir: P) -> Result<Self> {
        let mut paths: Vec<PathBuf> = Vec::new();
        for entry in fs::read_dir(dir.as_ref())? {
            let entry = entry?;
            let path = entry.path();
            if path.is_dir() && path.join(DESCRIPTOR_FILE).is_file() {
                paths.push(path);
            } else {
                warn!("Skipping non-scene entry: {:?}", path);
            }
        }
        paths.sort();
        Self::from_paths(&paths)
    }

    pub fn len(&self) -> usize {
        self.readers.len()
    }

    pub fn is_empty(&self) -> bool {
        self.readers.is_empty()
    }

    pub fn readers(&self) -> &[SceneReader] {
        &self.readers
    }

    /// Acquisition start times, in stack order.
    pub fn times(&self) -> Vec<DateTime<Utc>> {
        self.readers.iter().map(|r| r.start_time()).collect()
    }

    /// Combine the queried channel of every scene along a new leading
    /// time axis.
    pub fn timeseries(&self, query: &ChannelQuery) -> Result<LazyStack> {
        self.timeseries_with_chunk_rows(query, DEFAULT_CHUNK_ROWS)
    }

    pub fn timeseries_with_chunk_rows(
        &self,
        query: &ChannelQuery,
        chunk_rows: usize,
    ) -> Result<LazyStack> {
        let mut frames = Vec::with_capacity(self.readers.len());
        for reader in &self.readers {
            let frame = reader.load_with_chunk_rows(query, chunk_rows)?;
            frames.push((reader.start_time(), frame));
        }
        LazyStack::from_frames(frames)
    }
}
