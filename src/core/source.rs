//! Data sources for leaf nodes of the task graph.
//!
//! A `ChunkSource` describes where samples come from without reading any.
//! Sources must tolerate concurrent window reads; the force engine calls
//! `read_window` from multiple worker threads at once.
use ndarray::Array2;

use crate::core::chunks::Window;
use crate::core::eval::ComputeError;

/// A deferred 2D sample supplier.
///
/// Implementations declare their grid shape up front and produce samples
/// for a requested window on demand. Reads outside the declared shape
/// must fail with [`ComputeError::Unavailable`], never return padded or
/// zero-filled data.
pub trait ChunkSource: Send + Sync {
    /// Declared grid shape (rows, cols). Must not require reading data.
    fn shape(&self) -> (usize, usize);

    /// Produce the samples of `window`, which is guaranteed by callers to
    /// lie within `shape()`.
    fn read_window(&self, window: Window) -> Result<Array2<f64>, ComputeError>;

    /// Short human-readable description used in logs and `Debug` output.
    fn describe(&self) -> String {
        "source".to_string()
    }
}

/// A source backed by a resident array. Used for programmatically built
/// channels and throughout the test suite.
#[derive(Debug, Clone)]
pub struct MemorySource {
    data: Array2<f64>,
}

impl MemorySource {
    pub fn new(data: Array2<f64>) -> Self {
        Self { data }
    }
}

impl ChunkSource for MemorySource {
    fn shape(&self) -> (usize, usize) {
        self.data.dim()
    }

    fn read_window(&self, window: Window) -> Result<Array2<f64>, ComputeError> {
        if !window.fits_within(self.shape()) {
            return Err(ComputeError::Unavailable(format!(
                "window {} outside in-memory grid of shape {:?}",
                window,
                self.shape()
            )));
        }
        Ok(self
            .data
            .slice(ndarray::s![
                window.row..window.end_row(),
                window.col..window.end_col()
            ])
            .to_owned())
    }

    fn describe(&self) -> String {
        let (rows, cols) = self.shape();
        format!("memory({}x{})", rows, cols)
    }
}
