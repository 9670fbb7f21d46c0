//! `LazyStack`: a time axis over lazy arrays.
//!
//! Combining scenes along a new leading time dimension yields a stack of
//! equally shaped frames, each still deferred. Per-frame elementwise
//! operations preserve deferredness; cross-frame reductions collapse back
//! onto the 2D task graph, so a mean over time is itself a `LazyArray`.
use chrono::{DateTime, Utc};
use ndarray::Array3;

use crate::core::array::LazyArray;
use crate::core::chunks::Window;
use crate::core::eval::ComputeError;
use crate::core::graph::BinaryOp;
use crate::error::{Error, Result};

/// A time-ordered stack of equally shaped lazy frames.
#[derive(Debug, Clone)]
pub struct LazyStack {
    frames: Vec<LazyArray>,
    times: Vec<DateTime<Utc>>,
}

impl LazyStack {
    /// Build a stack from timestamped frames.
    ///
    /// Frames are sorted by acquisition time; all frames must share one
    /// shape. An empty input is rejected.
    pub fn from_frames(frames: Vec<(DateTime<Utc>, LazyArray)>) -> Result<Self> {
        if frames.is_empty() {
            return Err(Error::Compute(ComputeError::EmptyStack));
        }

        let mut frames = frames;
        frames.sort_by_key(|(t, _)| *t);

        let shape = frames[0].1.shape();
        for (_, frame) in &frames {
            if frame.shape() != shape {
                return Err(Error::Compute(ComputeError::ShapeMismatch {
                    lhs: shape,
                    rhs: frame.shape(),
                }));
            }
        }

        let (times, frames) = frames.into_iter().unzip();
        Ok(Self { frames, times })
    }

    /// Number of time steps.
    pub fn len(&self) -> usize {
        self.frames.len()
    }

    pub fn is_empty(&self) -> bool {
        self.frames.is_empty()
    }

    /// Stack shape as (time, rows, cols).
    pub fn shape(&self) -> (usize, usize, usize) {
        let (rows, cols) = self.frames[0].shape();
        (self.frames.len(), rows, cols)
    }

    pub fn times(&self) -> &[DateTime<Utc>] {
        &self.times
    }

    pub fn frame(&self, index: usize) -> Option<&LazyArray> {
        self.frames.get(index)
    }

    pub fn frames(&self) -> impl Iterator<Item = (&DateTime<Utc>, &LazyArray)> {
        self.times.iter().zip(self.frames.iter())
    }

    /// Apply an elementwise transform to every frame, preserving
    /// deferredness and timestamps.
    pub fn map_frames(&self, f: impl Fn(&LazyArray) -> LazyArray) -> Self {
        Self {
            frames: self.frames.iter().map(f).collect(),
            times: self.times.clone(),
        }
    }

    /// Restrict the stack to a contiguous range of time steps.
    pub fn slice_time(&self, range: std::ops::Range<usize>) -> Result<Self> {
        if range.start >= range.end || range.end > self.frames.len() {
            return Err(Error::InvalidArgument {
                arg: "range",
                value: format!("{:?} of {} frame(s)", range, self.frames.len()),
            });
        }
        Ok(Self {
            frames: self.frames[range.clone()].to_vec(),
            times: self.times[range].to_vec(),
        })
    }

    /// Select the same spatial window in every frame.
    pub fn slice(&self, window: Window) -> Result<Self> {
        let frames = self
            .frames
            .iter()
            .map(|frame| frame.slice(window))
            .collect::<Result<Vec<_>>>()?;
        Ok(Self {
            frames,
            times: self.times.clone(),
        })
    }

    /// Deferred per-pixel sum across the time axis.
    pub fn sum_over_time(&self) -> LazyArray {
        let mut acc = self.frames[0].clone();
        for frame in &self.frames[1..] {
            acc = acc.binary(frame, BinaryOp::Add);
        }
        acc
    }

    /// Deferred per-pixel mean across the time axis.
    pub fn mean_over_time(&self) -> LazyArray {
        self.sum_over_time().scale(1.0 / self.frames.len() as f64)
    }

    /// Materialize the whole stack as a (time, rows, cols) cube.
    pub fn force(&self) -> Result<Array3<f64>> {
        let (steps, rows, cols) = self.shape();
        let mut cube = Array3::zeros((steps, rows, cols));
        for (index, frame) in self.frames.iter().enumerate() {
            let forced = frame.force()?;
            cube.index_axis_mut(ndarray::Axis(0), index).assign(&forced);
        }
        Ok(cube)
    }
}
