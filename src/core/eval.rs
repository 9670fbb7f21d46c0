//! The force engine: pull-based window evaluation of the task graph and
//! chunk-parallel materialization.
//!
//! Forcing partitions the output grid into row blocks, evaluates each
//! block on the rayon worker pool, and assembles the result in block
//! order. Reduction partials are likewise computed per block and combined
//! sequentially in block order, so a given granularity always produces
//! bit-identical results regardless of thread scheduling.
use ndarray::{Array2, Zip, s};
use rayon::prelude::*;
use thiserror::Error;
use tracing::trace;

use crate::core::chunks::{Window, row_blocks};
use crate::core::graph::Node;
use crate::core::source::ChunkSource;

/// Errors surfaced when a deferred computation is forced.
#[derive(Debug, Error)]
pub enum ComputeError {
    /// The underlying data source failed or the requested region lies
    /// outside its declared domain. Never accompanied by partial output.
    #[error("data unavailable: {0}")]
    Unavailable(String),

    #[error("shape mismatch: {lhs:?} vs {rhs:?}")]
    ShapeMismatch {
        lhs: (usize, usize),
        rhs: (usize, usize),
    },

    #[error("stack has no frames")]
    EmptyStack,
}

/// Reductions supported by the deferred scalar container.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ReduceOp {
    Sum,
    Mean,
    Min,
    Max,
}

impl std::fmt::Display for ReduceOp {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            ReduceOp::Sum => write!(f, "sum"),
            ReduceOp::Mean => write!(f, "mean"),
            ReduceOp::Min => write!(f, "min"),
            ReduceOp::Max => write!(f, "max"),
        }
    }
}

/// Evaluate one output window of a node.
///
/// Evaluation is pull-based: a window request on a slice or an
/// elementwise node translates into window requests on its inputs, so no
/// samples outside the requested region are ever read or computed.
pub(crate) fn eval_window(node: &Node, window: Window) -> Result<Array2<f64>, ComputeError> {
    match node {
        Node::Source { source } => {
            if !window.fits_within(source.shape()) {
                return Err(ComputeError::Unavailable(format!(
                    "window {} outside {} of shape {:?}",
                    window,
                    source.describe(),
                    source.shape()
                )));
            }
            source.read_window(window)
        }
        Node::Unary { input, op } => {
            let mut out = eval_window(input, window)?;
            out.mapv_inplace(|v| op.apply(v));
            Ok(out)
        }
        Node::Binary { lhs, rhs, op } => {
            if lhs.shape() != rhs.shape() {
                return Err(ComputeError::ShapeMismatch {
                    lhs: lhs.shape(),
                    rhs: rhs.shape(),
                });
            }
            let a = eval_window(lhs, window)?;
            let b = eval_window(rhs, window)?;
            let mut out = a;
            Zip::from(&mut out).and(&b).for_each(|o, &r| {
                *o = op.apply(*o, r);
            });
            Ok(out)
        }
        Node::Scalar {
            input,
            op,
            operand,
            scalar_left,
        } => {
            let mut out = eval_window(input, window)?;
            if *scalar_left {
                out.mapv_inplace(|v| op.apply(*operand, v));
            } else {
                out.mapv_inplace(|v| op.apply(v, *operand));
            }
            Ok(out)
        }
        Node::Slice {
            input,
            window: slice,
        } => eval_window(input, window.offset_by(slice)),
    }
}

/// Materialize the full output of a node, evaluating row blocks of at
/// most `chunk_rows` rows concurrently.
pub fn force(node: &Node, chunk_rows: usize) -> Result<Array2<f64>, ComputeError> {
    let shape = node.shape();
    let blocks = row_blocks(shape, chunk_rows);
    trace!(
        "forcing {:?} as {} block(s) of <= {} rows",
        shape,
        blocks.len(),
        chunk_rows.max(1)
    );

    let parts: Vec<Result<Array2<f64>, ComputeError>> = blocks
        .par_iter()
        .map(|block| eval_window(node, *block))
        .collect();

    let mut out = Array2::zeros(shape);
    for (block, part) in blocks.iter().zip(parts) {
        let part = part?;
        out.slice_mut(s![
            block.row..block.end_row(),
            block.col..block.end_col()
        ])
        .assign(&part);
    }
    Ok(out)
}

/// Streaming statistics of one evaluated block. Non-finite samples are
/// skipped; satellite grids mark space and fill pixels as NaN.
#[derive(Debug, Clone, Copy)]
struct BlockStats {
    sum: f64,
    count: u64,
    min: f64,
    max: f64,
}

impl BlockStats {
    fn of(data: &Array2<f64>) -> Self {
        let mut stats = BlockStats {
            sum: 0.0,
            count: 0,
            min: f64::INFINITY,
            max: f64::NEG_INFINITY,
        };
        for &v in data.iter() {
            if !v.is_finite() {
                continue;
            }
            stats.sum += v;
            stats.count += 1;
            if v < stats.min {
                stats.min = v;
            }
            if v > stats.max {
                stats.max = v;
            }
        }
        stats
    }

    fn merge(self, other: BlockStats) -> Self {
        BlockStats {
            sum: self.sum + other.sum,
            count: self.count + other.count,
            min: self.min.min(other.min),
            max: self.max.max(other.max),
        }
    }
}

/// Force a reduction over a node.
///
/// Per-block partials run in parallel; the final combination folds them
/// in block order, keeping the result independent of scheduling. An
/// all-invalid input reduces to NaN rather than erroring.
pub fn reduce(node: &Node, op: ReduceOp, chunk_rows: usize) -> Result<f64, ComputeError> {
    let blocks = row_blocks(node.shape(), chunk_rows);

    let parts: Vec<Result<BlockStats, ComputeError>> = blocks
        .par_iter()
        .map(|block| eval_window(node, *block).map(|data| BlockStats::of(&data)))
        .collect();

    let mut total = BlockStats {
        sum: 0.0,
        count: 0,
        min: f64::INFINITY,
        max: f64::NEG_INFINITY,
    };
    for part in parts {
        total = total.merge(part?);
    }

    if total.count == 0 {
        return Ok(f64::NAN);
    }
    Ok(match op {
        ReduceOp::Sum => total.sum,
        ReduceOp::Mean => total.sum / total.count as f64,
        ReduceOp::Min => total.min,
        ReduceOp::Max => total.max,
    })
}

#[cfg(test)]
mod tests {
    use std::sync::Arc;

    use ndarray::array;

    use super::*;
    use crate::core::graph::{BinaryOp, UnaryOp};
    use crate::core::source::MemorySource;

    fn leaf(data: Array2<f64>) -> Arc<Node> {
        Arc::new(Node::Source {
            source: Arc::new(MemorySource::new(data)),
        })
    }

    #[test]
    fn force_matches_eager_chain() {
        let a = array![[1.0, 2.0], [3.0, 4.0]];
        let b = array![[10.0, 20.0], [30.0, 40.0]];
        let node = Node::Binary {
            lhs: Arc::new(Node::Unary {
                input: leaf(a.clone()),
                op: UnaryOp::Scale(2.0),
            }),
            rhs: leaf(b.clone()),
            op: BinaryOp::Add,
        };
        let forced = force(&node, 1).unwrap();
        assert_eq!(forced, a.mapv(|v| v * 2.0) + b);
    }

    #[test]
    fn shape_mismatch_surfaces_at_force_time() {
        let node = Node::Binary {
            lhs: leaf(Array2::zeros((2, 2))),
            rhs: leaf(Array2::zeros((3, 2))),
            op: BinaryOp::Add,
        };
        let err = force(&node, 16).unwrap_err();
        assert!(matches!(err, ComputeError::ShapeMismatch { .. }));
    }

    #[test]
    fn slice_evaluation_stays_within_selection() {
        // A 2x2 slice of a larger grid; the source rejects reads outside
        // itself, so an engine that over-reads would error here.
        let node = Node::Slice {
            input: leaf(array![[1.0, 2.0, 3.0], [4.0, 5.0, 6.0], [7.0, 8.0, 9.0]]),
            window: Window::new(1, 1, 2, 2),
        };
        let forced = force(&node, 1).unwrap();
        assert_eq!(forced, array![[5.0, 6.0], [8.0, 9.0]]);
    }

    #[test]
    fn reduce_skips_non_finite_samples() {
        let node = leaf(array![[1.0, f64::NAN], [3.0, f64::INFINITY]]);
        assert_eq!(reduce(&node, ReduceOp::Sum, 1).unwrap(), 4.0);
        assert_eq!(reduce(&node, ReduceOp::Mean, 1).unwrap(), 2.0);
        assert_eq!(reduce(&node, ReduceOp::Min, 1).unwrap(), 1.0);
        assert_eq!(reduce(&node, ReduceOp::Max, 1).unwrap(), 3.0);
    }

    #[test]
    fn reduce_of_all_invalid_is_nan() {
        let node = leaf(array![[f64::NAN, f64::NAN]]);
        assert!(reduce(&node, ReduceOp::Mean, 4).unwrap().is_nan());
    }
}
