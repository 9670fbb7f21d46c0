//! `LazyArray`: the labeled lazy array container.
//!
//! A `LazyArray` pairs an immutable task-graph node with a chunk
//! granularity and channel metadata. Building one, combining two, or
//! slicing one never reads or computes samples; only [`LazyArray::force`]
//! does, and it runs chunk tasks on the rayon pool. Containers are cheap
//! to clone and safe to share across threads.
use std::sync::Arc;

use ndarray::Array2;
use tracing::debug;

use crate::core::chunks::{DEFAULT_CHUNK_ROWS, Window};
use crate::core::eval::{self, ReduceOp};
use crate::core::graph::{BinaryOp, Node, UnaryOp};
use crate::core::metadata::ChannelMetadata;
use crate::core::source::{ChunkSource, MemorySource};
use crate::error::{Error, Result};

/// A deferred, metadata-carrying 2D array of `f64` samples.
#[derive(Clone)]
pub struct LazyArray {
    node: Arc<Node>,
    chunk_rows: usize,
    meta: ChannelMetadata,
}

impl LazyArray {
    /// Wrap a data source without reading from it.
    pub fn from_source(
        source: Arc<dyn ChunkSource>,
        chunk_rows: usize,
        meta: ChannelMetadata,
    ) -> Self {
        Self {
            node: Arc::new(Node::Source { source }),
            chunk_rows: chunk_rows.max(1),
            meta,
        }
    }

    /// Wrap resident samples. The array becomes the backing source; no
    /// copy is made until windows are evaluated.
    pub fn from_array(data: Array2<f64>, meta: ChannelMetadata) -> Self {
        Self::from_source(Arc::new(MemorySource::new(data)), DEFAULT_CHUNK_ROWS, meta)
    }

    /// Declared output shape (rows, cols).
    pub fn shape(&self) -> (usize, usize) {
        self.node.shape()
    }

    pub fn rows(&self) -> usize {
        self.shape().0
    }

    pub fn cols(&self) -> usize {
        self.shape().1
    }

    /// Rows per chunk used when this container is forced.
    pub fn chunk_rows(&self) -> usize {
        self.chunk_rows
    }

    /// Same computation, different partition granularity.
    pub fn with_chunk_rows(&self, chunk_rows: usize) -> Self {
        Self {
            node: Arc::clone(&self.node),
            chunk_rows: chunk_rows.max(1),
            meta: self.meta.clone(),
        }
    }

    pub fn meta(&self) -> &ChannelMetadata {
        &self.meta
    }

    /// Same computation, explicitly replaced metadata.
    pub fn with_meta(&self, meta: ChannelMetadata) -> Self {
        Self {
            node: Arc::clone(&self.node),
            chunk_rows: self.chunk_rows,
            meta,
        }
    }

    /// Same computation under a new channel name.
    pub fn renamed(&self, name: impl Into<String>) -> Self {
        self.with_meta(self.meta.renamed(name))
    }

    fn unary(&self, op: UnaryOp) -> Self {
        Self {
            node: Arc::new(Node::Unary {
                input: Arc::clone(&self.node),
                op,
            }),
            chunk_rows: self.chunk_rows,
            meta: self.meta.clone(),
        }
    }

    pub(crate) fn binary(&self, other: &LazyArray, op: BinaryOp) -> Self {
        // Metadata is inherited from the left operand; a shape mismatch
        // is recorded in the graph and surfaces when forced.
        Self {
            node: Arc::new(Node::Binary {
                lhs: Arc::clone(&self.node),
                rhs: Arc::clone(&other.node),
                op,
            }),
            chunk_rows: self.chunk_rows,
            meta: self.meta.clone(),
        }
    }

    pub(crate) fn scalar(&self, operand: f64, op: BinaryOp, scalar_left: bool) -> Self {
        Self {
            node: Arc::new(Node::Scalar {
                input: Arc::clone(&self.node),
                op,
                operand,
                scalar_left,
            }),
            chunk_rows: self.chunk_rows,
            meta: self.meta.clone(),
        }
    }

    /// Multiply every sample by a constant.
    pub fn scale(&self, k: f64) -> Self {
        self.unary(UnaryOp::Scale(k))
    }

    /// Add a constant to every sample.
    pub fn offset(&self, c: f64) -> Self {
        self.unary(UnaryOp::Offset(c))
    }

    /// Base-10 logarithm; non-positive samples become NaN.
    pub fn log10(&self) -> Self {
        self.unary(UnaryOp::Log10)
    }

    pub fn abs(&self) -> Self {
        self.unary(UnaryOp::Abs)
    }

    /// Square root; negative samples become NaN.
    pub fn sqrt(&self) -> Self {
        self.unary(UnaryOp::Sqrt)
    }

    pub fn powi(&self, n: i32) -> Self {
        self.unary(UnaryOp::Powi(n))
    }

    /// Clamp samples into [lo, hi]; NaN passes through.
    pub fn clamp(&self, lo: f64, hi: f64) -> Self {
        self.unary(UnaryOp::Clamp(lo, hi))
    }

    /// Replace samples equal to `fill` with NaN.
    pub fn mask_value(&self, fill: f64) -> Self {
        self.unary(UnaryOp::MaskValue(fill))
    }

    /// Elementwise minimum with another container.
    pub fn min_with(&self, other: &LazyArray) -> Self {
        self.binary(other, BinaryOp::Min)
    }

    /// Elementwise maximum with another container.
    pub fn max_with(&self, other: &LazyArray) -> Self {
        self.binary(other, BinaryOp::Max)
    }

    /// Elementwise `self > other` as a 0.0/1.0 mask.
    pub fn gt(&self, other: &LazyArray) -> Self {
        self.binary(other, BinaryOp::Gt)
    }

    pub fn ge(&self, other: &LazyArray) -> Self {
        self.binary(other, BinaryOp::Ge)
    }

    pub fn lt(&self, other: &LazyArray) -> Self {
        self.binary(other, BinaryOp::Lt)
    }

    pub fn le(&self, other: &LazyArray) -> Self {
        self.binary(other, BinaryOp::Le)
    }

    /// Elementwise `self > value` as a 0.0/1.0 mask.
    pub fn gt_value(&self, value: f64) -> Self {
        self.scalar(value, BinaryOp::Gt, false)
    }

    pub fn lt_value(&self, value: f64) -> Self {
        self.scalar(value, BinaryOp::Lt, false)
    }

    /// Select a sub-window. The selection stays deferred; forcing it
    /// never evaluates samples outside the window.
    ///
    /// Out-of-bounds windows are rejected here, while the container still
    /// knows its declared shape.
    pub fn slice(&self, window: Window) -> Result<Self> {
        if !window.fits_within(self.shape()) {
            return Err(Error::InvalidArgument {
                arg: "window",
                value: format!("{} outside shape {:?}", window, self.shape()),
            });
        }
        Ok(Self {
            node: Arc::new(Node::Slice {
                input: Arc::clone(&self.node),
                window,
            }),
            chunk_rows: self.chunk_rows,
            meta: self.meta.clone(),
        })
    }

    /// Deferred sum over all valid samples.
    pub fn sum(&self) -> LazyScalar {
        self.reduce(ReduceOp::Sum)
    }

    /// Deferred mean over all valid samples.
    pub fn mean(&self) -> LazyScalar {
        self.reduce(ReduceOp::Mean)
    }

    /// Deferred minimum over all valid samples.
    pub fn min(&self) -> LazyScalar {
        self.reduce(ReduceOp::Min)
    }

    /// Deferred maximum over all valid samples.
    pub fn max(&self) -> LazyScalar {
        self.reduce(ReduceOp::Max)
    }

    fn reduce(&self, op: ReduceOp) -> LazyScalar {
        LazyScalar {
            node: Arc::clone(&self.node),
            op,
            chunk_rows: self.chunk_rows,
        }
    }

    /// Execute the deferred computation and return resident samples.
    ///
    /// Chunks are evaluated concurrently; the result equals eager
    /// evaluation of the same operation chain regardless of granularity
    /// or scheduling.
    pub fn force(&self) -> Result<Array2<f64>> {
        let (rows, cols) = self.shape();
        debug!(
            "forcing '{}' ({}x{}, chunk_rows={})",
            self.meta.name, rows, cols, self.chunk_rows
        );
        Ok(eval::force(&self.node, self.chunk_rows)?)
    }
}

impl std::fmt::Debug for LazyArray {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("LazyArray")
            .field("name", &self.meta.name)
            .field("shape", &self.shape())
            .field("chunk_rows", &self.chunk_rows)
            .field("graph", &self.node)
            .finish()
    }
}

/// A deferred scalar: the not-yet-computed result of a reduction.
#[derive(Clone)]
pub struct LazyScalar {
    node: Arc<Node>,
    op: ReduceOp,
    chunk_rows: usize,
}

impl LazyScalar {
    pub fn op(&self) -> ReduceOp {
        self.op
    }

    /// Same reduction, different partition granularity.
    pub fn with_chunk_rows(&self, chunk_rows: usize) -> Self {
        Self {
            node: Arc::clone(&self.node),
            op: self.op,
            chunk_rows: chunk_rows.max(1),
        }
    }

    /// Execute the reduction. Partials are combined in chunk order, so
    /// results for a fixed granularity are bit-deterministic; different
    /// granularities agree within floating-point tolerance.
    pub fn force(&self) -> Result<f64> {
        Ok(eval::reduce(&self.node, self.op, self.chunk_rows)?)
    }
}

impl std::fmt::Debug for LazyScalar {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("LazyScalar")
            .field("op", &self.op)
            .field("shape", &self.node.shape())
            .finish()
    }
}

macro_rules! impl_lazy_binop {
    ($trait:ident, $method:ident, $op:expr) => {
        impl std::ops::$trait<&LazyArray> for &LazyArray {
            type Output = LazyArray;
            fn $method(self, rhs: &LazyArray) -> LazyArray {
                self.binary(rhs, $op)
            }
        }

        impl std::ops::$trait<LazyArray> for LazyArray {
            type Output = LazyArray;
            fn $method(self, rhs: LazyArray) -> LazyArray {
                self.binary(&rhs, $op)
            }
        }

        impl std::ops::$trait<&LazyArray> for LazyArray {
            type Output = LazyArray;
            fn $method(self, rhs: &LazyArray) -> LazyArray {
                self.binary(rhs, $op)
            }
        }

        impl std::ops::$trait<f64> for &LazyArray {
            type Output = LazyArray;
            fn $method(self, rhs: f64) -> LazyArray {
                self.scalar(rhs, $op, false)
            }
        }

        impl std::ops::$trait<f64> for LazyArray {
            type Output = LazyArray;
            fn $method(self, rhs: f64) -> LazyArray {
                self.scalar(rhs, $op, false)
            }
        }

        impl std::ops::$trait<&LazyArray> for f64 {
            type Output = LazyArray;
            fn $method(self, rhs: &LazyArray) -> LazyArray {
                rhs.scalar(self, $op, true)
            }
        }

        impl std::ops::$trait<LazyArray> for f64 {
            type Output = LazyArray;
            fn $method(self, rhs: LazyArray) -> LazyArray {
                rhs.scalar(self, $op, true)
            }
        }
    };
}

impl_lazy_binop!(Add, add, BinaryOp::Add);
impl_lazy_binop!(Sub, sub, BinaryOp::Sub);
impl_lazy_binop!(Mul, mul, BinaryOp::Mul);
impl_lazy_binop!(Div, div, BinaryOp::Div);

#[cfg(test)]
mod tests {
    use ndarray::array;

    use super::*;

    fn channel(name: &str, data: Array2<f64>) -> LazyArray {
        LazyArray::from_array(data, ChannelMetadata::named(name))
    }

    #[test]
    fn arithmetic_stays_deferred_and_forces_correctly() {
        let a = channel("a", array![[1.0, 2.0], [3.0, 4.0]]);
        let b = channel("b", array![[4.0, 3.0], [2.0, 1.0]]);

        let expr = (&a + &b) * 2.0 - 1.0;
        // Still a description, not data.
        assert_eq!(expr.shape(), (2, 2));

        let forced = expr.force().unwrap();
        assert_eq!(forced, array![[9.0, 9.0], [9.0, 9.0]]);
    }

    #[test]
    fn scalar_on_the_left_respects_operand_order() {
        let a = channel("a", array![[2.0, 4.0]]);
        let forced = (1.0 / &a).force().unwrap();
        assert_eq!(forced, array![[0.5, 0.25]]);
    }

    #[test]
    fn metadata_survives_arithmetic() {
        let mut meta = ChannelMetadata::named("C02");
        meta.units = "%".to_string();
        let a = LazyArray::from_array(array![[1.0]], meta);
        let b = channel("other", array![[2.0]]);

        let sum = &a + &b;
        assert_eq!(sum.meta().name, "C02");
        assert_eq!(sum.meta().units, "%");

        let renamed = sum.renamed("highlight");
        assert_eq!(renamed.meta().name, "highlight");
        assert_eq!(renamed.meta().units, "%");
    }

    #[test]
    fn slice_rejects_out_of_bounds_window() {
        let a = channel("a", Array2::zeros((4, 4)));
        let err = a.slice(Window::new(2, 2, 4, 4)).unwrap_err();
        assert!(matches!(err, Error::InvalidArgument { .. }));
    }

    #[test]
    fn slice_of_slice_composes() {
        let a = channel(
            "a",
            array![[0.0, 1.0, 2.0], [3.0, 4.0, 5.0], [6.0, 7.0, 8.0]],
        );
        let inner = a.slice(Window::new(1, 0, 2, 3)).unwrap();
        let nested = inner.slice(Window::new(0, 1, 2, 2)).unwrap();
        assert_eq!(nested.force().unwrap(), array![[4.0, 5.0], [7.0, 8.0]]);
    }

    #[test]
    fn reductions_are_deferred_scalars() {
        let a = channel("a", array![[1.0, 2.0], [3.0, 4.0]]);
        let total = a.sum();
        assert_eq!(total.force().unwrap(), 10.0);
        assert_eq!(a.mean().force().unwrap(), 2.5);
        assert_eq!(a.min().force().unwrap(), 1.0);
        assert_eq!(a.max().force().unwrap(), 4.0);
    }

    #[test]
    fn comparison_masks() {
        let a = channel("a", array![[1.0, 5.0]]);
        let b = channel("b", array![[2.0, 2.0]]);
        assert_eq!(a.gt(&b).force().unwrap(), array![[0.0, 1.0]]);
        assert_eq!(a.gt_value(4.0).force().unwrap(), array![[0.0, 1.0]]);
    }

    #[test]
    fn mismatched_shapes_error_when_forced() {
        let a = channel("a", Array2::zeros((2, 2)));
        let b = channel("b", Array2::zeros((3, 3)));
        let bad = &a + &b;
        assert!(bad.force().is_err());
    }
}
