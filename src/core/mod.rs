//! Core lazy-evaluation building blocks: the task graph, chunk geometry,
//! the force engine, and the `LazyArray`/`LazyStack` containers. These are
//! the primitives everything else in the crate is built on.
pub mod array;
pub mod chunks;
pub mod eval;
pub mod graph;
pub mod metadata;
pub mod source;
pub mod stack;

pub use array::{LazyArray, LazyScalar};
pub use chunks::{DEFAULT_CHUNK_ROWS, Window, row_blocks};
pub use eval::{ComputeError, ReduceOp};
pub use graph::{BinaryOp, Node, UnaryOp};
pub use metadata::{ChannelMetadata, WavelengthBand};
pub use source::{ChunkSource, MemorySource};
pub use stack::LazyStack;
