//! Crate-level error type and `Result` alias for stable, structured error handling.
//! Converts underlying I/O, scene-reader, and compute errors, and provides semantic
//! variants for argument validation and processing failures.
use thiserror::Error;

pub type Result<T> = std::result::Result<T, Error>;

#[derive(Debug, Error)]
pub enum Error {
    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),

    #[error("Scene reader error: {0}")]
    Scene(#[from] crate::io::SceneError),

    #[error("Compute error: {0}")]
    Compute(#[from] crate::core::ComputeError),

    #[error("Invalid argument: {arg}={value}")]
    InvalidArgument { arg: &'static str, value: String },

    #[error("Size must be greater than 0, got: {size}")]
    ZeroSize { size: usize },

    #[error("Missing required argument: {arg}")]
    MissingArgument { arg: String },

    #[error("Composite needs {needed} channels, got: {got}")]
    IncompleteComposite { needed: usize, got: usize },

    #[error("Processing error: {0}")]
    Processing(String),

    #[error("External error: {0}")]
    External(String),
}

impl Error {
    pub fn external<E: std::fmt::Display>(e: E) -> Self {
        Error::External(e.to_string())
    }
}
