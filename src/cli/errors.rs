use thiserror::Error;

/// Application-specific errors for the CLI
#[derive(Debug, Error)]
pub enum AppError {
    #[error("Invalid size parameter: {size}. Must be a positive integer or 'original'")]
    InvalidSize { size: String },

    #[error("Size must be greater than 0, got: {size}")]
    ZeroSize { size: usize },

    #[error("Missing required argument: {arg}")]
    MissingArgument { arg: String },

    #[error("Conflicting channel selectors: {selectors}. Pick one")]
    ConflictingSelectors { selectors: String },

    #[error("Composite needs exactly 3 comma-separated channels, got: {got}")]
    InvalidComposite { got: String },

    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),

    #[error("Scene reader error: {0}")]
    Scene(#[from] satscene::io::SceneError),
}
