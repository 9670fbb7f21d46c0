//! Quicklook writers: JPEG and TIFF encoders plus JSON metadata
//! sidecars.
pub mod jpeg;
pub mod metadata;
pub mod tiff;
