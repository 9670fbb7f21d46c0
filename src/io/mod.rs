//! I/O layer for reading scene directories and writing quicklooks.
//! Provides the `scene_dir` reader and `writers` for JPEG/TIFF outputs
//! and metadata sidecars.
pub mod scene_dir;
pub use scene_dir::{
    ChannelDescriptor, DESCRIPTOR_FILE, SceneDescriptor, SceneError, SceneReader,
};

pub mod writers;
