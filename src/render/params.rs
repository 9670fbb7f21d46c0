use serde::{Deserialize, Serialize};

use crate::types::{BitDepthArg, OutputFormat, StretchStrategy};

/// Rendering parameters suitable for config files and presets
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct RenderParams {
    pub format: OutputFormat,
    pub bit_depth: BitDepthArg,
    pub stretch: StretchStrategy,
    /// Target long side in pixels; None means original size
    pub size: Option<usize>,
    /// If true, zero-pad to square after resizing
    pub pad: bool,
    /// Graticule line spacing in degrees; None disables the graticule
    pub graticule: Option<f64>,
}

impl Default for RenderParams {
    fn default() -> Self {
        Self {
            format: OutputFormat::JPEG,
            bit_depth: BitDepthArg::U8,
            stretch: StretchStrategy::Robust,
            size: None,
            pad: false,
            graticule: None,
        }
    }
}
