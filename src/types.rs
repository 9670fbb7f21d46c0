//! Shared types and enums used across SATSCENE.
//! Includes `Calibration`, `StretchStrategy`, `InputFormat`, `OutputFormat`,
//! bit depths (`BitDepth`, `BitDepthArg`), and `SampleType`.
use clap::ValueEnum;
use serde::{Deserialize, Serialize};

/// Calibration level of a channel's sample values.
#[derive(Copy, Clone, PartialEq, Eq, PartialOrd, Ord, ValueEnum, Debug, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Calibration {
    Counts,
    Radiance,
    Reflectance,
    BrightnessTemperature,
}

impl std::fmt::Display for Calibration {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        let s = match self {
            Calibration::Counts => "counts",
            Calibration::Radiance => "radiance",
            Calibration::Reflectance => "reflectance",
            Calibration::BrightnessTemperature => "brightness_temperature",
        };
        write!(f, "{}", s)
    }
}

/// On-disk sample encoding of a raw channel file.
#[derive(Copy, Clone, PartialEq, Eq, PartialOrd, Ord, Debug, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum SampleType {
    U16,
    F32,
}

impl SampleType {
    /// Size of one sample in bytes.
    pub fn byte_len(self) -> usize {
        match self {
            SampleType::U16 => 2,
            SampleType::F32 => 4,
        }
    }
}

impl std::fmt::Display for SampleType {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            SampleType::U16 => write!(f, "u16"),
            SampleType::F32 => write!(f, "f32"),
        }
    }
}

/// Strategy for mapping physical sample values to display levels.
#[derive(Copy, Clone, PartialEq, Eq, PartialOrd, Ord, ValueEnum, Debug, Serialize, Deserialize)]
pub enum StretchStrategy {
    /// Linear min/max stretch over all valid samples.
    Linear,
    /// Linear stretch between the 2nd and 98th percentiles.
    Robust,
    /// Histogram equalization.
    Equalized,
}

impl std::fmt::Display for StretchStrategy {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            StretchStrategy::Linear => write!(f, "Linear"),
            StretchStrategy::Robust => write!(f, "Robust"),
            StretchStrategy::Equalized => write!(f, "Equalized"),
        }
    }
}

#[derive(Copy, Clone, PartialEq, Eq, PartialOrd, Ord, ValueEnum, Debug, Serialize, Deserialize)]
pub enum InputFormat {
    SceneDir,
}

#[derive(Copy, Clone, PartialEq, Eq, PartialOrd, Ord, ValueEnum, Debug, Serialize, Deserialize)]
pub enum BitDepthArg {
    U8,
    U16,
}

#[derive(
    Copy,
    Clone,
    PartialEq,
    Eq,
    PartialOrd,
    Ord,
    Debug,
    ValueEnum,
    serde::Serialize,
    serde::Deserialize,
)]
pub enum OutputFormat {
    TIFF,
    JPEG, // Lossy, preview only
}

#[derive(
    Copy, Clone, PartialEq, Eq, PartialOrd, Ord, Debug, serde::Serialize, serde::Deserialize,
)]
pub enum BitDepth {
    U8,
    U16,
}
