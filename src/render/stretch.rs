//! Value-to-display mapping for quicklooks.
//!
//! Statistics are computed without materializing or sorting all samples:
//! one pass for min/max and Welford mean/std over valid (finite) pixels,
//! then a fixed-bin histogram whose CDF is inverted for percentiles and
//! reused for histogram equalization. A planned `StretchMap` can be
//! applied to several frames so a time sequence shares one mapping.
use ndarray::Array2;
use tracing::debug;

use crate::types::StretchStrategy;

const NUM_BINS: usize = 4096;

/// Streaming statistics of the valid samples of a grid.
#[derive(Debug, Clone, Copy)]
pub struct StretchStats {
    pub valid_count: usize,
    pub min: f64,
    pub max: f64,
    pub mean: f64,
    pub std: f64,
    pub p02: f64,
    pub p50: f64,
    pub p98: f64,
}

/// Compute stats and percentile estimates for the finite samples.
pub fn compute_stats(data: &Array2<f64>) -> StretchStats {
    // First pass: min/max + Welford mean/std
    let mut count: u64 = 0;
    let mut min = f64::INFINITY;
    let mut max = f64::NEG_INFINITY;
    let mut mean = 0.0_f64;
    let mut m2 = 0.0_f64;

    for &v in data.iter() {
        if !v.is_finite() {
            continue;
        }
        count += 1;
        if v < min {
            min = v;
        }
        if v > max {
            max = v;
        }
        let delta = v - mean;
        mean += delta / (count as f64);
        m2 += delta * (v - mean);
    }

    if count == 0 {
        return StretchStats {
            valid_count: 0,
            min: 0.0,
            max: 0.0,
            mean: 0.0,
            std: 0.0,
            p02: 0.0,
            p50: 0.0,
            p98: 0.0,
        };
    }

    let std = if count > 1 {
        (m2 / (count as f64)).sqrt()
    } else {
        0.0
    };

    if (max - min).abs() < f64::EPSILON {
        return StretchStats {
            valid_count: count as usize,
            min,
            max,
            mean,
            std,
            p02: min,
            p50: min,
            p98: max,
        };
    }

    // Second pass: histogram over [min,max]
    let hist = build_histogram(data, min, max);
    let span = max - min;

    let estimate_percentile = |p: f64| -> f64 {
        let mut target = (p * (count as f64)).floor() as u64;
        if target >= count {
            target = count - 1;
        }
        let mut cumsum: u64 = 0;
        for (b, &h) in hist.iter().enumerate() {
            let next = cumsum + h;
            if target < next {
                let within = target.saturating_sub(cumsum);
                let frac = if h > 0 { (within as f64) / (h as f64) } else { 0.0 };
                let bin_width = span / (NUM_BINS as f64);
                return min + (b as f64) * bin_width + frac * bin_width;
            }
            cumsum = next;
        }
        max
    };

    StretchStats {
        valid_count: count as usize,
        min,
        max,
        mean,
        std,
        p02: estimate_percentile(0.02),
        p50: estimate_percentile(0.50),
        p98: estimate_percentile(0.98),
    }
}

fn build_histogram(data: &Array2<f64>, min: f64, max: f64) -> [u64; NUM_BINS] {
    let mut hist = [0u64; NUM_BINS];
    let inv_span = 1.0 / (max - min);
    for &v in data.iter() {
        if !v.is_finite() {
            continue;
        }
        let t = ((v - min) * inv_span).clamp(0.0, 1.0);
        let mut idx = (t * (NUM_BINS as f64)) as usize;
        if idx >= NUM_BINS {
            idx = NUM_BINS - 1;
        }
        hist[idx] += 1;
    }
    hist
}

/// A planned value-to-[0,1] mapping, applicable to any number of frames.
#[derive(Debug, Clone)]
pub enum StretchMap {
    /// Linear between `lo` and `hi`.
    Range { lo: f64, hi: f64 },
    /// Histogram equalization: per-bin CDF over [lo, hi].
    Equalize { lo: f64, hi: f64, cdf: Vec<f64> },
}

impl StretchMap {
    /// Normalized display value of one sample, or None when invalid.
    #[inline]
    pub fn normalized(&self, v: f64) -> Option<f64> {
        if !v.is_finite() {
            return None;
        }
        Some(match self {
            StretchMap::Range { lo, hi } => {
                let span = hi - lo;
                if span <= 0.0 {
                    0.0
                } else {
                    ((v - lo) / span).clamp(0.0, 1.0)
                }
            }
            StretchMap::Equalize { lo, hi, cdf } => {
                let span = hi - lo;
                if span <= 0.0 || cdf.is_empty() {
                    0.0
                } else {
                    let t = ((v - lo) / span).clamp(0.0, 1.0);
                    let mut idx = (t * (cdf.len() as f64)) as usize;
                    if idx >= cdf.len() {
                        idx = cdf.len() - 1;
                    }
                    cdf[idx]
                }
            }
        })
    }
}

/// Plan a stretch for one grid according to the chosen strategy.
pub fn plan_stretch(data: &Array2<f64>, strategy: StretchStrategy) -> StretchMap {
    let stats = compute_stats(data);
    debug!(
        "stretch plan ({}): valid={}, range=[{:.4}, {:.4}], p02/p98=[{:.4}, {:.4}]",
        strategy, stats.valid_count, stats.min, stats.max, stats.p02, stats.p98
    );

    match strategy {
        StretchStrategy::Linear => StretchMap::Range {
            lo: stats.min,
            hi: stats.max,
        },
        StretchStrategy::Robust => {
            if stats.p98 > stats.p02 {
                StretchMap::Range {
                    lo: stats.p02,
                    hi: stats.p98,
                }
            } else {
                StretchMap::Range {
                    lo: stats.min,
                    hi: stats.max,
                }
            }
        }
        StretchStrategy::Equalized => {
            if stats.valid_count == 0 || stats.max <= stats.min {
                return StretchMap::Range {
                    lo: stats.min,
                    hi: stats.max,
                };
            }
            let hist = build_histogram(data, stats.min, stats.max);
            let total = stats.valid_count as f64;
            let mut cdf = Vec::with_capacity(NUM_BINS);
            let mut cumsum = 0u64;
            for &h in hist.iter() {
                cumsum += h;
                cdf.push(cumsum as f64 / total);
            }
            StretchMap::Equalize {
                lo: stats.min,
                hi: stats.max,
                cdf,
            }
        }
    }
}

/// Map a grid through a planned stretch to 8-bit levels. Invalid samples
/// map to 0.
pub fn apply_stretch_u8(data: &Array2<f64>, map: &StretchMap) -> Vec<u8> {
    data.iter()
        .map(|&v| match map.normalized(v) {
            Some(n) => (n * 255.0).round().clamp(0.0, 255.0) as u8,
            None => 0,
        })
        .collect()
}

/// Map a grid through a planned stretch to 16-bit levels. Invalid
/// samples map to 0.
pub fn apply_stretch_u16(data: &Array2<f64>, map: &StretchMap) -> Vec<u16> {
    data.iter()
        .map(|&v| match map.normalized(v) {
            Some(n) => (n * 65535.0).round().clamp(0.0, 65535.0) as u16,
            None => 0,
        })
        .collect()
}
