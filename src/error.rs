//! Error types for water surface construction and configuration loading.

use thiserror::Error;

/// Result alias used throughout the crate.
pub type Result<T> = std::result::Result<T, WaterError>;

/// Construction-time failures. Per-tick evaluation never fails.
#[derive(Error, Debug)]
pub enum WaterError {
    /// Lattice needs at least two vertices along each axis.
    #[error("Invalid grid resolution: {columns}x{rows} (need at least 2x2)")]
    GridResolution { columns: usize, rows: usize },

    /// Width and height must be finite and positive.
    #[error("Invalid grid extent: {width_m} x {height_m} m")]
    GridExtent { width_m: f32, height_m: f32 },

    /// A wave parameter is out of range (non-finite, negative, zero wavelength...).
    #[error("Invalid wave parameter: {0}")]
    WaveParams(String),

    /// Gerstner steepness would fold the surface over itself.
    #[error(
        "Wave {index} violates the self-intersection bound: \
         steepness * amplitude * frequency * wave_count = {product} > 1"
    )]
    SteepnessBound { index: usize, product: f32 },

    /// Edge filter parameters out of range.
    #[error("Invalid edge filter parameter: {0}")]
    FilterParams(String),

    /// IO error while reading a config file.
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    /// Config file is not valid JSON for the expected schema.
    #[error("Config parse error: {0}")]
    Json(#[from] serde_json::Error),
}
