//! Water surface construction parameters and the wave spectrum seed.

use std::path::Path;

use serde::{Deserialize, Serialize};

use crate::error::Result;

/// Water surface construction parameters
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct WaterConfig {
    /// Grid origin on the X axis (meters)
    pub origin_x_m: f32,

    /// Grid origin on the Z axis (meters)
    pub origin_z_m: f32,

    /// Extent along X (meters)
    pub width_m: f32,

    /// Extent along Z (meters)
    pub height_m: f32,

    /// Vertices along X (>= 2)
    pub columns: usize,

    /// Vertices along Z (>= 2)
    pub rows: usize,

    /// Phase velocity of the primary wave (meters per second)
    pub wave_speed_m_per_s: f32,

    /// Number of superposed waves (0 = flat surface)
    pub wave_count: usize,

    /// Vertical sum-of-sines heightfield layer
    pub enable_sum_of_sines: bool,

    /// Gerstner (trochoidal) layer with horizontal displacement
    pub enable_gerstner: bool,

    /// Coalesce distant triangles whose projected edges are too small to see
    pub enable_edge_filter: bool,

    /// Seed parameters for the wave descriptor set
    pub spectrum: WaveSpectrum,

    /// Edge-length filter tuning (used only when `enable_edge_filter` is set)
    pub edge_filter: EdgeFilterParams,
}

impl Default for WaterConfig {
    fn default() -> Self {
        Self {
            origin_x_m: 0.0,
            origin_z_m: 0.0,
            width_m: 100.0,
            height_m: 100.0,
            columns: 100,
            rows: 100,
            wave_speed_m_per_s: 1.5,
            wave_count: 20,
            enable_sum_of_sines: true,
            enable_gerstner: true,
            enable_edge_filter: false,
            spectrum: WaveSpectrum::default(),
            edge_filter: EdgeFilterParams::default(),
        }
    }
}

impl WaterConfig {
    /// Parse a config from JSON. Missing fields fall back to defaults.
    pub fn from_json_str(json: &str) -> Result<Self> {
        Ok(serde_json::from_str(json)?)
    }

    /// Load a JSON config file
    pub fn load(path: impl AsRef<Path>) -> Result<Self> {
        let text = std::fs::read_to_string(path)?;
        Self::from_json_str(&text)
    }

    /// Grid spacing along X (meters between adjacent columns)
    pub fn spacing_x_m(&self) -> f32 {
        self.width_m / (self.columns.max(2) - 1) as f32
    }

    /// Grid spacing along Z (meters between adjacent rows)
    pub fn spacing_z_m(&self) -> f32 {
        self.height_m / (self.rows.max(2) - 1) as f32
    }
}

/// Seed parameters from which the wave descriptor set is derived.
///
/// Wave `i` gets:
/// - wavelength `base_wavelength_m * wavelength_falloff^i`
/// - amplitude `base_amplitude_m * amplitude_falloff^i`
/// - direction angle `base_direction_deg + i * direction_rotation_deg`
///   `+ j_i * direction_jitter_deg`, with `j_i` uniform in `[-1, 1)` from a ChaCha8 stream seeded with `seed`
/// - steepness `steepness / (frequency_i * amplitude_i * wave_count)`
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct WaveSpectrum {
    /// Amplitude of the first (longest) wave (meters)
    pub base_amplitude_m: f32,

    /// Amplitude ratio between successive waves (0..=1)
    pub amplitude_falloff: f32,

    /// Wavelength of the first wave (meters)
    pub base_wavelength_m: f32,

    /// Wavelength ratio between successive waves (0..=1)
    pub wavelength_falloff: f32,

    /// Travel direction of the first wave, degrees from +X toward +Z
    pub base_direction_deg: f32,

    /// Deterministic rotation added per successive wave (degrees)
    pub direction_rotation_deg: f32,

    /// Maximum random deviation from the rotated direction (degrees)
    pub direction_jitter_deg: f32,

    /// Global Gerstner steepness Q in [0, 1]; 1 = crests just reach a cusp
    pub steepness: f32,

    /// Seed for the direction jitter stream
    pub seed: u64,
}

impl Default for WaveSpectrum {
    fn default() -> Self {
        Self {
            base_amplitude_m: 0.4,
            amplitude_falloff: 0.85,
            base_wavelength_m: 24.0,
            // 20 waves end just above the Nyquist wavelength of a 1m grid
            wavelength_falloff: 0.88,
            base_direction_deg: 0.0,
            direction_rotation_deg: 0.0,
            direction_jitter_deg: 50.0,
            steepness: 0.6,
            seed: 42,
        }
    }
}

/// Edge-length filter tuning
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct EdgeFilterParams {
    /// Edges projecting shorter than this are coalesced (pixels)
    pub threshold_px: f32,

    /// Blocks closer than this to the eye always keep full detail (meters)
    pub near_field_radius_m: f32,

    /// Largest coalesced block is 2^level cells on a side
    pub max_merge_level: u32,
}

impl Default for EdgeFilterParams {
    fn default() -> Self {
        Self {
            threshold_px: 12.0,
            near_field_radius_m: 10.0,
            max_merge_level: 3,
        }
    }
}
