//! Wave descriptor set and its deterministic derivation from a spectrum seed.

use std::f32::consts::TAU;

use glam::Vec2;
use rand::{Rng, SeedableRng};
use rand_chacha::ChaCha8Rng;

use crate::error::{Result, WaterError};
use crate::params::WaveSpectrum;

/// Parameters for a single wave component
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct WaveDescriptor {
    /// Unit travel direction in the XZ plane
    pub direction: Vec2,
    /// Crest height above rest level (meters)
    pub amplitude: f32,
    /// Crest-to-crest distance (meters)
    pub wavelength: f32,
    /// Spatial angular frequency, 2π / wavelength (radians per meter)
    pub frequency: f32,
    /// Temporal phase rate (radians per second)
    pub phase_speed: f32,
    /// Gerstner steepness Q_i (horizontal displacement gain)
    pub steepness: f32,
}

impl WaveDescriptor {
    /// Build a descriptor; `direction` is normalized and frequency derived from wavelength.
    pub fn new(
        direction: Vec2,
        amplitude: f32,
        wavelength: f32,
        phase_speed: f32,
        steepness: f32,
    ) -> Self {
        Self {
            direction: direction.normalize_or_zero(),
            amplitude,
            wavelength,
            frequency: TAU / wavelength,
            phase_speed,
            steepness,
        }
    }

    /// `steepness * amplitude * frequency * wave_count`; must not exceed 1
    pub fn fold_factor(&self, wave_count: usize) -> f32 {
        self.steepness * self.amplitude * self.frequency * wave_count as f32
    }
}

/// Immutable, ordered set of waves driving one surface
#[derive(Debug, Clone, Default, PartialEq)]
pub struct WaveSet {
    waves: Vec<WaveDescriptor>,
}

impl WaveSet {
    /// Derive `count` waves from a spectrum seed.
    ///
    /// The sequence is a pure function of `(spectrum, count, wave_speed_m_per_s)`:
    /// wave `i` has wavelength `L0 * lf^i`, amplitude `A0 * af^i`, direction angle
    /// `base + i * rotation + j_i * jitter` (`j_i` from a ChaCha8 stream seeded with
    /// `spectrum.seed`), phase speed `w_i * c * sqrt(L_i / L0)` and steepness
    /// `Q / (w_i * A_i * count)`.
    pub fn generate(
        spectrum: &WaveSpectrum,
        count: usize,
        wave_speed_m_per_s: f32,
    ) -> Result<Self> {
        validate_spectrum(spectrum, wave_speed_m_per_s)?;

        let mut rng = ChaCha8Rng::seed_from_u64(spectrum.seed);
        let mut waves = Vec::with_capacity(count);

        for i in 0..count {
            let exponent = i as i32;
            let wavelength =
                spectrum.base_wavelength_m * spectrum.wavelength_falloff.powi(exponent);
            let amplitude = spectrum.base_amplitude_m * spectrum.amplitude_falloff.powi(exponent);
            if !(wavelength.is_finite() && wavelength > 0.0) {
                return Err(WaterError::WaveParams(format!(
                    "wave {i} wavelength underflowed to {wavelength}"
                )));
            }

            // Always draw, so jitter 0 and jitter > 0 consume the same stream
            let jitter: f32 = rng.gen_range(-1.0..1.0);
            let angle_deg = spectrum.base_direction_deg
                + i as f32 * spectrum.direction_rotation_deg
                + jitter * spectrum.direction_jitter_deg;
            let angle = angle_deg.to_radians();
            let direction = Vec2::new(angle.cos(), angle.sin());

            let frequency = TAU / wavelength;
            // Deep-water dispersion: phase velocity grows with sqrt(wavelength)
            let velocity =
                wave_speed_m_per_s * (wavelength / spectrum.base_wavelength_m).sqrt();
            let phase_speed = frequency * velocity;

            // A subnormal or zero product would blow Q_i up to infinity; such a
            // wave's displacement is below f32 resolution anyway
            let fold = frequency * amplitude * count as f32;
            let steepness = if fold.is_normal() {
                spectrum.steepness / fold
            } else {
                0.0
            };

            waves.push(WaveDescriptor::new(
                direction,
                amplitude,
                wavelength,
                phase_speed,
                steepness,
            ));
        }

        Self::from_descriptors(waves)
    }

    /// Wrap hand-built descriptors, checking each against the self-intersection bound.
    pub fn from_descriptors(waves: Vec<WaveDescriptor>) -> Result<Self> {
        let count = waves.len();
        for (index, wave) in waves.iter().enumerate() {
            let finite = [
                wave.amplitude,
                wave.wavelength,
                wave.frequency,
                wave.phase_speed,
                wave.steepness,
                wave.direction.x,
                wave.direction.y,
            ]
            .iter()
            .all(|v| v.is_finite());
            if !finite {
                return Err(WaterError::WaveParams(format!(
                    "wave {index} has a non-finite parameter"
                )));
            }
            if wave.wavelength <= 0.0 || wave.amplitude < 0.0 || wave.steepness < 0.0 {
                return Err(WaterError::WaveParams(format!(
                    "wave {index}: wavelength must be > 0, amplitude and steepness >= 0"
                )));
            }
            if (wave.direction.length() - 1.0).abs() > 1e-3 {
                return Err(WaterError::WaveParams(format!(
                    "wave {index} direction is not a unit vector"
                )));
            }

            let product = wave.fold_factor(count);
            // Generated sets sit exactly on the bound at Q = 1; allow rounding
            if product > 1.0 + 1e-4 {
                return Err(WaterError::SteepnessBound { index, product });
            }
        }
        Ok(Self { waves })
    }

    pub fn waves(&self) -> &[WaveDescriptor] {
        &self.waves
    }

    pub fn len(&self) -> usize {
        self.waves.len()
    }

    pub fn is_empty(&self) -> bool {
        self.waves.is_empty()
    }

    /// Sum of amplitudes: upper bound on |height| per active layer
    pub fn max_amplitude(&self) -> f32 {
        self.waves.iter().map(|w| w.amplitude).sum()
    }
}

fn validate_spectrum(spectrum: &WaveSpectrum, wave_speed_m_per_s: f32) -> Result<()> {
    let values = [
        spectrum.base_amplitude_m,
        spectrum.amplitude_falloff,
        spectrum.base_wavelength_m,
        spectrum.wavelength_falloff,
        spectrum.base_direction_deg,
        spectrum.direction_rotation_deg,
        spectrum.direction_jitter_deg,
        spectrum.steepness,
        wave_speed_m_per_s,
    ];
    if values.iter().any(|v| !v.is_finite()) {
        return Err(WaterError::WaveParams("spectrum has a non-finite value".into()));
    }
    if spectrum.base_wavelength_m <= 0.0 {
        return Err(WaterError::WaveParams(format!(
            "base wavelength must be positive, got {}",
            spectrum.base_wavelength_m
        )));
    }
    if spectrum.base_amplitude_m < 0.0 {
        return Err(WaterError::WaveParams(format!(
            "base amplitude must be non-negative, got {}",
            spectrum.base_amplitude_m
        )));
    }
    if !(0.0..=1.0).contains(&spectrum.amplitude_falloff)
        || !(spectrum.wavelength_falloff > 0.0 && spectrum.wavelength_falloff <= 1.0)
    {
        return Err(WaterError::WaveParams("falloff ratios must lie in (0, 1]".into()));
    }
    if !(0.0..=1.0).contains(&spectrum.steepness) {
        return Err(WaterError::WaveParams(format!(
            "steepness must lie in [0, 1], got {}",
            spectrum.steepness
        )));
    }
    if wave_speed_m_per_s < 0.0 {
        return Err(WaterError::WaveParams(format!(
            "wave speed must be non-negative, got {wave_speed_m_per_s}"
        )));
    }
    Ok(())
}
