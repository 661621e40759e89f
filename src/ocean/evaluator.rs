//! Wave superposition: displaced position and analytic normal for one base-plane point.
//!
//! Every wave contributes through its phase `θ = w (D · p0) + φ t`:
//!
//! | layer        | displacement                          |
//! |--------------|---------------------------------------|
//! | sum-of-sines | `y += A sin θ`                        |
//! | Gerstner     | `xz += Q A D cos θ`, `y += A sin θ`   |
//!
//! With both layers enabled the contributions are added. The normal is the
//! cross product of the analytic partials of the displaced position with
//! respect to `x0` and `z0`, so Gerstner horizontal motion tilts it correctly.

use glam::{Vec2, Vec3};

use super::waves::WaveDescriptor;

/// Which displacement layers are active. Resolved once per remesh.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum WaveMode {
    /// No displacement: the rest plane
    #[default]
    Flat,
    /// Vertical heightfield only
    SumOfSines,
    /// Trochoidal waves with horizontal displacement
    Gerstner,
    /// Sum-of-sines height layered on top of Gerstner displacement
    Layered,
}

impl WaveMode {
    pub fn from_flags(sum_of_sines: bool, gerstner: bool) -> Self {
        match (sum_of_sines, gerstner) {
            (false, false) => WaveMode::Flat,
            (true, false) => WaveMode::SumOfSines,
            (false, true) => WaveMode::Gerstner,
            (true, true) => WaveMode::Layered,
        }
    }

    /// Number of `A sin θ` terms each wave adds to the height
    fn height_layers(self) -> f32 {
        match self {
            WaveMode::Flat => 0.0,
            WaveMode::SumOfSines | WaveMode::Gerstner => 1.0,
            WaveMode::Layered => 2.0,
        }
    }

    fn has_horizontal(self) -> bool {
        matches!(self, WaveMode::Gerstner | WaveMode::Layered)
    }
}

/// Displaced surface point
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct SurfaceSample {
    pub position: Vec3,
    /// Unit normal
    pub normal: Vec3,
}

/// Phase of one wave at a base-plane point
#[inline]
pub fn phase(wave: &WaveDescriptor, base: Vec2, time_s: f32) -> f32 {
    wave.direction.dot(base) * wave.frequency + time_s * wave.phase_speed
}

/// Evaluate all waves at base-plane point `base` and time `time_s`.
///
/// Pure: identical inputs give bit-identical output.
pub fn evaluate(
    base: Vec2,
    time_s: f32,
    waves: &[WaveDescriptor],
    mode: WaveMode,
) -> SurfaceSample {
    if mode == WaveMode::Flat {
        return SurfaceSample {
            position: Vec3::new(base.x, 0.0, base.y),
            normal: Vec3::Y,
        };
    }

    let height_layers = mode.height_layers();
    let horizontal = mode.has_horizontal();

    let mut offset = Vec3::ZERO;
    // Partials of the displaced position with respect to x0 (tangent) and z0 (binormal)
    let mut tangent = Vec3::X;
    let mut binormal = Vec3::Z;

    for wave in waves {
        let theta = phase(wave, base, time_s);
        let (sin, cos) = theta.sin_cos();
        let d = wave.direction;
        let wa = wave.frequency * wave.amplitude;

        // d(A sin θ)/dx0 = w A Dx cos θ
        offset.y += height_layers * wave.amplitude * sin;
        tangent.y += height_layers * wa * d.x * cos;
        binormal.y += height_layers * wa * d.y * cos;

        if horizontal {
            let qa = wave.steepness * wave.amplitude;
            offset.x += qa * d.x * cos;
            offset.z += qa * d.y * cos;

            // d(Q A D cos θ)/dx0 = -Q w A Dx D sin θ
            let qwa_sin = wave.steepness * wa * sin;
            tangent.x -= qwa_sin * d.x * d.x;
            tangent.z -= qwa_sin * d.x * d.y;
            binormal.x -= qwa_sin * d.x * d.y;
            binormal.z -= qwa_sin * d.y * d.y;
        }
    }

    // binormal x tangent points +Y for the rest plane (Z x X = Y)
    let normal = binormal.cross(tangent).try_normalize().unwrap_or(Vec3::Y);

    SurfaceSample {
        position: Vec3::new(base.x, 0.0, base.y) + offset,
        normal,
    }
}
