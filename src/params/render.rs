//! Viewer configuration consumed by the edge-length filter.

use serde::{Deserialize, Serialize};

/// Rendering configuration
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct RenderConfig {
    /// Window height (pixels)
    pub window_height: u32,

    /// Vertical field of view (degrees)
    pub fov_degrees: f32,
}

impl Default for RenderConfig {
    fn default() -> Self {
        Self {
            window_height: 720,
            fov_degrees: 45.0,
        }
    }
}

impl RenderConfig {
    /// Distance (in pixels) from the eye to the image plane.
    ///
    /// An edge of length `l` at distance `d` projects to roughly `l * focal / d` pixels.
    pub fn focal_length_px(&self) -> f32 {
        let half_fov = (self.fov_degrees.to_radians() * 0.5).max(f32::EPSILON);
        self.window_height as f32 * 0.5 / half_fov.tan()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_focal_length_90_degrees() {
        let config = RenderConfig {
            window_height: 600,
            fov_degrees: 90.0,
            ..Default::default()
        };
        // tan(45°) = 1, so focal length is half the viewport height
        assert!((config.focal_length_px() - 300.0).abs() < 1e-3);
    }

    #[test]
    fn test_narrower_fov_magnifies() {
        let wide = RenderConfig {
            fov_degrees: 90.0,
            ..Default::default()
        };
        let narrow = RenderConfig {
            fov_degrees: 30.0,
            ..Default::default()
        };
        assert!(narrow.focal_length_px() > wide.focal_length_px());
    }
}
