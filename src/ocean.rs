//! Procedural water surface: grid lattice, wave superposition and level-of-detail filtering.

mod evaluator;
mod filter;
mod mesh;
mod system;
mod waves;

// Re-export public types
pub use evaluator::{evaluate, phase, SurfaceSample, WaveMode};
pub use filter::{EdgeFilter, ViewState};
pub use mesh::{Vertex, WaterGrid, FLAT_NORMAL};
pub use system::{FrameStats, WaterSurface};
pub use waves::{WaveDescriptor, WaveSet};

#[cfg(test)]
mod tests {
    use super::*;
    use crate::params::WaterConfig;

    #[test]
    fn test_default_scene() {
        let config = WaterConfig::default();
        let mut surface = WaterSurface::new(&config).unwrap();

        // 100 x 100 vertices, two triangles per cell
        assert_eq!(surface.vertices().len(), 100 * 100);
        assert_eq!(surface.triangle_count(), 99 * 99 * 2);
        assert_eq!(surface.waves().len(), 20);
        assert_eq!(surface.mode(), WaveMode::Layered);

        surface.update_time(1.0 / 30.0);
        surface.update_mesh();
        let stats = surface.stats();
        assert!(stats.max_height_m > stats.min_height_m);
    }
}
