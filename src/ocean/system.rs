//! Water surface: owns the grid and wave set, advances time and remeshes.

use glam::Vec2;
use log::{debug, trace, warn};

use super::evaluator::{evaluate, SurfaceSample, WaveMode};
use super::filter::{EdgeFilter, ViewState};
use super::mesh::{Vertex, WaterGrid};
use super::waves::WaveSet;
use crate::error::Result;
use crate::params::WaterConfig;
use crate::rendering::SurfaceRenderer;

/// Per-remesh statistics
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct FrameStats {
    /// Accumulated simulation time (seconds)
    pub time_s: f32,
    /// Triangles handed to the renderer
    pub triangles: usize,
    /// Triangles in the full topology
    pub full_triangles: usize,
    /// Lowest vertex height (meters)
    pub min_height_m: f32,
    /// Highest vertex height (meters)
    pub max_height_m: f32,
}

/// Animated water surface
///
/// `update_time` and `update_mesh` are independent: the host may accumulate
/// time every tick and remesh less often.
pub struct WaterSurface {
    pub grid: WaterGrid,
    waves: WaveSet,
    mode: WaveMode,
    /// Kept in f64 so long runs of small steps do not lose precision
    time_s: f64,
    edge_filter: EdgeFilter,
    edge_filter_enabled: bool,
    view: ViewState,
    /// Emitted triangles when the edge filter is enabled
    filtered_indices: Vec<u32>,
    vertices_dirty: bool,
    indices_dirty: bool,
}

impl WaterSurface {
    /// Build the grid and derive the wave set from `config.spectrum`
    pub fn new(config: &WaterConfig) -> Result<Self> {
        let waves = WaveSet::generate(
            &config.spectrum,
            config.wave_count,
            config.wave_speed_m_per_s,
        )?;
        Self::with_waves(config, waves)
    }

    /// Build the grid around an explicit wave set (`config.wave_count` and
    /// `config.spectrum` are ignored)
    pub fn with_waves(config: &WaterConfig, waves: WaveSet) -> Result<Self> {
        let grid = WaterGrid::new(config)?;
        let edge_filter = EdgeFilter::new(config.edge_filter.clone())?;
        let mode = WaveMode::from_flags(config.enable_sum_of_sines, config.enable_gerstner);

        debug!(
            "Water surface: {}x{} vertices, {} triangles, {} waves, mode {:?}, edge filter {}",
            grid.columns(),
            grid.rows(),
            grid.triangle_count(),
            waves.len(),
            mode,
            if config.enable_edge_filter { "on" } else { "off" }
        );

        let mut surface = Self {
            grid,
            waves,
            mode,
            time_s: 0.0,
            edge_filter,
            edge_filter_enabled: config.enable_edge_filter,
            view: ViewState::default(),
            filtered_indices: Vec::new(),
            vertices_dirty: true,
            indices_dirty: true,
        };
        surface.refilter();
        Ok(surface)
    }

    /// Advance simulation time. Negative or non-finite `dt_s` is treated as zero.
    pub fn update_time(&mut self, dt_s: f32) {
        if !dt_s.is_finite() || dt_s < 0.0 {
            warn!("Ignoring invalid time step {} s", dt_s);
            return;
        }
        self.time_s += f64::from(dt_s);
    }

    /// Re-evaluate every vertex at the current time and mark the vertex buffer for upload.
    ///
    /// The emitted topology depends only on the base plane and the view, so
    /// indices are left alone.
    pub fn update_mesh(&mut self) {
        let waves = self.waves.waves();
        let mode = self.mode;
        let time_s = self.time_s();

        for (vertex, base) in self.grid.vertices_with_base_mut() {
            let sample = evaluate(base, time_s, waves, mode);
            vertex.position = sample.position.to_array();
            vertex.normal = sample.normal.to_array();
        }
        self.vertices_dirty = true;

        trace!(
            "Remeshed at t={:.3}s, {} triangles emitted",
            time_s,
            self.triangle_count()
        );
    }

    /// Displaced position and normal at an arbitrary base-plane point, at the current time
    pub fn sample(&self, x0: f32, z0: f32) -> SurfaceSample {
        evaluate(Vec2::new(x0, z0), self.time_s(), self.waves.waves(), self.mode)
    }

    /// Update the viewer used by the edge filter; takes effect immediately
    pub fn set_view(&mut self, view: ViewState) {
        self.view = view;
        self.refilter();
    }

    /// Toggle edge filtering. Disabling restores the full topology.
    pub fn set_edge_filter_enabled(&mut self, enabled: bool) {
        if self.edge_filter_enabled != enabled {
            self.edge_filter_enabled = enabled;
            self.indices_dirty = true;
            self.refilter();
        }
    }

    pub fn edge_filter_enabled(&self) -> bool {
        self.edge_filter_enabled
    }

    fn refilter(&mut self) {
        if self.edge_filter_enabled {
            self.edge_filter
                .filter(&self.grid, &self.view, &mut self.filtered_indices);
            self.indices_dirty = true;
        }
    }

    /// Accumulated simulation time (seconds)
    pub fn time_s(&self) -> f32 {
        self.time_s as f32
    }

    pub fn mode(&self) -> WaveMode {
        self.mode
    }

    pub fn waves(&self) -> &WaveSet {
        &self.waves
    }

    /// Render vertex buffer (position, normal, uv)
    pub fn vertices(&self) -> &[Vertex] {
        &self.grid.vertices
    }

    /// Triangle list to draw this frame
    pub fn indices(&self) -> &[u32] {
        if self.edge_filter_enabled {
            &self.filtered_indices
        } else {
            &self.grid.indices
        }
    }

    pub fn triangle_count(&self) -> usize {
        self.indices().len() / 3
    }

    /// True when vertices or indices changed since the last `draw`
    pub fn is_dirty(&self) -> bool {
        self.vertices_dirty || self.indices_dirty
    }

    pub fn stats(&self) -> FrameStats {
        let (min_height_m, max_height_m) = self
            .grid
            .vertices
            .iter()
            .map(|v| v.position[1])
            .fold((f32::INFINITY, f32::NEG_INFINITY), |(lo, hi), y| {
                (lo.min(y), hi.max(y))
            });

        FrameStats {
            time_s: self.time_s(),
            triangles: self.triangle_count(),
            full_triangles: self.grid.triangle_count(),
            min_height_m,
            max_height_m,
        }
    }

    /// Upload whatever changed since the last draw, then draw the emitted triangles
    pub fn draw<R: SurfaceRenderer>(
        &mut self,
        renderer: &mut R,
        program: &R::Program,
        environment: &R::Environment,
    ) {
        if self.vertices_dirty {
            renderer.upload_vertices(&self.grid.vertices);
            self.vertices_dirty = false;
        }
        if self.indices_dirty {
            renderer.upload_indices(self.indices());
            self.indices_dirty = false;
        }
        renderer.draw_indexed(program, environment, self.indices().len() as u32);
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::ocean::WaveDescriptor;
    use crate::params::{EdgeFilterParams, WaveSpectrum};
    use glam::Vec3;
    use std::f32::consts::TAU;

    fn small_config() -> WaterConfig {
        WaterConfig {
            width_m: 32.0,
            height_m: 32.0,
            columns: 33,
            rows: 33,
            wave_count: 6,
            ..Default::default()
        }
    }

    /// Records calls instead of touching a GPU
    #[derive(Default)]
    struct RecordingRenderer {
        vertex_uploads: usize,
        index_uploads: usize,
        last_indices: Vec<u32>,
        draws: Vec<(u32, u32, u32)>,
    }

    impl SurfaceRenderer for RecordingRenderer {
        type Program = u32;
        type Environment = u32;

        fn upload_vertices(&mut self, _vertices: &[Vertex]) {
            self.vertex_uploads += 1;
        }

        fn upload_indices(&mut self, indices: &[u32]) {
            self.index_uploads += 1;
            self.last_indices = indices.to_vec();
        }

        fn draw_indexed(&mut self, program: &u32, environment: &u32, index_count: u32) {
            self.draws.push((*program, *environment, index_count));
        }
    }

    #[test]
    fn test_normals_unit_after_update() {
        let mut surface = WaterSurface::new(&small_config()).unwrap();
        surface.update_time(1.7);
        surface.update_mesh();

        for v in surface.vertices() {
            let n = Vec3::from_array(v.normal);
            assert!((n.length() - 1.0).abs() < 1e-4);
        }
    }

    #[test]
    fn test_zero_waves_stay_flat() {
        let config = WaterConfig {
            wave_count: 0,
            ..small_config()
        };
        let mut surface = WaterSurface::new(&config).unwrap();
        surface.update_time(3.0);
        surface.update_mesh();

        for v in surface.vertices() {
            assert_eq!(v.position[1], 0.0);
            assert_eq!(v.normal, [0.0, 1.0, 0.0]);
        }
    }

    #[test]
    fn test_zero_amplitude_stays_flat() {
        let config = WaterConfig {
            spectrum: WaveSpectrum {
                base_amplitude_m: 0.0,
                ..WaveSpectrum::default()
            },
            ..small_config()
        };
        let mut surface = WaterSurface::new(&config).unwrap();
        surface.update_time(2.0);
        surface.update_mesh();

        let base = surface.grid.base_positions().to_vec();
        for (v, p) in surface.vertices().iter().zip(base) {
            assert_eq!(v.position, [p.x, 0.0, p.y]);
            assert_eq!(v.normal, [0.0, 1.0, 0.0]);
        }
    }

    #[test]
    fn test_zero_dt_is_idempotent() {
        let mut surface = WaterSurface::new(&small_config()).unwrap();
        surface.update_time(0.75);
        surface.update_mesh();
        let before = surface.vertices().to_vec();

        surface.update_time(0.0);
        surface.update_mesh();
        assert_eq!(surface.vertices(), before.as_slice());
    }

    #[test]
    fn test_negative_dt_keeps_time_monotonic() {
        let mut surface = WaterSurface::new(&small_config()).unwrap();
        surface.update_time(1.0);
        surface.update_time(-0.5);
        assert_eq!(surface.time_s(), 1.0);
        surface.update_time(f32::NAN);
        surface.update_time(f32::INFINITY);
        assert_eq!(surface.time_s(), 1.0);
        surface.update_time(0.25);
        assert_eq!(surface.time_s(), 1.25);
    }

    #[test]
    fn test_time_and_remesh_are_decoupled() {
        // Accumulating in several steps then remeshing once matches a single step
        let mut stepped = WaterSurface::new(&small_config()).unwrap();
        for _ in 0..4 {
            stepped.update_time(0.25);
        }
        stepped.update_mesh();

        let mut single = WaterSurface::new(&small_config()).unwrap();
        single.update_time(1.0);
        single.update_mesh();

        assert_eq!(stepped.time_s(), single.time_s());
        assert_eq!(stepped.vertices(), single.vertices());
    }

    #[test]
    fn test_long_run_clock_keeps_precision() {
        let mut surface = WaterSurface::new(&small_config()).unwrap();
        for _ in 0..1_000_000 {
            surface.update_time(1e-3);
        }
        assert!((surface.time_s() - 1000.0).abs() < 1e-3);
    }

    #[test]
    fn test_update_time_alone_leaves_mesh() {
        let mut surface = WaterSurface::new(&small_config()).unwrap();
        surface.update_mesh();
        let before = surface.vertices().to_vec();
        surface.update_time(2.0);
        assert_eq!(surface.vertices(), before.as_slice());
    }

    #[test]
    fn test_single_wave_surface_height() {
        let config = WaterConfig {
            origin_x_m: 0.0,
            origin_z_m: 0.0,
            enable_gerstner: false,
            ..small_config()
        };
        let wave = WaveDescriptor::new(Vec2::X, 1.0, TAU, 0.0, 0.0);
        let waves = WaveSet::from_descriptors(vec![wave]).unwrap();
        let mut surface = WaterSurface::with_waves(&config, waves).unwrap();
        surface.update_mesh();

        // Vertex 0 sits at the origin: sin(0) = 0
        assert_eq!(surface.vertices()[0].position[1], 0.0);
        // Vertex 1 sits at x = 1: sin(1)
        assert!((surface.vertices()[1].position[1] - 1f32.sin()).abs() < 1e-6);
        assert!((surface.sample(0.5, 9.0).position.y - 0.5f32.sin()).abs() < 1e-6);
    }

    #[test]
    fn test_topology_fixed_across_updates() {
        let mut surface = WaterSurface::new(&small_config()).unwrap();
        let count = surface.vertices().len();
        let indices = surface.indices().to_vec();
        for _ in 0..5 {
            surface.update_time(0.1);
            surface.update_mesh();
        }
        assert_eq!(surface.vertices().len(), count);
        assert_eq!(surface.indices(), indices.as_slice());
    }

    #[test]
    fn test_edge_filter_toggle() {
        let config = WaterConfig {
            enable_edge_filter: true,
            edge_filter: EdgeFilterParams {
                threshold_px: 40.0,
                near_field_radius_m: 2.0,
                max_merge_level: 3,
            },
            ..small_config()
        };
        let mut surface = WaterSurface::new(&config).unwrap();
        let full = surface.grid.triangle_count();

        surface.set_view(ViewState {
            eye: Vec3::new(-300.0, 20.0, -300.0),
            focal_length_px: 800.0,
        });
        surface.update_mesh();
        let filtered = surface.triangle_count();
        assert!(filtered < full);

        let vertex_count = surface.vertices().len();
        surface.set_edge_filter_enabled(false);
        assert_eq!(surface.triangle_count(), full);
        assert_eq!(surface.vertices().len(), vertex_count);

        surface.set_edge_filter_enabled(true);
        assert_eq!(surface.triangle_count(), filtered);
    }

    #[test]
    fn test_filter_does_not_touch_vertices() {
        let mut plain = WaterSurface::new(&small_config()).unwrap();
        let mut filtered = WaterSurface::new(&WaterConfig {
            enable_edge_filter: true,
            ..small_config()
        })
        .unwrap();
        filtered.set_view(ViewState {
            eye: Vec3::new(500.0, 50.0, 500.0),
            focal_length_px: 500.0,
        });

        plain.update_time(0.6);
        plain.update_mesh();
        filtered.update_time(0.6);
        filtered.update_mesh();

        assert_eq!(plain.vertices(), filtered.vertices());
        assert!(filtered.triangle_count() <= plain.triangle_count());
    }

    #[test]
    fn test_draw_uploads_only_when_dirty() {
        let mut surface = WaterSurface::new(&small_config()).unwrap();
        let mut renderer = RecordingRenderer::default();

        assert!(surface.is_dirty());
        surface.draw(&mut renderer, &7, &9);
        assert!(!surface.is_dirty());
        assert_eq!(renderer.vertex_uploads, 1);
        assert_eq!(renderer.index_uploads, 1);
        assert_eq!(renderer.last_indices.len(), surface.indices().len());

        // Nothing changed: draw without re-upload
        surface.draw(&mut renderer, &7, &9);
        assert_eq!(renderer.vertex_uploads, 1);

        surface.update_time(0.1);
        surface.update_mesh();
        surface.draw(&mut renderer, &7, &9);
        assert_eq!(renderer.vertex_uploads, 2);
        // Fixed topology is uploaded once
        assert_eq!(renderer.index_uploads, 1);

        let expected = (7, 9, surface.indices().len() as u32);
        assert!(renderer.draws.iter().all(|d| *d == expected));
        assert_eq!(renderer.draws.len(), 3);
    }

    #[test]
    fn test_remesh_keeps_filtered_indices_uploaded() {
        let mut surface = WaterSurface::new(&WaterConfig {
            enable_edge_filter: true,
            ..small_config()
        })
        .unwrap();
        surface.set_view(ViewState {
            eye: Vec3::new(-300.0, 20.0, -300.0),
            focal_length_px: 800.0,
        });
        let mut renderer = RecordingRenderer::default();
        surface.draw(&mut renderer, &1, &2);
        let emitted = renderer.last_indices.clone();

        for _ in 0..3 {
            surface.update_time(0.1);
            surface.update_mesh();
            surface.draw(&mut renderer, &1, &2);
        }
        assert_eq!(renderer.vertex_uploads, 4);
        assert_eq!(renderer.index_uploads, 1);
        assert_eq!(surface.indices(), emitted.as_slice());

        // Moving the viewer re-emits the topology
        surface.set_view(ViewState {
            eye: Vec3::new(16.0, 1.0, 16.0),
            focal_length_px: 800.0,
        });
        surface.draw(&mut renderer, &1, &2);
        assert_eq!(renderer.index_uploads, 2);
        assert_ne!(renderer.last_indices, emitted);
    }

    #[test]
    fn test_stats_track_heights() {
        let mut surface = WaterSurface::new(&small_config()).unwrap();
        surface.update_time(0.4);
        surface.update_mesh();
        let stats = surface.stats();

        let bound = 2.0 * surface.waves().max_amplitude();
        assert!(stats.min_height_m <= stats.max_height_m);
        assert!(stats.max_height_m <= bound && stats.min_height_m >= -bound);
        assert_eq!(stats.triangles, stats.full_triangles);
        assert_eq!(stats.time_s, 0.4);
    }

    #[test]
    fn test_independent_surfaces() {
        let mut a = WaterSurface::new(&small_config()).unwrap();
        let b = WaterSurface::new(&small_config()).unwrap();
        a.update_time(5.0);
        a.update_mesh();
        assert_eq!(b.time_s(), 0.0);
        assert!(b.vertices().iter().all(|v| v.position[1] == 0.0));
    }

    #[test]
    fn test_invalid_config_rejected() {
        let bad_grid = WaterConfig {
            columns: 1,
            ..small_config()
        };
        assert!(WaterSurface::new(&bad_grid).is_err());

        let bad_steepness = WaterConfig {
            spectrum: WaveSpectrum {
                steepness: 2.0,
                ..WaveSpectrum::default()
            },
            ..small_config()
        };
        assert!(WaterSurface::new(&bad_steepness).is_err());
    }
}
