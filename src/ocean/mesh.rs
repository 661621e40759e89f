//! Water grid lattice: base-plane vertices, UVs and the fixed triangle topology.

use bytemuck::{Pod, Zeroable};
use glam::Vec2;

use crate::error::{Result, WaterError};
use crate::params::WaterConfig;

/// Vertex data for the water mesh (position + normal + UV coordinates)
#[repr(C)]
#[derive(Copy, Clone, Debug, PartialEq, Pod, Zeroable)]
pub struct Vertex {
    pub position: [f32; 3],
    pub normal: [f32; 3],
    pub uv: [f32; 2],
}

/// Up-facing normal of the undisturbed surface
pub const FLAT_NORMAL: [f32; 3] = [0.0, 1.0, 0.0];

/// Water grid mesh.
///
/// `vertices` is the render buffer: rewritten in place on every remesh.
/// `base` holds the undisplaced (x0, z0) of each vertex and never changes.
pub struct WaterGrid {
    pub vertices: Vec<Vertex>,
    /// Full topology, two triangles per cell
    pub indices: Vec<u32>,
    base: Vec<Vec2>,
    columns: usize,
    rows: usize,
    origin: Vec2,
    spacing: Vec2,
}

impl WaterGrid {
    /// Build a `columns x rows` lattice spanning
    /// `[origin_x, origin_x + width] x [origin_z, origin_z + height]`.
    pub fn new(config: &WaterConfig) -> Result<Self> {
        let columns = config.columns;
        let rows = config.rows;

        if columns < 2 || rows < 2 {
            return Err(WaterError::GridResolution { columns, rows });
        }
        // Indices are u32
        if columns.checked_mul(rows).map_or(true, |n| n > u32::MAX as usize) {
            return Err(WaterError::GridResolution { columns, rows });
        }
        let extent_ok = |v: f32| v.is_finite() && v > 0.0;
        if !extent_ok(config.width_m) || !extent_ok(config.height_m) {
            return Err(WaterError::GridExtent {
                width_m: config.width_m,
                height_m: config.height_m,
            });
        }
        if !config.origin_x_m.is_finite() || !config.origin_z_m.is_finite() {
            return Err(WaterError::GridExtent {
                width_m: config.width_m,
                height_m: config.height_m,
            });
        }

        let origin = Vec2::new(config.origin_x_m, config.origin_z_m);
        let spacing = Vec2::new(config.spacing_x_m(), config.spacing_z_m());
        let last_col = (columns - 1) as f32;
        let last_row = (rows - 1) as f32;

        let mut vertices = Vec::with_capacity(columns * rows);
        let mut base = Vec::with_capacity(columns * rows);

        // Generate flat XZ plane grid
        for z in 0..rows {
            for x in 0..columns {
                let p = origin + Vec2::new(x as f32, z as f32) * spacing;
                base.push(p);
                vertices.push(Vertex {
                    position: [p.x, 0.0, p.y],
                    normal: FLAT_NORMAL,
                    uv: [x as f32 / last_col, z as f32 / last_row],
                });
            }
        }

        let mut indices = Vec::with_capacity((columns - 1) * (rows - 1) * 6);
        for z in 0..rows - 1 {
            for x in 0..columns - 1 {
                indices.extend_from_slice(&quad_indices(columns, x, z, 1));
            }
        }

        Ok(Self {
            vertices,
            indices,
            base,
            columns,
            rows,
            origin,
            spacing,
        })
    }

    pub fn columns(&self) -> usize {
        self.columns
    }

    pub fn rows(&self) -> usize {
        self.rows
    }

    /// Lattice cells along X
    pub fn cells_x(&self) -> usize {
        self.columns - 1
    }

    /// Lattice cells along Z
    pub fn cells_z(&self) -> usize {
        self.rows - 1
    }

    pub fn origin(&self) -> Vec2 {
        self.origin
    }

    /// Distance between neighbouring vertices along X and Z (meters)
    pub fn spacing(&self) -> Vec2 {
        self.spacing
    }

    /// Undisplaced (x0, z0) of every vertex, in vertex-buffer order
    pub fn base_positions(&self) -> &[Vec2] {
        &self.base
    }

    /// Render vertices paired with their base-plane coordinate
    pub fn vertices_with_base_mut(&mut self) -> impl Iterator<Item = (&mut Vertex, Vec2)> + '_ {
        self.vertices.iter_mut().zip(self.base.iter().copied())
    }

    /// Number of triangles in the full topology
    pub fn triangle_count(&self) -> usize {
        self.indices.len() / 3
    }

    /// Vertex-buffer index of lattice point `(x, z)`
    pub fn vertex_index(&self, x: usize, z: usize) -> u32 {
        debug_assert!(x < self.columns && z < self.rows);
        (z * self.columns + x) as u32
    }

    /// Six indices covering the `size x size` cell block whose lower corner is cell `(x, z)`.
    ///
    /// Caller must keep the block inside the lattice.
    pub fn block_indices(&self, x: usize, z: usize, size: usize) -> [u32; 6] {
        debug_assert!(x + size < self.columns && z + size < self.rows);
        quad_indices(self.columns, x, z, size)
    }
}

/// Two triangles over a `size`-cell square, counter-clockwise seen from +Y.
fn quad_indices(columns: usize, x: usize, z: usize, size: usize) -> [u32; 6] {
    let top_left = (z * columns + x) as u32;
    let top_right = top_left + size as u32;
    let bottom_left = ((z + size) * columns + x) as u32;
    let bottom_right = bottom_left + size as u32;

    [
        top_left,
        bottom_left,
        top_right,
        top_right,
        bottom_left,
        bottom_right,
    ]
}
