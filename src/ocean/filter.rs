//! Edge-length filter: coalesces lattice cells whose edges are too small on screen.
//!
//! The lattice is tiled with aligned blocks of `2^max_merge_level` cells and walked
//! top-down. A block becomes a leaf when every edge it would drop (the edges of its
//! half-size children) projects below the pixel threshold and the block lies outside
//! the near field; otherwise it is split into four. Single cells are always leaves.
//!
//! Leaves are then triangulated. A coalesced leaf whose neighbours all share its size
//! is emitted as two corner triangles. A side that borders a leaf of another size is
//! split at every lattice point and fanned from the block centre, so adjacent leaves
//! always meet at the same vertices and displaced heights cannot open cracks.
//! The output never has more triangles than the full topology. Vertex storage is
//! never touched.

use glam::{Vec2, Vec3};

use super::mesh::WaterGrid;
use crate::error::{Result, WaterError};
use crate::params::{EdgeFilterParams, RenderConfig};

/// Largest accepted merge level (blocks of 65536 cells a side)
const MAX_MERGE_LEVEL: u32 = 16;

/// Viewer state the filter projects edges against
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct ViewState {
    /// Eye position in world space (meters)
    pub eye: Vec3,
    /// Image-plane distance in pixels, see [`RenderConfig::focal_length_px`]
    pub focal_length_px: f32,
}

impl ViewState {
    pub fn new(eye: Vec3, render_config: &RenderConfig) -> Self {
        Self {
            eye,
            focal_length_px: render_config.focal_length_px(),
        }
    }
}

impl Default for ViewState {
    fn default() -> Self {
        Self::new(Vec3::new(0.0, 0.0, 3.0), &RenderConfig::default())
    }
}

/// Aligned `size x size` cell block whose lower corner is cell `(x, z)`
#[derive(Debug, Clone, Copy)]
struct Leaf {
    x: usize,
    z: usize,
    size: usize,
}

/// Validated filter policy
#[derive(Debug, Clone)]
pub struct EdgeFilter {
    params: EdgeFilterParams,
}

impl EdgeFilter {
    pub fn new(params: EdgeFilterParams) -> Result<Self> {
        if !(params.threshold_px.is_finite() && params.threshold_px >= 0.0) {
            return Err(WaterError::FilterParams(format!(
                "threshold must be a non-negative pixel count, got {}",
                params.threshold_px
            )));
        }
        if !(params.near_field_radius_m.is_finite() && params.near_field_radius_m >= 0.0) {
            return Err(WaterError::FilterParams(format!(
                "near-field radius must be non-negative, got {}",
                params.near_field_radius_m
            )));
        }
        if params.max_merge_level > MAX_MERGE_LEVEL {
            return Err(WaterError::FilterParams(format!(
                "max merge level {} exceeds {}",
                params.max_merge_level, MAX_MERGE_LEVEL
            )));
        }
        Ok(Self { params })
    }

    /// Write the emitted triangle list for this view into `out` (cleared first)
    pub fn filter(&self, grid: &WaterGrid, view: &ViewState, out: &mut Vec<u32>) {
        out.clear();

        let cells_x = grid.cells_x();
        let cells_z = grid.cells_z();
        let root = 1usize << self.params.max_merge_level;

        let mut leaves = Vec::new();
        for z in (0..cells_z).step_by(root) {
            for x in (0..cells_x).step_by(root) {
                self.collect_leaves(grid, view, x, z, root, &mut leaves);
            }
        }

        // Size of the leaf covering each cell
        let mut leaf_size = vec![1usize; cells_x * cells_z];
        for leaf in leaves.iter().filter(|leaf| leaf.size > 1) {
            for z in leaf.z..leaf.z + leaf.size {
                let row = z * cells_x;
                leaf_size[row + leaf.x..row + leaf.x + leaf.size].fill(leaf.size);
            }
        }

        for leaf in &leaves {
            if leaf.size == 1 {
                out.extend_from_slice(&grid.block_indices(leaf.x, leaf.z, 1));
                continue;
            }
            let mismatched = mismatched_sides(leaf, &leaf_size, cells_x, cells_z);
            if mismatched.iter().any(|&side| side) {
                emit_fan(grid, leaf, mismatched, out);
            } else {
                out.extend_from_slice(&grid.block_indices(leaf.x, leaf.z, leaf.size));
            }
        }
    }

    fn collect_leaves(
        &self,
        grid: &WaterGrid,
        view: &ViewState,
        x: usize,
        z: usize,
        size: usize,
        leaves: &mut Vec<Leaf>,
    ) {
        if x >= grid.cells_x() || z >= grid.cells_z() {
            return;
        }

        let inside = x + size <= grid.cells_x() && z + size <= grid.cells_z();
        if size == 1 || (inside && self.can_coalesce(grid, view, x, z, size)) {
            leaves.push(Leaf { x, z, size });
            return;
        }

        let half = size / 2;
        for (dx, dz) in [(0, 0), (half, 0), (0, half), (half, half)] {
            self.collect_leaves(grid, view, x + dx, z + dz, half, leaves);
        }
    }

    fn can_coalesce(
        &self,
        grid: &WaterGrid,
        view: &ViewState,
        x: usize,
        z: usize,
        size: usize,
    ) -> bool {
        let spacing = grid.spacing();
        let min = grid.origin() + Vec2::new(x as f32, z as f32) * spacing;
        let max = min + spacing * size as f32;

        // Closest point of the block footprint (rest plane) to the eye
        let nearest = Vec2::new(view.eye.x, view.eye.z).clamp(min, max);
        let distance = Vec3::new(nearest.x, 0.0, nearest.y).distance(view.eye);
        if distance <= self.params.near_field_radius_m {
            return false;
        }

        // Longest edge dropped by coalescing belongs to the half-size children
        let dropped_edge_m = spacing.max_element() * (size / 2) as f32;
        let projected_px = dropped_edge_m * view.focal_length_px / distance;
        projected_px < self.params.threshold_px
    }
}

/// Left, bottom, right and top sides: true when a cell across the side belongs
/// to a leaf of another size
fn mismatched_sides(
    leaf: &Leaf,
    leaf_size: &[usize],
    cells_x: usize,
    cells_z: usize,
) -> [bool; 4] {
    let Leaf { x, z, size } = *leaf;
    let differs = |cx: usize, cz: usize| leaf_size[cz * cells_x + cx] != size;

    [
        x > 0 && (z..z + size).any(|cz| differs(x - 1, cz)),
        z + size < cells_z && (x..x + size).any(|cx| differs(cx, z + size)),
        x + size < cells_x && (z..z + size).any(|cz| differs(x + size, cz)),
        z > 0 && (x..x + size).any(|cx| differs(cx, z - 1)),
    ]
}

/// Fan around the block centre. Mismatched sides are split at every lattice point.
fn emit_fan(grid: &WaterGrid, leaf: &Leaf, mismatched: [bool; 4], out: &mut Vec<u32>) {
    let Leaf { x, z, size } = *leaf;
    let (x1, z1) = (x + size, z + size);
    let centre = grid.vertex_index(x + size / 2, z + size / 2);

    // Counter-clockwise seen from +Y
    let sides = [
        ((x, z), (x, z1)),
        ((x, z1), (x1, z1)),
        ((x1, z1), (x1, z)),
        ((x1, z), (x, z)),
    ];

    for ((start, end), split) in sides.into_iter().zip(mismatched) {
        let steps = if split { size } else { 1 };
        let step = |a: usize, b: usize, i: usize| {
            if b >= a {
                a + (b - a) * i / steps
            } else {
                a - (a - b) * i / steps
            }
        };

        let mut prev = grid.vertex_index(start.0, start.1);
        for i in 1..=steps {
            let next = grid.vertex_index(step(start.0, end.0, i), step(start.1, end.1, i));
            out.extend_from_slice(&[centre, prev, next]);
            prev = next;
        }
    }
}
