// Accessibility scoring.
//
// A cell's accessibility score says how buried it is among cells of the same
// label. Depth 0 is the plain same-label face-neighbor count (0..=6). Depth
// `d` adds `alpha^d` times the sum of the neighbors' depth `d-1` scores to the
// cell's own depth `d-1` score, so wider neighborhoods contribute with
// exponentially shrinking weight.
//
// The grid is built bottom-up, one depth layer at a time, reusing the
// previous layer instead of recursing from scratch for each depth.
//
// Scores go stale as soon as any label changes; callers rebuild them rather
// than patching. Cells with a different label score 0 and are never read.

use crate::config::AccessibilityParams;
use crate::grid::VoxelGrid;
use crate::types::{PieceId, Voxel};

/// Per-cell accessibility scores, same dimensions as the source grid.
#[derive(Clone, Debug)]
pub struct AccessibilityGrid {
    scores: Vec<f64>,
    size_x: u32,
    size_y: u32,
    size_z: u32,
}

impl AccessibilityGrid {
    fn zeroed(grid: &VoxelGrid) -> Self {
        Self {
            scores: vec![0.0; grid.cell_count()],
            size_x: grid.size_x,
            size_y: grid.size_y,
            size_z: grid.size_z,
        }
    }

    fn index(&self, v: Voxel) -> Option<usize> {
        if v.x < 0
            || v.y < 0
            || v.z < 0
            || v.x as u32 >= self.size_x
            || v.y as u32 >= self.size_y
            || v.z as u32 >= self.size_z
        {
            return None;
        }
        let sx = self.size_x as usize;
        let sy = self.size_y as usize;
        Some(v.x as usize + v.y as usize * sx + v.z as usize * sx * sy)
    }

    /// Score of a cell; 0 outside the grid.
    pub fn score(&self, v: Voxel) -> f64 {
        self.index(v).map(|i| self.scores[i]).unwrap_or(0.0)
    }

    /// Sum of the scores of `voxels`.
    pub fn total(&self, voxels: &[Voxel]) -> f64 {
        voxels.iter().map(|&v| self.score(v)).sum()
    }
}

/// Compute accessibility scores for cells labeled `piece`.
pub fn accessibility_scores(
    grid: &VoxelGrid,
    alpha: f64,
    depth: u32,
    piece: PieceId,
) -> AccessibilityGrid {
    let mut layer = AccessibilityGrid::zeroed(grid);
    for (i, (v, label)) in grid.iter().enumerate() {
        if label == piece {
            layer.scores[i] = grid.neighbors(v, piece).len() as f64;
        }
    }

    let mut multiplier = 1.0;
    for _ in 1..=depth {
        multiplier *= alpha;
        let mut next = AccessibilityGrid::zeroed(grid);
        for (i, (v, label)) in grid.iter().enumerate() {
            if label != piece {
                continue;
            }
            let spread: f64 = grid
                .neighbors(v, piece)
                .iter()
                .map(|&n| layer.score(n))
                .sum();
            next.scores[i] = layer.scores[i] + multiplier * spread;
        }
        layer = next;
    }
    layer
}

/// `accessibility_scores` with the configured alpha and depth.
pub fn score_grid(grid: &VoxelGrid, params: &AccessibilityParams, piece: PieceId) -> AccessibilityGrid {
    accessibility_scores(grid, params.alpha, params.depth, piece)
}
