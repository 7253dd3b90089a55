// Seed, anchor and normal discovery.
//
// - `find_seeds()`: key-piece seed cells (nothing above them, exactly one open
//   horizontal side).
// - `find_normal()`: the first exposed face of a cell, skipping one direction.
// - `find_normal_direction()`: the face of a cell that touches the previous
//   piece; that is the direction the new piece slides out.
// - `find_anchors()`: the outermost solid cell on each allowed axis ray from a
//   seed. Searches must never enter an anchor or its shadow column.
// - `find_candidate_seeds()` / `rank_candidate_seeds()`: seeds for every piece
//   after the key, taken from the unassigned shell around the previous piece.
//
// All directional scans use `Direction::ALL` order (-x, +x, -y, +y, -z, +z),
// so "first" is well defined.

use crate::accessibility::AccessibilityGrid;
use crate::grid::{VisitedSet, VoxelGrid};
use crate::types::{Direction, PieceId, Voxel};

/// Unassigned cells with no unassigned cell anywhere above them in +z and
/// exactly three of their four horizontal neighbors unassigned.
pub fn find_seeds(grid: &VoxelGrid) -> Vec<Voxel> {
    let mut seeds = Vec::new();
    for (v, label) in grid.iter() {
        if label != PieceId::UNASSIGNED {
            continue;
        }
        let covered = grid
            .ray(v, Direction::PosZ)
            .any(|above| grid.get(above) == PieceId::UNASSIGNED);
        if covered {
            continue;
        }
        let adjacent = Direction::HORIZONTAL
            .iter()
            .filter(|&&d| grid.get(v.step(d)) == PieceId::UNASSIGNED)
            .count();
        if adjacent == 3 {
            seeds.push(v);
        }
    }
    log::debug!("found {} key seeds", seeds.len());
    seeds
}

/// First direction other than `bad_normal` in which `voxel` is exposed: the
/// neighbor is outside the grid or not unassigned solid.
///
/// Returns `None` (and logs) when every other face is covered.
pub fn find_normal(grid: &VoxelGrid, voxel: Voxel, bad_normal: Direction) -> Option<Direction> {
    let found = Direction::ALL.into_iter().find(|&d| {
        if d == bad_normal {
            return false;
        }
        let n = voxel.step(d);
        !grid.in_bounds(n) || grid.get(n) != PieceId::UNASSIGNED
    });
    if found.is_none() {
        log::error!("no exposed face on {voxel} other than {bad_normal}");
    }
    found
}

/// The direction from `voxel` toward the first face-adjacent member of
/// `prev_piece`. Returns `None` (and logs) if `voxel` does not touch it.
pub fn find_normal_direction(grid: &VoxelGrid, voxel: Voxel, prev_piece: &[Voxel]) -> Option<Direction> {
    let members = VisitedSet::from_voxels(grid, prev_piece);
    let found = Direction::ALL
        .into_iter()
        .find(|&d| members.contains(voxel.step(d)));
    if found.is_none() {
        log::error!("{voxel} does not touch the previous piece");
    }
    found
}

/// Anchors around a seed. For each direction other than `normal_one` and
/// `normal_two`, records the outermost unassigned cell on the ray leaving
/// the seed that way.
pub fn find_anchors(
    grid: &VoxelGrid,
    seed: Voxel,
    normal_one: Direction,
    normal_two: Direction,
) -> Vec<Voxel> {
    Direction::ALL
        .into_iter()
        .filter(|&d| d != normal_one && d != normal_two)
        .filter_map(|d| {
            grid.ray(seed, d)
                .filter(|&v| grid.get(v) == PieceId::UNASSIGNED)
                .last()
        })
        .collect()
}

/// Candidate seeds for the piece after `prev_piece`.
///
/// Takes unassigned face neighbors of the previous piece, skipping those
/// reached along the previous removal axis and the cells one step behind the
/// previous piece (against `prev_normal`). More than `limit` candidates are
/// ranked with `rank_candidate_seeds()` and truncated.
pub fn find_candidate_seeds(
    grid: &VoxelGrid,
    scores: &AccessibilityGrid,
    prev_piece: &[Voxel],
    prev_normal: Direction,
    limit: usize,
) -> Vec<Voxel> {
    let mut visited = VisitedSet::from_voxels(grid, prev_piece);
    for &member in prev_piece {
        visited.insert(member.step(prev_normal.opposite()));
    }

    let mut candidates = Vec::new();
    for &member in prev_piece {
        for d in Direction::ALL {
            let n = member.step(d);
            if grid.get(n) == PieceId::UNASSIGNED
                && visited.insert(n)
                && d.axis() != prev_normal.axis()
            {
                candidates.push(n);
            }
        }
    }

    if candidates.len() > limit {
        let mut ranked = rank_candidate_seeds(grid, scores, &candidates, prev_piece);
        ranked.truncate(limit);
        log::debug!(
            "kept {} of {} candidate seeds",
            ranked.len(),
            candidates.len()
        );
        ranked
    } else {
        log::debug!("{} candidate seeds", candidates.len());
        candidates
    }
}

/// Sort seeds by normalized accessibility plus normalized depth (how far the
/// solid run extends along the seed's removal direction), lowest first.
pub fn rank_candidate_seeds(
    grid: &VoxelGrid,
    scores: &AccessibilityGrid,
    seeds: &[Voxel],
    prev_piece: &[Voxel],
) -> Vec<Voxel> {
    let depths: Vec<usize> = seeds
        .iter()
        .map(|&seed| match find_normal_direction(grid, seed, prev_piece) {
            Some(normal) => solid_depth(grid, seed, normal),
            None => 0,
        })
        .collect();

    let max_depth = depths.iter().copied().max().unwrap_or(0);
    let max_access = seeds
        .iter()
        .map(|&s| scores.score(s))
        .fold(0.0f64, f64::max);

    let mut keyed: Vec<(Voxel, f64)> = seeds
        .iter()
        .zip(&depths)
        .map(|(&seed, &depth)| {
            let access = if max_access > 0.0 {
                scores.score(seed) / max_access
            } else {
                0.0
            };
            let reach = if max_depth > 0 {
                depth as f64 / max_depth as f64
            } else {
                0.0
            };
            (seed, access + reach)
        })
        .collect();

    keyed.sort_by(|a, b| a.1.total_cmp(&b.1));
    keyed.into_iter().map(|(v, _)| v).collect()
}

/// Index of the last unassigned cell along `dir`, counting `start` as 0.
fn solid_depth(grid: &VoxelGrid, start: Voxel, dir: Direction) -> usize {
    std::iter::once(start)
        .chain(grid.ray(start, dir))
        .enumerate()
        .filter(|&(_, v)| grid.get(v) == PieceId::UNASSIGNED)
        .map(|(j, _)| j)
        .last()
        .unwrap_or(0)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::accessibility::accessibility_scores;

    #[test]
    fn cube_seeds_are_top_edge_midpoints() {
        let grid = VoxelGrid::solid_box(3, 3, 3);
        let mut seeds = find_seeds(&grid);
        seeds.sort();
        assert_eq!(
            seeds,
            vec![
                Voxel::new(0, 1, 2),
                Voxel::new(1, 0, 2),
                Voxel::new(1, 2, 2),
                Voxel::new(2, 1, 2),
            ]
        );
    }

    #[test]
    fn covered_cells_are_not_seeds() {
        let mut grid = VoxelGrid::solid_box(3, 3, 2);
        // Remove the top layer except one cell: the cell under it is covered.
        for x in 0..3 {
            for y in 0..3 {
                if (x, y) != (1, 0) {
                    grid.set(Voxel::new(x, y, 1), PieceId::EMPTY);
                }
            }
        }
        let seeds = find_seeds(&grid);
        assert!(!seeds.contains(&Voxel::new(1, 0, 0)));
        assert!(seeds.contains(&Voxel::new(0, 1, 0)));
    }

    #[test]
    fn find_normal_skips_bad_direction() {
        let grid = VoxelGrid::solid_box(3, 3, 3);
        // (1,0,2) is exposed at -y and +z.
        let v = Voxel::new(1, 0, 2);
        assert_eq!(find_normal(&grid, v, Direction::PosZ), Some(Direction::NegY));
        assert_eq!(find_normal(&grid, v, Direction::NegY), Some(Direction::PosZ));
    }

    #[test]
    fn find_normal_treats_other_labels_as_open() {
        let mut grid = VoxelGrid::solid_box(3, 3, 3);
        grid.set(Voxel::new(0, 1, 1), PieceId(2));
        assert_eq!(
            find_normal(&grid, Voxel::new(1, 1, 1), Direction::PosZ),
            Some(Direction::NegX)
        );
    }

    #[test]
    fn buried_cell_has_no_normal() {
        let grid = VoxelGrid::solid_box(3, 3, 3);
        assert_eq!(find_normal(&grid, Voxel::new(1, 1, 1), Direction::PosZ), None);
    }

    #[test]
    fn normal_direction_points_at_previous_piece() {
        let grid = VoxelGrid::solid_box(4, 4, 4);
        let prev = vec![Voxel::new(1, 1, 3), Voxel::new(2, 1, 3)];
        assert_eq!(
            find_normal_direction(&grid, Voxel::new(1, 1, 2), &prev),
            Some(Direction::PosZ)
        );
        assert_eq!(
            find_normal_direction(&grid, Voxel::new(3, 1, 3), &prev),
            Some(Direction::NegX)
        );
        assert_eq!(find_normal_direction(&grid, Voxel::new(0, 0, 0), &prev), None);
    }

    #[test]
    fn anchors_take_outermost_cell_per_allowed_direction() {
        let grid = VoxelGrid::solid_box(5, 5, 5);
        let seed = Voxel::new(2, 0, 4);
        let anchors = find_anchors(&grid, seed, Direction::NegY, Direction::PosZ);
        // Allowed: -x, +x, +y, -z. -y and +z are excluded.
        assert_eq!(
            anchors,
            vec![
                Voxel::new(0, 0, 4),
                Voxel::new(4, 0, 4),
                Voxel::new(2, 4, 4),
                Voxel::new(2, 0, 0),
            ]
        );
    }

    #[test]
    fn anchors_skip_non_unassigned_cells() {
        let mut grid = VoxelGrid::solid_box(5, 1, 1);
        grid.set(Voxel::new(0, 0, 0), PieceId(3));
        let anchors = find_anchors(&grid, Voxel::new(2, 0, 0), Direction::PosX, Direction::PosZ);
        assert_eq!(anchors, vec![Voxel::new(1, 0, 0)]);
    }

    #[test]
    fn candidate_seeds_exclude_removal_axis_and_shadow() {
        let mut grid = VoxelGrid::solid_box(4, 4, 4);
        let prev = vec![Voxel::new(1, 1, 3), Voxel::new(2, 1, 3)];
        grid.relabel(&prev, PieceId::KEY);
        let scores = accessibility_scores(&grid, 0.1, 3, PieceId::UNASSIGNED);
        let candidates = find_candidate_seeds(&grid, &scores, &prev, Direction::PosZ, 10);
        // Horizontal neighbors of the key on the top layer.
        let mut sorted = candidates.clone();
        sorted.sort();
        assert_eq!(
            sorted,
            vec![
                Voxel::new(0, 1, 3),
                Voxel::new(1, 0, 3),
                Voxel::new(1, 2, 3),
                Voxel::new(2, 0, 3),
                Voxel::new(2, 2, 3),
                Voxel::new(3, 1, 3),
            ]
        );
        // Nothing below the key.
        assert!(candidates.iter().all(|c| c.z == 3));
    }

    #[test]
    fn candidate_seeds_truncate_to_limit() {
        let mut grid = VoxelGrid::solid_box(4, 4, 4);
        let prev = vec![Voxel::new(1, 1, 3), Voxel::new(2, 1, 3)];
        grid.relabel(&prev, PieceId::KEY);
        let scores = accessibility_scores(&grid, 0.1, 3, PieceId::UNASSIGNED);
        let candidates = find_candidate_seeds(&grid, &scores, &prev, Direction::PosZ, 3);
        assert_eq!(candidates.len(), 3);
    }

    #[test]
    fn ranking_prefers_shallow_seeds() {
        let mut grid = VoxelGrid::solid_box(6, 1, 1);
        let prev = vec![Voxel::new(2, 0, 0)];
        grid.relabel(&prev, PieceId::KEY);
        let scores = accessibility_scores(&grid, 0.1, 0, PieceId::UNASSIGNED);
        // Both seeds have one unassigned neighbor. Sliding (1,0,0) along +x
        // runs into three cells past the key, (3,0,0) along -x into two.
        assert_eq!(solid_depth(&grid, Voxel::new(1, 0, 0), Direction::PosX), 4);
        assert_eq!(solid_depth(&grid, Voxel::new(3, 0, 0), Direction::NegX), 3);
        let ranked = rank_candidate_seeds(
            &grid,
            &scores,
            &[Voxel::new(1, 0, 0), Voxel::new(3, 0, 0)],
            &prev,
        );
        assert_eq!(ranked, vec![Voxel::new(3, 0, 0), Voxel::new(1, 0, 0)]);
    }

    #[test]
    fn ranking_handles_zero_maxima() {
        let grid = VoxelGrid::solid_box(1, 1, 1);
        let scores = accessibility_scores(&grid, 0.1, 0, PieceId::UNASSIGNED);
        let ranked = rank_candidate_seeds(&grid, &scores, &[Voxel::new(0, 0, 0)], &[]);
        assert_eq!(ranked, vec![Voxel::new(0, 0, 0)]);
    }
}
