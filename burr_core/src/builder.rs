// Piece construction.
//
// The key and every later piece start small and grow:
// - `filter_key()`: among the blocking pairs around a key seed, pick the
//   cheapest path from the seed to a blockee (with anchors in place).
// - `final_anchor()`: the cell that ends up holding the key in along its
//   exposed side.
// - `create_initial_piece()`: for a non-key piece, the cheapest candidate
//   seed together with everything it would drag along its removal direction.
// - `expand_piece()`: weighted random growth to a target size. Candidate
//   extensions are scored by accessibility and drawn by roulette with weight
//   `score^B`; with the default negative `B` low-scoring extensions are favored.
//
// None of these touch grid labels. The assembly driver commits a piece once
// it has been verified.

use crate::accessibility::AccessibilityGrid;
use crate::blocking::VoxelPair;
use crate::config::ExpansionParams;
use crate::connectivity::ensure_piece_connectivity;
use crate::grid::{VisitedSet, VoxelGrid};
use crate::paths::{project_forward, shortest_path, shortest_path_unrestricted};
use crate::seeds::{find_anchors, find_normal_direction};
use crate::types::{Direction, PieceId, Voxel};
use burr_prng::RandomSource;

/// The chosen key path and what it was built from.
#[derive(Clone, Debug, PartialEq)]
pub struct KeySelection {
    /// Index of the winning pair in the candidate list.
    pub index: usize,
    pub pair: VoxelPair,
    pub path: Vec<Voxel>,
    /// Anchors the path was routed around.
    pub anchors: Vec<Voxel>,
    pub score: f64,
}

/// Pick the blocking pair whose path from `seed` has the lowest positive
/// total accessibility.
///
/// Anchors come from `find_anchors(seed, blocking_normal, removal)`; paths are
/// projected along `removal`. Returns `None` when no candidate yields a
/// positive-cost path.
pub fn filter_key(
    grid: &VoxelGrid,
    scores: &AccessibilityGrid,
    seed: Voxel,
    candidates: &[VoxelPair],
    blocking_normal: Direction,
    removal: Direction,
) -> Option<KeySelection> {
    let anchors = find_anchors(grid, seed, blocking_normal, removal);
    let mut best: Option<(usize, Vec<Voxel>, f64)> = None;

    for (index, pair) in candidates.iter().enumerate() {
        let path = shortest_path(grid, seed, pair, &anchors, removal);
        let score = scores.total(&path);
        if score > 0.0 && best.as_ref().is_none_or(|(_, _, b)| score < *b) {
            best = Some((index, path, score));
        }
    }

    best.map(|(index, path, score)| KeySelection {
        index,
        pair: candidates[index],
        path,
        anchors,
        score,
    })
}

/// Last unassigned cell on the ray from `seed` along `normal`, or the pair's
/// blocker if the ray holds none.
pub fn final_anchor(grid: &VoxelGrid, seed: Voxel, pair: &VoxelPair, normal: Direction) -> Voxel {
    grid.ray(seed, normal)
        .filter(|&v| grid.get(v) == PieceId::UNASSIGNED)
        .last()
        .unwrap_or(pair.blocker)
}

/// Draw an index with probability proportional to `weights`. Falls back to
/// the last index when rounding leaves the draw past the final bucket.
fn roulette(weights: &[f64], rng: &mut impl RandomSource) -> usize {
    let total: f64 = weights.iter().sum();
    if !total.is_finite() || total <= 0.0 {
        return rng.index(weights.len());
    }
    let draw = rng.next_f64();
    let mut accum = 0.0;
    for (i, w) in weights.iter().enumerate() {
        accum += w / total;
        if draw < accum {
            return i;
        }
    }
    weights.len() - 1
}

/// Grow `piece` toward `target` cells.
///
/// Each round, every unassigned neighbor of the piece outside the anchors'
/// shadow columns (cast against `normal`) is a candidate. A candidate brings
/// the unassigned cells in front of it along `normal`; candidates that would
/// overshoot `target` are dropped. The survivor is drawn by roulette over
/// `max(score, EPSILON)^weight_exponent`, where the score is the total
/// accessibility of its connectivity-repaired projection.
///
/// Stops early (returning a smaller piece) when no candidate is left.
#[allow(clippy::too_many_arguments)]
pub fn expand_piece(
    grid: &VoxelGrid,
    scores: &AccessibilityGrid,
    piece: &[Voxel],
    anchors: &[Voxel],
    target: usize,
    normal: Direction,
    params: &ExpansionParams,
    rng: &mut impl RandomSource,
) -> Vec<Voxel> {
    let mut piece = piece.to_vec();
    let mut members = VisitedSet::from_voxels(grid, &piece);
    let mut blocked = VisitedSet::for_grid(grid);
    for &anchor in anchors {
        blocked.insert_column(anchor, normal.opposite());
    }
    let free = |v: Voxel, members: &VisitedSet| {
        grid.get(v) == PieceId::UNASSIGNED && !members.contains(v) && !blocked.contains(v)
    };

    while piece.len() < target {
        let mut seen = VisitedSet::for_grid(grid);
        let mut projections: Vec<Vec<Voxel>> = Vec::new();
        let mut weights: Vec<f64> = Vec::new();

        for &member in &piece {
            for candidate in grid.neighbors(member, PieceId::UNASSIGNED) {
                if !free(candidate, &members) || !seen.insert(candidate) {
                    continue;
                }
                let projection: Vec<Voxel> = std::iter::once(candidate)
                    .chain(grid.ray(candidate, normal))
                    .filter(|&v| free(v, &members))
                    .collect();
                if piece.len() + projection.len() > target {
                    continue;
                }
                let repaired = ensure_piece_connectivity(grid, &projection, normal);
                let score = scores.total(&repaired);
                weights.push(score.max(f64::EPSILON).powf(params.weight_exponent));
                projections.push(projection);
            }
        }

        if projections.is_empty() {
            log::debug!(
                "expansion stalled at {} of {target} cells",
                piece.len()
            );
            break;
        }

        let choice = roulette(&weights, rng);
        for &v in &projections[choice] {
            if members.insert(v) {
                piece.push(v);
            }
        }
    }
    piece
}

/// The starting cells of a non-key piece.
#[derive(Clone, Debug, PartialEq)]
pub struct InitialPiece {
    /// Index of the chosen seed in the candidate list.
    pub index: usize,
    /// The seed first, then everything it drags along.
    pub voxels: Vec<Voxel>,
    /// Removal direction: from the seed toward the previous piece.
    pub normal: Direction,
    pub score: f64,
}

/// Cheapest starting piece over `candidates`.
///
/// A candidate slides toward `prev_piece`, so every unassigned cell on its ray
/// along that normal has to come with it. Each such cell is joined to the
/// candidate by `shortest_path_unrestricted()`, and each path is projected
/// along the normal. The candidate with the lowest positive total
/// accessibility wins.
pub fn create_initial_piece(
    grid: &VoxelGrid,
    scores: &AccessibilityGrid,
    prev_piece: &[Voxel],
    candidates: &[Voxel],
) -> Option<InitialPiece> {
    let mut best: Option<InitialPiece> = None;

    for (index, &candidate) in candidates.iter().enumerate() {
        let Some(normal) = find_normal_direction(grid, candidate, prev_piece) else {
            continue;
        };
        let forced: Vec<Voxel> = grid
            .ray(candidate, normal)
            .filter(|&v| grid.get(v) == PieceId::UNASSIGNED)
            .collect();

        let mut seen = VisitedSet::for_grid(grid);
        seen.insert(candidate);
        let mut voxels = vec![candidate];
        for target in forced {
            let path = shortest_path_unrestricted(grid, candidate, target);
            if path.is_empty() {
                log::warn!("seed {candidate} cannot reach forced cell {target}");
            }
            for v in project_forward(grid, &path, normal) {
                if seen.insert(v) {
                    voxels.push(v);
                }
            }
        }

        let score = scores.total(&voxels);
        if score > 0.0 && best.as_ref().is_none_or(|b| score < b.score) {
            best = Some(InitialPiece {
                index,
                voxels,
                normal,
                score,
            });
        }
    }

    if best.is_none() {
        log::debug!("none of {} candidate seeds gave a piece", candidates.len());
    }
    best
}
