// Blocking search.
//
// A piece sliding along some direction is stopped by any solid cell directly
// in front of one of its members. `find_blocking_pairs()` floods the
// unassigned cells reachable from a seed and, for each visited cell (the
// blockee), records the unassigned cell one step along the blocking
// direction (the blocker). Pairs with the lowest-scoring blockees come
// first.
//
// `find_blocking_extension()` turns the best of those pairs into a concrete
// addition to a piece: a path from the seed to the blockee (see
// `paths::shortest_path`) whose blocker stays attached to the rest of the
// unassigned shape. The chosen blocker becomes a new anchor.

use crate::accessibility::AccessibilityGrid;
use crate::config::BlockingParams;
use crate::connectivity::reaches_all_unassigned;
use crate::grid::{VisitedSet, VoxelGrid};
use crate::paths::shortest_path;
use crate::types::{Direction, PieceId, Voxel};
use std::collections::VecDeque;

/// A blocker cell and the cell it stops, with their accessibility scores at
/// discovery time.
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct VoxelPair {
    pub blocker: Voxel,
    pub blocker_score: f64,
    pub blockee: Voxel,
    pub blockee_score: f64,
}

/// A path that, once added to a piece, stops it sliding in one direction.
#[derive(Clone, Debug, PartialEq)]
pub struct BlockingExtension {
    pub path: Vec<Voxel>,
    /// The blocker the path leans on. Later searches treat it as an anchor.
    pub anchor: Voxel,
    /// Total accessibility of `path`.
    pub score: f64,
}

/// Blocker/blockee pairs reachable from `seed` for blocking direction
/// `direction`, sorted by ascending blockee score.
///
/// The flood stops once `params.search_limit` pairs are recorded; at most
/// `params.keep` pairs are returned.
pub fn find_blocking_pairs(
    grid: &VoxelGrid,
    scores: &AccessibilityGrid,
    seed: Voxel,
    direction: Direction,
    params: &BlockingParams,
) -> Vec<VoxelPair> {
    let mut pairs = Vec::new();
    let mut visited = VisitedSet::for_grid(grid);
    visited.insert(seed);
    let mut queue = VecDeque::from([seed]);
    let mut expanded = 0usize;

    while pairs.len() < params.search_limit {
        let Some(blockee) = queue.pop_front() else {
            break;
        };
        expanded += 1;
        let blocker = blockee.step(direction);
        if blocker != seed && grid.get(blocker) == PieceId::UNASSIGNED {
            pairs.push(VoxelPair {
                blocker,
                blocker_score: scores.score(blocker),
                blockee,
                blockee_score: scores.score(blockee),
            });
        }
        for n in grid.neighbors(blockee, PieceId::UNASSIGNED) {
            if visited.insert(n) {
                queue.push_back(n);
            }
        }
    }
    log::debug!(
        "blocking search from {seed} along {direction}: {} pairs after {expanded} cells",
        pairs.len()
    );

    pairs.sort_by(|a, b| a.blockee_score.total_cmp(&b.blockee_score));
    pairs.truncate(params.keep);
    pairs
}

/// Cheapest path from `seed` that stops `piece` moving along `to_block`.
///
/// Candidate pairs come from `find_blocking_pairs()`; pairs whose blocker is
/// already in `piece` are skipped. For each, the path avoids `anchors` and is
/// projected along `removal`. It is discarded if it is empty or if, with the
/// piece and path taken out, its blocker cannot reach every other unassigned
/// cell. Returns `None` when no candidate survives.
#[allow(clippy::too_many_arguments)]
pub fn find_blocking_extension(
    grid: &VoxelGrid,
    scores: &AccessibilityGrid,
    piece: &[Voxel],
    seed: Voxel,
    to_block: Direction,
    removal: Direction,
    anchors: &[Voxel],
    params: &BlockingParams,
) -> Option<BlockingExtension> {
    let pairs = find_blocking_pairs(grid, scores, seed, to_block, params);
    let members = VisitedSet::from_voxels(grid, piece);
    let mut best: Option<BlockingExtension> = None;

    for pair in &pairs {
        if members.contains(pair.blocker) {
            continue;
        }
        let path = shortest_path(grid, seed, pair, anchors, removal);
        if path.is_empty() {
            continue;
        }
        let mut excluded = members.clone();
        for &v in &path {
            excluded.insert(v);
        }
        if !reaches_all_unassigned(grid, &excluded, pair.blocker) {
            log::trace!("blocker {} would be cut off", pair.blocker);
            continue;
        }
        let score = scores.total(&path);
        if best.as_ref().is_none_or(|b| score < b.score) {
            best = Some(BlockingExtension {
                path,
                anchor: pair.blocker,
                score,
            });
        }
    }

    if best.is_none() {
        log::debug!(
            "no usable blocker for {seed} along {to_block} among {} pairs",
            pairs.len()
        );
    }
    best
}
