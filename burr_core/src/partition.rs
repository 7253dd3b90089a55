// Splitting a committed piece in two.
//
// `partition_piece()` carves a sub-piece out of a piece that is already
// labeled in the grid. Members are ordered by accessibility and a BFS grows
// the partition outward from the first of them, taking a cell only if the
// cells left behind stay connected. The check is speculative: the partition
// plus the candidate are relabeled void, `check_piece_connectivity()` runs,
// and the original labels are written back before moving on.
//
// The grid is borrowed mutably for those speculative writes but comes back
// with exactly the labels it went in with. The caller relabels the returned
// cells.

use crate::accessibility::AccessibilityGrid;
use crate::connectivity::check_piece_connectivity;
use crate::grid::{VisitedSet, VoxelGrid};
use crate::types::{PieceId, Voxel};
use std::collections::VecDeque;

/// Grow a sub-piece of up to `target` cells out of piece `id`.
///
/// The BFS starts at the lowest-scoring (most exposed) member, which itself
/// always stays with the original piece. A neighbor is accepted only if removing it (with
/// the partition so far) keeps the rest of `id` connected; rejected
/// neighbors are still expanded. Stops at `target` cells or when the
/// frontier runs out.
pub fn partition_piece(
    grid: &mut VoxelGrid,
    scores: &AccessibilityGrid,
    piece: &[Voxel],
    id: PieceId,
    target: usize,
) -> Vec<Voxel> {
    let mut sorted = piece.to_vec();
    sorted.sort_by(|a, b| scores.score(*a).total_cmp(&scores.score(*b)));
    let Some(&start) = sorted.first() else {
        return Vec::new();
    };

    let mut partition: Vec<Voxel> = Vec::new();
    let mut visited = VisitedSet::for_grid(grid);
    visited.insert(start);
    let mut queue = VecDeque::from([start]);

    'grow: while let Some(current) = queue.pop_front() {
        for n in grid.neighbors(current, id) {
            if partition.len() >= target {
                break 'grow;
            }
            if !visited.insert(n) {
                continue;
            }
            grid.relabel(&partition, PieceId::EMPTY);
            grid.set(n, PieceId::EMPTY);
            let keeps_rest = check_piece_connectivity(grid, &sorted, id);
            grid.relabel(&partition, id);
            grid.set(n, id);

            if keeps_rest {
                partition.push(n);
            }
            queue.push_back(n);
        }
    }

    log::debug!(
        "split {} cells off piece {id} ({} total, target {target})",
        partition.len(),
        piece.len()
    );
    partition
}
