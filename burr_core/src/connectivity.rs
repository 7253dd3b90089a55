// Connectivity checks and repair.
//
// - `ensure_piece_connectivity()`: grow an in-construction piece until its
//   members form one face-connected component.
// - `check_piece_connectivity()`: are all cells of a given id among `members`
//   one component (through cells of that id)?
// - `verify_piece()`: does the unassigned shape left over once a piece is
//   taken out stay one component?
//
// All three are plain BFS floods with a per-call `VisitedSet`.

use crate::grid::{VisitedSet, VoxelGrid};
use crate::paths::{project_forward, shortest_path_to_piece};
use crate::types::{Direction, PieceId, Voxel};
use std::collections::VecDeque;

/// Flood from `start` through unassigned cells not in `blocked`, then report
/// whether every unassigned cell outside `blocked` was reached.
pub(crate) fn reaches_all_unassigned(grid: &VoxelGrid, blocked: &VisitedSet, start: Voxel) -> bool {
    let mut visited = blocked.clone();
    visited.insert(start);
    let mut queue = VecDeque::from([start]);
    while let Some(current) = queue.pop_front() {
        for n in grid.neighbors(current, PieceId::UNASSIGNED) {
            if visited.insert(n) {
                queue.push_back(n);
            }
        }
    }
    grid.iter()
        .all(|(v, label)| label != PieceId::UNASSIGNED || visited.contains(v))
}

/// True if the unassigned cells outside `piece` are one connected component.
/// An empty remainder counts as connected.
pub fn verify_piece(grid: &VoxelGrid, piece: &[Voxel]) -> bool {
    let excluded = VisitedSet::from_voxels(grid, piece);
    let start = grid
        .iter()
        .find(|&(v, label)| label == PieceId::UNASSIGNED && !excluded.contains(v))
        .map(|(v, _)| v);
    match start {
        Some(start) => reaches_all_unassigned(grid, &excluded, start),
        None => true,
    }
}

/// True if every cell of `members` labeled `id` is reachable from the first
/// such cell through cells labeled `id`. Vacuously true when none are.
pub fn check_piece_connectivity(grid: &VoxelGrid, members: &[Voxel], id: PieceId) -> bool {
    let Some(&start) = members.iter().find(|&&v| grid.get(v) == id) else {
        return true;
    };
    let mut visited = VisitedSet::for_grid(grid);
    visited.insert(start);
    let mut queue = VecDeque::from([start]);
    while let Some(current) = queue.pop_front() {
        for n in grid.neighbors(current, id) {
            if visited.insert(n) {
                queue.push_back(n);
            }
        }
    }
    members
        .iter()
        .all(|&v| grid.get(v) != id || visited.contains(v))
}

/// Members reachable from the first member through other members.
fn connected_portion(grid: &VoxelGrid, piece: &[Voxel], membership: &VisitedSet) -> VisitedSet {
    let mut reached = VisitedSet::for_grid(grid);
    let Some(&start) = piece.first() else {
        return reached;
    };
    reached.insert(start);
    let mut queue = VecDeque::from([start]);
    while let Some(current) = queue.pop_front() {
        for d in Direction::ALL {
            let n = current.step(d);
            if membership.contains(n) && reached.insert(n) {
                queue.push_back(n);
            }
        }
    }
    reached
}

/// Join every stray part of `piece` to the part containing its first member.
///
/// Each disconnected member is routed to the connected portion with
/// `shortest_path_to_piece()`; the path and everything in front of it along
/// `normal` joins the piece. Repeats until the piece is connected or a round
/// adds nothing. Applying this to its own output returns it unchanged.
pub fn ensure_piece_connectivity(grid: &VoxelGrid, piece: &[Voxel], normal: Direction) -> Vec<Voxel> {
    let mut piece = piece.to_vec();
    let mut membership = VisitedSet::from_voxels(grid, &piece);

    loop {
        let reached = connected_portion(grid, &piece, &membership);
        let disconnected: Vec<Voxel> = piece
            .iter()
            .copied()
            .filter(|&v| !reached.contains(v))
            .collect();
        if disconnected.is_empty() {
            return piece;
        }

        let connected: Vec<Voxel> = piece
            .iter()
            .copied()
            .filter(|&v| reached.contains(v))
            .collect();
        let before = piece.len();
        for stray in disconnected {
            let path = shortest_path_to_piece(grid, stray, &connected);
            for v in project_forward(grid, &path, normal) {
                if membership.insert(v) {
                    piece.push(v);
                }
            }
        }

        if piece.len() == before {
            log::warn!(
                "piece of {} cells stays split: no route joins its parts",
                piece.len()
            );
            return piece;
        }
    }
}
