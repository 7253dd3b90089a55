// Breadth-first path finders over unassigned cells.
//
// Three variants share one search loop (`search()`):
// - `shortest_path()`: seed to a blocking pair's blockee. The blocker's and
//   every anchor's shadow column (the cell plus everything behind it against
//   the removal direction) is marked visited before the search starts. The
//   resulting path is then projected forward: every unassigned cell in front
//   of a path cell along the removal direction has to leave with it.
// - `shortest_path_unrestricted()`: plain point-to-point, no exclusions.
// - `shortest_path_to_piece()`: start to the nearest member of a target set.
//
// The frontier holds whole paths rather than predecessor links, so the
// winning path is read straight off the queue. Visited sets live for one call.
//
// An exhausted frontier is not an error: the finder logs it and returns an
// empty path, and every caller treats empty as "no path".

use crate::blocking::VoxelPair;
use crate::grid::{VisitedSet, VoxelGrid};
use crate::types::{Direction, PieceId, Voxel};
use std::collections::VecDeque;

/// FIFO BFS from `start`. `enterable` filters neighbors; the first dequeued
/// path whose tail satisfies `is_goal` wins.
fn search(
    grid: &VoxelGrid,
    start: Voxel,
    mut visited: VisitedSet,
    enterable: impl Fn(Voxel) -> bool,
    is_goal: impl Fn(Voxel) -> bool,
) -> Option<Vec<Voxel>> {
    visited.insert(start);
    let mut frontier: VecDeque<Vec<Voxel>> = VecDeque::new();
    frontier.push_back(vec![start]);

    while let Some(path) = frontier.pop_front() {
        let tail = *path.last()?;
        if is_goal(tail) {
            return Some(path);
        }
        for d in Direction::ALL {
            let n = tail.step(d);
            if !grid.in_bounds(n) || !enterable(n) || !visited.insert(n) {
                continue;
            }
            let mut next = path.clone();
            next.push(n);
            frontier.push_back(next);
        }
    }
    None
}

/// Every path cell followed by the unassigned cells in front of it along
/// `dir`, without duplicates.
pub fn project_forward(grid: &VoxelGrid, cells: &[Voxel], dir: Direction) -> Vec<Voxel> {
    let mut seen = VisitedSet::for_grid(grid);
    let mut out = Vec::with_capacity(cells.len());
    for &cell in cells {
        if seen.insert(cell) {
            out.push(cell);
        }
        for ahead in grid.ray(cell, dir) {
            if grid.get(ahead) == PieceId::UNASSIGNED && seen.insert(ahead) {
                out.push(ahead);
            }
        }
    }
    out
}

/// Shortest path from `seed` to `goal.blockee` that avoids the shadow
/// columns of `goal.blocker` and every anchor, projected forward along
/// `removal`. Empty when the blockee cannot be reached.
pub fn shortest_path(
    grid: &VoxelGrid,
    seed: Voxel,
    goal: &VoxelPair,
    anchors: &[Voxel],
    removal: Direction,
) -> Vec<Voxel> {
    let behind = removal.opposite();
    let mut visited = VisitedSet::for_grid(grid);
    visited.insert_column(goal.blocker, behind);
    for &anchor in anchors {
        visited.insert_column(anchor, behind);
    }

    let unassigned = |v: Voxel| grid.get(v) == PieceId::UNASSIGNED;
    match search(grid, seed, visited, unassigned, |v| v == goal.blockee) {
        Some(path) => project_forward(grid, &path, removal),
        None => {
            log::debug!("no path from {seed} to blockee {}", goal.blockee);
            Vec::new()
        }
    }
}

/// Shortest path between two cells through unassigned cells. Both ends are
/// included. Empty when `goal` cannot be reached.
pub fn shortest_path_unrestricted(grid: &VoxelGrid, start: Voxel, goal: Voxel) -> Vec<Voxel> {
    let unassigned = |v: Voxel| grid.get(v) == PieceId::UNASSIGNED;
    search(grid, start, VisitedSet::for_grid(grid), unassigned, |v| v == goal).unwrap_or_else(|| {
        log::debug!("no path from {start} to {goal}");
        Vec::new()
    })
}

/// Shortest path from `start` to the nearest cell of `targets` (excluding
/// `start` itself). Empty when no target is reachable.
pub fn shortest_path_to_piece(grid: &VoxelGrid, start: Voxel, targets: &[Voxel]) -> Vec<Voxel> {
    let mut goal = VisitedSet::from_voxels(grid, targets);
    goal.remove(start);
    let enterable = |v: Voxel| grid.get(v) == PieceId::UNASSIGNED || goal.contains(v);
    search(grid, start, VisitedSet::for_grid(grid), enterable, |v| goal.contains(v)).unwrap_or_else(|| {
        log::debug!("no path from {start} to a piece of {} cells", targets.len());
        Vec::new()
    })
}
