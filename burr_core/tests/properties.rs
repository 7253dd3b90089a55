// Property-based tests for the grid algorithms.
//
// Shapes are random occupancy masks over small boxes, so the invariants get
// exercised on holes, thin bridges and disconnected fragments that the
// hand-built scenarios never reach.

use std::collections::VecDeque;

use burr_core::accessibility::accessibility_scores;
use burr_core::connectivity::{check_piece_connectivity, ensure_piece_connectivity, verify_piece};
use burr_core::{Direction, PieceId, Voxel, VoxelGrid};
use proptest::prelude::*;

/// A random shape: dimensions 1..=4 per axis, each cell solid or void.
fn shape() -> impl Strategy<Value = VoxelGrid> {
    (1u32..=4, 1u32..=4, 1u32..=4).prop_flat_map(|(sx, sy, sz)| {
        let cells = (sx * sy * sz) as usize;
        prop::collection::vec(prop::bool::weighted(0.7), cells).prop_map(move |mask| {
            let labels = mask
                .into_iter()
                .map(|solid| if solid { PieceId::UNASSIGNED } else { PieceId::EMPTY })
                .collect();
            VoxelGrid::from_labels((sx, sy, sz), labels).unwrap()
        })
    })
}

/// A shape plus a random subset of its solid cells.
fn shape_and_piece() -> impl Strategy<Value = (VoxelGrid, Vec<Voxel>)> {
    shape().prop_flat_map(|grid| {
        let solid = grid.members(PieceId::UNASSIGNED);
        let n = solid.len();
        (Just(grid), prop::sample::subsequence(solid, 0..=n))
    })
}

/// Independent flood: `cells` form one face-connected component. Empty
/// counts as connected.
fn reference_component(cells: &[Voxel]) -> bool {
    let Some(&start) = cells.first() else {
        return true;
    };
    let mut seen = vec![start];
    let mut queue = VecDeque::from([start]);
    while let Some(v) = queue.pop_front() {
        for d in Direction::ALL {
            let n = v.step(d);
            if cells.contains(&n) && !seen.contains(&n) {
                seen.push(n);
                queue.push_back(n);
            }
        }
    }
    seen.len() == cells.len()
}

/// Unassigned cells outside `piece` form one component.
fn reference_connected(grid: &VoxelGrid, piece: &[Voxel]) -> bool {
    let rest: Vec<Voxel> = grid
        .members(PieceId::UNASSIGNED)
        .into_iter()
        .filter(|v| !piece.contains(v))
        .collect();
    reference_component(&rest)
}

/// A shape with `piece` relabeled to `id`, plus a random subset of `piece`.
fn labeled_piece_and_cut() -> impl Strategy<Value = (VoxelGrid, Vec<Voxel>, Vec<Voxel>)> {
    shape_and_piece().prop_flat_map(|(mut grid, piece)| {
        grid.relabel(&piece, PieceId(7));
        let n = piece.len();
        (Just(grid), Just(piece.clone()), prop::sample::subsequence(piece, 0..=n))
    })
}

proptest! {
    /// `verify_piece` agrees with a naive flood fill.
    #[test]
    fn prop_verify_matches_flood((grid, piece) in shape_and_piece()) {
        prop_assert_eq!(verify_piece(&grid, &piece), reference_connected(&grid, &piece));
    }

    /// Depth-0 scores are same-label face-neighbor counts; other labels score 0.
    #[test]
    fn prop_depth_zero_counts_neighbors(grid in shape()) {
        let scores = accessibility_scores(&grid, 0.1, 0, PieceId::UNASSIGNED);
        for (v, label) in grid.iter() {
            let expected = if label == PieceId::UNASSIGNED {
                grid.neighbors(v, PieceId::UNASSIGNED).len() as f64
            } else {
                0.0
            };
            prop_assert_eq!(scores.score(v), expected);
        }
    }

    /// Deeper scoring never lowers a score.
    #[test]
    fn prop_scores_grow_with_depth(grid in shape(), depth in 0u32..4, alpha in 0.01f64..1.0) {
        let shallow = accessibility_scores(&grid, alpha, depth, PieceId::UNASSIGNED);
        let deep = accessibility_scores(&grid, alpha, depth + 1, PieceId::UNASSIGNED);
        for (v, _) in grid.iter() {
            prop_assert!(deep.score(v) >= shallow.score(v));
        }
    }

    /// `check_piece_connectivity` over a labeled piece agrees with a naive
    /// flood over the same cells.
    #[test]
    fn prop_piece_connectivity_matches_flood((grid, piece) in shape_and_piece()) {
        let mut labeled = grid.clone();
        labeled.relabel(&piece, PieceId(7));
        prop_assert_eq!(
            check_piece_connectivity(&labeled, &piece, PieceId(7)),
            reference_component(&piece)
        );
    }

    /// Voiding part of a piece and writing it back restores both the grid
    /// and the connectivity verdict; while voided, the verdict matches a
    /// flood over what is left.
    #[test]
    fn prop_relabel_round_trip((grid, piece, cut) in labeled_piece_and_cut()) {
        let id = PieceId(7);
        let before = check_piece_connectivity(&grid, &piece, id);

        let mut copy = grid.clone();
        copy.relabel(&cut, PieceId::EMPTY);
        let rest: Vec<Voxel> = piece.iter().copied().filter(|v| !cut.contains(v)).collect();
        prop_assert_eq!(copy.count(id), rest.len());
        prop_assert_eq!(check_piece_connectivity(&copy, &piece, id), reference_component(&rest));

        copy.relabel(&cut, id);
        prop_assert_eq!(check_piece_connectivity(&copy, &piece, id), before);
        prop_assert_eq!(copy, grid);
    }

    /// Connectivity repair is a superset of its input and a fixed point.
    #[test]
    fn prop_repair_is_idempotent((grid, piece) in shape_and_piece(), d in 0usize..6) {
        let normal = Direction::ALL[d];
        let once = ensure_piece_connectivity(&grid, &piece, normal);
        for v in &piece {
            prop_assert!(once.contains(v));
        }
        let twice = ensure_piece_connectivity(&grid, &once, normal);
        prop_assert_eq!(twice, once);
    }

    /// Neighbor queries stay in bounds and only return matching labels.
    #[test]
    fn prop_neighbors_match_label(grid in shape()) {
        for (v, _) in grid.iter() {
            let ns = grid.neighbors(v, PieceId::UNASSIGNED);
            prop_assert!(ns.len() <= 6);
            for n in ns {
                prop_assert!(grid.in_bounds(n));
                prop_assert_eq!(grid.get(n), PieceId::UNASSIGNED);
                prop_assert_eq!(v.manhattan_distance(n), 1);
            }
        }
    }
}
