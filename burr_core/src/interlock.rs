// Interlock enforcement.
//
// A finished piece must slide out along its removal normal and nowhere else.
// `ensure_interlocking()` checks the other five directions one at a time with
// `mobility_check()`. When nothing stops the piece in some direction, a
// blocking extension (see `blocking::find_blocking_extension`) is grown onto
// it and its blocker joins the anchor list, so the passes that follow route
// around it.
//
// What counts as an obstacle: any unassigned cell outside the piece, and the
// previous piece unless the direction is the one the previous piece leaves
// by. Void and earlier pieces never block, since they are gone by the time
// this piece moves.

use crate::accessibility::AccessibilityGrid;
use crate::blocking::find_blocking_extension;
use crate::config::BlockingParams;
use crate::grid::{VisitedSet, VoxelGrid};
use crate::seeds::find_normal_direction;
use crate::types::{Direction, PieceId, Voxel};

/// The piece committed just before the one under construction.
#[derive(Clone, Copy, Debug)]
pub struct PreviousPiece<'a> {
    pub voxels: &'a [Voxel],
    pub id: PieceId,
    /// Direction the previous piece is removed along.
    pub normal: Direction,
}

/// Result of one `mobility_check()` pass.
#[derive(Clone, Debug, PartialEq)]
pub struct MobilityOutcome {
    pub piece: Vec<Voxel>,
    /// The blocker of the extension that was added, if any.
    pub anchor: Option<Voxel>,
}

/// A piece locked in every direction but `normal`, plus the anchors gathered
/// on the way.
#[derive(Clone, Debug, PartialEq)]
pub struct Interlocked {
    pub piece: Vec<Voxel>,
    pub anchors: Vec<Voxel>,
    pub normal: Direction,
}

/// True if some ray from a member along `dir` hits an obstacle.
fn is_blocked(grid: &VoxelGrid, piece: &[Voxel], prev: &PreviousPiece<'_>, dir: Direction) -> bool {
    let members = VisitedSet::from_voxels(grid, piece);
    piece.iter().any(|&member| {
        grid.ray(member, dir).any(|v| {
            let label = grid.get(v);
            !members.contains(v)
                && (label == PieceId::UNASSIGNED || (label == prev.id && dir != prev.normal))
        })
    })
}

/// True if `piece` is stopped along every direction except `normal`, by the
/// same obstacles `mobility_check()` looks for.
pub fn is_interlocked(
    grid: &VoxelGrid,
    piece: &[Voxel],
    prev: &PreviousPiece<'_>,
    normal: Direction,
) -> bool {
    Direction::ALL
        .into_iter()
        .filter(|&d| d != normal)
        .all(|d| is_blocked(grid, piece, prev, d))
}

/// True if nothing stops `piece` sliding out along `dir`. A cell on a
/// member's ray obstructs when it is not a member and `present` holds for
/// its label; void never obstructs.
pub fn can_slide(
    grid: &VoxelGrid,
    piece: &[Voxel],
    dir: Direction,
    present: impl Fn(PieceId) -> bool,
) -> bool {
    let members = VisitedSet::from_voxels(grid, piece);
    piece.iter().all(|&member| {
        grid.ray(member, dir).all(|v| {
            let label = grid.get(v);
            members.contains(v) || !label.is_solid() || !present(label)
        })
    })
}

/// Make sure `piece` cannot slide along `dir`.
///
/// If it already cannot, the piece comes back unchanged. Otherwise the
/// cheapest blocking extension from the piece's first member is appended
/// (without duplicates) and its blocker is reported as the new anchor.
#[allow(clippy::too_many_arguments)]
pub fn mobility_check(
    grid: &VoxelGrid,
    scores: &AccessibilityGrid,
    prev: &PreviousPiece<'_>,
    piece: &[Voxel],
    dir: Direction,
    removal: Direction,
    anchors: &[Voxel],
    params: &BlockingParams,
) -> MobilityOutcome {
    let mut piece = piece.to_vec();
    let Some(&start) = piece.first() else {
        return MobilityOutcome { piece, anchor: None };
    };
    if is_blocked(grid, &piece, prev, dir) {
        return MobilityOutcome { piece, anchor: None };
    }

    log::debug!("piece at {start} is free along {dir}, adding a blocker");
    match find_blocking_extension(grid, scores, &piece, start, dir, removal, anchors, params) {
        Some(extension) => {
            let mut members = VisitedSet::from_voxels(grid, &piece);
            for v in extension.path {
                if members.insert(v) {
                    piece.push(v);
                }
            }
            MobilityOutcome {
                piece,
                anchor: Some(extension.anchor),
            }
        }
        None => {
            log::warn!("piece at {start} stays free along {dir}");
            MobilityOutcome { piece, anchor: None }
        }
    }
}

/// Lock `piece` in every direction except its removal normal.
///
/// The normal is the direction from the piece's first member toward the
/// previous piece. Returns `None` (and logs) if the piece is empty or its
/// first member does not touch the previous piece.
pub fn ensure_interlocking(
    grid: &VoxelGrid,
    scores: &AccessibilityGrid,
    prev: &PreviousPiece<'_>,
    piece: &[Voxel],
    params: &BlockingParams,
) -> Option<Interlocked> {
    let first = *piece.first()?;
    let normal = find_normal_direction(grid, first, prev.voxels)?;

    let mut piece = piece.to_vec();
    let mut anchors = Vec::new();
    for dir in Direction::ALL.into_iter().filter(|&d| d != normal) {
        let outcome = mobility_check(grid, scores, prev, &piece, dir, normal, &anchors, params);
        piece = outcome.piece;
        anchors.extend(outcome.anchor);
    }
    log::debug!(
        "interlocked piece of {} cells, removal {normal}, {} anchors",
        piece.len(),
        anchors.len()
    );
    Some(Interlocked {
        piece,
        anchors,
        normal,
    })
}
