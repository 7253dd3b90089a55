// Errors surfaced by grid construction and the assembly driver.
//
// The search routines themselves never fail loudly: an exhausted BFS returns
// an empty path, a missing face returns `None`. Only the driver, which has to
// decide whether a run can continue, turns those outcomes into a
// `PuzzleError`.

use crate::types::Voxel;

/// Reasons a puzzle cannot be generated from the given input.
#[derive(Clone, Debug, PartialEq, Eq, thiserror::Error)]
pub enum PuzzleError {
    #[error("the voxel grid contains no solid cells")]
    EmptyShape,
    #[error("a puzzle needs at least 2 pieces, got {0}")]
    InvalidPieceCount(u32),
    #[error("expected {expected} labels for the grid dimensions, got {actual}")]
    LabelCountMismatch { expected: usize, actual: usize },
    #[error("no seed voxel with an exposed top and a single open side")]
    NoSeeds,
    #[error("voxel {0} has no exposed face usable as a removal direction")]
    NoExposedFace(Voxel),
    #[error("no voxel can block seed {0} along its exposed face")]
    NoBlockingCandidates(Voxel),
    #[error("could not build a key piece in {attempts} attempts")]
    KeyConstructionFailed { attempts: u32 },
}
