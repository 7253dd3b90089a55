// burr_core - interlocking burr puzzle generation.
//
// This crate takes a solid voxel shape and cuts it into pieces that come
// apart in a fixed order, each with one axis-aligned slide. The first piece
// (the key) leaves upward; each later piece leaves into the space the
// previous one vacated. Everything left over forms the frame.
//
// Module overview:
// - `types.rs`:         Voxel, Direction, PieceId (cell labels).
// - `grid.rs`:          Dense labeled voxel grid + bitset visited sets.
// - `accessibility.rs`: Recursive neighbor-count scores (how buried a cell is).
// - `seeds.rs`:         Key seeds, removal normals, anchors, candidate seeds.
// - `paths.rs`:         BFS path search with removal-direction projection.
// - `blocking.rs`:      Blocker/blockee pairs and blocking extensions.
// - `connectivity.rs`:  Piece and remainder connectivity checks + repair.
// - `builder.rs`:       Key selection, weighted piece expansion, initial pieces.
// - `interlock.rs`:     Mobility checks in the five non-removal directions.
// - `partition.rs`:     Splitting a committed piece in two.
// - `assembly.rs`:      `generate_puzzle()`, the end-to-end driver.
// - `config.rs`:        PuzzleConfig and the per-stage parameter groups.
// - `error.rs`:         PuzzleError.
// - `prng`:             Re-exported from `burr_prng` (xoshiro256++ PRNG).
//
// **Determinism.** Generation is a pure function of (shape, config, seed).
// All randomness flows through a `RandomSource`; no `HashMap` iteration, no
// system time, no OS entropy.

pub mod accessibility;
pub mod assembly;
pub mod blocking;
pub mod builder;
pub mod config;
pub mod connectivity;
pub mod error;
pub mod grid;
pub mod interlock;
pub mod partition;
pub mod paths;
pub use burr_prng as prng;
pub mod seeds;
pub mod types;

pub use assembly::{PieceRecord, PuzzleLayout, generate_puzzle};
pub use config::PuzzleConfig;
pub use error::PuzzleError;
pub use grid::VoxelGrid;
pub use types::{Direction, PieceId, Voxel};
