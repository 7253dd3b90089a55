// Puzzle assembly driver.
//
// `generate_puzzle()` cuts a solid voxel shape into interlocking pieces that
// come apart in a fixed order, one axis-aligned slide per piece:
//
// 1. Key. A random top seed (nothing above, one open side) is held in along
//    its open side by a blocking path, anchored, grown to the target size and
//    verified. It leaves along +z.
// 2. Later pieces. Each grows from a cell next to the previous piece and
//    slides out into the space that piece vacated. It is interlocked against
//    the other five directions, repaired to be connected, grown (keeping
//    only expansions that stay interlocked), verified and only then
//    committed. A candidate seed that cannot reach the minimum size
//    is dropped and the next one tried.
// 3. Split (optional). With `split_pieces`, half as many double-size pieces
//    are built in step 2 and each is then cut in two by `partition_piece()`.
//    The halves are listed in an order, with directions, that comes apart.
//
// Whatever is still unassigned at the end is the last piece (the frame).
//
// The grid is the single source of truth for committed pieces; pieces under
// construction exist only as voxel lists until they pass verification.

use crate::accessibility::{AccessibilityGrid, score_grid};
use crate::blocking::find_blocking_pairs;
use crate::builder::{KeySelection, create_initial_piece, expand_piece, filter_key, final_anchor};
use crate::config::PuzzleConfig;
use crate::connectivity::{ensure_piece_connectivity, verify_piece};
use crate::error::PuzzleError;
use crate::grid::VoxelGrid;
use crate::interlock::{PreviousPiece, can_slide, ensure_interlocking, is_interlocked};
use crate::partition::partition_piece;
use crate::seeds::{find_candidate_seeds, find_normal, find_seeds};
use crate::types::{Direction, PieceId, Voxel};
use burr_prng::RandomSource;
use serde::{Deserialize, Serialize};

/// The key always leaves upward.
pub const KEY_REMOVAL: Direction = Direction::PosZ;

/// One committed piece.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct PieceRecord {
    pub id: PieceId,
    /// Direction the piece slides out along.
    pub removal: Direction,
    pub voxels: Vec<Voxel>,
}

/// Result of a generation run. Pieces are listed in removal order.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct PuzzleLayout {
    pub grid_size: [u32; 3],
    pub pieces: Vec<PieceRecord>,
    /// Unassigned cells left over: the frame the pieces come out of.
    pub remaining: Vec<Voxel>,
}

impl PuzzleLayout {
    pub fn piece(&self, id: PieceId) -> Option<&PieceRecord> {
        self.pieces.iter().find(|p| p.id == id)
    }
}

/// Smallest piece the driver accepts for a given target size.
fn min_piece_size(config: &PuzzleConfig, target: usize) -> usize {
    (config.key_size_fraction * target as f64) as usize
}

/// Expand `piece` until the expansion leaves the rest of the shape connected
/// and passes `accept`, up to `max_attempts` tries. Falls back to the
/// unexpanded piece, which the caller has to check again.
#[allow(clippy::too_many_arguments)]
fn grow_verified(
    grid: &VoxelGrid,
    scores: &AccessibilityGrid,
    piece: &[Voxel],
    anchors: &[Voxel],
    target: usize,
    normal: Direction,
    config: &PuzzleConfig,
    rng: &mut impl RandomSource,
    accept: impl Fn(&[Voxel]) -> bool,
) -> Vec<Voxel> {
    for attempt in 0..config.expansion.max_attempts {
        let grown = expand_piece(
            grid,
            scores,
            piece,
            anchors,
            target,
            normal,
            &config.expansion,
            rng,
        );
        if verify_piece(grid, &grown) && accept(&grown) {
            log::debug!(
                "expansion to {} cells verified on attempt {}",
                grown.len(),
                attempt + 1
            );
            return grown;
        }
    }
    log::warn!(
        "no verified expansion in {} attempts, keeping {} cells",
        config.expansion.max_attempts,
        piece.len()
    );
    piece.to_vec()
}

/// One try at building the key from `seed`.
fn try_key(
    grid: &VoxelGrid,
    scores: &AccessibilityGrid,
    seed: Voxel,
    target: usize,
    config: &PuzzleConfig,
    rng: &mut impl RandomSource,
) -> Result<Vec<Voxel>, PuzzleError> {
    let normal = find_normal(grid, seed, KEY_REMOVAL).ok_or(PuzzleError::NoExposedFace(seed))?;
    let pairs = find_blocking_pairs(grid, scores, seed, normal, &config.blocking);
    let selection = filter_key(grid, scores, seed, &pairs, normal, KEY_REMOVAL)
        .ok_or(PuzzleError::NoBlockingCandidates(seed))?;

    let KeySelection {
        pair,
        path,
        mut anchors,
        ..
    } = selection;
    anchors.push(final_anchor(grid, seed, &pair, normal));
    log::debug!(
        "key seed {seed}: blocked along {normal} by {}, {} anchors",
        pair.blocker,
        anchors.len()
    );

    Ok(grow_verified(
        grid,
        scores,
        &path,
        &anchors,
        target,
        KEY_REMOVAL,
        config,
        rng,
        |_| true,
    ))
}

/// Build and commit the key.
fn build_key(
    grid: &mut VoxelGrid,
    target: usize,
    config: &PuzzleConfig,
    rng: &mut impl RandomSource,
) -> Result<PieceRecord, PuzzleError> {
    let scores = score_grid(grid, &config.accessibility, PieceId::UNASSIGNED);
    let seeds = find_seeds(grid);
    if seeds.is_empty() {
        return Err(PuzzleError::NoSeeds);
    }
    let min_size = min_piece_size(config, target);

    for attempt in 1..=config.max_key_attempts {
        let seed = seeds[rng.index(seeds.len())];
        match try_key(grid, &scores, seed, target, config, rng) {
            Ok(key) if key.len() >= min_size && verify_piece(grid, &key) => {
                grid.relabel(&key, PieceId::KEY);
                log::info!("key: {} cells from seed {seed} (attempt {attempt})", key.len());
                if config.verbose {
                    log::trace!("key cells: {key:?}");
                }
                return Ok(PieceRecord {
                    id: PieceId::KEY,
                    removal: KEY_REMOVAL,
                    voxels: key,
                });
            }
            Ok(key) => {
                log::debug!(
                    "key attempt {attempt} from {seed}: {} cells, need {min_size}",
                    key.len()
                );
            }
            Err(err) => log::debug!("key attempt {attempt}: {err}"),
        }
    }
    Err(PuzzleError::KeyConstructionFailed {
        attempts: config.max_key_attempts,
    })
}

/// Build and commit piece `id` next to `prev`. `None` when every candidate
/// seed has been tried.
fn build_next_piece(
    grid: &mut VoxelGrid,
    prev: &PieceRecord,
    id: PieceId,
    target: usize,
    config: &PuzzleConfig,
    rng: &mut impl RandomSource,
) -> Option<PieceRecord> {
    let scores = score_grid(grid, &config.accessibility, PieceId::UNASSIGNED);
    let mut candidates = find_candidate_seeds(
        grid,
        &scores,
        &prev.voxels,
        prev.removal,
        config.candidate_seed_limit,
    );
    let min_size = min_piece_size(config, target);
    let previous = PreviousPiece {
        voxels: &prev.voxels,
        id: prev.id,
        normal: prev.removal,
    };

    while !candidates.is_empty() {
        let Some(initial) = create_initial_piece(grid, &scores, &prev.voxels, &candidates) else {
            log::info!("piece {id}: no candidate seed yields a starting piece");
            return None;
        };
        let seed = candidates.remove(initial.index);

        let Some(locked) = ensure_interlocking(grid, &scores, &previous, &initial.voxels, &config.blocking)
        else {
            log::debug!("piece {id}: seed {seed} could not be interlocked");
            continue;
        };
        let joined = ensure_piece_connectivity(grid, &locked.piece, locked.normal);
        let held = |cells: &[Voxel]| is_interlocked(grid, cells, &previous, locked.normal);
        if !held(&joined) {
            log::debug!("piece {id}: seed {seed} is loose after repair; dropping it");
            continue;
        }
        // Growth may swallow the cells that held the piece, so every
        // expansion is checked again before it is accepted.
        let piece = grow_verified(
            grid,
            &scores,
            &joined,
            &locked.anchors,
            target,
            locked.normal,
            config,
            rng,
            held,
        );

        if piece.len() >= min_size && verify_piece(grid, &piece) {
            grid.relabel(&piece, id);
            log::info!(
                "piece {id}: {} cells from seed {seed}, removal {}",
                piece.len(),
                locked.normal
            );
            if config.verbose {
                log::trace!("piece {id} cells: {piece:?}");
            }
            return Some(PieceRecord {
                id,
                removal: locked.normal,
                voxels: piece,
            });
        }
        log::debug!(
            "piece {id}: seed {seed} gave {} cells, need {min_size}; dropping it",
            piece.len()
        );
    }
    log::info!("piece {id}: candidate seeds exhausted");
    None
}

/// How a split piece comes apart: which half leaves first, and the
/// direction each half slides along.
#[derive(Clone, Copy, Debug, PartialEq)]
struct SplitOrder {
    part_first: bool,
    parent_removal: Direction,
    part_removal: Direction,
}

/// `preferred` first, then the rest of `Direction::ALL`.
fn directions_from(preferred: Direction) -> impl Iterator<Item = Direction> {
    std::iter::once(preferred).chain(Direction::ALL.into_iter().filter(move |&d| d != preferred))
}

/// First direction along which `piece` slides out past everything still in
/// place. `gone` lists the labels already removed.
fn exit_direction(
    grid: &VoxelGrid,
    piece: &[Voxel],
    preferred: Direction,
    gone: &[PieceId],
) -> Option<Direction> {
    directions_from(preferred).find(|&d| can_slide(grid, piece, d, |label| !gone.contains(&label)))
}

/// Find an order in which the two halves of a split piece can both be taken
/// out, given the pieces in `removed` are already gone. Parent first is
/// tried before part first; each half prefers the original removal
/// direction.
fn split_order(
    grid: &VoxelGrid,
    parent: &PieceRecord,
    part: &[Voxel],
    part_id: PieceId,
    removed: &[PieceId],
) -> Option<SplitOrder> {
    let mut gone = removed.to_vec();

    if let Some(parent_removal) = exit_direction(grid, &parent.voxels, parent.removal, &gone) {
        gone.push(parent.id);
        if let Some(part_removal) = exit_direction(grid, part, parent.removal, &gone) {
            return Some(SplitOrder {
                part_first: false,
                parent_removal,
                part_removal,
            });
        }
        gone.pop();
    }

    let part_removal = exit_direction(grid, part, parent.removal, &gone)?;
    gone.push(part_id);
    let parent_removal = exit_direction(grid, &parent.voxels, parent.removal, &gone)?;
    Some(SplitOrder {
        part_first: true,
        parent_removal,
        part_removal,
    })
}

/// Cut each built piece in two and place the carved part next to its parent
/// in an order that comes apart. A cut with no workable order is undone and
/// retried with half the part size; if none works the piece stays whole.
fn split_pieces(
    grid: &mut VoxelGrid,
    pieces: &mut Vec<PieceRecord>,
    target: usize,
    config: &PuzzleConfig,
) {
    for p in 3..config.piece_count {
        let id = PieceId(p);
        let Some(index) = pieces.iter().position(|r| r.id == id) else {
            continue;
        };
        let part_id = PieceId(config.piece_count + p - 1);
        let removed: Vec<PieceId> = pieces[..index].iter().map(|r| r.id).collect();
        let members = grid.members(id);
        let scores = score_grid(grid, &config.accessibility, id);

        let mut size = target;
        let mut placed = false;
        while size > 0 && !placed {
            let part = partition_piece(grid, &scores, &members, id, size);
            if part.is_empty() {
                break;
            }
            grid.relabel(&part, part_id);
            let parent = PieceRecord {
                id,
                removal: pieces[index].removal,
                voxels: grid.members(id),
            };

            match split_order(grid, &parent, &part, part_id, &removed) {
                Some(order) => {
                    log::info!(
                        "piece {id}: split off {} cells as {part_id} ({} leaves first)",
                        part.len(),
                        if order.part_first { part_id } else { id }
                    );
                    let part_record = PieceRecord {
                        id: part_id,
                        removal: order.part_removal,
                        voxels: part,
                    };
                    pieces[index] = PieceRecord {
                        removal: order.parent_removal,
                        ..parent
                    };
                    let at = if order.part_first { index } else { index + 1 };
                    pieces.insert(at, part_record);
                    placed = true;
                }
                None => {
                    log::debug!("piece {id}: {} cell split does not come apart", part.len());
                    grid.relabel(&part, id);
                    size /= 2;
                }
            }
        }
        if !placed {
            log::warn!("piece {id} could not be split");
        }
    }
}

/// Decompose every unassigned cell of `grid` into interlocking pieces.
///
/// On success the grid carries the final labels: 2 for the key, then one id
/// per piece, with leftover cells still unassigned. A run that runs out of
/// candidate seeds stops early and reports the pieces it made; only a shape
/// with no usable key is an error.
pub fn generate_puzzle(
    grid: &mut VoxelGrid,
    config: &PuzzleConfig,
    rng: &mut impl RandomSource,
) -> Result<PuzzleLayout, PuzzleError> {
    let solid = grid.count(PieceId::UNASSIGNED);
    if solid == 0 {
        return Err(PuzzleError::EmptyShape);
    }
    if config.piece_count < 2 {
        return Err(PuzzleError::InvalidPieceCount(config.piece_count));
    }

    let target = solid / config.piece_count as usize;
    log::info!(
        "{solid} solid cells, {} pieces, {target} cells per piece",
        config.piece_count
    );

    let key = build_key(grid, target, config, rng)?;
    let mut pieces = vec![key];

    let (iterations, piece_target) = if config.split_pieces {
        ((config.piece_count - 2) / 2, target * 2)
    } else {
        (config.piece_count - 2, target)
    };

    for i in 0..iterations {
        let id = PieceId(i + 3);
        let Some(prev) = pieces.last() else {
            break;
        };
        match build_next_piece(grid, prev, id, piece_target, config, rng) {
            Some(record) => pieces.push(record),
            None => {
                log::warn!("stopping after {} pieces", pieces.len());
                break;
            }
        }
    }

    if config.split_pieces {
        split_pieces(grid, &mut pieces, piece_target / 2, config);
    }

    Ok(PuzzleLayout {
        grid_size: [grid.size_x, grid.size_y, grid.size_z],
        pieces,
        remaining: grid.members(PieceId::UNASSIGNED),
    })
}
