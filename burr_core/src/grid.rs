// Dense 3D label grid and per-search visited sets.
//
// `VoxelGrid` stores one `PieceId` per cell in a flat `Vec` indexed by
// `x + y * size_x + z * size_x * size_y`. Out-of-bounds reads return
// `PieceId::EMPTY`; out-of-bounds writes are no-ops, so ray walks and
// neighbor lookups at the border need no special cases.
//
// The grid is the only mutation surface the engine touches: pieces are
// relabeled in place, the grid is never resized.
//
// `VisitedSet` is the scratch membership bitset every BFS allocates for the
// lifetime of a single call. It shares the grid's indexing, so membership
// tests are O(1) and nothing leaks between searches.
//
// See also: `accessibility.rs` for the score grid built over the same
// dimensions, `paths.rs` and `blocking.rs` for the searches that walk it.

use crate::error::PuzzleError;
use crate::types::{Direction, PieceId, Voxel};
use smallvec::SmallVec;

/// Up to six face neighbors, kept inline.
pub type Neighbors = SmallVec<[Voxel; 6]>;

/// Dense 3D grid of piece labels.
#[derive(Clone, Debug, Default, PartialEq, Eq)]
pub struct VoxelGrid {
    /// Flat storage: index = x + y * size_x + z * size_x * size_y.
    labels: Vec<PieceId>,
    pub size_x: u32,
    pub size_y: u32,
    pub size_z: u32,
}

impl VoxelGrid {
    /// A grid of the given size with every cell void.
    pub fn new(size_x: u32, size_y: u32, size_z: u32) -> Self {
        Self::filled(size_x, size_y, size_z, PieceId::EMPTY)
    }

    /// A fully solid box: every cell unassigned.
    pub fn solid_box(size_x: u32, size_y: u32, size_z: u32) -> Self {
        Self::filled(size_x, size_y, size_z, PieceId::UNASSIGNED)
    }

    fn filled(size_x: u32, size_y: u32, size_z: u32, label: PieceId) -> Self {
        let total = (size_x as usize) * (size_y as usize) * (size_z as usize);
        Self {
            labels: vec![label; total],
            size_x,
            size_y,
            size_z,
        }
    }

    /// Build a grid from flat labels in storage order (x fastest, then y,
    /// then z).
    pub fn from_labels(
        (size_x, size_y, size_z): (u32, u32, u32),
        labels: Vec<PieceId>,
    ) -> Result<Self, PuzzleError> {
        let expected = (size_x as usize) * (size_y as usize) * (size_z as usize);
        if labels.len() != expected {
            return Err(PuzzleError::LabelCountMismatch {
                expected,
                actual: labels.len(),
            });
        }
        Ok(Self {
            labels,
            size_x,
            size_y,
            size_z,
        })
    }

    pub fn dimensions(&self) -> (u32, u32, u32) {
        (self.size_x, self.size_y, self.size_z)
    }

    /// Labels in storage order.
    pub fn labels(&self) -> &[PieceId] {
        &self.labels
    }

    pub fn cell_count(&self) -> usize {
        self.labels.len()
    }

    pub fn in_bounds(&self, v: Voxel) -> bool {
        v.x >= 0
            && v.y >= 0
            && v.z >= 0
            && (v.x as u32) < self.size_x
            && (v.y as u32) < self.size_y
            && (v.z as u32) < self.size_z
    }

    /// True when the cell lies on any face of the grid box.
    pub fn is_boundary(&self, v: Voxel) -> bool {
        v.x <= 0
            || v.y <= 0
            || v.z <= 0
            || v.x as i64 >= self.size_x as i64 - 1
            || v.y as i64 >= self.size_y as i64 - 1
            || v.z as i64 >= self.size_z as i64 - 1
    }

    fn index(&self, v: Voxel) -> Option<usize> {
        if self.in_bounds(v) {
            let sx = self.size_x as usize;
            let sy = self.size_y as usize;
            Some(v.x as usize + v.y as usize * sx + v.z as usize * sx * sy)
        } else {
            None
        }
    }

    fn voxel_at(&self, index: usize) -> Voxel {
        let sx = self.size_x as usize;
        let sy = self.size_y as usize;
        Voxel::new(
            (index % sx) as i32,
            ((index / sx) % sy) as i32,
            (index / (sx * sy)) as i32,
        )
    }

    /// Read a label. Void for out-of-bounds cells.
    pub fn get(&self, v: Voxel) -> PieceId {
        self.index(v)
            .map(|i| self.labels[i])
            .unwrap_or(PieceId::EMPTY)
    }

    /// Write a label. No-op for out-of-bounds cells.
    pub fn set(&mut self, v: Voxel, id: PieceId) {
        if let Some(i) = self.index(v) {
            self.labels[i] = id;
        }
    }

    /// Write the same label into every listed cell.
    pub fn relabel(&mut self, voxels: &[Voxel], id: PieceId) {
        for &v in voxels {
            self.set(v, id);
        }
    }

    /// Face neighbors of `v` that are in bounds and carry `id`, in
    /// `Direction::ALL` order. Never includes `v` itself.
    pub fn neighbors(&self, v: Voxel, id: PieceId) -> Neighbors {
        Direction::ALL
            .iter()
            .map(|&d| v.step(d))
            .filter(|&n| self.in_bounds(n) && self.get(n) == id)
            .collect()
    }

    /// Number of cells carrying `id`.
    pub fn count(&self, id: PieceId) -> usize {
        self.labels.iter().filter(|&&l| l == id).count()
    }

    /// Every cell carrying `id`, in storage order.
    pub fn members(&self, id: PieceId) -> Vec<Voxel> {
        self.iter()
            .filter(|&(_, l)| l == id)
            .map(|(v, _)| v)
            .collect()
    }

    /// All solid (non-void) cells.
    pub fn solid_count(&self) -> usize {
        self.labels.iter().filter(|l| l.is_solid()).count()
    }

    /// `(cell, label)` pairs in storage order.
    pub fn iter(&self) -> impl Iterator<Item = (Voxel, PieceId)> + '_ {
        self.labels
            .iter()
            .enumerate()
            .map(|(i, &l)| (self.voxel_at(i), l))
    }

    /// Cells strictly beyond `from` along `dir`, up to the grid edge.
    pub fn ray(&self, from: Voxel, dir: Direction) -> Ray<'_> {
        Ray {
            grid: self,
            current: from,
            dir,
        }
    }
}

/// Iterator over the in-bounds cells along a direction. See `VoxelGrid::ray`.
pub struct Ray<'a> {
    grid: &'a VoxelGrid,
    current: Voxel,
    dir: Direction,
}

impl Iterator for Ray<'_> {
    type Item = Voxel;

    fn next(&mut self) -> Option<Voxel> {
        let next = self.current.step(self.dir);
        if self.grid.in_bounds(next) {
            self.current = next;
            Some(next)
        } else {
            None
        }
    }
}

// ---------------------------------------------------------------------------
// Visited sets
// ---------------------------------------------------------------------------

/// Grid-sized membership bitset, one per search call.
#[derive(Clone, Debug)]
pub struct VisitedSet {
    bits: Vec<u64>,
    size_x: u32,
    size_y: u32,
    size_z: u32,
}

impl VisitedSet {
    /// An empty set covering every cell of `grid`.
    pub fn for_grid(grid: &VoxelGrid) -> Self {
        let words = grid.cell_count().div_ceil(64);
        Self {
            bits: vec![0; words],
            size_x: grid.size_x,
            size_y: grid.size_y,
            size_z: grid.size_z,
        }
    }

    /// A set pre-filled with `voxels`.
    pub fn from_voxels(grid: &VoxelGrid, voxels: &[Voxel]) -> Self {
        let mut set = Self::for_grid(grid);
        for &v in voxels {
            set.insert(v);
        }
        set
    }

    fn index(&self, v: Voxel) -> Option<usize> {
        if v.x < 0
            || v.y < 0
            || v.z < 0
            || v.x as u32 >= self.size_x
            || v.y as u32 >= self.size_y
            || v.z as u32 >= self.size_z
        {
            return None;
        }
        let sx = self.size_x as usize;
        let sy = self.size_y as usize;
        Some(v.x as usize + v.y as usize * sx + v.z as usize * sx * sy)
    }

    /// Membership test. Out-of-bounds cells are never members.
    pub fn contains(&self, v: Voxel) -> bool {
        match self.index(v) {
            Some(i) => self.bits[i / 64] & (1u64 << (i % 64)) != 0,
            None => false,
        }
    }

    /// Add `v`. Returns `true` if it was not already present. Out-of-bounds
    /// cells are ignored and return `false`.
    pub fn insert(&mut self, v: Voxel) -> bool {
        match self.index(v) {
            Some(i) => {
                let mask = 1u64 << (i % 64);
                let word = &mut self.bits[i / 64];
                let fresh = *word & mask == 0;
                *word |= mask;
                fresh
            }
            None => false,
        }
    }

    pub fn remove(&mut self, v: Voxel) {
        if let Some(i) = self.index(v) {
            self.bits[i / 64] &= !(1u64 << (i % 64));
        }
    }

    /// Mark `start` and every cell from it along `dir` to the grid edge.
    /// This is the "shadow column" an anchor casts.
    pub fn insert_column(&mut self, start: Voxel, dir: Direction) {
        let mut cur = start;
        while self.index(cur).is_some() {
            self.insert(cur);
            cur = cur.step(dir);
        }
    }
}
