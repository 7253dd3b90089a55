// Core types shared across the puzzle engine.
//
// `Voxel` is a lattice position (and, under `+`/`-`, a lattice vector).
// `Direction` is one of the six axis-aligned unit steps; it is kept distinct
// from `Voxel` so a removal axis can never be mistaken for a grid position.
// `PieceId` is the per-cell label stored in the `VoxelGrid`.
//
// All types derive `Serialize`/`Deserialize` so layouts can be written out by
// the CLI and configs round-trip through JSON.

use serde::{Deserialize, Serialize};
use std::fmt;
use std::ops::{Add, AddAssign, Neg, Sub};

// ---------------------------------------------------------------------------
// Spatial types
// ---------------------------------------------------------------------------

/// A cell position in the voxel grid. Z is "up" (seeds are found by looking
/// for cells with nothing above them in +z).
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub struct Voxel {
    pub x: i32,
    pub y: i32,
    pub z: i32,
}

impl Voxel {
    pub const fn new(x: i32, y: i32, z: i32) -> Self {
        Self { x, y, z }
    }

    /// The neighboring cell one step along `dir`.
    pub fn step(self, dir: Direction) -> Self {
        self + dir.offset()
    }

    /// Manhattan distance between two cells.
    pub fn manhattan_distance(self, other: Self) -> u32 {
        (self.x - other.x).unsigned_abs()
            + (self.y - other.y).unsigned_abs()
            + (self.z - other.z).unsigned_abs()
    }
}

impl Add for Voxel {
    type Output = Voxel;

    fn add(self, rhs: Voxel) -> Voxel {
        Voxel::new(self.x + rhs.x, self.y + rhs.y, self.z + rhs.z)
    }
}

impl Add<Direction> for Voxel {
    type Output = Voxel;

    fn add(self, rhs: Direction) -> Voxel {
        self.step(rhs)
    }
}

impl AddAssign<Direction> for Voxel {
    fn add_assign(&mut self, rhs: Direction) {
        *self = self.step(rhs);
    }
}

impl Sub for Voxel {
    type Output = Voxel;

    fn sub(self, rhs: Voxel) -> Voxel {
        Voxel::new(self.x - rhs.x, self.y - rhs.y, self.z - rhs.z)
    }
}

impl Neg for Voxel {
    type Output = Voxel;

    fn neg(self) -> Voxel {
        Voxel::new(-self.x, -self.y, -self.z)
    }
}

impl fmt::Display for Voxel {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "({}, {}, {})", self.x, self.y, self.z)
    }
}

/// One of the six axis-aligned unit directions. Used for removal normals,
/// blocking directions and ray walks; never a position.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub enum Direction {
    NegX,
    PosX,
    NegY,
    PosY,
    NegZ,
    PosZ,
}

impl Direction {
    /// All six directions in search order: -x, +x, -y, +y, -z, +z. Every
    /// "first matching direction" rule in the engine scans in this order.
    pub const ALL: [Direction; 6] = [
        Direction::NegX,
        Direction::PosX,
        Direction::NegY,
        Direction::PosY,
        Direction::NegZ,
        Direction::PosZ,
    ];

    /// The four directions in the horizontal (xy) plane.
    pub const HORIZONTAL: [Direction; 4] = [
        Direction::NegX,
        Direction::PosX,
        Direction::NegY,
        Direction::PosY,
    ];

    /// Unit lattice vector for this direction.
    pub const fn offset(self) -> Voxel {
        match self {
            Direction::NegX => Voxel::new(-1, 0, 0),
            Direction::PosX => Voxel::new(1, 0, 0),
            Direction::NegY => Voxel::new(0, -1, 0),
            Direction::PosY => Voxel::new(0, 1, 0),
            Direction::NegZ => Voxel::new(0, 0, -1),
            Direction::PosZ => Voxel::new(0, 0, 1),
        }
    }

    pub const fn opposite(self) -> Direction {
        match self {
            Direction::NegX => Direction::PosX,
            Direction::PosX => Direction::NegX,
            Direction::NegY => Direction::PosY,
            Direction::PosY => Direction::NegY,
            Direction::NegZ => Direction::PosZ,
            Direction::PosZ => Direction::NegZ,
        }
    }

    /// Axis index: 0 for x, 1 for y, 2 for z.
    pub const fn axis(self) -> usize {
        match self {
            Direction::NegX | Direction::PosX => 0,
            Direction::NegY | Direction::PosY => 1,
            Direction::NegZ | Direction::PosZ => 2,
        }
    }

    /// Inverse of `offset()`. `None` unless `v` is a unit axis vector.
    pub fn from_offset(v: Voxel) -> Option<Direction> {
        Direction::ALL.into_iter().find(|d| d.offset() == v)
    }
}

impl fmt::Display for Direction {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let s = match self {
            Direction::NegX => "-x",
            Direction::PosX => "+x",
            Direction::NegY => "-y",
            Direction::PosY => "+y",
            Direction::NegZ => "-z",
            Direction::PosZ => "+z",
        };
        f.write_str(s)
    }
}

// ---------------------------------------------------------------------------
// Cell labels
// ---------------------------------------------------------------------------

/// Label stored in each grid cell: 0 is void, 1 is solid but not yet part of
/// any piece, 2 and above name a committed piece.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(transparent)]
pub struct PieceId(pub u32);

impl PieceId {
    pub const EMPTY: PieceId = PieceId(0);
    pub const UNASSIGNED: PieceId = PieceId(1);
    /// The key is always the first piece committed.
    pub const KEY: PieceId = PieceId(2);

    pub const fn is_solid(self) -> bool {
        self.0 != 0
    }

    pub const fn is_piece(self) -> bool {
        self.0 >= 2
    }
}

impl fmt::Display for PieceId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "#{}", self.0)
    }
}
