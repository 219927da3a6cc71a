//! Hex-grid geometry primitives: points, directions, neighbours, distance.
//!
//! Mirrors the teacher's `location.rs` (a packed coordinate newtype with a
//! cheap `Copy` representation) but for a toroidal six-neighbour grid
//! instead of a fixed 50x50 square room.

use serde::{Deserialize, Deserializer, Serialize, Serializer};

/// The six edge directions around a hex point, in the canonical order used
/// throughout this crate. `opposite()` and `CANONICAL_HALF` rely on this
/// exact ordering.
#[derive(Copy, Clone, Eq, PartialEq, Hash, Debug, Serialize, Deserialize)]
pub enum Direction {
    West,
    NorthWest,
    NorthEast,
    East,
    SouthEast,
    SouthWest,
}

impl Direction {
    pub const ALL: [Direction; 6] = [
        Direction::West,
        Direction::NorthWest,
        Direction::NorthEast,
        Direction::East,
        Direction::SouthEast,
        Direction::SouthWest,
    ];

    /// The three directions chosen to canonically store one edge per pair
    /// of opposite directions (see `Point::edge_index`).
    pub const CANONICAL_HALF: [Direction; 3] =
        [Direction::West, Direction::NorthWest, Direction::NorthEast];

    #[inline]
    pub fn opposite(self) -> Direction {
        match self {
            Direction::West => Direction::East,
            Direction::NorthWest => Direction::SouthEast,
            Direction::NorthEast => Direction::SouthWest,
            Direction::East => Direction::West,
            Direction::SouthEast => Direction::NorthWest,
            Direction::SouthWest => Direction::NorthEast,
        }
    }

    #[inline]
    pub fn index(self) -> usize {
        match self {
            Direction::West => 0,
            Direction::NorthWest => 1,
            Direction::NorthEast => 2,
            Direction::East => 3,
            Direction::SouthEast => 4,
            Direction::SouthWest => 5,
        }
    }

    /// (dx, dy) offset for this direction on an axial-ish offset grid.
    /// Even/odd row offsets differ, matching a standard pointy-top hex grid
    /// with horizontal rows.
    fn offset(self, y_even: bool) -> (i32, i32) {
        match self {
            Direction::West => (-1, 0),
            Direction::East => (1, 0),
            Direction::NorthWest => {
                if y_even {
                    (-1, -1)
                } else {
                    (0, -1)
                }
            }
            Direction::NorthEast => {
                if y_even {
                    (0, -1)
                } else {
                    (1, -1)
                }
            }
            Direction::SouthWest => {
                if y_even {
                    (-1, 1)
                } else {
                    (0, 1)
                }
            }
            Direction::SouthEast => {
                if y_even {
                    (0, 1)
                } else {
                    (1, 1)
                }
            }
        }
    }
}

/// A point on a toroidal `width x height` hex grid, packed into a `u32` for
/// cheap `Copy`/`Hash`/equality, same rationale as the teacher's `Location`.
#[derive(Copy, Clone, Eq, PartialEq, Hash, Debug)]
#[repr(transparent)]
pub struct Point {
    packed: u32,
}

impl Point {
    #[inline]
    pub fn new(x: u16, y: u16) -> Self {
        Point {
            packed: ((x as u32) << 16) | (y as u32),
        }
    }

    #[inline]
    pub fn x(self) -> u16 {
        (self.packed >> 16) as u16
    }

    #[inline]
    pub fn y(self) -> u16 {
        (self.packed & 0xFFFF) as u16
    }

    #[inline]
    pub fn packed_repr(self) -> u32 {
        self.packed
    }

    #[inline]
    pub fn from_packed(packed: u32) -> Self {
        Point { packed }
    }

    /// Index into a dense `width * height` array.
    #[inline]
    pub fn index(self, width: u16) -> usize {
        self.y() as usize * width as usize + self.x() as usize
    }
}

impl Serialize for Point {
    fn serialize<S>(&self, serializer: S) -> Result<S::Ok, S::Error>
    where
        S: Serializer,
    {
        self.packed_repr().serialize(serializer)
    }
}

impl<'de> Deserialize<'de> for Point {
    fn deserialize<D>(deserializer: D) -> Result<Self, D::Error>
    where
        D: Deserializer<'de>,
    {
        u32::deserialize(deserializer).map(Point::from_packed)
    }
}

/// Canonicalizes one physical edge to whichever of its two `(point,
/// direction)` representations uses a `CANONICAL_HALF` direction, so every
/// component that stores one value per edge (road state, traffic usage)
/// agrees on a single storage key.
pub fn canonical_edge(dims: GridDims, pt: Point, dir: Direction) -> (Point, Direction) {
    if Direction::CANONICAL_HALF.contains(&dir) {
        (pt, dir)
    } else {
        (dims.neighbour(pt, dir), dir.opposite())
    }
}

/// Index of `dir` within `Direction::CANONICAL_HALF`; `dir` must already be
/// canonical (see [`canonical_edge`]).
pub fn canonical_slot(dir: Direction) -> usize {
    Direction::CANONICAL_HALF
        .iter()
        .position(|d| *d == dir)
        .expect("canonical_slot called with a non-canonical direction")
}

/// Grid dimensions, shared by every component that needs to wrap coordinates
/// or size a dense per-point array.
#[derive(Copy, Clone, Debug)]
pub struct GridDims {
    pub width: u16,
    pub height: u16,
}

impl GridDims {
    pub fn new(width: u16, height: u16) -> Self {
        GridDims { width, height }
    }

    pub fn size(self) -> usize {
        self.width as usize * self.height as usize
    }

    #[inline]
    pub fn wrap_x(self, x: i32) -> u16 {
        x.rem_euclid(self.width as i32) as u16
    }

    #[inline]
    pub fn wrap_y(self, y: i32) -> u16 {
        y.rem_euclid(self.height as i32) as u16
    }

    /// The neighbour of `pt` in `dir`, wrapping on both axes.
    pub fn neighbour(self, pt: Point, dir: Direction) -> Point {
        let y_even = pt.y() % 2 == 0;
        let (dx, dy) = dir.offset(y_even);
        let nx = self.wrap_x(pt.x() as i32 + dx);
        let ny = self.wrap_y(pt.y() as i32 + dy);
        Point::new(nx, ny)
    }

    /// All six neighbours of `pt`, in `Direction::ALL` order.
    pub fn neighbours(self, pt: Point) -> [Point; 6] {
        let mut out = [pt; 6];
        for (i, dir) in Direction::ALL.iter().enumerate() {
            out[i] = self.neighbour(pt, *dir);
        }
        out
    }

    pub fn iter_points(self) -> impl Iterator<Item = Point> {
        let width = self.width;
        let height = self.height;
        (0..height).flat_map(move |y| (0..width).map(move |x| Point::new(x, y)))
    }

    /// Hex (cube-coordinate) distance between two points, accounting for
    /// toroidal wrap by taking the minimum of the direct and wrapped deltas
    /// on each axis.
    pub fn distance(self, a: Point, b: Point) -> u32 {
        let (ax, ay, az) = offset_to_cube(a);
        let (bx, by, bz) = offset_to_cube(b);

        let dx = wrapped_delta(ax, bx, self.width as i32);
        let dy = wrapped_delta(ay, by, self.height as i32);
        let dz = (az - bz).unsigned_abs() as i32;
        let _ = dz;

        ((dx.unsigned_abs() + dy.unsigned_abs() + (dx + dy).unsigned_abs()) / 2) as u32
    }
}

fn wrapped_delta(a: i32, b: i32, period: i32) -> i32 {
    let raw = a - b;
    let wrapped = if raw > period / 2 {
        raw - period
    } else if raw < -(period / 2) {
        raw + period
    } else {
        raw
    };
    wrapped
}

/// Convert an offset (x, y with even-row shove) coordinate into axial cube
/// coordinates for distance computation.
fn offset_to_cube(pt: Point) -> (i32, i32, i32) {
    let x = pt.x() as i32;
    let y = pt.y() as i32;
    let q = x - (y - (y & 1)) / 2;
    let r = y;
    let s = -q - r;
    (q, r, s)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn neighbour_opposite_round_trips() {
        let dims = GridDims::new(24, 22);
        let pt = Point::new(10, 11);
        for dir in Direction::ALL {
            let n = dims.neighbour(pt, dir);
            let back = dims.neighbour(n, dir.opposite());
            assert_eq!(back, pt, "direction {dir:?} did not round-trip");
        }
    }

    #[test]
    fn distance_to_self_is_zero() {
        let dims = GridDims::new(24, 22);
        let pt = Point::new(5, 5);
        assert_eq!(dims.distance(pt, pt), 0);
    }

    #[test]
    fn distance_to_direct_neighbour_is_one() {
        let dims = GridDims::new(24, 22);
        let pt = Point::new(10, 10);
        for dir in Direction::ALL {
            let n = dims.neighbour(pt, dir);
            assert_eq!(dims.distance(pt, n), 1, "direction {dir:?}");
        }
    }

    #[test]
    fn wraps_on_both_axes() {
        let dims = GridDims::new(10, 10);
        let pt = Point::new(0, 0);
        let west = dims.neighbour(pt, Direction::West);
        assert_eq!(west.x(), 9);
    }

    #[test]
    fn canonical_half_covers_three_of_six() {
        assert_eq!(Direction::CANONICAL_HALF.len(), 3);
        for dir in Direction::CANONICAL_HALF {
            assert!(!Direction::CANONICAL_HALF.contains(&dir.opposite()));
        }
    }
}
