//! Integer pixel geometry shared by the grid and the simulation.

use std::fmt;

use glam::IVec2;
use serde::{Deserialize, Serialize};

// =============================================================================
// TileCoord
// =============================================================================

/// Column/row address of a grid cell.
///
/// Coordinates are signed so that neighbour arithmetic near the edges can
/// step outside the grid; [`TileGrid`](crate::TileGrid) treats such
/// coordinates as out of range.
#[derive(Debug, Copy, Clone, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
pub struct TileCoord {
    /// Column index (x axis).
    pub col: i32,
    /// Row index (y axis).
    pub row: i32,
}

impl TileCoord {
    /// Creates a coordinate from a column and row.
    #[must_use]
    pub const fn new(col: i32, row: i32) -> Self {
        Self { col, row }
    }

    /// Returns the coordinate shifted by `(dc, dr)` cells.
    #[must_use]
    pub const fn offset(self, dc: i32, dr: i32) -> Self {
        Self::new(self.col + dc, self.row + dr)
    }
}

impl fmt::Display for TileCoord {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "({}, {})", self.col, self.row)
    }
}

// =============================================================================
// Rect
// =============================================================================

/// Axis-aligned integer rectangle, `min` inclusive and `min + size` exclusive.
///
/// # Example
///
/// ```
/// use rubble::Rect;
///
/// let a = Rect::new(0, 0, 40, 40);
/// let b = Rect::new(40, 0, 40, 40);
/// // Touching edges do not count as an overlap.
/// assert!(!a.intersects(&b));
/// assert!(a.intersects(&Rect::new(39, 39, 2, 2)));
/// ```
#[derive(Debug, Copy, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct Rect {
    /// Top-left corner.
    pub min: IVec2,
    /// Width and height.
    pub size: IVec2,
}

impl Rect {
    /// Creates a rectangle from its top-left corner and dimensions.
    #[must_use]
    pub const fn new(x: i32, y: i32, width: i32, height: i32) -> Self {
        Self {
            min: IVec2::new(x, y),
            size: IVec2::new(width, height),
        }
    }

    /// Creates a square with the given top-left corner and side length.
    #[must_use]
    pub const fn square(min: IVec2, side: i32) -> Self {
        Self {
            min,
            size: IVec2::new(side, side),
        }
    }

    /// Creates a square of side `side` centred on `center`.
    #[must_use]
    pub const fn centered(center: IVec2, side: i32) -> Self {
        Self::new(center.x - side / 2, center.y - side / 2, side, side)
    }

    /// Left edge.
    #[must_use]
    pub const fn x(&self) -> i32 {
        self.min.x
    }

    /// Top edge.
    #[must_use]
    pub const fn y(&self) -> i32 {
        self.min.y
    }

    /// Width in pixels.
    #[must_use]
    pub const fn width(&self) -> i32 {
        self.size.x
    }

    /// Height in pixels.
    #[must_use]
    pub const fn height(&self) -> i32 {
        self.size.y
    }

    /// Exclusive right edge.
    #[must_use]
    pub const fn right(&self) -> i32 {
        self.min.x + self.size.x
    }

    /// Exclusive bottom edge.
    #[must_use]
    pub const fn bottom(&self) -> i32 {
        self.min.y + self.size.y
    }

    /// Centre pixel, rounded towards the top-left.
    #[must_use]
    pub const fn center(&self) -> IVec2 {
        IVec2::new(self.min.x + self.size.x / 2, self.min.y + self.size.y / 2)
    }

    /// Returns true when the interiors overlap. Shared edges do not count.
    #[must_use]
    pub const fn intersects(&self, other: &Rect) -> bool {
        self.size.x > 0
            && self.size.y > 0
            && other.size.x > 0
            && other.size.y > 0
            && self.min.x < other.right()
            && other.min.x < self.right()
            && self.min.y < other.bottom()
            && other.min.y < self.bottom()
    }

    /// Returns true when `point` lies inside the rectangle.
    #[must_use]
    pub const fn contains(&self, point: IVec2) -> bool {
        point.x >= self.min.x
            && point.x < self.right()
            && point.y >= self.min.y
            && point.y < self.bottom()
    }

    /// Returns true when `other` lies completely inside `self`.
    #[must_use]
    pub const fn contains_rect(&self, other: &Rect) -> bool {
        other.min.x >= self.min.x
            && other.min.y >= self.min.y
            && other.right() <= self.right()
            && other.bottom() <= self.bottom()
    }

    /// Returns the rectangle moved by `delta`.
    #[must_use]
    pub fn translated(&self, delta: IVec2) -> Self {
        Self {
            min: self.min + delta,
            size: self.size,
        }
    }

    /// The four inclusive corner pixels: top-left, top-right, bottom-left,
    /// bottom-right.
    #[must_use]
    pub const fn corners(&self) -> [IVec2; 4] {
        let x1 = self.right() - 1;
        let y1 = self.bottom() - 1;
        [
            IVec2::new(self.min.x, self.min.y),
            IVec2::new(x1, self.min.y),
            IVec2::new(self.min.x, y1),
            IVec2::new(x1, y1),
        ]
    }

    /// Clamps `point` into the rectangle's pixel area.
    #[must_use]
    pub fn clamp_point(&self, point: IVec2) -> IVec2 {
        point.clamp(self.min, self.min + self.size - IVec2::ONE)
    }
}
