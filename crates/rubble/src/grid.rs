//! The tile grid: storage, passability, and projectile damage.
//!
//! # Architecture
//!
//! Tiles are stored row-major in a flat `Vec`. Every query accepts signed
//! coordinates and treats anything outside the grid as solid, so callers never
//! need to bounds-check before asking.
//!
//! Destructible tiles are split into four quadrants of `cell_size / 2` pixels.
//! Point queries look at the quadrant under the point; rectangle queries for
//! tanks combine a whole-tile test for water and the base with a corner test
//! against brick and steel quadrants.
//!
//! # Example
//!
//! ```
//! use glam::IVec2;
//! use rubble::{Rect, Tile, TileCoord, TileGrid, TileKind};
//!
//! let mut grid = TileGrid::new(3, 3, 40).unwrap();
//! grid.set(TileCoord::new(1, 0), Tile::new(TileKind::Water));
//!
//! assert!(!grid.is_passable(TileCoord::new(1, 0)));
//! assert!(grid.blocks_rect(Rect::new(20, 0, 40, 40)));
//! assert!(!grid.blocks_rect(Rect::new(0, 40, 40, 40)));
//! ```

use glam::{IVec2, Vec2};
use serde::{Deserialize, Serialize};
use thiserror::Error;
use tracing::trace;

use crate::geom::{Rect, TileCoord};
use crate::tile::{Sections, Tile, TileKind};

/// Pixels either side of a quadrant seam within which brick damage spreads to
/// the neighbouring quadrant.
pub const DEFAULT_BORDER_BLEED: i32 = 3;

/// Errors raised when building a grid.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum GridError {
    /// Column or row count was zero or negative.
    #[error("grid dimensions must be positive, got {cols}x{rows}")]
    InvalidDimensions {
        /// Requested columns.
        cols: i32,
        /// Requested rows.
        rows: i32,
    },
    /// Cell size too small to split into quadrants.
    #[error("cell size must be an even number of at least 2 pixels, got {0}")]
    InvalidCellSize(i32),
}

// =============================================================================
// TileGrid
// =============================================================================

/// Fixed-size grid of tiles.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct TileGrid {
    cols: i32,
    rows: i32,
    cell_size: i32,
    border_bleed: i32,
    tiles: Vec<Tile>,
}

impl Default for TileGrid {
    /// A 16×16 grid of empty 40-pixel cells.
    fn default() -> Self {
        Self {
            cols: 16,
            rows: 16,
            cell_size: 40,
            border_bleed: DEFAULT_BORDER_BLEED,
            tiles: vec![Tile::EMPTY; 16 * 16],
        }
    }
}

impl TileGrid {
    /// Creates a grid of empty tiles.
    ///
    /// # Errors
    ///
    /// Returns [`GridError`] if a dimension is not positive or the cell size
    /// cannot be halved into quadrants.
    pub fn new(cols: i32, rows: i32, cell_size: i32) -> Result<Self, GridError> {
        if cols <= 0 || rows <= 0 {
            return Err(GridError::InvalidDimensions { cols, rows });
        }
        if cell_size < 2 || cell_size % 2 != 0 {
            return Err(GridError::InvalidCellSize(cell_size));
        }
        #[allow(clippy::cast_sign_loss)]
        let len = (cols * rows) as usize;
        Ok(Self {
            cols,
            rows,
            cell_size,
            border_bleed: DEFAULT_BORDER_BLEED,
            tiles: vec![Tile::EMPTY; len],
        })
    }

    /// Sets the seam bleed distance used by [`apply_damage`](Self::apply_damage).
    #[must_use]
    pub fn with_border_bleed(mut self, pixels: i32) -> Self {
        self.border_bleed = pixels.max(0);
        self
    }

    /// Number of columns.
    #[must_use]
    pub const fn cols(&self) -> i32 {
        self.cols
    }

    /// Number of rows.
    #[must_use]
    pub const fn rows(&self) -> i32 {
        self.rows
    }

    /// Side length of one cell in pixels.
    #[must_use]
    pub const fn cell_size(&self) -> i32 {
        self.cell_size
    }

    /// World size in pixels.
    #[must_use]
    pub const fn pixel_size(&self) -> IVec2 {
        IVec2::new(self.cols * self.cell_size, self.rows * self.cell_size)
    }

    /// World rectangle in pixels.
    #[must_use]
    pub const fn pixel_bounds(&self) -> Rect {
        let size = self.pixel_size();
        Rect::new(0, 0, size.x, size.y)
    }

    /// Returns true if `coord` addresses a cell of this grid.
    #[must_use]
    pub const fn in_bounds(&self, coord: TileCoord) -> bool {
        coord.col >= 0 && coord.row >= 0 && coord.col < self.cols && coord.row < self.rows
    }

    #[allow(clippy::cast_sign_loss)]
    fn index(&self, coord: TileCoord) -> Option<usize> {
        self.in_bounds(coord)
            .then(|| (coord.row * self.cols + coord.col) as usize)
    }

    /// Returns the tile at `coord`.
    #[must_use]
    pub fn get(&self, coord: TileCoord) -> Option<&Tile> {
        self.index(coord).map(|i| &self.tiles[i])
    }

    /// Returns the tile kind at `coord`, or `None` outside the grid.
    #[must_use]
    pub fn kind(&self, coord: TileCoord) -> Option<TileKind> {
        self.get(coord).map(Tile::kind)
    }

    /// Replaces the tile at `coord`. Returns false outside the grid.
    pub fn set(&mut self, coord: TileCoord, tile: Tile) -> bool {
        match self.index(coord) {
            Some(i) => {
                self.tiles[i] = tile;
                true
            }
            None => false,
        }
    }

    /// Iterates over every cell in row-major order.
    pub fn iter(&self) -> impl Iterator<Item = (TileCoord, &Tile)> + '_ {
        let cols = self.cols;
        self.tiles.iter().enumerate().map(move |(i, tile)| {
            #[allow(clippy::cast_possible_truncation, clippy::cast_possible_wrap)]
            let i = i as i32;
            (TileCoord::new(i % cols, i / cols), tile)
        })
    }

    /// Cell containing pixel `(px, py)`. May be out of range.
    #[must_use]
    pub const fn cell_of(&self, px: i32, py: i32) -> TileCoord {
        TileCoord::new(px.div_euclid(self.cell_size), py.div_euclid(self.cell_size))
    }

    /// Top-left pixel of a cell.
    #[must_use]
    pub const fn cell_origin(&self, coord: TileCoord) -> IVec2 {
        IVec2::new(coord.col * self.cell_size, coord.row * self.cell_size)
    }

    /// Pixel rectangle covered by a cell.
    #[must_use]
    pub const fn tile_rect(&self, coord: TileCoord) -> Rect {
        let origin = self.cell_origin(coord);
        Rect::new(origin.x, origin.y, self.cell_size, self.cell_size)
    }

    /// Pixel rectangle of one quadrant of a cell.
    #[must_use]
    pub fn section_rect(&self, coord: TileCoord, section: Sections) -> Rect {
        let half = self.cell_size / 2;
        let origin = self.cell_origin(coord);
        let right = section.intersects(Sections::TOP_RIGHT | Sections::BOTTOM_RIGHT);
        let bottom = section.intersects(Sections::BOTTOM_LEFT | Sections::BOTTOM_RIGHT);
        Rect::new(
            origin.x + if right { half } else { 0 },
            origin.y + if bottom { half } else { 0 },
            half,
            half,
        )
    }

    /// Quadrant of `coord` containing pixel `point`.
    #[must_use]
    pub fn section_at(&self, coord: TileCoord, point: IVec2) -> Sections {
        let local = point - self.cell_origin(coord);
        let half = self.cell_size / 2;
        Sections::quadrant(local.x >= half, local.y >= half)
    }

    /// Cells overlapped by `rect`, clipped to the grid.
    pub fn cells_in_rect(&self, rect: Rect) -> impl Iterator<Item = TileCoord> {
        let first = self.cell_of(rect.x(), rect.y());
        let last = self.cell_of(rect.right() - 1, rect.bottom() - 1);
        let (c0, c1) = (first.col.max(0), last.col.min(self.cols - 1));
        let (r0, r1) = (first.row.max(0), last.row.min(self.rows - 1));
        (r0..=r1).flat_map(move |row| (c0..=c1).map(move |col| TileCoord::new(col, row)))
    }

    // =========================================================================
    // Passability
    // =========================================================================

    /// Whole-cell tank passability. Out-of-range cells are impassable.
    #[must_use]
    pub fn is_passable(&self, coord: TileCoord) -> bool {
        self.kind(coord).is_some_and(|kind| !kind.blocks_tanks())
    }

    /// Pixel-level tank passability, aware of destroyed quadrants.
    #[must_use]
    pub fn is_passable_at(&self, px: i32, py: i32) -> bool {
        let coord = self.cell_of(px, py);
        let Some(tile) = self.get(coord) else {
            return false;
        };
        match tile.kind() {
            TileKind::Brick | TileKind::Steel => {
                !tile.is_intact(self.section_at(coord, IVec2::new(px, py)))
            }
            TileKind::Water | TileKind::Base => false,
            TileKind::Empty | TileKind::Trees | TileKind::Ice => true,
        }
    }

    /// Returns true if a tank occupying `rect` would collide with terrain.
    ///
    /// Leaving the world, touching water or the base anywhere, or putting a
    /// corner pixel on an intact brick or steel quadrant all block.
    #[must_use]
    pub fn blocks_rect(&self, rect: Rect) -> bool {
        if !self.pixel_bounds().contains_rect(&rect) {
            return true;
        }
        let whole_tile_block = self
            .cells_in_rect(rect)
            .any(|c| matches!(self.kind(c), Some(TileKind::Water | TileKind::Base)));
        whole_tile_block || rect.corners().iter().any(|p| !self.is_passable_at(p.x, p.y))
    }

    /// Returns true if any cell of `kind` overlaps `rect`.
    #[must_use]
    pub fn any_kind_in_rect(&self, rect: Rect, kind: TileKind) -> bool {
        self.cells_in_rect(rect)
            .any(|c| self.kind(c) == Some(kind) && self.tile_rect(c).intersects(&rect))
    }

    /// Axis-aligned line of sight between two pixels.
    ///
    /// Returns false for diagonal segments and whenever a brick, steel or
    /// water cell lies on the segment. Trees and the base never block.
    #[must_use]
    pub fn line_of_sight(&self, from: IVec2, to: IVec2) -> bool {
        if from.x != to.x && from.y != to.y {
            return false;
        }
        let a = self.cell_of(from.x, from.y);
        let b = self.cell_of(to.x, to.y);
        let (c0, c1) = (a.col.min(b.col), a.col.max(b.col));
        let (r0, r1) = (a.row.min(b.row), a.row.max(b.row));
        for row in r0..=r1 {
            for col in c0..=c1 {
                if self
                    .kind(TileCoord::new(col, row))
                    .is_some_and(TileKind::blocks_sight)
                {
                    return false;
                }
            }
        }
        true
    }

    /// Sampled tank passability along an arbitrary segment.
    ///
    /// Points are tested every `step` pixels (at least 1) plus both endpoints.
    #[must_use]
    pub fn segment_clear(&self, from: IVec2, to: IVec2, step: i32) -> bool {
        let a = from.as_vec2();
        let b = to.as_vec2();
        let length = a.distance(b);
        #[allow(clippy::cast_precision_loss)]
        let step = step.max(1) as f32;
        #[allow(clippy::cast_possible_truncation, clippy::cast_sign_loss)]
        let samples = (length / step).ceil() as u32;
        (0..=samples).all(|i| {
            #[allow(clippy::cast_precision_loss)]
            let t = if samples == 0 { 0.0 } else { i as f32 / samples as f32 };
            let p: Vec2 = a.lerp(b, t);
            #[allow(clippy::cast_possible_truncation)]
            let (px, py) = (p.x.round() as i32, p.y.round() as i32);
            self.is_passable_at(px, py)
        })
    }

    // =========================================================================
    // Damage
    // =========================================================================

    /// Applies one projectile impact at pixel `impact` to the tile at `coord`.
    ///
    /// Returns true only when this call removed the last section and turned
    /// the tile into [`TileKind::Empty`].
    ///
    /// - Brick loses the quadrant under `impact` at any power. When the
    ///   impact is within the border bleed of a seam, the quadrant across that
    ///   seam goes too.
    /// - Steel loses exactly the quadrant under `impact`, and only at
    ///   power 3 or more.
    /// - Every other kind ignores the hit, as does an already-destroyed
    ///   quadrant.
    pub fn apply_damage(&mut self, coord: TileCoord, impact: IVec2, power: u8) -> bool {
        let Some(i) = self.index(coord) else {
            return false;
        };
        let hit = self.section_at(coord, impact);
        let local = impact - self.cell_origin(coord);
        let half = self.cell_size / 2;
        let bleed = self.border_bleed;

        let tile = &mut self.tiles[i];
        if !tile.is_intact(hit) {
            return false;
        }
        let lost = match tile.kind() {
            TileKind::Brick => {
                let mut lost = hit;
                if (local.x - half).abs() <= bleed {
                    lost |= hit.across_vertical_seam();
                }
                if (local.y - half).abs() <= bleed {
                    lost |= hit.across_horizontal_seam();
                }
                lost
            }
            TileKind::Steel if power >= 3 => hit,
            _ => return false,
        };

        tile.remove_sections(lost);
        if tile.sections().is_empty() {
            trace!(%coord, kind = ?tile.kind(), "tile destroyed");
            *tile = Tile::EMPTY;
            true
        } else {
            false
        }
    }
}
