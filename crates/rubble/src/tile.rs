//! Tile kinds and destructible section state.

use bitflags::bitflags;
use serde::{Deserialize, Serialize};

/// Terrain type of a grid cell.
///
/// The kind is fixed at placement; only [`Sections`] change afterwards. A
/// destructible tile that loses its last section is replaced by
/// [`TileKind::Empty`].
#[derive(Debug, Copy, Clone, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum TileKind {
    /// Open ground.
    #[default]
    Empty,
    /// Destructible wall, chipped by any projectile.
    Brick,
    /// Armoured wall, chipped only by maximum-power projectiles.
    Steel,
    /// Blocks tanks, projectiles fly over it.
    Water,
    /// Cover. Passable and transparent.
    Trees,
    /// Passable, makes tanks slide.
    Ice,
    /// The defended objective cell.
    Base,
}

impl TileKind {
    /// Returns true for kinds that carry destructible sections.
    #[must_use]
    pub const fn is_destructible(self) -> bool {
        matches!(self, Self::Brick | Self::Steel)
    }

    /// Returns true for kinds a tank may never enter while intact.
    #[must_use]
    pub const fn blocks_tanks(self) -> bool {
        matches!(self, Self::Brick | Self::Steel | Self::Water | Self::Base)
    }

    /// Returns true for kinds that block line of sight.
    ///
    /// Trees hide nothing in this game, and the base is the thing being aimed
    /// at rather than an obstacle.
    #[must_use]
    pub const fn blocks_sight(self) -> bool {
        matches!(self, Self::Brick | Self::Steel | Self::Water)
    }

    /// Decodes a terrain map symbol. Returns `None` for symbols that do not
    /// name terrain.
    #[must_use]
    pub const fn from_symbol(symbol: char) -> Option<Self> {
        match symbol {
            'B' => Some(Self::Brick),
            'S' => Some(Self::Steel),
            'W' => Some(Self::Water),
            'T' => Some(Self::Trees),
            'I' => Some(Self::Ice),
            'X' => Some(Self::Base),
            _ => None,
        }
    }

    /// Map symbol for this kind.
    #[must_use]
    pub const fn symbol(self) -> char {
        match self {
            Self::Empty => '.',
            Self::Brick => 'B',
            Self::Steel => 'S',
            Self::Water => 'W',
            Self::Trees => 'T',
            Self::Ice => 'I',
            Self::Base => 'X',
        }
    }
}

bitflags! {
    /// Intact quadrants of a destructible tile.
    #[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
    pub struct Sections: u8 {
        /// Upper-left quadrant.
        const TOP_LEFT = 0b0001;
        /// Upper-right quadrant.
        const TOP_RIGHT = 0b0010;
        /// Lower-left quadrant.
        const BOTTOM_LEFT = 0b0100;
        /// Lower-right quadrant.
        const BOTTOM_RIGHT = 0b1000;
    }
}

impl Sections {
    /// The four single-quadrant flags in row-major order.
    pub const QUADRANTS: [Sections; 4] = [
        Self::TOP_LEFT,
        Self::TOP_RIGHT,
        Self::BOTTOM_LEFT,
        Self::BOTTOM_RIGHT,
    ];

    /// Selects one quadrant by side.
    #[must_use]
    pub const fn quadrant(right: bool, bottom: bool) -> Self {
        match (right, bottom) {
            (false, false) => Self::TOP_LEFT,
            (true, false) => Self::TOP_RIGHT,
            (false, true) => Self::BOTTOM_LEFT,
            (true, true) => Self::BOTTOM_RIGHT,
        }
    }

    /// The quadrant on the other side of the vertical seam, same row.
    #[must_use]
    pub const fn across_vertical_seam(self) -> Self {
        Self::from_bits_truncate(((self.bits() & 0b0101) << 1) | ((self.bits() & 0b1010) >> 1))
    }

    /// The quadrant on the other side of the horizontal seam, same column.
    #[must_use]
    pub const fn across_horizontal_seam(self) -> Self {
        Self::from_bits_truncate(((self.bits() & 0b0011) << 2) | ((self.bits() & 0b1100) >> 2))
    }

    /// Number of quadrants set.
    #[must_use]
    pub const fn count(self) -> u32 {
        self.bits().count_ones()
    }
}

/// One grid cell.
#[derive(Debug, Copy, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Tile {
    kind: TileKind,
    sections: Sections,
}

impl Tile {
    /// Open ground.
    pub const EMPTY: Tile = Tile {
        kind: TileKind::Empty,
        sections: Sections::empty(),
    };

    /// Creates a fresh tile. Destructible kinds start with all sections intact.
    #[must_use]
    pub const fn new(kind: TileKind) -> Self {
        let sections = if kind.is_destructible() {
            Sections::all()
        } else {
            Sections::empty()
        };
        Self { kind, sections }
    }

    /// Terrain kind.
    #[must_use]
    pub const fn kind(&self) -> TileKind {
        self.kind
    }

    /// Intact sections. Always empty for non-destructible kinds.
    #[must_use]
    pub const fn sections(&self) -> Sections {
        self.sections
    }

    /// Number of intact sections.
    #[must_use]
    pub const fn remaining_sections(&self) -> u32 {
        self.sections.count()
    }

    /// Returns true if `section` is still standing.
    #[must_use]
    pub const fn is_intact(&self, section: Sections) -> bool {
        self.kind.is_destructible() && self.sections.contains(section)
    }

    pub(crate) fn remove_sections(&mut self, lost: Sections) {
        self.sections.remove(lost);
    }
}

impl Default for Tile {
    fn default() -> Self {
        Self::EMPTY
    }
}
