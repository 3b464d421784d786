//! # Rubble
//!
//! Destructible tile grid substrate for Ironfront arenas.
//!
//! Rubble represents the battlefield as a fixed grid of square cells. Each cell
//! holds a [`Tile`] whose kind never changes once placed, while brick and steel
//! tiles carry a 2×2 set of [`Sections`] that projectiles chip away. This gives:
//!
//! - **Pixel-accurate passability**: a half-destroyed wall lets a tank through
//!   the open half only
//! - **Quadrant damage**: impacts remove the section under the hit point, with
//!   bleed across the internal seams
//! - **Cheap sight checks**: axis-aligned line-of-sight and sampled segment
//!   tests for enemy planning
//!
//! All coordinates are integer pixels (`glam::IVec2`) with the origin in the
//! top-left corner and `y` growing downwards.
//!
//! ## Quick Start
//!
//! ```
//! use glam::IVec2;
//! use rubble::{Tile, TileCoord, TileGrid, TileKind};
//!
//! let mut grid = TileGrid::new(4, 4, 40).unwrap();
//! let coord = TileCoord::new(1, 1);
//! grid.set(coord, Tile::new(TileKind::Brick));
//!
//! // Hit the top-left quadrant of the brick.
//! let destroyed = grid.apply_damage(coord, IVec2::new(50, 50), 0);
//! assert!(!destroyed);
//! assert_eq!(grid.get(coord).unwrap().remaining_sections(), 3);
//! ```

#![warn(missing_docs)]
#![warn(clippy::all)]
#![warn(clippy::pedantic)]
#![allow(clippy::module_name_repetitions)]

pub mod geom;
pub mod grid;
pub mod tile;

// Re-exports for convenience
pub use geom::{Rect, TileCoord};
pub use grid::{GridError, TileGrid, DEFAULT_BORDER_BLEED};
pub use tile::{Sections, Tile, TileKind};
