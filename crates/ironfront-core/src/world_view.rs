//! `WorldView` provides read-only access to arena state.
//!
//! The [`WorldView`] is what the renderer and the enemy controller see of the
//! world. It borrows the [`Arena`] immutably, so nothing holding a view can
//! change state, and the borrow checker rules out reading while a tick is
//! being resolved.
//!
//! # Contents
//!
//! - Tiles with their kind and remaining sections
//! - Tanks, with derived flags such as invulnerability at the view's tick
//! - Projectiles and power-ups
//! - The base
//! - Active visual effects
//!
//! # Example
//!
//! ```
//! use ironfront_core::simulation::Simulation;
//!
//! let mut sim = Simulation::new(7);
//! sim.step();
//!
//! let view = sim.view();
//! assert_eq!(view.tick(), 1);
//! assert_eq!(view.tiles().count(), 16 * 16);
//! assert_eq!(view.players().count(), 1);
//! assert!(!view.base().destroyed);
//! ```

use glam::{IVec2, Vec2};
use rubble::{Rect, Tile, TileCoord, TileGrid};

use crate::arena::{Arena, Base};
use crate::entity::{EntityId, PlayerSlot, PowerUp, Projectile, Tank};
use crate::output::Effect;

// =============================================================================
// WorldView
// =============================================================================

/// Read-only view of the arena at one tick.
#[derive(Debug, Clone, Copy)]
pub struct WorldView<'a> {
    /// Reference to the arena being viewed.
    arena: &'a Arena,
    /// Tick the view was taken at.
    tick: u64,
}

impl<'a> WorldView<'a> {
    /// Creates a view of `arena` at its current tick.
    #[must_use]
    pub const fn new(arena: &'a Arena) -> Self {
        Self {
            arena,
            tick: arena.current_tick(),
        }
    }

    /// Creates a view that evaluates time-dependent flags at `tick`.
    #[must_use]
    pub const fn at_tick(arena: &'a Arena, tick: u64) -> Self {
        Self { arena, tick }
    }

    /// Tick the view was taken at.
    #[must_use]
    pub const fn tick(&self) -> u64 {
        self.tick
    }

    /// The underlying arena.
    #[must_use]
    pub const fn arena(&self) -> &'a Arena {
        self.arena
    }

    // =========================================================================
    // Terrain
    // =========================================================================

    /// The tile grid.
    #[must_use]
    pub const fn grid(&self) -> &'a TileGrid {
        self.arena.grid()
    }

    /// Every tile in row-major order.
    pub fn tiles(&self) -> impl Iterator<Item = (TileCoord, &'a Tile)> + 'a {
        self.arena.grid().iter()
    }

    /// World size in pixels.
    #[must_use]
    pub const fn world_size(&self) -> IVec2 {
        self.arena.world_size()
    }

    /// The base.
    #[must_use]
    pub const fn base(&self) -> &'a Base {
        self.arena.base()
    }

    /// Pixel rectangle of the base.
    #[must_use]
    pub const fn base_rect(&self) -> Rect {
        self.arena.base_rect()
    }

    // =========================================================================
    // Actors
    // =========================================================================

    /// Looks up a tank.
    #[must_use]
    pub fn tank(&self, id: EntityId) -> Option<&'a Tank> {
        self.arena.tank(id)
    }

    /// All tanks in id order.
    pub fn tanks(&self) -> impl Iterator<Item = (EntityId, &'a Tank)> + 'a {
        self.arena.tanks()
    }

    /// Player tanks in slot order.
    pub fn players(&self) -> impl Iterator<Item = (EntityId, &'a Tank)> + 'a {
        self.arena.players()
    }

    /// The tank controlled by `slot`.
    #[must_use]
    pub fn player(&self, slot: PlayerSlot) -> Option<(EntityId, &'a Tank)> {
        self.arena.player(slot)
    }

    /// Centre of the player tank closest to `from`, ties going to the lower
    /// slot.
    #[must_use]
    pub fn nearest_player(&self, from: IVec2) -> Option<(EntityId, IVec2)> {
        let origin = from.as_vec2();
        self.players()
            .map(|(id, t)| (id, t.center()))
            .min_by(|(_, a), (_, b)| {
                distance(origin, *a).total_cmp(&distance(origin, *b))
            })
    }

    /// True if the tank is currently immune to damage.
    #[must_use]
    pub fn is_invulnerable(&self, id: EntityId) -> bool {
        self.tank(id).is_some_and(|t| t.is_invulnerable(self.tick))
    }

    /// All projectiles in id order.
    pub fn projectiles(&self) -> impl Iterator<Item = (EntityId, &'a Projectile)> + 'a {
        self.arena.projectiles()
    }

    /// All power-ups in id order.
    pub fn powerups(&self) -> impl Iterator<Item = (EntityId, &'a PowerUp)> + 'a {
        self.arena.powerups()
    }

    /// Active visual effects.
    #[must_use]
    pub fn effects(&self) -> &'a [Effect] {
        self.arena.effects()
    }

    /// True while enemies are frozen.
    #[must_use]
    pub const fn is_frozen(&self) -> bool {
        self.arena.is_frozen()
    }
}

fn distance(a: Vec2, b: IVec2) -> f32 {
    a.distance(b.as_vec2())
}
