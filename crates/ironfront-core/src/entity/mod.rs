//! Entity module: the actors of a tank arena.
//!
//! This module provides the core entity types for Ironfront's simulation:
//! - [`EntityId`]: Unique identifier shared by tanks, projectiles and power-ups
//! - [`Direction`]: The four cardinal facings
//! - [`Tank`]: Player or enemy tank, including pilot-specific state
//! - [`Projectile`]: In-flight shell
//! - [`PowerUp`]: Collectible bonus
//! - [`Intent`]: Per-tick driver request shared by players and the enemy controller
//!
//! # Architecture
//!
//! Each entity kind lives in its own `BTreeMap` inside the
//! [`Arena`](crate::arena::Arena), keyed by an [`EntityId`] drawn from a single
//! monotonically increasing counter. Iterating any map therefore visits
//! entities in creation order, which keeps every pass deterministic.
//!
//! # Example
//!
//! ```
//! use glam::IVec2;
//! use ironfront_core::entity::{ArchetypeKind, Direction, Tank};
//!
//! let tank = Tank::enemy(ArchetypeKind::Fast, IVec2::new(0, 0), 40, false, 120);
//! assert_eq!(tank.speed, 3);
//! assert_eq!(tank.direction, Direction::Down);
//! assert!(tank.is_invulnerable(119));
//! assert!(!tank.is_invulnerable(120));
//! ```

pub mod archetype;
pub mod powerup;
pub mod projectile;
pub mod tank;

use std::fmt;

use glam::IVec2;
use serde::{Deserialize, Serialize};

pub use archetype::{Archetype, ArchetypeKind};
pub use powerup::{PowerUp, PowerUpKind};
pub use projectile::Projectile;
pub use tank::{EnemyState, Pilot, PlayerState, Tank, MAX_POWER_LEVEL};

/// Unique identifier for an entity.
///
/// Entity IDs are ordered by their numeric value, which is used to ensure
/// deterministic iteration order across all entities.
///
/// ```
/// use ironfront_core::entity::EntityId;
///
/// assert!(EntityId::new(1) < EntityId::new(2));
/// assert_eq!(EntityId::new(7).as_u64(), 7);
/// ```
#[derive(Copy, Clone, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
pub struct EntityId(u64);

impl EntityId {
    /// Creates a new `EntityId` from a raw `u64` value.
    #[must_use]
    pub const fn new(id: u64) -> Self {
        Self(id)
    }

    /// Returns the raw `u64` value of this identifier.
    #[must_use]
    pub const fn as_u64(self) -> u64 {
        self.0
    }
}

impl fmt::Debug for EntityId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "EntityId({})", self.0)
    }
}

impl fmt::Display for EntityId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

impl From<u64> for EntityId {
    fn from(id: u64) -> Self {
        Self::new(id)
    }
}

impl From<EntityId> for u64 {
    fn from(id: EntityId) -> Self {
        id.0
    }
}

// =============================================================================
// Direction
// =============================================================================

/// Cardinal facing. Screen coordinates: `Up` decreases `y`.
#[derive(Debug, Copy, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum Direction {
    /// Towards row 0.
    Up,
    /// Towards the last row.
    Down,
    /// Towards column 0.
    Left,
    /// Towards the last column.
    Right,
}

impl Direction {
    /// All four directions.
    pub const ALL: [Direction; 4] = [Self::Up, Self::Down, Self::Left, Self::Right];

    /// Unit step in pixels.
    #[must_use]
    pub const fn delta(self) -> IVec2 {
        match self {
            Self::Up => IVec2::new(0, -1),
            Self::Down => IVec2::new(0, 1),
            Self::Left => IVec2::new(-1, 0),
            Self::Right => IVec2::new(1, 0),
        }
    }

    /// The reverse direction.
    #[must_use]
    pub const fn opposite(self) -> Self {
        match self {
            Self::Up => Self::Down,
            Self::Down => Self::Up,
            Self::Left => Self::Right,
            Self::Right => Self::Left,
        }
    }

    /// True for `Up` and `Down`.
    #[must_use]
    pub const fn is_vertical(self) -> bool {
        matches!(self, Self::Up | Self::Down)
    }

    /// Direction that reduces `offset` along its dominant axis. Ties favour
    /// the vertical axis. `None` for a zero offset.
    #[must_use]
    pub fn toward(offset: IVec2) -> Option<Self> {
        match cardinal_step(offset) {
            IVec2 { x: 0, y: 0 } => None,
            IVec2 { x: 0, y } if y < 0 => Some(Self::Up),
            IVec2 { x: 0, .. } => Some(Self::Down),
            IVec2 { x, .. } if x < 0 => Some(Self::Left),
            _ => Some(Self::Right),
        }
    }
}

/// Keeps only the larger-magnitude component of `delta`, favouring the
/// vertical one on a tie.
///
/// ```
/// use glam::IVec2;
/// use ironfront_core::entity::cardinal_step;
///
/// assert_eq!(cardinal_step(IVec2::new(3, -1)), IVec2::new(3, 0));
/// assert_eq!(cardinal_step(IVec2::new(2, 2)), IVec2::new(0, 2));
/// ```
#[must_use]
pub fn cardinal_step(delta: IVec2) -> IVec2 {
    if delta.x.abs() > delta.y.abs() {
        IVec2::new(delta.x, 0)
    } else {
        IVec2::new(0, delta.y)
    }
}

// =============================================================================
// Players and sides
// =============================================================================

/// Which human seat controls a tank.
#[derive(Debug, Copy, Clone, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
pub enum PlayerSlot {
    /// First player.
    One,
    /// Second player.
    Two,
}

impl PlayerSlot {
    /// Both slots, in collection priority order.
    pub const ALL: [PlayerSlot; 2] = [Self::One, Self::Two];

    /// Zero-based index, for per-slot arrays.
    #[must_use]
    pub const fn index(self) -> usize {
        match self {
            Self::One => 0,
            Self::Two => 1,
        }
    }
}

impl fmt::Display for PlayerSlot {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::One => write!(f, "P1"),
            Self::Two => write!(f, "P2"),
        }
    }
}

/// Allegiance of a tank or projectile.
#[derive(Debug, Copy, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum Side {
    /// Human-controlled.
    Player,
    /// AI-controlled.
    Enemy,
}

// =============================================================================
// Intent
// =============================================================================

/// What a driver wants its tank to do this tick.
///
/// Players set one through
/// [`Simulation::set_intent`](crate::simulation::Simulation::set_intent); the
/// enemy controller produces one per enemy per tick.
#[derive(Debug, Copy, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct Intent {
    /// New facing; `None` keeps the current one.
    pub direction: Option<Direction>,
    /// Whether to advance.
    pub moving: bool,
    /// Whether to fire, subject to cooldown.
    pub wants_to_fire: bool,
}

impl Intent {
    /// Stand still, hold fire.
    pub const IDLE: Intent = Intent {
        direction: None,
        moving: false,
        wants_to_fire: false,
    };

    /// Drive towards `direction` without firing.
    #[must_use]
    pub const fn drive(direction: Direction) -> Self {
        Self {
            direction: Some(direction),
            moving: true,
            wants_to_fire: false,
        }
    }

    /// Same intent with the fire flag set.
    #[must_use]
    pub const fn firing(mut self) -> Self {
        self.wants_to_fire = true;
        self
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    mod entity_id_tests {
        use super::*;

        #[test]
        fn conversions() {
            let id: EntityId = 5u64.into();
            assert_eq!(u64::from(id), 5);
            assert_eq!(format!("{id:?}"), "EntityId(5)");
            assert_eq!(id.to_string(), "5");
        }
    }

    mod direction_tests {
        use super::*;
        use proptest::prelude::*;

        #[test]
        fn opposite_is_involution() {
            for d in Direction::ALL {
                assert_eq!(d.opposite().opposite(), d);
                assert_eq!(d.delta() + d.opposite().delta(), IVec2::ZERO);
            }
        }

        #[test]
        fn toward_uses_dominant_axis() {
            assert_eq!(Direction::toward(IVec2::new(-5, 2)), Some(Direction::Left));
            assert_eq!(Direction::toward(IVec2::new(1, -4)), Some(Direction::Up));
            assert_eq!(Direction::toward(IVec2::new(3, 3)), Some(Direction::Down));
            assert_eq!(Direction::toward(IVec2::ZERO), None);
        }

        proptest! {
            #[test]
            fn cardinal_step_keeps_dominant_axis(x in -64..=64i32, y in -64..=64i32) {
                let step = cardinal_step(IVec2::new(x, y));
                prop_assert!(step.x == 0 || step.y == 0);
                prop_assert_eq!(step.x.abs().max(step.y.abs()), x.abs().max(y.abs()));
                prop_assert!(step.x == 0 || step.x == x);
                prop_assert!(step.y == 0 || step.y == y);
            }
        }
    }

    #[test]
    fn player_slot_index() {
        assert_eq!(PlayerSlot::One.index(), 0);
        assert_eq!(PlayerSlot::Two.index(), 1);
        assert_eq!(PlayerSlot::Two.to_string(), "P2");
    }
}
