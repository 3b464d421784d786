//! Simulation outputs: visual effects for the renderer and the telemetry
//! event log.
//!
//! # Effects
//!
//! [`Effect`]s are short-lived markers (explosions, sparks) that the renderer
//! draws at a position for a fixed number of ticks. The simulation ages them
//! once per tick and drops them when `age >= lifetime`.
//!
//! # Events
//!
//! [`GameEvent`]s describe what happened during a tick. They are appended to
//! an [`EventLog`] as the resolvers run and drained by the caller with
//! `take_events()`. Nothing in the simulation reads them back.
//!
//! ```
//! use ironfront_core::output::{EventLog, GameEvent};
//!
//! let mut log = EventLog::new();
//! log.record(GameEvent::BaseDestroyed);
//! assert_eq!(log.len(), 1);
//! let drained = log.take_events();
//! assert_eq!(drained, vec![GameEvent::BaseDestroyed]);
//! assert!(log.is_empty());
//! ```

use glam::IVec2;
use rubble::TileCoord;
use serde::{Deserialize, Serialize};

use crate::entity::{ArchetypeKind, EntityId, PlayerSlot, PowerUpKind};

// =============================================================================
// Effects
// =============================================================================

/// Kind of visual effect.
#[derive(Debug, Copy, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum EffectKind {
    /// Tank or base destruction.
    Explosion,
    /// Two shells annihilating each other.
    SmallExplosion,
}

/// A transient visual marker.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Effect {
    /// What to draw.
    pub kind: EffectKind,
    /// Where to draw it.
    pub position: IVec2,
    /// Ticks since creation.
    pub age: u32,
    /// Ticks the effect stays visible.
    pub lifetime: u32,
}

impl Effect {
    /// Creates a fresh effect.
    #[must_use]
    pub const fn new(kind: EffectKind, position: IVec2, lifetime: u32) -> Self {
        Self {
            kind,
            position,
            age: 0,
            lifetime,
        }
    }

    /// True once the effect should no longer be drawn.
    #[must_use]
    pub const fn is_expired(&self) -> bool {
        self.age >= self.lifetime
    }
}

// =============================================================================
// Events
// =============================================================================

/// Something that happened during a tick.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub enum GameEvent {
    /// An enemy entered the field.
    EnemySpawned {
        /// New tank.
        id: EntityId,
        /// Its archetype.
        kind: ArchetypeKind,
        /// Whether it will drop a power-up.
        flashing: bool,
        /// Spawn point.
        position: IVec2,
    },
    /// An enemy was destroyed.
    EnemyDestroyed {
        /// Destroyed tank.
        id: EntityId,
        /// Its archetype.
        kind: ArchetypeKind,
        /// Player credited with the kill, if any.
        by: Option<PlayerSlot>,
        /// Points awarded.
        points: u32,
    },
    /// An enemy controller failed and the tank was withdrawn.
    EnemyFaulted {
        /// Withdrawn tank.
        id: EntityId,
        /// Failure description.
        reason: String,
    },
    /// A player took a hit.
    PlayerHit {
        /// Player hit.
        slot: PlayerSlot,
        /// Damage dealt.
        damage: i32,
    },
    /// A player lost a life and respawned.
    PlayerLifeLost {
        /// Player.
        slot: PlayerSlot,
        /// Lives left.
        lives_left: u32,
    },
    /// A player lost its last life.
    PlayerEliminated {
        /// Player.
        slot: PlayerSlot,
    },
    /// Two opposing shells annihilated.
    ProjectilesCollided {
        /// Lower-id shell.
        first: EntityId,
        /// Higher-id shell.
        second: EntityId,
        /// Midpoint of the two.
        at: IVec2,
    },
    /// A wall lost its last section.
    TileDestroyed {
        /// Wall cell.
        coord: TileCoord,
    },
    /// The base was hit.
    BaseDestroyed,
    /// A power-up appeared.
    PowerUpSpawned {
        /// New power-up.
        id: EntityId,
        /// Effect.
        kind: PowerUpKind,
        /// Top-left pixel.
        position: IVec2,
    },
    /// A player picked up a power-up.
    PowerUpCollected {
        /// Collected power-up.
        id: EntityId,
        /// Effect.
        kind: PowerUpKind,
        /// Collector.
        by: PlayerSlot,
    },
    /// Enemies froze.
    FreezeStarted {
        /// Tick at which they thaw.
        until: u64,
    },
    /// Enemies thawed.
    FreezeEnded,
    /// The base walls turned to steel.
    FortifyStarted {
        /// Tick at which they revert to brick.
        until: u64,
    },
    /// The base walls reverted to brick.
    FortifyEnded,
}

impl GameEvent {
    /// Stable snake-case name of the variant, for tallies and log fields.
    #[must_use]
    pub const fn name(&self) -> &'static str {
        match self {
            Self::EnemySpawned { .. } => "enemy_spawned",
            Self::EnemyDestroyed { .. } => "enemy_destroyed",
            Self::EnemyFaulted { .. } => "enemy_faulted",
            Self::PlayerHit { .. } => "player_hit",
            Self::PlayerLifeLost { .. } => "player_life_lost",
            Self::PlayerEliminated { .. } => "player_eliminated",
            Self::ProjectilesCollided { .. } => "projectiles_collided",
            Self::TileDestroyed { .. } => "tile_destroyed",
            Self::BaseDestroyed => "base_destroyed",
            Self::PowerUpSpawned { .. } => "power_up_spawned",
            Self::PowerUpCollected { .. } => "power_up_collected",
            Self::FreezeStarted { .. } => "freeze_started",
            Self::FreezeEnded => "freeze_ended",
            Self::FortifyStarted { .. } => "fortify_started",
            Self::FortifyEnded => "fortify_ended",
        }
    }
}

/// Append-only event buffer drained once per tick by the caller.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct EventLog {
    events: Vec<GameEvent>,
}

impl EventLog {
    /// Creates an empty log.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Appends an event.
    pub fn record(&mut self, event: GameEvent) {
        self.events.push(event);
    }

    /// Removes and returns all buffered events in recording order.
    pub fn take_events(&mut self) -> Vec<GameEvent> {
        std::mem::take(&mut self.events)
    }

    /// Buffered events, oldest first.
    #[must_use]
    pub fn events(&self) -> &[GameEvent] {
        &self.events
    }

    /// Number of buffered events.
    #[must_use]
    pub fn len(&self) -> usize {
        self.events.len()
    }

    /// True when nothing is buffered.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.events.is_empty()
    }
}
