//! Enemy archetypes: immutable stat records selected at spawn.

use serde::{Deserialize, Serialize};

use crate::config::ticks_from_millis;

/// Stat block shared by every tank of one archetype.
#[derive(Debug, Copy, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Archetype {
    /// Pixels per tick.
    pub speed: i32,
    /// Projectile pixels per tick.
    pub bullet_speed: i32,
    /// Starting and maximum health.
    pub health: i32,
    /// Score awarded for a kill.
    pub points: u32,
    /// Ticks between shots.
    pub fire_cooldown: u64,
    /// Relative weights of patrol, chase and assault behaviour.
    pub state_weights: [u32; 3],
}

/// The four enemy kinds.
#[derive(Debug, Copy, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum ArchetypeKind {
    /// Slow and cheap.
    Basic,
    /// Quick movement, moderate shells.
    Fast,
    /// Quick, with the fastest shells.
    Power,
    /// Takes four hits.
    Armor,
}

impl ArchetypeKind {
    /// All kinds in spawn-table order.
    pub const ALL: [ArchetypeKind; 4] = [Self::Basic, Self::Fast, Self::Power, Self::Armor];

    /// Stat block for this kind.
    #[must_use]
    pub const fn stats(self) -> Archetype {
        match self {
            Self::Basic => Archetype {
                speed: 1,
                bullet_speed: 1,
                health: 1,
                points: 100,
                fire_cooldown: ticks_from_millis(3500),
                state_weights: [50, 30, 20],
            },
            Self::Fast => Archetype {
                speed: 3,
                bullet_speed: 2,
                health: 1,
                points: 200,
                fire_cooldown: ticks_from_millis(2500),
                state_weights: [25, 45, 30],
            },
            Self::Power => Archetype {
                speed: 3,
                bullet_speed: 4,
                health: 1,
                points: 300,
                fire_cooldown: ticks_from_millis(2000),
                state_weights: [20, 40, 40],
            },
            Self::Armor => Archetype {
                speed: 2,
                bullet_speed: 3,
                health: 4,
                points: 400,
                fire_cooldown: ticks_from_millis(3000),
                state_weights: [30, 30, 40],
            },
        }
    }

    /// Spawn-table weight at wave progress `p` (spawned / total, 0..=1).
    ///
    /// Early waves are mostly basic tanks; armour becomes three times as
    /// likely by the end.
    #[must_use]
    pub fn spawn_weight(self, progress: f64) -> f64 {
        let p = progress.clamp(0.0, 1.0);
        match self {
            Self::Basic => 0.6 - 0.4 * p,
            Self::Fast => 0.2 + 0.1 * p,
            Self::Power => 0.1 + 0.1 * p,
            Self::Armor => 0.1 + 0.2 * p,
        }
    }
}

/// Player tank stats. Players use the config's fire cooldown instead.
pub const PLAYER_STATS: Archetype = Archetype {
    speed: 2,
    bullet_speed: 3,
    health: 1,
    points: 0,
    fire_cooldown: ticks_from_millis(500),
    state_weights: [0, 0, 0],
};
