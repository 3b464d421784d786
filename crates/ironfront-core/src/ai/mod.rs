//! Enemy AI: the read phase of a tick for enemy tanks.
//!
//! Every enemy owns a [`Brain`] holding its behaviour state, timers, a short
//! trail of recent positions and an optional waypoint path. Once per tick a
//! [`Controller`] reads the world through a [`WorldView`] and turns the brain
//! into an [`Intent`] that the simulation applies at the start of the next
//! tick.
//!
//! # Behaviour states
//!
//! | State | Movement | Fire chance when lined up |
//! |---|---|---|
//! | [`AiState::Patrol`] | random turns at a fixed interval | patrol chance |
//! | [`AiState::ChasePlayer`] | towards the nearest player | chase chance |
//! | [`AiState::AssaultBase`] | towards the base | assault chance |
//!
//! The state is redrawn from the archetype's weights at a fixed interval.
//! A tank that has barely moved over its position window is considered stuck
//! and forced to turn.
//!
//! # Faults
//!
//! [`Controller::decide`] returns an [`AiError`] instead of panicking. The
//! simulation withdraws the affected enemy and carries on with the tick.
//!
//! # Example
//!
//! ```
//! use glam::IVec2;
//! use ironfront_core::ai::{AiContext, AiState, Brain, Controller, EnemyController};
//! use ironfront_core::arena::Arena;
//! use ironfront_core::config::AiConfig;
//! use ironfront_core::entity::{ArchetypeKind, Tank};
//! use ironfront_core::world_view::WorldView;
//! use rand::SeedableRng;
//! use rand_chacha::ChaCha8Rng;
//! use rubble::{TileCoord, TileGrid};
//!
//! let mut arena = Arena::new(TileGrid::new(8, 8, 40).unwrap(), TileCoord::new(4, 7));
//! let id = arena.spawn_tank(Tank::enemy(ArchetypeKind::Basic, IVec2::ZERO, 40, false, 0));
//!
//! let config = AiConfig::default();
//! let mut rng = ChaCha8Rng::seed_from_u64(1);
//! let mut brain = Brain::new(0);
//! let mut ctx = AiContext { tick: 0, config: &config, rng: &mut rng };
//!
//! let intent = EnemyController::new()
//!     .decide(&mut ctx, &WorldView::new(&arena), id, &mut brain)
//!     .unwrap();
//! assert!(intent.moving);
//! assert!(AiState::ALL.contains(&brain.state()));
//! ```

mod brain;
mod controller;
pub mod pathing;

pub use brain::Brain;
pub use controller::EnemyController;

use rand_chacha::ChaCha8Rng;
use serde::{Deserialize, Serialize};
use thiserror::Error;

use crate::config::AiConfig;
use crate::entity::{EntityId, Intent};
use crate::world_view::WorldView;

// =============================================================================
// State
// =============================================================================

/// High-level behaviour of an enemy tank.
#[derive(Debug, Copy, Clone, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum AiState {
    /// Wander, turning at random.
    #[default]
    Patrol,
    /// Hunt the nearest player.
    ChasePlayer,
    /// Drive on the base.
    AssaultBase,
}

impl AiState {
    /// All states, in archetype weight order.
    pub const ALL: [AiState; 3] = [Self::Patrol, Self::ChasePlayer, Self::AssaultBase];
}

// =============================================================================
// Errors
// =============================================================================

/// A failed enemy decision.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum AiError {
    /// The enemy has no brain registered.
    #[error("enemy {id} has no brain")]
    MissingBrain {
        /// Enemy tank.
        id: EntityId,
    },

    /// The id does not refer to a live enemy tank.
    #[error("entity {id} is not an enemy tank")]
    NotAnEnemy {
        /// Offending entity.
        id: EntityId,
    },

    /// No direction could be chosen.
    #[error("no direction available for enemy {id}")]
    NoDirection {
        /// Enemy tank.
        id: EntityId,
    },
}

// =============================================================================
// Controller
// =============================================================================

/// Per-tick inputs shared by all decisions.
pub struct AiContext<'a> {
    /// Tick being decided.
    pub tick: u64,
    /// Behaviour tuning.
    pub config: &'a AiConfig,
    /// Simulation random stream.
    pub rng: &'a mut ChaCha8Rng,
}

/// Decides what an enemy tank does next.
///
/// Implementations read the world only through the view and keep their memory
/// in the brain, so a decision never mutates the arena.
pub trait Controller: Send + Sync {
    /// Computes the intent for enemy `id`.
    ///
    /// # Errors
    ///
    /// Returns [`AiError`] if `id` is not a live enemy or no decision can be
    /// made. The caller is expected to withdraw the enemy.
    fn decide(
        &self,
        ctx: &mut AiContext<'_>,
        view: &WorldView<'_>,
        id: EntityId,
        brain: &mut Brain,
    ) -> Result<Intent, AiError>;
}
