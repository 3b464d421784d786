//! # Ironfront Core
//!
//! Deterministic tank arena simulation for Ironfront.
//!
//! Up to two player tanks defend a base against waves of AI enemy tanks on a
//! destructible tile grid. The crate owns the whole game state and advances it
//! in fixed ticks; rendering, input devices and audio live outside it.
//!
//! ## Architecture
//!
//! - **Arena**: the authoritative world, with terrain from [`rubble`], tanks,
//!   shells, power-ups, timers and scores
//! - **Resolvers**: fixed stages of a tick that mutate the arena (movement,
//!   combat, casualties, pickups)
//! - **AI**: the enemy [`Controller`](ai::Controller) reads a
//!   [`WorldView`](world_view::WorldView) and returns one
//!   [`Intent`](entity::Intent) per enemy
//! - **Director**: enemy spawning and expiry of timed effects
//! - **Simulation**: orders all of the above into one tick
//!
//! ## Usage
//!
//! ```
//! use ironfront_core::{Direction, GameConfig, Intent, PlayerSlot, Simulation};
//!
//! let config = GameConfig { two_player: true, ..GameConfig::default() };
//! let mut sim = Simulation::with_config(config, 2024).unwrap();
//!
//! sim.set_intent(PlayerSlot::One, Intent::drive(Direction::Up).firing());
//! sim.set_intent(PlayerSlot::Two, Intent::drive(Direction::Left));
//! for _ in 0..120 {
//!     sim.step();
//!     for event in sim.take_events() {
//!         let _ = event;
//!     }
//! }
//!
//! assert_eq!(sim.tick(), 120);
//! assert!(sim.view().players().count() == 2);
//! ```

#![warn(missing_docs)]
#![warn(clippy::all)]
#![warn(clippy::pedantic)]
#![allow(clippy::module_name_repetitions)]

// Re-export rubble for terrain queries
pub use rubble;

// Core modules
pub mod ai;
pub mod arena;
pub mod config;
pub mod director;
pub mod entity;
pub mod error;
pub mod map;
pub mod output;
pub mod resolver;
pub mod simulation;
pub mod world_view;

#[cfg(test)]
mod tests;

// Re-exports for convenience
pub use arena::Arena;
pub use config::{AiConfig, GameConfig, TICKS_PER_SECOND};
pub use entity::{Direction, EntityId, Intent, PlayerSlot};
pub use error::ConfigError;
pub use output::GameEvent;
pub use simulation::Simulation;
pub use world_view::WorldView;
