//! Simulation module: the fixed-step tick orchestrator.
//!
//! The [`Simulation`] owns the authoritative [`Arena`] and advances it one tick
//! per [`step`](Simulation::step), in a fixed order:
//!
//! 1. **Timers**: expire freeze, fortify and helmets
//! 2. **Players**: apply player intents, fire if asked
//! 3. **Enemies**: apply the intents the controller produced last tick
//! 4. **Resolution**: movement, combat, casualties, pickups
//! 5. **Decisions**: the enemy controller plans the next tick
//! 6. **Director**: maybe spawn an enemy
//! 7. **Effects**: age visual effects, advance the tick counter
//!
//! # Determinism
//!
//! Every random draw comes from one `ChaCha8Rng` seeded at construction and
//! every entity pass walks ids in ascending order, so the same seed and the
//! same intents reproduce the same run.
//!
//! # Example
//!
//! ```
//! use ironfront_core::entity::{Direction, Intent, PlayerSlot};
//! use ironfront_core::simulation::Simulation;
//!
//! let mut sim = Simulation::new(42);
//! sim.set_intent(PlayerSlot::One, Intent::drive(Direction::Up).firing());
//!
//! for _ in 0..10 {
//!     sim.step();
//! }
//!
//! assert_eq!(sim.tick(), 10);
//! assert_eq!(sim.lives(PlayerSlot::One), 3);
//! assert!(!sim.is_game_over());
//! ```

use std::collections::BTreeMap;
use std::fmt;

use rand::SeedableRng;
use rand_chacha::ChaCha8Rng;
use rubble::{TileCoord, TileGrid};
use tracing::{info, trace, warn};

use crate::ai::{AiContext, AiError, Brain, Controller, EnemyController};
use crate::arena::Arena;
use crate::config::GameConfig;
use crate::director;
use crate::entity::{EntityId, Intent, PlayerSlot, PlayerState};
use crate::error::ConfigError;
use crate::map;
use crate::output::GameEvent;
use crate::resolver::{default_pipeline, ResolveContext, Resolver};
use crate::world_view::WorldView;

// =============================================================================
// Simulation
// =============================================================================

/// The tick orchestrator.
///
/// Owns the arena, the random stream, the resolver pipeline, the enemy
/// controller with one [`Brain`] per enemy, and the latest intent of every
/// driver.
pub struct Simulation {
    arena: Arena,
    config: GameConfig,
    rng: ChaCha8Rng,
    seed: u64,
    level: u32,
    resolvers: Vec<Box<dyn Resolver>>,
    controller: Box<dyn Controller>,
    brains: BTreeMap<EntityId, Brain>,
    player_intents: [Intent; 2],
    /// Enemy intents decided last tick, applied this tick.
    enemy_intents: BTreeMap<EntityId, Intent>,
    outcome_logged: bool,
}

impl fmt::Debug for Simulation {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Simulation")
            .field("arena", &self.arena)
            .field("config", &self.config)
            .field("seed", &self.seed)
            .field("level", &self.level)
            .field("resolvers", &format!("[{} resolvers]", self.resolvers.len()))
            .field("brains", &self.brains)
            .field("player_intents", &self.player_intents)
            .field("enemy_intents", &self.enemy_intents)
            .finish_non_exhaustive()
    }
}

impl Simulation {
    /// Creates a single-player game on the built-in map with the default
    /// configuration.
    ///
    /// ```
    /// use ironfront_core::simulation::Simulation;
    ///
    /// let sim = Simulation::new(12345);
    /// assert_eq!(sim.tick(), 0);
    /// assert_eq!(sim.seed(), 12345);
    /// assert_eq!(sim.level(), 1);
    /// ```
    #[must_use]
    pub fn new(seed: u64) -> Self {
        let config = GameConfig::default();
        let arena = map::load_default_map(&config)
            .unwrap_or_else(|_| Arena::new(TileGrid::default(), TileCoord::new(7, 15)));
        Self::from_arena(arena, config, seed)
    }

    /// Creates a game on the built-in map.
    ///
    /// # Errors
    ///
    /// Returns [`ConfigError`] if `config` fails validation.
    pub fn with_config(config: GameConfig, seed: u64) -> Result<Self, ConfigError> {
        Self::with_default_map(config, seed)
    }

    /// Creates a game on the built-in map.
    ///
    /// # Errors
    ///
    /// Returns [`ConfigError`] if `config` fails validation.
    pub fn with_default_map(config: GameConfig, seed: u64) -> Result<Self, ConfigError> {
        config.validate()?;
        let arena = map::load_default_map(&config)?;
        Ok(Self::from_arena(arena, config, seed))
    }

    /// Creates a game on a map given as symbol rows.
    ///
    /// # Errors
    ///
    /// Returns [`ConfigError`] if `config` fails validation. Map content never
    /// causes an error.
    pub fn from_grid<S: AsRef<str>>(
        rows: &[S],
        config: GameConfig,
        seed: u64,
    ) -> Result<Self, ConfigError> {
        config.validate()?;
        let arena = map::load_from_grid(rows, &config)?;
        Ok(Self::from_arena(arena, config, seed))
    }

    fn from_arena(arena: Arena, config: GameConfig, seed: u64) -> Self {
        Self {
            arena,
            config,
            rng: ChaCha8Rng::seed_from_u64(seed),
            seed,
            level: 1,
            resolvers: default_pipeline(),
            controller: Box::new(EnemyController::new()),
            brains: BTreeMap::new(),
            player_intents: [Intent::IDLE; 2],
            enemy_intents: BTreeMap::new(),
            outcome_logged: false,
        }
    }

    /// Replaces the enemy controller.
    pub fn set_controller(&mut self, controller: Box<dyn Controller>) {
        self.controller = controller;
    }

    // =========================================================================
    // Input
    // =========================================================================

    /// Sets the intent applied to `slot` at the start of every tick until it is
    /// replaced.
    pub fn set_intent(&mut self, slot: PlayerSlot, intent: Intent) {
        self.player_intents[slot.index()] = intent;
    }

    /// The intent currently held for `slot`.
    #[must_use]
    pub const fn intent(&self, slot: PlayerSlot) -> Intent {
        self.player_intents[slot.index()]
    }

    // =========================================================================
    // Tick
    // =========================================================================

    /// Advances the world by exactly one tick.
    pub fn step(&mut self) {
        let tick = self.arena.current_tick();

        director::expire_timers(&mut self.arena, tick);
        self.apply_player_intents(tick);
        self.apply_enemy_intents(tick);

        let mut ctx = ResolveContext {
            tick,
            config: &self.config,
            rng: &mut self.rng,
        };
        for resolver in &self.resolvers {
            resolver.resolve(&mut ctx, &mut self.arena);
        }
        let arena = &self.arena;
        self.brains.retain(|id, _| arena.tank(*id).is_some());
        self.enemy_intents.retain(|id, _| arena.tank(*id).is_some());

        self.decide_enemies(tick);

        let mut ctx = ResolveContext {
            tick,
            config: &self.config,
            rng: &mut self.rng,
        };
        if let Some(id) = director::try_spawn_enemy(&mut ctx, &mut self.arena) {
            self.brains.insert(id, Brain::new(tick));
        }

        self.arena.age_effects();
        self.arena.advance_tick();

        trace!(
            tick,
            enemies = self.arena.live_enemy_count(),
            shells = self.arena.projectile_count(),
            events = self.arena.events().len(),
            "tick complete"
        );
        self.log_outcome();
    }

    fn apply_player_intents(&mut self, tick: u64) {
        for slot in PlayerSlot::ALL {
            let intent = self.player_intents[slot.index()];
            let Some((id, _)) = self.arena.player(slot) else {
                continue;
            };
            let shell = self.arena.tank_mut(id).and_then(|tank| {
                tank.try_set_intent(intent.direction, intent.moving);
                if intent.wants_to_fire {
                    tank.fire(id, tick)
                } else {
                    None
                }
            });
            if let Some(shell) = shell {
                self.arena.spawn_projectile(shell);
            }
        }
    }

    fn apply_enemy_intents(&mut self, tick: u64) {
        if self.arena.is_frozen() {
            return;
        }
        for (&id, intent) in &self.enemy_intents {
            let shell = self.arena.tank_mut(id).and_then(|tank| {
                tank.try_set_intent(intent.direction, intent.moving);
                let armed = !tank.frozen && !tank.is_invulnerable(tick);
                if intent.wants_to_fire && armed {
                    tank.fire(id, tick)
                } else {
                    None
                }
            });
            if let Some(shell) = shell {
                self.arena.spawn_projectile(shell);
            }
        }
    }

    /// Runs the controller for every live enemy. A failing enemy is withdrawn
    /// without affecting the others.
    fn decide_enemies(&mut self, tick: u64) {
        self.enemy_intents.clear();
        if self.arena.is_frozen() {
            return;
        }

        let view = WorldView::at_tick(&self.arena, tick);
        let mut ctx = AiContext {
            tick,
            config: &self.config.ai,
            rng: &mut self.rng,
        };
        let mut faults = Vec::new();
        for id in self.arena.enemy_ids() {
            let decision = match self.brains.get_mut(&id) {
                Some(brain) => self.controller.decide(&mut ctx, &view, id, brain),
                None => Err(AiError::MissingBrain { id }),
            };
            match decision {
                Ok(intent) => {
                    self.enemy_intents.insert(id, intent);
                }
                Err(err) => faults.push((id, err)),
            }
        }

        for (id, err) in faults {
            self.withdraw_enemy(id, &err);
        }
    }

    /// Removes a faulted enemy. It yields no score or drop and is counted
    /// as withdrawn, so the wave can still finish without it.
    fn withdraw_enemy(&mut self, id: EntityId, err: &AiError) {
        warn!(%id, error = %err, "enemy controller failed, withdrawing tank");
        self.arena.despawn_tank(id);
        self.brains.remove(&id);
        self.arena.wave_mut().withdrawn += 1;
        self.arena.record(GameEvent::EnemyFaulted {
            id,
            reason: err.to_string(),
        });
    }

    fn log_outcome(&mut self) {
        if self.outcome_logged {
            return;
        }
        if self.is_game_over() {
            self.outcome_logged = true;
            info!(
                level = self.level,
                score = self.total_score(),
                base_destroyed = self.arena.base().destroyed,
                "game over"
            );
        } else if self.is_level_complete() {
            self.outcome_logged = true;
            info!(level = self.level, score = self.total_score(), "level complete");
        }
    }

    // =========================================================================
    // Levels
    // =========================================================================

    /// Starts the next level on `rows`, or on the built-in map.
    ///
    /// Scores carry over, as do the lives and power level of every player
    /// still in play. A player already eliminated stays out. Wave counters,
    /// timers and enemy brains start fresh.
    ///
    /// # Errors
    ///
    /// Returns [`ConfigError`] if the configured cell size cannot build the
    /// new grid; the current level is left untouched.
    pub fn advance_level(&mut self, rows: Option<&[&str]>) -> Result<(), ConfigError> {
        let mut next = match rows {
            Some(rows) => map::load_from_grid(rows, &self.config)?,
            None => map::load_default_map(&self.config)?,
        };

        for slot in PlayerSlot::ALL {
            next.set_score(slot, self.arena.score(slot));
            let carried: Option<PlayerState> = self
                .arena
                .player(slot)
                .and_then(|(_, t)| t.player_state().cloned());
            let Some((id, _)) = next.player(slot) else {
                continue;
            };
            match carried {
                Some(state) => {
                    if let Some(p) = next.tank_mut(id).and_then(|t| t.player_state_mut()) {
                        p.lives = state.lives;
                        p.power_level = state.power_level;
                    }
                }
                None => {
                    next.despawn_tank(id);
                }
            }
        }

        self.arena = next;
        self.level += 1;
        self.brains.clear();
        self.enemy_intents.clear();
        self.outcome_logged = false;
        info!(level = self.level, "level started");
        Ok(())
    }

    // =========================================================================
    // Game-level signals
    // =========================================================================

    /// True once every wave enemy has been deployed and then destroyed or
    /// withdrawn, and none is left on the field.
    #[must_use]
    pub fn is_level_complete(&self) -> bool {
        let wave = self.arena.wave();
        self.arena.live_enemy_count() == 0
            && wave.spawned >= wave.total
            && wave.defeated + wave.withdrawn >= wave.total
    }

    /// True once the base is destroyed or no player is left in play.
    #[must_use]
    pub fn is_game_over(&self) -> bool {
        self.arena.base().destroyed || self.arena.players().next().is_none()
    }

    /// Score of one player.
    #[must_use]
    pub const fn score(&self, slot: PlayerSlot) -> u32 {
        self.arena.score(slot)
    }

    /// Combined score of both players.
    #[must_use]
    pub const fn total_score(&self) -> u32 {
        self.arena
            .score(PlayerSlot::One)
            .saturating_add(self.arena.score(PlayerSlot::Two))
    }

    /// Remaining lives of one player, 0 once eliminated or absent.
    #[must_use]
    pub fn lives(&self, slot: PlayerSlot) -> u32 {
        self.arena
            .player(slot)
            .and_then(|(_, t)| t.player_state())
            .map_or(0, |p| p.lives)
    }

    /// Current level, starting at 1.
    #[must_use]
    pub const fn level(&self) -> u32 {
        self.level
    }

    // =========================================================================
    // Accessors
    // =========================================================================

    /// Returns the current simulation tick.
    #[must_use]
    pub const fn tick(&self) -> u64 {
        self.arena.current_tick()
    }

    /// Returns the master seed.
    #[must_use]
    pub const fn seed(&self) -> u64 {
        self.seed
    }

    /// The active configuration.
    #[must_use]
    pub const fn config(&self) -> &GameConfig {
        &self.config
    }

    /// Read-only view for rendering.
    #[must_use]
    pub const fn view(&self) -> WorldView<'_> {
        WorldView::new(&self.arena)
    }

    /// The arena.
    #[must_use]
    pub const fn arena(&self) -> &Arena {
        &self.arena
    }

    /// Mutable arena, for scenario setup.
    pub fn arena_mut(&mut self) -> &mut Arena {
        &mut self.arena
    }

    /// Controller memory of an enemy.
    #[must_use]
    pub fn brain(&self, id: EntityId) -> Option<&Brain> {
        self.brains.get(&id)
    }

    /// Registers a brain for an enemy placed by hand through
    /// [`arena_mut`](Self::arena_mut).
    pub fn insert_brain(&mut self, id: EntityId, brain: Brain) {
        self.brains.insert(id, brain);
    }

    /// Drains the events recorded since the last call.
    pub fn take_events(&mut self) -> Vec<GameEvent> {
        self.arena.take_events()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::entity::{Direction, Tank};
    use glam::IVec2;

    #[test]
    fn invalid_config_is_rejected() {
        let config = GameConfig {
            powerup_drop_chance: 1.5,
            ..GameConfig::default()
        };
        assert!(Simulation::with_config(config.clone(), 1).is_err());
        assert!(Simulation::from_grid(&["X"], config, 1).is_err());
    }

    #[test]
    fn intent_persists_until_replaced() {
        let mut sim = Simulation::new(1);
        sim.set_intent(PlayerSlot::One, Intent::drive(Direction::Right));
        let (id, start) = sim
            .arena()
            .player(PlayerSlot::One)
            .map(|(id, t)| (id, t.position))
            .unwrap();
        sim.step();
        sim.step();
        assert_eq!(sim.arena().tank(id).unwrap().position, start + IVec2::new(4, 0));
        sim.set_intent(PlayerSlot::One, Intent::IDLE);
        sim.step();
        assert_eq!(sim.arena().tank(id).unwrap().position, start + IVec2::new(4, 0));
        assert_eq!(sim.intent(PlayerSlot::One), Intent::IDLE);
    }

    #[test]
    fn player_fire_respects_cooldown() {
        let rows = ["....", "....", "....", "1..X"];
        let mut sim = Simulation::from_grid(&rows, GameConfig::default(), 1).unwrap();
        sim.arena_mut().wave_mut().total = 0;
        sim.set_intent(
            PlayerSlot::One,
            Intent {
                direction: Some(Direction::Up),
                moving: false,
                wants_to_fire: true,
            },
        );
        sim.step();
        assert_eq!(sim.arena().projectile_count(), 1);
        sim.step();
        assert_eq!(sim.arena().projectile_count(), 1);
    }

    #[test]
    fn first_enemy_gets_a_brain() {
        let mut sim = Simulation::new(3);
        sim.step();
        let enemies = sim.arena().enemy_ids();
        assert_eq!(enemies.len(), 1);
        assert!(sim.brain(enemies[0]).is_some());
    }

    #[test]
    fn game_over_without_players() {
        let mut sim = Simulation::new(3);
        let (id, _) = sim.arena().player(PlayerSlot::One).unwrap();
        sim.arena_mut().despawn_tank(id);
        assert!(sim.is_game_over());
        assert_eq!(sim.lives(PlayerSlot::One), 0);
    }

    #[test]
    fn advance_level_carries_players() {
        let mut sim = Simulation::new(5);
        let (id, _) = sim.arena().player(PlayerSlot::One).unwrap();
        sim.arena_mut().credit(PlayerSlot::One, 1200);
        {
            let tank = sim.arena_mut().tank_mut(id).unwrap();
            let state = tank.player_state_mut().unwrap();
            state.lives = 2;
            state.power_level = 2;
        }
        sim.arena_mut()
            .spawn_tank(Tank::enemy(crate::entity::ArchetypeKind::Basic, IVec2::ZERO, 40, false, 0));

        sim.advance_level(None).unwrap();
        assert_eq!(sim.level(), 2);
        assert_eq!(sim.score(PlayerSlot::One), 1200);
        assert_eq!(sim.lives(PlayerSlot::One), 2);
        let (_, p1) = sim.arena().player(PlayerSlot::One).unwrap();
        assert_eq!(p1.power_level(), 2);
        assert_eq!(sim.arena().live_enemy_count(), 0);
        assert_eq!(sim.arena().wave().spawned, 0);
        assert_eq!(sim.tick(), 0);
    }
}
