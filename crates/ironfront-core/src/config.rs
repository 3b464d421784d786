//! Game configuration.
//!
//! Every timing value is a tick count. The simulation runs at
//! [`TICKS_PER_SECOND`]; converting from wall-clock units is a presentation
//! concern, done once here with [`ticks_from_millis`].
//!
//! Configs deserialize with `#[serde(default)]`, so a partial JSON document
//! only overrides the fields it names:
//!
//! ```
//! use ironfront_core::config::GameConfig;
//!
//! let config: GameConfig = serde_json::from_str(r#"{ "two_player": true }"#).unwrap();
//! assert!(config.two_player);
//! assert_eq!(config.enemies_per_wave, 20);
//! assert!(config.validate().is_ok());
//! ```

use serde::{Deserialize, Serialize};

use crate::error::ConfigError;

/// Fixed simulation rate.
pub const TICKS_PER_SECOND: u64 = 60;

/// Converts milliseconds to whole ticks, rounding down.
#[must_use]
pub const fn ticks_from_millis(ms: u64) -> u64 {
    ms * TICKS_PER_SECOND / 1000
}

// =============================================================================
// GameConfig
// =============================================================================

/// Tunable parameters for one game.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct GameConfig {
    /// Side of one grid cell in pixels.
    pub cell_size: i32,
    /// Side of a tank in pixels.
    pub tank_size: i32,
    /// Spawn a second player.
    pub two_player: bool,
    /// Lives each player starts with.
    pub player_lives: u32,
    /// Ticks between two player shots.
    pub player_fire_cooldown: u64,
    /// Enemies in one wave.
    pub enemies_per_wave: u32,
    /// Cap on simultaneously live enemies.
    pub max_enemies_on_screen: usize,
    /// Minimum ticks between two enemy spawns.
    pub enemy_spawn_delay: u64,
    /// Ticks a fresh enemy ignores damage.
    pub enemy_invulnerability: u64,
    /// Ticks freeze, fortify and helmet last.
    pub powerup_duration: u64,
    /// Chance that a destroyed non-flashing enemy drops a power-up.
    pub powerup_drop_chance: f64,
    /// Zero-based spawn indices that produce flashing enemies.
    pub flashing_spawn_indices: Vec<u32>,
    /// Enemy spawn points a map must offer; corners fill any shortfall.
    pub min_enemy_spawn_points: usize,
    /// Per-axis distance under which opposing projectiles annihilate.
    pub projectile_collision_radius: i32,
    /// Seam bleed distance for brick damage.
    pub border_bleed: i32,
    /// Lifetime of a full explosion effect.
    pub explosion_lifetime: u32,
    /// Lifetime of the spark left by annihilating projectiles.
    pub small_explosion_lifetime: u32,
    /// Enemy controller tuning.
    pub ai: AiConfig,
}

impl Default for GameConfig {
    fn default() -> Self {
        Self {
            cell_size: 40,
            tank_size: 40,
            two_player: false,
            player_lives: 3,
            player_fire_cooldown: ticks_from_millis(500),
            enemies_per_wave: 20,
            max_enemies_on_screen: 4,
            enemy_spawn_delay: ticks_from_millis(3000),
            enemy_invulnerability: ticks_from_millis(2000),
            powerup_duration: ticks_from_millis(15_000),
            powerup_drop_chance: 0.2,
            flashing_spawn_indices: vec![3, 10, 17],
            min_enemy_spawn_points: 4,
            projectile_collision_radius: 10,
            border_bleed: rubble::DEFAULT_BORDER_BLEED,
            explosion_lifetime: 15,
            small_explosion_lifetime: 10,
            ai: AiConfig::default(),
        }
    }
}

impl GameConfig {
    /// Checks every field for values the simulation cannot run with.
    ///
    /// # Errors
    ///
    /// Returns the first [`ConfigError`] found.
    pub fn validate(&self) -> Result<(), ConfigError> {
        positive("cell_size", i64::from(self.cell_size))?;
        positive("tank_size", i64::from(self.tank_size))?;
        positive("enemies_per_wave", i64::from(self.enemies_per_wave))?;
        positive(
            "max_enemies_on_screen",
            i64::try_from(self.max_enemies_on_screen).unwrap_or(i64::MAX),
        )?;
        positive(
            "projectile_collision_radius",
            i64::from(self.projectile_collision_radius),
        )?;
        if self.cell_size % 2 != 0 {
            return Err(rubble::GridError::InvalidCellSize(self.cell_size).into());
        }
        non_zero("player_fire_cooldown", self.player_fire_cooldown)?;
        non_zero("powerup_duration", self.powerup_duration)?;
        non_zero("explosion_lifetime", u64::from(self.explosion_lifetime))?;
        non_zero(
            "small_explosion_lifetime",
            u64::from(self.small_explosion_lifetime),
        )?;
        probability("powerup_drop_chance", self.powerup_drop_chance)?;
        self.ai.validate()
    }
}

// =============================================================================
// AiConfig
// =============================================================================

/// Enemy controller tuning. Distances are pixels, intervals are ticks.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct AiConfig {
    /// Ticks between behaviour-state draws.
    pub state_interval: u64,
    /// Ticks between random turns while patrolling.
    pub patrol_turn_interval: u64,
    /// Length of the position history used for stuck detection.
    pub stuck_window: usize,
    /// Net displacement over the window below which a tank counts as stuck.
    pub stuck_threshold: i32,
    /// How far ahead a candidate direction is probed when unsticking.
    pub lookahead: i32,
    /// Centre distance under which a chasing tank drives straight at its target.
    pub close_distance: f32,
    /// Axis offset treated as already aligned while approaching.
    pub align_tolerance: i32,
    /// Distance at which a waypoint counts as reached.
    pub waypoint_radius: i32,
    /// Ticks after which a waypoint path is replanned.
    pub path_max_age: u64,
    /// Per-tick fire chance while patrolling.
    pub patrol_fire_chance: f64,
    /// Per-tick fire chance while chasing or assaulting without a clear shot.
    pub unaligned_fire_chance: f64,
    /// Per-tick fire chance with a clear shot at a player.
    pub chase_fire_chance: f64,
    /// Per-tick fire chance with a clear shot at the base.
    pub assault_fire_chance: f64,
}

impl Default for AiConfig {
    fn default() -> Self {
        Self {
            state_interval: ticks_from_millis(5000),
            patrol_turn_interval: ticks_from_millis(2000),
            stuck_window: 30,
            stuck_threshold: 4,
            lookahead: 40,
            close_distance: 120.0,
            align_tolerance: 4,
            waypoint_radius: 8,
            path_max_age: ticks_from_millis(4000),
            patrol_fire_chance: 0.02,
            unaligned_fire_chance: 0.05,
            chase_fire_chance: 0.8,
            assault_fire_chance: 0.9,
        }
    }
}

impl AiConfig {
    fn validate(&self) -> Result<(), ConfigError> {
        non_zero("ai.state_interval", self.state_interval)?;
        non_zero("ai.patrol_turn_interval", self.patrol_turn_interval)?;
        non_zero("ai.path_max_age", self.path_max_age)?;
        positive(
            "ai.stuck_window",
            i64::try_from(self.stuck_window).unwrap_or(i64::MAX),
        )?;
        positive("ai.lookahead", i64::from(self.lookahead))?;
        probability("ai.patrol_fire_chance", self.patrol_fire_chance)?;
        probability("ai.unaligned_fire_chance", self.unaligned_fire_chance)?;
        probability("ai.chase_fire_chance", self.chase_fire_chance)?;
        probability("ai.assault_fire_chance", self.assault_fire_chance)
    }
}

fn positive(field: &'static str, value: i64) -> Result<(), ConfigError> {
    if value > 0 {
        Ok(())
    } else {
        Err(ConfigError::NonPositive { field, value })
    }
}

fn non_zero(field: &'static str, ticks: u64) -> Result<(), ConfigError> {
    if ticks == 0 {
        Err(ConfigError::ZeroDuration { field })
    } else {
        Ok(())
    }
}

fn probability(field: &'static str, value: f64) -> Result<(), ConfigError> {
    if (0.0..=1.0).contains(&value) {
        Ok(())
    } else {
        Err(ConfigError::InvalidProbability { field, value })
    }
}
