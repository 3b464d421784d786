//! Tanks and their pilot-specific state.

use glam::IVec2;
use rubble::Rect;
use serde::{Deserialize, Serialize};

use super::archetype::{ArchetypeKind, PLAYER_STATS};
use super::projectile::Projectile;
use super::{Direction, EntityId, PlayerSlot, Side};

/// Highest player power level reachable through power-ups.
pub const MAX_POWER_LEVEL: u8 = 3;

const SLIDE_GAIN: f32 = 0.1;
const SLIDE_DECAY: f32 = 0.05;
const SLIDE_BOOST: f32 = 0.5;

// =============================================================================
// Pilot
// =============================================================================

/// State carried only by player tanks.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct PlayerState {
    /// Controlling seat.
    pub slot: PlayerSlot,
    /// Remaining lives, including the current one.
    pub lives: u32,
    /// Shell power, 0..=[`MAX_POWER_LEVEL`].
    pub power_level: u8,
    /// Respawn location.
    pub spawn: IVec2,
}

/// State carried only by enemy tanks.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct EnemyState {
    /// Archetype the tank was spawned as.
    pub kind: ArchetypeKind,
    /// Flashing tanks always drop a power-up.
    pub flashing: bool,
    /// Player whose shell dealt the lethal hit.
    pub killed_by: Option<PlayerSlot>,
}

/// Who drives a tank.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub enum Pilot {
    /// Human seat.
    Player(PlayerState),
    /// Enemy controller.
    Enemy(EnemyState),
}

// =============================================================================
// Tank
// =============================================================================

/// A tank. Position is the top-left pixel of its square footprint.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Tank {
    /// Top-left pixel.
    pub position: IVec2,
    /// Facing; also the direction of travel and fire.
    pub direction: Direction,
    /// Whether the tank advances this tick.
    pub moving: bool,
    /// Base pixels per tick.
    pub speed: i32,
    /// Pixels per tick of fired shells.
    pub bullet_speed: i32,
    /// Current health; the tank dies at zero.
    pub health: i32,
    /// Health restored on respawn.
    pub max_health: i32,
    /// Side of the square footprint.
    pub size: i32,
    /// Ice momentum, 0.0..=1.0.
    pub slide_factor: f32,
    /// True while any ice momentum remains.
    pub sliding: bool,
    /// Tick at which damage immunity ends.
    pub invulnerable_until: Option<u64>,
    /// Set while a freeze is active; intents are ignored.
    pub frozen: bool,
    /// Ticks between shots.
    pub fire_cooldown: u64,
    /// First tick at which the tank may fire again.
    pub fire_ready_at: u64,
    /// Driver.
    pub pilot: Pilot,
}

impl Tank {
    /// Creates a player tank at its spawn point, facing up and idle.
    #[must_use]
    pub fn player(slot: PlayerSlot, spawn: IVec2, size: i32, lives: u32, fire_cooldown: u64) -> Self {
        Self {
            position: spawn,
            direction: Direction::Up,
            moving: false,
            speed: PLAYER_STATS.speed,
            bullet_speed: PLAYER_STATS.bullet_speed,
            health: PLAYER_STATS.health,
            max_health: PLAYER_STATS.health,
            size,
            slide_factor: 0.0,
            sliding: false,
            invulnerable_until: None,
            frozen: false,
            fire_cooldown,
            fire_ready_at: 0,
            pilot: Pilot::Player(PlayerState {
                slot,
                lives,
                power_level: 0,
                spawn,
            }),
        }
    }

    /// Creates an enemy tank heading down, immune to damage until
    /// `invulnerable_until`.
    #[must_use]
    pub fn enemy(
        kind: ArchetypeKind,
        position: IVec2,
        size: i32,
        flashing: bool,
        invulnerable_until: u64,
    ) -> Self {
        let stats = kind.stats();
        Self {
            position,
            direction: Direction::Down,
            moving: true,
            speed: stats.speed,
            bullet_speed: stats.bullet_speed,
            health: stats.health,
            max_health: stats.health,
            size,
            slide_factor: 0.0,
            sliding: false,
            invulnerable_until: Some(invulnerable_until),
            frozen: false,
            fire_cooldown: stats.fire_cooldown,
            fire_ready_at: 0,
            pilot: Pilot::Enemy(EnemyState {
                kind,
                flashing,
                killed_by: None,
            }),
        }
    }

    /// Footprint rectangle.
    #[must_use]
    pub const fn bounds(&self) -> Rect {
        Rect::square(self.position, self.size)
    }

    /// Centre pixel of the footprint.
    #[must_use]
    pub const fn center(&self) -> IVec2 {
        self.bounds().center()
    }

    /// Allegiance.
    #[must_use]
    pub const fn side(&self) -> Side {
        match self.pilot {
            Pilot::Player(_) => Side::Player,
            Pilot::Enemy(_) => Side::Enemy,
        }
    }

    /// True for AI-driven tanks.
    #[must_use]
    pub const fn is_enemy(&self) -> bool {
        matches!(self.pilot, Pilot::Enemy(_))
    }

    /// Player state, if this is a player tank.
    #[must_use]
    pub const fn player_state(&self) -> Option<&PlayerState> {
        match &self.pilot {
            Pilot::Player(p) => Some(p),
            Pilot::Enemy(_) => None,
        }
    }

    /// Mutable player state, if this is a player tank.
    pub fn player_state_mut(&mut self) -> Option<&mut PlayerState> {
        match &mut self.pilot {
            Pilot::Player(p) => Some(p),
            Pilot::Enemy(_) => None,
        }
    }

    /// Enemy state, if this is an enemy tank.
    #[must_use]
    pub const fn enemy_state(&self) -> Option<&EnemyState> {
        match &self.pilot {
            Pilot::Enemy(e) => Some(e),
            Pilot::Player(_) => None,
        }
    }

    /// Mutable enemy state, if this is an enemy tank.
    pub fn enemy_state_mut(&mut self) -> Option<&mut EnemyState> {
        match &mut self.pilot {
            Pilot::Enemy(e) => Some(e),
            Pilot::Player(_) => None,
        }
    }

    /// Controlling seat of a player tank.
    #[must_use]
    pub fn slot(&self) -> Option<PlayerSlot> {
        self.player_state().map(|p| p.slot)
    }

    /// Power of shells this tank fires. Enemies always fire at power 0.
    #[must_use]
    pub fn power_level(&self) -> u8 {
        self.player_state().map_or(0, |p| p.power_level)
    }

    /// True while damage is ignored.
    #[must_use]
    pub fn is_invulnerable(&self, now: u64) -> bool {
        self.invulnerable_until.is_some_and(|until| now < until)
    }

    /// True once health has run out.
    #[must_use]
    pub const fn is_dead(&self) -> bool {
        self.health <= 0
    }

    /// Sets facing and the moving flag. Ignored while frozen; a `None`
    /// direction keeps the current facing.
    pub fn try_set_intent(&mut self, direction: Option<Direction>, moving: bool) {
        if self.frozen {
            return;
        }
        if let Some(direction) = direction {
            self.direction = direction;
        }
        self.moving = moving;
    }

    /// True if the cooldown has elapsed at `now`.
    #[must_use]
    pub const fn can_fire(&self, now: u64) -> bool {
        now >= self.fire_ready_at
    }

    /// Fires a shell from just beyond the front edge, or returns `None` while
    /// the cooldown is running.
    ///
    /// The shell never overlaps the shooter's own footprint and never flies
    /// slower than the shooter's [`top_speed`](Self::top_speed), so a tank
    /// driving after its own shot cannot catch it.
    pub fn fire(&mut self, owner: EntityId, now: u64) -> Option<Projectile> {
        if !self.can_fire(now) {
            return None;
        }
        self.fire_ready_at = now + self.fire_cooldown;

        let half_shell = Projectile::SIZE / 2;
        let c = self.center();
        let b = self.bounds();
        let muzzle = match self.direction {
            Direction::Up => IVec2::new(c.x, b.y() - half_shell),
            Direction::Down => IVec2::new(c.x, b.bottom() + half_shell),
            Direction::Left => IVec2::new(b.x() - half_shell, c.y),
            Direction::Right => IVec2::new(b.right() + half_shell, c.y),
        };
        Some(Projectile {
            center: muzzle,
            direction: self.direction,
            speed: self.bullet_speed.max(self.top_speed()),
            power: self.power_level(),
            owner,
            side: self.side(),
        })
    }

    /// Fastest the tank can ever move: its speed at full ice momentum.
    #[must_use]
    pub fn top_speed(&self) -> i32 {
        #[allow(clippy::cast_precision_loss, clippy::cast_possible_truncation)]
        let top = (self.speed as f32 * (1.0 + SLIDE_BOOST)) as i32;
        top
    }

    /// Subtracts `amount` from health. Returns true if this hit was lethal.
    pub fn take_damage(&mut self, amount: i32) -> bool {
        let was_alive = !self.is_dead();
        self.health -= amount;
        was_alive && self.is_dead()
    }

    /// Updates ice momentum for one tick of movement.
    pub fn update_slide(&mut self, on_ice: bool) {
        if on_ice {
            self.slide_factor = (self.slide_factor + SLIDE_GAIN).min(1.0);
            self.sliding = true;
        } else if self.sliding {
            self.slide_factor = (self.slide_factor - SLIDE_DECAY).max(0.0);
            if self.slide_factor <= 0.0 {
                self.sliding = false;
            }
        }
    }

    /// Pixels travelled this tick, boosted by ice momentum.
    #[must_use]
    pub fn effective_speed(&self) -> i32 {
        if self.sliding {
            #[allow(clippy::cast_precision_loss, clippy::cast_possible_truncation)]
            let boosted = (self.speed as f32 * (1.0 + SLIDE_BOOST * self.slide_factor)) as i32;
            boosted
        } else {
            self.speed
        }
    }

    /// Clears ice momentum.
    pub fn reset_slide(&mut self) {
        self.slide_factor = 0.0;
        self.sliding = false;
    }

    /// Spends a life after a lethal hit. Returns true when no lives remain.
    ///
    /// A surviving player is put back on its spawn point with full health,
    /// power level 0, no momentum and a ready gun. Enemies are unaffected.
    pub fn lose_life(&mut self) -> bool {
        let max_health = self.max_health;
        let Some(player) = self.player_state_mut() else {
            return false;
        };
        player.lives = player.lives.saturating_sub(1);
        player.power_level = 0;
        if player.lives == 0 {
            return true;
        }
        let spawn = player.spawn;
        self.position = spawn;
        self.direction = Direction::Up;
        self.moving = false;
        self.health = max_health;
        self.fire_ready_at = 0;
        self.reset_slide();
        false
    }
}
