//! Spawn and power-up director.
//!
//! The director owns the parts of a tick that are driven by the clock rather
//! than by actors:
//!
//! - [`expire_timers`] ends freezes, fortifications and helmets whose expiry
//!   tick has arrived.
//! - [`try_spawn_enemy`] brings the next wave enemy onto the field once the
//!   wave, the on-screen cap and the spawn delay all allow it.
//!
//! Power-up drops themselves happen where enemies die; see
//! [`CasualtyResolver`](crate::resolver::CasualtyResolver).
//!
//! # Example
//!
//! ```
//! use ironfront_core::config::GameConfig;
//! use ironfront_core::director;
//! use ironfront_core::map;
//! use ironfront_core::resolver::ResolveContext;
//! use rand::SeedableRng;
//! use rand_chacha::ChaCha8Rng;
//!
//! let config = GameConfig::default();
//! let mut arena = map::load_default_map(&config).unwrap();
//! let mut rng = ChaCha8Rng::seed_from_u64(9);
//! let mut ctx = ResolveContext { tick: 0, config: &config, rng: &mut rng };
//!
//! let first = director::try_spawn_enemy(&mut ctx, &mut arena);
//! assert!(first.is_some());
//! // The spawn delay holds back the next one.
//! assert!(director::try_spawn_enemy(&mut ctx, &mut arena).is_none());
//! ```

use rand::distributions::{Distribution, WeightedIndex};
use rand::seq::SliceRandom;
use rand::Rng;
use rubble::{Rect, Tile, TileKind};
use tracing::{debug, info};

use crate::arena::Arena;
use crate::entity::{ArchetypeKind, EntityId, Tank};
use crate::output::GameEvent;
use crate::resolver::ResolveContext;

// =============================================================================
// Timed effects
// =============================================================================

/// Ends every timed effect whose expiry tick is `tick` or earlier.
///
/// - Freeze: enemies thaw and start moving again.
/// - Fortify: the fortify cells become fresh brick, whatever state the steel
///   was left in.
/// - Helmet: player invulnerability is cleared.
///
/// Enemy spawn invulnerability is compared against the tick wherever it is
/// read and needs no expiry here.
pub fn expire_timers(arena: &mut Arena, tick: u64) {
    if arena.timers().freeze_until.is_some_and(|until| tick >= until) {
        arena.timers_mut().freeze_until = None;
        for (_, tank) in arena.tanks_mut() {
            if tank.is_enemy() {
                tank.frozen = false;
                tank.moving = true;
            }
        }
        arena.record(GameEvent::FreezeEnded);
        debug!(tick, "freeze ended");
    }

    if arena.timers().fortify_until.is_some_and(|until| tick >= until) {
        arena.timers_mut().fortify_until = None;
        for cell in arena.fortify_cells() {
            arena.grid_mut().set(cell, Tile::new(TileKind::Brick));
        }
        arena.record(GameEvent::FortifyEnded);
        debug!(tick, "fortification ended");
    }

    for (_, tank) in arena.tanks_mut() {
        if !tank.is_enemy() && tank.invulnerable_until.is_some_and(|until| tick >= until) {
            tank.invulnerable_until = None;
        }
    }
}

// =============================================================================
// Enemy spawns
// =============================================================================

/// True when the wave, the on-screen cap and the spawn delay all allow a new
/// enemy at `ctx.tick`.
#[must_use]
pub fn spawn_allowed(ctx: &ResolveContext<'_>, arena: &Arena) -> bool {
    let wave = arena.wave();
    let delay_over = wave
        .last_spawn
        .map_or(true, |last| ctx.tick.saturating_sub(last) >= ctx.config.enemy_spawn_delay);
    wave.spawned < wave.total
        && arena.live_enemy_count() < ctx.config.max_enemies_on_screen
        && delay_over
}

/// Spawns the next wave enemy if allowed. Returns its id.
///
/// A random spawn point is drawn; if its footprint (a cell or the tank,
/// whichever is larger) touches a tank, blocking terrain or a shell, nothing
/// spawns and the attempt is repeated on
/// a later tick.
pub fn try_spawn_enemy(ctx: &mut ResolveContext<'_>, arena: &mut Arena) -> Option<EntityId> {
    if !spawn_allowed(ctx, arena) {
        return None;
    }
    let point = *arena.enemy_spawns().choose(ctx.rng)?;
    let footprint = Rect::square(point, ctx.config.tank_size.max(ctx.config.cell_size));
    if !footprint_clear(arena, &footprint) {
        debug!(x = point.x, y = point.y, "spawn point occupied");
        return None;
    }

    let index = arena.wave().spawned;
    let progress = f64::from(index) / f64::from(arena.wave().total.max(1));
    let kind = choose_archetype(ctx.rng, progress);
    let flashing = ctx.config.flashing_spawn_indices.contains(&index);

    let mut tank = Tank::enemy(
        kind,
        point,
        ctx.config.tank_size,
        flashing,
        ctx.tick + ctx.config.enemy_invulnerability,
    );
    if arena.is_frozen() {
        tank.frozen = true;
        tank.moving = false;
    }
    let id = arena.spawn_tank(tank);

    let wave = arena.wave_mut();
    wave.spawned += 1;
    wave.last_spawn = Some(ctx.tick);
    if wave.spawned == wave.total {
        info!(total = wave.total, "last wave enemy deployed");
    }
    arena.record(GameEvent::EnemySpawned {
        id,
        kind,
        flashing,
        position: point,
    });
    debug!(%id, ?kind, flashing, "enemy spawned");
    Some(id)
}

fn footprint_clear(arena: &Arena, footprint: &Rect) -> bool {
    !arena.tank_overlaps(footprint, None)
        && !arena.grid().blocks_rect(*footprint)
        && !arena
            .projectiles()
            .any(|(_, p)| p.bounds().intersects(footprint))
}

/// Weighted archetype draw at wave progress `progress` (0..=1).
pub fn choose_archetype<R: Rng + ?Sized>(rng: &mut R, progress: f64) -> ArchetypeKind {
    let weights = ArchetypeKind::ALL.map(|k| k.spawn_weight(progress));
    WeightedIndex::new(weights)
        .map_or(ArchetypeKind::Basic, |dist| ArchetypeKind::ALL[dist.sample(rng)])
}
