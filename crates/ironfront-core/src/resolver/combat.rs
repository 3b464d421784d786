//! Combat resolver: projectile flight and impacts.
//!
//! One pass per tick, in three stages:
//!
//! 1. **Flight**: every shell advances by its speed; shells whose centre
//!    leaves the world are removed.
//! 2. **Annihilation**: shells travelling in exactly opposite directions whose
//!    centres are closer than the collision radius on both axes destroy each
//!    other. Pairs are formed greedily in id order, so a shell takes part in
//!    at most one annihilation, and each pair leaves one small explosion.
//! 3. **Impacts**: each surviving shell is checked, in priority order, against
//!    brick and steel walls, enemy tanks, player tanks and the base. The first
//!    stage that consumes the shell ends its checks.
//!
//! Brick yields to every shell but only stops power 0 and 1; stronger shells
//! punch through and keep flying. Steel stops every shell and only loses a
//! section to power 3.

use std::collections::BTreeSet;

use rubble::{Sections, TileCoord, TileKind};
use tracing::{debug, info};

use crate::arena::Arena;
use crate::entity::{EntityId, PlayerSlot, Projectile, Tank};
use crate::output::{EffectKind, GameEvent};

use super::{ResolveContext, Resolver};

/// Resolver that flies projectiles and applies their hits.
#[derive(Debug, Default)]
pub struct CombatResolver;

impl CombatResolver {
    /// Creates a new combat resolver.
    #[must_use]
    pub fn new() -> Self {
        Self
    }
}

impl Resolver for CombatResolver {
    fn name(&self) -> &'static str {
        "combat"
    }

    fn resolve(&self, ctx: &mut ResolveContext<'_>, arena: &mut Arena) {
        fly(arena);
        annihilate(ctx, arena);

        let mut consumed = BTreeSet::new();
        let shells: Vec<(EntityId, Projectile)> =
            arena.projectiles().map(|(id, p)| (id, p.clone())).collect();
        for (id, shell) in shells {
            if strike_terrain(arena, &shell)
                || strike_enemy(ctx, arena, &shell)
                || strike_player(ctx, arena, &shell)
                || strike_base(ctx, arena, &shell)
            {
                consumed.insert(id);
            }
        }
        for id in consumed {
            arena.despawn_projectile(id);
        }
    }
}

// =============================================================================
// Stages
// =============================================================================

fn fly(arena: &mut Arena) {
    let world = arena.world_size();
    let mut gone = Vec::new();
    for (id, shell) in arena.projectiles_mut() {
        shell.advance();
        if !shell.in_world(world) {
            gone.push(id);
        }
    }
    for id in gone {
        arena.despawn_projectile(id);
    }
}

fn annihilate(ctx: &ResolveContext<'_>, arena: &mut Arena) {
    let radius = ctx.config.projectile_collision_radius;
    let shells: Vec<(EntityId, Projectile)> =
        arena.projectiles().map(|(id, p)| (id, p.clone())).collect();
    let mut gone = BTreeSet::new();

    for (i, (a_id, a)) in shells.iter().enumerate() {
        if gone.contains(a_id) {
            continue;
        }
        let partner = shells[i + 1..].iter().find(|(b_id, b)| {
            !gone.contains(b_id)
                && a.direction == b.direction.opposite()
                && (a.center.x - b.center.x).abs() < radius
                && (a.center.y - b.center.y).abs() < radius
        });
        if let Some((b_id, b)) = partner {
            let at = (a.center + b.center) / 2;
            gone.insert(*a_id);
            gone.insert(*b_id);
            arena.add_effect(
                EffectKind::SmallExplosion,
                at,
                ctx.config.small_explosion_lifetime,
            );
            arena.record(GameEvent::ProjectilesCollided {
                first: *a_id,
                second: *b_id,
                at,
            });
        }
    }

    for id in gone {
        arena.despawn_projectile(id);
    }
}

/// Returns true if a wall stopped the shell.
fn strike_terrain(arena: &mut Arena, shell: &Projectile) -> bool {
    let hitbox = shell.bounds();
    let cells: Vec<TileCoord> = arena.grid().cells_in_rect(hitbox).collect();

    for coord in cells {
        let grid = arena.grid();
        let Some(tile) = grid.get(coord) else {
            continue;
        };
        let kind = tile.kind();
        if !kind.is_destructible() {
            continue;
        }
        let struck = Sections::QUADRANTS
            .into_iter()
            .filter(|s| tile.is_intact(*s))
            .map(|s| grid.section_rect(coord, s))
            .find(|r| r.intersects(&hitbox));
        let Some(section) = struck else {
            continue;
        };

        let impact = section.clamp_point(shell.center);
        if arena.grid_mut().apply_damage(coord, impact, shell.power) {
            arena.record(GameEvent::TileDestroyed { coord });
        }
        match kind {
            TileKind::Brick if shell.power >= 2 => {}
            _ => return true,
        }
    }
    false
}

fn shooter_slot(arena: &Arena, shell: &Projectile) -> Option<PlayerSlot> {
    arena.tank(shell.owner).and_then(Tank::slot)
}

/// Returns true if the shell hit an enemy tank.
fn strike_enemy(ctx: &ResolveContext<'_>, arena: &mut Arena, shell: &Projectile) -> bool {
    let hitbox = shell.bounds();
    let target = arena
        .tanks()
        .find(|(_, t)| t.is_enemy() && !t.is_dead() && t.bounds().intersects(&hitbox))
        .map(|(id, _)| id);
    let Some(target) = target else {
        return false;
    };

    let shooter = shooter_slot(arena, shell);
    if let Some(tank) = arena.tank_mut(target) {
        if tank.is_invulnerable(ctx.tick) {
            return true;
        }
        if tank.take_damage(shell.damage()) {
            if let Some(enemy) = tank.enemy_state_mut() {
                enemy.killed_by = shooter;
            }
        }
    }
    true
}

/// Returns true if the shell hit a player tank.
fn strike_player(ctx: &ResolveContext<'_>, arena: &mut Arena, shell: &Projectile) -> bool {
    let hitbox = shell.bounds();
    let target = arena
        .players()
        .find(|(_, t)| t.bounds().intersects(&hitbox))
        .map(|(id, _)| id);
    let Some(target) = target else {
        return false;
    };
    let Some(tank) = arena.tank_mut(target) else {
        return false;
    };
    let Some(slot) = tank.slot() else {
        return false;
    };
    if tank.is_invulnerable(ctx.tick) {
        return true;
    }

    let damage = shell.damage();
    let lethal = tank.take_damage(damage);
    let wreck = tank.center();
    let eliminated = lethal && tank.lose_life();
    let lives_left = tank.player_state().map_or(0, |p| p.lives);

    arena.record(GameEvent::PlayerHit { slot, damage });
    if !lethal {
        return true;
    }
    arena.add_effect(EffectKind::Explosion, wreck, ctx.config.explosion_lifetime);
    if eliminated {
        arena.despawn_tank(target);
        arena.record(GameEvent::PlayerEliminated { slot });
        info!(%slot, "player eliminated");
    } else {
        arena.record(GameEvent::PlayerLifeLost { slot, lives_left });
        debug!(%slot, lives_left, "player lost a life");
    }
    true
}

/// Returns true if the shell hit the base.
fn strike_base(ctx: &ResolveContext<'_>, arena: &mut Arena, shell: &Projectile) -> bool {
    let base = arena.base_rect();
    if !base.intersects(&shell.bounds()) {
        return false;
    }
    if !arena.base().destroyed {
        arena.base_mut().destroyed = true;
        let lifetime = ctx.config.explosion_lifetime;
        arena.add_effect(EffectKind::Explosion, base.min, lifetime);
        arena.add_effect(EffectKind::Explosion, base.center(), lifetime);
        arena.record(GameEvent::BaseDestroyed);
        info!(cell = %arena.base().cell, "base destroyed");
    }
    true
}
