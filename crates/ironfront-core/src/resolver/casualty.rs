//! Casualty resolver: clears destroyed enemies off the field.
//!
//! Runs after combat so a tank killed this tick is removed before pickups.
//! Every dead enemy is despawned, counted towards the wave, scored to the
//! player whose shell killed it and replaced by an explosion. Flashing tanks
//! always leave a power-up behind; others do so with
//! [`GameConfig::powerup_drop_chance`](crate::config::GameConfig::powerup_drop_chance).

use rand::Rng;
use tracing::debug;

use crate::arena::Arena;
use crate::entity::{PowerUp, PowerUpKind};
use crate::output::{EffectKind, GameEvent};

use super::{ResolveContext, Resolver};

/// Resolver that removes dead enemies and drops their power-ups.
#[derive(Debug, Default)]
pub struct CasualtyResolver;

impl CasualtyResolver {
    /// Creates a new casualty resolver.
    #[must_use]
    pub fn new() -> Self {
        Self
    }
}

impl Resolver for CasualtyResolver {
    fn name(&self) -> &'static str {
        "casualty"
    }

    fn resolve(&self, ctx: &mut ResolveContext<'_>, arena: &mut Arena) {
        let dead: Vec<_> = arena
            .tanks()
            .filter(|(_, t)| t.is_enemy() && t.is_dead())
            .map(|(id, _)| id)
            .collect();

        for id in dead {
            let Some(tank) = arena.despawn_tank(id) else {
                continue;
            };
            let Some(enemy) = tank.enemy_state() else {
                continue;
            };
            let points = enemy.kind.stats().points;

            arena.wave_mut().defeated += 1;
            if let Some(slot) = enemy.killed_by {
                arena.credit(slot, points);
            }
            arena.add_effect(
                EffectKind::Explosion,
                tank.center(),
                ctx.config.explosion_lifetime,
            );
            arena.record(GameEvent::EnemyDestroyed {
                id,
                kind: enemy.kind,
                by: enemy.killed_by,
                points,
            });
            debug!(%id, kind = ?enemy.kind, by = ?enemy.killed_by, "enemy destroyed");

            if enemy.flashing || ctx.rng.gen_bool(ctx.config.powerup_drop_chance) {
                let kind = PowerUpKind::random(ctx.rng);
                let powerup = PowerUp::centered_on(tank.center(), kind);
                let position = powerup.position;
                let pid = arena.spawn_powerup(powerup);
                arena.record(GameEvent::PowerUpSpawned {
                    id: pid,
                    kind,
                    position,
                });
            }
        }
    }
}
