//! Pickup resolver: players collecting power-ups.
//!
//! A power-up whose box overlaps a player tank is collected by the first such
//! player in slot order. Collection is worth [`PowerUp::POINTS`] and applies
//! the power-up's effect immediately. The two global effects, freeze and
//! fortify, are exposed as free functions so the director can share the same
//! bookkeeping.

use rubble::{Tile, TileKind};
use tracing::debug;

use crate::arena::Arena;
use crate::entity::{EntityId, PlayerSlot, PowerUp, PowerUpKind, MAX_POWER_LEVEL};
use crate::output::{EffectKind, GameEvent};

use super::{ResolveContext, Resolver};

/// Resolver that hands power-ups to players.
#[derive(Debug, Default)]
pub struct PickupResolver;

impl PickupResolver {
    /// Creates a new pickup resolver.
    #[must_use]
    pub fn new() -> Self {
        Self
    }
}

impl Resolver for PickupResolver {
    fn name(&self) -> &'static str {
        "pickup"
    }

    fn resolve(&self, ctx: &mut ResolveContext<'_>, arena: &mut Arena) {
        let claims: Vec<(EntityId, PowerUp, EntityId, PlayerSlot)> = arena
            .powerups()
            .filter_map(|(pid, powerup)| {
                let bounds = powerup.bounds();
                arena
                    .players()
                    .find(|(_, t)| t.bounds().intersects(&bounds))
                    .and_then(|(tid, t)| t.slot().map(|slot| (pid, powerup.clone(), tid, slot)))
            })
            .collect();

        for (pid, powerup, collector, slot) in claims {
            arena.despawn_powerup(pid);
            arena.credit(slot, PowerUp::POINTS);
            arena.record(GameEvent::PowerUpCollected {
                id: pid,
                kind: powerup.kind,
                by: slot,
            });
            debug!(%slot, kind = ?powerup.kind, "power-up collected");
            apply(ctx, arena, powerup.kind, collector, slot);
        }
    }
}

fn apply(
    ctx: &ResolveContext<'_>,
    arena: &mut Arena,
    kind: PowerUpKind,
    collector: EntityId,
    slot: PlayerSlot,
) {
    let until = ctx.tick + ctx.config.powerup_duration;
    match kind {
        PowerUpKind::Star => {
            if let Some(p) = arena.tank_mut(collector).and_then(|t| t.player_state_mut()) {
                p.power_level = (p.power_level + 1).min(MAX_POWER_LEVEL);
            }
        }
        PowerUpKind::Tank => {
            if let Some(p) = arena.tank_mut(collector).and_then(|t| t.player_state_mut()) {
                p.lives = p.lives.saturating_add(1);
            }
        }
        PowerUpKind::Grenade => detonate(ctx, arena, slot),
        PowerUpKind::Timer => freeze_enemies(arena, until),
        PowerUpKind::Helmet => {
            if let Some(tank) = arena.tank_mut(collector) {
                tank.invulnerable_until = Some(until);
            }
        }
        PowerUpKind::Shovel => fortify_base(arena, until),
    }
}

/// Destroys every enemy on the field on behalf of `slot`. No drops.
fn detonate(ctx: &ResolveContext<'_>, arena: &mut Arena, slot: PlayerSlot) {
    for id in arena.enemy_ids() {
        let Some(tank) = arena.despawn_tank(id) else {
            continue;
        };
        let Some(enemy) = tank.enemy_state() else {
            continue;
        };
        let points = enemy.kind.stats().points;
        arena.credit(slot, points);
        arena.wave_mut().defeated += 1;
        arena.add_effect(
            EffectKind::Explosion,
            tank.center(),
            ctx.config.explosion_lifetime,
        );
        arena.record(GameEvent::EnemyDestroyed {
            id,
            kind: enemy.kind,
            by: Some(slot),
            points,
        });
    }
}

/// Freezes every enemy until `until`. A later expiry extends a running
/// freeze; an earlier one never shortens it.
pub fn freeze_enemies(arena: &mut Arena, until: u64) {
    let until = arena.timers().freeze_until.map_or(until, |t| t.max(until));
    arena.timers_mut().freeze_until = Some(until);
    for (_, tank) in arena.tanks_mut() {
        if tank.is_enemy() {
            tank.frozen = true;
            tank.moving = false;
        }
    }
    arena.record(GameEvent::FreezeStarted { until });
    debug!(until, "enemies frozen");
}

/// Turns the walls around the base into fresh steel until `until`. A later
/// expiry extends a running fortification.
pub fn fortify_base(arena: &mut Arena, until: u64) {
    let until = arena.timers().fortify_until.map_or(until, |t| t.max(until));
    arena.timers_mut().fortify_until = Some(until);
    for cell in arena.fortify_cells() {
        arena.grid_mut().set(cell, Tile::new(TileKind::Steel));
    }
    arena.record(GameEvent::FortifyStarted { until });
    debug!(until, "base fortified");
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::GameConfig;
    use crate::entity::{ArchetypeKind, Tank};
    use glam::IVec2;
    use rand::SeedableRng;
    use rand_chacha::ChaCha8Rng;
    use rubble::{TileCoord, TileGrid};

    fn arena_with_player() -> (Arena, EntityId) {
        let mut arena = Arena::new(TileGrid::new(8, 8, 40).unwrap(), TileCoord::new(4, 7));
        let id = arena.spawn_tank(Tank::player(PlayerSlot::One, IVec2::new(80, 80), 40, 3, 30));
        (arena, id)
    }

    fn drop_on_player(arena: &mut Arena, kind: PowerUpKind) {
        arena.spawn_powerup(PowerUp::centered_on(IVec2::new(100, 100), kind));
    }

    fn run(arena: &mut Arena, tick: u64) {
        let config = GameConfig::default();
        let mut rng = ChaCha8Rng::seed_from_u64(0);
        let mut ctx = ResolveContext {
            tick,
            config: &config,
            rng: &mut rng,
        };
        PickupResolver::new().resolve(&mut ctx, arena);
    }

    mod collection_tests {
        use super::*;

        #[test]
        fn overlap_collects_and_scores() {
            let (mut arena, _) = arena_with_player();
            drop_on_player(&mut arena, PowerUpKind::Tank);
            run(&mut arena, 0);
            assert_eq!(arena.powerups().count(), 0);
            assert_eq!(arena.score(PlayerSlot::One), 500);
        }

        #[test]
        fn distant_power_up_stays() {
            let (mut arena, _) = arena_with_player();
            arena.spawn_powerup(PowerUp::centered_on(IVec2::new(250, 250), PowerUpKind::Star));
            run(&mut arena, 0);
            assert_eq!(arena.powerups().count(), 1);
            assert_eq!(arena.score(PlayerSlot::One), 0);
        }

        #[test]
        fn player_one_wins_ties() {
            let (mut arena, _) = arena_with_player();
            arena.spawn_tank(Tank::player(PlayerSlot::Two, IVec2::new(110, 80), 40, 3, 30));
            arena.spawn_powerup(PowerUp::centered_on(IVec2::new(120, 100), PowerUpKind::Star));
            run(&mut arena, 0);
            assert_eq!(arena.score(PlayerSlot::One), 500);
            assert_eq!(arena.score(PlayerSlot::Two), 0);
        }

        #[test]
        fn enemies_do_not_collect() {
            let mut arena = Arena::new(TileGrid::new(8, 8, 40).unwrap(), TileCoord::new(4, 7));
            arena.spawn_tank(Tank::enemy(ArchetypeKind::Basic, IVec2::new(80, 80), 40, false, 0));
            drop_on_player(&mut arena, PowerUpKind::Star);
            run(&mut arena, 0);
            assert_eq!(arena.powerups().count(), 1);
        }
    }

    mod effect_tests {
        use super::*;

        #[test]
        fn star_caps_at_max_power() {
            let (mut arena, id) = arena_with_player();
            for _ in 0..5 {
                drop_on_player(&mut arena, PowerUpKind::Star);
                run(&mut arena, 0);
            }
            assert_eq!(arena.tank(id).unwrap().power_level(), MAX_POWER_LEVEL);
        }

        #[test]
        fn tank_adds_life() {
            let (mut arena, id) = arena_with_player();
            drop_on_player(&mut arena, PowerUpKind::Tank);
            run(&mut arena, 0);
            assert_eq!(arena.tank(id).unwrap().player_state().unwrap().lives, 4);
        }

        #[test]
        fn grenade_clears_enemies_without_drops() {
            let (mut arena, _) = arena_with_player();
            arena.spawn_tank(Tank::enemy(ArchetypeKind::Armor, IVec2::new(200, 0), 40, true, 999));
            arena.spawn_tank(Tank::enemy(ArchetypeKind::Basic, IVec2::new(0, 200), 40, false, 0));
            drop_on_player(&mut arena, PowerUpKind::Grenade);
            run(&mut arena, 0);
            assert_eq!(arena.live_enemy_count(), 0);
            assert_eq!(arena.wave().defeated, 2);
            assert_eq!(arena.score(PlayerSlot::One), 500 + 400 + 100);
            assert_eq!(arena.effects().len(), 2);
            assert_eq!(arena.powerups().count(), 0);
        }

        #[test]
        fn timer_freezes_and_extends() {
            let (mut arena, _) = arena_with_player();
            let enemy = arena.spawn_tank(Tank::enemy(ArchetypeKind::Fast, IVec2::new(200, 0), 40, false, 0));
            drop_on_player(&mut arena, PowerUpKind::Timer);
            run(&mut arena, 10);
            assert_eq!(arena.timers().freeze_until, Some(910));
            let tank = arena.tank(enemy).unwrap();
            assert!(tank.frozen && !tank.moving);

            drop_on_player(&mut arena, PowerUpKind::Timer);
            run(&mut arena, 100);
            assert_eq!(arena.timers().freeze_until, Some(1000));
        }

        #[test]
        fn helmet_grants_invulnerability() {
            let (mut arena, id) = arena_with_player();
            drop_on_player(&mut arena, PowerUpKind::Helmet);
            run(&mut arena, 20);
            let tank = arena.tank(id).unwrap();
            assert!(tank.is_invulnerable(919));
            assert!(!tank.is_invulnerable(920));
        }

        #[test]
        fn shovel_fortifies_with_fresh_steel() {
            let (mut arena, _) = arena_with_player();
            drop_on_player(&mut arena, PowerUpKind::Shovel);
            run(&mut arena, 0);
            assert_eq!(arena.timers().fortify_until, Some(900));
            for cell in arena.fortify_cells() {
                let tile = arena.grid().get(cell).unwrap();
                assert_eq!(tile.kind(), TileKind::Steel);
                assert_eq!(tile.remaining_sections(), 4);
            }
        }
    }

    #[test]
    fn fortify_never_shortens() {
        let (mut arena, _) = arena_with_player();
        fortify_base(&mut arena, 500);
        fortify_base(&mut arena, 300);
        assert_eq!(arena.timers().fortify_until, Some(500));
    }
}
