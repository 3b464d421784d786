//! Whole-tick scenarios driven through `Simulation::step`.

use std::collections::BTreeMap;

use glam::IVec2;
use proptest::prelude::*;

use crate::ai::{AiContext, AiError, Brain, Controller, EnemyController};
use crate::config::GameConfig;
use crate::entity::{ArchetypeKind, Direction, EntityId, Intent, PlayerSlot, Tank};
use crate::output::{EffectKind, GameEvent};
use crate::resolver::freeze_enemies;
use crate::simulation::Simulation;
use crate::world_view::WorldView;

use super::helpers::{place_enemy, player_one, quiet_sim, scripted_intent, shell};

// =============================================================================
// Movement
// =============================================================================

#[test]
fn steps_never_move_diagonally() {
    let config = GameConfig {
        two_player: true,
        ..GameConfig::default()
    };
    let mut sim = Simulation::with_config(config, 9).unwrap();

    for _ in 0..1500 {
        let tick = sim.tick();
        sim.set_intent(PlayerSlot::One, scripted_intent(tick, 37));
        sim.set_intent(PlayerSlot::Two, scripted_intent(tick, 23));

        let before: BTreeMap<EntityId, IVec2> =
            sim.arena().tanks().map(|(id, t)| (id, t.position)).collect();
        sim.step();

        let respawned: Vec<PlayerSlot> = sim
            .take_events()
            .into_iter()
            .filter_map(|e| match e {
                GameEvent::PlayerLifeLost { slot, .. } => Some(slot),
                _ => None,
            })
            .collect();
        for (id, tank) in sim.arena().tanks() {
            if tank.slot().is_some_and(|s| respawned.contains(&s)) {
                continue;
            }
            if let Some(old) = before.get(&id) {
                let delta = tank.position - *old;
                assert!(
                    delta.x == 0 || delta.y == 0,
                    "tank {id} moved diagonally by {delta} at tick {tick}"
                );
            }
        }
    }
}

fn intent_strategy() -> impl Strategy<Value = Vec<(usize, bool, bool)>> {
    prop::collection::vec((0..5usize, any::<bool>(), any::<bool>()), 1..60)
}

proptest! {
    #![proptest_config(ProptestConfig::with_cases(32))]

    #[test]
    fn random_driving_stays_on_one_axis(script in intent_strategy()) {
        let mut sim = quiet_sim(10);
        let id = player_one(&sim);
        for (heading, moving, firing) in script {
            sim.set_intent(
                PlayerSlot::One,
                Intent {
                    direction: Direction::ALL.get(heading).copied(),
                    moving,
                    wants_to_fire: firing,
                },
            );
            for _ in 0..4 {
                let before = sim.arena().tank(id).unwrap().position;
                sim.step();
                let delta = sim.arena().tank(id).unwrap().position - before;
                prop_assert!(delta.x == 0 || delta.y == 0, "diagonal step {}", delta);
            }
        }
    }
}

// =============================================================================
// Combat
// =============================================================================

#[test]
fn opposite_shells_vanish_together() {
    let mut sim = quiet_sim(1);
    let owner = player_one(&sim);
    sim.arena_mut()
        .spawn_projectile(shell(owner, IVec2::new(200, 100), Direction::Right));
    sim.arena_mut()
        .spawn_projectile(shell(owner, IVec2::new(206, 100), Direction::Left));

    sim.step();

    assert_eq!(sim.arena().projectile_count(), 0);
    let sparks = sim
        .arena()
        .effects()
        .iter()
        .filter(|e| e.kind == EffectKind::SmallExplosion)
        .count();
    assert_eq!(sparks, 1);
    let collisions = sim
        .take_events()
        .into_iter()
        .filter(|e| matches!(e, GameEvent::ProjectilesCollided { .. }))
        .count();
    assert_eq!(collisions, 1);
}

#[test]
fn player_shot_destroys_enemy_and_scores() {
    let mut sim = quiet_sim(2);
    let enemy = place_enemy(&mut sim, ArchetypeKind::Basic, IVec2::new(0, 120));
    freeze_enemies(sim.arena_mut(), 10_000);
    sim.set_intent(
        PlayerSlot::One,
        Intent {
            direction: Some(Direction::Up),
            moving: false,
            wants_to_fire: true,
        },
    );

    let mut events = Vec::new();
    for _ in 0..100 {
        sim.step();
        events.extend(sim.take_events());
    }

    assert!(sim.arena().tank(enemy).is_none());
    assert_eq!(sim.score(PlayerSlot::One), 100);
    assert_eq!(sim.arena().wave().defeated, 1);
    assert!(events.iter().any(|e| matches!(
        e,
        GameEvent::EnemyDestroyed { id, by: Some(PlayerSlot::One), .. } if *id == enemy
    )));
    assert!(sim.is_level_complete());
}

#[test]
fn shell_on_base_ends_the_game() {
    let mut sim = quiet_sim(3);
    let owner = player_one(&sim);
    sim.arena_mut()
        .spawn_projectile(shell(owner, IVec2::new(380, 365), Direction::Down));

    sim.step();

    assert!(sim.arena().base().destroyed);
    assert!(sim.is_game_over());
    assert!(sim.take_events().contains(&GameEvent::BaseDestroyed));
}

// =============================================================================
// Level signals
// =============================================================================

#[test]
fn live_enemy_blocks_level_complete() {
    let mut sim = quiet_sim(4);
    let enemy = place_enemy(&mut sim, ArchetypeKind::Fast, IVec2::new(200, 0));
    sim.arena_mut().wave_mut().defeated = 1;
    assert_eq!(sim.arena().wave().defeated, sim.arena().wave().total);

    assert!(!sim.is_level_complete());

    sim.arena_mut().despawn_tank(enemy);
    assert!(sim.is_level_complete());
}

// =============================================================================
// Timed effects
// =============================================================================

#[test]
fn freeze_stops_and_releases_every_enemy() {
    let mut sim = quiet_sim(5);
    let ids = [
        place_enemy(&mut sim, ArchetypeKind::Basic, IVec2::new(0, 0)),
        place_enemy(&mut sim, ArchetypeKind::Fast, IVec2::new(160, 0)),
        place_enemy(&mut sim, ArchetypeKind::Power, IVec2::new(320, 0)),
    ];
    sim.step();

    let until = sim.tick() + 60;
    freeze_enemies(sim.arena_mut(), until);
    for id in ids {
        assert!(!sim.arena().tank(id).unwrap().moving);
    }

    let frozen_at: Vec<IVec2> = ids
        .iter()
        .map(|id| sim.arena().tank(*id).unwrap().position)
        .collect();
    while sim.tick() < until {
        sim.step();
        for (id, pos) in ids.iter().zip(&frozen_at) {
            let tank = sim.arena().tank(*id).unwrap();
            assert!(!tank.moving);
            assert_eq!(tank.position, *pos);
        }
    }

    sim.step();
    assert!(!sim.arena().is_frozen());
    for id in ids {
        assert!(sim.arena().tank(id).unwrap().moving);
    }
}

// =============================================================================
// Enemy controller faults
// =============================================================================

/// Fails for one enemy, defers to the stock controller for the rest.
struct Saboteur {
    target: EntityId,
    inner: EnemyController,
}

impl Controller for Saboteur {
    fn decide(
        &self,
        ctx: &mut AiContext<'_>,
        view: &WorldView<'_>,
        id: EntityId,
        brain: &mut Brain,
    ) -> Result<Intent, AiError> {
        if id == self.target {
            return Err(AiError::NoDirection { id });
        }
        self.inner.decide(ctx, view, id, brain)
    }
}

#[test]
fn faulty_decision_withdraws_only_that_enemy() {
    let mut sim = quiet_sim(6);
    let a = place_enemy(&mut sim, ArchetypeKind::Basic, IVec2::new(0, 0));
    let b = place_enemy(&mut sim, ArchetypeKind::Basic, IVec2::new(160, 0));
    let c = place_enemy(&mut sim, ArchetypeKind::Basic, IVec2::new(320, 0));
    sim.set_controller(Box::new(Saboteur {
        target: b,
        inner: EnemyController::new(),
    }));

    sim.step();

    assert!(sim.arena().tank(a).is_some());
    assert!(sim.arena().tank(b).is_none());
    assert!(sim.arena().tank(c).is_some());
    assert!(sim.brain(a).is_some());
    assert!(sim.brain(b).is_none());
    assert_eq!(sim.arena().wave().total, 3);
    assert_eq!(sim.arena().wave().withdrawn, 1);
    assert_eq!(sim.arena().wave().defeated, 0);
    assert_eq!(sim.score(PlayerSlot::One), 0);

    let faults: Vec<EntityId> = sim
        .take_events()
        .into_iter()
        .filter_map(|e| match e {
            GameEvent::EnemyFaulted { id, .. } => Some(id),
            _ => None,
        })
        .collect();
    assert_eq!(faults, vec![b]);
}

#[test]
fn enemy_without_brain_is_withdrawn() {
    let mut sim = quiet_sim(7);
    let stray = sim
        .arena_mut()
        .spawn_tank(Tank::enemy(ArchetypeKind::Armor, IVec2::new(200, 0), 40, false, 0));

    sim.step();

    assert!(sim.arena().tank(stray).is_none());
    let reason = sim.take_events().into_iter().find_map(|e| match e {
        GameEvent::EnemyFaulted { id, reason } if id == stray => Some(reason),
        _ => None,
    });
    assert_eq!(reason.as_deref(), Some(format!("enemy {stray} has no brain").as_str()));
}

#[test]
fn level_completes_after_mid_wave_withdrawal() {
    let mut sim = quiet_sim(8);
    sim.arena_mut().wave_mut().total = 2;
    let stray = sim
        .arena_mut()
        .spawn_tank(Tank::enemy(ArchetypeKind::Basic, IVec2::new(200, 200), 40, false, 0));
    sim.arena_mut().wave_mut().spawned = 1;

    sim.step();
    assert!(sim.arena().tank(stray).is_none());
    assert_eq!(sim.arena().wave().withdrawn, 1);
    assert!(!sim.is_level_complete());

    let mut last = None;
    for _ in 0..600 {
        if let Some(id) = sim.arena().enemy_ids().first().copied() {
            last = Some(id);
            break;
        }
        sim.step();
    }
    let last = last.expect("the director deploys the rest of the wave");
    assert_eq!(sim.arena().wave().spawned, 2);

    sim.arena_mut().tank_mut(last).unwrap().health = 0;
    sim.step();

    let wave = sim.arena().wave();
    assert_eq!((wave.defeated, wave.withdrawn, wave.total), (1, 1, 2));
    assert!(sim.is_level_complete());
}

// =============================================================================
// Shooting while driving
// =============================================================================

/// Drives every enemy down, firing whenever the cooldown allows.
struct Charger;

impl Controller for Charger {
    fn decide(
        &self,
        _ctx: &mut AiContext<'_>,
        _view: &WorldView<'_>,
        _id: EntityId,
        _brain: &mut Brain,
    ) -> Result<Intent, AiError> {
        Ok(Intent::drive(Direction::Down).firing())
    }
}

#[test]
fn fast_tank_never_runs_into_its_own_shell() {
    let mut sim = quiet_sim(9);
    let racer = place_enemy(&mut sim, ArchetypeKind::Fast, IVec2::new(160, 0));
    sim.set_controller(Box::new(Charger));

    let mut shots = 0;
    for _ in 0..200 {
        let before = sim.arena().projectile_count();
        sim.step();
        shots += usize::from(sim.arena().projectile_count() > before);
        assert!(sim.arena().tank(racer).is_some());
        assert!(!sim
            .take_events()
            .iter()
            .any(|e| matches!(e, GameEvent::EnemyDestroyed { .. })));
    }
    assert!(shots > 0);
    assert_eq!(sim.arena().wave().defeated, 0);
}

// =============================================================================
// Director
// =============================================================================

#[test]
fn director_respects_cap_and_footprint() {
    let mut sim = Simulation::new(11);
    let cap = sim.config().max_enemies_on_screen;

    for _ in 0..3000 {
        sim.step();
        assert!(sim.arena().live_enemy_count() <= cap);
        let wave = sim.arena().wave();
        assert!(wave.spawned <= wave.total);

        for event in sim.take_events() {
            let GameEvent::EnemySpawned { id, position, .. } = event else {
                continue;
            };
            let fresh = sim.arena().tank(id).unwrap();
            assert_eq!(fresh.position, position);
            assert!(!sim.arena().tank_overlaps(&fresh.bounds(), Some(id)));
            assert!(!sim.arena().grid().blocks_rect(fresh.bounds()));
        }
    }
    assert!(sim.arena().wave().spawned > 0);
}
