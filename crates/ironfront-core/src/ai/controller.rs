//! The stock enemy controller.

use glam::IVec2;
use rand::distributions::{Distribution, WeightedIndex};
use rand::seq::SliceRandom;
use rand::Rng;
use rubble::TileGrid;

use crate::entity::{Direction, EntityId, Intent, Tank};
use crate::world_view::WorldView;

use super::pathing::{approach, plan_path};
use super::{AiContext, AiError, AiState, Brain, Controller};

/// Controller driving every enemy tank with the three-state behaviour.
///
/// Per decision:
///
/// 1. Redraw the state from the archetype weights when due.
/// 2. Push the position onto the trail; a stuck tank is turned towards the
///    first clear heading and skips normal steering this tick.
/// 3. Otherwise steer by state: random turns on patrol, direct approach or
///    waypoints towards the nearest player or the base.
/// 4. Decide whether to fire. Lining up with the target in clear sight turns
///    the tank to face it and uses the state's high fire chance.
#[derive(Debug, Default)]
pub struct EnemyController;

impl EnemyController {
    /// Creates the controller.
    #[must_use]
    pub fn new() -> Self {
        Self
    }
}

impl Controller for EnemyController {
    fn decide(
        &self,
        ctx: &mut AiContext<'_>,
        view: &WorldView<'_>,
        id: EntityId,
        brain: &mut Brain,
    ) -> Result<Intent, AiError> {
        let tank = view.tank(id).ok_or(AiError::NotAnEnemy { id })?;
        let enemy = tank.enemy_state().ok_or(AiError::NotAnEnemy { id })?;
        let config = ctx.config;

        if brain.evaluation_due(ctx.tick) {
            if let Ok(weights) = WeightedIndex::new(enemy.kind.stats().state_weights) {
                brain.set_state(AiState::ALL[weights.sample(ctx.rng)]);
            }
            brain.schedule_evaluation(ctx.tick + config.state_interval);
        }

        let center = tank.center();
        let player = view.nearest_player(center).map(|(_, c)| c);
        if brain.state() == AiState::ChasePlayer && player.is_none() {
            brain.set_state(AiState::Patrol);
        }
        let aim = match brain.state() {
            AiState::Patrol => None,
            AiState::ChasePlayer => player,
            AiState::AssaultBase => Some(view.base_rect().center()),
        };

        brain.record_position(tank.position, config.stuck_window);
        let mut direction = if tank.moving && brain.is_stuck(config.stuck_window, config.stuck_threshold)
        {
            brain.reset_trail();
            brain.clear_path();
            unstick(ctx, view.grid(), id, tank)?
        } else if let Some(target) = aim {
            steer(ctx, view.grid(), brain, tank, target)
        } else {
            patrol(ctx, brain, tank)
        };

        let lined_up = aim.and_then(|target| line_up(view.grid(), center, target, tank.size));
        let chance = match (brain.state(), lined_up) {
            (AiState::Patrol, _) => config.patrol_fire_chance,
            (state, Some(facing)) => {
                direction = facing;
                if state == AiState::AssaultBase {
                    config.assault_fire_chance
                } else {
                    config.chase_fire_chance
                }
            }
            (_, None) => config.unaligned_fire_chance,
        };

        let armed = !tank.frozen && !tank.is_invulnerable(ctx.tick) && tank.can_fire(ctx.tick);
        let intent = Intent::drive(direction);
        if armed && ctx.rng.gen_bool(chance) {
            Ok(intent.firing())
        } else {
            Ok(intent)
        }
    }
}

/// Heading for a stuck tank.
///
/// Clear non-reverse headings come first, in random order, then a clear
/// reverse, then any non-reverse heading.
fn unstick(
    ctx: &mut AiContext<'_>,
    grid: &TileGrid,
    id: EntityId,
    tank: &Tank,
) -> Result<Direction, AiError> {
    let lookahead = ctx.config.lookahead;
    let bounds = tank.bounds();
    let clear = |d: Direction| !grid.blocks_rect(bounds.translated(d.delta() * lookahead));

    let reverse = tank.direction.opposite();
    let mut options: Vec<Direction> = Direction::ALL
        .into_iter()
        .filter(|d| *d != reverse)
        .collect();
    options.shuffle(ctx.rng);

    if let Some(d) = options.iter().copied().find(|d| clear(*d)) {
        return Ok(d);
    }
    if clear(reverse) {
        return Ok(reverse);
    }
    options.choose(ctx.rng).copied().ok_or(AiError::NoDirection { id })
}

fn patrol(ctx: &mut AiContext<'_>, brain: &mut Brain, tank: &Tank) -> Direction {
    if !brain.turn_due(ctx.tick) {
        return tank.direction;
    }
    brain.schedule_turn(ctx.tick + ctx.config.patrol_turn_interval);
    Direction::ALL.choose(ctx.rng).copied().unwrap_or(tank.direction)
}

/// Direct approach when close, waypoints otherwise.
fn steer(
    ctx: &AiContext<'_>,
    grid: &TileGrid,
    brain: &mut Brain,
    tank: &Tank,
    target: IVec2,
) -> Direction {
    let config = ctx.config;
    let center = tank.center();
    let goal = if center.as_vec2().distance(target.as_vec2()) <= config.close_distance {
        brain.clear_path();
        target
    } else {
        if brain.needs_path(ctx.tick, config.path_max_age) {
            brain.set_path(plan_path(grid, center, target), ctx.tick);
        }
        brain
            .next_waypoint(center, config.waypoint_radius)
            .unwrap_or(target)
    };
    approach(center, goal, config.align_tolerance).unwrap_or(tank.direction)
}

/// Heading that faces `target` along a row or column with nothing in the way.
fn line_up(grid: &TileGrid, from: IVec2, target: IVec2, size: i32) -> Option<Direction> {
    let half = size / 2;
    let offset = target - from;
    if offset.x.abs() < half && offset.y != 0 {
        let sight = IVec2::new(from.x, target.y);
        grid.line_of_sight(from, sight)
            .then_some(if offset.y < 0 { Direction::Up } else { Direction::Down })
    } else if offset.y.abs() < half && offset.x != 0 {
        let sight = IVec2::new(target.x, from.y);
        grid.line_of_sight(from, sight)
            .then_some(if offset.x < 0 { Direction::Left } else { Direction::Right })
    } else {
        None
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::arena::Arena;
    use crate::config::AiConfig;
    use crate::entity::{ArchetypeKind, PlayerSlot};
    use rand::SeedableRng;
    use rand_chacha::ChaCha8Rng;
    use rubble::{Tile, TileCoord, TileKind};

    fn arena() -> Arena {
        Arena::new(TileGrid::new(8, 8, 40).unwrap(), TileCoord::new(4, 7))
    }

    fn enemy(arena: &mut Arena, pos: IVec2, direction: Direction) -> EntityId {
        let mut tank = Tank::enemy(ArchetypeKind::Basic, pos, 40, false, 0);
        tank.direction = direction;
        arena.spawn_tank(tank)
    }

    fn decide_with(
        config: &AiConfig,
        arena: &Arena,
        id: EntityId,
        brain: &mut Brain,
        tick: u64,
    ) -> Result<Intent, AiError> {
        let mut rng = ChaCha8Rng::seed_from_u64(tick);
        let mut ctx = AiContext {
            tick,
            config,
            rng: &mut rng,
        };
        EnemyController::new().decide(&mut ctx, &WorldView::at_tick(arena, tick), id, brain)
    }

    fn locked(state: AiState) -> Brain {
        let mut brain = Brain::new(0);
        brain.set_state(state);
        brain.schedule_evaluation(10_000);
        brain
    }

    fn stuck_brain(pos: IVec2) -> Brain {
        let mut brain = locked(AiState::Patrol);
        brain.schedule_turn(10_000);
        for _ in 0..30 {
            brain.record_position(pos, 30);
        }
        brain
    }

    mod fault_tests {
        use super::*;

        #[test]
        fn players_and_missing_tanks_are_rejected() {
            let mut arena = arena();
            let player = arena.spawn_tank(Tank::player(PlayerSlot::One, IVec2::ZERO, 40, 3, 30));
            let config = AiConfig::default();
            let mut brain = Brain::new(0);
            assert_eq!(
                decide_with(&config, &arena, player, &mut brain, 0),
                Err(AiError::NotAnEnemy { id: player })
            );
            let ghost = EntityId::new(77);
            assert_eq!(
                decide_with(&config, &arena, ghost, &mut brain, 0),
                Err(AiError::NotAnEnemy { id: ghost })
            );
        }
    }

    mod state_tests {
        use super::*;

        #[test]
        fn every_state_gets_drawn() {
            let mut arena = arena();
            let id = enemy(&mut arena, IVec2::new(120, 0), Direction::Down);
            arena.spawn_tank(Tank::player(PlayerSlot::One, IVec2::new(0, 240), 40, 3, 30));
            let config = AiConfig::default();
            let mut seen = Vec::new();
            for tick in 0..200 {
                let mut brain = Brain::new(0);
                decide_with(&config, &arena, id, &mut brain, tick).unwrap();
                if !seen.contains(&brain.state()) {
                    seen.push(brain.state());
                }
            }
            assert_eq!(seen.len(), 3);
        }

        #[test]
        fn chase_without_players_patrols() {
            let mut arena = arena();
            let id = enemy(&mut arena, IVec2::new(120, 0), Direction::Down);
            let mut brain = locked(AiState::ChasePlayer);
            decide_with(&AiConfig::default(), &arena, id, &mut brain, 0).unwrap();
            assert_eq!(brain.state(), AiState::Patrol);
        }

        #[test]
        fn patrol_turn_is_scheduled() {
            let mut arena = arena();
            let id = enemy(&mut arena, IVec2::new(120, 0), Direction::Down);
            let mut brain = locked(AiState::Patrol);
            let intent = decide_with(&AiConfig::default(), &arena, id, &mut brain, 0).unwrap();
            assert!(intent.moving && intent.direction.is_some());
            assert!(!brain.turn_due(119));
            assert!(brain.turn_due(120));
        }
    }

    mod stuck_tests {
        use super::*;

        #[test]
        fn stuck_tank_takes_only_clear_side() {
            let mut arena = arena();
            arena.grid_mut().set(TileCoord::new(0, 1), Tile::new(TileKind::Steel));
            let id = enemy(&mut arena, IVec2::ZERO, Direction::Down);
            let mut brain = stuck_brain(IVec2::ZERO);
            let intent = decide_with(&AiConfig::default(), &arena, id, &mut brain, 5).unwrap();
            assert_eq!(intent.direction, Some(Direction::Right));
            assert_eq!(brain.trail_len(), 0);
        }

        #[test]
        fn reverse_when_nothing_else_is_clear() {
            let mut arena = arena();
            arena.grid_mut().set(TileCoord::new(0, 1), Tile::new(TileKind::Water));
            let id = enemy(&mut arena, IVec2::ZERO, Direction::Left);
            let mut brain = stuck_brain(IVec2::ZERO);
            let intent = decide_with(&AiConfig::default(), &arena, id, &mut brain, 5).unwrap();
            assert_eq!(intent.direction, Some(Direction::Right));
        }

        #[test]
        fn boxed_in_still_turns() {
            let mut arena = arena();
            arena.grid_mut().set(TileCoord::new(0, 1), Tile::new(TileKind::Steel));
            arena.grid_mut().set(TileCoord::new(1, 0), Tile::new(TileKind::Steel));
            let id = enemy(&mut arena, IVec2::ZERO, Direction::Left);
            let mut brain = stuck_brain(IVec2::ZERO);
            let intent = decide_with(&AiConfig::default(), &arena, id, &mut brain, 5).unwrap();
            assert_ne!(intent.direction, Some(Direction::Right));
        }
    }

    mod fire_tests {
        use super::*;

        fn trigger_happy() -> AiConfig {
            AiConfig {
                chase_fire_chance: 1.0,
                assault_fire_chance: 1.0,
                unaligned_fire_chance: 0.0,
                patrol_fire_chance: 0.0,
                ..AiConfig::default()
            }
        }

        #[test]
        fn lined_up_chaser_faces_and_fires() {
            let mut arena = arena();
            let id = enemy(&mut arena, IVec2::new(120, 200), Direction::Down);
            arena.spawn_tank(Tank::player(PlayerSlot::One, IVec2::new(122, 0), 40, 3, 30));
            let mut brain = locked(AiState::ChasePlayer);
            let intent = decide_with(&trigger_happy(), &arena, id, &mut brain, 0).unwrap();
            assert_eq!(intent.direction, Some(Direction::Up));
            assert!(intent.wants_to_fire);
        }

        #[test]
        fn wall_in_between_holds_fire() {
            let mut arena = arena();
            arena.grid_mut().set(TileCoord::new(3, 2), Tile::new(TileKind::Brick));
            let id = enemy(&mut arena, IVec2::new(120, 200), Direction::Down);
            arena.spawn_tank(Tank::player(PlayerSlot::One, IVec2::new(120, 0), 40, 3, 30));
            let mut brain = locked(AiState::ChasePlayer);
            let intent = decide_with(&trigger_happy(), &arena, id, &mut brain, 0).unwrap();
            assert!(!intent.wants_to_fire);
        }

        #[test]
        fn invulnerable_or_frozen_never_fires() {
            let mut arena = arena();
            let shielded = arena.spawn_tank(Tank::enemy(ArchetypeKind::Basic, IVec2::new(120, 200), 40, false, 50));
            arena.spawn_tank(Tank::player(PlayerSlot::One, IVec2::new(120, 0), 40, 3, 30));
            let mut brain = locked(AiState::ChasePlayer);
            let intent = decide_with(&trigger_happy(), &arena, shielded, &mut brain, 0).unwrap();
            assert!(!intent.wants_to_fire);

            arena.tank_mut(shielded).unwrap().frozen = true;
            let intent = decide_with(&trigger_happy(), &arena, shielded, &mut brain, 60).unwrap();
            assert!(!intent.wants_to_fire);
        }

        #[test]
        fn assault_targets_base() {
            let mut arena = arena();
            let id = enemy(&mut arena, IVec2::new(160, 0), Direction::Left);
            let mut brain = locked(AiState::AssaultBase);
            let intent = decide_with(&trigger_happy(), &arena, id, &mut brain, 0).unwrap();
            assert_eq!(intent.direction, Some(Direction::Down));
            assert!(intent.wants_to_fire);
        }
    }

    #[test]
    fn line_up_needs_half_a_tank() {
        let grid = TileGrid::new(8, 8, 40).unwrap();
        let from = IVec2::new(100, 100);
        assert_eq!(line_up(&grid, from, IVec2::new(119, 20), 40), Some(Direction::Up));
        assert_eq!(line_up(&grid, from, IVec2::new(120, 20), 40), None);
        assert_eq!(line_up(&grid, from, IVec2::new(20, 85), 40), Some(Direction::Left));
    }
}
