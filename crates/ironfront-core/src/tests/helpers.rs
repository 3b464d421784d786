//! Scenario setup for simulation-level tests.

use glam::IVec2;

use crate::ai::Brain;
use crate::config::GameConfig;
use crate::entity::{ArchetypeKind, Direction, EntityId, Intent, PlayerSlot, Projectile, Side, Tank};
use crate::simulation::Simulation;

/// Open 10×10 field: player 1 bottom-left, base bottom-right, no walls.
pub const OPEN_FIELD: [&str; 10] = [
    "..........",
    "..........",
    "..........",
    "..........",
    "..........",
    "..........",
    "..........",
    "..........",
    "..........",
    "1........X",
];

/// A simulation on [`OPEN_FIELD`] whose director never spawns.
pub fn quiet_sim(seed: u64) -> Simulation {
    let mut sim = Simulation::from_grid(&OPEN_FIELD, GameConfig::default(), seed)
        .expect("default config is valid");
    sim.arena_mut().wave_mut().total = 0;
    sim
}

/// Places a vulnerable enemy at `position` with a fresh brain and counts it
/// as spawned and pending in the wave.
pub fn place_enemy(sim: &mut Simulation, kind: ArchetypeKind, position: IVec2) -> EntityId {
    let size = sim.config().tank_size;
    let tick = sim.tick();
    let id = sim
        .arena_mut()
        .spawn_tank(Tank::enemy(kind, position, size, false, 0));
    let wave = sim.arena_mut().wave_mut();
    wave.total += 1;
    wave.spawned += 1;
    sim.insert_brain(id, Brain::new(tick));
    id
}

/// Id of player 1.
pub fn player_one(sim: &Simulation) -> EntityId {
    sim.arena()
        .player(PlayerSlot::One)
        .map(|(id, _)| id)
        .expect("player one is in play")
}

/// A power 0 player shell.
pub fn shell(owner: EntityId, center: IVec2, direction: Direction) -> Projectile {
    Projectile {
        center,
        direction,
        speed: 3,
        power: 0,
        owner,
        side: Side::Player,
    }
}

/// Player intents that cycle through every heading, turning every `period`
/// ticks and firing on every other turn.
pub fn scripted_intent(tick: u64, period: u64) -> Intent {
    const HEADINGS: [Direction; 4] = [
        Direction::Up,
        Direction::Right,
        Direction::Down,
        Direction::Left,
    ];
    let turn = tick / period;
    let heading = HEADINGS[usize::try_from(turn % 4).unwrap_or(0)];
    let intent = Intent::drive(heading);
    if turn % 2 == 0 {
        intent.firing()
    } else {
        intent
    }
}

/// Runs `ticks` steps.
pub fn run(sim: &mut Simulation, ticks: u64) {
    for _ in 0..ticks {
        sim.step();
    }
}
