//! End-of-run report printed as JSON.

use std::collections::BTreeMap;

use ironfront_core::{GameEvent, PlayerSlot, Simulation};
use serde::Serialize;

/// How the run ended.
#[derive(Debug, Copy, Clone, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum Outcome {
    /// The tick budget ran out first.
    Running,
    /// Every wave enemy was destroyed.
    LevelComplete,
    /// The base fell or no player is left.
    GameOver,
}

impl Outcome {
    /// Classifies the current state of `sim`.
    pub fn of(sim: &Simulation) -> Self {
        if sim.is_game_over() {
            Self::GameOver
        } else if sim.is_level_complete() {
            Self::LevelComplete
        } else {
            Self::Running
        }
    }
}

/// One player's standing.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct PlayerSummary {
    /// Seat.
    pub slot: PlayerSlot,
    /// Points scored.
    pub score: u32,
    /// Lives left, 0 once eliminated.
    pub lives: u32,
    /// Current power level, absent once eliminated.
    pub power_level: Option<u8>,
}

/// Wave progress.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct WaveSummary {
    /// Enemies in the wave.
    pub total: u32,
    /// Enemies deployed.
    pub spawned: u32,
    /// Enemies destroyed.
    pub defeated: u32,
    /// Enemies withdrawn after a controller fault.
    pub withdrawn: u32,
    /// Enemies on the field.
    pub alive: usize,
}

/// Counts events by name over a run.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
#[serde(transparent)]
pub struct EventTally(BTreeMap<&'static str, u32>);

impl EventTally {
    /// Adds a batch of events.
    pub fn add(&mut self, events: &[GameEvent]) {
        for event in events {
            *self.0.entry(event.name()).or_insert(0) += 1;
        }
    }

    /// Count for one event name.
    pub fn count(&self, name: &str) -> u32 {
        self.0.get(name).copied().unwrap_or(0)
    }
}

/// Everything the runner reports.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct RunSummary {
    /// Master seed.
    pub seed: u64,
    /// Level reached.
    pub level: u32,
    /// Ticks simulated.
    pub ticks: u64,
    /// How the run ended.
    pub outcome: Outcome,
    /// Combined score.
    pub total_score: u32,
    /// Players that took part.
    pub players: Vec<PlayerSummary>,
    /// Wave progress.
    pub enemies: WaveSummary,
    /// Whether the base fell.
    pub base_destroyed: bool,
    /// Events seen, by name.
    pub events: EventTally,
}

impl RunSummary {
    /// Captures the state of `sim` after a run.
    pub fn capture(sim: &Simulation, slots: &[PlayerSlot], events: EventTally) -> Self {
        let arena = sim.arena();
        let wave = arena.wave();
        let players = slots
            .iter()
            .map(|&slot| PlayerSummary {
                slot,
                score: sim.score(slot),
                lives: sim.lives(slot),
                power_level: arena.player(slot).map(|(_, t)| t.power_level()),
            })
            .collect();
        Self {
            seed: sim.seed(),
            level: sim.level(),
            ticks: sim.tick(),
            outcome: Outcome::of(sim),
            total_score: sim.total_score(),
            players,
            enemies: WaveSummary {
                total: wave.total,
                spawned: wave.spawned,
                defeated: wave.defeated,
                withdrawn: wave.withdrawn,
                alive: arena.live_enemy_count(),
            },
            base_destroyed: arena.base().destroyed,
            events,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn fresh_game_summary() {
        let sim = Simulation::new(3);
        let summary = RunSummary::capture(&sim, &[PlayerSlot::One], EventTally::default());
        assert_eq!(summary.outcome, Outcome::Running);
        assert_eq!(summary.players.len(), 1);
        assert_eq!(summary.players[0].lives, 3);
        assert_eq!(summary.players[0].power_level, Some(0));
        assert_eq!(summary.enemies.total, 20);

        let json = serde_json::to_value(&summary).unwrap();
        assert_eq!(json["outcome"], "running");
        assert_eq!(json["players"][0]["slot"], "One");
    }

    #[test]
    fn tally_counts_by_name() {
        let mut tally = EventTally::default();
        tally.add(&[GameEvent::BaseDestroyed, GameEvent::FreezeEnded, GameEvent::FreezeEnded]);
        assert_eq!(tally.count("freeze_ended"), 2);
        assert_eq!(tally.count("base_destroyed"), 1);
        assert_eq!(tally.count("fortify_ended"), 0);
        let json = serde_json::to_string(&tally).unwrap();
        assert_eq!(json, r#"{"base_destroyed":1,"freeze_ended":2}"#);
    }
}
