//! Scripted player input.
//!
//! A script file is a JSON array of timed intents:
//!
//! ```json
//! [
//!   { "tick": 0, "slot": "One", "intent": { "direction": "Up", "moving": true, "wants_to_fire": true } },
//!   { "tick": 90, "slot": "One", "intent": { "direction": null, "moving": false, "wants_to_fire": false } }
//! ]
//! ```
//!
//! Each entry replaces the player's intent from its tick on. Without a file
//! the players sweep: they turn through all four headings, firing on every
//! other leg.

use std::collections::BTreeMap;
use std::fs;
use std::path::Path;

use anyhow::{Context, Result};
use ironfront_core::{Direction, Intent, PlayerSlot, Simulation};
use serde::{Deserialize, Serialize};

const SWEEP: [Direction; 4] = [
    Direction::Up,
    Direction::Right,
    Direction::Down,
    Direction::Left,
];

/// One timed intent change.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ScriptedInput {
    /// Tick at which the intent takes effect.
    pub tick: u64,
    /// Player it applies to.
    pub slot: PlayerSlot,
    /// The new intent.
    pub intent: Intent,
}

/// Where player intents come from.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Script {
    /// Intent changes keyed by tick, in file order within a tick.
    Timed(BTreeMap<u64, Vec<(PlayerSlot, Intent)>>),
    /// Built-in sweep turning every `period` ticks.
    Sweep {
        /// Ticks per heading.
        period: u64,
    },
}

impl Script {
    /// Reads a script file.
    pub fn load(path: &Path) -> Result<Self> {
        let text = fs::read_to_string(path)
            .with_context(|| format!("reading script {}", path.display()))?;
        let inputs: Vec<ScriptedInput> = serde_json::from_str(&text)
            .with_context(|| format!("parsing script {}", path.display()))?;
        Ok(Self::from_inputs(inputs))
    }

    /// Groups inputs by tick.
    pub fn from_inputs(inputs: Vec<ScriptedInput>) -> Self {
        let mut timed: BTreeMap<u64, Vec<(PlayerSlot, Intent)>> = BTreeMap::new();
        for input in inputs {
            timed
                .entry(input.tick)
                .or_default()
                .push((input.slot, input.intent));
        }
        Self::Timed(timed)
    }

    /// Sets whatever intents change at the simulation's current tick.
    pub fn apply(&self, sim: &mut Simulation) {
        let tick = sim.tick();
        match self {
            Self::Timed(timed) => {
                for (slot, intent) in timed.get(&tick).into_iter().flatten() {
                    sim.set_intent(*slot, *intent);
                }
            }
            Self::Sweep { period } => {
                for slot in PlayerSlot::ALL {
                    sim.set_intent(slot, sweep_intent(tick, *period, slot));
                }
            }
        }
    }
}

/// Sweep intent of `slot` at `tick`. Player two runs half a leg behind.
fn sweep_intent(tick: u64, period: u64, slot: PlayerSlot) -> Intent {
    let period = period.max(1);
    let lag = if slot == PlayerSlot::Two { period / 2 } else { 0 };
    let leg = tick.saturating_sub(lag) / period;
    let heading = SWEEP[usize::try_from(leg % 4).unwrap_or(0)];
    let intent = Intent::drive(heading);
    if leg % 2 == 0 {
        intent.firing()
    } else {
        intent
    }
}
