//! Per-enemy controller memory.

use std::collections::VecDeque;

use glam::IVec2;
use serde::{Deserialize, Serialize};

use super::AiState;

/// Everything the enemy controller remembers about one tank between ticks.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct Brain {
    state: AiState,
    /// Tick at which the state is redrawn.
    next_evaluation: u64,
    /// Tick at which a patrolling tank picks a new heading.
    next_turn: u64,
    /// Recent top-left positions, oldest first.
    trail: VecDeque<IVec2>,
    /// Remaining waypoints, next first.
    path: VecDeque<IVec2>,
    path_planned_at: Option<u64>,
}

impl Brain {
    /// Creates a brain that makes its first state draw at `tick`.
    #[must_use]
    pub fn new(tick: u64) -> Self {
        Self {
            next_evaluation: tick,
            next_turn: tick,
            ..Self::default()
        }
    }

    /// Current behaviour state.
    #[must_use]
    pub const fn state(&self) -> AiState {
        self.state
    }

    /// Switches state. A real change drops the waypoint path.
    pub fn set_state(&mut self, state: AiState) {
        if state != self.state {
            self.state = state;
            self.clear_path();
        }
    }

    /// True once the state is due to be redrawn at `tick`.
    #[must_use]
    pub const fn evaluation_due(&self, tick: u64) -> bool {
        tick >= self.next_evaluation
    }

    /// Schedules the next state draw.
    pub fn schedule_evaluation(&mut self, at: u64) {
        self.next_evaluation = at;
    }

    /// True once a patrolling tank should turn at `tick`.
    #[must_use]
    pub const fn turn_due(&self, tick: u64) -> bool {
        tick >= self.next_turn
    }

    /// Schedules the next patrol turn.
    pub fn schedule_turn(&mut self, at: u64) {
        self.next_turn = at;
    }

    // =========================================================================
    // Stuck detection
    // =========================================================================

    /// Appends a position, keeping at most `window` entries.
    pub fn record_position(&mut self, position: IVec2, window: usize) {
        self.trail.push_back(position);
        while self.trail.len() > window {
            self.trail.pop_front();
        }
    }

    /// True when the trail holds `window` positions and the Manhattan
    /// distance between the oldest and newest is below `threshold`.
    #[must_use]
    pub fn is_stuck(&self, window: usize, threshold: i32) -> bool {
        if window == 0 || self.trail.len() < window {
            return false;
        }
        match (self.trail.front(), self.trail.back()) {
            (Some(oldest), Some(newest)) => (*newest - *oldest).abs().element_sum() < threshold,
            _ => false,
        }
    }

    /// Forgets the position trail.
    pub fn reset_trail(&mut self) {
        self.trail.clear();
    }

    /// Number of positions on the trail.
    #[must_use]
    pub fn trail_len(&self) -> usize {
        self.trail.len()
    }

    // =========================================================================
    // Waypoints
    // =========================================================================

    /// Remaining waypoints, next first.
    pub fn path(&self) -> impl Iterator<Item = IVec2> + '_ {
        self.path.iter().copied()
    }

    /// Replaces the path.
    pub fn set_path(&mut self, waypoints: Vec<IVec2>, tick: u64) {
        self.path = waypoints.into();
        self.path_planned_at = Some(tick);
    }

    /// Drops the path.
    pub fn clear_path(&mut self) {
        self.path.clear();
        self.path_planned_at = None;
    }

    /// True if the path is exhausted or was planned more than `max_age`
    /// ticks before `tick`.
    #[must_use]
    pub fn needs_path(&self, tick: u64, max_age: u64) -> bool {
        match self.path_planned_at {
            Some(at) => self.path.is_empty() || tick.saturating_sub(at) > max_age,
            None => true,
        }
    }

    /// Pops every leading waypoint within `radius` pixels (Chebyshev) of
    /// `position` and returns the next one still ahead.
    pub fn next_waypoint(&mut self, position: IVec2, radius: i32) -> Option<IVec2> {
        while let Some(&next) = self.path.front() {
            if (next - position).abs().max_element() > radius {
                return Some(next);
            }
            self.path.pop_front();
        }
        None
    }
}
