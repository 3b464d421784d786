//! Arena module: the authoritative world state.
//!
//! The Arena owns everything a tick can change:
//! - The destructible [`TileGrid`] and the base
//! - Tanks, projectiles and power-ups, each in its own `BTreeMap`
//! - Spawn points, wave counters, timed effects and scores
//! - Transient visual effects and the telemetry event log
//!
//! # Architecture
//!
//! Entity IDs come from one monotonically increasing counter shared by all
//! three entity maps, so a `BTreeMap` walk always visits entities in creation
//! order. Passes that remove entities while walking collect the ids first and
//! apply the removals afterwards.
//!
//! # Example
//!
//! ```
//! use glam::IVec2;
//! use ironfront_core::arena::Arena;
//! use ironfront_core::entity::{ArchetypeKind, Tank};
//! use rubble::{TileCoord, TileGrid};
//!
//! let grid = TileGrid::new(16, 16, 40).unwrap();
//! let mut arena = Arena::new(grid, TileCoord::new(7, 15));
//!
//! let a = arena.spawn_tank(Tank::enemy(ArchetypeKind::Basic, IVec2::ZERO, 40, false, 0));
//! let b = arena.spawn_tank(Tank::enemy(ArchetypeKind::Fast, IVec2::new(80, 0), 40, false, 0));
//!
//! let ids: Vec<_> = arena.tanks().map(|(id, _)| id).collect();
//! assert_eq!(ids, vec![a, b]);
//! assert_eq!(arena.live_enemy_count(), 2);
//! ```

use std::collections::BTreeMap;

use glam::IVec2;
use rubble::{Rect, TileCoord, TileGrid};
use serde::{Deserialize, Serialize};

use crate::entity::{EntityId, PlayerSlot, PowerUp, Projectile, Tank};
use crate::output::{Effect, EffectKind, EventLog, GameEvent};

/// Offsets from the base of the cells that shield it: above-left, above,
/// above-right, left, right.
const FORTIFY_OFFSETS: [(i32, i32); 5] = [(-1, -1), (0, -1), (1, -1), (-1, 0), (1, 0)];

// =============================================================================
// World records
// =============================================================================

/// The defended objective.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Base {
    /// Cell the base occupies.
    pub cell: TileCoord,
    /// Set once any shell reaches it.
    pub destroyed: bool,
}

/// Enemy wave bookkeeping.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct WaveState {
    /// Enemies spawned so far.
    pub spawned: u32,
    /// Enemies destroyed so far.
    pub defeated: u32,
    /// Enemies pulled from play after their controller failed.
    pub withdrawn: u32,
    /// Enemies in this wave.
    pub total: u32,
    /// Tick of the most recent spawn.
    pub last_spawn: Option<u64>,
}

/// Expiry ticks of global timed effects.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct Timers {
    /// Enemies stay frozen until this tick.
    pub freeze_until: Option<u64>,
    /// Base walls stay steel until this tick.
    pub fortify_until: Option<u64>,
}

// =============================================================================
// Arena
// =============================================================================

/// Complete world state for one level.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Arena {
    next_id: u64,
    tick: u64,
    grid: TileGrid,
    base: Base,
    enemy_spawns: Vec<IVec2>,
    player_spawns: [Option<IVec2>; 2],
    tanks: BTreeMap<EntityId, Tank>,
    projectiles: BTreeMap<EntityId, Projectile>,
    powerups: BTreeMap<EntityId, PowerUp>,
    wave: WaveState,
    timers: Timers,
    scores: [u32; 2],
    effects: Vec<Effect>,
    events: EventLog,
}

impl Arena {
    /// Creates an arena over `grid` with the base at `base_cell` and no
    /// entities. The arena starts at tick 0.
    #[must_use]
    pub fn new(grid: TileGrid, base_cell: TileCoord) -> Self {
        Self {
            next_id: 0,
            tick: 0,
            grid,
            base: Base {
                cell: base_cell,
                destroyed: false,
            },
            enemy_spawns: Vec::new(),
            player_spawns: [None; 2],
            tanks: BTreeMap::new(),
            projectiles: BTreeMap::new(),
            powerups: BTreeMap::new(),
            wave: WaveState::default(),
            timers: Timers::default(),
            scores: [0; 2],
            effects: Vec::new(),
            events: EventLog::new(),
        }
    }

    fn allocate_id(&mut self) -> EntityId {
        let id = EntityId::new(self.next_id);
        self.next_id += 1;
        id
    }

    // =========================================================================
    // Terrain and geometry
    // =========================================================================

    /// The tile grid.
    #[must_use]
    pub const fn grid(&self) -> &TileGrid {
        &self.grid
    }

    /// Mutable tile grid.
    pub fn grid_mut(&mut self) -> &mut TileGrid {
        &mut self.grid
    }

    /// World size in pixels.
    #[must_use]
    pub const fn world_size(&self) -> IVec2 {
        self.grid.pixel_size()
    }

    /// The base.
    #[must_use]
    pub const fn base(&self) -> &Base {
        &self.base
    }

    /// Mutable base.
    pub fn base_mut(&mut self) -> &mut Base {
        &mut self.base
    }

    /// Pixel rectangle of the base cell.
    #[must_use]
    pub const fn base_rect(&self) -> Rect {
        self.grid.tile_rect(self.base.cell)
    }

    /// Cells around the base that fortification converts, clipped to the grid.
    #[must_use]
    pub fn fortify_cells(&self) -> Vec<TileCoord> {
        FORTIFY_OFFSETS
            .iter()
            .map(|&(dc, dr)| self.base.cell.offset(dc, dr))
            .filter(|c| self.grid.in_bounds(*c))
            .collect()
    }

    /// Enemy spawn points (top-left pixels).
    #[must_use]
    pub fn enemy_spawns(&self) -> &[IVec2] {
        &self.enemy_spawns
    }

    /// Replaces the enemy spawn points.
    pub fn set_enemy_spawns(&mut self, spawns: Vec<IVec2>) {
        self.enemy_spawns = spawns;
    }

    /// Player spawn point, if the map defines one for `slot`.
    #[must_use]
    pub const fn player_spawn(&self, slot: PlayerSlot) -> Option<IVec2> {
        self.player_spawns[slot.index()]
    }

    /// Sets a player spawn point.
    pub fn set_player_spawn(&mut self, slot: PlayerSlot, spawn: IVec2) {
        self.player_spawns[slot.index()] = Some(spawn);
    }

    // =========================================================================
    // Tanks
    // =========================================================================

    /// Adds a tank and returns its id.
    pub fn spawn_tank(&mut self, tank: Tank) -> EntityId {
        let id = self.allocate_id();
        self.tanks.insert(id, tank);
        id
    }

    /// Removes a tank.
    pub fn despawn_tank(&mut self, id: EntityId) -> Option<Tank> {
        self.tanks.remove(&id)
    }

    /// Looks up a tank.
    #[must_use]
    pub fn tank(&self, id: EntityId) -> Option<&Tank> {
        self.tanks.get(&id)
    }

    /// Looks up a tank mutably.
    pub fn tank_mut(&mut self, id: EntityId) -> Option<&mut Tank> {
        self.tanks.get_mut(&id)
    }

    /// All tanks in id order.
    pub fn tanks(&self) -> impl Iterator<Item = (EntityId, &Tank)> + '_ {
        self.tanks.iter().map(|(id, t)| (*id, t))
    }

    /// All tanks in id order, mutably.
    pub fn tanks_mut(&mut self) -> impl Iterator<Item = (EntityId, &mut Tank)> + '_ {
        self.tanks.iter_mut().map(|(id, t)| (*id, t))
    }

    /// Ids of all tanks in id order.
    #[must_use]
    pub fn tank_ids(&self) -> Vec<EntityId> {
        self.tanks.keys().copied().collect()
    }

    /// Ids of enemy tanks in id order.
    #[must_use]
    pub fn enemy_ids(&self) -> Vec<EntityId> {
        self.tanks()
            .filter(|(_, t)| t.is_enemy())
            .map(|(id, _)| id)
            .collect()
    }

    /// Number of enemy tanks on the field.
    #[must_use]
    pub fn live_enemy_count(&self) -> usize {
        self.tanks.values().filter(|t| t.is_enemy()).count()
    }

    /// The tank controlled by `slot`, if it is still in play.
    #[must_use]
    pub fn player(&self, slot: PlayerSlot) -> Option<(EntityId, &Tank)> {
        self.tanks().find(|(_, t)| t.slot() == Some(slot))
    }

    /// Player tanks in slot order.
    pub fn players(&self) -> impl Iterator<Item = (EntityId, &Tank)> + '_ {
        PlayerSlot::ALL.into_iter().filter_map(|slot| self.player(slot))
    }

    /// True if any tank other than `except` overlaps `rect`.
    #[must_use]
    pub fn tank_overlaps(&self, rect: &Rect, except: Option<EntityId>) -> bool {
        self.tanks()
            .any(|(id, t)| Some(id) != except && t.bounds().intersects(rect))
    }

    // =========================================================================
    // Projectiles and power-ups
    // =========================================================================

    /// Adds a projectile and returns its id.
    pub fn spawn_projectile(&mut self, projectile: Projectile) -> EntityId {
        let id = self.allocate_id();
        self.projectiles.insert(id, projectile);
        id
    }

    /// Removes a projectile.
    pub fn despawn_projectile(&mut self, id: EntityId) -> Option<Projectile> {
        self.projectiles.remove(&id)
    }

    /// Looks up a projectile.
    #[must_use]
    pub fn projectile(&self, id: EntityId) -> Option<&Projectile> {
        self.projectiles.get(&id)
    }

    /// All projectiles in id order.
    pub fn projectiles(&self) -> impl Iterator<Item = (EntityId, &Projectile)> + '_ {
        self.projectiles.iter().map(|(id, p)| (*id, p))
    }

    /// All projectiles in id order, mutably.
    pub fn projectiles_mut(&mut self) -> impl Iterator<Item = (EntityId, &mut Projectile)> + '_ {
        self.projectiles.iter_mut().map(|(id, p)| (*id, p))
    }

    /// Number of projectiles in flight.
    #[must_use]
    pub fn projectile_count(&self) -> usize {
        self.projectiles.len()
    }

    /// Adds a power-up and returns its id.
    pub fn spawn_powerup(&mut self, powerup: PowerUp) -> EntityId {
        let id = self.allocate_id();
        self.powerups.insert(id, powerup);
        id
    }

    /// Removes a power-up.
    pub fn despawn_powerup(&mut self, id: EntityId) -> Option<PowerUp> {
        self.powerups.remove(&id)
    }

    /// All power-ups in id order.
    pub fn powerups(&self) -> impl Iterator<Item = (EntityId, &PowerUp)> + '_ {
        self.powerups.iter().map(|(id, p)| (*id, p))
    }

    // =========================================================================
    // Wave, timers, scores
    // =========================================================================

    /// Wave counters.
    #[must_use]
    pub const fn wave(&self) -> &WaveState {
        &self.wave
    }

    /// Mutable wave counters.
    pub fn wave_mut(&mut self) -> &mut WaveState {
        &mut self.wave
    }

    /// Timed-effect expiries.
    #[must_use]
    pub const fn timers(&self) -> &Timers {
        &self.timers
    }

    /// Mutable timed-effect expiries.
    pub fn timers_mut(&mut self) -> &mut Timers {
        &mut self.timers
    }

    /// True while enemies are frozen.
    #[must_use]
    pub const fn is_frozen(&self) -> bool {
        self.timers.freeze_until.is_some()
    }

    /// Adds points to a player's score.
    pub fn credit(&mut self, slot: PlayerSlot, points: u32) {
        let score = &mut self.scores[slot.index()];
        *score = score.saturating_add(points);
    }

    /// A player's score.
    #[must_use]
    pub const fn score(&self, slot: PlayerSlot) -> u32 {
        self.scores[slot.index()]
    }

    /// Overwrites a player's score. Used when carrying scores across levels.
    pub fn set_score(&mut self, slot: PlayerSlot, score: u32) {
        self.scores[slot.index()] = score;
    }

    // =========================================================================
    // Effects and events
    // =========================================================================

    /// Queues a visual effect.
    pub fn add_effect(&mut self, kind: EffectKind, position: IVec2, lifetime: u32) {
        self.effects.push(Effect::new(kind, position, lifetime));
    }

    /// Active visual effects, oldest first.
    #[must_use]
    pub fn effects(&self) -> &[Effect] {
        &self.effects
    }

    /// Ages every effect by one tick and drops the expired ones.
    pub fn age_effects(&mut self) {
        for effect in &mut self.effects {
            effect.age += 1;
        }
        self.effects.retain(|e| !e.is_expired());
    }

    /// Records a telemetry event.
    pub fn record(&mut self, event: GameEvent) {
        self.events.record(event);
    }

    /// Events recorded since the last drain.
    #[must_use]
    pub fn events(&self) -> &[GameEvent] {
        self.events.events()
    }

    /// Drains the event log.
    pub fn take_events(&mut self) -> Vec<GameEvent> {
        self.events.take_events()
    }

    // =========================================================================
    // Tick
    // =========================================================================

    /// Returns the current simulation tick.
    #[must_use]
    pub const fn current_tick(&self) -> u64 {
        self.tick
    }

    /// Advances the simulation tick counter.
    pub fn advance_tick(&mut self) {
        self.tick += 1;
    }
}
