//! Movement resolver: tank motion against terrain and other tanks.
//!
//! Each moving tank, in id order, takes one step along its facing. The step
//! is clamped to the world and then reverted outright if the new footprint
//! touches blocking terrain or overlaps any other tank. Tanks later in the
//! order see the committed positions of earlier ones.
//!
//! Two tanks driving head-on into each other both revert every tick and stay
//! stuck until one turns; the enemy controller's stuck detection handles that.

use glam::IVec2;
use rubble::{Rect, TileKind};

use crate::arena::Arena;
use crate::entity::cardinal_step;

use super::{ResolveContext, Resolver};

/// Resolver that moves tanks.
#[derive(Debug, Default)]
pub struct MovementResolver;

impl MovementResolver {
    /// Creates a new movement resolver.
    #[must_use]
    pub fn new() -> Self {
        Self
    }
}

impl Resolver for MovementResolver {
    fn name(&self) -> &'static str {
        "movement"
    }

    fn resolve(&self, _ctx: &mut ResolveContext<'_>, arena: &mut Arena) {
        let world = arena.world_size();
        for id in arena.tank_ids() {
            let Some(tank) = arena.tank(id) else {
                continue;
            };
            if !tank.moving {
                continue;
            }

            let mut moved = tank.clone();
            let on_ice = arena.grid().any_kind_in_rect(moved.bounds(), TileKind::Ice);
            moved.update_slide(on_ice);

            let step = cardinal_step(moved.direction.delta() * moved.effective_speed());
            let max = (world - IVec2::splat(moved.size)).max(IVec2::ZERO);
            let candidate = (moved.position + step).clamp(IVec2::ZERO, max);
            let footprint = Rect::square(candidate, moved.size);

            let blocked = arena.grid().blocks_rect(footprint)
                || arena.tank_overlaps(&footprint, Some(id));
            if !blocked {
                moved.position = candidate;
            }

            if let Some(tank) = arena.tank_mut(id) {
                *tank = moved;
            }
        }
    }
}
