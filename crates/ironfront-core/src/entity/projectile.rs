//! In-flight shells.

use glam::IVec2;
use rubble::Rect;
use serde::{Deserialize, Serialize};

use super::{Direction, EntityId, Side};

/// A shell travelling in a straight line.
///
/// The owner is kept for scoring only; a shell can hit any tank it overlaps.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Projectile {
    /// Centre pixel.
    pub center: IVec2,
    /// Direction of travel.
    pub direction: Direction,
    /// Pixels per tick.
    pub speed: i32,
    /// Power level 0..=3 of the shooter at the moment of firing.
    pub power: u8,
    /// Tank that fired the shell.
    pub owner: EntityId,
    /// Allegiance of the shooter.
    pub side: Side,
}

impl Projectile {
    /// Side of the shell's square hit box.
    pub const SIZE: i32 = 6;

    /// Hit box.
    #[must_use]
    pub const fn bounds(&self) -> Rect {
        Rect::centered(self.center, Self::SIZE)
    }

    /// Damage dealt to a tank: power + 1.
    #[must_use]
    pub fn damage(&self) -> i32 {
        i32::from(self.power) + 1
    }

    /// Moves one tick along the direction of travel.
    pub fn advance(&mut self) {
        self.center += self.direction.delta() * self.speed;
    }

    /// True if the centre pixel lies inside the closed world rectangle.
    #[must_use]
    pub const fn in_world(&self, world: IVec2) -> bool {
        self.center.x >= 0 && self.center.y >= 0 && self.center.x <= world.x && self.center.y <= world.y
    }
}
