//! Collectible power-ups.

use glam::IVec2;
use rand::seq::SliceRandom;
use rand::Rng;
use rubble::Rect;
use serde::{Deserialize, Serialize};

/// Effect granted on pickup.
#[derive(Debug, Copy, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum PowerUpKind {
    /// Raises the collector's shell power by one level.
    Star,
    /// Extra life.
    Tank,
    /// Destroys every enemy on the field.
    Grenade,
    /// Freezes all enemies.
    Timer,
    /// Temporary damage immunity for the collector.
    Helmet,
    /// Armours the walls around the base.
    Shovel,
}

impl PowerUpKind {
    /// All kinds, in the order they are drawn from.
    pub const ALL: [PowerUpKind; 6] = [
        Self::Star,
        Self::Tank,
        Self::Grenade,
        Self::Timer,
        Self::Helmet,
        Self::Shovel,
    ];

    /// Uniform draw over all kinds.
    pub fn random<R: Rng + ?Sized>(rng: &mut R) -> Self {
        *Self::ALL.choose(rng).unwrap_or(&Self::Star)
    }
}

/// A power-up lying on the field.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct PowerUp {
    /// Top-left pixel.
    pub position: IVec2,
    /// Effect.
    pub kind: PowerUpKind,
}

impl PowerUp {
    /// Side of the pickup square.
    pub const SIZE: i32 = 30;
    /// Score for collecting any power-up.
    pub const POINTS: u32 = 500;

    /// Creates a power-up centred on `center`.
    #[must_use]
    pub const fn centered_on(center: IVec2, kind: PowerUpKind) -> Self {
        Self {
            position: IVec2::new(center.x - Self::SIZE / 2, center.y - Self::SIZE / 2),
            kind,
        }
    }

    /// Pickup box.
    #[must_use]
    pub const fn bounds(&self) -> Rect {
        Rect::square(self.position, Self::SIZE)
    }
}
