//! Resolver module: the write phase of a tick.
//!
//! Resolvers validate what the actors proposed (a move, a shell in flight) and
//! mutate the arena accordingly. The simulation runs them in a fixed order
//! every tick:
//!
//! 1. [`MovementResolver`]: advances moving tanks, reverting blocked moves
//! 2. [`CombatResolver`]: flies shells and applies their hits
//! 3. [`CasualtyResolver`]: removes destroyed enemies, scores, drops
//! 4. [`PickupResolver`]: hands power-ups to players and applies them
//!
//! # Invariants
//!
//! - Entities are visited in id order
//! - Removals found during a pass are collected and applied after it
//! - All randomness comes from [`ResolveContext::rng`]

mod casualty;
mod combat;
mod movement;
mod pickup;

pub use casualty::CasualtyResolver;
pub use combat::CombatResolver;
pub use movement::MovementResolver;
pub use pickup::{fortify_base, freeze_enemies, PickupResolver};

use rand_chacha::ChaCha8Rng;

use crate::arena::Arena;
use crate::config::GameConfig;

/// Per-tick inputs shared by all resolvers.
pub struct ResolveContext<'a> {
    /// Tick being resolved.
    pub tick: u64,
    /// Game configuration.
    pub config: &'a GameConfig,
    /// Simulation random stream.
    pub rng: &'a mut ChaCha8Rng,
}

/// A fixed stage of the tick that mutates the arena.
///
/// # Example
///
/// ```
/// use ironfront_core::arena::Arena;
/// use ironfront_core::resolver::{ResolveContext, Resolver};
///
/// struct Noop;
///
/// impl Resolver for Noop {
///     fn name(&self) -> &'static str {
///         "noop"
///     }
///
///     fn resolve(&self, _ctx: &mut ResolveContext<'_>, _arena: &mut Arena) {}
/// }
/// ```
pub trait Resolver: Send + Sync {
    /// Short name for logs.
    fn name(&self) -> &'static str;

    /// Applies this stage to the arena.
    ///
    /// Must be deterministic given the same arena, config and rng state.
    fn resolve(&self, ctx: &mut ResolveContext<'_>, arena: &mut Arena);
}

/// The resolver pipeline in tick order.
#[must_use]
pub fn default_pipeline() -> Vec<Box<dyn Resolver>> {
    vec![
        Box::new(MovementResolver::new()),
        Box::new(CombatResolver::new()),
        Box::new(CasualtyResolver::new()),
        Box::new(PickupResolver::new()),
    ]
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn resolver_is_object_safe() {
        fn _accepts_boxed(_resolver: Box<dyn Resolver>) {}
        fn _accepts_slice(_resolvers: &[Box<dyn Resolver>]) {}
    }

    #[test]
    fn pipeline_order() {
        let names: Vec<_> = default_pipeline().iter().map(|r| r.name()).collect();
        assert_eq!(names, vec!["movement", "combat", "casualty", "pickup"]);
    }
}
