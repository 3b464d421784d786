//! Crate-level scenario tests.
//!
//! - `determinism.rs`: same seed and same intents reproduce the same run
//! - `integration.rs`: whole-tick behaviour through `Simulation::step`
//! - `helpers.rs`: scenario setup shared by both

mod determinism;
mod helpers;
mod integration;

pub use helpers::*;
