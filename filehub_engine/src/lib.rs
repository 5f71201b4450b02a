#![forbid(unsafe_code)]

/// Engine v1. Any change to turn rules, effect tables or the canonical
/// form bumps this, which invalidates stored hashes.
pub const ENGINE_VERSION: u32 = 1;

pub mod arithmetic;
pub mod error;
pub mod domain;
pub mod config;
pub mod events;
pub mod state;
pub mod changeset;
pub mod metrics;
pub mod outcome;
pub mod resolution;
pub mod actions;
pub mod names;
pub mod invariants;
pub mod hashing;
pub mod engine;

pub use engine::{GameEngine, TurnReport, TurnStatus};
pub use error::{EngineError, EngineResult};
