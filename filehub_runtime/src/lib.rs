#![forbid(unsafe_code)]

//! FileHub Runtime
//!
//! Session layer around the FileHub kernel: player records with integrity
//! hashes, a per-player command journal, deterministic replay, drift
//! comparison and the session store that ties them together.
//!
//! No game rules live here; every state change goes through
//! `filehub_engine::GameEngine`.

pub mod error;
pub mod config;
pub mod record;
pub mod record_store;
pub mod journal;
pub mod replay;
pub mod drift;
pub mod session;

pub use config::RuntimeConfig;
pub use error::{RuntimeError, RuntimeResult};
pub use session::SessionStore;
