//! Runtime error type.
//!
//! Engine validation failures pass through unchanged as `Engine`; every
//! other variant is a persistence or integrity failure.

use std::io;
use std::path::PathBuf;

use thiserror::Error;

use filehub_engine::domain::PlayerId;
use filehub_engine::EngineError;

#[derive(Debug, Error)]
pub enum RuntimeError {
    #[error("io error: {0}")]
    Io(#[from] io::Error),

    #[error("serialization error: {0}")]
    Serialization(#[from] serde_json::Error),

    #[error("record for player {player_id} fails its hash check: stored {stored}, computed {computed}")]
    HashMismatch {
        player_id: PlayerId,
        stored: String,
        computed: String,
    },

    #[error("record for player {player_id} was written by engine v{found}, running v{expected}")]
    VersionMismatch {
        player_id: PlayerId,
        found: u32,
        expected: u32,
    },

    #[error("journal sequence violation: expected {expected}, got {got}")]
    SequenceViolation { expected: u64, got: u64 },

    #[error("corrupt journal {} at line {line}: {reason}", path.display())]
    CorruptJournal {
        path: PathBuf,
        line: usize,
        reason: String,
    },

    #[error("journal entry {sequence} was rejected on replay: {reason}")]
    ReplayDiverged { sequence: u64, reason: String },

    #[error(transparent)]
    Engine(#[from] EngineError),

    #[error("unknown player {0}")]
    UnknownPlayer(PlayerId),

    #[error("invalid runtime configuration: {0}")]
    Config(String),
}

impl RuntimeError {
    /// Recoverable by retrying with different input.
    pub fn is_validation(&self) -> bool {
        match self {
            RuntimeError::Engine(e) => e.is_validation(),
            RuntimeError::UnknownPlayer(_) => true,
            _ => false,
        }
    }
}

pub type RuntimeResult<T> = Result<T, RuntimeError>;
