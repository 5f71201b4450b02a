//! Player record: the persisted form of one player's state.
//!
//! A record carries the canonical JSON of the state together with its
//! SHA-256 and the engine version that produced it. No wall-clock fields,
//! so identical states produce byte-identical records.
//!
//! Restore order: version check → hash check → decode → invariants.

use serde::{Deserialize, Serialize};

use filehub_engine::domain::{GameState, PlayerId};
use filehub_engine::hashing::{canonical_serialize, hex_digest};
use filehub_engine::invariants::try_validate_invariants;
use filehub_engine::{EngineError, ENGINE_VERSION};

use crate::error::{RuntimeError, RuntimeResult};

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct PlayerRecord {
    pub player_id: PlayerId,
    pub hub_name: String,
    pub engine_version: u32,
    pub turn: u32,
    /// Last journal entry folded into this record; 0 when none.
    pub journal_sequence: u64,
    /// Canonical JSON of the state, as hashed.
    pub canonical_json: String,
    /// Lowercase hex SHA-256 of `canonical_json`.
    pub hash: String,
}

/// Mirror of the canonical envelope written by `canonical_serialize`.
#[derive(Deserialize)]
#[serde(deny_unknown_fields)]
struct CanonicalForm {
    engine_version: u32,
    state: GameState,
}

impl PlayerRecord {
    pub fn capture(state: &GameState, journal_sequence: u64) -> RuntimeResult<Self> {
        let bytes = canonical_serialize(state)?;
        let hash = hex_digest(&bytes);
        let canonical_json = String::from_utf8(bytes)
            .map_err(|e| RuntimeError::Config(format!("canonical form is not UTF-8: {}", e)))?;
        Ok(Self {
            player_id: state.player_id,
            hub_name: state.hub_name.clone(),
            engine_version: ENGINE_VERSION,
            turn: state.current_turn,
            journal_sequence,
            canonical_json,
            hash,
        })
    }

    /// Version and integrity checks, without decoding.
    pub fn verify(&self) -> RuntimeResult<()> {
        if self.engine_version != ENGINE_VERSION {
            return Err(RuntimeError::VersionMismatch {
                player_id: self.player_id,
                found: self.engine_version,
                expected: ENGINE_VERSION,
            });
        }
        let computed = hex_digest(self.canonical_json.as_bytes());
        if computed != self.hash {
            return Err(RuntimeError::HashMismatch {
                player_id: self.player_id,
                stored: self.hash.clone(),
                computed,
            });
        }
        Ok(())
    }

    /// Verified, decoded and invariant-checked state.
    pub fn restore(&self) -> RuntimeResult<GameState> {
        self.verify()?;
        let form: CanonicalForm = serde_json::from_str(&self.canonical_json)?;
        if form.engine_version != self.engine_version {
            return Err(RuntimeError::VersionMismatch {
                player_id: self.player_id,
                found: form.engine_version,
                expected: self.engine_version,
            });
        }
        let state = form.state;
        if state.player_id != self.player_id {
            return Err(RuntimeError::Engine(EngineError::InvariantViolation(format!(
                "record for player {} holds the state of player {}",
                self.player_id, state.player_id
            ))));
        }
        try_validate_invariants(&state)?;
        Ok(state)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use filehub_engine::hashing::canonical_hash;
    use filehub_engine::GameEngine;

    fn sample_state() -> GameState {
        let mut state = GameEngine::default().new_game(12);
        state.marketing.nps_score = 51.123456789;
        state.community.toxicity = 0.1 + 0.2;
        state
    }

    #[test]
    fn restore_yields_an_identical_state() {
        let state = sample_state();
        let record = PlayerRecord::capture(&state, 4).unwrap();
        assert_eq!(record.hash, canonical_hash(&state).unwrap());
        assert_eq!(record.journal_sequence, 4);

        let restored = record.restore().unwrap();
        assert_eq!(restored, state);
        assert_eq!(canonical_hash(&restored).unwrap(), record.hash);
    }

    #[test]
    fn identical_states_give_identical_records() {
        let a = PlayerRecord::capture(&sample_state(), 0).unwrap();
        let b = PlayerRecord::capture(&sample_state(), 0).unwrap();
        assert_eq!(serde_json::to_string(&a).unwrap(), serde_json::to_string(&b).unwrap());
    }

    #[test]
    fn tampered_json_fails_hash_check() {
        let mut record = PlayerRecord::capture(&sample_state(), 0).unwrap();
        record.canonical_json = record.canonical_json.replace("\"budget\":100000", "\"budget\":900000");
        assert!(matches!(record.restore(), Err(RuntimeError::HashMismatch { player_id: 12, .. })));
    }

    #[test]
    fn foreign_engine_version_is_rejected() {
        let mut record = PlayerRecord::capture(&sample_state(), 0).unwrap();
        record.engine_version = ENGINE_VERSION + 1;
        assert!(matches!(
            record.restore(),
            Err(RuntimeError::VersionMismatch { found, expected, .. }) if found == ENGINE_VERSION + 1 && expected == ENGINE_VERSION
        ));
    }

    #[test]
    fn invalid_state_is_rejected_after_decode() {
        let mut state = sample_state();
        state.active_users = -5;
        // hash is recomputed, so only the invariant check can catch it
        let record = PlayerRecord::capture(&state, 0).unwrap();
        assert!(matches!(
            record.restore(),
            Err(RuntimeError::Engine(EngineError::InvariantViolation(ref m))) if m.contains("active_users")
        ));
    }
}
