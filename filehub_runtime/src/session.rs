//! Session store — the in-memory authority for live players.
//!
//! Each cached player carries its state, its journal (when journaling is
//! on) and a dirty flag. The record store is a write-behind backup:
//! turns and actions flush immediately, event choices only mark the
//! session dirty and are written by the next flush or eviction.
//!
//! Apply-before-persist order for every command:
//!   1. apply through the engine (rejections stop here, nothing is written)
//!   2. append to the journal
//!   3. flush the record when the command calls for it
//!
//! Open order: cached session → stored record (+ journal tail) → journal
//! alone → fresh game.

use std::collections::BTreeMap;
use std::path::{Path, PathBuf};

use sha2::{Digest, Sha256};
use tracing::{debug, error, info, warn};

use filehub_engine::actions::{ActionReceipt, PlayerAction};
use filehub_engine::domain::{GameState, PlayerId};
use filehub_engine::resolution::ChoiceOutcome;
use filehub_engine::{EngineError, GameEngine, TurnReport};

use crate::config::RuntimeConfig;
use crate::error::{RuntimeError, RuntimeResult};
use crate::journal::{Command, Journal};
use crate::record::PlayerRecord;
use crate::record_store::{FileRecordStore, RecordStore};
use crate::replay::{apply_command, apply_entries, CommandOutcome};

struct PlayerSession {
    state: GameState,
    journal: Option<Journal>,
    /// Accepted commands so far; equals the journal's last sequence when
    /// journaling is on.
    sequence: u64,
    dirty: bool,
}

pub struct SessionStore<S: RecordStore> {
    engine: GameEngine,
    store: S,
    journal_dir: Option<PathBuf>,
    master_seed: Option<u64>,
    sessions: BTreeMap<PlayerId, PlayerSession>,
}

impl<S: RecordStore> SessionStore<S> {
    pub fn new(engine: GameEngine, store: S) -> Self {
        Self {
            engine,
            store,
            journal_dir: None,
            master_seed: None,
            sessions: BTreeMap::new(),
        }
    }

    /// Journal every accepted command under `<dir>/<player_id>.journal`.
    pub fn with_journal(mut self, dir: &Path) -> Self {
        self.journal_dir = Some(dir.to_path_buf());
        self
    }

    /// Derive turn seeds from `seed` instead of fresh entropy.
    pub fn with_master_seed(mut self, seed: u64) -> Self {
        self.master_seed = Some(seed);
        self
    }

    pub fn engine(&self) -> &GameEngine {
        &self.engine
    }

    pub fn store(&self) -> &S {
        &self.store
    }

    pub fn journal_path(&self, player_id: PlayerId) -> Option<PathBuf> {
        self.journal_dir
            .as_ref()
            .map(|dir| dir.join(format!("{}.journal", player_id)))
    }

    pub fn cached_players(&self) -> Vec<PlayerId> {
        self.sessions.keys().copied().collect()
    }

    pub fn is_cached(&self, player_id: PlayerId) -> bool {
        self.sessions.contains_key(&player_id)
    }

    // ── Lifecycle ──────────────────────────────────────────────────

    /// Load the player into the cache if needed and return its state.
    pub fn open(&mut self, player_id: PlayerId) -> RuntimeResult<&GameState> {
        self.ensure_loaded(player_id)?;
        self.state(player_id)
    }

    /// State of a cached player.
    pub fn state(&self, player_id: PlayerId) -> RuntimeResult<&GameState> {
        self.sessions
            .get(&player_id)
            .map(|s| &s.state)
            .ok_or(RuntimeError::UnknownPlayer(player_id))
    }

    /// Write the player's record if anything changed since the last write.
    pub fn flush(&mut self, player_id: PlayerId) -> RuntimeResult<()> {
        let session = self
            .sessions
            .get_mut(&player_id)
            .ok_or(RuntimeError::UnknownPlayer(player_id))?;
        if !session.dirty {
            return Ok(());
        }
        let record = PlayerRecord::capture(&session.state, session.sequence)?;
        self.store.save(&record)?;
        session.dirty = false;
        debug!(player = player_id, turn = record.turn, sequence = record.journal_sequence, "session flushed");
        Ok(())
    }

    /// Flush every cached player. Returns how many records were written.
    pub fn flush_all(&mut self) -> RuntimeResult<usize> {
        let dirty: Vec<PlayerId> = self
            .sessions
            .iter()
            .filter(|(_, s)| s.dirty)
            .map(|(id, _)| *id)
            .collect();
        for player_id in &dirty {
            self.flush(*player_id)?;
        }
        info!(written = dirty.len(), cached = self.sessions.len(), "sessions flushed");
        Ok(dirty.len())
    }

    /// Flush, then drop the player from the cache.
    pub fn evict(&mut self, player_id: PlayerId) -> RuntimeResult<()> {
        self.flush(player_id)?;
        self.sessions.remove(&player_id);
        info!(player = player_id, "session evicted");
        Ok(())
    }

    // ── Commands ───────────────────────────────────────────────────

    /// Play one turn and advance. Blocked while an event is pending.
    pub fn process_turn(&mut self, player_id: PlayerId) -> RuntimeResult<TurnReport> {
        self.ensure_loaded(player_id)?;
        let session = self.session(player_id)?;
        if session.state.has_pending_event() {
            warn!(
                player = player_id,
                pending = session.state.pending_events.len(),
                "turn refused while an event is pending"
            );
            return Err(EngineError::EventPending.into());
        }
        let seed = self.turn_seed(player_id, session.state.current_turn, session.sequence);

        let report = match self.execute(player_id, Command::PlayTurn { seed })? {
            CommandOutcome::Turn(report) => report,
            other => return Err(unexpected_outcome(&other)),
        };
        self.flush(player_id)?;
        Ok(report)
    }

    /// Resolve the head of the pending queue. Written on the next flush.
    pub fn resolve_event(&mut self, player_id: PlayerId, choice_index: usize) -> RuntimeResult<ChoiceOutcome> {
        self.ensure_loaded(player_id)?;
        match self.execute(player_id, Command::ResolveEvent { choice_index })? {
            CommandOutcome::Choice(outcome) => Ok(outcome),
            other => Err(unexpected_outcome(&other)),
        }
    }

    pub fn perform_action(&mut self, player_id: PlayerId, action: &PlayerAction) -> RuntimeResult<ActionReceipt> {
        self.ensure_loaded(player_id)?;
        let command = Command::PerformAction {
            action: action.clone(),
        };
        let receipt = match self.execute(player_id, command)? {
            CommandOutcome::Action(receipt) => receipt,
            other => return Err(unexpected_outcome(&other)),
        };
        self.flush(player_id)?;
        Ok(receipt)
    }

    pub fn score(&mut self, player_id: PlayerId) -> RuntimeResult<i64> {
        self.ensure_loaded(player_id)?;
        let state = self.state(player_id)?;
        Ok(self.engine.evaluate_score(state))
    }

    // ── Internals ──────────────────────────────────────────────────

    fn session(&self, player_id: PlayerId) -> RuntimeResult<&PlayerSession> {
        self.sessions
            .get(&player_id)
            .ok_or(RuntimeError::UnknownPlayer(player_id))
    }

    fn ensure_loaded(&mut self, player_id: PlayerId) -> RuntimeResult<()> {
        if self.sessions.contains_key(&player_id) {
            return Ok(());
        }

        let (mut state, record_sequence) = match self.store.load(player_id)? {
            Some(record) => (record.restore()?, record.journal_sequence),
            None => (self.engine.new_game(player_id), 0),
        };

        let mut sequence = record_sequence;
        let journal = match self.journal_path(player_id) {
            Some(path) => {
                let journal = Journal::open(&path)?;
                let tail = journal.load_after(record_sequence)?;
                if !tail.is_empty() {
                    info!(player = player_id, entries = tail.len(), "replaying journal tail");
                    apply_entries(&self.engine, &mut state, &tail)?;
                }
                sequence = journal.last_sequence().max(record_sequence);
                Some(journal)
            }
            None => None,
        };

        let dirty = sequence != record_sequence || !self.store.exists(player_id)?;
        info!(player = player_id, turn = state.current_turn, sequence, "session opened");
        self.sessions.insert(
            player_id,
            PlayerSession {
                state,
                journal,
                sequence,
                dirty,
            },
        );
        Ok(())
    }

    /// Apply, then journal. Rejected commands are neither journaled nor
    /// counted.
    fn execute(&mut self, player_id: PlayerId, command: Command) -> RuntimeResult<CommandOutcome> {
        let session = self
            .sessions
            .get_mut(&player_id)
            .ok_or(RuntimeError::UnknownPlayer(player_id))?;

        let outcome = apply_command(&self.engine, &mut session.state, &command)?;
        session.dirty = true;
        session.sequence += 1;

        if let Some(journal) = session.journal.as_mut() {
            if let Err(e) = journal.append(command) {
                error!(player = player_id, error = %e, "journal append failed after apply");
                return Err(e);
            }
        }
        Ok(outcome)
    }

    /// Seed for the next turn. With a master seed the value depends only
    /// on (master, player, turn, sequence), so a replayed game rolls the
    /// same dice.
    fn turn_seed(&self, player_id: PlayerId, turn: u32, sequence: u64) -> u64 {
        match self.master_seed {
            Some(master) => derive_seed(master, player_id, turn, sequence),
            None => rand::random(),
        }
    }
}

impl SessionStore<FileRecordStore> {
    /// Records and journals both live under `config.data_dir`.
    pub fn from_config(config: &RuntimeConfig) -> RuntimeResult<Self> {
        let engine = GameEngine::new(config.load_game_config()?);
        let store = FileRecordStore::open(&config.data_dir)?;
        let mut sessions = SessionStore::new(engine, store);
        if config.journal {
            sessions = sessions.with_journal(&config.data_dir);
        }
        if let Some(seed) = config.master_seed {
            sessions = sessions.with_master_seed(seed);
        }
        info!(
            data_dir = %config.data_dir.display(),
            journal = config.journal,
            seeded = config.master_seed.is_some(),
            "session store ready"
        );
        Ok(sessions)
    }
}

pub fn derive_seed(master: u64, player_id: PlayerId, turn: u32, sequence: u64) -> u64 {
    let mut hasher = Sha256::new();
    hasher.update(master.to_le_bytes());
    hasher.update(player_id.to_le_bytes());
    hasher.update(turn.to_le_bytes());
    hasher.update(sequence.to_le_bytes());
    let digest = hasher.finalize();
    let mut bytes = [0u8; 8];
    bytes.copy_from_slice(&digest[..8]);
    u64::from_le_bytes(bytes)
}

fn unexpected_outcome(outcome: &CommandOutcome) -> RuntimeError {
    EngineError::InvariantViolation(format!("command produced an unexpected outcome: {:?}", outcome)).into()
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::record_store::MemoryRecordStore;

    fn store() -> SessionStore<MemoryRecordStore> {
        SessionStore::new(GameEngine::default(), MemoryRecordStore::new()).with_master_seed(1)
    }

    #[test]
    fn open_creates_and_caches_a_fresh_game() {
        let mut sessions = store();
        assert_eq!(sessions.open(4).unwrap().player_id, 4);
        assert!(sessions.is_cached(4));
        assert!(!sessions.store().exists(4).unwrap());
        assert_eq!(sessions.flush_all().unwrap(), 1);
        assert!(sessions.store().exists(4).unwrap());
        assert_eq!(sessions.flush_all().unwrap(), 0);
    }

    #[test]
    fn unknown_player_is_reported() {
        let mut sessions = store();
        assert!(matches!(sessions.state(9), Err(RuntimeError::UnknownPlayer(9))));
        assert!(matches!(sessions.flush(9), Err(RuntimeError::UnknownPlayer(9))));
    }

    #[test]
    fn rejected_action_changes_nothing() {
        let mut sessions = store();
        let before = sessions.open(4).unwrap().clone();
        let err = sessions
            .perform_action(4, &"hire_CTO".parse().unwrap())
            .unwrap_err();
        assert!(err.is_validation());
        assert_eq!(sessions.state(4).unwrap(), &before);
    }

    #[test]
    fn seeds_are_derived_deterministically() {
        assert_eq!(derive_seed(1, 2, 3, 4), derive_seed(1, 2, 3, 4));
        assert_ne!(derive_seed(1, 2, 3, 4), derive_seed(1, 2, 3, 5));
        assert_ne!(derive_seed(1, 2, 3, 4), derive_seed(2, 2, 3, 4));
    }
}
