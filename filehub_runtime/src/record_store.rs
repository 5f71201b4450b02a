//! Record stores: where player records live between sessions.
//!
//! `FileRecordStore` layout:
//!   <dir>/<player_id>.json
//!
//! Writes go to `<player_id>.json.tmp`, are fsynced, then renamed over the
//! live file, so a crash leaves either the old record or the new one.

use std::collections::BTreeMap;
use std::fs::{self, File};
use std::io::{self, Write};
use std::path::{Path, PathBuf};

use tracing::debug;

use filehub_engine::domain::PlayerId;

use crate::error::RuntimeResult;
use crate::record::PlayerRecord;

pub trait RecordStore {
    /// `Ok(None)` when the player has no record yet.
    fn load(&self, player_id: PlayerId) -> RuntimeResult<Option<PlayerRecord>>;
    fn save(&mut self, record: &PlayerRecord) -> RuntimeResult<()>;
    fn exists(&self, player_id: PlayerId) -> RuntimeResult<bool>;
}

// ---------------------------------------------------------------------------
// File-backed store
// ---------------------------------------------------------------------------

pub struct FileRecordStore {
    dir: PathBuf,
}

impl FileRecordStore {
    pub fn open(dir: &Path) -> RuntimeResult<Self> {
        fs::create_dir_all(dir)?;
        Ok(Self {
            dir: dir.to_path_buf(),
        })
    }

    pub fn dir(&self) -> &Path {
        &self.dir
    }

    pub fn record_path(&self, player_id: PlayerId) -> PathBuf {
        self.dir.join(format!("{}.json", player_id))
    }
}

impl RecordStore for FileRecordStore {
    fn load(&self, player_id: PlayerId) -> RuntimeResult<Option<PlayerRecord>> {
        let path = self.record_path(player_id);
        let content = match fs::read_to_string(&path) {
            Ok(content) => content,
            Err(e) if e.kind() == io::ErrorKind::NotFound => return Ok(None),
            Err(e) => return Err(e.into()),
        };
        let record: PlayerRecord = serde_json::from_str(&content)?;
        debug!(player = player_id, path = %path.display(), "record loaded");
        Ok(Some(record))
    }

    fn save(&mut self, record: &PlayerRecord) -> RuntimeResult<()> {
        let path = self.record_path(record.player_id);
        let tmp = path.with_extension("json.tmp");
        let content = serde_json::to_string(record)?;

        {
            let mut file = File::create(&tmp)?;
            file.write_all(content.as_bytes())?;
            file.sync_all()?;
        }
        fs::rename(&tmp, &path)?;
        debug!(player = record.player_id, turn = record.turn, path = %path.display(), "record saved");
        Ok(())
    }

    fn exists(&self, player_id: PlayerId) -> RuntimeResult<bool> {
        Ok(self.record_path(player_id).is_file())
    }
}

// ---------------------------------------------------------------------------
// In-memory store
// ---------------------------------------------------------------------------

/// Records kept in a map; for tests and for hosts without a disk.
#[derive(Debug, Default)]
pub struct MemoryRecordStore {
    records: BTreeMap<PlayerId, PlayerRecord>,
}

impl MemoryRecordStore {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn len(&self) -> usize {
        self.records.len()
    }

    pub fn is_empty(&self) -> bool {
        self.records.is_empty()
    }
}

impl RecordStore for MemoryRecordStore {
    fn load(&self, player_id: PlayerId) -> RuntimeResult<Option<PlayerRecord>> {
        Ok(self.records.get(&player_id).cloned())
    }

    fn save(&mut self, record: &PlayerRecord) -> RuntimeResult<()> {
        self.records.insert(record.player_id, record.clone());
        Ok(())
    }

    fn exists(&self, player_id: PlayerId) -> RuntimeResult<bool> {
        Ok(self.records.contains_key(&player_id))
    }
}
