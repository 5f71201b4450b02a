//! Append-only command journal — one JSON object per line.
//!
//!   {"sequence":1,"command":{"command":"perform_action","action":...}}
//!   {"sequence":2,"command":{"command":"play_turn","seed":1234}}
//!
//! Rules:
//!   - strict append, sequences start at 1 and increase by one
//!   - fsync after every append
//!   - commands that consume randomness carry the seed that drove them
//!   - only commands the engine accepted are journaled

use std::fs::{self, File, OpenOptions};
use std::io::{self, BufRead, BufReader, Write};
use std::path::{Path, PathBuf};

use serde::{Deserialize, Serialize};

use filehub_engine::actions::PlayerAction;

use crate::error::{RuntimeError, RuntimeResult};

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "command", rename_all = "snake_case")]
pub enum Command {
    /// `process_turn` seeded with `seed`, then `advance_turn` unless the
    /// turn errored.
    PlayTurn { seed: u64 },
    ResolveEvent { choice_index: usize },
    PerformAction { action: PlayerAction },
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct JournalEntry {
    pub sequence: u64,
    pub command: Command,
}

pub struct Journal {
    path: PathBuf,
    last_sequence: u64,
}

impl Journal {
    /// Open or create the journal at `path`, validating what is already there.
    pub fn open(path: &Path) -> RuntimeResult<Self> {
        if let Some(parent) = path.parent() {
            fs::create_dir_all(parent)?;
        }
        let last_sequence = read_entries(path)?.last().map(|e| e.sequence).unwrap_or(0);
        Ok(Self {
            path: path.to_path_buf(),
            last_sequence,
        })
    }

    pub fn path(&self) -> &Path {
        &self.path
    }

    pub fn last_sequence(&self) -> u64 {
        self.last_sequence
    }

    /// Append `command` under the next sequence number.
    pub fn append(&mut self, command: Command) -> RuntimeResult<JournalEntry> {
        let entry = JournalEntry {
            sequence: self.last_sequence + 1,
            command,
        };
        self.append_entry(&entry)?;
        Ok(entry)
    }

    /// Append a pre-numbered entry; its sequence must be the next one.
    pub fn append_entry(&mut self, entry: &JournalEntry) -> RuntimeResult<()> {
        let expected = self.last_sequence + 1;
        if entry.sequence != expected {
            return Err(RuntimeError::SequenceViolation {
                expected,
                got: entry.sequence,
            });
        }

        let mut line = serde_json::to_string(entry)?;
        line.push('\n');
        let mut file = OpenOptions::new().create(true).append(true).open(&self.path)?;
        file.write_all(line.as_bytes())?;
        file.sync_all()?;

        self.last_sequence = entry.sequence;
        Ok(())
    }

    pub fn load_all(&self) -> RuntimeResult<Vec<JournalEntry>> {
        read_entries(&self.path)
    }

    /// Entries with a sequence above `sequence`.
    pub fn load_after(&self, sequence: u64) -> RuntimeResult<Vec<JournalEntry>> {
        Ok(self
            .load_all()?
            .into_iter()
            .filter(|e| e.sequence > sequence)
            .collect())
    }
}

fn read_entries(path: &Path) -> RuntimeResult<Vec<JournalEntry>> {
    let file = match File::open(path) {
        Ok(file) => file,
        Err(e) if e.kind() == io::ErrorKind::NotFound => return Ok(Vec::new()),
        Err(e) => return Err(e.into()),
    };

    let mut entries: Vec<JournalEntry> = Vec::new();
    for (idx, line) in BufReader::new(file).lines().enumerate() {
        let line = line?;
        if line.trim().is_empty() {
            continue;
        }
        let entry: JournalEntry = serde_json::from_str(&line).map_err(|e| RuntimeError::CorruptJournal {
            path: path.to_path_buf(),
            line: idx + 1,
            reason: e.to_string(),
        })?;
        let expected = entries.last().map(|e| e.sequence).unwrap_or(0) + 1;
        if entry.sequence != expected {
            return Err(RuntimeError::SequenceViolation {
                expected,
                got: entry.sequence,
            });
        }
        entries.push(entry);
    }
    Ok(entries)
}
