//! Runtime configuration.
//!
//! Loaded from JSON or from the environment:
//!   FILEHUB_DATA_DIR     directory for player records and journals
//!   FILEHUB_SEED         master seed; unset means turns draw fresh entropy
//!   FILEHUB_GAME_CONFIG  path to a `GameConfig` JSON file
//!   FILEHUB_JOURNAL      "0"/"false" disables the command journal

use std::fs;
use std::path::{Path, PathBuf};

use serde::{Deserialize, Serialize};

use filehub_engine::config::GameConfig;

use crate::error::{RuntimeError, RuntimeResult};

pub const ENV_DATA_DIR: &str = "FILEHUB_DATA_DIR";
pub const ENV_SEED: &str = "FILEHUB_SEED";
pub const ENV_GAME_CONFIG: &str = "FILEHUB_GAME_CONFIG";
pub const ENV_JOURNAL: &str = "FILEHUB_JOURNAL";

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct RuntimeConfig {
    pub data_dir: PathBuf,
    pub journal: bool,
    pub master_seed: Option<u64>,
    pub game_config: Option<PathBuf>,
}

impl Default for RuntimeConfig {
    fn default() -> Self {
        Self {
            data_dir: PathBuf::from("data"),
            journal: true,
            master_seed: None,
            game_config: None,
        }
    }
}

impl RuntimeConfig {
    pub fn from_json_str(json: &str) -> RuntimeResult<Self> {
        Ok(serde_json::from_str(json)?)
    }

    pub fn from_json_file(path: &Path) -> RuntimeResult<Self> {
        let text = fs::read_to_string(path)?;
        Self::from_json_str(&text)
    }

    /// Defaults overridden by whatever `FILEHUB_*` variables are set.
    pub fn from_env() -> RuntimeResult<Self> {
        Self::from_lookup(|key| std::env::var(key).ok())
    }

    /// Same as `from_env`, reading variables through `lookup`.
    pub fn from_lookup<F>(lookup: F) -> RuntimeResult<Self>
    where
        F: Fn(&str) -> Option<String>,
    {
        let mut config = Self::default();
        if let Some(dir) = lookup(ENV_DATA_DIR) {
            config.data_dir = PathBuf::from(dir);
        }
        if let Some(seed) = lookup(ENV_SEED) {
            let seed = seed
                .trim()
                .parse::<u64>()
                .map_err(|e| RuntimeError::Config(format!("{}={:?}: {}", ENV_SEED, seed, e)))?;
            config.master_seed = Some(seed);
        }
        if let Some(path) = lookup(ENV_GAME_CONFIG) {
            config.game_config = Some(PathBuf::from(path));
        }
        if let Some(flag) = lookup(ENV_JOURNAL) {
            config.journal = match flag.trim().to_ascii_lowercase().as_str() {
                "1" | "true" | "yes" | "on" => true,
                "0" | "false" | "no" | "off" => false,
                other => {
                    return Err(RuntimeError::Config(format!("{}={:?} is not a flag", ENV_JOURNAL, other)));
                }
            };
        }
        Ok(config)
    }

    /// The game table this runtime plays with.
    pub fn load_game_config(&self) -> RuntimeResult<GameConfig> {
        match &self.game_config {
            Some(path) => Ok(GameConfig::from_json_file(path)?),
            None => Ok(GameConfig::default()),
        }
    }
}
