//! Filesystem run storage.
//!
//! Runs are kept as JSONL, one file per season:
//! `<data_dir>/runs/season-<n>/runs.jsonl`

use std::path::PathBuf;
use thiserror::Error;

mod changes;
mod jsonl;
mod runs;

pub use changes::*;
pub use jsonl::*;
pub use runs::*;

/// Errors that can occur during storage operations.
#[derive(Debug, Error)]
pub enum StorageError {
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    #[error("JSON serialization error: {0}")]
    Json(#[from] serde_json::Error),

    #[error("Storage lock poisoned")]
    LockPoisoned,
}

/// Configuration for storage paths.
#[derive(Debug, Clone)]
pub struct StorageConfig {
    pub data_dir: PathBuf,
}

impl StorageConfig {
    pub fn new(data_dir: PathBuf) -> Self {
        Self { data_dir }
    }

    pub fn runs_dir(&self) -> PathBuf {
        self.data_dir.join("runs")
    }

    pub fn season_dir(&self, season: i32) -> PathBuf {
        self.runs_dir().join(format!("season-{}", season))
    }

    pub fn runs_path(&self, season: i32) -> PathBuf {
        self.season_dir(season).join("runs.jsonl")
    }
}

impl Default for StorageConfig {
    fn default() -> Self {
        Self::new(PathBuf::from("./data"))
    }
}
