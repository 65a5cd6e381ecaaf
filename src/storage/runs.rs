//! Run store: query, insert and delete recorded runs.

use std::fs;
use std::sync::Mutex;

use tracing::{debug, info};

use super::{
    ChangeFeed, JsonlReader, JsonlWriter, RunChange, RunChangeKind, StorageConfig, StorageError,
};
use crate::models::{OwnerId, Run, RunId};

/// Selects one owner's runs in one season, optionally one mode only.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct RunQuery {
    pub owner_id: OwnerId,
    pub season: i32,
    pub ranked: Option<bool>,
}

impl RunQuery {
    pub fn new(owner_id: OwnerId, season: i32) -> Self {
        Self {
            owner_id,
            season,
            ranked: None,
        }
    }

    pub fn ranked(mut self, ranked: bool) -> Self {
        self.ranked = Some(ranked);
        self
    }

    pub fn matches(&self, run: &Run) -> bool {
        run.owner_id == self.owner_id
            && run.season == self.season
            && self.ranked.map_or(true, |ranked| run.ranked == ranked)
    }
}

/// Storage for runs.
pub trait RunStore: Send + Sync {
    /// Every run matching the query, in no particular order.
    fn all(&self, query: &RunQuery) -> Result<Vec<Run>, StorageError>;

    /// Add a run. Returns the stored run.
    fn insert(&self, run: Run) -> Result<Run, StorageError>;

    /// Remove a run owned by `owner_id`. Returns `false` when no such run
    /// exists or it belongs to someone else.
    fn delete(&self, owner_id: OwnerId, run_id: &RunId) -> Result<bool, StorageError>;

    /// Seasons in which the owner has recorded runs, ascending.
    fn seasons(&self, owner_id: OwnerId) -> Result<Vec<i32>, StorageError>;

    /// Matching runs, newest first, skipping `offset` and returning at most `limit`.
    fn list(
        &self,
        query: &RunQuery,
        offset: usize,
        limit: usize,
    ) -> Result<Vec<Run>, StorageError> {
        let mut runs = self.all(query)?;
        runs.sort_by(|a, b| b.played.cmp(&a.played));
        Ok(runs.into_iter().skip(offset).take(limit).collect())
    }

    fn count(&self, query: &RunQuery) -> Result<usize, StorageError> {
        Ok(self.all(query)?.len())
    }
}

/// Run store backed by one JSONL file per season.
pub struct JsonlRunStore {
    config: StorageConfig,
    changes: ChangeFeed,
    write_lock: Mutex<()>,
}

impl JsonlRunStore {
    pub fn new(config: StorageConfig, changes: ChangeFeed) -> Self {
        Self {
            config,
            changes,
            write_lock: Mutex::new(()),
        }
    }

    pub fn changes(&self) -> &ChangeFeed {
        &self.changes
    }

    fn reader(&self, season: i32) -> JsonlReader<Run> {
        JsonlReader::new(self.config.runs_path(season))
    }

    fn writer(&self, season: i32) -> JsonlWriter<Run> {
        JsonlWriter::new(self.config.runs_path(season))
    }

    /// Seasons that have a directory on disk, ascending.
    fn stored_seasons(&self) -> Result<Vec<i32>, StorageError> {
        let dir = self.config.runs_dir();
        if !dir.exists() {
            return Ok(Vec::new());
        }

        let mut seasons = Vec::new();
        for entry in fs::read_dir(&dir)? {
            let entry = entry?;
            if !entry.file_type()?.is_dir() {
                continue;
            }
            let season = entry
                .file_name()
                .to_str()
                .and_then(|name| name.strip_prefix("season-"))
                .and_then(|n| n.parse::<i32>().ok());
            if let Some(season) = season {
                seasons.push(season);
            }
        }

        seasons.sort_unstable();
        Ok(seasons)
    }
}

impl RunStore for JsonlRunStore {
    fn all(&self, query: &RunQuery) -> Result<Vec<Run>, StorageError> {
        let runs = self.reader(query.season).read_where(|r| query.matches(r))?;
        debug!(
            "Loaded {} runs for owner {} season {}",
            runs.len(),
            query.owner_id,
            query.season
        );
        Ok(runs)
    }

    fn insert(&self, run: Run) -> Result<Run, StorageError> {
        {
            let _guard = self.write_lock.lock().map_err(|_| StorageError::LockPoisoned)?;
            self.writer(run.season).append(&run)?;
        }

        info!(
            "Recorded run {} for owner {} (season {}, {} {}/{})",
            run.id, run.owner_id, run.season, run.hero, run.wins, run.finished
        );
        self.changes.publish(RunChange {
            owner_id: run.owner_id,
            season: run.season,
            run_id: run.id.clone(),
            kind: RunChangeKind::Created,
        });
        Ok(run)
    }

    fn delete(&self, owner_id: OwnerId, run_id: &RunId) -> Result<bool, StorageError> {
        let removed_from = {
            let _guard = self.write_lock.lock().map_err(|_| StorageError::LockPoisoned)?;

            let mut removed_from = None;
            for season in self.stored_seasons()? {
                let mut runs = self.reader(season).read_all()?;
                let Some(pos) = runs.iter().position(|r| &r.id == run_id) else {
                    continue;
                };
                if runs[pos].owner_id != owner_id {
                    break;
                }
                runs.remove(pos);
                self.writer(season).write_all(&runs)?;
                removed_from = Some(season);
                break;
            }
            removed_from
        };

        let Some(season) = removed_from else {
            debug!("Run {} not found for owner {}", run_id, owner_id);
            return Ok(false);
        };

        info!("Deleted run {} for owner {}", run_id, owner_id);
        self.changes.publish(RunChange {
            owner_id,
            season,
            run_id: run_id.clone(),
            kind: RunChangeKind::Deleted,
        });
        Ok(true)
    }

    fn seasons(&self, owner_id: OwnerId) -> Result<Vec<i32>, StorageError> {
        let mut seasons = Vec::new();
        for season in self.stored_seasons()? {
            if !self.all(&RunQuery::new(owner_id, season))?.is_empty() {
                seasons.push(season);
            }
        }
        Ok(seasons)
    }
}
