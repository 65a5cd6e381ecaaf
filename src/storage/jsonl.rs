//! JSONL (JSON Lines) files.
//!
//! Each line is one serialized entity.

use std::fs::{self, File, OpenOptions};
use std::io::{BufRead, BufReader, BufWriter, Write};
use std::marker::PhantomData;
use std::path::PathBuf;

use serde::{de::DeserializeOwned, Serialize};
use tracing::{debug, warn};

use super::StorageError;

/// JSONL file writer.
pub struct JsonlWriter<T> {
    path: PathBuf,
    _marker: PhantomData<T>,
}

impl<T: Serialize> JsonlWriter<T> {
    pub fn new(path: PathBuf) -> Self {
        Self {
            path,
            _marker: PhantomData,
        }
    }

    fn ensure_dir(&self) -> Result<(), StorageError> {
        if let Some(parent) = self.path.parent() {
            fs::create_dir_all(parent)?;
        }
        Ok(())
    }

    /// Append a single entity to the file.
    pub fn append(&self, entity: &T) -> Result<(), StorageError> {
        self.ensure_dir()?;

        let file = OpenOptions::new()
            .create(true)
            .append(true)
            .open(&self.path)?;

        let mut writer = BufWriter::new(file);
        let json = serde_json::to_string(entity)?;
        writeln!(writer, "{}", json)?;
        writer.flush()?;

        debug!("Appended entity to {:?}", self.path);
        Ok(())
    }

    /// Replace the file with `entities`.
    ///
    /// Writes to a sibling temp file first so readers never see a
    /// half-written file.
    pub fn write_all(&self, entities: &[T]) -> Result<usize, StorageError> {
        self.ensure_dir()?;

        let tmp_path = self.path.with_extension("jsonl.tmp");
        let file = File::create(&tmp_path)?;
        let mut writer = BufWriter::new(file);

        for entity in entities {
            let json = serde_json::to_string(entity)?;
            writeln!(writer, "{}", json)?;
        }
        writer.flush()?;
        drop(writer);

        fs::rename(&tmp_path, &self.path)?;
        debug!("Wrote {} entities to {:?}", entities.len(), self.path);

        Ok(entities.len())
    }
}

/// JSONL file reader.
pub struct JsonlReader<T> {
    path: PathBuf,
    _marker: PhantomData<T>,
}

impl<T: DeserializeOwned> JsonlReader<T> {
    pub fn new(path: PathBuf) -> Self {
        Self {
            path,
            _marker: PhantomData,
        }
    }

    /// Read all entities. A missing file reads as empty; malformed lines
    /// are skipped with a warning.
    pub fn read_all(&self) -> Result<Vec<T>, StorageError> {
        if !self.path.exists() {
            return Ok(Vec::new());
        }

        let file = File::open(&self.path)?;
        let reader = BufReader::new(file);
        let mut entities = Vec::new();

        for (index, line) in reader.lines().enumerate() {
            let line = line?;

            if line.trim().is_empty() {
                continue;
            }

            match serde_json::from_str(&line) {
                Ok(entity) => entities.push(entity),
                Err(e) => {
                    warn!(
                        "Failed to parse line {} in {:?}: {}",
                        index + 1,
                        self.path,
                        e
                    );
                }
            }
        }

        debug!("Read {} entities from {:?}", entities.len(), self.path);
        Ok(entities)
    }

    /// Read entities matching a predicate.
    pub fn read_where<F>(&self, predicate: F) -> Result<Vec<T>, StorageError>
    where
        F: Fn(&T) -> bool,
    {
        let all = self.read_all()?;
        Ok(all.into_iter().filter(predicate).collect())
    }
}
