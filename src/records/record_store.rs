//! File-backed record collection
//!
//! Each collection is one JSON array on disk. Every mutation runs under the
//! collection's lock as read-all, mutate in memory, write-all, and the write
//! goes to a temporary sibling that is renamed over the old file. Readers
//! never take the lock; they always see a complete old or new file.

use chrono::{DateTime, Utc};
use log::{debug, error, info, warn};
use std::fs;
use std::io::{ErrorKind, Write};
use std::marker::PhantomData;
use std::path::{Path, PathBuf};
use std::sync::{Mutex, MutexGuard, PoisonError};

use crate::error::Result;
use crate::records::Record;

pub struct RecordStore<T> {
    path: PathBuf,
    // Serializes mutations; the value is the next id to hand out
    next_id: Mutex<u64>,
    _records: PhantomData<fn() -> T>,
}

impl<T: Record> RecordStore<T> {
    /// Open the collection at `path`, creating `[]` if the file is absent
    pub fn open(path: impl Into<PathBuf>) -> Result<Self> {
        let path = path.into();
        if let Some(parent) = path.parent().filter(|p| !p.as_os_str().is_empty()) {
            fs::create_dir_all(parent)?;
        }
        if !path.exists() {
            write_atomic::<T>(&path, &[])?;
            info!("Created empty collection {}", path.display());
        }

        let next_id = match read_records::<T>(&path) {
            Ok(records) => next_after(&records),
            Err(e) => {
                warn!("Could not parse {}: {}. Mutations will fail until it is repaired.", path.display(), e);
                1
            }
        };
        debug!("Opened {} (next id {})", path.display(), next_id);

        Ok(Self {
            path,
            next_id: Mutex::new(next_id),
            _records: PhantomData,
        })
    }

    pub fn path(&self) -> &Path {
        &self.path
    }

    fn lock(&self) -> MutexGuard<'_, u64> {
        self.next_id.lock().unwrap_or_else(PoisonError::into_inner)
    }

    /// Every record in file order; a missing or unreadable file reads as empty
    pub fn load_all(&self) -> Vec<T> {
        match read_records(&self.path) {
            Ok(records) => records,
            Err(e) => {
                warn!("Failed to load {}: {}", self.path.display(), e);
                Vec::new()
            }
        }
    }

    pub fn filter(&self, mut predicate: impl FnMut(&T) -> bool) -> Vec<T> {
        self.load_all().into_iter().filter(|r| predicate(r)).collect()
    }

    pub fn find(&self, mut predicate: impl FnMut(&T) -> bool) -> Option<T> {
        self.load_all().into_iter().find(|r| predicate(r))
    }

    pub fn count(&self, mut predicate: impl FnMut(&T) -> bool) -> usize {
        self.load_all().iter().filter(|r| predicate(r)).count()
    }

    /// Run `f` over the collection under the lock.
    ///
    /// The file is rewritten only when `f` succeeds and changed something.
    /// If the existing file cannot be parsed, nothing runs and the file is
    /// left untouched.
    pub fn transact<R>(&self, f: impl FnOnce(&mut Batch<T>) -> Result<R>) -> Result<R> {
        let mut next_id = self.lock();
        let records = read_records::<T>(&self.path)?;

        // The file may hold ids the counter has not seen
        *next_id = (*next_id).max(next_after(&records));

        let mut batch = Batch {
            records,
            next_id: *next_id,
            changed: false,
            now: Utc::now(),
        };
        let result = f(&mut batch)?;

        if batch.changed {
            write_atomic(&self.path, &batch.records)?;
        }
        *next_id = batch.next_id;
        Ok(result)
    }

    /// Assign the next id, stamp the creation time and persist
    pub fn append(&self, record: T) -> Result<T> {
        self.transact(|batch| Ok(batch.insert(record)))
    }

    /// Remove every match; returns how many were removed
    pub fn remove_where(&self, predicate: impl FnMut(&T) -> bool) -> Result<usize> {
        self.transact(|batch| Ok(batch.remove_where(predicate)))
    }

    /// Substitute the first match with `replacement`; `None` when nothing matched
    pub fn replace_where(&self, predicate: impl FnMut(&T) -> bool, replacement: T) -> Result<Option<T>> {
        self.transact(|batch| Ok(batch.replace_where(predicate, replacement)))
    }

    /// Apply `update` to the first match and return the updated record
    pub fn update_where(&self, predicate: impl FnMut(&T) -> bool, update: impl FnOnce(&mut T)) -> Result<Option<T>> {
        self.transact(|batch| Ok(batch.update_where(predicate, update)))
    }
}

/// In-memory view of a collection inside `RecordStore::transact`
pub struct Batch<T> {
    records: Vec<T>,
    next_id: u64,
    changed: bool,
    now: DateTime<Utc>,
}

impl<T: Record> Batch<T> {
    pub fn records(&self) -> &[T] {
        &self.records
    }

    pub fn iter(&self) -> std::slice::Iter<'_, T> {
        self.records.iter()
    }

    /// Time stamped onto records inserted or updated by this batch
    pub fn now(&self) -> DateTime<Utc> {
        self.now
    }

    pub fn find(&self, mut predicate: impl FnMut(&T) -> bool) -> Option<&T> {
        self.records.iter().find(|r| predicate(r))
    }

    pub fn insert(&mut self, mut record: T) -> T {
        let id = self.next_id;
        self.next_id += 1;
        record.stamp(id, self.now);
        self.records.push(record.clone());
        self.changed = true;
        record
    }

    pub fn remove_where(&mut self, mut predicate: impl FnMut(&T) -> bool) -> usize {
        let before = self.records.len();
        self.records.retain(|r| !predicate(r));
        let removed = before - self.records.len();
        if removed > 0 {
            self.changed = true;
        }
        removed
    }

    pub fn replace_where(&mut self, predicate: impl FnMut(&T) -> bool, replacement: T) -> Option<T> {
        let idx = self.records.iter().position(predicate)?;
        self.records[idx] = replacement.clone();
        self.changed = true;
        Some(replacement)
    }

    pub fn update_where(&mut self, predicate: impl FnMut(&T) -> bool, update: impl FnOnce(&mut T)) -> Option<T> {
        let idx = self.records.iter().position(predicate)?;
        update(&mut self.records[idx]);
        self.changed = true;
        Some(self.records[idx].clone())
    }
}

fn next_after<T: Record>(records: &[T]) -> u64 {
    records.iter().map(|r| r.id()).max().map_or(1, |max| max + 1)
}

fn read_records<T: Record>(path: &Path) -> Result<Vec<T>> {
    let raw = match fs::read(path) {
        Ok(raw) => raw,
        Err(e) if e.kind() == ErrorKind::NotFound => return Ok(Vec::new()),
        Err(e) => return Err(e.into()),
    };
    if raw.iter().all(u8::is_ascii_whitespace) {
        return Ok(Vec::new());
    }
    Ok(serde_json::from_slice(&raw)?)
}

fn write_atomic<T: Record>(path: &Path, records: &[T]) -> Result<()> {
    let json = serde_json::to_vec_pretty(records)?;
    let file_name = path
        .file_name()
        .map(|n| n.to_string_lossy().into_owned())
        .unwrap_or_else(|| "records".to_string());
    let temp = path.with_file_name(format!(".{}.tmp", file_name));

    let written = (|| {
        let mut file = fs::File::create(&temp)?;
        file.write_all(&json)?;
        file.sync_all()?;
        fs::rename(&temp, path)
    })();
    if let Err(e) = written {
        error!("Failed to write {}: {}", path.display(), e);
        let _ = fs::remove_file(&temp);
        return Err(e.into());
    }
    Ok(())
}
