//! Journal-backed store: an in-memory index mirrored to a JSON lines file.
//!
//! Every accepted write appends one line before it becomes visible. Opening a
//! store replays the file in order, so the last line for a key wins, exactly
//! like the live overwrite semantics.
//!
//! An unterminated last line is what an interrupted append leaves behind. On
//! open it is kept if it parses and cut off otherwise. A bad line anywhere else
//! fails the open.

use std::fs::{self, File, OpenOptions};
use std::io::{BufWriter, Write};
use std::path::{Path, PathBuf};
use std::sync::{Mutex, MutexGuard};

use serde::{Deserialize, Serialize};

use super::{EntityId, InMemoryLocationStore, LocationSample, LocationStore, Timestamp};
use crate::error::StoreError;
use crate::spatial::Coordinate;

/// On-disk form of one sample.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct JournalEntry {
    pub entity: String,
    pub timestamp: Timestamp,
    pub latitude: f64,
    pub longitude: f64,
}

impl From<&LocationSample> for JournalEntry {
    fn from(sample: &LocationSample) -> Self {
        Self {
            entity: sample.entity.as_str().to_string(),
            timestamp: sample.timestamp,
            latitude: sample.coordinate.latitude,
            longitude: sample.coordinate.longitude,
        }
    }
}

#[derive(Debug)]
pub struct JournalLocationStore {
    path: PathBuf,
    index: InMemoryLocationStore,
    /// Held for the whole of a write so journal order matches index order.
    writer: Mutex<BufWriter<File>>,
}

impl JournalLocationStore {
    /// Open (or create) the journal at `path` and replay it.
    pub fn open(path: impl AsRef<Path>) -> Result<Self, StoreError> {
        let path = path.as_ref().to_path_buf();
        let index = InMemoryLocationStore::new();
        if path.exists() {
            replay(&path, &index)?;
        }
        let file = open_append(&path)?;
        Ok(Self {
            path,
            index,
            writer: Mutex::new(BufWriter::new(file)),
        })
    }

    /// Append `entry`. On failure the file is cut back to its length before
    /// the call and the writer is replaced, so no partial line survives.
    fn append_locked(&self, writer: &mut BufWriter<File>, entry: &JournalEntry) -> Result<(), StoreError> {
        let committed_len = writer.get_ref().metadata().map_err(journal_error(&self.path))?.len();
        let result = write_entry(writer, entry, &self.path)
            .and_then(|()| writer.flush().map_err(journal_error(&self.path)));
        if result.is_err() {
            self.reset_writer(writer, committed_len)?;
        }
        result
    }

    fn reset_writer(&self, writer: &mut BufWriter<File>, len: u64) -> Result<(), StoreError> {
        truncate(&self.path, len)?;
        let stale = std::mem::replace(writer, BufWriter::new(open_append(&self.path)?));
        // Dropping a BufWriter flushes it; take the buffered bytes out instead.
        let (_, _unwritten) = stale.into_parts();
        Ok(())
    }

    /// Rewrite the journal so it holds exactly one line per live sample.
    fn rewrite_locked(&self, writer: &mut BufWriter<File>) -> Result<(), StoreError> {
        writer.flush().map_err(journal_error(&self.path))?;

        let staging = self.path.with_extension("compact");
        {
            let file = File::create(&staging).map_err(journal_error(&staging))?;
            let mut staging_writer = BufWriter::new(file);
            for sample in self.index.samples()? {
                write_entry(&mut staging_writer, &JournalEntry::from(&sample), &staging)?;
            }
            staging_writer.flush().map_err(journal_error(&staging))?;
        }
        fs::rename(&staging, &self.path).map_err(journal_error(&self.path))?;

        *writer = BufWriter::new(open_append(&self.path)?);
        Ok(())
    }

    fn lock_writer(&self) -> Result<MutexGuard<'_, BufWriter<File>>, StoreError> {
        self.writer
            .lock()
            .map_err(|_| StoreError::Unavailable("journal writer lock poisoned".to_string()))
    }
}

impl LocationStore for JournalLocationStore {
    fn put(&self, entity: &EntityId, timestamp: Timestamp, coordinate: Coordinate) -> Result<(), StoreError> {
        coordinate.validate()?;
        let entry = JournalEntry {
            entity: entity.as_str().to_string(),
            timestamp,
            latitude: coordinate.latitude,
            longitude: coordinate.longitude,
        };

        let mut writer = self.lock_writer()?;
        self.append_locked(&mut writer, &entry)?;
        self.index.put(entity, timestamp, coordinate)
    }

    fn get(&self, entity: &EntityId, timestamp: Timestamp) -> Result<Option<LocationSample>, StoreError> {
        self.index.get(entity, timestamp)
    }

    fn list_entities(&self) -> Result<Vec<EntityId>, StoreError> {
        self.index.list_entities()
    }

    fn prune_before(&self, cutoff: Timestamp) -> Result<usize, StoreError> {
        let mut writer = self.lock_writer()?;
        let removed = self.index.prune_before(cutoff)?;
        if removed > 0 {
            self.rewrite_locked(&mut writer)?;
        }
        Ok(removed)
    }
}

fn replay(path: &Path, index: &InMemoryLocationStore) -> Result<(), StoreError> {
    let bytes = fs::read(path).map_err(journal_error(path))?;
    let mut committed = 0;
    for (line_no, line) in bytes.split_inclusive(|&byte| byte == b'\n').enumerate() {
        match parse_line(line) {
            Ok(Some(entry)) => index.put(
                &EntityId::from(entry.entity),
                entry.timestamp,
                Coordinate::new(entry.latitude, entry.longitude),
            )?,
            Ok(None) => {}
            Err(_) if !line.ends_with(b"\n") => break,
            Err(error) => {
                return Err(StoreError::Journal(format!("{}:{}: {error}", path.display(), line_no + 1)));
            }
        }
        committed += line.len();
    }

    if committed < bytes.len() {
        truncate(path, committed as u64)
    } else if !bytes.is_empty() && !bytes.ends_with(b"\n") {
        open_append(path)?.write_all(b"\n").map_err(journal_error(path))
    } else {
        Ok(())
    }
}

fn parse_line(line: &[u8]) -> Result<Option<JournalEntry>, serde_json::Error> {
    if line.iter().all(u8::is_ascii_whitespace) {
        return Ok(None);
    }
    serde_json::from_slice(line).map(Some)
}

fn truncate(path: &Path, len: u64) -> Result<(), StoreError> {
    OpenOptions::new()
        .write(true)
        .open(path)
        .and_then(|file| file.set_len(len))
        .map_err(journal_error(path))
}

fn open_append(path: &Path) -> Result<File, StoreError> {
    OpenOptions::new()
        .create(true)
        .append(true)
        .open(path)
        .map_err(journal_error(path))
}

fn write_entry(writer: &mut impl Write, entry: &JournalEntry, path: &Path) -> Result<(), StoreError> {
    let line = serde_json::to_string(entry)
        .map_err(|error| StoreError::Journal(format!("failed to encode journal entry: {error}")))?;
    writeln!(writer, "{line}").map_err(journal_error(path))
}

fn journal_error(path: &Path) -> impl Fn(std::io::Error) -> StoreError + '_ {
    move |error| StoreError::Journal(format!("{}: {error}", path.display()))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn journal_entry_uses_flat_layout() {
        let entry = JournalEntry {
            entity: "42".to_string(),
            timestamp: 1_700_000_000,
            latitude: 48.5,
            longitude: 2.25,
        };
        let json = serde_json::to_value(&entry).expect("encode");
        assert_eq!(
            json,
            serde_json::json!({
                "entity": "42",
                "timestamp": 1_700_000_000_i64,
                "latitude": 48.5,
                "longitude": 2.25,
            })
        );
    }

    #[test]
    fn invalid_coordinate_is_not_journaled() {
        let dir = tempfile::tempdir().expect("tempdir");
        let path = dir.path().join("locations.jsonl");
        let store = JournalLocationStore::open(&path).expect("open");

        let err = store
            .put(&EntityId::from("1"), 5, Coordinate::new(0.0, 200.0))
            .expect_err("longitude out of range");
        assert!(matches!(err, StoreError::InvalidCoordinate { .. }));
        assert_eq!(fs::read_to_string(&path).expect("read"), "");
    }

    #[test]
    fn failed_append_leaves_no_partial_line() {
        let dir = tempfile::tempdir().expect("tempdir");
        let path = dir.path().join("locations.jsonl");
        let store = JournalLocationStore::open(&path).expect("open");
        store.put(&EntityId::from("1"), 1, Coordinate::new(1.0, 1.0)).expect("put");
        let committed = fs::metadata(&path).expect("metadata").len();

        {
            let mut writer = store.lock_writer().expect("lock");
            writer.write_all(b"{\"entity\":\"2\",\"times").expect("buffer");
            writer.flush().expect("flush");
            writer.write_all(b"tamp\":2").expect("buffer");
            store.reset_writer(&mut writer, committed).expect("reset");
        }
        assert_eq!(fs::metadata(&path).expect("metadata").len(), committed);

        store.put(&EntityId::from("3"), 3, Coordinate::new(3.0, 3.0)).expect("put");
        drop(store);

        let reopened = JournalLocationStore::open(&path).expect("reopen");
        assert_eq!(
            reopened.list_entities().expect("list"),
            vec![EntityId::from("1"), EntityId::from("3")]
        );
        assert_eq!(fs::read_to_string(&path).expect("read").lines().count(), 2);
    }
}
