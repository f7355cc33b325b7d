//! Location storage: per-entity, per-second samples plus the entity registry.
//!
//! Two implementations, selectable via [`LocationStoreKind`]:
//!
//! - **`InMemoryLocationStore`**: ordered in-process index, lost on restart.
//! - **`JournalLocationStore`**: the same index backed by an append-only JSON
//!   lines journal that is replayed on open.
//!
//! The engine only sees the [`LocationStore`] trait, held as
//! `Arc<dyn LocationStore>` and injected by the caller.

pub mod journal;

use std::collections::BTreeMap;
use std::fmt;
use std::path::PathBuf;
use std::sync::{Arc, RwLock, RwLockReadGuard, RwLockWriteGuard};

use serde::{Deserialize, Serialize};

use crate::error::StoreError;
use crate::spatial::Coordinate;

pub use journal::JournalLocationStore;

/// Epoch second (UTC). Sub-second precision is truncated before it gets here.
pub type Timestamp = i64;

/// Opaque, externally supplied identifier of a tracked entity.
#[derive(Debug, Clone, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(transparent)]
pub struct EntityId(String);

impl EntityId {
    pub fn new(id: impl Into<String>) -> Self {
        Self(id.into())
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl fmt::Display for EntityId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

impl From<&str> for EntityId {
    fn from(id: &str) -> Self {
        Self(id.to_string())
    }
}

impl From<String> for EntityId {
    fn from(id: String) -> Self {
        Self(id)
    }
}

/// One observation of an entity at a given second.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct LocationSample {
    pub entity: EntityId,
    pub timestamp: Timestamp,
    pub coordinate: Coordinate,
}

/// Storage backend for location samples. Implementations must be `Send + Sync`
/// so one store can be shared by concurrent requests.
///
/// Each call is atomic for its own key; no multi-key transaction is offered.
pub trait LocationStore: Send + Sync {
    /// Store `coordinate` for `entity` at `timestamp`, replacing any sample
    /// already there, and register the entity.
    fn put(&self, entity: &EntityId, timestamp: Timestamp, coordinate: Coordinate) -> Result<(), StoreError>;

    /// Sample stored at exactly `timestamp`, if any.
    fn get(&self, entity: &EntityId, timestamp: Timestamp) -> Result<Option<LocationSample>, StoreError>;

    /// Every entity with at least one stored sample.
    fn list_entities(&self) -> Result<Vec<EntityId>, StoreError>;

    /// Drop samples strictly older than `cutoff`. Entities left without samples
    /// leave the registry. Returns the number of samples removed.
    fn prune_before(&self, cutoff: Timestamp) -> Result<usize, StoreError>;
}

/// Which store implementation to build.
#[derive(Clone, Debug, Default, Serialize, Deserialize, PartialEq)]
pub enum LocationStoreKind {
    #[default]
    InMemory,
    /// Journal file, created if missing.
    Journal { path: PathBuf },
}

pub fn build_location_store(kind: &LocationStoreKind) -> Result<Arc<dyn LocationStore>, StoreError> {
    match kind {
        LocationStoreKind::InMemory => Ok(Arc::new(InMemoryLocationStore::new())),
        LocationStoreKind::Journal { path } => Ok(Arc::new(JournalLocationStore::open(path)?)),
    }
}

type SeriesByEntity = BTreeMap<EntityId, BTreeMap<Timestamp, Coordinate>>;

/// In-process index. The outer map's key set is the entity registry: an entry
/// exists exactly while its time series is non-empty.
#[derive(Debug, Default)]
pub struct InMemoryLocationStore {
    series: RwLock<SeriesByEntity>,
}

impl InMemoryLocationStore {
    pub fn new() -> Self {
        Self::default()
    }

    /// Total number of stored samples across all entities.
    pub fn sample_count(&self) -> Result<usize, StoreError> {
        Ok(self.read()?.values().map(BTreeMap::len).sum())
    }

    /// Every stored sample, ordered by entity then timestamp.
    pub fn samples(&self) -> Result<Vec<LocationSample>, StoreError> {
        let series = self.read()?;
        Ok(series
            .iter()
            .flat_map(|(entity, samples)| {
                samples.iter().map(move |(timestamp, coordinate)| LocationSample {
                    entity: entity.clone(),
                    timestamp: *timestamp,
                    coordinate: *coordinate,
                })
            })
            .collect())
    }

    fn read(&self) -> Result<RwLockReadGuard<'_, SeriesByEntity>, StoreError> {
        self.series
            .read()
            .map_err(|_| StoreError::Unavailable("location index lock poisoned".to_string()))
    }

    fn write(&self) -> Result<RwLockWriteGuard<'_, SeriesByEntity>, StoreError> {
        self.series
            .write()
            .map_err(|_| StoreError::Unavailable("location index lock poisoned".to_string()))
    }
}

impl LocationStore for InMemoryLocationStore {
    fn put(&self, entity: &EntityId, timestamp: Timestamp, coordinate: Coordinate) -> Result<(), StoreError> {
        coordinate.validate()?;
        self.write()?
            .entry(entity.clone())
            .or_default()
            .insert(timestamp, coordinate);
        Ok(())
    }

    fn get(&self, entity: &EntityId, timestamp: Timestamp) -> Result<Option<LocationSample>, StoreError> {
        let series = self.read()?;
        Ok(series
            .get(entity)
            .and_then(|samples| samples.get(&timestamp))
            .map(|coordinate| LocationSample {
                entity: entity.clone(),
                timestamp,
                coordinate: *coordinate,
            }))
    }

    fn list_entities(&self) -> Result<Vec<EntityId>, StoreError> {
        Ok(self.read()?.keys().cloned().collect())
    }

    fn prune_before(&self, cutoff: Timestamp) -> Result<usize, StoreError> {
        let mut series = self.write()?;
        let mut removed = 0;
        series.retain(|_, samples| {
            let kept = samples.split_off(&cutoff);
            removed += samples.len();
            *samples = kept;
            !samples.is_empty()
        });
        Ok(removed)
    }
}
