//! Service facade: the two operations callers use, plus housekeeping.

use std::sync::Arc;

use serde::{Deserialize, Serialize};

use crate::error::{ProximityError, ProximityResult};
use crate::params::SearchParams;
use crate::proximity::find_neighbours;
use crate::spatial::Coordinate;
use crate::store::{EntityId, LocationStore, Timestamp};
use crate::trail::build_trail;

/// Acknowledgement of a recorded sample.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct RecordedLocation {
    pub timestamp: Timestamp,
    pub user_id: EntityId,
}

/// One neighbour and its recent movement, earliest point first.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct NeighbourTrail {
    pub id: EntityId,
    pub trail: Vec<Coordinate>,
}

#[derive(Clone)]
pub struct ProximityService {
    store: Arc<dyn LocationStore>,
    params: SearchParams,
}

impl ProximityService {
    pub fn new(store: Arc<dyn LocationStore>, params: SearchParams) -> ProximityResult<Self> {
        params.validate()?;
        Ok(Self { store, params })
    }

    pub fn store(&self) -> &Arc<dyn LocationStore> {
        &self.store
    }

    /// Store `coordinate` as `entity`'s position at second `now`.
    pub fn record_location(
        &self,
        entity: &EntityId,
        now: Timestamp,
        coordinate: Coordinate,
    ) -> ProximityResult<RecordedLocation> {
        require_entity(entity)?;
        self.store.put(entity, now, coordinate)?;
        Ok(RecordedLocation {
            timestamp: now,
            user_id: entity.clone(),
        })
    }

    /// Neighbours of `entity` at `now` (itself included) with their trails.
    pub fn neighbours_with_trails(&self, entity: &EntityId, now: Timestamp) -> ProximityResult<Vec<NeighbourTrail>> {
        require_entity(entity)?;
        let store = self.store.as_ref();
        let neighbours = find_neighbours(store, entity, now, self.params.radius_m, self.params.lookback_secs)?;

        neighbours
            .into_iter()
            .map(|id| -> ProximityResult<NeighbourTrail> {
                let trail = build_trail(store, &id, now, self.params.trail_secs)?;
                Ok(NeighbourTrail { id, trail })
            })
            .collect()
    }

    /// Drop samples older than `retention_secs` before `now`.
    pub fn prune_expired(&self, now: Timestamp, retention_secs: u64) -> ProximityResult<usize> {
        let retention = i64::try_from(retention_secs).unwrap_or(i64::MAX);
        Ok(self.store.prune_before(now.saturating_sub(retention))?)
    }

    pub fn entity_count(&self) -> ProximityResult<usize> {
        Ok(self.store.list_entities()?.len())
    }
}

fn require_entity(entity: &EntityId) -> ProximityResult<()> {
    if entity.as_str().trim().is_empty() {
        return Err(ProximityError::validation("entity id must not be empty"));
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::store::InMemoryLocationStore;

    fn service() -> ProximityService {
        ProximityService::new(Arc::new(InMemoryLocationStore::new()), SearchParams::default()).expect("service")
    }

    #[test]
    fn record_location_echoes_timestamp_and_entity() {
        let service = service();
        let recorded = service
            .record_location(&EntityId::from("7"), 1_000, Coordinate::new(48.84, 2.39))
            .expect("record");
        assert_eq!(recorded.timestamp, 1_000);
        assert_eq!(recorded.user_id, EntityId::from("7"));
        assert_eq!(service.entity_count().expect("count"), 1);
    }

    #[test]
    fn blank_entity_is_a_validation_error() {
        let service = service();
        let err = service
            .record_location(&EntityId::from("  "), 1_000, Coordinate::new(0.0, 0.0))
            .expect_err("blank id");
        assert!(matches!(err, ProximityError::Validation(_)));

        let err = service.neighbours_with_trails(&EntityId::from(""), 1_000).expect_err("blank id");
        assert!(matches!(err, ProximityError::Validation(_)));
    }

    #[test]
    fn invalid_coordinate_is_a_store_error() {
        let err = service()
            .record_location(&EntityId::from("7"), 1_000, Coordinate::new(0.0, 181.0))
            .expect_err("bad longitude");
        assert!(matches!(err, ProximityError::Store(_)));
    }

    #[test]
    fn invalid_params_are_rejected_up_front() {
        let result = ProximityService::new(
            Arc::new(InMemoryLocationStore::new()),
            SearchParams::default().with_radius_m(-5.0),
        );
        assert!(matches!(result, Err(ProximityError::Validation(_))));
    }

    #[test]
    fn prune_expired_keeps_recent_samples() {
        let service = service();
        let entity = EntityId::from("7");
        for t in 0..100 {
            service.record_location(&entity, t, Coordinate::new(1.0, 1.0)).expect("record");
        }
        let removed = service.prune_expired(99, 60).expect("prune");
        assert_eq!(removed, 39);

        let neighbours = service.neighbours_with_trails(&entity, 99).expect("neighbours");
        assert_eq!(neighbours.len(), 1);
        assert_eq!(neighbours[0].trail.len(), 60);
    }

    #[test]
    fn neighbour_trail_serializes_like_the_http_contract() {
        let value = serde_json::to_value(NeighbourTrail {
            id: EntityId::from("1"),
            trail: vec![Coordinate::new(48.5, 2.25)],
        })
        .expect("encode");
        assert_eq!(
            value,
            serde_json::json!({"id": "1", "trail": [{"latitude": 48.5, "longitude": 2.25}]})
        );
    }
}
