//! Test helpers shared by unit tests, integration tests and benchmarks.

use std::sync::Arc;

use crate::clock::FixedClock;
use crate::params::SearchParams;
use crate::service::ProximityService;
use crate::spatial::{Coordinate, EARTH_RADIUS_M};
use crate::store::{InMemoryLocationStore, LocationStore, Timestamp};

/// A fixed instant (2023-11-14T22:13:20Z) used as "now" across tests.
pub const TEST_NOW: Timestamp = 1_700_000_000;

/// Reference point in eastern Paris.
pub fn test_point() -> Coordinate {
    Coordinate::new(48.844444, 2.399999)
}

/// A point `meters` due north of `origin` along its meridian.
pub fn point_north_of(origin: Coordinate, meters: f64) -> Coordinate {
    Coordinate::new(origin.latitude + (meters / EARTH_RADIUS_M).to_degrees(), origin.longitude)
}

/// Clock pinned at [`TEST_NOW`].
pub fn test_clock() -> Arc<FixedClock> {
    Arc::new(FixedClock::new(TEST_NOW))
}

/// Service over an empty in-memory store with default parameters.
///
/// # Panics
///
/// Panics if the default parameters are rejected (should never happen).
pub fn test_service() -> (Arc<InMemoryLocationStore>, ProximityService) {
    let store = Arc::new(InMemoryLocationStore::new());
    let service = ProximityService::new(store.clone() as Arc<dyn LocationStore>, SearchParams::default())
        .expect("default search params are valid");
    (store, service)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::spatial::distance_m;

    #[test]
    fn point_north_of_is_the_requested_distance_away() {
        let d = distance_m(test_point(), point_north_of(test_point(), 1_234.5));
        assert!((d - 1_234.5).abs() < 1e-6, "got {d}");
    }

    #[test]
    fn test_service_starts_empty() {
        let (store, service) = test_service();
        assert_eq!(service.entity_count().expect("count"), 0);
        assert_eq!(store.sample_count().expect("count"), 0);
    }
}
