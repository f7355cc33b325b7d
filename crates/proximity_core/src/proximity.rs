//! Neighbour search: who has been within a radius of an entity recently.
//!
//! The origin is pinned to its sample at `now`; every registered entity
//! (origin included) is scanned across the trailing lookback window and
//! matches on its first sample within the radius. This is a linear
//! O(entities × lookback) scan with no spatial index.

use crate::clock::trailing_window;
use crate::error::{ProximityError, ProximityResult, StoreError};
use crate::spatial::{distance_m, Coordinate};
use crate::store::{EntityId, LocationStore, Timestamp};

pub const ORIGIN_LOCATION_UNKNOWN: &str = "Cannot find neighbours as user current location is unknown";

/// Entities that came within `radius_m` (inclusive) of `origin`'s position at
/// `now` at any second of `[now - lookback_secs + 1, now]`, in registry order.
pub fn find_neighbours(
    store: &dyn LocationStore,
    origin: &EntityId,
    now: Timestamp,
    radius_m: f64,
    lookback_secs: u32,
) -> ProximityResult<Vec<EntityId>> {
    let origin_sample = store
        .get(origin, now)?
        .ok_or_else(|| ProximityError::not_found(ORIGIN_LOCATION_UNKNOWN))?;

    let mut neighbours = Vec::new();
    for candidate in store.list_entities()? {
        if was_within_radius(store, &candidate, origin_sample.coordinate, now, radius_m, lookback_secs)? {
            neighbours.push(candidate);
        }
    }
    Ok(neighbours)
}

/// Scan `candidate`'s window earliest first, stopping at the first match.
fn was_within_radius(
    store: &dyn LocationStore,
    candidate: &EntityId,
    reference: Coordinate,
    now: Timestamp,
    radius_m: f64,
    lookback_secs: u32,
) -> Result<bool, StoreError> {
    for t in trailing_window(now, lookback_secs) {
        if let Some(sample) = store.get(candidate, t)? {
            if distance_m(reference, sample.coordinate) <= radius_m {
                return Ok(true);
            }
        }
    }
    Ok(false)
}
