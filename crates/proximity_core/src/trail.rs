//! Trail reconstruction: an entity's recent positions, earliest first.

use crate::clock::trailing_window;
use crate::error::StoreError;
use crate::spatial::Coordinate;
use crate::store::{EntityId, LocationStore, Timestamp};

/// Coordinates stored for `entity` during `[now - window_secs + 1, now]`, in
/// ascending time order. Seconds without a sample are skipped, so the result
/// holds between 0 and `window_secs` points.
pub fn build_trail(
    store: &dyn LocationStore,
    entity: &EntityId,
    now: Timestamp,
    window_secs: u32,
) -> Result<Vec<Coordinate>, StoreError> {
    let mut trail = Vec::with_capacity(window_secs as usize);
    for t in trailing_window(now, window_secs) {
        if let Some(sample) = store.get(entity, t)? {
            trail.push(sample.coordinate);
        }
    }
    Ok(trail)
}
