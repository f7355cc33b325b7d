//! Demo data: three entities sampled once per second.
//!
//! Entities `"1"` and `"2"` sit on (nearly) the same spot in Paris and are
//! always each other's neighbours; entity `"3"` sits at (0, 0), thousands of
//! kilometres away.

use crate::error::StoreError;
use crate::spatial::Coordinate;
use crate::store::{EntityId, LocationStore, Timestamp};

/// Seconds of demo data written by the server's `--seed-demo` flag.
pub const DEMO_DURATION_SECS: u32 = 600;

pub fn demo_entities() -> Vec<(EntityId, Coordinate)> {
    vec![
        (EntityId::from("1"), Coordinate::new(48.843956887722015, 2.391961861563238)),
        (EntityId::from("2"), Coordinate::new(48.843956887722016, 2.391961861563239)),
        (EntityId::from("3"), Coordinate::new(0.0, 0.0)),
    ]
}

/// Write one sample per demo entity for every second of
/// `[start, start + duration_secs]`. Returns the number of samples written.
pub fn seed_demo(store: &dyn LocationStore, start: Timestamp, duration_secs: u32) -> Result<usize, StoreError> {
    let entities = demo_entities();
    let mut written = 0;
    for t in start..=start + i64::from(duration_secs) {
        for (entity, coordinate) in &entities {
            store.put(entity, t, *coordinate)?;
            written += 1;
        }
    }
    Ok(written)
}
