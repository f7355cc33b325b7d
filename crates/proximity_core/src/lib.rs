//! Time-windowed proximity tracking for moving entities.
//!
//! Samples are stored per entity and per second in a [`store::LocationStore`].
//! On top of it, [`proximity::find_neighbours`] answers "who has been near this
//! entity recently" and [`trail::build_trail`] returns an entity's recent
//! movement. [`service::ProximityService`] ties the two into the operations
//! exposed to callers.

pub mod clock;
pub mod error;
pub mod params;
pub mod proximity;
pub mod seed;
pub mod service;
pub mod spatial;
pub mod store;
pub mod trail;

#[cfg(any(test, feature = "test-helpers"))]
pub mod test_helpers;

pub use error::{ProximityError, ProximityResult, StoreError};
pub use service::{NeighbourTrail, ProximityService, RecordedLocation};
pub use spatial::{distance_m, Coordinate};
pub use store::{EntityId, LocationStore, Timestamp};
