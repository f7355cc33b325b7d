//! Shared application state

use std::sync::Arc;

use proximity_core::clock::{Clock, SystemClock};
use proximity_core::seed::{seed_demo, DEMO_DURATION_SECS};
use proximity_core::store::{build_location_store, LocationStore};
use proximity_core::ProximityService;
use tracing::info;

use crate::config::ServerConfig;
use crate::error::Result;

pub struct AppState {
    pub config: ServerConfig,
    pub service: ProximityService,
    pub clock: Arc<dyn Clock>,
}

impl AppState {
    /// Build the store selected by `config`, seeded if requested, on the wall clock.
    pub fn new(config: ServerConfig) -> Result<Self> {
        let store = build_location_store(&config.store_kind()).map_err(proximity_core::ProximityError::from)?;
        Self::with_parts(config, store, Arc::new(SystemClock))
    }

    /// Assemble state from an existing store and clock.
    pub fn with_parts(config: ServerConfig, store: Arc<dyn LocationStore>, clock: Arc<dyn Clock>) -> Result<Self> {
        let service = ProximityService::new(store, config.search_params())?;
        let state = Self {
            config,
            service,
            clock,
        };
        if state.config.seed_demo {
            state.seed()?;
        }
        Ok(state)
    }

    fn seed(&self) -> Result<()> {
        let start = self.clock.now();
        let written = seed_demo(self.service.store().as_ref(), start, DEMO_DURATION_SECS)
            .map_err(proximity_core::ProximityError::from)?;
        info!(
            component = "seed",
            event = "demo_seeded",
            start,
            duration_secs = DEMO_DURATION_SECS,
            samples = written,
            "Loaded demo positions"
        );
        Ok(())
    }
}
