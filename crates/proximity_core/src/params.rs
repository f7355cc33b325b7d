use serde::{Deserialize, Serialize};

use crate::error::ProximityError;

/// Neighbour radius used when none is configured (meters).
pub const DEFAULT_RADIUS_M: f64 = 2_000.0;
/// Seconds of candidate history scanned by a neighbour search, `now` included.
pub const DEFAULT_LOOKBACK_SECS: u32 = 10;
/// Seconds of history returned per trail, `now` included.
pub const DEFAULT_TRAIL_SECS: u32 = 60;

/// Tunables for neighbour search and trail reconstruction.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct SearchParams {
    /// Inclusive distance threshold in meters.
    pub radius_m: f64,
    pub lookback_secs: u32,
    pub trail_secs: u32,
}

impl Default for SearchParams {
    fn default() -> Self {
        Self {
            radius_m: DEFAULT_RADIUS_M,
            lookback_secs: DEFAULT_LOOKBACK_SECS,
            trail_secs: DEFAULT_TRAIL_SECS,
        }
    }
}

impl SearchParams {
    pub fn with_radius_m(mut self, radius_m: f64) -> Self {
        self.radius_m = radius_m;
        self
    }

    pub fn with_lookback_secs(mut self, lookback_secs: u32) -> Self {
        self.lookback_secs = lookback_secs;
        self
    }

    pub fn with_trail_secs(mut self, trail_secs: u32) -> Self {
        self.trail_secs = trail_secs;
        self
    }

    pub fn validate(&self) -> Result<(), ProximityError> {
        if !self.radius_m.is_finite() || self.radius_m < 0.0 {
            return Err(ProximityError::validation(format!(
                "radius_m must be a finite, non-negative number (got {})",
                self.radius_m
            )));
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn defaults_match_service_contract() {
        let params = SearchParams::default();
        assert_eq!(params.radius_m, 2_000.0);
        assert_eq!(params.lookback_secs, 10);
        assert_eq!(params.trail_secs, 60);
        assert!(params.validate().is_ok());
    }

    #[test]
    fn validate_rejects_negative_or_nan_radius() {
        assert!(SearchParams::default().with_radius_m(-1.0).validate().is_err());
        assert!(SearchParams::default().with_radius_m(f64::NAN).validate().is_err());
        assert!(SearchParams::default().with_radius_m(0.0).validate().is_ok());
    }
}
