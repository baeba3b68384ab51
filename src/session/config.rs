use std::time::Duration;

use serde::{Deserialize, Serialize};

/// Tunable constants for interval tracking. The defaults were picked
/// empirically against browser `timeupdate` cadence.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default, rename_all = "camelCase")]
pub struct TrackingConfig {
    /// Largest gap between a sample and the open span's end that still counts
    /// as continuous playback.
    pub continuity_tolerance_secs: f64,

    /// Width of the span seeded at a seek/skip target.
    pub seek_bridge_secs: f64,

    /// Width of a span opened by a discontinuous sample.
    pub fresh_span_secs: f64,

    /// Periodic flush cadence while playing.
    pub flush_interval_secs: u64,

    /// Volume restored when unmuting at zero volume.
    pub unmute_volume: f64,
}

impl Default for TrackingConfig {
    fn default() -> Self {
        Self {
            continuity_tolerance_secs: 1.5,
            seek_bridge_secs: 0.1,
            fresh_span_secs: 0.01,
            flush_interval_secs: 5,
            unmute_volume: 0.5,
        }
    }
}

impl TrackingConfig {
    pub fn flush_interval(&self) -> Duration {
        Duration::from_secs(self.flush_interval_secs.max(1))
    }

    /// Applies `WATCHTRACK_FLUSH_SECS` when it holds a positive integer.
    pub fn with_env_overrides(mut self) -> Self {
        if let Some(secs) = std::env::var("WATCHTRACK_FLUSH_SECS")
            .ok()
            .and_then(|value| value.trim().parse::<u64>().ok())
            .filter(|secs| *secs > 0)
        {
            self.flush_interval_secs = secs;
        }
        self
    }
}
