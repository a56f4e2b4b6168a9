use std::time::Duration;

use chrono::{DateTime, Utc};

use crate::config::Config;

/// Normalizes a raw receiver speed into km/h.
///
/// Readings at or below `cutoff` are taken as m/s and converted; anything
/// above is assumed to already be km/h. This unit disambiguation is an
/// approximation carried over from field behavior, not a guarantee: a
/// genuine reading above 60 m/s (~216 km/h) would be misread as km/h.
#[must_use]
pub fn speed_kmh(raw: f64, cutoff: f64) -> f64 {
    if raw <= cutoff { raw * 3.6 } else { raw }
}

/// Classifies instantaneous speed into still/moving and tracks how long the
/// vehicle has been at rest.
#[derive(Debug, Clone)]
pub struct MotionClassifier {
    still_speed_kmh: f64,
    dwell: Duration,
    speed_kmh_cutoff: f64,
    still_since: Option<DateTime<Utc>>,
}

impl MotionClassifier {
    #[must_use]
    pub const fn new(config: &Config) -> Self {
        Self {
            still_speed_kmh: config.still_speed_kmh,
            dwell: config.dwell,
            speed_kmh_cutoff: config.speed_kmh_cutoff,
            still_since: None,
        }
    }

    /// Feeds one speed reading taken at `at`; returns whether the dwell
    /// condition holds at that instant.
    ///
    /// Stillness begins the first time speed drops to the threshold and ends
    /// the instant motion resumes; dwell holds once the vehicle has been
    /// continuously still for the configured duration.
    pub fn observe(&mut self, raw_speed: f64, at: DateTime<Utc>) -> bool {
        let kmh = speed_kmh(raw_speed, self.speed_kmh_cutoff);
        if kmh <= self.still_speed_kmh {
            if self.still_since.is_none() {
                self.still_since = Some(at);
            }
        } else {
            self.still_since = None;
        }
        self.dwelling(at)
    }

    /// Whether the dwell condition holds at `at` without feeding a reading.
    #[must_use]
    pub fn dwelling(&self, at: DateTime<Utc>) -> bool {
        self.still_since.is_some_and(|since| {
            at.signed_duration_since(since)
                .to_std()
                .is_ok_and(|elapsed| elapsed >= self.dwell)
        })
    }

    /// When the current stillness began, if the vehicle is at rest.
    #[must_use]
    pub const fn still_since(&self) -> Option<DateTime<Utc>> {
        self.still_since
    }

    pub fn reset(&mut self) {
        self.still_since = None;
    }
}
