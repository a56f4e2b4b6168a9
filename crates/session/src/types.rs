use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

/// A single GPS sample as delivered by the location source.
///
/// Fixes are ephemeral: the engine consumes each one immediately and retains
/// at most the last accepted position as the baseline for the next delta.
#[derive(Debug, Clone, Copy, PartialEq, Deserialize, Serialize)]
pub struct Fix {
    /// Latitude in degrees.
    pub lat: f64,
    /// Longitude in degrees.
    pub lon: f64,
    /// Reported horizontal accuracy in metres. Sources that omit it get a
    /// sentinel large enough to be rejected by the accuracy gate.
    #[serde(default = "default_accuracy")]
    pub accuracy_m: f64,
    /// Instantaneous speed as reported by the receiver, nominally m/s.
    /// Some sources deliver km/h instead; see [`crate::motion::speed_kmh`].
    #[serde(default)]
    pub speed: f64,
    /// UTC timestamp of the reading.
    pub timestamp: DateTime<Utc>,
}

const fn default_accuracy() -> f64 {
    9999.0
}

impl Fix {
    /// The fix's coordinate pair.
    #[must_use]
    pub const fn point(&self) -> Point {
        Point { lat: self.lat, lon: self.lon }
    }
}

/// A latitude/longitude pair in degrees.
#[derive(Debug, Clone, Copy, PartialEq, Deserialize, Serialize)]
pub struct Point {
    pub lat: f64,
    pub lon: f64,
}

/// An event emitted by the engine when the pickup/drop-off detector fires,
/// decorated with the odometer value the consumer should suggest.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum TripEvent {
    /// The trip started: the vehicle dwelled near the session's first fix.
    Pickup {
        at: DateTime<Utc>,
        suggested_start_km: i64,
    },
    /// The trip ended: the vehicle dwelled after enough travel.
    Dropoff {
        at: DateTime<Utc>,
        suggested_end_km: i64,
    },
}
