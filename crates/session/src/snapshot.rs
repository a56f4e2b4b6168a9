use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use crate::sheet::{Header, TripRecord};

/// Flat, serializable image of the engine's full mutable state.
///
/// This is the blob the shell persists between launches. Restoring a
/// snapshot reproduces the displayed odometer and all trip records
/// bit-for-bit; ephemeral fix state (the distance baseline and stillness
/// timer) is intentionally absent and starts fresh after a restore.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct Snapshot {
    pub header: Header,
    pub records: Vec<TripRecord>,
    pub draft: TripRecord,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub editing: Option<usize>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub last_trip_end_km: Option<i64>,
    pub tracking: bool,
    /// Cumulative accepted kilometres for the in-progress trip.
    pub trip_km: f64,
    /// The odometer anchor triple; see [`crate::odometer::Odometer`].
    pub anchor_value: i64,
    pub total_km: f64,
    pub anchor_km: f64,
    pub pickup_done: bool,
    pub dropoff_done: bool,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub km_at_pickup: Option<f64>,
    /// Informational; stamped by the shell when it persists the blob.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub saved_at: Option<DateTime<Utc>>,
}
