use chrono::{DateTime, Utc};
use tracing::{debug, info};

use crate::config::Config;
use crate::geo;
use crate::types::{Fix, Point};

/// Where the session sits in the pickup → drop-off lifecycle.
///
/// One tagged value instead of loose booleans, so impossible combinations
/// (a drop-off before any pickup) cannot be represented.
#[derive(Debug, Clone, Copy, PartialEq)]
pub enum TripPhase {
    /// No fix seen yet this session.
    Idle,
    /// Waiting for a dwell near the session's first fix.
    PickupArmed {
        /// Spatial anchor for the start-radius comparison.
        anchor: Point,
    },
    /// Pickup recorded; waiting for a dwell after enough travel.
    /// `km_at_pickup` is absent when the trip was begun manually, in which
    /// case automatic drop-off never fires.
    DropoffArmed { km_at_pickup: Option<f64> },
    /// Drop-off recorded; fixes are ignored until reset.
    Complete,
}

/// A raw detector firing, before odometer suggestions are attached.
#[derive(Debug, Clone, Copy, PartialEq)]
pub enum Detection {
    Pickup { at: DateTime<Utc>, trip_km: f64 },
    Dropoff { at: DateTime<Utc> },
}

/// Infers discrete trip-start and trip-end events from classified fixes.
///
/// Dwell plus the start radius distinguishes a genuine stop from transient
/// low-speed readings at traffic lights; the minimum travel distance keeps
/// drop-off from firing while idling near the pickup point. Each event
/// fires at most once per session.
#[derive(Debug, Clone)]
pub struct TripDetector {
    start_radius_m: f64,
    min_travel_km: f64,
    phase: TripPhase,
}

impl TripDetector {
    #[must_use]
    pub const fn new(config: &Config) -> Self {
        Self {
            start_radius_m: config.start_radius_m,
            min_travel_km: config.min_travel_km,
            phase: TripPhase::Idle,
        }
    }

    #[must_use]
    pub const fn phase(&self) -> TripPhase {
        self.phase
    }

    /// Advances the state machine with one classified fix.
    ///
    /// `dwelling` is the motion classifier's verdict for this fix and
    /// `trip_km` the cumulative accepted distance at this instant.
    pub fn update(&mut self, fix: &Fix, dwelling: bool, trip_km: f64) -> Option<Detection> {
        match self.phase {
            TripPhase::Idle => {
                self.phase = TripPhase::PickupArmed { anchor: fix.point() };
                debug!(lat = fix.lat, lon = fix.lon, "session anchor recorded");
                None
            }
            TripPhase::PickupArmed { anchor } => {
                if !dwelling {
                    return None;
                }
                let radius_m = geo::distance_km(anchor, fix.point()) * 1000.0;
                if radius_m > self.start_radius_m {
                    return None;
                }
                self.phase = TripPhase::DropoffArmed { km_at_pickup: Some(trip_km) };
                info!(radius_m, trip_km, "pickup detected");
                Some(Detection::Pickup { at: fix.timestamp, trip_km })
            }
            TripPhase::DropoffArmed { km_at_pickup } => {
                let km_at_pickup = km_at_pickup?;
                if !dwelling {
                    return None;
                }
                let travelled = (trip_km - km_at_pickup).max(0.0);
                if travelled < self.min_travel_km {
                    return None;
                }
                self.phase = TripPhase::Complete;
                info!(travelled_km = travelled, "drop-off detected");
                Some(Detection::Dropoff { at: fix.timestamp })
            }
            TripPhase::Complete => None,
        }
    }

    /// Arms drop-off without a pickup fix, for a trip started by hand.
    pub fn begin_manually(&mut self) {
        self.phase = TripPhase::DropoffArmed { km_at_pickup: None };
    }

    /// Marks the trip complete, for a trip completed by hand.
    pub fn complete_manually(&mut self) {
        self.phase = TripPhase::Complete;
    }

    pub fn reset(&mut self) {
        self.phase = TripPhase::Idle;
    }

    /// Rebuilds the phase from persisted flags. The spatial anchor is
    /// ephemeral, so a restored pre-pickup session re-arms on its next fix.
    pub(crate) fn restore(
        &mut self,
        pickup_done: bool,
        dropoff_done: bool,
        km_at_pickup: Option<f64>,
    ) {
        self.phase = if dropoff_done {
            TripPhase::Complete
        } else if pickup_done {
            TripPhase::DropoffArmed { km_at_pickup }
        } else {
            TripPhase::Idle
        };
    }
}
