use tracing::trace;

use crate::config::Config;
use crate::geo;
use crate::types::{Fix, Point};

/// Outcome of feeding one fix to the tracker.
#[derive(Debug, Clone, Copy, PartialEq)]
pub enum FixOutcome {
    /// Reported accuracy was beyond the limit; no state changed at all.
    Rejected,
    /// First fix of the session; it becomes the baseline and contributes no
    /// distance.
    First,
    /// Fix accepted, carrying the delta (km) added to the trip total. A
    /// delta beyond the plausible bound is reported as 0.0; the fix still
    /// replaces the baseline so a single glitch cannot poison every
    /// subsequent delta.
    Accepted(f64),
}

/// Accumulates plausible inter-fix distances for the current trip.
///
/// The trip total only ever grows; the sole way down is [`reset`] at a
/// session boundary.
///
/// [`reset`]: DistanceTracker::reset
#[derive(Debug, Clone)]
pub struct DistanceTracker {
    accuracy_limit_m: f64,
    max_delta_km: f64,
    last: Option<Point>,
    trip_km: f64,
}

impl DistanceTracker {
    #[must_use]
    pub const fn new(config: &Config) -> Self {
        Self {
            accuracy_limit_m: config.accuracy_limit_m,
            max_delta_km: config.max_delta_km,
            last: None,
            trip_km: 0.0,
        }
    }

    /// Filters one fix and accumulates its distance contribution.
    pub fn accept(&mut self, fix: &Fix) -> FixOutcome {
        if fix.accuracy_m > self.accuracy_limit_m {
            trace!(accuracy_m = fix.accuracy_m, "fix rejected for accuracy");
            return FixOutcome::Rejected;
        }

        let point = fix.point();
        let Some(last) = self.last else {
            self.last = Some(point);
            return FixOutcome::First;
        };

        let delta = geo::distance_km(last, point);
        self.last = Some(point);
        if delta <= self.max_delta_km {
            self.trip_km += delta;
            FixOutcome::Accepted(delta)
        } else {
            trace!(delta_km = delta, "distance delta outside plausible bound");
            FixOutcome::Accepted(0.0)
        }
    }

    /// Cumulative accepted distance for this trip, in kilometres.
    #[must_use]
    pub const fn trip_km(&self) -> f64 {
        self.trip_km
    }

    /// Clears the baseline and zeroes the trip total.
    pub fn reset(&mut self) {
        self.last = None;
        self.trip_km = 0.0;
    }

    /// Reinstates a persisted trip total. The baseline fix is ephemeral and
    /// starts empty.
    pub(crate) fn restore_trip_km(&mut self, trip_km: f64) {
        self.last = None;
        self.trip_km = trip_km;
    }
}

#[cfg(test)]
mod tests {
    use chrono::{TimeZone, Utc};

    use super::*;

    fn fix(lat: f64, accuracy_m: f64) -> Fix {
        Fix {
            lat,
            lon: 9.0,
            accuracy_m,
            speed: 0.0,
            timestamp: Utc.with_ymd_and_hms(2025, 6, 1, 8, 0, 0).unwrap(),
        }
    }

    #[test]
    fn first_fix_contributes_nothing() {
        let mut tracker = DistanceTracker::new(&Config::default());
        assert_eq!(tracker.accept(&fix(45.0, 10.0)), FixOutcome::First);
        assert!(tracker.trip_km().abs() < f64::EPSILON);
    }

    #[test]
    fn accumulates_sum_of_accepted_deltas() {
        let mut tracker = DistanceTracker::new(&Config::default());
        tracker.accept(&fix(45.0, 10.0));
        let mut expected = 0.0;
        for step in 1..=5 {
            let outcome = tracker.accept(&fix(45.0 + f64::from(step) * 0.001, 10.0));
            let FixOutcome::Accepted(delta) = outcome else {
                panic!("fix should be accepted");
            };
            expected += delta;
            // Monotonically non-decreasing at every step.
            assert!(tracker.trip_km() >= expected - f64::EPSILON);
        }
        assert!((tracker.trip_km() - expected).abs() < 1e-12);
        // Five steps of ~111 m each.
        assert!((tracker.trip_km() - 0.556).abs() < 0.01);
    }

    #[test]
    fn inaccurate_fix_changes_nothing() {
        let mut tracker = DistanceTracker::new(&Config::default());
        tracker.accept(&fix(45.0, 10.0));
        tracker.accept(&fix(45.001, 10.0));
        let before = tracker.trip_km();

        assert_eq!(tracker.accept(&fix(45.5, 150.0)), FixOutcome::Rejected);
        assert!((tracker.trip_km() - before).abs() < f64::EPSILON);

        // The rejected fix did not become the baseline either: the next good
        // fix measures from 45.001, not 45.5.
        let FixOutcome::Accepted(delta) = tracker.accept(&fix(45.002, 10.0)) else {
            panic!("fix should be accepted");
        };
        assert!((delta - 0.1112).abs() < 0.001);
    }

    #[test]
    fn glitch_delta_is_excluded_but_fix_becomes_baseline() {
        let mut tracker = DistanceTracker::new(&Config::default());
        tracker.accept(&fix(45.0, 10.0));
        let before = tracker.trip_km();

        // ~5.5 km jump: excluded from the total.
        assert_eq!(tracker.accept(&fix(45.05, 10.0)), FixOutcome::Accepted(0.0));
        assert!((tracker.trip_km() - before).abs() < f64::EPSILON);

        // But the jump target is the new baseline, so travel resumes from it.
        let FixOutcome::Accepted(delta) = tracker.accept(&fix(45.051, 10.0)) else {
            panic!("fix should be accepted");
        };
        assert!((delta - 0.1112).abs() < 0.001);
    }

    #[test]
    fn reset_zeroes_the_trip() {
        let mut tracker = DistanceTracker::new(&Config::default());
        tracker.accept(&fix(45.0, 10.0));
        tracker.accept(&fix(45.001, 10.0));
        assert!(tracker.trip_km() > 0.0);

        tracker.reset();
        assert!(tracker.trip_km().abs() < f64::EPSILON);
        assert_eq!(tracker.accept(&fix(45.0, 10.0)), FixOutcome::First);
    }
}
