use tracing::info;

use crate::error::Error;

/// Reconciles the fractional GPS accumulator with the integer odometer the
/// driver sees.
///
/// The anchor pairs the last confirmed integer reading with the accumulator
/// value at the moment of confirmation; every displayed value is the anchor
/// plus the whole kilometres travelled since. Unlike the per-trip
/// accumulator, the running total here is never reset: the odometer is a
/// real-world continuous quantity across trips.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct Odometer {
    anchor_value: i64,
    total_km: f64,
    anchor_km: f64,
}

impl Odometer {
    /// Adds one accepted GPS delta to the running total.
    pub fn add_km(&mut self, delta: f64) {
        self.total_km += delta;
    }

    /// Whole kilometres travelled since the anchor was confirmed, rounded
    /// up. Never negative.
    #[must_use]
    #[allow(clippy::cast_possible_truncation)]
    pub fn km_since_anchor(&self) -> i64 {
        (self.total_km - self.anchor_km).max(0.0).ceil() as i64
    }

    /// The integer odometer reading to display.
    #[must_use]
    pub fn displayed(&self) -> i64 {
        self.anchor_value.saturating_add(self.km_since_anchor())
    }

    /// Confirms a driver-entered reading as the new anchor. Immediately
    /// afterwards, [`displayed`] equals `value`.
    ///
    /// # Errors
    ///
    /// Returns [`Error::OdometerNegative`] for values below zero; state is
    /// left untouched so the caller can re-prompt.
    ///
    /// [`displayed`]: Odometer::displayed
    pub fn recalibrate(&mut self, value: i64) -> Result<(), Error> {
        if value < 0 {
            return Err(Error::OdometerNegative(value));
        }
        self.anchor_value = value;
        self.anchor_km = self.total_km;
        info!(anchor = value, "odometer recalibrated");
        Ok(())
    }

    #[must_use]
    pub const fn anchor_value(&self) -> i64 {
        self.anchor_value
    }

    #[must_use]
    pub const fn total_km(&self) -> f64 {
        self.total_km
    }

    #[must_use]
    pub const fn anchor_km(&self) -> f64 {
        self.anchor_km
    }

    pub(crate) const fn restore(anchor_value: i64, total_km: f64, anchor_km: f64) -> Self {
        Self { anchor_value, total_km, anchor_km }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn displayed_rounds_travel_up() {
        let mut odometer = Odometer::default();
        odometer.recalibrate(120).unwrap();
        assert_eq!(odometer.displayed(), 120);

        odometer.add_km(0.2);
        assert_eq!(odometer.km_since_anchor(), 1);
        assert_eq!(odometer.displayed(), 121);

        odometer.add_km(1.0);
        assert_eq!(odometer.displayed(), 122);
    }

    #[test]
    fn recalibrate_pins_the_displayed_value() {
        let mut odometer = Odometer::default();
        odometer.add_km(7.3);
        for value in [0, 1, 99, 100_000] {
            odometer.recalibrate(value).unwrap();
            assert_eq!(odometer.displayed(), value);
        }
    }

    #[test]
    fn negative_recalibration_is_rejected_without_mutation() {
        let mut odometer = Odometer::default();
        odometer.recalibrate(50).unwrap();
        odometer.add_km(2.4);
        let before = odometer.clone();

        let err = odometer.recalibrate(-3).unwrap_err();
        assert!(matches!(err, Error::OdometerNegative(-3)));
        assert_eq!(odometer, before);
        assert_eq!(odometer.displayed(), 53);
    }

    #[test]
    fn travel_before_the_anchor_never_counts_backwards() {
        let mut odometer = Odometer::default();
        odometer.add_km(5.0);
        odometer.recalibrate(10).unwrap();
        // The anchor snapshots the accumulator; prior travel is absorbed.
        assert_eq!(odometer.displayed(), 10);
        odometer.add_km(0.4);
        assert_eq!(odometer.displayed(), 11);
    }
}
