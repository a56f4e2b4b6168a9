use chrono::{DateTime, Utc};
use chrono_tz::Tz;
use tracing::{debug, info, warn};

use crate::config::Config;
use crate::detector::{Detection, TripDetector, TripPhase};
use crate::error::Error;
use crate::extract::{self, Extraction};
use crate::motion::MotionClassifier;
use crate::odometer::Odometer;
use crate::sheet::TripSheet;
use crate::snapshot::Snapshot;
use crate::track::{DistanceTracker, FixOutcome};
use crate::types::{Fix, TripEvent};

/// The trip session engine.
///
/// A synchronous state machine the shell drives with location fixes, pasted
/// text, and driver commands. Fixes must be delivered in arrival order; for
/// a given ordered input sequence the engine is deterministic regardless of
/// delivery cadence.
pub struct TripEngine {
    config: Config,
    timezone: Tz,
    tracker: DistanceTracker,
    motion: MotionClassifier,
    detector: TripDetector,
    odometer: Odometer,
    sheet: TripSheet,
    tracking: bool,
}

impl TripEngine {
    #[must_use]
    pub fn new(config: Config) -> Self {
        let timezone = parse_timezone(&config);
        Self {
            timezone,
            tracker: DistanceTracker::new(&config),
            motion: MotionClassifier::new(&config),
            detector: TripDetector::new(&config),
            odometer: Odometer::default(),
            sheet: TripSheet::default(),
            tracking: false,
            config,
        }
    }

    /// Starts a fresh tracking session. Trip-local state is cleared; the
    /// odometer anchor survives.
    pub fn start_tracking(&mut self) {
        self.reset_session();
        self.tracking = true;
        info!("tracking started");
    }

    pub fn stop_tracking(&mut self) {
        self.tracking = false;
        info!(trip_km = self.tracker.trip_km(), "tracking stopped");
    }

    #[must_use]
    pub const fn is_tracking(&self) -> bool {
        self.tracking
    }

    /// Clears all trip-local state: the distance baseline and trip total,
    /// the stillness timer, and the detector phase. The odometer anchor is
    /// a real-world continuous quantity and is left alone.
    pub fn reset_session(&mut self) {
        self.tracker.reset();
        self.motion.reset();
        self.detector.reset();
    }

    /// Feeds one location fix through filter → accumulate → classify →
    /// detect, returning the decorated event when the detector fires.
    ///
    /// Fixes delivered while tracking is off are ignored.
    pub fn handle_fix(&mut self, fix: &Fix) -> Option<TripEvent> {
        if !self.tracking {
            return None;
        }
        let delta = match self.tracker.accept(fix) {
            FixOutcome::Rejected => return None,
            FixOutcome::First => 0.0,
            FixOutcome::Accepted(delta) => delta,
        };
        self.odometer.add_km(delta);

        let dwelling = self.motion.observe(fix.speed, fix.timestamp);
        let detection = self.detector.update(fix, dwelling, self.tracker.trip_km())?;
        Some(match detection {
            Detection::Pickup { at, .. } => self.on_pickup(at),
            Detection::Dropoff { at } => self.on_dropoff(at),
        })
    }

    fn on_pickup(&mut self, at: DateTime<Utc>) -> TripEvent {
        self.sheet.draft.departure_time = self.local_hhmm(at);
        let suggested = self
            .sheet
            .last_trip_end_km
            .unwrap_or_else(|| self.odometer.displayed());
        if self.sheet.draft.start_km.trim().is_empty() {
            self.sheet.draft.start_km = suggested.to_string();
        }
        TripEvent::Pickup { at, suggested_start_km: suggested }
    }

    fn on_dropoff(&mut self, at: DateTime<Utc>) -> TripEvent {
        self.sheet.draft.arrival_time = self.local_hhmm(at);
        let start_km = self.sheet.draft.start_km.trim().parse::<i64>().unwrap_or(0);
        let suggested = start_km + self.odometer.km_since_anchor();
        self.sheet.draft.end_km = suggested.to_string();
        self.sheet.last_trip_end_km = Some(suggested);
        TripEvent::Dropoff { at, suggested_end_km: suggested }
    }

    /// Marks the trip as started by hand: stamps the departure time and
    /// disarms automatic pickup detection.
    pub fn begin_trip(&mut self, at: DateTime<Utc>) {
        self.sheet.draft.departure_time = self.local_hhmm(at);
        self.detector.begin_manually();
    }

    /// Marks the trip as completed by hand: stamps the arrival time and
    /// fills the end odometer from the current displayed value.
    pub fn complete_trip(&mut self, at: DateTime<Utc>) {
        self.sheet.draft.arrival_time = self.local_hhmm(at);
        let displayed = self.odometer.displayed();
        self.sheet.draft.end_km = displayed.to_string();
        self.sheet.last_trip_end_km = Some(displayed);
        self.detector.complete_manually();
    }

    /// Saves the draft trip and prepares the next one. When only the start
    /// odometer is known, the end value is filled in from the kilometres
    /// travelled since the anchor. Returns false, changing nothing, when
    /// the draft is entirely blank.
    pub fn save_trip(&mut self) -> bool {
        let start = self.sheet.draft.start_km.trim().to_string();
        if self.sheet.draft.end_km.trim().is_empty()
            && !start.is_empty()
            && let Ok(start_km) = start.parse::<i64>()
        {
            self.sheet.draft.end_km = (start_km + self.odometer.km_since_anchor()).to_string();
        }
        if !self.sheet.save_draft() {
            return false;
        }
        self.prepare_next_trip();
        true
    }

    /// Abandons the draft and resets for the next trip. The draft's end
    /// odometer, if parsable, is still carried forward.
    pub fn new_trip(&mut self) {
        self.prepare_next_trip();
    }

    fn prepare_next_trip(&mut self) {
        self.sheet.carry_end_km();
        self.sheet.clear_draft();
        self.reset_session();
    }

    /// Applies a driver-entered odometer reading as the new anchor and
    /// returns the confirmed value.
    ///
    /// # Errors
    ///
    /// Returns [`Error::OdometerParse`] for non-integer input and
    /// [`Error::OdometerNegative`] for values below zero; state is unchanged
    /// either way so the caller can re-prompt.
    pub fn recalibrate_text(&mut self, raw: &str) -> Result<i64, Error> {
        let trimmed = raw.trim();
        let value = match trimmed.parse::<i64>() {
            Ok(value) => value,
            Err(err) => {
                debug!(input = trimmed, error = %err, "odometer input rejected");
                return Err(Error::OdometerParse(trimmed.to_string()));
            }
        };
        self.odometer.recalibrate(value)?;
        Ok(value)
    }

    /// The integer odometer reading to display.
    #[must_use]
    pub fn displayed_km(&self) -> i64 {
        self.odometer.displayed()
    }

    /// Whole kilometres travelled since the last anchor confirmation.
    #[must_use]
    pub fn km_since_anchor(&self) -> i64 {
        self.odometer.km_since_anchor()
    }

    /// Raw cumulative kilometres for this trip, for status display.
    #[must_use]
    pub const fn trip_km(&self) -> f64 {
        self.tracker.trip_km()
    }

    #[must_use]
    pub const fn phase(&self) -> TripPhase {
        self.detector.phase()
    }

    #[must_use]
    pub const fn sheet(&self) -> &TripSheet {
        &self.sheet
    }

    pub const fn sheet_mut(&mut self) -> &mut TripSheet {
        &mut self.sheet
    }

    #[must_use]
    pub const fn config(&self) -> &Config {
        &self.config
    }

    /// Extracts fields from pasted text and applies them to the draft.
    /// Returns false when nothing usable was found.
    pub fn import_text(&mut self, text: &str) -> bool {
        let extraction = extract::extract_fields(text);
        self.apply_extraction(&extraction)
    }

    /// Applies an extraction onto the draft, field by field. Fields the
    /// extractor did not produce are left as they are.
    pub fn apply_extraction(&mut self, extraction: &Extraction) -> bool {
        if extraction.is_empty() {
            return false;
        }
        if let Some(service_user) = &extraction.service_user {
            self.sheet.draft.service_user = service_user.clone();
        }
        if let Some(origin) = &extraction.origin {
            self.sheet.draft.origin = origin.clone();
        }
        if let Some(destination) = &extraction.destination {
            self.sheet.draft.destination = destination.clone();
        }
        info!("draft filled from imported text");
        true
    }

    /// Captures the engine's full mutable state as a flat snapshot.
    #[must_use]
    pub fn snapshot(&self) -> Snapshot {
        let (pickup_done, dropoff_done, km_at_pickup) = match self.detector.phase() {
            TripPhase::Idle | TripPhase::PickupArmed { .. } => (false, false, None),
            TripPhase::DropoffArmed { km_at_pickup } => (true, false, km_at_pickup),
            TripPhase::Complete => (true, true, None),
        };
        Snapshot {
            header: self.sheet.header.clone(),
            records: self.sheet.records.clone(),
            draft: self.sheet.draft.clone(),
            editing: self.sheet.editing,
            last_trip_end_km: self.sheet.last_trip_end_km,
            tracking: self.tracking,
            trip_km: self.tracker.trip_km(),
            anchor_value: self.odometer.anchor_value(),
            total_km: self.odometer.total_km(),
            anchor_km: self.odometer.anchor_km(),
            pickup_done,
            dropoff_done,
            km_at_pickup,
            saved_at: None,
        }
    }

    /// Restores a snapshot into this engine. Ephemeral fix state (the
    /// distance baseline and the stillness timer) is not part of a snapshot
    /// and starts fresh.
    pub fn restore(&mut self, snapshot: &Snapshot) {
        self.sheet = TripSheet {
            header: snapshot.header.clone(),
            records: snapshot.records.clone(),
            draft: snapshot.draft.clone(),
            editing: snapshot.editing,
            last_trip_end_km: snapshot.last_trip_end_km,
        };
        self.tracking = snapshot.tracking;
        self.tracker.restore_trip_km(snapshot.trip_km);
        self.motion.reset();
        self.odometer =
            Odometer::restore(snapshot.anchor_value, snapshot.total_km, snapshot.anchor_km);
        self.detector
            .restore(snapshot.pickup_done, snapshot.dropoff_done, snapshot.km_at_pickup);
        info!(records = self.sheet.records.len(), "engine state restored");
    }

    fn local_hhmm(&self, at: DateTime<Utc>) -> String {
        at.with_timezone(&self.timezone).format("%H:%M").to_string()
    }
}

impl Default for TripEngine {
    fn default() -> Self {
        Self::new(Config::default())
    }
}

fn parse_timezone(config: &Config) -> Tz {
    match config.timezone.parse::<Tz>() {
        Ok(tz) => tz,
        Err(err) => {
            warn!(timezone = %config.timezone, error = %err, "invalid timezone; defaulting to UTC");
            chrono_tz::UTC
        }
    }
}
