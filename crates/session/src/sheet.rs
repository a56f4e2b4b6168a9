use serde::{Deserialize, Serialize};
use tracing::{debug, info};

/// One row of the exportable trip sheet.
///
/// All fields are free text and empty by default; the engine fills times and
/// odometer readings as it detects events, and the driver can overwrite
/// anything before saving.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct TripRecord {
    pub service_user: String,
    pub origin: String,
    pub departure_time: String,
    pub start_km: String,
    pub destination: String,
    pub arrival_time: String,
    pub end_km: String,
}

impl TripRecord {
    /// True when every field is blank or whitespace.
    #[must_use]
    pub fn is_blank(&self) -> bool {
        [
            &self.service_user,
            &self.origin,
            &self.departure_time,
            &self.start_km,
            &self.destination,
            &self.arrival_time,
            &self.end_km,
        ]
        .iter()
        .all(|field| field.trim().is_empty())
    }
}

/// The sheet-level header block printed once per report.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct Header {
    pub date: String,
    pub sheet_number: String,
    pub plate: String,
    pub driver: String,
    pub depot_start_km: String,
    pub depot_end_km: String,
}

/// The session's saved records plus the in-progress draft.
///
/// The previous trip's end odometer is an explicit field here rather than
/// ambient state, so a new session can be seeded with it directly.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct TripSheet {
    pub header: Header,
    pub records: Vec<TripRecord>,
    pub draft: TripRecord,
    /// Index of the saved record currently loaded into the draft, if any.
    pub editing: Option<usize>,
    /// End odometer of the most recently completed trip, suggested as the
    /// next trip's starting value.
    pub last_trip_end_km: Option<i64>,
}

impl TripSheet {
    /// Saves the draft as a new record, or back over the record being
    /// edited. Declines when every field is blank.
    pub fn save_draft(&mut self) -> bool {
        if self.draft.is_blank() {
            debug!("draft is blank; nothing to save");
            return false;
        }
        match self.editing.take() {
            Some(index) if index < self.records.len() => {
                self.records[index] = self.draft.clone();
            }
            _ => self.records.push(self.draft.clone()),
        }
        info!(records = self.records.len(), "trip saved");
        true
    }

    /// Loads a saved record into the draft for editing.
    pub fn load(&mut self, index: usize) -> bool {
        let Some(record) = self.records.get(index) else {
            return false;
        };
        self.draft = record.clone();
        self.editing = Some(index);
        true
    }

    /// Deletes a saved record, clearing the draft when it was the one being
    /// edited and shifting the editing index past the gap otherwise.
    pub fn delete(&mut self, index: usize) -> bool {
        if index >= self.records.len() {
            return false;
        }
        match self.editing {
            Some(editing) if editing == index => {
                self.draft = TripRecord::default();
                self.editing = None;
            }
            Some(editing) if editing > index => self.editing = Some(editing - 1),
            _ => {}
        }
        self.records.remove(index);
        true
    }

    /// Remembers the draft's end odometer, to seed the next trip.
    pub fn carry_end_km(&mut self) {
        if let Ok(km) = self.draft.end_km.trim().parse::<i64>() {
            self.last_trip_end_km = Some(km);
        }
    }

    /// Clears the draft and any editing association.
    pub fn clear_draft(&mut self) {
        self.draft = TripRecord::default();
        self.editing = None;
    }
}

#[cfg(test)]
mod tests {
    use pretty_assertions::assert_eq;

    use super::*;

    fn draft_to(destination: &str) -> TripRecord {
        TripRecord { destination: destination.to_string(), ..TripRecord::default() }
    }

    #[test]
    fn blank_draft_is_not_saved() {
        let mut sheet = TripSheet::default();
        sheet.draft.origin = "   ".to_string();
        assert!(!sheet.save_draft());
        assert!(sheet.records.is_empty());
    }

    #[test]
    fn saving_appends_then_editing_replaces() {
        let mut sheet = TripSheet::default();
        sheet.draft = draft_to("Via Milano 2");
        assert!(sheet.save_draft());
        sheet.draft = draft_to("Via Torino 5");
        assert!(sheet.save_draft());
        assert_eq!(sheet.records.len(), 2);

        assert!(sheet.load(0));
        sheet.draft.destination = "Piazza Duomo 1".to_string();
        assert!(sheet.save_draft());
        assert_eq!(sheet.records.len(), 2);
        assert_eq!(sheet.records[0].destination, "Piazza Duomo 1");
        assert_eq!(sheet.editing, None);
    }

    #[test]
    fn deleting_the_edited_record_clears_the_draft() {
        let mut sheet = TripSheet::default();
        sheet.draft = draft_to("a");
        sheet.save_draft();
        sheet.load(0);
        assert!(sheet.delete(0));
        assert!(sheet.records.is_empty());
        assert!(sheet.draft.is_blank());
        assert_eq!(sheet.editing, None);
    }

    #[test]
    fn deleting_an_earlier_record_shifts_the_editing_index() {
        let mut sheet = TripSheet::default();
        for destination in ["a", "b", "c"] {
            sheet.draft = draft_to(destination);
            sheet.save_draft();
        }
        sheet.load(2);
        assert!(sheet.delete(0));
        assert_eq!(sheet.editing, Some(1));
        assert!(sheet.save_draft());
        assert_eq!(sheet.records[1].destination, "c");
    }

    #[test]
    fn carry_end_km_ignores_unparsable_text() {
        let mut sheet = TripSheet::default();
        sheet.draft.end_km = "12345".to_string();
        sheet.carry_end_km();
        assert_eq!(sheet.last_trip_end_km, Some(12345));

        sheet.draft.end_km = "n/a".to_string();
        sheet.carry_end_km();
        assert_eq!(sheet.last_trip_end_km, Some(12345));
    }
}
