use super::point::GeoPoint;
use chrono::{DateTime, NaiveDate, Utc};
use serde::Serialize;

/// One clock-in/clock-out attendance record for (worker, contract, day).
/// "Open" means the departure half is still null. Records are never deleted;
/// system-generated remarks accumulate in `notes`.
#[derive(Debug, Clone, Serialize)]
pub struct Presence {
    pub id: i64,
    pub worker_id: i64,
    pub contract_id: i64,
    pub day: NaiveDate, // ⇔ presences.day (TEXT "YYYY-MM-DD", tenant-local)
    pub arrival_at: DateTime<Utc>,
    pub arrival_location: GeoPoint,
    pub departure_at: Option<DateTime<Utc>>,
    pub departure_location: Option<GeoPoint>,
    pub notes: String,
}

impl Presence {
    pub fn is_open(&self) -> bool {
        self.departure_at.is_none()
    }

    /// Append a system-generated remark, space-separated.
    pub fn push_note(&mut self, note: &str) {
        if self.notes.is_empty() {
            self.notes = note.to_string();
        } else {
            self.notes.push(' ');
            self.notes.push_str(note);
        }
    }
}
