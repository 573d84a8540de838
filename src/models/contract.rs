use super::point::GeoPoint;
use chrono::{DateTime, Utc};
use serde::Serialize;

/// A scheduled work assignment with a time window, a location and a set of
/// assigned workers. "Active" is derived from `now` vs `[start_at, end_at]`;
/// there is no explicit status column.
#[derive(Debug, Clone, Serialize)]
pub struct Contract {
    pub id: i64,
    pub tenant_id: i64,
    pub location: GeoPoint,     // ⇔ contracts.lat / contracts.lon
    pub start_at: DateTime<Utc>, // ⇔ contracts.start_at (TEXT, RFC 3339)
    pub end_at: DateTime<Utc>,   // ⇔ contracts.end_at (TEXT, RFC 3339)
    pub description: Option<String>,
    pub break_minutes: Option<i64>,
    pub is_template: bool,      // templates are excluded from scheduling/attendance
    pub template_name: Option<String>,
    pub repetition_count: i64,  // number of generated siblings
    pub created_at: String,     // RFC 3339
    pub deleted: bool,

    /// Assigned workers, in assignment order. Loaded from `contract_workers`.
    pub worker_ids: Vec<i64>,
    /// Attached tasks. Loaded from `contract_tasks`.
    pub task_ids: Vec<i64>,
}

impl Contract {
    pub fn duration(&self) -> chrono::Duration {
        self.end_at - self.start_at
    }

    pub fn is_active_at(&self, now: DateTime<Utc>) -> bool {
        !self.is_template && !self.deleted && self.start_at <= now && now <= self.end_at
    }
}

/// Fields accepted by the create path, before ids exist.
#[derive(Debug, Clone)]
pub struct NewContract {
    pub location: GeoPoint,
    pub start_at: DateTime<Utc>,
    pub end_at: DateTime<Utc>,
    pub description: Option<String>,
    pub break_minutes: Option<i64>,
    pub worker_ids: Vec<i64>,
    pub task_ids: Vec<i64>,
    pub repetition_days: i64,
}

/// Partial update; `None` leaves the field untouched.
#[derive(Debug, Clone, Default)]
pub struct ContractPatch {
    pub location: Option<GeoPoint>,
    pub start_at: Option<DateTime<Utc>>,
    pub end_at: Option<DateTime<Utc>>,
    pub description: Option<String>,
    pub break_minutes: Option<i64>,
    pub worker_ids: Option<Vec<i64>>,
    pub task_ids: Option<Vec<i64>>,
}
