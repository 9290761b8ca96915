use chrono::{DateTime, NaiveDate, Utc};
use serde::{Deserialize, Serialize};
use strum_macros::{Display, EnumString};

#[derive(
    Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize, Display, EnumString,
)]
#[serde(rename_all = "kebab-case")]
#[strum(serialize_all = "kebab-case")]
pub enum AttendanceStatus {
    Present,
    Absent,
    Late,
    HalfDay,
}

#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct GeoPoint {
    pub lat: f64,
    pub lng: f64,
}

#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct BreakEntry {
    pub start_time: DateTime<Utc>,
    pub end_time: Option<DateTime<Utc>>,
}

/// One attendance document per (user, calendar day). The day key is the
/// date of the check-in instant in the reference time zone (UTC).
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct AttendanceRecord {
    pub user_id: u64,
    pub date: NaiveDate,
    pub check_in_time: Option<DateTime<Utc>>,
    pub check_out_time: Option<DateTime<Utc>>,
    pub status: AttendanceStatus,
    /// Derived at check-out, never an input.
    pub total_hours: f64,
    pub breaks: Vec<BreakEntry>,
    pub check_in_location: Option<GeoPoint>,
    pub check_out_location: Option<GeoPoint>,
    pub notes: Option<String>,
    pub created_at: DateTime<Utc>,
}

impl AttendanceRecord {
    pub fn new_check_in(
        user_id: u64,
        at: DateTime<Utc>,
        status: AttendanceStatus,
        location: GeoPoint,
        notes: Option<String>,
    ) -> Self {
        Self {
            user_id,
            date: at.date_naive(),
            check_in_time: Some(at),
            check_out_time: None,
            status,
            total_hours: 0.0,
            breaks: Vec::new(),
            check_in_location: Some(location),
            check_out_location: None,
            notes,
            created_at: at,
        }
    }

    pub fn has_checked_out(&self) -> bool {
        self.check_out_time.is_some()
    }

    pub fn has_open_break(&self) -> bool {
        self.breaks.iter().any(|b| b.end_time.is_none())
    }

    /// Earliest-started break that has not been ended yet.
    pub fn open_break_mut(&mut self) -> Option<&mut BreakEntry> {
        self.breaks
            .iter_mut()
            .filter(|b| b.end_time.is_none())
            .min_by_key(|b| b.start_time)
    }
}
