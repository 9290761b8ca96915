use chrono::NaiveDate;
use serde::Serialize;

use crate::error::AttendanceResult;
use crate::model::attendance::{AttendanceRecord, AttendanceStatus};
use crate::service::store_failure;
use crate::store::{AttendanceStore, DateRange, UserStore};

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub struct TodayStats {
    /// Everyone who showed up at all: present, late, or half-day.
    pub present: u32,
    pub late: u32,
    pub absent: u32,
    pub total: u32,
}

/// One per-user row of the live dashboard; also the input rows for the
/// external CSV exporter.
#[derive(Debug, Clone, Serialize)]
pub struct TodayRow {
    pub user_id: u64,
    pub name: String,
    pub department: String,
    pub record: AttendanceRecord,
}

#[derive(Debug, Clone, Serialize)]
pub struct TodayOverview {
    pub stats: TodayStats,
    pub rows: Vec<TodayRow>,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct TeamMemberSummary {
    pub user_id: u64,
    pub name: String,
    pub department: String,
    pub present: u32,
    pub late: u32,
    pub absent: u32,
    pub total_hours: f64,
}

/// Team-level reporting over the whole record set. Read-only.
pub struct ManagerService<S, U> {
    store: S,
    users: U,
}

impl<S: AttendanceStore, U: UserStore> ManagerService<S, U> {
    pub fn new(store: S, users: U) -> Self {
        Self { store, users }
    }

    /// Same-day snapshot for the live dashboard.
    pub fn today_overview(&self, date: NaiveDate) -> AttendanceResult<TodayOverview> {
        let records = self.store.query_by_date(date).map_err(store_failure)?;

        let present = records
            .iter()
            .filter(|r| {
                matches!(
                    r.status,
                    AttendanceStatus::Present | AttendanceStatus::Late | AttendanceStatus::HalfDay
                )
            })
            .count() as u32;
        let late = records
            .iter()
            .filter(|r| r.status == AttendanceStatus::Late)
            .count() as u32;
        let absent = records
            .iter()
            .filter(|r| r.status == AttendanceStatus::Absent)
            .count() as u32;
        let total = records.len() as u32;

        let rows = records
            .into_iter()
            .map(|record| {
                let (name, department) = self.user_label(record.user_id)?;
                Ok(TodayRow {
                    user_id: record.user_id,
                    name,
                    department,
                    record,
                })
            })
            .collect::<AttendanceResult<Vec<_>>>()?;

        Ok(TodayOverview {
            stats: TodayStats {
                present,
                late,
                absent,
                total,
            },
            rows,
        })
    }

    /// Group-by-user rollup over a date range, one row per user.
    pub fn team_summary(
        &self,
        range: Option<DateRange>,
    ) -> AttendanceResult<Vec<TeamMemberSummary>> {
        let totals = self.store.aggregate_by_user(range).map_err(store_failure)?;

        totals
            .into_iter()
            .map(|row| {
                let (name, department) = self.user_label(row.user_id)?;
                Ok(TeamMemberSummary {
                    user_id: row.user_id,
                    name,
                    department,
                    present: row.present,
                    late: row.late,
                    absent: row.absent,
                    total_hours: row.total_hours,
                })
            })
            .collect()
    }

    /// Records can outlive their user entity; such rows keep empty labels.
    fn user_label(&self, user_id: u64) -> AttendanceResult<(String, String)> {
        Ok(self
            .users
            .find_user(user_id)
            .map_err(store_failure)?
            .map(|user| (user.name, user.department))
            .unwrap_or_default())
    }
}
