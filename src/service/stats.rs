use chrono::{DateTime, Datelike, Days, NaiveDate, Utc};
use serde::Serialize;
use strum_macros::Display;

use crate::error::AttendanceResult;
use crate::model::attendance::{AttendanceRecord, AttendanceStatus};
use crate::service::attendance::round_hours;
use crate::service::store_failure;
use crate::store::{AttendanceStore, DateRange, UserStore};

/// Timeline flattens the most recent records into per-event rows.
const TIMELINE_RECORD_LIMIT: usize = 30;

const MONTH_NAMES: [&str; 12] = [
    "Jan", "Feb", "Mar", "Apr", "May", "Jun", "Jul", "Aug", "Sep", "Oct", "Nov", "Dec",
];

#[derive(Debug, Clone, Default, PartialEq, Serialize)]
pub struct AttendanceSummary {
    pub present: u32,
    pub late: u32,
    pub absent: u32,
    pub half_day: u32,
    pub total_hours: f64,
    /// Populated only for all-time queries; read from the user entity, not
    /// recomputed from records.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub streaks: Option<StreakSnapshot>,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub struct StreakSnapshot {
    pub on_time_streak: u32,
    pub best_on_time_streak: u32,
    pub total_present_days: u32,
    pub total_late_days: u32,
}

/// Hours worked on one of the trailing seven days.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct DailyHours {
    pub day: String,
    pub hours: f64,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct MonthlyHours {
    pub month: String,
    pub hours: f64,
}

#[derive(Debug, Clone, Serialize)]
pub struct AnalyticsReport {
    pub summary: AttendanceSummary,
    /// Trailing 7 days ending today, oldest first, keyed by weekday name.
    pub weekly_hours: Vec<DailyHours>,
    /// Calendar-month buckets over all records, keyed by month name.
    pub monthly_trend: Vec<MonthlyHours>,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Display)]
#[serde(rename_all = "kebab-case")]
#[strum(serialize_all = "kebab-case")]
pub enum TimelineEventKind {
    CheckIn,
    BreakStart,
    BreakEnd,
    CheckOut,
}

#[derive(Debug, Clone, Serialize)]
pub struct TimelineEvent {
    pub kind: TimelineEventKind,
    pub date: NaiveDate,
    pub time: DateTime<Utc>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub status: Option<AttendanceStatus>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub notes: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub hours: Option<f64>,
}

/// Read-only per-user statistics derived from the record store.
pub struct StatsService<S, U> {
    store: S,
    users: U,
}

impl<S: AttendanceStore, U: UserStore> StatsService<S, U> {
    pub fn new(store: S, users: U) -> Self {
        Self { store, users }
    }

    /// Status counts and summed hours over the range. An all-time query
    /// (no range) also surfaces the user's streak counters.
    pub fn summary(
        &self,
        user_id: u64,
        range: Option<DateRange>,
    ) -> AttendanceResult<AttendanceSummary> {
        let records = self
            .store
            .query_by_user(user_id, range)
            .map_err(store_failure)?;

        let mut summary = count_statuses(&records);

        if range.is_none() {
            summary.streaks = self
                .users
                .find_user(user_id)
                .map_err(store_failure)?
                .map(|user| StreakSnapshot {
                    on_time_streak: user.on_time_streak,
                    best_on_time_streak: user.best_on_time_streak,
                    total_present_days: user.total_present_days,
                    total_late_days: user.total_late_days,
                });
        }

        Ok(summary)
    }

    /// Chart feed: status counts plus week- and month-bucketed hours.
    pub fn analytics(&self, user_id: u64, today: NaiveDate) -> AttendanceResult<AnalyticsReport> {
        let records = self
            .store
            .query_by_user(user_id, None)
            .map_err(store_failure)?;

        Ok(AnalyticsReport {
            summary: count_statuses(&records),
            weekly_hours: weekly_hours(&records, today),
            monthly_trend: monthly_trend(&records),
        })
    }

    /// The 30 most recent records flattened into check-in / break /
    /// check-out events, newest event first.
    pub fn timeline(&self, user_id: u64) -> AttendanceResult<Vec<TimelineEvent>> {
        let mut records = self
            .store
            .query_by_user(user_id, None)
            .map_err(store_failure)?;
        records.sort_by(|a, b| b.date.cmp(&a.date));
        records.truncate(TIMELINE_RECORD_LIMIT);

        let mut timeline = Vec::new();
        for record in &records {
            if let Some(time) = record.check_in_time {
                timeline.push(TimelineEvent {
                    kind: TimelineEventKind::CheckIn,
                    date: record.date,
                    time,
                    status: Some(record.status),
                    notes: record.notes.clone(),
                    hours: None,
                });
            }
            for entry in &record.breaks {
                timeline.push(TimelineEvent {
                    kind: TimelineEventKind::BreakStart,
                    date: record.date,
                    time: entry.start_time,
                    status: None,
                    notes: None,
                    hours: None,
                });
                if let Some(end) = entry.end_time {
                    timeline.push(TimelineEvent {
                        kind: TimelineEventKind::BreakEnd,
                        date: record.date,
                        time: end,
                        status: None,
                        notes: None,
                        hours: None,
                    });
                }
            }
            if let Some(time) = record.check_out_time {
                timeline.push(TimelineEvent {
                    kind: TimelineEventKind::CheckOut,
                    date: record.date,
                    time,
                    status: None,
                    notes: None,
                    hours: Some(record.total_hours),
                });
            }
        }

        timeline.sort_by(|a, b| b.time.cmp(&a.time));
        Ok(timeline)
    }
}

fn count_statuses(records: &[AttendanceRecord]) -> AttendanceSummary {
    let mut summary = AttendanceSummary::default();
    for record in records {
        match record.status {
            AttendanceStatus::Present => summary.present += 1,
            AttendanceStatus::Late => summary.late += 1,
            AttendanceStatus::Absent => summary.absent += 1,
            AttendanceStatus::HalfDay => summary.half_day += 1,
        }
        summary.total_hours += record.total_hours;
    }
    summary.total_hours = round_hours(summary.total_hours);
    summary
}

fn weekly_hours(records: &[AttendanceRecord], today: NaiveDate) -> Vec<DailyHours> {
    (0..7)
        .rev()
        .map(|back| {
            let day = today - Days::new(back);
            let hours = records
                .iter()
                .filter(|record| record.date == day)
                .map(|record| record.total_hours)
                .sum();
            DailyHours {
                day: day.format("%a").to_string(),
                hours: round_hours(hours),
            }
        })
        .collect()
}

fn monthly_trend(records: &[AttendanceRecord]) -> Vec<MonthlyHours> {
    let mut hours_by_month = [0.0f64; 12];
    let mut seen = [false; 12];
    for record in records {
        let month = record.date.month0() as usize;
        hours_by_month[month] += record.total_hours;
        seen[month] = true;
    }

    (0..12)
        .filter(|&m| seen[m])
        .map(|m| MonthlyHours {
            month: MONTH_NAMES[m].to_string(),
            hours: round_hours(hours_by_month[m]),
        })
        .collect()
}
