use chrono::{DateTime, NaiveTime, Utc};

use crate::config::Config;
use crate::error::{AttendanceError, AttendanceResult};
use crate::geofence::Geofence;
use crate::model::attendance::{AttendanceRecord, AttendanceStatus, BreakEntry, GeoPoint};
use crate::service::store_failure;
use crate::store::{AttendanceStore, StoreError, UserStore};

/// Daily attendance lifecycle for one user:
/// check-in, any number of break start/end pairs, check-out (terminal).
///
/// Every operation is a single-record read-modify-write stamped with the
/// caller-supplied event instant; the store's (user, date) uniqueness
/// constraint serializes racing same-day check-ins.
pub struct AttendanceService<S, U> {
    store: S,
    users: U,
    geofence: Geofence,
    late_cutoff: NaiveTime,
}

impl<S: AttendanceStore, U: UserStore> AttendanceService<S, U> {
    pub fn new(store: S, users: U, config: &Config) -> Self {
        Self {
            store,
            users,
            geofence: Geofence::from_config(config),
            late_cutoff: config.late_cutoff,
        }
    }

    /* =========================
    Check-in
    ========================= */
    pub fn check_in(
        &self,
        user_id: u64,
        at: DateTime<Utc>,
        location: Option<GeoPoint>,
        notes: Option<String>,
    ) -> AttendanceResult<AttendanceRecord> {
        let Some(location) = location else {
            return Err(AttendanceError::Validation(
                "Location is required for check-in",
            ));
        };
        if !self.geofence.contains(location.lat, location.lng) {
            return Err(AttendanceError::Geofence);
        }

        let today = at.date_naive();
        if self
            .store
            .find_by_user_and_date(user_id, today)
            .map_err(store_failure)?
            .is_some()
        {
            return Err(AttendanceError::DuplicateAction("Already checked in today"));
        }

        let status = if at.time() > self.late_cutoff {
            AttendanceStatus::Late
        } else {
            AttendanceStatus::Present
        };

        let record = AttendanceRecord::new_check_in(user_id, at, status, location, notes);
        let record = match self.store.create(record) {
            Ok(record) => record,
            // Lost the same-day insert race; the unique key is the arbiter.
            Err(StoreError::DuplicateKey) => {
                return Err(AttendanceError::DuplicateAction("Already checked in today"));
            }
            Err(err) => {
                tracing::error!(error = %err, user_id, "check-in insert failed");
                return Err(AttendanceError::System(err.into()));
            }
        };

        self.apply_check_in_streak(user_id, status)?;

        tracing::info!(user_id, %status, "checked in");
        Ok(record)
    }

    /// Streak counters live on the user entity and are only ever touched
    /// here; historical record edits do not correct them.
    fn apply_check_in_streak(&self, user_id: u64, status: AttendanceStatus) -> AttendanceResult<()> {
        let Some(mut user) = self.users.find_user(user_id).map_err(store_failure)? else {
            tracing::warn!(user_id, "no user entity, skipping streak update");
            return Ok(());
        };

        match status {
            AttendanceStatus::Late => user.record_late_check_in(),
            _ => user.record_on_time_check_in(),
        }

        self.users.save_user(user).map_err(store_failure)?;
        Ok(())
    }

    /* =========================
    Break start
    ========================= */
    pub fn start_break(&self, user_id: u64, at: DateTime<Utc>) -> AttendanceResult<AttendanceRecord> {
        let mut record = self.today_record(user_id, at)?;
        if record.has_open_break() {
            return Err(AttendanceError::DuplicateAction("Break already in progress"));
        }

        record.breaks.push(BreakEntry {
            start_time: at,
            end_time: None,
        });

        let record = self.store.save(record).map_err(store_failure)?;
        tracing::info!(user_id, "break started");
        Ok(record)
    }

    /* =========================
    Break end
    ========================= */
    pub fn end_break(&self, user_id: u64, at: DateTime<Utc>) -> AttendanceResult<AttendanceRecord> {
        let mut record = self.today_record(user_id, at)?;
        match record.open_break_mut() {
            Some(open) => open.end_time = Some(at),
            None => return Err(AttendanceError::NoActiveBreak),
        }

        let record = self.store.save(record).map_err(store_failure)?;
        tracing::info!(user_id, "break ended");
        Ok(record)
    }

    /* =========================
    Check-out
    ========================= */
    pub fn check_out(
        &self,
        user_id: u64,
        at: DateTime<Utc>,
        location: Option<GeoPoint>,
        notes: Option<String>,
    ) -> AttendanceResult<AttendanceRecord> {
        let Some(mut record) = self
            .store
            .find_by_user_and_date(user_id, at.date_naive())
            .map_err(store_failure)?
        else {
            return Err(AttendanceError::PrecursorMissing("Check-in required first"));
        };
        if record.has_checked_out() {
            return Err(AttendanceError::DuplicateAction(
                "Already checked out today",
            ));
        }

        record.check_out_time = Some(at);
        record.check_out_location = location;
        if notes.is_some() {
            record.notes = notes;
        }

        // Hours are wall-clock from check-in; breaks are not subtracted.
        let worked = match record.check_in_time {
            Some(check_in) => (at - check_in).num_seconds() as f64 / 3600.0,
            None => 0.0,
        };
        record.total_hours = round_hours(worked.max(0.0));

        let record = self.store.save(record).map_err(store_failure)?;
        tracing::info!(user_id, hours = record.total_hours, "checked out");
        Ok(record)
    }

    /// Attendance history for one user, most recent day first.
    pub fn history(&self, user_id: u64) -> AttendanceResult<Vec<AttendanceRecord>> {
        let mut records = self
            .store
            .query_by_user(user_id, None)
            .map_err(store_failure)?;
        records.sort_by(|a, b| b.date.cmp(&a.date));
        Ok(records)
    }

    /// Today's record for break transitions. Check-out is terminal for the
    /// day, so a checked-out record rejects further break actions.
    fn today_record(&self, user_id: u64, at: DateTime<Utc>) -> AttendanceResult<AttendanceRecord> {
        let Some(record) = self
            .store
            .find_by_user_and_date(user_id, at.date_naive())
            .map_err(store_failure)?
        else {
            return Err(AttendanceError::PrecursorMissing("Check in first"));
        };
        if record.has_checked_out() {
            return Err(AttendanceError::PrecursorMissing(
                "Already checked out for today",
            ));
        }
        Ok(record)
    }
}

pub(crate) fn round_hours(hours: f64) -> f64 {
    (hours * 100.0).round() / 100.0
}
