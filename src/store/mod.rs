use chrono::NaiveDate;
use serde::Serialize;
use std::sync::Arc;
use thiserror::Error;

use crate::model::attendance::AttendanceRecord;
use crate::model::user::User;

pub mod memory;

#[derive(Debug, Error)]
pub enum StoreError {
    /// Key collision on (user_id, date). The lifecycle treats this as the
    /// "second writer loses" signal for same-day races.
    #[error("attendance record already exists for this user and date")]
    DuplicateKey,

    #[error(transparent)]
    Backend(#[from] anyhow::Error),
}

/// Inclusive calendar-day range; an open end is unbounded.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct DateRange {
    pub from: Option<NaiveDate>,
    pub to: Option<NaiveDate>,
}

impl DateRange {
    pub fn new(from: Option<NaiveDate>, to: Option<NaiveDate>) -> Self {
        Self { from, to }
    }

    pub fn contains(&self, date: NaiveDate) -> bool {
        self.from.map_or(true, |from| date >= from) && self.to.map_or(true, |to| date <= to)
    }
}

/// One group-by-user aggregation row.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct UserTotals {
    pub user_id: u64,
    pub present: u32,
    pub late: u32,
    pub absent: u32,
    pub total_hours: f64,
}

/// Document store holding one attendance record per (user, day).
///
/// `create` must fail with [`StoreError::DuplicateKey`] on a key collision;
/// that uniqueness constraint is the sole concurrency-safety mechanism the
/// lifecycle relies on.
pub trait AttendanceStore {
    fn find_by_user_and_date(
        &self,
        user_id: u64,
        date: NaiveDate,
    ) -> Result<Option<AttendanceRecord>, StoreError>;

    fn create(&self, record: AttendanceRecord) -> Result<AttendanceRecord, StoreError>;

    fn save(&self, record: AttendanceRecord) -> Result<AttendanceRecord, StoreError>;

    /// Records for one user, date ascending.
    fn query_by_user(
        &self,
        user_id: u64,
        range: Option<DateRange>,
    ) -> Result<Vec<AttendanceRecord>, StoreError>;

    /// All users' records for one day.
    fn query_by_date(&self, date: NaiveDate) -> Result<Vec<AttendanceRecord>, StoreError>;

    /// Per-user status counts and summed hours over the range, one row per
    /// user, user id ascending.
    fn aggregate_by_user(&self, range: Option<DateRange>) -> Result<Vec<UserTotals>, StoreError>;
}

pub trait UserStore {
    fn find_user(&self, user_id: u64) -> Result<Option<User>, StoreError>;

    fn save_user(&self, user: User) -> Result<User, StoreError>;
}

impl<S: AttendanceStore + ?Sized> AttendanceStore for &S {
    fn find_by_user_and_date(
        &self,
        user_id: u64,
        date: NaiveDate,
    ) -> Result<Option<AttendanceRecord>, StoreError> {
        (**self).find_by_user_and_date(user_id, date)
    }

    fn create(&self, record: AttendanceRecord) -> Result<AttendanceRecord, StoreError> {
        (**self).create(record)
    }

    fn save(&self, record: AttendanceRecord) -> Result<AttendanceRecord, StoreError> {
        (**self).save(record)
    }

    fn query_by_user(
        &self,
        user_id: u64,
        range: Option<DateRange>,
    ) -> Result<Vec<AttendanceRecord>, StoreError> {
        (**self).query_by_user(user_id, range)
    }

    fn query_by_date(&self, date: NaiveDate) -> Result<Vec<AttendanceRecord>, StoreError> {
        (**self).query_by_date(date)
    }

    fn aggregate_by_user(&self, range: Option<DateRange>) -> Result<Vec<UserTotals>, StoreError> {
        (**self).aggregate_by_user(range)
    }
}

impl<S: AttendanceStore + ?Sized> AttendanceStore for Arc<S> {
    fn find_by_user_and_date(
        &self,
        user_id: u64,
        date: NaiveDate,
    ) -> Result<Option<AttendanceRecord>, StoreError> {
        (**self).find_by_user_and_date(user_id, date)
    }

    fn create(&self, record: AttendanceRecord) -> Result<AttendanceRecord, StoreError> {
        (**self).create(record)
    }

    fn save(&self, record: AttendanceRecord) -> Result<AttendanceRecord, StoreError> {
        (**self).save(record)
    }

    fn query_by_user(
        &self,
        user_id: u64,
        range: Option<DateRange>,
    ) -> Result<Vec<AttendanceRecord>, StoreError> {
        (**self).query_by_user(user_id, range)
    }

    fn query_by_date(&self, date: NaiveDate) -> Result<Vec<AttendanceRecord>, StoreError> {
        (**self).query_by_date(date)
    }

    fn aggregate_by_user(&self, range: Option<DateRange>) -> Result<Vec<UserTotals>, StoreError> {
        (**self).aggregate_by_user(range)
    }
}

impl<U: UserStore + ?Sized> UserStore for &U {
    fn find_user(&self, user_id: u64) -> Result<Option<User>, StoreError> {
        (**self).find_user(user_id)
    }

    fn save_user(&self, user: User) -> Result<User, StoreError> {
        (**self).save_user(user)
    }
}

impl<U: UserStore + ?Sized> UserStore for Arc<U> {
    fn find_user(&self, user_id: u64) -> Result<Option<User>, StoreError> {
        (**self).find_user(user_id)
    }

    fn save_user(&self, user: User) -> Result<User, StoreError> {
        (**self).save_user(user)
    }
}
