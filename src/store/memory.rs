use anyhow::anyhow;
use chrono::NaiveDate;
use std::collections::BTreeMap;
use std::collections::btree_map::Entry;
use std::sync::{Mutex, MutexGuard};

use crate::model::attendance::{AttendanceRecord, AttendanceStatus};
use crate::model::user::User;
use crate::store::{AttendanceStore, DateRange, StoreError, UserStore, UserTotals};

/// In-memory document store for tests and embedders without a backend.
///
/// `create` is insert-if-absent under a single lock: of two racing same-day
/// check-ins exactly one insert wins and the loser observes
/// [`StoreError::DuplicateKey`].
#[derive(Debug, Default)]
pub struct MemoryStore {
    records: Mutex<BTreeMap<(u64, NaiveDate), AttendanceRecord>>,
    users: Mutex<BTreeMap<u64, User>>,
}

impl MemoryStore {
    pub fn new() -> Self {
        Self::default()
    }
}

fn lock<T>(mutex: &Mutex<T>) -> Result<MutexGuard<'_, T>, StoreError> {
    mutex
        .lock()
        .map_err(|_| StoreError::Backend(anyhow!("memory store lock poisoned")))
}

impl AttendanceStore for MemoryStore {
    fn find_by_user_and_date(
        &self,
        user_id: u64,
        date: NaiveDate,
    ) -> Result<Option<AttendanceRecord>, StoreError> {
        Ok(lock(&self.records)?.get(&(user_id, date)).cloned())
    }

    fn create(&self, record: AttendanceRecord) -> Result<AttendanceRecord, StoreError> {
        let mut records = lock(&self.records)?;
        match records.entry((record.user_id, record.date)) {
            Entry::Occupied(_) => Err(StoreError::DuplicateKey),
            Entry::Vacant(slot) => {
                slot.insert(record.clone());
                Ok(record)
            }
        }
    }

    fn save(&self, record: AttendanceRecord) -> Result<AttendanceRecord, StoreError> {
        lock(&self.records)?.insert((record.user_id, record.date), record.clone());
        Ok(record)
    }

    fn query_by_user(
        &self,
        user_id: u64,
        range: Option<DateRange>,
    ) -> Result<Vec<AttendanceRecord>, StoreError> {
        let records = lock(&self.records)?;
        Ok(records
            .range((user_id, NaiveDate::MIN)..=(user_id, NaiveDate::MAX))
            .filter(|((_, date), _)| range.map_or(true, |r| r.contains(*date)))
            .map(|(_, record)| record.clone())
            .collect())
    }

    fn query_by_date(&self, date: NaiveDate) -> Result<Vec<AttendanceRecord>, StoreError> {
        let records = lock(&self.records)?;
        Ok(records
            .values()
            .filter(|record| record.date == date)
            .cloned()
            .collect())
    }

    fn aggregate_by_user(&self, range: Option<DateRange>) -> Result<Vec<UserTotals>, StoreError> {
        let records = lock(&self.records)?;
        let mut totals: BTreeMap<u64, UserTotals> = BTreeMap::new();

        for record in records.values() {
            if !range.map_or(true, |r| r.contains(record.date)) {
                continue;
            }
            let row = totals.entry(record.user_id).or_insert(UserTotals {
                user_id: record.user_id,
                present: 0,
                late: 0,
                absent: 0,
                total_hours: 0.0,
            });
            match record.status {
                AttendanceStatus::Present => row.present += 1,
                AttendanceStatus::Late => row.late += 1,
                AttendanceStatus::Absent => row.absent += 1,
                AttendanceStatus::HalfDay => {}
            }
            row.total_hours += record.total_hours;
        }

        Ok(totals.into_values().collect())
    }
}

impl UserStore for MemoryStore {
    fn find_user(&self, user_id: u64) -> Result<Option<User>, StoreError> {
        Ok(lock(&self.users)?.get(&user_id).cloned())
    }

    fn save_user(&self, user: User) -> Result<User, StoreError> {
        lock(&self.users)?.insert(user.id, user.clone());
        Ok(user)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::model::attendance::GeoPoint;
    use chrono::{TimeZone, Utc};

    fn record(user_id: u64, day: u32, status: AttendanceStatus, hours: f64) -> AttendanceRecord {
        let at = Utc.with_ymd_and_hms(2025, 3, day, 8, 30, 0).unwrap();
        let mut record = AttendanceRecord::new_check_in(
            user_id,
            at,
            status,
            GeoPoint { lat: 0.0, lng: 0.0 },
            None,
        );
        record.total_hours = hours;
        record
    }

    #[test]
    fn create_rejects_second_record_for_same_user_and_day() {
        let store = MemoryStore::new();
        store.create(record(1, 3, AttendanceStatus::Present, 0.0)).unwrap();

        let err = store
            .create(record(1, 3, AttendanceStatus::Late, 0.0))
            .unwrap_err();
        assert!(matches!(err, StoreError::DuplicateKey));

        // Same day for another user is a different key.
        store.create(record(2, 3, AttendanceStatus::Present, 0.0)).unwrap();
    }

    #[test]
    fn query_by_user_respects_range_and_order() {
        let store = MemoryStore::new();
        for day in [5, 3, 7] {
            store.create(record(1, day, AttendanceStatus::Present, 8.0)).unwrap();
        }
        store.create(record(2, 4, AttendanceStatus::Late, 6.0)).unwrap();

        let all = store.query_by_user(1, None).unwrap();
        assert_eq!(all.len(), 3);
        assert!(all.windows(2).all(|w| w[0].date < w[1].date));

        let range = DateRange::new(
            Some(NaiveDate::from_ymd_opt(2025, 3, 4).unwrap()),
            Some(NaiveDate::from_ymd_opt(2025, 3, 6).unwrap()),
        );
        let bounded = store.query_by_user(1, Some(range)).unwrap();
        assert_eq!(bounded.len(), 1);
        assert_eq!(bounded[0].date, NaiveDate::from_ymd_opt(2025, 3, 5).unwrap());
    }

    #[test]
    fn aggregate_by_user_counts_statuses_and_sums_hours() {
        let store = MemoryStore::new();
        store.create(record(1, 3, AttendanceStatus::Present, 8.0)).unwrap();
        store.create(record(1, 4, AttendanceStatus::Late, 7.5)).unwrap();
        store.create(record(1, 5, AttendanceStatus::Absent, 0.0)).unwrap();
        store.create(record(2, 3, AttendanceStatus::Present, 9.0)).unwrap();

        let totals = store.aggregate_by_user(None).unwrap();
        assert_eq!(
            totals,
            vec![
                UserTotals {
                    user_id: 1,
                    present: 1,
                    late: 1,
                    absent: 1,
                    total_hours: 15.5,
                },
                UserTotals {
                    user_id: 2,
                    present: 1,
                    late: 0,
                    absent: 0,
                    total_hours: 9.0,
                },
            ]
        );
    }

    #[test]
    fn user_save_is_an_upsert() {
        let store = MemoryStore::new();
        let mut user = store.save_user(User::new(7, "Ravi", "QA")).unwrap();
        user.record_on_time_check_in();
        store.save_user(user).unwrap();

        let reloaded = store.find_user(7).unwrap().unwrap();
        assert_eq!(reloaded.on_time_streak, 1);
    }
}
