use serde::{Deserialize, Serialize};

/// User entity with the streak counters owned by it. The counters are
/// mutated only through the check-in transition, never recomputed from
/// historical records.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct User {
    pub id: u64,
    pub name: String,
    pub department: String,
    pub on_time_streak: u32,
    pub best_on_time_streak: u32,
    pub total_present_days: u32,
    pub total_late_days: u32,
}

impl User {
    pub fn new(id: u64, name: impl Into<String>, department: impl Into<String>) -> Self {
        Self {
            id,
            name: name.into(),
            department: department.into(),
            on_time_streak: 0,
            best_on_time_streak: 0,
            total_present_days: 0,
            total_late_days: 0,
        }
    }

    pub fn record_on_time_check_in(&mut self) {
        self.on_time_streak += 1;
        self.best_on_time_streak = self.best_on_time_streak.max(self.on_time_streak);
        self.total_present_days += 1;
    }

    pub fn record_late_check_in(&mut self) {
        self.on_time_streak = 0;
        self.total_late_days += 1;
        self.total_present_days += 1;
    }
}
