use chrono::{DateTime, Utc};
use uuid::Uuid;

pub mod garden;
pub mod mood;
pub mod sleep;
pub mod user;

/// Common shape of the append-only, owner-scoped logs.
pub trait LogEntry {
    fn owner(&self) -> Uuid;
    fn recorded_at(&self) -> DateTime<Utc>;
}

impl LogEntry for mood::MoodEntry {
    fn owner(&self) -> Uuid {
        self.user_id
    }

    fn recorded_at(&self) -> DateTime<Utc> {
        self.recorded_at
    }
}

impl LogEntry for sleep::SleepEntry {
    fn owner(&self) -> Uuid {
        self.user_id
    }

    fn recorded_at(&self) -> DateTime<Utc> {
        self.recorded_at
    }
}
