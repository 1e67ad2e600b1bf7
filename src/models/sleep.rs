use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use sqlx::FromRow;
use uuid::Uuid;

pub const MAX_SLEEP_HOURS: f64 = 24.0;

#[derive(Debug, Clone, Serialize, Deserialize, FromRow, PartialEq)]
pub struct SleepEntry {
    pub id: Uuid,
    pub user_id: Uuid,
    pub hours: f64,
    pub recorded_at: DateTime<Utc>,
}

/// Hours as submitted by a form: either a JSON number or the raw input text.
#[derive(Debug, Clone, Deserialize, PartialEq)]
#[serde(untagged)]
pub enum HoursInput {
    Number(f64),
    Text(String),
}

#[derive(Debug, Deserialize)]
pub struct RecordSleepRequest {
    pub hours: HoursInput,
}
