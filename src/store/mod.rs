//! Persistence seam. Handlers and services only see these traits; the
//! concrete backend (PostgreSQL or in-memory) is picked at startup.

use async_trait::async_trait;
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

use crate::models::garden::GardenState;
use crate::models::mood::MoodEntry;
use crate::models::sleep::SleepEntry;
use crate::models::user::{RefreshToken, User};

pub mod memory;
pub mod postgres;
#[cfg(test)]
pub mod testing;

pub use memory::MemoryStore;
pub use postgres::PgStore;

#[derive(Debug, thiserror::Error)]
pub enum StoreError {
    #[error("database error: {0}")]
    Database(#[from] sqlx::Error),

    #[error("migration error: {0}")]
    Migration(#[from] sqlx::migrate::MigrateError),

    #[error("duplicate record: {0}")]
    Conflict(String),

    #[error("record not found")]
    NotFound,

    #[error("store unavailable: {0}")]
    Unavailable(String),
}

pub type StoreResult<T> = Result<T, StoreError>;

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum SortOrder {
    #[default]
    Asc,
    Desc,
}

impl SortOrder {
    pub fn as_sql(self) -> &'static str {
        match self {
            SortOrder::Asc => "ASC",
            SortOrder::Desc => "DESC",
        }
    }
}

/// Owner-scoped read of a timestamped log.
#[derive(Debug, Clone, PartialEq)]
pub struct HistoryQuery {
    pub owner: Uuid,
    /// Inclusive lower bound on `recorded_at`; `None` reads all history.
    pub since: Option<DateTime<Utc>>,
    pub order: SortOrder,
    pub limit: Option<u32>,
}

impl HistoryQuery {
    pub fn all(owner: Uuid) -> Self {
        Self {
            owner,
            since: None,
            order: SortOrder::Asc,
            limit: None,
        }
    }

    pub fn since(mut self, since: DateTime<Utc>) -> Self {
        self.since = Some(since);
        self
    }

    pub fn order(mut self, order: SortOrder) -> Self {
        self.order = order;
        self
    }

    pub fn limit(mut self, limit: u32) -> Self {
        self.limit = Some(limit);
        self
    }
}

/// Every write bumps the owner's revision atomically with the change and
/// returns the new value. Revisions are persisted, so they keep increasing
/// across restarts and between instances sharing a store.
#[async_trait]
pub trait RecordStore: Send + Sync {
    async fn insert_mood(&self, entry: &MoodEntry) -> StoreResult<u64>;

    async fn select_moods(&self, query: &HistoryQuery) -> StoreResult<Vec<MoodEntry>>;

    async fn insert_sleep(&self, entry: &SleepEntry) -> StoreResult<u64>;

    async fn select_sleep(&self, query: &HistoryQuery) -> StoreResult<Vec<SleepEntry>>;

    /// Return the owner's garden, creating the initial one if none exists,
    /// and stamp `last_visited_at`. Must never create a second row.
    async fn visit_garden(&self, owner: Uuid, now: DateTime<Utc>) -> StoreResult<GardenState>;

    async fn find_garden(&self, owner: Uuid) -> StoreResult<Option<GardenState>>;

    /// Persist stage/health/happiness of an existing garden.
    async fn update_garden(&self, garden: &GardenState) -> StoreResult<(GardenState, u64)>;

    /// Advance by one stage every garden visited at or after `visited_since`,
    /// bumping each grown owner's revision. Returns the number of gardens
    /// that actually grew.
    async fn advance_active_gardens(
        &self,
        visited_since: DateTime<Utc>,
        now: DateTime<Utc>,
    ) -> StoreResult<u64>;

    /// Latest revision of `owner`; 0 before the first write.
    async fn current_revision(&self, owner: Uuid) -> StoreResult<u64>;

    async fn ping(&self) -> StoreResult<()>;
}

#[async_trait]
pub trait AccountStore: Send + Sync {
    /// Fails with `StoreError::Conflict` when the email is taken.
    async fn create_user(&self, user: &User) -> StoreResult<()>;

    async fn find_user(&self, id: Uuid) -> StoreResult<Option<User>>;

    async fn find_user_by_email(&self, email: &str) -> StoreResult<Option<User>>;

    async fn insert_refresh_token(&self, token: &RefreshToken) -> StoreResult<()>;

    async fn find_refresh_token(&self, token_hash: &str) -> StoreResult<Option<RefreshToken>>;

    async fn revoke_refresh_token(&self, id: Uuid) -> StoreResult<()>;

    async fn revoke_all_refresh_tokens(&self, user_id: Uuid) -> StoreResult<u64>;
}
