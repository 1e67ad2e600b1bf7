use std::collections::HashMap;
use std::sync::Arc;

use async_trait::async_trait;
use chrono::{DateTime, Utc};
use tokio::sync::Mutex;
use uuid::Uuid;

use super::{AccountStore, HistoryQuery, RecordStore, SortOrder, StoreError, StoreResult};
use crate::models::garden::GardenState;
use crate::models::LogEntry;
use crate::models::mood::MoodEntry;
use crate::models::sleep::SleepEntry;
use crate::models::user::{RefreshToken, User};

/// Process-local store for development and tests.
/// Data is lost on restart.
#[derive(Clone, Default)]
pub struct MemoryStore {
    tables: Arc<Mutex<Tables>>,
}

#[derive(Default)]
struct Tables {
    moods: Vec<MoodEntry>,
    sleep_logs: Vec<SleepEntry>,
    // keyed by owner: one garden per user
    trees: HashMap<Uuid, GardenState>,
    revisions: HashMap<Uuid, u64>,
    users: HashMap<Uuid, User>,
    refresh_tokens: HashMap<Uuid, RefreshToken>,
}

impl Tables {
    fn bump_revision(&mut self, owner: Uuid) -> u64 {
        let revision = self.revisions.entry(owner).or_insert(0);
        *revision += 1;
        *revision
    }
}

impl MemoryStore {
    pub fn new() -> Self {
        Self::default()
    }
}

fn select<T: LogEntry + Clone>(rows: &[T], query: &HistoryQuery) -> Vec<T> {
    let mut matched: Vec<T> = rows
        .iter()
        .filter(|r| r.owner() == query.owner)
        .filter(|r| query.since.map_or(true, |since| r.recorded_at() >= since))
        .cloned()
        .collect();

    // Stable sorts: equal timestamps keep insertion order.
    match query.order {
        SortOrder::Asc => matched.sort_by_key(|r| r.recorded_at()),
        SortOrder::Desc => matched.sort_by(|a, b| b.recorded_at().cmp(&a.recorded_at())),
    }

    if let Some(limit) = query.limit {
        matched.truncate(limit as usize);
    }
    matched
}

#[async_trait]
impl RecordStore for MemoryStore {
    async fn insert_mood(&self, entry: &MoodEntry) -> StoreResult<u64> {
        let mut tables = self.tables.lock().await;
        tables.moods.push(entry.clone());
        Ok(tables.bump_revision(entry.user_id))
    }

    async fn select_moods(&self, query: &HistoryQuery) -> StoreResult<Vec<MoodEntry>> {
        Ok(select(&self.tables.lock().await.moods, query))
    }

    async fn insert_sleep(&self, entry: &SleepEntry) -> StoreResult<u64> {
        let mut tables = self.tables.lock().await;
        tables.sleep_logs.push(entry.clone());
        Ok(tables.bump_revision(entry.user_id))
    }

    async fn select_sleep(&self, query: &HistoryQuery) -> StoreResult<Vec<SleepEntry>> {
        Ok(select(&self.tables.lock().await.sleep_logs, query))
    }

    async fn visit_garden(&self, owner: Uuid, now: DateTime<Utc>) -> StoreResult<GardenState> {
        let mut tables = self.tables.lock().await;
        let garden = tables
            .trees
            .entry(owner)
            .or_insert_with(|| GardenState::new(owner, now));
        garden.last_visited_at = now;
        Ok(garden.clone())
    }

    async fn find_garden(&self, owner: Uuid) -> StoreResult<Option<GardenState>> {
        Ok(self.tables.lock().await.trees.get(&owner).cloned())
    }

    async fn update_garden(&self, garden: &GardenState) -> StoreResult<(GardenState, u64)> {
        let mut tables = self.tables.lock().await;
        let stored = tables
            .trees
            .get_mut(&garden.user_id)
            .filter(|g| g.id == garden.id)
            .ok_or(StoreError::NotFound)?;
        stored.stage = garden.stage;
        stored.health = garden.health;
        stored.happiness = garden.happiness;
        stored.updated_at = garden.updated_at;
        let saved = stored.clone();
        Ok((saved, tables.bump_revision(garden.user_id)))
    }

    async fn advance_active_gardens(
        &self,
        visited_since: DateTime<Utc>,
        now: DateTime<Utc>,
    ) -> StoreResult<u64> {
        let mut tables = self.tables.lock().await;
        let mut grown = Vec::new();
        for garden in tables.trees.values_mut() {
            if garden.last_visited_at < visited_since {
                continue;
            }
            let before = garden.stage;
            garden.auto_grow();
            if garden.stage != before {
                garden.updated_at = now;
                grown.push(garden.user_id);
            }
        }
        for owner in &grown {
            tables.bump_revision(*owner);
        }
        Ok(grown.len() as u64)
    }

    async fn current_revision(&self, owner: Uuid) -> StoreResult<u64> {
        Ok(self
            .tables
            .lock()
            .await
            .revisions
            .get(&owner)
            .copied()
            .unwrap_or(0))
    }

    async fn ping(&self) -> StoreResult<()> {
        Ok(())
    }
}

#[async_trait]
impl AccountStore for MemoryStore {
    async fn create_user(&self, user: &User) -> StoreResult<()> {
        let mut tables = self.tables.lock().await;
        if tables.users.values().any(|u| u.email == user.email) {
            return Err(StoreError::Conflict("email already registered".into()));
        }
        tables.users.insert(user.id, user.clone());
        Ok(())
    }

    async fn find_user(&self, id: Uuid) -> StoreResult<Option<User>> {
        Ok(self.tables.lock().await.users.get(&id).cloned())
    }

    async fn find_user_by_email(&self, email: &str) -> StoreResult<Option<User>> {
        Ok(self
            .tables
            .lock()
            .await
            .users
            .values()
            .find(|u| u.email == email)
            .cloned())
    }

    async fn insert_refresh_token(&self, token: &RefreshToken) -> StoreResult<()> {
        self.tables
            .lock()
            .await
            .refresh_tokens
            .insert(token.id, token.clone());
        Ok(())
    }

    async fn find_refresh_token(&self, token_hash: &str) -> StoreResult<Option<RefreshToken>> {
        Ok(self
            .tables
            .lock()
            .await
            .refresh_tokens
            .values()
            .find(|t| t.token_hash == token_hash)
            .cloned())
    }

    async fn revoke_refresh_token(&self, id: Uuid) -> StoreResult<()> {
        if let Some(token) = self.tables.lock().await.refresh_tokens.get_mut(&id) {
            token.revoked = true;
        }
        Ok(())
    }

    async fn revoke_all_refresh_tokens(&self, user_id: Uuid) -> StoreResult<u64> {
        let mut tables = self.tables.lock().await;
        let mut revoked = 0;
        for token in tables
            .refresh_tokens
            .values_mut()
            .filter(|t| t.user_id == user_id && !t.revoked)
        {
            token.revoked = true;
            revoked += 1;
        }
        Ok(revoked)
    }
}
