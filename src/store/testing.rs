//! Test double for an unreachable store.

use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::Arc;

use async_trait::async_trait;
use chrono::{DateTime, Utc};
use uuid::Uuid;

use super::{HistoryQuery, RecordStore, StoreError, StoreResult};
use crate::models::garden::GardenState;
use crate::models::mood::MoodEntry;
use crate::models::sleep::SleepEntry;

/// Fails every call and counts how often it was reached.
#[derive(Clone, Default)]
pub struct FailingStore {
    calls: Arc<AtomicUsize>,
}

impl FailingStore {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn calls(&self) -> usize {
        self.calls.load(Ordering::SeqCst)
    }

    fn fail<T>(&self) -> StoreResult<T> {
        self.calls.fetch_add(1, Ordering::SeqCst);
        Err(StoreError::Unavailable("connection refused".into()))
    }
}

#[async_trait]
impl RecordStore for FailingStore {
    async fn insert_mood(&self, _entry: &MoodEntry) -> StoreResult<u64> {
        self.fail()
    }

    async fn select_moods(&self, _query: &HistoryQuery) -> StoreResult<Vec<MoodEntry>> {
        self.fail()
    }

    async fn insert_sleep(&self, _entry: &SleepEntry) -> StoreResult<u64> {
        self.fail()
    }

    async fn select_sleep(&self, _query: &HistoryQuery) -> StoreResult<Vec<SleepEntry>> {
        self.fail()
    }

    async fn visit_garden(&self, _owner: Uuid, _now: DateTime<Utc>) -> StoreResult<GardenState> {
        self.fail()
    }

    async fn find_garden(&self, _owner: Uuid) -> StoreResult<Option<GardenState>> {
        self.fail()
    }

    async fn update_garden(&self, _garden: &GardenState) -> StoreResult<(GardenState, u64)> {
        self.fail()
    }

    async fn advance_active_gardens(
        &self,
        _visited_since: DateTime<Utc>,
        _now: DateTime<Utc>,
    ) -> StoreResult<u64> {
        self.fail()
    }

    async fn current_revision(&self, _owner: Uuid) -> StoreResult<u64> {
        self.fail()
    }

    async fn ping(&self) -> StoreResult<()> {
        self.fail()
    }
}
