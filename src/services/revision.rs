//! Per-owner revisions used to order responses.
//!
//! The store bumps the owner's revision in the same statement as every write
//! and persists it next to the data, so revisions keep increasing across
//! restarts and between instances sharing a database. Reads capture the
//! revision *before* querying, so a read can only claim writes it was able to
//! observe. A client renders a response only if its revision is at least the
//! highest one it has already shown.

use serde::Serialize;

use crate::auth::Session;
use crate::error::AppResult;
use crate::store::RecordStore;

/// A write result paired with the revision the write produced.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct Recorded<T> {
    pub revision: u64,
    pub entry: T,
}

/// Revision to report on a read. Call before running the read's queries.
pub async fn observed(store: &dyn RecordStore, session: &Session) -> AppResult<u64> {
    Ok(store.current_revision(session.user_id).await?)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::models::mood::MoodEntry;
    use crate::store::testing::FailingStore;
    use crate::store::MemoryStore;
    use chrono::Utc;
    use uuid::Uuid;

    fn mood_for(session: &Session) -> MoodEntry {
        MoodEntry {
            id: Uuid::new_v4(),
            user_id: session.user_id,
            mood: "Calm".into(),
            recorded_at: Utc::now(),
        }
    }

    #[tokio::test]
    async fn test_unknown_owner_starts_at_zero() {
        let store = MemoryStore::new();
        let session = Session::new(Uuid::new_v4(), "r@example.com");
        assert_eq!(observed(&store, &session).await.unwrap(), 0);
    }

    #[tokio::test]
    async fn test_writes_are_strictly_increasing_per_owner() {
        let store = MemoryStore::new();
        let a = Session::new(Uuid::new_v4(), "a@example.com");
        let b = Session::new(Uuid::new_v4(), "b@example.com");

        assert_eq!(store.insert_mood(&mood_for(&a)).await.unwrap(), 1);
        assert_eq!(store.insert_mood(&mood_for(&a)).await.unwrap(), 2);
        assert_eq!(store.insert_mood(&mood_for(&b)).await.unwrap(), 1);
        assert_eq!(observed(&store, &a).await.unwrap(), 2);
        assert_eq!(observed(&store, &b).await.unwrap(), 1);
    }

    #[tokio::test]
    async fn test_concurrent_writes_never_repeat() {
        let store = MemoryStore::new();
        let session = Session::new(Uuid::new_v4(), "c@example.com");

        let handles: Vec<_> = (0..32)
            .map(|_| {
                let store = store.clone();
                let entry = mood_for(&session);
                tokio::spawn(async move { store.insert_mood(&entry).await.unwrap() })
            })
            .collect();

        let mut seen = Vec::new();
        for handle in handles {
            seen.push(handle.await.unwrap());
        }
        seen.sort_unstable();
        assert_eq!(seen, (1..=32).collect::<Vec<u64>>());
    }

    #[tokio::test]
    async fn test_revisions_outlive_the_handle_that_wrote_them() {
        let store = MemoryStore::new();
        let session = Session::new(Uuid::new_v4(), "d@example.com");
        let before = store.insert_mood(&mood_for(&session)).await.unwrap();

        let reopened = store.clone();
        assert_eq!(observed(&reopened, &session).await.unwrap(), before);
        assert!(reopened.insert_mood(&mood_for(&session)).await.unwrap() > before);
    }

    #[tokio::test]
    async fn test_unreadable_revision_is_a_store_error() {
        let store = FailingStore::new();
        let session = Session::new(Uuid::new_v4(), "e@example.com");
        assert!(matches!(
            observed(&store, &session).await,
            Err(crate::error::AppError::Store(_))
        ));
    }
}
