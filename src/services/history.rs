use chrono::{DateTime, Duration, Utc};
use serde::Deserialize;

use crate::auth::Session;
use crate::error::{AppError, AppResult};
use crate::models::mood::MoodEntry;
use crate::models::sleep::SleepEntry;
use crate::services::aggregate;
use crate::store::{HistoryQuery, RecordStore, SortOrder};

pub const DEFAULT_WINDOW_DAYS: u32 = 7;
pub const MAX_LIMIT: u32 = 1000;

/// Query-string parameters shared by the history endpoints.
#[derive(Debug, Default, Deserialize)]
pub struct HistoryParams {
    pub days: Option<u32>,
    pub order: Option<SortOrder>,
    pub limit: Option<u32>,
}

impl HistoryParams {
    pub fn window_days(&self, max_days: u32) -> AppResult<u32> {
        let days = self.days.unwrap_or(DEFAULT_WINDOW_DAYS);
        if !(1..=max_days).contains(&days) {
            return Err(AppError::Validation(format!(
                "days must be between 1 and {}",
                max_days
            )));
        }
        Ok(days)
    }

    /// Build the owner-scoped query for the trailing window ending at `now`.
    pub fn to_query(
        &self,
        session: &Session,
        now: DateTime<Utc>,
        max_days: u32,
    ) -> AppResult<HistoryQuery> {
        let days = self.window_days(max_days)?;
        let mut query = HistoryQuery::all(session.user_id)
            .since(window_start(now, days))
            .order(self.order.unwrap_or_default());

        if let Some(limit) = self.limit {
            if !(1..=MAX_LIMIT).contains(&limit) {
                return Err(AppError::Validation(format!(
                    "limit must be between 1 and {}",
                    MAX_LIMIT
                )));
            }
            query = query.limit(limit);
        }
        Ok(query)
    }
}

pub fn window_start(now: DateTime<Utc>, days: u32) -> DateTime<Utc> {
    now - Duration::days(i64::from(days))
}

pub async fn mood_history(
    store: &dyn RecordStore,
    query: &HistoryQuery,
) -> AppResult<Vec<MoodEntry>> {
    let rows = store.select_moods(query).await?;
    tracing::debug!(user_id = %query.owner, rows = rows.len(), "Mood history fetched");
    Ok(rows)
}

pub async fn sleep_history(
    store: &dyn RecordStore,
    query: &HistoryQuery,
) -> AppResult<Vec<SleepEntry>> {
    let rows = store.select_sleep(query).await?;
    tracing::debug!(user_id = %query.owner, rows = rows.len(), "Sleep history fetched");
    Ok(rows)
}

pub async fn recent_moods(
    store: &dyn RecordStore,
    session: &Session,
    limit: u32,
) -> AppResult<Vec<MoodEntry>> {
    let query = HistoryQuery::all(session.user_id)
        .order(SortOrder::Desc)
        .limit(limit);
    mood_history(store, &query).await
}

pub async fn latest_mood(
    store: &dyn RecordStore,
    session: &Session,
) -> AppResult<Option<MoodEntry>> {
    let rows = recent_moods(store, session, 1).await?;
    Ok(aggregate::most_recent(&rows).cloned())
}

pub async fn latest_sleep(
    store: &dyn RecordStore,
    session: &Session,
) -> AppResult<Option<SleepEntry>> {
    let query = HistoryQuery::all(session.user_id)
        .order(SortOrder::Desc)
        .limit(1);
    let rows = sleep_history(store, &query).await?;
    Ok(aggregate::most_recent(&rows).cloned())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::models::mood::Mood;
    use crate::services::recorder;
    use crate::store::MemoryStore;
    use uuid::Uuid;

    fn session() -> Session {
        Session::new(Uuid::new_v4(), "u@example.com")
    }

    #[test]
    fn test_default_params() {
        let now = Utc::now();
        let s = session();
        let query = HistoryParams::default().to_query(&s, now, 365).unwrap();
        assert_eq!(query.owner, s.user_id);
        assert_eq!(query.since, Some(now - Duration::days(7)));
        assert_eq!(query.order, SortOrder::Asc);
        assert_eq!(query.limit, None);
    }

    #[test]
    fn test_params_out_of_range_are_validation_errors() {
        let s = session();
        let now = Utc::now();
        for params in [
            HistoryParams { days: Some(0), ..Default::default() },
            HistoryParams { days: Some(366), ..Default::default() },
            HistoryParams { limit: Some(0), ..Default::default() },
            HistoryParams { limit: Some(MAX_LIMIT + 1), ..Default::default() },
        ] {
            assert!(matches!(
                params.to_query(&s, now, 365),
                Err(AppError::Validation(_))
            ));
        }
    }

    #[tokio::test]
    async fn test_history_never_leaks_other_owners() {
        let store = MemoryStore::new();
        let alice = session();
        let bob = session();
        let now = Utc::now();

        for label in ["Happy", "Calm"] {
            recorder::record_mood(&store, &alice, label, now).await.unwrap();
        }
        recorder::record_mood(&store, &bob, "Angry", now).await.unwrap();

        let query = HistoryParams::default().to_query(&alice, now, 365).unwrap();
        let rows = mood_history(&store, &query).await.unwrap();
        assert_eq!(rows.len(), 2);
        assert!(rows.iter().all(|r| r.user_id == alice.user_id));
    }

    #[tokio::test]
    async fn test_window_excludes_older_rows() {
        let store = MemoryStore::new();
        let s = session();
        let now = Utc::now();
        recorder::record_mood(&store, &s, "Sad", now - Duration::days(8)).await.unwrap();
        recorder::record_mood(&store, &s, "Calm", now - Duration::days(6)).await.unwrap();

        let query = HistoryParams::default().to_query(&s, now, 365).unwrap();
        let rows = mood_history(&store, &query).await.unwrap();
        assert_eq!(rows.len(), 1);
        assert_eq!(rows[0].mood, "Calm");
    }

    #[tokio::test]
    async fn test_empty_history_is_not_an_error() {
        let store = MemoryStore::new();
        let s = session();
        assert!(latest_mood(&store, &s).await.unwrap().is_none());
        assert!(latest_sleep(&store, &s).await.unwrap().is_none());
    }

    #[tokio::test]
    async fn test_every_label_round_trips_through_latest() {
        let store = MemoryStore::new();
        let s = session();
        let start = Utc::now();
        for (i, mood) in Mood::ALL.iter().enumerate() {
            let now = start + Duration::seconds(i as i64);
            recorder::record_mood(&store, &s, mood.label(), now).await.unwrap();
            let latest = latest_mood(&store, &s).await.unwrap().unwrap();
            assert_eq!(latest.mood, mood.label());
        }
    }

    #[tokio::test]
    async fn test_sleep_scenario_single_point_series() {
        use crate::models::sleep::HoursInput;

        let store = MemoryStore::new();
        let s = session();
        let now = Utc::now();
        recorder::record_sleep(&store, &s, &HoursInput::Text("8.5".into()), now)
            .await
            .unwrap();

        let query = HistoryParams { days: Some(7), ..Default::default() }
            .to_query(&s, now, 365)
            .unwrap();
        let rows = sleep_history(&store, &query).await.unwrap();
        assert_eq!(rows.len(), 1);
        assert_eq!(rows[0].hours, 8.5);

        let series = aggregate::sleep_series(&rows);
        assert_eq!(series.len(), 1);
        assert_eq!(series[0].value, 8.5);
        assert_eq!(series[0].label, aggregate::display_date(now));
    }
}
