use chrono::{DateTime, Utc};
use uuid::Uuid;

use crate::auth::Session;
use crate::error::{AppError, AppResult};
use crate::models::mood::{Mood, MoodEntry};
use crate::models::sleep::{HoursInput, SleepEntry, MAX_SLEEP_HOURS};
use crate::services::revision::Recorded;
use crate::store::RecordStore;

pub fn parse_mood(raw: &str) -> AppResult<Mood> {
    raw.parse::<Mood>().map_err(|e| {
        AppError::Validation(format!("{}; expected one of {}", e, Mood::vocabulary()))
    })
}

/// Hours must be a finite number in `0..=24`, given as a number or as text.
pub fn parse_hours(input: &HoursInput) -> AppResult<f64> {
    let hours = match input {
        HoursInput::Number(n) => *n,
        HoursInput::Text(text) => text.trim().parse::<f64>().map_err(|_| {
            AppError::Validation(format!("Sleep hours '{}' is not a number", text.trim()))
        })?,
    };

    if !hours.is_finite() || !(0.0..=MAX_SLEEP_HOURS).contains(&hours) {
        return Err(AppError::Validation(format!(
            "Sleep hours must be between 0 and {}",
            MAX_SLEEP_HOURS
        )));
    }
    Ok(hours)
}

/// Validate and persist one mood entry stamped with `now`.
pub async fn record_mood(
    store: &dyn RecordStore,
    session: &Session,
    raw_mood: &str,
    now: DateTime<Utc>,
) -> AppResult<Recorded<MoodEntry>> {
    let mood = parse_mood(raw_mood)?;

    let entry = MoodEntry {
        id: Uuid::new_v4(),
        user_id: session.user_id,
        mood: mood.label().to_string(),
        recorded_at: now,
    };
    let revision = store.insert_mood(&entry).await?;

    tracing::info!(user_id = %session.user_id, mood = %mood, revision, "Mood recorded");
    Ok(Recorded { revision, entry })
}

/// Validate and persist one sleep entry stamped with `now`.
pub async fn record_sleep(
    store: &dyn RecordStore,
    session: &Session,
    input: &HoursInput,
    now: DateTime<Utc>,
) -> AppResult<Recorded<SleepEntry>> {
    let hours = parse_hours(input)?;

    let entry = SleepEntry {
        id: Uuid::new_v4(),
        user_id: session.user_id,
        hours,
        recorded_at: now,
    };
    let revision = store.insert_sleep(&entry).await?;

    tracing::info!(user_id = %session.user_id, hours, revision, "Sleep recorded");
    Ok(Recorded { revision, entry })
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::store::testing::FailingStore;
    use crate::store::{HistoryQuery, MemoryStore};

    fn session() -> Session {
        Session::new(Uuid::new_v4(), "u@example.com")
    }

    fn text(s: &str) -> HoursInput {
        HoursInput::Text(s.into())
    }

    #[test]
    fn test_parse_hours_accepts_bounds_and_text() {
        assert_eq!(parse_hours(&text("8.5")).unwrap(), 8.5);
        assert_eq!(parse_hours(&text(" 0 ")).unwrap(), 0.0);
        assert_eq!(parse_hours(&HoursInput::Number(24.0)).unwrap(), 24.0);
    }

    #[test]
    fn test_parse_hours_rejects_out_of_range_and_garbage() {
        for bad in ["30", "-1", "abc", "", "NaN", "inf", "24.01"] {
            assert!(
                matches!(parse_hours(&text(bad)), Err(AppError::Validation(_))),
                "{:?} should be rejected",
                bad
            );
        }
        assert!(parse_hours(&HoursInput::Number(f64::NAN)).is_err());
    }

    #[test]
    fn test_parse_mood_lists_vocabulary_on_error() {
        match parse_mood("Tired") {
            Err(AppError::Validation(msg)) => {
                assert!(msg.contains("Tired"));
                assert!(msg.contains("Happy, Excited, Calm, Anxious, Sad, Angry"));
            }
            other => panic!("expected validation error, got {:?}", other),
        }
    }

    #[tokio::test]
    async fn test_record_mood_stores_canonical_label() {
        let store = MemoryStore::new();
        let session = session();

        let Recorded { revision, entry } = record_mood(&store, &session, "excited", Utc::now())
            .await
            .unwrap();
        assert_eq!(revision, 1);
        assert_eq!(entry.mood, "Excited");
        assert_eq!(entry.user_id, session.user_id);

        let rows = store
            .select_moods(&HistoryQuery::all(session.user_id))
            .await
            .unwrap();
        assert_eq!(rows, vec![entry]);
    }

    #[tokio::test]
    async fn test_out_of_range_hours_never_reach_store() {
        let store = FailingStore::new();
        let result = record_sleep(&store, &session(), &text("30"), Utc::now()).await;
        assert!(matches!(result, Err(AppError::Validation(_))));
        assert_eq!(store.calls(), 0);
    }

    #[tokio::test]
    async fn test_unknown_mood_never_reaches_store() {
        let store = FailingStore::new();
        let result = record_mood(&store, &session(), "Neutral", Utc::now()).await;
        assert!(matches!(result, Err(AppError::Validation(_))));
        assert_eq!(store.calls(), 0);
    }

    #[tokio::test]
    async fn test_store_failure_is_surfaced_once() {
        let store = FailingStore::new();
        let result = record_mood(&store, &session(), "Calm", Utc::now()).await;
        assert!(matches!(result, Err(AppError::Store(_))));
        assert_eq!(store.calls(), 1, "no automatic retry");
    }
}
