use axum::{extract::State, Extension, Json};
use serde::Serialize;

use crate::auth::Session;
use crate::error::AppResult;
use crate::models::mood::MoodEntry;
use crate::models::sleep::SleepEntry;
use crate::services::{history, revision};
use crate::AppState;

const RECENT_ACTIVITY: u32 = 5;

#[derive(Debug, Serialize)]
pub struct Dashboard {
    pub revision: u64,
    pub latest_mood: Option<MoodEntry>,
    pub latest_sleep: Option<SleepEntry>,
    pub recent_activity: Vec<MoodEntry>,
}

pub async fn get_dashboard(
    State(state): State<AppState>,
    Extension(session): Extension<Session>,
) -> AppResult<Json<Dashboard>> {
    let store = state.records.as_ref();
    let revision = revision::observed(store, &session).await?;

    let (latest_mood, latest_sleep, recent_activity) = tokio::try_join!(
        history::latest_mood(store, &session),
        history::latest_sleep(store, &session),
        history::recent_moods(store, &session, RECENT_ACTIVITY),
    )?;

    Ok(Json(Dashboard {
        revision,
        latest_mood,
        latest_sleep,
        recent_activity,
    }))
}
