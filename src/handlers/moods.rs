use axum::{extract::State, http::StatusCode, Extension, Json};
use chrono::Utc;
use serde::Serialize;

use crate::auth::Session;
use crate::error::AppResult;
use crate::extract::{AppJson, AppQuery};
use crate::models::mood::{MoodEntry, RecordMoodRequest};
use crate::services::aggregate::{self, CategoryCount, SeriesPoint};
use crate::services::history::{self, HistoryParams};
use crate::services::recorder;
use crate::services::revision::{self, Recorded};
use crate::AppState;

#[derive(Debug, Serialize)]
pub struct HistoryResponse<T> {
    pub revision: u64,
    pub window_days: u32,
    pub entries: Vec<T>,
}

#[derive(Debug, Serialize)]
pub struct LatestResponse<T> {
    pub revision: u64,
    pub entry: Option<T>,
}

#[derive(Debug, Serialize)]
pub struct CountsResponse {
    pub revision: u64,
    pub window_days: u32,
    pub total: u32,
    pub counts: Vec<CategoryCount>,
}

#[derive(Debug, Serialize)]
pub struct SeriesResponse {
    pub revision: u64,
    pub window_days: u32,
    pub points: Vec<SeriesPoint>,
}

pub async fn record_mood(
    State(state): State<AppState>,
    Extension(session): Extension<Session>,
    AppJson(body): AppJson<RecordMoodRequest>,
) -> AppResult<(StatusCode, Json<Recorded<MoodEntry>>)> {
    let recorded =
        recorder::record_mood(state.records.as_ref(), &session, &body.mood, Utc::now()).await?;
    Ok((StatusCode::CREATED, Json(recorded)))
}

pub async fn list_moods(
    State(state): State<AppState>,
    Extension(session): Extension<Session>,
    AppQuery(params): AppQuery<HistoryParams>,
) -> AppResult<Json<HistoryResponse<MoodEntry>>> {
    let max_days = state.config.max_history_days;
    let window_days = params.window_days(max_days)?;
    let query = params.to_query(&session, Utc::now(), max_days)?;

    let revision = revision::observed(state.records.as_ref(), &session).await?;
    let entries = history::mood_history(state.records.as_ref(), &query).await?;
    Ok(Json(HistoryResponse {
        revision,
        window_days,
        entries,
    }))
}

pub async fn latest_mood(
    State(state): State<AppState>,
    Extension(session): Extension<Session>,
) -> AppResult<Json<LatestResponse<MoodEntry>>> {
    let revision = revision::observed(state.records.as_ref(), &session).await?;
    let entry = history::latest_mood(state.records.as_ref(), &session).await?;
    Ok(Json(LatestResponse { revision, entry }))
}

pub async fn mood_counts(
    State(state): State<AppState>,
    Extension(session): Extension<Session>,
    AppQuery(params): AppQuery<HistoryParams>,
) -> AppResult<Json<CountsResponse>> {
    let max_days = state.config.max_history_days;
    let window_days = params.window_days(max_days)?;
    let query = params.to_query(&session, Utc::now(), max_days)?;

    let revision = revision::observed(state.records.as_ref(), &session).await?;
    let rows = history::mood_history(state.records.as_ref(), &query).await?;
    let counts = aggregate::category_counts(&rows);
    let total = counts.iter().map(|c| c.count).sum();

    Ok(Json(CountsResponse {
        revision,
        window_days,
        total,
        counts,
    }))
}

pub async fn mood_series(
    State(state): State<AppState>,
    Extension(session): Extension<Session>,
    AppQuery(params): AppQuery<HistoryParams>,
) -> AppResult<Json<SeriesResponse>> {
    let max_days = state.config.max_history_days;
    let window_days = params.window_days(max_days)?;
    let query = params.to_query(&session, Utc::now(), max_days)?;

    let revision = revision::observed(state.records.as_ref(), &session).await?;
    let rows = history::mood_history(state.records.as_ref(), &query).await?;
    Ok(Json(SeriesResponse {
        revision,
        window_days,
        points: aggregate::mood_series(&rows),
    }))
}
