use axum::{extract::State, http::StatusCode, Extension, Json};
use chrono::Utc;

use crate::auth::Session;
use crate::error::AppResult;
use crate::extract::{AppJson, AppQuery};
use crate::handlers::moods::{HistoryResponse, LatestResponse, SeriesResponse};
use crate::models::sleep::{RecordSleepRequest, SleepEntry};
use crate::services::aggregate;
use crate::services::history::{self, HistoryParams};
use crate::services::recorder;
use crate::services::revision::{self, Recorded};
use crate::AppState;

pub async fn record_sleep(
    State(state): State<AppState>,
    Extension(session): Extension<Session>,
    AppJson(body): AppJson<RecordSleepRequest>,
) -> AppResult<(StatusCode, Json<Recorded<SleepEntry>>)> {
    let recorded =
        recorder::record_sleep(state.records.as_ref(), &session, &body.hours, Utc::now()).await?;
    Ok((StatusCode::CREATED, Json(recorded)))
}

pub async fn list_sleep(
    State(state): State<AppState>,
    Extension(session): Extension<Session>,
    AppQuery(params): AppQuery<HistoryParams>,
) -> AppResult<Json<HistoryResponse<SleepEntry>>> {
    let max_days = state.config.max_history_days;
    let window_days = params.window_days(max_days)?;
    let query = params.to_query(&session, Utc::now(), max_days)?;

    let revision = revision::observed(state.records.as_ref(), &session).await?;
    let entries = history::sleep_history(state.records.as_ref(), &query).await?;
    Ok(Json(HistoryResponse {
        revision,
        window_days,
        entries,
    }))
}

pub async fn latest_sleep(
    State(state): State<AppState>,
    Extension(session): Extension<Session>,
) -> AppResult<Json<LatestResponse<SleepEntry>>> {
    let revision = revision::observed(state.records.as_ref(), &session).await?;
    let entry = history::latest_sleep(state.records.as_ref(), &session).await?;
    Ok(Json(LatestResponse { revision, entry }))
}

pub async fn sleep_series(
    State(state): State<AppState>,
    Extension(session): Extension<Session>,
    AppQuery(params): AppQuery<HistoryParams>,
) -> AppResult<Json<SeriesResponse>> {
    let max_days = state.config.max_history_days;
    let window_days = params.window_days(max_days)?;
    let query = params.to_query(&session, Utc::now(), max_days)?;

    let revision = revision::observed(state.records.as_ref(), &session).await?;
    let rows = history::sleep_history(state.records.as_ref(), &query).await?;
    Ok(Json(SeriesResponse {
        revision,
        window_days,
        points: aggregate::sleep_series(&rows),
    }))
}
