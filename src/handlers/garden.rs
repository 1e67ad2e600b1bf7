use axum::{extract::State, Extension, Json};
use chrono::Utc;
use serde::Serialize;

use crate::auth::Session;
use crate::error::AppResult;
use crate::extract::AppJson;
use crate::models::garden::{GardenActionRequest, GardenView};
use crate::services::garden;
use crate::services::revision::{self, Recorded};
use crate::AppState;

#[derive(Debug, Serialize)]
pub struct GardenResponse {
    pub revision: u64,
    pub garden: GardenView,
}

#[derive(Debug, Serialize)]
pub struct GardenActionResponse {
    pub revision: u64,
    pub garden: GardenView,
    pub headline: &'static str,
    pub message: &'static str,
}

pub async fn get_garden(
    State(state): State<AppState>,
    Extension(session): Extension<Session>,
) -> AppResult<Json<GardenResponse>> {
    let revision = revision::observed(state.records.as_ref(), &session).await?;
    let tree = garden::visit(state.records.as_ref(), &session, Utc::now()).await?;
    Ok(Json(GardenResponse {
        revision,
        garden: tree.into(),
    }))
}

pub async fn garden_action(
    State(state): State<AppState>,
    Extension(session): Extension<Session>,
    AppJson(body): AppJson<GardenActionRequest>,
) -> AppResult<Json<GardenActionResponse>> {
    let Recorded {
        revision,
        entry: tree,
    } = garden::perform_action(state.records.as_ref(), &session, body.action, Utc::now()).await?;

    Ok(Json(GardenActionResponse {
        revision,
        garden: tree.into(),
        headline: garden::headline(body.action),
        message: garden::motivational_message(body.action),
    }))
}
