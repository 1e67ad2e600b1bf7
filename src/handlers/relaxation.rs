use axum::Json;
use serde::Deserialize;
use validator::Validate;

use crate::error::AppResult;
use crate::extract::{AppJson, AppQuery};
use crate::services::relaxation::{
    self, AffirmationFeedback, BreathingState, Exercise, EXERCISES,
};

#[derive(Debug, Deserialize)]
pub struct BreathingParams {
    #[serde(default)]
    pub elapsed_secs: u64,
}

#[derive(Debug, Deserialize, Validate)]
pub struct AffirmationRequest {
    #[validate(length(min = 1, max = 500, message = "Affirmation must be 1 to 500 characters"))]
    pub text: String,
}

pub async fn list_exercises() -> Json<&'static [Exercise]> {
    Json(&EXERCISES[..])
}

pub async fn breathing(AppQuery(params): AppQuery<BreathingParams>) -> Json<BreathingState> {
    Json(relaxation::breathing_state(params.elapsed_secs))
}

pub async fn affirmation(
    AppJson(body): AppJson<AffirmationRequest>,
) -> AppResult<Json<AffirmationFeedback>> {
    body.validate()?;
    let feedback = relaxation::affirmation_feedback(&body.text);
    tracing::debug!(score = feedback.score, tone = ?feedback.tone, "Affirmation scored");
    Ok(Json(feedback))
}
