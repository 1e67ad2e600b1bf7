use std::sync::Arc;
use std::time::Duration;

use chrono::{DateTime, Utc};
use rand::seq::SliceRandom;

use crate::auth::Session;
use crate::error::{AppError, AppResult};
use crate::models::garden::{GardenAction, GardenState};
use crate::services::revision::Recorded;
use crate::store::{RecordStore, StoreError};

const GROW_MESSAGES: [&str; 3] = [
    "Your efforts are paying off! Keep growing!",
    "Every day is a chance to grow. You're doing great!",
    "Growth is a journey, not a destination. Keep going!",
];

const WATER_MESSAGES: [&str; 3] = [
    "Nurturing yourself is essential. Great job!",
    "Self-care is a priority, not a luxury. Well done!",
    "You're taking care of yourself, and it shows!",
];

const PAMPER_MESSAGES: [&str; 3] = [
    "You deserve this moment of happiness. Enjoy!",
    "Treating yourself with kindness is a sign of strength.",
    "Your happiness matters. Keep nurturing your joy!",
];

const RESET_MESSAGES: [&str; 3] = [
    "Sometimes, a fresh start is just what we need.",
    "Resetting allows us to begin anew with renewed energy.",
    "Every ending is a new beginning. Let's start fresh!",
];

pub fn headline(action: GardenAction) -> &'static str {
    match action {
        GardenAction::Grow => "Your tree is growing!",
        GardenAction::Water => "Your tree feels refreshed!",
        GardenAction::Pamper => "Your tree feels loved!",
        GardenAction::Reset => "Your tree has been reset!",
    }
}

pub fn motivational_message(action: GardenAction) -> &'static str {
    let pool: &[&'static str] = match action {
        GardenAction::Grow => &GROW_MESSAGES,
        GardenAction::Water => &WATER_MESSAGES,
        GardenAction::Pamper => &PAMPER_MESSAGES,
        GardenAction::Reset => &RESET_MESSAGES,
    };
    pool.choose(&mut rand::thread_rng())
        .copied()
        .unwrap_or(pool[0])
}

/// Load the session owner's garden, planting it on the first visit.
pub async fn visit(
    store: &dyn RecordStore,
    session: &Session,
    now: DateTime<Utc>,
) -> AppResult<GardenState> {
    let garden = store.visit_garden(session.user_id, now).await?;
    if garden.just_planted() {
        tracing::info!(user_id = %session.user_id, garden_id = %garden.id, "Garden planted");
    }
    Ok(garden)
}

pub async fn perform_action(
    store: &dyn RecordStore,
    session: &Session,
    action: GardenAction,
    now: DateTime<Utc>,
) -> AppResult<Recorded<GardenState>> {
    let mut garden = visit(store, session, now).await?;
    garden.apply(action);
    garden.updated_at = now;

    let (saved, revision) = store.update_garden(&garden).await.map_err(|e| match e {
        StoreError::NotFound => AppError::NotFound("Garden not found".into()),
        other => AppError::Store(other),
    })?;

    tracing::info!(
        user_id = %session.user_id,
        action = %action,
        stage = saved.stage,
        health = saved.health,
        happiness = saved.happiness,
        revision,
        "Garden action applied"
    );
    Ok(Recorded {
        revision,
        entry: saved,
    })
}

/// Best-effort growth: every `every`, gardens visited during the last
/// interval advance one stage. Missed ticks are not made up.
pub fn spawn_auto_grow_worker(store: Arc<dyn RecordStore>, every: Duration) {
    tokio::spawn(async move {
        let mut interval = tokio::time::interval(every);
        interval.set_missed_tick_behavior(tokio::time::MissedTickBehavior::Skip);
        // first tick completes immediately
        interval.tick().await;
        loop {
            interval.tick().await;
            match auto_grow_tick(store.as_ref(), every, Utc::now()).await {
                Ok(grown) => {
                    if grown > 0 {
                        tracing::info!(grown, "Garden auto-grow: advanced active gardens");
                    }
                }
                Err(e) => {
                    tracing::error!(error = %e, "Garden auto-grow worker error");
                }
            }
        }
    });
}

pub async fn auto_grow_tick(
    store: &dyn RecordStore,
    every: Duration,
    now: DateTime<Utc>,
) -> Result<u64, StoreError> {
    let window = chrono::Duration::from_std(every)
        .map_err(|e| StoreError::Unavailable(format!("invalid auto-grow interval: {}", e)))?;
    store.advance_active_gardens(now - window, now).await
}
