use std::fmt;

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use sqlx::FromRow;
use uuid::Uuid;

pub const TREE_STAGES: [&str; 6] = ["🌱", "🌿", "🌳", "🌳🍎", "🌳🍎🍎", "🌳🍎🍎🍎"];
pub const MAX_STAGE: i32 = TREE_STAGES.len() as i32 - 1;
pub const MAX_LEVEL: i32 = 100;

pub const INITIAL_STAGE: i32 = 0;
pub const INITIAL_HEALTH: i32 = 50;
pub const INITIAL_HAPPINESS: i32 = 50;

#[derive(Debug, Clone, Serialize, Deserialize, FromRow, PartialEq)]
pub struct GardenState {
    pub id: Uuid,
    pub user_id: Uuid,
    pub stage: i32,
    pub health: i32,
    pub happiness: i32,
    pub last_visited_at: DateTime<Utc>,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum GardenAction {
    Grow,
    Water,
    Pamper,
    Reset,
}

impl fmt::Display for GardenAction {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let name = match self {
            GardenAction::Grow => "grow",
            GardenAction::Water => "water",
            GardenAction::Pamper => "pamper",
            GardenAction::Reset => "reset",
        };
        f.write_str(name)
    }
}

impl GardenState {
    pub fn new(user_id: Uuid, now: DateTime<Utc>) -> Self {
        Self {
            id: Uuid::new_v4(),
            user_id,
            stage: INITIAL_STAGE,
            health: INITIAL_HEALTH,
            happiness: INITIAL_HAPPINESS,
            last_visited_at: now,
            created_at: now,
            updated_at: now,
        }
    }

    /// True until the garden is visited again after the visit that planted it.
    /// Compares stored columns only, never the caller's clock.
    pub fn just_planted(&self) -> bool {
        self.created_at == self.last_visited_at
    }

    /// Apply a user action. Levels are clamped after every transition.
    pub fn apply(&mut self, action: GardenAction) {
        match action {
            GardenAction::Grow => {
                self.stage += 1;
                self.health -= 5;
            }
            GardenAction::Water => {
                self.health += 10;
                self.happiness -= 5;
            }
            GardenAction::Pamper => {
                self.happiness += 10;
                self.health -= 5;
            }
            GardenAction::Reset => {
                self.stage = INITIAL_STAGE;
                self.health = INITIAL_HEALTH;
                self.happiness = INITIAL_HAPPINESS;
            }
        }
        self.clamp();
    }

    /// Time-based growth: one stage, no cost to health.
    pub fn auto_grow(&mut self) {
        self.stage += 1;
        self.clamp();
    }

    pub fn clamp(&mut self) {
        self.stage = self.stage.clamp(0, MAX_STAGE);
        self.health = self.health.clamp(0, MAX_LEVEL);
        self.happiness = self.happiness.clamp(0, MAX_LEVEL);
    }

    pub fn stage_symbol(&self) -> &'static str {
        TREE_STAGES[self.stage.clamp(0, MAX_STAGE) as usize]
    }
}

#[derive(Debug, Deserialize)]
pub struct GardenActionRequest {
    pub action: GardenAction,
}

#[derive(Debug, Serialize)]
pub struct GardenView {
    #[serde(flatten)]
    pub garden: GardenState,
    pub stage_symbol: &'static str,
    pub max_stage: i32,
}

impl From<GardenState> for GardenView {
    fn from(garden: GardenState) -> Self {
        let stage_symbol = garden.stage_symbol();
        Self {
            garden,
            stage_symbol,
            max_stage: MAX_STAGE,
        }
    }
}
