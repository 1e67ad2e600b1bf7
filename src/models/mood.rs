use std::fmt;
use std::str::FromStr;

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use sqlx::FromRow;
use uuid::Uuid;

/// The fixed mood vocabulary. Declaration order is the display order used by
/// category counts; `ordinal` is the 0..=5 scale used by trend series.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum Mood {
    Happy,
    Excited,
    Calm,
    Anxious,
    Sad,
    Angry,
}

/// (mood, label, ordinal) in declared vocabulary order.
const VOCABULARY: [(Mood, &str, u8); 6] = [
    (Mood::Happy, "Happy", 5),
    (Mood::Excited, "Excited", 4),
    (Mood::Calm, "Calm", 3),
    (Mood::Anxious, "Anxious", 2),
    (Mood::Sad, "Sad", 1),
    (Mood::Angry, "Angry", 0),
];

impl Mood {
    pub const ALL: [Mood; 6] = [
        Mood::Happy,
        Mood::Excited,
        Mood::Calm,
        Mood::Anxious,
        Mood::Sad,
        Mood::Angry,
    ];

    /// Scale value reported for labels outside the vocabulary.
    pub const NEUTRAL_ORDINAL: u8 = 3;

    fn entry(self) -> &'static (Mood, &'static str, u8) {
        &VOCABULARY[self as usize]
    }

    pub fn label(self) -> &'static str {
        self.entry().1
    }

    pub fn ordinal(self) -> u8 {
        self.entry().2
    }

    /// Exact lookup of a stored label. Rows written before a vocabulary
    /// change may hold labels that no longer resolve.
    pub fn from_label(label: &str) -> Option<Mood> {
        VOCABULARY
            .iter()
            .find(|(_, l, _)| *l == label)
            .map(|(m, _, _)| *m)
    }

    /// Ordinal of a stored label, falling back to the neutral midpoint.
    pub fn ordinal_of(label: &str) -> u8 {
        Mood::from_label(label)
            .map(Mood::ordinal)
            .unwrap_or(Mood::NEUTRAL_ORDINAL)
    }

    pub fn vocabulary() -> String {
        Mood::ALL
            .iter()
            .map(|m| m.label())
            .collect::<Vec<_>>()
            .join(", ")
    }
}

impl fmt::Display for Mood {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.label())
    }
}

#[derive(Debug, thiserror::Error, PartialEq)]
#[error("unknown mood '{0}'")]
pub struct UnknownMood(pub String);

impl FromStr for Mood {
    type Err = UnknownMood;

    /// Case-insensitive parse of user input.
    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let wanted = s.trim();
        VOCABULARY
            .iter()
            .find(|(_, l, _)| l.eq_ignore_ascii_case(wanted))
            .map(|(m, _, _)| *m)
            .ok_or_else(|| UnknownMood(wanted.to_string()))
    }
}

#[derive(Debug, Clone, Serialize, Deserialize, FromRow, PartialEq)]
pub struct MoodEntry {
    pub id: Uuid,
    pub user_id: Uuid,
    pub mood: String,
    pub recorded_at: DateTime<Utc>,
}

#[derive(Debug, Deserialize)]
pub struct RecordMoodRequest {
    pub mood: String,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_vocabulary_table_matches_enum_order() {
        for (i, mood) in Mood::ALL.iter().enumerate() {
            assert_eq!(*mood as usize, i);
            assert_eq!(VOCABULARY[i].0, *mood);
        }
    }

    #[test]
    fn test_ordinal_scale() {
        assert_eq!(Mood::Happy.ordinal(), 5);
        assert_eq!(Mood::Excited.ordinal(), 4);
        assert_eq!(Mood::Calm.ordinal(), 3);
        assert_eq!(Mood::Anxious.ordinal(), 2);
        assert_eq!(Mood::Sad.ordinal(), 1);
        assert_eq!(Mood::Angry.ordinal(), 0);
    }

    #[test]
    fn test_unknown_label_maps_to_midpoint() {
        assert_eq!(Mood::ordinal_of("Tired"), 3);
        assert_eq!(Mood::ordinal_of(""), 3);
        // Angry is a real zero, not a missing value.
        assert_eq!(Mood::ordinal_of("Angry"), 0);
    }

    #[test]
    fn test_parse_is_case_insensitive_and_trims() {
        assert_eq!(" happy ".parse::<Mood>(), Ok(Mood::Happy));
        assert_eq!("ANXIOUS".parse::<Mood>(), Ok(Mood::Anxious));
        assert_eq!("Neutral".parse::<Mood>(), Err(UnknownMood("Neutral".into())));
    }

    #[test]
    fn test_from_label_is_exact() {
        assert_eq!(Mood::from_label("Calm"), Some(Mood::Calm));
        assert_eq!(Mood::from_label("calm"), None);
    }

    #[test]
    fn test_vocabulary_string() {
        assert_eq!(Mood::vocabulary(), "Happy, Excited, Calm, Anxious, Sad, Angry");
    }
}
