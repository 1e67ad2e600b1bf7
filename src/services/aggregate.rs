//! Pure reductions over history rows: most-recent lookup, per-mood counts,
//! and chart series. All of them are deterministic for identical input.

use chrono::{DateTime, Utc};
use serde::Serialize;

use crate::models::mood::{Mood, MoodEntry};
use crate::models::sleep::SleepEntry;
use crate::models::LogEntry;

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct CategoryCount {
    pub mood: Mood,
    pub count: u32,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct SeriesPoint {
    pub label: String,
    pub value: f64,
}

/// Row with the greatest timestamp. Ties go to the later row.
pub fn most_recent<T: LogEntry>(rows: &[T]) -> Option<&T> {
    rows.iter().max_by_key(|r| r.recorded_at())
}

/// One count per vocabulary label, in vocabulary order. Rows whose label is
/// outside the vocabulary are skipped.
pub fn category_counts(rows: &[MoodEntry]) -> Vec<CategoryCount> {
    let mut counts = [0u32; Mood::ALL.len()];
    for row in rows {
        if let Some(mood) = Mood::from_label(&row.mood) {
            counts[mood as usize] += 1;
        }
    }

    Mood::ALL
        .iter()
        .zip(counts)
        .map(|(mood, count)| CategoryCount { mood: *mood, count })
        .collect()
}

pub fn mood_series(rows: &[MoodEntry]) -> Vec<SeriesPoint> {
    rows.iter()
        .map(|row| SeriesPoint {
            label: display_date(row.recorded_at),
            value: f64::from(Mood::ordinal_of(&row.mood)),
        })
        .collect()
}

pub fn sleep_series(rows: &[SleepEntry]) -> Vec<SeriesPoint> {
    rows.iter()
        .map(|row| SeriesPoint {
            label: display_date(row.recorded_at),
            value: row.hours,
        })
        .collect()
}

/// `M/D/YYYY`, no zero padding.
pub fn display_date(ts: DateTime<Utc>) -> String {
    ts.format("%-m/%-d/%Y").to_string()
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::{Duration, TimeZone};
    use uuid::Uuid;

    fn at(day: u32) -> DateTime<Utc> {
        Utc.with_ymd_and_hms(2026, 3, day, 9, 30, 0).unwrap()
    }

    fn mood(label: &str, day: u32) -> MoodEntry {
        MoodEntry {
            id: Uuid::new_v4(),
            user_id: Uuid::nil(),
            mood: label.into(),
            recorded_at: at(day),
        }
    }

    fn sleep(hours: f64, day: u32) -> SleepEntry {
        SleepEntry {
            id: Uuid::new_v4(),
            user_id: Uuid::nil(),
            hours,
            recorded_at: at(day),
        }
    }

    #[test]
    fn test_most_recent_empty_is_none() {
        let rows: Vec<MoodEntry> = Vec::new();
        assert!(most_recent(&rows).is_none());
    }

    #[test]
    fn test_most_recent_ignores_input_order() {
        let rows = vec![mood("Sad", 4), mood("Happy", 9), mood("Calm", 2)];
        assert_eq!(most_recent(&rows).unwrap().mood, "Happy");
    }

    #[test]
    fn test_most_recent_tie_goes_to_later_row() {
        let rows = vec![mood("Sad", 5), mood("Calm", 5)];
        assert_eq!(most_recent(&rows).unwrap().mood, "Calm");
    }

    #[test]
    fn test_counts_over_zero_rows() {
        let counts = category_counts(&[]);
        let moods: Vec<Mood> = counts.iter().map(|c| c.mood).collect();
        assert_eq!(moods, Mood::ALL.to_vec());
        assert!(counts.iter().all(|c| c.count == 0));
    }

    #[test]
    fn test_counts_ignore_unknown_labels() {
        let rows = vec![
            mood("Happy", 1),
            mood("Tired", 2),
            mood("Happy", 3),
            mood("Angry", 4),
            mood("happy", 5),
        ];
        let counts = category_counts(&rows);
        assert_eq!(counts[0], CategoryCount { mood: Mood::Happy, count: 2 });
        assert_eq!(counts[5], CategoryCount { mood: Mood::Angry, count: 1 });
        assert_eq!(counts.iter().map(|c| c.count).sum::<u32>(), 3);
    }

    #[test]
    fn test_counts_are_order_independent() {
        let rows = vec![
            mood("Calm", 1),
            mood("Sad", 2),
            mood("Calm", 3),
            mood("Excited", 4),
            mood("Anxious", 5),
        ];
        let expected = category_counts(&rows);

        let mut rotated = rows.clone();
        for _ in 0..rows.len() {
            rotated.rotate_left(1);
            assert_eq!(category_counts(&rotated), expected);
        }
        let mut reversed = rows;
        reversed.reverse();
        assert_eq!(category_counts(&reversed), expected);
    }

    #[test]
    fn test_mood_series_keeps_order_and_scales() {
        let rows = vec![mood("Angry", 3), mood("Happy", 1), mood("Unknown", 2)];
        let series = mood_series(&rows);
        assert_eq!(
            series,
            vec![
                SeriesPoint { label: "3/3/2026".into(), value: 0.0 },
                SeriesPoint { label: "3/1/2026".into(), value: 5.0 },
                SeriesPoint { label: "3/2/2026".into(), value: 3.0 },
            ]
        );
    }

    #[test]
    fn test_sleep_series_single_point() {
        let series = sleep_series(&[sleep(8.5, 14)]);
        assert_eq!(series, vec![SeriesPoint { label: "3/14/2026".into(), value: 8.5 }]);
    }

    #[test]
    fn test_display_date_uses_utc_calendar_day() {
        let late = Utc.with_ymd_and_hms(2026, 12, 31, 23, 59, 59).unwrap();
        assert_eq!(display_date(late), "12/31/2026");
        assert_eq!(display_date(late + Duration::seconds(1)), "1/1/2027");
    }
}
