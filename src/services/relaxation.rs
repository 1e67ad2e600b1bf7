//! Relaxation exercises: the static catalog, the 4-7-8 breathing timer and
//! affirmation feedback.

use serde::Serialize;
use vader_sentiment::SentimentIntensityAnalyzer;

#[derive(Debug, Clone, Serialize)]
pub struct Exercise {
    pub id: u32,
    pub name: &'static str,
    pub description: &'static str,
    #[serde(skip_serializing_if = "no_steps")]
    pub steps: &'static [&'static str],
    #[serde(skip_serializing_if = "Option::is_none")]
    pub video_id: Option<&'static str>,
}

fn no_steps(steps: &&'static [&'static str]) -> bool {
    steps.is_empty()
}

pub static EXERCISES: [Exercise; 6] = [
    Exercise {
        id: 1,
        name: "4-7-8 Breathing",
        description: "A quick relaxation technique to calm your mind.",
        steps: &[
            "Sit comfortably and close your eyes.",
            "Inhale through your nose for 4 seconds.",
            "Hold your breath for 7 seconds.",
            "Exhale completely through your mouth for 8 seconds.",
            "Repeat this cycle 4 times.",
        ],
        video_id: None,
    },
    Exercise {
        id: 2,
        name: "Gratitude Reflection",
        description: "Focus on positive experiences to improve mood and mindset.",
        steps: &[
            "Think about one positive thing that happened today, no matter how small.",
            "Write it down or say it out loud.",
            "Reflect on why this experience was positive for you.",
            "Consider how you can create more experiences like this in the future.",
            "Take a moment to feel grateful for this positive experience.",
        ],
        video_id: None,
    },
    Exercise {
        id: 3,
        name: "5-4-3-2-1 Grounding Exercise",
        description: "A mindfulness technique to anchor yourself in the present moment.",
        steps: &[
            "Identify 5 things you can see around you.",
            "Acknowledge 4 things you can touch or feel.",
            "Notice 3 things you can hear.",
            "Recognize 2 things you can smell.",
            "Be aware of 1 thing you can taste.",
            "Take a deep breath and feel more grounded in the present.",
        ],
        video_id: None,
    },
    Exercise {
        id: 4,
        name: "Progressive Muscle Relaxation",
        description: "Reduce physical tension and promote relaxation.",
        steps: &[
            "Start with your toes, tense the muscles for 5 seconds, then relax.",
            "Move to your calves, tense for 5 seconds, then relax.",
            "Continue this process moving upwards through your body.",
            "Include thighs, buttocks, abdomen, chest, arms, hands, neck, and face.",
            "Finally, tense your whole body for 5 seconds, then relax completely.",
        ],
        video_id: None,
    },
    Exercise {
        id: 5,
        name: "Positive Affirmations",
        description: "Boost self-esteem and promote a positive mindset.",
        steps: &[
            "Choose a positive statement about yourself (e.g., 'I am capable and strong').",
            "Stand in front of a mirror or find a quiet space.",
            "Repeat the affirmation out loud or in your mind 10 times.",
            "Focus on believing the statement as you say it.",
            "Notice how you feel after completing the exercise.",
        ],
        video_id: None,
    },
    Exercise {
        id: 6,
        name: "Guided Meditation Video",
        description: "A calming guided meditation video to help you relax and focus.",
        steps: &[],
        video_id: Some("inpok4MKVLM"),
    },
];

// ── 4-7-8 breathing ──────────────────────────────────────────────────────────

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum BreathingPhase {
    Inhale,
    Hold,
    Exhale,
}

impl BreathingPhase {
    pub const CYCLE: [BreathingPhase; 3] = [
        BreathingPhase::Inhale,
        BreathingPhase::Hold,
        BreathingPhase::Exhale,
    ];

    pub fn seconds(self) -> u64 {
        match self {
            BreathingPhase::Inhale => 4,
            BreathingPhase::Hold => 7,
            BreathingPhase::Exhale => 8,
        }
    }

    pub fn cycle_seconds() -> u64 {
        Self::CYCLE.iter().map(|p| p.seconds()).sum()
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct BreathingState {
    pub phase: BreathingPhase,
    /// Countdown shown to the user, from the phase length down to 1.
    pub countdown: u64,
    pub completed_cycles: u64,
}

/// Timer state `elapsed_secs` whole seconds after the exercise started.
pub fn breathing_state(elapsed_secs: u64) -> BreathingState {
    let cycle = BreathingPhase::cycle_seconds();
    let completed_cycles = elapsed_secs / cycle;
    let mut into_cycle = elapsed_secs % cycle;

    // into_cycle < cycle, so the loop always stops inside a phase
    let mut phase = BreathingPhase::Inhale;
    for p in BreathingPhase::CYCLE {
        phase = p;
        if into_cycle < p.seconds() {
            break;
        }
        into_cycle -= p.seconds();
    }

    BreathingState {
        phase,
        countdown: phase.seconds() - into_cycle,
        completed_cycles,
    }
}

// ── Affirmation feedback ─────────────────────────────────────────────────────

pub const POSITIVE_RESPONSE: &str = "That's a wonderful positive affirmation! Your mindset is truly empowering. Keep nurturing these uplifting thoughts!";
pub const NEGATIVE_RESPONSE: &str = "I sense some negativity in your words. Remember, you're stronger than you think! Try rephrasing your affirmation in a more positive light.";
pub const NEUTRAL_RESPONSE: &str = "That's an interesting thought. How about adding some more positive words to make your affirmation even more powerful?";

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum Tone {
    Positive,
    Negative,
    Neutral,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct AffirmationFeedback {
    /// VADER compound score in `[-1, 1]`.
    pub score: f64,
    pub tone: Tone,
    pub message: &'static str,
}

/// Compound valence of `text`. Negations and contrast words ("but") only
/// affect the words they govern.
pub fn sentiment_score(text: &str) -> f64 {
    if text.trim().is_empty() {
        return 0.0;
    }
    let analyzer = SentimentIntensityAnalyzer::new();
    analyzer
        .polarity_scores(text)
        .get("compound")
        .copied()
        .unwrap_or(0.0)
}

pub fn affirmation_feedback(text: &str) -> AffirmationFeedback {
    let score = sentiment_score(text);
    let (tone, message) = if score > 0.0 {
        (Tone::Positive, POSITIVE_RESPONSE)
    } else if score < 0.0 {
        (Tone::Negative, NEGATIVE_RESPONSE)
    } else {
        (Tone::Neutral, NEUTRAL_RESPONSE)
    };
    AffirmationFeedback {
        score,
        tone,
        message,
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_catalog_shape() {
        assert_eq!(EXERCISES.len(), 6);
        assert!(EXERCISES.iter().take(5).all(|e| !e.steps.is_empty()));
        assert_eq!(EXERCISES[5].video_id, Some("inpok4MKVLM"));

        let json = serde_json::to_value(&EXERCISES[5]).unwrap();
        assert!(json.get("steps").is_none());
        assert!(json.get("video_id").is_some());
    }

    #[test]
    fn test_breathing_phase_boundaries() {
        let at = |s| {
            let st = breathing_state(s);
            (st.phase, st.countdown, st.completed_cycles)
        };
        assert_eq!(at(0), (BreathingPhase::Inhale, 4, 0));
        assert_eq!(at(3), (BreathingPhase::Inhale, 1, 0));
        assert_eq!(at(4), (BreathingPhase::Hold, 7, 0));
        assert_eq!(at(10), (BreathingPhase::Hold, 1, 0));
        assert_eq!(at(11), (BreathingPhase::Exhale, 8, 0));
        assert_eq!(at(18), (BreathingPhase::Exhale, 1, 0));
        assert_eq!(at(19), (BreathingPhase::Inhale, 4, 1));
        assert_eq!(at(19 * 4 + 5), (BreathingPhase::Hold, 6, 4));
    }

    #[test]
    fn test_sentiment_tones() {
        assert_eq!(affirmation_feedback("I am happy and loved").tone, Tone::Positive);
        assert_eq!(affirmation_feedback("I feel useless and sad").tone, Tone::Negative);
        assert_eq!(affirmation_feedback("The train leaves at noon").tone, Tone::Neutral);
        assert_eq!(affirmation_feedback("   ").score, 0.0);
    }

    #[test]
    fn test_everyday_affirmations_are_positive() {
        for text in [
            "I am fantastic and blessed",
            "I deserve love and kindness",
            "Today is a great day",
        ] {
            assert_eq!(affirmation_feedback(text).tone, Tone::Positive, "{}", text);
        }
    }

    #[test]
    fn test_negation_only_governs_nearby_words() {
        let feedback = affirmation_feedback("I'm not sure why, but today I feel happy");
        assert_eq!(feedback.tone, Tone::Positive);
        assert!(sentiment_score("I am not sad") > 0.0);
        assert!(sentiment_score("I am not happy") < 0.0);
    }

    #[test]
    fn test_messages() {
        assert_eq!(affirmation_feedback("I love myself").message, POSITIVE_RESPONSE);
        assert_eq!(affirmation_feedback("I hate mondays").message, NEGATIVE_RESPONSE);
    }
}
