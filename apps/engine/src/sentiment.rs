//! Sentiment signals: the fixed label → {neg, neu, pos} table the ranker
//! blends from, plus a lightweight lexicon scorer for free text.

use serde::{Deserialize, Serialize};

use crate::profile::Sentiment;

/// Probability mass split for a sentiment label. Only the positive mass
/// feeds the ranker; the full split is kept for API consumers.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct SentimentMass {
    pub neg: f64,
    pub neu: f64,
    pub pos: f64,
}

/// Fixed mapping from the profile's sentiment enum. Unknown sentiment has
/// already collapsed to `Neutral` during deserialization.
pub fn sentiment_mass(sentiment: Sentiment) -> SentimentMass {
    match sentiment {
        Sentiment::Happy => SentimentMass {
            neg: 0.05,
            neu: 0.2,
            pos: 0.75,
        },
        Sentiment::Neutral => SentimentMass {
            neg: 0.2,
            neu: 0.6,
            pos: 0.2,
        },
        Sentiment::Stressed => SentimentMass {
            neg: 0.6,
            neu: 0.3,
            pos: 0.1,
        },
    }
}

/// Positive-mass component used by the experience-and-sentiment sub-score.
pub fn sentiment_positivity(sentiment: Sentiment) -> f64 {
    sentiment_mass(sentiment).pos
}

// ────────────────────────────────────────────────────────────────────────────
// Free-text scorer
// ────────────────────────────────────────────────────────────────────────────

const POSITIVE_WORDS: &[&str] = &[
    "good",
    "great",
    "excellent",
    "positive",
    "success",
    "happy",
    "helpful",
    "improved",
    "strong",
    "love",
    "like",
    "recommend",
];

const NEGATIVE_WORDS: &[&str] = &[
    "bad",
    "poor",
    "negative",
    "fail",
    "failed",
    "sad",
    "problem",
    "issue",
    "weak",
    "hate",
    "dislike",
    "risk",
];

/// Result of scoring free text.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct TextSentiment {
    /// Normalized score in [-1, 1].
    pub score: f64,
    /// "Positive", "Neutral" or "Negative".
    pub label: String,
}

/// Scores free text with a small word-list heuristic. Deterministic and
/// dependency-free; empty or unrecognized text reads as neutral.
pub fn analyze_text(text: &str) -> TextSentiment {
    let lower = text.to_lowercase();
    let words = lower
        .split_whitespace()
        .map(|w| w.trim_matches(|c: char| !c.is_alphanumeric()));

    let mut pos = 0i64;
    let mut neg = 0i64;
    for w in words {
        if POSITIVE_WORDS.contains(&w) {
            pos += 1;
        } else if NEGATIVE_WORDS.contains(&w) {
            neg += 1;
        }
    }

    let score = if pos + neg == 0 {
        0.0
    } else {
        (pos - neg) as f64 / (pos + neg) as f64
    };

    let label = if score > 0.05 {
        "Positive"
    } else if score < -0.05 {
        "Negative"
    } else {
        "Neutral"
    };

    TextSentiment {
        score,
        label: label.to_string(),
    }
}
