//! # Sentiment Scorer
//! Lexicon/heuristic polarity + subjectivity model.
//!
//! Every lexicon word carries `(polarity, subjectivity)`. An intensifier
//! directly in front of a word scales both values, a negator within the
//! previous three tokens of the same sentence flips the polarity at half
//! strength. The text score
//! is the mean over all matched words. No I/O, no state.

use once_cell::sync::Lazy;
use serde::{Deserialize, Serialize};
use std::collections::HashMap;
use std::fmt;

/// Polarity strictly above this is positive.
pub const POSITIVE_THRESHOLD: f64 = 0.2;
/// Polarity strictly below this is negative.
pub const NEGATIVE_THRESHOLD: f64 = -0.2;

const NEGATION_FACTOR: f64 = -0.5;

#[derive(Debug, Deserialize)]
struct Lexicon {
    words: HashMap<String, (f64, f64)>,
    intensifiers: HashMap<String, f64>,
}

static LEXICON: Lazy<Lexicon> = Lazy::new(|| {
    let raw = include_str!("../sentiment_lexicon.json");
    serde_json::from_str::<Lexicon>(raw).expect("valid sentiment lexicon")
});

/// Discrete sentiment category.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub enum SentimentCategory {
    Positive,
    Neutral,
    Negative,
    /// Sentinel for videos whose transcript could not be retrieved.
    NoTranscript,
}

impl SentimentCategory {
    pub const ALL: [SentimentCategory; 4] = [
        SentimentCategory::Positive,
        SentimentCategory::Neutral,
        SentimentCategory::Negative,
        SentimentCategory::NoTranscript,
    ];

    pub fn as_str(&self) -> &'static str {
        match self {
            SentimentCategory::Positive => "positive",
            SentimentCategory::Neutral => "neutral",
            SentimentCategory::Negative => "negative",
            SentimentCategory::NoTranscript => "no-transcript",
        }
    }

    /// Chart color used by the dashboard.
    pub fn color(&self) -> &'static str {
        match self {
            SentimentCategory::Positive => "green",
            SentimentCategory::Neutral => "blue",
            SentimentCategory::Negative => "red",
            SentimentCategory::NoTranscript => "gray",
        }
    }

    pub fn parse(s: &str) -> Option<Self> {
        Self::ALL.into_iter().find(|c| c.as_str() == s)
    }
}

impl fmt::Display for SentimentCategory {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Threshold policy: `> 0.2` positive, `< -0.2` negative, else neutral.
pub fn classify_polarity(polarity: f64) -> SentimentCategory {
    if polarity > POSITIVE_THRESHOLD {
        SentimentCategory::Positive
    } else if polarity < NEGATIVE_THRESHOLD {
        SentimentCategory::Negative
    } else {
        SentimentCategory::Neutral
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct SentimentResult {
    pub polarity: f64,
    pub subjectivity: f64,
    #[serde(rename = "sentiment")]
    pub category: SentimentCategory,
}

impl SentimentResult {
    /// Builds a result whose category is derived from `polarity`.
    pub fn from_scores(polarity: f64, subjectivity: f64) -> Self {
        Self {
            polarity,
            subjectivity,
            category: classify_polarity(polarity),
        }
    }

    pub fn neutral() -> Self {
        Self::from_scores(0.0, 0.0)
    }

    /// Caller-supplied sentinel; the scorer never produces it from text.
    pub fn no_transcript() -> Self {
        Self {
            polarity: 0.0,
            subjectivity: 0.0,
            category: SentimentCategory::NoTranscript,
        }
    }
}

#[derive(Debug, Clone, Default)]
pub struct SentimentAnalyzer;

impl SentimentAnalyzer {
    pub fn new() -> Self {
        Self
    }

    #[inline]
    fn word_entry(&self, w: &str) -> Option<(f64, f64)> {
        LEXICON.words.get(w).copied()
    }

    #[inline]
    fn intensity(&self, w: &str) -> Option<f64> {
        LEXICON.intensifiers.get(w).copied()
    }

    /// Scores free text. Empty text or text without any lexicon hit is neutral (0, 0).
    pub fn score(&self, text: &str) -> SentimentResult {
        let mut assessments: Vec<(f64, f64)> = Vec::new();
        for sentence in text.split(['.', '!', '?']) {
            self.assess_sentence(sentence, &mut assessments);
        }

        if assessments.is_empty() {
            return SentimentResult::neutral();
        }

        let n = assessments.len() as f64;
        let polarity = assessments.iter().map(|(p, _)| p).sum::<f64>() / n;
        let subjectivity = assessments.iter().map(|(_, s)| s).sum::<f64>() / n;
        SentimentResult::from_scores(polarity.clamp(-1.0, 1.0), subjectivity.clamp(0.0, 1.0))
    }

    /// Intensifiers and negators only reach words of the same sentence.
    fn assess_sentence(&self, sentence: &str, assessments: &mut Vec<(f64, f64)>) {
        let tokens: Vec<String> = tokenize(sentence).collect();
        for i in 0..tokens.len() {
            let Some((polarity, subjectivity)) = self.word_entry(&tokens[i]) else {
                continue;
            };

            let factor = if i >= 1 {
                self.intensity(&tokens[i - 1]).unwrap_or(1.0)
            } else {
                1.0
            };
            let negated = (1..=3).any(|k| i >= k && is_negator(tokens[i - k].as_str()));

            let mut p = polarity * factor;
            if negated {
                p *= NEGATION_FACTOR;
            }
            let s = subjectivity * factor;
            assessments.push((p.clamp(-1.0, 1.0), s.clamp(0.0, 1.0)));
        }
    }
}

/// Lower-case word tokens; inner apostrophes are kept so "isn't" stays one token.
fn tokenize(s: &str) -> impl Iterator<Item = String> + '_ {
    s.split(|c: char| !(c.is_alphanumeric() || c == '\'' || c == '\u{2019}'))
        .map(|t| t.trim_matches(|c| c == '\'' || c == '\u{2019}'))
        .filter(|t| !t.is_empty())
        .map(|t| t.replace('\u{2019}', "'").to_lowercase())
}

fn is_negator(tok: &str) -> bool {
    matches!(
        tok,
        "not"
            | "no"
            | "never"
            | "nor"
            | "isn't"
            | "wasn't"
            | "aren't"
            | "weren't"
            | "won't"
            | "don't"
            | "doesn't"
            | "didn't"
            | "can't"
            | "cannot"
            | "without"
            | "tidak"
            | "tak"
            | "bukan"
            | "belum"
    )
}

#[cfg(test)]
mod tests {
    use super::*;

    fn a() -> SentimentAnalyzer {
        SentimentAnalyzer::new()
    }

    #[test]
    fn thresholds_are_strict() {
        assert_eq!(classify_polarity(0.2), SentimentCategory::Neutral);
        assert_eq!(classify_polarity(-0.2), SentimentCategory::Neutral);
        assert_eq!(classify_polarity(0.2000001), SentimentCategory::Positive);
        assert_eq!(classify_polarity(-0.2000001), SentimentCategory::Negative);
        assert_eq!(classify_polarity(0.0), SentimentCategory::Neutral);
    }

    #[test]
    fn empty_and_blank_text_is_neutral_zero() {
        for t in ["", "   ", "\n\t"] {
            let r = a().score(t);
            assert_eq!(r.polarity, 0.0);
            assert_eq!(r.subjectivity, 0.0);
            assert_eq!(r.category, SentimentCategory::Neutral);
        }
    }

    #[test]
    fn unknown_words_only_is_neutral_zero() {
        let r = a().score("the quarterly report was published on tuesday");
        assert_eq!(r, SentimentResult::neutral());
    }

    #[test]
    fn positive_and_negative_text() {
        let pos = a().score("An excellent, wonderful result for the team");
        assert!(pos.polarity > 0.2, "{pos:?}");
        assert_eq!(pos.category, SentimentCategory::Positive);

        let neg = a().score("A terrible disaster, the worst crisis in years");
        assert!(neg.polarity < -0.2, "{neg:?}");
        assert_eq!(neg.category, SentimentCategory::Negative);
    }

    #[test]
    fn negation_flips_at_half_strength() {
        let plain = a().score("good");
        let negated = a().score("not good");
        assert!((negated.polarity - plain.polarity * -0.5).abs() < 1e-9);
        // within a three-token window
        let far = a().score("it is not really that good");
        assert!(far.polarity < 0.0);
    }

    #[test]
    fn negation_stops_at_sentence_end() {
        let mixed = a().score("Not bad. Good results");
        let expected = (a().score("not bad").polarity + a().score("good").polarity) / 2.0;
        assert!((mixed.polarity - expected).abs() < 1e-9);
        assert!(a().score("Not! Good").polarity > 0.0);
    }

    #[test]
    fn contractions_negate() {
        assert!(a().score("this isn't good").polarity < 0.0);
        assert!(a().score("this isn\u{2019}t good").polarity < 0.0);
    }

    #[test]
    fn intensifier_scales_polarity_and_subjectivity() {
        let plain = a().score("good");
        let very = a().score("very good");
        assert!(very.polarity > plain.polarity);
        assert!(very.subjectivity >= plain.subjectivity);
        assert!(very.polarity <= 1.0 && very.subjectivity <= 1.0);
    }

    #[test]
    fn scores_are_bounded_and_deterministic() {
        let t = "extremely excellent extremely perfect absolutely superb";
        let r1 = a().score(t);
        let r2 = a().score(t);
        assert_eq!(r1, r2);
        assert!((-1.0..=1.0).contains(&r1.polarity));
        assert!((0.0..=1.0).contains(&r1.subjectivity));
    }

    #[test]
    fn category_strings_roundtrip() {
        for c in SentimentCategory::ALL {
            assert_eq!(SentimentCategory::parse(c.as_str()), Some(c));
        }
        let json = serde_json::to_string(&SentimentCategory::NoTranscript).unwrap();
        assert_eq!(json, "\"no-transcript\"");
    }
}
