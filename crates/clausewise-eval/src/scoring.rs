//! Keyword-match answer scoring.
//!
//! Score arithmetic, in order:
//! 1. keyword score = matched / expected (0.0 when nothing is expected)
//! 2. a negative phrase in the answer multiplies it by `negative_penalty`
//! 3. citations add `citation_bonus`
//! 4. the result is clamped to [0, 1]

use serde::{Deserialize, Serialize};

use crate::config::ScoringConfig;

/// How a score was reached.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ScoreBreakdown {
    /// Expected keywords found in the answer, in expected order
    pub matched_keywords: Vec<String>,

    /// Fraction of expected keywords matched
    pub keyword_score: f64,

    /// Whether a negative phrase was found
    pub negative_signal: bool,

    pub has_citations: bool,

    /// Final score in [0, 1]
    pub score: f64,
}

/// Scores answers against expected keywords.
#[derive(Debug, Clone)]
pub struct Scorer {
    config: ScoringConfig,
    negative_phrases: Vec<String>,
}

impl Scorer {
    pub fn new(config: ScoringConfig) -> Self {
        let negative_phrases = config
            .negative_phrases
            .iter()
            .map(|p| p.to_lowercase())
            .filter(|p| !p.is_empty())
            .collect();
        Self {
            config,
            negative_phrases,
        }
    }

    pub fn config(&self) -> &ScoringConfig {
        &self.config
    }

    /// Score one answer.
    pub fn score(&self, expected_keywords: &[String], answer: &str, has_citations: bool) -> ScoreBreakdown {
        let answer = answer.to_lowercase();

        let matched_keywords: Vec<String> = expected_keywords
            .iter()
            .filter(|k| answer.contains(&k.to_lowercase()))
            .cloned()
            .collect();

        let keyword_score = if expected_keywords.is_empty() {
            0.0
        } else {
            matched_keywords.len() as f64 / expected_keywords.len() as f64
        };

        let negative_signal = self.negative_phrases.iter().any(|p| answer.contains(p.as_str()));

        let mut score = keyword_score;
        if negative_signal {
            score *= self.config.negative_penalty;
        }
        if has_citations {
            score += self.config.citation_bonus;
        }

        ScoreBreakdown {
            matched_keywords,
            keyword_score,
            negative_signal,
            has_citations,
            score: score.clamp(0.0, 1.0),
        }
    }

    /// Whether a score counts as a pass.
    pub fn passes(&self, score: f64) -> bool {
        score >= self.config.pass_threshold
    }
}

impl Default for Scorer {
    fn default() -> Self {
        Self::new(ScoringConfig::default())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use proptest::prelude::*;

    fn keywords(words: &[&str]) -> Vec<String> {
        words.iter().map(|w| w.to_string()).collect()
    }

    fn approx(a: f64, b: f64) -> bool {
        (a - b).abs() < 1e-9
    }

    #[test]
    fn test_partial_match() {
        let scorer = Scorer::default();
        let expected = keywords(&["California", "two years"]);

        let result = scorer.score(&expected, "The governing law is california.", false);
        assert!(approx(result.score, 0.5));
        assert_eq!(result.matched_keywords, vec!["California"]);
    }

    #[test]
    fn test_citation_bonus() {
        let scorer = Scorer::default();
        let expected = keywords(&["California", "two years"]);
        let result = scorer.score(&expected, "California", true);
        assert!(approx(result.score, 0.6));
    }

    #[test]
    fn test_penalty_applies_before_bonus() {
        let scorer = Scorer::default();
        let expected = keywords(&["California", "two years"]);
        let result = scorer.score(&expected, "California; the term was not found", true);
        assert!(result.negative_signal);
        assert!(approx(result.keyword_score, 0.5));
        assert!(approx(result.score, 0.35));
    }

    #[test]
    fn test_empty_expected_scores_zero() {
        let scorer = Scorer::default();
        assert_eq!(scorer.score(&[], "anything", false).score, 0.0);
        assert!(approx(scorer.score(&[], "anything", true).score, 0.1));
    }

    #[test]
    fn test_full_match_with_citation_is_clamped() {
        let scorer = Scorer::default();
        let result = scorer.score(&keywords(&["NDA"]), "This is an NDA.", true);
        assert_eq!(result.score, 1.0);
    }

    #[test]
    fn test_custom_scoring_constants() {
        let scorer = Scorer::new(ScoringConfig {
            negative_phrases: vec!["I don't know".to_string()],
            negative_penalty: 0.0,
            citation_bonus: 0.2,
            pass_threshold: 0.5,
        });
        let result = scorer.score(&keywords(&["Delaware"]), "Delaware? i don't know", false);
        assert_eq!(result.score, 0.0);
        assert!(scorer.passes(0.5));
        assert!(!scorer.passes(0.49));
    }

    proptest! {
        #[test]
        fn score_is_bounded(
            expected in proptest::collection::vec("[a-z ]{0,8}", 0..6),
            answer in "\\PC{0,200}",
            cited in any::<bool>(),
        ) {
            let result = Scorer::default().score(&expected, &answer, cited);
            prop_assert!((0.0..=1.0).contains(&result.score));
            prop_assert!(result.matched_keywords.len() <= expected.len());
        }
    }
}
