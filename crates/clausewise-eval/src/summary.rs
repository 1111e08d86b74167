//! Per-question results, run aggregation and the results artifact.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use std::fmt;
use std::fs;
use std::io;
use std::path::Path;

use crate::questions::EvalQuestion;
use crate::scoring::ScoreBreakdown;

/// The outcome of one question.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct EvalResult {
    pub question_id: String,
    pub question: String,

    #[serde(default)]
    pub answer: String,

    /// Final score in [0, 1]
    pub score: f64,

    #[serde(default)]
    pub matched_keywords: Vec<String>,

    #[serde(default)]
    pub has_citations: bool,

    /// Why the question scored zero without being answered
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub reason: Option<String>,
}

impl EvalResult {
    /// A scored answer.
    pub fn scored(question: &EvalQuestion, answer: impl Into<String>, breakdown: ScoreBreakdown) -> Self {
        Self {
            question_id: question.id.clone(),
            question: question.question.clone(),
            answer: answer.into(),
            score: breakdown.score,
            matched_keywords: breakdown.matched_keywords,
            has_citations: breakdown.has_citations,
            reason: None,
        }
    }

    /// A question whose request failed; scores 0.0.
    pub fn failed(question: &EvalQuestion, reason: impl Into<String>) -> Self {
        Self {
            question_id: question.id.clone(),
            question: question.question.clone(),
            answer: String::new(),
            score: 0.0,
            matched_keywords: Vec::new(),
            has_citations: false,
            reason: Some(reason.into()),
        }
    }
}

/// Quality band for the average score.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum Grade {
    Excellent,
    Good,
    Fair,
    #[serde(rename = "NEEDS IMPROVEMENT")]
    NeedsImprovement,
}

impl Grade {
    /// `>= 0.8` excellent, `>= 0.7` good, `>= 0.5` fair.
    pub fn from_average(average: f64) -> Self {
        if average >= 0.8 {
            Grade::Excellent
        } else if average >= 0.7 {
            Grade::Good
        } else if average >= 0.5 {
            Grade::Fair
        } else {
            Grade::NeedsImprovement
        }
    }

    pub fn as_str(&self) -> &'static str {
        match self {
            Grade::Excellent => "EXCELLENT",
            Grade::Good => "GOOD",
            Grade::Fair => "FAIR",
            Grade::NeedsImprovement => "NEEDS IMPROVEMENT",
        }
    }
}

impl fmt::Display for Grade {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Aggregate of one evaluation run. Written once, never mutated.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct EvalSummary {
    pub average_score: f64,
    pub total_questions: usize,

    /// Fraction of questions at or above the pass threshold
    pub pass_rate: f64,

    pub passed: usize,
    pub grade: Grade,
    pub evaluated_at: DateTime<Utc>,

    /// Results in question-set order
    pub results: Vec<EvalResult>,
}

impl EvalSummary {
    /// Aggregate results. An empty run has zero average and pass rate.
    pub fn from_results(results: Vec<EvalResult>, pass_threshold: f64) -> Self {
        let total = results.len();
        let passed = results.iter().filter(|r| r.score >= pass_threshold).count();
        let (average_score, pass_rate) = if total == 0 {
            (0.0, 0.0)
        } else {
            let sum: f64 = results.iter().map(|r| r.score).sum();
            (sum / total as f64, passed as f64 / total as f64)
        };

        Self {
            average_score,
            total_questions: total,
            pass_rate,
            passed,
            grade: Grade::from_average(average_score),
            evaluated_at: Utc::now(),
            results,
        }
    }

    /// `Q&A Accuracy: 72.5% (3/4 passed) - GOOD`
    pub fn one_line(&self) -> String {
        format!(
            "Q&A Accuracy: {:.1}% ({}/{} passed) - {}",
            self.average_score * 100.0,
            self.passed,
            self.total_questions,
            self.grade
        )
    }

    /// Write the summary as pretty JSON, creating parent directories.
    pub fn write_json(&self, path: impl AsRef<Path>) -> io::Result<()> {
        let path = path.as_ref();
        if let Some(parent) = path.parent().filter(|p| !p.as_os_str().is_empty()) {
            fs::create_dir_all(parent)?;
        }
        let json = serde_json::to_string_pretty(self).map_err(io::Error::other)?;
        fs::write(path, json)?;
        tracing::info!(path = %path.display(), "Evaluation results written");
        Ok(())
    }

    /// Read a previously written summary.
    pub fn read_json(path: impl AsRef<Path>) -> io::Result<Self> {
        let content = fs::read_to_string(path)?;
        serde_json::from_str(&content).map_err(io::Error::other)
    }
}
