//! Console progress output for evaluation runs.

use clausewise_eval::{EvalQuestion, EvalResult, EvalSummary, RunObserver, RunPhase};

/// Score at or above which a question is shown as a partial answer.
const WARN_THRESHOLD: f64 = 0.4;

/// Prints a running per-question status to stdout.
pub struct ConsoleObserver {
    pass_threshold: f64,
}

impl ConsoleObserver {
    pub fn new(pass_threshold: f64) -> Self {
        Self { pass_threshold }
    }
}

impl RunObserver for ConsoleObserver {
    fn on_phase(&self, phase: RunPhase) {
        match phase {
            RunPhase::HealthChecked => println!("API is healthy"),
            RunPhase::DocumentsUploaded { documents } => println!("Uploaded {documents} documents"),
            _ => {}
        }
    }

    fn on_fixture_skipped(&self, path: &str, reason: &str) {
        eprintln!("warning: fixture {path} skipped ({reason})");
    }

    fn on_question_start(&self, index: usize, total: usize, question: &EvalQuestion) {
        println!("[{}/{}] Q{}: {}", index + 1, total, question.id, question.question);
    }

    fn on_question_scored(&self, result: &EvalResult) {
        println!("  {}", status_line(result, self.pass_threshold));
    }

    fn on_summary(&self, summary: &EvalSummary) {
        println!();
        println!("Total questions: {}", summary.total_questions);
        println!("Average score:   {:.2}", summary.average_score);
        println!(
            "Pass rate:       {}/{} ({:.0}%)",
            summary.passed,
            summary.total_questions,
            summary.pass_rate * 100.0
        );
        println!("Grade:           {}", summary.grade);
    }
}

/// `PASS Q1 score=1.00 matched=[California] citations=yes`
pub fn status_line(result: &EvalResult, pass_threshold: f64) -> String {
    let mark = if result.score >= pass_threshold {
        "PASS"
    } else if result.score >= WARN_THRESHOLD {
        "WARN"
    } else {
        "FAIL"
    };

    let mut line = format!(
        "{mark} Q{} score={:.2} matched=[{}] citations={}",
        result.question_id,
        result.score,
        result.matched_keywords.join(", "),
        if result.has_citations { "yes" } else { "no" }
    );
    if let Some(reason) = &result.reason {
        line.push_str(&format!(" reason=\"{reason}\""));
    }
    line
}
