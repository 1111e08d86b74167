//! Field extractors.
//!
//! Each field is extracted by an ordered [`Cascade`] of independent
//! [`FieldStrategy`] implementations. Strategies never share state and never
//! see each other's results, so one field's absence cannot block another and
//! new patterns can be added without touching existing ones.
//!
//! | Field | Strategies (in priority order) | Combination |
//! |-------|--------------------------------|-------------|
//! | parties | role marker, between/and, label line, party letter | collect, dedupe |
//! | effective date | label-before, label-after | first |
//! | governing law | governed-by, shall-govern, heading | first |
//! | liability cap | liability clause, any amount | first |
//! | signatures | comma line, labelled block | collect, dedupe |

use std::panic::{catch_unwind, AssertUnwindSafe};

use crate::evidence::Evidence;
use crate::types::FieldKind;

pub mod dates;
pub mod governing_law;
pub mod liability;
pub mod parties;
pub mod signatures;

pub use dates::{parse_date, DateFormat};

/// A value found by a strategy, with the span it came from.
#[derive(Debug, Clone, PartialEq)]
pub struct Candidate<T> {
    pub value: T,
    pub evidence: Evidence,
}

impl<T> Candidate<T> {
    pub fn new(value: T, evidence: Evidence) -> Self {
        Self { value, evidence }
    }

    /// Byte offset of the match in the scanned text.
    pub fn position(&self) -> usize {
        self.evidence.start
    }
}

/// A single way of finding a field in contract text.
///
/// Implementations must be pure functions of `text`. Returning an empty
/// vector means "not found".
pub trait FieldStrategy<T>: Send + Sync {
    /// Stable identifier recorded in evidence.
    fn name(&self) -> &'static str;

    /// Attempt extraction, returning candidates in text order.
    fn attempt(&self, text: &str) -> Vec<Candidate<T>>;
}

/// Ordered set of strategies for one field.
pub struct Cascade<T> {
    field: FieldKind,
    strategies: Vec<Box<dyn FieldStrategy<T>>>,
}

impl<T> Cascade<T> {
    /// Create an empty cascade for a field.
    pub fn new(field: FieldKind) -> Self {
        Self {
            field,
            strategies: Vec::new(),
        }
    }

    /// Append a strategy (builder form).
    pub fn with(mut self, strategy: impl FieldStrategy<T> + 'static) -> Self {
        self.strategies.push(Box::new(strategy));
        self
    }

    /// Append a boxed strategy at the lowest priority.
    pub fn push(&mut self, strategy: Box<dyn FieldStrategy<T>>) {
        self.strategies.push(strategy);
    }

    pub fn field(&self) -> FieldKind {
        self.field
    }

    /// Strategy names in priority order.
    pub fn strategy_names(&self) -> Vec<&'static str> {
        self.strategies.iter().map(|s| s.name()).collect()
    }

    /// First candidate of the highest-priority strategy that finds anything.
    pub fn first(&self, text: &str) -> Option<Candidate<T>> {
        self.strategies
            .iter()
            .find_map(|strategy| self.run(strategy.as_ref(), text).into_iter().next())
    }

    /// Candidates from every strategy, ordered by position in the text.
    ///
    /// Ties keep strategy priority order.
    pub fn collect(&self, text: &str) -> Vec<Candidate<T>> {
        let mut all: Vec<Candidate<T>> = self
            .strategies
            .iter()
            .flat_map(|strategy| self.run(strategy.as_ref(), text))
            .collect();
        all.sort_by_key(|c| c.position());
        all
    }

    /// Run one strategy; a failure inside it means "not found".
    fn run(&self, strategy: &dyn FieldStrategy<T>, text: &str) -> Vec<Candidate<T>> {
        match catch_unwind(AssertUnwindSafe(|| strategy.attempt(text))) {
            Ok(candidates) => {
                if !candidates.is_empty() {
                    tracing::debug!(
                        field = %self.field,
                        strategy = strategy.name(),
                        count = candidates.len(),
                        "Strategy matched"
                    );
                }
                candidates
            }
            Err(_) => {
                tracing::warn!(
                    field = %self.field,
                    strategy = strategy.name(),
                    "Strategy failed, treating field as not found"
                );
                Vec::new()
            }
        }
    }
}
