//! Liability cap extraction.
//!
//! Prefers an amount inside a sentence that talks about liability; falls
//! back to the first currency-formatted amount in the document.

use regex::Captures;

use crate::evidence::Evidence;
use crate::patterns::{CURRENCY_AMOUNT, LIABILITY_CUE, SENTENCE_BREAK};
use crate::types::{FieldKind, LiabilityCap};

use super::{Candidate, Cascade, FieldStrategy};

/// An amount inside a liability/limitation sentence.
pub struct LiabilityClauseStrategy;

impl FieldStrategy<LiabilityCap> for LiabilityClauseStrategy {
    fn name(&self) -> &'static str {
        "liability_clause"
    }

    fn attempt(&self, text: &str) -> Vec<Candidate<LiabilityCap>> {
        sentence_spans(text)
            .into_iter()
            .filter(|(start, end)| LIABILITY_CUE.is_match(&text[*start..*end]))
            .find_map(|(start, end)| first_amount(text, start, end, self.name()))
            .into_iter()
            .collect()
    }
}

/// Any currency-formatted amount, regardless of the surrounding prose.
pub struct AnyAmountStrategy;

impl FieldStrategy<LiabilityCap> for AnyAmountStrategy {
    fn name(&self) -> &'static str {
        "any_amount"
    }

    fn attempt(&self, text: &str) -> Vec<Candidate<LiabilityCap>> {
        first_amount(text, 0, text.len(), self.name())
            .into_iter()
            .collect()
    }
}

/// The default liability-cap cascade.
pub fn cascade() -> Cascade<LiabilityCap> {
    Cascade::new(FieldKind::LiabilityCap)
        .with(LiabilityClauseStrategy)
        .with(AnyAmountStrategy)
}

/// Byte spans of sentences and paragraphs.
fn sentence_spans(text: &str) -> Vec<(usize, usize)> {
    let mut spans = Vec::new();
    let mut start = 0;
    for brk in SENTENCE_BREAK.find_iter(text) {
        if brk.start() > start {
            spans.push((start, brk.start()));
        }
        start = brk.end();
    }
    if start < text.len() {
        spans.push((start, text.len()));
    }
    spans
}

fn first_amount(
    text: &str,
    start: usize,
    end: usize,
    strategy: &'static str,
) -> Option<Candidate<LiabilityCap>> {
    let window = text.get(start..end)?;
    CURRENCY_AMOUNT.captures_iter(window).find_map(|caps| {
        let whole = caps.get(0)?;
        let cap = parse_amount(&caps)?;
        Some(Candidate::new(
            cap,
            Evidence::from_text(
                FieldKind::LiabilityCap,
                strategy,
                text,
                start + whole.start(),
                start + whole.end(),
            ),
        ))
    })
}

/// Turn a `CURRENCY_AMOUNT` match into a cap.
fn parse_amount(caps: &Captures<'_>) -> Option<LiabilityCap> {
    let (num, frac, mult, currency) = if let Some(num) = caps.name("num") {
        let currency = caps
            .name("code_pre")
            .or_else(|| caps.name("code_post"))
            .map(|m| m.as_str().to_uppercase())
            .or_else(|| caps.name("sym").map(|m| symbol_code(m.as_str()).to_string()))?;
        (num, caps.name("frac"), caps.name("mult"), currency)
    } else {
        let num = caps.name("num2")?;
        let code = caps.name("code2")?.as_str();
        let currency = if code.to_lowercase().ends_with("dollars") {
            "USD".to_string()
        } else {
            code.to_uppercase()
        };
        (num, caps.name("frac2"), caps.name("mult2"), currency)
    };

    let mut amount: f64 = num.as_str().replace(',', "").parse().ok()?;
    if let Some(frac) = frac {
        let cents: f64 = format!("0.{}", frac.as_str()).parse().ok()?;
        amount += cents;
    }
    if let Some(mult) = mult {
        amount *= magnitude(mult.as_str());
    }

    if !amount.is_finite() {
        return None;
    }
    Some(LiabilityCap { amount, currency })
}

fn symbol_code(symbol: &str) -> &'static str {
    match symbol {
        "€" => "EUR",
        "£" => "GBP",
        _ => "USD",
    }
}

fn magnitude(word: &str) -> f64 {
    match word.to_lowercase().as_str() {
        "thousand" => 1e3,
        "million" => 1e6,
        "billion" => 1e9,
        _ => 1.0,
    }
}
