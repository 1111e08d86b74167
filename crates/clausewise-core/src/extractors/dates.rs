//! Effective date extraction.
//!
//! A date only counts when it is labelled ("Effective Date", "dated",
//! "entered into as of"). The token is parsed against the supported formats
//! in a fixed priority order and the first successful parse wins.

use chrono::NaiveDate;
use regex::Regex;

use crate::evidence::Evidence;
use crate::patterns::{DATE_THEN_LABEL, LABELED_DATE};
use crate::types::FieldKind;

use super::{Candidate, Cascade, FieldStrategy};

/// Supported literal date formats, in parse priority order.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum DateFormat {
    /// `MM/DD/YYYY`
    NumericSlash,
    /// `YYYY-MM-DD`
    Iso,
    /// `Month DD, YYYY` (full or three-letter month, optional ordinal)
    LongMonth,
}

impl DateFormat {
    pub const PRIORITY: [DateFormat; 3] =
        [DateFormat::NumericSlash, DateFormat::Iso, DateFormat::LongMonth];

    /// Parse a token in this format. Impossible calendar dates are `None`.
    pub fn parse(&self, token: &str) -> Option<NaiveDate> {
        let token = token.trim();
        match self {
            DateFormat::NumericSlash => NaiveDate::parse_from_str(token, "%m/%d/%Y").ok(),
            DateFormat::Iso => NaiveDate::parse_from_str(token, "%Y-%m-%d").ok(),
            DateFormat::LongMonth => parse_long_month(token),
        }
    }
}

/// Parse a date token, trying each format in priority order.
pub fn parse_date(token: &str) -> Option<NaiveDate> {
    DateFormat::PRIORITY.iter().find_map(|format| format.parse(token))
}

fn parse_long_month(token: &str) -> Option<NaiveDate> {
    let parts: Vec<&str> = token
        .split(|c: char| c.is_whitespace() || c == ',')
        .filter(|p| !p.is_empty())
        .collect();
    let [month, day, year] = parts.as_slice() else {
        return None;
    };

    let month = month_number(month.trim_end_matches('.'))?;
    let day: u32 = day
        .trim_end_matches(|c: char| c.is_ascii_alphabetic())
        .parse()
        .ok()?;
    let year: i32 = year.parse().ok()?;

    NaiveDate::from_ymd_opt(year, month, day)
}

fn month_number(name: &str) -> Option<u32> {
    const MONTHS: [&str; 12] = [
        "jan", "feb", "mar", "apr", "may", "jun", "jul", "aug", "sep", "oct", "nov", "dec",
    ];
    let lower = name.to_lowercase();
    let prefix = lower.get(..3)?;
    MONTHS
        .iter()
        .position(|m| *m == prefix)
        .map(|idx| idx as u32 + 1)
}

/// Scan every match of `pattern` and return the first whose date parses.
fn first_parsable(
    pattern: &Regex,
    strategy: &'static str,
    text: &str,
) -> Vec<Candidate<NaiveDate>> {
    pattern
        .captures_iter(text)
        .find_map(|caps| {
            let whole = caps.get(0)?;
            let token = caps.get(1)?;
            let date = parse_date(token.as_str())?;
            Some(Candidate::new(
                date,
                Evidence::from_text(
                    FieldKind::EffectiveDate,
                    strategy,
                    text,
                    whole.start(),
                    whole.end(),
                ),
            ))
        })
        .into_iter()
        .collect()
}

/// `Effective Date: 01/15/2024`, `dated 2024-01-15`, `entered into as of January 15, 2024`
pub struct LabelBeforeStrategy;

impl FieldStrategy<NaiveDate> for LabelBeforeStrategy {
    fn name(&self) -> &'static str {
        "label_before"
    }

    fn attempt(&self, text: &str) -> Vec<Candidate<NaiveDate>> {
        first_parsable(&LABELED_DATE, self.name(), text)
    }
}

/// `January 15, 2024 (the "Effective Date")`
pub struct LabelAfterStrategy;

impl FieldStrategy<NaiveDate> for LabelAfterStrategy {
    fn name(&self) -> &'static str {
        "label_after"
    }

    fn attempt(&self, text: &str) -> Vec<Candidate<NaiveDate>> {
        first_parsable(&DATE_THEN_LABEL, self.name(), text)
    }
}

/// The default effective-date cascade.
pub fn cascade() -> Cascade<NaiveDate> {
    Cascade::new(FieldKind::EffectiveDate)
        .with(LabelBeforeStrategy)
        .with(LabelAfterStrategy)
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::Datelike;

    fn jan_15() -> NaiveDate {
        NaiveDate::from_ymd_opt(2024, 1, 15).unwrap()
    }

    #[test]
    fn test_three_formats_agree() {
        for token in ["01/15/2024", "2024-01-15", "January 15, 2024"] {
            assert_eq!(parse_date(token), Some(jan_15()), "token {token}");
        }
    }

    #[test]
    fn test_long_month_variants() {
        assert_eq!(parse_date("Jan. 15, 2024"), Some(jan_15()));
        assert_eq!(parse_date("january 15th 2024"), Some(jan_15()));
        assert_eq!(parse_date("Sept 1, 2023").map(|d| d.month()), Some(9));
    }

    #[test]
    fn test_impossible_dates_rejected() {
        assert_eq!(parse_date("02/30/2024"), None);
        assert_eq!(parse_date("2024-13-01"), None);
        assert_eq!(parse_date("Smarch 1, 2024"), None);
    }

    #[test]
    fn test_labeled_dates_in_text() {
        let cascade = cascade();
        for format in ["01/15/2024", "2024-01-15", "January 15, 2024"] {
            let text = format!("Agreement dated {format}\nBetween Party A and Party B");
            let found = cascade.first(&text).map(|c| c.value);
            assert_eq!(found.map(|d| d.year()), Some(2024), "format {format}");
        }

        let expected = NaiveDate::from_ymd_opt(2024, 1, 15);
        for text in [
            "This Agreement is dated as of January 15, 2024.",
            "Agreement dated as of 01/15/2024",
            "The Effective Date of this Agreement is January 15, 2024.",
        ] {
            assert_eq!(cascade.first(text).map(|c| c.value), expected, "text {text}");
        }
    }

    #[test]
    fn test_label_after() {
        let text = r#"made on 3 things. This NDA begins 2023-06-01 (the "Effective Date")."#;
        let found = cascade().first(text).unwrap();
        assert_eq!(found.value, NaiveDate::from_ymd_opt(2023, 6, 1).unwrap());
        assert_eq!(found.evidence.strategy, "label_after");
    }

    #[test]
    fn test_invalid_labeled_date_falls_through() {
        let text = "dated 02/30/2024 and later dated 03/01/2024";
        let found = cascade().first(text).unwrap();
        assert_eq!(found.value, NaiveDate::from_ymd_opt(2024, 3, 1).unwrap());
    }

    #[test]
    fn test_unlabeled_date_is_none() {
        assert!(cascade().first("Invoice 01/15/2024 attached").is_none());
        assert!(cascade().first("").is_none());
    }
}
