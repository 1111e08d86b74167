//! Shared detection patterns for field extractors and audit rules.
//!
//! Name, date and amount fragments are reused by several strategies, so they
//! live here as the single source of truth. Every pattern is a compile-time
//! constant.

use lazy_static::lazy_static;
use regex::Regex;

/// A capitalized multi-word name on one line ("Acme Corporation", "Party A",
/// "Société Générale"). A period is only allowed at the end so names never
/// run across a sentence break.
const NAME: &str = r"\p{Lu}[\p{L}\p{N}&'\-]*(?:[ \t]+(?:\p{Lu}[\p{L}\p{N}&'\-]*|of|&))*\.?";

/// Appositive after a name: `, a Delaware corporation`
const DESCRIPTOR: &str = r"\s*,\s*(?:a|an)\s+[^()]{0,80}?";

/// Roles that introduce a party in a parenthetical definition.
const ROLE: &str = r"(?i:disclosing\s+party|receiving\s+party|party\s+[ab]|company|client|customer|vendor|supplier|contractor|consultant|licensor|licensee|employer|employee|buyer|seller|landlord|tenant|lessor|lessee|provider|recipient|discloser)";

/// The three supported date literals: `MM/DD/YYYY`, `YYYY-MM-DD`, `Month DD, YYYY`.
const DATE_TOKEN: &str = r"(\d{1,2}/\d{1,2}/\d{4}|\d{4}-\d{1,2}-\d{1,2}|\b(?i:jan(?:uary)?|feb(?:ruary)?|mar(?:ch)?|apr(?:il)?|may|june?|july?|aug(?:ust)?|sep(?:t(?:ember)?)?|oct(?:ober)?|nov(?:ember)?|dec(?:ember)?)\.?[ \t]+\d{1,2}(?:st|nd|rd|th)?,?[ \t]+\d{4})";

lazy_static! {
    // =========================================================================
    // PARTY PATTERNS
    // =========================================================================

    /// `Acme Corporation ("Disclosing Party")`
    pub static ref PARTY_WITH_ROLE: Regex = Regex::new(&format!(
        r#"\b({NAME})(?:{DESCRIPTOR})?\s*,?\s*\(\s*(?i:the\s+|hereinafter\s+(?:referred\s+to\s+as\s+)?)?["“'‘]?(?i:the\s+)?{ROLE}["”'’]?\s*\)"#
    )).unwrap();

    /// `between Acme Corporation and Tech Solutions Inc`
    pub static ref PARTIES_BETWEEN: Regex = Regex::new(&format!(
        r"(?i:\bbetween)\s+({NAME})(?:{DESCRIPTOR})?(?:\s*,?\s*\([^)]*\))?\s*,?\s*(?i:and)\s+({NAME})"
    )).unwrap();

    /// `Party A`, `Party B`
    pub static ref PARTY_LETTER: Regex = Regex::new(r"\bParty\s+[A-Z]\b").unwrap();

    /// `Receiving Party: Tech Solutions Inc` on its own line
    pub static ref PARTY_LABEL_LINE: Regex = Regex::new(&format!(
        r"(?m)^[ \t]*{ROLE}[ \t]*:[ \t]*({NAME})"
    )).unwrap();

    // =========================================================================
    // DATE PATTERNS
    // =========================================================================

    /// A date literal in any supported format.
    pub static ref DATE_LITERAL: Regex = Regex::new(DATE_TOKEN).unwrap();

    /// Label followed by a date: `entered into as of January 15, 2024`
    pub static ref LABELED_DATE: Regex = Regex::new(&format!(
        r"(?i:\b(?:effective\s+date(?:\s+of\s+this\s+agreement)?|dated(?:\s+as\s+of)?|entered\s+into\s+(?:as\s+of|on)|effective\s+(?:as\s+of|on)|made\s+(?:as\s+of|on))\b(?:\s+is)?\s*[:,]?\s*(?:the\s+)?){DATE_TOKEN}"
    )).unwrap();

    /// Date followed by a defining label: `01/15/2024 (the "Effective Date")`
    pub static ref DATE_THEN_LABEL: Regex = Regex::new(&format!(
        r#"{DATE_TOKEN}\s*\(\s*(?i:the\s+)?["“]?(?i:effective\s+date)["”]?\s*\)"#
    )).unwrap();

    // =========================================================================
    // GOVERNING LAW PATTERNS
    // =========================================================================

    /// `governed by the laws of the State of California.`
    pub static ref GOVERNED_BY: Regex = Regex::new(
        r"(?i)\bgoverned\s+by(?:,?\s+and\s+(?:construed|interpreted)\s+(?:in\s+accordance\s+with|under),?)?\s+the\s+laws?\s+of\s+([^;]+?)(?:\.(?:\s|$)|;|$)"
    ).unwrap();

    /// `The laws of Delaware shall govern this Agreement.`
    pub static ref LAWS_SHALL_GOVERN: Regex = Regex::new(
        r"(?i)\blaws?\s+of\s+([^;.]+?)\s+(?:shall|will)\s+govern"
    ).unwrap();

    /// Where a jurisdiction phrase ends when no sentence punctuation closes it:
    /// a blank line, or a line starting a numbered section or a `Label:`.
    pub static ref SECTION_BREAK: Regex = Regex::new(
        r"\n[ \t]*(?:\n|\d+[.)]|\p{L}[\p{L} \t]{0,30}:)"
    ).unwrap();

    /// `Governing Law: England and Wales` heading with the jurisdiction inline
    pub static ref GOVERNING_LAW_HEADING: Regex = Regex::new(
        r"(?m)^[ \t]*(?:\d+\.[ \t]*)?(?i:governing[ \t]+law)[ \t]*[:\-–][ \t]*([A-Z][^;.\n]*)"
    ).unwrap();

    // =========================================================================
    // AMOUNT PATTERNS
    // =========================================================================

    /// Currency-formatted amount, symbol/code before or code after.
    pub static ref CURRENCY_AMOUNT: Regex = Regex::new(
        r"(?x)
        (?:
            (?:(?P<code_pre>USD|EUR|GBP|CAD|AUD)\s?|(?P<sym>[$€£])\s?)
            (?P<num>\d{1,3}(?:,\d{3})+|\d+)(?:\.(?P<frac>\d{1,2}))?
            (?:\s*(?P<mult>(?i:thousand|million|billion))\b)?
            (?:\s*(?P<code_post>USD|EUR|GBP|CAD|AUD)\b)?
        |
            (?P<num2>\d{1,3}(?:,\d{3})+|\d+)(?:\.(?P<frac2>\d{1,2}))?
            (?:\s*(?P<mult2>(?i:thousand|million|billion)))?
            \s*(?P<code2>USD|EUR|GBP|CAD|AUD|(?i:(?:U\.S\.\s)?dollars))\b
        )"
    ).unwrap();

    /// Words that mark a sentence as a liability limitation.
    pub static ref LIABILITY_CUE: Regex = Regex::new(
        r"(?i)\b(?:liabilit(?:y|ies)|liable|shall\s+not\s+exceed|limitation\s+of\s+damages|aggregate\s+cap)\b"
    ).unwrap();

    /// Sentence or paragraph break.
    pub static ref SENTENCE_BREAK: Regex = Regex::new(r"[.;](?:\s+|$)|\n[ \t]*\n").unwrap();

    // =========================================================================
    // SIGNATURE PATTERNS
    // =========================================================================

    /// `John Smith, CEO, Acme Corporation`
    pub static ref SIGNATURE_LINE: Regex = Regex::new(
        r"(?m)^[ \t]*(?:By:[ \t]*)?(?P<name>[A-Z][A-Za-z.'\-]+(?:[ \t]+[A-Z][A-Za-z.'\-]*){1,3})[ \t]*,[ \t]*(?P<title>[A-Z][A-Za-z.&/\- ]{0,59}?)[ \t]*,[ \t]*(?P<company>[A-Z][A-Za-z0-9.,&'\- ]{0,79}?)[ \t]*\r?$"
    ).unwrap();

    /// `Name: John Smith`
    pub static ref LABEL_NAME: Regex = Regex::new(r"^[ \t]*(?i:name|signed\s+by|signatory)[ \t]*:[ \t]*(.+?)[ \t]*$").unwrap();

    /// `Title: Chief Executive Officer`
    pub static ref LABEL_TITLE: Regex = Regex::new(r"^[ \t]*(?i:title|position)[ \t]*:[ \t]*(.+?)[ \t]*$").unwrap();

    /// `Company: Acme Corporation`
    pub static ref LABEL_COMPANY: Regex = Regex::new(r"^[ \t]*(?i:company|for|on\s+behalf\s+of|organi[sz]ation|entity)[ \t]*:[ \t]*(.+?)[ \t]*$").unwrap();

    // =========================================================================
    // AUDIT PATTERNS
    // =========================================================================

    /// Uncapped exposure language.
    pub static ref UNLIMITED_LIABILITY: Regex = Regex::new(
        r"(?i)\b(?:unlimited\s+liability|liability\s+(?:shall|will)\s+(?:be\s+)?(?:unlimited|not\s+be\s+limited)|without\s+(?:any\s+)?limitation\s+of\s+liability)\b"
    ).unwrap();

    /// Evergreen / auto-renewal terms.
    pub static ref AUTO_RENEWAL: Regex = Regex::new(
        r"(?i)\b(?:automatically\s+renew(?:s|ed)?|auto-?renew(?:al|s)?|successive\s+(?:one|two|\d+)[-\s]?(?:year|month)\s+(?:terms|periods))\b"
    ).unwrap();

    /// Broad indemnity scope.
    pub static ref BROAD_INDEMNITY: Regex = Regex::new(
        r"(?i)\bindemnif(?:y|ies|ication)\b[^.;]{0,200}?\bany\s+and\s+all\b"
    ).unwrap();
}

/// Collapse runs of whitespace into single spaces and trim.
pub fn collapse_whitespace(s: &str) -> String {
    s.split_whitespace().collect::<Vec<_>>().join(" ")
}

/// Check if content contains language that removes the liability cap.
pub fn contains_unlimited_liability(content: &str) -> bool {
    UNLIMITED_LIABILITY.is_match(content)
}

/// Check if content contains an automatic renewal term.
pub fn contains_auto_renewal(content: &str) -> bool {
    AUTO_RENEWAL.is_match(content)
}
