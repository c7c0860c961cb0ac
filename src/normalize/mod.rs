//! Text cleanup and classification of extracted fields.

mod completion;
mod kickoff;

pub use completion::{classify_status, infer_completion, Completion, CompletionInput};
pub use kickoff::{format_kickoff, parse_kickoff};

use std::sync::LazyLock;

use regex::Regex;

static DIGITS: LazyLock<Regex> = LazyLock::new(|| Regex::new(r"[0-9]+").expect("valid regex"));

/// Collapse all whitespace runs (newlines and tabs included) to one space and trim.
pub fn collapse_whitespace(s: &str) -> String {
    s.split_whitespace().collect::<Vec<_>>().join(" ")
}

/// First non-empty line of `s`, whitespace collapsed.
pub fn first_line(s: &str) -> String {
    s.lines()
        .map(collapse_whitespace)
        .find(|line| !line.is_empty())
        .unwrap_or_default()
}

/// Parse a score from display text: the first run of digits, or None.
pub fn parse_score(raw: &str) -> Option<u32> {
    DIGITS.find(raw).and_then(|m| m.as_str().parse().ok())
}
