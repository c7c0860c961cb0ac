//! Completion inference for fixtures.
//!
//! A fixture is completed when its status text says so. Failing that, a
//! kickoff in the future means not completed, and otherwise any positive
//! score means it was played.

use chrono::{DateTime, Utc};

use super::collapse_whitespace;

/// Completed-status keywords (whitespace removed, lowercase) and the label
/// each maps to. Checked in order, first hit wins.
const COMPLETED_STATUSES: &[(&str, &str)] = &[
    ("fulltime", "Full Time"),
    ("final", "Final"),
    ("complete", "Complete"),
    ("finished", "Finished"),
];

/// Negated forms removed before keyword matching.
const NEGATED_STATUSES: &[&str] = &["incomplete", "notcomplete", "unfinished", "notfinished"];

/// Label used when a fixture is promoted to completed by its score alone.
const SCORED_STATUS: &str = "Full Time";

#[derive(Debug, Clone, Copy)]
pub struct CompletionInput<'a> {
    pub status: &'a str,
    pub kickoff: Option<DateTime<Utc>>,
    pub home_score: Option<u32>,
    pub away_score: Option<u32>,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Completion {
    pub game_status: String,
    pub is_completed: bool,
    pub home_score: Option<u32>,
    pub away_score: Option<u32>,
}

/// Map status text to its canonical completed label, if it is one.
///
/// Matching ignores case and all whitespace, so "F\nin\tal" reads as "Final".
/// Negated forms such as "Incomplete" never match.
pub fn classify_status(status: &str) -> Option<&'static str> {
    let mut squashed: String = status
        .chars()
        .filter(|c| !c.is_whitespace())
        .flat_map(char::to_lowercase)
        .collect();
    for negated in NEGATED_STATUSES {
        squashed = squashed.replace(negated, "");
    }
    if squashed.is_empty() {
        return None;
    }
    COMPLETED_STATUSES
        .iter()
        .find(|(keyword, _)| squashed.contains(keyword))
        .map(|(_, label)| *label)
}

/// Decide whether a fixture has been played. Pure in its inputs; `now` is
/// supplied by the caller.
pub fn infer_completion(input: CompletionInput<'_>, now: DateTime<Utc>) -> Completion {
    let status = collapse_whitespace(input.status);
    let mut home_score = input.home_score;
    let mut away_score = input.away_score;

    if let Some(label) = classify_status(&status) {
        return Completion {
            game_status: label.to_string(),
            is_completed: true,
            home_score,
            away_score,
        };
    }

    let scored = home_score.is_some_and(|s| s > 0) || away_score.is_some_and(|s| s > 0);
    let is_completed = match input.kickoff {
        Some(kickoff) if kickoff > now => {
            // Unplayed fixtures often render a placeholder 0-0.
            if home_score == Some(0) && away_score == Some(0) {
                home_score = None;
                away_score = None;
            }
            false
        }
        _ => scored,
    };

    let game_status = if is_completed && status.is_empty() {
        SCORED_STATUS.to_string()
    } else {
        status
    };

    Completion {
        game_status,
        is_completed,
        home_score,
        away_score,
    }
}
