//! Preview turns taken from a generated transcript.
//!
//! Transcripts alternate user and system lines:
//!
//! ```text
//! 0 [USER] [find_restaurant] I need a cheap place to eat.
//! 1 [SYSTEM] [request] What area would you like?
//! ```
//!
//! User lines always carry an intent tag; the system annotation is optional.

use lazy_static::lazy_static;
use regex::Regex;
use serde::Serialize;
use std::iter::Take;
use std::str::Split;

pub const DEFAULT_PREVIEW_TURNS: usize = 3;

lazy_static! {
    static ref USER_LINE: Regex = Regex::new(r"^\d+ \[USER\] \[[^\]]+\] (.*)").unwrap();
    static ref SYSTEM_LINE: Regex = Regex::new(r"^\d+ \[SYSTEM\]( \[[^\]]+\])? (.*)").unwrap();
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub struct PreviewTurn<'a> {
    /// 1-based position in the transcript.
    pub number: usize,
    pub user: &'a str,
    pub assistant: &'a str,
}

impl PreviewTurn<'_> {
    pub fn label(&self) -> String {
        format!("Turn {}", self.number)
    }
}

/// Iterator over at most `max_turns` user/system pairs.
#[derive(Debug, Clone)]
pub struct PreviewTurns<'a> {
    lines: Take<Split<'a, char>>,
    taken: usize,
}

impl<'a> Iterator for PreviewTurns<'a> {
    type Item = PreviewTurn<'a>;

    fn next(&mut self) -> Option<Self::Item> {
        let user_line = self.lines.next()?;
        let system_line = self.lines.next()?;
        self.taken += 1;

        Some(PreviewTurn {
            number: self.taken,
            user: user_utterance(user_line),
            assistant: system_utterance(system_line),
        })
    }
}

/// Pairs from the first `2 * max_turns` lines; a trailing unpaired line is
/// dropped, so anything shorter than two lines yields nothing.
pub fn preview_turns(transcript: &str, max_turns: usize) -> PreviewTurns<'_> {
    PreviewTurns {
        lines: transcript.trim().split('\n').take(max_turns.saturating_mul(2)),
        taken: 0,
    }
}

/// Text of a user line without index, speaker and intent tags. Lines that do
/// not follow the grammar are returned as-is.
pub fn user_utterance(line: &str) -> &str {
    USER_LINE
        .captures(line)
        .and_then(|caps| caps.get(1))
        .map_or(line, |m| m.as_str())
}

pub fn system_utterance(line: &str) -> &str {
    SYSTEM_LINE
        .captures(line)
        .and_then(|caps| caps.get(2))
        .map_or(line, |m| m.as_str())
}

#[cfg(test)]
mod tests {
    use super::*;

    const TRANSCRIPT: &str = "\
0 [USER] [find_hotel] I need a hotel in the north.
1 [SYSTEM] [request_price] What price range?
2 [USER] [inform_price] Something cheap.
3 [SYSTEM] There are two options.
4 [USER] [book] Book the first one.
5 [SYSTEM] [confirm] Done, reference ABC.
6 [USER] [thank] Thanks!
7 [SYSTEM] You're welcome.";

    #[test]
    fn strips_tags_and_indices() {
        let turns: Vec<_> = preview_turns(TRANSCRIPT, 3).collect();
        assert_eq!(turns.len(), 3);
        assert_eq!(
            turns[0],
            PreviewTurn {
                number: 1,
                user: "I need a hotel in the north.",
                assistant: "What price range?",
            }
        );
        assert_eq!(turns[1].assistant, "There are two options.");
        assert_eq!(turns[2].label(), "Turn 3");
    }

    #[test]
    fn bounded_by_max_turns() {
        assert_eq!(preview_turns(TRANSCRIPT, 1).count(), 1);
        assert_eq!(preview_turns(TRANSCRIPT, 10).count(), 4);
        assert_eq!(preview_turns(TRANSCRIPT, 0).count(), 0);
    }

    #[test]
    fn short_transcripts_yield_nothing() {
        assert_eq!(preview_turns("", 3).count(), 0);
        assert_eq!(preview_turns("   \n  ", 3).count(), 0);
        assert_eq!(preview_turns("0 [USER] [greet] hello", 3).count(), 0);
    }

    #[test]
    fn trailing_unpaired_line_is_dropped() {
        let text = "0 [USER] [a] one\n1 [SYSTEM] two\n2 [USER] [b] three";
        let turns: Vec<_> = preview_turns(text, 3).collect();
        assert_eq!(turns.len(), 1);
    }

    #[test]
    fn malformed_lines_pass_through() {
        let text = "hello there\n[SYSTEM] missing index";
        let turns: Vec<_> = preview_turns(text, 3).collect();
        assert_eq!(turns[0].user, "hello there");
        assert_eq!(turns[0].assistant, "[SYSTEM] missing index");

        // A user line without an intent tag does not match the user grammar.
        assert_eq!(user_utterance("0 [USER] hi"), "0 [USER] hi");
    }

    #[test]
    fn iterator_is_exhausted_after_use() {
        let mut turns = preview_turns(TRANSCRIPT, 1);
        assert!(turns.next().is_some());
        assert!(turns.next().is_none());
        assert!(turns.next().is_none());
    }
}
