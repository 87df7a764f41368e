//! Low-value content detection shared by the issue, pull request and
//! discussion handlers.

use std::collections::HashSet;

/// Substrings that mark a title/body as throwaway content.
pub const SPAM_INDICATORS: &[&str] = &[
    "test",
    "xyz",
    "dummy",
    "spam",
    "unnecessary",
    "random",
    "asdf",
    "qwerty",
    "123",
    "abc",
    "hello world",
];

/// Content shorter than this (after trimming) is spam.
const MIN_CONTENT_CHARS: usize = 10;

/// Content with fewer distinct non-space characters than this is spam.
const MIN_DISTINCT_CHARS: usize = 5;

/// Which rule flagged the content.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SpamReason {
    Empty,
    Indicator(&'static str),
    TooShort,
    LowVariety,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SpamVerdict {
    Clean,
    Spam(SpamReason),
}

impl SpamVerdict {
    pub fn is_spam(&self) -> bool {
        matches!(self, SpamVerdict::Spam(_))
    }
}

/// Evaluate a title/body pair. The first matching rule wins.
pub fn evaluate(title: &str, body: &str) -> SpamVerdict {
    if title.is_empty() && body.is_empty() {
        return SpamVerdict::Spam(SpamReason::Empty);
    }

    let content = format!("{title} {body}").to_lowercase();

    if let Some(indicator) = SPAM_INDICATORS.iter().find(|i| content.contains(*i)) {
        return SpamVerdict::Spam(SpamReason::Indicator(indicator));
    }

    if content.trim().chars().count() < MIN_CONTENT_CHARS {
        return SpamVerdict::Spam(SpamReason::TooShort);
    }

    let distinct: HashSet<char> = content.chars().filter(|c| *c != ' ').collect();
    if distinct.len() < MIN_DISTINCT_CHARS {
        return SpamVerdict::Spam(SpamReason::LowVariety);
    }

    SpamVerdict::Clean
}

pub fn is_spam(title: &str, body: &str) -> bool {
    evaluate(title, body).is_spam()
}
