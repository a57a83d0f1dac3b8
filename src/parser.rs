//! Extraction of a commit message from a raw model reply.

use std::fmt;

use tracing::debug;

use crate::error::ParseError;

const OPEN_TAG: &str = "<summary>";
const CLOSE_TAG: &str = "</summary>";

/// A cleaned, word-bounded commit message.
///
/// Only [`parse`] and [`sanitize`] build one, so every value has been through
/// the same cleaning and truncation rules.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CommitMessage(String);

impl CommitMessage {
    pub fn as_str(&self) -> &str {
        &self.0
    }

    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }

    pub fn into_inner(self) -> String {
        self.0
    }
}

impl fmt::Display for CommitMessage {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

impl AsRef<str> for CommitMessage {
    fn as_ref(&self) -> &str {
        &self.0
    }
}

/// Pull the `<summary>` block out of a model reply, clean it and cap it at
/// `message_max_length` words.
pub fn parse(response: &str, message_max_length: usize) -> Result<CommitMessage, ParseError> {
    let (Some(open), Some(close)) = (response.find(OPEN_TAG), response.find(CLOSE_TAG)) else {
        debug!(len = response.len(), "model reply has no summary block");
        return Err(ParseError::Extraction);
    };

    if open >= close {
        debug!(open, close, "closing summary tag precedes its opener");
        return Err(ParseError::MalformedOutput);
    }

    let inner = &response[open + OPEN_TAG.len()..close];
    Ok(sanitize(inner, message_max_length))
}

/// Apply cleaning and the word budget to text that did not come from a
/// delimited reply, such as a message edited by the user.
pub fn sanitize(text: &str, message_max_length: usize) -> CommitMessage {
    CommitMessage(truncate_words(&clean(text), message_max_length))
}

/// Normalize characters that break shell-quoted commits and tidy spacing.
///
/// The double-space collapse is a single non-overlapping pass: four spaces
/// become two, three become two. Running `clean` twice can therefore change
/// the text again.
pub fn clean(message: &str) -> String {
    message
        .replace(['`', '"'], "'")
        .replace("  ", " ")
        .trim()
        .to_string()
}

/// Keep the first `max_words` space-separated tokens.
pub fn truncate_words(sentence: &str, max_words: usize) -> String {
    sentence
        .split(' ')
        .take(max_words)
        .collect::<Vec<_>>()
        .join(" ")
}
