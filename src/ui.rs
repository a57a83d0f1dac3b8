use anyhow::{Context, Result};
use inquire::Select;

use crate::parser::{self, CommitMessage};

/// What to do with a generated message.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Review {
    Commit(CommitMessage),
    Cancel,
}

const COMMIT: &str = "Commit";
const EDIT: &str = "Edit message";
const CANCEL: &str = "Cancel";

/// Ask whether to commit, edit or drop `message`.
///
/// Edited text goes through the same cleaning and word budget as a model
/// reply. Esc/Ctrl-C counts as cancel.
pub fn review(message: CommitMessage, message_max_length: usize) -> Result<Review> {
    let mut message = message;
    loop {
        let choice = Select::new("Use this commit message?", vec![COMMIT, EDIT, CANCEL]).prompt();
        match choice {
            Ok(COMMIT) => return Ok(Review::Commit(message)),
            Ok(EDIT) => {
                let edited = edit::edit(message.as_str()).context("Failed to open editor")?;
                message = parser::sanitize(&strip_comment_lines(&edited), message_max_length);
                eprintln!("\n{}\n", message);
            }
            _ => return Ok(Review::Cancel),
        }
    }
}

/// Drop `#` lines the way `git commit` does for editor buffers.
fn strip_comment_lines(text: &str) -> String {
    text.lines()
        .filter(|line| !line.trim_start().starts_with('#'))
        .collect::<Vec<_>>()
        .join("\n")
}
