//! One pass from staged diff to commit message.

use tracing::{debug, info};

use crate::config::{Configuration, ModelOptions};
use crate::diff;
use crate::error::{GitError, PipelineError};
use crate::git::Vcs;
use crate::parser::{self, CommitMessage};
use crate::prompt;
use crate::provider::{Inference, InferenceRequest};

/// Exit code when the model reply holds no usable commit message.
pub const EXIT_UNUSABLE_REPLY: i32 = 3;
const EXIT_OK: i32 = 0;
const EXIT_FAILURE: i32 = 1;

/// Result of a pipeline run that did not fail.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Outcome {
    /// Nothing is staged; inference was not called.
    NoChanges,
    Message(CommitMessage),
}

/// Per-run switches that are not part of the validated configuration.
#[derive(Debug, Clone, Copy)]
pub struct RunOptions {
    pub use_system_prompt: bool,
}

impl Default for RunOptions {
    fn default() -> Self {
        Self {
            use_system_prompt: true,
        }
    }
}

/// Fetch the staged diff, ask the model for a summary and parse it.
///
/// Does not commit; callers decide whether to pass the message to
/// [`Vcs::commit`].
pub fn generate(
    config: &Configuration,
    options: &ModelOptions,
    run: RunOptions,
    vcs: &dyn Vcs,
    inference: &dyn Inference,
) -> Result<Outcome, PipelineError> {
    let raw_diff = vcs.staged_diff()?;
    if raw_diff.trim().is_empty() {
        info!("no staged changes");
        return Ok(Outcome::NoChanges);
    }

    let diff = diff::truncate(&raw_diff, config.max_diff_size());
    if diff.len() < raw_diff.len() {
        info!(
            original = raw_diff.chars().count(),
            kept = config.max_diff_size(),
            "diff truncated"
        );
    }

    let user_prompt = prompt::build_prompt(
        diff,
        config.message_max_length(),
        config.commit_type_hint(),
    );
    let system_prompt = run.use_system_prompt.then(prompt::build_system_prompt);
    debug!(prompt = %user_prompt, "built prompt");

    let request = InferenceRequest {
        model: config.model_identifier(),
        prompt: &user_prompt,
        system: system_prompt.as_deref(),
        options,
    };
    let reply = inference.generate(&request)?;
    debug!(reply = %reply, "raw model reply");

    let message = parser::parse(&reply, config.message_max_length())?;
    Ok(Outcome::Message(message))
}

/// Process exit code for a finished [`generate`] run.
///
/// An empty index is a clean exit. A reply without a usable summary (parse
/// failure or blank message) is a soft stop with [`EXIT_UNUSABLE_REPLY`].
/// Collaborator failures exit 1.
pub fn exit_code(result: &Result<Outcome, PipelineError>) -> i32 {
    match result {
        Ok(Outcome::NoChanges) => EXIT_OK,
        Ok(Outcome::Message(message)) if message.is_empty() => EXIT_UNUSABLE_REPLY,
        Ok(Outcome::Message(_)) => EXIT_OK,
        Err(PipelineError::Parse(_)) => EXIT_UNUSABLE_REPLY,
        Err(_) => EXIT_FAILURE,
    }
}

/// Commit `message` unless it is empty, returning the exit code.
///
/// An empty message (e.g. cleared in the editor) never reaches `git commit`.
pub fn apply(vcs: &dyn Vcs, message: &CommitMessage) -> Result<i32, GitError> {
    if message.is_empty() {
        info!("empty commit message, skipping commit");
        return Ok(EXIT_UNUSABLE_REPLY);
    }
    vcs.commit(message)?;
    Ok(EXIT_OK)
}
