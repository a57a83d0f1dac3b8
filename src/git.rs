use anyhow::{bail, Context, Result};
use std::process::{Command, Stdio};
use tracing::debug;

use crate::error::GitError;
use crate::parser::CommitMessage;

/// Version-control capability used by the pipeline.
pub trait Vcs {
    /// Text of the currently staged changes.
    fn staged_diff(&self) -> Result<String, GitError>;

    /// Record the staged changes under `message`.
    fn commit(&self, message: &CommitMessage) -> Result<(), GitError>;
}

/// [`Vcs`] backed by the `git` executable in the current directory.
#[derive(Debug, Clone, Default)]
pub struct GitCli {
    extra_args: Vec<String>,
    suppress_output: bool,
}

impl GitCli {
    pub fn new() -> Self {
        Self::default()
    }

    /// Extra arguments appended to `git commit`.
    pub fn with_commit_args(mut self, args: Vec<String>) -> Self {
        self.extra_args = args;
        self
    }

    pub fn suppress_output(mut self, suppress: bool) -> Self {
        self.suppress_output = suppress;
        self
    }
}

impl Vcs for GitCli {
    /// Get the output of `git diff --cached`
    fn staged_diff(&self) -> Result<String, GitError> {
        let output = Command::new("git")
            .args(["diff", "--cached"])
            .output()
            .map_err(GitError::Spawn)?;

        if !output.status.success() {
            debug!(stderr = %String::from_utf8_lossy(&output.stderr), "git diff --cached failed");
            return Err(GitError::DiffRetrieval {
                code: output.status.code(),
            });
        }

        Ok(String::from_utf8_lossy(&output.stdout).into_owned())
    }

    /// Run `git commit -m "<message>" [extra_args...]`
    fn commit(&self, message: &CommitMessage) -> Result<(), GitError> {
        let mut cmd = Command::new("git");
        cmd.args(["commit", "-m", message.as_str()]);
        cmd.args(&self.extra_args);
        configure_stdio(&mut cmd, self.suppress_output);
        let status = cmd.status().map_err(GitError::Spawn)?;

        if !status.success() {
            return Err(GitError::Commit {
                code: status.code(),
            });
        }

        Ok(())
    }
}

/// Find the git repository root directory
pub fn find_repo_root() -> Result<String> {
    let output = Command::new("git")
        .args(["rev-parse", "--show-toplevel"])
        .stderr(Stdio::null())
        .output()
        .context("Failed to run git rev-parse")?;

    if !output.status.success() {
        bail!("Not in a git repository");
    }

    Ok(String::from_utf8_lossy(&output.stdout).trim().to_string())
}

fn configure_stdio(cmd: &mut Command, suppress_output: bool) {
    if suppress_output {
        cmd.stdout(Stdio::null()).stderr(Stdio::null());
    }
}
