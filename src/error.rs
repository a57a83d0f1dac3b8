//! Error types for the commit-message pipeline using thiserror.

use thiserror::Error;

/// A configuration or model option outside its declared bound.
#[derive(Error, Debug, Clone, PartialEq)]
#[error("Invalid value for `{field}`: {constraint}")]
pub struct ValidationError {
    pub field: &'static str,
    pub constraint: String,
}

impl ValidationError {
    pub fn new(field: &'static str, constraint: impl Into<String>) -> Self {
        Self {
            field,
            constraint: constraint.into(),
        }
    }
}

/// Errors from the version-control collaborator.
#[derive(Error, Debug)]
pub enum GitError {
    #[error("`git diff --cached` failed with {}", describe_code(*code))]
    DiffRetrieval { code: Option<i32> },

    #[error("`git commit` failed with {}", describe_code(*code))]
    Commit { code: Option<i32> },

    #[error("Failed to run git: {0}")]
    Spawn(#[source] std::io::Error),
}

/// Errors from the inference collaborator.
#[derive(Error, Debug)]
pub enum InferenceError {
    #[error("Inference service returned HTTP {code}: {body}")]
    Status { code: u16, body: String },

    #[error("Could not reach the inference service: {0}")]
    Transport(String),

    #[error("Unexpected inference response: {0}")]
    InvalidResponse(String),
}

/// Errors from extracting a commit message out of a model reply.
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum ParseError {
    #[error("No <summary> block found in the model response")]
    Extraction,

    #[error("Invalid placement of <summary> tags in the model response")]
    MalformedOutput,
}

/// Any failure of a single pipeline run.
#[derive(Error, Debug)]
pub enum PipelineError {
    #[error(transparent)]
    Git(#[from] GitError),

    #[error(transparent)]
    Inference(#[from] InferenceError),

    #[error(transparent)]
    Parse(#[from] ParseError),
}

fn describe_code(code: Option<i32>) -> String {
    code.map_or("an unknown status".to_string(), |c| format!("exit code {c}"))
}
