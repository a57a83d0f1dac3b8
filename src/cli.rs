use clap::{Parser, Subcommand};
use tracing::Level;

use crate::config::AppConfig;

#[derive(Parser, Debug)]
#[command(
    name = "ltc",
    about = "Generate conventional git commit messages from staged changes with a local LLM",
    version,
    after_help = "Any arguments after `--` are forwarded to `git commit`."
)]
pub struct Cli {
    #[command(subcommand)]
    pub command: Option<Command>,

    /// Ollama model name
    #[arg(long, short = 'm')]
    pub model: Option<String>,

    /// Base URL of the Ollama server
    #[arg(long)]
    pub host: Option<String>,

    /// Maximum number of diff characters sent to the model
    #[arg(long)]
    pub max_diff_size: Option<usize>,

    /// Maximum number of words in the commit message
    #[arg(long)]
    pub message_max_length: Option<usize>,

    /// Force the conventional commit type (feat, fix, docs, ...)
    #[arg(long = "commit-type", short = 't')]
    pub commit_type: Option<String>,

    /// Sampling temperature in [0, 1]
    #[arg(long)]
    pub temperature: Option<f64>,

    /// Nucleus sampling cutoff in [0, 1]
    #[arg(long)]
    pub top_p: Option<f64>,

    /// Top-k sampling cutoff (at least 1)
    #[arg(long)]
    pub top_k: Option<u32>,

    /// Maximum tokens to generate, -1 for unbounded
    #[arg(long, allow_hyphen_values = true)]
    pub max_output_tokens: Option<i64>,

    /// Send only the user prompt, without the system instruction
    #[arg(long)]
    pub no_system_prompt: bool,

    /// Generate and print commit message without creating a commit
    #[arg(long)]
    pub dry_run: bool,

    /// Commit without asking for review
    #[arg(long, short = 'y')]
    pub yes: bool,

    /// Log the prompt and raw model reply
    #[arg(long, short = 'v')]
    pub verbose: bool,

    /// Log level when RUST_LOG is not set
    #[arg(long, default_value = "warn")]
    pub log_level: Level,

    /// Extra arguments forwarded to `git commit`
    #[arg(last = true)]
    pub extra_args: Vec<String>,
}

#[derive(Subcommand, Debug)]
pub enum Command {
    /// Print the resolved configuration
    Config {
        /// Also save it to the global config file
        #[arg(long, conflicts_with = "save_local")]
        save_global: bool,
        /// Also save it to .env in the repository root
        #[arg(long)]
        save_local: bool,
    },
    /// Print the system instruction and prompt template without running anything
    Prompt,
}

pub fn parse() -> Cli {
    Cli::parse()
}

impl Cli {
    /// Layer command-line flags over the loaded config.
    pub fn apply_to(&self, cfg: &mut AppConfig) {
        if let Some(model) = &self.model {
            cfg.model = model.clone();
        }
        if let Some(host) = &self.host {
            cfg.host = host.trim_end_matches('/').to_string();
        }
        if let Some(size) = self.max_diff_size {
            cfg.max_diff_size = size;
        }
        if let Some(length) = self.message_max_length {
            cfg.message_max_length = length;
        }
        if let Some(commit_type) = &self.commit_type {
            cfg.commit_type = Some(commit_type.clone());
        }
        if let Some(temperature) = self.temperature {
            cfg.temperature = temperature;
        }
        if let Some(top_p) = self.top_p {
            cfg.top_p = top_p;
        }
        if let Some(top_k) = self.top_k {
            cfg.top_k = top_k;
        }
        if let Some(tokens) = self.max_output_tokens {
            cfg.max_output_tokens = tokens;
        }
        if self.no_system_prompt {
            cfg.system_prompt = false;
        }
        if self.yes {
            cfg.review_commit = false;
        }
    }

    /// Effective log level, raised to debug by `--verbose`.
    pub fn level(&self) -> Level {
        if self.verbose {
            Level::DEBUG.max(self.log_level)
        } else {
            self.log_level
        }
    }
}
