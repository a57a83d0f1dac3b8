pub mod cli;
pub mod config;
pub mod diff;
pub mod error;
pub mod git;
pub mod parser;
pub mod pipeline;
pub mod prompt;
pub mod provider;
pub mod telemetry;
pub mod ui;
