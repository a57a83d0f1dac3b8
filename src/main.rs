use anyhow::{Context, Result};
use colored::Colorize;

use llm_tool_commit::cli::{self, Command};
use llm_tool_commit::config::AppConfig;
use llm_tool_commit::error::PipelineError;
use llm_tool_commit::git::GitCli;
use llm_tool_commit::pipeline::{self, Outcome, RunOptions};
use llm_tool_commit::provider::OllamaClient;
use llm_tool_commit::ui::{self, Review};
use llm_tool_commit::{prompt, telemetry};

fn main() {
    match run() {
        Ok(0) => {}
        Ok(code) => std::process::exit(code),
        Err(e) => {
            eprintln!("{} {:#}", "error:".red().bold(), e);
            std::process::exit(1);
        }
    }
}

fn run() -> Result<i32> {
    let cli = cli::parse();
    telemetry::init_tracing(cli.level());

    let mut cfg = AppConfig::load()?;
    cli.apply_to(&mut cfg);

    match cli.command {
        Some(Command::Config {
            save_global,
            save_local,
        }) => {
            show_config(&cfg);
            if save_global {
                let path = cfg.save_global()?;
                println!("\n{} Saved to {}", "done!".green().bold(), path.display());
            } else if save_local {
                let path = cfg.save_local()?;
                println!("\n{} Saved to {}", "done!".green().bold(), path.display());
            }
            Ok(0)
        }
        Some(Command::Prompt) => {
            let config = cfg.configuration()?;
            if cfg.system_prompt {
                println!("{}\n{}\n", "System:".cyan().bold(), prompt::build_system_prompt());
            }
            println!(
                "{}\n{}",
                "Prompt:".cyan().bold(),
                prompt::build_prompt(
                    "<staged diff>",
                    config.message_max_length(),
                    config.commit_type_hint()
                )
            );
            Ok(0)
        }
        None => commit_staged(&cfg, cli.dry_run, cli.extra_args),
    }
}

fn commit_staged(cfg: &AppConfig, dry_run: bool, extra_args: Vec<String>) -> Result<i32> {
    let config = cfg.configuration()?;
    let options = cfg.model_options()?;

    let vcs = GitCli::new()
        .with_commit_args(extra_args)
        .suppress_output(cfg.suppress_tool_output);
    let client = OllamaClient::new(&cfg.host);
    let run = RunOptions {
        use_system_prompt: cfg.system_prompt,
    };

    let result = pipeline::generate(&config, &options, run, &vcs, &client);
    let code = pipeline::exit_code(&result);
    let message = match result {
        Ok(Outcome::Message(message)) if !message.is_empty() => message,
        Ok(Outcome::Message(_)) => {
            eprintln!(
                "{} The model returned an empty summary; nothing to commit.",
                "note:".yellow().bold()
            );
            return Ok(code);
        }
        Ok(Outcome::NoChanges) => {
            println!(
                "No staged changes found. Stage files with {} first.",
                "git add <files>".yellow()
            );
            return Ok(code);
        }
        Err(PipelineError::Parse(e)) => {
            eprintln!("{} {}", "error:".red().bold(), e);
            eprintln!(
                "{} No commit was made. Try again or pick another model with {}.",
                "note:".yellow().bold(),
                "--model".yellow()
            );
            return Ok(code);
        }
        Err(e @ PipelineError::Inference(_)) => {
            return Err(e).with_context(|| format!("LLM call to {} failed", client.endpoint()));
        }
        Err(e) => return Err(e.into()),
    };

    eprintln!("{}\n{}\n", "Commit message:".green().bold(), message);

    if dry_run {
        return Ok(0);
    }

    let message = if cfg.review_commit {
        match ui::review(message, config.message_max_length())? {
            Review::Commit(message) => message,
            Review::Cancel => {
                println!("{}", "Cancelled.".dimmed());
                return Ok(0);
            }
        }
    } else {
        message
    };

    let code = pipeline::apply(&vcs, &message).context("git commit failed")?;
    if code == pipeline::EXIT_UNUSABLE_REPLY {
        eprintln!("{} Empty commit message; nothing committed.", "note:".yellow().bold());
    }
    Ok(code)
}

fn show_config(cfg: &AppConfig) {
    println!("\n{}  configuration\n", "ltc".cyan().bold());
    for (name, suffix, value) in cfg.fields_display() {
        println!(
            "  {:<22} {:<28} {}",
            name,
            format!("LTC_{suffix}").dimmed(),
            value
        );
    }

    if let Err(e) = cfg.configuration() {
        println!("\n{} {}", "invalid:".red().bold(), e);
    }
    if let Err(e) = cfg.model_options() {
        println!("\n{} {}", "invalid:".red().bold(), e);
    }
}
