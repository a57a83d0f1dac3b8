use clap::Parser;
use llm_tool_commit::cli::{Cli, Command};
use llm_tool_commit::config::AppConfig;
use tracing::Level;

#[test]
fn parses_prompt_subcommand() {
    let cli = Cli::try_parse_from(["ltc", "prompt"]).expect("prompt should parse");
    assert!(matches!(cli.command, Some(Command::Prompt)));
}

#[test]
fn parses_config_subcommand_with_save_scope() {
    let cli = Cli::try_parse_from(["ltc", "config", "--save-local"]).expect("config should parse");
    assert!(matches!(
        cli.command,
        Some(Command::Config {
            save_global: false,
            save_local: true
        })
    ));
}

#[test]
fn rejects_both_save_scopes() {
    let err = Cli::try_parse_from(["ltc", "config", "--save-global", "--save-local"])
        .expect_err("scopes conflict");
    assert!(err.to_string().contains("--save-global"));
}

#[test]
fn flags_override_loaded_config() {
    let cli = Cli::try_parse_from([
        "ltc",
        "--model",
        "llama3.2",
        "--max-diff-size",
        "1000",
        "--message-max-length",
        "12",
        "-t",
        "fix",
        "--temperature",
        "0.1",
        "--top-k",
        "5",
        "--max-output-tokens",
        "-1",
        "--no-system-prompt",
        "--yes",
    ])
    .expect("flags should parse");

    let mut cfg = AppConfig::default();
    cfg.max_output_tokens = 128;
    cli.apply_to(&mut cfg);

    assert_eq!(cfg.model, "llama3.2");
    assert_eq!(cfg.max_diff_size, 1000);
    assert_eq!(cfg.message_max_length, 12);
    assert_eq!(cfg.commit_type.as_deref(), Some("fix"));
    assert_eq!(cfg.temperature, 0.1);
    assert_eq!(cfg.top_k, 5);
    assert_eq!(cfg.max_output_tokens, -1);
    assert!(!cfg.system_prompt);
    assert!(!cfg.review_commit);
}

#[test]
fn absent_flags_keep_loaded_values() {
    let cli = Cli::try_parse_from(["ltc"]).expect("no flags");
    let mut cfg = AppConfig::default();
    cfg.model = "from-file".into();
    cli.apply_to(&mut cfg);
    assert_eq!(cfg.model, "from-file");
    assert!(cfg.review_commit);
}

#[test]
fn extra_args_after_double_dash_are_forwarded() {
    let cli = Cli::try_parse_from(["ltc", "--dry-run", "--", "--no-verify", "-s"])
        .expect("forwarded args");
    assert!(cli.dry_run);
    assert_eq!(cli.extra_args, vec!["--no-verify", "-s"]);
}

#[test]
fn verbose_raises_log_level_to_debug() {
    let quiet = Cli::try_parse_from(["ltc"]).unwrap();
    assert_eq!(quiet.level(), Level::WARN);

    let verbose = Cli::try_parse_from(["ltc", "-v"]).unwrap();
    assert_eq!(verbose.level(), Level::DEBUG);

    let trace = Cli::try_parse_from(["ltc", "-v", "--log-level", "trace"]).unwrap();
    assert_eq!(trace.level(), Level::TRACE);
}
