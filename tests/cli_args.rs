//! Integration tests for CLI argument handling
//!
//! Runs the binary for failures that are detected before any network call.

use std::process::Command;

/// Helper to run the CLI with given args and no credentials in the environment
fn run_cli(args: &[&str]) -> std::process::Output {
    Command::new(env!("CARGO_BIN_EXE_umapi"))
        .args(args)
        .env_remove("UMAPI_CONSUMER_KEY")
        .env_remove("UMAPI_CONSUMER_SECRET")
        .env_remove("RUST_LOG")
        .output()
        .expect("Failed to execute umapi")
}

#[test]
fn test_help_flag_exits_successfully() {
    let output = run_cli(&["--help"]);
    assert!(output.status.success(), "Expected --help to exit successfully");
    let stdout = String::from_utf8_lossy(&output.stdout);
    assert!(stdout.contains("umapi"), "Help should mention umapi");
    assert!(stdout.contains("meetings"), "Help should list the meetings command");
}

#[test]
fn test_missing_subcommand_fails() {
    let output = run_cli(&[]);
    assert!(!output.status.success());
}

#[test]
fn test_invalid_date_prints_error_and_exits() {
    let output = run_cli(&["meetings", "AH1001", "someday", "2026-01-09"]);
    assert!(!output.status.success(), "Expected invalid date to fail");
    let stderr = String::from_utf8_lossy(&output.stderr);
    assert!(
        stderr.contains("Invalid date"),
        "Should print error message about the date: {}",
        stderr
    );
}

#[test]
fn test_empty_path_is_rejected() {
    let output = run_cli(&["get", ""]);
    assert!(!output.status.success());
    let stderr = String::from_utf8_lossy(&output.stderr);
    assert!(stderr.contains("path"), "Should complain about the path: {}", stderr);
}

#[test]
fn test_missing_credentials_are_reported() {
    let output = run_cli(&["get", "/Curriculum/Classrooms/v1/Classrooms"]);
    assert!(!output.status.success());
    let stderr = String::from_utf8_lossy(&output.stderr);
    assert!(
        stderr.contains("consumer key and secret"),
        "Should explain missing credentials: {}",
        stderr
    );
}

#[cfg(test)]
mod unit_tests {
    //! Unit tests for CLI parsing that don't require running the binary

    use clap::Parser;
    use umapi::cli::{parse_date_arg, Cli, Command};

    #[test]
    fn test_cli_get_parses_path() {
        let cli = Cli::parse_from(["umapi", "get", "/rooms"]);
        assert!(matches!(cli.command, Command::Get { ref path, .. } if path == "/rooms"));
    }

    #[test]
    fn test_cli_meetings_parses_positionals() {
        let cli = Cli::parse_from(["umapi", "meetings", "AH1001", "2026-01-05", "2026-01-09"]);
        match cli.command {
            Command::Meetings {
                facility_id,
                start,
                end,
            } => {
                assert_eq!(facility_id, "AH1001");
                assert_eq!(start, "2026-01-05");
                assert_eq!(end, "2026-01-09");
            }
            other => panic!("unexpected command: {:?}", other),
        }
    }

    #[test]
    fn test_cli_meetings_requires_three_arguments() {
        let result = Cli::try_parse_from(["umapi", "meetings", "AH1001"]);
        assert!(result.is_err());
    }

    #[test]
    fn test_parse_date_arg_invalid_returns_error() {
        assert!(parse_date_arg("13-45-2026").is_err());
    }

    #[test]
    fn test_no_cache_flag_disables_cache() {
        let cli = Cli::parse_from(["umapi", "get", "/rooms", "--no-cache"]);
        let options = cli.command.to_request().unwrap();
        assert_eq!(options.use_cache, Some(false));
    }
}
