//! CLI command definitions using clap.
//!
//! Defines the main CLI structure and subcommands:
//! - validate: check the host config and every service's attributes
//! - run: bring services up and accept commands on stdin

use clap::{Parser, Subcommand};
use std::path::PathBuf;

/// StartStop - host for restartable background loop services
#[derive(Parser, Debug)]
#[command(name = "startstop")]
#[command(author, version, about, long_about = None)]
pub struct Cli {
    /// Optional config file path
    #[arg(short, long, global = true)]
    pub config: Option<PathBuf>,

    /// Verbose output
    #[arg(short, long, global = true)]
    pub verbose: bool,

    /// Log to stderr instead of the log file
    #[arg(long, global = true)]
    pub stderr: bool,

    /// Subcommand to execute
    #[command(subcommand)]
    pub command: Commands,
}

impl Cli {
    /// Check if verbose mode is enabled
    pub fn is_verbose(&self) -> bool {
        self.verbose
    }
}

/// Main subcommands
#[derive(Subcommand, Debug)]
pub enum Commands {
    /// Validate the host config and each service's attributes
    Validate,

    /// Start configured services and read commands from stdin
    ///
    /// Each line is `list` or `<service> <json-object>`,
    /// e.g. `oscillator {"stop": true}`.
    Run {
        /// Stop everything and exit after this many seconds
        #[arg(short, long)]
        duration_secs: Option<u64>,
    },
}

#[cfg(test)]
mod tests {
    use super::*;
    use clap::CommandFactory;

    #[test]
    fn test_cli_requires_subcommand() {
        assert!(Cli::try_parse_from(["startstop"]).is_err());
    }

    #[test]
    fn test_cli_verbose_flag() {
        let cli = Cli::try_parse_from(["startstop", "-v", "validate"]).unwrap();
        assert!(cli.is_verbose());
        assert!(!cli.stderr);
    }

    #[test]
    fn test_cli_config_option() {
        let cli = Cli::try_parse_from(["startstop", "validate", "-c", "/path/to/startstop.yml"]).unwrap();
        assert_eq!(cli.config.as_ref(), Some(&PathBuf::from("/path/to/startstop.yml")));
        assert!(matches!(cli.command, Commands::Validate));
    }

    #[test]
    fn test_run_defaults() {
        let cli = Cli::try_parse_from(["startstop", "--stderr", "run"]).unwrap();
        assert!(cli.stderr);
        match cli.command {
            Commands::Run { duration_secs } => assert!(duration_secs.is_none()),
            _ => panic!("Expected run command"),
        }
    }

    #[test]
    fn test_run_duration() {
        let cli = Cli::try_parse_from(["startstop", "run", "--duration-secs", "30"]).unwrap();
        match cli.command {
            Commands::Run { duration_secs } => assert_eq!(duration_secs, Some(30)),
            _ => panic!("Expected run command"),
        }
    }

    #[test]
    fn test_unknown_subcommand() {
        assert!(Cli::try_parse_from(["startstop", "daemon"]).is_err());
    }

    #[test]
    fn test_cli_debug_assert() {
        Cli::command().debug_assert();
    }
}
