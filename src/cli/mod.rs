//! CLI module for startstop - command-line interface and subcommands.
//!
//! Provides the main entry point with subcommands for validating a host
//! config and running its services.

pub mod commands;

pub use commands::Cli;
