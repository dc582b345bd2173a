//! Command-line interface definition.

use std::path::PathBuf;

use clap::{Parser, Subcommand};

/// calfeed - Calendar feed occurrences at a glance
#[derive(Debug, Parser)]
#[command(name = "calfeed")]
#[command(author, version, about, long_about = None)]
pub struct Cli {
    /// Path to configuration file
    #[arg(long, short, env = "CALFEED_CONFIG")]
    pub config: Option<PathBuf>,

    /// Enable debug output
    #[arg(long, short = 'v')]
    pub debug: bool,

    /// Output language: `es` or `en` (defaults to `display.lang`)
    #[arg(long, global = true)]
    pub lang: Option<String>,

    #[command(subcommand)]
    pub command: Command,
}

/// Available commands.
#[derive(Debug, Subcommand)]
pub enum Command {
    /// List the occurrences of a feed for one year, grouped by month
    Events {
        /// Feed URL (defaults to `feed.source` from the config)
        #[arg(long, short)]
        source: Option<String>,

        /// Year to expand (defaults to the current year)
        #[arg(long, short)]
        year: Option<i32>,

        /// Months to show: `all` or `current`
        #[arg(long)]
        months: Option<String>,

        /// List occurrences without month sections
        #[arg(long)]
        flat: bool,

        /// Output JSON instead of text
        #[arg(long)]
        json: bool,
    },

    /// Print one occurrence as a standalone ICS document
    Export {
        /// Feed URL (defaults to `feed.source` from the config)
        #[arg(long, short)]
        source: Option<String>,

        /// UID of the event to export
        #[arg(long)]
        uid: String,

        /// Start of the occurrence to export, as an ICS value
        /// (`20250317T090000Z`) or RFC 3339; defaults to the earliest one
        #[arg(long)]
        start: Option<String>,

        /// Year to search (defaults to the current year)
        #[arg(long, short)]
        year: Option<i32>,
    },

    /// Configuration commands
    Config {
        #[command(subcommand)]
        action: ConfigAction,
    },
}

/// Configuration actions.
#[derive(Debug, Subcommand)]
pub enum ConfigAction {
    /// Dump current configuration
    Dump,

    /// Validate configuration
    Validate,

    /// Show configuration file path
    Path,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn parses_events_command() {
        let cli = Cli::parse_from([
            "calfeed",
            "--debug",
            "events",
            "--source",
            "https://example.com/a.ics",
            "--year",
            "2025",
            "--months",
            "current",
            "--json",
        ]);

        assert!(cli.debug);
        assert!(cli.lang.is_none());
        match cli.command {
            Command::Events {
                source,
                year,
                months,
                flat,
                json,
            } => {
                assert_eq!(source.as_deref(), Some("https://example.com/a.ics"));
                assert_eq!(year, Some(2025));
                assert_eq!(months.as_deref(), Some("current"));
                assert!(!flat);
                assert!(json);
            }
            other => panic!("unexpected command: {other:?}"),
        }
    }

    #[test]
    fn export_requires_uid() {
        assert!(Cli::try_parse_from(["calfeed", "export"]).is_err());
        assert!(Cli::try_parse_from(["calfeed", "export", "--uid", "abc"]).is_ok());
    }

    #[test]
    fn export_accepts_start() {
        let cli = Cli::parse_from(["calfeed", "export", "--uid", "abc", "--start", "20250317T090000Z"]);
        match cli.command {
            Command::Export { uid, start, .. } => {
                assert_eq!(uid, "abc");
                assert_eq!(start.as_deref(), Some("20250317T090000Z"));
            }
            other => panic!("unexpected command: {other:?}"),
        }
    }

    #[test]
    fn lang_is_accepted_after_the_subcommand() {
        let cli = Cli::parse_from(["calfeed", "events", "--flat", "--lang", "en"]);
        assert_eq!(cli.lang.as_deref(), Some("en"));
        assert!(matches!(cli.command, Command::Events { flat: true, .. }));
    }

    #[test]
    fn config_subcommands() {
        let cli = Cli::parse_from(["calfeed", "config", "path"]);
        assert!(matches!(
            cli.command,
            Command::Config {
                action: ConfigAction::Path
            }
        ));
    }
}
