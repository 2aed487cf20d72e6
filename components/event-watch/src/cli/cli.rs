// Local crates
use crate::{
    helpers::converters::parse_cli_date,
    normalizer::models::Privacy,
    output::sink::{OutputFormat, Property},
    poller::options::WatchOptions,
    runtime,
    source::source::LogLevel,
};

// External crates
use anyhow::Result;
use chrono::{DateTime, Utc};
use clap::{Args, Parser, Subcommand};
use std::path::PathBuf;

pub const DEFAULT_CONFIG_PATH: &str = "event_watch.toml";

#[derive(Parser, Debug)]
#[command(
    name = "event-watch",
    long_about = "event-watch merges debugger alerts, messages and calls from your account into a single, time ordered stream.",
    about = "Watch account events as they happen",
    version,
    term_width = 100,
    after_help = "\
    EXAMPLES:
        event-watch watch --streaming
        event-watch watch --start-date 2026-10-01 --end-date 2026-10-02 --no-pii
        event-watch watch -s --log-level error -o json
        event-watch validate --config ./event_watch.toml"
)]
struct Cli {
    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand, Debug)]
enum Commands {
    /// Show account events, once or continuously
    Watch(WatchArgs),

    /// Load the configuration file and print it with secrets masked
    Validate {
        #[arg(short, long, default_value = DEFAULT_CONFIG_PATH)]
        config: PathBuf,
    },

    /// Display version information
    Version,
}

#[derive(Args, Debug)]
pub struct WatchArgs {
    /// Only show events on or after this date
    #[arg(long, value_parser = parse_cli_date)]
    pub start_date: Option<DateTime<Utc>>,

    /// Only show events on or before this date (not allowed when streaming)
    #[arg(long, value_parser = parse_cli_date)]
    pub end_date: Option<DateTime<Utc>>,

    /// Keep polling for new events until interrupted
    #[arg(short, long)]
    pub streaming: bool,

    /// Only show debugger alerts of this level
    #[arg(long, value_enum)]
    pub log_level: Option<LogLevel>,

    /// Comma separated list of columns to show
    #[arg(long, default_value = Property::DEFAULT_LIST)]
    pub properties: String,

    /// Mask phone numbers and replace message bodies with their length
    #[arg(long)]
    pub no_pii: bool,

    /// Include the last few minutes of events before the watch starts
    #[arg(long)]
    pub show_recent_history: bool,

    /// Output format, overrides `output.format` from the configuration
    #[arg(short, long, value_enum)]
    pub output: Option<OutputFormat>,

    #[arg(short, long, default_value = DEFAULT_CONFIG_PATH)]
    pub config: PathBuf,
}

impl WatchArgs {
    pub fn options(&self) -> WatchOptions {
        WatchOptions {
            start_date: self.start_date,
            end_date: self.end_date,
            streaming: self.streaming,
            log_level: self.log_level,
            properties: self.properties.clone(),
            privacy: Privacy {
                redact_pii: self.no_pii,
            },
            show_recent_history: self.show_recent_history,
        }
    }
}

/// Entry function for CLI
pub async fn run() -> Result<()> {
    let cli = Cli::parse();

    match cli.command {
        Commands::Watch(args) => runtime::runtime::run_watch(args).await?,
        Commands::Validate { config } => validate_config(config)?,
        Commands::Version => show_version(),
    }

    Ok(())
}

//
// ------------------------ Command Implementations ------------------------------
//

/// Validate configuration file
fn validate_config(config: PathBuf) -> Result<()> {
    println!("Validating configuration file: {:?}", config);
    let cfg = crate::helpers::load_config::Config::load_required(&config)?;
    println!("Configuration valid:\n{}", cfg.to_redacted_toml()?);
    Ok(())
}

/// Show version information
fn show_version() {
    println!("event-watch {}", env!("CARGO_PKG_VERSION"));
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::TimeZone;
    use clap::CommandFactory;

    fn watch(args: &[&str]) -> WatchArgs {
        let argv = ["event-watch", "watch"].iter().chain(args);
        match Cli::try_parse_from(argv).unwrap().command {
            Commands::Watch(args) => args,
            _ => panic!("expected the watch command"),
        }
    }

    #[test]
    fn command_definition_is_consistent() {
        Cli::command().debug_assert();
    }

    #[test]
    fn watch_defaults() {
        let args = watch(&[]);
        let options = args.options();

        assert!(!options.streaming);
        assert_eq!(options.properties, Property::DEFAULT_LIST);
        assert!(!options.privacy.redact_pii);
        assert_eq!(args.config, PathBuf::from(DEFAULT_CONFIG_PATH));
        assert!(args.output.is_none());
    }

    #[test]
    fn watch_flags_map_onto_options() {
        let args = watch(&[
            "-s",
            "--start-date",
            "2026-10-14 08:30:00",
            "--log-level",
            "warning",
            "--no-pii",
            "--show-recent-history",
            "-o",
            "tsv",
        ]);
        let options = args.options();

        assert!(options.streaming);
        assert_eq!(
            options.start_date,
            Some(Utc.with_ymd_and_hms(2026, 10, 14, 8, 30, 0).unwrap())
        );
        assert_eq!(options.log_level, Some(LogLevel::Warning));
        assert!(options.privacy.redact_pii);
        assert!(options.show_recent_history);
        assert_eq!(args.output, Some(OutputFormat::Tsv));
    }

    #[test]
    fn malformed_dates_are_rejected_by_the_parser() {
        let argv = ["event-watch", "watch", "--start-date", "yesterday"];
        assert!(Cli::try_parse_from(argv).is_err());
    }
}
