//! CLI - Command-line argument parsing
//!
//! Keeps argument parsing separate from execution logic.

use clap::{Args, Parser, Subcommand, ValueEnum};
use std::path::PathBuf;

/// CaseLinker control panel
#[derive(Parser, Debug)]
#[command(name = "caselinkctl")]
#[command(about = "CaseLinker - control panel for the case similarity scan service", long_about = None)]
#[command(version = env!("CASELINKER_VERSION"))]
#[command(disable_help_subcommand = true)]
pub struct Cli {
    /// Scan service URL (overrides $CASELINKER_BACKEND and the config file)
    #[arg(long, global = true)]
    pub backend: Option<String>,

    /// Client config file (overrides $CASELINKER_CONFIG)
    #[arg(long, global = true)]
    pub config: Option<PathBuf>,

    /// Subcommand (if not provided, starts the interactive panel)
    #[command(subcommand)]
    pub command: Option<Commands>,
}

/// Available commands
#[derive(Subcommand, Debug)]
pub enum Commands {
    /// Show the current scan stage
    Status {
        /// Output JSON only
        #[arg(long)]
        json: bool,
    },

    /// Poll the scan stage until interrupted
    Watch {
        /// Poll interval in milliseconds (defaults to the config file value)
        #[arg(long)]
        interval_ms: Option<u64>,

        /// Exit as soon as the service reports Idle
        #[arg(long)]
        until_idle: bool,
    },

    /// Start a scan; unset values fall back to the service's stored config
    Start(StartArgs),

    /// Fetch the results of the last scan
    Results {
        /// Output JSON only
        #[arg(long)]
        json: bool,

        /// Which result panel to print
        #[arg(long, value_enum, default_value_t = ViewArg::Heatmap)]
        view: ViewArg,

        /// Also write the heatmap as SVG to this file
        #[arg(long)]
        svg: Option<PathBuf>,

        /// Value of the service's `view` query parameter
        #[arg(long)]
        backend_view: Option<String>,
    },

    /// Show or change the service's scan config
    Config {
        #[command(subcommand)]
        action: ConfigCommands,
    },

    /// Run the service's procedure self-check
    Test {
        /// CSV to check instead of the configured one
        #[arg(long)]
        csv: Option<String>,

        /// Rows to sample
        #[arg(long)]
        sample_limit: Option<u32>,

        /// Output JSON only
        #[arg(long)]
        json: bool,
    },

    /// Show one indexed case record
    Case {
        /// Case ID as the scan indexed it
        id: String,

        /// Output JSON only
        #[arg(long)]
        json: bool,
    },

    /// Launch the interactive panel (same as no subcommand)
    #[command(hide = true)]
    Tui,
}

/// Scan parameters for `start`
#[derive(Args, Debug, Default)]
pub struct StartArgs {
    /// Case CSV path on the service host
    #[arg(long)]
    pub csv: Option<String>,

    /// Similarity threshold in [0, 1]
    #[arg(long)]
    pub threshold: Option<f64>,

    /// Maximum year difference between linked cases
    #[arg(long)]
    pub year_window: Option<u32>,

    /// Maximum CNTYFIPS difference between linked cases
    #[arg(long)]
    pub geo_window: Option<u32>,

    /// Scan time budget in hours (defaults to the config file value)
    #[arg(long)]
    pub duration_hours: Option<f64>,
}

/// Config subcommands
#[derive(Subcommand, Debug)]
pub enum ConfigCommands {
    /// Print the stored config
    Show {
        /// Output JSON only
        #[arg(long)]
        json: bool,
    },

    /// Update stored values; omitted flags are left unchanged
    Set {
        #[arg(long)]
        csv: Option<String>,

        #[arg(long)]
        threshold: Option<f64>,

        #[arg(long)]
        year_window: Option<u32>,

        /// Geo window, or `none`
        #[arg(long)]
        geo_window: Option<String>,

        /// Heatmap sample size
        #[arg(long)]
        sample_limit: Option<u32>,
    },
}

/// Result panel selector
#[derive(ValueEnum, Debug, Clone, Copy, PartialEq, Eq)]
pub enum ViewArg {
    Heatmap,
    Graph,
}

#[cfg(test)]
mod tests {
    use super::*;
    use clap::CommandFactory;

    #[test]
    fn cli_definition_is_consistent() {
        Cli::command().debug_assert();
    }

    #[test]
    fn no_subcommand_means_panel() {
        let cli = Cli::try_parse_from(["caselinkctl"]).unwrap();
        assert!(cli.command.is_none());
    }

    #[test]
    fn start_flags_parse() {
        let cli = Cli::try_parse_from([
            "caselinkctl",
            "--backend",
            "http://scan:8000",
            "start",
            "--threshold",
            "0.8",
            "--geo-window",
            "3",
        ])
        .unwrap();

        assert_eq!(cli.backend.as_deref(), Some("http://scan:8000"));
        match cli.command {
            Some(Commands::Start(args)) => {
                assert_eq!(args.threshold, Some(0.8));
                assert_eq!(args.geo_window, Some(3));
                assert_eq!(args.year_window, None);
            }
            other => panic!("unexpected {other:?}"),
        }
    }

    #[test]
    fn results_view_defaults_to_heatmap() {
        let cli = Cli::try_parse_from(["caselinkctl", "results", "--svg", "out.svg"]).unwrap();
        match cli.command {
            Some(Commands::Results { view, svg, .. }) => {
                assert_eq!(view, ViewArg::Heatmap);
                assert_eq!(svg, Some(PathBuf::from("out.svg")));
            }
            other => panic!("unexpected {other:?}"),
        }
    }
}
