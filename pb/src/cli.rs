//! CLI definitions

use clap::Parser;
use std::path::PathBuf;

/// Planboard - terminal task board for a remote planning service
#[derive(Debug, Parser)]
#[command(
    name = "pb",
    about = "Terminal task board for a remote planning service",
    version,
    after_help = "Logs are written to: ~/.local/share/planboard/logs/planboard.log"
)]
pub struct Cli {
    /// Path to config file
    #[arg(short, long, help = "Path to config file")]
    pub config: Option<PathBuf>,

    /// Enable verbose logging
    #[arg(short, long, help = "Enable verbose logging")]
    pub verbose: bool,

    /// Suppress add, complete, and delete affordances
    #[arg(long)]
    pub read_only: bool,

    /// Pin the board to a single plan (hides the plan picker)
    #[arg(long = "plan", value_name = "ID")]
    pub target_plan: Option<String>,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_cli_defaults() {
        let cli = Cli::try_parse_from(["pb"]).expect("bare invocation should parse");
        assert!(!cli.read_only);
        assert!(cli.target_plan.is_none());
        assert!(cli.config.is_none());
    }

    #[test]
    fn test_cli_flags() {
        let cli = Cli::try_parse_from(["pb", "--read-only", "--plan", "P1", "-v"]).expect("parse");
        assert!(cli.read_only);
        assert_eq!(cli.target_plan.as_deref(), Some("P1"));
        assert!(cli.verbose);
    }
}
