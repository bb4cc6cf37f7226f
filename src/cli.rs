use clap::{Parser, Subcommand};
use std::path::PathBuf;

#[derive(Parser, Debug)]
#[command(
    name = "teleview",
    version,
    about = "Double-buffered telemetry pipeline with a rolling console view"
)]
pub struct Cli {
    /// Path to config file
    #[arg(short, long, global = true)]
    pub config: Option<PathBuf>,

    #[command(subcommand)]
    pub command: Option<Commands>,
}

#[derive(Subcommand, Debug)]
pub enum Commands {
    /// Generate samples and print the rolling window (default if no subcommand)
    Run {
        /// Stop after this many seconds instead of waiting for Ctrl+C
        #[arg(long)]
        duration: Option<f64>,

        /// Print each refresh as a JSON line
        #[arg(long)]
        json: bool,
    },

    /// Write a commented default config file
    InitConfig {
        /// Destination (defaults to the platform config directory)
        path: Option<PathBuf>,

        /// Overwrite an existing file
        #[arg(long)]
        force: bool,
    },

    /// Print the effective configuration as TOML
    ShowConfig,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_no_subcommand_parses() {
        let cli = Cli::try_parse_from(["teleview"]).unwrap();
        assert!(cli.command.is_none());
        assert!(cli.config.is_none());
    }

    #[test]
    fn test_run_flags() {
        let cli =
            Cli::try_parse_from(["teleview", "run", "--duration", "2.5", "--json"]).unwrap();
        match cli.command {
            Some(Commands::Run { duration, json }) => {
                assert_eq!(duration, Some(2.5));
                assert!(json);
            }
            other => panic!("Expected Run, got {:?}", other),
        }
    }

    #[test]
    fn test_global_config_flag_after_subcommand() {
        let cli = Cli::try_parse_from(["teleview", "show-config", "-c", "custom.toml"]).unwrap();
        assert_eq!(cli.config, Some(PathBuf::from("custom.toml")));
        assert!(matches!(cli.command, Some(Commands::ShowConfig)));
    }
}
