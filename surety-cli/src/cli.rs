use clap::{Parser, Subcommand, ValueEnum};
use std::path::PathBuf;

#[derive(Parser, Debug)]
#[command(name = "surety")]
#[command(about = "Flight surety engine tooling", version)]
pub struct Cli {
    /// Emit logs as JSON lines
    #[arg(long, global = true)]
    pub json_logs: bool,

    #[command(subcommand)]
    pub command: Commands,
}

#[derive(Subcommand, Debug)]
pub enum Commands {
    /// Print the default configuration
    Config {
        #[arg(short, long, value_enum, default_value_t = ConfigFormat::Toml)]
        format: ConfigFormat,
    },
    /// Load and validate a configuration file
    Validate {
        #[arg(value_name = "FILE")]
        path: PathBuf,
    },
    /// Run a local scenario with mock oracle reporters
    Simulate(SimulateArgs),
}

#[derive(ValueEnum, Clone, Copy, Debug, PartialEq, Eq)]
pub enum ConfigFormat {
    Toml,
    Json,
}

#[derive(clap::Args, Debug, Clone)]
pub struct SimulateArgs {
    /// Configuration file (TOML or JSON); defaults are used when absent
    #[arg(short, long, env = "SURETY_CONFIG", value_name = "FILE")]
    pub config: Option<PathBuf>,

    /// Number of oracle reporters
    #[arg(long, default_value_t = 20)]
    pub oracles: usize,

    /// Passengers insuring every flight
    #[arg(long, default_value_t = 3)]
    pub passengers: usize,

    /// Seed for reporter randomness
    #[arg(long)]
    pub seed: Option<u64>,

    /// Status code every reporter sends instead of a random one
    #[arg(long, value_name = "CODE")]
    pub status: Option<u8>,

    /// Status requests per flight before giving up
    #[arg(long, default_value_t = 16)]
    pub rounds: usize,
}

impl Default for SimulateArgs {
    fn default() -> Self {
        Self {
            config: None,
            oracles: 20,
            passengers: 3,
            seed: None,
            status: None,
            rounds: 16,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use clap::CommandFactory;

    #[test]
    fn test_cli_definition() {
        Cli::command().debug_assert();
    }

    #[test]
    fn test_parse_simulate() {
        let cli = Cli::parse_from(["surety", "simulate", "--oracles", "30", "--status", "20"]);
        let Commands::Simulate(args) = cli.command else {
            panic!("expected simulate");
        };
        assert_eq!(args.oracles, 30);
        assert_eq!(args.status, Some(20));
        assert_eq!(args.rounds, 16);
    }
}
