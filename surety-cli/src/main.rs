mod cli;
mod simulation;

use anyhow::{Context, Result};
use clap::Parser;
use cli::{Cli, Commands, ConfigFormat};
use surety_engine::SuretyConfig;
use tracing::info;
use tracing_subscriber::EnvFilter;

fn init_logging(json: bool) {
    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info"));
    let builder = tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(std::io::stderr);

    if json {
        builder.json().init();
    } else {
        builder.init();
    }
}

#[tokio::main]
async fn main() -> Result<()> {
    let cli = Cli::parse();
    init_logging(cli.json_logs);

    match cli.command {
        Commands::Config { format } => {
            let config = SuretyConfig::default();
            let rendered = match format {
                ConfigFormat::Toml => config.to_toml()?,
                ConfigFormat::Json => serde_json::to_string_pretty(&config)?,
            };
            println!("{rendered}");
        }
        Commands::Validate { path } => {
            let config = SuretyConfig::load(&path)
                .with_context(|| format!("invalid configuration {}", path.display()))?;
            info!("Configuration {} is valid", path.display());
            println!("owner:         {}", config.owner);
            println!("first airline: {}", config.first_airline);
            println!("pool:          {}", config.pool_address);
        }
        Commands::Simulate(args) => {
            let report = simulation::run(args).await?;
            println!("{}", serde_json::to_string_pretty(&report)?);
        }
    }

    Ok(())
}
