use anyhow::Result;
use clap::{Parser, Subcommand};
use filelines::config::{Config, LoggingConfig};
use filelines::gateway;
use std::path::PathBuf;
use tracing_subscriber::EnvFilter;

#[derive(Parser)]
#[command(name = "filelines")]
#[command(about = "Upload text files and query random or longest lines over HTTP")]
#[command(version)]
struct Cli {
    /// Configuration file path
    #[arg(short, long, default_value = "filelines.toml")]
    config: PathBuf,

    /// Data directory (overrides storage.data_dir)
    #[arg(short, long)]
    data_dir: Option<PathBuf>,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Start the HTTP gateway
    Serve {
        /// Listen address (overrides gateway.listen_addr)
        #[arg(short, long)]
        listen: Option<String>,
    },

    /// Print the effective configuration as TOML
    Config,
}

fn init_logging(logging: &LoggingConfig) {
    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| {
        EnvFilter::new(format!(
            "{}={level},tower_http={level}",
            env!("CARGO_CRATE_NAME"),
            level = logging.level
        ))
    });
    tracing_subscriber::fmt().with_env_filter(filter).init();
}

#[tokio::main]
async fn main() -> Result<()> {
    let cli = Cli::parse();

    let mut config = Config::load_or_default(&cli.config)?;
    if let Some(dir) = cli.data_dir {
        config.storage.data_dir = dir.display().to_string();
    }

    match cli.command {
        Commands::Serve { listen } => {
            if let Some(addr) = listen {
                config.gateway.listen_addr = addr;
            }
            config.validate()?;
            init_logging(&config.logging);
            gateway::run(&config).await
        }
        Commands::Config => {
            print!("{}", config.to_toml()?);
            Ok(())
        }
    }
}
