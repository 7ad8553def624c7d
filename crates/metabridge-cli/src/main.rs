use clap::{Parser, Subcommand, ValueEnum};
use metabridge_core::Transport;
use std::path::PathBuf;
use tracing_subscriber::EnvFilter;

mod commands;

#[derive(Parser, Debug)]
#[command(name = "metabridge", version, about = "BI service tools for AI agents over MCP")]
struct Cli {
    /// Log filter, e.g. "debug" or "metabridge_cache=debug". Overrides RUST_LOG.
    #[arg(long, global = true)]
    log_level: Option<String>,

    #[command(subcommand)]
    cmd: Command,
}

#[derive(Subcommand, Debug)]
enum Command {
    /// Start the MCP server.
    Serve {
        /// Configuration file. Defaults to ./metabridge.yaml when present.
        #[arg(short, long)]
        config: Option<PathBuf>,

        /// Override the configured transport.
        #[arg(long, value_enum)]
        transport: Option<TransportArg>,

        /// Override the configured HTTP port.
        #[arg(long)]
        port: Option<u16>,
    },

    /// Print the tool catalog as JSON.
    Tools {
        #[arg(short, long)]
        config: Option<PathBuf>,
    },

    /// Load and validate a configuration file.
    Check {
        #[arg(short, long)]
        config: Option<PathBuf>,
    },
}

#[derive(Debug, Clone, Copy, ValueEnum)]
enum TransportArg {
    Stdio,
    Http,
}

impl From<TransportArg> for Transport {
    fn from(arg: TransportArg) -> Self {
        match arg {
            TransportArg::Stdio => Transport::Stdio,
            TransportArg::Http => Transport::Http,
        }
    }
}

fn init_tracing(level: Option<&str>) {
    let filter = match level {
        Some(level) => EnvFilter::new(level),
        None => EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info")),
    };

    // stdout carries JSON-RPC on the stdio transport
    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(std::io::stderr)
        .init();
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    let cli = Cli::parse();
    init_tracing(cli.log_level.as_deref());

    match cli.cmd {
        Command::Serve {
            config,
            transport,
            port,
        } => {
            commands::serve::run(config, transport.map(Transport::from), port).await?;
        }
        Command::Tools { config } => {
            commands::tools::run(config)?;
        }
        Command::Check { config } => {
            commands::check::run(config)?;
        }
    }

    Ok(())
}
