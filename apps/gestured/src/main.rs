mod commands;
mod config;
mod device;
mod session;

use anyhow::Result;
use clap::Parser;
use commands::Command;
use config::DaemonConfig;
use session::{Reply, Session};
use std::path::PathBuf;
use tokio::io::{AsyncBufReadExt, BufReader};
use tracing_subscriber::EnvFilter;

#[derive(Debug, Parser)]
#[command(name = "gestured")]
#[command(about = "Screen-off gesture engine on a simulated device")]
struct Cli {
    /// JSON daemon configuration.
    #[arg(long)]
    config: Option<PathBuf>,

    /// SQLite preference database; overrides the config file.
    #[arg(long)]
    database: Option<PathBuf>,
}

#[tokio::main]
async fn main() -> Result<()> {
    tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| EnvFilter::new("info,gestures=debug,gestured=debug")),
        )
        .with_writer(std::io::stderr)
        .init();

    let cli = Cli::parse();
    let mut config = DaemonConfig::load_or_default(cli.config.as_deref())?;
    if let Some(database) = cli.database {
        config.database_path = Some(database);
    }

    tracing::info!(gestures = config.gestures.len(), "starting gesture daemon");
    let session = Session::boot(&config)?;

    let mut lines = BufReader::new(tokio::io::stdin()).lines();
    while let Some(line) = lines.next_line().await? {
        let command = match Command::parse(&line) {
            Ok(Some(command)) => command,
            Ok(None) => continue,
            Err(e) => {
                println!("error: {e}");
                continue;
            }
        };
        match session.execute(command).await {
            Reply::Continue(text) => println!("{text}"),
            Reply::Quit => break,
        }
    }

    session.handler().shutdown();
    session.handler().sync().await;
    tracing::info!("gesture daemon stopped");
    Ok(())
}
