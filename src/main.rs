use clap::Parser;
use tracing_subscriber::{fmt, prelude::*, EnvFilter};

use nuztap::app::AppContext;
use nuztap::cli::{commands, Cli, Commands};
use nuztap::config::Config;

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    // Initialize tracing
    tracing_subscriber::registry()
        .with(fmt::layer().with_writer(std::io::stderr))
        .with(EnvFilter::from_default_env())
        .init();

    let cli = Cli::parse();

    let mut config = match &cli.config {
        Some(path) => Config::load_from(path)?,
        None => Config::load()?,
    };
    if let Some(workers) = cli.workers {
        config.worker.workers = workers;
    }
    if let Some(database) = cli.database {
        config.database_path = Some(database);
    }
    config.validate()?;

    let ctx = AppContext::new(config)?;

    match cli.command {
        Commands::Refresh {
            owner,
            token,
            secret,
        } => {
            commands::refresh(&ctx, &owner, &token, &secret).await?;
        }
        Commands::Show { owner } => {
            commands::show(&ctx, &owner)?;
        }
        Commands::Ingest { owner } => {
            commands::ingest(&ctx, &owner)?;
        }
        Commands::Clear { owner } => {
            commands::clear(&ctx, &owner)?;
        }
    }

    Ok(())
}
