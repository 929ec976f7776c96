use std::process::ExitCode;

use clap::Parser;
use giya_seed::{DEFAULT_EMAIL, DEFAULT_PASSWORD, SeedOutcome, seed_admin};
use giya_server::{config::Config, database::connect};
use tracing::{error, info};
use tracing_subscriber::{EnvFilter, fmt};

/// Create the admin account used by the content panel.
#[derive(Parser, Debug)]
#[command(author, version, about)]
struct Args {
    #[arg(long, default_value = DEFAULT_EMAIL)]
    email: String,

    #[arg(long, default_value = DEFAULT_PASSWORD)]
    password: String,
}

async fn run(args: Args) -> anyhow::Result<SeedOutcome> {
    let config = Config::load()?;
    let store = connect(&config.database_url).await?;

    seed_admin(store, &args.email, &args.password).await
}

#[tokio::main]
async fn main() -> ExitCode {
    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info"));
    fmt().with_env_filter(filter).init();

    let args = Args::parse();

    match run(args).await {
        Ok(SeedOutcome::Created) => {
            info!("Admin user created successfully");
            ExitCode::SUCCESS
        }
        Ok(SeedOutcome::AlreadyExists) => {
            info!("Admin user already exists, nothing to do");
            ExitCode::SUCCESS
        }
        Err(e) => {
            error!("Seeding failed: {e:#}");
            ExitCode::FAILURE
        }
    }
}
