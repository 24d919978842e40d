mod bot;
mod config;
mod dedup;
mod delivery;
mod filter;
mod modes;
mod rate_limit;
mod route;
mod router;
mod telegram;

use anyhow::Result;
use dotenvy::dotenv;
use tracing_subscriber::EnvFilter;

#[tokio::main]
async fn main() -> Result<()> {
    dotenv().ok();
    tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info")),
        )
        .with_target(false)
        .init();

    modes::run_from_env().await
}
