mod live;
mod replay;
mod shared;

use anyhow::Result;
use tracing::info;

use crate::config::RouterConfig;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum RunMode {
    /// Watch source chats and forward leads.
    Live,
    /// Feed a JSONL dump through the engine.
    Replay,
    /// Load and validate the router config, then exit.
    Check,
}

impl RunMode {
    fn parse(raw: &str) -> Self {
        match raw.trim().to_lowercase().as_str() {
            "replay" => Self::Replay,
            "check" | "check_config" => Self::Check,
            _ => Self::Live,
        }
    }

    fn from_env() -> Self {
        Self::parse(&std::env::var("RUN_MODE").unwrap_or_default())
    }
}

pub async fn run_from_env() -> Result<()> {
    let mode = RunMode::from_env();
    info!("Run mode: {mode:?}");
    match mode {
        RunMode::Live => live::run().await,
        RunMode::Replay => replay::run().await,
        RunMode::Check => {
            let cfg = RouterConfig::from_env()?;
            info!("{cfg} OK\n{}", cfg.summary());
            Ok(())
        }
    }
}
