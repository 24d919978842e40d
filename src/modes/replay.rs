use crate::bot::{BotApiTransport, DryRunTransport};
use crate::config::{HumanBehavior, RouterConfig};
use crate::delivery::Transport;
use crate::router::{Outcome, RouterEngine};
use anyhow::{Result, anyhow};
use std::path::PathBuf;
use tracing::{debug, info};

use super::shared::{load_dump_events, load_replay_cfg, replay_delay};

pub(super) async fn run() -> Result<()> {
    let replay = load_replay_cfg()?;
    let events = load_dump_events(&replay.input_path)?;
    if events.is_empty() {
        return Err(anyhow!("Replay input is empty: {}", replay.input_path));
    }

    let mut router_cfg = RouterConfig::from_env()?;
    // Keep replays away from the live duplicate cache.
    router_cfg.fingerprint_file = Some(PathBuf::from(&replay.fingerprint_path));

    let transport: Box<dyn Transport> = if replay.broadcast {
        info!("Replay broadcast enabled; leads will be sent through the Bot API");
        Box::new(BotApiTransport::from_env()?)
    } else {
        router_cfg.human_behavior = HumanBehavior::instant();
        Box::new(DryRunTransport)
    };

    info!(
        "Replay started: {} events from {}",
        events.len(),
        replay.input_path
    );
    let mut engine = RouterEngine::new(router_cfg, transport);

    let mut forwarded = 0usize;
    let mut suppressed = 0usize;

    for (idx, event) in events.iter().enumerate() {
        if idx > 0 {
            let delay = replay_delay(&events[idx - 1], event, &replay);
            if !delay.is_zero() {
                tokio::time::sleep(delay).await;
            }
        }

        debug!("Replaying #{} from {:?}", idx + 1, event.channel_title);
        match engine.process(&event.to_inbound(idx)).await {
            Outcome::Routed { report, .. } if report.success_count > 0 => forwarded += 1,
            _ => suppressed += 1,
        }
    }

    engine.shutdown();
    info!(
        "Replay complete: total={}, forwarded={}, suppressed={} (duplicates={})",
        events.len(),
        forwarded,
        suppressed,
        engine.stats().duplicates_skipped
    );

    Ok(())
}
