use crate::bot::BotApiTransport;
use crate::config::RouterConfig;
use crate::router::{InboundMessage, RouterEngine};
use crate::telegram::{self, TgCfg};
use anyhow::Result;
use grammers_client::Update;
use grammers_client::client::updates::UpdateStream;
use std::future::Future;
use std::time::Duration;
use tokio::sync::mpsc;
use tokio::task::JoinHandle;
use tracing::{debug, info, warn};

use super::shared::stats_interval;

/// Inbound messages buffered between the update pump and the engine.
const INBOUND_QUEUE: usize = 256;

pub(super) async fn run() -> Result<()> {
    let router_cfg = RouterConfig::from_env()?;
    let tg = TgCfg::from_env()?;
    let transport = BotApiTransport::from_env()?;

    let (client, pool) = telegram::connect(&tg)?;

    let runner = pool.runner;
    tokio::spawn(async move {
        runner.run().await;
    });

    let updates_rx = pool.updates;

    telegram::ensure_user_login(&client, &tg).await?;

    let mut engine = RouterEngine::new(router_cfg, Box::new(transport));

    let stream = client.stream_updates(
        updates_rx,
        grammers_client::UpdatesConfiguration {
            catch_up: true,
            update_queue_limit: Some(2048),
        },
    );
    let (tx, mut rx) = mpsc::channel(INBOUND_QUEUE);
    let pump = spawn_update_pump(stream, tx);

    let shutdown = async {
        if let Err(e) = tokio::signal::ctrl_c().await {
            warn!("Failed to listen for Ctrl-C: {e}");
        }
        info!("Shutdown requested.");
    };

    info!("Running in live mode. Waiting for new messages...");
    drive(&mut engine, &mut rx, stats_interval(), shutdown).await;

    pump.abort();
    engine.shutdown();
    Ok(())
}

/// Owns the update stream so that `next()` always runs to completion; a
/// half-finished difference fetch is never dropped.
fn spawn_update_pump(
    mut stream: UpdateStream,
    tx: mpsc::Sender<InboundMessage>,
) -> JoinHandle<()> {
    tokio::spawn(async move {
        loop {
            let update = match stream.next().await {
                Ok(update) => update,
                Err(e) => {
                    warn!("Update stream ended: {e}");
                    break;
                }
            };

            let Some(inbound) = to_inbound(update) else {
                continue;
            };
            if tx.send(inbound).await.is_err() {
                break;
            }
        }
    })
}

fn to_inbound(update: Update) -> Option<InboundMessage> {
    let Update::NewMessage(msg) = update else {
        return None;
    };
    let peer = msg.peer().ok()?;
    let text = msg.text().trim();
    if text.is_empty() {
        debug!("Skipping message without text");
        return None;
    }

    Some(InboundMessage {
        text: text.to_string(),
        source_channel_id: peer.id().bare_id(),
        external_id: msg.id().to_string(),
        timestamp_ms: msg.date().timestamp_millis(),
        is_from_self: msg.outgoing(),
    })
}

/// Feed the engine until the inbound queue closes or `shutdown` resolves,
/// logging a snapshot every `stats_every`.  Returns how many messages were
/// processed.
async fn drive<F>(
    engine: &mut RouterEngine,
    inbound: &mut mpsc::Receiver<InboundMessage>,
    stats_every: Option<Duration>,
    shutdown: F,
) -> usize
where
    F: Future<Output = ()>,
{
    let mut stats_tick = tokio::time::interval(stats_every.unwrap_or(Duration::from_secs(300)));
    stats_tick.tick().await;
    tokio::pin!(shutdown);

    let mut handled = 0;
    loop {
        tokio::select! {
            _ = &mut shutdown => break,
            _ = stats_tick.tick(), if stats_every.is_some() => {
                info!("Stats: {}", engine.snapshot());
            }
            msg = inbound.recv() => {
                let Some(msg) = msg else {
                    info!("Inbound queue closed.");
                    break;
                };
                engine.process(&msg).await;
                handled += 1;
            }
        }
    }
    handled
}
