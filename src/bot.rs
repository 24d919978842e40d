//! Outbound transports: the Telegram Bot API and a dry-run printer.

use anyhow::{Context, Result, anyhow};
use async_trait::async_trait;
use reqwest::Client as HttpClient;
use serde::{Deserialize, Serialize};
use std::time::Duration;
use tracing::{debug, info};

use crate::config::ChannelId;
use crate::delivery::Transport;

// ---------------------------------------------------------------------------
// Bot API
// ---------------------------------------------------------------------------

#[derive(Serialize)]
struct SendMessagePayload<'a> {
    chat_id: i64,
    text: &'a str,
    disable_web_page_preview: bool,
}

#[derive(Deserialize)]
struct ApiResponse {
    ok: bool,
    description: Option<String>,
}

/// Posts leads into destination chats through `sendMessage`.
#[derive(Clone)]
pub struct BotApiTransport {
    http: HttpClient,
    token: String,
}

impl BotApiTransport {
    pub fn new(token: impl Into<String>) -> Result<Self> {
        let http = HttpClient::builder()
            .connect_timeout(Duration::from_secs(10))
            .build()
            .context("failed to build HTTP client")?;
        Ok(Self {
            http,
            token: token.into(),
        })
    }

    pub fn from_env() -> Result<Self> {
        let token =
            std::env::var("BOT_TOKEN").map_err(|_| anyhow!("Missing env var BOT_TOKEN"))?;
        Self::new(token)
    }
}

#[async_trait]
impl Transport for BotApiTransport {
    async fn send(&self, channel_id: ChannelId, text: &str) -> Result<()> {
        let url = format!("https://api.telegram.org/bot{}/sendMessage", self.token);
        let body = SendMessagePayload {
            chat_id: channel_id,
            text,
            disable_web_page_preview: true,
        };
        let resp = self.http.post(&url).json(&body).send().await?;
        let status = resp.status();
        if !status.is_success() {
            let raw = resp.text().await.unwrap_or_default();
            let reason = serde_json::from_str::<ApiResponse>(&raw)
                .ok()
                .and_then(|r| r.description)
                .unwrap_or(raw);
            return Err(anyhow!("sendMessage failed: {status} {reason}"));
        }
        let parsed: ApiResponse = resp
            .json()
            .await
            .context("unreadable sendMessage response")?;
        if !parsed.ok {
            return Err(anyhow!(
                "sendMessage returned ok=false: {}",
                parsed.description.unwrap_or_default()
            ));
        }
        debug!("sendMessage ok for chat_id={channel_id}");
        Ok(())
    }
}

// ---------------------------------------------------------------------------
// Dry run
// ---------------------------------------------------------------------------

/// Prints what would have been sent.  Used by replays without broadcast.
#[derive(Clone, Copy, Default)]
pub struct DryRunTransport;

#[async_trait]
impl Transport for DryRunTransport {
    async fn send(&self, channel_id: ChannelId, text: &str) -> Result<()> {
        info!("[dry-run] → {channel_id}");
        println!("\n[REPLAY → {channel_id}]\n{text}\n");
        Ok(())
    }
}
