//! Telegram user session: the inbound side that watches source chats.

use anyhow::{Context, Result, anyhow};
use grammers_client::{Client, SignInError};
use grammers_mtsender::SenderPool;
use grammers_session::storages::SqliteSession;
use std::fmt;
use std::io::Write;
use std::sync::Arc;
use tokio::io::{self, AsyncBufReadExt};
use tracing::info;

#[derive(Clone)]
pub struct TgCfg {
    pub api_id: i32,
    pub api_hash: String,
    pub phone: String,
    pub two_fa_password: Option<String>,
    pub session_path: String,
}

impl TgCfg {
    pub fn from_env() -> Result<Self> {
        Ok(Self {
            api_id: must_env("TG_API_ID")?
                .parse()
                .context("TG_API_ID must be i32")?,
            api_hash: must_env("TG_API_HASH")?,
            phone: must_env("TG_PHONE")?,
            two_fa_password: std::env::var("TG_2FA_PASSWORD").ok(),
            session_path: std::env::var("TG_SESSION_PATH")
                .unwrap_or_else(|_| "./telegram.session.sqlite".into()),
        })
    }
}

impl fmt::Display for TgCfg {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let masked: String = self
            .phone
            .chars()
            .enumerate()
            .map(|(i, c)| if i + 4 < self.phone.len() { '*' } else { c })
            .collect();
        write!(
            f,
            "TgCfg(api_id={}, phone={masked}, session={}, 2fa={})",
            self.api_id,
            self.session_path,
            self.two_fa_password.is_some()
        )
    }
}

pub fn connect(cfg: &TgCfg) -> Result<(Client, SenderPool)> {
    let session = Arc::new(
        SqliteSession::open(&cfg.session_path)
            .with_context(|| format!("failed to open session {}", cfg.session_path))?,
    );
    let pool = SenderPool::new(Arc::clone(&session), cfg.api_id);
    let client = Client::new(&pool);
    Ok((client, pool))
}

/// Interactive login on first run; later runs reuse the stored session.
pub async fn ensure_user_login(client: &Client, cfg: &TgCfg) -> Result<()> {
    if client.is_authorized().await? {
        return Ok(());
    }

    info!("Session not authorized, requesting login code for {cfg}");
    let token = client
        .request_login_code(&cfg.phone, &cfg.api_hash)
        .await
        .context("request_login_code failed")?;

    let code = prompt("Enter the login code you received: ").await?;

    let password_token = match client.sign_in(&token, &code).await {
        Ok(user) => {
            info!("Signed in as {:?}", user.first_name().unwrap_or("<unknown>"));
            return Ok(());
        }
        Err(SignInError::PasswordRequired(password_token)) => password_token,
        Err(e) => return Err(anyhow!("sign_in failed: {e}")),
    };

    let password = match &cfg.two_fa_password {
        Some(pw) => pw.clone(),
        None => {
            let hint = password_token.hint().unwrap_or("");
            prompt(&format!("2FA password required (hint: {hint}): ")).await?
        }
    };
    client
        .check_password(password_token, password.as_bytes())
        .await
        .context("check_password failed")?;

    info!("Signed in with 2FA.");
    Ok(())
}

fn must_env(key: &str) -> Result<String> {
    std::env::var(key).map_err(|_| anyhow!("Missing env var {key}"))
}

async fn prompt(label: &str) -> Result<String> {
    print!("{label}");
    std::io::stdout().flush().ok();
    let mut line = String::new();
    io::BufReader::new(io::stdin())
        .read_line(&mut line)
        .await
        .context("failed to read from stdin")?;
    Ok(line.trim().to_string())
}
