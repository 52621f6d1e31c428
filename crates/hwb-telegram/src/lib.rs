//! Telegram adapter (teloxide).
//!
//! This crate implements the `hwb-core` Notifier port over Telegram Bot API.

use async_trait::async_trait;

use teloxide::{prelude::*, types::Recipient};

use tokio::time::sleep;

use hwb_core::{domain::ChatTarget, errors::Error, ports::Notifier, Result};

#[derive(Clone)]
pub struct TelegramNotifier {
    bot: Bot,
}

impl TelegramNotifier {
    pub fn new(token: impl Into<String>) -> Self {
        Self::from_bot(Bot::new(token))
    }

    pub fn from_bot(bot: Bot) -> Self {
        Self { bot }
    }

    /// Best-effort startup probe: the bot's `@username`, if the token works.
    pub async fn username(&self) -> Option<String> {
        match self.bot.get_me().await {
            Ok(me) => Some(me.username().to_string()),
            Err(e) => {
                tracing::warn!("telegram getMe failed: {e}");
                None
            }
        }
    }

    fn recipient(chat: &ChatTarget) -> Recipient {
        match chat {
            ChatTarget::Id(id) => Recipient::Id(teloxide::types::ChatId(*id)),
            ChatTarget::Username(name) => Recipient::ChannelUsername(name.clone()),
        }
    }

    fn map_err(e: teloxide::RequestError) -> Error {
        Error::Send(format!("telegram error: {e}"))
    }

    async fn with_retry<T, Fut>(&self, mut op: impl FnMut() -> Fut) -> Result<T>
    where
        Fut: std::future::IntoFuture<Output = std::result::Result<T, teloxide::RequestError>>,
        Fut::IntoFuture: Send,
    {
        const MAX_RETRIES: usize = 1;
        let mut attempts = 0usize;
        loop {
            match op().await {
                Ok(v) => return Ok(v),
                Err(e) => match e {
                    teloxide::RequestError::RetryAfter(d) if attempts < MAX_RETRIES => {
                        attempts += 1;
                        tracing::warn!("telegram flood control, retrying in {d:?}");
                        sleep(d).await;
                        continue;
                    }
                    other => return Err(Self::map_err(other)),
                },
            }
        }
    }
}

#[async_trait]
impl Notifier for TelegramNotifier {
    async fn send_text(&self, chat: &ChatTarget, text: &str) -> Result<()> {
        self.with_retry(|| {
            self.bot
                .send_message(Self::recipient(chat), text.to_string())
        })
        .await?;
        Ok(())
    }
}
