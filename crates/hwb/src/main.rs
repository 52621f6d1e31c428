use std::sync::Arc;

use anyhow::Context;
use tokio_util::sync::CancellationToken;

use hwb_core::{config::Config, poller::Poller};
use hwb_practicum::PracticumClient;
use hwb_telegram::TelegramNotifier;

#[tokio::main(flavor = "current_thread")]
async fn main() -> anyhow::Result<()> {
    hwb_core::logging::init("hwb")?;

    // Missing credentials end the process here, before any network call.
    let cfg = Arc::new(Config::load().context("startup configuration is incomplete")?);

    let api = Arc::new(PracticumClient::from_config(&cfg)?);
    let notifier = Arc::new(TelegramNotifier::new(cfg.telegram_bot_token.clone()));

    match notifier.username().await {
        Some(name) => tracing::info!("hwb started as @{name}"),
        None => tracing::info!("hwb started"),
    }
    tracing::info!("notifying chat {}", cfg.telegram_chat_id);

    let shutdown = CancellationToken::new();
    {
        let shutdown = shutdown.clone();
        tokio::spawn(async move {
            if tokio::signal::ctrl_c().await.is_ok() {
                tracing::info!("shutdown requested");
                shutdown.cancel();
            }
        });
    }

    let mut poller = Poller::new(cfg, api, notifier);
    poller.run(shutdown).await;

    Ok(())
}
