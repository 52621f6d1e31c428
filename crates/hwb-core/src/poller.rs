//! Fixed-interval poll loop: fetch → validate → format → notify → sleep.
//!
//! Every failure after startup is caught here, logged, optionally relayed to
//! the chat, and the loop carries on with the next cycle.

use std::sync::Arc;

use serde_json::Value;
use tokio::time::sleep;
use tokio_util::sync::CancellationToken;

use crate::{
    config::Config,
    domain::Timestamp,
    homework::{check_response, parse_status},
    ports::{Notifier, ReviewApi},
    Error, Result,
};

pub const NO_CHANGES_MESSAGE: &str = "Статус домашних работ не изменился.";
pub const ERROR_RELAY_PREFIX: &str = "Сбой в работе программы";

/// Source of "now" for the poll cursor.
pub type Clock = Arc<dyn Fn() -> Timestamp + Send + Sync>;

/// Outcome of one poll cycle.
#[derive(Debug, Default)]
pub struct CycleReport {
    /// Messages delivered to the chat (status changes and the no-op notice).
    pub sent: usize,
    /// Failures caught during the cycle, in the order they happened.
    pub errors: Vec<Error>,
}

pub struct Poller {
    cfg: Arc<Config>,
    api: Arc<dyn ReviewApi>,
    notifier: Arc<dyn Notifier>,
    clock: Clock,
    cursor: Timestamp,
}

impl Poller {
    pub fn new(cfg: Arc<Config>, api: Arc<dyn ReviewApi>, notifier: Arc<dyn Notifier>) -> Self {
        Self::with_clock(cfg, api, notifier, Arc::new(Timestamp::now))
    }

    pub fn with_clock(
        cfg: Arc<Config>,
        api: Arc<dyn ReviewApi>,
        notifier: Arc<dyn Notifier>,
        clock: Clock,
    ) -> Self {
        let cursor = cfg.from_date.unwrap_or_else(|| clock());
        Self {
            cfg,
            api,
            notifier,
            clock,
            cursor,
        }
    }

    /// Lower bound of the next fetch.
    pub fn cursor(&self) -> Timestamp {
        self.cursor
    }

    /// Run cycles until `shutdown` fires. Never returns on its own.
    pub async fn run(&mut self, shutdown: CancellationToken) {
        tracing::info!(
            "polling {} every {:?} (from_date={})",
            self.cfg.endpoint,
            self.cfg.retry_interval,
            self.cursor
        );

        loop {
            let report = self.tick().await;
            tracing::debug!(
                "cycle done: sent={} errors={} next from_date={}",
                report.sent,
                report.errors.len(),
                self.cursor
            );

            tokio::select! {
                biased;
                _ = shutdown.cancelled() => break,
                _ = sleep(self.cfg.retry_interval) => {}
            }
        }

        tracing::info!("poll loop stopped");
    }

    /// One full cycle, including error handling and cursor advancement.
    ///
    /// The cursor moves to "now" whether or not the cycle succeeded.
    pub async fn tick(&mut self) -> CycleReport {
        let report = self.cycle().await;
        for err in &report.errors {
            self.handle_error(err).await;
        }
        self.cursor = (self.clock)();
        report
    }

    async fn cycle(&self) -> CycleReport {
        let mut report = CycleReport::default();

        let homeworks = match self.fetch().await {
            Ok(v) => v,
            Err(e) => {
                report.errors.push(e);
                return report;
            }
        };

        if homeworks.is_empty() {
            tracing::debug!("no homework updates since {}", self.cursor);
        }

        for homework in &homeworks {
            match parse_status(homework, &self.cfg.verdicts) {
                Ok(Some(message)) => self.deliver(&message, &mut report).await,
                Ok(None) => {}
                Err(e) => report.errors.push(e),
            }
        }

        if self.cfg.notify_unchanged && report.sent == 0 && report.errors.is_empty() {
            self.deliver(NO_CHANGES_MESSAGE, &mut report).await;
        }

        report
    }

    async fn fetch(&self) -> Result<Vec<Value>> {
        let payload = self.api.homework_statuses(self.cursor).await?;
        check_response(payload)
    }

    async fn deliver(&self, message: &str, report: &mut CycleReport) {
        match self
            .notifier
            .send_text(&self.cfg.telegram_chat_id, message)
            .await
        {
            Ok(()) => {
                tracing::info!("message sent to chat {}", self.cfg.telegram_chat_id);
                report.sent += 1;
            }
            Err(e) => report.errors.push(e),
        }
    }

    async fn handle_error(&self, err: &Error) {
        tracing::error!(kind = %err.kind(), "{err}");

        if !self.cfg.relay_errors || !err.is_relayable() {
            return;
        }
        if let Err(e) = self
            .notifier
            .send_text(&self.cfg.telegram_chat_id, &relay_text(err))
            .await
        {
            tracing::error!("failed to relay error to chat: {e}");
        }
    }
}

/// Chat text for a relayed error.
pub fn relay_text(err: &Error) -> String {
    format!("{ERROR_RELAY_PREFIX}: {err}")
}
