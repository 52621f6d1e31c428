use async_trait::async_trait;

use crate::{
    domain::{ChatTarget, Timestamp},
    Result,
};

/// Port for the homework review API.
///
/// Returns the raw JSON payload; its shape is validated by
/// [`crate::homework::check_response`], not by the adapter.
#[async_trait]
pub trait ReviewApi: Send + Sync {
    async fn homework_statuses(&self, from_date: Timestamp) -> Result<serde_json::Value>;
}

/// Port for the outbound chat channel.
///
/// Any delivery failure must come back as [`crate::Error::Send`].
#[async_trait]
pub trait Notifier: Send + Sync {
    async fn send_text(&self, chat: &ChatTarget, text: &str) -> Result<()>;
}
