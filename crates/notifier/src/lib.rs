//! Notification delivery.
//!
//! The relay talks to its chat channel through [`MessageSender`]. The production
//! implementation is [`TelegramNotifier`], which calls the Bot API `sendMessage`
//! method. Each call is exactly one outbound attempt: no retries, no deduplication,
//! no rate limiting. Pacing is the caller's job.

use std::future::Future;
use std::time::Duration;

use serde::{Deserialize, Serialize};

use verdict_common::error::{DeliveryError, RelayError};

/// Something that can deliver a plain-text message to a chat.
pub trait MessageSender {
    fn notify(
        &self,
        chat_id: &str,
        text: &str,
    ) -> impl Future<Output = Result<(), DeliveryError>> + Send;
}

/// Telegram Bot API client. Built once at startup and reused for every message.
pub struct TelegramNotifier {
    http: reqwest::Client,
    api_url: String,
    token: String,
}

#[derive(Serialize)]
struct SendMessageRequest<'a> {
    chat_id: &'a str,
    text: &'a str,
}

#[derive(Deserialize)]
struct BotApiResponse {
    ok: bool,
    #[serde(default)]
    description: Option<String>,
}

impl TelegramNotifier {
    pub fn new(
        api_url: impl Into<String>,
        token: impl Into<String>,
        timeout: Duration,
    ) -> Result<Self, RelayError> {
        let http = reqwest::Client::builder()
            .timeout(timeout)
            .build()
            .map_err(|e| RelayError::Internal(format!("failed to build Telegram client: {e}")))?;

        Ok(Self {
            http,
            api_url: api_url.into(),
            token: token.into(),
        })
    }

    fn send_message_url(&self) -> String {
        format!(
            "{}/bot{}/sendMessage",
            self.api_url.trim_end_matches('/'),
            self.token
        )
    }
}

impl MessageSender for TelegramNotifier {
    async fn notify(&self, chat_id: &str, text: &str) -> Result<(), DeliveryError> {
        // The request URL embeds the bot token, so it is stripped from transport errors.
        let response = self
            .http
            .post(self.send_message_url())
            .json(&SendMessageRequest { chat_id, text })
            .send()
            .await
            .map_err(|e| DeliveryError::new(chat_id, e.without_url().to_string()))?;

        let status = response.status();
        let body = response.json::<BotApiResponse>().await;

        match body {
            Ok(BotApiResponse { ok: true, .. }) if status.is_success() => {
                tracing::info!(chat_id, "Message delivered");
                Ok(())
            }
            Ok(api) => Err(DeliveryError::new(
                chat_id,
                api.description
                    .unwrap_or_else(|| format!("Bot API rejected the message (HTTP {status})")),
            )),
            Err(_) => Err(DeliveryError::new(
                chat_id,
                format!("unreadable Bot API response (HTTP {status})"),
            )),
        }
    }
}
