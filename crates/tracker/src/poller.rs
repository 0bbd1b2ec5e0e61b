use std::time::Duration;

use chrono::Utc;

use verdict_common::error::RelayError;
use verdict_notifier::MessageSender;

use crate::client::ReviewSource;
use crate::{validate, verdict};

/// Prefix of the chat message sent when a polling iteration fails.
const FAILURE_PREFIX: &str = "Сбой в работе программы";

/// Result of one successful polling iteration.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum PollOutcome {
    /// The newest homework's verdict was delivered.
    Notified,
    /// The API reported no homework updates since the cursor.
    NoUpdates,
    /// A verdict was produced but the chat channel refused it.
    DeliveryFailed,
}

/// Review poller that periodically fetches the newest homework status and relays
/// its verdict to a chat.
///
/// The poller exclusively owns the cursor: the Unix timestamp after which updates
/// are requested. It only ever moves to the `current_date` echoed by the server.
pub struct ReviewPoller<S, N> {
    source: S,
    notifier: N,
    chat_id: String,
    poll_interval: Duration,
    cursor: i64,
    /// Last failure report that reached the chat, used to avoid repeating it.
    last_reported_failure: Option<String>,
}

impl<S: ReviewSource, N: MessageSender> ReviewPoller<S, N> {
    pub fn new(source: S, notifier: N, chat_id: String, poll_interval: Duration) -> Self {
        Self {
            source,
            notifier,
            chat_id,
            poll_interval,
            cursor: Utc::now().timestamp(),
            last_reported_failure: None,
        }
    }

    /// Start from an explicit cursor instead of "now".
    pub fn with_cursor(mut self, cursor: i64) -> Self {
        self.cursor = cursor;
        self
    }

    pub fn cursor(&self) -> i64 {
        self.cursor
    }

    /// Start the polling loop. Runs until an unexpected (non-recoverable) error occurs
    /// or the task is cancelled.
    pub async fn run(&mut self) -> anyhow::Result<()> {
        tracing::info!(
            cursor = self.cursor,
            poll_interval_secs = self.poll_interval.as_secs(),
            "Review poller started"
        );

        loop {
            self.tick().await?;
            tokio::time::sleep(self.poll_interval).await;
        }
    }

    /// Run one guarded iteration.
    ///
    /// Recoverable failures are logged and reported to the chat; only an
    /// unexpected error is returned.
    pub async fn tick(&mut self) -> Result<(), RelayError> {
        match self.poll_once().await {
            Ok(PollOutcome::DeliveryFailed) => {}
            Ok(outcome) => {
                self.last_reported_failure = None;
                tracing::debug!(?outcome, cursor = self.cursor, "Polling iteration finished");
            }
            Err(e) if e.is_recoverable() => {
                tracing::error!(
                    error_kind = e.kind(),
                    error = %e,
                    cursor = self.cursor,
                    "Polling iteration failed"
                );
                self.report_failure(&e).await;
            }
            Err(e) => {
                tracing::error!(
                    error_kind = e.kind(),
                    error = %e,
                    "Unexpected error in review poller"
                );
                return Err(e);
            }
        }

        Ok(())
    }

    /// Fetch, validate, interpret and notify once, without any error handling.
    pub async fn poll_once(&mut self) -> Result<PollOutcome, RelayError> {
        let response = self.source.fetch_review_status(self.cursor).await?;

        if let Some(current_date) = validate::current_date(&response) {
            if current_date != self.cursor {
                tracing::info!(from = self.cursor, to = current_date, "Advancing cursor");
            }
            self.cursor = current_date;
        }

        let homeworks = validate::check_response(&response)?;
        let Some(latest) = homeworks.first() else {
            tracing::debug!(cursor = self.cursor, "No homework status updates");
            return Ok(PollOutcome::NoUpdates);
        };

        let message = verdict::describe_verdict(latest)?;

        match self.notifier.notify(&self.chat_id, &message).await {
            Ok(()) => Ok(PollOutcome::Notified),
            Err(e) => {
                tracing::error!(error = %e, "Failed to deliver verdict notification");
                Ok(PollOutcome::DeliveryFailed)
            }
        }
    }

    /// Best-effort chat report of an iteration failure.
    async fn report_failure(&mut self, error: &RelayError) {
        let message = format!("{FAILURE_PREFIX}: {error}");

        if self.last_reported_failure.as_deref() == Some(message.as_str()) {
            tracing::debug!(error_kind = error.kind(), "Failure already reported, skipping");
            return;
        }

        match self.notifier.notify(&self.chat_id, &message).await {
            Ok(()) => self.last_reported_failure = Some(message),
            Err(e) => tracing::error!(error = %e, "Failed to deliver failure report"),
        }
    }
}
