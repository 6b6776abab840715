//! The poll loop: fetch, validate, notify, sleep, forever.

use std::{sync::Arc, time::Duration};

use tokio::time::sleep;

use crate::{
    alerts::AlertForwarder,
    domain::{ChatId, Cursor},
    homework::{check_response, current_date, parse_status},
    messaging::port::MessagingPort,
    ports::HomeworkSource,
    utils::unix_now,
    Result,
};

/// What one iteration did.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
pub struct TickReport {
    pub sent: usize,
    pub duplicates: usize,
}

pub struct Poller {
    source: Arc<dyn HomeworkSource>,
    messenger: Arc<dyn MessagingPort>,
    chat_id: ChatId,
    retry_time: Duration,
    cursor: Cursor,
    last_message: Option<String>,
}

impl Poller {
    pub fn new(
        source: Arc<dyn HomeworkSource>,
        messenger: Arc<dyn MessagingPort>,
        chat_id: ChatId,
        retry_time: Duration,
        start: i64,
    ) -> Self {
        Self {
            source,
            messenger,
            chat_id,
            retry_time,
            cursor: Cursor::new(start),
            last_message: None,
        }
    }

    pub fn cursor(&self) -> Cursor {
        self.cursor
    }

    pub fn last_message(&self) -> Option<&str> {
        self.last_message.as_deref()
    }

    /// Run one iteration. `now` is the time the request is issued.
    ///
    /// The first failing step aborts the iteration and leaves the cursor
    /// where it was, so the same window is fetched again next time.
    pub async fn tick(&mut self, now: i64) -> Result<TickReport> {
        let response = self.source.fetch(self.cursor.get()).await?;
        tracing::info!("checking API response");
        let homeworks = check_response(&response)?;
        let next_cursor = current_date(&response).unwrap_or(now);

        let mut report = TickReport::default();
        if homeworks.is_empty() {
            tracing::debug!("no new statuses in API response");
        }

        for homework in homeworks {
            let message = parse_status(homework)?;
            if self.send_if_new(&message).await? {
                report.sent += 1;
            } else {
                report.duplicates += 1;
            }
        }

        self.cursor.advance_to(next_cursor);
        Ok(report)
    }

    /// Send unless identical to the last message sent. Returns whether a
    /// message went out.
    async fn send_if_new(&mut self, message: &str) -> Result<bool> {
        if self.last_message.as_deref() == Some(message) {
            tracing::debug!("message not sent, identical to the previous one");
            return Ok(false);
        }

        self.messenger.send_text(self.chat_id, message).await?;
        tracing::info!(chat_id = self.chat_id.0, "message sent to Telegram");
        self.last_message = Some(message.to_string());
        Ok(true)
    }

    /// Poll forever with a fixed delay between iterations.
    pub async fn run(&mut self, mut alerts: Option<AlertForwarder>) {
        tracing::info!(
            retry_secs = self.retry_time.as_secs(),
            from_date = self.cursor.get(),
            "polling started"
        );

        loop {
            match self.tick(unix_now()).await {
                Ok(report) => tracing::debug!(
                    sent = report.sent,
                    duplicates = report.duplicates,
                    "iteration finished without errors"
                ),
                Err(e) => tracing::error!(
                    forward = e.forward_to_chat(),
                    kind = ?e.kind(),
                    "{e}"
                ),
            }

            if let Some(fwd) = alerts.as_mut() {
                fwd.flush(self.messenger.as_ref()).await;
            }

            sleep(self.retry_time).await;
        }
    }
}
