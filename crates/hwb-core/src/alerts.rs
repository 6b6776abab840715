//! Duplicate error-level log events into the chat.
//!
//! `AlertLayer` sits in the tracing subscriber and queues every ERROR event.
//! The poll loop owns the `AlertForwarder` and drains the queue between
//! iterations, so alerts go out on the same thread of control as
//! notifications. Events recorded with `forward = false` stay in the logs only.

use std::fmt::{self, Write as _};

use chrono::{DateTime, Local};
use tokio::sync::mpsc;
use tracing::{
    field::{Field, Visit},
    Event, Level, Subscriber,
};
use tracing_subscriber::{layer::Context, Layer};

use crate::{domain::ChatId, messaging::port::MessagingPort, utils::alert_timestamp};

/// Field name that opts an event out of forwarding.
pub const FORWARD_FIELD: &str = "forward";

#[derive(Clone, Debug)]
pub struct Alert {
    pub at: DateTime<Local>,
    pub level: Level,
    pub line: Option<u32>,
    pub message: String,
}

impl Alert {
    /// Warning sign, then date, time, level and `<line> <message>` on
    /// separate lines.
    pub fn format(&self) -> String {
        let (date, time) = alert_timestamp(self.at);
        let mut out = format!("⚠\n{date}\n{time}\n{}\n", self.level);
        if let Some(line) = self.line {
            let _ = write!(out, "{line} ");
        }
        out.push_str(&self.message);
        out
    }
}

pub fn channel() -> (AlertLayer, AlertQueue) {
    let (tx, rx) = mpsc::unbounded_channel();
    (AlertLayer { tx }, AlertQueue { rx })
}

pub struct AlertLayer {
    tx: mpsc::UnboundedSender<Alert>,
}

pub struct AlertQueue {
    rx: mpsc::UnboundedReceiver<Alert>,
}

impl<S: Subscriber> Layer<S> for AlertLayer {
    fn on_event(&self, event: &Event<'_>, _ctx: Context<'_, S>) {
        let meta = event.metadata();
        if *meta.level() != Level::ERROR {
            return;
        }

        let mut visitor = AlertVisitor::default();
        event.record(&mut visitor);
        if !visitor.forward {
            return;
        }

        let alert = Alert {
            at: Local::now(),
            level: *meta.level(),
            line: meta.line(),
            message: visitor.finish(),
        };
        // Receiver gone means alerting is off.
        let _ = self.tx.send(alert);
    }
}

struct AlertVisitor {
    message: String,
    fields: String,
    forward: bool,
}

impl Default for AlertVisitor {
    fn default() -> Self {
        Self {
            message: String::new(),
            fields: String::new(),
            forward: true,
        }
    }
}

impl AlertVisitor {
    fn push_field(&mut self, name: &str, value: &dyn fmt::Display) {
        let _ = write!(self.fields, " {name}={value}");
    }

    fn finish(self) -> String {
        let mut out = self.message;
        out.push_str(&self.fields);
        out.trim().to_string()
    }
}

impl Visit for AlertVisitor {
    fn record_bool(&mut self, field: &Field, value: bool) {
        if field.name() == FORWARD_FIELD {
            self.forward = value;
            return;
        }
        self.push_field(field.name(), &value);
    }

    fn record_str(&mut self, field: &Field, value: &str) {
        if field.name() == "message" {
            self.message.push_str(value);
            return;
        }
        self.push_field(field.name(), &value);
    }

    fn record_debug(&mut self, field: &Field, value: &dyn fmt::Debug) {
        if field.name() == "message" {
            let _ = write!(self.message, "{value:?}");
            return;
        }
        let _ = write!(self.fields, " {}={value:?}", field.name());
    }
}

/// Sends queued alerts to the chat, skipping an alert identical to the
/// previous one. The timestamp is not part of the comparison.
pub struct AlertForwarder {
    queue: AlertQueue,
    chat_id: ChatId,
    last: Option<(Level, Option<u32>, String)>,
}

impl AlertForwarder {
    pub fn new(queue: AlertQueue, chat_id: ChatId) -> Self {
        Self {
            queue,
            chat_id,
            last: None,
        }
    }

    /// Drain everything queued so far. Returns the number of alerts sent.
    pub async fn flush(&mut self, messenger: &dyn MessagingPort) -> usize {
        let mut sent = 0usize;
        while let Ok(alert) = self.queue.rx.try_recv() {
            let is_repeat = self.last.as_ref().is_some_and(|(level, line, message)| {
                *level == alert.level && *line == alert.line && *message == alert.message
            });
            if is_repeat {
                continue;
            }

            match messenger.send_text(self.chat_id, &alert.format()).await {
                Ok(()) => {
                    self.last = Some((alert.level, alert.line, alert.message));
                    sent += 1;
                }
                Err(e) => {
                    tracing::error!(forward = false, error = %e, "failed to forward alert");
                }
            }
        }
        sent
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::messaging::fake::FakeMessenger;
    use chrono::TimeZone;
    use tracing_subscriber::layer::SubscriberExt;

    fn alert(message: &str) -> Alert {
        Alert {
            at: Local.with_ymd_and_hms(2024, 3, 9, 7, 5, 1).unwrap(),
            level: Level::ERROR,
            line: Some(42),
            message: message.to_string(),
        }
    }

    #[test]
    fn format_puts_parts_on_separate_lines() {
        assert_eq!(
            alert("API connection error").format(),
            "⚠\n2024-03-09\n07:05:01\nERROR\n42 API connection error"
        );
    }

    #[test]
    fn layer_queues_error_events_only() {
        let (layer, mut queue) = channel();
        let subscriber = tracing_subscriber::registry().with(layer);
        tracing::subscriber::with_default(subscriber, || {
            tracing::info!("poll ok");
            tracing::warn!("slow");
            tracing::error!(kind = "Transport", "incorrect answer from API");
            tracing::error!(forward = false, "telegram is down");
        });

        let got = queue.rx.try_recv().unwrap();
        assert_eq!(got.level, Level::ERROR);
        assert_eq!(got.message, "incorrect answer from API kind=Transport");
        assert!(queue.rx.try_recv().is_err());
    }

    #[tokio::test]
    async fn forwarder_skips_consecutive_duplicates() {
        let (layer, queue) = channel();
        let tx = layer.tx.clone();
        let mut fwd = AlertForwarder::new(queue, ChatId(7));
        let api = FakeMessenger::new();

        tx.send(alert("boom")).unwrap();
        tx.send(alert("boom")).unwrap();
        tx.send(alert("other")).unwrap();
        assert_eq!(fwd.flush(&api).await, 2);

        tx.send(alert("other")).unwrap();
        assert_eq!(fwd.flush(&api).await, 0);

        tx.send(alert("boom")).unwrap();
        assert_eq!(fwd.flush(&api).await, 1);

        let sends = api.sends.lock().unwrap();
        assert_eq!(sends.len(), 3);
        assert!(sends.iter().all(|(chat, _)| *chat == ChatId(7)));
    }

    #[tokio::test]
    async fn same_error_at_a_later_time_is_sent_once() {
        let (layer, queue) = channel();
        let mut fwd = AlertForwarder::new(queue, ChatId(7));
        let api = FakeMessenger::new();

        let first = alert("API connection error");
        let mut later = first.clone();
        later.at = Local.with_ymd_and_hms(2024, 3, 9, 7, 15, 1).unwrap();

        layer.tx.send(first).unwrap();
        assert_eq!(fwd.flush(&api).await, 1);
        layer.tx.send(later).unwrap();
        assert_eq!(fwd.flush(&api).await, 0);

        let mut other_line = alert("API connection error");
        other_line.line = Some(43);
        layer.tx.send(other_line).unwrap();
        assert_eq!(fwd.flush(&api).await, 1);
        assert_eq!(api.texts().len(), 2);
    }

    #[tokio::test]
    async fn failed_alert_is_retried_next_time() {
        let (layer, queue) = channel();
        let mut fwd = AlertForwarder::new(queue, ChatId(7));
        let api = FakeMessenger::failing();

        layer.tx.send(alert("boom")).unwrap();
        assert_eq!(fwd.flush(&api).await, 0);

        api.set_failing(false);
        layer.tx.send(alert("boom")).unwrap();
        assert_eq!(fwd.flush(&api).await, 1);
    }
}
