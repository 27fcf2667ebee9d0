//! Alert delivery to the caller.
//!
//! The sweep never broadcasts into ambient state. The caller hands it an
//! [`AlertSink`] and receives every simulated SMS through it.

use std::sync::Mutex;

use serde::Serialize;
use tokio::sync::mpsc;
use vigilant_shared::SmsEvent;

pub const EVENT_SMS_RECEIVED: &str = "vigilant-sms-received";
pub const EVENT_ALERT_SENT: &str = "vigilant-alert-sent";

/// Receives the sweep's output. Fire-and-forget: there is no acknowledgment.
pub trait AlertSink: Send + Sync {
    /// One simulated SMS was dispatched.
    fn sms_received(&self, event: &SmsEvent);

    /// Called once per sweep that dispatched at least one alert.
    fn alerts_sent(&self, _count: usize) {}
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(tag = "event", content = "detail")]
pub enum AlertEvent {
    #[serde(rename = "vigilant-sms-received")]
    SmsReceived(SmsEvent),
    #[serde(rename = "vigilant-alert-sent")]
    AlertsSent { count: usize },
}

impl AlertEvent {
    pub fn name(&self) -> &'static str {
        match self {
            Self::SmsReceived(_) => EVENT_SMS_RECEIVED,
            Self::AlertsSent { .. } => EVENT_ALERT_SENT,
        }
    }
}

/// Adapts a closure.
pub struct FnSink<F>(pub F);

impl<F> AlertSink for FnSink<F>
where
    F: Fn(&SmsEvent) + Send + Sync,
{
    fn sms_received(&self, event: &SmsEvent) {
        (self.0)(event)
    }
}

/// Forwards events into a channel; a dropped receiver only logs.
impl AlertSink for mpsc::UnboundedSender<AlertEvent> {
    fn sms_received(&self, event: &SmsEvent) {
        emit(self, AlertEvent::SmsReceived(event.clone()));
    }

    fn alerts_sent(&self, count: usize) {
        emit(self, AlertEvent::AlertsSent { count });
    }
}

fn emit(tx: &mpsc::UnboundedSender<AlertEvent>, event: AlertEvent) {
    let name = event.name();
    if let Err(e) = tx.send(event) {
        tracing::error!(event = name, error = %e, "Failed to emit event");
    }
}

/// Keeps every event in memory, in order.
///
/// Meant for tests, including the integration tests under `tests/`, which
/// cannot see `#[cfg(test)]` items. Front ends should use [`FnSink`] or a
/// channel instead.
#[doc(hidden)]
#[derive(Debug, Default)]
pub struct RecordingSink {
    events: Mutex<Vec<AlertEvent>>,
}

impl RecordingSink {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn events(&self) -> Vec<AlertEvent> {
        self.events.lock().map(|e| e.clone()).unwrap_or_default()
    }

    pub fn sms(&self) -> Vec<SmsEvent> {
        self.events()
            .into_iter()
            .filter_map(|e| match e {
                AlertEvent::SmsReceived(sms) => Some(sms),
                AlertEvent::AlertsSent { .. } => None,
            })
            .collect()
    }

    fn push(&self, event: AlertEvent) {
        if let Ok(mut events) = self.events.lock() {
            events.push(event);
        }
    }
}

impl AlertSink for RecordingSink {
    fn sms_received(&self, event: &SmsEvent) {
        self.push(AlertEvent::SmsReceived(event.clone()));
    }

    fn alerts_sent(&self, count: usize) {
        self.push(AlertEvent::AlertsSent { count });
    }
}
