//! Expiry sweep.
//!
//! One pass over the invoking user's items:
//!
//! 1. sync the user into the directory and resolve their phone number there,
//! 2. for every item compute the calendar days left until expiry,
//! 3. alert when `-GRACE_DAYS <= days <= reminder_days` and the item was not
//!    already alerted on today's local date,
//! 4. stamp alerted items, prepend the new log entries (capped), and hand
//!    every simulated SMS to the caller's [`AlertSink`].
//!
//! Items whose stored expiry date does not parse are skipped and counted.

use std::sync::Arc;

use chrono::{DateTime, FixedOffset, Local, NaiveDate, Utc};
use serde::Serialize;
use tokio::sync::Mutex;
use tracing::{debug, info, warn};
use uuid::Uuid;
use vigilant_shared::constants::SMS_SENDER_ID;
use vigilant_shared::{
    is_urgent, DeliveryStatus, Item, NotificationLogEntry, SmsEvent, UserProfile,
};

use crate::directory::DirectorySync;
use crate::error::Result;
use crate::events::AlertSink;
use crate::facade::{DataSource, PersistenceFacade};
use crate::message;

/// What one sweep did.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct SweepReport {
    /// The user's log after the sweep. Untouched (not re-read) when nothing
    /// was dispatched, so a non-empty log does not imply a dispatch.
    pub logs: Vec<NotificationLogEntry>,
    /// Alerts dispatched by this sweep.
    pub dispatched: usize,
    /// Items skipped because their expiry date is malformed.
    pub skipped_invalid: usize,
    /// Backend that served the item list.
    pub items_source: DataSource,
}

pub struct SweepEngine {
    facade: Arc<PersistenceFacade>,
    directory: DirectorySync,
    // Serialises sweeps so overlapping calls cannot drop each other's stamps.
    running: Mutex<()>,
}

impl SweepEngine {
    pub fn new(facade: Arc<PersistenceFacade>) -> Self {
        let directory = DirectorySync::new(facade.clone());
        Self {
            facade,
            directory,
            running: Mutex::new(()),
        }
    }

    /// Sweep at the current local time.
    pub async fn sweep(&self, user: &UserProfile, sink: &dyn AlertSink) -> Result<SweepReport> {
        self.sweep_at(user, Local::now().into(), sink).await
    }

    /// Sweep as if the wall clock read `now`. Calendar days are taken in
    /// `now`'s offset.
    pub async fn sweep_at(
        &self,
        user: &UserProfile,
        now: DateTime<FixedOffset>,
        sink: &dyn AlertSink,
    ) -> Result<SweepReport> {
        let _running = self.running.lock().await;

        let stamp = now.with_timezone(&Utc);
        let today = now.date_naive();

        self.directory.sync(user, stamp).await?;
        let recipient = self
            .directory
            .lookup(&user.id)
            .await?
            .value
            .map(|entry| entry.phone);

        let config = self.facade.get_config(&user.id)?.value;
        let existing = self.facade.list_logs(&user.id)?.value;
        let items = self.facade.list_items(&user.id).await?;

        let mut dispatches = Vec::new();
        let mut stamped: Vec<Item> = Vec::new();
        let mut skipped_invalid = 0;

        for mut item in items.value {
            if item.owner != user.id {
                continue;
            }

            let days = match item.days_remaining(today) {
                Ok(days) => days,
                Err(e) => {
                    warn!(item = %item.id, error = %e, "skipping item with invalid expiry date");
                    skipped_invalid += 1;
                    continue;
                }
            };

            if !is_urgent(days, item.reminder_days) {
                continue;
            }
            if notified_on(&item, today, &now.timezone()) {
                debug!(item = %item.id, "already alerted today");
                continue;
            }

            let Some(phone) = recipient.as_deref() else {
                debug!(item = %item.id, "owner has no phone in the directory, not alerting");
                continue;
            };
            if !config.sms_enabled {
                debug!(item = %item.id, "sms alerts disabled");
                continue;
            }

            sink.sms_received(&SmsEvent {
                body: message::sms_body(&item.name, days),
                from: SMS_SENDER_ID.to_string(),
                to: phone.to_string(),
                timestamp: stamp,
            });

            dispatches.push(NotificationLogEntry {
                id: format!("log-sms-{}", Uuid::new_v4().simple()),
                item_id: item.id.clone(),
                item_name: item.name.clone(),
                recipient: phone.to_string(),
                dispatched_at: stamp,
                content: message::log_content(&item.name, phone),
                status: DeliveryStatus::Delivered,
            });

            item.last_notified_at = Some(stamp);
            stamped.push(item);
        }

        for item in &stamped {
            self.facade.save_item(item).await?;
        }

        if dispatches.is_empty() {
            debug!(user = %user.id, skipped_invalid, "sweep finished, nothing to send");
            return Ok(SweepReport {
                logs: existing,
                dispatched: 0,
                skipped_invalid,
                items_source: items.source,
            });
        }

        let logs = self.facade.prepend_logs(&user.id, &dispatches)?.value;
        sink.alerts_sent(dispatches.len());

        info!(
            user = %user.id,
            dispatched = dispatches.len(),
            skipped_invalid,
            "sweep dispatched alerts"
        );

        Ok(SweepReport {
            logs,
            dispatched: dispatches.len(),
            skipped_invalid,
            items_source: items.source,
        })
    }
}

/// Whether `item` was last alerted on `today` as seen from `offset`.
fn notified_on(item: &Item, today: NaiveDate, offset: &FixedOffset) -> bool {
    item.last_notified_at
        .is_some_and(|ts| ts.with_timezone(offset).date_naive() == today)
}
