// Reminder scheduling engine

use crate::errors::TriggerError;
use crate::host::{NotificationHost, QueuedNotification};
use crate::models::{
    ChannelSettings, FireTag, NotificationContent, NotificationPayload, PermissionStatus,
    ReminderInput, ScheduledNotificationRequest,
};
use crate::telemetry;
use crate::trigger;
use chrono::{Local, NaiveDateTime};
use std::sync::Arc;
use tracing::{error, info, instrument, warn};

/// Reinforcement policy: a second nudge fires this many seconds after the
/// first. Scheduled up front, not conditionally on the first's delivery.
pub const REINFORCEMENT_OFFSET_SECONDS: u64 = 5;

/// Notification body used when the reminder carries no detail text
pub const DEFAULT_BODY: &str = "Reminder";

/// Channel the reminder notifications are delivered on
pub const DEFAULT_CHANNEL_ID: &str = "default";

/// ReminderScheduler turns a reminder into a pair of delayed local
/// notifications queued with the host service.
///
/// Stateless: all queue state lives with the host, which is not tracked or
/// reconciled afterward.
pub struct ReminderScheduler<H: NotificationHost> {
    host: Arc<H>,
    channel_id: String,
    channel: ChannelSettings,
}

impl<H: NotificationHost> ReminderScheduler<H> {
    pub fn new(host: Arc<H>) -> Self {
        Self::with_channel(host, DEFAULT_CHANNEL_ID, ChannelSettings::default())
    }

    pub fn with_channel(host: Arc<H>, channel_id: impl Into<String>, channel: ChannelSettings) -> Self {
        Self {
            host,
            channel_id: channel_id.into(),
            channel,
        }
    }

    pub fn from_settings(host: Arc<H>, settings: &crate::config::Settings) -> Self {
        Self::with_channel(
            host,
            settings.notification.channel_id.clone(),
            settings.notification.channel.clone(),
        )
    }

    /// One-time host setup: verify or request permission, then configure the
    /// reminder channel. Call at process start, not per reminder.
    ///
    /// Returns false when permission ends up denied or setup fails; the
    /// scheduling path does not re-check permission and relies on the host
    /// rejecting submissions instead.
    #[instrument(skip(self))]
    pub async fn initialize(&self) -> bool {
        let status = match self.host.permission_status().await {
            Ok(PermissionStatus::Granted) => PermissionStatus::Granted,
            Ok(_) => match self.host.request_permission().await {
                Ok(status) => status,
                Err(e) => {
                    error!(error = %e, "Failed to request notification permission");
                    return false;
                }
            },
            Err(e) => {
                error!(error = %e, "Failed to read notification permission status");
                return false;
            }
        };

        if status != PermissionStatus::Granted {
            warn!(?status, "Notification permission not granted");
            return false;
        }

        if let Err(e) = self
            .host
            .configure_channel(&self.channel_id, &self.channel)
            .await
        {
            error!(error = %e, channel = %self.channel_id, "Failed to configure notification channel");
            return false;
        }

        true
    }

    /// Schedule the notification pair for a reminder relative to the current
    /// local time.
    ///
    /// On success exactly two notifications are queued, 5 seconds apart. On
    /// failure zero or one may remain queued; the pair is not atomic and no
    /// compensating cancellation is attempted.
    pub async fn schedule_local_notification(&self, reminder: &ReminderInput) -> bool {
        self.schedule_at(reminder, Local::now().naive_local()).await
    }

    /// Same as [`schedule_local_notification`] with an explicit reference
    /// instant, so tests control the clock.
    ///
    /// [`schedule_local_notification`]: Self::schedule_local_notification
    #[instrument(skip(self, reminder), fields(name = %reminder.name))]
    pub async fn schedule_at(&self, reminder: &ReminderInput, now: NaiveDateTime) -> bool {
        let delay = match trigger::trigger_delay(&reminder.date, &reminder.time, now) {
            Ok(delay) => delay,
            Err(TriggerError::PastOrImminent { seconds_until }) => {
                warn!(seconds_until, "Cannot schedule notification for past time");
                telemetry::record_schedule_failure("past_time");
                return false;
            }
            Err(e) => {
                warn!(error = %e, "Rejected malformed reminder date or time");
                telemetry::record_schedule_failure("invalid_input");
                return false;
            }
        };

        // Submissions are sequential: a first-submission failure must
        // short-circuit the second.
        for request in build_requests(reminder, delay) {
            let tag = request.payload.tag;
            if let Err(e) = self
                .host
                .schedule_after(request.deliver_after_seconds, request.content, request.payload)
                .await
            {
                error!(error = %e, ?tag, "Host rejected notification submission");
                telemetry::record_schedule_failure("host_submission");
                return false;
            }
        }

        info!(delay_seconds = delay, "Two notifications successfully scheduled");
        telemetry::record_schedule_success();
        true
    }

    /// Drop every notification queued with the host
    pub async fn cancel_all(&self) -> Result<(), crate::errors::HostError> {
        self.host.cancel_all().await
    }

    /// Snapshot of the host's current queue
    pub async fn list_scheduled(&self) -> Result<Vec<QueuedNotification>, crate::errors::HostError> {
        self.host.list_scheduled().await
    }
}

/// Build the notification pair for a reminder: the first at `delay`, the
/// second offset by [`REINFORCEMENT_OFFSET_SECONDS`].
pub fn build_requests(reminder: &ReminderInput, delay: u64) -> [ScheduledNotificationRequest; 2] {
    [
        build_request(reminder, delay, FireTag::First),
        build_request(
            reminder,
            delay + REINFORCEMENT_OFFSET_SECONDS,
            FireTag::Second,
        ),
    ]
}

fn build_request(
    reminder: &ReminderInput,
    deliver_after_seconds: u64,
    tag: FireTag,
) -> ScheduledNotificationRequest {
    // Blank detail falls back to the placeholder, same as absent
    let body = reminder
        .detail
        .as_deref()
        .filter(|detail| !detail.is_empty())
        .unwrap_or(DEFAULT_BODY)
        .to_string();

    ScheduledNotificationRequest {
        content: NotificationContent {
            title: reminder.name.clone(),
            body,
        },
        deliver_after_seconds,
        payload: NotificationPayload {
            name: reminder.name.clone(),
            date: reminder.date.clone(),
            time: reminder.time.clone(),
            detail: reminder.detail.clone(),
            tag,
        },
    }
}
