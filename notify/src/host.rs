// Host notification service abstraction
//
// The device notification API is reached through the narrow NotificationHost
// capability trait so the scheduling engine can be exercised against an
// in-memory implementation instead of a real device service.

use crate::errors::HostError;
use crate::models::{ChannelSettings, NotificationContent, NotificationPayload, PermissionStatus};
use async_trait::async_trait;
use std::collections::HashMap;
use std::sync::Mutex;
use uuid::Uuid;

/// Opaque handle identifying a queued notification with the host
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct ScheduleHandle(pub Uuid);

/// A request as the host sees it after acceptance
#[derive(Debug, Clone)]
pub struct QueuedNotification {
    pub handle: ScheduleHandle,
    pub deliver_after_seconds: u64,
    pub content: NotificationContent,
    pub payload: NotificationPayload,
}

/// NotificationHost is the capability interface over the device's local
/// notification service.
#[cfg_attr(test, mockall::automock)]
#[async_trait]
pub trait NotificationHost: Send + Sync {
    /// Queue a notification for delivery `seconds` from now
    async fn schedule_after(
        &self,
        seconds: u64,
        content: NotificationContent,
        payload: NotificationPayload,
    ) -> Result<ScheduleHandle, HostError>;

    /// Drop every queued notification
    async fn cancel_all(&self) -> Result<(), HostError>;

    /// Snapshot of the currently queued notifications
    async fn list_scheduled(&self) -> Result<Vec<QueuedNotification>, HostError>;

    /// Current permission state without prompting the user
    async fn permission_status(&self) -> Result<PermissionStatus, HostError>;

    /// Prompt the user for permission and report the resulting state
    async fn request_permission(&self) -> Result<PermissionStatus, HostError>;

    /// Create or update a notification channel (no-op on platforms without
    /// channels)
    async fn configure_channel(
        &self,
        id: &str,
        settings: &ChannelSettings,
    ) -> Result<(), HostError>;
}

#[derive(Debug)]
struct HostState {
    queue: Vec<QueuedNotification>,
    permission: PermissionStatus,
    grant_on_request: bool,
    channels: HashMap<String, ChannelSettings>,
    submissions_attempted: usize,
    fail_submissions_from: Option<usize>,
}

/// In-memory NotificationHost used by tests and local development.
///
/// Mirrors the host contract: submissions fail when permission is absent,
/// and failure injection can make the nth and later submissions fail.
pub struct InMemoryHost {
    state: Mutex<HostState>,
}

impl InMemoryHost {
    /// Host with permission already granted
    pub fn new() -> Self {
        Self::with_permission(PermissionStatus::Granted, true)
    }

    /// Host with an explicit initial permission state; `grant_on_request`
    /// controls whether the simulated prompt succeeds
    pub fn with_permission(permission: PermissionStatus, grant_on_request: bool) -> Self {
        Self {
            state: Mutex::new(HostState {
                queue: Vec::new(),
                permission,
                grant_on_request,
                channels: HashMap::new(),
                submissions_attempted: 0,
                fail_submissions_from: None,
            }),
        }
    }

    /// Make the `from`-th submission (1-based) and every later one fail
    pub fn fail_submissions_from(self, from: usize) -> Self {
        self.state.lock().unwrap().fail_submissions_from = Some(from);
        self
    }

    /// Number of schedule_after calls attempted, including rejected ones
    pub fn submissions_attempted(&self) -> usize {
        self.state.lock().unwrap().submissions_attempted
    }

    /// Channel settings registered under `id`, if any
    pub fn channel(&self, id: &str) -> Option<ChannelSettings> {
        self.state.lock().unwrap().channels.get(id).cloned()
    }
}

impl Default for InMemoryHost {
    fn default() -> Self {
        Self::new()
    }
}

#[async_trait]
impl NotificationHost for InMemoryHost {
    async fn schedule_after(
        &self,
        seconds: u64,
        content: NotificationContent,
        payload: NotificationPayload,
    ) -> Result<ScheduleHandle, HostError> {
        let mut state = self.state.lock().unwrap();
        state.submissions_attempted += 1;

        if let Some(from) = state.fail_submissions_from {
            if state.submissions_attempted >= from {
                return Err(HostError::SubmissionRejected(
                    "injected submission failure".to_string(),
                ));
            }
        }
        if state.permission != PermissionStatus::Granted {
            return Err(HostError::PermissionDenied);
        }

        let handle = ScheduleHandle(Uuid::new_v4());
        state.queue.push(QueuedNotification {
            handle,
            deliver_after_seconds: seconds,
            content,
            payload,
        });
        Ok(handle)
    }

    async fn cancel_all(&self) -> Result<(), HostError> {
        self.state.lock().unwrap().queue.clear();
        Ok(())
    }

    async fn list_scheduled(&self) -> Result<Vec<QueuedNotification>, HostError> {
        Ok(self.state.lock().unwrap().queue.clone())
    }

    async fn permission_status(&self) -> Result<PermissionStatus, HostError> {
        Ok(self.state.lock().unwrap().permission)
    }

    async fn request_permission(&self) -> Result<PermissionStatus, HostError> {
        let mut state = self.state.lock().unwrap();
        if state.permission != PermissionStatus::Granted && state.grant_on_request {
            state.permission = PermissionStatus::Granted;
        } else if state.permission == PermissionStatus::Undetermined {
            state.permission = PermissionStatus::Denied;
        }
        Ok(state.permission)
    }

    async fn configure_channel(
        &self,
        id: &str,
        settings: &ChannelSettings,
    ) -> Result<(), HostError> {
        self.state
            .lock()
            .unwrap()
            .channels
            .insert(id.to_string(), settings.clone());
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::models::FireTag;

    fn content() -> NotificationContent {
        NotificationContent {
            title: "Aspirin".to_string(),
            body: "Take after meal".to_string(),
        }
    }

    fn payload(tag: FireTag) -> NotificationPayload {
        NotificationPayload {
            name: "Aspirin".to_string(),
            date: "2024-01-01".to_string(),
            time: "10:05".to_string(),
            detail: Some("Take after meal".to_string()),
            tag,
        }
    }

    #[tokio::test]
    async fn test_schedule_and_list() {
        let host = InMemoryHost::new();
        host.schedule_after(300, content(), payload(FireTag::First))
            .await
            .unwrap();
        host.schedule_after(305, content(), payload(FireTag::Second))
            .await
            .unwrap();

        let queued = host.list_scheduled().await.unwrap();
        assert_eq!(queued.len(), 2);
        assert_eq!(queued[0].deliver_after_seconds, 300);
        assert_eq!(queued[1].deliver_after_seconds, 305);
    }

    #[tokio::test]
    async fn test_cancel_all_empties_queue() {
        let host = InMemoryHost::new();
        host.schedule_after(60, content(), payload(FireTag::First))
            .await
            .unwrap();
        host.cancel_all().await.unwrap();
        assert!(host.list_scheduled().await.unwrap().is_empty());
    }

    #[tokio::test]
    async fn test_submission_fails_without_permission() {
        let host = InMemoryHost::with_permission(PermissionStatus::Denied, false);
        let result = host
            .schedule_after(60, content(), payload(FireTag::First))
            .await;
        assert!(matches!(result, Err(HostError::PermissionDenied)));
        assert_eq!(host.submissions_attempted(), 1);
    }

    #[tokio::test]
    async fn test_failure_injection_counts_attempts() {
        let host = InMemoryHost::new().fail_submissions_from(2);
        host.schedule_after(60, content(), payload(FireTag::First))
            .await
            .unwrap();
        let second = host
            .schedule_after(65, content(), payload(FireTag::Second))
            .await;
        assert!(second.is_err());
        assert_eq!(host.submissions_attempted(), 2);
        assert_eq!(host.list_scheduled().await.unwrap().len(), 1);
    }

    #[tokio::test]
    async fn test_request_permission_grants_when_allowed() {
        let host = InMemoryHost::with_permission(PermissionStatus::Undetermined, true);
        let status = host.request_permission().await.unwrap();
        assert_eq!(status, PermissionStatus::Granted);
    }

    #[tokio::test]
    async fn test_request_permission_denies_when_refused() {
        let host = InMemoryHost::with_permission(PermissionStatus::Undetermined, false);
        let status = host.request_permission().await.unwrap();
        assert_eq!(status, PermissionStatus::Denied);
    }
}
