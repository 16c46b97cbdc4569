use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

// ============================================================================
// Reminder Models
// ============================================================================

/// ReminderInput is the user-entered reminder a screen hands to the scheduler
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct ReminderInput {
    /// Display name, used as the notification title
    pub name: String,
    /// Calendar date in `YYYY-MM-DD` form
    pub date: String,
    /// 24-hour clock time in `HH:MM` form
    pub time: String,
    /// Optional free text, used as the notification body
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub detail: Option<String>,
}

/// Distinguishes the two fired instances of a single reminder
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq)]
#[serde(rename_all = "lowercase")]
pub enum FireTag {
    First,
    Second,
}

/// User-visible part of a notification request
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct NotificationContent {
    pub title: String,
    pub body: String,
}

/// Opaque payload carried through the host queue and returned on delivery
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct NotificationPayload {
    pub name: String,
    pub date: String,
    pub time: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub detail: Option<String>,
    pub tag: FireTag,
}

/// A fully built request handed to the host notification service
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct ScheduledNotificationRequest {
    pub content: NotificationContent,
    /// Seconds from "now" until delivery
    pub deliver_after_seconds: u64,
    pub payload: NotificationPayload,
}

// ============================================================================
// Host Service Models
// ============================================================================

/// Notification permission state as reported by the host service
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq)]
#[serde(rename_all = "snake_case")]
pub enum PermissionStatus {
    Granted,
    Denied,
    Undetermined,
}

/// Notification channel importance levels
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq)]
#[serde(rename_all = "snake_case")]
pub enum ChannelImportance {
    Max,
    High,
    Default,
    Low,
    Min,
}

/// Lockscreen visibility for a notification channel
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq)]
#[serde(rename_all = "snake_case")]
pub enum LockscreenVisibility {
    Public,
    Private,
    Secret,
}

/// ChannelSettings configure the host notification channel used for reminders
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct ChannelSettings {
    pub importance: ChannelImportance,
    /// Vibration pattern in milliseconds (off/on alternating)
    pub vibration_pattern: Vec<u64>,
    /// LED color as `#RRGGBB` or `#AARRGGBB`
    pub light_color: String,
    pub lockscreen_visibility: LockscreenVisibility,
}

impl Default for ChannelSettings {
    fn default() -> Self {
        Self {
            importance: ChannelImportance::Max,
            vibration_pattern: vec![0, 250, 250, 250],
            light_color: "#FF231F7C".to_string(),
            lockscreen_visibility: LockscreenVisibility::Public,
        }
    }
}

// ============================================================================
// Record Models
// ============================================================================

/// Category of a reminder record
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq)]
#[serde(rename_all = "lowercase")]
pub enum ReminderKind {
    Medicine,
    Doctor,
    Vaccination,
    Other,
}

/// Category of a prescription record
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq)]
#[serde(rename_all = "lowercase")]
pub enum PrescriptionKind {
    Medicine,
    #[serde(rename = "x-ray")]
    XRay,
    Mri,
    Lab,
    Other,
}

/// ReminderRecord is the validated reminder persisted to the document store
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct ReminderRecord {
    pub name: String,
    pub kind: ReminderKind,
    pub date: String,
    pub time: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub detail: Option<String>,
}

impl ReminderRecord {
    /// The scheduler input derived from this record
    pub fn reminder_input(&self) -> ReminderInput {
        ReminderInput {
            name: self.name.clone(),
            date: self.date.clone(),
            time: self.time.clone(),
            detail: self.detail.clone(),
        }
    }
}

/// PrescriptionRecord is the validated prescription persisted to the document store
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct PrescriptionRecord {
    pub name: String,
    pub doctor: String,
    pub detail: String,
    pub kind: PrescriptionKind,
    /// Attached photo as a `data:image/jpeg;base64,` data URI
    pub image_base64: String,
    pub created_at: DateTime<Utc>,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_fire_tag_serializes_lowercase() {
        assert_eq!(serde_json::to_string(&FireTag::First).unwrap(), "\"first\"");
        assert_eq!(
            serde_json::to_string(&FireTag::Second).unwrap(),
            "\"second\""
        );
    }

    #[test]
    fn test_reminder_input_omits_absent_detail() {
        let input = ReminderInput {
            name: "Aspirin".to_string(),
            date: "2024-01-01".to_string(),
            time: "10:05".to_string(),
            detail: None,
        };
        let json = serde_json::to_value(&input).unwrap();
        assert!(json.get("detail").is_none());
    }

    #[test]
    fn test_prescription_kind_xray_rename() {
        assert_eq!(
            serde_json::to_string(&PrescriptionKind::XRay).unwrap(),
            "\"x-ray\""
        );
        let parsed: PrescriptionKind = serde_json::from_str("\"x-ray\"").unwrap();
        assert_eq!(parsed, PrescriptionKind::XRay);
    }

    #[test]
    fn test_default_channel_settings() {
        let settings = ChannelSettings::default();
        assert_eq!(settings.importance, ChannelImportance::Max);
        assert_eq!(settings.vibration_pattern, vec![0, 250, 250, 250]);
        assert_eq!(settings.light_color, "#FF231F7C");
        assert_eq!(
            settings.lockscreen_visibility,
            LockscreenVisibility::Public
        );
    }

    #[test]
    fn test_reminder_record_to_input() {
        let record = ReminderRecord {
            name: "Aspirin".to_string(),
            kind: ReminderKind::Medicine,
            date: "2024-01-01".to_string(),
            time: "10:05".to_string(),
            detail: Some("Take after meal".to_string()),
        };
        let input = record.reminder_input();
        assert_eq!(input.name, "Aspirin");
        assert_eq!(input.detail.as_deref(), Some("Take after meal"));
    }
}
