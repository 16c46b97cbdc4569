// Record capture: form validation, document store boundary, and the save
// flows the add-reminder and add-prescription screens drive.

use crate::errors::{SaveError, StoreError, ValidationError};
use crate::host::NotificationHost;
use crate::models::{PrescriptionKind, PrescriptionRecord, ReminderKind, ReminderRecord};
use crate::scheduler::ReminderScheduler;
use crate::trigger;
use async_trait::async_trait;
use base64::{engine::general_purpose::STANDARD as BASE64, Engine as _};
use chrono::Utc;
use serde::Deserialize;
use std::sync::Mutex;
use tracing::{error, info, instrument, warn};
use uuid::Uuid;

/// Prefix every attached prescription photo must carry
pub const IMAGE_DATA_URI_PREFIX: &str = "data:image/jpeg;base64,";

/// DocumentStore is the boundary to the remote document store that persists
/// reminder and prescription records.
#[async_trait]
pub trait DocumentStore: Send + Sync {
    /// Persist a reminder record and return its document id
    async fn add_reminder(&self, record: &ReminderRecord) -> Result<String, StoreError>;

    /// Persist a prescription record and return its document id
    async fn add_prescription(&self, record: &PrescriptionRecord) -> Result<String, StoreError>;
}

// ============================================================================
// Forms
// ============================================================================

/// Raw add-reminder form state, one field per input
#[derive(Debug, Clone, Default, Deserialize)]
pub struct ReminderForm {
    pub name: String,
    pub kind: Option<ReminderKind>,
    pub date: String,
    pub time: String,
    pub detail: String,
}

impl ReminderForm {
    /// Validate the form into a persistable record.
    ///
    /// Required fields must be present and non-blank, the date/time pair must
    /// parse, and free text is trimmed (blank detail becomes absent).
    pub fn validate(&self) -> Result<ReminderRecord, ValidationError> {
        let name = required(&self.name, "name")?;
        let kind = self
            .kind
            .ok_or_else(|| ValidationError::MissingField("kind".to_string()))?;
        let date = required(&self.date, "date")?;
        let time = required(&self.time, "time")?;

        trigger::target_moment(&date, &time).map_err(|e| ValidationError::InvalidFieldValue {
            field: "date/time".to_string(),
            reason: e.to_string(),
        })?;

        let detail = self.detail.trim();
        Ok(ReminderRecord {
            name,
            kind,
            date,
            time,
            detail: (!detail.is_empty()).then(|| detail.to_string()),
        })
    }
}

/// Raw add-prescription form state
#[derive(Debug, Clone, Default, Deserialize)]
pub struct PrescriptionForm {
    pub name: String,
    pub doctor: String,
    pub detail: String,
    pub kind: Option<PrescriptionKind>,
    /// Captured or selected photo as a jpeg data URI
    pub image_base64: Option<String>,
}

impl PrescriptionForm {
    /// Validate the form into a persistable record.
    ///
    /// All fields are required; the image must be a decodable jpeg data URI.
    pub fn validate(&self) -> Result<PrescriptionRecord, ValidationError> {
        let name = required(&self.name, "name")?;
        let doctor = required(&self.doctor, "doctor")?;
        let detail = required(&self.detail, "detail")?;
        let kind = self
            .kind
            .ok_or_else(|| ValidationError::MissingField("kind".to_string()))?;
        let image_base64 = self
            .image_base64
            .as_deref()
            .map(str::trim)
            .filter(|image| !image.is_empty())
            .ok_or_else(|| ValidationError::MissingField("image".to_string()))?;

        let encoded = image_base64.strip_prefix(IMAGE_DATA_URI_PREFIX).ok_or_else(|| {
            ValidationError::InvalidFieldValue {
                field: "image".to_string(),
                reason: format!("expected a '{IMAGE_DATA_URI_PREFIX}' data URI"),
            }
        })?;
        BASE64
            .decode(encoded)
            .map_err(|e| ValidationError::InvalidFieldValue {
                field: "image".to_string(),
                reason: e.to_string(),
            })?;

        Ok(PrescriptionRecord {
            name,
            doctor,
            detail,
            kind,
            image_base64: image_base64.to_string(),
            created_at: Utc::now(),
        })
    }
}

fn required(value: &str, field: &str) -> Result<String, ValidationError> {
    let trimmed = value.trim();
    if trimmed.is_empty() {
        return Err(ValidationError::MissingField(field.to_string()));
    }
    Ok(trimmed.to_string())
}

// ============================================================================
// Save flows
// ============================================================================

/// Persist a reminder, then queue its notification pair.
///
/// The record is written before scheduling; a scheduling failure therefore
/// leaves the document persisted. Returns the document id.
#[instrument(skip_all, fields(name = %form.name))]
pub async fn save_reminder<S, H>(
    store: &S,
    scheduler: &ReminderScheduler<H>,
    form: &ReminderForm,
) -> Result<String, SaveError>
where
    S: DocumentStore + ?Sized,
    H: NotificationHost,
{
    let record = form.validate()?;
    let id = store.add_reminder(&record).await.map_err(|e| {
        error!(error = %e, "Failed to save reminder record");
        e
    })?;

    if !scheduler
        .schedule_local_notification(&record.reminder_input())
        .await
    {
        warn!(document_id = %id, "Reminder saved but notifications were not scheduled");
        return Err(SaveError::Scheduling);
    }

    info!(document_id = %id, "Reminder saved");
    telemetry_saved("reminders");
    Ok(id)
}

/// Persist a prescription record with its attached photo. Returns the
/// document id.
#[instrument(skip_all, fields(name = %form.name))]
pub async fn save_prescription<S>(
    store: &S,
    form: &PrescriptionForm,
) -> Result<String, SaveError>
where
    S: DocumentStore + ?Sized,
{
    let record = form.validate()?;
    let id = store.add_prescription(&record).await.map_err(|e| {
        error!(error = %e, "Failed to save prescription record");
        e
    })?;

    info!(document_id = %id, "Prescription saved");
    telemetry_saved("prescriptions");
    Ok(id)
}

fn telemetry_saved(collection: &'static str) {
    crate::telemetry::record_document_saved(collection);
}

// ============================================================================
// In-memory store
// ============================================================================

#[derive(Debug, Default)]
struct StoreState {
    reminders: Vec<(String, ReminderRecord)>,
    prescriptions: Vec<(String, PrescriptionRecord)>,
    fail_writes: bool,
}

/// In-memory DocumentStore used by tests and local development
#[derive(Default)]
pub struct InMemoryStore {
    state: Mutex<StoreState>,
}

impl InMemoryStore {
    pub fn new() -> Self {
        Self::default()
    }

    /// Make every subsequent write fail
    pub fn fail_writes(self) -> Self {
        self.state.lock().unwrap().fail_writes = true;
        self
    }

    pub fn reminders(&self) -> Vec<ReminderRecord> {
        self.state
            .lock()
            .unwrap()
            .reminders
            .iter()
            .map(|(_, record)| record.clone())
            .collect()
    }

    pub fn prescriptions(&self) -> Vec<PrescriptionRecord> {
        self.state
            .lock()
            .unwrap()
            .prescriptions
            .iter()
            .map(|(_, record)| record.clone())
            .collect()
    }
}

#[async_trait]
impl DocumentStore for InMemoryStore {
    async fn add_reminder(&self, record: &ReminderRecord) -> Result<String, StoreError> {
        let mut state = self.state.lock().unwrap();
        if state.fail_writes {
            return Err(StoreError::WriteFailed("injected write failure".to_string()));
        }
        let id = Uuid::new_v4().to_string();
        state.reminders.push((id.clone(), record.clone()));
        Ok(id)
    }

    async fn add_prescription(&self, record: &PrescriptionRecord) -> Result<String, StoreError> {
        let mut state = self.state.lock().unwrap();
        if state.fail_writes {
            return Err(StoreError::WriteFailed("injected write failure".to_string()));
        }
        let id = Uuid::new_v4().to_string();
        state.prescriptions.push((id.clone(), record.clone()));
        Ok(id)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::host::InMemoryHost;
    use std::sync::Arc;

    fn reminder_form() -> ReminderForm {
        ReminderForm {
            name: "Aspirin".to_string(),
            kind: Some(ReminderKind::Medicine),
            date: "2099-01-01".to_string(),
            time: "10:05".to_string(),
            detail: "Take after meal".to_string(),
        }
    }

    fn prescription_form() -> PrescriptionForm {
        PrescriptionForm {
            name: "Amoxicillin".to_string(),
            doctor: "Dr. Tran".to_string(),
            detail: "500mg twice daily".to_string(),
            kind: Some(PrescriptionKind::Medicine),
            // "hello" as jpeg-tagged base64; content is irrelevant here
            image_base64: Some(format!("{IMAGE_DATA_URI_PREFIX}aGVsbG8=")),
        }
    }

    #[test]
    fn test_reminder_form_validates() {
        let record = reminder_form().validate().unwrap();
        assert_eq!(record.name, "Aspirin");
        assert_eq!(record.detail.as_deref(), Some("Take after meal"));
    }

    #[test]
    fn test_reminder_form_rejects_blank_name() {
        let mut form = reminder_form();
        form.name = "   ".to_string();
        assert_eq!(
            form.validate().unwrap_err(),
            ValidationError::MissingField("name".to_string())
        );
    }

    #[test]
    fn test_reminder_form_rejects_missing_kind() {
        let mut form = reminder_form();
        form.kind = None;
        assert_eq!(
            form.validate().unwrap_err(),
            ValidationError::MissingField("kind".to_string())
        );
    }

    #[test]
    fn test_reminder_form_rejects_unparseable_time() {
        let mut form = reminder_form();
        form.time = "25:00".to_string();
        assert!(matches!(
            form.validate(),
            Err(ValidationError::InvalidFieldValue { .. })
        ));
    }

    #[test]
    fn test_reminder_form_blank_detail_becomes_absent() {
        let mut form = reminder_form();
        form.detail = "  ".to_string();
        let record = form.validate().unwrap();
        assert_eq!(record.detail, None);
    }

    #[test]
    fn test_prescription_form_validates() {
        let record = prescription_form().validate().unwrap();
        assert_eq!(record.doctor, "Dr. Tran");
        assert!(record.image_base64.starts_with(IMAGE_DATA_URI_PREFIX));
    }

    #[test]
    fn test_prescription_form_rejects_missing_image() {
        let mut form = prescription_form();
        form.image_base64 = None;
        assert_eq!(
            form.validate().unwrap_err(),
            ValidationError::MissingField("image".to_string())
        );
    }

    #[test]
    fn test_prescription_form_rejects_non_data_uri_image() {
        let mut form = prescription_form();
        form.image_base64 = Some("aGVsbG8=".to_string());
        assert!(matches!(
            form.validate(),
            Err(ValidationError::InvalidFieldValue { .. })
        ));
    }

    #[test]
    fn test_prescription_form_rejects_undecodable_image() {
        let mut form = prescription_form();
        form.image_base64 = Some(format!("{IMAGE_DATA_URI_PREFIX}not~~base64"));
        assert!(matches!(
            form.validate(),
            Err(ValidationError::InvalidFieldValue { .. })
        ));
    }

    #[tokio::test]
    async fn test_save_reminder_persists_and_schedules() {
        let store = InMemoryStore::new();
        let host = Arc::new(InMemoryHost::new());
        let scheduler = ReminderScheduler::new(host.clone());

        let id = save_reminder(&store, &scheduler, &reminder_form())
            .await
            .unwrap();
        assert!(!id.is_empty());
        assert_eq!(store.reminders().len(), 1);
        assert_eq!(host.list_scheduled().await.unwrap().len(), 2);
    }

    #[tokio::test]
    async fn test_save_reminder_store_failure_schedules_nothing() {
        let store = InMemoryStore::new().fail_writes();
        let host = Arc::new(InMemoryHost::new());
        let scheduler = ReminderScheduler::new(host.clone());

        let result = save_reminder(&store, &scheduler, &reminder_form()).await;
        assert!(matches!(result, Err(SaveError::Store(_))));
        assert_eq!(host.submissions_attempted(), 0);
    }

    #[tokio::test]
    async fn test_save_reminder_scheduling_failure_keeps_record() {
        let store = InMemoryStore::new();
        let host = Arc::new(InMemoryHost::new().fail_submissions_from(1));
        let scheduler = ReminderScheduler::new(host.clone());

        let result = save_reminder(&store, &scheduler, &reminder_form()).await;
        assert!(matches!(result, Err(SaveError::Scheduling)));
        // The record write is not rolled back
        assert_eq!(store.reminders().len(), 1);
    }

    #[tokio::test]
    async fn test_save_prescription_persists() {
        let store = InMemoryStore::new();
        let id = save_prescription(&store, &prescription_form()).await.unwrap();
        assert!(!id.is_empty());
        assert_eq!(store.prescriptions().len(), 1);
    }
}
