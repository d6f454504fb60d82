//! Shared fixtures for form engine tests.

#![allow(dead_code)]

use async_trait::async_trait;
use jobdesk_forms::{
    FormMode, FormStore, Navigator, NotificationSink, PreviewRegistry, RemoteError, RemoteResult,
    RemoteStore, RouteKey, Severity, SubmissionPayload,
};
use jobdesk_model::{EntityKind, EntityRecord, SchemaRegistry};
use serde_json::{Value, json};
use std::sync::{Arc, Mutex};
use tokio::sync::Notify;

pub fn record(value: Value) -> EntityRecord {
    EntityRecord::from_value(value).unwrap()
}

/// A job seeker that passes every rule.
pub fn job_seeker() -> EntityRecord {
    record(json!({
        "fullName": "Linh Tran",
        "email": "linh@example.com",
        "avatarUrl": null,
        "isActive": true,
        "isVerifyEmail": false,
        "isSupperuser": false,
        "isStaff": false,
        "lastLogin": null,
        "createAt": null,
        "updateAt": null,
        "roleName": "JOB_SEEKER",
        "facebookUrl": "",
        "youtubeUrl": "",
        "linkedinUrl": "",
        "jobSeekerProfile": {
            "phone": "0901234567",
            "birthday": "1995-04-12",
            "gender": "F",
            "maritalStatus": "S"
        },
        "company": null
    }))
}

/// An employer that passes every rule.
pub fn employer() -> EntityRecord {
    record(json!({
        "id": "42",
        "fullName": "Minh Pham",
        "email": "hr@acme.vn",
        "isActive": true,
        "roleName": "EMPLOYER",
        "company": {
            "companyName": "Acme",
            "companyEmail": "contact@acme.vn",
            "companyPhone": "028 1234 5678",
            "websiteUrl": "https://acme.vn",
            "fieldOperation": "Manufacturing",
            "employeeSize": 120,
            "slug": "acme",
            "taxCode": "0312345678",
            "since": "2001",
            "location": {"address": "12 Le Loi, District 1", "lat": 10.77, "lng": 106.7}
        }
    }))
}

/// A job posting with every required field filled, except images.
pub fn job_posting_without_images() -> EntityRecord {
    record(json!({
        "companyName": "Acme",
        "jobTitle": "Backend Engineer",
        "contactEmail": "jobs@acme.vn",
        "contactPhone": "0901234567",
        "salaryRange": "20-30M",
        "applicationDeadline": "2026-12-31",
        "careerLevel": "Senior",
        "workType": "Full-time",
        "jobDescription": "Build services",
        "jobRequirements": "Rust",
        "jobBenefits": "Remote",
        "contactPerson": "Minh",
        "contactAddress": "12 Le Loi",
        "recruitmentArea": "HCMC",
        "genderRequirement": "Any",
        "hiringCount": "2",
        "images": []
    }))
}

pub fn registry() -> SchemaRegistry {
    SchemaRegistry::builtin()
}

pub fn open_form(
    kind: EntityKind,
    mode: FormMode,
    initial: EntityRecord,
    previews: &Arc<PreviewRegistry>,
) -> FormStore {
    FormStore::new(&registry(), kind, mode, initial, previews.clone()).unwrap()
}

/// Records every call; fails writes while `fail` is set.
#[derive(Default)]
pub struct MockStore {
    pub fail: Mutex<bool>,
    pub created: Mutex<Vec<SubmissionPayload>>,
    pub updated: Mutex<Vec<(String, SubmissionPayload)>>,
    /// Fields the store sets on every record it returns.
    pub stored_fields: Vec<(String, Value)>,
}

impl MockStore {
    pub fn with_stored(mut self, path: &str, value: Value) -> Self {
        self.stored_fields.push((path.to_string(), value));
        self
    }

    fn stored(&self, mut record: EntityRecord) -> EntityRecord {
        for (path, value) in &self.stored_fields {
            record.set(path, value.clone());
        }
        record
    }

    pub fn failing() -> Self {
        let store = Self::default();
        *store.fail.lock().unwrap() = true;
        store
    }

    pub fn set_failing(&self, fail: bool) {
        *self.fail.lock().unwrap() = fail;
    }

    pub fn write_count(&self) -> usize {
        self.created.lock().unwrap().len() + self.updated.lock().unwrap().len()
    }

    fn check(&self) -> RemoteResult<()> {
        if *self.fail.lock().unwrap() {
            return Err(RemoteError::Rejected {
                status: 500,
                message: "database unavailable".into(),
            });
        }
        Ok(())
    }
}

#[async_trait]
impl RemoteStore for MockStore {
    async fn fetch_by_id(&self, _kind: EntityKind, _id: &str) -> RemoteResult<Option<EntityRecord>> {
        Ok(None)
    }

    async fn create(&self, payload: &SubmissionPayload) -> RemoteResult<EntityRecord> {
        self.created.lock().unwrap().push(payload.clone());
        self.check()?;
        let mut stored = payload.data.clone();
        stored.set("id", json!("new-1"));
        Ok(self.stored(stored))
    }

    async fn update(&self, id: &str, payload: &SubmissionPayload) -> RemoteResult<EntityRecord> {
        self.updated
            .lock()
            .unwrap()
            .push((id.to_string(), payload.clone()));
        self.check()?;
        Ok(self.stored(payload.data.clone()))
    }

    async fn delete(&self, _kind: EntityKind, _id: &str) -> RemoteResult<()> {
        self.check()
    }
}

/// Blocks `create` until released, to hold a submission in flight.
#[derive(Default)]
pub struct GatedStore {
    pub entered: Notify,
    pub release: Notify,
}

#[async_trait]
impl RemoteStore for GatedStore {
    async fn fetch_by_id(&self, _kind: EntityKind, _id: &str) -> RemoteResult<Option<EntityRecord>> {
        Ok(None)
    }

    async fn create(&self, payload: &SubmissionPayload) -> RemoteResult<EntityRecord> {
        self.entered.notify_one();
        self.release.notified().await;
        Ok(payload.data.clone())
    }

    async fn update(&self, _id: &str, payload: &SubmissionPayload) -> RemoteResult<EntityRecord> {
        Ok(payload.data.clone())
    }

    async fn delete(&self, _kind: EntityKind, _id: &str) -> RemoteResult<()> {
        Ok(())
    }
}

#[derive(Default)]
pub struct RecordingNotifier {
    pub notices: Mutex<Vec<(String, Severity)>>,
}

impl NotificationSink for RecordingNotifier {
    fn notify(&self, message: &str, severity: Severity) {
        self.notices
            .lock()
            .unwrap()
            .push((message.to_string(), severity));
    }
}

#[derive(Default)]
pub struct RecordingNavigator {
    pub routes: Mutex<Vec<RouteKey>>,
}

impl Navigator for RecordingNavigator {
    fn go_to(&self, route: RouteKey) {
        self.routes.lock().unwrap().push(route);
    }
}
