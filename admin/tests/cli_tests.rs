use jobdesk_admin::{
    AttachArg, LogNavigator, load_record, prepare_form, submit_form, validate_record,
};
use jobdesk_client::{AdminApiClient, ApiConfig};
use jobdesk_forms::{FormMode, Navigator, PreviewRegistry, RouteKey, SubmitOutcome};
use jobdesk_model::{EntityKind, SchemaRegistry};
use pretty_assertions::assert_eq;
use serde_json::json;
use std::path::{Path, PathBuf};
use std::sync::Arc;
use tempfile::TempDir;
use wiremock::matchers::{body_partial_json, method, path};
use wiremock::{Mock, MockServer, ResponseTemplate};

fn write(dir: &TempDir, name: &str, contents: &[u8]) -> PathBuf {
    let path = dir.path().join(name);
    std::fs::write(&path, contents).unwrap();
    path
}

fn write_json(dir: &TempDir, name: &str, value: serde_json::Value) -> PathBuf {
    write(dir, name, value.to_string().as_bytes())
}

fn job_posting() -> serde_json::Value {
    json!({
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
        "hiringCount": 2,
        "images": []
    })
}

fn attach(field: &str, path: &Path) -> AttachArg {
    AttachArg {
        field: field.to_string(),
        path: path.to_path_buf(),
    }
}

// ── Arguments ───────────────────────────────────────────────────

#[test]
fn attach_arg_parses_field_and_path() {
    let arg: AttachArg = "images = ./office.png".parse().unwrap();
    assert_eq!(arg.field, "images");
    assert_eq!(arg.path, PathBuf::from("./office.png"));
}

#[test]
fn attach_arg_rejects_malformed_input() {
    for bad in ["images", "=office.png", "images=", ""] {
        assert!(bad.parse::<AttachArg>().is_err(), "{bad:?}");
    }
}

// ── Loading ─────────────────────────────────────────────────────

#[test]
fn load_record_reads_json_object() {
    let dir = tempfile::tempdir().unwrap();
    let file = write_json(&dir, "user.json", json!({"fullName": "Linh"}));
    let record = load_record(&file).unwrap();
    assert_eq!(record.get_str("fullName"), Some("Linh"));
}

#[test]
fn load_record_rejects_bad_input() {
    let dir = tempfile::tempdir().unwrap();
    let broken = write(&dir, "broken.json", b"{ not json");
    let list = write_json(&dir, "list.json", json!([1, 2]));

    let err = load_record(&broken).unwrap_err();
    assert!(err.to_string().contains("not valid JSON"));
    let err = load_record(&list).unwrap_err();
    assert!(err.to_string().contains("JSON object"));
    assert!(load_record(&dir.path().join("missing.json")).is_err());
}

// ── Offline validation ──────────────────────────────────────────

#[test]
fn validate_report_lists_fields_and_errors() {
    let dir = tempfile::tempdir().unwrap();
    let file = write_json(
        &dir,
        "seeker.json",
        json!({
            "fullName": "",
            "email": "a@b.com",
            "roleName": "JOB_SEEKER",
            "jobSeekerProfile": {"phone": "", "birthday": "", "gender": "", "maritalStatus": ""}
        }),
    );
    let record = load_record(&file).unwrap();

    let report = validate_record(&SchemaRegistry::builtin(), EntityKind::User, &record).unwrap();

    assert!(!report.is_valid());
    assert_eq!(report.active_branch.as_deref(), Some("JOB_SEEKER"));
    assert!(report.fields.contains(&"jobSeekerProfile.gender".to_string()));
    assert!(!report.fields.iter().any(|f| f.starts_with("company.")));
    assert_eq!(report.result.errors.len(), 5);

    let text = report.to_string();
    assert!(text.starts_with("user (JOB_SEEKER):"));
    assert!(text.contains("  x fullName: Full Name is required"));
    assert!(text.contains("    email"));
    assert!(text.ends_with("5 error(s)"));
}

// ── Attachments ─────────────────────────────────────────────────

#[test]
fn prepare_form_stages_images_from_disk() {
    let dir = tempfile::tempdir().unwrap();
    let office = write(&dir, "office.png", b"png-1");
    let team = write(&dir, "team.jpg", b"jpg-22");
    let previews = Arc::new(PreviewRegistry::new());

    let form = prepare_form(
        &SchemaRegistry::builtin(),
        EntityKind::JobPosting,
        FormMode::Create,
        serde_json::from_value(job_posting()).unwrap(),
        &[attach("images", &office), attach("images", &team)],
        previews.clone(),
    )
    .unwrap();

    assert_eq!(form.staged_count(), 2);
    assert!(form.validation().valid, "{:?}", form.validation().errors);
    let staged = form.attachments("images").unwrap();
    assert_eq!(staged.attachments()[1].mime_type(), "image/jpeg");
    assert_eq!(previews.live_count(), 2);
}

#[test]
fn prepare_form_keeps_last_avatar() {
    let dir = tempfile::tempdir().unwrap();
    let first = write(&dir, "me.png", b"1");
    let second = write(&dir, "me-2.png", b"22");

    let form = prepare_form(
        &SchemaRegistry::builtin(),
        EntityKind::User,
        FormMode::Create,
        serde_json::from_value(json!({"roleName": "ADMIN"})).unwrap(),
        &[attach("avatarUrl", &first), attach("avatarUrl", &second)],
        Arc::new(PreviewRegistry::new()),
    )
    .unwrap();

    assert_eq!(form.staged_count(), 1);
    assert_eq!(form.values().get_str("avatarUrl.fileName"), Some("me-2.png"));
}

#[test]
fn prepare_form_rejects_unknown_field() {
    let dir = tempfile::tempdir().unwrap();
    let cv = write(&dir, "cv.pdf", b"%PDF");
    let err = prepare_form(
        &SchemaRegistry::builtin(),
        EntityKind::JobPosting,
        FormMode::Create,
        serde_json::from_value(job_posting()).unwrap(),
        &[attach("resume", &cv)],
        Arc::new(PreviewRegistry::new()),
    )
    .unwrap_err();
    assert!(err.to_string().contains("resume"));
}

#[test]
fn prepare_form_reports_missing_file() {
    let dir = tempfile::tempdir().unwrap();
    let err = prepare_form(
        &SchemaRegistry::builtin(),
        EntityKind::JobPosting,
        FormMode::Create,
        serde_json::from_value(job_posting()).unwrap(),
        &[attach("images", &dir.path().join("gone.png"))],
        Arc::new(PreviewRegistry::new()),
    )
    .unwrap_err();
    assert!(err.to_string().contains("Failed to read attachment"));
}

#[test]
fn prepare_form_refuses_avatar_of_wrong_type() {
    let dir = tempfile::tempdir().unwrap();
    let cv = write(&dir, "cv.pdf", b"%PDF");
    let previews = Arc::new(PreviewRegistry::new());
    let err = prepare_form(
        &SchemaRegistry::builtin(),
        EntityKind::User,
        FormMode::Create,
        serde_json::from_value(json!({"roleName": "ADMIN"})).unwrap(),
        &[attach("avatarUrl", &cv)],
        previews.clone(),
    )
    .unwrap_err();
    assert!(format!("{err:#}").contains("application/pdf"), "{err:#}");
    assert_eq!(previews.live_count(), 0);
}

#[test]
fn prepare_form_refuses_a_fourth_image() {
    let dir = tempfile::tempdir().unwrap();
    let images: Vec<AttachArg> = (1..=4)
        .map(|i| attach("images", &write(&dir, &format!("office-{i}.png"), b"png")))
        .collect();
    let err = prepare_form(
        &SchemaRegistry::builtin(),
        EntityKind::JobPosting,
        FormMode::Create,
        serde_json::from_value(job_posting()).unwrap(),
        &images,
        Arc::new(PreviewRegistry::new()),
    )
    .unwrap_err();
    assert!(err.to_string().contains("office-4.png"), "{err}");
}

// ── Submission ──────────────────────────────────────────────────

#[test]
fn log_navigator_remembers_last_route() {
    let navigator = LogNavigator::default();
    assert_eq!(navigator.last_route(), None);
    navigator.go_to(RouteKey::UserList);
    navigator.go_to(RouteKey::JobPostingList);
    assert_eq!(navigator.last_route(), Some(RouteKey::JobPostingList));
}

#[tokio::test]
async fn submit_uploads_staged_images() {
    let server = MockServer::start().await;
    Mock::given(method("POST"))
        .and(path("/api/admin/job-posts"))
        .and(body_partial_json(json!({
            "kind": "job_posting",
            "attachments": [{"fieldPath": "images", "fileName": "office.png", "contentBase64": "cG5n"}]
        })))
        .respond_with(ResponseTemplate::new(201).set_body_json(json!({"data": {"id": 88}})))
        .expect(1)
        .mount(&server)
        .await;

    let dir = tempfile::tempdir().unwrap();
    let office = write(&dir, "office.png", b"png");
    let previews = Arc::new(PreviewRegistry::new());
    let mut form = prepare_form(
        &SchemaRegistry::builtin(),
        EntityKind::JobPosting,
        FormMode::Create,
        serde_json::from_value(job_posting()).unwrap(),
        &[attach("images", &office)],
        previews.clone(),
    )
    .unwrap();
    let client = AdminApiClient::new(ApiConfig::default().with_base_url(server.uri())).unwrap();

    let (outcome, next) = submit_form(Arc::new(client), &mut form).await.unwrap();

    let SubmitOutcome::Succeeded(stored) = outcome else {
        panic!("expected success, got {outcome:?}");
    };
    assert_eq!(stored.get("id"), Some(&json!(88)));
    assert_eq!(next, Some(RouteKey::JobPostingList));
    assert!(previews.check_leaks().is_ok());
}

#[tokio::test]
async fn invalid_record_is_not_sent() {
    let server = MockServer::start().await;
    Mock::given(method("POST"))
        .respond_with(ResponseTemplate::new(201))
        .expect(0)
        .mount(&server)
        .await;

    let mut form = prepare_form(
        &SchemaRegistry::builtin(),
        EntityKind::JobPosting,
        FormMode::Create,
        serde_json::from_value(job_posting()).unwrap(),
        &[],
        Arc::new(PreviewRegistry::new()),
    )
    .unwrap();
    let client = AdminApiClient::new(ApiConfig::default().with_base_url(server.uri())).unwrap();

    let (outcome, next) = submit_form(Arc::new(client), &mut form).await.unwrap();

    let SubmitOutcome::Invalid(result) = outcome else {
        panic!("expected invalid, got {outcome:?}");
    };
    assert_eq!(result.errors.get("images"), Some("Images is required"));
    assert_eq!(next, None);
}
