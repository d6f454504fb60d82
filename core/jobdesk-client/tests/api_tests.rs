use jobdesk_client::{AdminApiClient, ApiConfig, ClientError};
use jobdesk_forms::{
    FormMode, FormStore, Navigator, NotificationSink, PreviewRegistry, RemoteError, RemoteStore,
    RouteKey, Severity, SubmissionPayload, SubmissionPipeline, SubmitOutcome,
};
use jobdesk_model::{EntityKind, EntityRecord, SchemaRegistry};
use pretty_assertions::assert_eq;
use serde_json::json;
use std::sync::{Arc, Mutex};
use wiremock::matchers::{body_partial_json, header, method, path};
use wiremock::{Mock, MockServer, ResponseTemplate};

fn client_for(server: &MockServer) -> AdminApiClient {
    let config = ApiConfig::default()
        .with_base_url(server.uri())
        .with_access_token("admin-token");
    AdminApiClient::new(config).unwrap()
}

fn payload(kind: EntityKind, data: serde_json::Value) -> SubmissionPayload {
    SubmissionPayload {
        kind,
        id: None,
        data: EntityRecord::from_value(data).unwrap(),
        attachments: Vec::new(),
    }
}

// ── Construction ────────────────────────────────────────────────

#[test]
fn invalid_base_url_is_config_error() {
    let err = AdminApiClient::new(ApiConfig::default().with_base_url("not a url")).err();
    assert!(matches!(err, Some(ClientError::Config(_))));
}

#[test]
fn non_hierarchical_base_url_is_config_error() {
    let err = AdminApiClient::new(ApiConfig::default().with_base_url("mailto:admin@jobdesk.vn")).err();
    assert!(matches!(err, Some(ClientError::Config(_))));
}

// ── Reads ───────────────────────────────────────────────────────

#[tokio::test]
async fn list_users_sends_bearer_token() {
    let server = MockServer::start().await;
    Mock::given(method("GET"))
        .and(path("/api/auth/admin/user-list"))
        .and(header("authorization", "Bearer admin-token"))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({
            "data": [{"id": 1, "fullName": "Linh"}, {"id": 2, "fullName": "Minh"}]
        })))
        .expect(1)
        .mount(&server)
        .await;

    let users = client_for(&server).list(EntityKind::User).await.unwrap();
    assert_eq!(users.len(), 2);
    assert_eq!(users[1].get_str("fullName"), Some("Minh"));
}

#[tokio::test]
async fn list_rejects_non_list_data() {
    let server = MockServer::start().await;
    Mock::given(method("GET"))
        .and(path("/api/admin/job-posts"))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({"data": {"count": 0}})))
        .mount(&server)
        .await;

    let err = client_for(&server).list(EntityKind::JobPosting).await.unwrap_err();
    assert!(matches!(err, ClientError::Shape(_)));
}

#[tokio::test]
async fn fetch_job_posting_by_id() {
    let server = MockServer::start().await;
    Mock::given(method("GET"))
        .and(path("/api/admin/job-posts/17"))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({
            "data": {"id": 17, "jobTitle": "Backend Engineer"}
        })))
        .mount(&server)
        .await;

    let posting = client_for(&server)
        .fetch(EntityKind::JobPosting, "17")
        .await
        .unwrap()
        .unwrap();
    assert_eq!(posting.get_str("jobTitle"), Some("Backend Engineer"));
}

#[tokio::test]
async fn fetch_missing_user_is_none() {
    let server = MockServer::start().await;
    Mock::given(method("GET"))
        .and(path("/api/auth/admin/user-info/404"))
        .respond_with(ResponseTemplate::new(404).set_body_string("no such user"))
        .mount(&server)
        .await;

    let client = client_for(&server);
    assert_eq!(client.fetch(EntityKind::User, "404").await.unwrap(), None);
    assert_eq!(client.fetch_by_id(EntityKind::User, "404").await.unwrap(), None);
}

#[tokio::test]
async fn server_error_keeps_status_and_body() {
    let server = MockServer::start().await;
    Mock::given(method("GET"))
        .and(path("/api/auth/admin/user-info/5"))
        .respond_with(ResponseTemplate::new(500).set_body_string("boom"))
        .mount(&server)
        .await;

    let err = client_for(&server).fetch(EntityKind::User, "5").await.unwrap_err();
    assert_eq!(err.status(), Some(500));
    assert!(err.to_string().contains("boom"));
}

#[tokio::test]
async fn missing_envelope_is_reported() {
    let server = MockServer::start().await;
    Mock::given(method("GET"))
        .and(path("/api/admin/job-posts/3"))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({"id": 3})))
        .mount(&server)
        .await;

    let err = client_for(&server).fetch(EntityKind::JobPosting, "3").await.unwrap_err();
    assert!(matches!(err, ClientError::MissingData));
}

#[tokio::test]
async fn base_url_path_prefix_is_kept() {
    let server = MockServer::start().await;
    Mock::given(method("GET"))
        .and(path("/v1/api/admin/job-posts"))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({"data": []})))
        .expect(1)
        .mount(&server)
        .await;

    let config = ApiConfig::default().with_base_url(format!("{}/v1/", server.uri()));
    let postings = AdminApiClient::new(config)
        .unwrap()
        .list(EntityKind::JobPosting)
        .await
        .unwrap();
    assert!(postings.is_empty());
}

// ── Writes ──────────────────────────────────────────────────────

#[tokio::test]
async fn create_user_posts_payload() {
    let server = MockServer::start().await;
    Mock::given(method("POST"))
        .and(path("/api/auth/admin/users"))
        .and(body_partial_json(json!({"kind": "user", "data": {"fullName": "Linh"}})))
        .respond_with(ResponseTemplate::new(201).set_body_json(json!({
            "data": {"id": 31, "fullName": "Linh"}
        })))
        .expect(1)
        .mount(&server)
        .await;

    let created = client_for(&server)
        .create(&payload(EntityKind::User, json!({"fullName": "Linh"})))
        .await
        .unwrap();
    assert_eq!(created.get("id"), Some(&json!(31)));
}

#[tokio::test]
async fn update_job_posting_puts_by_id() {
    let server = MockServer::start().await;
    Mock::given(method("PUT"))
        .and(path("/api/admin/job-posts/7"))
        .and(body_partial_json(json!({"id": "7", "data": {"jobTitle": "Lead"}})))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({
            "data": {"id": 7, "jobTitle": "Lead"}
        })))
        .expect(1)
        .mount(&server)
        .await;

    let mut update = payload(EntityKind::JobPosting, json!({"id": "7", "jobTitle": "Lead"}));
    update.id = Some("7".to_string());
    let stored = client_for(&server).update("7", &update).await.unwrap();
    assert_eq!(stored.get_str("jobTitle"), Some("Lead"));
}

#[tokio::test]
async fn delete_user_accepts_empty_body() {
    let server = MockServer::start().await;
    Mock::given(method("DELETE"))
        .and(path("/users/9"))
        .respond_with(ResponseTemplate::new(204))
        .expect(1)
        .mount(&server)
        .await;

    client_for(&server).delete(EntityKind::User, "9").await.unwrap();
}

// ── Error mapping ───────────────────────────────────────────────

#[test]
fn status_errors_map_to_remote_errors() {
    let not_found: RemoteError = ClientError::Status {
        status: 404,
        body: "gone".into(),
    }
    .into();
    assert_eq!(not_found, RemoteError::NotFound("gone".into()));

    let rejected: RemoteError = ClientError::Status {
        status: 422,
        body: "bad email".into(),
    }
    .into();
    assert_eq!(
        rejected,
        RemoteError::Rejected {
            status: 422,
            message: "bad email".into()
        }
    );

    let decode: RemoteError = ClientError::MissingData.into();
    assert!(matches!(decode, RemoteError::Decode(_)));
}

// ── Through the submission pipeline ─────────────────────────────

#[derive(Default)]
struct Notices(Mutex<Vec<(String, Severity)>>);

impl NotificationSink for Notices {
    fn notify(&self, message: &str, severity: Severity) {
        self.0.lock().unwrap().push((message.to_string(), severity));
    }
}

#[derive(Default)]
struct Routes(Mutex<Vec<RouteKey>>);

impl Navigator for Routes {
    fn go_to(&self, route: RouteKey) {
        self.0.lock().unwrap().push(route);
    }
}

fn job_seeker_form() -> FormStore {
    let initial = EntityRecord::from_value(json!({
        "fullName": "Linh Tran",
        "email": "linh@example.com",
        "roleName": "JOB_SEEKER",
        "jobSeekerProfile": {
            "phone": "0901234567",
            "birthday": "1995-04-12",
            "gender": "F",
            "maritalStatus": "S"
        }
    }))
    .unwrap();
    FormStore::new(
        &SchemaRegistry::builtin(),
        EntityKind::User,
        FormMode::Create,
        initial,
        Arc::new(PreviewRegistry::new()),
    )
    .unwrap()
}

#[tokio::test]
async fn pipeline_submits_through_client() {
    let server = MockServer::start().await;
    Mock::given(method("POST"))
        .and(path("/api/auth/admin/users"))
        .and(body_partial_json(json!({"data": {"jobSeekerProfile": {"gender": "F"}}})))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({"data": {"id": 1}})))
        .expect(1)
        .mount(&server)
        .await;

    let notices = Arc::new(Notices::default());
    let routes = Arc::new(Routes::default());
    let pipeline = SubmissionPipeline::new(
        Arc::new(client_for(&server)),
        notices.clone(),
        routes.clone(),
    );
    let mut form = job_seeker_form();

    let outcome = pipeline.submit(&mut form).await.unwrap();

    assert!(matches!(outcome, SubmitOutcome::Succeeded(_)));
    assert_eq!(routes.0.lock().unwrap().clone(), vec![RouteKey::UserList]);
}

#[tokio::test]
async fn pipeline_reports_server_failure_uniformly() {
    let server = MockServer::start().await;
    Mock::given(method("POST"))
        .and(path("/api/auth/admin/users"))
        .respond_with(ResponseTemplate::new(500).set_body_string("database down"))
        .mount(&server)
        .await;

    let notices = Arc::new(Notices::default());
    let routes = Arc::new(Routes::default());
    let pipeline = SubmissionPipeline::new(
        Arc::new(client_for(&server)),
        notices.clone(),
        routes.clone(),
    );
    let mut form = job_seeker_form();

    let outcome = pipeline.submit(&mut form).await.unwrap();

    assert!(matches!(outcome, SubmitOutcome::Failed(_)));
    assert_eq!(
        notices.0.lock().unwrap().clone(),
        vec![("Error occurred!".to_string(), Severity::Error)]
    );
    assert!(routes.0.lock().unwrap().is_empty());
}
