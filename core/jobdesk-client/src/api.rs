//! REST calls for users and job postings.
//!
//! Every response wraps its payload in a `{ "data": ... }` envelope.

use crate::config::ApiConfig;
use crate::error::{ClientError, ClientResult};
use async_trait::async_trait;
use jobdesk_forms::{RemoteResult, RemoteStore, SubmissionPayload};
use jobdesk_model::{EntityKind, EntityRecord};
use reqwest::{Client, Method, RequestBuilder, Url};
use serde_json::Value;
use std::time::Duration;
use tracing::{debug, info};

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum Operation {
    List,
    Fetch,
    Create,
    Update,
    Delete,
}

/// Path segments of an endpoint, relative to the base URL. Record ids are
/// appended for fetch, update and delete.
fn route(kind: EntityKind, op: Operation) -> &'static [&'static str] {
    use Operation::*;
    match (kind, op) {
        (EntityKind::User, List) => &["api", "auth", "admin", "user-list"],
        (EntityKind::User, Fetch) => &["api", "auth", "admin", "user-info"],
        (EntityKind::User, Create | Update) => &["api", "auth", "admin", "users"],
        (EntityKind::User, Delete) => &["users"],
        (EntityKind::JobPosting, _) => &["api", "admin", "job-posts"],
    }
}

/// Client for the admin REST API.
pub struct AdminApiClient {
    config: ApiConfig,
    base: Url,
    client: Client,
}

impl AdminApiClient {
    pub fn new(config: ApiConfig) -> ClientResult<Self> {
        let base = Url::parse(&config.base_url).map_err(|e| {
            ClientError::Config(format!("invalid base URL {:?}: {e}", config.base_url))
        })?;
        if base.cannot_be_a_base() {
            return Err(ClientError::Config(format!(
                "base URL cannot carry a path: {}",
                config.base_url
            )));
        }
        let client = Client::builder()
            .timeout(Duration::from_secs(config.timeout_secs))
            .build()?;

        Ok(Self {
            config,
            base,
            client,
        })
    }

    pub fn config(&self) -> &ApiConfig {
        &self.config
    }

    fn url(&self, kind: EntityKind, op: Operation, id: Option<&str>) -> ClientResult<Url> {
        let mut url = self.base.clone();
        {
            let mut path = url.path_segments_mut().map_err(|_| {
                ClientError::Config(format!("base URL cannot carry a path: {}", self.base))
            })?;
            path.pop_if_empty().extend(route(kind, op));
            if let Some(id) = id {
                path.push(id);
            }
        }
        Ok(url)
    }

    fn request(&self, method: Method, url: Url) -> RequestBuilder {
        debug!("{} {}", method, url);
        let builder = self.client.request(method, url);
        match &self.config.access_token {
            Some(token) => builder.bearer_auth(token),
            None => builder,
        }
    }

    /// Sends the request and decodes the JSON body. Non-2xx statuses become
    /// [`ClientError::Status`]; an empty body decodes to `null`.
    async fn send(&self, builder: RequestBuilder) -> ClientResult<Value> {
        let response = builder.send().await?;
        let status = response.status();
        if !status.is_success() {
            let body = response.text().await.unwrap_or_default();
            return Err(ClientError::Status {
                status: status.as_u16(),
                body,
            });
        }

        let bytes = response.bytes().await?;
        if bytes.is_empty() {
            return Ok(Value::Null);
        }
        Ok(serde_json::from_slice(&bytes)?)
    }

    /// Lists every record of `kind`.
    pub async fn list(&self, kind: EntityKind) -> ClientResult<Vec<EntityRecord>> {
        let url = self.url(kind, Operation::List, None)?;
        let body = self.send(self.request(Method::GET, url)).await?;
        match unwrap_data(body)? {
            Value::Array(items) => items.into_iter().map(into_record).collect(),
            other => Err(ClientError::Shape(format!("expected a list, got {other}"))),
        }
    }

    /// Loads one record. `Ok(None)` on 404 or a `null` envelope.
    pub async fn fetch(&self, kind: EntityKind, id: &str) -> ClientResult<Option<EntityRecord>> {
        let url = self.url(kind, Operation::Fetch, Some(id))?;
        match self.send(self.request(Method::GET, url)).await {
            Ok(body) => match unwrap_data(body)? {
                Value::Null => Ok(None),
                data => into_record(data).map(Some),
            },
            Err(ClientError::Status { status: 404, .. }) => {
                debug!("{} {} not found", kind, id);
                Ok(None)
            }
            Err(e) => Err(e),
        }
    }

    pub async fn create(&self, payload: &SubmissionPayload) -> ClientResult<EntityRecord> {
        let url = self.url(payload.kind, Operation::Create, None)?;
        let body = self
            .send(self.request(Method::POST, url).json(payload))
            .await?;
        let record = into_record(unwrap_data(body)?)?;
        info!("Created {} with {} attachment(s)", payload.kind, payload.attachments.len());
        Ok(record)
    }

    pub async fn update(&self, id: &str, payload: &SubmissionPayload) -> ClientResult<EntityRecord> {
        let url = self.url(payload.kind, Operation::Update, Some(id))?;
        let body = self
            .send(self.request(Method::PUT, url).json(payload))
            .await?;
        let record = into_record(unwrap_data(body)?)?;
        info!("Updated {} {}", payload.kind, id);
        Ok(record)
    }

    pub async fn delete(&self, kind: EntityKind, id: &str) -> ClientResult<()> {
        let url = self.url(kind, Operation::Delete, Some(id))?;
        self.send(self.request(Method::DELETE, url)).await?;
        info!("Deleted {} {}", kind, id);
        Ok(())
    }
}

fn unwrap_data(body: Value) -> ClientResult<Value> {
    match body {
        Value::Object(mut map) => map.remove("data").ok_or(ClientError::MissingData),
        _ => Err(ClientError::MissingData),
    }
}

fn into_record(value: Value) -> ClientResult<EntityRecord> {
    match value {
        Value::Object(map) => Ok(EntityRecord::from(map)),
        other => Err(ClientError::Shape(format!("expected a record object, got {other}"))),
    }
}

#[async_trait]
impl RemoteStore for AdminApiClient {
    async fn fetch_by_id(&self, kind: EntityKind, id: &str) -> RemoteResult<Option<EntityRecord>> {
        Ok(self.fetch(kind, id).await?)
    }

    async fn create(&self, payload: &SubmissionPayload) -> RemoteResult<EntityRecord> {
        Ok(AdminApiClient::create(self, payload).await?)
    }

    async fn update(&self, id: &str, payload: &SubmissionPayload) -> RemoteResult<EntityRecord> {
        Ok(AdminApiClient::update(self, id, payload).await?)
    }

    async fn delete(&self, kind: EntityKind, id: &str) -> RemoteResult<()> {
        Ok(AdminApiClient::delete(self, kind, id).await?)
    }
}
