//! What a submitted form sends to the remote store.

use crate::staging::AttachmentStaging;
use crate::store::FormMode;
use crate::validator::EffectiveSchema;
use base64::Engine;
use base64::engine::general_purpose::STANDARD;
use jobdesk_model::{ConfigResult, ConfigurationError, EntityKind, EntityRecord, is_blank};
use serde::{Serialize, Serializer};
use serde_json::Value;
use std::sync::Arc;
use uuid::Uuid;

/// A record ready for `create` / `update`.
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct SubmissionPayload {
    pub kind: EntityKind,
    /// Set when editing.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub id: Option<String>,
    /// Effective-schema fields only (plus `id` when editing).
    pub data: EntityRecord,
    #[serde(skip_serializing_if = "Vec::is_empty")]
    pub attachments: Vec<AttachmentUpload>,
}

/// A staged file in transport form. `file_id` matches the `fileId` of the
/// [`FileRef`](jobdesk_model::FileRef) left in `data`.
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct AttachmentUpload {
    pub field_path: String,
    pub file_id: Uuid,
    pub file_name: String,
    pub mime_type: String,
    pub size_bytes: u64,
    /// Base64 in JSON.
    #[serde(rename = "contentBase64", serialize_with = "serialize_base64")]
    pub content: Arc<[u8]>,
}

fn serialize_base64<S: Serializer>(bytes: &Arc<[u8]>, serializer: S) -> Result<S::Ok, S::Error> {
    serializer.serialize_str(&STANDARD.encode(bytes))
}

/// Builds the payload for a valid form.
///
/// Fields outside `schema` are dropped, which also drops the data of
/// inactive branches. Staging areas for fields outside `schema` are skipped.
pub fn build_payload<'a>(
    schema: &EffectiveSchema,
    mode: FormMode,
    values: &EntityRecord,
    staged: impl IntoIterator<Item = &'a AttachmentStaging>,
) -> ConfigResult<SubmissionPayload> {
    let mut data = EntityRecord::new();
    for path in schema.paths() {
        if let Some(value) = values.get(path) {
            data.set(path, value.clone());
        }
    }

    let id = match mode {
        FormMode::Create => None,
        FormMode::Edit => {
            let raw = values.get("id").cloned().unwrap_or(Value::Null);
            let id = identity_string(&raw)
                .ok_or(ConfigurationError::MissingIdentity(schema.kind))?;
            data.set("id", raw);
            Some(id)
        }
    };

    let attachments = staged
        .into_iter()
        .filter(|staging| schema.contains_path(staging.field_path()))
        .flat_map(|staging| {
            staging.attachments().iter().map(|a| AttachmentUpload {
                field_path: staging.field_path().to_string(),
                file_id: a.origin_key().as_uuid(),
                file_name: a.file_name().to_string(),
                mime_type: a.mime_type().to_string(),
                size_bytes: a.size_bytes(),
                content: Arc::clone(a.bytes()),
            })
        })
        .collect();

    Ok(SubmissionPayload {
        kind: schema.kind,
        id,
        data,
        attachments,
    })
}

fn identity_string(value: &Value) -> Option<String> {
    if is_blank(value) {
        return None;
    }
    match value {
        Value::String(s) => Some(s.clone()),
        Value::Number(n) => Some(n.to_string()),
        _ => None,
    }
}
