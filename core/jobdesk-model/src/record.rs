use serde::{Deserialize, Serialize};
use serde_json::{Map, Value};
use uuid::Uuid;

/// The values a form edits.
///
/// A JSON object whose nested groups are addressed with dot paths
/// (e.g., `company.location.address`). Leaves are primitives or [`FileRef`]s.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct EntityRecord(Map<String, Value>);

impl EntityRecord {
    /// Creates an empty record.
    #[must_use]
    pub fn new() -> Self {
        Self(Map::new())
    }

    /// Wraps a JSON value. Returns `None` unless the value is an object.
    pub fn from_value(value: Value) -> Option<Self> {
        match value {
            Value::Object(map) => Some(Self(map)),
            _ => None,
        }
    }

    /// Returns the record as a JSON object value.
    pub fn into_value(self) -> Value {
        Value::Object(self.0)
    }

    /// Borrows the top-level fields.
    pub fn as_map(&self) -> &Map<String, Value> {
        &self.0
    }

    /// Resolves a dot path. Returns `None` if any segment is missing or a
    /// non-object sits in the middle of the path.
    pub fn get(&self, path: &str) -> Option<&Value> {
        let mut segments = path.split('.');
        let mut current = self.0.get(segments.next()?)?;
        for segment in segments {
            current = current.as_object()?.get(segment)?;
        }
        Some(current)
    }

    fn get_mut(&mut self, path: &str) -> Option<&mut Value> {
        let mut segments = path.split('.');
        let mut current = self.0.get_mut(segments.next()?)?;
        for segment in segments {
            current = current.as_object_mut()?.get_mut(segment)?;
        }
        Some(current)
    }

    /// Extracts a string leaf.
    pub fn get_str(&self, path: &str) -> Option<&str> {
        self.get(path).and_then(Value::as_str)
    }

    /// Extracts a boolean leaf.
    pub fn get_bool(&self, path: &str) -> Option<bool> {
        self.get(path).and_then(Value::as_bool)
    }

    /// Extracts a numeric leaf.
    pub fn get_number(&self, path: &str) -> Option<f64> {
        self.get(path).and_then(Value::as_f64)
    }

    /// Returns true if the path resolves to a value (including `null`).
    pub fn contains(&self, path: &str) -> bool {
        self.get(path).is_some()
    }

    /// Writes a value at a dot path, creating intermediate groups.
    ///
    /// An intermediate segment holding a non-object (commonly `null` for an
    /// absent group such as `company`) is replaced by an empty object.
    pub fn set(&mut self, path: &str, value: Value) {
        let (parents, leaf) = match path.rsplit_once('.') {
            Some((parents, leaf)) => (Some(parents), leaf),
            None => (None, path),
        };

        let mut map = &mut self.0;
        if let Some(parents) = parents {
            for segment in parents.split('.') {
                let slot = map
                    .entry(segment.to_string())
                    .or_insert_with(|| Value::Object(Map::new()));
                if !slot.is_object() {
                    *slot = Value::Object(Map::new());
                }
                let Value::Object(inner) = slot else {
                    return;
                };
                map = inner;
            }
        }
        map.insert(leaf.to_string(), value);
    }

    /// Removes the value at a dot path, returning it.
    pub fn remove(&mut self, path: &str) -> Option<Value> {
        match path.rsplit_once('.') {
            None => self.0.remove(path),
            Some((parent, leaf)) => self.get_mut(parent)?.as_object_mut()?.remove(leaf),
        }
    }
}

impl From<Map<String, Value>> for EntityRecord {
    fn from(map: Map<String, Value>) -> Self {
        Self(map)
    }
}

/// Returns true for values a `required` rule rejects: `null` and `""`.
pub fn is_blank(value: &Value) -> bool {
    match value {
        Value::Null => true,
        Value::String(s) => s.is_empty(),
        _ => false,
    }
}

/// A staged file as it appears inside an [`EntityRecord`].
///
/// The bytes stay with the attachment staging; the record only carries this
/// reference so validation and rendering can see that a file was chosen.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct FileRef {
    pub file_id: Uuid,
    pub file_name: String,
    pub mime_type: String,
    pub size_bytes: u64,
    /// Preview URI for rendering (e.g., `preview://<uuid>`).
    pub preview: String,
}

impl FileRef {
    /// Serializes into the JSON form stored in records.
    pub fn to_value(&self) -> Value {
        serde_json::to_value(self).unwrap_or(Value::Null)
    }

    /// Recognizes a record leaf as a file reference.
    pub fn from_value(value: &Value) -> Option<Self> {
        value.as_object()?.get("fileId")?;
        serde_json::from_value(value.clone()).ok()
    }
}
