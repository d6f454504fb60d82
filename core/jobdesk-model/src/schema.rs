use crate::ConfigurationError;
use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;

/// The kinds of record the admin dashboard edits.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum EntityKind {
    /// Job seekers and employers.
    User,
    /// Job postings (the dashboard's product pages).
    JobPosting,
}

impl EntityKind {
    pub const ALL: [EntityKind; 2] = [EntityKind::User, EntityKind::JobPosting];

    pub fn as_str(&self) -> &'static str {
        match self {
            EntityKind::User => "user",
            EntityKind::JobPosting => "job_posting",
        }
    }
}

impl fmt::Display for EntityKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for EntityKind {
    type Err = ConfigurationError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_ascii_lowercase().as_str() {
            "user" | "users" => Ok(EntityKind::User),
            "job_posting" | "job-posting" | "job" | "product" => Ok(EntityKind::JobPosting),
            _ => Err(ConfigurationError::UnknownEntityKind(s.to_string())),
        }
    }
}

/// The value shape a rule checks.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum RuleType {
    String,
    Number,
    Boolean,
    /// `YYYY-MM-DD` or an RFC 3339 timestamp.
    Date,
    Email,
    Array,
    /// A URL string or a staged [`FileRef`](crate::FileRef).
    File,
}

/// A single field constraint.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct FieldRule {
    /// Dot path into the record (e.g., "company.location.address").
    pub field_path: String,
    pub required: bool,
    pub rule_type: RuleType,
    /// Minimum element count. Only meaningful when `rule_type` is Array.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub min_items: Option<usize>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub required_message: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub type_message: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub min_items_message: Option<String>,
    /// Constraints on staged files. Only meaningful for File and Array rules.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub upload: Option<UploadLimits>,
}

impl FieldRule {
    fn simple(path: &str, rule_type: RuleType) -> Self {
        Self {
            field_path: path.into(),
            required: false,
            rule_type,
            min_items: None,
            required_message: None,
            type_message: None,
            min_items_message: None,
            upload: None,
        }
    }

    /// Shorthand for an optional string field.
    pub fn string(path: &str) -> Self {
        Self::simple(path, RuleType::String)
    }

    /// Shorthand for an optional numeric field.
    pub fn number(path: &str) -> Self {
        Self::simple(path, RuleType::Number)
    }

    /// Shorthand for an optional boolean field.
    pub fn boolean(path: &str) -> Self {
        Self::simple(path, RuleType::Boolean)
    }

    /// Shorthand for an optional date field.
    pub fn date(path: &str) -> Self {
        Self::simple(path, RuleType::Date)
    }

    /// Shorthand for an optional email field.
    pub fn email(path: &str) -> Self {
        Self::simple(path, RuleType::Email)
    }

    /// Shorthand for a file field (avatar-style, single value).
    pub fn file(path: &str) -> Self {
        Self::simple(path, RuleType::File)
    }

    /// Shorthand for an array field with a minimum length.
    pub fn array(path: &str, min_items: usize) -> Self {
        Self {
            min_items: Some(min_items),
            ..Self::simple(path, RuleType::Array)
        }
    }

    /// Marks the field required, with the message shown when it is empty.
    pub fn require(mut self, message: &str) -> Self {
        self.required = true;
        self.required_message = Some(message.into());
        self
    }

    /// Sets the message shown when the value has the wrong shape.
    pub fn with_type_message(mut self, message: &str) -> Self {
        self.type_message = Some(message.into());
        self
    }

    /// Sets the message shown when an array is too short.
    pub fn with_min_items_message(mut self, message: &str) -> Self {
        self.min_items_message = Some(message.into());
        self
    }

    /// Limits what files may be staged for this field.
    pub fn with_upload_limits(mut self, limits: UploadLimits) -> Self {
        self.upload = Some(limits);
        self
    }

    pub fn required_message(&self) -> String {
        self.required_message
            .clone()
            .unwrap_or_else(|| format!("{} is required", self.field_path))
    }

    pub fn type_message(&self) -> String {
        if let Some(message) = &self.type_message {
            return message.clone();
        }
        let path = &self.field_path;
        match self.rule_type {
            RuleType::String => format!("{path} must be text"),
            RuleType::Number => format!("{path} must be a number"),
            RuleType::Boolean => format!("{path} must be true or false"),
            RuleType::Date => format!("{path} must be a valid date"),
            RuleType::Email => "Email must be a valid email address".to_string(),
            RuleType::Array => format!("{path} must be a list"),
            RuleType::File => format!("{path} must be a file or URL"),
        }
    }

    pub fn min_items_message(&self) -> String {
        self.min_items_message.clone().unwrap_or_else(|| {
            format!(
                "{} must have at least {} item(s)",
                self.field_path,
                self.min_items.unwrap_or(0)
            )
        })
    }
}

/// What a file field accepts. Unset limits do not constrain.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct UploadLimits {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub max_bytes: Option<u64>,
    /// MIME types, e.g. "image/png". Empty accepts any type.
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub accepted_types: Vec<String>,
    /// Most files one field may stage.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub max_files: Option<usize>,
}

impl UploadLimits {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn max_bytes(mut self, max_bytes: u64) -> Self {
        self.max_bytes = Some(max_bytes);
        self
    }

    pub fn accept(mut self, types: &[&str]) -> Self {
        self.accepted_types = types.iter().map(|t| (*t).to_string()).collect();
        self
    }

    pub fn max_files(mut self, max_files: usize) -> Self {
        self.max_files = Some(max_files);
        self
    }

    pub fn accepts_type(&self, mime_type: &str) -> bool {
        self.accepted_types.is_empty()
            || self
                .accepted_types
                .iter()
                .any(|t| t.eq_ignore_ascii_case(mime_type))
    }
}

/// Rules that apply only while the discriminator holds `value`.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ConditionalBranch {
    /// Discriminator value selecting this branch (e.g., "JOB_SEEKER").
    pub value: String,
    /// Record subtree owned by this branch (e.g., "jobSeekerProfile").
    pub data_root: String,
    pub rules: Vec<FieldRule>,
}

impl ConditionalBranch {
    pub fn new(value: &str, data_root: &str, rules: Vec<FieldRule>) -> Self {
        Self {
            value: value.into(),
            data_root: data_root.into(),
            rules,
        }
    }
}

/// Branches keyed by the value of one discriminator field.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ConditionalRuleSet {
    pub discriminator_field: String,
    pub branches: Vec<ConditionalBranch>,
}

impl ConditionalRuleSet {
    pub fn new(discriminator_field: &str, branches: Vec<ConditionalBranch>) -> Self {
        Self {
            discriminator_field: discriminator_field.into(),
            branches,
        }
    }

    /// Returns the branch selected by `value`, if any.
    pub fn branch(&self, value: &str) -> Option<&ConditionalBranch> {
        self.branches.iter().find(|b| b.value == value)
    }

    /// Rules for `field` = `value`; empty when either does not match.
    pub fn rules_for(&self, field: &str, value: &str) -> &[FieldRule] {
        if field != self.discriminator_field {
            return &[];
        }
        self.branch(value).map(|b| b.rules.as_slice()).unwrap_or(&[])
    }

    /// Branches other than the one selected by `active`.
    pub fn inactive_branches<'a>(
        &'a self,
        active: Option<&'a str>,
    ) -> impl Iterator<Item = &'a ConditionalBranch> + 'a {
        self.branches
            .iter()
            .filter(move |b| Some(b.value.as_str()) != active)
    }
}

/// Everything the forms need to know about one entity kind.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct EntitySchema {
    pub kind: EntityKind,
    /// Rules that always apply, in display order.
    pub base_rules: Vec<FieldRule>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub conditional: Option<ConditionalRuleSet>,
}

impl EntitySchema {
    pub fn new(kind: EntityKind, base_rules: Vec<FieldRule>) -> Self {
        Self {
            kind,
            base_rules,
            conditional: None,
        }
    }

    pub fn with_conditional(mut self, conditional: ConditionalRuleSet) -> Self {
        self.conditional = Some(conditional);
        self
    }

    /// The field whose value selects a conditional branch, if this kind has one.
    pub fn discriminator_field(&self) -> Option<&str> {
        self.conditional
            .as_ref()
            .map(|c| c.discriminator_field.as_str())
    }
}
