//! Record loading, offline validation and submission.

use crate::console::{ConsoleNotifier, LogNavigator};
use anyhow::{Context, Result, bail};
use jobdesk_forms::{
    FormMode, FormStore, LocalFile, PreviewSource, RemoteStore, RouteKey, SubmissionPipeline,
    SubmitOutcome, ValidationResult, derive_effective_schema, validate,
};
use jobdesk_model::{ConfigResult, EntityKind, EntityRecord, RuleType, SchemaRegistry};
use serde::Serialize;
use serde_json::Value;
use std::fmt;
use std::path::{Path, PathBuf};
use std::str::FromStr;
use std::sync::Arc;
use tracing::debug;

/// Reads a JSON object from `path`.
pub fn load_record(path: &Path) -> Result<EntityRecord> {
    let text = std::fs::read_to_string(path)
        .with_context(|| format!("Failed to read {}", path.display()))?;
    let value: Value = serde_json::from_str(&text)
        .with_context(|| format!("{} is not valid JSON", path.display()))?;
    EntityRecord::from_value(value)
        .with_context(|| format!("{} must hold a JSON object", path.display()))
}

/// A `--attach FIELD=PATH` argument.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct AttachArg {
    pub field: String,
    pub path: PathBuf,
}

impl FromStr for AttachArg {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let (field, path) = s
            .split_once('=')
            .ok_or_else(|| format!("expected FIELD=PATH, got {s:?}"))?;
        let (field, path) = (field.trim(), path.trim());
        if field.is_empty() || path.is_empty() {
            return Err(format!("expected FIELD=PATH, got {s:?}"));
        }
        Ok(Self {
            field: field.to_string(),
            path: PathBuf::from(path),
        })
    }
}

/// Outcome of validating a record offline.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct ValidationReport {
    pub kind: EntityKind,
    pub active_branch: Option<String>,
    /// Field paths of the effective schema, in rule order.
    pub fields: Vec<String>,
    pub result: ValidationResult,
}

impl ValidationReport {
    pub fn is_valid(&self) -> bool {
        self.result.valid
    }
}

impl fmt::Display for ValidationReport {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match &self.active_branch {
            Some(branch) => writeln!(f, "{} ({branch}): {} field(s)", self.kind, self.fields.len())?,
            None => writeln!(f, "{}: {} field(s)", self.kind, self.fields.len())?,
        }
        for path in &self.fields {
            match self.result.errors.get(path) {
                Some(message) => writeln!(f, "  x {path}: {message}")?,
                None => writeln!(f, "    {path}")?,
            }
        }
        if self.result.valid {
            write!(f, "valid")
        } else {
            write!(f, "{} error(s)", self.result.errors.len())
        }
    }
}

/// Validates `record` against the effective schema for `kind`.
pub fn validate_record(
    registry: &SchemaRegistry,
    kind: EntityKind,
    record: &EntityRecord,
) -> ConfigResult<ValidationReport> {
    let schema = derive_effective_schema(registry, kind, record)?;
    let result = validate(&schema, record);
    Ok(ValidationReport {
        kind,
        active_branch: schema.active_branch.clone(),
        fields: schema.paths().map(str::to_string).collect(),
        result,
    })
}

/// Opens a form on `record` and stages the attached files from disk.
///
/// List fields collect every file given for them; single-file fields keep
/// the last one.
pub fn prepare_form(
    registry: &SchemaRegistry,
    kind: EntityKind,
    mode: FormMode,
    record: EntityRecord,
    attachments: &[AttachArg],
    previews: Arc<dyn PreviewSource>,
) -> Result<FormStore> {
    let mut form = FormStore::new(registry, kind, mode, record, previews)?;
    for arg in attachments {
        let Some(rule) = form.effective_schema().rule(&arg.field) else {
            bail!("{} is not a field of this {kind} form", arg.field);
        };
        let multiple = rule.rule_type == RuleType::Array;
        let file = LocalFile::from_path(&arg.path)
            .with_context(|| format!("Failed to read attachment {}", arg.path.display()))?;
        debug!("Staging {} for {}", file.name(), arg.field);
        if multiple {
            if let Some(reason) = form.stage_files(&arg.field, [file]).into_iter().next() {
                bail!("Cannot attach {}: {reason}", arg.path.display());
            }
        } else {
            form.replace_file(&arg.field, file)
                .with_context(|| format!("Cannot attach {}", arg.path.display()))?;
        }
    }
    Ok(form)
}

/// Runs `form` through the submission pipeline, printing notices to the
/// terminal. Returns the outcome and the page the dashboard would open next.
pub async fn submit_form(
    remote: Arc<dyn RemoteStore>,
    form: &mut FormStore,
) -> Result<(SubmitOutcome, Option<RouteKey>)> {
    let navigator = Arc::new(LogNavigator::default());
    let pipeline = SubmissionPipeline::new(remote, Arc::new(ConsoleNotifier), navigator.clone());
    let outcome = pipeline.submit(form).await?;
    Ok((outcome, navigator.last_route()))
}
