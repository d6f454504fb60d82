//! Form state.
//!
//! A [`FormStore`] owns the values of one open form. Every mutation
//! re-validates; a change of the discriminator field (the user's role)
//! re-derives the effective rules and moves the data of branches that just
//! became inactive into a quarantine. Switching back restores it. The live
//! values never carry another branch's data. In edit mode the discriminator
//! is read-only.

use crate::error::RejectedFile;
use crate::payload::{SubmissionPayload, build_payload};
use crate::staging::{AttachmentStaging, FileKey, LocalFile, PreviewSource};
use crate::validator::{EffectiveSchema, FieldErrors, ValidationResult, validate};
use jobdesk_model::{
    ConfigResult, ConfigurationError, EntityKind, EntityRecord, EntitySchema, FileRef, RuleType,
    SchemaRegistry, is_blank,
};
use serde::{Deserialize, Serialize};
use serde_json::Value;
use std::collections::{BTreeMap, BTreeSet};
use std::fmt;
use std::sync::Arc;
use tracing::debug;

/// Whether the form creates a new record or edits an existing one.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum FormMode {
    Create,
    /// Requires an `id` in the record.
    Edit,
}

impl FormMode {
    pub fn is_edit(&self) -> bool {
        matches!(self, FormMode::Edit)
    }
}

/// Values, flags and staged files of one open form.
pub struct FormStore {
    schema: EntitySchema,
    mode: FormMode,
    initial: EntityRecord,
    values: EntityRecord,
    effective: EffectiveSchema,
    validation: ValidationResult,
    touched: BTreeSet<String>,
    /// Data roots of inactive branches, keyed by branch value.
    quarantine: BTreeMap<String, Value>,
    attachments: BTreeMap<String, AttachmentStaging>,
    previews: Arc<dyn PreviewSource>,
    submit_attempted: bool,
}

impl FormStore {
    /// Opens a form for `kind`, starting from `initial` values.
    pub fn new(
        registry: &SchemaRegistry,
        kind: EntityKind,
        mode: FormMode,
        initial: EntityRecord,
        previews: Arc<dyn PreviewSource>,
    ) -> ConfigResult<Self> {
        let schema = registry.schema(kind)?.clone();
        check_identity(kind, mode, &initial)?;

        let effective = EffectiveSchema::derive(&schema, &initial);
        let validation = validate(&effective, &initial);
        Ok(Self {
            schema,
            mode,
            values: initial.clone(),
            initial,
            effective,
            validation,
            touched: BTreeSet::new(),
            quarantine: BTreeMap::new(),
            attachments: BTreeMap::new(),
            previews,
            submit_attempted: false,
        })
    }

    pub fn kind(&self) -> EntityKind {
        self.schema.kind
    }

    pub fn mode(&self) -> FormMode {
        self.mode
    }

    /// Snapshot of the current values.
    pub fn get_values(&self) -> EntityRecord {
        self.values.clone()
    }

    pub fn values(&self) -> &EntityRecord {
        &self.values
    }

    pub fn effective_schema(&self) -> &EffectiveSchema {
        &self.effective
    }

    /// Result of the validation run after the last mutation.
    pub fn validation(&self) -> &ValidationResult {
        &self.validation
    }

    /// Errors to show inline: touched fields only, or all after a submit attempt.
    pub fn visible_errors(&self) -> FieldErrors {
        if self.submit_attempted {
            return self.validation.errors.clone();
        }
        self.validation
            .errors
            .filtered(|path| self.touched.contains(path))
    }

    /// Writes one field. A discriminator change re-derives the rules and
    /// quarantines the data of branches that are no longer active.
    ///
    /// Fails with [`ConfigurationError::LockedField`] when an edit form's
    /// discriminator would change; the values are left untouched.
    pub fn set_value(&mut self, path: &str, value: Value) -> ConfigResult<()> {
        let is_discriminator = self.schema.discriminator_field() == Some(path);
        let previous = if is_discriminator {
            self.values.get_str(path).map(str::to_owned)
        } else {
            None
        };
        if is_discriminator && self.mode.is_edit() && value.as_str() != previous.as_deref() {
            return Err(ConfigurationError::LockedField {
                kind: self.schema.kind,
                field: path.to_string(),
            });
        }

        self.values.set(path, value);

        if is_discriminator {
            let current = self.values.get_str(path).map(str::to_owned);
            if current != previous {
                self.switch_branch(current.as_deref());
            }
        }
        self.revalidate();
        Ok(())
    }

    fn switch_branch(&mut self, active: Option<&str>) {
        let Some(conditional) = self.schema.conditional.as_ref() else {
            return;
        };

        for branch in conditional.inactive_branches(active) {
            if let Some(data) = self.values.remove(&branch.data_root) {
                if !data.is_null() {
                    debug!("Quarantined {} while {:?} is active", branch.data_root, active);
                    self.quarantine.insert(branch.value.clone(), data);
                }
            }
        }

        if let Some(branch) = active.and_then(|value| conditional.branch(value)) {
            if let Some(data) = self.quarantine.remove(&branch.value) {
                debug!("Restored {} from quarantine", branch.data_root);
                self.values.set(&branch.data_root, data);
            }
        }

        self.effective = EffectiveSchema::derive(&self.schema, &self.values);
        debug!(
            "Re-derived {} schema: {} rules, branch {:?}",
            self.schema.kind,
            self.effective.rules.len(),
            self.effective.active_branch
        );
    }

    /// Branch data set aside by a discriminator change.
    pub fn quarantined(&self, branch_value: &str) -> Option<&Value> {
        self.quarantine.get(branch_value)
    }

    fn revalidate(&mut self) {
        self.validation = validate(&self.effective, &self.values);
    }

    /// Re-derives the rules from scratch and validates the current values.
    pub fn validate_now(&mut self) -> ValidationResult {
        self.effective = EffectiveSchema::derive(&self.schema, &self.values);
        self.revalidate();
        self.validation.clone()
    }

    /// Marks a field as visited by the user.
    pub fn touch(&mut self, path: &str) {
        self.touched.insert(path.to_string());
    }

    pub fn is_touched(&self, path: &str) -> bool {
        self.touched.contains(path)
    }

    /// True when the field differs from its initial value.
    pub fn is_dirty(&self, path: &str) -> bool {
        self.values.get(path) != self.initial.get(path)
    }

    /// Fields of the effective schema that differ from their initial value.
    pub fn dirty_fields(&self) -> Vec<&str> {
        self.effective.paths().filter(|p| self.is_dirty(p)).collect()
    }

    pub fn is_form_dirty(&self) -> bool {
        self.values != self.initial
    }

    pub(crate) fn mark_submit_attempted(&mut self) {
        self.submit_attempted = true;
    }

    pub fn submit_attempted(&self) -> bool {
        self.submit_attempted
    }

    /// Replaces all state. Staged files are released.
    pub fn reset(&mut self, initial: EntityRecord) -> ConfigResult<()> {
        check_identity(self.schema.kind, self.mode, &initial)?;
        self.release_attachments();
        self.values = initial.clone();
        self.initial = initial;
        self.touched.clear();
        self.quarantine.clear();
        self.submit_attempted = false;
        self.validate_now();
        Ok(())
    }

    /// After a successful write: staged files are handed off and the
    /// submitted values become the new baseline.
    ///
    /// File fields take the value the store returned (uploaded URLs). Where
    /// the store echoed staged references back, or returned nothing, those
    /// references are dropped; their previews are gone.
    pub(crate) fn commit_submitted(&mut self, stored: &EntityRecord) {
        let paths: Vec<String> = self.attachments.keys().cloned().collect();
        self.release_attachments();
        for path in paths {
            let next = match stored.get(&path) {
                Some(value) if !holds_file_ref(value) => value.clone(),
                _ => without_file_refs(self.values.get(&path)),
            };
            self.values.set(&path, next);
        }
        self.initial = self.values.clone();
        self.submit_attempted = false;
        self.revalidate();
    }

    // ── Attachments ──────────────────────────────────────────────

    fn staging_mut(&mut self, path: &str) -> &mut AttachmentStaging {
        let previews = Arc::clone(&self.previews);
        let limits = self
            .effective
            .rule(path)
            .and_then(|rule| rule.upload.clone())
            .unwrap_or_default();
        self.attachments
            .entry(path.to_string())
            .or_insert_with(|| AttachmentStaging::new(path, previews).with_limits(limits))
    }

    /// Appends files to a multi-file field (e.g., job posting images).
    /// Returns the files the field's upload limits turned away.
    pub fn stage_files(
        &mut self,
        path: &str,
        files: impl IntoIterator<Item = LocalFile>,
    ) -> Vec<RejectedFile> {
        let rejected = self.staging_mut(path).add_files(files);
        self.sync_attachment_field(path);
        rejected
    }

    /// Stages `file` as the only file of a field (e.g., the avatar). A
    /// rejected file leaves the field as it was.
    pub fn replace_file(&mut self, path: &str, file: LocalFile) -> Result<(), RejectedFile> {
        self.staging_mut(path).replace(file)?;
        self.sync_attachment_field(path);
        Ok(())
    }

    /// Unstages one file. Returns false if it was not staged.
    pub fn remove_file(&mut self, path: &str, key: FileKey) -> bool {
        let removed = self
            .attachments
            .get_mut(path)
            .is_some_and(|staging| staging.remove_file(key));
        if removed {
            self.sync_attachment_field(path);
        }
        removed
    }

    /// Unstages every file of a field.
    pub fn remove_all_files(&mut self, path: &str) {
        if let Some(staging) = self.attachments.get_mut(path) {
            staging.remove_all();
            self.sync_attachment_field(path);
        }
    }

    pub fn attachments(&self, path: &str) -> Option<&AttachmentStaging> {
        self.attachments.get(path)
    }

    /// Every field with a staging area, in path order.
    pub fn staged(&self) -> impl Iterator<Item = &AttachmentStaging> {
        self.attachments.values()
    }

    pub fn staged_count(&self) -> usize {
        self.attachments.values().map(AttachmentStaging::len).sum()
    }

    fn release_attachments(&mut self) {
        for staging in self.attachments.values_mut() {
            staging.remove_all();
        }
        self.attachments.clear();
    }

    /// Writes the staged file references into the field value.
    ///
    /// Array fields keep their existing non-staged entries (already uploaded
    /// image URLs) ahead of the staged ones. Single-file fields hold the
    /// staged file, or fall back to their previous URL when nothing is staged.
    fn sync_attachment_field(&mut self, path: &str) {
        let refs: Vec<Value> = self
            .attachments
            .get(path)
            .map(|s| s.file_refs().iter().map(FileRef::to_value).collect())
            .unwrap_or_default();
        let multiple = self
            .schema_rule_type(path)
            .is_none_or(|t| t == RuleType::Array);
        let current = self.values.get(path).cloned().unwrap_or(Value::Null);

        let next = if multiple {
            let mut items: Vec<Value> = current
                .as_array()
                .map(|items| {
                    items
                        .iter()
                        .filter(|v| FileRef::from_value(v).is_none())
                        .cloned()
                        .collect()
                })
                .unwrap_or_default();
            items.extend(refs);
            Value::Array(items)
        } else {
            match refs.into_iter().last() {
                Some(file) => file,
                None if FileRef::from_value(&current).is_some() => Value::Null,
                None => current,
            }
        };

        self.values.set(path, next);
        self.revalidate();
    }

    fn schema_rule_type(&self, path: &str) -> Option<RuleType> {
        self.effective.rule(path).map(|r| r.rule_type)
    }

    /// Maps the current values and staged files into a submission payload.
    pub fn build_payload(&self) -> ConfigResult<SubmissionPayload> {
        build_payload(&self.effective, self.mode, &self.values, self.staged())
    }
}

fn holds_file_ref(value: &Value) -> bool {
    match value {
        Value::Array(items) => items.iter().any(|v| FileRef::from_value(v).is_some()),
        other => FileRef::from_value(other).is_some(),
    }
}

fn without_file_refs(value: Option<&Value>) -> Value {
    match value {
        Some(Value::Array(items)) => Value::Array(
            items
                .iter()
                .filter(|v| FileRef::from_value(v).is_none())
                .cloned()
                .collect(),
        ),
        Some(other) if FileRef::from_value(other).is_none() => other.clone(),
        _ => Value::Null,
    }
}

fn check_identity(kind: EntityKind, mode: FormMode, record: &EntityRecord) -> ConfigResult<()> {
    if mode.is_edit() && record.get("id").is_none_or(is_blank) {
        return Err(ConfigurationError::MissingIdentity(kind));
    }
    Ok(())
}

impl fmt::Debug for FormStore {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("FormStore")
            .field("kind", &self.schema.kind)
            .field("mode", &self.mode)
            .field("values", &self.values)
            .field("active_branch", &self.effective.active_branch)
            .field("valid", &self.validation.valid)
            .finish_non_exhaustive()
    }
}
