//! Conditional validation.
//!
//! [`derive_effective_schema`] picks the rules that apply to the current
//! values; [`validate`] checks a record against them. Validation never
//! fails as an error: every broken rule lands in [`ValidationResult::errors`].

use chrono::{DateTime, NaiveDate, NaiveDateTime};
use jobdesk_model::{
    ConfigResult, EntityKind, EntityRecord, EntitySchema, FieldRule, FileRef, RuleType,
    SchemaRegistry, is_blank,
};
use regex_lite::Regex;
use serde::ser::SerializeMap;
use serde::{Serialize, Serializer};
use serde_json::Value;
use std::sync::LazyLock;

static EMAIL: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r"^[^\s@]+@[^\s@.]+(\.[^\s@.]+)+$").expect("email pattern compiles")
});

/// The fully resolved rule list for one state of a form.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct EffectiveSchema {
    pub kind: EntityKind,
    /// Discriminator field of the kind, if it has one.
    pub discriminator: Option<String>,
    /// Value of the discriminator when it selects a branch.
    pub active_branch: Option<String>,
    /// Base rules first, then the active branch's rules, in registry order.
    pub rules: Vec<FieldRule>,
}

impl EffectiveSchema {
    /// Resolves the rules of `schema` against the current `values`.
    pub fn derive(schema: &EntitySchema, values: &EntityRecord) -> Self {
        let mut rules = schema.base_rules.clone();
        let mut active_branch = None;

        if let Some(conditional) = &schema.conditional {
            let field = conditional.discriminator_field.as_str();
            if let Some(value) = values.get_str(field) {
                if let Some(branch) = conditional.branch(value) {
                    active_branch = Some(branch.value.clone());
                    rules.extend_from_slice(conditional.rules_for(field, value));
                }
            }
        }

        Self {
            kind: schema.kind,
            discriminator: schema.discriminator_field().map(str::to_owned),
            active_branch,
            rules,
        }
    }

    /// Field paths in rule order.
    pub fn paths(&self) -> impl Iterator<Item = &str> {
        self.rules.iter().map(|r| r.field_path.as_str())
    }

    pub fn contains_path(&self, path: &str) -> bool {
        self.paths().any(|p| p == path)
    }

    pub fn rule(&self, path: &str) -> Option<&FieldRule> {
        self.rules.iter().find(|r| r.field_path == path)
    }
}

/// Looks up `kind` in the registry and resolves its rules for `values`.
pub fn derive_effective_schema(
    registry: &SchemaRegistry,
    kind: EntityKind,
    values: &EntityRecord,
) -> ConfigResult<EffectiveSchema> {
    Ok(EffectiveSchema::derive(registry.schema(kind)?, values))
}

/// One message per field path, in the order the rules were evaluated.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct FieldErrors(Vec<(String, String)>);

impl FieldErrors {
    /// Records a message; a second message for the same path replaces the first.
    pub fn insert(&mut self, path: &str, message: String) {
        match self.0.iter_mut().find(|(p, _)| p == path) {
            Some(entry) => entry.1 = message,
            None => self.0.push((path.to_string(), message)),
        }
    }

    pub fn get(&self, path: &str) -> Option<&str> {
        self.0
            .iter()
            .find(|(p, _)| p == path)
            .map(|(_, m)| m.as_str())
    }

    pub fn contains(&self, path: &str) -> bool {
        self.get(path).is_some()
    }

    pub fn len(&self) -> usize {
        self.0.len()
    }

    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }

    pub fn paths(&self) -> impl Iterator<Item = &str> {
        self.0.iter().map(|(p, _)| p.as_str())
    }

    pub fn iter(&self) -> impl Iterator<Item = (&str, &str)> {
        self.0.iter().map(|(p, m)| (p.as_str(), m.as_str()))
    }

    /// Keeps only the errors whose path passes `keep`.
    pub fn filtered(&self, mut keep: impl FnMut(&str) -> bool) -> FieldErrors {
        FieldErrors(self.0.iter().filter(|(p, _)| keep(p)).cloned().collect())
    }
}

impl Serialize for FieldErrors {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        let mut map = serializer.serialize_map(Some(self.0.len()))?;
        for (path, message) in &self.0 {
            map.serialize_entry(path, message)?;
        }
        map.end()
    }
}

/// Outcome of validating a record. Recomputed on demand, never stored.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
pub struct ValidationResult {
    pub valid: bool,
    pub errors: FieldErrors,
}

impl ValidationResult {
    pub fn from_errors(errors: FieldErrors) -> Self {
        Self {
            valid: errors.is_empty(),
            errors,
        }
    }
}

/// Checks every rule of `schema` against `record`, collecting all failures.
///
/// Fields outside the effective schema are not looked at.
pub fn validate(schema: &EffectiveSchema, record: &EntityRecord) -> ValidationResult {
    let mut errors = FieldErrors::default();
    for rule in &schema.rules {
        if let Some(message) = check_rule(rule, record.get(&rule.field_path)) {
            errors.insert(&rule.field_path, message);
        }
    }
    ValidationResult::from_errors(errors)
}

/// Returns the message for the first way `value` breaks `rule`.
pub fn check_rule(rule: &FieldRule, value: Option<&Value>) -> Option<String> {
    let value = match value {
        Some(v) if !is_blank(v) => v,
        _ => return rule.required.then(|| rule.required_message()),
    };

    let well_formed = match rule.rule_type {
        RuleType::String => !matches!(value, Value::Array(_) | Value::Object(_)),
        RuleType::Number => parse_number(value).is_some(),
        RuleType::Boolean => value.is_boolean(),
        RuleType::Date => value.as_str().is_some_and(is_date),
        RuleType::Email => value.as_str().is_some_and(|s| EMAIL.is_match(s)),
        RuleType::Array => value.is_array(),
        RuleType::File => value.is_string() || FileRef::from_value(value).is_some(),
    };
    if !well_formed {
        return Some(rule.type_message());
    }

    if let (Some(min), Some(items)) = (rule.min_items, value.as_array()) {
        if items.len() < min {
            return Some(rule.min_items_message());
        }
    }
    None
}

/// Parses JSON numbers and numeric strings into a finite `f64`.
pub fn parse_number(value: &Value) -> Option<f64> {
    let n = match value {
        Value::Number(n) => n.as_f64()?,
        Value::String(s) => s.trim().parse::<f64>().ok()?,
        _ => return None,
    };
    n.is_finite().then_some(n)
}

fn is_date(s: &str) -> bool {
    NaiveDate::parse_from_str(s, "%Y-%m-%d").is_ok()
        || DateTime::parse_from_rfc3339(s).is_ok()
        || NaiveDateTime::parse_from_str(s, "%Y-%m-%dT%H:%M:%S%.f").is_ok()
}
