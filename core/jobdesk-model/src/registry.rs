use crate::{
    ConfigResult, ConfigurationError, EntityKind, EntitySchema, FieldRule, job_posting_schema,
    user_schema,
};
use std::collections::HashMap;

/// Static rule declarations, one [`EntitySchema`] per entity kind.
///
/// Lookups are pure. The only failure is asking for a kind that was never
/// registered.
#[derive(Debug, Clone, Default)]
pub struct SchemaRegistry {
    schemas: HashMap<EntityKind, EntitySchema>,
}

impl SchemaRegistry {
    /// Creates an empty registry.
    pub fn new() -> Self {
        Self::default()
    }

    /// Creates a registry holding the user and job-posting schemas.
    pub fn builtin() -> Self {
        let mut registry = Self::new();
        registry.register(user_schema());
        registry.register(job_posting_schema());
        registry
    }

    /// Registers (or replaces) the schema for `schema.kind`.
    pub fn register(&mut self, schema: EntitySchema) {
        self.schemas.insert(schema.kind, schema);
    }

    /// Returns the full schema for a kind.
    pub fn schema(&self, kind: EntityKind) -> ConfigResult<&EntitySchema> {
        self.schemas
            .get(&kind)
            .ok_or_else(|| ConfigurationError::UnknownEntityKind(kind.to_string()))
    }

    /// Rules that always apply to `kind`.
    pub fn base_rules(&self, kind: EntityKind) -> ConfigResult<&[FieldRule]> {
        Ok(self.schema(kind)?.base_rules.as_slice())
    }

    /// Rules that apply while `discriminator_field` equals `discriminator_value`.
    ///
    /// Empty when the kind has no conditional rules or nothing matches.
    pub fn conditional_rules(
        &self,
        kind: EntityKind,
        discriminator_field: &str,
        discriminator_value: &str,
    ) -> ConfigResult<&[FieldRule]> {
        let schema = self.schema(kind)?;
        Ok(schema
            .conditional
            .as_ref()
            .map(|c| c.rules_for(discriminator_field, discriminator_value))
            .unwrap_or(&[]))
    }
}
