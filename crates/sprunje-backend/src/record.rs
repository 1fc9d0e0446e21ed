use std::collections::BTreeMap;

use serde::Serialize;
use sprunje_core::DynamicValue;

/// A persisted row, addressed by model and primary key (§3.1 Record).
///
/// Fields are stored as a `BTreeMap` for deterministic ordering, which
/// simplifies testing and serialization; the primary key is itself one of
/// the entries, keyed by the schema's `primary_key` name.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct Record {
    #[serde(flatten)]
    pub fields: BTreeMap<String, DynamicValue>,
}

impl Record {
    pub fn new(fields: BTreeMap<String, DynamicValue>) -> Self {
        Self { fields }
    }

    pub fn field(&self, name: &str) -> Option<&DynamicValue> {
        self.fields.get(name)
    }

    /// The record's primary key value, looked up by the schema's declared
    /// primary-key field name.
    pub fn pk(&self, primary_key: &str) -> Option<&DynamicValue> {
        self.fields.get(primary_key)
    }

    pub fn set(&mut self, name: impl Into<String>, value: DynamicValue) {
        self.fields.insert(name.into(), value);
    }

    pub fn field_count(&self) -> usize {
        self.fields.len()
    }
}
