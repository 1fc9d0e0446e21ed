use std::collections::BTreeMap;

use serde::{Deserialize, Serialize};

use super::dynamic_value::DynamicValue;
use super::field_type::FieldType;
use super::validation_rule::{parse_validation_map, ValidationRule};
use crate::error::SchemaError;

/// A named view a field may appear in (§3.1 `show_in`).
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ShowIn {
    List,
    Form,
    Detail,
}

/// The full declaration of one field, as authored in a schema file under `fields`.
#[derive(Debug, Clone)]
pub struct FieldSpec {
    pub name: String,
    pub field_type: FieldType,
    pub label: Option<String>,
    pub description: Option<String>,
    pub placeholder: Option<String>,
    pub icon: Option<String>,
    pub required: bool,
    pub readonly: bool,
    pub auto_increment: bool,
    pub computed: bool,
    pub sortable: bool,
    pub filterable: bool,
    pub searchable: bool,
    pub listable: bool,
    pub show_in: Vec<ShowIn>,
    pub default: Option<DynamicValue>,
    pub validation: Vec<ValidationRule>,
    pub field_template: Option<String>,
    pub lookup_model: Option<String>,
    pub lookup_id: Option<String>,
    pub lookup_desc: Option<String>,
}

impl FieldSpec {
    /// A field is editable unless explicitly `readonly`, `auto_increment`, or
    /// `computed` (§3.1: "defaults true unless ...").
    pub fn is_editable(&self) -> bool {
        !self.readonly && !self.auto_increment && !self.computed
    }

    /// Fields never assignable from client input (§3.2 invariant).
    pub fn is_client_writable(&self) -> bool {
        self.is_editable()
    }

    pub fn shown_in(&self, view: ShowIn) -> bool {
        self.show_in.is_empty() || self.show_in.contains(&view)
    }
}

/// Builds a `FieldSpec` from the raw JSON object stored under a field name in
/// a schema file's `fields` map.
pub fn field_spec_from_json(
    name: &str,
    raw: &serde_json::Value,
) -> Result<FieldSpec, SchemaError> {
    let obj = raw.as_object().ok_or_else(|| SchemaError::MalformedJson {
        model: name.to_string(),
        reason: "field definition must be a JSON object".into(),
    })?;

    let type_str = obj
        .get("type")
        .and_then(|v| v.as_str())
        .ok_or(SchemaError::MissingAttribute("type"))?;
    let field_type: FieldType = type_str.parse()?;

    let auto_increment = bool_attr(obj, "auto_increment");
    let computed = bool_attr(obj, "computed");
    // an explicit `editable: false` is equivalent to `readonly: true` (§3.1)
    let readonly = bool_attr(obj, "readonly") || obj.get("editable").and_then(|v| v.as_bool()) == Some(false);
    let is_password = field_type.is_password();

    let show_in = obj
        .get("show_in")
        .and_then(|v| v.as_array())
        .map(|arr| {
            arr.iter()
                .filter_map(|v| v.as_str())
                .filter_map(|s| match s {
                    "list" => Some(ShowIn::List),
                    "form" => Some(ShowIn::Form),
                    "detail" => Some(ShowIn::Detail),
                    _ => None,
                })
                .collect()
        })
        .unwrap_or_default();

    let validation = obj
        .get("validation")
        .and_then(|v| v.as_object())
        .map(|m| {
            let map: BTreeMap<String, serde_json::Value> =
                m.iter().map(|(k, v)| (k.clone(), v.clone())).collect();
            parse_validation_map(&map)
        })
        .unwrap_or_default();

    Ok(FieldSpec {
        name: name.to_string(),
        field_type,
        label: str_attr(obj, "label"),
        description: str_attr(obj, "description"),
        placeholder: str_attr(obj, "placeholder"),
        icon: str_attr(obj, "icon"),
        required: bool_attr(obj, "required"),
        readonly,
        auto_increment,
        computed,
        sortable: bool_attr(obj, "sortable"),
        filterable: bool_attr(obj, "filterable"),
        searchable: bool_attr(obj, "searchable"),
        // a password field is never listable regardless of the authored value (§9)
        listable: bool_attr(obj, "listable") && !is_password,
        show_in,
        default: obj.get("default").map(|v| DynamicValue::from_json(v.clone())),
        validation,
        field_template: str_attr(obj, "field_template"),
        lookup_model: str_attr(obj, "lookup_model").or_else(|| str_attr(obj, "lookup")),
        lookup_id: str_attr(obj, "lookup_id"),
        lookup_desc: str_attr(obj, "lookup_desc"),
    })
}

fn bool_attr(obj: &serde_json::Map<String, serde_json::Value>, key: &str) -> bool {
    obj.get(key).and_then(|v| v.as_bool()).unwrap_or(false)
}

fn str_attr(obj: &serde_json::Map<String, serde_json::Value>, key: &str) -> Option<String> {
    obj.get(key).and_then(|v| v.as_str()).map(str::to_string)
}
