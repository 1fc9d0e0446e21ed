use std::collections::BTreeMap;

use serde::Serialize;

use crate::types::field_spec::{FieldSpec, ShowIn};
use crate::types::schema::ModelSchema;

/// A named view of a schema used to filter which fields appear in a response (§4.1, glossary).
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord)]
pub enum ViewContext {
    List,
    Form,
    Detail,
    Meta,
}

impl std::str::FromStr for ViewContext {
    type Err = ();

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "list" => Ok(Self::List),
            "form" => Ok(Self::Form),
            "detail" => Ok(Self::Detail),
            "meta" => Ok(Self::Meta),
            _ => Err(()),
        }
    }
}

/// Parses a comma-separated `?context=list,form` parameter. An empty or
/// unrecognized string yields no contexts, which callers treat as "detail".
pub fn parse_contexts(raw: &str) -> Vec<ViewContext> {
    raw.split(',')
        .filter_map(|s| s.trim().parse().ok())
        .collect()
}

/// One field's summary as it appears in a context-filtered schema response.
#[derive(Debug, Clone, Serialize)]
pub struct ContextField {
    pub name: String,
    #[serde(rename = "type")]
    pub field_type: String,
    pub label: Option<String>,
    pub required: bool,
    pub sortable: bool,
    pub filterable: bool,
    pub listable: bool,
}

impl From<&FieldSpec> for ContextField {
    fn from(f: &FieldSpec) -> Self {
        Self {
            name: f.name.clone(),
            field_type: f.field_type.to_string(),
            label: f.label.clone(),
            required: f.required,
            sortable: f.sortable,
            filterable: f.filterable,
            listable: f.listable,
        }
    }
}

fn admissible(field: &FieldSpec, context: ViewContext) -> bool {
    // password never flows into list or detail (§9 design notes)
    if field.field_type.is_password() && matches!(context, ViewContext::List | ViewContext::Detail) {
        return false;
    }
    match context {
        ViewContext::List => field.listable,
        ViewContext::Form => field.is_editable() && field.shown_in(ShowIn::Form),
        ViewContext::Detail => field.shown_in(ShowIn::Detail),
        ViewContext::Meta => false,
    }
}

/// The result of filtering a schema for one or more requested contexts.
///
/// A single requested context returns a flat field list; more than one
/// returns a `contexts` map so the client does not lose per-context
/// listability/editability distinctions by merging (§9 design notes).
#[derive(Debug, Clone, Serialize)]
#[serde(untagged)]
pub enum FilteredSchema {
    Single {
        fields: Vec<ContextField>,
    },
    Multi {
        contexts: BTreeMap<String, Vec<ContextField>>,
    },
}

fn context_name(context: ViewContext) -> &'static str {
    match context {
        ViewContext::List => "list",
        ViewContext::Form => "form",
        ViewContext::Detail => "detail",
        ViewContext::Meta => "meta",
    }
}

/// `FilterForContext(schema, context)` (§4.1). `meta` drops `fields` entirely.
pub fn filter_for_context(schema: &ModelSchema, contexts: &[ViewContext]) -> FilteredSchema {
    if contexts.contains(&ViewContext::Meta) {
        return FilteredSchema::Single { fields: Vec::new() };
    }

    let fields_for = |context: ViewContext| -> Vec<ContextField> {
        schema
            .fields
            .iter()
            .filter(|f| admissible(f, context))
            .map(ContextField::from)
            .collect()
    };

    match contexts {
        [] => FilteredSchema::Single {
            fields: fields_for(ViewContext::Detail),
        },
        [single] => FilteredSchema::Single {
            fields: fields_for(*single),
        },
        many => FilteredSchema::Multi {
            contexts: many
                .iter()
                .map(|c| (context_name(*c).to_string(), fields_for(*c)))
                .collect(),
        },
    }
}
