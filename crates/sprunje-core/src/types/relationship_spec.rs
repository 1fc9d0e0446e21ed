use crate::error::SchemaError;

/// One step of a `belongs_to_many_through` chain: an intermediate table and
/// the column pair that joins it to the previous step.
#[derive(Debug, Clone, PartialEq)]
pub struct ThroughStep {
    pub table: String,
    pub from_key: String,
    pub to_key: String,
}

/// An explicit many-to-many or through-relationship declared in a schema's
/// `relationships` list (§3.1).
#[derive(Debug, Clone, PartialEq)]
pub enum RelationshipKind {
    ManyToMany {
        pivot_table: String,
        foreign_key: String,
        related_key: String,
    },
    BelongsToManyThrough { chain: Vec<ThroughStep> },
}

#[derive(Debug, Clone, PartialEq)]
pub struct RelationshipSpec {
    pub name: String,
    pub related_model: String,
    pub kind: RelationshipKind,
}

pub fn relationship_spec_from_json(
    raw: &serde_json::Value,
) -> Result<RelationshipSpec, SchemaError> {
    let obj = raw
        .as_object()
        .ok_or_else(|| SchemaError::MalformedJson {
            model: "relationship".into(),
            reason: "relationship entry must be a JSON object".into(),
        })?;
    let name = obj
        .get("name")
        .and_then(|v| v.as_str())
        .ok_or(SchemaError::MissingAttribute("name"))?
        .to_string();
    let related_model = obj
        .get("model")
        .and_then(|v| v.as_str())
        .unwrap_or(&name)
        .to_string();
    let type_str = obj
        .get("type")
        .and_then(|v| v.as_str())
        .ok_or(SchemaError::MissingAttribute("type"))?;

    let kind = match type_str {
        "many_to_many" => {
            let pivot_table = require_str(obj, "pivot_table", &name)?;
            let foreign_key = require_str(obj, "foreign_key", &name)?;
            let related_key = require_str(obj, "related_key", &name)?;
            RelationshipKind::ManyToMany {
                pivot_table,
                foreign_key,
                related_key,
            }
        }
        "belongs_to_many_through" => {
            let chain_raw = obj
                .get("chain")
                .and_then(|v| v.as_array())
                .ok_or_else(|| SchemaError::InvalidRelationship {
                    name: name.clone(),
                    reason: "belongs_to_many_through requires a non-empty 'chain' array".into(),
                })?;
            if chain_raw.is_empty() {
                return Err(SchemaError::InvalidRelationship {
                    name,
                    reason: "chain must not be empty".into(),
                });
            }
            let mut chain = Vec::with_capacity(chain_raw.len());
            for step in chain_raw {
                let step_obj = step.as_object().ok_or_else(|| SchemaError::InvalidRelationship {
                    name: name.clone(),
                    reason: "chain entries must be JSON objects".into(),
                })?;
                chain.push(ThroughStep {
                    table: require_str(step_obj, "table", &name)?,
                    from_key: require_str(step_obj, "from_key", &name)?,
                    to_key: require_str(step_obj, "to_key", &name)?,
                });
            }
            RelationshipKind::BelongsToManyThrough { chain }
        }
        other => {
            return Err(SchemaError::InvalidRelationship {
                name,
                reason: format!("unknown relationship type '{other}'"),
            })
        }
    };

    Ok(RelationshipSpec {
        name,
        related_model,
        kind,
    })
}

fn require_str(
    obj: &serde_json::Map<String, serde_json::Value>,
    key: &str,
    rel_name: &str,
) -> Result<String, SchemaError> {
    obj.get(key)
        .and_then(|v| v.as_str())
        .map(str::to_string)
        .ok_or_else(|| SchemaError::InvalidRelationship {
            name: rel_name.to_string(),
            reason: format!("missing required attribute '{key}'"),
        })
}
