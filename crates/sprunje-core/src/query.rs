use std::collections::{BTreeMap, HashSet};
use std::str::FromStr;

use serde::Serialize;

use crate::types::schema::ModelSchema;

/// Sort direction applied to one field.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SortOrder {
    Asc,
    Desc,
}

impl FromStr for SortOrder {
    type Err = ();

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "asc" => Ok(Self::Asc),
            "desc" => Ok(Self::Desc),
            _ => Err(()),
        }
    }
}

impl std::fmt::Display for SortOrder {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::Asc => write!(f, "asc"),
            Self::Desc => write!(f, "desc"),
        }
    }
}

impl Serialize for SortOrder {
    fn serialize<S>(&self, serializer: S) -> Result<S::Ok, S::Error>
    where
        S: serde::Serializer,
    {
        serializer.serialize_str(&self.to_string())
    }
}

/// A query string parsed into its sprunje knobs (§4.4), before any
/// schema-aware filtering of unknown/non-sortable/non-filterable fields.
#[derive(Debug, Clone, PartialEq)]
pub struct RawSprunjeParams {
    pub page: usize,
    pub size: usize,
    pub sorts: Vec<(String, SortOrder)>,
    pub filters: Vec<(String, Vec<String>)>,
    pub search: Option<String>,
}

/// Parses `page`, `size`, `sorts[field]=asc|desc`, `filters[field]=value`, and
/// `search` from an ordered list of raw query-string pairs (order matters:
/// "multiple sorts applied in request order", §4.4).
pub fn parse_raw_params(
    pairs: &[(String, String)],
    default_size: usize,
    max_size: usize,
) -> RawSprunjeParams {
    let mut page = 0usize;
    let mut size = default_size;
    let mut sorts = Vec::new();
    let mut filters: Vec<(String, Vec<String>)> = Vec::new();
    let mut search = None;

    for (key, value) in pairs {
        if key == "page" {
            page = value.parse().unwrap_or(0);
        } else if key == "size" {
            size = value.parse().unwrap_or(default_size);
        } else if key == "search" {
            search = Some(value.clone());
        } else if let Some(field) = bracketed_key(key, "sorts") {
            if let Ok(order) = value.parse::<SortOrder>() {
                sorts.push((field.to_string(), order));
            }
        } else if let Some(field) = bracketed_key(key, "filters") {
            let values: Vec<String> = value.split(',').map(str::to_string).collect();
            filters.push((field.to_string(), values));
        }
    }

    if size == 0 || size > max_size {
        size = size.clamp(1, max_size);
    }

    RawSprunjeParams {
        page,
        size,
        sorts,
        filters,
        search,
    }
}

/// `prefix[field]` -> `Some(field)`.
fn bracketed_key<'a>(key: &'a str, prefix: &str) -> Option<&'a str> {
    let rest = key.strip_prefix(prefix)?;
    let rest = rest.strip_prefix('[')?;
    rest.strip_suffix(']')
}

/// Whether a filter value is matched by case-insensitive substring or exact
/// equality; decided by the field's declared type (§4.4).
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum MatchMode {
    Substring,
    Exact,
}

/// Sort/filter parameters after being cross-checked against a schema's
/// declared sortable/filterable fields, with the primary-key tie-breaker
/// sort appended and a [`MatchMode`] resolved per filtered field (§4.4).
#[derive(Debug, Clone, PartialEq)]
pub struct ResolvedSprunjeParams {
    pub page: usize,
    pub size: usize,
    pub sorts: Vec<(String, SortOrder)>,
    pub filters: Vec<(String, Vec<String>, MatchMode)>,
    pub search: Option<String>,
}

/// Resolves raw query parameters against `schema` (§4.4):
/// - sorts naming a non-sortable field are dropped; if none remain, the
///   schema's `default_sort` is used instead
/// - the primary key is appended as a final tie-breaker sort unless already present
/// - filters naming a non-filterable field are dropped
/// - each surviving filter's match mode is decided by its field's declared type
pub fn resolve_sprunje_params(schema: &ModelSchema, raw: RawSprunjeParams) -> ResolvedSprunjeParams {
    let sortable: HashSet<&str> = schema.sortable_fields().into_iter().collect();
    let filterable: HashSet<&str> = schema.filterable_fields().into_iter().collect();

    let mut sorts: Vec<(String, SortOrder)> = raw
        .sorts
        .into_iter()
        .filter(|(field, _)| sortable.contains(field.as_str()))
        .collect();
    if sorts.is_empty() {
        sorts = schema.default_sort.clone();
    }
    if !sorts.iter().any(|(field, _)| field == &schema.primary_key) {
        sorts.push((schema.primary_key.clone(), SortOrder::Asc));
    }

    let filters = raw
        .filters
        .into_iter()
        .filter(|(field, _)| filterable.contains(field.as_str()))
        .map(|(field, values)| {
            let mode = schema
                .field(&field)
                .map(|f| {
                    if f.field_type.is_exact_match_type() {
                        MatchMode::Exact
                    } else {
                        MatchMode::Substring
                    }
                })
                .unwrap_or(MatchMode::Substring);
            (field, values, mode)
        })
        .collect();

    ResolvedSprunjeParams {
        page: raw.page,
        size: raw.size,
        sorts,
        filters,
        search: raw.search,
    }
}

/// One canonical JSON page of list results (§4.4 result shape).
#[derive(Debug, Clone, Serialize)]
pub struct SprunjePage<R> {
    pub count: i64,
    pub count_filtered: i64,
    pub rows: Vec<R>,
    pub listable: Vec<String>,
    pub sortable: Vec<String>,
    pub filterable: Vec<String>,
    pub sorts: BTreeMap<String, SortOrder>,
    pub filters: BTreeMap<String, Vec<String>>,
    pub size: usize,
    pub page: usize,
}

#[cfg(test)]
mod tests {
    use super::*;

    fn pairs(raw: &[(&str, &str)]) -> Vec<(String, String)> {
        raw.iter().map(|(k, v)| (k.to_string(), v.to_string())).collect()
    }

    #[test]
    fn parses_page_and_size() {
        let p = parse_raw_params(&pairs(&[("page", "2"), ("size", "5")]), 10, 100);
        assert_eq!(p.page, 2);
        assert_eq!(p.size, 5);
    }

    #[test]
    fn defaults_when_absent() {
        let p = parse_raw_params(&[], 10, 100);
        assert_eq!(p.page, 0);
        assert_eq!(p.size, 10);
    }

    #[test]
    fn size_is_capped_at_max() {
        let p = parse_raw_params(&pairs(&[("size", "500")]), 10, 100);
        assert_eq!(p.size, 100);
    }

    #[test]
    fn size_zero_clamps_to_one() {
        let p = parse_raw_params(&pairs(&[("size", "0")]), 10, 100);
        assert_eq!(p.size, 1);
    }

    #[test]
    fn parses_sorts_in_request_order() {
        let p = parse_raw_params(
            &pairs(&[("sorts[name]", "asc"), ("sorts[id]", "desc")]),
            10,
            100,
        );
        assert_eq!(
            p.sorts,
            vec![("name".to_string(), SortOrder::Asc), ("id".to_string(), SortOrder::Desc)]
        );
    }

    #[test]
    fn invalid_sort_order_is_ignored() {
        let p = parse_raw_params(&pairs(&[("sorts[name]", "sideways")]), 10, 100);
        assert!(p.sorts.is_empty());
    }

    #[test]
    fn parses_comma_separated_filter_values() {
        let p = parse_raw_params(&pairs(&[("filters[status]", "active,pending")]), 10, 100);
        assert_eq!(
            p.filters,
            vec![("status".to_string(), vec!["active".to_string(), "pending".to_string()])]
        );
    }

    #[test]
    fn parses_search() {
        let p = parse_raw_params(&pairs(&[("search", "alice")]), 10, 100);
        assert_eq!(p.search, Some("alice".to_string()));
    }

    #[test]
    fn ignores_unrecognized_keys() {
        let p = parse_raw_params(&pairs(&[("bogus", "x")]), 10, 100);
        assert_eq!(
            p,
            RawSprunjeParams {
                page: 0,
                size: 10,
                sorts: vec![],
                filters: vec![],
                search: None,
            }
        );
    }

    #[test]
    fn sort_order_display() {
        assert_eq!(SortOrder::Asc.to_string(), "asc");
        assert_eq!(SortOrder::Desc.to_string(), "desc");
    }

    fn test_schema() -> ModelSchema {
        crate::types::schema::parse_schema(
            "users",
            &serde_json::json!({
                "table": "users",
                "fields": {
                    "id": {"type": "integer", "auto_increment": true},
                    "user_name": {"type": "string", "sortable": true, "filterable": true},
                    "age": {"type": "integer", "filterable": true},
                    "bio": {"type": "text"}
                },
                "default_sort": {"user_name": "asc"}
            }),
        )
        .unwrap()
    }

    #[test]
    fn resolve_drops_non_sortable_fields() {
        let raw = RawSprunjeParams {
            page: 0,
            size: 10,
            sorts: vec![("bio".to_string(), SortOrder::Asc)],
            filters: vec![],
            search: None,
        };
        let resolved = resolve_sprunje_params(&test_schema(), raw);
        assert_eq!(
            resolved.sorts,
            vec![
                ("user_name".to_string(), SortOrder::Asc),
                ("id".to_string(), SortOrder::Asc)
            ]
        );
    }

    #[test]
    fn resolve_falls_back_to_default_sort() {
        let raw = RawSprunjeParams {
            page: 0,
            size: 10,
            sorts: vec![],
            filters: vec![],
            search: None,
        };
        let resolved = resolve_sprunje_params(&test_schema(), raw);
        assert_eq!(
            resolved.sorts,
            vec![
                ("user_name".to_string(), SortOrder::Asc),
                ("id".to_string(), SortOrder::Asc)
            ]
        );
    }

    #[test]
    fn resolve_appends_primary_key_tiebreaker() {
        let raw = RawSprunjeParams {
            page: 0,
            size: 10,
            sorts: vec![("user_name".to_string(), SortOrder::Desc)],
            filters: vec![],
            search: None,
        };
        let resolved = resolve_sprunje_params(&test_schema(), raw);
        assert_eq!(
            resolved.sorts,
            vec![
                ("user_name".to_string(), SortOrder::Desc),
                ("id".to_string(), SortOrder::Asc)
            ]
        );
    }

    #[test]
    fn resolve_drops_non_filterable_fields() {
        let raw = RawSprunjeParams {
            page: 0,
            size: 10,
            sorts: vec![],
            filters: vec![("bio".to_string(), vec!["x".to_string()])],
            search: None,
        };
        let resolved = resolve_sprunje_params(&test_schema(), raw);
        assert!(resolved.filters.is_empty());
    }

    #[test]
    fn resolve_assigns_match_mode_by_field_type() {
        let raw = RawSprunjeParams {
            page: 0,
            size: 10,
            sorts: vec![],
            filters: vec![
                ("user_name".to_string(), vec!["ali".to_string()]),
                ("age".to_string(), vec!["30".to_string()]),
            ],
            search: None,
        };
        let resolved = resolve_sprunje_params(&test_schema(), raw);
        let modes: BTreeMap<_, _> = resolved
            .filters
            .iter()
            .map(|(f, _, m)| (f.clone(), *m))
            .collect();
        assert_eq!(modes.get("user_name"), Some(&MatchMode::Substring));
        assert_eq!(modes.get("age"), Some(&MatchMode::Exact));
    }
}
