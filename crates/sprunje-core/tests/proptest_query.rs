use proptest::prelude::*;

use sprunje_core::types::schema::parse_schema;
use sprunje_core::{parse_raw_params, resolve_sprunje_params, RawSprunjeParams, SortOrder};

fn users_schema() -> sprunje_core::ModelSchema {
    parse_schema(
        "users",
        &serde_json::json!({
            "table": "users",
            "fields": {
                "id": {"type": "integer", "auto_increment": true},
                "user_name": {"type": "string", "sortable": true, "filterable": true},
                "age": {"type": "integer", "sortable": true, "filterable": true}
            },
            "default_sort": {"user_name": "asc"}
        }),
    )
    .unwrap()
}

proptest! {
    // §4.4: size is always clamped into [1, max_size] regardless of the raw query value.
    #[test]
    fn parse_raw_params_clamps_size(raw_size in 0usize..10_000, max_size in 1usize..=500) {
        let pairs = vec![("size".to_string(), raw_size.to_string())];
        let parsed = parse_raw_params(&pairs, 10, max_size);
        prop_assert!(parsed.size >= 1);
        prop_assert!(parsed.size <= max_size);
    }

    // resolve_sprunje_params never panics and always appends the primary key
    // as a tie-breaker sort when it isn't already named (§4.4).
    #[test]
    fn resolve_sprunje_params_always_includes_primary_key_sort(
        field_names in prop::collection::vec("[a-z_]{1,12}", 0..5),
        order_flags in prop::collection::vec(any::<bool>(), 0..5),
    ) {
        let schema = users_schema();
        let sorts: Vec<(String, SortOrder)> = field_names
            .into_iter()
            .zip(order_flags)
            .map(|(f, asc)| (f, if asc { SortOrder::Asc } else { SortOrder::Desc }))
            .collect();
        let raw = RawSprunjeParams {
            page: 0,
            size: 10,
            sorts,
            filters: vec![],
            search: None,
        };
        let resolved = resolve_sprunje_params(&schema, raw);
        prop_assert!(resolved.sorts.iter().any(|(f, _)| f == &schema.primary_key));
    }

    // Filters naming a field the schema doesn't declare as filterable are dropped,
    // never surfaced, and never cause a panic (§4.4).
    #[test]
    fn resolve_sprunje_params_drops_unknown_filters(
        field in "[a-z_]{1,12}",
        values in prop::collection::vec("[a-z0-9]{0,8}", 0..3),
    ) {
        let schema = users_schema();
        let is_known = schema.filterable_fields().contains(&field.as_str());
        let raw = RawSprunjeParams {
            page: 0,
            size: 10,
            sorts: vec![],
            filters: vec![(field.clone(), values)],
            search: None,
        };
        let resolved = resolve_sprunje_params(&schema, raw);
        if !is_known {
            prop_assert!(resolved.filters.iter().all(|(f, _, _)| f != &field));
        }
    }
}
