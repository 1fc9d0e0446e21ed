use sprunje_core::{parse_contexts, ViewContext};

/// Parses a raw query string into ordered `(key, value)` pairs, preserving
/// request order since sprunje sorts are applied in the order they arrive
/// (§4.4).
pub fn parse_query_pairs(raw_query: Option<&str>) -> Vec<(String, String)> {
    raw_query
        .map(|q| serde_urlencoded::from_str::<Vec<(String, String)>>(q).unwrap_or_default())
        .unwrap_or_default()
}

/// Extracts and parses the `context` query parameter (§4.6.3).
pub fn extract_context_param(pairs: &[(String, String)]) -> Vec<ViewContext> {
    pairs
        .iter()
        .find(|(k, _)| k == "context")
        .map(|(_, v)| parse_contexts(v))
        .unwrap_or_default()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn parses_pairs_in_order() {
        let pairs = parse_query_pairs(Some("sorts[name]=asc&sorts[id]=desc"));
        assert_eq!(
            pairs,
            vec![
                ("sorts[name]".to_string(), "asc".to_string()),
                ("sorts[id]".to_string(), "desc".to_string())
            ]
        );
    }

    #[test]
    fn none_query_yields_empty_pairs() {
        assert!(parse_query_pairs(None).is_empty());
    }

    #[test]
    fn context_param_is_extracted() {
        let pairs = parse_query_pairs(Some("context=list,form"));
        assert_eq!(extract_context_param(&pairs), vec![ViewContext::List, ViewContext::Form]);
    }

    #[test]
    fn missing_context_param_is_empty() {
        let pairs = parse_query_pairs(Some("page=1"));
        assert!(extract_context_param(&pairs).is_empty());
    }
}
