/// Quotes an administrator-authored identifier (table or column name) for
/// safe interpolation into a dynamically-built SQL statement.
///
/// Schema documents name their own tables and columns; those names are never
/// client input, but they are also not known at compile time, so they can't
/// go through sqlx's parameter binding like ordinary values. Quoting (and
/// doubling any embedded `"`) is what Postgres itself recommends for
/// identifiers that come from outside the statement text (§9 design note).
pub fn quote_ident(name: &str) -> String {
    format!("\"{}\"", name.replace('"', "\"\""))
}

/// Quotes a dotted path of identifiers, e.g. for `schema.table` references.
pub fn quote_qualified(parts: &[&str]) -> String {
    parts.iter().map(|p| quote_ident(p)).collect::<Vec<_>>().join(".")
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn quotes_plain_identifier() {
        assert_eq!(quote_ident("users"), "\"users\"");
    }

    #[test]
    fn doubles_embedded_quote() {
        assert_eq!(quote_ident("weird\"name"), "\"weird\"\"name\"");
    }

    #[test]
    fn quotes_qualified_path() {
        assert_eq!(quote_qualified(&["users", "id"]), "\"users\".\"id\"");
    }
}
