use std::collections::HashMap;

use clap::Parser;

/// Process configuration, parsed from CLI flags with a `CRUD6_`-prefixed
/// environment variable fallback for every field (§4.9.3).
#[derive(Debug, Clone, Parser)]
#[command(name = "sprunje-server", version, about = "Schema-driven CRUD HTTP service")]
pub struct Config {
    /// Enables verbose request/response logging.
    #[arg(long, env = "CRUD6_DEBUG_MODE", default_value_t = false)]
    pub debug_mode: bool,

    /// Directory schema files are loaded from.
    #[arg(long, env = "CRUD6_SCHEMA_DIR", default_value = "./schemas")]
    pub schema_dir: String,

    /// Page size used when a list request omits `size`.
    #[arg(long, env = "CRUD6_DEFAULT_PAGE_SIZE", default_value_t = 10)]
    pub default_page_size: usize,

    /// Upper bound a client's requested `size` is clamped to.
    #[arg(long, env = "CRUD6_MAX_PAGE_SIZE", default_value_t = 100)]
    pub max_page_size: usize,

    /// Connection string for the default (unnamed) database connection.
    #[arg(long, env = "CRUD6_DATABASE_URL")]
    pub database_url: String,

    /// Address the HTTP server binds to.
    #[arg(long, env = "CRUD6_BIND_ADDR", default_value = "0.0.0.0:8080")]
    pub bind_addr: String,

    /// Extra named connections as `name=url` pairs, selected by a
    /// `{model}@{connection}` route segment (§4.9.3).
    #[arg(long, env = "CRUD6_CONNECTIONS", value_delimiter = ',')]
    pub connections: Vec<String>,
}

impl Config {
    /// Parses `connections` into a `name -> url` map, discarding malformed entries.
    pub fn connection_map(&self) -> HashMap<String, String> {
        self.connections
            .iter()
            .filter_map(|entry| entry.split_once('='))
            .map(|(name, url)| (name.to_string(), url.to_string()))
            .collect()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn parse(args: &[&str]) -> Config {
        Config::parse_from(std::iter::once("sprunje-server").chain(args.iter().copied()))
    }

    #[test]
    fn defaults_are_applied() {
        let cfg = parse(&["--database-url", "postgres://x"]);
        assert!(!cfg.debug_mode);
        assert_eq!(cfg.schema_dir, "./schemas");
        assert_eq!(cfg.default_page_size, 10);
        assert_eq!(cfg.max_page_size, 100);
        assert_eq!(cfg.bind_addr, "0.0.0.0:8080");
        assert!(cfg.connections.is_empty());
    }

    #[test]
    fn connections_are_parsed_as_name_url_pairs() {
        let cfg = parse(&[
            "--database-url",
            "postgres://default",
            "--connections",
            "reporting=postgres://reporting,archive=postgres://archive",
        ]);
        let map = cfg.connection_map();
        assert_eq!(map.get("reporting"), Some(&"postgres://reporting".to_string()));
        assert_eq!(map.get("archive"), Some(&"postgres://archive".to_string()));
    }

    #[test]
    fn malformed_connection_entry_is_dropped() {
        let cfg = parse(&[
            "--database-url",
            "postgres://default",
            "--connections",
            "not-a-pair",
        ]);
        assert!(cfg.connection_map().is_empty());
    }
}
