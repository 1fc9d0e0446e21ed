use std::collections::HashMap;
use std::sync::Arc;

use sprunje_core::SchemaLoader;
use sprunje_postgres::PostgresStore;

use crate::config::Config;
use crate::error::ApiError;

/// Everything a request handler needs: the schema cache, the default and
/// any named database connections (§4.9.3 `CRUD6_CONNECTIONS`), and the
/// resolved page-size bounds.
#[derive(Clone)]
pub struct AppState {
    pub schemas: Arc<SchemaLoader>,
    pub default_store: Arc<PostgresStore>,
    pub connections: Arc<HashMap<String, Arc<PostgresStore>>>,
    pub default_page_size: usize,
    pub max_page_size: usize,
    pub debug_mode: bool,
}

impl AppState {
    /// Connects the default pool plus every named `CRUD6_CONNECTIONS` entry.
    pub async fn connect(config: &Config) -> Result<Self, sqlx::Error> {
        let default_pool = sqlx::PgPool::connect(&config.database_url).await?;
        let mut connections = HashMap::new();
        for (name, url) in config.connection_map() {
            let pool = sqlx::PgPool::connect(&url).await?;
            connections.insert(name, Arc::new(PostgresStore::new(pool)));
        }

        Ok(Self {
            schemas: Arc::new(SchemaLoader::new(config.schema_dir.clone())),
            default_store: Arc::new(PostgresStore::new(default_pool)),
            connections: Arc::new(connections),
            default_page_size: config.default_page_size,
            max_page_size: config.max_page_size,
            debug_mode: config.debug_mode,
        })
    }

    /// Builds state directly from an already-connected store, bypassing
    /// `clap` parsing; used by integration tests.
    pub fn from_store(
        schema_dir: impl Into<std::path::PathBuf>,
        store: PostgresStore,
        default_page_size: usize,
        max_page_size: usize,
    ) -> Self {
        Self {
            schemas: Arc::new(SchemaLoader::new(schema_dir)),
            default_store: Arc::new(store),
            connections: Arc::new(HashMap::new()),
            default_page_size,
            max_page_size,
            debug_mode: false,
        }
    }

    /// Resolves the store a `{model}@{connection}` route segment should use.
    /// An unrecognized connection name is a client error, not a silent
    /// fallback to the default (§4.9.3).
    pub fn store_for(&self, connection: Option<&str>) -> Result<Arc<PostgresStore>, ApiError> {
        match connection {
            None => Ok(Arc::clone(&self.default_store)),
            Some(name) => self.connections.get(name).cloned().ok_or_else(|| ApiError::BadRequest {
                message: format!("unknown connection '{name}'"),
            }),
        }
    }
}
