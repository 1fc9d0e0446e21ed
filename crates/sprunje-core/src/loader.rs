use std::collections::HashMap;
use std::path::{Path, PathBuf};
use std::sync::{Arc, RwLock};

use crate::error::SchemaError;
use crate::types::schema::{parse_schema, ModelSchema};

/// Errors surfaced by [`SchemaLoader::get`] (§4.1, §7).
#[derive(Debug, Clone)]
#[non_exhaustive]
pub enum LoaderError {
    NotFound(String),
    Malformed(SchemaError),
    Io(String),
}

impl std::fmt::Display for LoaderError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::NotFound(model) => write!(f, "no schema file found for model '{model}'"),
            Self::Malformed(err) => write!(f, "schema file is malformed: {err}"),
            Self::Io(msg) => write!(f, "failed to read schema file: {msg}"),
        }
    }
}

impl std::error::Error for LoaderError {}

impl From<SchemaError> for LoaderError {
    fn from(err: SchemaError) -> Self {
        Self::Malformed(err)
    }
}

/// Caches parsed schemas keyed by `(model, connection)`, read-rarely-written
/// pattern per the concurrency model (§5): lookups take a read lock, and
/// only a cache miss takes a write lock to populate. Two requests racing to
/// populate the same key both parse and one write simply overwrites the
/// other's identical result, which is harmless.
pub struct SchemaLoader {
    schema_dir: PathBuf,
    cache: RwLock<HashMap<(String, Option<String>), Arc<ModelSchema>>>,
}

impl SchemaLoader {
    pub fn new(schema_dir: impl Into<PathBuf>) -> Self {
        Self {
            schema_dir: schema_dir.into(),
            cache: RwLock::new(HashMap::new()),
        }
    }

    /// `GetSchema(model)` (§4.1): returns the cached schema for `model`,
    /// loading and parsing `{schema_dir}/{model}.json` on a cache miss.
    pub fn get(&self, model: &str, connection: Option<&str>) -> Result<Arc<ModelSchema>, LoaderError> {
        let key = (model.to_string(), connection.map(str::to_string));

        if let Some(schema) = self.cache.read().unwrap().get(&key) {
            return Ok(Arc::clone(schema));
        }

        let schema = Arc::new(self.load_from_disk(model)?);
        self.cache.write().unwrap().insert(key, Arc::clone(&schema));
        Ok(schema)
    }

    /// Drops all cached schemas, forcing the next `get` to re-read from disk.
    pub fn invalidate_all(&self) {
        self.cache.write().unwrap().clear();
    }

    fn load_from_disk(&self, model: &str) -> Result<ModelSchema, LoaderError> {
        let path = self.schema_path(model);
        let raw = std::fs::read_to_string(&path).map_err(|_| LoaderError::NotFound(model.to_string()))?;
        let json: serde_json::Value = serde_json::from_str(&raw).map_err(|e| {
            LoaderError::Malformed(SchemaError::MalformedJson {
                model: model.to_string(),
                reason: e.to_string(),
            })
        })?;
        Ok(parse_schema(model, &json)?)
    }

    fn schema_path(&self, model: &str) -> PathBuf {
        self.schema_dir.join(format!("{model}.json"))
    }
}

/// Lists the model names discoverable as `*.json` files directly under `dir`.
pub fn discover_models(dir: &Path) -> Vec<String> {
    let Ok(entries) = std::fs::read_dir(dir) else {
        return Vec::new();
    };
    let mut models: Vec<String> = entries
        .filter_map(Result::ok)
        .filter(|e| e.path().extension().and_then(|ext| ext.to_str()) == Some("json"))
        .filter_map(|e| e.path().file_stem().map(|s| s.to_string_lossy().into_owned()))
        .collect();
    models.sort();
    models
}

#[cfg(test)]
mod tests {
    use super::*;

    fn write_schema(dir: &Path, model: &str, json: &serde_json::Value) {
        std::fs::write(dir.join(format!("{model}.json")), json.to_string()).unwrap();
    }

    #[test]
    fn loads_and_caches_a_schema() {
        let dir = std::env::temp_dir().join(format!("sprunje-loader-test-{}", std::process::id()));
        std::fs::create_dir_all(&dir).unwrap();
        write_schema(
            &dir,
            "users",
            &serde_json::json!({"table": "users", "fields": {"id": {"type": "integer"}}}),
        );

        let loader = SchemaLoader::new(&dir);
        let schema = loader.get("users", None).unwrap();
        assert_eq!(schema.table, "users");

        let cached = loader.get("users", None).unwrap();
        assert!(Arc::ptr_eq(&schema, &cached));

        std::fs::remove_dir_all(&dir).ok();
    }

    #[test]
    fn missing_schema_file_is_not_found() {
        let dir = std::env::temp_dir().join(format!("sprunje-loader-missing-{}", std::process::id()));
        std::fs::create_dir_all(&dir).unwrap();
        let loader = SchemaLoader::new(&dir);
        let err = loader.get("nonexistent", None).unwrap_err();
        assert!(matches!(err, LoaderError::NotFound(_)));
        std::fs::remove_dir_all(&dir).ok();
    }

    #[test]
    fn malformed_schema_file_is_reported() {
        let dir = std::env::temp_dir().join(format!("sprunje-loader-malformed-{}", std::process::id()));
        std::fs::create_dir_all(&dir).unwrap();
        write_schema(&dir, "broken", &serde_json::json!({"fields": {}}));
        let loader = SchemaLoader::new(&dir);
        let err = loader.get("broken", None).unwrap_err();
        assert!(matches!(err, LoaderError::Malformed(_)));
        std::fs::remove_dir_all(&dir).ok();
    }

    #[test]
    fn invalid_json_syntax_is_reported_as_malformed() {
        let dir = std::env::temp_dir().join(format!("sprunje-loader-invalid-json-{}", std::process::id()));
        std::fs::create_dir_all(&dir).unwrap();
        std::fs::write(dir.join("broken.json"), "{ not valid json").unwrap();
        let loader = SchemaLoader::new(&dir);
        let err = loader.get("broken", None).unwrap_err();
        assert!(matches!(err, LoaderError::Malformed(_)));
        std::fs::remove_dir_all(&dir).ok();
    }

    #[test]
    fn discover_models_lists_json_stems() {
        let dir = std::env::temp_dir().join(format!("sprunje-loader-discover-{}", std::process::id()));
        std::fs::create_dir_all(&dir).unwrap();
        write_schema(&dir, "users", &serde_json::json!({"table": "users", "fields": {"id": {"type": "integer"}}}));
        write_schema(&dir, "roles", &serde_json::json!({"table": "roles", "fields": {"id": {"type": "integer"}}}));
        assert_eq!(discover_models(&dir), vec!["roles".to_string(), "users".to_string()]);
        std::fs::remove_dir_all(&dir).ok();
    }
}
