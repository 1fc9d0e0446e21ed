use std::collections::BTreeMap;
use std::future::Future;

use sprunje_core::{DynamicValue, ModelSchema, ResolvedSprunjeParams, SprunjePage};

use crate::error::BackendError;
use crate::record::Record;

/// Storage-agnostic trait implementing the Model Binder's persistence
/// operations (§4.2): New (insert), Find (by primary key or by sprunje
/// query), Update, and the two delete modes a schema may declare.
///
/// Uses RPITIT (return position impl Trait in trait) for async methods,
/// avoiding the `async-trait` crate.
pub trait RecordStore: Send + Sync {
    /// Inserts a new row for `schema` from a validated field map and returns
    /// the persisted record (including backend-generated fields such as an
    /// auto-increment primary key).
    fn insert(
        &self,
        schema: &ModelSchema,
        fields: BTreeMap<String, DynamicValue>,
    ) -> impl Future<Output = Result<Record, BackendError>> + Send;

    /// Finds a single record by primary key.
    ///
    /// Returns `BackendError::RecordNotFound` if no row matches, or if
    /// `schema.soft_delete` is set and the matching row is soft-deleted.
    fn find(
        &self,
        schema: &ModelSchema,
        pk: &DynamicValue,
    ) -> impl Future<Output = Result<Record, BackendError>> + Send;

    /// Applies a validated partial field map to the record at `pk` and
    /// returns the updated record.
    fn update(
        &self,
        schema: &ModelSchema,
        pk: &DynamicValue,
        fields: BTreeMap<String, DynamicValue>,
    ) -> impl Future<Output = Result<Record, BackendError>> + Send;

    /// Permanently removes the record at `pk`.
    fn delete(&self, schema: &ModelSchema, pk: &DynamicValue) -> impl Future<Output = Result<(), BackendError>> + Send;

    /// Marks the record at `pk` as deleted without removing the row, per a
    /// schema's `soft_delete` flag.
    fn soft_delete(
        &self,
        schema: &ModelSchema,
        pk: &DynamicValue,
    ) -> impl Future<Output = Result<(), BackendError>> + Send;

    /// Executes a sprunje-resolved listing query (pagination, sort, filter,
    /// search) against `schema`'s table.
    fn list(
        &self,
        schema: &ModelSchema,
        params: &ResolvedSprunjeParams,
    ) -> impl Future<Output = Result<SprunjePage<Record>, BackendError>> + Send;

    /// Lists the rows related to `pk` through a declared relationship or
    /// detail named `relation` (§4.7). `related_schema` is the schema of the
    /// model at the far end of the relation, resolved by the caller via the
    /// schema loader.
    fn list_related(
        &self,
        schema: &ModelSchema,
        pk: &DynamicValue,
        relation: &str,
        related_schema: &ModelSchema,
        params: &ResolvedSprunjeParams,
    ) -> impl Future<Output = Result<SprunjePage<Record>, BackendError>> + Send;
}
