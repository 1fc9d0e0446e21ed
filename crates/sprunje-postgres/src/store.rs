use std::collections::BTreeMap;

use sqlx::postgres::PgRow;
use sqlx::{Column, PgPool, Row};

use sprunje_backend::{BackendError, Record, RecordStore};
use sprunje_core::{
    DynamicValue, FieldType, MatchMode, ModelSchema, RelationResolution, RelationshipKind,
    ResolvedSprunjeParams, SortOrder, SprunjePage,
};

use crate::ident::quote_ident;
use crate::value::{bind_value, decode_column};

/// A [`RecordStore`] backed by a Postgres connection pool.
///
/// Table and column names come from schema documents authored by an
/// administrator, not from client input, but they are only known at runtime,
/// so every statement here is built with [`quote_ident`] and executed with
/// `sqlx::query`/`query_as` rather than the compile-time-checked
/// `query!`/`query_as!` macros (those require the referenced tables to exist
/// at `cargo build` time).
pub struct PostgresStore {
    pool: PgPool,
}

impl PostgresStore {
    pub fn new(pool: PgPool) -> Self {
        Self { pool }
    }

    pub fn pool(&self) -> &PgPool {
        &self.pool
    }
}

const SOFT_DELETE_COLUMN: &str = "deleted_at";

/// The Rust binding type for a column: the declared field's type if the
/// schema names it, or `DateTime` for the timestamp-convention columns a
/// schema's `timestamps`/`soft_delete` flag implies without declaring as a
/// field, or `String` otherwise.
fn column_field_type(schema: &ModelSchema, column: &str) -> FieldType {
    schema.field(column).map(|f| f.field_type.clone()).unwrap_or_else(|| {
        if matches!(column, "created_at" | "updated_at") || column == SOFT_DELETE_COLUMN {
            FieldType::DateTime
        } else {
            FieldType::String
        }
    })
}

fn map_sqlx_error(err: sqlx::Error) -> BackendError {
    if let sqlx::Error::Database(ref db_err) = err {
        if db_err.code().as_deref() == Some("23505") {
            return BackendError::Conflict {
                reason: db_err.message().to_string(),
            };
        }
    }
    BackendError::QueryError {
        message: err.to_string(),
    }
}

/// Builds an explicit, cast-qualified column list for the fields of `schema`
/// named in `allowed`, instead of `SELECT *`/`RETURNING *`: the schema's
/// declared `FieldType` (e.g. `integer`) does not guarantee the table's
/// physical column width (`int4` vs `int8`), and sqlx's typed decode requires
/// an exact match, so each field is cast to the width [`decode_column`]
/// expects. `password`-typed fields are always excluded regardless of
/// `allowed`, mirroring `context::admissible`'s exclusion of them from list
/// and detail views (§9 design notes).
fn select_list(schema: &ModelSchema, allowed: &[&str]) -> String {
    schema
        .fields
        .iter()
        .filter(|f| !f.field_type.is_password() && allowed.contains(&f.name.as_str()))
        .map(|f| {
            let col = quote_ident(&f.name);
            match f.field_type {
                FieldType::Integer => format!("{col}::int8"),
                FieldType::Float | FieldType::Decimal => format!("{col}::float8"),
                _ => col,
            }
        })
        .collect::<Vec<_>>()
        .join(", ")
}

/// The row projection for a single-record read or write (find/insert/update):
/// every declared field, less `password` (§9 design notes — "the Read
/// projection omits it").
fn detail_projection(schema: &ModelSchema) -> Vec<&str> {
    schema.fields.iter().map(|f| f.name.as_str()).collect()
}

/// The row projection for a sprunje list (§4.4 — "only fields in the
/// `listable` set plus the primary key").
fn list_projection(schema: &ModelSchema) -> Vec<&str> {
    let mut fields = schema.listable_fields();
    if !fields.contains(&schema.primary_key.as_str()) {
        fields.push(&schema.primary_key);
    }
    fields
}

fn row_to_record(row: &PgRow, schema: &ModelSchema) -> Result<Record, BackendError> {
    let columns: std::collections::HashSet<&str> = row.columns().iter().map(|c| c.name()).collect();
    let mut fields = BTreeMap::new();
    for field in &schema.fields {
        if columns.contains(field.name.as_str()) {
            fields.insert(field.name.clone(), decode_column(row, &field.name, &field.field_type)?);
        }
    }
    Ok(Record::new(fields))
}

fn coerce_filter_value(field_type: &FieldType, raw: &str) -> DynamicValue {
    match field_type {
        FieldType::Integer => raw.parse::<i64>().map(DynamicValue::Integer).unwrap_or(DynamicValue::Null),
        FieldType::Float | FieldType::Decimal => {
            raw.parse::<f64>().map(DynamicValue::Float).unwrap_or(DynamicValue::Null)
        }
        FieldType::Boolean(_) => match raw {
            "true" | "1" | "yes" => DynamicValue::Boolean(true),
            "false" | "0" | "no" => DynamicValue::Boolean(false),
            _ => DynamicValue::Null,
        },
        _ => DynamicValue::Text(raw.to_string()),
    }
}

/// An SQL fragment plus the (field-typed) values it still needs bound, built
/// incrementally so the `$n` placeholder numbering stays in lockstep with the
/// bind order regardless of how many base conditions precede it.
struct WhereBuilder {
    parts: Vec<String>,
    binds: Vec<(FieldType, DynamicValue)>,
    next_index: usize,
}

impl WhereBuilder {
    fn new(next_index: usize) -> Self {
        Self {
            parts: Vec::new(),
            binds: Vec::new(),
            next_index,
        }
    }

    fn push_eq(&mut self, column: &str, field_type: FieldType, value: DynamicValue) {
        self.parts.push(format!("{} = ${}", quote_ident(column), self.next_index));
        self.binds.push((field_type, value));
        self.next_index += 1;
    }

    fn push_raw(&mut self, sql: String, field_type: FieldType, value: DynamicValue) {
        self.parts.push(sql.replace("{}", &format!("${}", self.next_index)));
        self.binds.push((field_type, value));
        self.next_index += 1;
    }

    fn push_field_filters(&mut self, schema: &ModelSchema, params: &ResolvedSprunjeParams) {
        for (field, values, mode) in &params.filters {
            let Some(spec) = schema.field(field) else { continue };
            let col = quote_ident(field);
            let mut clauses = Vec::with_capacity(values.len());
            for raw in values {
                match mode {
                    MatchMode::Exact => {
                        let value = coerce_filter_value(&spec.field_type, raw);
                        clauses.push(format!("{col} = ${}", self.next_index));
                        self.binds.push((spec.field_type.clone(), value));
                        self.next_index += 1;
                    }
                    MatchMode::Substring => {
                        clauses.push(format!("{col}::text ILIKE ${}", self.next_index));
                        self.binds
                            .push((FieldType::String, DynamicValue::Text(format!("%{raw}%"))));
                        self.next_index += 1;
                    }
                }
            }
            if !clauses.is_empty() {
                self.parts.push(format!("({})", clauses.join(" OR ")));
            }
        }
    }

    fn push_search(&mut self, schema: &ModelSchema, params: &ResolvedSprunjeParams) {
        let Some(term) = params.search.as_deref().filter(|s| !s.is_empty()) else { return };
        let searchable = schema.searchable_fields();
        if searchable.is_empty() {
            return;
        }
        let mut clauses = Vec::with_capacity(searchable.len());
        for field in searchable {
            clauses.push(format!("{}::text ILIKE ${}", quote_ident(field), self.next_index));
            self.binds
                .push((FieldType::String, DynamicValue::Text(format!("%{term}%"))));
            self.next_index += 1;
        }
        self.parts.push(format!("({})", clauses.join(" OR ")));
    }

    fn sql(&self) -> String {
        if self.parts.is_empty() {
            String::new()
        } else {
            format!("WHERE {}", self.parts.join(" AND "))
        }
    }
}

fn order_by_clause(schema: &ModelSchema, params: &ResolvedSprunjeParams) -> String {
    if params.sorts.is_empty() {
        return format!("ORDER BY {}", quote_ident(&schema.primary_key));
    }
    let parts: Vec<String> = params
        .sorts
        .iter()
        .map(|(field, order)| {
            let dir = match order {
                SortOrder::Asc => "ASC",
                SortOrder::Desc => "DESC",
            };
            format!("{} {dir}", quote_ident(field))
        })
        .collect();
    format!("ORDER BY {}", parts.join(", "))
}

async fn run_list(
    pool: &PgPool,
    schema: &ModelSchema,
    params: &ResolvedSprunjeParams,
    from_clause: &str,
    mut base: WhereBuilder,
    projection: &[&str],
) -> Result<SprunjePage<Record>, BackendError> {
    let base_sql = base.sql();
    let count_total: i64 = bind_and_fetch_scalar(
        pool,
        &format!("SELECT COUNT(*) FROM {from_clause} {base_sql}"),
        &base.binds,
    )
    .await?;

    base.push_field_filters(schema, params);
    base.push_search(schema, params);
    let filtered_sql = base.sql();

    let count_filtered: i64 = bind_and_fetch_scalar(
        pool,
        &format!("SELECT COUNT(*) FROM {from_clause} {filtered_sql}"),
        &base.binds,
    )
    .await?;

    let order = order_by_clause(schema, params);
    let offset = params.page * params.size;
    let rows_sql = format!(
        "SELECT {} FROM {from_clause} {filtered_sql} {order} LIMIT {} OFFSET {}",
        select_list(schema, projection),
        params.size,
        offset
    );
    let mut query = sqlx::query(&rows_sql);
    for (field_type, value) in &base.binds {
        query = bind_value(query, field_type, value);
    }
    let rows = query.fetch_all(pool).await.map_err(map_sqlx_error)?;
    let records = rows
        .iter()
        .map(|r| row_to_record(r, schema))
        .collect::<Result<Vec<_>, _>>()?;

    let sorts = params.sorts.iter().cloned().collect();
    let filters = params
        .filters
        .iter()
        .map(|(f, v, _)| (f.clone(), v.clone()))
        .collect();

    Ok(SprunjePage {
        count: count_total,
        count_filtered,
        rows: records,
        listable: projection.iter().map(|s| s.to_string()).collect(),
        sortable: schema.sortable_fields().into_iter().map(str::to_string).collect(),
        filterable: schema.filterable_fields().into_iter().map(str::to_string).collect(),
        sorts,
        filters,
        size: params.size,
        page: params.page,
    })
}

async fn bind_and_fetch_scalar(
    pool: &PgPool,
    sql: &str,
    binds: &[(FieldType, DynamicValue)],
) -> Result<i64, BackendError> {
    let mut query = sqlx::query(sql);
    for (field_type, value) in binds {
        query = bind_value(query, field_type, value);
    }
    let row = query.fetch_one(pool).await.map_err(map_sqlx_error)?;
    row.try_get::<i64, _>(0).map_err(map_sqlx_error)
}

fn pk_field_type(schema: &ModelSchema) -> FieldType {
    schema
        .field(&schema.primary_key)
        .map(|f| f.field_type.clone())
        .unwrap_or(FieldType::Integer)
}

impl RecordStore for PostgresStore {
    async fn insert(&self, schema: &ModelSchema, fields: BTreeMap<String, DynamicValue>) -> Result<Record, BackendError> {
        let table = quote_ident(&schema.table);
        let columns: Vec<&String> = fields.keys().collect();
        let col_list = columns.iter().map(|c| quote_ident(c)).collect::<Vec<_>>().join(", ");
        let placeholders: Vec<String> = (1..=columns.len()).map(|i| format!("${i}")).collect();
        let sql = format!(
            "INSERT INTO {table} ({col_list}) VALUES ({}) RETURNING {}",
            placeholders.join(", "),
            select_list(schema, &detail_projection(schema))
        );

        let mut query = sqlx::query(&sql);
        for col in &columns {
            let field_type = column_field_type(schema, col);
            query = bind_value(query, &field_type, &fields[*col]);
        }

        let row = query.fetch_one(&self.pool).await.map_err(map_sqlx_error)?;
        row_to_record(&row, schema)
    }

    async fn find(&self, schema: &ModelSchema, pk: &DynamicValue) -> Result<Record, BackendError> {
        let table = quote_ident(&schema.table);
        let pk_col = quote_ident(&schema.primary_key);
        let mut sql = format!("SELECT {} FROM {table} WHERE {pk_col} = $1", select_list(schema, &detail_projection(schema)));
        if schema.soft_delete {
            sql.push_str(&format!(" AND {} IS NULL", quote_ident(SOFT_DELETE_COLUMN)));
        }

        let query = bind_value(sqlx::query(&sql), &pk_field_type(schema), pk);
        let row = query.fetch_optional(&self.pool).await.map_err(map_sqlx_error)?;
        match row {
            Some(row) => row_to_record(&row, schema),
            None => Err(BackendError::RecordNotFound {
                model: schema.model.to_string(),
                pk: pk.to_string(),
            }),
        }
    }

    async fn update(
        &self,
        schema: &ModelSchema,
        pk: &DynamicValue,
        fields: BTreeMap<String, DynamicValue>,
    ) -> Result<Record, BackendError> {
        if fields.is_empty() {
            return self.find(schema, pk).await;
        }
        let table = quote_ident(&schema.table);
        let pk_col = quote_ident(&schema.primary_key);
        let columns: Vec<&String> = fields.keys().collect();
        let set_clause = columns
            .iter()
            .enumerate()
            .map(|(i, c)| format!("{} = ${}", quote_ident(c), i + 1))
            .collect::<Vec<_>>()
            .join(", ");
        let pk_index = columns.len() + 1;
        let sql = format!(
            "UPDATE {table} SET {set_clause} WHERE {pk_col} = ${pk_index} RETURNING {}",
            select_list(schema, &detail_projection(schema))
        );

        let mut query = sqlx::query(&sql);
        for col in &columns {
            let field_type = column_field_type(schema, col);
            query = bind_value(query, &field_type, &fields[*col]);
        }
        query = bind_value(query, &pk_field_type(schema), pk);

        let row = query.fetch_optional(&self.pool).await.map_err(map_sqlx_error)?;
        match row {
            Some(row) => row_to_record(&row, schema),
            None => Err(BackendError::RecordNotFound {
                model: schema.model.to_string(),
                pk: pk.to_string(),
            }),
        }
    }

    async fn delete(&self, schema: &ModelSchema, pk: &DynamicValue) -> Result<(), BackendError> {
        let table = quote_ident(&schema.table);
        let pk_col = quote_ident(&schema.primary_key);
        let sql = format!("DELETE FROM {table} WHERE {pk_col} = $1");
        let query = bind_value(sqlx::query(&sql), &pk_field_type(schema), pk);
        let result = query.execute(&self.pool).await.map_err(map_sqlx_error)?;
        if result.rows_affected() == 0 {
            return Err(BackendError::RecordNotFound {
                model: schema.model.to_string(),
                pk: pk.to_string(),
            });
        }
        Ok(())
    }

    async fn soft_delete(&self, schema: &ModelSchema, pk: &DynamicValue) -> Result<(), BackendError> {
        if !schema.soft_delete {
            return Err(BackendError::Internal {
                message: format!("model '{}' does not declare soft_delete", schema.model),
            });
        }
        let table = quote_ident(&schema.table);
        let pk_col = quote_ident(&schema.primary_key);
        let deleted_col = quote_ident(SOFT_DELETE_COLUMN);
        let sql = if schema.timestamps {
            format!("UPDATE {table} SET {deleted_col} = now(), {} = now() WHERE {pk_col} = $1", quote_ident("updated_at"))
        } else {
            format!("UPDATE {table} SET {deleted_col} = now() WHERE {pk_col} = $1")
        };
        let query = bind_value(sqlx::query(&sql), &pk_field_type(schema), pk);
        let result = query.execute(&self.pool).await.map_err(map_sqlx_error)?;
        if result.rows_affected() == 0 {
            return Err(BackendError::RecordNotFound {
                model: schema.model.to_string(),
                pk: pk.to_string(),
            });
        }
        Ok(())
    }

    async fn list(&self, schema: &ModelSchema, params: &ResolvedSprunjeParams) -> Result<SprunjePage<Record>, BackendError> {
        let from_clause = quote_ident(&schema.table);
        let mut base = WhereBuilder::new(1);
        if schema.soft_delete {
            base.parts
                .push(format!("{} IS NULL", quote_ident(SOFT_DELETE_COLUMN)));
        }
        run_list(&self.pool, schema, params, &from_clause, base, &list_projection(schema)).await
    }

    async fn list_related(
        &self,
        schema: &ModelSchema,
        pk: &DynamicValue,
        relation: &str,
        related_schema: &ModelSchema,
        params: &ResolvedSprunjeParams,
    ) -> Result<SprunjePage<Record>, BackendError> {
        let resolution = schema.resolve_relation(relation).ok_or_else(|| BackendError::RelationNotFound {
            model: schema.model.to_string(),
            relation: relation.to_string(),
        })?;

        match resolution {
            RelationResolution::Detail(detail) => {
                let foreign_key = detail.foreign_key.clone().ok_or_else(|| BackendError::RelationNotFound {
                    model: schema.model.to_string(),
                    relation: relation.to_string(),
                })?;
                let from_clause = quote_ident(&related_schema.table);
                let mut base = WhereBuilder::new(1);
                base.push_eq(&foreign_key, pk_field_type(schema), pk.clone());
                if related_schema.soft_delete {
                    base.parts
                        .push(format!("{} IS NULL", quote_ident(SOFT_DELETE_COLUMN)));
                }
                // §4.7: a DetailSpec's `list_fields`, when present, overrides
                // the related schema's listable set for this request.
                let overridden: Vec<&str> = detail.list_fields.iter().map(String::as_str).collect();
                let projection = if overridden.is_empty() {
                    list_projection(related_schema)
                } else {
                    overridden
                };
                run_list(&self.pool, related_schema, params, &from_clause, base, &projection).await
            }
            RelationResolution::Relationship(rel) => match &rel.kind {
                RelationshipKind::ManyToMany {
                    pivot_table,
                    foreign_key,
                    related_key,
                } => {
                    let from_clause = format!(
                        "{} JOIN {} ON {} = {}",
                        quote_ident(&related_schema.table),
                        quote_ident(pivot_table),
                        quote_ident_qualified(pivot_table, related_key),
                        quote_ident_qualified(&related_schema.table, &related_schema.primary_key),
                    );
                    let mut base = WhereBuilder::new(1);
                    base.push_raw(
                        format!("{} = {{}}", quote_ident_qualified(pivot_table, foreign_key)),
                        pk_field_type(schema),
                        pk.clone(),
                    );
                    run_list(&self.pool, related_schema, params, &from_clause, base, &list_projection(related_schema)).await
                }
                RelationshipKind::BelongsToManyThrough { chain } => {
                    // `chain` runs from the owning model outward: each step's
                    // `from_key` joins back to the previous step's `to_key`,
                    // and the last step's table is the related model's own table.
                    let first_step = chain.first().ok_or_else(|| BackendError::RelationNotFound {
                        model: schema.model.to_string(),
                        relation: relation.to_string(),
                    })?;
                    let mut from_clause = quote_ident(&first_step.table);
                    let mut prev_table = first_step.table.clone();
                    let mut prev_to_key = first_step.to_key.clone();
                    for step in chain.iter().skip(1) {
                        from_clause.push_str(&format!(
                            " JOIN {} ON {} = {}",
                            quote_ident(&step.table),
                            quote_ident_qualified(&step.table, &step.from_key),
                            quote_ident_qualified(&prev_table, &prev_to_key),
                        ));
                        prev_table = step.table.clone();
                        prev_to_key = step.to_key.clone();
                    }
                    let mut base = WhereBuilder::new(1);
                    base.push_raw(
                        format!("{} = {{}}", quote_ident_qualified(&first_step.table, &first_step.from_key)),
                        pk_field_type(schema),
                        pk.clone(),
                    );
                    run_list(&self.pool, related_schema, params, &from_clause, base, &list_projection(related_schema)).await
                }
            },
        }
    }
}

fn quote_ident_qualified(table: &str, column: &str) -> String {
    crate::ident::quote_qualified(&[table, column])
}
