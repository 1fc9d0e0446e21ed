use sqlx::postgres::{PgArguments, PgRow};
use sqlx::query::Query;
use sqlx::{Postgres, Row};

use sprunje_core::{DynamicValue, FieldType};
use sprunje_backend::BackendError;

/// Decodes one column of a row into a [`DynamicValue`], picking the Rust
/// decode type from the field's declared [`FieldType`].
///
/// `Date`/`DateTime` have no dedicated `DynamicValue` variant; both are
/// decoded as their ISO-8601 text representation and carried as `Text`,
/// matching how they travel over the wire in request/response JSON.
pub fn decode_column(row: &PgRow, column: &str, field_type: &FieldType) -> Result<DynamicValue, BackendError> {
    let map_err = |e: sqlx::Error| BackendError::QueryError {
        message: format!("column '{column}': {e}"),
    };

    match field_type {
        FieldType::Integer => {
            let v: Option<i64> = row.try_get(column).map_err(map_err)?;
            Ok(v.map(DynamicValue::Integer).unwrap_or(DynamicValue::Null))
        }
        FieldType::Float | FieldType::Decimal => {
            let v: Option<f64> = row.try_get(column).map_err(map_err)?;
            Ok(v.map(DynamicValue::Float).unwrap_or(DynamicValue::Null))
        }
        FieldType::Boolean(_) => {
            let v: Option<bool> = row.try_get(column).map_err(map_err)?;
            Ok(v.map(DynamicValue::Boolean).unwrap_or(DynamicValue::Null))
        }
        FieldType::Json => {
            let v: Option<serde_json::Value> = row.try_get(column).map_err(map_err)?;
            Ok(v.map(DynamicValue::Json).unwrap_or(DynamicValue::Null))
        }
        FieldType::Date => {
            let v: Option<chrono::NaiveDate> = row.try_get(column).map_err(map_err)?;
            Ok(v.map(|d| DynamicValue::Text(d.to_string())).unwrap_or(DynamicValue::Null))
        }
        FieldType::DateTime => {
            let v: Option<chrono::DateTime<chrono::Utc>> = row.try_get(column).map_err(map_err)?;
            Ok(v.map(|d| DynamicValue::Text(d.to_rfc3339())).unwrap_or(DynamicValue::Null))
        }
        _ => {
            let v: Option<String> = row.try_get(column).map_err(map_err)?;
            Ok(v.map(DynamicValue::Text).unwrap_or(DynamicValue::Null))
        }
    }
}

/// Binds a [`DynamicValue`] to a query parameter, coercing it to the Rust
/// type that matches its field's declared [`FieldType`] so the Postgres
/// driver picks a compatible wire type instead of always binding text.
pub fn bind_value<'q>(
    query: Query<'q, Postgres, PgArguments>,
    field_type: &FieldType,
    value: &'q DynamicValue,
) -> Query<'q, Postgres, PgArguments> {
    if value.is_null() {
        return match field_type {
            FieldType::Integer => query.bind(None::<i64>),
            FieldType::Float | FieldType::Decimal => query.bind(None::<f64>),
            FieldType::Boolean(_) => query.bind(None::<bool>),
            FieldType::Json => query.bind(None::<serde_json::Value>),
            _ => query.bind(None::<String>),
        };
    }

    match field_type {
        FieldType::Integer => query.bind(value.as_i64()),
        FieldType::Float | FieldType::Decimal => query.bind(value.as_f64()),
        FieldType::Boolean(_) => query.bind(value.as_bool()),
        FieldType::Json => query.bind(value.to_json()),
        FieldType::Date => {
            let text = value.as_str().map(str::to_string).unwrap_or_else(|| value.to_string());
            query.bind(text.parse::<chrono::NaiveDate>().ok())
        }
        FieldType::DateTime => {
            let text = value.as_str().map(str::to_string).unwrap_or_else(|| value.to_string());
            query.bind(
                chrono::DateTime::parse_from_rfc3339(&text)
                    .map(|dt| dt.with_timezone(&chrono::Utc))
                    .ok(),
            )
        }
        _ => query.bind(value.as_str().map(str::to_string).unwrap_or_else(|| value.to_string())),
    }
}
