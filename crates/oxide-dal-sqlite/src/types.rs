//! Mapping between SQLite types and logical types.

use oxide_dal_core::{DataType, DriverError, DriverResult, Value};
use sqlx::sqlite::{SqliteArguments, SqliteRow};
use sqlx::{Arguments, Row, TypeInfo, ValueRef};

use crate::error::driver_error;

/// Maps a type name reported by sqlx to a logical type.
///
/// Declared column types arrive already normalized by SQLite's affinity
/// rules, so `VARCHAR(20)` reports as `TEXT` and `BIGINT` as `INTEGER`.
/// Expressions without a declared type map to [`DataType::Other`].
pub(crate) fn data_type_of(type_name: &str) -> DataType {
    match type_name.to_ascii_uppercase().as_str() {
        "INTEGER" | "INT4" | "INT8" | "BIGINT" => DataType::Long,
        "REAL" => DataType::Double,
        "NUMERIC" => DataType::Decimal,
        "TEXT" => DataType::String,
        "BLOB" => DataType::Binary,
        "BOOLEAN" => DataType::Boolean,
        "DATE" => DataType::Date,
        "TIME" => DataType::Time,
        "DATETIME" => DataType::Timestamp,
        _ => DataType::Other,
    }
}

/// Builds the positional arguments for one execution.
///
/// Unset ordinals are bound as NULL.
pub(crate) fn arguments<'q>(values: &[Option<Value>]) -> DriverResult<SqliteArguments<'q>> {
    let mut args = SqliteArguments::default();
    for value in values {
        add(&mut args, value.as_ref().unwrap_or(&Value::Null))
            .map_err(|e| DriverError::new(format!("failed to bind value: {e}")))?;
    }
    Ok(args)
}

fn add(args: &mut SqliteArguments<'_>, value: &Value) -> Result<(), sqlx::error::BoxDynError> {
    match value.clone() {
        Value::Null => args.add(None::<String>),
        Value::Bool(v) => args.add(v),
        Value::Short(v) => args.add(v),
        Value::Int(v) => args.add(v),
        Value::Long(v) => args.add(v),
        Value::Float(v) => args.add(v),
        Value::Double(v) => args.add(v),
        Value::Text(v) => args.add(v),
        Value::Bytes(v) => args.add(v),
        Value::Date(v) => args.add(v),
        Value::Time(v) => args.add(v),
        Value::Timestamp(v) => args.add(v),
    }
}

/// Reads every column of `row` by its storage class.
///
/// Conversion to the column's logical type happens in the core crate.
pub(crate) fn row_values(row: &SqliteRow) -> DriverResult<Vec<Value>> {
    (0..row.len())
        .map(|index| {
            let raw = row.try_get_raw(index).map_err(driver_error)?;
            if raw.is_null() {
                return Ok(Value::Null);
            }
            let storage = raw.type_info().name().to_ascii_uppercase();
            let value = match storage.as_str() {
                "INTEGER" => Value::Long(row.try_get_unchecked(index).map_err(driver_error)?),
                "REAL" => Value::Double(row.try_get_unchecked(index).map_err(driver_error)?),
                "BLOB" => Value::Bytes(row.try_get_unchecked(index).map_err(driver_error)?),
                _ => Value::Text(row.try_get_unchecked(index).map_err(driver_error)?),
            };
            Ok(value)
        })
        .collect()
}
