//! A single result row.

use std::sync::Arc;

use super::Columns;
use crate::error::{BindingError, Error, Result};
use crate::value::{FromValue, Value};

/// One row of a result table.
///
/// Values are aligned with the table's [`Columns`] and are already in each
/// column type's canonical representation.
#[derive(Debug, Clone, PartialEq)]
pub struct Row {
    columns: Arc<Columns>,
    values: Vec<Value>,
}

impl Row {
    /// Builds a row from raw driver values, converting each one through its
    /// column's [`DataType`](crate::DataType).
    ///
    /// # Errors
    ///
    /// Fails if the number of values does not match the columns, or if a
    /// value cannot be converted to its column type.
    pub fn new(columns: Arc<Columns>, raw: Vec<Value>) -> Result<Self> {
        if raw.len() != columns.len() {
            return Err(Error::misuse(format!(
                "row has {} values but the result has {} columns",
                raw.len(),
                columns.len()
            )));
        }
        let values = raw
            .into_iter()
            .zip(columns.iter())
            .map(|(value, column)| {
                column
                    .data_type()
                    .convert(value)
                    .map_err(|source| BindingError::Conversion {
                        target: format!("column {}", column.name()),
                        source,
                    })
            })
            .collect::<std::result::Result<Vec<_>, _>>()?;
        Ok(Self { columns, values })
    }

    /// Returns the column metadata.
    #[must_use]
    pub fn columns(&self) -> &Columns {
        &self.columns
    }

    /// Returns the number of values.
    #[must_use]
    pub fn len(&self) -> usize {
        self.values.len()
    }

    /// Returns true for a row without columns.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.values.is_empty()
    }

    /// Returns all values in column order.
    #[must_use]
    pub fn values(&self) -> &[Value] {
        &self.values
    }

    /// Consumes the row and returns its values.
    #[must_use]
    pub fn into_values(self) -> Vec<Value> {
        self.values
    }

    /// Returns the value at `index`.
    ///
    /// # Errors
    ///
    /// Returns [`Error::NoSuchColumn`] if `index` is out of range.
    pub fn value(&self, index: usize) -> Result<&Value> {
        self.columns.at(index)?;
        Ok(&self.values[index])
    }

    /// Returns the value of the column labelled `name`.
    pub fn value_by_name(&self, name: &str) -> Result<&Value> {
        let index = self.columns.index_of(name)?;
        Ok(&self.values[index])
    }

    /// Reads the value at `index` as `T`.
    pub fn get<T: FromValue>(&self, index: usize) -> Result<T> {
        let column = self.columns.at(index)?;
        T::from_value(&self.values[index]).map_err(|source| {
            BindingError::Conversion {
                target: format!("column {}", column.name()),
                source,
            }
            .into()
        })
    }

    /// Reads the column labelled `name` as `T`.
    pub fn get_by_name<T: FromValue>(&self, name: &str) -> Result<T> {
        let index = self.columns.index_of(name)?;
        self.get(index)
    }
}
