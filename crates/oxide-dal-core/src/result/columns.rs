//! Column metadata of a result table.

use std::collections::HashMap;

use crate::driver::NativeColumn;
use crate::error::{Error, Result};
use crate::types::DataType;

/// Name and type of one result column.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ColumnMeta {
    name: String,
    data_type: DataType,
}

impl ColumnMeta {
    /// Returns the column label as reported by the driver.
    #[must_use]
    pub fn name(&self) -> &str {
        &self.name
    }

    /// Returns the logical type.
    #[must_use]
    pub const fn data_type(&self) -> DataType {
        self.data_type
    }
}

/// Collects column metadata in select-list order.
///
/// Columns can only be appended here; [`ColumnsBuilder::build`] freezes them
/// into [`Columns`], which has the read accessors.
#[derive(Debug, Default)]
pub struct ColumnsBuilder {
    columns: Vec<ColumnMeta>,
}

impl ColumnsBuilder {
    /// Creates an empty builder.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Appends a column.
    #[must_use]
    pub fn column(mut self, name: impl Into<String>, data_type: DataType) -> Self {
        self.push(name, data_type);
        self
    }

    /// Appends a column in place.
    pub fn push(&mut self, name: impl Into<String>, data_type: DataType) {
        self.columns.push(ColumnMeta {
            name: name.into(),
            data_type,
        });
    }

    /// Freezes the metadata.
    #[must_use]
    pub fn build(self) -> Columns {
        let mut index = HashMap::with_capacity(self.columns.len());
        for (i, column) in self.columns.iter().enumerate() {
            // First occurrence wins for duplicated labels.
            index.entry(column.name.to_uppercase()).or_insert(i);
        }
        Columns {
            columns: self.columns,
            index,
        }
    }
}

impl FromIterator<NativeColumn> for ColumnsBuilder {
    fn from_iter<I: IntoIterator<Item = NativeColumn>>(iter: I) -> Self {
        let mut builder = Self::new();
        for column in iter {
            builder.push(column.name, column.data_type);
        }
        builder
    }
}

/// Immutable, ordered column metadata.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Columns {
    columns: Vec<ColumnMeta>,
    index: HashMap<String, usize>,
}

impl Columns {
    /// Returns the number of columns.
    #[must_use]
    pub fn len(&self) -> usize {
        self.columns.len()
    }

    /// Returns true if there are no columns.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.columns.is_empty()
    }

    /// Returns the column at `index`.
    #[must_use]
    pub fn get(&self, index: usize) -> Option<&ColumnMeta> {
        self.columns.get(index)
    }

    /// Iterates the columns in order.
    pub fn iter(&self) -> std::slice::Iter<'_, ColumnMeta> {
        self.columns.iter()
    }

    /// Returns the column labels in order.
    #[must_use]
    pub fn names(&self) -> Vec<&str> {
        self.columns.iter().map(ColumnMeta::name).collect()
    }

    /// Resolves a column label, case-insensitively.
    ///
    /// # Errors
    ///
    /// Returns [`Error::NoSuchColumn`] if no column has that label.
    pub fn index_of(&self, name: &str) -> Result<usize> {
        self.index
            .get(&name.to_uppercase())
            .copied()
            .ok_or_else(|| self.no_such_column(name))
    }

    /// Returns the column at `index` or a descriptive error.
    pub(crate) fn at(&self, index: usize) -> Result<&ColumnMeta> {
        self.columns
            .get(index)
            .ok_or_else(|| self.no_such_column(&format!("#{index}")))
    }

    fn no_such_column(&self, name: &str) -> Error {
        Error::NoSuchColumn {
            name: name.to_string(),
            available: self.names().join(", "),
        }
    }
}

impl<'a> IntoIterator for &'a Columns {
    type Item = &'a ColumnMeta;
    type IntoIter = std::slice::Iter<'a, ColumnMeta>;

    fn into_iter(self) -> Self::IntoIter {
        self.columns.iter()
    }
}
