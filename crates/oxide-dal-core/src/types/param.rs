//! Typed parameters and named parameter sets.

use std::collections::btree_map::{self, BTreeMap};

use super::{ConversionError, DataType};
use crate::error::BindingError;
use crate::value::{ToValue, Value, ValueKind};

/// A value tagged with its logical type.
///
/// The value is always NULL or in the type's canonical representation.
#[derive(Debug, Clone, PartialEq)]
pub struct DataParam {
    data_type: DataType,
    value: Value,
}

impl DataParam {
    /// Creates a parameter from a value that is already assignable to `data_type`.
    ///
    /// Use [`DataParam::convert`] when the value may need conversion.
    pub fn new(data_type: DataType, value: impl ToValue) -> Result<Self, BindingError> {
        let value = value.to_value();
        if !data_type.accepts(&value) {
            return Err(BindingError::Conversion {
                target: data_type.name().to_string(),
                source: ConversionError::Incompatible {
                    from: value.kind().map_or("NULL", ValueKind::name),
                    to: data_type.name(),
                },
            });
        }
        Ok(Self { data_type, value })
    }

    /// Creates a parameter by converting `value` to `data_type`.
    pub fn convert(data_type: DataType, value: impl ToValue) -> Result<Self, BindingError> {
        let value = data_type
            .convert(value.to_value())
            .map_err(|source| BindingError::Conversion {
                target: data_type.name().to_string(),
                source,
            })?;
        Ok(Self { data_type, value })
    }

    /// Creates a parameter whose type is inferred from the value's class.
    ///
    /// NULL infers as [`DataType::Other`].
    #[must_use]
    pub fn of(value: impl ToValue) -> Self {
        let value = value.to_value();
        let data_type = value
            .kind()
            .and_then(DataType::type_of)
            .unwrap_or(DataType::Other);
        Self {
            data_type,
            value: data_type.widen(value),
        }
    }

    /// Creates a typed NULL.
    #[must_use]
    pub const fn null(data_type: DataType) -> Self {
        Self {
            data_type,
            value: Value::Null,
        }
    }

    /// Returns the logical type.
    #[must_use]
    pub const fn data_type(&self) -> DataType {
        self.data_type
    }

    /// Returns the value.
    #[must_use]
    pub const fn value(&self) -> &Value {
        &self.value
    }

    /// Consumes the parameter and returns the value.
    #[must_use]
    pub fn into_value(self) -> Value {
        self.value
    }
}

impl DataType {
    /// Builds a [`DataParam`] after verifying that `value` is assignable.
    pub fn param(self, value: impl ToValue) -> Result<DataParam, BindingError> {
        DataParam::new(self, value)
    }
}

/// A named parameter set.
///
/// Names are case-insensitive and stored upper-cased, matching how the parser
/// records marker names.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct Params {
    entries: BTreeMap<String, DataParam>,
}

impl Params {
    /// Creates an empty parameter set.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Sets `name`, returning the previous parameter if any.
    pub fn set(&mut self, name: &str, param: DataParam) -> Option<DataParam> {
        self.entries.insert(name.to_uppercase(), param)
    }

    /// Adds a parameter (builder style).
    #[must_use]
    pub fn with(mut self, name: &str, param: DataParam) -> Self {
        self.set(name, param);
        self
    }

    /// Adds a parameter whose type is inferred from the value.
    #[must_use]
    pub fn value(self, name: &str, value: impl ToValue) -> Self {
        self.with(name, DataParam::of(value))
    }

    /// Returns the parameter bound to `name`.
    #[must_use]
    pub fn get(&self, name: &str) -> Option<&DataParam> {
        self.entries.get(&name.to_uppercase())
    }

    /// Removes `name`.
    pub fn remove(&mut self, name: &str) -> Option<DataParam> {
        self.entries.remove(&name.to_uppercase())
    }

    /// Returns true if `name` is set.
    #[must_use]
    pub fn contains(&self, name: &str) -> bool {
        self.entries.contains_key(&name.to_uppercase())
    }

    /// Copies every entry of `other` into this set, overwriting duplicates.
    pub fn merge(&mut self, other: &Self) {
        for (name, param) in &other.entries {
            self.entries.insert(name.clone(), param.clone());
        }
    }

    /// Returns the number of entries.
    #[must_use]
    pub fn len(&self) -> usize {
        self.entries.len()
    }

    /// Returns true if there are no entries.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    /// Iterates entries ordered by name.
    pub fn iter(&self) -> btree_map::Iter<'_, String, DataParam> {
        self.entries.iter()
    }
}

impl<'a> IntoIterator for &'a Params {
    type Item = (&'a String, &'a DataParam);
    type IntoIter = btree_map::Iter<'a, String, DataParam>;

    fn into_iter(self) -> Self::IntoIter {
        self.entries.iter()
    }
}
