//! The logical type registry.

use core::fmt;

use super::temporal;
use super::{integral_from_f64, ConversionError};
use crate::value::{Value, ValueKind};

/// Logical type tag of a parameter or column.
///
/// Variants are listed in declaration order; reverse lookups that match more
/// than one type (STRING and LONGSTRING share `Text`, DECIMAL and DOUBLE share
/// `f64`) resolve to the one declared first.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum DataType {
    /// Character data.
    String,
    /// Long character data (CLOB-like).
    LongString,
    /// Boolean.
    Boolean,
    /// 32-bit integer.
    Integer,
    /// 64-bit integer.
    Long,
    /// Exact numeric, held as `f64`.
    Decimal,
    /// Double precision float.
    Double,
    /// Calendar date.
    Date,
    /// Time of day.
    Time,
    /// Date and time.
    Timestamp,
    /// Binary data.
    Binary,
    /// A type the driver could not describe; values pass through unchanged.
    Other,
}

impl DataType {
    /// All types in declaration order.
    pub const ALL: [Self; 12] = [
        Self::String,
        Self::LongString,
        Self::Boolean,
        Self::Integer,
        Self::Long,
        Self::Decimal,
        Self::Double,
        Self::Date,
        Self::Time,
        Self::Timestamp,
        Self::Binary,
        Self::Other,
    ];

    /// Returns the logical name.
    #[must_use]
    pub const fn name(self) -> &'static str {
        match self {
            Self::String => "STRING",
            Self::LongString => "LONGSTRING",
            Self::Boolean => "BOOLEAN",
            Self::Integer => "INTEGER",
            Self::Long => "LONG",
            Self::Decimal => "DECIMAL",
            Self::Double => "DOUBLE",
            Self::Date => "DATE",
            Self::Time => "TIME",
            Self::Timestamp => "TIMESTAMP",
            Self::Binary => "BINARY",
            Self::Other => "OTHER",
        }
    }

    /// Returns the native SQL type code.
    #[must_use]
    pub const fn code(self) -> i32 {
        match self {
            Self::String => 12,
            Self::LongString => -1,
            Self::Boolean => 16,
            Self::Integer => 4,
            Self::Long => -5,
            Self::Decimal => 3,
            Self::Double => 8,
            Self::Date => 91,
            Self::Time => 92,
            Self::Timestamp => 93,
            Self::Binary => -3,
            Self::Other => 1111,
        }
    }

    /// Returns the canonical representation class, `None` for [`Self::Other`].
    #[must_use]
    pub const fn canonical(self) -> Option<ValueKind> {
        Some(match self {
            Self::String | Self::LongString => ValueKind::Text,
            Self::Boolean => ValueKind::Bool,
            Self::Integer => ValueKind::Int,
            Self::Long => ValueKind::Long,
            Self::Decimal | Self::Double => ValueKind::Double,
            Self::Date => ValueKind::Date,
            Self::Time => ValueKind::Time,
            Self::Timestamp => ValueKind::Timestamp,
            Self::Binary => ValueKind::Bytes,
            Self::Other => return None,
        })
    }

    /// Looks a type up by native code, including common aliases.
    #[must_use]
    pub fn from_code(code: i32) -> Option<Self> {
        match code {
            // CHAR, VARCHAR, NCHAR, NVARCHAR
            1 | 12 | -15 | -9 => Some(Self::String),
            // LONGVARCHAR, LONGNVARCHAR, CLOB, NCLOB
            -1 | -16 | 2005 | 2011 => Some(Self::LongString),
            // BOOLEAN, BIT
            16 | -7 => Some(Self::Boolean),
            // INTEGER, SMALLINT, TINYINT
            4 | 5 | -6 => Some(Self::Integer),
            -5 => Some(Self::Long),
            // DECIMAL, NUMERIC
            3 | 2 => Some(Self::Decimal),
            // DOUBLE, FLOAT, REAL
            8 | 6 | 7 => Some(Self::Double),
            91 => Some(Self::Date),
            92 => Some(Self::Time),
            93 => Some(Self::Timestamp),
            // VARBINARY, BINARY, LONGVARBINARY, BLOB
            -3 | -2 | -4 | 2004 => Some(Self::Binary),
            1111 => Some(Self::Other),
            _ => None,
        }
    }

    /// Reverse lookup by representation class.
    ///
    /// Narrow classes resolve through the class they widen to, so `i16` finds
    /// INTEGER and `f32` finds DECIMAL.
    #[must_use]
    pub fn type_of(kind: ValueKind) -> Option<Self> {
        let kind = match kind {
            ValueKind::Short => ValueKind::Int,
            ValueKind::Float => ValueKind::Double,
            other => other,
        };
        Self::ALL
            .into_iter()
            .find(|data_type| data_type.canonical() == Some(kind))
    }

    /// Looks a type up by logical name or SQL declaration, case-insensitively.
    ///
    /// A length or precision suffix such as `VARCHAR(20)` is ignored.
    #[must_use]
    pub fn from_name(name: &str) -> Option<Self> {
        let base = name.split('(').next().unwrap_or(name).trim();
        match base.to_ascii_uppercase().as_str() {
            "STRING" | "VARCHAR" | "CHAR" | "NCHAR" | "NVARCHAR" | "VARCHAR2" | "TEXT" => {
                Some(Self::String)
            }
            "LONGSTRING" | "LONGVARCHAR" | "CLOB" | "NCLOB" => Some(Self::LongString),
            "BOOLEAN" | "BOOL" | "BIT" => Some(Self::Boolean),
            "INTEGER" | "INT" | "SMALLINT" | "TINYINT" => Some(Self::Integer),
            "LONG" | "BIGINT" => Some(Self::Long),
            "DECIMAL" | "NUMERIC" | "NUMBER" => Some(Self::Decimal),
            "DOUBLE" | "FLOAT" | "REAL" => Some(Self::Double),
            "DATE" => Some(Self::Date),
            "TIME" => Some(Self::Time),
            "TIMESTAMP" | "DATETIME" => Some(Self::Timestamp),
            "BINARY" | "VARBINARY" | "BLOB" | "BYTES" => Some(Self::Binary),
            "OTHER" => Some(Self::Other),
            _ => None,
        }
    }

    /// Returns true if `value` is NULL or already in the canonical class.
    #[must_use]
    pub fn accepts(self, value: &Value) -> bool {
        match (self.canonical(), value.kind()) {
            (_, None) | (None, _) => true,
            (Some(canonical), Some(kind)) => canonical == kind,
        }
    }

    /// Converts `value` to this type's canonical representation.
    ///
    /// NULL converts to NULL. Narrower numeric classes are widened, text is
    /// parsed (temporal types use the canonical formats in
    /// [`temporal`](super::temporal)), and a numeric narrowing that would drop
    /// a nonzero fractional part fails instead of truncating.
    pub fn convert(self, value: Value) -> Result<Value, ConversionError> {
        if value.is_null() {
            return Ok(Value::Null);
        }
        match self {
            Self::String | Self::LongString => self.to_text(value),
            Self::Boolean => self.to_bool(&value).map(Value::Bool),
            Self::Integer => {
                let wide = self.to_long(&value)?;
                i32::try_from(wide)
                    .map(Value::Int)
                    .map_err(|_| ConversionError::OutOfRange {
                        value: wide.to_string(),
                        to: self.name(),
                    })
            }
            Self::Long => self.to_long(&value).map(Value::Long),
            Self::Decimal | Self::Double => self.to_double(&value).map(Value::Double),
            Self::Date => match value {
                Value::Date(_) => Ok(value),
                Value::Timestamp(ts) => Ok(Value::Date(ts.date())),
                Value::Text(ref s) => temporal::parse_date(s).map(Value::Date),
                other => Err(self.incompatible(&other)),
            },
            Self::Time => match value {
                Value::Time(_) => Ok(value),
                Value::Timestamp(ts) => Ok(Value::Time(ts.time())),
                Value::Text(ref s) => temporal::parse_time(s).map(Value::Time),
                other => Err(self.incompatible(&other)),
            },
            Self::Timestamp => match value {
                Value::Timestamp(_) => Ok(value),
                Value::Date(d) => Ok(Value::Timestamp(d.and_time(chrono::NaiveTime::MIN))),
                Value::Text(ref s) => temporal::parse_timestamp(s).map(Value::Timestamp),
                other => Err(self.incompatible(&other)),
            },
            Self::Binary => match value {
                Value::Bytes(_) => Ok(value),
                other => Err(self.incompatible(&other)),
            },
            Self::Other => Ok(value),
        }
    }

    fn incompatible(self, value: &Value) -> ConversionError {
        ConversionError::Incompatible {
            from: value.kind().map_or("NULL", ValueKind::name),
            to: self.name(),
        }
    }

    fn to_text(self, value: Value) -> Result<Value, ConversionError> {
        match value {
            Value::Text(_) => Ok(value),
            Value::Bytes(_) => Err(self.incompatible(&value)),
            other => Ok(Value::Text(other.to_string())),
        }
    }

    fn to_bool(self, value: &Value) -> Result<bool, ConversionError> {
        match value {
            Value::Bool(b) => Ok(*b),
            Value::Short(_) | Value::Int(_) | Value::Long(_) => match value.as_i64() {
                Some(0) => Ok(false),
                Some(1) => Ok(true),
                _ => Err(ConversionError::OutOfRange {
                    value: value.to_string(),
                    to: self.name(),
                }),
            },
            Value::Text(s) => match s.trim().to_ascii_lowercase().as_str() {
                "true" | "1" => Ok(true),
                "false" | "0" => Ok(false),
                _ => Err(ConversionError::Unparseable {
                    text: s.clone(),
                    to: self.name(),
                    expected: "true or false",
                }),
            },
            other => Err(self.incompatible(other)),
        }
    }

    fn to_long(self, value: &Value) -> Result<i64, ConversionError> {
        match value {
            Value::Short(_) | Value::Int(_) | Value::Long(_) => {
                Ok(value.as_i64().unwrap_or_default())
            }
            Value::Float(_) | Value::Double(_) => {
                integral_from_f64(value.as_f64().unwrap_or_default(), self.name())
            }
            Value::Text(s) => {
                let text = s.trim();
                if let Ok(v) = text.parse::<i64>() {
                    return Ok(v);
                }
                let f = text
                    .parse::<f64>()
                    .map_err(|_| ConversionError::Unparseable {
                        text: s.clone(),
                        to: self.name(),
                        expected: "an integer",
                    })?;
                integral_from_f64(f, self.name())
            }
            other => Err(self.incompatible(other)),
        }
    }

    fn to_double(self, value: &Value) -> Result<f64, ConversionError> {
        match value {
            Value::Text(s) => s
                .trim()
                .parse::<f64>()
                .map_err(|_| ConversionError::Unparseable {
                    text: s.clone(),
                    to: self.name(),
                    expected: "a number",
                }),
            other => other.as_f64().ok_or_else(|| self.incompatible(other)),
        }
    }

    /// Widens a narrow numeric representation to the canonical class.
    ///
    /// Anything else is returned unchanged.
    #[must_use]
    pub fn widen(self, value: Value) -> Value {
        match (self.canonical(), value) {
            (Some(ValueKind::Int), Value::Short(v)) => Value::Int(i32::from(v)),
            (Some(ValueKind::Long), Value::Short(v)) => Value::Long(i64::from(v)),
            (Some(ValueKind::Long), Value::Int(v)) => Value::Long(i64::from(v)),
            (Some(ValueKind::Double), Value::Float(v)) => Value::Double(f64::from(v)),
            (Some(ValueKind::Double), Value::Short(v)) => Value::Double(f64::from(v)),
            (Some(ValueKind::Double), Value::Int(v)) => Value::Double(f64::from(v)),
            (_, value) => value,
        }
    }
}

impl fmt::Display for DataType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.name())
    }
}
