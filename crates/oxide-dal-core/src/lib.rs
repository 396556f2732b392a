//! # oxide-dal-core
//!
//! A portable data-access layer over SQL drivers.
//!
//! This crate provides:
//! - A named-parameter parser: `:name` inputs and `&name` outputs become
//!   positional `?` placeholders, outside quotes and comments
//! - Statements bound by name, with output round-trip for procedure calls
//!   and anonymous blocks
//! - Lazily read result tables with a strict peek-then-take row protocol
//! - A logical type registry ([`DataType`]) with lossless conversions
//! - A script runner that threads output parameters between statements
//!
//! Backends plug in through the [`driver`] traits.
//!
//! ## Named parameters
//!
//! ```rust
//! use oxide_dal_core::parser;
//!
//! let query = parser::parse("SELECT * FROM t WHERE a = :id OR b = :ID").unwrap();
//! assert_eq!(query.sql(), "SELECT * FROM t WHERE a = ? OR b = ?");
//! assert_eq!(query.positions("id"), &[1, 2]);
//!
//! let call = parser::parse("{call transfer(:amount, &balance)}").unwrap();
//! assert!(call.is_callable());
//! assert_eq!(call.out_param_names(), vec!["BALANCE"]);
//! ```
//!
//! ## Typed parameters
//!
//! ```rust
//! use oxide_dal_core::{DataParam, DataType, Params, Value};
//!
//! let mut params = Params::new();
//! params.set("id", DataType::Long.param(2_i64).unwrap());
//! params.set("name", DataParam::convert(DataType::String, 42).unwrap());
//! assert_eq!(params.get("ID").map(DataParam::value), Some(&Value::Long(2)));
//! assert_eq!(params.get("name").map(DataParam::value), Some(&Value::from("42")));
//!
//! // Lossy narrowing is rejected.
//! assert!(DataType::Integer.convert(Value::Double(1.5)).is_err());
//! ```

pub mod connection;
pub mod driver;
pub mod error;
pub mod parser;
pub mod result;
pub mod script;
pub mod statement;
pub mod types;
pub mod value;

pub use connection::Connection;
pub use driver::{
    DriverError, DriverResult, NativeColumn, NativeConnection, NativeCursor, NativeStatement,
    StatementKind,
};
pub use error::{BindingError, Error, Result};
pub use parser::{ParseError, Query};
pub use result::{ColumnMeta, Columns, ColumnsBuilder, ResultTable, Row, Rows};
pub use script::split_script;
pub use statement::{Statement, StatementState};
pub use types::{ConversionError, DataParam, DataType, Params};
pub use value::{FromValue, ToValue, Value, ValueKind};
