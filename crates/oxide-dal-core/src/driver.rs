//! Native driver capability traits.
//!
//! A backend implements these three traits; everything above them (named
//! parameters, conversions, the row protocol, scripts) is backend-agnostic.
//! The backend is chosen when the [`Connection`](crate::Connection) is built.

use core::fmt;

use crate::types::DataType;
use crate::value::Value;

/// Failure reported by a native driver.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct DriverError {
    /// Five-character SQLSTATE, when the driver provides one.
    pub sql_state: Option<String>,
    /// Vendor-specific error code.
    pub vendor_code: Option<i64>,
    /// Driver message.
    pub message: String,
}

impl DriverError {
    /// Creates an error with only a message.
    #[must_use]
    pub fn new(message: impl Into<String>) -> Self {
        Self {
            sql_state: None,
            vendor_code: None,
            message: message.into(),
        }
    }

    /// Sets the SQLSTATE.
    #[must_use]
    pub fn with_sql_state(mut self, sql_state: impl Into<String>) -> Self {
        self.sql_state = Some(sql_state.into());
        self
    }

    /// Sets the vendor code.
    #[must_use]
    pub const fn with_vendor_code(mut self, code: i64) -> Self {
        self.vendor_code = Some(code);
        self
    }

    /// Creates an "operation not supported" error.
    #[must_use]
    pub fn unsupported(what: &str) -> Self {
        Self::new(format!("{what} is not supported by this driver")).with_sql_state("0A000")
    }
}

impl fmt::Display for DriverError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.message)?;
        match (&self.sql_state, self.vendor_code) {
            (Some(state), Some(code)) => write!(f, " (SQLSTATE {state}, code {code})"),
            (Some(state), None) => write!(f, " (SQLSTATE {state})"),
            (None, Some(code)) => write!(f, " (code {code})"),
            (None, None) => Ok(()),
        }
    }
}

impl std::error::Error for DriverError {}

/// Result type for driver calls.
pub type DriverResult<T> = Result<T, DriverError>;

/// How a statement is routed through the driver.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum StatementKind {
    /// A plain prepared statement.
    Prepared,
    /// A stored-procedure call or anonymous block.
    Callable,
}

/// Column description reported by a cursor.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct NativeColumn {
    /// Column label.
    pub name: String,
    /// Logical type of the column.
    pub data_type: DataType,
}

impl NativeColumn {
    /// Creates a column description.
    #[must_use]
    pub fn new(name: impl Into<String>, data_type: DataType) -> Self {
        Self {
            name: name.into(),
            data_type,
        }
    }
}

/// A live connection to a database.
pub trait NativeConnection {
    /// Returns a short backend name for diagnostics.
    fn name(&self) -> &'static str;

    /// Prepares positional SQL (`?` placeholders).
    fn prepare(&mut self, sql: &str, kind: StatementKind) -> DriverResult<Box<dyn NativeStatement>>;

    /// Switches autocommit mode.
    fn set_autocommit(&mut self, autocommit: bool) -> DriverResult<()>;

    /// Returns the autocommit mode.
    fn autocommit(&self) -> bool;

    /// Commits the current transaction.
    fn commit(&mut self) -> DriverResult<()>;

    /// Rolls back the current transaction.
    fn rollback(&mut self) -> DriverResult<()>;

    /// Releases the connection. Called at most once.
    fn close(&mut self) -> DriverResult<()>;
}

/// A prepared or callable statement owned by a [`Statement`](crate::Statement).
///
/// Ordinals are 1-based.
pub trait NativeStatement {
    /// Binds an input value.
    fn bind(&mut self, ordinal: usize, value: &Value) -> DriverResult<()>;

    /// Declares an output parameter. Only called for callable statements.
    fn register_out(&mut self, ordinal: usize, data_type: DataType) -> DriverResult<()>;

    /// Executes without a cursor and returns the affected row count.
    fn execute_update(&mut self) -> DriverResult<u64>;

    /// Executes and opens a cursor over the result rows.
    fn execute_query(&mut self) -> DriverResult<Box<dyn NativeCursor>>;

    /// Reads an output parameter after execution.
    fn out_value(&mut self, ordinal: usize) -> DriverResult<Value>;

    /// Releases the statement. Called at most once.
    fn close(&mut self) -> DriverResult<()>;
}

/// A forward-only cursor.
pub trait NativeCursor {
    /// Describes the columns in select-list order.
    fn columns(&self) -> DriverResult<Vec<NativeColumn>>;

    /// Fetches the next row, or `None` once exhausted.
    fn next_row(&mut self) -> DriverResult<Option<Vec<Value>>>;

    /// Releases the cursor. Called at most once.
    fn close(&mut self) -> DriverResult<()>;
}
