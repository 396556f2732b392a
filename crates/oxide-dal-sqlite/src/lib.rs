//! # oxide-dal-sqlite
//!
//! SQLite backend for `oxide-dal-core`, built on `sqlx`.
//!
//! # How SQLite differs from other backends
//!
//! - **No stored procedures**: statements starting with `{call`, `begin` or
//!   `declare` are still routed as callable, but SQLite runs them as plain
//!   SQL. Output parameters (`&name`) are rejected with SQLSTATE `0A000`.
//! - **[Type affinity]**: column types are reported after SQLite's affinity
//!   rules, so `VARCHAR(20)` arrives as `TEXT` and maps to
//!   [`DataType::String`](oxide_dal_core::DataType::String). Expressions
//!   without a declared type map to `OTHER` and pass values through.
//! - **Dates are text**: `DATE`, `TIME` and `DATETIME` columns hold text in
//!   the canonical formats, converted on read by the core crate.
//! - **Manual transactions**: with autocommit off, `BEGIN` is issued right
//!   before the next statement and `commit`/`rollback` end it.
//!
//! [Type affinity]: https://www.sqlite.org/datatype3.html
//!
//! ## Example
//!
//! ```rust
//! use oxide_dal_core::Params;
//! use oxide_dal_sqlite::{open, SqliteOptions};
//!
//! let mut conn = open(&SqliteOptions::memory()).unwrap();
//! conn.execute("CREATE TABLE t (id INTEGER, name TEXT)", &mut Params::new())
//!     .unwrap();
//!
//! let mut params = Params::new().value("id", 1_i64).value("name", "one");
//! conn.execute("INSERT INTO t VALUES (:id, :name)", &mut params)
//!     .unwrap();
//!
//! let row = conn
//!     .query_row("SELECT name FROM t WHERE id = :id", &params)
//!     .unwrap()
//!     .unwrap();
//! assert_eq!(row.get::<String>(0).unwrap(), "one");
//! ```

mod connection;
pub mod error;
mod options;
mod session;
mod statement;
mod types;

pub use connection::{open, SqliteNativeConnection};
pub use error::SqliteError;
pub use options::{SqliteOptions, MEMORY_URL};
pub use statement::{SqliteNativeCursor, SqliteNativeStatement};
