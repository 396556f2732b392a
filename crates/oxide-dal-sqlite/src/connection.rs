//! The native connection.

use std::rc::Rc;
use std::str::FromStr;

use oxide_dal_core::{
    Connection, DriverResult, NativeColumn, NativeConnection, NativeStatement, StatementKind,
};
use sqlx::sqlite::SqliteConnectOptions;
use sqlx::{Column, ConnectOptions, Executor, Statement, TypeInfo};
use tokio::runtime::Builder;
use tracing::{debug, info};

use crate::error::Result;
use crate::options::SqliteOptions;
use crate::session::{Session, SharedSession};
use crate::statement::SqliteNativeStatement;
use crate::types::data_type_of;

/// Opens a SQLite database and wraps it in a [`Connection`].
///
/// # Errors
///
/// Fails if the URL is invalid, the runtime cannot start or the database
/// cannot be opened.
pub fn open(options: &SqliteOptions) -> Result<Connection> {
    let native = SqliteNativeConnection::open(options)?;
    Ok(Connection::from_native(native))
}

/// A SQLite connection implementing [`NativeConnection`].
pub struct SqliteNativeConnection {
    session: SharedSession,
}

impl SqliteNativeConnection {
    /// Opens the database described by `options`.
    pub fn open(options: &SqliteOptions) -> Result<Self> {
        let runtime = Builder::new_current_thread().enable_all().build()?;
        let connect = SqliteConnectOptions::from_str(&options.url)?
            .create_if_missing(options.create_if_missing);
        let conn = runtime.block_on(connect.connect())?;
        info!(url = %options.url, autocommit = options.autocommit, "Opened SQLite database");
        Ok(Self {
            session: Session::new(runtime, conn, options.autocommit),
        })
    }
}

impl NativeConnection for SqliteNativeConnection {
    fn name(&self) -> &'static str {
        "sqlite"
    }

    fn prepare(&mut self, sql: &str, kind: StatementKind) -> DriverResult<Box<dyn NativeStatement>> {
        let columns = self.session.borrow_mut().run(|conn| async move {
            let statement = conn.prepare(sql).await?;
            Ok::<_, sqlx::Error>(statement
                .columns()
                .iter()
                .map(|column| {
                    NativeColumn::new(column.name(), data_type_of(column.type_info().name()))
                })
                .collect::<Vec<_>>())
        })?;
        debug!(sql, columns = columns.len(), "Prepared SQLite statement");
        Ok(Box::new(SqliteNativeStatement::new(
            Rc::clone(&self.session),
            sql,
            kind,
            columns,
        )))
    }

    fn set_autocommit(&mut self, autocommit: bool) -> DriverResult<()> {
        self.session.borrow_mut().set_autocommit(autocommit)
    }

    fn autocommit(&self) -> bool {
        self.session.borrow().autocommit()
    }

    fn commit(&mut self) -> DriverResult<()> {
        self.session.borrow_mut().commit()
    }

    fn rollback(&mut self) -> DriverResult<()> {
        self.session.borrow_mut().rollback()
    }

    fn close(&mut self) -> DriverResult<()> {
        self.session.borrow_mut().close()
    }
}
