//! The connection state shared by a connection and its statements.

use std::cell::RefCell;
use std::future::Future;
use std::rc::Rc;

use oxide_dal_core::{DriverError, DriverResult};
use sqlx::sqlite::SqliteConnection;
use sqlx::{Connection, Executor};
use tokio::runtime::Runtime;
use tracing::debug;

use crate::error::driver_error;

pub(crate) type SharedSession = Rc<RefCell<Session>>;

/// A sqlx connection driven synchronously by an owned current-thread runtime.
///
/// In manual-commit mode a transaction is opened with `BEGIN` right before
/// the first statement that needs one and ended by `commit` or `rollback`.
pub(crate) struct Session {
    runtime: Runtime,
    conn: Option<SqliteConnection>,
    autocommit: bool,
    in_transaction: bool,
}

impl Session {
    pub(crate) fn new(runtime: Runtime, conn: SqliteConnection, autocommit: bool) -> SharedSession {
        Rc::new(RefCell::new(Self {
            runtime,
            conn: Some(conn),
            autocommit,
            in_transaction: false,
        }))
    }

    /// Runs `f` against the live connection on the session's runtime.
    pub(crate) fn run<'s, T, F, Fut>(&'s mut self, f: F) -> DriverResult<T>
    where
        F: FnOnce(&'s mut SqliteConnection) -> Fut,
        Fut: Future<Output = Result<T, sqlx::Error>> + 's,
    {
        let Self { runtime, conn, .. } = self;
        let conn = conn
            .as_mut()
            .ok_or_else(|| DriverError::new("connection is closed"))?;
        runtime.block_on(f(conn)).map_err(driver_error)
    }

    /// Opens a transaction if manual-commit mode needs one.
    pub(crate) fn ensure_transaction(&mut self) -> DriverResult<()> {
        if self.autocommit || self.in_transaction {
            return Ok(());
        }
        debug!("BEGIN");
        self.run(|conn| async move { conn.execute("BEGIN").await.map(|_| ()) })?;
        self.in_transaction = true;
        Ok(())
    }

    pub(crate) const fn autocommit(&self) -> bool {
        self.autocommit
    }

    pub(crate) fn set_autocommit(&mut self, autocommit: bool) -> DriverResult<()> {
        if autocommit && self.in_transaction {
            self.commit()?;
        }
        self.autocommit = autocommit;
        Ok(())
    }

    pub(crate) fn commit(&mut self) -> DriverResult<()> {
        self.end_transaction("COMMIT")
    }

    pub(crate) fn rollback(&mut self) -> DriverResult<()> {
        self.end_transaction("ROLLBACK")
    }

    fn end_transaction(&mut self, sql: &'static str) -> DriverResult<()> {
        if !self.in_transaction {
            debug!(sql, "No open transaction");
            return Ok(());
        }
        debug!(sql, "Ending transaction");
        self.run(|conn| async move { conn.execute(sql).await.map(|_| ()) })?;
        self.in_transaction = false;
        Ok(())
    }

    /// Closes the connection. An open transaction is rolled back by SQLite.
    pub(crate) fn close(&mut self) -> DriverResult<()> {
        let Some(conn) = self.conn.take() else {
            return Ok(());
        };
        if self.in_transaction {
            debug!("Closing with an open transaction; it will be rolled back");
        }
        self.in_transaction = false;
        self.runtime.block_on(conn.close()).map_err(driver_error)
    }
}
