//! Connections, transactions and the script runner.

use tracing::{debug, info, warn};

use crate::driver::NativeConnection;
use crate::error::{Error, Result};
use crate::parser;
use crate::result::{ResultTable, Row};
use crate::script::split_script;
use crate::statement::Statement;
use crate::types::Params;

/// A connection to a database through a native driver.
///
/// Statements and result tables produced by a connection own their native
/// resources; the connection does not track them after creation.
pub struct Connection {
    native: Option<Box<dyn NativeConnection>>,
    backend: &'static str,
}

impl Connection {
    /// Wraps a boxed native connection.
    #[must_use]
    pub fn new(native: Box<dyn NativeConnection>) -> Self {
        let backend = native.name();
        Self {
            native: Some(native),
            backend,
        }
    }

    /// Wraps a native connection.
    #[must_use]
    pub fn from_native(native: impl NativeConnection + 'static) -> Self {
        Self::new(Box::new(native))
    }

    /// Returns the backend name.
    #[must_use]
    pub const fn backend(&self) -> &'static str {
        self.backend
    }

    fn native(&mut self) -> Result<&mut Box<dyn NativeConnection>> {
        self.native
            .as_mut()
            .ok_or_else(|| Error::misuse("connection is closed"))
    }

    /// Parses `text` and prepares it on the native connection.
    ///
    /// Text starting with `{call`, `begin` or `declare` is prepared as a
    /// callable statement.
    ///
    /// # Errors
    ///
    /// Returns [`Error::Parse`] for malformed text and [`Error::Execution`]
    /// when the driver rejects the statement.
    pub fn prepare(&mut self, text: &str) -> Result<Statement> {
        let query = parser::parse(text)?;
        debug!(
            query = %query.clean(),
            kind = ?query.kind(),
            markers = query.marker_count(),
            "Preparing statement"
        );
        let native = self
            .native()?
            .prepare(query.sql(), query.kind())
            .map_err(|e| Error::execution(query.clean(), e))?;
        Ok(Statement::new(query, native))
    }

    /// Prepares, binds and executes `text`, then closes the statement.
    ///
    /// Output parameters are written back into `params`.
    pub fn execute(&mut self, text: &str, params: &mut Params) -> Result<u64> {
        let mut statement = self.prepare(text)?;
        let outcome = statement.execute_with(params);
        finish(statement, outcome)
    }

    /// Prepares, binds and runs `text` as a query.
    ///
    /// The returned table owns its statement; closing or dropping the table
    /// releases both.
    pub fn query(&mut self, text: &str, params: &Params) -> Result<ResultTable<'static>> {
        let mut statement = self.prepare(text)?;
        let opened = statement
            .set_params(params)
            .and_then(|()| statement.open_cursor());
        let cursor = match opened {
            Ok(cursor) => cursor,
            Err(e) => return finish(statement, Err(e)),
        };
        let clean = statement.parsed().clean().to_string();
        ResultTable::open(cursor, &clean, Some(statement))
    }

    /// Runs `text` and returns its first row, if any.
    ///
    /// The cursor and statement are always released before returning, no
    /// matter how many rows the query produced.
    pub fn query_row(&mut self, text: &str, params: &Params) -> Result<Option<Row>> {
        let mut table = self.query(text, params)?;
        let first = match table.has_next() {
            Ok(true) => table.next_row().map(Some),
            Ok(false) => Ok(None),
            Err(e) => Err(e),
        };
        let closed = table.close();
        match (first, closed) {
            (Ok(row), Ok(())) => Ok(row),
            (Ok(_), Err(e)) => Err(e),
            (Err(e), Ok(())) => Err(e),
            (Err(e), Err(close_error)) => {
                warn!(error = %close_error, "Failed to release query after error");
                Err(e)
            }
        }
    }

    /// Executes a script of statements separated by lines holding only `/`.
    ///
    /// Statements run in source order inside one transaction. Output
    /// parameters produced by a statement are merged into `params` and are
    /// visible to every later statement. Returns one count per statement;
    /// callable statements count as 0.
    ///
    /// When autocommit is on it is switched off for the script, the script is
    /// committed on success or rolled back on failure, and autocommit is
    /// switched back on. When autocommit is already off the script joins the
    /// open transaction and is rolled back on failure; committing a successful
    /// run is left to the caller.
    pub fn execute_script(&mut self, script: &str, params: &mut Params) -> Result<Vec<u64>> {
        let statements = split_script(script);
        let was_autocommit = self.autocommit()?;
        info!(statements = statements.len(), "Running script");

        if was_autocommit {
            self.set_autocommit(false)?;
        }
        let outcome = self.run_statements(&statements, params);
        let ended = match &outcome {
            Ok(_) if was_autocommit => self.commit(),
            Ok(_) => Ok(()),
            Err(e) => {
                warn!(error = %e, "Script failed, rolling back");
                self.rollback()
            }
        };
        let restored = if was_autocommit {
            self.set_autocommit(true)
        } else {
            Ok(())
        };

        let counts = outcome?;
        ended?;
        restored?;
        info!(statements = counts.len(), "Script completed");
        Ok(counts)
    }

    fn run_statements(&mut self, statements: &[&str], params: &mut Params) -> Result<Vec<u64>> {
        let mut counts = Vec::with_capacity(statements.len());
        for (index, text) in statements.iter().enumerate() {
            let mut statement = self.prepare(text)?;
            let callable = statement.parsed().is_callable();
            let outcome = statement.execute_with(params);
            let count = finish(statement, outcome)?;
            debug!(statement = index + 1, count, callable, "Script statement executed");
            counts.push(if callable { 0 } else { count });
        }
        Ok(counts)
    }

    /// Switches autocommit mode.
    pub fn set_autocommit(&mut self, autocommit: bool) -> Result<()> {
        debug!(autocommit, "Setting autocommit");
        self.native()?
            .set_autocommit(autocommit)
            .map_err(|e| Error::execution(format!("SET AUTOCOMMIT {autocommit}"), e))
    }

    /// Returns the autocommit mode.
    pub fn autocommit(&self) -> Result<bool> {
        self.native
            .as_ref()
            .map(|native| native.autocommit())
            .ok_or_else(|| Error::misuse("connection is closed"))
    }

    /// Commits the current transaction.
    pub fn commit(&mut self) -> Result<()> {
        info!(backend = self.backend, "Committing transaction");
        self.native()?
            .commit()
            .map_err(|e| Error::execution("COMMIT", e))
    }

    /// Rolls back the current transaction.
    pub fn rollback(&mut self) -> Result<()> {
        info!(backend = self.backend, "Rolling back transaction");
        self.native()?
            .rollback()
            .map_err(|e| Error::execution("ROLLBACK", e))
    }

    /// Releases the native connection. Closing twice is a no-op.
    pub fn close(&mut self) -> Result<()> {
        match self.native.take() {
            Some(mut native) => {
                debug!(backend = self.backend, "Closing connection");
                native.close().map_err(|e| Error::Resource(vec![e]))
            }
            None => Ok(()),
        }
    }

    /// Returns true once the connection is closed.
    #[must_use]
    pub fn is_closed(&self) -> bool {
        self.native.is_none()
    }
}

/// Closes `statement` after it produced `outcome`.
///
/// An execution failure takes precedence over a close failure, which is then
/// only logged.
fn finish<T>(mut statement: Statement, outcome: Result<T>) -> Result<T> {
    let closed = statement.close();
    match (outcome, closed) {
        (Ok(value), Ok(())) => Ok(value),
        (Ok(_), Err(e)) => Err(e),
        (Err(e), Ok(())) => Err(e),
        (Err(e), Err(close_error)) => {
            warn!(error = %close_error, "Failed to close statement after error");
            Err(e)
        }
    }
}

impl Drop for Connection {
    fn drop(&mut self) {
        if let Err(e) = self.close() {
            warn!(backend = self.backend, error = %e, "Failed to close connection");
        }
    }
}

impl std::fmt::Debug for Connection {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Connection")
            .field("backend", &self.backend)
            .field("closed", &self.is_closed())
            .finish()
    }
}
