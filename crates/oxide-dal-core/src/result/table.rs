//! Lazily iterated result tables.

use std::marker::PhantomData;
use std::sync::Arc;

use tracing::warn;

use super::{Columns, ColumnsBuilder, Row};
use crate::driver::NativeCursor;
use crate::error::{CloseErrors, Error, Result};
use crate::statement::Statement;

/// Rows produced by a query, read one at a time from a forward-only cursor.
///
/// Reading follows a peek-then-take protocol: [`has_next`](Self::has_next)
/// fetches and caches the next row, [`next_row`](Self::next_row) hands the
/// cached row out and clears the cache. Taking without a successful peek is
/// a [`Error::ProtocolMisuse`].
///
/// A table returned by [`Statement::query`] borrows its statement. A table
/// returned by [`Connection::query`](crate::Connection::query) owns its
/// statement and closes it together with the cursor.
pub struct ResultTable<'stmt> {
    cursor: Option<Box<dyn NativeCursor>>,
    columns: Arc<Columns>,
    lookahead: Option<Row>,
    exhausted: bool,
    failure: Option<String>,
    query: String,
    owner: Option<Statement>,
    _statement: PhantomData<&'stmt mut Statement>,
}

impl<'stmt> ResultTable<'stmt> {
    /// Wraps an open cursor. Column metadata is read once, here.
    pub(crate) fn open(
        mut cursor: Box<dyn NativeCursor>,
        query: &str,
        owner: Option<Statement>,
    ) -> Result<Self> {
        let columns = match cursor.columns() {
            Ok(columns) => columns,
            Err(e) => {
                if let Err(close_error) = cursor.close() {
                    warn!(error = %close_error, "Failed to close cursor after metadata error");
                }
                return Err(Error::execution(query, e));
            }
        };
        let columns = columns.into_iter().collect::<ColumnsBuilder>().build();

        Ok(Self {
            cursor: Some(cursor),
            columns: Arc::new(columns),
            lookahead: None,
            exhausted: false,
            failure: None,
            query: query.to_string(),
            owner,
            _statement: PhantomData,
        })
    }

    /// Returns the column metadata.
    #[must_use]
    pub fn columns(&self) -> &Columns {
        &self.columns
    }

    /// Returns the number of columns.
    #[must_use]
    pub fn column_count(&self) -> usize {
        self.columns.len()
    }

    /// Resolves a column label to its index.
    pub fn column_index(&self, name: &str) -> Result<usize> {
        self.columns.index_of(name)
    }

    /// Fetches and caches the next row, returning whether there is one.
    ///
    /// Calling this again before [`next_row`](Self::next_row) returns the
    /// same answer and keeps the same cached row.
    pub fn has_next(&mut self) -> Result<bool> {
        if self.lookahead.is_some() {
            return Ok(true);
        }
        if let Some(failure) = &self.failure {
            return Err(Error::misuse(format!(
                "result table stopped after a failed row: {failure}"
            )));
        }
        if self.exhausted {
            return Ok(false);
        }
        match self.fetch() {
            Ok(found) => Ok(found),
            Err(e) => {
                if !self.is_closed() {
                    self.failure = Some(e.to_string());
                }
                Err(e)
            }
        }
    }

    fn fetch(&mut self) -> Result<bool> {
        let cursor = self
            .cursor
            .as_mut()
            .ok_or_else(|| Error::misuse("result table is closed"))?;
        match cursor
            .next_row()
            .map_err(|e| Error::execution(&self.query, e))?
        {
            Some(values) => {
                self.lookahead = Some(Row::new(Arc::clone(&self.columns), values)?);
                Ok(true)
            }
            None => {
                self.exhausted = true;
                Ok(false)
            }
        }
    }

    /// Takes the row cached by the preceding [`has_next`](Self::has_next).
    ///
    /// # Errors
    ///
    /// Returns [`Error::ProtocolMisuse`] unless the immediately preceding
    /// `has_next()` returned `true`.
    pub fn next_row(&mut self) -> Result<Row> {
        self.lookahead.take().ok_or_else(|| {
            Error::misuse("next_row() called without a preceding has_next() that returned true")
        })
    }

    /// Returns an iterator that drives the peek/take protocol.
    pub fn rows(&mut self) -> Rows<'_, 'stmt> {
        Rows {
            table: self,
            failed: false,
        }
    }

    /// Reads all remaining rows.
    pub fn collect_rows(&mut self) -> Result<Vec<Row>> {
        self.rows().collect()
    }

    /// Releases the cursor and, for an owning table, its statement.
    ///
    /// Both are released even if the first one fails; every failure is
    /// reported. Closing twice is a no-op.
    pub fn close(&mut self) -> Result<()> {
        let mut errors = CloseErrors::default();
        self.lookahead = None;
        self.exhausted = true;
        if let Some(mut cursor) = self.cursor.take() {
            errors.record(cursor.close());
        }
        if let Some(mut owner) = self.owner.take() {
            errors.absorb(owner.close());
        }
        errors.into_result()
    }

    /// Returns true once [`close`](Self::close) has run.
    #[must_use]
    pub fn is_closed(&self) -> bool {
        self.cursor.is_none()
    }
}

impl Drop for ResultTable<'_> {
    fn drop(&mut self) {
        if let Err(e) = self.close() {
            warn!(query = %self.query, error = %e, "Failed to close result table");
        }
    }
}

impl std::fmt::Debug for ResultTable<'_> {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("ResultTable")
            .field("query", &self.query)
            .field("columns", &self.columns.names())
            .field("exhausted", &self.exhausted)
            .field("failed", &self.failure.is_some())
            .field("closed", &self.is_closed())
            .field("owns_statement", &self.owner.is_some())
            .finish()
    }
}

/// Iterator over the rows of a [`ResultTable`].
///
/// Stops after the first error.
pub struct Rows<'t, 'stmt> {
    table: &'t mut ResultTable<'stmt>,
    failed: bool,
}

impl Iterator for Rows<'_, '_> {
    type Item = Result<Row>;

    fn next(&mut self) -> Option<Self::Item> {
        if self.failed {
            return None;
        }
        match self.table.has_next() {
            Ok(true) => Some(self.table.next_row()),
            Ok(false) => None,
            Err(e) => {
                self.failed = true;
                Some(Err(e))
            }
        }
    }
}
