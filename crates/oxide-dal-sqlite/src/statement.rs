//! Native statements and cursors.

use std::collections::VecDeque;

use oxide_dal_core::{
    DataType, DriverError, DriverResult, NativeColumn, NativeCursor, NativeStatement,
    StatementKind, Value,
};
use tracing::{debug, trace};

use crate::session::SharedSession;
use crate::types::{arguments, row_values};

/// A prepared SQLite statement.
///
/// SQLite has no stored procedures, so a callable statement is executed as
/// plain SQL and output parameters are rejected.
pub struct SqliteNativeStatement {
    session: SharedSession,
    sql: String,
    kind: StatementKind,
    columns: Vec<NativeColumn>,
    values: Vec<Option<Value>>,
}

impl SqliteNativeStatement {
    pub(crate) fn new(
        session: SharedSession,
        sql: &str,
        kind: StatementKind,
        columns: Vec<NativeColumn>,
    ) -> Self {
        Self {
            session,
            sql: sql.to_string(),
            kind,
            columns,
            values: Vec::new(),
        }
    }
}

impl NativeStatement for SqliteNativeStatement {
    fn bind(&mut self, ordinal: usize, value: &Value) -> DriverResult<()> {
        if ordinal == 0 {
            return Err(DriverError::new("parameter ordinals start at 1"));
        }
        if self.values.len() < ordinal {
            self.values.resize(ordinal, None);
        }
        trace!(ordinal, value = %value, "Binding SQLite parameter");
        self.values[ordinal - 1] = Some(value.clone());
        Ok(())
    }

    fn register_out(&mut self, ordinal: usize, _data_type: DataType) -> DriverResult<()> {
        debug!(ordinal, kind = ?self.kind, "Rejecting output parameter");
        Err(DriverError::unsupported("output parameters"))
    }

    fn execute_update(&mut self) -> DriverResult<u64> {
        let args = arguments(&self.values)?;
        let sql = self.sql.as_str();
        let mut session = self.session.borrow_mut();
        session.ensure_transaction()?;
        let result = session.run(|conn| async move {
            sqlx::query_with(sql, args).execute(conn).await
        })?;
        Ok(result.rows_affected())
    }

    fn execute_query(&mut self) -> DriverResult<Box<dyn NativeCursor>> {
        let args = arguments(&self.values)?;
        let sql = self.sql.as_str();
        let mut session = self.session.borrow_mut();
        session.ensure_transaction()?;
        let rows = session.run(|conn| async move {
            sqlx::query_with(sql, args).fetch_all(conn).await
        })?;
        let rows = rows
            .iter()
            .map(row_values)
            .collect::<DriverResult<VecDeque<_>>>()?;
        debug!(sql, rows = rows.len(), "Fetched SQLite rows");
        Ok(Box::new(SqliteNativeCursor {
            columns: self.columns.clone(),
            rows,
        }))
    }

    fn out_value(&mut self, _ordinal: usize) -> DriverResult<Value> {
        Err(DriverError::unsupported("output parameters"))
    }

    fn close(&mut self) -> DriverResult<()> {
        self.values.clear();
        Ok(())
    }
}

/// A cursor over rows already read from SQLite.
///
/// The connection stays usable while the cursor is open.
pub struct SqliteNativeCursor {
    columns: Vec<NativeColumn>,
    rows: VecDeque<Vec<Value>>,
}

impl NativeCursor for SqliteNativeCursor {
    fn columns(&self) -> DriverResult<Vec<NativeColumn>> {
        Ok(self.columns.clone())
    }

    fn next_row(&mut self) -> DriverResult<Option<Vec<Value>>> {
        Ok(self.rows.pop_front())
    }

    fn close(&mut self) -> DriverResult<()> {
        self.rows.clear();
        Ok(())
    }
}
