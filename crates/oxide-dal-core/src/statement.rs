//! Statements: binding named parameters and executing them.

use std::collections::HashMap;

use tracing::{debug, trace, warn};

use crate::driver::{NativeCursor, NativeStatement};
use crate::error::{BindingError, Error, Result};
use crate::parser::Query;
use crate::result::ResultTable;
use crate::types::{DataParam, DataType, Params};
use crate::value::Value;

/// Lifecycle of a [`Statement`].
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum StatementState {
    /// Prepared, nothing bound yet.
    Unbound,
    /// At least one parameter bound since the last execution.
    Bound,
    /// Executed at least once.
    Executed,
    /// Released. Terminal.
    Closed,
}

/// A parsed query bound to a native prepared or callable statement.
///
/// Parameters are set by name; every position the name occupies receives the
/// value. Names that do not occur in the query are ignored, so one parameter
/// set can drive several interchangeable queries.
pub struct Statement {
    query: Query,
    native: Option<Box<dyn NativeStatement>>,
    /// Bound value per ordinal (index = ordinal - 1).
    slots: Vec<Option<Value>>,
    /// Types of the parameters bound by name, used for output registration.
    bound_types: HashMap<String, DataType>,
    /// Output types declared explicitly.
    declared_out: HashMap<String, DataType>,
    outputs: Params,
    batch: Vec<Vec<Option<Value>>>,
    state: StatementState,
}

impl Statement {
    /// Wraps a native statement prepared from `query.sql()`.
    #[must_use]
    pub fn new(query: Query, native: Box<dyn NativeStatement>) -> Self {
        Self {
            slots: vec![None; query.marker_count()],
            query,
            native: Some(native),
            bound_types: HashMap::new(),
            declared_out: HashMap::new(),
            outputs: Params::new(),
            batch: Vec::new(),
            state: StatementState::Unbound,
        }
    }

    /// Returns the parsed query.
    #[must_use]
    pub const fn parsed(&self) -> &Query {
        &self.query
    }

    /// Returns the lifecycle state.
    #[must_use]
    pub const fn state(&self) -> StatementState {
        self.state
    }

    /// Returns the upper-cased parameter names in order of first appearance.
    #[must_use]
    pub fn param_names(&self) -> Vec<&str> {
        self.query.param_names()
    }

    /// Returns the upper-cased output parameter names; empty unless callable.
    #[must_use]
    pub fn out_param_names(&self) -> Vec<&str> {
        self.query.out_param_names()
    }

    /// Binds `param` to every position of `name`.
    ///
    /// Unknown names are ignored.
    ///
    /// # Errors
    ///
    /// Fails if the statement is closed or the driver rejects the value.
    pub fn set_param(&mut self, name: &str, param: &DataParam) -> Result<()> {
        self.ensure_open()?;
        let positions = self.query.positions(name);
        if positions.is_empty() {
            trace!(param = name, query = %self.query.clean(), "Ignoring parameter not used by query");
            return Ok(());
        }

        let native = self
            .native
            .as_mut()
            .ok_or_else(|| Error::misuse("statement is closed"))?;
        for &ordinal in positions {
            native
                .bind(ordinal, param.value())
                .map_err(|e| Error::execution(self.query.clean(), e))?;
            self.slots[ordinal - 1] = Some(param.value().clone());
        }
        self.bound_types
            .insert(name.to_uppercase(), param.data_type());
        self.state = StatementState::Bound;
        Ok(())
    }

    /// Binds every entry of `params`. Names the query does not use are ignored.
    pub fn set_params(&mut self, params: &Params) -> Result<()> {
        for (name, param) in params {
            self.set_param(name, param)?;
        }
        Ok(())
    }

    /// Declares the type an output parameter is read back as.
    ///
    /// Without a declaration the type of the value bound under the same name
    /// is used, falling back to [`DataType::String`]. Unknown names are ignored.
    pub fn declare_out(&mut self, name: &str, data_type: DataType) -> Result<()> {
        self.ensure_open()?;
        if self.query.out_position(name).is_some() {
            self.declared_out.insert(name.to_uppercase(), data_type);
        }
        Ok(())
    }

    /// Returns the output parameters read back by the last [`execute`](Self::execute).
    #[must_use]
    pub const fn outputs(&self) -> &Params {
        &self.outputs
    }

    /// Executes the statement without a cursor and returns the affected row
    /// count.
    ///
    /// For a callable statement every output parameter is read back afterwards
    /// and made available through [`outputs`](Self::outputs), tagged with its
    /// type.
    pub fn execute(&mut self) -> Result<u64> {
        self.prepare_execution()?;
        debug!(query = %self.query.clean(), "Executing statement");

        let Self { native, query, .. } = self;
        let native = native
            .as_mut()
            .ok_or_else(|| Error::misuse("statement is closed"))?;
        let count = native
            .execute_update()
            .map_err(|e| Error::execution(query.clean(), e))?;

        self.read_outputs()?;
        self.state = StatementState::Executed;
        Ok(count)
    }

    /// Binds `params`, executes, and writes output parameters back into
    /// `params`.
    pub fn execute_with(&mut self, params: &mut Params) -> Result<u64> {
        self.set_params(params)?;
        let count = self.execute()?;
        params.merge(&self.outputs);
        Ok(count)
    }

    /// Executes the statement and returns its rows.
    ///
    /// The table borrows this statement, so it cannot outlive it.
    pub fn query(&mut self) -> Result<ResultTable<'_>> {
        let cursor = self.open_cursor()?;
        ResultTable::open(cursor, self.query.clean(), None)
    }

    /// Executes and hands back the raw cursor.
    pub(crate) fn open_cursor(&mut self) -> Result<Box<dyn NativeCursor>> {
        self.prepare_execution()?;
        debug!(query = %self.query.clean(), "Executing query");

        let Self { native, query, .. } = self;
        let native = native
            .as_mut()
            .ok_or_else(|| Error::misuse("statement is closed"))?;
        let mut cursor = native
            .execute_query()
            .map_err(|e| Error::execution(query.clean(), e))?;
        if let Err(e) = self.read_outputs() {
            if let Err(close_error) = cursor.close() {
                warn!(error = %close_error, "Failed to close cursor after output error");
            }
            return Err(e);
        }
        self.state = StatementState::Executed;
        Ok(cursor)
    }

    /// Snapshots the currently bound values as one batch entry.
    pub fn add_batch(&mut self) -> Result<()> {
        self.ensure_open()?;
        if !self.query.out_params().is_empty() {
            return Err(Error::misuse(
                "statements with output parameters cannot be batched",
            ));
        }
        self.check_bound()?;
        self.batch.push(self.slots.clone());
        Ok(())
    }

    /// Returns the number of queued batch entries.
    #[must_use]
    pub fn batch_len(&self) -> usize {
        self.batch.len()
    }

    /// Executes every queued batch entry in order and returns their counts.
    ///
    /// The queue is emptied whether or not execution succeeds.
    pub fn execute_batch(&mut self) -> Result<Vec<u64>> {
        self.ensure_open()?;
        let entries = std::mem::take(&mut self.batch);
        debug!(query = %self.query.clean(), entries = entries.len(), "Executing batch");

        let Self { native, query, .. } = self;
        let native = native
            .as_mut()
            .ok_or_else(|| Error::misuse("statement is closed"))?;
        let mut counts = Vec::with_capacity(entries.len());
        for entry in &entries {
            for (index, value) in entry.iter().enumerate() {
                if let Some(value) = value {
                    native
                        .bind(index + 1, value)
                        .map_err(|e| Error::execution(query.clean(), e))?;
                }
            }
            counts.push(
                native
                    .execute_update()
                    .map_err(|e| Error::execution(query.clean(), e))?,
            );
        }

        if let Some(last) = entries.last() {
            self.slots.clone_from(last);
        }
        self.state = StatementState::Executed;
        Ok(counts)
    }

    /// Releases the native statement. Closing twice is a no-op.
    pub fn close(&mut self) -> Result<()> {
        self.state = StatementState::Closed;
        match self.native.take() {
            Some(mut native) => {
                debug!(query = %self.query.clean(), "Closing statement");
                native.close().map_err(|e| Error::Resource(vec![e]))
            }
            None => Ok(()),
        }
    }

    /// Returns true once the statement is closed.
    #[must_use]
    pub fn is_closed(&self) -> bool {
        self.native.is_none()
    }

    fn ensure_open(&self) -> Result<()> {
        if self.native.is_none() {
            return Err(Error::misuse(format!(
                "statement is closed: {}",
                self.query.clean()
            )));
        }
        Ok(())
    }

    /// Fails on input positions that were never bound.
    fn check_bound(&self) -> Result<()> {
        let out_positions: Vec<usize> = self
            .query
            .out_params()
            .iter()
            .map(|out| out.position)
            .collect();
        for param in self.query.params() {
            let unbound = param.positions.iter().any(|&ordinal| {
                self.slots[ordinal - 1].is_none() && !out_positions.contains(&ordinal)
            });
            if unbound {
                return Err(BindingError::Unbound {
                    name: param.name.clone(),
                }
                .into());
            }
        }
        Ok(())
    }

    fn prepare_execution(&mut self) -> Result<()> {
        self.ensure_open()?;
        self.check_bound()?;
        self.outputs = Params::new();

        let Self {
            native,
            query,
            bound_types,
            declared_out,
            ..
        } = self;
        let native = native
            .as_mut()
            .ok_or_else(|| Error::misuse("statement is closed"))?;
        for out in query.out_params() {
            let data_type = out_type(declared_out, bound_types, &out.name);
            native
                .register_out(out.position, data_type)
                .map_err(|e| Error::execution(query.clean(), e))?;
        }
        Ok(())
    }

    fn read_outputs(&mut self) -> Result<()> {
        let Self {
            native,
            query,
            bound_types,
            declared_out,
            outputs,
            ..
        } = self;
        let native = native
            .as_mut()
            .ok_or_else(|| Error::misuse("statement is closed"))?;
        for out in query.out_params() {
            let data_type = out_type(declared_out, bound_types, &out.name);
            let raw = native
                .out_value(out.position)
                .map_err(|e| Error::execution(query.clean(), e))?;
            let param = DataParam::convert(data_type, raw).map_err(|e| match e {
                BindingError::Conversion { source, .. } => BindingError::Conversion {
                    target: format!("output parameter &{}", out.name),
                    source,
                },
                other => other,
            })?;
            outputs.set(&out.name, param);
        }
        Ok(())
    }
}

fn out_type(
    declared: &HashMap<String, DataType>,
    bound: &HashMap<String, DataType>,
    name: &str,
) -> DataType {
    declared
        .get(name)
        .or_else(|| bound.get(name))
        .copied()
        .filter(|data_type| *data_type != DataType::Other)
        .unwrap_or(DataType::String)
}

impl Drop for Statement {
    fn drop(&mut self) {
        if let Err(e) = self.close() {
            warn!(query = %self.query.clean(), error = %e, "Failed to close statement");
        }
    }
}

impl std::fmt::Debug for Statement {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Statement")
            .field("query", &self.query.clean())
            .field("state", &self.state)
            .field("batch", &self.batch.len())
            .finish_non_exhaustive()
    }
}
