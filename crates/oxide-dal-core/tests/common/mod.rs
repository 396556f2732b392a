#![allow(dead_code)]

//! A scripted in-memory driver.
//!
//! Every native call is recorded in a journal, and statement execution is
//! answered by a handler closure supplied by the test.

use std::cell::RefCell;
use std::collections::{BTreeMap, HashSet, VecDeque};
use std::rc::Rc;

use oxide_dal_core::{
    Connection, DataType, DriverError, DriverResult, NativeColumn, NativeConnection, NativeCursor,
    NativeStatement, StatementKind, Value,
};

/// What the handler sees when a statement executes.
pub struct Request<'a> {
    pub sql: &'a str,
    pub kind: StatementKind,
    pub inputs: &'a BTreeMap<usize, Value>,
    pub outputs: &'a BTreeMap<usize, DataType>,
}

impl Request<'_> {
    pub fn input(&self, ordinal: usize) -> Option<&Value> {
        self.inputs.get(&ordinal)
    }
}

/// What the handler answers.
#[derive(Default)]
pub struct Response {
    pub count: u64,
    pub outputs: Vec<(usize, Value)>,
    pub columns: Vec<NativeColumn>,
    pub rows: Vec<Vec<Value>>,
}

impl Response {
    pub fn count(count: u64) -> Self {
        Self {
            count,
            ..Self::default()
        }
    }

    pub fn output(mut self, ordinal: usize, value: impl Into<Value>) -> Self {
        self.outputs.push((ordinal, value.into()));
        self
    }

    pub fn table(columns: &[(&str, DataType)], rows: Vec<Vec<Value>>) -> Self {
        Self {
            columns: columns
                .iter()
                .map(|(name, data_type)| NativeColumn::new(*name, *data_type))
                .collect(),
            rows,
            ..Self::default()
        }
    }
}

type Handler = Box<dyn FnMut(&Request<'_>) -> DriverResult<Response>>;

struct State {
    events: Vec<String>,
    autocommit: bool,
    failing_closes: HashSet<&'static str>,
    handler: Handler,
}

/// Shared view of the fake driver's state.
#[derive(Clone)]
pub struct Journal(Rc<RefCell<State>>);

impl Journal {
    pub fn events(&self) -> Vec<String> {
        self.0.borrow().events.clone()
    }

    pub fn count(&self, event: &str) -> usize {
        self.0.borrow().events.iter().filter(|e| *e == event).count()
    }

    pub fn contains(&self, event: &str) -> bool {
        self.count(event) > 0
    }

    /// Makes `close()` fail for "cursor", "statement" or "connection".
    pub fn fail_close(&self, resource: &'static str) {
        self.0.borrow_mut().failing_closes.insert(resource);
    }

    fn record(&self, event: impl Into<String>) {
        self.0.borrow_mut().events.push(event.into());
    }

    fn close(&self, resource: &'static str) -> DriverResult<()> {
        self.record(format!("close {resource}"));
        if self.0.borrow().failing_closes.contains(resource) {
            return Err(DriverError::new(format!("{resource} close failed")).with_vendor_code(99));
        }
        Ok(())
    }
}

/// Opens a connection whose statements are answered by `handler`.
pub fn connect(
    handler: impl FnMut(&Request<'_>) -> DriverResult<Response> + 'static,
) -> (Connection, Journal) {
    let journal = Journal(Rc::new(RefCell::new(State {
        events: Vec::new(),
        autocommit: true,
        failing_closes: HashSet::new(),
        handler: Box::new(handler),
    })));
    let connection = Connection::from_native(FakeConnection {
        journal: journal.clone(),
    });
    (connection, journal)
}

/// Opens a connection where every statement affects one row.
pub fn connect_default() -> (Connection, Journal) {
    connect(|_| Ok(Response::count(1)))
}

struct FakeConnection {
    journal: Journal,
}

impl NativeConnection for FakeConnection {
    fn name(&self) -> &'static str {
        "fake"
    }

    fn prepare(&mut self, sql: &str, kind: StatementKind) -> DriverResult<Box<dyn NativeStatement>> {
        if sql.contains("INVALID") {
            return Err(DriverError::new("syntax error").with_sql_state("42000"));
        }
        self.journal.record(format!("prepare {sql}"));
        Ok(Box::new(FakeStatement {
            journal: self.journal.clone(),
            sql: sql.to_string(),
            kind,
            inputs: BTreeMap::new(),
            registered: BTreeMap::new(),
            outputs: BTreeMap::new(),
        }))
    }

    fn set_autocommit(&mut self, autocommit: bool) -> DriverResult<()> {
        self.journal.record(format!("autocommit {autocommit}"));
        self.journal.0.borrow_mut().autocommit = autocommit;
        Ok(())
    }

    fn autocommit(&self) -> bool {
        self.journal.0.borrow().autocommit
    }

    fn commit(&mut self) -> DriverResult<()> {
        self.journal.record("commit");
        Ok(())
    }

    fn rollback(&mut self) -> DriverResult<()> {
        self.journal.record("rollback");
        Ok(())
    }

    fn close(&mut self) -> DriverResult<()> {
        self.journal.close("connection")
    }
}

struct FakeStatement {
    journal: Journal,
    sql: String,
    kind: StatementKind,
    inputs: BTreeMap<usize, Value>,
    registered: BTreeMap<usize, DataType>,
    outputs: BTreeMap<usize, Value>,
}

impl FakeStatement {
    fn run(&mut self) -> DriverResult<Response> {
        self.journal.record(format!("execute {}", self.sql));
        let request = Request {
            sql: &self.sql,
            kind: self.kind,
            inputs: &self.inputs,
            outputs: &self.registered,
        };
        let response = (self.journal.0.borrow_mut().handler)(&request)?;
        self.outputs = response.outputs.iter().cloned().collect();
        Ok(response)
    }
}

impl NativeStatement for FakeStatement {
    fn bind(&mut self, ordinal: usize, value: &Value) -> DriverResult<()> {
        self.journal.record(format!("bind {ordinal}={value}"));
        self.inputs.insert(ordinal, value.clone());
        Ok(())
    }

    fn register_out(&mut self, ordinal: usize, data_type: DataType) -> DriverResult<()> {
        self.journal.record(format!("register {ordinal} {data_type}"));
        self.registered.insert(ordinal, data_type);
        Ok(())
    }

    fn execute_update(&mut self) -> DriverResult<u64> {
        self.run().map(|response| response.count)
    }

    fn execute_query(&mut self) -> DriverResult<Box<dyn NativeCursor>> {
        let response = self.run()?;
        Ok(Box::new(FakeCursor {
            journal: self.journal.clone(),
            columns: response.columns,
            rows: response.rows.into(),
        }))
    }

    fn out_value(&mut self, ordinal: usize) -> DriverResult<Value> {
        Ok(self.outputs.get(&ordinal).cloned().unwrap_or(Value::Null))
    }

    fn close(&mut self) -> DriverResult<()> {
        self.journal.close("statement")
    }
}

struct FakeCursor {
    journal: Journal,
    columns: Vec<NativeColumn>,
    rows: VecDeque<Vec<Value>>,
}

impl NativeCursor for FakeCursor {
    fn columns(&self) -> DriverResult<Vec<NativeColumn>> {
        Ok(self.columns.clone())
    }

    fn next_row(&mut self) -> DriverResult<Option<Vec<Value>>> {
        self.journal.record("fetch");
        Ok(self.rows.pop_front())
    }

    fn close(&mut self) -> DriverResult<()> {
        self.journal.close("cursor")
    }
}

/// The `TEST(ID, STR, DT)` table with two rows.
pub fn test_table() -> Response {
    Response::table(
        &[
            ("ID", DataType::Long),
            ("STR", DataType::String),
            ("DT", DataType::Date),
        ],
        vec![
            vec![Value::Int(1), Value::from("Str1"), Value::from("2024-01-01")],
            vec![Value::Int(2), Value::from("Str2"), Value::from("2024-01-02")],
        ],
    )
}
