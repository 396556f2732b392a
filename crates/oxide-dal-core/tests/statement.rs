//! Tests for binding and executing statements.

mod common;
use common::*;

use oxide_dal_core::{
    BindingError, DataParam, DataType, DriverError, Error, Params, StatementKind, StatementState,
    Value,
};

#[test]
fn test_one_set_param_binds_every_position() {
    let (mut conn, journal) = connect_default();
    let mut stmt = conn
        .prepare("SELECT * FROM t WHERE a = :x OR b = :X OR c = :x")
        .unwrap();
    assert_eq!(stmt.param_names(), vec!["X"]);
    assert_eq!(stmt.parsed().positions("x"), &[1, 2, 3]);

    stmt.set_param("x", &DataParam::of(5_i64)).unwrap();
    for ordinal in 1..=3 {
        assert_eq!(journal.count(&format!("bind {ordinal}=5")), 1);
    }
    assert_eq!(stmt.execute().unwrap(), 1);
}

#[test]
fn test_names_not_in_query_are_ignored() {
    let (mut conn, journal) = connect_default();
    let mut stmt = conn.prepare("DELETE FROM t WHERE id = :id").unwrap();
    let params = Params::new().value("id", 1_i64).value("unused", "x");
    stmt.set_params(&params).unwrap();
    assert_eq!(journal.count("bind 1=1"), 1);
    assert!(!journal.events().iter().any(|e| e.contains("=x")));
}

#[test]
fn test_callable_reads_declared_output() {
    let (mut conn, journal) = connect(|req| {
        assert_eq!(req.kind, StatementKind::Callable);
        let input = req.input(2).and_then(Value::as_i64).unwrap_or_default();
        Ok(Response::count(0).output(1, input * 2))
    });
    let mut stmt = conn.prepare("{call double_it(&out, :in)}").unwrap();
    assert_eq!(stmt.out_param_names(), vec!["OUT"]);
    assert_eq!(stmt.param_names(), vec!["OUT", "IN"]);

    stmt.declare_out("out", DataType::Long).unwrap();
    stmt.set_param("in", &DataParam::of(21_i64)).unwrap();
    stmt.execute().unwrap();

    assert!(journal.contains("register 1 LONG"));
    assert_eq!(
        stmt.outputs().get("OUT"),
        Some(&DataParam::new(DataType::Long, 42_i64).unwrap())
    );
}

#[test]
fn test_row_returning_call_reads_outputs() {
    let (mut conn, journal) = connect(|_| {
        Ok(Response::table(&[("ID", DataType::Long)], vec![vec![Value::Long(1)]]).output(1, 5_i64))
    });
    let mut stmt = conn.prepare("{call list_items(&total)}").unwrap();
    stmt.declare_out("total", DataType::Long).unwrap();

    {
        let mut table = stmt.query().unwrap();
        assert_eq!(table.collect_rows().unwrap().len(), 1);
    }
    assert!(journal.contains("register 1 LONG"));
    assert_eq!(
        stmt.outputs().get("total"),
        Some(&DataParam::new(DataType::Long, 5_i64).unwrap())
    );
}

#[test]
fn test_undeclared_output_reads_as_string() {
    let (mut conn, journal) = connect(|_| Ok(Response::count(0).output(1, 42_i64)));
    let mut stmt = conn.prepare("BEGIN :out := 42; END;").unwrap();
    // `:out` is an input marker; only `&` markers are read back.
    assert!(stmt.out_param_names().is_empty());
    stmt.set_param("out", &DataParam::null(DataType::Long)).unwrap();
    stmt.execute().unwrap();
    assert!(stmt.outputs().is_empty());

    let mut stmt = conn.prepare("BEGIN &out := 42; END;").unwrap();
    stmt.execute().unwrap();
    assert!(journal.contains("register 1 STRING"));
    let out = stmt.outputs().get("out").unwrap();
    assert_eq!(out.data_type(), DataType::String);
    assert_eq!(out.value(), &Value::from("42"));
}

#[test]
fn test_inout_marker_is_bound_and_read_back() {
    let (mut conn, journal) = connect(|req| {
        let current = req.input(1).and_then(Value::as_i64).unwrap_or_default();
        Ok(Response::count(0).output(1, current + 1))
    });
    let mut params = Params::new().value("counter", 5_i64);
    let mut stmt = conn.prepare("{call bump(&counter)}").unwrap();
    stmt.execute_with(&mut params).unwrap();

    assert!(journal.contains("bind 1=5"));
    assert!(journal.contains("register 1 LONG"));
    assert_eq!(
        params.get("COUNTER").map(DataParam::value),
        Some(&Value::Long(6))
    );
}

#[test]
fn test_duplicate_output_marker_fails_at_prepare() {
    let (mut conn, journal) = connect_default();
    let err = conn.prepare("{call p(&x, &X)}").unwrap_err();
    assert!(matches!(err, Error::Parse(_)), "got {err:?}");
    assert!(err.to_string().contains("{call p(&x, &X)}"));
    assert!(journal.events().is_empty());
}

#[test]
fn test_unbound_input_is_a_binding_error() {
    let (mut conn, journal) = connect_default();
    let mut stmt = conn
        .prepare("SELECT * FROM t WHERE a = :a AND b = :b")
        .unwrap();
    stmt.set_param("a", &DataParam::of("x")).unwrap();
    let err = stmt.execute().unwrap_err();
    assert!(
        matches!(&err, Error::Binding(BindingError::Unbound { name }) if name == "B"),
        "got {err:?}"
    );
    assert!(!journal.events().iter().any(|e| e.starts_with("execute")));
}

#[test]
fn test_driver_failure_keeps_clean_query() {
    let (mut conn, _journal) = connect(|_| {
        Err(DriverError::new("UNIQUE constraint failed")
            .with_sql_state("23000")
            .with_vendor_code(2067))
    });
    let mut stmt = conn
        .prepare("INSERT /* audit */ INTO t\n  VALUES (:a)")
        .unwrap();
    stmt.set_param("a", &DataParam::of(1_i64)).unwrap();
    let err = stmt.execute().unwrap_err();
    let Error::Execution { query, source } = &err else {
        panic!("expected execution error, got {err:?}");
    };
    assert_eq!(query, "INSERT INTO t VALUES (:a)");
    assert_eq!(source.sql_state.as_deref(), Some("23000"));
    assert_eq!(source.vendor_code, Some(2067));
    assert!(err.to_string().contains("UNIQUE constraint failed"));
}

#[test]
fn test_prepare_failure_is_an_execution_error() {
    let (mut conn, _journal) = connect_default();
    let err = conn.prepare("SELECT INVALID FROM t").unwrap_err();
    assert!(matches!(err, Error::Execution { .. }), "got {err:?}");
}

#[test]
fn test_batch_executes_each_entry() {
    let (mut conn, journal) = connect(|req| {
        let id = req.input(1).and_then(Value::as_i64).unwrap_or_default();
        Ok(Response::count(if id == 3 { 0 } else { 1 }))
    });
    let mut stmt = conn.prepare("INSERT INTO t VALUES (:id, :name)").unwrap();
    for id in 1..=3_i64 {
        stmt.set_param("id", &DataParam::of(id)).unwrap();
        stmt.set_param("name", &DataParam::of(format!("row {id}")))
            .unwrap();
        stmt.add_batch().unwrap();
    }
    assert_eq!(stmt.batch_len(), 3);

    assert_eq!(stmt.execute_batch().unwrap(), vec![1, 1, 0]);
    assert_eq!(stmt.batch_len(), 0);
    assert_eq!(journal.count("execute INSERT INTO t VALUES (?, ?)"), 3);
    assert_eq!(stmt.state(), StatementState::Executed);
}

#[test]
fn test_batch_rejects_output_parameters() {
    let (mut conn, _journal) = connect_default();
    let mut stmt = conn.prepare("{call p(&x)}").unwrap();
    assert!(matches!(stmt.add_batch(), Err(Error::ProtocolMisuse(_))));
}

#[test]
fn test_batch_entry_must_be_fully_bound() {
    let (mut conn, _journal) = connect_default();
    let mut stmt = conn.prepare("INSERT INTO t VALUES (:a, :b)").unwrap();
    stmt.set_param("a", &DataParam::of(1_i64)).unwrap();
    assert!(matches!(
        stmt.add_batch(),
        Err(Error::Binding(BindingError::Unbound { .. }))
    ));
}

#[test]
fn test_lifecycle_states() {
    let (mut conn, journal) = connect_default();
    let mut stmt = conn.prepare("UPDATE t SET a = :a").unwrap();
    assert_eq!(stmt.state(), StatementState::Unbound);

    stmt.set_param("a", &DataParam::of(true)).unwrap();
    assert_eq!(stmt.state(), StatementState::Bound);

    stmt.execute().unwrap();
    assert_eq!(stmt.state(), StatementState::Executed);

    stmt.close().unwrap();
    stmt.close().unwrap();
    assert_eq!(stmt.state(), StatementState::Closed);
    assert!(stmt.is_closed());
    assert_eq!(journal.count("close statement"), 1);

    assert!(matches!(
        stmt.set_param("a", &DataParam::of(false)),
        Err(Error::ProtocolMisuse(_))
    ));
    assert!(matches!(stmt.execute(), Err(Error::ProtocolMisuse(_))));
}

#[test]
fn test_dropping_a_statement_closes_it() {
    let (mut conn, journal) = connect_default();
    {
        let _stmt = conn.prepare("SELECT 1").unwrap();
    }
    assert_eq!(journal.count("close statement"), 1);
}

#[test]
fn test_statement_close_failure_is_a_resource_error() {
    let (mut conn, journal) = connect_default();
    journal.fail_close("statement");
    let mut stmt = conn.prepare("SELECT 1").unwrap();
    let err = stmt.close().unwrap_err();
    assert!(matches!(&err, Error::Resource(errors) if errors.len() == 1));
    assert!(stmt.is_closed());
}
