//! Tests for the row protocol and result table resources.

mod common;
use common::*;

use chrono::NaiveDate;
use oxide_dal_core::{DataType, Error, Params, Value};

fn select_test() -> (oxide_dal_core::Connection, Journal) {
    connect(|req| {
        assert!(req.sql.starts_with("SELECT"));
        Ok(test_table())
    })
}

#[test]
fn test_has_next_is_idempotent_until_next_row() {
    let (mut conn, journal) = select_test();
    let mut stmt = conn.prepare("SELECT * FROM TEST").unwrap();
    let mut table = stmt.query().unwrap();

    assert!(table.has_next().unwrap());
    assert!(table.has_next().unwrap());
    assert_eq!(journal.count("fetch"), 1);

    let first = table.next_row().unwrap();
    assert_eq!(first.value(0).unwrap(), &Value::Long(1));

    assert!(table.has_next().unwrap());
    let second = table.next_row().unwrap();
    assert_eq!(second.get::<String>(1).unwrap(), "Str2");

    assert!(!table.has_next().unwrap());
    assert!(!table.has_next().unwrap());
}

#[test]
fn test_next_row_without_has_next_is_misuse() {
    let (mut conn, _journal) = select_test();
    let mut stmt = conn.prepare("SELECT * FROM TEST").unwrap();
    let mut table = stmt.query().unwrap();

    assert!(matches!(table.next_row(), Err(Error::ProtocolMisuse(_))));

    assert!(table.has_next().unwrap());
    table.next_row().unwrap();
    // The cached row was consumed; taking again is a misuse, not a skip.
    assert!(matches!(table.next_row(), Err(Error::ProtocolMisuse(_))));
}

#[test]
fn test_next_row_after_exhaustion_is_misuse() {
    let (mut conn, _journal) = connect(|_| Ok(Response::table(&[("N", DataType::Long)], vec![])));
    let mut table = conn.query("SELECT n FROM empty", &Params::new()).unwrap();
    assert!(!table.has_next().unwrap());
    assert!(matches!(table.next_row(), Err(Error::ProtocolMisuse(_))));
}

#[test]
fn test_columns_are_frozen_at_open() {
    let (mut conn, _journal) = select_test();
    let table = conn.query("SELECT * FROM TEST", &Params::new()).unwrap();
    assert_eq!(table.column_count(), 3);
    assert_eq!(table.columns().names(), vec!["ID", "STR", "DT"]);
    assert_eq!(table.column_index("str").unwrap(), 1);
    assert_eq!(
        table.columns().get(2).map(|c| c.data_type()),
        Some(DataType::Date)
    );
}

#[test]
fn test_unknown_column_is_descriptive() {
    let (mut conn, _journal) = select_test();
    let mut table = conn.query("SELECT * FROM TEST", &Params::new()).unwrap();
    let err = table.column_index("MISSING").unwrap_err();
    let message = err.to_string();
    assert!(message.contains("MISSING"), "{message}");
    assert!(message.contains("ID, STR, DT"), "{message}");

    let row = table.rows().next().unwrap().unwrap();
    assert!(matches!(
        row.value_by_name("missing"),
        Err(Error::NoSuchColumn { .. })
    ));
}

#[test]
fn test_values_are_widened_once() {
    let (mut conn, _journal) = select_test();
    let mut table = conn.query("SELECT * FROM TEST", &Params::new()).unwrap();
    let rows = table.collect_rows().unwrap();
    assert_eq!(rows.len(), 2);
    assert_eq!(rows[1].values()[0], Value::Long(2));
    assert_eq!(
        rows[1].value_by_name("DT").unwrap(),
        &Value::Date(NaiveDate::from_ymd_opt(2024, 1, 2).unwrap())
    );
}

#[test]
fn test_conversion_failure_surfaces_from_has_next() {
    let (mut conn, _journal) = connect(|_| {
        Ok(Response::table(
            &[("AMOUNT", DataType::Integer)],
            vec![vec![Value::Double(1.5)]],
        ))
    });
    let mut table = conn.query("SELECT amount FROM t", &Params::new()).unwrap();
    let err = table.has_next().unwrap_err();
    assert!(matches!(err, Error::Binding(_)), "got {err:?}");
    assert!(err.to_string().contains("AMOUNT"));
}

#[test]
fn test_failed_row_is_not_skipped() {
    let (mut conn, journal) = connect(|_| {
        Ok(Response::table(
            &[("AMOUNT", DataType::Integer)],
            vec![vec![Value::Double(1.5)], vec![Value::Long(7)]],
        ))
    });
    let mut table = conn.query("SELECT amount FROM t", &Params::new()).unwrap();
    assert!(matches!(table.has_next(), Err(Error::Binding(_))));

    // The table stays failed instead of moving on to the next row.
    let err = table.has_next().unwrap_err();
    assert!(matches!(err, Error::ProtocolMisuse(_)), "got {err:?}");
    assert!(err.to_string().contains("AMOUNT"));
    assert!(matches!(table.next_row(), Err(Error::ProtocolMisuse(_))));
    assert_eq!(journal.count("fetch"), 1);

    table.close().unwrap();
}

#[test]
fn test_rows_iterator_reads_everything() {
    let (mut conn, _journal) = select_test();
    let mut table = conn.query("SELECT * FROM TEST", &Params::new()).unwrap();
    let ids: Vec<i64> = table
        .rows()
        .map(|row| row.and_then(|r| r.get::<i64>(0)))
        .collect::<Result<_, _>>()
        .unwrap();
    assert_eq!(ids, vec![1, 2]);
}

#[test]
fn test_owning_table_closes_cursor_and_statement() {
    let (mut conn, journal) = select_test();
    let mut table = conn.query("SELECT * FROM TEST", &Params::new()).unwrap();
    table.close().unwrap();
    table.close().unwrap();
    assert!(table.is_closed());
    assert_eq!(journal.count("close cursor"), 1);
    assert_eq!(journal.count("close statement"), 1);
    assert!(matches!(table.has_next(), Err(Error::ProtocolMisuse(_))));
}

#[test]
fn test_dropping_an_owning_table_releases_everything() {
    let (mut conn, journal) = select_test();
    drop(conn.query("SELECT * FROM TEST", &Params::new()).unwrap());
    assert_eq!(journal.count("close cursor"), 1);
    assert_eq!(journal.count("close statement"), 1);
}

#[test]
fn test_borrowed_table_leaves_statement_open() {
    let (mut conn, journal) = select_test();
    let mut stmt = conn.prepare("SELECT * FROM TEST").unwrap();
    {
        let mut table = stmt.query().unwrap();
        table.close().unwrap();
    }
    assert_eq!(journal.count("close cursor"), 1);
    assert_eq!(journal.count("close statement"), 0);

    // The statement can run again.
    let mut table = stmt.query().unwrap();
    assert!(table.has_next().unwrap());
}

#[test]
fn test_close_failures_are_aggregated() {
    let (mut conn, journal) = select_test();
    journal.fail_close("cursor");
    journal.fail_close("statement");
    let mut table = conn.query("SELECT * FROM TEST", &Params::new()).unwrap();

    let err = table.close().unwrap_err();
    let Error::Resource(errors) = &err else {
        panic!("expected resource error, got {err:?}");
    };
    assert_eq!(errors.len(), 2);
    assert!(err.to_string().contains("cursor close failed"));
    assert!(err.to_string().contains("statement close failed"));
    // Both were attempted even though the first failed.
    assert_eq!(journal.count("close cursor"), 1);
    assert_eq!(journal.count("close statement"), 1);
}
