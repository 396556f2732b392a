#![allow(dead_code)]

use chrono::NaiveDate;
use oxide_dal_core::{Connection, DataParam, DataType, Params};
use oxide_dal_sqlite::{open, SqliteOptions};

pub fn memory() -> Connection {
    open(&SqliteOptions::memory()).unwrap_or_else(|e| panic!("Failed to open database: {e}"))
}

pub fn date(year: i32, month: u32, day: u32) -> NaiveDate {
    NaiveDate::from_ymd_opt(year, month, day).unwrap()
}

/// Creates `TEST(ID, STR, DT)` holding (1, "Str1", d0) and (2, "Str2", d1).
pub fn create_test_table(conn: &mut Connection) {
    conn.execute(
        "CREATE TABLE TEST (ID INTEGER PRIMARY KEY, STR VARCHAR(20), DT DATE)",
        &mut Params::new(),
    )
    .unwrap();
    for (id, day) in [(1_i64, 1), (2, 2)] {
        let mut params = Params::new()
            .value("id", id)
            .value("str", format!("Str{id}"))
            .with("dt", DataParam::new(DataType::Date, date(2024, 1, day)).unwrap());
        let count = conn
            .execute("INSERT INTO TEST (ID, STR, DT) VALUES (:id, :str, :dt)", &mut params)
            .unwrap();
        assert_eq!(count, 1);
    }
}

pub fn count(conn: &mut Connection, table: &str) -> i64 {
    conn.query_row(&format!("SELECT COUNT(*) FROM {table}"), &Params::new())
        .unwrap()
        .unwrap()
        .get::<i64>(0)
        .unwrap()
}
