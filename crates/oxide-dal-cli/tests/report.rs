//! Reports built from a live SQLite connection.

use oxide_dal_cli::params::collect;
use oxide_dal_cli::report::{QueryReport, ScriptReport};
use oxide_dal_sqlite::{open, SqliteOptions};

const SCRIPT: &str = "\
CREATE TABLE TEST (ID INTEGER PRIMARY KEY, STR VARCHAR(20), DT DATE)
/
INSERT INTO TEST VALUES (1, 'Str1', :d1)
/
INSERT INTO TEST VALUES (2, 'Str2', :d2)
/
";

#[test]
fn test_query_report_from_command_line_params() {
    let mut conn = open(&SqliteOptions::memory()).unwrap();
    let mut setup = collect(
        &[
            "d1:DATE=2024-01-01".to_string(),
            "d2:DATE=2024-01-02".to_string(),
        ],
        None,
    )
    .unwrap();
    let counts = conn.execute_script(SCRIPT, &mut setup).unwrap();
    assert_eq!(ScriptReport::new(counts, &[], &setup).counts, vec![0, 1, 1]);

    let params = collect(&["id=2".to_string()], None).unwrap();
    let mut table = conn
        .query("SELECT * FROM TEST WHERE ID = :id", &params)
        .unwrap();
    let report = QueryReport::collect(&mut table).unwrap();
    assert!(table.is_closed());

    assert_eq!(report.rows.len(), 1);
    assert_eq!(
        report.rows[0],
        vec![
            serde_json::json!(2),
            serde_json::json!("Str2"),
            serde_json::json!("2024-01-02"),
        ]
    );

    let json = serde_json::to_value(&report).unwrap();
    assert_eq!(json["columns"][0]["name"], "ID");
    assert_eq!(json["columns"][0]["type"], "LONG");

    let text = report.to_text();
    assert!(text.starts_with("ID | STR  | DT"));
    assert!(text.ends_with("(1 row)\n"));
    conn.close().unwrap();
}
