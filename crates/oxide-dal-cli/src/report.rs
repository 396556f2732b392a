//! Command output, as JSON or as plain text.

use std::collections::BTreeMap;
use std::fmt::Write as _;

use oxide_dal_core::{Params, Query, ResultTable, Value};
use serde::Serialize;

use crate::error::Result;

/// What the parser made of a query.
#[derive(Debug, Serialize)]
pub struct ParseReport {
    /// Text handed to the driver.
    pub sql: String,
    /// Whitespace-normalized text used in error messages.
    pub clean: String,
    /// Whether the statement goes through the callable path.
    pub callable: bool,
    /// Number of `?` placeholders.
    pub markers: usize,
    /// Input names and their ordinals.
    pub params: Vec<ParamReport>,
    /// Output names and their ordinals.
    pub outputs: Vec<ParamReport>,
}

/// One named marker.
#[derive(Debug, Serialize)]
pub struct ParamReport {
    /// Upper-cased name.
    pub name: String,
    /// 1-based ordinals.
    pub positions: Vec<usize>,
}

impl ParseReport {
    /// Describes a parsed query.
    #[must_use]
    pub fn new(query: &Query) -> Self {
        Self {
            sql: query.sql().to_string(),
            clean: query.clean().to_string(),
            callable: query.is_callable(),
            markers: query.marker_count(),
            params: query
                .params()
                .iter()
                .map(|p| ParamReport {
                    name: p.name.clone(),
                    positions: p.positions.clone(),
                })
                .collect(),
            outputs: query
                .out_params()
                .iter()
                .map(|p| ParamReport {
                    name: p.name.clone(),
                    positions: vec![p.position],
                })
                .collect(),
        }
    }

    /// Renders the report as text.
    #[must_use]
    pub fn to_text(&self) -> String {
        let mut out = String::new();
        let _ = writeln!(out, "sql:      {}", self.sql);
        let _ = writeln!(out, "clean:    {}", self.clean);
        let _ = writeln!(out, "callable: {}", self.callable);
        let _ = writeln!(out, "markers:  {}", self.markers);
        for (label, params) in [("in", &self.params), ("out", &self.outputs)] {
            for p in params {
                let positions: Vec<String> = p.positions.iter().map(ToString::to_string).collect();
                let _ = writeln!(out, "{label:<4}{:<20} {}", p.name, positions.join(", "));
            }
        }
        out
    }
}

/// Column header of a query report.
#[derive(Debug, Serialize)]
pub struct ColumnReport {
    /// Column label.
    pub name: String,
    /// Logical type name.
    #[serde(rename = "type")]
    pub data_type: String,
}

/// All rows of a query.
#[derive(Debug, Serialize)]
pub struct QueryReport {
    /// Column headers in select-list order.
    pub columns: Vec<ColumnReport>,
    /// Row values, one array per row.
    pub rows: Vec<Vec<serde_json::Value>>,
    #[serde(skip)]
    text_rows: Vec<Vec<String>>,
}

impl QueryReport {
    /// Drains `table`, closing it afterwards.
    pub fn collect(table: &mut ResultTable<'_>) -> Result<Self> {
        let columns = table
            .columns()
            .iter()
            .map(|c| ColumnReport {
                name: c.name().to_string(),
                data_type: c.data_type().name().to_string(),
            })
            .collect();

        let mut rows = Vec::new();
        let mut text_rows = Vec::new();
        while table.has_next()? {
            let row = table.next_row()?;
            rows.push(row.values().iter().map(value_to_json).collect());
            text_rows.push(row.values().iter().map(ToString::to_string).collect());
        }
        table.close()?;

        Ok(Self {
            columns,
            rows,
            text_rows,
        })
    }

    /// Renders the rows as an aligned text table.
    #[must_use]
    pub fn to_text(&self) -> String {
        let headers: Vec<&str> = self.columns.iter().map(|c| c.name.as_str()).collect();
        let mut widths: Vec<usize> = headers.iter().map(|h| h.chars().count()).collect();
        for row in &self.text_rows {
            for (width, cell) in widths.iter_mut().zip(row) {
                *width = (*width).max(cell.chars().count());
            }
        }

        let mut out = String::new();
        push_line(&mut out, headers.iter().copied(), &widths);
        let rule: Vec<String> = widths.iter().map(|w| "-".repeat(*w)).collect();
        push_line(&mut out, rule.iter().map(String::as_str), &widths);
        for row in &self.text_rows {
            push_line(&mut out, row.iter().map(String::as_str), &widths);
        }
        let _ = writeln!(
            out,
            "({} row{})",
            self.rows.len(),
            if self.rows.len() == 1 { "" } else { "s" }
        );
        out
    }
}

fn push_line<'a>(out: &mut String, cells: impl Iterator<Item = &'a str>, widths: &[usize]) {
    let line: Vec<String> = cells
        .zip(widths)
        .map(|(cell, width)| format!("{cell:<width$}"))
        .collect();
    let _ = writeln!(out, "{}", line.join(" | ").trim_end());
}

/// Result of a single update or call.
#[derive(Debug, Serialize)]
pub struct ExecReport {
    /// Update count reported by the driver.
    pub count: u64,
    /// Output parameter values by name.
    pub outputs: BTreeMap<String, serde_json::Value>,
}

impl ExecReport {
    /// Builds the report, reading the values of `names` from `params`.
    #[must_use]
    pub fn new(count: u64, names: &[String], params: &Params) -> Self {
        Self {
            count,
            outputs: outputs(names, params),
        }
    }

    /// Renders the report as text.
    #[must_use]
    pub fn to_text(&self) -> String {
        let mut out = format!("{} row(s) affected\n", self.count);
        push_outputs(&mut out, &self.outputs);
        out
    }
}

/// Result of a script.
#[derive(Debug, Serialize)]
pub struct ScriptReport {
    /// Update count per statement, in script order.
    pub counts: Vec<u64>,
    /// Final values of every output declared in the script.
    pub outputs: BTreeMap<String, serde_json::Value>,
}

impl ScriptReport {
    /// Builds the report, reading the values of `names` from `params`.
    #[must_use]
    pub fn new(counts: Vec<u64>, names: &[String], params: &Params) -> Self {
        Self {
            counts,
            outputs: outputs(names, params),
        }
    }

    /// Renders the report as text.
    #[must_use]
    pub fn to_text(&self) -> String {
        let mut out = String::new();
        for (i, count) in self.counts.iter().enumerate() {
            let _ = writeln!(out, "statement {}: {count} row(s)", i + 1);
        }
        push_outputs(&mut out, &self.outputs);
        out
    }
}

fn outputs(names: &[String], params: &Params) -> BTreeMap<String, serde_json::Value> {
    names
        .iter()
        .filter_map(|name| {
            params
                .get(name)
                .map(|p| (name.clone(), value_to_json(p.value())))
        })
        .collect()
}

fn push_outputs(out: &mut String, outputs: &BTreeMap<String, serde_json::Value>) {
    for (name, value) in outputs {
        let _ = writeln!(out, "{name} = {value}");
    }
}

/// Converts a column or parameter value to JSON.
///
/// Temporal values use their canonical text form and binary values are
/// rendered as lowercase hex.
#[must_use]
pub fn value_to_json(value: &Value) -> serde_json::Value {
    match value {
        Value::Null => serde_json::Value::Null,
        Value::Bool(b) => serde_json::Value::Bool(*b),
        Value::Short(v) => serde_json::Value::from(*v),
        Value::Int(v) => serde_json::Value::from(*v),
        Value::Long(v) => serde_json::Value::from(*v),
        Value::Float(v) => serde_json::Value::from(f64::from(*v)),
        Value::Double(v) => serde_json::Value::from(*v),
        Value::Text(s) => serde_json::Value::String(s.clone()),
        Value::Bytes(bytes) => serde_json::Value::String(bytes.iter().fold(
            String::with_capacity(bytes.len() * 2),
            |mut hex, byte| {
                let _ = write!(hex, "{byte:02x}");
                hex
            },
        )),
        Value::Date(_) | Value::Time(_) | Value::Timestamp(_) => {
            serde_json::Value::String(value.to_string())
        }
    }
}
