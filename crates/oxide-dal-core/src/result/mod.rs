//! Result tables, rows and column metadata.

mod columns;
mod row;
mod table;

pub use columns::{ColumnMeta, Columns, ColumnsBuilder};
pub use row::Row;
pub use table::{ResultTable, Rows};
