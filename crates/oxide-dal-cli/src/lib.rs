//! Command-line front end for `oxide-dal`.
//!
//! The `oxide-dal` binary opens a SQLite database and offers four commands:
//!
//! - **parse** shows how a query's named markers map to `?` ordinals
//! - **query** runs a query and prints its rows
//! - **exec** runs one update or call and prints the update count and outputs
//! - **run** executes a `/`-separated script in a single transaction
//!
//! Parameters are given as `-p NAME=VALUE` or `-p NAME:TYPE=VALUE` and may
//! also come from a JSON file (see [`params`]). Every command can print its
//! result as JSON with `--json`.

pub mod error;
pub mod params;
pub mod report;

pub use error::{CliError, Result};
