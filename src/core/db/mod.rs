/// Database Module
///
/// This module provides the driver boundary of sqlcli, organized into focused
/// submodules:
/// - **Values** (`value.rs`): result records, rows, field descriptors
/// - **Drivers** (`driver.rs`): the `Driver`/`Connection` traits, connection
///   parameters and URI parsing, and the driver registry
/// - **SQLite** (`sqlite.rs`): the rusqlite-backed driver
/// - **Statements** (`statement.rs`): statement kind detection
/// - **Dumps** (`dump.rs`): reconstruction of tables as SQL
///
/// ## Error Handling
///
/// All operations use the standardized `SessionError` type.
pub mod driver;
pub mod dump;
pub mod sqlite;
pub mod statement;
pub mod value;

pub use driver::*;
pub use value::*;
