/// Core Module for sqlcli
///
/// This module contains the shared infrastructure of the session engine:
/// the error taxonomy and the database plumbing (values, drivers, dumps).

pub mod db;
pub mod error;

// Re-export commonly used types for convenience
pub use error::{Result, SessionError};
