/// SQLite Driver Module
///
/// A `Driver` backed by rusqlite. The `database` connection parameter is the
/// path of the database file; without one an in-memory database is opened.
/// Host, user and password are accepted for prompt display but not used.
use crate::core::db::driver::{ConnectParams, Connection, Driver, ExecuteOptions};
use crate::core::db::statement::{is_empty_statement, StatementKind};
use crate::core::db::value::{ChangeSummary, FieldDescriptor, ResultRecord, Row, Value};
use crate::core::{Result, SessionError};
use chrono::{NaiveDate, NaiveDateTime};
use rusqlite::types::ValueRef;
use rusqlite::OptionalExtension;
use tracing::{debug, info};

const MEMORY_DATABASE: &str = ":memory:";

/// Driver for SQLite database files.
#[derive(Debug, Clone, Copy, Default)]
pub struct SqliteDriver;

impl Driver for SqliteDriver {
    fn name(&self) -> &'static str {
        "sqlite"
    }

    fn connect(&self, params: &ConnectParams) -> Result<Box<dyn Connection>> {
        let path = params.database.as_deref().unwrap_or(MEMORY_DATABASE);
        info!("opening sqlite database at {}", path);

        let conn = rusqlite::Connection::open(path).map_err(connection_error)?;
        conn.execute_batch("PRAGMA foreign_keys = ON;")
            .map_err(connection_error)?;

        Ok(Box::new(SqliteConnection { conn }))
    }
}

fn connection_error(err: rusqlite::Error) -> SessionError {
    let code = match &err {
        rusqlite::Error::SqliteFailure(failure, _) => Some(failure.extended_code),
        _ => None,
    };
    SessionError::Connection {
        message: err.to_string(),
        code,
    }
}

/// An open SQLite database.
pub struct SqliteConnection {
    conn: rusqlite::Connection,
}

impl Connection for SqliteConnection {
    fn execute(&mut self, sql: &str, options: &ExecuteOptions) -> Result<ResultRecord> {
        debug!("executing: {}", sql);
        if is_empty_statement(sql) {
            return Err(SessionError::Sql {
                message: "Query was empty".to_string(),
                code: None,
            });
        }
        let mut stmt = self.conn.prepare(sql)?;

        if stmt.column_count() == 0 {
            let affected_rows = stmt.execute([])?;
            return Ok(ResultRecord::changes(ChangeSummary {
                affected_rows,
                last_insert_id: self.conn.last_insert_rowid(),
                kind: StatementKind::from_sql(sql),
            }));
        }

        let columns: Vec<(String, Option<String>)> = stmt
            .columns()
            .iter()
            .map(|c| (c.name().to_string(), c.decl_type().map(str::to_string)))
            .collect();
        let names: Vec<&str> = columns.iter().map(|(name, _)| name.as_str()).collect();
        let keys = column_keys(&names, options.nested_field_prefix.as_deref());

        let fields: Vec<FieldDescriptor> = columns
            .iter()
            .enumerate()
            .map(|(index, (name, declared_type))| FieldDescriptor {
                name: name.clone(),
                declared_type: declared_type.clone(),
                index,
            })
            .collect();

        let mut rows = Vec::new();
        let mut cursor = stmt.query([])?;
        while let Some(record) = cursor.next()? {
            let mut row = Row::new();
            for (index, key) in keys.iter().enumerate() {
                let declared = columns[index].1.as_deref();
                row.insert(key.clone(), convert_value(record.get_ref(index)?, declared));
            }
            rows.push(row);
        }

        debug!("statement returned {} rows", rows.len());
        Ok(ResultRecord::rows(rows, fields))
    }

    fn table_names(&mut self) -> Result<Vec<String>> {
        let mut stmt = self.conn.prepare(
            "SELECT name FROM sqlite_master
             WHERE type = 'table' AND name NOT LIKE 'sqlite_%'
             ORDER BY name",
        )?;
        let names = stmt
            .query_map([], |row| row.get::<_, String>(0))?
            .collect::<std::result::Result<Vec<_>, _>>()?;
        Ok(names)
    }

    fn table_definition(&mut self, table: &str) -> Result<String> {
        let definition: Option<Option<String>> = self
            .conn
            .query_row(
                "SELECT sql FROM sqlite_master WHERE type = 'table' AND name = ?1",
                [table],
                |row| row.get(0),
            )
            .optional()?;

        match definition.flatten() {
            Some(sql) => Ok(sql),
            None => Err(SessionError::Sql {
                message: format!("no such table: {}", table),
                code: None,
            }),
        }
    }

    fn close(self: Box<Self>) -> Result<()> {
        self.conn.close().map_err(|(_, err)| err.into())
    }
}

/// Computes the row keys for a list of column names.
///
/// Without a prefix, repeated names collapse onto one key and the last value
/// wins. With a prefix, the n-th repeat of a name is keyed `{name}{prefix}{n}`.
pub fn column_keys(names: &[&str], prefix: Option<&str>) -> Vec<String> {
    let Some(prefix) = prefix else {
        return names.iter().map(|n| n.to_string()).collect();
    };

    let mut keys: Vec<String> = Vec::with_capacity(names.len());
    for (index, name) in names.iter().enumerate() {
        let repeats = names[..index].iter().filter(|n| *n == name).count();
        if repeats == 0 {
            keys.push(name.to_string());
        } else {
            keys.push(format!("{}{}{}", name, prefix, repeats));
        }
    }
    keys
}

fn convert_value(value: ValueRef, declared_type: Option<&str>) -> Value {
    match value {
        ValueRef::Null => Value::Null,
        ValueRef::Integer(i) => Value::Integer(i),
        ValueRef::Real(f) => Value::Real(f),
        ValueRef::Text(t) => {
            let text = String::from_utf8_lossy(t).to_string();
            if is_temporal(declared_type) {
                if let Some(parsed) = parse_timestamp(&text) {
                    return Value::Timestamp { parsed, raw: text };
                }
            }
            Value::Text(text)
        }
        ValueRef::Blob(b) => Value::Blob(b.to_vec()),
    }
}

fn is_temporal(declared_type: Option<&str>) -> bool {
    match declared_type {
        Some(t) => {
            let t = t.to_ascii_uppercase();
            t.contains("DATE") || t.contains("TIME")
        }
        None => false,
    }
}

fn parse_timestamp(text: &str) -> Option<NaiveDateTime> {
    const FORMATS: [&str; 2] = ["%Y-%m-%d %H:%M:%S%.f", "%Y-%m-%dT%H:%M:%S%.f"];
    FORMATS
        .iter()
        .find_map(|fmt| NaiveDateTime::parse_from_str(text, fmt).ok())
        .or_else(|| {
            NaiveDate::parse_from_str(text, "%Y-%m-%d")
                .ok()
                .and_then(|d| d.and_hms_opt(0, 0, 0))
        })
}
