/// Dump Module
///
/// Reconstructs tables as re-executable SQL: the statement that creates each
/// table followed by one multi-row INSERT carrying its data.
use crate::core::db::driver::{Connection, ExecuteOptions};
use crate::core::db::value::Payload;
use crate::core::{Result, SessionError};
use tracing::debug;

const DUMP_BANNER: &str = "-- Dump created by sqlcli --";

/// Dumps the named tables, or every table when `tables` is empty.
pub fn dump_tables(conn: &mut dyn Connection, tables: &[String]) -> Result<String> {
    let tables = if tables.is_empty() {
        conn.table_names()?
    } else {
        tables.to_vec()
    };

    let mut dump = vec![DUMP_BANNER.to_string(), String::new()];
    for table in &tables {
        debug!("dumping table {}", table);
        dump.push(format!("-- {} --", table));
        dump.push(terminate(&conn.table_definition(table)?));
        dump.push(String::new());

        let select = format!("SELECT * FROM {}", quote_identifier(table));
        let record = conn.execute(&select, &ExecuteOptions::default())?;
        let rows = match record.payload {
            Payload::Rows(rows) => rows,
            Payload::Changes(_) => {
                return Err(SessionError::Sql {
                    message: format!("table {} did not return a row set", table),
                    code: None,
                })
            }
        };

        let Some(first) = rows.first() else {
            continue;
        };
        let columns: Vec<String> = first.keys().map(quote_identifier).collect();
        dump.push(format!(
            "INSERT INTO {} ({}) VALUES",
            quote_identifier(table),
            columns.join(", ")
        ));
        let values: Vec<String> = rows
            .iter()
            .map(|row| {
                let literals: Vec<String> = row.values().map(|v| v.to_sql_literal()).collect();
                format!("    ({})", literals.join(", "))
            })
            .collect();
        dump.push(format!("{};", values.join(",\n")));
        dump.push(String::new());
    }

    dump.push(String::new());
    dump.push(DUMP_BANNER.to_string());
    Ok(dump.join("\n"))
}

fn terminate(statement: &str) -> String {
    let statement = statement.trim_end();
    if statement.ends_with(';') {
        statement.to_string()
    } else {
        format!("{};", statement)
    }
}

fn quote_identifier(name: &str) -> String {
    format!("\"{}\"", name.replace('"', "\"\""))
}
