/// Dispatcher Module
///
/// Routes one complete command to the data service, the meta-command
/// registry or the sandbox, and turns the result into an `Outcome` for the
/// controller to write. Nothing here touches the terminal.
use crate::core::db::value::{Payload, ResultRecord};
use crate::core::{Result, SessionError};
use crate::repl::commands::{MetaOutput, MetaRegistry};
use crate::repl::input::Command;
use crate::results_grid::render_rows;
use crate::sandbox::render_value;
use crate::session::settings::RawMode;
use crate::session::Session;
use serde_json::Value as JsonValue;
use tracing::{debug, warn};

#[derive(Debug, Clone, PartialEq)]
pub enum Outcome {
    /// Nothing to show
    Silent,
    /// Plain output, such as a result table or a change summary
    Text(String),
    /// Meta-command lines, one per element
    Lines(Vec<String>),
    /// A structured value produced in raw mode
    Raw(JsonValue),
    /// A non-fatal message for the error stream
    Notice(String),
    Clear,
    Exit,
}

pub fn dispatch(session: &mut Session, registry: &MetaRegistry, command: Command) -> Result<Outcome> {
    match command {
        Command::Sql {
            text,
            suppress_output,
        } => dispatch_sql(session, &text, suppress_output),
        Command::Meta { name, args } => match registry.run(session, &name, &args) {
            Ok(output) => Ok(match output {
                MetaOutput::Nothing => Outcome::Silent,
                MetaOutput::Lines(lines) => Outcome::Lines(lines),
                MetaOutput::Clear => Outcome::Clear,
                MetaOutput::Exit => Outcome::Exit,
            }),
            Err(err @ SessionError::UnknownMetaCommand(_)) => Ok(Outcome::Notice(err.to_string())),
            Err(err) => Err(err),
        },
        Command::Script(expression) => match session.evaluate_script(&expression) {
            Ok(value) => Ok(Outcome::Text(render_value(&value))),
            Err(err) => {
                warn!("script evaluation failed: {}", err);
                Ok(Outcome::Notice(err.to_string()))
            }
        },
    }
}

fn dispatch_sql(session: &mut Session, sql: &str, suppress_output: bool) -> Result<Outcome> {
    let record = session.execute_sql(sql)?;
    debug!("statement finished, suppress_output={}", suppress_output);

    if suppress_output {
        return Ok(Outcome::Silent);
    }
    if session.settings.raw_active {
        return raw_slice(&record, session.settings.raw_mode).map(Outcome::Raw);
    }
    Ok(Outcome::Text(match &record.payload {
        Payload::Rows(rows) => render_rows(rows),
        Payload::Changes(summary) => summary.describe(),
    }))
}

/// The part of a record selected by the raw mode.
pub fn raw_slice(record: &ResultRecord, mode: RawMode) -> Result<JsonValue> {
    let to_json = |value: serde_json::Result<JsonValue>| {
        value.map_err(|e| SessionError::Sql {
            message: format!("Unable to serialize result: {}", e),
            code: None,
        })
    };
    let mut slices = Vec::with_capacity(2);
    if mode.includes_values() {
        slices.push(to_json(serde_json::to_value(&record.payload))?);
    }
    if mode.includes_schema() {
        slices.push(to_json(serde_json::to_value(&record.fields))?);
    }
    Ok(match slices.len() {
        1 => slices.remove(0),
        _ => JsonValue::Array(slices),
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::core::db::driver::ConnectParams;
    use crate::repl::input::{classify, Classified};
    use crate::session::settings::Settings;
    use serde_json::json;

    fn run(session: &mut Session, text: &str) -> Result<Outcome> {
        match classify(text) {
            Classified::Complete(command) => dispatch(session, &MetaRegistry::default(), command),
            Classified::Incomplete => panic!("incomplete command: {}", text),
        }
    }

    fn connected() -> Session {
        let mut session = Session::new(Settings::default());
        session.connect(ConnectParams::default()).unwrap();
        run(&mut session, "CREATE TABLE t (id INTEGER PRIMARY KEY, name TEXT);").unwrap();
        session
    }

    #[test]
    fn test_sql_without_connection() {
        let mut session = Session::new(Settings::default());
        match run(&mut session, "SELECT 1;") {
            Err(err @ SessionError::NotConnected) => assert_eq!(err.code(), Some(12)),
            other => panic!("Expected NotConnected, got {:?}", other),
        }
    }

    #[test]
    fn test_change_summaries() {
        let mut session = connected();
        assert_eq!(
            run(&mut session, "INSERT INTO t (name) VALUES ('a'), ('b');").unwrap(),
            Outcome::Text("Inserted 2 records.".into())
        );
        assert_eq!(
            run(&mut session, "UPDATE t SET name = 'c' WHERE id = 1;").unwrap(),
            Outcome::Text("Altered 1 record.".into())
        );
        assert_eq!(
            run(&mut session, "DELETE FROM t;").unwrap(),
            Outcome::Text("Deleted 2 records.".into())
        );
    }

    #[test]
    fn test_rows_are_tabulated() {
        let mut session = connected();
        run(&mut session, "INSERT INTO t (name) VALUES ('Ann');").unwrap();
        match run(&mut session, "SELECT id, name FROM t;").unwrap() {
            Outcome::Text(table) => assert!(table.contains("| id | name |")),
            other => panic!("Expected a table, got {:?}", other),
        }
        assert_eq!(
            run(&mut session, "SELECT * FROM t WHERE id = 99;").unwrap(),
            Outcome::Text("Returned 0 rows.".into())
        );
    }

    #[test]
    fn test_suppressed_output_still_updates_history() {
        let mut session = connected();
        let before = session.history.len();
        assert_eq!(run(&mut session, "SELECT 1;sh").unwrap(), Outcome::Silent);
        assert_eq!(session.history.len(), before + 1);
    }

    #[test]
    fn test_raw_modes() {
        let mut session = connected();
        run(&mut session, "INSERT INTO t (name) VALUES ('Ann');").unwrap();
        run(&mut session, "/set raw active on").unwrap();

        assert_eq!(
            run(&mut session, "SELECT id, name FROM t;").unwrap(),
            Outcome::Raw(json!([{"id": 1, "name": "Ann"}]))
        );

        run(&mut session, "/set raw mode schema").unwrap();
        match run(&mut session, "SELECT id FROM t;").unwrap() {
            Outcome::Raw(fields) => {
                assert_eq!(fields[0]["name"], json!("id"));
                assert_eq!(fields[0]["declaredType"], json!("INTEGER"));
            }
            other => panic!("Expected raw output, got {:?}", other),
        }

        run(&mut session, "/set raw mode all").unwrap();
        match run(&mut session, "SELECT id FROM t;").unwrap() {
            Outcome::Raw(JsonValue::Array(parts)) => assert_eq!(parts.len(), 2),
            other => panic!("Expected raw pair, got {:?}", other),
        }

        assert_eq!(run(&mut session, "SELECT id FROM t;sh").unwrap(), Outcome::Silent);
    }

    #[test]
    fn test_unknown_meta_command_is_a_notice() {
        let mut session = Session::new(Settings::default());
        assert_eq!(
            run(&mut session, "/frobnicate now").unwrap(),
            Outcome::Notice("Unknown command: \"frobnicate\"".into())
        );
        assert!(matches!(run(&mut session, "/").unwrap(), Outcome::Notice(_)));
    }

    #[test]
    fn test_meta_errors_propagate() {
        let mut session = Session::new(Settings::default());
        let err = run(&mut session, "/set colour red").unwrap_err();
        assert_eq!(err.code(), Some(110));
    }

    #[test]
    fn test_scripts() {
        let mut session = connected();
        run(&mut session, "INSERT INTO t (name) VALUES ('Ann');").unwrap();
        run(&mut session, "SELECT name FROM t;").unwrap();

        assert_eq!(
            run(&mut session, ">$0[0].name").unwrap(),
            Outcome::Text("Ann".into())
        );
        assert_eq!(
            run(&mut session, "> $[1]").unwrap(),
            Outcome::Text("{\n  \"affectedRows\": 1,\n  \"insertId\": 1\n}".into())
        );
        match run(&mut session, ">nope").unwrap() {
            Outcome::Notice(message) => assert!(message.contains("ReferenceError")),
            other => panic!("Expected a notice, got {:?}", other),
        }
    }
}
