/// Input Module
///
/// Joins typed lines into a pending buffer and decides when the buffer holds
/// a complete command. Three kinds of command exist:
///
/// - SQL statements, terminated by `;` (or `;sh` to suppress output)
/// - meta-commands, introduced by `/`
/// - script expressions, introduced by `>`
///
/// Anything else is incomplete and keeps accumulating.
pub const META_SIGIL: char = '/';
pub const SCRIPT_SIGIL: char = '>';
pub const SUPPRESS_MARKER: &str = "sh";
const TERMINATOR: char = ';';

/// A complete command, consumed once by the dispatcher.
#[derive(Debug, Clone, PartialEq)]
pub enum Command {
    Sql { text: String, suppress_output: bool },
    Meta { name: String, args: Vec<String> },
    Script(String),
}

#[derive(Debug, Clone, PartialEq)]
pub enum Classified {
    Incomplete,
    Complete(Command),
}

/// Appends a trimmed line to the buffer, separated by one space from any
/// existing content.
pub fn accumulate(buffer: &str, line: &str) -> String {
    let line = line.trim();
    if buffer.is_empty() {
        line.to_string()
    } else {
        format!("{} {}", buffer, line)
    }
}

/// Classifies a pending buffer.
///
/// A trailing terminator wins over a leading sigil, so `/x;` is SQL.
pub fn classify(buffer: &str) -> Classified {
    let text = buffer.trim();
    if text.is_empty() {
        return Classified::Incomplete;
    }

    if let Some(statement) = text.strip_suffix(SUPPRESS_MARKER) {
        if statement.ends_with(TERMINATOR) {
            return Classified::Complete(Command::Sql {
                text: statement.to_string(),
                suppress_output: true,
            });
        }
    }
    if text.ends_with(TERMINATOR) {
        return Classified::Complete(Command::Sql {
            text: text.to_string(),
            suppress_output: false,
        });
    }

    if let Some(rest) = text.strip_prefix(META_SIGIL) {
        let mut parts = rest.split_whitespace().map(str::to_string);
        let name = parts.next().unwrap_or_default();
        return Classified::Complete(Command::Meta {
            name,
            args: parts.collect(),
        });
    }

    if let Some(rest) = text.strip_prefix(SCRIPT_SIGIL) {
        return Classified::Complete(Command::Script(rest.to_string()));
    }

    Classified::Incomplete
}

#[cfg(test)]
mod tests {
    use super::*;

    fn sql(text: &str, suppress_output: bool) -> Classified {
        Classified::Complete(Command::Sql {
            text: text.to_string(),
            suppress_output,
        })
    }

    #[test]
    fn test_accumulate() {
        assert_eq!(accumulate("", "  select 1  "), "select 1");
        assert_eq!(accumulate("select", "  1;"), "select 1;");
        assert_eq!(accumulate("select", "   "), "select ");
    }

    #[test]
    fn test_sql_statements() {
        assert_eq!(classify("select 1;"), sql("select 1;", false));
        assert_eq!(classify("select 1;sh"), sql("select 1;", true));
        assert_eq!(classify("  select 1;  "), sql("select 1;", false));
        assert_eq!(classify("select 1"), Classified::Incomplete);
        assert_eq!(classify("select 'sh'"), Classified::Incomplete);
    }

    #[test]
    fn test_terminator_takes_priority_over_sigils() {
        assert_eq!(classify("/set raw;"), sql("/set raw;", false));
        assert_eq!(classify(">x;"), sql(">x;", false));
    }

    #[test]
    fn test_meta_commands() {
        assert_eq!(
            classify("/set  raw mode schema"),
            Classified::Complete(Command::Meta {
                name: "set".into(),
                args: vec!["raw".into(), "mode".into(), "schema".into()],
            })
        );
        assert_eq!(
            classify("/"),
            Classified::Complete(Command::Meta {
                name: String::new(),
                args: vec![],
            })
        );
    }

    #[test]
    fn test_script_expressions_are_verbatim() {
        assert_eq!(
            classify(">  $0[0]  .name"),
            Classified::Complete(Command::Script("  $0[0]  .name".into()))
        );
    }

    #[test]
    fn test_empty_input_is_incomplete() {
        assert_eq!(classify(""), Classified::Incomplete);
        assert_eq!(classify("   "), Classified::Incomplete);
    }
}
