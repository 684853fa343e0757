/// Statement Classification Module
///
/// Determines what kind of statement a SQL string is, so that change summaries
/// can say whether rows were inserted, deleted or altered.
use sqlparser::ast::Statement;
use sqlparser::dialect::SQLiteDialect;
use sqlparser::parser::Parser;
use tracing::trace;

/// Represents different SQL statement types
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum StatementKind {
    Select,
    Insert,
    Update,
    Delete,
    Create,
    Drop,
    Alter,
    /// BEGIN/COMMIT/ROLLBACK transaction commands
    Transaction,
    Other,
}

impl StatementKind {
    /// Determines the statement type from a SQL string.
    ///
    /// The statement is parsed with the SQLite dialect first; text the parser
    /// rejects falls back to a leading-keyword check.
    pub fn from_sql(sql: &str) -> Self {
        let dialect = SQLiteDialect {};
        match Parser::parse_sql(&dialect, sql) {
            Ok(statements) => match statements.first() {
                Some(statement) => Self::from_statement(statement),
                None => StatementKind::Other,
            },
            Err(err) => {
                trace!("falling back to keyword classification: {}", err);
                Self::from_keyword(sql)
            }
        }
    }

    fn from_statement(statement: &Statement) -> Self {
        match statement {
            Statement::Query(_) => StatementKind::Select,
            Statement::Insert { .. } => StatementKind::Insert,
            Statement::Update { .. } => StatementKind::Update,
            Statement::Delete { .. } => StatementKind::Delete,
            Statement::CreateTable { .. }
            | Statement::CreateView { .. }
            | Statement::CreateIndex { .. } => StatementKind::Create,
            Statement::Drop { .. } => StatementKind::Drop,
            Statement::AlterTable { .. } => StatementKind::Alter,
            Statement::StartTransaction { .. }
            | Statement::Commit { .. }
            | Statement::Rollback { .. } => StatementKind::Transaction,
            _ => StatementKind::Other,
        }
    }

    fn from_keyword(sql: &str) -> Self {
        let sql_upper = sql.trim().to_uppercase();
        let keyword = sql_upper
            .split(|c: char| c.is_whitespace() || c == ';' || c == '(')
            .next()
            .unwrap_or("");

        match keyword {
            "SELECT" | "WITH" | "VALUES" => StatementKind::Select,
            "INSERT" | "REPLACE" => StatementKind::Insert,
            "UPDATE" => StatementKind::Update,
            "DELETE" => StatementKind::Delete,
            "CREATE" => StatementKind::Create,
            "DROP" => StatementKind::Drop,
            "ALTER" => StatementKind::Alter,
            "BEGIN" | "COMMIT" | "ROLLBACK" | "END" => StatementKind::Transaction,
            _ => StatementKind::Other,
        }
    }
}

/// Whether the text holds no statement at all: only whitespace, `;`
/// separators and comments.
pub fn is_empty_statement(sql: &str) -> bool {
    let mut rest = sql;
    loop {
        rest = rest.trim_start_matches(|c: char| c.is_whitespace() || c == ';');
        if let Some(comment) = rest.strip_prefix("--") {
            rest = comment.split_once('\n').map_or("", |(_, tail)| tail);
        } else if let Some(comment) = rest.strip_prefix("/*") {
            rest = comment.split_once("*/").map_or("", |(_, tail)| tail);
        } else {
            return rest.is_empty();
        }
    }
}
