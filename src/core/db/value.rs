/// Result Values Module
///
/// The structured result of one statement execution. A `ResultRecord` pairs a
/// payload (a row set, or a change summary for statements that return no rows)
/// with the field metadata of the row set. Both halves come out of a single
/// driver call and are never updated separately.
use crate::core::db::statement::StatementKind;
use chrono::NaiveDateTime;
use serde::ser::{SerializeMap, SerializeStruct};
use serde::{Serialize, Serializer};

/// A single cell value as delivered by a driver.
#[derive(Debug, Clone, PartialEq)]
pub enum Value {
    Null,
    Integer(i64),
    Real(f64),
    Text(String),
    Blob(Vec<u8>),
    /// A date or time column value; `raw` is the text as stored
    Timestamp { parsed: NaiveDateTime, raw: String },
}

impl Value {
    /// Renders the value for a table cell.
    ///
    /// Nulls render as `null`, timestamps as ISO-8601 and blobs as a short
    /// type tag followed by the bracketed byte list.
    pub fn render(&self) -> String {
        match self {
            Value::Null => "null".to_string(),
            Value::Integer(i) => i.to_string(),
            Value::Real(f) => f.to_string(),
            Value::Text(t) => t.clone(),
            Value::Blob(bytes) => {
                let data: Vec<String> = bytes.iter().map(|b| b.to_string()).collect();
                format!("Buf[{}]", data.join(","))
            }
            Value::Timestamp { parsed, .. } => iso8601(parsed),
        }
    }

    /// Renders the value as a SQL literal that re-creates it.
    pub fn to_sql_literal(&self) -> String {
        match self {
            Value::Null => "NULL".to_string(),
            Value::Integer(i) => i.to_string(),
            Value::Real(f) => f.to_string(),
            Value::Text(t) => quote_literal(t),
            Value::Blob(bytes) => {
                let hex: String = bytes.iter().map(|b| format!("{:02X}", b)).collect();
                format!("X'{}'", hex)
            }
            Value::Timestamp { raw, .. } => quote_literal(raw),
        }
    }
}

fn iso8601(ts: &NaiveDateTime) -> String {
    ts.format("%Y-%m-%dT%H:%M:%S%.3fZ").to_string()
}

fn quote_literal(text: &str) -> String {
    format!("'{}'", text.replace('\'', "''"))
}

impl Serialize for Value {
    fn serialize<S: Serializer>(&self, serializer: S) -> std::result::Result<S::Ok, S::Error> {
        match self {
            Value::Null => serializer.serialize_unit(),
            Value::Integer(i) => serializer.serialize_i64(*i),
            Value::Real(f) => serializer.serialize_f64(*f),
            Value::Text(t) => serializer.serialize_str(t),
            Value::Blob(bytes) => {
                let mut blob = serializer.serialize_struct("Buffer", 2)?;
                blob.serialize_field("type", "Buffer")?;
                blob.serialize_field("data", bytes)?;
                blob.end()
            }
            Value::Timestamp { parsed, .. } => serializer.serialize_str(&iso8601(parsed)),
        }
    }
}

/// One row of a result set: an insertion-ordered mapping from column name to value.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct Row {
    cells: Vec<(String, Value)>,
}

impl Row {
    pub fn new() -> Self {
        Row { cells: Vec::new() }
    }

    /// Sets a column value. An existing column keeps its position and is overwritten.
    pub fn insert(&mut self, column: impl Into<String>, value: Value) {
        let column = column.into();
        match self.cells.iter_mut().find(|(name, _)| *name == column) {
            Some(cell) => cell.1 = value,
            None => self.cells.push((column, value)),
        }
    }

    pub fn get(&self, column: &str) -> Option<&Value> {
        self.cells
            .iter()
            .find(|(name, _)| name == column)
            .map(|(_, value)| value)
    }

    pub fn keys(&self) -> impl Iterator<Item = &str> {
        self.cells.iter().map(|(name, _)| name.as_str())
    }

    pub fn values(&self) -> impl Iterator<Item = &Value> {
        self.cells.iter().map(|(_, value)| value)
    }

    pub fn len(&self) -> usize {
        self.cells.len()
    }

    pub fn is_empty(&self) -> bool {
        self.cells.is_empty()
    }
}

impl<K: Into<String>> FromIterator<(K, Value)> for Row {
    fn from_iter<I: IntoIterator<Item = (K, Value)>>(iter: I) -> Self {
        let mut row = Row::new();
        for (column, value) in iter {
            row.insert(column, value);
        }
        row
    }
}

impl Serialize for Row {
    fn serialize<S: Serializer>(&self, serializer: S) -> std::result::Result<S::Ok, S::Error> {
        let mut map = serializer.serialize_map(Some(self.cells.len()))?;
        for (name, value) in &self.cells {
            map.serialize_entry(name, value)?;
        }
        map.end()
    }
}

/// Describes one column of a row set.
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct FieldDescriptor {
    pub name: String,
    /// Declared column type, when the driver knows it
    pub declared_type: Option<String>,
    /// Position of the column in the row set
    pub index: usize,
}

/// Outcome of a statement that changed rows without returning a row set.
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct ChangeSummary {
    pub affected_rows: usize,
    #[serde(rename = "insertId")]
    pub last_insert_id: i64,
    #[serde(skip)]
    pub kind: StatementKind,
}

impl ChangeSummary {
    /// One-line summary, e.g. `Inserted 2 records.`
    pub fn describe(&self) -> String {
        let verb = match self.kind {
            StatementKind::Insert => "Inserted",
            StatementKind::Delete => "Deleted",
            _ => "Altered",
        };
        let plural = if self.affected_rows == 1 { "" } else { "s" };
        format!("{} {} record{}.", verb, self.affected_rows, plural)
    }
}

/// The rows half of a result record.
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(untagged)]
pub enum Payload {
    Rows(Vec<Row>),
    Changes(ChangeSummary),
}

/// The structured result of one statement execution.
#[derive(Debug, Clone, PartialEq)]
pub struct ResultRecord {
    pub payload: Payload,
    /// Field metadata; absent when the statement returned no row set
    pub fields: Option<Vec<FieldDescriptor>>,
}

impl ResultRecord {
    pub fn rows(rows: Vec<Row>, fields: Vec<FieldDescriptor>) -> Self {
        ResultRecord {
            payload: Payload::Rows(rows),
            fields: Some(fields),
        }
    }

    pub fn changes(summary: ChangeSummary) -> Self {
        ResultRecord {
            payload: Payload::Changes(summary),
            fields: None,
        }
    }
}
