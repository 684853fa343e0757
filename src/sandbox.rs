/// Scripting Sandbox
///
/// Script expressions (`>` lines) are evaluated by a `Sandbox`. The session
/// only needs the narrow `evaluate` capability; `ScopeSandbox` is the bundled
/// implementation, a small evaluator over JSON values. It understands literals,
/// variables with `let` bindings that persist per context, and property and
/// index access, which is what inspecting result history needs:
///
/// ```text
/// > $0[0].name
/// > let first = $[1]
/// > $$0.length
/// ```
///
/// The history is exposed through read-only bindings: `$` (every rows entry,
/// newest first), `$0` (the values of the newest rows entry), `$$` (every
/// metadata entry) and `$$0` (the newest metadata entry).
use crate::core::db::value::Payload;
use crate::core::{Result, SessionError};
use crate::session::history::HistoryBuffer;
use serde_json::{Map, Number, Value as JsonValue};
use std::collections::HashMap;
use tracing::trace;
use uuid::Uuid;

const READ_ONLY_BINDINGS: [&str; 4] = ["$", "$0", "$$", "$$0"];

/// Deepest nesting of brackets and parentheses an expression may use.
pub const MAX_NESTING_DEPTH: usize = 256;

/// Evaluates script expressions in a persistent context.
pub trait Sandbox {
    fn evaluate(
        &mut self,
        context: Uuid,
        expression: &str,
        history: &HistoryBuffer,
    ) -> Result<JsonValue>;
}

/// Generic value-to-text conversion for sandbox results.
pub fn render_value(value: &JsonValue) -> String {
    match value {
        JsonValue::String(s) => s.clone(),
        other => serde_json::to_string_pretty(other).unwrap_or_else(|_| other.to_string()),
    }
}

/// The bundled JSON-value evaluator.
#[derive(Debug, Default)]
pub struct ScopeSandbox {
    contexts: HashMap<Uuid, HashMap<String, JsonValue>>,
}

impl ScopeSandbox {
    pub fn new() -> Self {
        Self::default()
    }
}

impl Sandbox for ScopeSandbox {
    fn evaluate(
        &mut self,
        context: Uuid,
        expression: &str,
        history: &HistoryBuffer,
    ) -> Result<JsonValue> {
        trace!("evaluating in context {}: {}", context, expression);
        let tokens = tokenize(expression)?;
        let scope = self.contexts.entry(context).or_default();
        let mut parser = Parser {
            tokens,
            pos: 0,
            depth: 0,
            scope,
            history,
        };
        parser.statement()
    }
}

#[derive(Debug, Clone, PartialEq)]
enum Token {
    Ident(String),
    Number(Number),
    Str(String),
    Punct(char),
}

fn syntax_error(message: impl std::fmt::Display) -> SessionError {
    SessionError::Script(format!("SyntaxError: {}", message))
}

fn tokenize(source: &str) -> Result<Vec<Token>> {
    let chars: Vec<char> = source.chars().collect();
    let mut tokens = Vec::new();
    let mut i = 0;

    while i < chars.len() {
        let c = chars[i];
        if c.is_whitespace() {
            i += 1;
        } else if c == '$' || c == '_' || c.is_alphabetic() {
            let start = i;
            while i < chars.len() && (chars[i] == '$' || chars[i] == '_' || chars[i].is_alphanumeric()) {
                i += 1;
            }
            tokens.push(Token::Ident(chars[start..i].iter().collect()));
        } else if c.is_ascii_digit() {
            let start = i;
            while i < chars.len() && (chars[i].is_ascii_alphanumeric() || chars[i] == '.') {
                i += 1;
            }
            let text: String = chars[start..i].iter().collect();
            tokens.push(Token::Number(parse_number(&text)?));
        } else if c == '"' || c == '\'' {
            let (text, next) = read_string(&chars, i)?;
            tokens.push(Token::Str(text));
            i = next;
        } else if "[](){}.,:=;-".contains(c) {
            tokens.push(Token::Punct(c));
            i += 1;
        } else {
            return Err(syntax_error(format!("Invalid or unexpected token '{}'", c)));
        }
    }
    Ok(tokens)
}

fn parse_number(text: &str) -> Result<Number> {
    if let Ok(int) = text.parse::<i64>() {
        return Ok(Number::from(int));
    }
    text.parse::<f64>()
        .ok()
        .and_then(Number::from_f64)
        .ok_or_else(|| syntax_error(format!("Invalid number '{}'", text)))
}

fn read_string(chars: &[char], start: usize) -> Result<(String, usize)> {
    let quote = chars[start];
    let mut text = String::new();
    let mut i = start + 1;
    while i < chars.len() {
        match chars[i] {
            c if c == quote => return Ok((text, i + 1)),
            '\\' if i + 1 < chars.len() => {
                text.push(match chars[i + 1] {
                    'n' => '\n',
                    't' => '\t',
                    other => other,
                });
                i += 2;
            }
            c => {
                text.push(c);
                i += 1;
            }
        }
    }
    Err(syntax_error("Invalid or unexpected token: unterminated string"))
}

struct Parser<'a> {
    tokens: Vec<Token>,
    pos: usize,
    depth: usize,
    scope: &'a mut HashMap<String, JsonValue>,
    history: &'a HistoryBuffer,
}

impl Parser<'_> {
    fn peek(&self) -> Option<&Token> {
        self.tokens.get(self.pos)
    }

    fn peek_at(&self, offset: usize) -> Option<&Token> {
        self.tokens.get(self.pos + offset)
    }

    fn next(&mut self) -> Option<Token> {
        let token = self.tokens.get(self.pos).cloned();
        self.pos += 1;
        token
    }

    fn eat(&mut self, punct: char) -> bool {
        if self.peek() == Some(&Token::Punct(punct)) {
            self.pos += 1;
            true
        } else {
            false
        }
    }

    fn consume(&mut self, punct: char) -> Result<()> {
        if self.eat(punct) {
            Ok(())
        } else {
            Err(self.unexpected())
        }
    }

    fn unexpected(&self) -> SessionError {
        match self.peek() {
            Some(token) => syntax_error(format!("Unexpected token {:?}", token)),
            None => syntax_error("Unexpected end of input"),
        }
    }

    fn statement(&mut self) -> Result<JsonValue> {
        let declaring = matches!(
            self.peek(),
            Some(Token::Ident(word)) if word == "let" || word == "const" || word == "var"
        );
        if declaring {
            self.pos += 1;
        }

        let assigning = matches!(
            (self.peek(), self.peek_at(1)),
            (Some(Token::Ident(_)), Some(Token::Punct('=')))
        );
        let value = if assigning {
            let Some(Token::Ident(name)) = self.next() else {
                return Err(self.unexpected());
            };
            self.consume('=')?;
            let value = self.expression()?;
            self.assign(name, value)?
        } else if declaring {
            match self.next() {
                Some(Token::Ident(name)) => self.assign(name, JsonValue::Null)?,
                _ => return Err(self.unexpected()),
            }
        } else {
            self.expression()?
        };

        self.eat(';');
        if self.peek().is_some() {
            return Err(self.unexpected());
        }
        Ok(value)
    }

    fn assign(&mut self, name: String, value: JsonValue) -> Result<JsonValue> {
        if READ_ONLY_BINDINGS.contains(&name.as_str()) {
            return Err(SessionError::Script(format!(
                "TypeError: Assignment to read-only binding '{}'",
                name
            )));
        }
        self.scope.insert(name, value.clone());
        Ok(value)
    }

    fn expression(&mut self) -> Result<JsonValue> {
        if self.depth >= MAX_NESTING_DEPTH {
            return Err(SessionError::Script(
                "RangeError: Maximum nesting depth exceeded".to_string(),
            ));
        }
        self.depth += 1;
        let value = self.postfix();
        self.depth -= 1;
        value
    }

    fn postfix(&mut self) -> Result<JsonValue> {
        let mut value = self.primary()?;
        loop {
            if self.eat('.') {
                match self.next() {
                    Some(Token::Ident(key)) => value = member(&value, &JsonValue::String(key))?,
                    _ => return Err(syntax_error("Unexpected token after '.'")),
                }
            } else if self.eat('[') {
                let key = self.expression()?;
                self.consume(']')?;
                value = member(&value, &key)?;
            } else {
                return Ok(value);
            }
        }
    }

    fn primary(&mut self) -> Result<JsonValue> {
        match self.next() {
            Some(Token::Number(n)) => Ok(JsonValue::Number(n)),
            Some(Token::Str(s)) => Ok(JsonValue::String(s)),
            Some(Token::Punct('-')) => match self.next() {
                Some(Token::Number(n)) => negate(&n),
                _ => Err(self.unexpected()),
            },
            Some(Token::Punct('(')) => {
                let value = self.expression()?;
                self.consume(')')?;
                Ok(value)
            }
            Some(Token::Punct('[')) => {
                let mut items = Vec::new();
                while !self.eat(']') {
                    items.push(self.expression()?);
                    if !self.eat(',') {
                        self.consume(']')?;
                        break;
                    }
                }
                Ok(JsonValue::Array(items))
            }
            Some(Token::Punct('{')) => {
                let mut object = Map::new();
                while !self.eat('}') {
                    let key = match self.next() {
                        Some(Token::Ident(k)) | Some(Token::Str(k)) => k,
                        _ => return Err(self.unexpected()),
                    };
                    self.consume(':')?;
                    object.insert(key, self.expression()?);
                    if !self.eat(',') {
                        self.consume('}')?;
                        break;
                    }
                }
                Ok(JsonValue::Object(object))
            }
            Some(Token::Ident(name)) => self.lookup(&name),
            Some(token) => Err(syntax_error(format!("Unexpected token {:?}", token))),
            None => Err(syntax_error("Unexpected end of input")),
        }
    }

    fn lookup(&self, name: &str) -> Result<JsonValue> {
        match name {
            "true" => return Ok(JsonValue::Bool(true)),
            "false" => return Ok(JsonValue::Bool(false)),
            "null" | "undefined" => return Ok(JsonValue::Null),
            _ => {}
        }
        if let Some(value) = history_binding(self.history, name)? {
            return Ok(value);
        }
        self.scope
            .get(name)
            .cloned()
            .ok_or_else(|| SessionError::Script(format!("ReferenceError: {} is not defined", name)))
    }
}

fn negate(n: &Number) -> Result<JsonValue> {
    if let Some(i) = n.as_i64() {
        return Ok(JsonValue::from(-i));
    }
    n.as_f64()
        .and_then(|f| Number::from_f64(-f))
        .map(JsonValue::Number)
        .ok_or_else(|| syntax_error("Invalid number"))
}

fn member(target: &JsonValue, key: &JsonValue) -> Result<JsonValue> {
    let key_text = match key {
        JsonValue::String(s) => s.clone(),
        other => other.to_string(),
    };
    match target {
        JsonValue::Null => Err(SessionError::Script(format!(
            "TypeError: Cannot read properties of null (reading '{}')",
            key_text
        ))),
        JsonValue::Array(items) => {
            if key_text == "length" {
                return Ok(JsonValue::from(items.len()));
            }
            Ok(key_text
                .parse::<usize>()
                .ok()
                .and_then(|i| items.get(i).cloned())
                .unwrap_or(JsonValue::Null))
        }
        JsonValue::Object(map) => Ok(map.get(&key_text).cloned().unwrap_or(JsonValue::Null)),
        JsonValue::String(s) => {
            if key_text == "length" {
                return Ok(JsonValue::from(s.chars().count()));
            }
            Ok(key_text
                .parse::<usize>()
                .ok()
                .and_then(|i| s.chars().nth(i))
                .map(|c| JsonValue::String(c.to_string()))
                .unwrap_or(JsonValue::Null))
        }
        _ => Ok(JsonValue::Null),
    }
}

fn to_json<T: serde::Serialize>(value: &T) -> Result<JsonValue> {
    serde_json::to_value(value).map_err(|e| SessionError::Script(format!("TypeError: {}", e)))
}

/// Resolves the read-only history bindings; other names yield `None`.
fn history_binding(history: &HistoryBuffer, name: &str) -> Result<Option<JsonValue>> {
    let value = match name {
        "$" => JsonValue::Array(history.rows().map(to_json).collect::<Result<_>>()?),
        "$$" => JsonValue::Array(history.metadata().map(|m| to_json(&m)).collect::<Result<_>>()?),
        "$0" => match history.get0().map(|entry| entry.rows) {
            Some(Payload::Rows(rows)) => to_json(rows)?,
            Some(Payload::Changes(summary)) => match to_json(summary)? {
                JsonValue::Object(map) => JsonValue::Array(map.into_iter().map(|(_, v)| v).collect()),
                other => other,
            },
            None => JsonValue::Array(Vec::new()),
        },
        "$$0" => match history.get0().and_then(|entry| entry.metadata) {
            Some(fields) => to_json(&fields)?,
            None => JsonValue::Array(Vec::new()),
        },
        _ => return Ok(None),
    };
    Ok(Some(value))
}
