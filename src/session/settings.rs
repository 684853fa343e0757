/// Settings Store
///
/// Mutable session configuration, read and written through key paths such as
/// `raw mode` or `nestedFieldPrefix`. Only meta-commands mutate it.
use crate::core::{Result, SessionError};
use crate::session::prompt::RESET_TOKEN;

/// Number of results kept in history unless configured otherwise.
pub const DEFAULT_HISTORY_CAPACITY: usize = 20;

/// Which slice of a result record raw mode returns.
///
/// The variants are bit flags: `All` is `SchemaOnly | ValuesOnly`.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum RawMode {
    All,
    SchemaOnly,
    ValuesOnly,
}

impl RawMode {
    pub fn bits(self) -> u8 {
        match self {
            RawMode::All => 0b11,
            RawMode::SchemaOnly => 0b10,
            RawMode::ValuesOnly => 0b01,
        }
    }

    pub fn includes_schema(self) -> bool {
        self.bits() & RawMode::SchemaOnly.bits() != 0
    }

    pub fn includes_values(self) -> bool {
        self.bits() & RawMode::ValuesOnly.bits() != 0
    }

    pub fn name(self) -> &'static str {
        match self {
            RawMode::All => "all",
            RawMode::SchemaOnly => "schema",
            RawMode::ValuesOnly => "values",
        }
    }

    /// Maps a mode name case-insensitively; unknown names mean `ValuesOnly`.
    pub fn from_name(name: &str) -> Self {
        match name.trim().to_ascii_lowercase().as_str() {
            "all" => RawMode::All,
            "schema" => RawMode::SchemaOnly,
            _ => RawMode::ValuesOnly,
        }
    }
}

impl Default for RawMode {
    fn default() -> Self {
        RawMode::ValuesOnly
    }
}

/// Accepts `on` and `true` (any case) as true; everything else is false.
pub fn parse_switch(token: &str) -> bool {
    matches!(token.trim().to_ascii_lowercase().as_str(), "on" | "true")
}

fn on_off(flag: bool) -> &'static str {
    if flag {
        "on"
    } else {
        "off"
    }
}

#[derive(Debug, Clone, PartialEq)]
pub struct Settings {
    pub raw_active: bool,
    pub raw_mode: RawMode,
    pub nested_field_prefix: Option<String>,
    /// Prompt template applied once at startup; empty means the default prompt
    pub prompt_template: String,
    pub history_capacity: usize,
}

impl Default for Settings {
    fn default() -> Self {
        Settings {
            raw_active: false,
            raw_mode: RawMode::default(),
            nested_field_prefix: None,
            prompt_template: String::new(),
            history_capacity: DEFAULT_HISTORY_CAPACITY,
        }
    }
}

impl Settings {
    /// Applies a `set` argument list: a setting path followed by optional values.
    ///
    /// Without values the current state is read back; nothing is mutated.
    /// Returns the lines to display.
    pub fn apply(&mut self, args: &[String]) -> Result<Vec<String>> {
        let Some((key, values)) = args.split_first() else {
            return Ok(self.describe());
        };

        match key.to_ascii_lowercase().as_str() {
            "raw" => self.apply_raw(values),
            "nestedfieldprefix" | "nesttables" => Ok(vec![self.apply_prefix(values)]),
            "history" | "historycapacity" => self.apply_history(values).map(|line| vec![line]),
            _ => Err(SessionError::BadSetting(format!("Unknown app setting: {}", key))),
        }
    }

    /// Every setting, one line each.
    pub fn describe(&self) -> Vec<String> {
        vec![
            self.raw_active_line(),
            self.raw_mode_line(),
            self.prefix_line(),
            self.history_line(),
        ]
    }

    fn apply_raw(&mut self, values: &[String]) -> Result<Vec<String>> {
        let Some((sub, rest)) = values.split_first() else {
            return Ok(vec![self.raw_active_line(), self.raw_mode_line()]);
        };

        match sub.to_ascii_lowercase().as_str() {
            "active" => match rest.first() {
                None => Ok(vec![self.raw_active_line()]),
                Some(value) => {
                    self.raw_active = parse_switch(value);
                    Ok(vec![format!("Raw active {}", on_off(self.raw_active))])
                }
            },
            "mode" => match rest.first() {
                None => Ok(vec![self.raw_mode_line()]),
                Some(value) => {
                    self.raw_mode = RawMode::from_name(value);
                    Ok(vec![format!("Raw mode {}", self.raw_mode.name())])
                }
            },
            _ => Err(SessionError::BadSetting(format!("Unknown raw setting: {}", sub))),
        }
    }

    fn apply_prefix(&mut self, values: &[String]) -> String {
        match values.first() {
            None => self.prefix_line(),
            Some(value) => {
                if value.eq_ignore_ascii_case(RESET_TOKEN) {
                    self.nested_field_prefix = None;
                } else {
                    self.nested_field_prefix = Some(value.clone());
                }
                format!(
                    "Nested field prefix {}",
                    self.nested_field_prefix.as_deref().unwrap_or("off")
                )
            }
        }
    }

    fn apply_history(&mut self, values: &[String]) -> Result<String> {
        let Some(value) = values.first() else {
            return Ok(self.history_line());
        };

        match value.trim().parse::<usize>() {
            Ok(capacity) if capacity >= 1 => {
                self.history_capacity = capacity;
                Ok(format!("History capacity {}", capacity))
            }
            _ => Err(SessionError::BadSetting(format!(
                "History capacity must be a whole number of at least 1, got: {}",
                value
            ))),
        }
    }

    fn raw_active_line(&self) -> String {
        format!("Raw active: {}", on_off(self.raw_active))
    }

    fn raw_mode_line(&self) -> String {
        format!("Raw mode: {}", self.raw_mode.name())
    }

    fn prefix_line(&self) -> String {
        format!(
            "Nested field prefix: {}",
            self.nested_field_prefix.as_deref().unwrap_or("off")
        )
    }

    fn history_line(&self) -> String {
        format!("History capacity: {}", self.history_capacity)
    }
}
