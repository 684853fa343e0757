/// Prompt Manager
///
/// Computes the prompt shown to the user: the default `disconnected` or
/// `user@host` form, a user template with `$`-tokens substituted from the
/// connection parameters, or the fixed continuation marker while a command is
/// still being typed.
use crate::core::db::driver::ConnectParams;
use once_cell::sync::Lazy;
use regex::{Captures, Regex};

pub const DISCONNECTED_PROMPT: &str = "disconnected";
pub const CONTINUATION_PROMPT: &str = "... ";
pub const RESET_TOKEN: &str = "$reset";

const ANONYMOUS_USER: &str = "anonymous";
const DEFAULT_HOST: &str = "localhost";

static TEMPLATE_TOKEN: Lazy<Regex> = Lazy::new(|| {
    Regex::new(r"(?i)\$(host|port|user|password|database|driver)").expect("valid token pattern")
});

/// The default prompt for the given connection state.
pub fn default_prompt(connection: Option<&ConnectParams>) -> String {
    match connection {
        None => DISCONNECTED_PROMPT.to_string(),
        Some(params) => format!(
            "{}@{}",
            params.user.as_deref().unwrap_or(ANONYMOUS_USER),
            params.host.as_deref().unwrap_or(DEFAULT_HOST)
        ),
    }
}

/// Substitutes `$host`, `$port`, `$user`, `$password`, `$database` and
/// `$driver` (any case); unset parameters become empty.
pub fn render_template(template: &str, params: &ConnectParams) -> String {
    TEMPLATE_TOKEN
        .replace_all(template, |caps: &Captures| {
            params.field(&caps[1]).unwrap_or_default()
        })
        .into_owned()
}

#[derive(Debug, Clone, PartialEq)]
pub struct PromptManager {
    current: String,
    continuation: bool,
}

impl Default for PromptManager {
    fn default() -> Self {
        PromptManager {
            current: DISCONNECTED_PROMPT.to_string(),
            continuation: false,
        }
    }
}

impl PromptManager {
    pub fn new() -> Self {
        Self::default()
    }

    /// The stored prompt, without the continuation override.
    pub fn current(&self) -> &str {
        &self.current
    }

    /// Restores the default prompt for the given connection state.
    pub fn reset(&mut self, connection: Option<&ConnectParams>) {
        self.current = default_prompt(connection);
    }

    /// Substitutes the template once and stores the result.
    pub fn apply_template(&mut self, template: &str, params: &ConnectParams) {
        self.current = render_template(template, params);
    }

    pub fn enter_continuation(&mut self) {
        self.continuation = true;
    }

    /// Leaves continuation state; the stored prompt is shown again.
    pub fn restore(&mut self) {
        self.continuation = false;
    }

    pub fn is_continuation(&self) -> bool {
        self.continuation
    }

    /// The text handed to the line reader.
    pub fn display(&self) -> String {
        if self.continuation {
            CONTINUATION_PROMPT.to_string()
        } else {
            format!("{}> ", self.current)
        }
    }
}
