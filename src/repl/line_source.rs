/// Line Source Module
///
/// Terminal adapters feeding the controller. `ReedlineSource` drives an
/// interactive line editor; `BufferedSource` reads any `BufRead`, which is
/// what piped input and tests use.
use crate::core::Result;
use crate::repl::controller::{Input, LineSource};
use reedline::{
    Prompt, PromptEditMode, PromptHistorySearch, PromptHistorySearchStatus, Reedline, Signal,
};
use std::borrow::Cow;
use std::io::BufRead;

/// Prompt text handed to reedline for one read.
struct SessionPrompt {
    text: String,
}

impl Prompt for SessionPrompt {
    fn render_prompt_left(&self) -> Cow<str> {
        Cow::Borrowed(&self.text)
    }

    fn render_prompt_right(&self) -> Cow<str> {
        Cow::Borrowed("")
    }

    fn render_prompt_indicator(&self, _edit_mode: PromptEditMode) -> Cow<str> {
        Cow::Borrowed("")
    }

    fn render_prompt_multiline_indicator(&self) -> Cow<str> {
        Cow::Borrowed("... ")
    }

    fn render_prompt_history_search_indicator(
        &self,
        history_search: PromptHistorySearch,
    ) -> Cow<str> {
        let prefix = match history_search.status {
            PromptHistorySearchStatus::Passing => "",
            PromptHistorySearchStatus::Failing => "failing ",
        };
        Cow::Owned(format!(
            "({}reverse-search: {}) ",
            prefix, history_search.term
        ))
    }
}

pub struct ReedlineSource {
    editor: Reedline,
}

impl ReedlineSource {
    pub fn new() -> Self {
        ReedlineSource {
            editor: Reedline::create(),
        }
    }
}

impl Default for ReedlineSource {
    fn default() -> Self {
        Self::new()
    }
}

impl LineSource for ReedlineSource {
    fn read_line(&mut self, prompt: &str) -> Result<Input> {
        let prompt = SessionPrompt {
            text: prompt.to_string(),
        };
        Ok(match self.editor.read_line(&prompt)? {
            Signal::Success(line) => Input::Line(line),
            Signal::CtrlC => Input::Interrupt,
            Signal::CtrlD => Input::Eof,
            #[allow(unreachable_patterns)]
            _ => Input::Interrupt,
        })
    }
}

/// Reads lines from a buffered reader without echoing a prompt.
pub struct BufferedSource<R> {
    reader: R,
}

impl<R: BufRead> BufferedSource<R> {
    pub fn new(reader: R) -> Self {
        BufferedSource { reader }
    }
}

impl<R: BufRead> LineSource for BufferedSource<R> {
    fn read_line(&mut self, _prompt: &str) -> Result<Input> {
        let mut line = String::new();
        if self.reader.read_line(&mut line)? == 0 {
            return Ok(Input::Eof);
        }
        Ok(Input::Line(line.trim_end_matches(['\r', '\n']).to_string()))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::io::Cursor;

    #[test]
    fn test_buffered_source_yields_lines_then_eof() {
        let mut source = BufferedSource::new(Cursor::new("select 1;\r\n/exit\n"));
        assert_eq!(source.read_line("> ").unwrap(), Input::Line("select 1;".into()));
        assert_eq!(source.read_line("> ").unwrap(), Input::Line("/exit".into()));
        assert_eq!(source.read_line("> ").unwrap(), Input::Eof);
    }

    #[test]
    fn test_prompt_renders_given_text() {
        let prompt = SessionPrompt {
            text: "disconnected> ".into(),
        };
        assert_eq!(prompt.render_prompt_left().as_ref(), "disconnected> ");
        assert_eq!(prompt.render_prompt_multiline_indicator().as_ref(), "... ");
    }
}
