/// Controller Module
///
/// The session state machine. Lines from a `LineSource` are accumulated into
/// the pending buffer until they form a complete command, which is then
/// dispatched; its outcome is written to the output or error stream and the
/// prompt is recomputed before the next line is read.
///
/// ```text
/// Idle --line--> Accumulating --complete--> Dispatching --> Idle
///   \                  |
///    \-- interrupt --> exit   interrupt: discard buffer, back to Idle
/// ```
use crate::core::{Result, SessionError};
use crate::repl::commands::MetaRegistry;
use crate::repl::dispatcher::{dispatch, Outcome};
use crate::repl::input::{accumulate, classify, Classified};
use crate::session::prompt::{default_prompt, DISCONNECTED_PROMPT};
use crate::session::Session;
use crossterm::cursor::MoveTo;
use crossterm::queue;
use crossterm::style::Stylize;
use crossterm::terminal::{Clear, ClearType};
use std::io::Write;
use tracing::{debug, info};

/// One event from the terminal.
#[derive(Debug, Clone, PartialEq)]
pub enum Input {
    Line(String),
    /// Ctrl-C
    Interrupt,
    /// End of input
    Eof,
}

/// A source of terminal events. Reading blocks until the next event.
pub trait LineSource {
    fn read_line(&mut self, prompt: &str) -> Result<Input>;
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum State {
    Idle,
    Accumulating,
    Dispatching,
}

const FAREWELL: &str = "Bye!";

pub struct Controller<O: Write, E: Write> {
    session: Session,
    registry: MetaRegistry,
    state: State,
    out: O,
    err: E,
    styled: bool,
}

impl<O: Write, E: Write> Controller<O, E> {
    pub fn new(session: Session, out: O, err: E) -> Self {
        Controller {
            session,
            registry: MetaRegistry::default(),
            state: State::Idle,
            out,
            err,
            styled: false,
        }
    }

    /// Enables ANSI styling of output lines and the prompt.
    pub fn with_styling(mut self, styled: bool) -> Self {
        self.styled = styled;
        self
    }

    pub fn session(&self) -> &Session {
        &self.session
    }

    pub fn session_mut(&mut self) -> &mut Session {
        &mut self.session
    }

    pub fn state(&self) -> State {
        self.state
    }

    pub fn output(&self) -> &O {
        &self.out
    }

    pub fn errors(&self) -> &E {
        &self.err
    }

    /// The prompt for the next read.
    ///
    /// With styling on, the default prompt shows the disconnected marker in
    /// red and the connected user in green.
    pub fn prompt(&self) -> String {
        let prompt = &self.session.prompt;
        if !self.styled || prompt.is_continuation() {
            return prompt.display();
        }

        let current = prompt.current();
        if !self.session.is_connected() {
            if current == DISCONNECTED_PROMPT {
                return format!("{}> ", DISCONNECTED_PROMPT.red().bold());
            }
        } else if current == default_prompt(Some(&self.session.params)) {
            if let Some((user, host)) = current.split_once('@') {
                return format!("{}@{}> ", user.green().bold(), host);
            }
        }
        prompt.display()
    }

    /// Reads and handles events until the session ends; returns the exit code.
    pub fn run(&mut self, source: &mut dyn LineSource) -> Result<i32> {
        info!("session started");
        loop {
            let input = source.read_line(&self.prompt())?;
            if let Some(code) = self.handle(input)? {
                info!("session ended with code {}", code);
                return Ok(code);
            }
        }
    }

    /// Handles one terminal event. Returns the exit code when the session ends.
    pub fn handle(&mut self, input: Input) -> Result<Option<i32>> {
        match input {
            Input::Line(line) => self.handle_line(&line),
            Input::Interrupt if !self.session.pending.is_empty() => {
                debug!("discarding pending input");
                self.session.pending.clear();
                self.session.prompt.restore();
                self.state = State::Idle;
                Ok(None)
            }
            Input::Interrupt | Input::Eof => self.finish(self.session.last_exit_code).map(Some),
        }
    }

    fn handle_line(&mut self, line: &str) -> Result<Option<i32>> {
        self.session.pending = accumulate(&self.session.pending, line);

        let command = match classify(&self.session.pending) {
            Classified::Complete(command) => command,
            Classified::Incomplete => {
                if self.session.pending.trim().is_empty() {
                    self.session.pending.clear();
                    self.state = State::Idle;
                } else {
                    self.session.prompt.enter_continuation();
                    self.state = State::Accumulating;
                }
                return Ok(None);
            }
        };

        self.session.pending.clear();
        self.session.prompt.restore();
        self.state = State::Dispatching;
        let previous_code = self.session.last_exit_code;
        let result = dispatch(&mut self.session, &self.registry, command);
        self.state = State::Idle;

        match result {
            Ok(outcome) => {
                self.session.last_exit_code = 0;
                if outcome == Outcome::Exit {
                    return self.finish(previous_code).map(Some);
                }
                self.write_outcome(outcome)?;
            }
            Err(err) => self.write_error(&err)?,
        }
        Ok(None)
    }

    fn write_outcome(&mut self, outcome: Outcome) -> Result<()> {
        match outcome {
            Outcome::Silent | Outcome::Exit => {}
            Outcome::Text(text) => writeln!(self.out, "{}", text)?,
            Outcome::Lines(lines) => {
                for line in lines {
                    let line = format!("  {}", line);
                    if self.styled {
                        writeln!(self.out, "{}", line.green().italic())?;
                    } else {
                        writeln!(self.out, "{}", line)?;
                    }
                }
            }
            Outcome::Raw(value) => {
                let text = serde_json::to_string_pretty(&value).map_err(|e| SessionError::Sql {
                    message: format!("Unable to serialize result: {}", e),
                    code: None,
                })?;
                writeln!(self.out, "{}", text)?;
            }
            Outcome::Notice(message) => {
                if self.styled {
                    writeln!(self.err, "{}", message.red().italic())?;
                } else {
                    writeln!(self.err, "{}", message)?;
                }
            }
            Outcome::Clear => {
                queue!(self.out, MoveTo(0, 0), Clear(ClearType::FromCursorDown))?;
            }
        }
        self.out.flush()?;
        Ok(())
    }

    fn write_error(&mut self, err: &SessionError) -> Result<()> {
        self.session.last_exit_code = err.code().unwrap_or(1);
        debug!("dispatch failed: {}", err.name());
        let report = err.report();
        if self.styled {
            writeln!(self.err, "{}", report.red())?;
        } else {
            writeln!(self.err, "{}", report)?;
        }
        self.err.flush()?;
        Ok(())
    }

    fn finish(&mut self, code: i32) -> Result<i32> {
        writeln!(self.out, "{}", FAREWELL)?;
        self.out.flush()?;
        Ok(code)
    }
}

/// Prints a startup error the way dispatch errors are printed.
pub fn report_error<E: Write>(err_stream: &mut E, err: &SessionError) -> std::io::Result<()> {
    writeln!(err_stream, "{}", err.report())
}
