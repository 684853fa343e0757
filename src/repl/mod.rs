/// REPL Module
///
/// Line accumulation, command classification, dispatch and the session
/// state machine that ties them to a terminal.
pub mod commands;
pub mod controller;
pub mod dispatcher;
pub mod input;
pub mod line_source;

pub use commands::{MetaOutput, MetaRegistry};
pub use controller::{Controller, Input, LineSource, State};
pub use dispatcher::{dispatch, Outcome};
pub use input::{accumulate, classify, Classified, Command};
pub use line_source::{BufferedSource, ReedlineSource};
