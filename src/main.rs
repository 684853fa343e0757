use clap::Parser;
use sqlcli::cli::CliArgs;
use sqlcli::config::{resolve_config, Config};
use sqlcli::repl::controller::report_error;
use sqlcli::repl::{BufferedSource, Controller, LineSource, ReedlineSource};
use sqlcli::session::Session;
use std::io::{self, IsTerminal};
use tracing::{info, warn};

fn main() {
    let args = CliArgs::parse();

    // Diagnostics go to stderr so they never mix with session output
    tracing_subscriber::fmt()
        .with_max_level(args.log_level())
        .with_writer(io::stderr)
        .init();

    info!("Starting sqlcli...");
    std::process::exit(run(&args));
}

fn run(args: &CliArgs) -> i32 {
    let mut stderr = io::stderr();

    let config = if args.no_config {
        Config::default()
    } else {
        resolve_config(args.config.as_deref()).unwrap_or_else(|err| {
            let _ = report_error(&mut stderr, &err);
            Config::default()
        })
    };
    let settings = config.settings().unwrap_or_else(|err| {
        let _ = report_error(&mut stderr, &err);
        Default::default()
    });

    let prompt_template = settings.prompt_template.clone();
    let mut session = Session::new(settings);
    session.params = config.connection_params();

    if args.wants_connection() {
        let connected = args
            .connect_params(&session.params)
            .and_then(|params| session.connect(params));
        if let Err(err) = connected {
            warn!("startup connection failed: {}", err);
            let _ = report_error(&mut stderr, &err);
        }
    }
    if !prompt_template.is_empty() {
        session.apply_prompt_template(&prompt_template);
    }

    let interactive = io::stdin().is_terminal();
    let mut source: Box<dyn LineSource> = if interactive {
        Box::new(ReedlineSource::new())
    } else {
        Box::new(BufferedSource::new(io::stdin().lock()))
    };

    let mut controller =
        Controller::new(session, io::stdout(), io::stderr()).with_styling(interactive);
    match controller.run(source.as_mut()) {
        Ok(code) => code,
        Err(err) => {
            let _ = report_error(&mut stderr, &err);
            err.code().unwrap_or(1)
        }
    }
}
