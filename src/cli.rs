/// Command-line arguments for sqlcli
///
/// Startup connection parameters come either as a single connection URI or
/// as discrete flags, never both. Flags override the `[connection]` section
/// of the configuration file.
use crate::core::db::driver::ConnectParams;
use crate::core::Result;
use clap::{ArgAction, Parser};
use std::path::PathBuf;
use tracing::Level;

#[derive(Parser, Debug)]
#[clap(
    name = "sqlcli",
    version,
    about = "An interactive SQL session that starts disconnected"
)]
pub struct CliArgs {
    /// Connection URI, e.g. sqlite:///path/to/app.db
    #[clap(
        conflicts_with_all = ["username", "password", "host", "port", "database", "driver"],
        help = "URI to a database to connect to"
    )]
    pub uri: Option<String>,

    #[clap(short, long, help = "User to connect as")]
    pub username: Option<String>,

    #[clap(short, long, help = "Password for the user")]
    pub password: Option<String>,

    #[clap(short = 'H', long, help = "Host to connect to")]
    pub host: Option<String>,

    #[clap(long, help = "Port to connect to")]
    pub port: Option<u16>,

    #[clap(long, visible_alias = "db", help = "Database to use")]
    pub database: Option<String>,

    #[clap(short, long, help = "Driver to connect with (default: sqlite)")]
    pub driver: Option<String>,

    #[clap(long, help = "Configuration file to load")]
    pub config: Option<PathBuf>,

    #[clap(long, conflicts_with = "config", help = "Do not load any configuration file")]
    pub no_config: bool,

    /// Diagnostic verbosity: -v info, -vv debug, -vvv trace
    #[clap(short, long, action = ArgAction::Count, help = "Increase log verbosity")]
    pub verbose: u8,
}

impl CliArgs {
    /// Connection parameters given on the command line, layered over `base`.
    ///
    /// A URI replaces `base` entirely; discrete flags override single fields.
    pub fn connect_params(&self, base: &ConnectParams) -> Result<ConnectParams> {
        if let Some(uri) = &self.uri {
            return ConnectParams::from_uri(uri);
        }
        let flags = ConnectParams {
            driver: self.driver.clone(),
            host: self.host.clone(),
            port: self.port,
            user: self.username.clone(),
            password: self.password.clone(),
            database: self.database.clone(),
        };
        Ok(base.merged_with(&flags))
    }

    /// Whether a connection should be attempted at startup.
    pub fn wants_connection(&self) -> bool {
        self.uri.is_some() || self.host.is_some() || self.database.is_some()
    }

    pub fn log_level(&self) -> Level {
        match self.verbose {
            0 => Level::WARN,
            1 => Level::INFO,
            2 => Level::DEBUG,
            _ => Level::TRACE,
        }
    }
}
