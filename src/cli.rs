//! Command-line interface for play-ledger.
//!
//! Uses lexopt for minimal binary size overhead.

use std::ffi::OsString;
use std::net::IpAddr;
use std::path::PathBuf;

/// Command-line arguments.
#[derive(Debug, Clone)]
pub struct Args {
    /// Host address to bind to.
    pub host: Option<IpAddr>,
    /// Port to listen on.
    pub port: Option<u16>,
    /// Path to configuration file.
    pub config: Option<PathBuf>,
    /// Record store URL (overrides config file).
    pub store_url: Option<String>,
    /// Record store access key (overrides config file).
    pub store_key: Option<String>,
    /// Owner tag for new sessions.
    pub user_id: Option<String>,
    /// Directory for device-local state.
    pub data_dir: Option<PathBuf>,
    /// Log level (error, warn, info, debug, trace).
    pub log_level: Option<String>,
    /// Show version and exit.
    pub version: bool,
    /// Show help and exit.
    pub help: bool,
}

impl Default for Args {
    fn default() -> Self {
        Self {
            host: None,
            port: None,
            config: None,
            store_url: None,
            store_key: None,
            user_id: None,
            data_dir: None,
            log_level: None,
            version: false,
            help: false,
        }
    }
}

/// Parse command-line arguments.
pub fn parse_args() -> Result<Args, ArgsError> {
    parse_args_from(std::env::args_os())
}

/// Parse arguments from an iterator (for testing).
pub fn parse_args_from<I>(args: I) -> Result<Args, ArgsError>
where
    I: IntoIterator<Item = OsString>,
{
    use lexopt::prelude::*;

    let mut result = Args::default();
    let mut parser = lexopt::Parser::from_iter(args);

    while let Some(arg) = parser.next()? {
        match arg {
            Short('h') | Long("help") => {
                result.help = true;
            }
            Short('V') | Long("version") => {
                result.version = true;
            }
            Short('H') | Long("host") => {
                let value: String = parser.value()?.parse()?;
                result.host = Some(
                    value
                        .parse()
                        .map_err(|_| ArgsError::InvalidValue("host", value))?,
                );
            }
            Short('p') | Long("port") => {
                let value: String = parser.value()?.parse()?;
                result.port = Some(
                    value
                        .parse()
                        .map_err(|_| ArgsError::InvalidValue("port", value))?,
                );
            }
            Short('c') | Long("config") => {
                result.config = Some(parser.value()?.parse()?);
            }
            Short('u') | Long("store-url") => {
                result.store_url = Some(parser.value()?.parse()?);
            }
            Short('k') | Long("store-key") => {
                result.store_key = Some(parser.value()?.parse()?);
            }
            Long("user-id") => {
                result.user_id = Some(parser.value()?.parse()?);
            }
            Short('d') | Long("data-dir") => {
                result.data_dir = Some(parser.value()?.parse()?);
            }
            Short('l') | Long("log-level") => {
                result.log_level = Some(parser.value()?.parse()?);
            }
            Value(val) => {
                return Err(ArgsError::UnexpectedArgument(val.to_string_lossy().into()));
            }
            _ => return Err(arg.unexpected().into()),
        }
    }

    Ok(result)
}

/// Print help message.
pub fn print_help() {
    let version = env!("CARGO_PKG_VERSION");
    println!(
        r#"play-ledger {version}
Zero-effort play session recorder with running balance totals

USAGE:
    play-ledger [OPTIONS]

OPTIONS:
    -H, --host <ADDR>       Host address to bind [default: 127.0.0.1]
    -p, --port <PORT>       Port to listen on [default: 3000]
    -c, --config <FILE>     Path to configuration file (JSON)
    -u, --store-url <URL>   Record store service URL
    -k, --store-key <KEY>   Record store access key
        --user-id <ID>      Owner tag written on new sessions
    -d, --data-dir <DIR>    Directory for device-local state [default: .play-ledger]
    -l, --log-level <LVL>   Log level (error, warn, info, debug, trace)
    -h, --help              Print help
    -V, --version           Print version

ENVIRONMENT VARIABLES:
    PLAY_LEDGER_STORE_URL   Record store URL (overrides config)
    PLAY_LEDGER_STORE_KEY   Record store access key (overrides config)
    PLAY_LEDGER_USER_ID     Owner tag (overrides config)
    PLAY_LEDGER_DATA_DIR    Device state directory (overrides config)
    PLAY_LEDGER_HOST        Host address (overrides config)
    PLAY_LEDGER_PORT        Port number (overrides config)
    PLAY_LEDGER_LOG_LEVEL   Log level (overrides config)
    RUST_LOG                Alternative log level setting

EXAMPLES:
    # Start against a hosted record store
    play-ledger -u https://xyz.supabase.co -k $ANON_KEY

    # Start with config file
    play-ledger -c /etc/play-ledger/config.json
"#
    );
}

/// Print version.
pub fn print_version() {
    println!("play-ledger {}", env!("CARGO_PKG_VERSION"));
}

/// Argument parsing errors.
#[derive(Debug)]
pub enum ArgsError {
    /// Lexopt parsing error.
    Lexopt(lexopt::Error),
    /// Invalid argument value.
    InvalidValue(&'static str, String),
    /// Unexpected positional argument.
    UnexpectedArgument(String),
}

impl std::fmt::Display for ArgsError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::Lexopt(e) => write!(f, "{}", e),
            Self::InvalidValue(name, value) => {
                write!(f, "invalid value for --{}: '{}'", name, value)
            }
            Self::UnexpectedArgument(arg) => {
                write!(f, "unexpected argument: '{}'", arg)
            }
        }
    }
}

impl std::error::Error for ArgsError {}

impl From<lexopt::Error> for ArgsError {
    fn from(e: lexopt::Error) -> Self {
        Self::Lexopt(e)
    }
}
