#![forbid(unsafe_code)]

//! Command-line argument parsing for `suds-lex`.
//!
//! Parses args by hand. Environment variables with the `SUDS_LEX_*` prefix
//! override the defaults; explicit flags override both.

use std::env;
use std::path::PathBuf;
use std::process;
use std::str::FromStr;

use crate::error::HarnessError;

pub const VERSION: &str = env!("CARGO_PKG_VERSION");

pub const HELP_TEXT: &str = "\
suds-lex: print the token stream of a SUDS dialogue script

USAGE:
    suds-lex [OPTIONS] [PATH]

ARGS:
    PATH                 Script to tokenize; '-' or omitted reads stdin

OPTIONS:
    --format=FORMAT      Output format: 'table' (default), 'json' or 'ansi'
    --stats              Print scan counters to stderr when done
    --help, -h           Show this help message
    --version, -V        Show version

FORMATS:
    table   One token per line: byte range, category, quoted text
    json    One JSON object per token (JSON Lines)
    ansi    The script itself, colored by category

ENVIRONMENT VARIABLES:
    SUDS_LEX_FORMAT      Override the default --format
    SUDS_LEX_STATS       Print stats when set to 1/true/yes
    SUDS_LEX_LOG         Log filter directives (default: warn)";

/// How tokens are written.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub enum Format {
    #[default]
    Table,
    Json,
    Ansi,
}

impl FromStr for Format {
    type Err = HarnessError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_ascii_lowercase().as_str() {
            "table" => Ok(Self::Table),
            "json" | "jsonl" => Ok(Self::Json),
            "ansi" | "color" => Ok(Self::Ansi),
            other => Err(HarnessError::Args(format!("Invalid --format value: {other}"))),
        }
    }
}

/// Where the script comes from.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub enum Input {
    #[default]
    Stdin,
    Path(PathBuf),
}

/// Parsed command-line options.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Opts {
    pub format: Format,
    /// Print [`suds_syntax::LexStats`] after the token stream.
    pub stats: bool,
    pub input: Input,
    /// `tracing-subscriber` filter directives.
    pub log_filter: String,
}

impl Default for Opts {
    fn default() -> Self {
        Self {
            format: Format::Table,
            stats: false,
            input: Input::Stdin,
            log_filter: "warn".into(),
        }
    }
}

/// Outcome of argument parsing.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Command {
    Run(Opts),
    Help,
    Version,
}

fn parse_flag(val: &str) -> Option<bool> {
    match val.trim().to_ascii_lowercase().as_str() {
        "1" | "true" | "yes" | "on" => Some(true),
        "0" | "false" | "no" | "off" | "" => Some(false),
        _ => None,
    }
}

impl Opts {
    /// Parse the process arguments and environment.
    ///
    /// Prints help or version and exits when asked; prints the error and
    /// exits with status 1 on a bad argument.
    pub fn parse() -> Self {
        let args = env::args().skip(1);
        match Self::from_sources(args, |key| env::var(key).ok()) {
            Ok(Command::Run(opts)) => opts,
            Ok(Command::Help) => {
                println!("{HELP_TEXT}");
                process::exit(0);
            }
            Ok(Command::Version) => {
                println!("suds-lex {VERSION}");
                process::exit(0);
            }
            Err(err) => {
                eprintln!("{err}");
                eprintln!("Run with --help for usage information.");
                process::exit(1);
            }
        }
    }

    /// Parse `args` (without the program name) with `env` as the variable
    /// lookup.
    ///
    /// Unparsable environment values are ignored; unparsable flags are
    /// errors.
    pub fn from_sources<I, F>(args: I, env: F) -> Result<Command, HarnessError>
    where
        I: IntoIterator<Item = String>,
        F: Fn(&str) -> Option<String>,
    {
        let mut opts = Self::default();

        // Apply environment variable defaults first
        if let Some(val) = env("SUDS_LEX_FORMAT")
            && let Ok(format) = val.parse()
        {
            opts.format = format;
        }
        if let Some(val) = env("SUDS_LEX_STATS")
            && let Some(flag) = parse_flag(&val)
        {
            opts.stats = flag;
        }
        if let Some(val) = env("SUDS_LEX_LOG")
            && !val.trim().is_empty()
        {
            opts.log_filter = val;
        }

        // Command-line args override env vars
        let mut path: Option<String> = None;
        for arg in args {
            match arg.as_str() {
                "--help" | "-h" => return Ok(Command::Help),
                "--version" | "-V" => return Ok(Command::Version),
                "--stats" => opts.stats = true,
                "-" => path = Some(arg.clone()),
                other => {
                    if let Some(val) = other.strip_prefix("--format=") {
                        opts.format = val.parse()?;
                    } else if other.starts_with('-') {
                        return Err(HarnessError::Args(format!("Unknown argument: {other}")));
                    } else if let Some(first) = &path {
                        return Err(HarnessError::Args(format!(
                            "Only one input path is accepted (got {first} and {other})"
                        )));
                    } else {
                        path = Some(other.to_string());
                    }
                }
            }
        }

        opts.input = match path.as_deref() {
            None | Some("-") => Input::Stdin,
            Some(p) => Input::Path(PathBuf::from(p)),
        };
        Ok(Command::Run(opts))
    }
}
