#![forbid(unsafe_code)]

//! Errors surfaced by the `suds-lex` front end.

use std::fmt;
use std::io;

/// Anything that stops a `suds-lex` run.
#[derive(Debug)]
pub enum HarnessError {
    /// Reading the script or writing output failed.
    Io(io::Error),
    /// A command-line argument was malformed or unknown.
    Args(String),
    /// JSON encoding of a token record failed.
    Json(serde_json::Error),
}

impl fmt::Display for HarnessError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Io(e) => write!(f, "I/O error: {e}"),
            Self::Args(msg) => write!(f, "{msg}"),
            Self::Json(e) => write!(f, "JSON encoding failed: {e}"),
        }
    }
}

impl std::error::Error for HarnessError {
    fn source(&self) -> Option<&(dyn std::error::Error + 'static)> {
        match self {
            Self::Io(e) => Some(e),
            Self::Json(e) => Some(e),
            Self::Args(_) => None,
        }
    }
}

impl From<io::Error> for HarnessError {
    fn from(err: io::Error) -> Self {
        Self::Io(err)
    }
}

impl From<serde_json::Error> for HarnessError {
    fn from(err: serde_json::Error) -> Self {
        Self::Json(err)
    }
}
