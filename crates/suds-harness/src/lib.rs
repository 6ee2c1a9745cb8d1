#![forbid(unsafe_code)]

//! Front end for the SUDS tokenizer.
//!
//! `suds-lex` reads a script from a file or stdin and prints its token
//! stream as a table, as JSON Lines, or as the colored source.
//!
//! # Running
//!
//! ```sh
//! cargo run -p suds-harness -- --format=ansi scene.sud
//! SUDS_LEX_LOG=suds_syntax=trace cargo run -p suds-harness -- --stats < scene.sud
//! ```

pub mod cli;
pub mod error;
pub mod output;

use std::fs;
use std::io::{self, Read, Write};

use suds_syntax::{LexStats, tokenize};

pub use cli::{Command, Format, Input, Opts};
pub use error::HarnessError;
pub use output::{Palette, render, write_stats};

/// Read the whole script named by `input`.
pub fn read_input(input: &Input) -> Result<String, HarnessError> {
    match input {
        Input::Stdin => {
            let mut buf = String::new();
            io::stdin().lock().read_to_string(&mut buf)?;
            Ok(buf)
        }
        Input::Path(path) => Ok(fs::read_to_string(path)?),
    }
}

/// Tokenize `source` and write it to `out` as `opts` asks.
pub fn run<W: Write>(out: &mut W, source: &str, opts: &Opts) -> Result<LexStats, HarnessError> {
    let palette = match opts.format {
        Format::Ansi => Palette::dark(),
        Format::Table | Format::Json => Palette::plain(),
    };
    let stats = render(out, source, tokenize(source), opts.format, &palette)?;
    if stats.recoveries > 0 {
        tracing::warn!(recoveries = stats.recoveries, "some characters matched no rule");
    }
    Ok(stats)
}
