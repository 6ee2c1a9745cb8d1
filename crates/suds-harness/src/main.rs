#![forbid(unsafe_code)]

use std::io::{self, BufWriter};
use std::process::ExitCode;

use suds_harness::{HarnessError, Opts, read_input, run, write_stats};
use tracing_subscriber::EnvFilter;

fn init_logging(filter: &str) {
    let filter = EnvFilter::try_new(filter).unwrap_or_else(|_| EnvFilter::new("warn"));
    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(io::stderr)
        .with_target(true)
        .init();
}

fn lex(opts: &Opts) -> Result<(), HarnessError> {
    let source = read_input(&opts.input)?;
    tracing::debug!(bytes = source.len(), input = ?opts.input, "script loaded");

    let stdout = io::stdout();
    let mut out = BufWriter::new(stdout.lock());
    let stats = run(&mut out, &source, opts)?;
    drop(out);

    if opts.stats {
        write_stats(&mut io::stderr().lock(), &stats, opts.format)?;
    }
    Ok(())
}

fn main() -> ExitCode {
    let opts = Opts::parse();
    init_logging(&opts.log_filter);
    match lex(&opts) {
        Ok(()) => ExitCode::SUCCESS,
        Err(err) => {
            eprintln!("suds-lex: {err}");
            ExitCode::FAILURE
        }
    }
}
