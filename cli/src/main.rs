//! `quadc` - semantic analyzer and quad-IR emitter.
//!
//! Takes a single source file, runs it through the lexer, parser, and
//! semantic core, and writes `<base>.sym`/`<base>.quad` next to it.
//! Exit code 0 on success, 1 on any semantic error (§6).

mod error;
mod pipeline;

use std::path::PathBuf;
use std::process::ExitCode;

use clap::Parser as ClapParser;
use tracing_subscriber::{fmt, prelude::*, EnvFilter};

#[derive(ClapParser, Debug)]
#[command(name = "quadc")]
#[command(author = "Quadc Contributors")]
#[command(version = env!("CARGO_PKG_VERSION"))]
#[command(about = "Semantic analyzer and quad-IR emitter for the quadc language")]
struct Cli {
    /// Source file to compile
    input: PathBuf,

    /// Enable verbose (debug-level) logging
    #[arg(short, long)]
    verbose: bool,
}

fn init_logging(verbose: bool) {
    let filter = if verbose { EnvFilter::new("debug") } else { EnvFilter::new("warn") };
    let _ = tracing_subscriber::registry().with(filter).with(fmt::layer().with_target(false)).try_init();
}

fn main() -> ExitCode {
    let cli = Cli::parse();
    init_logging(cli.verbose);

    match pipeline::compile_file(&cli.input) {
        Ok(true) => ExitCode::SUCCESS,
        Ok(false) => ExitCode::FAILURE,
        Err(e) => {
            eprintln!("error: {e}");
            ExitCode::FAILURE
        }
    }
}
