//! `assemble <input-source> <output-binary>`
//!
//! Two-pass assembler: translates a source file in the supported
//! mnemonic syntax into a flat stream of little-endian 32-bit
//! instruction words. A malformed line stops the run with a non-zero
//! exit status and the offending line number on stderr.

use std::fs;
use std::io;
use std::path::PathBuf;
use std::process::ExitCode;

use clap::Parser;
use tracing_subscriber::EnvFilter;

/// Assemble a source file into a flat binary image
#[derive(Parser, Debug)]
#[command(author, version, about)]
struct Args {
    /// Path to the input assembly source
    input: PathBuf,

    /// Path of the binary image to write
    output: PathBuf,
}

fn main() -> ExitCode {
    tracing_subscriber::fmt()
        .with_env_filter(EnvFilter::from_default_env())
        .with_writer(io::stderr)
        .init();

    match run(&Args::parse()) {
        Ok(()) => ExitCode::SUCCESS,
        Err(error) => {
            eprintln!("assemble: {error}");
            ExitCode::FAILURE
        }
    }
}

fn run(args: &Args) -> Result<(), Box<dyn std::error::Error>> {
    let source = fs::read_to_string(&args.input)?;
    let image = asm::assemble(&source)?;
    fs::write(&args.output, image)?;
    Ok(())
}
