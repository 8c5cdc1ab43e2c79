//! `emulate <input-binary> [<output-file>]`
//!
//! Loads a flat little-endian instruction image at address 0, runs it
//! until HALT (or until PC walks past the image), and prints the final
//! processor-state dump to stdout or to the given output file.
//!
//! Set `RUST_LOG=emu=trace` to see every executed instruction on
//! stderr.

use std::fs;
use std::io;
use std::path::PathBuf;
use std::process::ExitCode;

use clap::Parser;
use emu::cpu::Armv8;
use emu::snapshot;
use tracing_subscriber::EnvFilter;

/// Emulate a 64-bit processor running a flat binary image
#[derive(Parser, Debug)]
#[command(author, version, about)]
struct Args {
    /// Path to the input binary image
    input: PathBuf,

    /// Redirect the final state dump to this file instead of stdout
    output: Option<PathBuf>,
}

fn main() -> ExitCode {
    tracing_subscriber::fmt()
        .with_env_filter(EnvFilter::from_default_env())
        .with_writer(io::stderr)
        .init();

    match run(&Args::parse()) {
        Ok(()) => ExitCode::SUCCESS,
        Err(error) => {
            eprintln!("emulate: {error}");
            ExitCode::FAILURE
        }
    }
}

fn run(args: &Args) -> Result<(), Box<dyn std::error::Error>> {
    let image = fs::read(&args.input)?;
    let mut cpu = Armv8::new(&image)?;
    cpu.run();

    match &args.output {
        Some(path) => snapshot::write_state(&cpu, &mut fs::File::create(path)?)?,
        None => snapshot::write_state(&cpu, &mut io::stdout().lock())?,
    }
    Ok(())
}
