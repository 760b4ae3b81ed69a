//! Command-line front-end: builds a `BSDIFF40` patch from two files.

mod exit_codes;

use std::cell::RefCell;
use std::path::PathBuf;
use std::rc::Rc;

use clap::Parser;

use bsdelta::stream::{FileStream, Stream};
use exit_codes::ExitCode;

/// Builds a binary patch describing how to transform one file into another.
#[derive(Parser)]
#[command(name = "bsdiff")]
#[command(author, version, about = "Build a BSDIFF40 patch", long_about = None)]
struct Cli {
    /// Original file
    oldfile: PathBuf,

    /// Target file
    newfile: PathBuf,

    /// Patch file to write
    patchfile: PathBuf,

    /// Raise the log level to debug (repeat for trace)
    #[arg(short = 'v', long, action = clap::ArgAction::Count)]
    verbose: u8,
}

fn main() {
    let cli = Cli::parse();

    env_logger::Builder::new()
        .filter_level(match cli.verbose {
            0 => log::LevelFilter::Warn,
            1 => log::LevelFilter::Debug,
            _ => log::LevelFilter::Trace,
        })
        .init();

    ctrlc::set_handler(move || {
        eprintln!("bsdiff: interrupted");
        std::process::exit(exit_codes::USER_INTERRUPT);
    })
    .ok();

    std::process::exit(run(&cli).code());
}

fn run(cli: &Cli) -> ExitCode {
    let old = match std::fs::read(&cli.oldfile) {
        Ok(bytes) => bytes,
        Err(e) => {
            eprintln!("bsdiff: reading {}: {e}", cli.oldfile.display());
            return ExitCode::FileError;
        }
    };
    let new = match std::fs::read(&cli.newfile) {
        Ok(bytes) => bytes,
        Err(e) => {
            eprintln!("bsdiff: reading {}: {e}", cli.newfile.display());
            return ExitCode::FileError;
        }
    };

    let patch_stream: Rc<RefCell<dyn Stream>> = match FileStream::open_write(&cli.patchfile) {
        Ok(f) => Rc::new(RefCell::new(f)),
        Err(e) => {
            eprintln!("bsdiff: opening {}: {e}", cli.patchfile.display());
            return ExitCode::from_error(&e);
        }
    };

    match bsdelta::diff(&old, &new, patch_stream) {
        Ok(()) => ExitCode::Success,
        Err(e) => {
            eprintln!("bsdiff: {e}");
            ExitCode::from_error(&e)
        }
    }
}
