//! Command-line front-end: applies a `BSDIFF40` patch to a file.

mod exit_codes;

use std::cell::RefCell;
use std::path::PathBuf;
use std::rc::Rc;

use clap::Parser;

use bsdelta::stream::{FileStream, Stream};
use exit_codes::ExitCode;

/// Reconstructs a file from an old file and a binary patch.
#[derive(Parser)]
#[command(name = "bspatch")]
#[command(author, version, about = "Apply a BSDIFF40 patch", long_about = None)]
struct Cli {
    /// Original file
    oldfile: PathBuf,

    /// File to write
    newfile: PathBuf,

    /// Patch file to apply
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
        eprintln!("bspatch: interrupted");
        std::process::exit(exit_codes::USER_INTERRUPT);
    })
    .ok();

    std::process::exit(run(&cli).code());
}

fn run(cli: &Cli) -> ExitCode {
    let old = match std::fs::read(&cli.oldfile) {
        Ok(bytes) => bytes,
        Err(e) => {
            eprintln!("bspatch: reading {}: {e}", cli.oldfile.display());
            return ExitCode::FileError;
        }
    };

    let patch_stream: Rc<RefCell<dyn Stream>> = match FileStream::open_read(&cli.patchfile) {
        Ok(f) => Rc::new(RefCell::new(f)),
        Err(e) => {
            eprintln!("bspatch: opening {}: {e}", cli.patchfile.display());
            return ExitCode::from_error(&e);
        }
    };

    let new = match bsdelta::apply(&old, patch_stream) {
        Ok(bytes) => bytes,
        Err(e) => {
            eprintln!("bspatch: {e}");
            return ExitCode::from_error(&e);
        }
    };

    if let Err(e) = std::fs::write(&cli.newfile, &new) {
        eprintln!("bspatch: writing {}: {e}", cli.newfile.display());
        return ExitCode::FileError;
    }

    ExitCode::Success
}
