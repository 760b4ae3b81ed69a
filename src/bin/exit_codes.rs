//! Exit codes shared by the `bsdiff`/`bspatch` binaries.
//!
//! Numeric values below 128 mirror `bsdelta::Error::code()`; the rest are
//! CLI-only concerns the library error type doesn't carry an opinion on.

use bsdelta::Error;

/// Ctrl+C (128 + SIGINT)
pub const USER_INTERRUPT: i32 = 130;

/// Exit code for the `bsdiff`/`bspatch` binaries.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ExitCode {
    Success,
    Generic,
    InvalidArg,
    OutOfMemory,
    FileError,
    EndOfFile,
    CorruptPatch,
    SizeTooLarge,
}

impl ExitCode {
    pub fn code(self) -> i32 {
        match self {
            ExitCode::Success => 0,
            ExitCode::Generic => 1,
            ExitCode::InvalidArg => 2,
            ExitCode::OutOfMemory => 3,
            ExitCode::FileError => 4,
            ExitCode::EndOfFile => 5,
            ExitCode::CorruptPatch => 6,
            ExitCode::SizeTooLarge => 7,
        }
    }

    pub fn from_error(error: &Error) -> ExitCode {
        match error {
            Error::Generic(_) => ExitCode::Generic,
            Error::Io(_) => ExitCode::FileError,
            Error::InvalidArg(_) => ExitCode::InvalidArg,
            Error::OutOfMemory(_) => ExitCode::OutOfMemory,
            Error::FileError(_) => ExitCode::FileError,
            Error::EndOfFile => ExitCode::EndOfFile,
            Error::CorruptPatch(_) => ExitCode::CorruptPatch,
            Error::SizeTooLarge(_) => ExitCode::SizeTooLarge,
            _ => ExitCode::Generic,
        }
    }
}
