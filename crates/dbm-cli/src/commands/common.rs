//! Shared utilities for CLI commands

use dbm_core::CoreError;
use dbm_migrate::{ErrorKind, MigrateError};
use std::fmt;

/// Error type representing a non-zero process exit code.
///
/// Use `return Err(ExitCode(N).into())` instead of `std::process::exit(N)`
/// so that RAII destructors run and cleanup happens properly.
#[derive(Debug)]
pub(crate) struct ExitCode(pub(crate) i32);

impl fmt::Display for ExitCode {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        // Intentionally empty: the message was already printed where the
        // failure was reported.
        write!(f, "")
    }
}

impl std::error::Error for ExitCode {}

/// Process exit status for an error category.
pub(crate) fn exit_code_for(kind: ErrorKind) -> i32 {
    match kind {
        ErrorKind::Database => 1,
        ErrorKind::Configuration => 2,
        ErrorKind::SafetyGateDeclined => 3,
    }
}

/// Print `err` to stderr and convert it into the matching [`ExitCode`].
///
/// Database failures also show the driver's error code when it has one.
pub(crate) fn failure(err: MigrateError) -> anyhow::Error {
    match err.kind() {
        ErrorKind::SafetyGateDeclined => eprintln!("{err}"),
        _ => eprintln!("Error: {err}"),
    }
    if let Some(code) = err.db_error().and_then(|e| e.code()) {
        eprintln!("  driver error code: {code}");
    }
    ExitCode(exit_code_for(err.kind())).into()
}

/// [`failure`] for profile and filesystem errors raised outside the engine.
pub(crate) fn config_failure(err: CoreError) -> anyhow::Error {
    failure(MigrateError::Config(err))
}

#[cfg(test)]
#[path = "common_test.rs"]
mod tests;
