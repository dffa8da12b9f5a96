//! Process termination for unrecoverable bridge misuse.
//!
//! The non-`try_` entry points of [`Interpreter`](super::Interpreter) treat
//! host-side misuse as fatal: the diagnostic is reported and the process
//! exits with status [`FATAL_EXIT_CODE`].

use std::fmt::Display;

/// Exit status used for fatal bridge errors.
pub const FATAL_EXIT_CODE: i32 = 1;

/// Report `reason` and terminate the process.
///
/// Goes through `tracing` when a subscriber is installed, otherwise straight
/// to stderr so the diagnostic is never lost.
pub fn abort(reason: impl Display) -> ! {
    if tracing::dispatcher::has_been_set() {
        tracing::error!("{reason}");
    } else {
        eprintln!("fatal: {reason}");
    }
    std::process::exit(FATAL_EXIT_CODE)
}
