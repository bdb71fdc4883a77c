//! Error kinds of the interpreter and the way they are shown to the user.
//!
//! Every failure carries enough detail to be useful in the logs, but the user
//! only ever sees [`ERROR_MESSAGE`] on the error stream.

use std::io::{self, Write};
use std::path::PathBuf;
use thiserror::Error;

/// The one message printed for any failure.
pub const ERROR_MESSAGE: &str = "An error has occurred\n";

/// A recoverable failure of a single sub-command.
#[derive(Debug, Error)]
pub enum ShellError {
    /// `cmd >` with nothing after the marker.
    #[error("redirection has no target")]
    MissingRedirectTarget,

    /// `cmd > a > b`.
    #[error("redirection target contains another `>`")]
    RepeatedRedirect,

    /// `cmd > a b`.
    #[error("redirection target has more than one word: {0:?}")]
    MultipleRedirectTargets(String),

    /// Nothing left to run once the redirection is stripped.
    #[error("empty command")]
    EmptyCommand,

    /// A builtin was invoked with the wrong operands.
    #[error("{name}: {message}")]
    BuiltinUsage { name: &'static str, message: String },

    #[error("cd: cannot change directory to {}", path.display())]
    ChangeDirectory {
        path: PathBuf,
        #[source]
        source: io::Error,
    },

    #[error("search path is empty")]
    EmptySearchPath,

    #[error("cannot open {} for writing", path.display())]
    Redirect {
        path: PathBuf,
        #[source]
        source: io::Error,
    },

    #[error("{0}: command not found")]
    CommandNotFound(String),

    #[error("failed to launch {name}")]
    Spawn {
        name: String,
        #[source]
        source: io::Error,
    },
}

/// Log `error` and print the generic message to `stderr`.
pub fn report(stderr: &mut dyn Write, error: &ShellError) {
    tracing::warn!(%error, "sub-command abandoned");
    report_message(stderr);
}

/// Print the generic message to `stderr`.
///
/// Failing to write the message is ignored; there is nowhere else to report it.
pub fn report_message(stderr: &mut dyn Write) {
    let _ = stderr.write_all(ERROR_MESSAGE.as_bytes());
    let _ = stderr.flush();
}
