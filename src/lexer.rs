//! A module splitting raw input lines into sub-commands, redirections and words.
//!
//! There is no quoting or escaping: words are separated by runs of whitespace
//! and the two marker characters are always special.

use crate::error::ShellError;

/// Separates sub-commands that run at the same time, `&`.
pub const CONCURRENCY_MARKER: char = '&';

/// Introduces an output redirection, `>`.
pub const REDIRECT_MARKER: char = '>';

/// Strip the surrounding whitespace (including the line terminator) of an input line.
pub fn trim_line(line: &str) -> &str {
    line.trim()
}

/// Split a line on [`CONCURRENCY_MARKER`].
///
/// Each piece is trimmed, and pieces left empty are dropped, so leading,
/// trailing and doubled markers are harmless. Order is preserved.
pub fn split_concurrent(line: &str) -> Vec<&str> {
    line.split(CONCURRENCY_MARKER)
        .map(str::trim)
        .filter(|piece| !piece.is_empty())
        .collect()
}

/// Separate a sub-command into its command part and optional redirection target.
///
/// Only the first [`REDIRECT_MARKER`] counts. The target must be exactly one word:
/// a second marker, an empty target or several words are all rejected.
pub fn split_redirection(sub_command: &str) -> Result<(&str, Option<&str>), ShellError> {
    let Some((command, target)) = sub_command.split_once(REDIRECT_MARKER) else {
        return Ok((sub_command, None));
    };
    let target = target.trim();
    if target.contains(REDIRECT_MARKER) {
        Err(ShellError::RepeatedRedirect)
    } else if target.is_empty() {
        Err(ShellError::MissingRedirectTarget)
    } else if target.contains(char::is_whitespace) {
        Err(ShellError::MultipleRedirectTargets(target.to_owned()))
    } else {
        Ok((command, Some(target)))
    }
}

/// Split the command part into argument words on runs of whitespace.
///
/// An empty result means there is no command name; callers treat that as an error.
pub fn tokenize_args(command: &str) -> Vec<&str> {
    command.split_whitespace().collect()
}
