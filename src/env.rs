use crate::path::SearchPath;

/// Mutable state of one interpreter, threaded explicitly through every command.
///
/// The environment contains:
/// - `search_path`: directories consulted to resolve external commands.
/// - `should_exit`: set by `exit`; the read loop stops once the current line is done.
///
/// The working directory is not mirrored here: `cd` changes the process's own
/// directory, which every child inherits.
#[derive(Debug, Clone, Default)]
pub struct Environment {
    pub search_path: SearchPath,
    pub should_exit: bool,
}

impl Environment {
    /// Fresh state: the default search path and no pending exit.
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_search_path(search_path: SearchPath) -> Self {
        Self {
            search_path,
            should_exit: false,
        }
    }
}
