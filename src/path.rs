//! The ordered list of directories searched for external commands.

use nix::unistd::{AccessFlags, access};
use std::path::{Path, PathBuf};

/// Directory searched when nothing else has been configured.
pub const DEFAULT_PATH: &str = "/bin";

/// Ordered directories consulted to turn a bare command name into an executable.
///
/// Earlier entries take priority. Duplicates are kept as given, and an empty
/// list disables external commands altogether.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SearchPath {
    dirs: Vec<String>,
}

impl SearchPath {
    /// A search path holding only [`DEFAULT_PATH`].
    pub fn new() -> Self {
        Self {
            dirs: vec![DEFAULT_PATH.to_owned()],
        }
    }

    pub fn from_dirs<I, S>(dirs: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        Self {
            dirs: dirs.into_iter().map(Into::into).collect(),
        }
    }

    /// Replace every entry with `dirs`, keeping their order.
    pub fn set(&mut self, dirs: Vec<String>) {
        tracing::debug!(?dirs, "search path replaced");
        self.dirs = dirs;
    }

    pub fn dirs(&self) -> &[String] {
        &self.dirs
    }

    pub fn is_empty(&self) -> bool {
        self.dirs.is_empty()
    }

    /// Every `dir/name` that is an executable file, in search order.
    ///
    /// Relative directories are taken relative to the current working directory
    /// at the time of the call.
    pub fn candidates<'a>(&'a self, name: &'a str) -> impl Iterator<Item = PathBuf> + 'a {
        self.dirs
            .iter()
            .map(move |dir| PathBuf::from(format!("{dir}/{name}")))
            .filter(|candidate| is_executable_file(candidate))
    }

    /// Find the first `dir/name` that is an executable file.
    pub fn resolve(&self, name: &str) -> Option<PathBuf> {
        let found = self.candidates(name).next();
        tracing::trace!(name, ?found, "resolved command");
        found
    }
}

impl Default for SearchPath {
    fn default() -> Self {
        Self::new()
    }
}

fn is_executable_file(path: &Path) -> bool {
    path.is_file() && access(path, AccessFlags::X_OK).is_ok()
}
