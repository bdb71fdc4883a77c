use crate::error::ShellError;
use crate::lexer;
use std::path::PathBuf;

/// One unit of work within an input line.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SubCommand {
    /// Command name, the first word.
    pub name: String,
    /// Remaining words, in order.
    pub args: Vec<String>,
    /// File receiving both standard output and standard error.
    pub redirect: Option<PathBuf>,
}

impl SubCommand {
    /// Parse a single sub-command, already separated from its siblings.
    pub fn parse(text: &str) -> Result<Self, ShellError> {
        let (command, target) = lexer::split_redirection(text)?;
        let mut words = lexer::tokenize_args(command).into_iter().map(str::to_owned);
        let name = words.next().ok_or(ShellError::EmptyCommand)?;
        Ok(Self {
            name,
            args: words.collect(),
            redirect: target.map(PathBuf::from),
        })
    }
}

/// Parse every sub-command of `line`, left to right.
///
/// A malformed sub-command yields an error in its own slot and does not affect
/// the others.
pub fn parse_line(line: &str) -> Vec<Result<SubCommand, ShellError>> {
    lexer::split_concurrent(line)
        .into_iter()
        .map(SubCommand::parse)
        .collect()
}
