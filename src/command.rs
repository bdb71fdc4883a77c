use crate::env::Environment;
use crate::error::ShellError;
use crate::external::Spawner;
use crate::parser::SubCommand;
use std::fmt::Debug;
use std::io;
use std::process::Child;

/// A launched external process that still has to be waited on.
///
/// [`ChildProcess::wait`] consumes the handle, so a child can be waited on only once.
pub trait ChildProcess: Debug {
    /// OS process identifier.
    fn id(&self) -> u32;

    /// Block until the process terminates. Its exit status is discarded.
    fn wait(self: Box<Self>) -> io::Result<()>;
}

impl ChildProcess for Child {
    fn id(&self) -> u32 {
        Child::id(self)
    }

    fn wait(mut self: Box<Self>) -> io::Result<()> {
        Child::wait(&mut self).map(drop)
    }
}

/// Owned handle on a launched child.
pub type ChildHandle = Box<dyn ChildProcess>;

/// What happened after a command executed successfully.
#[derive(Debug)]
pub enum Outcome {
    /// Ran to completion inside the interpreter.
    Finished,
    /// Launched a child that runs concurrently with the interpreter.
    Spawned(ChildHandle),
}

/// Object-safe trait for any command that can be executed by the shell.
///
/// Implemented by builtins via a blanket impl and by external commands.
pub trait ExecutableCommand {
    /// Executes the command. Must not block on a launched child.
    fn execute(
        self: Box<Self>,
        env: &mut Environment,
        spawner: &dyn Spawner,
    ) -> Result<Outcome, ShellError>;
}

/// Factory that tries to create a command from a parsed sub-command.
///
/// Returns `None` when the factory doesn't recognize the name.
pub trait CommandFactory {
    /// Attempt to create a command instance for `command`.
    fn try_create(
        &self,
        env: &Environment,
        command: &SubCommand,
    ) -> Option<Box<dyn ExecutableCommand>>;
}
